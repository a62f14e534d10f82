//! Controladores: validan la petición, llaman al servicio y arman la respuesta

pub mod availability_controller;
pub mod registry_controller;
pub mod trip_controller;
