//! Recursos reservables
//!
//! Un recurso es un vehículo o un conductor: las dos entidades sujetas a
//! reservas por intervalo de tiempo.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Tipo de recurso reservable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Vehicle,
    Driver,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Vehicle => write!(f, "vehicle"),
            ResourceKind::Driver => write!(f, "driver"),
        }
    }
}

/// Referencia a un recurso concreto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub id: Uuid,
}

impl ResourceRef {
    pub fn vehicle(id: Uuid) -> Self {
        Self { kind: ResourceKind::Vehicle, id }
    }

    pub fn driver(id: Uuid) -> Self {
        Self { kind: ResourceKind::Driver, id }
    }

    /// Clave estable usada para los locks exclusivos por recurso
    pub fn lock_key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// Entidades que pueden no existir al ser referenciadas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Trip,
    Vehicle,
    Driver,
    Client,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Trip => "Trip",
            EntityKind::Vehicle => "Vehicle",
            EntityKind::Driver => "Driver",
            EntityKind::Client => "Client",
        };
        write!(f, "{}", name)
    }
}

impl From<ResourceKind> for EntityKind {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Vehicle => EntityKind::Vehicle,
            ResourceKind::Driver => EntityKind::Driver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_key_is_prefixed_by_kind() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            ResourceRef::vehicle(id).lock_key(),
            "vehicle:550e8400-e29b-41d4-a716-446655440000"
        );
        assert_eq!(
            ResourceRef::driver(id).lock_key(),
            "driver:550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_resource_refs_sort_by_kind_first() {
        let low = Uuid::from_u128(1);
        let high = Uuid::from_u128(2);
        let mut refs = vec![ResourceRef::driver(low), ResourceRef::vehicle(high)];
        refs.sort();
        assert_eq!(refs[0].kind, ResourceKind::Vehicle);
    }
}
