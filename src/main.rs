use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trip_scheduling::build_app;
use trip_scheduling::config::{DatabaseConfig, EnvironmentConfig, SchedulingConfig};
use trip_scheduling::database::{connect, mask_database_url, run_migrations};
use trip_scheduling::repositories::memory::InMemoryStore;
use trip_scheduling::repositories::StoreSet;
use trip_scheduling::state::AppState;
use trip_scheduling::utils::clock::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚌 Programación de viajes de flota");
    info!("==================================");

    let config = EnvironmentConfig::from_env();
    let scheduling = SchedulingConfig::from_env();
    info!(
        "⚙️ Entorno: {} | timeout de transacción: {:?} | política de estados: {:?}",
        config.environment, scheduling.transaction_timeout, scheduling.status_policy
    );

    let stores = match &config.database_url {
        Some(url) => {
            info!("🗄️ Conectando a {}", mask_database_url(url));
            let pool = connect(&DatabaseConfig::from_url(url)).await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                anyhow::anyhow!("Error de base de datos: {}", e)
            })?;
            run_migrations(&pool).await?;
            StoreSet::postgres(pool)
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida, usando almacén en memoria");
            StoreSet::in_memory(Arc::new(InMemoryStore::new()))
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let state = AppState::new(stores, Arc::new(SystemClock), scheduling, config);
    let app = build_app(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🧭 Endpoints - Trip:");
    info!("   POST /api/trip - Crear viaje");
    info!("   GET  /api/trip - Listar viajes");
    info!("   GET  /api/trip/:id - Obtener viaje");
    info!("   PUT  /api/trip/:id - Reprogramar viaje");
    info!("   POST /api/trip/:id/start | complete | cancel - Ciclo de vida");
    info!("🚗 Endpoints - Vehicle / Driver / Client:");
    info!("   POST /api/vehicle, /api/driver, /api/client - Registrar");
    info!("   GET  /api/vehicle/:id/availability - Disponibilidad de vehículo");
    info!("   GET  /api/driver/:id/availability - Disponibilidad de conductor");
    info!("📅 Endpoints - Availability:");
    info!("   GET  /api/availability/vehicles | drivers - Recursos libres");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el manejador de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el manejador de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
