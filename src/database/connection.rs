//! Configuración de conexión a PostgreSQL

use sqlx::PgPool;

use crate::config::database::DatabaseConfig;

/// Crear el pool y verificar la conexión
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    log::info!("🔌 Conectando a {}", mask_database_url(&config.url));
    let pool = config.create_pool().await?;
    test_connection(&pool).await?;
    log::info!("✅ Conexión a PostgreSQL establecida");
    Ok(pool)
}

/// Verificar que la conexión funciona
async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
