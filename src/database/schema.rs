//! Esquema de PostgreSQL
//!
//! DDL idempotente aplicado al arrancar. Los estados se guardan como texto
//! con el mismo formato que la API (`SCHEDULED`, `IN_USE`, ...).

use sqlx::PgPool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS vehicles (
        id UUID PRIMARY KEY,
        plate VARCHAR(7) NOT NULL UNIQUE,
        brand VARCHAR(100) NOT NULL,
        model VARCHAR(100) NOT NULL,
        year INTEGER NOT NULL,
        vehicle_type VARCHAR(20) NOT NULL,
        capacity INTEGER NOT NULL CHECK (capacity BETWEEN 1 AND 100),
        status VARCHAR(20) NOT NULL DEFAULT 'AVAILABLE',
        chassis VARCHAR(50),
        color VARCHAR(30),
        notes TEXT,
        documents_valid BOOLEAN NOT NULL DEFAULT TRUE,
        documents_expire_on DATE NOT NULL,
        last_maintenance_on DATE,
        next_maintenance_on DATE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS drivers (
        id UUID PRIMARY KEY,
        name VARCHAR(150) NOT NULL,
        national_id VARCHAR(14) NOT NULL UNIQUE,
        birth_date DATE NOT NULL,
        email VARCHAR(150),
        phone VARCHAR(20) NOT NULL,
        license_number VARCHAR(11) NOT NULL UNIQUE,
        license_category CHAR(1) NOT NULL,
        license_expires_on DATE NOT NULL,
        status VARCHAR(20) NOT NULL DEFAULT 'AVAILABLE',
        overtime_minutes INTEGER NOT NULL DEFAULT 0,
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id UUID PRIMARY KEY,
        kind VARCHAR(20) NOT NULL,
        name VARCHAR(150) NOT NULL,
        tax_id VARCHAR(18) NOT NULL UNIQUE,
        birth_date DATE,
        email VARCHAR(150),
        phone VARCHAR(20) NOT NULL,
        mobile VARCHAR(20),
        street VARCHAR(200),
        number VARCHAR(20),
        complement VARCHAR(100),
        district VARCHAR(100),
        city VARCHAR(100),
        state VARCHAR(2),
        postal_code VARCHAR(9),
        notes TEXT,
        credit_limit NUMERIC(12, 2) NOT NULL DEFAULT 0,
        active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS trips (
        id UUID PRIMARY KEY,
        vehicle_id UUID NOT NULL REFERENCES vehicles(id),
        driver_id UUID NOT NULL REFERENCES drivers(id),
        client_id UUID NOT NULL REFERENCES clients(id),
        origin VARCHAR(255) NOT NULL,
        destination VARCHAR(255) NOT NULL,
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        value NUMERIC(12, 2) NOT NULL CHECK (value > 0),
        status VARCHAR(20) NOT NULL DEFAULT 'SCHEDULED',
        notes TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CHECK (start_time < end_time)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_trips_vehicle_window ON trips (vehicle_id, start_time, end_time) WHERE status <> 'CANCELLED'",
    "CREATE INDEX IF NOT EXISTS idx_trips_driver_window ON trips (driver_id, start_time, end_time) WHERE status <> 'CANCELLED'",
    "CREATE INDEX IF NOT EXISTS idx_trips_client ON trips (client_id)",
];

/// Ejecutar migraciones de la base de datos
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    log::info!("🗄️ Esquema verificado ({} sentencias)", SCHEMA.len());
    Ok(())
}
