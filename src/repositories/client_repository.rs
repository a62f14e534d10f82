use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::{unique_field, ClientStore, StorageResult};
use crate::models::client::{Address, Client, ClientKind};
use crate::utils::errors::StorageError;

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    kind: String,
    name: String,
    tax_id: String,
    birth_date: Option<NaiveDate>,
    email: Option<String>,
    phone: String,
    mobile: Option<String>,
    street: Option<String>,
    number: Option<String>,
    complement: Option<String>,
    district: Option<String>,
    city: Option<String>,
    state: Option<String>,
    postal_code: Option<String>,
    notes: Option<String>,
    credit_limit: Decimal,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRow {
    fn into_client(self) -> StorageResult<Client> {
        let kind = self
            .kind
            .parse::<ClientKind>()
            .map_err(|e| StorageError::Corrupted(format!("client {}: {}", self.id, e)))?;
        Ok(Client {
            id: self.id,
            kind,
            name: self.name,
            tax_id: self.tax_id,
            birth_date: self.birth_date,
            email: self.email,
            phone: self.phone,
            mobile: self.mobile,
            address: Address {
                street: self.street,
                number: self.number,
                complement: self.complement,
                district: self.district,
                city: self.city,
                state: self.state,
                postal_code: self.postal_code,
            },
            notes: self.notes,
            credit_limit: self.credit_limit,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct PgClientStore {
    pool: PgPool,
}

impl PgClientStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientStore for PgClientStore {
    async fn create(&self, client: &Client) -> StorageResult<()> {
        let address = &client.address;
        sqlx::query(
            r#"
            INSERT INTO clients (id, kind, name, tax_id, birth_date, email, phone, mobile,
                                 street, number, complement, district, city, state, postal_code,
                                 notes, credit_limit, active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                    $16, $17, $18, $19, $20)
            "#,
        )
        .bind(client.id)
        .bind(client.kind.as_str())
        .bind(&client.name)
        .bind(&client.tax_id)
        .bind(client.birth_date)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.mobile)
        .bind(&address.street)
        .bind(&address.number)
        .bind(&address.complement)
        .bind(&address.district)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&client.notes)
        .bind(client.credit_limit)
        .bind(client.active)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_field(e, &["tax_id"]))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Client>> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, kind, name, tax_id, birth_date, email, phone, mobile,
                   street, number, complement, district, city, state, postal_code,
                   notes, credit_limit, active, created_at, updated_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(ClientRow::into_client).transpose()
    }

    async fn set_active(&self, id: Uuid, active: bool, now: DateTime<Utc>) -> StorageResult<()> {
        sqlx::query("UPDATE clients SET active = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(active)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
