//! Modelo de Client

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::errors::{ValidationError, ValidationReason};
use crate::utils::validation::{
    normalize_document, validate_email, validate_national_id, validate_phone, validate_required,
};

/// Persona física u organización
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientKind {
    Person,
    Organization,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::Person => "PERSON",
            ClientKind::Organization => "ORGANIZATION",
        }
    }
}

impl FromStr for ClientKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "PERSON" => Ok(ClientKind::Person),
            "ORGANIZATION" => Ok(ClientKind::Organization),
            other => Err(format!("unknown client kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub number: Option<String>,
    pub complement: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// Client principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub kind: ClientKind,
    pub name: String,
    pub tax_id: String,
    pub birth_date: Option<NaiveDate>,
    pub email: Option<String>,
    pub phone: String,
    pub mobile: Option<String>,
    pub address: Address,
    pub notes: Option<String>,
    pub credit_limit: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        validate_required("name", &self.name)?;
        validate_required("tax_id", &self.tax_id)?;
        validate_phone(&self.phone)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if self.credit_limit < Decimal::ZERO {
            return Err(ValidationError::new("credit_limit", ValidationReason::OutOfRange));
        }
        if self.kind == ClientKind::Person {
            validate_national_id(&self.tax_id).map_err(|e| e.with_field("tax_id"))?;
            match self.birth_date {
                None => return Err(ValidationError::new("birth_date", ValidationReason::Required)),
                Some(birth) if birth > today => {
                    return Err(ValidationError::new("birth_date", ValidationReason::OutOfRange))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub fn normalize_documents(&mut self) {
        self.tax_id = normalize_document(&self.tax_id);
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.updated_at = now;
    }
}
