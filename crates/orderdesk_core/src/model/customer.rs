//! Customer domain model.
//!
//! # Invariants
//! - `email` is unique across all customers (enforced by the store).
//! - Two customers are equal iff their ids are equal.

use super::{require_non_empty, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("valid email regex"));

pub type CustomerId = i64;

/// Contact and address record for someone who places orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    /// Assigned by the store on insert.
    pub id: Option<CustomerId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    /// State or province.
    pub region: String,
    pub country: String,
}

impl Customer {
    /// Creates an unsaved customer with empty contact/address fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            region: String::new(),
            country: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("customer", "name", &self.name)?;
        require_non_empty("customer", "email", &self.email)?;
        if !EMAIL_RE.is_match(self.email.trim()) {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

impl PartialEq for Customer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Customer {}

#[cfg(test)]
mod tests {
    use super::Customer;
    use crate::model::ValidationError;

    #[test]
    fn validate_rejects_malformed_email() {
        let customer = Customer::new("Ana", "ana.example.com");
        assert_eq!(
            customer.validate(),
            Err(ValidationError::InvalidEmail("ana.example.com".to_string()))
        );
    }

    #[test]
    fn equality_uses_id_only() {
        let mut first = Customer::new("Ana", "ana@x.com");
        let mut second = Customer::new("Bea", "bea@x.com");
        first.id = Some(7);
        second.id = Some(7);
        assert_eq!(first, second);
    }
}
