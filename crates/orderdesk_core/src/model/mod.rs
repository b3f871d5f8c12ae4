//! Domain model for customers, products and orders.
//!
//! # Responsibility
//! - Define canonical data structures used by stores and services.
//! - Own write-time validation rules shared by every store.
//!
//! # Invariants
//! - Identity is the store-assigned numeric id; equality compares ids only.
//! - An entity with `id == None` has never been persisted.

use crate::error::ErrorKind;
use thiserror::Error;

pub mod customer;
pub mod order;
pub mod product;

/// Validation failure raised before any SQL is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{entity} {field} must not be empty")]
    EmptyField {
        entity: &'static str,
        field: &'static str,
    },
    #[error("invalid email address `{0}`")]
    InvalidEmail(String),
    #[error("product price must be positive, got {0}")]
    NonPositivePrice(String),
    #[error("order line quantity must be positive")]
    ZeroQuantity,
    #[error("{0} has not been persisted yet")]
    Unsaved(&'static str),
    #[error("product {0} appears more than once in the order")]
    DuplicateLine(i64),
    #[error("accumulated quantity for product {0} exceeds the supported maximum")]
    QuantityOverflow(i64),
    #[error("order amount exceeds the representable decimal range")]
    AmountOverflow,
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

pub(crate) fn require_non_empty(
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { entity, field });
    }
    Ok(())
}
