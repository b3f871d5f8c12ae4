//! Product domain model.

use super::{require_non_empty, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = i64;

/// Sellable item with a unique name and a strictly positive unit price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    pub price: Decimal,
}

impl Product {
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: None,
            name: name.into(),
            price,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("product", "name", &self.name)?;
        if self.price <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(self.price.to_string()));
        }
        Ok(())
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Product {}
