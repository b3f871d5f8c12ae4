//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define CRUD contracts for customers, products and orders.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes validate the entity before any SQL mutation.
//! - Absence is reported as `Ok(None)` / `Ok(false)`, never as an error.
//! - Cross-entity business rules do not live here; see `service`.

use crate::db::DbError;
use crate::error::ErrorKind;
use crate::model::customer::CustomerId;
use crate::model::order::OrderId;
use crate::model::ValidationError;
use thiserror::Error;

pub mod customer_repo;
pub mod order_repo;
pub mod product_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error surfaced by every store.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{entity} with {field} `{value}` already exists")]
    DuplicateKey {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("order {order_id} references missing customer {customer_id}")]
    MissingCustomer {
        order_id: OrderId,
        customer_id: CustomerId,
    },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(err) => err.kind(),
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
            Self::Db(err) => err.kind(),
            Self::MissingCustomer { .. } | Self::InvalidData(_) => ErrorKind::StorageFailure,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Returns whether `err` is a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Maps a UNIQUE violation to `DuplicateKey`, leaving other errors as storage
/// failures.
pub(crate) fn map_unique_violation(
    err: rusqlite::Error,
    entity: &'static str,
    field: &'static str,
    value: &str,
) -> RepoError {
    if is_unique_violation(&err) {
        RepoError::DuplicateKey {
            entity,
            field,
            value: value.to_string(),
        }
    } else {
        err.into()
    }
}
