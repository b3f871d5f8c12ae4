//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for orderdesk core.
//! - Create the relational schema before any store touches the connection.
//!
//! # Invariants
//! - Every returned connection has `foreign_keys=ON`.
//! - Core code must not read/write application data before schema init succeeds.

use crate::error::ErrorKind;
use thiserror::Error;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, open_db_with_config};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("required table `{0}` is missing after schema initialization")]
    MissingRequiredTable(&'static str),
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::StorageFailure
    }
}
