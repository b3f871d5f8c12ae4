//! Caller-facing error classification.
//!
//! Store and service errors carry detail for logs; `ErrorKind` is the coarse
//! bucket a presentation layer branches on. Absence is not an error kind:
//! lookups return `Ok(None)` and deletes return `Ok(false)`.

use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A uniqueness constraint (customer email, product name) was violated.
    DuplicateKey,
    /// A business rule refused a delete because dependent data exists.
    Blocked,
    /// The caller supplied an ill-formed entity; nothing was written.
    Validation,
    /// Backend unreachable, constraint/schema fault or corrupt persisted data.
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateKey => "duplicate_key",
            Self::Blocked => "blocked",
            Self::Validation => "validation",
            Self::StorageFailure => "storage_failure",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
