//! Runtime configuration for storage and logging.
//!
//! # Responsibility
//! - Describe where the database lives and how logging is set up.
//! - Overlay `ORDERDESK_*` environment variables on top of defaults.
//!
//! # Invariants
//! - `db_path = None` means an in-memory database.
//! - Missing fields in serialized config fall back to `CoreConfig::default()`.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "ORDERDESK_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "ORDERDESK_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "ORDERDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "ORDERDESK_LOG_DIR";

const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file path; `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    /// Upper bound a statement waits on a locked database.
    pub busy_timeout_ms: u64,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds a config from defaults overridden by process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// Empty values are ignored; an unparsable busy timeout keeps the previous
    /// value.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(path));
        }
        if let Some(timeout) = get(ENV_BUSY_TIMEOUT_MS).and_then(|v| v.trim().parse().ok()) {
            self.busy_timeout_ms = timeout;
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(dir) = get(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn overrides_replace_only_present_values() {
        let env: HashMap<&str, &str> = [
            (ENV_DB_PATH, "/tmp/orders.db"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_LOG_LEVEL, ""),
        ]
        .into_iter()
        .collect();

        let config =
            CoreConfig::default().with_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/orders.db")));
        assert_eq!(config.busy_timeout_ms, 250);
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"db_path": "/var/lib/orderdesk.db", "busy_timeout_ms": 900}"#)
                .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/var/lib/orderdesk.db")));
        assert_eq!(config.busy_timeout_ms, 900);
        assert_eq!(config.log_level, default_log_level());
        assert!(config.log_dir.is_none());

        let empty: CoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, CoreConfig::default());
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        let config = CoreConfig::default().with_overrides(|key| {
            (key == ENV_BUSY_TIMEOUT_MS).then(|| "soon".to_string())
        });
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }
}
