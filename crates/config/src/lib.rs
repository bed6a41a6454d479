//! # Config - Runtime Settings
//!
//! Settings are read from environment variables with defaults:
//!
//! ```text
//! EMPDB_PATH   database file path            (default: none)
//! EMPDB_SYNC   fsync after every persist     (default: "true")
//! EMPDB_LOCK   advisory exclusive file lock  (default: "true")
//! ```
//!
//! Values that fail to parse fall back to the default.

use std::path::PathBuf;

pub const ENV_PATH: &str = "EMPDB_PATH";
pub const ENV_SYNC: &str = "EMPDB_SYNC";
pub const ENV_LOCK: &str = "EMPDB_LOCK";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Database file path, if one was configured.
    pub path: Option<PathBuf>,
    /// If `true`, every persist is followed by `sync_all()`.
    pub sync: bool,
    /// If `true`, the database file is locked exclusively while open.
    pub lock: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: None,
            sync: true,
            lock: true,
        }
    }
}

impl DbConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            path: lookup(ENV_PATH)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
            sync: parse_bool(lookup(ENV_SYNC)).unwrap_or(defaults.sync),
            lock: parse_bool(lookup(ENV_LOCK)).unwrap_or(defaults.lock),
        }
    }
}

fn parse_bool(value: Option<String>) -> Option<bool> {
    match value?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
