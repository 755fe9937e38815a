//! Runtime configuration read from `TRIBU_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:8080";
pub const DEFAULT_LOG_FILTER: &str = "info";
const DATABASE_FILE: &str = "tribuconnect.db";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    /// Used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl AppConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = value("TRIBU_DATABASE_URL").unwrap_or_else(default_database_url);
        let raw_addr = value("TRIBU_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse()
            .with_context(|| format!("Invalid TRIBU_BIND_ADDR: {}", raw_addr))?;

        Ok(Self {
            database_url,
            bind_addr,
            cors_origin: value("TRIBU_CORS_ORIGIN").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            log_filter: value("TRIBU_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Private in-memory database, for tests
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            cors_origin: DEFAULT_CORS_ORIGIN.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Directory holding the default database file
pub fn data_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("tribuconnect"))
}

fn default_database_url() -> String {
    match data_directory() {
        Some(dir) => format!("sqlite:{}", dir.join(DATABASE_FILE).display()),
        None => format!("sqlite:{}", DATABASE_FILE),
    }
}
