//! Configuration loader for the `property-compliance` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). By consolidating configuration logic here, we
//! avoid scattering `env::var` calls throughout the codebase.
//!
use std::env;
use std::net::SocketAddr;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse an optional boolean environment variable with a default value.
macro_rules! parse_env_bool {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| parse_bool(&v).ok_or_else(|| anyhow!("Invalid {}: {:?}", $var_name, v)))
            .transpose()?
            .unwrap_or($default)
    };
}

/// Read an optional, non-empty string environment variable.
macro_rules! optional_env {
    ($var_name:expr) => {
        env::var($var_name).ok().filter(|v| !v.trim().is_empty())
    };
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection string. `None` selects the in-memory store.
    pub db_url: Option<String>,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Populate an empty store with a demo portfolio on startup.
    pub seed_demo_data: bool,
}

/// Load configuration from environment variables with defaults.
///
/// Optional:
/// - `BIND_ADDR` – listen address (default: `0.0.0.0:8080`)
/// - `DATABASE_URL` – PostgreSQL connection string (default: in-memory store)
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `SEED_DEMO_DATA` – seed demo records when empty (default: false)
///
/// Returns an error if any variable is present but invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let bind_addr = optional_env!("BIND_ADDR")
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
        .parse::<SocketAddr>()
        .map_err(|e| anyhow!("Invalid BIND_ADDR: {}", e))?;
    let db_url = optional_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let seed_demo_data = parse_env_bool!("SEED_DEMO_DATA", false);

    Ok(Config {
        bind_addr,
        db_url,
        db_pool_max,
        seed_demo_data,
    })
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Replace the password in a connection URL with `****`.
fn mask_db_url(db_url: &str) -> String {
    // ---
    if let Some(at_pos) = db_url.rfind('@') {
        if let Some(colon_pos) = db_url[..at_pos].rfind(':') {
            // `postgres://host` has its scheme colon before `//`; leave those alone.
            if !db_url[colon_pos..].starts_with("://") {
                return format!("{}:****{}", &db_url[..colon_pos], &db_url[at_pos..]);
            }
        }
    }
    db_url.to_string()
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks sensitive information like database passwords while showing
    /// all configuration values that were loaded.
    pub fn log_config(&self) {
        // ---
        let store = match &self.db_url {
            Some(url) => format!("postgres ({})", mask_db_url(url)),
            None => "in-memory".to_string(),
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  BIND_ADDR      : {}", self.bind_addr);
        tracing::info!("  STORE          : {}", store);
        tracing::info!("  DB_POOL_MAX    : {}", self.db_pool_max);
        tracing::info!("  SEED_DEMO_DATA : {}", self.seed_demo_data);
    }
}
