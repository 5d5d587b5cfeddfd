use std::env;
use std::str::FromStr;

use anyhow::{Context, anyhow};

/// Selects the in-process store instead of MySQL.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub api_prefix: String,

    // Rate limiting, 0 disables the limiter
    pub rate_api_per_min: u32,

    // Connection pool
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_idle_timeout_ms: u64,
    pub db_connect_timeout_ms: u64,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8000".to_string(),
            database_url: MEMORY_DATABASE_URL.to_string(),
            api_prefix: "/api".to_string(),
            rate_api_per_min: 1000,
            db_max_connections: 50,
            db_min_connections: 10,
            db_idle_timeout_ms: 45_000,
            db_connect_timeout_ms: 5_000,
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has invalid value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Reads the process environment; `.env` is loaded by the caller.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            api_prefix: env::var("API_PREFIX").unwrap_or(defaults.api_prefix),

            rate_api_per_min: parse_or("RATE_API_PER_MIN", defaults.rate_api_per_min)?,

            db_max_connections: parse_or("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_min_connections: parse_or("DB_MIN_CONNECTIONS", defaults.db_min_connections)?,
            db_idle_timeout_ms: parse_or("DB_IDLE_TIMEOUT_MS", defaults.db_idle_timeout_ms)?,
            db_connect_timeout_ms: parse_or(
                "DB_CONNECT_TIMEOUT_MS",
                defaults.db_connect_timeout_ms,
            )?,

            log_dir: env::var("LOG_DIR").unwrap_or(defaults.log_dir),
            log_level: parse_or("LOG_LEVEL", defaults.log_level)?,
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}
