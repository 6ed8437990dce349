//! Configuration management for Skilldex
//!
//! Loads configuration from environment variables (with `.env` support).

use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// PostgreSQL database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: SecretString,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub bind: String,
    /// Port
    pub port: u16,
}

/// Cache tuning knobs
///
/// Defaults match the production values; override via env for load tests.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for related-skills endpoint cache entries
    pub related_ttl: Duration,
    /// Max entries in the related-skills endpoint cache
    pub related_max_entries: usize,
    /// Max entries in the shared server-wide cache
    pub shared_max_entries: usize,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level filter
    pub level: String,
    /// Log format (pretty, json)
    pub format: String,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL database settings
    pub database: DatabaseConfig,
    /// HTTP server settings
    pub server: ServerConfig,
    /// Cache settings
    pub cache: CacheConfig,
    /// Logging settings
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            database: DatabaseConfig {
                url: SecretString::from(std::env::var("DATABASE_URL")?),
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
                connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse()
                    .unwrap_or(30),
            },
            server: ServerConfig {
                bind: std::env::var("SERVER_BIND").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: std::env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            cache: CacheConfig {
                related_ttl: Duration::from_secs(
                    std::env::var("RELATED_CACHE_TTL_SECS")
                        .unwrap_or_else(|_| "60".to_string())
                        .parse()
                        .unwrap_or(60),
                ),
                related_max_entries: std::env::var("RELATED_CACHE_MAX_ENTRIES")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .unwrap_or(500),
                shared_max_entries: std::env::var("SHARED_CACHE_MAX_ENTRIES")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .unwrap_or(500),
            },
            log: LogConfig {
                level: std::env::var("RUST_LOG")
                    .unwrap_or_else(|_| "info,skilldex=debug,sqlx=warn".to_string()),
                format: std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
            },
        })
    }

    /// Validate that all required configuration is present
    pub fn validate(&self) -> Result<()> {
        if self.database.url.expose_secret().is_empty() {
            return Err(Error::Config("DATABASE_URL is required".to_string()));
        }
        if self.cache.related_max_entries == 0 || self.cache.shared_max_entries == 0 {
            return Err(Error::Config(
                "cache max entries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
