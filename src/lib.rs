//! # Skilldex
//!
//! Directory service for agent-skill packages discovered on a code-hosting
//! platform.
//!
//! ## Features
//!
//! - **Related-Skills Engine:** Weighted scoring over topic overlap,
//!   ownership, popularity, and name similarity
//! - **Two-Tier Caching:** Server-wide TTL cache plus an endpoint-local LRU
//!   cache with independent lifecycles
//! - **PostgreSQL Catalog:** Thin store over the skill table the sync
//!   pipeline populates

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod related;

pub use config::Config;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
