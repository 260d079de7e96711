//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional, applied by dotenv in main)
//!     → process environment
//!     → schema.rs (AppConfig::from_env, defaults for anything unset)
//!     → AppConfig (immutable)
//!     → shared by reference with every subsystem
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults so a bare environment still runs
//! - Secrets (bearer token, fallback key) are redacted from Debug output

pub mod schema;

pub use schema::AppConfig;
