//! Fleet Node
//!
//! Runs many independent accounts concurrently, each holding a private
//! key and an optional egress proxy, each performing a periodic signed
//! interaction with a remote service.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                  SUPERVISOR                   │
//!                  │                                               │
//!  wallet.txt ────▶│  wallet::CredentialStore ──┐                  │
//!                  │                            ├─▶ N × Worker     │
//!  proxy.txt  ────▶│  proxy::ProxyPool ─────────┘     │            │
//!                  │    (round-robin assignment)      │            │
//!                  │                                  ▼            │
//!                  │            wallet::signing (personal-sign)    │
//!                  │                                  │            │
//!                  │                                  ▼            │
//!                  │            client::ApiClient (JSON POST) ─────┼──▶ remote
//!                  │                                               │    service
//!                  │  SIGINT/SIGTERM ─▶ fleet::Shutdown broadcast  │
//!                  └──────────────────────────────────────────────┘
//! ```

pub mod client;
pub mod config;
pub mod fleet;
pub mod proxy;
pub mod wallet;

pub use config::AppConfig;
pub use fleet::{Shutdown, Supervisor};
pub use wallet::{Credential, CredentialStore};
