//! Wallet and identity subsystem.
//!
//! # Data Flow
//! ```text
//! wallet.txt (or PRIVATE_KEY fallback)
//!     → store.rs (load once, derive per key)
//!     → Credential (address + compressed public key)
//!     → signing.rs (personal-sign, recovery-based verify)
//! ```
//!
//! # Security Constraints
//! - Private keys come from the wallet file or the environment, never flags
//! - Keys are never logged; `Credential` redacts them from Debug output
//! - A malformed key skips that account when loading a batch, but is a hard
//!   error when a single derivation is requested

pub mod signing;
pub mod store;
pub mod types;

pub use store::CredentialStore;
pub use types::{Credential, WalletError, WalletResult};
