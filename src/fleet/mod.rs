//! Fleet lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (supervisor.rs):
//!     Load credentials (fatal on error) → load proxies (warn on error)
//!     → build assignment → spawn one worker per account, staggered
//!
//! Run (worker.rs):
//!     Idle → Running → (Cycle → Sleeping)* → Stopped
//!     each cycle = sign heartbeat (cycle.rs) → POST via assigned proxy
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast to all workers → join all → exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: a credential load error aborts before any worker starts
//! - Workers are independent; the only shared state is the two load-once
//!   stores, read-only after population
//! - Cancellation is observed at the loop head and during sleep; an
//!   in-flight request always runs to completion

pub mod cycle;
pub mod shutdown;
pub mod supervisor;
pub mod worker;

use thiserror::Error;

pub use shutdown::Shutdown;
pub use supervisor::Supervisor;
pub use worker::{Worker, WorkerHandle, WorkerState};

use crate::wallet::WalletError;

/// Errors that abort fleet startup.
#[derive(Debug, Error)]
pub enum FleetError {
    /// Credential loading or derivation failed.
    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// The identity file could not be written.
    #[error("failed to write identity file '{path}': {source}")]
    IdentityFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for fleet operations.
pub type FleetResult<T> = Result<T, FleetError>;
