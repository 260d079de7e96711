//! Fleet startup, signal handling, and coordinated shutdown.
//!
//! # Responsibilities
//! - Construct the two load-once stores and own them for the process
//! - Fail fast when no credentials load; degrade to zero proxies
//! - Start one worker per account with a stagger between starts
//! - Broadcast shutdown on SIGINT/SIGTERM and join every worker

use std::fs;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::fleet::cycle::SignedHeartbeat;
use crate::fleet::shutdown::Shutdown;
use crate::fleet::worker::{Worker, WorkerHandle};
use crate::fleet::{FleetError, FleetResult};
use crate::proxy::pool::{build_assignment, format_proxy_url, ProxyPool};
use crate::wallet::{Credential, CredentialStore};

/// Owns the stores and drives the worker fleet.
pub struct Supervisor {
    config: AppConfig,
    credentials: CredentialStore,
    proxies: ProxyPool,
}

impl Supervisor {
    /// Create the supervisor and its stores. Nothing is loaded yet.
    pub fn new(config: AppConfig) -> Self {
        let credentials = CredentialStore::new(&config);
        let proxies = ProxyPool::new(&config);
        Self {
            config,
            credentials,
            proxies,
        }
    }

    /// Run the fleet until an interrupt or termination signal arrives.
    ///
    /// Credential failures abort before any worker starts; there is no
    /// partial fleet. Returns once every worker has stopped.
    pub async fn run(&self) -> FleetResult<()> {
        let credentials = self.credentials.load().await?;
        tracing::info!(accounts = credentials.len(), "credentials loaded");
        for (index, credential) in credentials.iter().enumerate() {
            tracing::info!(
                account = index + 1,
                address = %credential.address(),
                compressed_public_key = %credential.compressed_public_key_hex(),
                "account identity"
            );
        }

        if let Some(path) = &self.config.identity_file {
            write_identity_file(path, credentials)?;
            tracing::info!(path = %path, "identity file written");
        }

        let proxies: Vec<String> = match self.proxies.load().await {
            Ok(list) => list.to_vec(),
            Err(error) => {
                tracing::warn!(%error, "proxies unavailable; running without proxies");
                Vec::new()
            }
        };
        if !proxies.is_empty() && proxies.len() < credentials.len() {
            tracing::warn!(
                proxies = proxies.len(),
                accounts = credentials.len(),
                "not enough proxies; reusing round-robin"
            );
        }
        let assignment = build_assignment(credentials.len(), &proxies);

        let shutdown = Shutdown::new();
        let cycle = Arc::new(SignedHeartbeat::new(&self.config));

        let mut handles: Vec<WorkerHandle> = Vec::with_capacity(credentials.len());
        for (index, credential) in credentials.iter().enumerate() {
            let worker = Worker::new(
                index + 1,
                credential.clone(),
                format_proxy_url(&assignment[index]),
                self.config.poll_interval(),
                cycle.clone(),
            );
            handles.push(worker.spawn(shutdown.subscribe()));
            // Stagger starts to avoid a connection burst
            tokio::time::sleep(self.config.stagger()).await;
        }
        tracing::info!(workers = handles.len(), "fleet running");

        wait_for_signal().await;
        tracing::info!("shutdown signal received; stopping workers");
        shutdown.trigger();

        for handle in handles {
            handle.join().await;
        }
        tracing::info!("all workers stopped");
        Ok(())
    }
}

/// Write each account's compressed public key and address, one line each.
fn write_identity_file(path: &str, credentials: &[Credential]) -> FleetResult<()> {
    let mut out = String::new();
    for (index, credential) in credentials.iter().enumerate() {
        out.push_str(&format!(
            "account {} compressed_public_key: {}\n",
            index + 1,
            credential.compressed_public_key_hex()
        ));
        out.push_str(&format!(
            "account {} address: {}\n",
            index + 1,
            credential.address()
        ));
    }
    fs::write(path, out).map_err(|source| FleetError::IdentityFile {
        path: path.to_string(),
        source,
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(error) => {
            tracing::warn!(%error, "no SIGTERM handler; listening for ctrl-c only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
