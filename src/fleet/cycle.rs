//! One interaction cycle: sign a heartbeat and submit it.
//!
//! The remote schema is a thin envelope; the service's real
//! request/response shape is an external collaborator. The cycle sits
//! behind a trait so the worker loop can be exercised without a network.

use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::{ApiClient, ClientError, RequestOptions};
use crate::config::AppConfig;
use crate::wallet::signing;
use crate::wallet::{Credential, WalletError};

/// A failure inside one cycle. Logged by the worker, never fatal to it.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Signed heartbeat request body.
#[derive(Debug, Serialize)]
pub struct HeartbeatRequest {
    pub wallet_address: String,
    pub compressed_public_key: String,
    pub message: String,
    pub signature: String,
}

/// Heartbeat acknowledgement. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub struct HeartbeatResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// The periodic remote interaction a worker performs.
pub trait InteractionCycle: Send + Sync + 'static {
    /// Run one cycle for `credential` through `proxy` (empty = direct).
    fn run_cycle(
        &self,
        credential: &Credential,
        proxy: &str,
    ) -> impl Future<Output = Result<(), CycleError>> + Send;
}

/// Production cycle: personal-sign a timestamped message and POST it to
/// the configured endpoint.
pub struct SignedHeartbeat {
    client: ApiClient,
    endpoint_url: String,
}

impl SignedHeartbeat {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: ApiClient::new(config),
            endpoint_url: config.endpoint_url.clone(),
        }
    }
}

impl InteractionCycle for SignedHeartbeat {
    fn run_cycle(
        &self,
        credential: &Credential,
        proxy: &str,
    ) -> impl Future<Output = Result<(), CycleError>> + Send {
        async move {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            let message = format!("heartbeat:{}:{}", credential.address(), timestamp);
            let signature = signing::sign_message(credential, message.as_bytes())?;

            let request = HeartbeatRequest {
                wallet_address: credential.address().to_string(),
                compressed_public_key: credential.compressed_public_key_hex(),
                message,
                signature,
            };
            let options = RequestOptions {
                proxy: proxy.to_string(),
                timeout_secs: None,
            };

            let response: HeartbeatResponse = self
                .client
                .post_json(&self.endpoint_url, &request, &options)
                .await?;

            tracing::debug!(
                address = %credential.address(),
                ack = response.message.as_deref().unwrap_or(""),
                "heartbeat accepted"
            );
            Ok(())
        }
    }
}
