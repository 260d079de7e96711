//! Configuration schema definitions.
//!
//! All values are sourced from the process environment with sensible
//! defaults; `#[serde(default)]` keeps the struct loadable from a config
//! file as well should one ever be introduced.

use std::env;
use std::time::Duration;

use serde::Deserialize;

/// Default per-request timeout in seconds when `API_REQUEST_TIMEOUT` is
/// unset or non-numeric.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 100;

/// Fixed pause between interaction cycles.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Delay between successive worker starts, to avoid a connection burst.
pub const DEFAULT_STAGGER_MS: u64 = 500;

/// Root configuration for the fleet node.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Newline-delimited private key list, one hex key per line.
    pub wallet_file: String,

    /// Newline-delimited proxy list in `host:port[:user[:pass...]]` form.
    pub proxy_file: String,

    /// Optional file that receives each account's compressed public key
    /// and address at startup.
    pub identity_file: Option<String>,

    /// Remote heartbeat endpoint.
    pub endpoint_url: String,

    /// Bearer token sent with every request. Injected from the
    /// environment; the default is a local-run placeholder.
    pub auth_token: String,

    /// Single-key fallback used only when the wallet file is absent or
    /// empty.
    pub fallback_private_key: Option<String>,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Sleep between interaction cycles, per worker.
    pub poll_interval_secs: u64,

    /// Stagger between worker starts.
    pub stagger_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            wallet_file: "wallet.txt".to_string(),
            proxy_file: "proxy.txt".to_string(),
            identity_file: None,
            endpoint_url: "http://localhost:8080/heartbeat".to_string(),
            auth_token: "dev-placeholder-token".to_string(),
            fallback_private_key: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            stagger_ms: DEFAULT_STAGGER_MS,
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment, falling back
    /// to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(value) = env::var("WALLET_FILE") {
            config.wallet_file = value;
        }
        if let Ok(value) = env::var("PROXY_FILE") {
            config.proxy_file = value;
        }
        if let Ok(value) = env::var("IDENTITY_FILE") {
            if !value.is_empty() {
                config.identity_file = Some(value);
            }
        }
        if let Ok(value) = env::var("FLEET_ENDPOINT_URL") {
            config.endpoint_url = value;
        }
        if let Ok(value) = env::var("API_AUTH_TOKEN") {
            config.auth_token = value;
        }
        if let Ok(value) = env::var("PRIVATE_KEY") {
            if !value.trim().is_empty() {
                config.fallback_private_key = Some(value);
            }
        }
        config.request_timeout_secs =
            parse_timeout_secs(env::var("API_REQUEST_TIMEOUT").ok().as_deref());

        config
    }

    /// Per-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Sleep between interaction cycles as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Worker start stagger as a `Duration`.
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

/// Parse the timeout override, keeping the default for unset or
/// non-numeric values.
fn parse_timeout_secs(raw: Option<&str>) -> u64 {
    match raw {
        Some(value) => match value.trim().parse::<u64>() {
            Ok(secs) => secs,
            Err(_) => {
                tracing::warn!(
                    value,
                    default = DEFAULT_REQUEST_TIMEOUT_SECS,
                    "non-numeric API_REQUEST_TIMEOUT; using default"
                );
                DEFAULT_REQUEST_TIMEOUT_SECS
            }
        },
        None => DEFAULT_REQUEST_TIMEOUT_SECS,
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Token and fallback key stay out of logs.
        f.debug_struct("AppConfig")
            .field("wallet_file", &self.wallet_file)
            .field("proxy_file", &self.proxy_file)
            .field("identity_file", &self.identity_file)
            .field("endpoint_url", &self.endpoint_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("stagger_ms", &self.stagger_ms)
            .finish()
    }
}
