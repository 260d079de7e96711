//! Proxy reachability diagnostics.
//!
//! # Responsibilities
//! - Issue a bounded-timeout GET through a proxy against an IP-echo
//!   endpoint
//! - Distinguish "transport failed" (error) from "reached the endpoint
//!   but the response carried no IP info" (reachable = false)
//! - Drive the `check-proxy` CLI mode: probe every pool entry and log a
//!   per-proxy report

use std::time::Duration;

use url::Url;

use crate::proxy::pool::{format_proxy_url, ProxyPool};
use crate::proxy::{ProxyError, ProxyResult};

/// External endpoint that echoes the caller's IP as JSON.
const IP_ECHO_URL: &str = "https://ipinfo.io/json";

/// Probe request timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of probing one proxy.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    /// Whether the echo endpoint answered with IP info through the proxy.
    pub reachable: bool,
    /// Echo response body, or a reason when unreachable.
    pub detail: String,
}

/// Probe a single raw proxy descriptor.
///
/// Transport-level failures (connect, TLS, timeout) are returned as
/// `ProxyError::Probe`; a well-formed response that lacks IP info yields
/// `reachable: false` without an error.
pub async fn probe_proxy(raw: &str) -> ProxyResult<ProbeReport> {
    if raw.is_empty() {
        return Ok(ProbeReport {
            reachable: false,
            detail: "no proxy configured".to_string(),
        });
    }

    let formatted = format_proxy_url(raw);
    let proxy_url: Url = formatted.parse().map_err(|e| ProxyError::InvalidUrl {
        url: formatted.clone(),
        reason: format!("{e}"),
    })?;

    let client = reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .proxy(reqwest::Proxy::all(proxy_url).map_err(|e| ProxyError::Probe(e.to_string()))?)
        .build()
        .map_err(|e| ProxyError::Probe(e.to_string()))?;

    let response = client
        .get(IP_ECHO_URL)
        .send()
        .await
        .map_err(|e| ProxyError::Probe(e.to_string()))?;

    let body = response
        .text()
        .await
        .map_err(|e| ProxyError::Probe(e.to_string()))?;

    if body.contains("ip") {
        Ok(ProbeReport {
            reachable: true,
            detail: body,
        })
    } else {
        Ok(ProbeReport {
            reachable: false,
            detail: "response carried no ip field".to_string(),
        })
    }
}

/// Probe every proxy in the pool and log a reachability report.
///
/// Used by the `check-proxy` CLI mode; no workers are started.
pub async fn run_proxy_check(pool: &ProxyPool) -> ProxyResult<()> {
    let proxies = pool.load().await?;
    tracing::info!(count = proxies.len(), "probing proxy pool");

    for (index, proxy) in proxies.iter().enumerate() {
        match probe_proxy(proxy).await {
            Ok(report) if report.reachable => {
                tracing::info!(proxy = index + 1, entry = %proxy, "reachable");
            }
            Ok(report) => {
                tracing::warn!(
                    proxy = index + 1,
                    entry = %proxy,
                    detail = %report.detail,
                    "not reachable"
                );
            }
            Err(error) => {
                tracing::warn!(proxy = index + 1, entry = %proxy, %error, "probe failed");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_proxy_is_unreachable_without_error() {
        let report = probe_proxy("").await.unwrap();
        assert!(!report.reachable);
    }

    #[tokio::test]
    async fn test_malformed_entry_is_invalid_url() {
        // Passed through unformatted, so it does not parse as a URL
        let result = probe_proxy("just-a-host").await;
        assert!(matches!(result, Err(ProxyError::InvalidUrl { .. })));
    }
}
