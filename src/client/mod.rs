//! Generic signed-request HTTP transport.
//!
//! # Responsibilities
//! - POST a JSON body and decode a typed JSON response
//! - Inject the bearer authorization header on every call
//! - Honor per-call proxy and timeout overrides
//! - Split failures into transport / status / decode errors
//!
//! # Design Decisions
//! - A fresh `reqwest::Client` per call: the proxy is a client-level
//!   setting and differs per worker
//! - Non-200 responses keep the raw body for diagnosis
//! - Decoding reads the text first so a bad body is a `Decode` error,
//!   not a transport one

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::config::AppConfig;

/// Errors that can occur while talking to the remote service.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with something other than 200.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// The 200 body failed to parse as the expected response type.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Egress proxy URL; empty means direct.
    pub proxy: String,
    /// Timeout override in seconds; `None` uses the configured default.
    pub timeout_secs: Option<u64>,
}

/// JSON-over-HTTP client for the remote service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    auth_token: String,
    default_timeout: Duration,
}

impl ApiClient {
    /// Create a client with the configured bearer token and default
    /// timeout.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            auth_token: config.auth_token.clone(),
            default_timeout: config.request_timeout(),
        }
    }

    /// POST `body` as JSON to `url` and decode the response as `Resp`.
    pub async fn post_json<Req, Resp>(
        &self,
        url: &str,
        body: &Req,
        options: &RequestOptions,
    ) -> ClientResult<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let timeout = options
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        let mut builder = reqwest::Client::builder().timeout(timeout);
        if !options.proxy.is_empty() {
            builder = builder.proxy(reqwest::Proxy::all(options.proxy.as_str())?);
        }
        let client = builder.build()?;

        let response = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.auth_token))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status != StatusCode::OK {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(ClientError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    #[derive(Debug, Serialize)]
    struct Ping {
        message: String,
    }

    #[derive(Debug, Deserialize)]
    struct Pong {
        message: String,
    }

    fn test_client() -> ApiClient {
        ApiClient::new(&AppConfig::default())
    }

    /// Serve exactly one canned HTTP response on a local port.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream
                .set_read_timeout(Some(Duration::from_millis(500)))
                .ok();
            // Drain headers plus the content-length body before replying
            let mut buf = [0u8; 8192];
            let mut seen: Vec<u8> = Vec::new();
            while let Ok(n) = stream.read(&mut buf) {
                if n == 0 {
                    break;
                }
                seen.extend_from_slice(&buf[..n]);
                if let Some(header_end) = seen.windows(4).position(|w| w == b"\r\n\r\n") {
                    let headers = String::from_utf8_lossy(&seen[..header_end]).to_lowercase();
                    let body_len: usize = headers
                        .lines()
                        .find_map(|l| l.strip_prefix("content-length:"))
                        .and_then(|v| v.trim().parse().ok())
                        .unwrap_or(0);
                    if seen.len() >= header_end + 4 + body_len {
                        break;
                    }
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_post_json_decodes_ok_response() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 19\r\nconnection: close\r\n\r\n{\"message\":\"pong\"}\n",
        );
        let pong: Pong = test_client()
            .post_json(
                &url,
                &Ping {
                    message: "ping".to_string(),
                },
                &RequestOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(pong.message, "pong");
    }

    #[tokio::test]
    async fn test_post_json_surfaces_non_200() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 4\r\nconnection: close\r\n\r\nboom",
        );
        let result: ClientResult<Pong> = test_client()
            .post_json(
                &url,
                &Ping {
                    message: "ping".to_string(),
                },
                &RequestOptions::default(),
            )
            .await;
        match result {
            Err(ClientError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_post_json_bad_body_is_decode_error() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\ncontent-length: 8\r\nconnection: close\r\n\r\nnot json",
        );
        let result: ClientResult<Pong> = test_client()
            .post_json(
                &url,
                &Ping {
                    message: "ping".to_string(),
                },
                &RequestOptions::default(),
            )
            .await;
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Reserved TEST-NET address; nothing listens there
        let result: ClientResult<Pong> = test_client()
            .post_json(
                "http://192.0.2.1:9/heartbeat",
                &Ping {
                    message: "ping".to_string(),
                },
                &RequestOptions {
                    proxy: String::new(),
                    timeout_secs: Some(1),
                },
            )
            .await;
        assert!(matches!(result, Err(ClientError::Transport(_))));
    }
}
