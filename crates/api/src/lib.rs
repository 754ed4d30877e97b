//! HTTP client for Dify-compatible workflow backends.
//!
//! This crate provides a lightweight client for the three endpoints the
//! bridge consumes:
//!
//! - `GET /v1/info` — application metadata
//! - `GET /v1/parameters` — input form schema and system limits
//! - `POST /v1/workflows/run` — blocking workflow invocation
//!
//! Every application is addressed by its own bearer credential, so the
//! `Authorization` header is supplied per request rather than baked into
//! the client. The base URL is validated once at construction and shared
//! across all credentials.
//!
//! # Example
//!
//! ```ignore
//! use agentx_api::DifyClient;
//! use agentx_types::AppInfo;
//! use std::time::Duration;
//!
//! let client = DifyClient::new("https://api.dify.ai", Duration::from_secs(60))?;
//! let info: AppInfo = client.get("/v1/info", "app-xxxx").await?;
//! ```

use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Number of additional attempts after a transient failure.
const MAX_RETRIES: u32 = 1;

/// Delay before retrying a transient failure.
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Errors produced by [`DifyClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin wrapper around a configured `reqwest::Client` for Dify API access.
///
/// The wrapped client carries the request timeout and connection pool; the
/// bearer credential is attached per request because each workflow
/// application has its own key.
#[derive(Debug, Clone)]
pub struct DifyClient {
    base_url: String,
    http: Client,
}

impl DifyClient {
    /// Construct a client for the given backend base URL.
    ///
    /// The URL must be absolute, use `http` or `https`, and include a host.
    /// A trailing slash is stripped so API paths like `/v1/info` resolve
    /// without doubling separators.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        validate_base_url(base_url)?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// The validated backend base URL (without trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET` an API path and decode the JSON response body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, credential: &str) -> Result<T, ApiError> {
        let payload = self.execute(Method::GET, path, credential, None).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// `POST` a JSON body to an API path and decode the JSON response body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        credential: &str,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let payload = self.execute(Method::POST, path, credential, Some(body)).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Send one request, retrying once on transient failures.
    ///
    /// Transient means a connect/timeout error or a 429/5xx status; anything
    /// else surfaces immediately. An empty response body decodes to
    /// `Value::Null`.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        credential: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();

        let mut attempt = 0;
        loop {
            if attempt > 0 {
                warn!(%method, path, attempt, "retrying request after transient failure");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let mut builder = self.http.request(method.clone(), &url).bearer_auth(credential);
            if let Some(body) = body.as_ref() {
                builder = builder.json(body);
            }

            let response = match builder.send().await {
                Ok(response) => response,
                Err(error) => {
                    if attempt < MAX_RETRIES && (error.is_connect() || error.is_timeout()) {
                        attempt += 1;
                        continue;
                    }
                    return Err(ApiError::Http(error));
                }
            };

            let status = response.status();
            if !status.is_success() {
                let text = response.text().await.unwrap_or_default();
                if attempt < MAX_RETRIES && is_transient_status(status) {
                    attempt += 1;
                    continue;
                }
                warn!(
                    %method,
                    path,
                    status = status.as_u16(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "request failed"
                );
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }

            let text = response.text().await.map_err(ApiError::Http)?;
            debug!(
                %method,
                path,
                status = status.as_u16(),
                duration_ms = start.elapsed().as_millis() as u64,
                "request completed"
            );

            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return Ok(serde_json::from_str(&text)?);
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Validate that a base URL is acceptable: absolute, http(s), with a host.
fn validate_base_url(base: &str) -> Result<(), ApiError> {
    let parsed = Url::parse(base).map_err(|error| ApiError::InvalidBaseUrl {
        url: base.to_string(),
        reason: error.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ApiError::InvalidBaseUrl {
            url: base.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    if parsed.host_str().is_none() {
        return Err(ApiError::InvalidBaseUrl {
            url: base.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(())
}
