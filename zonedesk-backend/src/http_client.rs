//! Shared HTTP plumbing for remote backends.
//!
//! Sends a prepared request, logs it, classifies transport failures into
//! [`BackendError`]s and retries the idempotent ones. Envelope decoding stays
//! with each adapter.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::{BackendError, ModuleConfigError};
use crate::utils::log_sanitizer::truncate_for_log;

/// Default TCP connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Default whole-request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default number of retries for idempotent requests.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Upper bound on a server-requested `Retry-After` wait.
const MAX_RETRY_AFTER_SECS: u64 = 30;
/// Upper bound on the exponential backoff delay.
const MAX_BACKOFF_MS: u64 = 10_000;

/// Timeouts and retry budget of one remote backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportPolicy {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Build the reqwest client for a backend.
pub fn create_http_client(
    module: &str,
    policy: &TransportPolicy,
) -> Result<Client, ModuleConfigError> {
    Client::builder()
        .connect_timeout(policy.connect_timeout)
        .timeout(policy.request_timeout)
        .build()
        .map_err(|e| ModuleConfigError::InvalidFormat {
            module: module.to_string(),
            field: "http_client".to_string(),
            reason: e.to_string(),
        })
}

/// HTTP helper functions.
pub struct HttpUtils;

impl HttpUtils {
    /// Send one request and return `(status, body)`.
    ///
    /// HTTP 429 becomes [`BackendError::RateLimited`] and 502–504 become
    /// [`BackendError::NetworkError`]; any other status is handed back so the
    /// adapter can read the envelope.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        backend: &str,
        method: &Method,
        url: &str,
    ) -> Result<(u16, String), BackendError> {
        log::debug!("[{backend}] {method} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout {
                    backend: backend.to_string(),
                    detail: e.to_string(),
                }
            } else {
                BackendError::NetworkError {
                    backend: backend.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[{backend}] Response Status: {status}");

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        if status == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{backend}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(BackendError::RateLimited {
                backend: backend.to_string(),
                retry_after,
                raw_message: Some(body),
            });
        }

        if matches!(status, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{backend}] Upstream unavailable (HTTP {status})");
            return Err(BackendError::NetworkError {
                backend: backend.to_string(),
                detail: format!("HTTP {status}: {}", truncate_for_log(&body)),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::NetworkError {
                backend: backend.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("[{backend}] Response Body: {}", truncate_for_log(&body));

        Ok((status, body))
    }

    /// Send a request, retrying transient failures if `method` is idempotent.
    ///
    /// Only GET and DELETE are retried; a PUT or POST whose response was lost
    /// may already have taken effect, so they are sent exactly once.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        backend: &str,
        method: &Method,
        url: &str,
        max_retries: u32,
    ) -> Result<(u16, String), BackendError> {
        if max_retries == 0 || !is_idempotent(method) {
            return Self::execute_request(request_builder, backend, method, url).await;
        }

        let mut attempt = 0;
        loop {
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[{backend}] Request body is not replayable, sending once");
                return Self::execute_request(request_builder, backend, method, url).await;
            };

            match Self::execute_request(req, backend, method, url).await {
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    attempt += 1;
                    log::warn!(
                        "[{backend}] {method} {url} failed (attempt {attempt}/{max_retries}), retrying in {:.1}s: {e}",
                        delay.as_secs_f32()
                    );
                    tokio::time::sleep(delay).await;
                }
                result => return result,
            }
        }
    }

    /// Decode a JSON response body.
    pub fn parse_json<T>(body: &str, backend: &str) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(body).map_err(|e| {
            log::error!("[{backend}] JSON parse failed: {e}");
            log::error!("[{backend}] Raw response: {}", truncate_for_log(body));
            BackendError::ParseError {
                backend: backend.to_string(),
                detail: e.to_string(),
            }
        })
    }
}

fn is_idempotent(method: &Method) -> bool {
    *method == Method::GET || *method == Method::DELETE
}

/// Wait before the next attempt: `Retry-After` when the server sent one,
/// exponential backoff otherwise.
fn retry_delay(error: &BackendError, attempt: u32) -> Duration {
    match error {
        BackendError::RateLimited {
            retry_after: Some(secs),
            ..
        } => Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS)),
        _ => backoff_delay(attempt),
    }
}

/// 100ms, 200ms, 400ms, ... capped at 10s.
fn backoff_delay(attempt: u32) -> Duration {
    let shift = attempt.min(20);
    let delay_ms = 100_u64.saturating_mul(1_u64 << shift);
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}
