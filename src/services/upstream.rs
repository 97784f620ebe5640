//! Shared HTTP client for upstream APIs
//!
//! All domain sync services fetch through this client. It owns the timeout
//! and the retry-with-exponential-backoff loop; callers own persistence.
//! Upstream status codes are translated into the local error taxonomy so
//! retry logic can pattern-match on kind instead of string-matching
//! messages.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    /// 5xx, timeout or connection failure — retryable
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    /// HTTP 429 — retryable after backoff
    #[error("upstream rate limited (HTTP 429)")]
    RateLimited,
    /// HTTP 401 — misconfiguration, never retried
    #[error("upstream auth error (HTTP 401): {0}")]
    Auth(String),
    /// Any other 4xx — fatal for this request
    #[error("upstream rejected request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
    /// Body did not match the expected shape
    #[error("unexpected upstream payload: {0}")]
    Payload(String),
}

impl UpstreamError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, UpstreamError::Unavailable(_) | UpstreamError::RateLimited)
    }
}

/// Translate an upstream HTTP status into the local error kind.
/// Success statuses return None.
pub fn classify_status(status: StatusCode, body: &str) -> Option<UpstreamError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED => UpstreamError::Auth(truncate(body, 200)),
        StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited,
        s if s.is_server_error() => {
            UpstreamError::Unavailable(format!("HTTP {}: {}", s.as_u16(), truncate(body, 200)))
        }
        s => UpstreamError::Rejected {
            status: s.as_u16(),
            body: truncate(body, 200),
        },
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max])
    }
}

#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    retry_max: u32,
}

impl UpstreamClient {
    pub fn new(timeout_secs: u64, retry_max: u32) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, retry_max }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// GET a JSON body with retry. Retries only retryable error kinds, with
    /// 2^attempt seconds of backoff between attempts.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let body = self.get_with_retry(url, query).await?;
        serde_json::from_str(&body).map_err(|e| UpstreamError::Payload(e.to_string()))
    }

    /// GET a raw text body with retry (scraper targets).
    pub async fn get_text(&self, url: &str) -> Result<String, UpstreamError> {
        self.get_with_retry(url, &[]).await
    }

    async fn get_with_retry(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<String, UpstreamError> {
        let mut attempt = 0;
        loop {
            match self.get_once(url, query).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.retry_max => {
                    let delay = Duration::from_secs(2u64.pow(attempt));
                    tracing::warn!(
                        "Fetch attempt {}/{} failed for {}: {}. Retrying in {:?}",
                        attempt + 1,
                        self.retry_max + 1,
                        url,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once(&self, url: &str, query: &[(&str, String)]) -> Result<String, UpstreamError> {
        let response = self
            .client
            .get(url)
            .header("accept", "application/json, text/html")
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        match classify_status(status, &body) {
            Some(err) => Err(err),
            None => Ok(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_success_is_none() {
        assert!(classify_status(StatusCode::OK, "ok").is_none());
        assert!(classify_status(StatusCode::CREATED, "").is_none());
    }

    #[test]
    fn test_classify_401_is_fatal_auth() {
        let err = classify_status(StatusCode::UNAUTHORIZED, "bad key").unwrap();
        assert!(matches!(err, UpstreamError::Auth(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_classify_429_is_retryable() {
        let err = classify_status(StatusCode::TOO_MANY_REQUESTS, "").unwrap();
        assert!(matches!(err, UpstreamError::RateLimited));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_5xx_is_retryable() {
        let err = classify_status(StatusCode::BAD_GATEWAY, "upstream down").unwrap();
        assert!(matches!(err, UpstreamError::Unavailable(_)));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_classify_other_4xx_is_fatal() {
        let err = classify_status(StatusCode::NOT_FOUND, "no such resource").unwrap();
        match err {
            UpstreamError::Rejected { status, .. } => assert_eq!(status, 404),
            other => panic!("expected Rejected, got {:?}", other),
        }
        assert!(!classify_status(StatusCode::NOT_FOUND, "").unwrap().is_retryable());
    }

    #[test]
    fn test_truncate_long_body() {
        let body = "x".repeat(500);
        let err = classify_status(StatusCode::BAD_REQUEST, &body).unwrap();
        match err {
            UpstreamError::Rejected { body, .. } => assert!(body.len() < 250),
            other => panic!("expected Rejected, got {:?}", other),
        }
    }
}
