use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT},
    Client, StatusCode,
};
use serde_json::Value;
use thiserror::Error;

use crate::constants::{REQUEST_TIMEOUT, USER_AGENT};
use crate::sink::DiagnosticsSink;

/// Classified outcome of a failed upstream request.
///
/// Operations collapse these to a generic user-facing message; the specific
/// kind survives only on the diagnostic channel.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout")]
    Timeout,
    #[error("HTTP error {0}")]
    Status(u16),
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Source of upstream weather payloads.
///
/// The one production implementation is [`NwsClient`]; tests substitute
/// canned payloads through this seam.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, url: &str, sink: &dyn DiagnosticsSink) -> Result<Value, FetchError>;
}

/// HTTP client for the National Weather Service API.
///
/// Configured once: fixed user agent, geo-JSON accept header, 30-second
/// timeout, redirects followed transparently. Each call is a single attempt;
/// there is no retry or caching layer.
#[derive(Debug, Clone)]
pub struct NwsClient {
    http: Client,
}

impl NwsClient {
    pub fn new() -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/geo+json"));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http })
    }

    async fn get_json(&self, url: &str) -> Result<(StatusCode, Value), FetchError> {
        let response = self.http.get(url).send().await.map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(classify_body_error)?;

        Ok((status, payload))
    }
}

#[async_trait]
impl WeatherSource for NwsClient {
    async fn fetch(&self, url: &str, sink: &dyn DiagnosticsSink) -> Result<Value, FetchError> {
        sink.debug(&format!("Making NWS API request to: {url}")).await;
        tracing::debug!("Making request to NWS API: {url}");

        match self.get_json(url).await {
            Ok((status, payload)) => {
                sink.debug(&format!("NWS API request successful, status: {status}"))
                    .await;
                tracing::debug!("NWS API request successful: {status}");
                Ok(payload)
            }
            Err(err) => {
                sink.error(&format!("{err} for URL: {url}")).await;
                tracing::error!("NWS API request failed: {err}");
                Err(err)
            }
        }
    }
}

fn classify_send_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if err.is_builder() {
        FetchError::Unexpected(err.to_string())
    } else {
        // DNS, connect, TLS, reset, redirect policy: all network faults.
        FetchError::Network(err)
    }
}

fn classify_body_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Unexpected(err.to_string())
    }
}
