//! HTTP transport seam.
//!
//! Everything above this module speaks in `ArmRequest` / `ArmResponse`.
//! A transport never fails: a request that produced no response comes back
//! with status 0 and an empty body, so classification happens in one place.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::types::{ArmError, ArmResult};

/// A fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct ArmRequest {
    pub method: Method,
    /// Absolute URL, without query string parameters added by the client.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub bearer_token: String,
    pub body: Option<Value>,
}

impl ArmRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// What came back. Status 0 means no response at all.
#[derive(Debug, Clone, Default)]
pub struct ArmResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ArmResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Response with a serialised JSON body.
    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    /// Transport-level failure.
    pub fn no_response() -> Self {
        Self::new(0, "")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup; empty values are treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn parse_json<T: DeserializeOwned>(&self) -> ArmResult<T> {
        serde_json::from_str(&self.body).map_err(|e| ArmError::parse("JSON parse", e))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ArmRequest) -> ArmResponse;
}

/// Production transport over `reqwest`.
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_client(http: Client) -> Self {
        Self { http }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ArmRequest) -> ArmResponse {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .bearer_auth(&request.bearer_token)
            .query(&request.query);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                debug!("{} {} → no response: {}", request.method, request.url, e);
                return ArmResponse::no_response();
            }
        };

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = resp.text().await.unwrap_or_default();
        ArmResponse {
            status,
            headers,
            body,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
