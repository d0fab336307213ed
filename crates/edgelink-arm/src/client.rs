//! Request executor for the linked-resource control plane.
//!
//! Handles bearer-token injection, API-version query parameters, response
//! classification, and fixed-interval retries of idempotent reads.

use std::sync::Arc;

use log::{debug, warn};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::clock::{Clock, TokioClock};
use crate::transport::{ArmRequest, ArmResponse, HttpTransport, ReqwestTransport};
use crate::types::{
    is_transient_status, AccessToken, ApiProfile, ArmConfig, ArmError, ArmResult,
};

/// Control-plane client. Cheap to clone; all clones share transport and clock.
#[derive(Clone)]
pub struct ArmClient {
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    config: Arc<ArmConfig>,
    token: AccessToken,
}

impl ArmClient {
    /// Production client: `reqwest` transport and the tokio timer.
    pub fn new(config: ArmConfig, token: AccessToken) -> Self {
        Self::with_parts(
            config,
            token,
            Arc::new(ReqwestTransport::new()),
            Arc::new(TokioClock),
        )
    }

    pub fn with_parts(
        config: ArmConfig,
        token: AccessToken,
        transport: Arc<dyn HttpTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transport,
            clock,
            config: Arc::new(config),
            token,
        }
    }

    /// Same endpoint, refreshed token.
    pub fn with_token(&self, token: AccessToken) -> Self {
        Self {
            token,
            ..self.clone()
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn subscription_id(&self) -> &str {
        &self.config.subscription_id
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.access_token.is_empty() && !self.token.is_expired()
    }

    // ── URL / request builders ───────────────────────────────────────

    /// Absolute URIs (status URIs, `nextLink`s) pass through untouched;
    /// paths are joined onto the configured base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("https://") || path.starts_with("http://") {
            return path.to_string();
        }
        let base = self.config.base_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    fn query_for(&self, profile: ApiProfile) -> Vec<(String, String)> {
        let versions = &self.config.api_versions;
        match profile {
            ApiProfile::Bare => Vec::new(),
            ApiProfile::ControlPlane => {
                vec![("api-version".into(), versions.control_plane.clone())]
            }
            ApiProfile::ControlPlaneAndLinked => vec![
                ("api-version".into(), versions.control_plane.clone()),
                ("linked-api-version".into(), versions.linked.clone()),
            ],
            ApiProfile::Device => vec![("api-version".into(), versions.device.clone())],
        }
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        profile: ApiProfile,
        body: Option<&Value>,
    ) -> ArmResult<ArmRequest> {
        if self.token.access_token.is_empty() {
            return Err(ArmError::not_authenticated());
        }
        if self.token.is_expired() {
            warn!("Bearer token has expired; sending anyway");
        }
        let body = if method == Method::GET {
            None
        } else {
            Some(body.cloned().unwrap_or_else(|| json!({})))
        };
        Ok(ArmRequest {
            url: self.url(path),
            query: self.query_for(profile),
            bearer_token: self.token.access_token.clone(),
            method,
            body,
        })
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Single attempt. Any non-2xx status becomes an error carrying the body.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        profile: ApiProfile,
        body: Option<&Value>,
    ) -> ArmResult<ArmResponse> {
        let request = self.build_request(method, path, profile, body)?;
        debug!("{} {}", request.method, request.url);
        let resp = self.transport.send(request).await;
        if resp.is_success() {
            Ok(resp)
        } else {
            Err(ArmError::from_status(resp.status, &resp.body))
        }
    }

    /// GET with up to `retry.maxAttempts` attempts. Only status 0 and >= 500
    /// are retried; running out of attempts is a `Timeout`.
    pub async fn execute_with_retry(
        &self,
        path: &str,
        profile: ApiProfile,
    ) -> ArmResult<ArmResponse> {
        let policy = &self.config.retry;
        let mut last_status = 0;

        for attempt in 1..=policy.max_attempts {
            let request = self.build_request(Method::GET, path, profile, None)?;
            debug!("GET {} (attempt {}/{})", request.url, attempt, policy.max_attempts);
            let resp = self.transport.send(request).await;

            if resp.is_success() {
                return Ok(resp);
            }
            if !is_transient_status(resp.status) {
                return Err(ArmError::from_status(resp.status, &resp.body));
            }

            last_status = resp.status;
            if attempt < policy.max_attempts {
                warn!(
                    "ARM GET {} → {} - retrying in {}s",
                    path, resp.status, policy.interval_secs
                );
                self.clock.sleep(policy.interval()).await;
            }
        }

        Err(ArmError::timeout(format!(
            "GET {} still failing after {} attempts (last status {})",
            path, policy.max_attempts, last_status
        )))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        profile: ApiProfile,
    ) -> ArmResult<T> {
        self.execute(Method::GET, path, profile, None)
            .await?
            .parse_json()
    }

    pub async fn get_json_with_retry<T: DeserializeOwned>(
        &self,
        path: &str,
        profile: ApiProfile,
    ) -> ArmResult<T> {
        self.execute_with_retry(path, profile).await?.parse_json()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
