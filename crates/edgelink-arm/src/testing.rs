//! Deterministic transport and client harness for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::client::ArmClient;
use crate::clock::ManualClock;
use crate::transport::{ArmRequest, ArmResponse, HttpTransport};
use crate::types::{AccessToken, ArmConfig};

/// Replays queued responses in order and records every request.
///
/// Panics when a request arrives with nothing left in the queue.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<ArmResponse>>,
    requests: Mutex<Vec<ArmRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: ArmResponse) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    pub fn push_json(&self, status: u16, body: Value) -> &Self {
        self.push(ArmResponse::json(status, &body))
    }

    /// 202 carrying an `Azure-AsyncOperation` header.
    pub fn push_accepted(&self, status_uri: &str) -> &Self {
        self.push(ArmResponse::new(202, "").with_header("Azure-AsyncOperation", status_uri))
    }

    pub fn push_status(&self, status: &str) -> &Self {
        self.push_json(200, serde_json::json!({ "status": status }))
    }

    pub fn requests(&self) -> Vec<ArmRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Requests other than GET.
    pub fn mutations(&self) -> Vec<ArmRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method != Method::GET)
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ArmRequest) -> ArmResponse {
        let label = format!("{} {}", request.method, request.url);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        match self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            Some(resp) => resp,
            None => panic!("unscripted request: {label}"),
        }
    }
}

/// Default config pointed at a fake host.
pub fn test_config() -> ArmConfig {
    let mut config = ArmConfig::new("sub-1");
    config.base_url = "https://arm.test".into();
    config
}

/// Client over a fresh `ScriptedTransport` and `ManualClock`.
pub fn scripted_client(config: ArmConfig) -> (ArmClient, Arc<ScriptedTransport>, Arc<ManualClock>) {
    let transport = Arc::new(ScriptedTransport::new());
    let clock = Arc::new(ManualClock::new());
    let client = ArmClient::with_parts(
        config,
        AccessToken::new("test-token"),
        transport.clone(),
        clock.clone(),
    );
    (client, transport, clock)
}
