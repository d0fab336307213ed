//! Long-running operation polling.
//!
//! An asynchronous mutation answers with a status URI in either the
//! `Azure-AsyncOperation` or the `Location` header. The poller sleeps one
//! interval, reads that URI through the retrying executor, and repeats until
//! the reported status is terminal or the deadline passes.

use std::time::Duration;

use log::{debug, info};

use crate::client::ArmClient;
use crate::transport::ArmResponse;
use crate::types::{ApiProfile, ArmError, ArmResult, OperationStatus};

pub const ASYNC_OPERATION_HEADER: &str = "Azure-AsyncOperation";
pub const LOCATION_HEADER: &str = "Location";

/// Outcome of one status read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollTick {
    Continue,
    Succeeded,
    Failed(Option<String>),
}

/// Poll target carried by an initiating response.
pub fn status_uri(resp: &ArmResponse) -> ArmResult<String> {
    resp.header(ASYNC_OPERATION_HEADER)
        .or_else(|| resp.header(LOCATION_HEADER))
        .map(|v| v.trim().to_string())
        .ok_or_else(|| {
            ArmError::protocol(format!(
                "Response (HTTP {}) carries neither {} nor {} header",
                resp.status, ASYNC_OPERATION_HEADER, LOCATION_HEADER
            ))
        })
}

fn classify(body: &str) -> ArmResult<PollTick> {
    if body.trim().is_empty() {
        return Ok(PollTick::Continue);
    }
    let status: OperationStatus =
        serde_json::from_str(body).map_err(|e| ArmError::parse("operation status", e))?;
    Ok(match status.status.as_deref() {
        Some(s) if s.eq_ignore_ascii_case("Succeeded") => PollTick::Succeeded,
        Some(s) if s.eq_ignore_ascii_case("Failed") => {
            PollTick::Failed(status.error.and_then(|e| e.message))
        }
        _ => PollTick::Continue,
    })
}

async fn tick(client: &ArmClient, uri: &str) -> ArmResult<PollTick> {
    match client.execute_with_retry(uri, ApiProfile::Bare).await {
        Ok(resp) => classify(&resp.body),
        // The status resource may not exist yet.
        Err(e) if e.is_not_found_code() => {
            debug!("poll {} → NotFound, still waiting", uri);
            Ok(PollTick::Continue)
        }
        Err(e) => Err(e),
    }
}

/// Drive the operation started by `initiating` to a terminal state.
pub async fn await_completion(
    client: &ArmClient,
    initiating: &ArmResponse,
    label: &str,
    timeout: Duration,
) -> ArmResult<()> {
    let uri = status_uri(initiating)?;
    let interval = client.config().polling.interval();
    let clock = client.clock();
    let started = clock.now();
    debug!("await_completion({}) → {}", label, uri);

    while clock.now().duration_since(started) < timeout {
        clock.sleep(interval).await;
        match tick(client, &uri).await? {
            PollTick::Continue => {}
            PollTick::Succeeded => {
                info!("{} succeeded", label);
                return Ok(());
            }
            PollTick::Failed(detail) => {
                return Err(ArmError::operation_failed(label, detail.as_deref()));
            }
        }
    }

    Err(ArmError::timeout(format!(
        "{} did not finish within {}s",
        label,
        timeout.as_secs()
    )))
}

/// `await_completion` with the configured default operation timeout.
pub async fn await_operation(
    client: &ArmClient,
    initiating: &ArmResponse,
    label: &str,
) -> ArmResult<()> {
    let timeout = client.config().polling.operation_timeout();
    await_completion(client, initiating, label, timeout).await
}

// ─── Tests ──────────────────────────────────────────────────────────
