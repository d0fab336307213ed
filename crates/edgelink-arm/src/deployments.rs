//! Template deployments on the device.
//!
//! A deployment is PUT to its own linked path and polled with the long
//! deployment timeout. When polling times out, the deployment resource is read
//! once more: its own `provisioningState` is authoritative, since the status
//! endpoint can stall while the deployment itself completes.

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::{json, Value};

use crate::client::ArmClient;
use crate::mutations::short_uuid;
use crate::poller;
use crate::resource_id::LinkedScope;
use crate::types::{ApiProfile, ArmError, ArmResult, Deployment};

/// Where a deployment lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentTarget {
    /// Into an existing linked resource group.
    ResourceGroup(String),
    /// At device-subscription level; these carry a location.
    Subscription { location: String },
}

impl DeploymentTarget {
    fn linked_rg(&self) -> Option<&str> {
        match self {
            Self::ResourceGroup(rg) => Some(rg.as_str()),
            Self::Subscription { .. } => None,
        }
    }

    fn location(&self) -> Option<&str> {
        match self {
            Self::ResourceGroup(_) => None,
            Self::Subscription { location } => Some(location.as_str()),
        }
    }
}

/// `deployment` plus the first group of a fresh UUID.
pub fn generate_deployment_name() -> String {
    format!("deployment{}", short_uuid())
}

/// Merge a template and a parameters document into a deployment body.
///
/// The parameters document may be a full parameters file (its `parameters`
/// member is used) or the bare parameters object.
pub fn build_deployment_envelope(
    template: &Value,
    parameters: Option<&Value>,
    location: Option<&str>,
) -> Value {
    let parameters = match parameters {
        Some(doc) => doc.get("parameters").cloned().unwrap_or_else(|| doc.clone()),
        None => json!({}),
    };
    let mut envelope = json!({
        "properties": {
            "template": template,
            "parameters": parameters,
            "mode": "Incremental",
        }
    });
    if let Some(location) = location.filter(|l| !l.is_empty()) {
        envelope["location"] = json!(location);
    }
    envelope
}

/// Submit `envelope` and drive it to completion. Returns the deployment name.
pub async fn deploy(
    client: &ArmClient,
    scope: &LinkedScope,
    target: &DeploymentTarget,
    envelope: &Value,
    deployment_name: Option<&str>,
) -> ArmResult<String> {
    let name = deployment_name
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_deployment_name);
    let path = scope.deployment_path(target.linked_rg(), &name);
    debug!("deploy({}) → {}", name, path);

    let resp = client
        .execute(Method::PUT, &path, ApiProfile::ControlPlane, Some(envelope))
        .await?;

    let timeout = client.config().polling.deployment_timeout();
    let label = format!("Deployment {name}");
    match poller::await_completion(client, &resp, &label, timeout).await {
        Ok(()) => {}
        Err(e) if e.is_timeout() => {
            warn!("{} polling timed out; checking the deployment directly", label);
            let deployment: Deployment = client
                .get_json_with_retry(&path, ApiProfile::ControlPlane)
                .await?;
            let state = deployment.properties.provisioning_state.unwrap_or_default();
            if !state.eq_ignore_ascii_case("Succeeded") {
                return Err(ArmError::timeout(format!(
                    "{} did not succeed (provisioningState: {}): {}",
                    label,
                    if state.is_empty() { "unknown" } else { state.as_str() },
                    e.message
                )));
            }
        }
        Err(e) => return Err(e),
    }

    info!("Deployment {} succeeded", name);
    Ok(name)
}

/// Build the envelope for `target` and deploy it.
pub async fn deploy_template(
    client: &ArmClient,
    scope: &LinkedScope,
    target: &DeploymentTarget,
    template: &Value,
    parameters: Option<&Value>,
    deployment_name: Option<&str>,
) -> ArmResult<String> {
    let envelope = build_deployment_envelope(template, parameters, target.location());
    deploy(client, scope, target, &envelope, deployment_name).await
}

// ─── Tests ──────────────────────────────────────────────────────────
