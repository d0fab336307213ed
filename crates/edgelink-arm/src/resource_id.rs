//! Resource identifiers: control-plane linked paths and device-local ids.
//!
//! A linked path addresses a device resource through the front-door service:
//!
//! ```text
//! /subscriptions/{sub}/resourcegroups/{rg}/providers/Microsoft.AzureStack
//!     /linkedSubscriptions/{lsid}/linkedResourceGroups/{lrg}
//!     /linkedProviders/{type}/{name}
//! ```
//!
//! The device-local form is everything after the provider marker with the
//! linking keys mapped back to plain ARM keys.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{resource_types, ArmError, ArmResult, LinkedResourceRef};

/// Provider segment that introduces the linking part of a path.
pub const LINKING_PROVIDER: &str = "Microsoft.AzureStack";

const LINKED_KEYS: [(&str, &str); 3] = [
    ("linkedSubscriptions", "subscriptions"),
    ("linkedResourceGroups", "resourceGroups"),
    ("linkedProviders", "providers"),
];

/// Control-plane id → device-local id.
pub fn to_device_local_id(control_plane_id: &str) -> ArmResult<String> {
    let lowered = control_plane_id.to_ascii_lowercase();
    let marker = LINKING_PROVIDER.to_ascii_lowercase();
    let start = lowered
        .find(&marker)
        .ok_or_else(|| ArmError::malformed_id(control_plane_id))?;
    let rest = &control_plane_id[start + LINKING_PROVIDER.len()..];

    let local = rest
        .split('/')
        .map(|segment| {
            LINKED_KEYS
                .iter()
                .find(|(linked, _)| segment.eq_ignore_ascii_case(linked))
                .map(|(_, plain)| *plain)
                .unwrap_or(segment)
        })
        .collect::<Vec<_>>()
        .join("/");
    Ok(local)
}

/// `(name, resourceGroup)` of the resource a device-local id points at.
/// With nested groups the last `resourceGroups/` segment wins.
pub fn parse_name_and_group(id: &str) -> ArmResult<LinkedResourceRef> {
    let re = Regex::new(r"(?i)^.*resourceGroups/([^/]*)/.*/([^/]*)$")
        .map_err(|e| ArmError::parse("resource id pattern", e))?;
    let caps = re.captures(id).ok_or_else(|| ArmError::malformed_id(id))?;
    let group = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let name = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    if group.is_empty() || name.is_empty() {
        return Err(ArmError::malformed_id(id));
    }
    Ok(LinkedResourceRef {
        name: name.to_string(),
        resource_group: group.to_string(),
    })
}

/// Linked resource group named in a control-plane path.
pub fn linked_resource_group(id: &str) -> ArmResult<String> {
    let re = Regex::new(r"(?i)linkedResourceGroups/([^/]*)")
        .map_err(|e| ArmError::parse("resource id pattern", e))?;
    re.captures(id)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|g| !g.is_empty())
        .ok_or_else(|| ArmError::malformed_id(id))
}

/// Path of the edge device resource in the front-door subscription.
pub fn device_path(subscription_id: &str, resource_group: &str, device_name: &str) -> String {
    format!(
        "/subscriptions/{}/resourcegroups/{}/providers/{}/{}",
        subscription_id,
        resource_group,
        resource_types::EDGE_DEVICES,
        device_name
    )
}

/// Everything needed to address resources on one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedScope {
    pub subscription_id: String,
    /// Front-door resource group holding the device resource.
    pub resource_group: String,
    /// Device-side subscription from the device's edge profile.
    pub linked_subscription_id: String,
}

impl LinkedScope {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        linked_subscription_id: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            linked_subscription_id: linked_subscription_id.into(),
        }
    }

    pub fn subscription_path(&self) -> String {
        format!(
            "/subscriptions/{}/resourcegroups/{}/providers/{}/linkedSubscriptions/{}",
            self.subscription_id, self.resource_group, LINKING_PROVIDER, self.linked_subscription_id
        )
    }

    pub fn resource_group_path(&self, linked_rg: &str) -> String {
        format!("{}/linkedResourceGroups/{}", self.subscription_path(), linked_rg)
    }

    /// All linked resources of `resource_type` across the device.
    pub fn provider_path(&self, resource_type: &str) -> String {
        format!("{}/linkedProviders/{}", self.subscription_path(), resource_type)
    }

    pub fn resource_path(&self, linked_rg: &str, resource_type: &str, name: &str) -> String {
        format!(
            "{}/linkedProviders/{}/{}",
            self.resource_group_path(linked_rg),
            resource_type,
            name
        )
    }

    /// Subscription-scoped when `linked_rg` is `None`.
    pub fn deployment_path(&self, linked_rg: Option<&str>, name: &str) -> String {
        let base = match linked_rg {
            Some(rg) => self.resource_group_path(rg),
            None => self.subscription_path(),
        };
        format!("{}/linkedProviders/{}/{}", base, resource_types::DEPLOYMENTS, name)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
