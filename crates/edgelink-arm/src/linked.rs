//! Device discovery and read-only access to linked resources.

use log::{debug, info};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::ArmClient;
use crate::poller;
use crate::resource_id::{self, device_path, LinkedScope};
use crate::types::{
    resource_types, ApiProfile, ArmError, ArmList, ArmResource, ArmResult, DefaultVirtualNetwork,
    EdgeDevice, VirtualNetwork,
};

// ── Device ──────────────────────────────────────────────────────────

pub async fn get_device(
    client: &ArmClient,
    resource_group: &str,
    device_name: &str,
) -> ArmResult<EdgeDevice> {
    let path = device_path(client.subscription_id(), resource_group, device_name);
    debug!("get_device({}/{}) → {}", resource_group, device_name, path);
    client.get_json_with_retry(&path, ApiProfile::Device).await
}

/// Device-side subscription from the device's edge profile.
pub fn linked_subscription_id(device: &EdgeDevice) -> ArmResult<String> {
    device
        .properties
        .edge_profile
        .as_ref()
        .and_then(|p| p.subscription.as_ref())
        .and_then(|s| s.subscription_id.clone())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ArmError::validation(format!(
                "Device {} has no linked subscription in its edge profile",
                device.name
            ))
        })
}

/// Look the device up and build the scope for everything on it.
pub async fn resolve_scope(
    client: &ArmClient,
    resource_group: &str,
    device_name: &str,
) -> ArmResult<LinkedScope> {
    let device = get_device(client, resource_group, device_name).await?;
    let linked = linked_subscription_id(&device)?;
    info!("Device {} is linked to subscription {}", device_name, linked);
    Ok(LinkedScope::new(
        client.subscription_id(),
        resource_group,
        linked,
    ))
}

// ── Reads ───────────────────────────────────────────────────────────

/// Plain read of one linked resource.
pub async fn get_resource<T: DeserializeOwned>(
    client: &ArmClient,
    scope: &LinkedScope,
    linked_rg: &str,
    resource_type: &str,
    name: &str,
) -> ArmResult<T> {
    let path = scope.resource_path(linked_rg, resource_type, name);
    debug!("get_resource({}/{}) → {}", linked_rg, name, path);
    client.get_json(&path, ApiProfile::ControlPlane).await
}

pub async fn get_linked_resource_group(
    client: &ArmClient,
    scope: &LinkedScope,
    linked_rg: &str,
) -> ArmResult<Value> {
    let path = scope.resource_group_path(linked_rg);
    client
        .get_json_with_retry(&path, ApiProfile::ControlPlane)
        .await
}

async fn collect_pages<T: DeserializeOwned>(client: &ArmClient, path: &str) -> ArmResult<Vec<T>> {
    let mut items = Vec::new();
    let mut next = Some(path.to_string());
    let mut profile = ApiProfile::ControlPlane;
    while let Some(url) = next.take() {
        let page: ArmList<T> = client.get_json_with_retry(&url, profile).await?;
        items.extend(page.value);
        next = page.next_link.filter(|l| !l.is_empty());
        // nextLink already embeds its query.
        profile = ApiProfile::Bare;
    }
    Ok(items)
}

/// Every linked resource of `resource_type` on the device.
pub async fn list_linked_resources<T: DeserializeOwned>(
    client: &ArmClient,
    scope: &LinkedScope,
    resource_type: &str,
) -> ArmResult<Vec<T>> {
    collect_pages(client, &scope.provider_path(resource_type)).await
}

/// Every resource inside one linked resource group.
pub async fn list_resource_group_resources(
    client: &ArmClient,
    scope: &LinkedScope,
    linked_rg: &str,
) -> ArmResult<Vec<ArmResource>> {
    let path = format!("{}/resources", scope.resource_group_path(linked_rg));
    collect_pages(client, &path).await
}

/// First virtual network on the device with its first subnet.
pub async fn default_virtual_network(
    client: &ArmClient,
    scope: &LinkedScope,
) -> ArmResult<DefaultVirtualNetwork> {
    let vnets: Vec<VirtualNetwork> =
        list_linked_resources(client, scope, resource_types::VIRTUAL_NETWORKS).await?;
    let vnet = vnets
        .into_iter()
        .next()
        .ok_or_else(|| ArmError::validation("No virtual network found on the device"))?;
    let subnet = vnet
        .properties
        .subnets
        .first()
        .map(|s| s.name.clone())
        .ok_or_else(|| {
            ArmError::validation(format!("Virtual network {} has no subnets", vnet.name))
        })?;
    let resource_group = resource_id::linked_resource_group(&vnet.id)?;
    Ok(DefaultVirtualNetwork {
        name: vnet.name,
        resource_group,
        subnet_name: subnet,
    })
}

// ── Resource groups ─────────────────────────────────────────────────

/// Delete a linked resource group and everything in it.
pub async fn delete_linked_resource_group(
    client: &ArmClient,
    scope: &LinkedScope,
    linked_rg: &str,
) -> ArmResult<()> {
    let path = scope.resource_group_path(linked_rg);
    debug!("delete_linked_resource_group({}) → {}", linked_rg, path);
    let resp = client
        .execute(Method::DELETE, &path, ApiProfile::ControlPlaneAndLinked, None)
        .await?;
    let timeout = client.config().polling.resource_group_delete_timeout();
    poller::await_completion(
        client,
        &resp,
        &format!("Delete linked resource group {linked_rg}"),
        timeout,
    )
    .await
}

// ─── Tests ──────────────────────────────────────────────────────────
