//! Managed disks on the device.

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::json;

use crate::client::ArmClient;
use crate::linked;
use crate::poller;
use crate::resource_id::LinkedScope;
use crate::types::{resource_types, ApiProfile, ArmError, ArmResult, Disk};

pub async fn get_disk(
    client: &ArmClient,
    scope: &LinkedScope,
    disk_rg: &str,
    disk_name: &str,
) -> ArmResult<Disk> {
    linked::get_resource(client, scope, disk_rg, resource_types::DISKS, disk_name).await
}

/// Create an empty managed disk.
pub async fn create_managed_disk(
    client: &ArmClient,
    scope: &LinkedScope,
    disk_rg: &str,
    disk_name: &str,
    size_gb: i64,
) -> ArmResult<()> {
    if size_gb <= 0 {
        return Err(ArmError::validation(format!(
            "Disk size must be positive, got {size_gb} GB"
        )));
    }
    let path = scope.resource_path(disk_rg, resource_types::DISKS, disk_name);
    let body = json!({
        "location": client.config().default_location,
        "properties": {
            "diskSizeGB": size_gb,
            "creationData": { "createOption": "Empty" }
        }
    });
    debug!("create_managed_disk({}/{}) → {}", disk_rg, disk_name, path);
    let resp = client
        .execute(Method::PUT, &path, ApiProfile::ControlPlane, Some(&body))
        .await?;
    poller::await_operation(client, &resp, &format!("Create disk {disk_name}")).await?;
    info!("Created disk {}/{} of {} GB", disk_rg, disk_name, size_gb);
    Ok(())
}

pub async fn delete_disk(
    client: &ArmClient,
    scope: &LinkedScope,
    disk_rg: &str,
    disk_name: &str,
) -> ArmResult<()> {
    let path = scope.resource_path(disk_rg, resource_types::DISKS, disk_name);
    debug!("delete_disk({}/{}) → {}", disk_rg, disk_name, path);
    let resp = client
        .execute(Method::DELETE, &path, ApiProfile::ControlPlane, None)
        .await?;
    poller::await_operation(client, &resp, &format!("Delete disk {disk_name}")).await
}

/// Skips the write when the disk is already `size_gb`.
pub async fn resize_disk(
    client: &ArmClient,
    scope: &LinkedScope,
    disk_rg: &str,
    disk_name: &str,
    size_gb: i64,
) -> ArmResult<()> {
    let disk = get_disk(client, scope, disk_rg, disk_name).await?;
    if disk.size_gb() == Some(size_gb) {
        warn!("Disk {}/{} is already {} GB; skipping resize", disk_rg, disk_name, size_gb);
        return Ok(());
    }
    if disk.id.is_empty() {
        return Err(ArmError::validation(format!("Disk {disk_name} carries no id")));
    }

    let body = json!({ "properties": { "diskSizeGB": size_gb } });
    let resp = client
        .execute(Method::PATCH, &disk.id, ApiProfile::ControlPlane, Some(&body))
        .await?;
    poller::await_operation(client, &resp, &format!("Resize disk {disk_name}")).await?;
    info!("Resized disk {}/{} to {} GB", disk_rg, disk_name, size_gb);
    Ok(())
}

pub async fn is_disk_size(
    client: &ArmClient,
    scope: &LinkedScope,
    disk_rg: &str,
    disk_name: &str,
    size_gb: i64,
) -> ArmResult<bool> {
    let disk = get_disk(client, scope, disk_rg, disk_name).await?;
    Ok(disk.size_gb() == Some(size_gb))
}
