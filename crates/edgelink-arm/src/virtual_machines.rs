//! Virtual machines on the device: power actions, delete, resize, and the
//! data-disk / network-interface mutators.
//!
//! Every mutator reads the VM fresh, applies a policy from `mutations`,
//! PATCHes only the touched collection to the VM's own id, then polls.

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::{json, Value};

use crate::client::ArmClient;
use crate::disks;
use crate::linked;
use crate::mutations;
use crate::networking;
use crate::poller;
use crate::resource_id::{self, LinkedScope};
use crate::types::{
    resource_types, ApiProfile, ArmError, ArmResult, Disk, LinkedResourceRef, NetworkInterface,
    VirtualMachine,
};

/// How a VM is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Halt the guest but keep compute allocated.
    PowerOff,
    Deallocate,
}

impl StopMode {
    fn action(&self) -> &'static str {
        match self {
            Self::PowerOff => "powerOff",
            Self::Deallocate => "deallocate",
        }
    }
}

pub async fn get_vm(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
) -> ArmResult<VirtualMachine> {
    linked::get_resource(client, scope, vm_rg, resource_types::VIRTUAL_MACHINES, vm_name).await
}

// ── Power actions ───────────────────────────────────────────────────

async fn vm_action(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    action: &str,
) -> ArmResult<()> {
    let path = format!(
        "{}/{}",
        scope.resource_path(vm_rg, resource_types::VIRTUAL_MACHINES, vm_name),
        action
    );
    debug!("{}_vm({}/{}) → {}", action, vm_rg, vm_name, path);
    let resp = client
        .execute(Method::POST, &path, ApiProfile::ControlPlane, None)
        .await?;
    poller::await_operation(client, &resp, &format!("{action} vm {vm_name}")).await
}

pub async fn start_vm(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
) -> ArmResult<()> {
    vm_action(client, scope, vm_rg, vm_name, "start").await
}

pub async fn stop_vm(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    mode: StopMode,
) -> ArmResult<()> {
    vm_action(client, scope, vm_rg, vm_name, mode.action()).await
}

pub async fn restart_vm(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
) -> ArmResult<()> {
    vm_action(client, scope, vm_rg, vm_name, "restart").await
}

pub async fn delete_vm(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
) -> ArmResult<()> {
    let path = scope.resource_path(vm_rg, resource_types::VIRTUAL_MACHINES, vm_name);
    debug!("delete_vm({}/{}) → {}", vm_rg, vm_name, path);
    let resp = client
        .execute(Method::DELETE, &path, ApiProfile::ControlPlane, None)
        .await?;
    poller::await_operation(client, &resp, &format!("Delete vm {vm_name}")).await
}

// ── Mutators ────────────────────────────────────────────────────────

async fn patch_vm(client: &ArmClient, vm: &VirtualMachine, body: &Value, label: &str) -> ArmResult<()> {
    if vm.id.is_empty() {
        return Err(ArmError::validation(format!("VM {} carries no id", vm.name)));
    }
    debug!("PATCH {} ({})", vm.id, label);
    let resp = client
        .execute(Method::PATCH, &vm.id, ApiProfile::ControlPlane, Some(body))
        .await?;
    poller::await_operation(client, &resp, label).await
}

fn data_disks_patch(vm: &VirtualMachine) -> Value {
    json!({ "properties": { "storageProfile": { "dataDisks": vm.data_disks() } } })
}

fn network_interfaces_patch(vm: &VirtualMachine) -> Value {
    json!({ "properties": { "networkProfile": { "networkInterfaces": vm.network_interfaces() } } })
}

pub async fn attach_disk(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    disk_rg: &str,
    disk_name: &str,
    lun: u32,
) -> ArmResult<()> {
    let mut vm = get_vm(client, scope, vm_rg, vm_name).await?;
    let disk: Disk = disks::get_disk(client, scope, disk_rg, disk_name).await?;

    let local_id = resource_id::to_device_local_id(&disk.id)?;
    let name = if disk.name.is_empty() { disk_name } else { disk.name.as_str() };
    mutations::append_data_disk(
        &mut vm,
        mutations::new_attached_disk(lun, name, disk.size_gb(), &local_id, disk.sku_name()),
    );

    let label = format!("Attach disk {disk_name} to VM {vm_name}");
    patch_vm(client, &vm, &data_disks_patch(&vm), &label).await?;
    info!("Attached disk {}/{} to VM {}/{} at lun {}", disk_rg, disk_name, vm_rg, vm_name, lun);
    Ok(())
}

pub async fn detach_disk(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    disk_rg: &str,
    disk_name: &str,
) -> ArmResult<()> {
    let mut vm = get_vm(client, scope, vm_rg, vm_name).await?;
    if !mutations::remove_data_disk(&mut vm, disk_name, disk_rg) {
        warn!("Disk {}/{} is not attached to VM {}; nothing to detach", disk_rg, disk_name, vm_name);
        return Ok(());
    }

    let label = format!("Detach disk {disk_name} from VM {vm_name}");
    patch_vm(client, &vm, &data_disks_patch(&vm), &label).await?;
    info!("Detached disk {}/{} from VM {}/{}", disk_rg, disk_name, vm_rg, vm_name);
    Ok(())
}

pub async fn attach_nic(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    nic_rg: &str,
    nic_name: &str,
    primary: bool,
) -> ArmResult<()> {
    let mut vm = get_vm(client, scope, vm_rg, vm_name).await?;
    let nic: NetworkInterface = networking::get_nic(client, scope, nic_rg, nic_name).await?;

    let local_id = resource_id::to_device_local_id(&nic.id)?;
    mutations::attach_interface(&mut vm, &local_id, primary);

    let label = format!("Attach nic {nic_name} to VM {vm_name}");
    patch_vm(client, &vm, &network_interfaces_patch(&vm), &label).await?;
    info!("Attached nic {}/{} to VM {}/{} (primary: {})", nic_rg, nic_name, vm_rg, vm_name, primary);
    Ok(())
}

pub async fn detach_nic(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    nic_rg: &str,
    nic_name: &str,
) -> ArmResult<()> {
    let mut vm = get_vm(client, scope, vm_rg, vm_name).await?;
    if !mutations::detach_interface(&mut vm, nic_name, nic_rg)? {
        warn!("Nic {}/{} is not attached to VM {}; nothing to detach", nic_rg, nic_name, vm_name);
        return Ok(());
    }

    let label = format!("Detach nic {nic_name} from VM {vm_name}");
    patch_vm(client, &vm, &network_interfaces_patch(&vm), &label).await?;
    info!("Detached nic {}/{} from VM {}/{}", nic_rg, nic_name, vm_rg, vm_name);
    Ok(())
}

pub async fn set_primary_nic(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    nic_rg: &str,
    nic_name: &str,
) -> ArmResult<()> {
    let mut vm = get_vm(client, scope, vm_rg, vm_name).await?;
    if !mutations::set_primary_interface(&mut vm, nic_name, nic_rg) {
        warn!(
            "Nic {}/{} not made primary on VM {}: single interface or not attached",
            nic_rg, nic_name, vm_name
        );
        return Ok(());
    }

    let label = format!("Set nic {nic_name} as primary on VM {vm_name}");
    patch_vm(client, &vm, &network_interfaces_patch(&vm), &label).await
}

pub async fn resize_vm(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    vm_size: &str,
) -> ArmResult<()> {
    let vm = get_vm(client, scope, vm_rg, vm_name).await?;
    if vm.vm_size() == Some(vm_size) {
        warn!("VM {}/{} is already {}; skipping resize", vm_rg, vm_name, vm_size);
        return Ok(());
    }

    let body = json!({ "properties": { "hardwareProfile": { "vmSize": vm_size } } });
    patch_vm(client, &vm, &body, &format!("Resize vm {vm_name}")).await?;
    info!("Resized VM {}/{} to {}", vm_rg, vm_name, vm_size);
    Ok(())
}

// ── Dependents ──────────────────────────────────────────────────────

/// Data disks followed by the OS disk.
pub async fn attached_disks(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
) -> ArmResult<Vec<LinkedResourceRef>> {
    let vm = get_vm(client, scope, vm_rg, vm_name).await?;
    let mut refs = vm
        .data_disks()
        .iter()
        .map(|d| resource_id::parse_name_and_group(d.managed_disk_id()))
        .collect::<ArmResult<Vec<_>>>()?;
    if let Some(os_disk) = vm.os_disk_id() {
        refs.push(resource_id::parse_name_and_group(os_disk)?);
    }
    Ok(refs)
}

pub async fn attached_nics(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
) -> ArmResult<Vec<LinkedResourceRef>> {
    let vm = get_vm(client, scope, vm_rg, vm_name).await?;
    vm.network_interfaces()
        .iter()
        .map(|n| resource_id::parse_name_and_group(&n.id))
        .collect()
}

/// Delete the VM, then every disk it had, then every NIC it had.
pub async fn delete_vm_and_dependents(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
) -> ArmResult<()> {
    let vm_disks = attached_disks(client, scope, vm_rg, vm_name).await?;
    let vm_nics = attached_nics(client, scope, vm_rg, vm_name).await?;

    delete_vm(client, scope, vm_rg, vm_name).await?;
    for disk in &vm_disks {
        disks::delete_disk(client, scope, &disk.resource_group, &disk.name).await?;
    }
    for nic in &vm_nics {
        networking::delete_nic(client, scope, &nic.resource_group, &nic.name).await?;
    }
    info!(
        "Deleted VM {}/{} with {} disks and {} nics",
        vm_rg,
        vm_name,
        vm_disks.len(),
        vm_nics.len()
    );
    Ok(())
}

// ── Probes ──────────────────────────────────────────────────────────

pub async fn is_disk_attached(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    disk_rg: &str,
    disk_name: &str,
) -> ArmResult<bool> {
    let vm = get_vm(client, scope, vm_rg, vm_name).await?;
    Ok(mutations::has_data_disk(&vm, disk_name, disk_rg))
}

pub async fn is_nic_attached(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    nic_rg: &str,
    nic_name: &str,
) -> ArmResult<bool> {
    let vm = get_vm(client, scope, vm_rg, vm_name).await?;
    Ok(mutations::find_interface(&vm, nic_name, nic_rg).is_some())
}

/// Errors when the NIC is not attached at all.
pub async fn is_nic_primary(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    nic_rg: &str,
    nic_name: &str,
) -> ArmResult<bool> {
    let vm = get_vm(client, scope, vm_rg, vm_name).await?;
    mutations::find_interface(&vm, nic_name, nic_rg)
        .map(|n| n.is_primary())
        .ok_or_else(|| {
            ArmError::validation(format!("Nic {nic_rg}/{nic_name} is not attached to VM {vm_name}"))
        })
}

pub async fn is_vm_size(
    client: &ArmClient,
    scope: &LinkedScope,
    vm_rg: &str,
    vm_name: &str,
    vm_size: &str,
) -> ArmResult<bool> {
    let vm = get_vm(client, scope, vm_rg, vm_name).await?;
    Ok(vm.vm_size() == Some(vm_size))
}

// ─── Tests ──────────────────────────────────────────────────────────
