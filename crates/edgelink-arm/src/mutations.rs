//! Collection policies applied to a freshly fetched composite resource.
//!
//! Everything here is pure: the callers in `virtual_machines` and
//! `networking` fetch, apply one of these, then PATCH/PUT and poll.
//! Name and resource-group matching is substring containment on the
//! identifier string.

use serde_json::{json, Value};
use uuid::Uuid;

use crate::types::{
    ArmError, ArmResult, DataDisk, IpAllocation, ManagedDiskRef, NetworkInterface,
    NetworkInterfaceRef, VirtualMachine,
};

/// Data-disk entry for attaching an existing managed disk.
pub fn new_attached_disk(
    lun: u32,
    name: &str,
    size_gb: Option<i64>,
    local_disk_id: &str,
    storage_account_type: Option<&str>,
) -> DataDisk {
    DataDisk {
        lun,
        name: Some(name.to_string()),
        create_option: Some("Attach".into()),
        caching: Some("None".into()),
        disk_size_gb: size_gb,
        managed_disk: Some(ManagedDiskRef {
            id: local_disk_id.to_string(),
            storage_account_type: storage_account_type.map(str::to_string),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Appends without checking for a duplicate lun; the service arbitrates.
pub fn append_data_disk(vm: &mut VirtualMachine, disk: DataDisk) {
    vm.data_disks_mut().push(disk);
}

fn disk_matches(disk: &DataDisk, name: &str, resource_group: &str) -> bool {
    disk.name.as_deref() == Some(name) && disk.managed_disk_id().contains(resource_group)
}

fn nic_matches(nic: &NetworkInterfaceRef, name: &str, resource_group: &str) -> bool {
    nic.id.contains(name) && nic.id.contains(resource_group)
}

/// Removes the matching data disk. Returns whether anything was removed.
pub fn remove_data_disk(vm: &mut VirtualMachine, name: &str, resource_group: &str) -> bool {
    let disks = vm.data_disks_mut();
    match disks.iter().position(|d| disk_matches(d, name, resource_group)) {
        Some(idx) => {
            disks.remove(idx);
            true
        }
        None => false,
    }
}

pub fn has_data_disk(vm: &VirtualMachine, name: &str, resource_group: &str) -> bool {
    vm.data_disks()
        .iter()
        .any(|d| disk_matches(d, name, resource_group))
}

pub fn find_interface<'a>(
    vm: &'a VirtualMachine,
    name: &str,
    resource_group: &str,
) -> Option<&'a NetworkInterfaceRef> {
    vm.network_interfaces()
        .iter()
        .find(|n| nic_matches(n, name, resource_group))
}

/// Appends a new interface and adjusts existing primary flags so that a
/// multi-interface VM ends up with exactly one primary.
pub fn attach_interface(vm: &mut VirtualMachine, local_nic_id: &str, primary: bool) {
    let nics = vm.network_interfaces_mut();
    match nics.len() {
        0 => {}
        1 => nics[0].set_primary(!primary),
        _ if primary => nics.iter_mut().for_each(|n| n.set_primary(false)),
        _ => {}
    }
    nics.push(NetworkInterfaceRef::new(local_nic_id, primary));
}

/// Removes the matching interface. Refuses to remove the last one or the
/// primary one. Returns whether anything was removed.
pub fn detach_interface(
    vm: &mut VirtualMachine,
    name: &str,
    resource_group: &str,
) -> ArmResult<bool> {
    let vm_name = vm.name.clone();
    let nics = vm.network_interfaces_mut();
    if nics.len() == 1 {
        return Err(ArmError::invariant(format!(
            "VM {vm_name} has only one network interface; it cannot be detached"
        )));
    }
    let Some(idx) = nics.iter().position(|n| nic_matches(n, name, resource_group)) else {
        return Ok(false);
    };
    if nics[idx].is_primary() {
        return Err(ArmError::invariant(format!(
            "Network interface {name} is primary on VM {vm_name}; make another interface primary first"
        )));
    }
    nics.remove(idx);
    Ok(true)
}

/// Makes the first matching interface the only primary one. Returns false
/// (and leaves the VM untouched) with fewer than two interfaces or no match.
pub fn set_primary_interface(vm: &mut VirtualMachine, name: &str, resource_group: &str) -> bool {
    let nics = vm.network_interfaces_mut();
    if nics.len() <= 1 {
        return false;
    }
    let Some(target) = nics.iter().position(|n| nic_matches(n, name, resource_group)) else {
        return false;
    };
    for (i, nic) in nics.iter_mut().enumerate() {
        nic.set_primary(i == target);
    }
    true
}

/// Replacement NIC body for an IP change, or `None` when nothing changes.
///
/// Only `Dynamic` → `Dynamic` is skipped; a static request always rewrites
/// the configuration, even when the address is unchanged.
pub fn plan_ip_configuration(
    nic: &NetworkInterface,
    static_ip: Option<&str>,
    default_location: &str,
) -> ArmResult<Option<Value>> {
    let requested = IpAllocation::for_request(static_ip);
    let current = nic.primary_ip_configuration().ok_or_else(|| {
        ArmError::validation(format!("Network interface {} has no IP configuration", nic.name))
    })?;

    let already_dynamic = current
        .properties
        .private_ip_allocation_method
        .as_deref()
        .map(|m| IpAllocation::Dynamic.matches(m))
        .unwrap_or(false);
    if requested == IpAllocation::Dynamic && already_dynamic {
        return Ok(None);
    }

    let mut ip_properties = json!({ "privateIPAllocationMethod": requested.as_str() });
    if let (IpAllocation::Static, Some(ip)) = (requested, static_ip) {
        ip_properties["privateIPAddress"] = json!(ip.trim());
    }
    if let Some(subnet) = &current.properties.subnet {
        ip_properties["subnet"] = json!({ "id": subnet.id });
    }

    let location = if nic.location.is_empty() {
        default_location
    } else {
        nic.location.as_str()
    };
    let mut properties = json!({
        "ipConfigurations": [{
            "name": ip_configuration_name(),
            "properties": ip_properties,
        }]
    });
    if let Some(mac) = &nic.properties.mac_address {
        properties["macAddress"] = json!(mac);
    }
    Ok(Some(json!({ "location": location, "properties": properties })))
}

/// `ipconfig` plus the first group of a fresh UUID.
pub fn ip_configuration_name() -> String {
    format!("ipconfig{}", short_uuid())
}

pub(crate) fn short_uuid() -> String {
    Uuid::new_v4()
        .to_string()
        .split('-')
        .next()
        .unwrap_or_default()
        .to_string()
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArmErrorKind;

    const RG: &str = "/subscriptions/L/resourceGroups/edge-rg/providers/Microsoft.Network/networkInterfaces/";

    fn vm_with_nics(nics: &[(&str, Option<bool>)]) -> VirtualMachine {
        let nics: Vec<Value> = nics
            .iter()
            .map(|(name, primary)| match primary {
                Some(p) => json!({"id": format!("{RG}{name}"), "properties": {"primary": p}}),
                None => json!({"id": format!("{RG}{name}")}),
            })
            .collect();
        serde_json::from_value(json!({
            "id": "/x/vm1",
            "name": "vm1",
            "properties": {"networkProfile": {"networkInterfaces": nics}}
        }))
        .unwrap()
    }

    fn primaries(vm: &VirtualMachine) -> Vec<bool> {
        vm.network_interfaces().iter().map(|n| n.is_primary()).collect()
    }

    #[test]
    fn attach_to_single_unflagged_interface_flips_it() {
        let mut vm = vm_with_nics(&[("nic-a", None)]);
        attach_interface(&mut vm, &format!("{RG}nic-b"), true);
        assert_eq!(primaries(&vm), vec![false, true]);

        let mut vm = vm_with_nics(&[("nic-a", None)]);
        attach_interface(&mut vm, &format!("{RG}nic-b"), false);
        assert_eq!(primaries(&vm), vec![true, false]);
    }

    #[test]
    fn attach_primary_to_many_clears_existing() {
        let mut vm = vm_with_nics(&[("nic-a", Some(true)), ("nic-b", Some(false))]);
        attach_interface(&mut vm, &format!("{RG}nic-c"), true);
        assert_eq!(primaries(&vm), vec![false, false, true]);
    }

    #[test]
    fn attach_secondary_to_many_keeps_existing() {
        let mut vm = vm_with_nics(&[("nic-a", Some(true)), ("nic-b", Some(false))]);
        attach_interface(&mut vm, &format!("{RG}nic-c"), false);
        assert_eq!(primaries(&vm), vec![true, false, false]);
    }

    #[test]
    fn set_primary_leaves_exactly_one() {
        let mut vm = vm_with_nics(&[
            ("nic-a", Some(false)),
            ("nic-b", Some(true)),
            ("nic-c", Some(false)),
        ]);
        assert!(set_primary_interface(&mut vm, "nic-c", "edge-rg"));
        assert_eq!(primaries(&vm), vec![false, false, true]);
    }

    #[test]
    fn set_primary_noops() {
        let mut single = vm_with_nics(&[("nic-a", None)]);
        assert!(!set_primary_interface(&mut single, "nic-a", "edge-rg"));
        assert_eq!(primaries(&single), vec![false]);

        let mut vm = vm_with_nics(&[("nic-a", Some(true)), ("nic-b", Some(false))]);
        assert!(!set_primary_interface(&mut vm, "nic-z", "edge-rg"));
        assert_eq!(primaries(&vm), vec![true, false]);
    }

    #[test]
    fn detach_sole_interface_is_invariant_violation() {
        let mut vm = vm_with_nics(&[("nic-a", None)]);
        let err = detach_interface(&mut vm, "nic-a", "edge-rg").unwrap_err();
        assert_eq!(err.kind, ArmErrorKind::InvariantViolation);
    }

    #[test]
    fn detach_primary_is_invariant_violation() {
        let mut vm = vm_with_nics(&[("nic-a", Some(true)), ("nic-b", Some(false))]);
        let err = detach_interface(&mut vm, "nic-a", "edge-rg").unwrap_err();
        assert_eq!(err.kind, ArmErrorKind::InvariantViolation);
        assert_eq!(vm.network_interfaces().len(), 2);
    }

    #[test]
    fn detach_missing_is_noop() {
        let mut vm = vm_with_nics(&[("nic-a", Some(true)), ("nic-b", Some(false))]);
        assert!(!detach_interface(&mut vm, "nic-z", "edge-rg").unwrap());
        assert_eq!(vm.network_interfaces().len(), 2);
    }

    #[test]
    fn detach_secondary_removes_it() {
        let mut vm = vm_with_nics(&[("nic-a", Some(true)), ("nic-b", Some(false))]);
        assert!(detach_interface(&mut vm, "nic-b", "edge-rg").unwrap());
        assert_eq!(vm.network_interfaces().len(), 1);
        assert!(vm.network_interfaces()[0].id.ends_with("nic-a"));
    }

    #[test]
    fn disk_append_and_remove() {
        let mut vm = VirtualMachine::default();
        let id = "/subscriptions/L/resourceGroups/edge-rg/providers/Microsoft.Compute/disks/d1";
        append_data_disk(&mut vm, new_attached_disk(1, "d1", Some(64), id, Some("Standard_LRS")));
        // Duplicate lun is forwarded untouched.
        append_data_disk(&mut vm, new_attached_disk(1, "d2", None, id, None));
        assert_eq!(vm.data_disks().len(), 2);
        assert_eq!(vm.data_disks()[0].create_option.as_deref(), Some("Attach"));
        assert_eq!(vm.data_disks()[0].caching.as_deref(), Some("None"));
        assert!(has_data_disk(&vm, "d1", "edge-rg"));

        assert!(!remove_data_disk(&mut vm, "d1", "other-rg"));
        assert!(remove_data_disk(&mut vm, "d1", "edge-rg"));
        assert!(!has_data_disk(&vm, "d1", "edge-rg"));
        assert_eq!(vm.data_disks().len(), 1);
    }

    #[test]
    fn attached_disk_serialises_wire_names() {
        let disk = new_attached_disk(3, "d3", Some(128), "/id/d3", Some("Premium_LRS"));
        let v = serde_json::to_value(&disk).unwrap();
        assert_eq!(
            v,
            json!({
                "lun": 3,
                "name": "d3",
                "createOption": "Attach",
                "caching": "None",
                "diskSizeGB": 128,
                "managedDisk": {"id": "/id/d3", "storageAccountType": "Premium_LRS"}
            })
        );
    }

    fn nic(method: &str, ip: Option<&str>) -> NetworkInterface {
        let mut props = json!({
            "privateIPAllocationMethod": method,
            "subnet": {"id": "/x/subnets/default"}
        });
        if let Some(ip) = ip {
            props["privateIPAddress"] = json!(ip);
        }
        serde_json::from_value(json!({
            "id": "/x/nic1",
            "name": "nic1",
            "properties": {
                "macAddress": "00-15-5D-00-00-01",
                "ipConfigurations": [{"name": "ipconfig1", "properties": props}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn dynamic_to_dynamic_is_noop() {
        assert!(plan_ip_configuration(&nic("Dynamic", Some("10.0.0.4")), None, "dbelocal")
            .unwrap()
            .is_none());
    }

    #[test]
    fn static_request_builds_full_replacement() {
        let body = plan_ip_configuration(&nic("Dynamic", Some("10.0.0.4")), Some("10.0.0.9"), "dbelocal")
            .unwrap()
            .unwrap();
        assert_eq!(body["location"], "dbelocal");
        assert_eq!(body["properties"]["macAddress"], "00-15-5D-00-00-01");
        let cfg = &body["properties"]["ipConfigurations"][0];
        assert!(cfg["name"].as_str().unwrap().starts_with("ipconfig"));
        assert_ne!(cfg["name"], "ipconfig1");
        assert_eq!(cfg["properties"]["privateIPAllocationMethod"], "Static");
        assert_eq!(cfg["properties"]["privateIPAddress"], "10.0.0.9");
        assert_eq!(cfg["properties"]["subnet"]["id"], "/x/subnets/default");
    }

    #[test]
    fn static_to_dynamic_drops_address() {
        let body = plan_ip_configuration(&nic("Static", Some("10.0.0.9")), None, "dbelocal")
            .unwrap()
            .unwrap();
        let cfg = &body["properties"]["ipConfigurations"][0]["properties"];
        assert_eq!(cfg["privateIPAllocationMethod"], "Dynamic");
        assert!(cfg.get("privateIPAddress").is_none());
    }

    #[test]
    fn nic_without_ip_configuration_is_rejected() {
        let bare: NetworkInterface =
            serde_json::from_value(json!({"name": "nic0", "properties": {}})).unwrap();
        let err = plan_ip_configuration(&bare, None, "dbelocal").unwrap_err();
        assert_eq!(err.kind, ArmErrorKind::Validation);
    }

    #[test]
    fn short_uuid_is_first_group() {
        let s = short_uuid();
        assert_eq!(s.len(), 8);
        assert!(!s.contains('-'));
    }
}
