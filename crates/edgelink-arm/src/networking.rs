//! Network interfaces on the device.

use log::{debug, info, warn};
use reqwest::Method;
use serde_json::json;

use crate::client::ArmClient;
use crate::linked;
use crate::mutations;
use crate::poller;
use crate::resource_id::LinkedScope;
use crate::types::{
    resource_types, ApiProfile, ArmError, ArmResult, IpAllocation, NetworkInterface,
    VirtualNetwork,
};

// ─── Network Interfaces ─────────────────────────────────────────────

pub async fn get_nic(
    client: &ArmClient,
    scope: &LinkedScope,
    nic_rg: &str,
    nic_name: &str,
) -> ArmResult<NetworkInterface> {
    linked::get_resource(client, scope, nic_rg, resource_types::NETWORK_INTERFACES, nic_name).await
}

/// Create a NIC in the first subnet of `vnet_name`. A supplied `static_ip`
/// gives a Static configuration, otherwise the device assigns one.
pub async fn create_nic(
    client: &ArmClient,
    scope: &LinkedScope,
    nic_rg: &str,
    nic_name: &str,
    vnet_rg: &str,
    vnet_name: &str,
    static_ip: Option<&str>,
) -> ArmResult<()> {
    let vnet: VirtualNetwork = linked::get_resource(
        client,
        scope,
        vnet_rg,
        resource_types::VIRTUAL_NETWORKS,
        vnet_name,
    )
    .await?;
    let subnet = vnet.properties.subnets.first().ok_or_else(|| {
        ArmError::validation(format!("Virtual network {vnet_name} has no subnets"))
    })?;

    let allocation = IpAllocation::for_request(static_ip);
    let mut ip_properties = json!({ "subnet": { "id": subnet.id } });
    if let (IpAllocation::Static, Some(ip)) = (allocation, static_ip) {
        ip_properties["privateIPAddress"] = json!(ip.trim());
        ip_properties["privateIPAllocationMethod"] = json!(allocation.as_str());
    }
    let body = json!({
        "location": client.config().default_location,
        "properties": {
            "ipConfigurations": [{
                "name": mutations::ip_configuration_name(),
                "properties": ip_properties,
            }]
        }
    });

    let path = scope.resource_path(nic_rg, resource_types::NETWORK_INTERFACES, nic_name);
    debug!("create_nic({}/{}) → {}", nic_rg, nic_name, path);
    let resp = client
        .execute(Method::PUT, &path, ApiProfile::ControlPlane, Some(&body))
        .await?;
    poller::await_operation(client, &resp, &format!("Create nic {nic_name}")).await?;
    info!("Created nic {}/{} with {} IP configuration", nic_rg, nic_name, allocation);
    Ok(())
}

pub async fn delete_nic(
    client: &ArmClient,
    scope: &LinkedScope,
    nic_rg: &str,
    nic_name: &str,
) -> ArmResult<()> {
    let path = scope.resource_path(nic_rg, resource_types::NETWORK_INTERFACES, nic_name);
    debug!("delete_nic({}/{}) → {}", nic_rg, nic_name, path);
    let resp = client
        .execute(Method::DELETE, &path, ApiProfile::ControlPlane, None)
        .await?;
    poller::await_operation(client, &resp, &format!("Delete nic {nic_name}")).await
}

/// Switch the NIC between Static (`static_ip` given) and Dynamic.
pub async fn set_nic_ip(
    client: &ArmClient,
    scope: &LinkedScope,
    nic_rg: &str,
    nic_name: &str,
    static_ip: Option<&str>,
) -> ArmResult<()> {
    let nic = get_nic(client, scope, nic_rg, nic_name).await?;
    debug!(
        "set_nic_ip({}/{}) current: {:?} {:?}",
        nic_rg,
        nic_name,
        nic.allocation_method(),
        nic.private_ip()
    );
    let Some(body) =
        mutations::plan_ip_configuration(&nic, static_ip, &client.config().default_location)?
    else {
        warn!("Nic {}/{} is already Dynamic; skipping", nic_rg, nic_name);
        return Ok(());
    };
    if nic.id.is_empty() {
        return Err(ArmError::validation(format!("Nic {nic_name} carries no id")));
    }

    let resp = client
        .execute(Method::PUT, &nic.id, ApiProfile::ControlPlane, Some(&body))
        .await?;
    poller::await_operation(client, &resp, &format!("Set ip of nic {nic_name}")).await?;
    info!(
        "Set nic {}/{} to {}",
        nic_rg,
        nic_name,
        IpAllocation::for_request(static_ip)
    );
    Ok(())
}

pub async fn has_nic_ip(
    client: &ArmClient,
    scope: &LinkedScope,
    nic_rg: &str,
    nic_name: &str,
    ip: &str,
) -> ArmResult<bool> {
    let nic = get_nic(client, scope, nic_rg, nic_name).await?;
    Ok(nic.private_ip() == Some(ip))
}

pub async fn is_nic_static(
    client: &ArmClient,
    scope: &LinkedScope,
    nic_rg: &str,
    nic_name: &str,
) -> ArmResult<bool> {
    let nic = get_nic(client, scope, nic_rg, nic_name).await?;
    Ok(nic
        .allocation_method()
        .map(|m| IpAllocation::Static.matches(m))
        .unwrap_or(false))
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{scripted_client, test_config};

    fn scope() -> LinkedScope {
        LinkedScope::new("sub-1", "saas-rg", "lsub")
    }

    fn vnet_doc() -> serde_json::Value {
        json!({
            "id": scope().resource_path("net-rg", resource_types::VIRTUAL_NETWORKS, "vnet1"),
            "name": "vnet1",
            "properties": {"subnets": [{"id": "/x/subnets/sub0", "name": "sub0"}]}
        })
    }

    fn nic_doc(method: &str, ip: &str) -> serde_json::Value {
        json!({
            "id": scope().resource_path("nic-rg", resource_types::NETWORK_INTERFACES, "nic1"),
            "name": "nic1",
            "location": "dbelocal",
            "properties": {
                "macAddress": "00-15-5D-00-00-02",
                "ipConfigurations": [{
                    "name": "ipconfig1",
                    "properties": {
                        "privateIPAddress": ip,
                        "privateIPAllocationMethod": method,
                        "subnet": {"id": "/x/subnets/sub0"}
                    }
                }]
            }
        })
    }

    #[tokio::test]
    async fn create_static_nic() {
        let (client, transport, _) = scripted_client(test_config());
        transport
            .push_json(200, vnet_doc())
            .push_accepted("https://arm.test/op/nic")
            .push_status("Succeeded");
        create_nic(&client, &scope(), "nic-rg", "nic1", "net-rg", "vnet1", Some("10.0.0.7"))
            .await
            .unwrap();

        let put = &transport.mutations()[0];
        let body = put.body.as_ref().unwrap();
        let cfg = &body["properties"]["ipConfigurations"][0];
        assert_eq!(body["location"], "dbelocal");
        assert_eq!(cfg["properties"]["subnet"]["id"], "/x/subnets/sub0");
        assert_eq!(cfg["properties"]["privateIPAddress"], "10.0.0.7");
        assert_eq!(cfg["properties"]["privateIPAllocationMethod"], "Static");
        assert!(cfg["name"].as_str().unwrap().starts_with("ipconfig"));
    }

    #[tokio::test]
    async fn create_dynamic_nic_omits_address() {
        let (client, transport, _) = scripted_client(test_config());
        transport
            .push_json(200, vnet_doc())
            .push_accepted("https://arm.test/op/nic")
            .push_status("Succeeded");
        create_nic(&client, &scope(), "nic-rg", "nic2", "net-rg", "vnet1", None)
            .await
            .unwrap();
        let body = transport.mutations()[0].body.clone().unwrap();
        let props = &body["properties"]["ipConfigurations"][0]["properties"];
        assert!(props.get("privateIPAddress").is_none());
        assert!(props.get("privateIPAllocationMethod").is_none());
    }

    #[tokio::test]
    async fn dynamic_request_on_dynamic_nic_is_noop() {
        let (client, transport, _) = scripted_client(test_config());
        transport.push_json(200, nic_doc("Dynamic", "10.0.0.5"));
        set_nic_ip(&client, &scope(), "nic-rg", "nic1", None)
            .await
            .unwrap();
        assert!(transport.mutations().is_empty());
    }

    #[tokio::test]
    async fn static_request_puts_replacement_to_nic_id() {
        let (client, transport, _) = scripted_client(test_config());
        transport
            .push_json(200, nic_doc("Dynamic", "10.0.0.5"))
            .push_accepted("https://arm.test/op/ip")
            .push_status("Succeeded");
        set_nic_ip(&client, &scope(), "nic-rg", "nic1", Some("10.0.0.50"))
            .await
            .unwrap();
        let put = &transport.mutations()[0];
        assert_eq!(put.method, Method::PUT);
        assert!(put.url.ends_with("/networkInterfaces/nic1"));
        let body = put.body.as_ref().unwrap();
        assert_eq!(body["properties"]["macAddress"], "00-15-5D-00-00-02");
        assert_eq!(
            body["properties"]["ipConfigurations"][0]["properties"]["privateIPAddress"],
            "10.0.0.50"
        );
    }

    #[tokio::test]
    async fn ip_probes() {
        let (client, transport, _) = scripted_client(test_config());
        transport
            .push_json(200, nic_doc("Static", "10.0.0.9"))
            .push_json(200, nic_doc("Static", "10.0.0.9"));
        assert!(has_nic_ip(&client, &scope(), "nic-rg", "nic1", "10.0.0.9").await.unwrap());
        assert!(is_nic_static(&client, &scope(), "nic-rg", "nic1").await.unwrap());
    }
}
