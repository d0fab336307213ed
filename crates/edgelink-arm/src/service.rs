//! Service façade binding one client to one device.
//!
//! `EdgeLinkService` resolves the device's linked subscription once and then
//! exposes every domain operation without repeating the scope.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::client::ArmClient;
use crate::deployments::{self, DeploymentTarget};
use crate::disks;
use crate::linked;
use crate::networking;
use crate::resource_id::LinkedScope;
use crate::types::*;
use crate::virtual_machines::{self, StopMode};

/// Shared handle for callers that hand the service across tasks.
pub type EdgeLinkServiceState = Arc<Mutex<EdgeLinkService>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub authenticated: bool,
    pub base_url: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub linked_subscription_id: String,
}

pub struct EdgeLinkService {
    client: ArmClient,
    scope: LinkedScope,
}

impl EdgeLinkService {
    pub fn new(client: ArmClient, scope: LinkedScope) -> Self {
        Self { client, scope }
    }

    /// Look up the device and bind to its linked subscription.
    pub async fn connect(
        client: ArmClient,
        resource_group: &str,
        device_name: &str,
    ) -> ArmResult<Self> {
        let scope = linked::resolve_scope(&client, resource_group, device_name).await?;
        Ok(Self::new(client, scope))
    }

    pub fn into_state(self) -> EdgeLinkServiceState {
        Arc::new(Mutex::new(self))
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn client(&self) -> &ArmClient {
        &self.client
    }

    pub fn scope(&self) -> &LinkedScope {
        &self.scope
    }

    pub fn set_token(&mut self, token: AccessToken) {
        self.client = self.client.with_token(token);
    }

    pub fn connection_summary(&self) -> ConnectionSummary {
        ConnectionSummary {
            authenticated: self.client.is_authenticated(),
            base_url: self.client.config().base_url.clone(),
            subscription_id: self.scope.subscription_id.clone(),
            resource_group: self.scope.resource_group.clone(),
            linked_subscription_id: self.scope.linked_subscription_id.clone(),
        }
    }

    // ── Linked reads ─────────────────────────────────────────────────

    pub async fn get_linked_resource_group(&self, linked_rg: &str) -> ArmResult<Value> {
        linked::get_linked_resource_group(&self.client, &self.scope, linked_rg).await
    }

    pub async fn list_linked_resources(&self, resource_type: &str) -> ArmResult<Vec<ArmResource>> {
        linked::list_linked_resources(&self.client, &self.scope, resource_type).await
    }

    pub async fn list_resource_group_resources(&self, linked_rg: &str) -> ArmResult<Vec<ArmResource>> {
        linked::list_resource_group_resources(&self.client, &self.scope, linked_rg).await
    }

    pub async fn default_virtual_network(&self) -> ArmResult<DefaultVirtualNetwork> {
        linked::default_virtual_network(&self.client, &self.scope).await
    }

    pub async fn delete_linked_resource_group(&self, linked_rg: &str) -> ArmResult<()> {
        linked::delete_linked_resource_group(&self.client, &self.scope, linked_rg).await
    }

    // ── Virtual Machines ─────────────────────────────────────────────

    pub async fn get_vm(&self, vm_rg: &str, vm_name: &str) -> ArmResult<VirtualMachine> {
        virtual_machines::get_vm(&self.client, &self.scope, vm_rg, vm_name).await
    }

    pub async fn start_vm(&self, vm_rg: &str, vm_name: &str) -> ArmResult<()> {
        virtual_machines::start_vm(&self.client, &self.scope, vm_rg, vm_name).await
    }

    pub async fn stop_vm(&self, vm_rg: &str, vm_name: &str, mode: StopMode) -> ArmResult<()> {
        virtual_machines::stop_vm(&self.client, &self.scope, vm_rg, vm_name, mode).await
    }

    pub async fn restart_vm(&self, vm_rg: &str, vm_name: &str) -> ArmResult<()> {
        virtual_machines::restart_vm(&self.client, &self.scope, vm_rg, vm_name).await
    }

    pub async fn delete_vm(&self, vm_rg: &str, vm_name: &str) -> ArmResult<()> {
        virtual_machines::delete_vm(&self.client, &self.scope, vm_rg, vm_name).await
    }

    pub async fn delete_vm_and_dependents(&self, vm_rg: &str, vm_name: &str) -> ArmResult<()> {
        virtual_machines::delete_vm_and_dependents(&self.client, &self.scope, vm_rg, vm_name).await
    }

    pub async fn resize_vm(&self, vm_rg: &str, vm_name: &str, vm_size: &str) -> ArmResult<()> {
        virtual_machines::resize_vm(&self.client, &self.scope, vm_rg, vm_name, vm_size).await
    }

    pub async fn attach_disk(
        &self,
        vm_rg: &str,
        vm_name: &str,
        disk_rg: &str,
        disk_name: &str,
        lun: u32,
    ) -> ArmResult<()> {
        virtual_machines::attach_disk(&self.client, &self.scope, vm_rg, vm_name, disk_rg, disk_name, lun)
            .await
    }

    pub async fn detach_disk(
        &self,
        vm_rg: &str,
        vm_name: &str,
        disk_rg: &str,
        disk_name: &str,
    ) -> ArmResult<()> {
        virtual_machines::detach_disk(&self.client, &self.scope, vm_rg, vm_name, disk_rg, disk_name)
            .await
    }

    pub async fn attach_nic(
        &self,
        vm_rg: &str,
        vm_name: &str,
        nic_rg: &str,
        nic_name: &str,
        primary: bool,
    ) -> ArmResult<()> {
        virtual_machines::attach_nic(&self.client, &self.scope, vm_rg, vm_name, nic_rg, nic_name, primary)
            .await
    }

    pub async fn detach_nic(
        &self,
        vm_rg: &str,
        vm_name: &str,
        nic_rg: &str,
        nic_name: &str,
    ) -> ArmResult<()> {
        virtual_machines::detach_nic(&self.client, &self.scope, vm_rg, vm_name, nic_rg, nic_name)
            .await
    }

    pub async fn set_primary_nic(
        &self,
        vm_rg: &str,
        vm_name: &str,
        nic_rg: &str,
        nic_name: &str,
    ) -> ArmResult<()> {
        virtual_machines::set_primary_nic(&self.client, &self.scope, vm_rg, vm_name, nic_rg, nic_name)
            .await
    }

    pub async fn attached_disks(&self, vm_rg: &str, vm_name: &str) -> ArmResult<Vec<LinkedResourceRef>> {
        virtual_machines::attached_disks(&self.client, &self.scope, vm_rg, vm_name).await
    }

    pub async fn attached_nics(&self, vm_rg: &str, vm_name: &str) -> ArmResult<Vec<LinkedResourceRef>> {
        virtual_machines::attached_nics(&self.client, &self.scope, vm_rg, vm_name).await
    }

    pub async fn is_disk_attached(
        &self,
        vm_rg: &str,
        vm_name: &str,
        disk_rg: &str,
        disk_name: &str,
    ) -> ArmResult<bool> {
        virtual_machines::is_disk_attached(&self.client, &self.scope, vm_rg, vm_name, disk_rg, disk_name)
            .await
    }

    pub async fn is_nic_attached(
        &self,
        vm_rg: &str,
        vm_name: &str,
        nic_rg: &str,
        nic_name: &str,
    ) -> ArmResult<bool> {
        virtual_machines::is_nic_attached(&self.client, &self.scope, vm_rg, vm_name, nic_rg, nic_name)
            .await
    }

    pub async fn is_nic_primary(
        &self,
        vm_rg: &str,
        vm_name: &str,
        nic_rg: &str,
        nic_name: &str,
    ) -> ArmResult<bool> {
        virtual_machines::is_nic_primary(&self.client, &self.scope, vm_rg, vm_name, nic_rg, nic_name)
            .await
    }

    pub async fn is_vm_size(&self, vm_rg: &str, vm_name: &str, vm_size: &str) -> ArmResult<bool> {
        virtual_machines::is_vm_size(&self.client, &self.scope, vm_rg, vm_name, vm_size).await
    }

    // ── Disks ────────────────────────────────────────────────────────

    pub async fn get_disk(&self, disk_rg: &str, disk_name: &str) -> ArmResult<Disk> {
        disks::get_disk(&self.client, &self.scope, disk_rg, disk_name).await
    }

    pub async fn create_managed_disk(&self, disk_rg: &str, disk_name: &str, size_gb: i64) -> ArmResult<()> {
        disks::create_managed_disk(&self.client, &self.scope, disk_rg, disk_name, size_gb).await
    }

    pub async fn delete_disk(&self, disk_rg: &str, disk_name: &str) -> ArmResult<()> {
        disks::delete_disk(&self.client, &self.scope, disk_rg, disk_name).await
    }

    pub async fn resize_disk(&self, disk_rg: &str, disk_name: &str, size_gb: i64) -> ArmResult<()> {
        disks::resize_disk(&self.client, &self.scope, disk_rg, disk_name, size_gb).await
    }

    pub async fn is_disk_size(&self, disk_rg: &str, disk_name: &str, size_gb: i64) -> ArmResult<bool> {
        disks::is_disk_size(&self.client, &self.scope, disk_rg, disk_name, size_gb).await
    }

    // ── Networking ───────────────────────────────────────────────────

    pub async fn get_nic(&self, nic_rg: &str, nic_name: &str) -> ArmResult<NetworkInterface> {
        networking::get_nic(&self.client, &self.scope, nic_rg, nic_name).await
    }

    pub async fn create_nic(
        &self,
        nic_rg: &str,
        nic_name: &str,
        vnet_rg: &str,
        vnet_name: &str,
        static_ip: Option<&str>,
    ) -> ArmResult<()> {
        networking::create_nic(&self.client, &self.scope, nic_rg, nic_name, vnet_rg, vnet_name, static_ip)
            .await
    }

    pub async fn delete_nic(&self, nic_rg: &str, nic_name: &str) -> ArmResult<()> {
        networking::delete_nic(&self.client, &self.scope, nic_rg, nic_name).await
    }

    pub async fn set_nic_ip(&self, nic_rg: &str, nic_name: &str, static_ip: Option<&str>) -> ArmResult<()> {
        networking::set_nic_ip(&self.client, &self.scope, nic_rg, nic_name, static_ip).await
    }

    pub async fn has_nic_ip(&self, nic_rg: &str, nic_name: &str, ip: &str) -> ArmResult<bool> {
        networking::has_nic_ip(&self.client, &self.scope, nic_rg, nic_name, ip).await
    }

    pub async fn is_nic_static(&self, nic_rg: &str, nic_name: &str) -> ArmResult<bool> {
        networking::is_nic_static(&self.client, &self.scope, nic_rg, nic_name).await
    }

    // ── Deployments ──────────────────────────────────────────────────

    pub async fn deploy_to_resource_group(
        &self,
        linked_rg: &str,
        template: &Value,
        parameters: Option<&Value>,
        deployment_name: Option<&str>,
    ) -> ArmResult<String> {
        let target = DeploymentTarget::ResourceGroup(linked_rg.to_string());
        deployments::deploy_template(&self.client, &self.scope, &target, template, parameters, deployment_name)
            .await
    }

    /// Subscription-level deployment at the configured default location.
    pub async fn deploy_to_subscription(
        &self,
        template: &Value,
        parameters: Option<&Value>,
        deployment_name: Option<&str>,
    ) -> ArmResult<String> {
        let target = DeploymentTarget::Subscription {
            location: self.client.config().default_location.clone(),
        };
        deployments::deploy_template(&self.client, &self.scope, &target, template, parameters, deployment_name)
            .await
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::testing::{scripted_client, test_config};

    #[tokio::test]
    async fn connect_resolves_scope() {
        let (client, transport, _) = scripted_client(test_config());
        transport.push_json(
            200,
            json!({"name": "dev1", "properties": {"edgeProfile": {"subscription": {"subscriptionId": "lsub"}}}}),
        );
        let service = EdgeLinkService::connect(client, "saas-rg", "dev1").await.unwrap();
        let summary = service.connection_summary();
        assert!(summary.authenticated);
        assert_eq!(summary.linked_subscription_id, "lsub");
        assert_eq!(summary.resource_group, "saas-rg");
        assert_eq!(summary.base_url, "https://arm.test");
    }

    #[test]
    fn set_token_replaces_client_token() {
        let (client, _, _) = scripted_client(test_config());
        let mut service = EdgeLinkService::new(client, LinkedScope::new("sub-1", "rg", "lsub"));
        service.set_token(AccessToken::default());
        assert!(!service.connection_summary().authenticated);
    }

    #[tokio::test]
    async fn state_handle_is_shareable() {
        let (client, transport, _) = scripted_client(test_config());
        transport
            .push_accepted("https://arm.test/op/1")
            .push_status("Succeeded");
        let state = EdgeLinkService::new(client, LinkedScope::new("sub-1", "rg", "lsub")).into_state();
        let handle = state.clone();
        tokio::spawn(async move {
            handle.lock().await.start_vm("vm-rg", "vm1").await
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(transport.mutations().len(), 1);
    }
}
