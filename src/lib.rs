//! # EdgeLink
//!
//! Manage virtual machines, managed disks and network interfaces on an edge
//! device through the linked-resource paths of the front-door ARM endpoint.
//!
//! The client itself lives in [`edgelink_arm`]; this crate re-exports it and
//! owns process-level setup.

pub mod logging;

pub use edgelink_arm::*;

/// Environment variable holding the bearer token for [`connect_from_env`].
pub const TOKEN_ENV: &str = "ARM_ACCESS_TOKEN";

/// Build a client from the environment and bind it to `device_name`.
///
/// Reads `ARM_ENDPOINT`, `AZURE_SUBSCRIPTION_ID`, `AZURE_TENANT_ID` and
/// [`TOKEN_ENV`].
pub async fn connect_from_env(resource_group: &str, device_name: &str) -> ArmResult<EdgeLinkService> {
    let config = ArmConfig::from_env()?;
    let token = std::env::var(TOKEN_ENV)
        .ok()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(ArmError::not_authenticated)?;
    let client = ArmClient::new(config, AccessToken::new(token));
    log::info!(
        "Connecting to device {}/{} through {}",
        resource_group,
        device_name,
        client.config().base_url
    );
    EdgeLinkService::connect(client, resource_group, device_name).await
}
