//! Core types for the linked-resource control-plane client.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Error types ─────────────────────────────────────────────────────

/// Categorised error kinds for control-plane operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ArmErrorKind {
    /// No response (status 0) or HTTP status >= 500.
    Transient,
    /// Any other non-success HTTP status. Never retried.
    RequestFailed,
    /// A response lacked a header the protocol requires.
    Protocol,
    /// The remote service reported a long-running operation as failed.
    OperationFailed,
    Timeout,
    InvariantViolation,
    MalformedId,
    Parse,
    Validation,
    NotAuthenticated,
}

impl fmt::Display for ArmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "Transient failure"),
            Self::RequestFailed => write!(f, "Request failed"),
            Self::Protocol => write!(f, "Protocol error"),
            Self::OperationFailed => write!(f, "Operation failed"),
            Self::Timeout => write!(f, "Timed out"),
            Self::InvariantViolation => write!(f, "Invariant violation"),
            Self::MalformedId => write!(f, "Malformed resource id"),
            Self::Parse => write!(f, "Parse error"),
            Self::Validation => write!(f, "Validation error"),
            Self::NotAuthenticated => write!(f, "Not authenticated"),
        }
    }
}

/// Main error type for control-plane operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmError {
    pub kind: ArmErrorKind,
    /// Human-readable message. For HTTP failures this is the raw response body.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ArmError {
    pub fn new(kind: ArmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
        }
    }

    pub fn with_status(kind: ArmErrorKind, message: impl Into<String>, status: u16) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: Some(status),
        }
    }

    /// Classify a non-success response. Status 0 stands for "no response".
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = if is_transient_status(status) {
            ArmErrorKind::Transient
        } else {
            ArmErrorKind::RequestFailed
        };
        Self::with_status(kind, body.to_string(), status)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ArmErrorKind::Timeout, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ArmErrorKind::Protocol, message)
    }

    pub fn operation_failed(label: &str, detail: Option<&str>) -> Self {
        let message = match detail {
            Some(d) if !d.is_empty() => format!("{label} failed: {d}"),
            _ => format!("{label} failed"),
        };
        Self::new(ArmErrorKind::OperationFailed, message)
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::new(ArmErrorKind::InvariantViolation, message)
    }

    pub fn malformed_id(id: &str) -> Self {
        Self::new(
            ArmErrorKind::MalformedId,
            format!("Resource name or resource group not found in id: {id}"),
        )
    }

    pub fn parse(context: &str, err: impl fmt::Display) -> Self {
        Self::new(ArmErrorKind::Parse, format!("{context}: {err}"))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ArmErrorKind::Validation, message)
    }

    pub fn not_authenticated() -> Self {
        Self::new(
            ArmErrorKind::NotAuthenticated,
            "No bearer token configured for the client",
        )
    }

    pub fn is_timeout(&self) -> bool {
        self.kind == ArmErrorKind::Timeout
    }

    /// `error.code` from a structured ARM error body, if the message is one.
    pub fn error_code(&self) -> Option<String> {
        serde_json::from_str::<ArmErrorBody>(&self.message)
            .ok()
            .and_then(|b| b.error)
            .and_then(|e| e.code)
    }

    /// True when the body is a structured error document with code `NotFound`.
    pub fn is_not_found_code(&self) -> bool {
        self.kind == ArmErrorKind::RequestFailed
            && self
                .error_code()
                .map(|c| c.eq_ignore_ascii_case("NotFound"))
                .unwrap_or(false)
    }
}

impl fmt::Display for ArmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(status) => write!(f, "[{}] (HTTP {}) {}", self.kind, status, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ArmError {}

pub type ArmResult<T> = Result<T, ArmError>;

/// Statuses worth retrying on an idempotent call.
pub fn is_transient_status(status: u16) -> bool {
    status == 0 || status >= 500
}

/// Structured ARM error document: `{ "error": { "code": ..., "message": ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArmErrorBody {
    #[serde(default)]
    pub error: Option<ArmErrorDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArmErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// ─── Auth ────────────────────────────────────────────────────────────

/// Bearer token handed to the client. Acquisition happens elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Utc::now() >= exp,
            None => false,
        }
    }
}

// ─── Configuration ───────────────────────────────────────────────────

/// API versions sent as query parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiVersionSet {
    /// `api-version` for calls through the front-door service.
    pub control_plane: String,
    /// `linked-api-version` for calls the device proxy must interpret itself.
    pub linked: String,
    /// `api-version` for the edge device resource.
    pub device: String,
}

impl Default for ApiVersionSet {
    fn default() -> Self {
        Self {
            control_plane: api_versions::CONTROL_PLANE.into(),
            linked: api_versions::LINKED.into(),
            device: api_versions::DEVICE.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub interval_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            interval_secs: 15,
        }
    }
}

impl RetryPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PollPolicy {
    pub interval_secs: u64,
    pub operation_timeout_mins: u64,
    pub deployment_timeout_mins: u64,
    pub resource_group_delete_timeout_mins: u64,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval_secs: 15,
            operation_timeout_mins: 10,
            deployment_timeout_mins: 50,
            resource_group_delete_timeout_mins: 30,
        }
    }
}

impl PollPolicy {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_mins.saturating_mul(60))
    }

    pub fn deployment_timeout(&self) -> Duration {
        Duration::from_secs(self.deployment_timeout_mins.saturating_mul(60))
    }

    pub fn resource_group_delete_timeout(&self) -> Duration {
        Duration::from_secs(self.resource_group_delete_timeout_mins.saturating_mul(60))
    }
}

/// Endpoint configuration. Immutable once a client is built from it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ArmConfig {
    pub base_url: String,
    pub subscription_id: String,
    pub tenant_id: String,
    pub api_versions: ApiVersionSet,
    pub retry: RetryPolicy,
    pub polling: PollPolicy,
    /// Location stamped on resources created on the device.
    pub default_location: String,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            base_url: ARM_BASE.into(),
            subscription_id: String::new(),
            tenant_id: String::new(),
            api_versions: ApiVersionSet::default(),
            retry: RetryPolicy::default(),
            polling: PollPolicy::default(),
            default_location: DEVICE_LOCATION.into(),
        }
    }
}

impl ArmConfig {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> ArmResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ArmError::parse("config JSON", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> ArmResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ArmError::validation(format!("Cannot read config {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// `ARM_ENDPOINT` (host or URL), `AZURE_SUBSCRIPTION_ID`, `AZURE_TENANT_ID`.
    pub fn from_env() -> ArmResult<Self> {
        let mut config = Self::default();
        if let Ok(endpoint) = std::env::var("ARM_ENDPOINT") {
            config.base_url = normalize_endpoint(&endpoint);
        }
        config.subscription_id = std::env::var("AZURE_SUBSCRIPTION_ID").unwrap_or_default();
        config.tenant_id = std::env::var("AZURE_TENANT_ID").unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ArmResult<()> {
        if self.subscription_id.trim().is_empty() {
            return Err(ArmError::validation("subscriptionId is required"));
        }
        if self.base_url.trim().is_empty() {
            return Err(ArmError::validation("baseUrl is required"));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| ArmError::validation(format!("Invalid baseUrl {}: {}", self.base_url, e)))?;
        if self.retry.max_attempts == 0 {
            return Err(ArmError::validation("retry.maxAttempts must be at least 1"));
        }
        Ok(())
    }
}

/// `management.azure.com` → `https://management.azure.com`.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Which API-version query parameters a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiProfile {
    /// Nothing appended; used for status URIs that embed their own query.
    Bare,
    ControlPlane,
    /// `api-version` plus `linked-api-version`.
    ControlPlaneAndLinked,
    Device,
}

// ─── ARM common ──────────────────────────────────────────────────────

/// Generic ARM list wrapper (`value` array with optional `nextLink`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ArmList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

/// Minimal resource skeleton for heterogeneous listings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ArmResource {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub resource_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a status URI poll.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OperationStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<ArmErrorDetail>,
}

/// A `(name, resourceGroup)` pair parsed out of a device-local id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkedResourceRef {
    pub name: String,
    pub resource_group: String,
}

// ─── Edge device ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EdgeDevice {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: EdgeDeviceProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDeviceProperties {
    #[serde(default)]
    pub edge_profile: Option<EdgeProfile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EdgeProfile {
    #[serde(default)]
    pub subscription: Option<EdgeSubscription>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSubscription {
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub registration_id: Option<String>,
}

// ─── Virtual Machines ────────────────────────────────────────────────

/// A VM as returned through the linked path. Fields the mutators do not touch
/// ride along in `extra` so a fetched document survives re-serialisation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VirtualMachine {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default)]
    pub properties: VmProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VirtualMachine {
    pub fn vm_size(&self) -> Option<&str> {
        self.properties
            .hardware_profile
            .as_ref()
            .and_then(|h| h.vm_size.as_deref())
    }

    pub fn data_disks(&self) -> &[DataDisk] {
        self.properties
            .storage_profile
            .as_ref()
            .map(|s| s.data_disks.as_slice())
            .unwrap_or(&[])
    }

    pub fn data_disks_mut(&mut self) -> &mut Vec<DataDisk> {
        &mut self
            .properties
            .storage_profile
            .get_or_insert_with(StorageProfile::default)
            .data_disks
    }

    pub fn os_disk_id(&self) -> Option<&str> {
        self.properties
            .storage_profile
            .as_ref()
            .and_then(|s| s.os_disk.as_ref())
            .and_then(|d| d.managed_disk.as_ref())
            .map(|m| m.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn network_interfaces(&self) -> &[NetworkInterfaceRef] {
        self.properties
            .network_profile
            .as_ref()
            .map(|n| n.network_interfaces.as_slice())
            .unwrap_or(&[])
    }

    pub fn network_interfaces_mut(&mut self) -> &mut Vec<NetworkInterfaceRef> {
        &mut self
            .properties
            .network_profile
            .get_or_insert_with(NetworkProfile::default)
            .network_interfaces
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VmProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware_profile: Option<HardwareProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_profile: Option<StorageProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_profile: Option<NetworkProfile>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_disk: Option<OsDisk>,
    #[serde(default)]
    pub data_disks: Vec<DataDisk>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OsDisk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_disk: Option<ManagedDiskRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `storageProfile.dataDisks`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DataDisk {
    #[serde(default)]
    pub lun: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_option: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caching: Option<String>,
    #[serde(default, rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_disk: Option<ManagedDiskRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataDisk {
    pub fn managed_disk_id(&self) -> &str {
        self.managed_disk
            .as_ref()
            .map(|m| m.id.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDiskRef {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_account_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterfaceRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `networkProfile.networkInterfaces`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkInterfaceRef {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<NicRefProperties>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NetworkInterfaceRef {
    pub fn new(id: impl Into<String>, primary: bool) -> Self {
        Self {
            id: id.into(),
            properties: Some(NicRefProperties {
                primary: Some(primary),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }

    /// Absent flag reads as not primary.
    pub fn is_primary(&self) -> bool {
        self.properties
            .as_ref()
            .and_then(|p| p.primary)
            .unwrap_or(false)
    }

    pub fn set_primary(&mut self, primary: bool) {
        self.properties
            .get_or_insert_with(NicRefProperties::default)
            .primary = Some(primary);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NicRefProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─── Disks ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Disk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<DiskSku>,
    #[serde(default)]
    pub properties: DiskProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Disk {
    pub fn size_gb(&self) -> Option<i64> {
        self.properties.disk_size_gb
    }

    pub fn sku_name(&self) -> Option<&str> {
        self.sku.as_ref().and_then(|s| s.name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DiskSku {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiskProperties {
    #[serde(default, rename = "diskSizeGB", skip_serializing_if = "Option::is_none")]
    pub disk_size_gb: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─── Networking ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkInterface {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub location: String,
    #[serde(default)]
    pub properties: NicProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NetworkInterface {
    pub fn primary_ip_configuration(&self) -> Option<&IpConfiguration> {
        self.properties.ip_configurations.first()
    }

    pub fn private_ip(&self) -> Option<&str> {
        self.primary_ip_configuration()
            .and_then(|c| c.properties.private_ip_address.as_deref())
    }

    pub fn allocation_method(&self) -> Option<&str> {
        self.primary_ip_configuration()
            .and_then(|c| c.properties.private_ip_allocation_method.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NicProperties {
    #[serde(default)]
    pub ip_configurations: Vec<IpConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IpConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: IpConfigProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IpConfigProperties {
    #[serde(default, rename = "privateIPAddress", skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    #[serde(
        default,
        rename = "privateIPAllocationMethod",
        skip_serializing_if = "Option::is_none"
    )]
    pub private_ip_allocation_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubnetRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubnetRef {
    #[serde(default)]
    pub id: String,
}

/// Private IP allocation mode of a NIC's IP configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpAllocation {
    Static,
    Dynamic,
}

impl IpAllocation {
    /// Static when a literal address is supplied.
    pub fn for_request(static_ip: Option<&str>) -> Self {
        match static_ip {
            Some(ip) if !ip.trim().is_empty() => Self::Static,
            _ => Self::Dynamic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "Static",
            Self::Dynamic => "Dynamic",
        }
    }

    pub fn matches(&self, method: &str) -> bool {
        method.eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for IpAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VirtualNetwork {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: VnetProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VnetProperties {
    #[serde(default)]
    pub subnets: Vec<Subnet>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Subnet {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// First virtual network on a device, with its linked resource group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefaultVirtualNetwork {
    pub name: String,
    pub resource_group: String,
    pub subnet_name: String,
}

// ─── Deployments ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Deployment {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: DeploymentProperties,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentProperties {
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ─── Constants ───────────────────────────────────────────────────────

pub mod api_versions {
    pub const CONTROL_PLANE: &str = "2020-06-01-preview";
    pub const LINKED: &str = "2018-09-01";
    pub const DEVICE: &str = "2020-09-01";
}

pub mod resource_types {
    pub const VIRTUAL_MACHINES: &str = "Microsoft.Compute/virtualMachines";
    pub const DISKS: &str = "Microsoft.Compute/disks";
    pub const NETWORK_INTERFACES: &str = "Microsoft.Network/networkInterfaces";
    pub const VIRTUAL_NETWORKS: &str = "Microsoft.Network/virtualNetworks";
    pub const DEPLOYMENTS: &str = "Microsoft.Resources/deployments";
    pub const EDGE_DEVICES: &str = "Microsoft.DataboxEdge/dataBoxEdgeDevices";
}

/// Management base URL.
pub const ARM_BASE: &str = "https://management.azure.com";

/// Location every device-side resource lives in.
pub const DEVICE_LOCATION: &str = "dbelocal";

// ─── Tests ──────────────────────────────────────────────────────────
