//! # EdgeLink ARM
//!
//! Control-plane client for compute, storage and network resources that live
//! on an edge device and are reachable only through the front-door
//! management service's linked-resource paths.
//!
//! ## Layers
//!
//! - **Request executor** (`client`) – bearer token, API-version parameters,
//!   response classification, fixed-interval retries for reads
//! - **Operation poller** (`poller`) – status-URI polling to a terminal state
//! - **Resource ids** (`resource_id`) – linked paths and device-local ids
//! - **Mutators** (`mutations`, `virtual_machines`, `disks`, `networking`) –
//!   read-modify-write of data disks, interfaces and IP configurations
//! - **Deployments** (`deployments`) – template deployments with a final
//!   provisioning-state check
//! - **Service** (`service`) – one client bound to one device

pub mod types;
pub mod transport;
pub mod clock;
pub mod client;
pub mod poller;
pub mod resource_id;
pub mod mutations;
pub mod linked;
pub mod virtual_machines;
pub mod disks;
pub mod networking;
pub mod deployments;
pub mod service;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use client::ArmClient;
pub use clock::{Clock, ManualClock, TokioClock};
pub use resource_id::LinkedScope;
pub use service::EdgeLinkService;
pub use transport::{ArmRequest, ArmResponse, HttpTransport, ReqwestTransport};
pub use types::{AccessToken, ArmConfig, ArmError, ArmErrorKind, ArmResult};
