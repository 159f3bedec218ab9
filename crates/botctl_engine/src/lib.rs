//! Bot control engine: IO against the remote control endpoint.
mod client;
mod endpoint;
mod types;

pub use client::{ClientSettings, ControlClient, ReqwestControlClient, DEFAULT_MAX_BODY_BYTES};
pub use endpoint::Endpoint;
pub use types::{Command, CommandReceipt, ControlError, FailureKind, StatusReport};
