use std::time::Duration;

use botctl_logging::{ctl_debug, ctl_trace, ctl_warn};
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;

use crate::types::{CommandBody, ErrorBody};
use crate::{Command, CommandReceipt, ControlError, Endpoint, FailureKind, StatusReport};

pub const DEFAULT_MAX_BODY_BYTES: u64 = 1024 * 1024;

/// Used when a failed control reply carries no readable `error` field.
const GENERIC_COMMAND_ERROR: &str = "Unknown error";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub endpoint: Endpoint,
    /// `None` keeps the transport default.
    pub connect_timeout: Option<Duration>,
    /// `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
    pub max_body_bytes: u64,
}

impl ClientSettings {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            connect_timeout: None,
            request_timeout: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[async_trait::async_trait]
pub trait ControlClient: Send + Sync {
    async fn query_status(&self) -> Result<StatusReport, ControlError>;

    async fn send_command(&self, command: Command) -> Result<CommandReceipt, ControlError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestControlClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestControlClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ControlError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ControlError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.settings.endpoint
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<Vec<u8>, ControlError> {
        let max_bytes = self.settings.max_body_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(ControlError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(ControlError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
            ctl_trace!("read {} body bytes", bytes.len());
        }
        Ok(bytes)
    }
}

#[async_trait::async_trait]
impl ControlClient for ReqwestControlClient {
    async fn query_status(&self) -> Result<StatusReport, ControlError> {
        let url = self.settings.endpoint.status_url().clone();
        ctl_debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("unexpected status");
            return Err(http_status_error(status, reason.to_string()));
        }

        let bytes = self.read_body(response).await?;
        parse_status_report(&bytes)
    }

    async fn send_command(&self, command: Command) -> Result<CommandReceipt, ControlError> {
        let url = self.settings.endpoint.control_url().clone();
        ctl_debug!("POST {} action={:?}", url, command);

        let response = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .json(&CommandBody { action: command })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            // Best-effort: an unreadable body falls back to the generic message.
            let bytes = self.read_body(response).await.unwrap_or_default();
            let message = extract_error_message(&bytes);
            ctl_warn!("Control command {:?} refused with {}: {}", command, status, message);
            return Err(http_status_error(status, message));
        }

        let bytes = self.read_body(response).await?;
        let body = serde_json::from_slice(&bytes).map_err(|err| {
            ControlError::new(
                FailureKind::MalformedResponse,
                format!("control reply is not JSON: {err}"),
            )
        })?;
        Ok(CommandReceipt { body })
    }
}

fn parse_status_report(bytes: &[u8]) -> Result<StatusReport, ControlError> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|err| {
        ControlError::new(
            FailureKind::MalformedResponse,
            format!("status reply is not JSON: {err}"),
        )
    })?;
    let object = value.as_object().ok_or_else(|| {
        ControlError::new(
            FailureKind::MalformedResponse,
            "status reply is not a JSON object",
        )
    })?;

    let status = match object.get("status") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(text)) => Some(text.clone()),
        Some(other) => Some(other.to_string()),
    };
    Ok(StatusReport { status })
}

fn extract_error_message(bytes: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(bytes)
        .ok()
        .and_then(|body| body.error)
        .map(|error| error.trim().to_string())
        .filter(|error| !error.is_empty())
        .unwrap_or_else(|| GENERIC_COMMAND_ERROR.to_string())
}

fn http_status_error(status: StatusCode, message: String) -> ControlError {
    ControlError::new(FailureKind::HttpStatus(status.as_u16()), message)
}

fn map_reqwest_error(err: reqwest::Error) -> ControlError {
    if err.is_timeout() {
        return ControlError::new(FailureKind::Timeout, err.to_string());
    }
    ControlError::new(FailureKind::Network, err.to_string())
}
