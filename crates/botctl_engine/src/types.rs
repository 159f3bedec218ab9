use std::fmt;

use serde::{Deserialize, Serialize};

/// Command understood by `POST {base}/bot/control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Start,
    Stop,
}

/// Wire body of a control request: `{"action": "start"}`.
#[derive(Debug, Serialize)]
pub(crate) struct CommandBody {
    pub action: Command,
}

/// Parsed `GET {base}/bot/status` reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Value of the `status` field. Non-string values are kept as JSON text.
    pub status: Option<String>,
}

/// Body of a successful control reply; callers are free to ignore it.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReceipt {
    pub body: serde_json::Value,
}

/// Optional `{"error": "..."}` carried by a failed control reply.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ControlError {
    pub kind: FailureKind,
    pub message: String,
}

impl ControlError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// True when the endpoint could not be reached at all.
    pub fn is_transport(&self) -> bool {
        self.kind.is_transport()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidEndpoint,
    Network,
    Timeout,
    HttpStatus(u16),
    MalformedResponse,
    TooLarge { max_bytes: u64, actual: Option<u64> },
}

impl FailureKind {
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FailureKind::InvalidEndpoint | FailureKind::Network | FailureKind::Timeout
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidEndpoint => write!(f, "invalid endpoint"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
        }
    }
}
