use std::fmt;
use std::str::FromStr;

use crate::view_model::{AppViewModel, StatusTone};
use crate::StatusReading;

/// Lifecycle of the remote bot as last established by a status query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BotLifecycleState {
    #[default]
    Unknown,
    Active,
    Inactive,
    Errored {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Start,
    Stop,
}

impl ControlAction {
    /// Name used on the wire and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            ControlAction::Start => "start",
            ControlAction::Stop => "stop",
        }
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionError(pub String);

impl fmt::Display for ParseActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown action '{}', expected 'start' or 'stop'", self.0)
    }
}

impl std::error::Error for ParseActionError {}

impl FromStr for ControlAction {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(ControlAction::Start),
            "stop" => Ok(ControlAction::Stop),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

/// The operation currently talking to the endpoint. At most one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    Dispatch(ControlAction),
    /// Status query issued after `action` settled.
    Reconcile(ControlAction),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    lifecycle: BotLifecycleState,
    in_flight: Option<Operation>,
    /// Raw status text from the last unrecognized reading.
    unrecognized_raw: Option<String>,
    notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifecycle(&self) -> &BotLifecycleState {
        &self.lifecycle
    }

    pub fn in_flight(&self) -> Option<Operation> {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn view(&self) -> AppViewModel {
        let busy = self.is_busy();
        let querying = matches!(
            self.in_flight,
            Some(Operation::Refresh | Operation::Reconcile(_))
        );

        let (status_label, tone) = if querying {
            ("Checking...".to_string(), StatusTone::Neutral)
        } else {
            match &self.lifecycle {
                BotLifecycleState::Active => ("Active".to_string(), StatusTone::Positive),
                BotLifecycleState::Inactive => ("Inactive".to_string(), StatusTone::Negative),
                BotLifecycleState::Unknown => match &self.unrecognized_raw {
                    Some(raw) => (format!("Not initialized ({raw})"), StatusTone::Neutral),
                    None => ("Not initialized".to_string(), StatusTone::Neutral),
                },
                BotLifecycleState::Errored { message } => {
                    (format!("Error: {message}"), StatusTone::Alert)
                }
            }
        };

        AppViewModel {
            lifecycle: self.lifecycle.clone(),
            status_label,
            tone,
            busy,
            start_enabled: !busy && self.lifecycle != BotLifecycleState::Active,
            stop_enabled: !busy && self.lifecycle != BotLifecycleState::Inactive,
            refresh_enabled: !busy,
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn begin(&mut self, operation: Operation) {
        self.in_flight = Some(operation);
        self.dirty = true;
    }

    pub(crate) fn finish(&mut self) {
        self.in_flight = None;
        self.dirty = true;
    }

    pub(crate) fn apply_reading(&mut self, reading: StatusReading) {
        self.unrecognized_raw = None;
        self.lifecycle = match reading {
            StatusReading::Active => BotLifecycleState::Active,
            StatusReading::Inactive => BotLifecycleState::Inactive,
            StatusReading::Unrecognized { raw } => {
                self.unrecognized_raw = raw;
                BotLifecycleState::Unknown
            }
            StatusReading::Failed { message } => BotLifecycleState::Errored { message },
        };
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, message: String) {
        self.notice = Some(message);
        self.dirty = true;
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.dirty = true;
        }
    }
}
