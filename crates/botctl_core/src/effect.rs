use crate::ControlAction;

/// Work the runtime must perform against the remote control endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// `GET {base}/bot/status`, answered with `Msg::StatusReceived`.
    QueryStatus,
    /// `POST {base}/bot/control`, answered with `Msg::ActionCompleted`.
    SendAction(ControlAction),
}
