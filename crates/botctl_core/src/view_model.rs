use crate::BotLifecycleState;

/// How the presentation layer should colour the status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTone {
    Positive,
    Negative,
    #[default]
    Neutral,
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub lifecycle: BotLifecycleState,
    pub status_label: String,
    pub tone: StatusTone,
    /// An operation is talking to the endpoint; all affordances are gated.
    pub busy: bool,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub refresh_enabled: bool,
    /// Last surfaced command failure, until dismissed.
    pub notice: Option<String>,
    pub dirty: bool,
}
