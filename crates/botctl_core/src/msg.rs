use crate::ControlAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Session mounted or the user asked for a fresh status.
    RefreshRequested,
    /// User clicked Start or Stop.
    ActionRequested(ControlAction),
    /// A status query settled.
    StatusReceived(StatusReading),
    /// A control command settled.
    ActionCompleted {
        action: ControlAction,
        outcome: ActionOutcome,
    },
    /// User acknowledged the surfaced failure notice.
    NoticeDismissed,
}

/// Settled result of one status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReading {
    Active,
    Inactive,
    /// Well-formed reply whose status is absent or outside the known values.
    Unrecognized { raw: Option<String> },
    /// Transport failure, non-2xx reply or malformed body.
    Failed { message: String },
}

impl StatusReading {
    /// Interprets the `status` field of a well-formed reply. Matching is exact.
    pub fn from_reported(status: Option<&str>) -> Self {
        match status {
            Some("active") => Self::Active,
            Some("inactive") => Self::Inactive,
            other => Self::Unrecognized {
                raw: other.map(ToOwned::to_owned),
            },
        }
    }
}

/// Settled result of one control command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Accepted,
    /// The endpoint answered but refused the command or replied with garbage.
    Rejected { message: String },
    /// The endpoint could not be reached at all.
    Unreachable { message: String },
}
