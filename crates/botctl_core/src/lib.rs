//! Bot control core: pure lifecycle state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{ActionOutcome, Msg, StatusReading};
pub use state::{AppState, BotLifecycleState, ControlAction, Operation, ParseActionError};
pub use update::update;
pub use view_model::{AppViewModel, StatusTone};
