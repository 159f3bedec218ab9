use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use botctl_core::{
    update, ActionOutcome, AppState, AppViewModel, BotLifecycleState, ControlAction, Effect, Msg,
    StatusReading,
};
use botctl_engine::{Command, ControlClient, ControlError, StatusReport};
use botctl_logging::{ctl_debug, ctl_info, ctl_warn};
use tokio::sync::watch;

/// Returned when an operation is requested while another one is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("another operation is already in progress")]
pub struct Busy;

/// A control command that did not go through.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Busy(#[from] Busy),
    /// The endpoint could not be reached; the lifecycle state was left alone.
    #[error("{action} failed, endpoint unreachable: {source}")]
    Unreachable {
        action: ControlAction,
        source: ControlError,
    },
    /// The endpoint answered with a refusal or an unreadable reply. The state
    /// has already been reconciled by the time this is returned.
    #[error("{action} failed: {source}")]
    Rejected {
        action: ControlAction,
        source: ControlError,
    },
}

/// Owns the bot lifecycle state and runs every call to the remote endpoint.
///
/// Messages go through the pure [`update`] function; the effects it returns are
/// executed here, one at a time, and their results fed back as messages. The
/// state lock is never held across an await.
pub struct LifecycleController {
    client: Arc<dyn ControlClient>,
    state: Mutex<AppState>,
    view_tx: watch::Sender<AppViewModel>,
    next_op: AtomicU64,
}

impl LifecycleController {
    pub fn new(client: Arc<dyn ControlClient>) -> Self {
        let state = AppState::new();
        let (view_tx, _) = watch::channel(state.view());
        Self {
            client,
            state: Mutex::new(state),
            view_tx,
            next_op: AtomicU64::new(1),
        }
    }

    pub fn lifecycle(&self) -> BotLifecycleState {
        self.lock_state().lifecycle().clone()
    }

    pub fn view(&self) -> AppViewModel {
        self.lock_state().view()
    }

    /// Receiver that wakes on every observable state change.
    pub fn subscribe(&self) -> watch::Receiver<AppViewModel> {
        self.view_tx.subscribe()
    }

    /// Queries the endpoint once and returns the settled state.
    ///
    /// Remote failures end up in the state as `Errored`; only a concurrent
    /// operation makes this return an error.
    pub async fn refresh_status(&self) -> Result<BotLifecycleState, Busy> {
        let op = self.next_op.fetch_add(1, Ordering::Relaxed);
        let effects = self.apply(Msg::RefreshRequested);
        if effects.is_empty() {
            ctl_debug!("op#{} refresh rejected: busy", op);
            return Err(Busy);
        }

        ctl_debug!("op#{} refresh", op);
        self.run_effects(op, effects).await;
        let lifecycle = self.lifecycle();
        ctl_info!("op#{} status settled: {:?}", op, lifecycle);
        Ok(lifecycle)
    }

    /// Sends `action` and, unless the endpoint was unreachable, reconciles with
    /// exactly one status query once the command has settled.
    pub async fn dispatch_action(
        &self,
        action: ControlAction,
    ) -> Result<BotLifecycleState, DispatchError> {
        let op = self.next_op.fetch_add(1, Ordering::Relaxed);
        let effects = self.apply(Msg::ActionRequested(action));
        if effects.is_empty() {
            ctl_debug!("op#{} {} rejected: busy", op, action);
            return Err(Busy.into());
        }

        ctl_info!("op#{} dispatch {}", op, action);
        match self.run_effects(op, effects).await {
            None => Ok(self.lifecycle()),
            Some(source) if source.is_transport() => {
                Err(DispatchError::Unreachable { action, source })
            }
            Some(source) => Err(DispatchError::Rejected { action, source }),
        }
    }

    pub fn dismiss_notice(&self) {
        self.apply(Msg::NoticeDismissed);
    }

    /// Drains the effect queue. Returns the command failure, if any.
    async fn run_effects(&self, op: u64, effects: Vec<Effect>) -> Option<ControlError> {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut command_failure = None;

        while let Some(effect) = queue.pop_front() {
            let msg = match effect {
                Effect::QueryStatus => {
                    let reading = reading_from(self.client.query_status().await);
                    ctl_debug!("op#{} status reading {:?}", op, reading);
                    Msg::StatusReceived(reading)
                }
                Effect::SendAction(action) => {
                    let outcome = match self.client.send_command(map_action(action)).await {
                        Ok(receipt) => {
                            // Only a status query may set the state.
                            ctl_debug!("op#{} {} accepted, reply {}", op, action, receipt.body);
                            ActionOutcome::Accepted
                        }
                        Err(err) => {
                            ctl_warn!("op#{} {} failed: {}", op, action, err);
                            let outcome = outcome_for(&err);
                            command_failure = Some(err);
                            outcome
                        }
                    };
                    Msg::ActionCompleted { action, outcome }
                }
            };
            queue.extend(self.apply(msg));
        }

        command_failure
    }

    fn apply(&self, msg: Msg) -> Vec<Effect> {
        let mut guard = self.lock_state();
        let state = std::mem::take(&mut *guard);
        let (mut state, effects) = update(state, msg);
        let view = state.view();
        let was_dirty = state.consume_dirty();
        *guard = state;
        // Publish before releasing the lock so subscribers see views in state order.
        if was_dirty {
            self.view_tx.send_replace(view);
        }
        effects
    }

    fn lock_state(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn map_action(action: ControlAction) -> Command {
    match action {
        ControlAction::Start => Command::Start,
        ControlAction::Stop => Command::Stop,
    }
}

fn reading_from(result: Result<StatusReport, ControlError>) -> StatusReading {
    match result {
        Ok(report) => StatusReading::from_reported(report.status.as_deref()),
        Err(err) => StatusReading::Failed {
            message: err.to_string(),
        },
    }
}

fn outcome_for(err: &ControlError) -> ActionOutcome {
    if err.is_transport() {
        ActionOutcome::Unreachable {
            message: err.to_string(),
        }
    } else {
        ActionOutcome::Rejected {
            message: err.message.clone(),
        }
    }
}
