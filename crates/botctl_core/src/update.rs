use crate::{ActionOutcome, AppState, Effect, Msg, Operation};

/// Pure update function: applies a message to state and returns any effects.
///
/// Requests arriving while another operation is in flight are rejected: the
/// state is returned untouched and no effects are produced.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::RefreshRequested => {
            if state.is_busy() {
                return (state, Vec::new());
            }
            state.begin(Operation::Refresh);
            vec![Effect::QueryStatus]
        }
        Msg::ActionRequested(action) => {
            if state.is_busy() {
                return (state, Vec::new());
            }
            state.begin(Operation::Dispatch(action));
            vec![Effect::SendAction(action)]
        }
        Msg::StatusReceived(reading) => match state.in_flight() {
            Some(Operation::Refresh | Operation::Reconcile(_)) => {
                state.apply_reading(reading);
                state.finish();
                Vec::new()
            }
            // Stale reading: nothing asked for it.
            Some(Operation::Dispatch(_)) | None => Vec::new(),
        },
        Msg::ActionCompleted { action, outcome } => {
            if state.in_flight() != Some(Operation::Dispatch(action)) {
                return (state, Vec::new());
            }
            match outcome {
                ActionOutcome::Accepted => {
                    state.begin(Operation::Reconcile(action));
                    vec![Effect::QueryStatus]
                }
                ActionOutcome::Rejected { message } => {
                    state.set_notice(format!("Error: {message}"));
                    state.begin(Operation::Reconcile(action));
                    vec![Effect::QueryStatus]
                }
                ActionOutcome::Unreachable { message } => {
                    // Nothing to reconcile against; keep the last known state.
                    state.set_notice(format!("Error: {message}"));
                    state.finish();
                    Vec::new()
                }
            }
        }
        Msg::NoticeDismissed => {
            state.clear_notice();
            Vec::new()
        }
    };

    (state, effects)
}
