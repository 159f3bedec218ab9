use botctl_core::{AppViewModel, StatusTone};
use chrono::NaiveTime;

/// Renders the control panel as plain text lines.
pub fn render(view: &AppViewModel, at: NaiveTime) -> Vec<String> {
    let marker = match view.tone {
        StatusTone::Positive => "+",
        StatusTone::Negative => "-",
        StatusTone::Neutral => "~",
        StatusTone::Alert => "!",
    };

    let mut lines = vec![
        format!(
            "[{}] Status: {} {}",
            at.format("%H:%M:%S"),
            marker,
            view.status_label
        ),
        format!(
            "  {}  {}  {}",
            affordance("start", view.start_enabled),
            affordance("stop", view.stop_enabled),
            affordance("refresh", view.refresh_enabled)
        ),
    ];
    if let Some(notice) = &view.notice {
        lines.push(format!("  >> {notice}"));
    }
    lines
}

fn affordance(name: &str, enabled: bool) -> String {
    if enabled {
        format!("[{name}]")
    } else {
        format!(" {name}-")
    }
}

#[cfg(test)]
mod tests {
    use super::render;
    use botctl_core::{update, ActionOutcome, AppState, ControlAction, Msg, StatusReading};
    use chrono::NaiveTime;
    use pretty_assertions::assert_eq;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 1).unwrap()
    }

    #[test]
    fn inactive_panel_offers_start_only() {
        let (state, _) = update(AppState::new(), Msg::RefreshRequested);
        let (state, _) = update(state, Msg::StatusReceived(StatusReading::Inactive));

        assert_eq!(
            render(&state.view(), noon()),
            vec![
                "[12:00:01] Status: - Inactive".to_string(),
                "  [start]   stop-  [refresh]".to_string(),
            ]
        );
    }

    #[test]
    fn checking_panel_disables_everything() {
        let (state, _) = update(AppState::new(), Msg::RefreshRequested);

        assert_eq!(
            render(&state.view(), noon()),
            vec![
                "[12:00:01] Status: ~ Checking...".to_string(),
                "   start-   stop-   refresh-".to_string(),
            ]
        );
    }

    #[test]
    fn error_panel_shows_alert_marker() {
        let (state, _) = update(AppState::new(), Msg::RefreshRequested);
        let (state, _) = update(
            state,
            Msg::StatusReceived(StatusReading::Failed {
                message: "network error".to_string(),
            }),
        );

        let lines = render(&state.view(), noon());
        assert_eq!(lines[0], "[12:00:01] Status: ! Error: network error");
    }

    #[test]
    fn notice_is_appended_until_dismissed() {
        let (state, _) = update(AppState::new(), Msg::ActionRequested(ControlAction::Stop));
        let (state, _) = update(
            state,
            Msg::ActionCompleted {
                action: ControlAction::Stop,
                outcome: ActionOutcome::Unreachable {
                    message: "connection refused".to_string(),
                },
            },
        );
        let lines = render(&state.view(), noon());
        assert_eq!(lines.last().unwrap(), "  >> Error: connection refused");

        let (state, _) = update(state, Msg::NoticeDismissed);
        assert_eq!(render(&state.view(), noon()).len(), 2);
    }
}
