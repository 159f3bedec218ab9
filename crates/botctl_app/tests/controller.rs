use std::net::TcpListener;
use std::sync::Arc;

use botctl_app::{DispatchError, LifecycleController};
use botctl_core::{BotLifecycleState, ControlAction};
use botctl_engine::{ClientSettings, Endpoint, FailureKind, ReqwestControlClient};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    botctl_logging::initialize_for_tests();
}

fn controller_for(uri: &str) -> LifecycleController {
    let endpoint = Endpoint::parse(uri).expect("endpoint parses");
    let client = ReqwestControlClient::new(ClientSettings::new(endpoint)).expect("client builds");
    LifecycleController::new(Arc::new(client))
}

async fn mount_status(server: &MockServer, status: &str) {
    Mock::given(method("GET"))
        .and(path("/bot/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn mount_with_inactive_bot() {
    init_logging();
    let server = MockServer::start().await;
    mount_status(&server, "inactive").await;
    let controller = controller_for(&server.uri());

    assert_eq!(controller.lifecycle(), BotLifecycleState::Unknown);
    let state = controller.refresh_status().await.expect("not busy");

    assert_eq!(state, BotLifecycleState::Inactive);
    let view = controller.view();
    assert!(view.start_enabled);
    assert!(!view.stop_enabled);
}

#[tokio::test]
async fn unrecognized_status_is_unknown() {
    init_logging();
    let server = MockServer::start().await;
    mount_status(&server, "starting").await;
    let controller = controller_for(&server.uri());

    let state = controller.refresh_status().await.unwrap();
    assert_eq!(state, BotLifecycleState::Unknown);
    assert_eq!(controller.view().status_label, "Not initialized (starting)");
}

#[tokio::test]
async fn missing_status_field_is_unknown() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bot/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    let controller = controller_for(&server.uri());

    assert_eq!(
        controller.refresh_status().await.unwrap(),
        BotLifecycleState::Unknown
    );
}

#[tokio::test]
async fn non_success_status_query_is_errored() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bot/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let controller = controller_for(&server.uri());

    match controller.refresh_status().await.unwrap() {
        BotLifecycleState::Errored { message } => {
            assert!(!message.is_empty());
            assert!(message.contains("500"));
        }
        other => panic!("expected Errored, got {other:?}"),
    }
}

#[tokio::test]
async fn repeated_refresh_is_stable() {
    init_logging();
    let server = MockServer::start().await;
    mount_status(&server, "active").await;
    let controller = controller_for(&server.uri());

    for _ in 0..3 {
        assert_eq!(
            controller.refresh_status().await.unwrap(),
            BotLifecycleState::Active
        );
    }
}

#[tokio::test]
async fn start_then_reconcile_to_active() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bot/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "inactive" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let controller = controller_for(&server.uri());
    assert_eq!(
        controller.refresh_status().await.unwrap(),
        BotLifecycleState::Inactive
    );

    Mock::given(method("POST"))
        .and(path("/bot/control"))
        .and(body_json(json!({ "action": "start" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Bot activated" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bot/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "active" })))
        .expect(1)
        .mount(&server)
        .await;

    let state = controller
        .dispatch_action(ControlAction::Start)
        .await
        .expect("start accepted");

    assert_eq!(state, BotLifecycleState::Active);
    assert!(controller.view().notice.is_none());
    server.verify().await;
}

#[tokio::test]
async fn stop_then_reconcile_to_inactive() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot/control"))
        .and(body_json(json!({ "action": "stop" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Bot deactivated" })))
        .mount(&server)
        .await;
    mount_status(&server, "inactive").await;
    let controller = controller_for(&server.uri());

    let state = controller.dispatch_action(ControlAction::Stop).await.unwrap();
    assert_eq!(state, BotLifecycleState::Inactive);
}

#[tokio::test]
async fn refused_command_is_surfaced_and_reconciled() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot/control"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "error": "Bot is not initialized" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bot/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "inactive" })))
        .expect(1)
        .mount(&server)
        .await;
    let controller = controller_for(&server.uri());

    let err = controller
        .dispatch_action(ControlAction::Start)
        .await
        .unwrap_err();

    match &err {
        DispatchError::Rejected { action, source } => {
            assert_eq!(*action, ControlAction::Start);
            assert_eq!(source.kind, FailureKind::HttpStatus(400));
            assert_eq!(source.message, "Bot is not initialized");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
    assert_eq!(controller.lifecycle(), BotLifecycleState::Inactive);
    assert_eq!(
        controller.view().notice.as_deref(),
        Some("Error: Bot is not initialized")
    );
    server.verify().await;
}

/// Address nothing listens on.
fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

#[tokio::test]
async fn stop_while_endpoint_down_keeps_state() {
    init_logging();
    let controller = controller_for(&closed_endpoint());
    let before = controller.refresh_status().await.unwrap();
    assert!(matches!(before, BotLifecycleState::Errored { .. }));

    let err = controller
        .dispatch_action(ControlAction::Stop)
        .await
        .unwrap_err();

    match &err {
        DispatchError::Unreachable { action, source } => {
            assert_eq!(*action, ControlAction::Stop);
            assert!(source.is_transport());
        }
        other => panic!("expected Unreachable, got {other:?}"),
    }
    assert_eq!(controller.lifecycle(), before);
    let view = controller.view();
    assert!(!view.busy);
    assert!(view.notice.is_some());

    controller.dismiss_notice();
    assert!(controller.view().notice.is_none());
}

#[tokio::test]
async fn subscribers_see_settled_state() {
    init_logging();
    let server = MockServer::start().await;
    mount_status(&server, "active").await;
    let controller = controller_for(&server.uri());
    let mut views = controller.subscribe();

    controller.refresh_status().await.unwrap();

    assert!(views.has_changed().unwrap());
    let view = views.borrow_and_update().clone();
    assert_eq!(view.lifecycle, BotLifecycleState::Active);
    assert_eq!(view.status_label, "Active");
    assert!(!view.busy);
}
