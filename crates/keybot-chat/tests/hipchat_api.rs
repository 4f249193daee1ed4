use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use serde_json::{Value, json};

use keybot_chat::client::SCOPE_SEND_NOTIFICATION;
use keybot_chat::{ChatError, HipChat, Notifier, NotifyError, RoomRegistry};
use keybot_types::models::Reply;

#[derive(Clone, Default)]
struct MockApi {
    token_requests: Arc<Mutex<Vec<(String, String)>>>,
    notifications: Arc<Mutex<Vec<(String, String, Value)>>>,
}

async fn token(
    State(api): State<MockApi>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<Value>, StatusCode> {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    if !auth.starts_with("Basic ") {
        return Err(StatusCode::UNAUTHORIZED);
    }
    api.token_requests.lock().unwrap().push((auth, body));
    Ok(Json(json!({
        "access_token": "room-token",
        "expires_in": 3599,
        "group_id": 1,
        "scope": "send_notification",
        "token_type": "bearer"
    })))
}

async fn notification(
    State(api): State<MockApi>,
    Path(room_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    if room_id == "500" {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    api.notifications.lock().unwrap().push((room_id, auth, body));
    StatusCode::NO_CONTENT
}

async fn spawn_mock() -> (String, MockApi) {
    let api = MockApi::default();
    let app = Router::new()
        .route("/v2/oauth/token", post(token))
        .route("/v2/room/{room_id}/notification", post(notification))
        .with_state(api.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v2/", addr), api)
}

#[tokio::test]
async fn token_exchange_uses_client_credentials() {
    let (base, api) = spawn_mock().await;
    let hc = HipChat::new(base);

    let token = hc
        .generate_token("oauth-id", "oauth-secret", &[SCOPE_SEND_NOTIFICATION])
        .await
        .unwrap();
    assert_eq!(token.access_token, "room-token");
    assert_eq!(token.expires_in, Some(3599));

    let requests = api.token_requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (_, body) = &requests[0];
    assert!(body.contains("grant_type=client_credentials"));
    assert!(body.contains("scope=send_notification"));
}

#[tokio::test]
async fn installed_room_receives_notification() {
    let (base, api) = spawn_mock().await;
    let hc = HipChat::new(base);
    let token = hc
        .generate_token("oauth-id", "oauth-secret", &[SCOPE_SEND_NOTIFICATION])
        .await
        .unwrap();

    let registry = RoomRegistry::new();
    registry.register("1234", Arc::new(hc.token_client(&token))).await;

    let notifier = Notifier::new(registry, Duration::from_secs(5));
    notifier
        .notify("1234", &Reply::success("Added = 1 key"))
        .await
        .unwrap();

    let sent = api.notifications.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (room_id, auth, body) = &sent[0];
    assert_eq!(room_id, "1234");
    assert_eq!(auth, "Bearer room-token");
    assert_eq!(body["message"], "Added = 1 key");
    assert_eq!(body["message_format"], "html");
    assert_eq!(body["color"], "blue");
}

#[tokio::test]
async fn server_error_surfaces_as_transport_failure() {
    let (base, _api) = spawn_mock().await;
    let hc = HipChat::new(base);
    let token = hc.generate_token("id", "secret", &[SCOPE_SEND_NOTIFICATION]).await.unwrap();

    let registry = RoomRegistry::new();
    registry.register("500", Arc::new(hc.token_client(&token))).await;

    let notifier = Notifier::new(registry, Duration::from_secs(5));
    let err = notifier
        .notify("500", &Reply::error("Error saving"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        NotifyError::Transport(ChatError::Status { status: 500, .. })
    ));
}
