use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use tracing::{error, info};

use keybot_chat::client::SCOPE_SEND_NOTIFICATION;
use keybot_types::api::InstallRequest;

use crate::state::AppState;

/// POST /installable: the platform hands over OAuth credentials for a room.
/// We trade them for a notification token and register a client for that
/// room, replacing any earlier install.
pub async fn installable(
    State(state): State<AppState>,
    Json(req): Json<InstallRequest>,
) -> Result<Json<Value>, StatusCode> {
    let room_id = req.room_id.to_string();
    info!(room_id = %room_id, group_id = ?req.group_id, "install request");

    let token = state
        .hipchat
        .generate_token(&req.oauth_id, &req.oauth_secret, &[SCOPE_SEND_NOTIFICATION])
        .await
        .map_err(|e| {
            error!(room_id = %room_id, error = %e, "token exchange failed");
            StatusCode::BAD_GATEWAY
        })?;

    state
        .registry
        .register(room_id, Arc::new(state.hipchat.token_client(&token)))
        .await;

    Ok(Json(json!(["OK"])))
}
