use axum::{Json, body::Bytes, extract::State};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::state::AppState;

/// POST /keybot: room message webhook.
///
/// Always acknowledged with 200; outcomes are reported in the room and in
/// the logs. Dropping the request (client gone) cancels any notification
/// still in flight.
pub async fn room_message(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    if let Ok(outcome) = state.triage.handle_payload(&body, &cancel).await {
        debug!(?outcome, "webhook handled");
    }

    Json(json!(["OK"]))
}
