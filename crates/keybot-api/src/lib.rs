pub mod connect;
pub mod extract;
pub mod install;
pub mod state;
pub mod store;
pub mod triage;
pub mod webhook;

use std::path::Path;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::state::AppState;

/// All add-on routes. Anything unmatched is served from `static_dir`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    Router::new()
        .route("/healthcheck", get(connect::healthcheck))
        .route("/", get(connect::descriptor))
        .route("/keybot-connect.json", get(connect::descriptor))
        .route("/config", get(connect::config))
        .route("/installable", post(install::installable))
        .route("/keybot", post(webhook::room_message))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}
