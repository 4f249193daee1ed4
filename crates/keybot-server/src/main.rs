mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use keybot_api::state::{AppState, AppStateInner};
use keybot_api::store::SqliteKeyStore;
use keybot_api::triage::Triage;
use keybot_chat::{HipChat, Notifier, RoomRegistry};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "keybot=debug,keybot_api=debug,keybot_chat=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(keybot_db::Database::open(&config.db_path)?);
    match db.ping() {
        Ok(()) => info!("Database ping successful"),
        Err(e) => warn!("Database ping failed: {}", e),
    }

    // Outbound chat API; the client timeout also bounds the install token exchange
    let http = reqwest::Client::builder()
        .timeout(config.notify_timeout)
        .build()?;
    let hipchat = HipChat::with_client(http, config.hipchat_api.clone());

    // Shared state
    let registry = RoomRegistry::new();
    let triage = Triage::new(
        config.trigger,
        Arc::new(SqliteKeyStore::new(db)),
        Notifier::new(registry.clone(), config.notify_timeout),
        config.store_timeout,
    );
    let state: AppState = Arc::new(AppStateInner {
        triage,
        registry,
        hipchat,
        base_url: config.base_url.clone(),
    });

    let app = keybot_api::router(state, &config.static_dir).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("KeyBot v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);
    info!("Base URL {}, trigger {:?}", config.base_url, config.trigger);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
