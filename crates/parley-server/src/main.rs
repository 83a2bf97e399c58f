mod config;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    http::{Method, header::CONTENT_TYPE, HeaderName},
    response::IntoResponse,
    routing::get,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use parley_api::AppStateInner;
use parley_db::Database;
use parley_gateway::connection;
use parley_gateway::dispatcher::Dispatcher;
use parley_gateway::notifier::Notifier;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parley=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database and the notifier that fans its changes out
    let db = Database::open(&config.db_path)?;
    let dispatcher = Dispatcher::new();
    let shutdown = CancellationToken::new();
    let notifier = Notifier::spawn(db.subscribe_changes(), dispatcher.clone(), shutdown.clone());

    let app_state = AppStateInner::new(db);

    let realtime = Router::new()
        .route("/realtime", get(ws_upgrade))
        .with_state(dispatcher);

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static("namelogin")]);

    let app = parley_api::routes::router(app_state)
        .merge(realtime)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    info!("Parley listening on {}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    notifier.await?;
    info!("Parley stopped");

    Ok(())
}

async fn ws_upgrade(State(dispatcher): State<Dispatcher>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection::handle_connection(socket, dispatcher))
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!("failed to install SIGTERM handler: {}", e);
                    ctrl_c.await.ok();
                    shutdown.cancel();
                    return;
                }
            };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
    // Stop the notifier as soon as the listener starts draining
    shutdown.cancel();
}
