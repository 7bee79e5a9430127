use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agency_api::config::ServerConfig;
use agency_api::realtime::RealtimeRouter;
use agency_api::router::build_app_router;
use agency_api::state::AppState;
use agency_api::ws;
use agency_db::{EntityStore, PgStore};
use agency_events::EventBus;
use agency_workflow::{Workflow, WorkflowSettings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "agency_api=debug,agency_workflow=debug,agency_events=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        automation = config.automation.is_some(),
        "Loaded server configuration"
    );

    // --- Database ---
    let pool = agency_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    agency_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    agency_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus + workflow ---
    let event_bus = Arc::new(EventBus::default());
    let store: Arc<dyn EntityStore> = Arc::new(PgStore::new(pool));
    let workflow = Arc::new(Workflow::new(
        store,
        Arc::clone(&event_bus),
        WorkflowSettings {
            idle_project_days: config.idle_project_days,
        },
    ));

    // --- Realtime gateway ---
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));
    let realtime_router = RealtimeRouter::new(Arc::clone(&ws_manager));
    let mut router_handle = tokio::spawn(realtime_router.run(event_bus.subscribe()));
    tracing::info!("Realtime router started");

    // --- App state ---
    let state = AppState {
        workflow: Arc::clone(&workflow),
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;
    heartbeat_handle.abort();

    // The workflow holds a bus handle too; both must go for the router to see Closed.
    drop(workflow);
    drop(event_bus);
    if tokio::time::timeout(drain, &mut router_handle).await.is_err() {
        tracing::warn!("Realtime router did not stop within the shutdown timeout");
        router_handle.abort();
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or (on Unix) SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
