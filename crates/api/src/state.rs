use std::sync::Arc;

use agency_workflow::Workflow;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Orchestration service; owns the entity store and effect dispatcher.
    pub workflow: Arc<Workflow>,
    /// Server configuration (JWT secret, automation key, timeouts).
    pub config: Arc<ServerConfig>,
    /// Realtime gateway connections and presence.
    pub ws_manager: Arc<WsManager>,
}
