use agency_core::types::DbId;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::middleware::auth::{bearer_token, AuthUser};
use crate::state::AppState;

/// Close code sent when the handshake credential is missing or invalid.
pub const CLOSE_UNAUTHORIZED: u16 = 4401;

/// Query parameters accepted on the upgrade request.
#[derive(Debug, Default, Deserialize)]
pub struct WsParams {
    /// Access token, for clients that cannot set headers on the upgrade.
    pub token: Option<String>,
}

/// Frames a client may send after connecting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe { project_id: DbId },
    Unsubscribe { project_id: DbId },
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// The credential comes from `?token=` or `Authorization: Bearer`. An
/// invalid or expired credential still completes the upgrade, then gets a
/// close frame immediately so browser clients can read the reason.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = params.token.as_deref().or_else(|| bearer_token(&headers));
    let auth = authenticate_upgrade(token, &state);

    ws.on_upgrade(move |socket| async move {
        match auth {
            Ok(user) => handle_socket(socket, state, user).await,
            Err(frame) => reject(socket, frame).await,
        }
    })
}

/// Resolve the handshake credential, or the close frame the socket receives
/// in place of a session.
pub fn authenticate_upgrade(token: Option<&str>, state: &AppState) -> Result<AuthUser, CloseFrame> {
    match token.map(|t| AuthUser::from_token(t, state)) {
        Some(Ok(user)) => Ok(user),
        _ => Err(CloseFrame {
            code: CLOSE_UNAUTHORIZED,
            reason: "Invalid or expired token".into(),
        }),
    }
}

async fn reject(mut socket: WebSocket, frame: CloseFrame) {
    tracing::debug!(code = frame.code, "WebSocket handshake rejected: invalid credential");
    let _ = socket.send(Message::Close(Some(frame))).await;
}

/// Manage a single authenticated connection.
///
/// Registers with `WsManager` (which puts it on `user:{id}`), spawns a
/// sender task that drains the manager channel into the sink, and processes
/// subscribe/unsubscribe frames until the client goes away.
async fn handle_socket(socket: WebSocket, state: AppState, user: AuthUser) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let ws_manager = state.ws_manager.clone();
    tracing::info!(conn_id = %conn_id, user_id = user.user_id, "WebSocket connected");

    let mut rx = ws_manager.add(conn_id.clone(), user.user_id).await;
    let (mut sink, mut stream) = socket.split();

    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(Message::Text(text)) => {
                let reply = handle_frame(&state, &conn_id, user, text.as_str()).await;
                ws_manager
                    .send_to_connection(&conn_id, Message::Text(reply.to_string().into()))
                    .await;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    ws_manager.remove(&conn_id).await;
    send_task.abort();
    tracing::info!(conn_id = %conn_id, user_id = user.user_id, "WebSocket disconnected");
}

/// Apply one client frame and build the acknowledgement sent back.
///
/// Joining a project channel requires the same visibility as reading the
/// project over HTTP. A refused subscription leaves the connection's
/// channels untouched.
pub async fn handle_frame(
    state: &AppState,
    conn_id: &str,
    user: AuthUser,
    text: &str,
) -> serde_json::Value {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => return json!({ "type": "error", "message": format!("Unrecognized frame: {e}") }),
    };

    match frame {
        ClientFrame::Subscribe { project_id } => {
            if let Err(e) = state.workflow.get_project(&user.actor(), project_id).await {
                let message = e.into_core().to_string();
                return json!({ "type": "error", "project_id": project_id, "message": message });
            }
            state.ws_manager.subscribe(conn_id, project_id).await;
            tracing::debug!(conn_id, project_id, "Joined project channel");
            json!({ "type": "subscribed", "channel": format!("project:{project_id}") })
        }
        ClientFrame::Unsubscribe { project_id } => {
            state.ws_manager.unsubscribe(conn_id, project_id).await;
            json!({ "type": "unsubscribed", "channel": format!("project:{project_id}") })
        }
    }
}
