//! Realtime gateway: WebSocket connection management, heartbeat and the
//! authenticated upgrade handler.

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::{
    authenticate_upgrade, handle_frame, ws_handler, ClientFrame, CLOSE_UNAUTHORIZED,
};
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
