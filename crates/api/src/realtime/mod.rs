//! Bridge from the in-process event bus to connected WebSocket clients.

mod router;

pub use router::RealtimeRouter;
