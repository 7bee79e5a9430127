//! Post-commit side effects for the agency workflow.
//!
//! - [`EventBus`]: in-process publish/subscribe hub for [`RealtimeEvent`]s,
//!   backed by `tokio::sync::broadcast`. The realtime gateway subscribes to
//!   it and pushes events to connected clients.
//! - [`NotificationFanout`]: persists one notification per recipient, each
//!   in its own store transaction, and announces it on the recipient's
//!   `user:{id}` channel.
//! - [`EffectDispatcher`]: executes the effect list a transition returned.

pub mod bus;
pub mod dispatcher;
pub mod fanout;

pub use bus::{EventBus, RealtimeEvent};
pub use dispatcher::{DispatchReport, EffectDispatcher};
pub use fanout::{FanoutReport, NotificationFanout};
