//! Agency API server library.
//!
//! Exposes the building blocks (config, state, error mapping, routes, the
//! realtime gateway) so integration tests and the binary entrypoint share
//! one router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod realtime;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod ws;
