//! Request authentication extractors.
//!
//! - [`auth::AuthUser`] -- the caller identified by a JWT Bearer token.
//! - [`auth::AutomationKey`] -- the automation surface, identified by the
//!   `X-API-Key` header and acting as the configured admin.

pub mod auth;
