//! Credential primitives.
//!
//! - [`jwt`] -- bearer access-token generation and validation, plus the
//!   SHA-256 digest used to compare automation API keys.

pub mod jwt;
