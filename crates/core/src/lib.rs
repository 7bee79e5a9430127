//! Pure domain layer for agency workflow orchestration.
//!
//! Everything here is free of I/O: status machines, the authorization
//! policy, scoring and tier rules, and the post-commit effect vocabulary.

#[macro_use]
mod macros;

pub mod asset;
pub mod channels;
pub mod effects;
pub mod error;
pub mod machine;
pub mod policy;
pub mod project;
pub mod requirement;
pub mod revision;
pub mod roles;
pub mod suggestion;
pub mod task;
pub mod tier;
pub mod types;
