//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where
//!   the entity has user-editable fields

pub mod asset;
pub mod fiverr_account;
pub mod notification;
pub mod project;
pub mod requirement;
pub mod review;
pub mod revision;
pub mod task;
pub mod user;
