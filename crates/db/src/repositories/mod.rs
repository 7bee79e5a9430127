//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&mut PgConnection` as the first argument, so callers can
//! pass either a pooled connection or an open transaction.

pub mod asset_repo;
pub mod fiverr_account_repo;
pub mod notification_repo;
pub mod project_repo;
pub mod requirement_repo;
pub mod review_repo;
pub mod revision_repo;
pub mod task_repo;
pub mod user_repo;

pub use asset_repo::AssetRepo;
pub use fiverr_account_repo::FiverrAccountRepo;
pub use notification_repo::NotificationRepo;
pub use project_repo::ProjectRepo;
pub use requirement_repo::RequirementRepo;
pub use review_repo::ReviewRepo;
pub use revision_repo::RevisionRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
