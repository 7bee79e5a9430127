pub mod assets;
pub mod automation;
pub mod notifications;
pub mod permissions;
pub mod presence;
pub mod projects;
pub mod requirements;
pub mod revisions;
pub mod reviews;
pub mod tasks;
