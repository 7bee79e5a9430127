use agency_core::error::CoreError;
use agency_db::StoreError;

/// Everything a workflow operation can fail with.
///
/// `Core` errors are caller mistakes (unknown id, denied, illegal state,
/// duplicate) and abort before any write. `Store` errors are failures of
/// the underlying store.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl WorkflowError {
    /// Collapse into the domain taxonomy; unique violations become conflicts.
    pub fn into_core(self) -> CoreError {
        match self {
            WorkflowError::Core(e) => e,
            WorkflowError::Store(e) => e.into(),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
