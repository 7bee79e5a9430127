//! Workflow orchestration service.
//!
//! Every transition runs the same pipeline: open a store transaction, lock
//! the owning project, authorize against the policy table, fire the status
//! machine, write the changed rows, commit, then hand the effect list to
//! the [`EffectDispatcher`]. Anything that fails before commit leaves the
//! store untouched; anything that fails after commit is logged and dropped.

pub mod access;
pub mod assets;
pub mod automation;
pub mod error;
mod load;
pub mod notifications;
pub mod permissions;
pub mod projects;
pub mod requirements;
pub mod reviews;
pub mod revisions;
pub mod tasks;

use std::sync::Arc;

use agency_core::effects::Effect;
use agency_db::{EntityStore, StoreTx};
use agency_events::{EffectDispatcher, EventBus, NotificationFanout};

pub use error::{WorkflowError, WorkflowResult};

/// Default idle window for the automation surface.
pub const DEFAULT_IDLE_PROJECT_DAYS: i64 = 7;

/// Tunables for the workflow service.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowSettings {
    /// Non-terminal projects untouched for this many days count as idle.
    pub idle_project_days: i64,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            idle_project_days: DEFAULT_IDLE_PROJECT_DAYS,
        }
    }
}

/// The orchestration service shared by every request handler.
pub struct Workflow {
    store: Arc<dyn EntityStore>,
    dispatcher: EffectDispatcher,
    settings: WorkflowSettings,
}

impl Workflow {
    pub fn new(store: Arc<dyn EntityStore>, bus: Arc<EventBus>, settings: WorkflowSettings) -> Self {
        let fanout = NotificationFanout::new(Arc::clone(&store), Arc::clone(&bus));
        Self {
            store,
            dispatcher: EffectDispatcher::new(fanout, bus),
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    pub fn settings(&self) -> WorkflowSettings {
        self.settings
    }

    async fn begin(&self) -> WorkflowResult<Box<dyn StoreTx>> {
        Ok(self.store.begin().await?)
    }

    /// Commit and run the post-commit effects.
    async fn commit(&self, tx: Box<dyn StoreTx>, effects: Vec<Effect>) -> WorkflowResult<()> {
        tx.commit().await?;
        if !effects.is_empty() {
            self.dispatcher.dispatch(effects).await;
        }
        Ok(())
    }
}
