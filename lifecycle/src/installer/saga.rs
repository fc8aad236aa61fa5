//! Install saga bookkeeping
//!
//! Installation touches the shared filesystem and two database tables. Each
//! completed step is recorded here so that a later failure can be compensated
//! in reverse order, leaving no partial installation behind.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::bundle;
use crate::db::{PageRepository, PluginRepository};

/// One completed install step, carrying what is needed to undo it
#[derive(Debug)]
pub enum SagaStep {
    /// Bundle files staged under the shared directory
    BundleStaged {
        shared_dir: PathBuf,
        /// Whether this install created the directory. A staging directory
        /// that already existed is never removed on unwind.
        created: bool,
    },
    /// Plugin and module rows committed
    RecordsInserted { user_id: String, plugin_id: String },
    /// Host page row created
    PageCreated { creator_id: String, route: String },
}

/// Ledger of completed install steps
#[derive(Debug, Default)]
pub struct InstallSaga {
    steps: Vec<SagaStep>,
}

impl InstallSaga {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed step
    pub fn record(&mut self, step: SagaStep) {
        debug!(?step, "Install step completed");
        self.steps.push(step);
    }

    /// Undo recorded steps in reverse order
    ///
    /// Compensation is best-effort: a failed undo is logged and the remaining
    /// steps still run, so as much as possible is cleaned up.
    pub async fn unwind(mut self, plugins: &PluginRepository, pages: &PageRepository) {
        while let Some(step) = self.steps.pop() {
            match step {
                SagaStep::PageCreated { creator_id, route } => {
                    match pages.delete_by_route(&creator_id, &route).await {
                        Ok(deleted) => debug!(deleted, route = %route, "Rolled back page record"),
                        Err(e) => {
                            warn!(route = %route, error = %e, "Failed to roll back page record");
                        }
                    }
                }
                SagaStep::RecordsInserted { user_id, plugin_id } => {
                    match plugins.delete_records(&user_id, &plugin_id).await {
                        Ok(deleted) => {
                            debug!(modules = deleted.modules, plugin_id = %plugin_id, "Rolled back plugin records");
                        }
                        Err(e) => {
                            warn!(plugin_id = %plugin_id, error = %e, "Failed to roll back plugin records");
                        }
                    }
                }
                SagaStep::BundleStaged {
                    shared_dir,
                    created,
                } => {
                    if !created {
                        debug!(dir = %shared_dir.display(), "Leaving pre-existing shared directory in place");
                        continue;
                    }
                    match bundle::remove_dir_if_present(&shared_dir).await {
                        Ok(_) => debug!(dir = %shared_dir.display(), "Removed staged bundle"),
                        Err(e) => {
                            warn!(dir = %shared_dir.display(), error = %e, "Failed to remove staged bundle");
                        }
                    }
                }
            }
        }
    }
}
