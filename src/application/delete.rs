//! Confirm-then-delete flow shared by the post and comment lists.

use std::sync::Arc;

use metrics::counter;
use tracing::{info, warn};

use crate::application::error::{ErrorChannel, ErrorReport, METRIC_REQUEST_FAILURE_TOTAL};
use crate::application::liveness::Liveness;
use crate::application::mutation::METRIC_MUTATION_TOTAL;
use crate::application::query::QueryStore;
use crate::application::resources::ResourceClient;
use crate::domain::drafts::Draft;
use crate::domain::types::RecordId;

/// Confirmation dialog holding the record picked for deletion.
#[derive(Debug, Clone)]
pub struct DeleteDialog<R> {
    target: Option<R>,
}

impl<R> DeleteDialog<R> {
    pub fn new() -> Self {
        Self { target: None }
    }

    pub fn open(&mut self, record: R) {
        self.target = Some(record);
    }

    pub fn is_open(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<&R> {
        self.target.as_ref()
    }

    /// Close the dialog, handing back whatever it held.
    pub fn close(&mut self) -> Option<R> {
        self.target.take()
    }
}

impl<R> Default for DeleteDialog<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Cancelled,
    /// Confirmed with no dialog open, or on a record that was never saved.
    Skipped,
    Deleted(RecordId),
    Failed(ErrorReport),
}

pub struct DeleteFlow<C: ResourceClient> {
    client: Arc<C>,
    errors: ErrorChannel,
    liveness: Liveness,
    store: QueryStore,
}

impl<C: ResourceClient> DeleteFlow<C> {
    pub fn new(client: Arc<C>, errors: ErrorChannel, liveness: Liveness, store: QueryStore) -> Self {
        Self {
            client,
            errors,
            liveness,
            store,
        }
    }

    pub fn cancel(&self, dialog: &mut DeleteDialog<C::Record>) -> DeleteOutcome {
        dialog.close();
        DeleteOutcome::Cancelled
    }

    /// Close the dialog and delete its target. A successful delete sends the
    /// list back to page 1 and always triggers a re-fetch; a failed one leaves
    /// the list as it was.
    pub async fn confirm(&self, dialog: &mut DeleteDialog<C::Record>) -> DeleteOutcome {
        let Some(id) = dialog.close().and_then(|record| record.id()) else {
            return DeleteOutcome::Skipped;
        };
        let resource = self.client.resource();
        self.errors.clear();

        match self.client.delete(id).await {
            Ok(_) => {
                counter!(METRIC_MUTATION_TOTAL, "resource" => resource, "operation" => "delete")
                    .increment(1);
                info!(resource, id, "record deleted");
                if self.liveness.is_alive() {
                    self.errors.clear();
                }
                self.store.restart();
                DeleteOutcome::Deleted(id)
            }
            Err(err) => {
                counter!(METRIC_REQUEST_FAILURE_TOTAL, "resource" => resource, "operation" => "delete")
                    .increment(1);
                warn!(resource, id, status = ?err.status(), error = %err, "delete failed");
                if self.liveness.is_alive() {
                    self.errors.report(&err);
                }
                DeleteOutcome::Failed(ErrorReport::from_error(&err))
            }
        }
    }
}
