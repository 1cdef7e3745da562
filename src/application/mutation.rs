//! Create/edit form lifecycle for a single record.
//!
//! The controller owns the working draft. Validation runs locally before
//! anything is sent; the signed-in user is stamped onto a copy of the draft
//! at submit time so the draft itself never changes underneath the form.

use std::sync::Arc;

use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::application::error::{ErrorChannel, ErrorReport, METRIC_REQUEST_FAILURE_TOTAL};
use crate::application::liveness::Liveness;
use crate::application::resources::ResourceClient;
use crate::domain::drafts::Draft;
use crate::domain::navigation::Destination;
use crate::domain::types::RecordId;
use crate::domain::validation::ValidationErrors;

pub(crate) const METRIC_MUTATION_TOTAL: &str = "blogdesk_mutation_total";

/// Where a form is in its submit cycle. Every transition is published to
/// [`MutationController::phases`] subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Validating,
    Submitting,
    Succeeded,
    /// The last save was rejected. The draft is kept and can be submitted
    /// again from here as from `Idle`.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState<R> {
    Loading,
    Ready(R),
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<R> {
    Invalid(ValidationErrors),
    Saved { record: R, destination: Destination },
    Failed(ErrorReport),
    /// No draft loaded, or the form was already torn down.
    Skipped,
}

pub struct MutationController<C: ResourceClient> {
    client: Arc<C>,
    errors: ErrorChannel,
    liveness: Liveness,
    actor: Option<RecordId>,
    editor: EditorState<C::Record>,
    phase: watch::Sender<FormPhase>,
}

impl<C: ResourceClient> MutationController<C> {
    pub fn new(
        client: Arc<C>,
        errors: ErrorChannel,
        liveness: Liveness,
        actor: Option<RecordId>,
    ) -> Self {
        Self {
            client,
            errors,
            liveness,
            actor,
            editor: EditorState::Loading,
            phase: watch::channel(FormPhase::Idle).0,
        }
    }

    /// Start from a local draft, as the create screens do.
    pub fn with_draft(mut self, draft: C::Record) -> Self {
        self.editor = EditorState::Ready(draft);
        self
    }

    /// Load the record behind an edit screen. A missing or zero id gives the
    /// empty draft; a failed load leaves the form in `NotFound` with the
    /// error reported. A result arriving after teardown is ignored.
    pub async fn hydrate(&mut self, id: Option<RecordId>) -> &EditorState<C::Record> {
        let ticket = self.liveness.issue();
        let resource = self.client.resource();
        let result = self.client.get(id).await;
        if !ticket.is_current() {
            debug!(resource, ?id, "hydration result dropped after teardown");
            return &self.editor;
        }
        match result {
            Ok(record) => {
                self.errors.clear();
                self.editor = EditorState::Ready(record);
            }
            Err(err) => {
                counter!(METRIC_REQUEST_FAILURE_TOTAL, "resource" => resource, "operation" => "get")
                    .increment(1);
                warn!(resource, ?id, status = ?err.status(), error = %err, "record load failed");
                self.errors.report(&err);
                self.editor = EditorState::NotFound;
            }
        }
        &self.editor
    }

    pub fn editor(&self) -> &EditorState<C::Record> {
        &self.editor
    }

    pub fn draft(&self) -> Option<&C::Record> {
        match &self.editor {
            EditorState::Ready(draft) => Some(draft),
            EditorState::Loading | EditorState::NotFound => None,
        }
    }

    /// Apply a field edit to the working draft.
    pub fn edit(&mut self, change: impl FnOnce(&mut C::Record)) {
        if let EditorState::Ready(draft) = &mut self.editor {
            change(draft);
        }
    }

    pub fn phase(&self) -> FormPhase {
        *self.phase.borrow()
    }

    /// Phase changes, including the transient `Validating` and `Submitting`.
    pub fn phases(&self) -> watch::Receiver<FormPhase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: FormPhase) {
        self.phase.send_replace(phase);
    }

    /// Current validation messages, for enabling the submit action.
    pub fn validation(&self) -> ValidationErrors {
        self.draft().map(Draft::validate).unwrap_or_default()
    }

    pub async fn submit(&mut self) -> SubmitOutcome<C::Record> {
        let Some(draft) = self.draft().cloned() else {
            return SubmitOutcome::Skipped;
        };
        if !self.liveness.is_alive() {
            return SubmitOutcome::Skipped;
        }

        self.enter(FormPhase::Validating);
        let validation = draft.validate();
        if !validation.is_empty() {
            self.enter(FormPhase::Idle);
            debug!(fields = validation.len(), "submit blocked by validation");
            return SubmitOutcome::Invalid(validation);
        }

        self.enter(FormPhase::Submitting);
        let mut payload = draft;
        payload.set_user_id(self.actor);
        let resource = self.client.resource();
        self.errors.clear();

        let (operation, result) = match payload.id().filter(|id| *id != 0) {
            Some(id) => ("update", self.client.update(id, &payload).await),
            None => ("create", self.client.create(&payload).await),
        };

        match result {
            Ok(record) => {
                self.enter(FormPhase::Succeeded);
                let destination = payload.destination();
                counter!(METRIC_MUTATION_TOTAL, "resource" => resource, "operation" => operation)
                    .increment(1);
                info!(resource, operation, id = ?record.id(), %destination, "record saved");
                if self.liveness.is_alive() {
                    self.errors.clear();
                }
                SubmitOutcome::Saved {
                    record,
                    destination,
                }
            }
            Err(err) => {
                self.enter(FormPhase::Failed);
                counter!(METRIC_REQUEST_FAILURE_TOTAL, "resource" => resource, "operation" => operation)
                    .increment(1);
                warn!(resource, operation, status = ?err.status(), error = %err, "save failed");
                if self.liveness.is_alive() {
                    self.errors.report(&err);
                }
                SubmitOutcome::Failed(ErrorReport::from_error(&err))
            }
        }
    }

    /// Tear the form down; outstanding loads and saves stop applying.
    pub fn teardown(&self) {
        self.liveness.teardown();
    }
}
