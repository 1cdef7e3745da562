//! Keeps one list's rows in sync with its query state.
//!
//! Every fetch takes a fresh generation ticket before dispatching. Only the
//! response holding the current ticket is applied; older responses and
//! responses arriving after teardown are dropped without touching the
//! published rows or the error channel.

use std::sync::Arc;

use metrics::counter;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::error::{ErrorChannel, METRIC_REQUEST_FAILURE_TOTAL};
use crate::application::liveness::{Liveness, Ticket};
use crate::application::query::QueryState;
use crate::application::resources::{ListQuery, ResourceClient};

pub(crate) const METRIC_LIST_FETCH_TOTAL: &str = "blogdesk_list_fetch_total";
pub(crate) const METRIC_LIST_FETCH_DISCARDED_TOTAL: &str = "blogdesk_list_fetch_discarded_total";

/// Rows currently shown by a list, with the state they were fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    pub count: u64,
    pub query: Option<QueryState>,
}

impl<T> Default for ListSnapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            count: 0,
            query: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// Superseded by a newer fetch or the view was torn down.
    Discarded,
}

pub struct ListFetcher<C: ResourceClient> {
    client: Arc<C>,
    errors: ErrorChannel,
    liveness: Liveness,
    results: watch::Sender<ListSnapshot<C::Record>>,
}

impl<C: ResourceClient> ListFetcher<C> {
    pub fn new(client: Arc<C>, errors: ErrorChannel, liveness: Liveness) -> Self {
        let (results, _rx) = watch::channel(ListSnapshot::default());
        Self {
            client,
            errors,
            liveness,
            results,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<C::Record>> {
        self.results.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot<C::Record> {
        self.results.borrow().clone()
    }

    /// Fetch `state` now, superseding any fetch still in flight.
    pub async fn fetch(&self, state: &QueryState) -> FetchOutcome {
        self.run(self.liveness.issue(), state).await
    }

    /// Spawn the loop that fetches the current state and then every state
    /// `changes` yields. Tickets are issued in arrival order so a slow
    /// response can never overwrite a newer one.
    pub fn watch(self: &Arc<Self>, mut changes: watch::Receiver<QueryState>) -> JoinHandle<()> {
        let fetcher = Arc::clone(self);
        tokio::spawn(async move {
            while fetcher.liveness.is_alive() {
                let state = changes.borrow_and_update().clone();
                let ticket = fetcher.liveness.issue();
                let inflight = Arc::clone(&fetcher);
                tokio::spawn(async move {
                    inflight.run(ticket, &state).await;
                });
                if changes.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    async fn run(&self, ticket: Ticket, state: &QueryState) -> FetchOutcome {
        if !ticket.is_current() {
            return FetchOutcome::Discarded;
        }
        let resource = self.client.resource();
        self.errors.clear();
        counter!(METRIC_LIST_FETCH_TOTAL, "resource" => resource).increment(1);
        debug!(
            resource,
            generation = ticket.generation(),
            page = state.page().get(),
            rows_per_page = state.rows_per_page().get(),
            "list fetch dispatched"
        );

        let result = self.client.list(&ListQuery::from(state)).await;

        if !ticket.is_current() {
            counter!(METRIC_LIST_FETCH_DISCARDED_TOTAL, "resource" => resource).increment(1);
            debug!(
                resource,
                generation = ticket.generation(),
                "stale list response discarded"
            );
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                let rows = u64::from(state.rows_per_page().get());
                let returned = u64::try_from(page.data.len()).unwrap_or(u64::MAX);
                if returned > rows {
                    warn!(resource, returned, rows, "server returned more rows than requested");
                }
                self.errors.clear();
                self.results.send_replace(ListSnapshot {
                    items: page.data,
                    count: page.count,
                    query: Some(state.clone()),
                });
                FetchOutcome::Applied
            }
            Err(err) => {
                counter!(METRIC_REQUEST_FAILURE_TOTAL, "resource" => resource, "operation" => "list")
                    .increment(1);
                warn!(resource, status = ?err.status(), error = %err, "list fetch failed");
                self.errors.report(&err);
                FetchOutcome::Failed
            }
        }
    }
}
