//! A mounted list screen: query store, fetch loop, and delete flow bound to
//! one liveness flag.

use std::num::NonZeroU32;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::application::delete::DeleteFlow;
use crate::application::error::ErrorChannel;
use crate::application::fetcher::{FetchOutcome, ListFetcher, ListSnapshot};
use crate::application::liveness::Liveness;
use crate::application::pagination::PageControls;
use crate::application::query::{QueryState, QueryStore};
use crate::application::resources::ResourceClient;
use crate::domain::types::{RecordId, SortDir};

/// Filter key restricting comments to one post.
pub const POST_ID_FILTER: &str = "postId";

/// Posts list: ascending by id.
pub fn posts_initial_state(rows_per_page: NonZeroU32) -> QueryState {
    QueryState::new(rows_per_page, "id", SortDir::Asc)
}

/// Comments list: newest first. Nested under a post it is filtered to that
/// post; standalone the filter is present but unset.
pub fn comments_initial_state(rows_per_page: NonZeroU32, post_id: Option<RecordId>) -> QueryState {
    QueryState::new(rows_per_page, "id", SortDir::Desc).with_filter(POST_ID_FILTER, post_id)
}

pub struct ListView<C: ResourceClient> {
    client: Arc<C>,
    errors: ErrorChannel,
    liveness: Liveness,
    store: QueryStore,
    fetcher: Arc<ListFetcher<C>>,
    subscription: Option<JoinHandle<()>>,
}

impl<C: ResourceClient> ListView<C> {
    pub fn new(client: Arc<C>, errors: ErrorChannel, initial: QueryState) -> Self {
        let liveness = Liveness::new();
        let fetcher = Arc::new(ListFetcher::new(
            Arc::clone(&client),
            errors.clone(),
            liveness.clone(),
        ));
        Self {
            client,
            errors,
            liveness,
            store: QueryStore::new(initial),
            fetcher,
            subscription: None,
        }
    }

    /// Fetch the current state and keep fetching on every change. Calling it
    /// again, or after teardown, does nothing.
    pub fn mount(&mut self) {
        if self.subscription.is_some() || !self.liveness.is_alive() {
            return;
        }
        debug!(resource = self.client.resource(), "list mounted");
        self.subscription = Some(self.fetcher.watch(self.store.subscribe()));
    }

    pub fn store(&self) -> &QueryStore {
        &self.store
    }

    pub fn results(&self) -> watch::Receiver<ListSnapshot<C::Record>> {
        self.fetcher.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot<C::Record> {
        self.fetcher.snapshot()
    }

    /// Footer controls for the current page against the last fetched count.
    pub fn controls(&self) -> PageControls {
        let state = self.store.snapshot();
        PageControls::new(self.snapshot().count, state.page(), state.rows_per_page())
    }

    /// Fetch the current state directly and wait for it to settle.
    pub async fn refresh(&self) -> FetchOutcome {
        self.fetcher.fetch(&self.store.snapshot()).await
    }

    pub fn delete_flow(&self) -> DeleteFlow<C> {
        DeleteFlow::new(
            Arc::clone(&self.client),
            self.errors.clone(),
            self.liveness.clone(),
            self.store.clone(),
        )
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }

    pub fn teardown(&mut self) {
        if self.liveness.teardown() {
            debug!(resource = self.client.resource(), "list torn down");
        }
        if let Some(handle) = self.subscription.take() {
            handle.abort();
        }
    }
}

impl<C: ResourceClient> Drop for ListView<C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
