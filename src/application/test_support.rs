//! In-process resource client for exercising the engine without a server.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use async_trait::async_trait;
use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::application::error::RequestError;
use crate::application::resources::{ListQuery, PagedResult, ResourceClient};
use crate::domain::drafts::Draft;
use crate::domain::types::RecordId;

type ListReply<R> = Result<PagedResult<R>, RequestError>;
type RecordReply<R> = Result<R, RequestError>;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call<R> {
    List(ListQuery),
    Get(Option<RecordId>),
    Create(R),
    Update(RecordId, R),
    Delete(RecordId),
}

pub(crate) struct FakeClient<R> {
    calls: Mutex<Vec<Call<R>>>,
    deferred: Mutex<VecDeque<oneshot::Receiver<ListReply<R>>>>,
    list_reply: Mutex<ListReply<R>>,
    deferred_records: Mutex<VecDeque<oneshot::Receiver<RecordReply<R>>>>,
    stored: Mutex<Option<R>>,
    failure: Mutex<Option<RequestError>>,
}

impl<R: Clone> FakeClient<R> {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            deferred: Mutex::new(VecDeque::new()),
            list_reply: Mutex::new(Ok(PagedResult::default())),
            deferred_records: Mutex::new(VecDeque::new()),
            stored: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    /// The next `list` call waits until the returned sender resolves it.
    pub(crate) fn defer_list(&self) -> oneshot::Sender<ListReply<R>> {
        let (tx, rx) = oneshot::channel();
        self.deferred.lock().expect("lock").push_back(rx);
        tx
    }

    /// The next `get`, `create` or `update` waits for the returned sender.
    pub(crate) fn defer_record(&self) -> oneshot::Sender<RecordReply<R>> {
        let (tx, rx) = oneshot::channel();
        self.deferred_records.lock().expect("lock").push_back(rx);
        tx
    }

    pub(crate) fn reply_list(&self, reply: ListReply<R>) {
        *self.list_reply.lock().expect("lock") = reply;
    }

    pub(crate) fn store(&self, record: R) {
        *self.stored.lock().expect("lock") = Some(record);
    }

    /// Every non-list call fails with `error` from now on.
    pub(crate) fn fail_with(&self, error: RequestError) {
        *self.failure.lock().expect("lock") = Some(error);
    }

    pub(crate) fn calls(&self) -> Vec<Call<R>> {
        self.calls.lock().expect("lock").clone()
    }

    fn record(&self, call: Call<R>) -> Result<(), RequestError> {
        self.calls.lock().expect("lock").push(call);
        match self.failure.lock().expect("lock").clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Wait on a deferred reply if one is queued, else answer with `fallback`.
    async fn settle(&self, fallback: impl FnOnce() -> RecordReply<R>) -> RecordReply<R> {
        let deferred = self.deferred_records.lock().expect("lock").pop_front();
        match deferred {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(RequestError::Transport("reply dropped".into()))),
            None => fallback(),
        }
    }
}

#[async_trait]
impl<R> ResourceClient for FakeClient<R>
where
    R: Draft + Serialize + Default,
{
    type Record = R;

    fn resource(&self) -> &'static str {
        "fake"
    }

    async fn list(&self, query: &ListQuery) -> Result<PagedResult<R>, RequestError> {
        self.calls
            .lock()
            .expect("lock")
            .push(Call::List(query.clone()));
        let deferred = self.deferred.lock().expect("lock").pop_front();
        match deferred {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(RequestError::Transport("reply dropped".into()))),
            None => self.list_reply.lock().expect("lock").clone(),
        }
    }

    async fn get(&self, id: Option<RecordId>) -> Result<R, RequestError> {
        if id.is_none_or(|id| id == 0) {
            return Ok(R::default());
        }
        self.record(Call::Get(id))?;
        self.settle(|| {
            self.stored
                .lock()
                .expect("lock")
                .clone()
                .ok_or_else(|| RequestError::Status {
                    status: 404,
                    body: Default::default(),
                })
        })
        .await
    }

    async fn create(&self, draft: &R) -> Result<R, RequestError> {
        self.record(Call::Create(draft.clone()))?;
        self.settle(|| Ok(draft.clone())).await
    }

    async fn update(&self, id: RecordId, draft: &R) -> Result<R, RequestError> {
        self.record(Call::Update(id, draft.clone()))?;
        self.settle(|| Ok(draft.clone())).await
    }

    async fn delete(&self, id: RecordId) -> Result<Value, RequestError> {
        self.record(Call::Delete(id))?;
        Ok(Value::Null)
    }
}

/// Drive `future` on a current-thread runtime with a recorder scoped to this
/// thread, so spawned tasks report to it too and parallel tests stay apart.
pub(crate) fn run_recorded<F: Future>(future: F) -> (F::Output, Snapshotter) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    let output = metrics::with_local_recorder(&recorder, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime")
            .block_on(future)
    });
    (output, snapshotter)
}

/// Sum of every counter called `name`, across label sets.
pub(crate) fn counter_total(snapshotter: &Snapshotter, name: &str) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(count) => count,
            _ => 0,
        })
        .sum()
}
