use async_trait::async_trait;
use blogdesk_api_types::Comment;
use serde_json::Value;

use crate::application::error::RequestError;
use crate::application::list_view::POST_ID_FILTER;
use crate::application::resources::{ListQuery, PagedResult, ResourceClient};
use crate::domain::types::RecordId;

use super::{RestResource, Transport};

/// Client for `api/comments`; the `postId` filter travels as `post_id`.
pub struct CommentsApi<T> {
    inner: RestResource<T>,
}

impl<T: Transport> CommentsApi<T> {
    pub fn new(transport: T) -> Self {
        Self {
            inner: RestResource {
                transport,
                name: "comments",
                filters: &[(POST_ID_FILTER, "post_id")],
            },
        }
    }
}

#[async_trait]
impl<T: Transport> ResourceClient for CommentsApi<T> {
    type Record = Comment;

    fn resource(&self) -> &'static str {
        self.inner.name
    }

    async fn list(&self, query: &ListQuery) -> Result<PagedResult<Comment>, RequestError> {
        self.inner.list(query).await
    }

    async fn get(&self, id: Option<RecordId>) -> Result<Comment, RequestError> {
        match id.filter(|id| *id != 0) {
            Some(id) => self.inner.get(id).await,
            None => Ok(Comment::default()),
        }
    }

    async fn create(&self, draft: &Comment) -> Result<Comment, RequestError> {
        self.inner.create(draft).await
    }

    async fn update(&self, id: RecordId, draft: &Comment) -> Result<Comment, RequestError> {
        self.inner.update(id, draft).await
    }

    async fn delete(&self, id: RecordId) -> Result<Value, RequestError> {
        self.inner.delete(id).await
    }
}
