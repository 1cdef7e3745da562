use async_trait::async_trait;
use blogdesk_api_types::Post;
use serde_json::Value;

use crate::application::error::RequestError;
use crate::application::resources::{ListQuery, PagedResult, ResourceClient};
use crate::domain::types::RecordId;

use super::{RestResource, Transport};

/// Client for `api/posts`.
pub struct PostsApi<T> {
    inner: RestResource<T>,
}

impl<T: Transport> PostsApi<T> {
    pub fn new(transport: T) -> Self {
        Self {
            inner: RestResource {
                transport,
                name: "posts",
                filters: &[],
            },
        }
    }
}

#[async_trait]
impl<T: Transport> ResourceClient for PostsApi<T> {
    type Record = Post;

    fn resource(&self) -> &'static str {
        self.inner.name
    }

    async fn list(&self, query: &ListQuery) -> Result<PagedResult<Post>, RequestError> {
        self.inner.list(query).await
    }

    async fn get(&self, id: Option<RecordId>) -> Result<Post, RequestError> {
        match id.filter(|id| *id != 0) {
            Some(id) => self.inner.get(id).await,
            None => Ok(Post::default()),
        }
    }

    async fn create(&self, draft: &Post) -> Result<Post, RequestError> {
        self.inner.create(draft).await
    }

    async fn update(&self, id: RecordId, draft: &Post) -> Result<Post, RequestError> {
        self.inner.update(id, draft).await
    }

    async fn delete(&self, id: RecordId) -> Result<Value, RequestError> {
        self.inner.delete(id).await
    }
}
