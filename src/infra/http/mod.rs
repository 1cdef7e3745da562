//! HTTP transport and the REST resource clients built on it.

mod comments;
mod posts;

pub use comments::CommentsApi;
pub use posts::PostsApi;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use blogdesk_api_types::{ApiErrorBody, Envelope};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::application::error::RequestError;
use crate::application::resources::{ListQuery, PagedResult};
use crate::config::ApiSettings;
use crate::domain::types::RecordId;

use super::error::InfraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl ApiMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiMethod::Get => "GET",
            ApiMethod::Post => "POST",
            ApiMethod::Put => "PUT",
            ApiMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ApiMethod> for Method {
    fn from(method: ApiMethod) -> Self {
        match method {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Put => Method::PUT,
            ApiMethod::Delete => Method::DELETE,
        }
    }
}

/// One call against the API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: ApiMethod,
    pub path: String,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(ApiMethod::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(ApiMethod::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(ApiMethod::Delete, path)
    }

    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }

    fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Sends API requests and returns the decoded JSON body of 2xx responses.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    pub fn new(settings: &ApiSettings) -> Result<Self, InfraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .user_agent(Self::user_agent())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_seconds.get()))
            .build()
            .map_err(|err| InfraError::configuration(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            base: directory_url(settings.base_url.clone()),
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("blogdesk/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, request: &ApiRequest) -> Result<Url, RequestError> {
        let mut url = self.base.join(&request.path).map_err(|err| {
            RequestError::Transport(format!("invalid request path {}: {err}", request.path))
        })?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, RequestError> {
        let url = self.url(&request)?;
        debug!(method = %request.method, %url, "sending api request");

        let mut builder = self.client.request(request.method.into(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| RequestError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| RequestError::Transport(err.to_string()))?;

        if !status.is_success() {
            let body = serde_json::from_slice::<ApiErrorBody>(&bytes).unwrap_or_default();
            return Err(RequestError::Status {
                status: status.as_u16(),
                body,
            });
        }
        decode_body(&bytes)
    }
}

/// Relative paths join under the base path only when it ends with `/`.
fn directory_url(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

/// A blank 2xx body reads as JSON `null`.
fn decode_body(bytes: &[u8]) -> Result<Value, RequestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|err| RequestError::Decode(err.to_string()))
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R, RequestError> {
    serde_json::from_value(value).map_err(|err| RequestError::Decode(err.to_string()))
}

fn to_body<R: serde::Serialize>(record: &R) -> Result<Value, RequestError> {
    serde_json::to_value(record).map_err(|err| RequestError::Decode(err.to_string()))
}

/// The `api/{name}` collection shared by the posts and comments clients.
struct RestResource<T> {
    transport: T,
    name: &'static str,
    /// Filter keys this resource understands and their query parameter names.
    filters: &'static [(&'static str, &'static str)],
}

impl<T: Transport> RestResource<T> {
    fn collection(&self) -> String {
        format!("api/{}", self.name)
    }

    fn member(&self, id: RecordId) -> String {
        format!("api/{}/{id}", self.name)
    }

    async fn list<R: DeserializeOwned>(
        &self,
        query: &ListQuery,
    ) -> Result<PagedResult<R>, RequestError> {
        let request = ApiRequest::get(self.collection()).with_query(query.to_params(self.filters));
        let value = self.transport.send(request).await?;
        if value.is_null() {
            return Ok(PagedResult::default());
        }
        let envelope: Envelope<Option<Vec<R>>> = decode(value)?;
        Ok(PagedResult {
            data: envelope.data.unwrap_or_default(),
            count: envelope.meta.map(|meta| meta.total).unwrap_or_default(),
        })
    }

    /// Fetch one record, filling in `id` when the server left it out.
    async fn get<R: DeserializeOwned>(&self, id: RecordId) -> Result<R, RequestError> {
        let value = self.transport.send(ApiRequest::get(self.member(id))).await?;
        let mut data = unwrap_data(value);
        if let Value::Object(record) = &mut data {
            let missing = record
                .get("id")
                .is_none_or(|current| current.is_null() || current.as_i64() == Some(0));
            if missing {
                record.insert("id".to_string(), Value::from(id));
            }
        }
        decode(data)
    }

    async fn create<R>(&self, draft: &R) -> Result<R, RequestError>
    where
        R: DeserializeOwned + serde::Serialize + Sync,
    {
        let value = self
            .transport
            .send(ApiRequest::post(self.collection(), to_body(draft)?))
            .await?;
        decode(unwrap_data(value))
    }

    async fn update<R>(&self, id: RecordId, draft: &R) -> Result<R, RequestError>
    where
        R: DeserializeOwned + serde::Serialize + Sync,
    {
        let value = self
            .transport
            .send(ApiRequest::put(self.member(id), to_body(draft)?))
            .await?;
        decode(unwrap_data(value))
    }

    async fn delete(&self, id: RecordId) -> Result<Value, RequestError> {
        self.transport.send(ApiRequest::delete(self.member(id))).await
    }
}

/// The `data` member of an envelope, or the body itself when it is bare.
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut body) if body.contains_key("data") => {
            body.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}
