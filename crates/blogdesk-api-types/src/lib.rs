//! Request and response shapes for the blogdesk REST API.
//!
//! Every successful response is wrapped in an [`Envelope`]; list responses
//! carry the total row count in [`ListMeta`]. Failures carry an
//! [`ApiErrorBody`] whose `errors` map keeps the field order the server sent.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Server-assigned identity of a post, comment or user.
pub type RecordId = i64;

/// `{ data, meta? }` wrapper around every successful payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ListMeta>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Total rows matching the query server-side, not the length of `data`.
    #[serde(default)]
    pub total: u64,
}

/// Body returned alongside a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Map<String, Value>>,
}

impl ApiErrorBody {
    /// Flatten the per-field validation messages into one list, preserving
    /// field order and then message order within each field.
    pub fn field_messages(&self) -> Vec<String> {
        let Some(errors) = self.errors.as_ref() else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for value in errors.values() {
            match value {
                Value::Array(items) => out.extend(items.iter().map(value_text)),
                Value::Null => {}
                other => out.push(value_text(other)),
            }
        }
        out
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: RecordId,
    #[serde(default, deserialize_with = "nullable_string")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: RecordId,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
}

/// A blog post. `id == None` means the post has not been created yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub content: String,
    #[serde(default)]
    pub user_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<u64>,
}

/// A comment attached to a post through `post_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub content: String,
    #[serde(default)]
    pub post_id: Option<RecordId>,
    #[serde(default)]
    pub user_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<PostSummary>,
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
