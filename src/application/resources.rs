//! Resource client traits describing the remote API adapters.

use std::num::NonZeroU32;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::application::error::RequestError;
use crate::application::query::{FilterValue, Filters, QUERY_FILTER, QueryState};
use crate::domain::drafts::Draft;
use crate::domain::types::{RecordId, SortDir};

/// One page of records plus the server-side total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagedResult<T> {
    pub data: Vec<T>,
    pub count: u64,
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            count: 0,
        }
    }
}

/// A list request as sent over the wire. Unset fields are omitted so the
/// server defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: Filters,
    pub page: Option<NonZeroU32>,
    pub rows_per_page: Option<NonZeroU32>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDir>,
}

impl From<&QueryState> for ListQuery {
    fn from(state: &QueryState) -> Self {
        Self {
            filters: state.filters().clone(),
            page: Some(state.page()),
            rows_per_page: Some(state.rows_per_page()),
            sort_by: Some(state.sort_by().to_string()),
            sort_dir: Some(state.sort_dir()),
        }
    }
}

impl ListQuery {
    /// Query-string pairs. `resource_filters` maps a resource's filter keys to
    /// their parameter names, e.g. `("postId", "post_id")`.
    pub fn to_params(&self, resource_filters: &[(&str, &'static str)]) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();

        let query = self.filters.get(QUERY_FILTER).and_then(FilterValue::as_param);
        if let Some(text) = query.filter(|text| !text.is_empty()) {
            params.push((QUERY_FILTER, text));
        }

        for (key, param) in resource_filters {
            if let Some(value) = self.filters.get(*key).and_then(FilterValue::as_param) {
                params.push((*param, value));
            }
        }

        if let (Some(sort_by), Some(sort_dir)) = (self.sort_by.as_ref(), self.sort_dir) {
            params.push(("sortBy", sort_by.clone()));
            params.push(("sortDir", sort_dir.as_str().to_string()));
        }

        if let (Some(page), Some(rows)) = (self.page, self.rows_per_page) {
            params.push(("page", page.to_string()));
            params.push(("rowsPerPage", rows.to_string()));
        }

        params
    }
}

#[async_trait]
pub trait ResourceClient: Send + Sync + 'static {
    type Record: Draft + Serialize;

    /// Resource segment used in `api/{resource}` paths.
    fn resource(&self) -> &'static str;

    async fn list(&self, query: &ListQuery) -> Result<PagedResult<Self::Record>, RequestError>;

    /// A missing or zero id yields the empty draft without a request.
    async fn get(&self, id: Option<RecordId>) -> Result<Self::Record, RequestError>;

    async fn create(&self, draft: &Self::Record) -> Result<Self::Record, RequestError>;

    async fn update(
        &self,
        id: RecordId,
        draft: &Self::Record,
    ) -> Result<Self::Record, RequestError>;

    async fn delete(&self, id: RecordId) -> Result<Value, RequestError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero")
    }

    const COMMENT_FILTERS: &[(&str, &str)] = &[("postId", "post_id")];

    #[test]
    fn full_state_emits_every_parameter_in_order() {
        let state = QueryState::new(nz(5), "id", SortDir::Desc)
            .with_filter(QUERY_FILTER, "hello")
            .with_filter("postId", 7_i64)
            .with_page(nz(2));

        let params = ListQuery::from(&state).to_params(COMMENT_FILTERS);
        assert_eq!(
            params,
            vec![
                ("query", "hello".to_string()),
                ("post_id", "7".to_string()),
                ("sortBy", "id".to_string()),
                ("sortDir", "desc".to_string()),
                ("page", "2".to_string()),
                ("rowsPerPage", "5".to_string()),
            ]
        );
    }

    #[test]
    fn empty_query_and_null_filters_are_omitted() {
        let state = QueryState::new(nz(5), "id", SortDir::Asc).with_filter("postId", None::<i64>);
        let params = ListQuery::from(&state).to_params(COMMENT_FILTERS);
        let keys: Vec<_> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["sortBy", "sortDir", "page", "rowsPerPage"]);
    }

    #[test]
    fn unknown_resource_filters_are_not_sent() {
        let state = QueryState::new(nz(5), "id", SortDir::Asc).with_filter("postId", 3_i64);
        let params = ListQuery::from(&state).to_params(&[]);
        assert!(params.iter().all(|(k, _)| *k != "post_id"));
    }

    #[test]
    fn pagination_needs_both_page_and_rows() {
        let query = ListQuery {
            page: Some(nz(3)),
            ..ListQuery::default()
        };
        assert!(query.to_params(&[]).is_empty());
    }

    #[test]
    fn sort_needs_both_field_and_direction() {
        let query = ListQuery {
            sort_by: Some("title".into()),
            page: Some(nz(1)),
            rows_per_page: Some(nz(10)),
            ..ListQuery::default()
        };
        let keys: Vec<_> = query.to_params(&[]).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["page", "rowsPerPage"]);
    }
}
