//! Filter/sort/pagination state behind one list view.
//!
//! [`QueryState`] transitions are pure; [`QueryStore`] applies them atomically
//! and notifies subscribers only when the state actually changed by value.

use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroU32;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::domain::types::{RecordId, SortDir};

/// Filter key holding the free-text search.
pub const QUERY_FILTER: &str = "query";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Number(i64),
    Null,
}

impl FilterValue {
    /// Wire form of the value; `Null` means "not set".
    pub fn as_param(&self) -> Option<String> {
        match self {
            FilterValue::Text(text) => Some(text.clone()),
            FilterValue::Number(number) => Some(number.to_string()),
            FilterValue::Null => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<RecordId> for FilterValue {
    fn from(value: RecordId) -> Self {
        FilterValue::Number(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FilterValue::Null, Into::into)
    }
}

pub type Filters = BTreeMap<String, FilterValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    filters: Filters,
    page: NonZeroU32,
    rows_per_page: NonZeroU32,
    sort_by: String,
    sort_dir: SortDir,
    #[serde(skip_serializing_if = "Option::is_none")]
    visible_columns: Option<BTreeSet<String>>,
}

impl QueryState {
    /// Page 1 with an empty text query.
    pub fn new(rows_per_page: NonZeroU32, sort_by: impl Into<String>, sort_dir: SortDir) -> Self {
        let mut filters = Filters::new();
        filters.insert(QUERY_FILTER.to_string(), FilterValue::Text(String::new()));
        Self {
            filters,
            page: NonZeroU32::MIN,
            rows_per_page,
            sort_by: sort_by.into(),
            sort_dir,
            visible_columns: None,
        }
    }

    /// Seed an additional filter on an initial state.
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn filter(&self, key: &str) -> Option<&FilterValue> {
        self.filters.get(key)
    }

    pub fn page(&self) -> NonZeroU32 {
        self.page
    }

    pub fn rows_per_page(&self) -> NonZeroU32 {
        self.rows_per_page
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_dir(&self) -> SortDir {
        self.sort_dir
    }

    pub fn visible_columns(&self) -> Option<&BTreeSet<String>> {
        self.visible_columns.as_ref()
    }

    pub fn with_filters(&self, filters: Filters) -> Self {
        Self {
            filters,
            page: NonZeroU32::MIN,
            ..self.clone()
        }
    }

    pub fn with_sort(&self, sort_by: impl Into<String>, sort_dir: SortDir) -> Self {
        Self {
            sort_by: sort_by.into(),
            sort_dir,
            page: NonZeroU32::MIN,
            ..self.clone()
        }
    }

    /// Header click on `field`: the active field flips direction, any other
    /// field becomes active ascending. An empty field is ignored.
    pub fn with_sort_toggled(&self, field: &str) -> Self {
        if field.is_empty() {
            return self.clone();
        }
        if field == self.sort_by {
            self.with_sort(field, self.sort_dir.flipped())
        } else {
            self.with_sort(field, SortDir::Asc)
        }
    }

    /// Sets the page verbatim; bounding it is the caller's job.
    pub fn with_page(&self, page: NonZeroU32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    pub fn with_rows_per_page(&self, rows_per_page: NonZeroU32) -> Self {
        Self {
            rows_per_page,
            page: NonZeroU32::MIN,
            ..self.clone()
        }
    }

    pub fn with_visible_columns(&self, columns: Option<BTreeSet<String>>) -> Self {
        Self {
            visible_columns: columns,
            ..self.clone()
        }
    }
}

/// Whether a table column is shown; every column is visible until a set is chosen.
pub fn is_column_visible(name: &str, visible: Option<&BTreeSet<String>>) -> bool {
    if name.is_empty() {
        return false;
    }
    visible.is_none_or(|columns| columns.contains(name))
}

/// Owner of one view's [`QueryState`]. Clones share the same state.
#[derive(Debug, Clone)]
pub struct QueryStore {
    tx: Arc<watch::Sender<QueryState>>,
}

impl QueryStore {
    pub fn new(initial: QueryState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> QueryState {
        self.tx.borrow().clone()
    }

    /// Change events: the receiver observes every by-value change.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.tx.subscribe()
    }

    pub fn change_filters(&self, filters: Filters) -> bool {
        self.apply(|state| state.with_filters(filters))
    }

    pub fn change_sort(&self, sort_by: impl Into<String>, sort_dir: SortDir) -> bool {
        self.apply(|state| state.with_sort(sort_by, sort_dir))
    }

    pub fn toggle_sort(&self, field: &str) -> bool {
        self.apply(|state| state.with_sort_toggled(field))
    }

    pub fn change_page(&self, page: NonZeroU32) -> bool {
        self.apply(|state| state.with_page(page))
    }

    pub fn change_rows_per_page(&self, rows_per_page: NonZeroU32) -> bool {
        self.apply(|state| state.with_rows_per_page(rows_per_page))
    }

    pub fn change_visible_columns(&self, columns: Option<BTreeSet<String>>) -> bool {
        self.apply(|state| state.with_visible_columns(columns))
    }

    /// Go back to page 1 and notify subscribers even if already there.
    pub fn restart(&self) {
        self.tx.send_modify(|state| *state = state.with_page(NonZeroU32::MIN));
    }

    fn apply(&self, transition: impl FnOnce(&QueryState) -> QueryState) -> bool {
        self.tx.send_if_modified(|state| {
            let next = transition(state);
            if next == *state {
                return false;
            }
            *state = next;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero")
    }

    fn posts_state() -> QueryState {
        QueryState::new(nz(5), "id", SortDir::Asc)
    }

    fn searching(text: &str) -> Filters {
        let mut filters = Filters::new();
        filters.insert(QUERY_FILTER.into(), text.into());
        filters
    }

    #[test]
    fn filter_sort_and_rows_reset_page() {
        let on_page_three = posts_state().with_page(nz(3));

        assert_eq!(on_page_three.with_filters(searching("rust")).page(), nz(1));
        assert_eq!(on_page_three.with_sort("title", SortDir::Desc).page(), nz(1));
        assert_eq!(on_page_three.with_rows_per_page(nz(10)).page(), nz(1));
    }

    #[test]
    fn page_and_columns_leave_page_alone() {
        let state = posts_state().with_page(nz(4));
        assert_eq!(state.page(), nz(4));

        let columns: BTreeSet<String> = ["id".to_string()].into();
        let state = state.with_visible_columns(Some(columns));
        assert_eq!(state.page(), nz(4));
    }

    #[test]
    fn toggle_flips_active_field() {
        let toggled = posts_state().with_sort_toggled("id");
        assert_eq!(toggled.sort_by(), "id");
        assert_eq!(toggled.sort_dir(), SortDir::Desc);
    }

    #[test]
    fn toggle_on_other_field_starts_ascending() {
        let state = posts_state().with_sort("id", SortDir::Desc);
        let toggled = state.with_sort_toggled("title");
        assert_eq!(toggled.sort_by(), "title");
        assert_eq!(toggled.sort_dir(), SortDir::Asc);
    }

    #[test]
    fn toggle_ignores_empty_field() {
        let state = posts_state().with_page(nz(2));
        assert_eq!(state.with_sort_toggled(""), state);
    }

    #[test]
    fn column_visibility_rules() {
        let columns: BTreeSet<String> = ["title".to_string()].into();
        assert!(!is_column_visible("", None));
        assert!(is_column_visible("id", None));
        assert!(is_column_visible("title", Some(&columns)));
        assert!(!is_column_visible("id", Some(&columns)));
    }

    #[test]
    fn store_notifies_only_on_value_change() {
        let store = QueryStore::new(posts_state());
        let mut rx = store.subscribe();

        assert!(!store.change_page(nz(1)));
        assert!(!rx.has_changed().expect("open"));

        assert!(store.change_page(nz(2)));
        assert!(rx.has_changed().expect("open"));
        assert_eq!(rx.borrow_and_update().page(), nz(2));
    }

    #[test]
    fn store_sequence_resets_page_exactly_on_resetting_transitions() {
        let store = QueryStore::new(posts_state());

        store.change_page(nz(3));
        store.change_visible_columns(Some(["id".to_string()].into()));
        assert_eq!(store.snapshot().page(), nz(3));

        store.change_filters(searching("x"));
        assert_eq!(store.snapshot().page(), nz(1));

        store.change_page(nz(2));
        store.toggle_sort("id");
        assert_eq!(store.snapshot().page(), nz(1));
        assert_eq!(store.snapshot().sort_dir(), SortDir::Desc);

        store.change_page(nz(2));
        store.change_rows_per_page(nz(25));
        assert_eq!(store.snapshot().page(), nz(1));
        assert_eq!(store.snapshot().rows_per_page(), nz(25));
    }

    #[test]
    fn restart_notifies_even_on_first_page() {
        let store = QueryStore::new(posts_state());
        let mut rx = store.subscribe();

        store.restart();
        assert!(rx.has_changed().expect("open"));
        assert_eq!(rx.borrow_and_update().page(), nz(1));
    }

    #[test]
    fn seeded_filter_accepts_optional_ids() {
        let state = QueryState::new(nz(5), "id", SortDir::Desc).with_filter("postId", Some(7_i64));
        assert_eq!(state.filter("postId"), Some(&FilterValue::Number(7)));

        let unset = QueryState::new(nz(5), "id", SortDir::Desc).with_filter("postId", None::<i64>);
        assert_eq!(unset.filter("postId"), Some(&FilterValue::Null));
    }
}
