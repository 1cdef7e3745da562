//! Client-side engine for the admin screens.

pub mod delete;
pub mod error;
pub mod fetcher;
pub mod list_view;
pub mod liveness;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod resources;

#[cfg(test)]
pub(crate) mod test_support;
