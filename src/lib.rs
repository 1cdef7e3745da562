//! Client-side core for administering a blog's posts and comments over its
//! REST API: list query state, stale-response suppression, form submission
//! and delete-with-refresh.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
