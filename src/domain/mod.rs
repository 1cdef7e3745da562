//! Domain layer: drafts, their validation rules and post-save destinations.

pub mod drafts;
pub mod navigation;
pub mod types;
pub mod validation;
