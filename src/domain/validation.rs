//! Field-level validation results for drafts.
//!
//! Validation failures stay local to the form that produced them: they block
//! submission but never reach the shared error channel.

use std::collections::BTreeMap;

use serde::Serialize;

/// Messages keyed by field name. Only failing fields have entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`; an empty message is not a failure.
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        let message = message.into();
        if !message.is_empty() {
            self.fields.insert(field, message);
        }
    }

    pub fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.is_empty() {
            self.insert(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(field, msg)| (*field, msg.as_str()))
    }
}
