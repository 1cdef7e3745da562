//! Where the admin goes after a successful save.

use std::fmt;

use super::types::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Dashboard,
    Post(RecordId),
}

impl Destination {
    pub fn path(&self) -> String {
        match self {
            Destination::Dashboard => "/dashboard".to_string(),
            Destination::Post(id) => format!("/posts/{id}"),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
