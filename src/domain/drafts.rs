//! Editable drafts of posts and comments.
//!
//! A draft with no identity has not been created yet; submitting it routes to
//! the create operation instead of update.

use blogdesk_api_types::{Comment, Post};

use super::navigation::Destination;
use super::types::RecordId;
use super::validation::ValidationErrors;

pub const TITLE_REQUIRED: &str = "Title field is required!";
pub const CONTENT_REQUIRED: &str = "Content field is required!";

pub trait Draft: Clone + Send + Sync + 'static {
    fn id(&self) -> Option<RecordId>;

    fn set_user_id(&mut self, user_id: Option<RecordId>);

    fn validate(&self) -> ValidationErrors;

    /// Parent context to navigate to once this draft has been saved.
    fn destination(&self) -> Destination;
}

impl Draft for Post {
    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_user_id(&mut self, user_id: Option<RecordId>) {
        self.user_id = user_id;
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, TITLE_REQUIRED);
        errors.require("content", &self.content, CONTENT_REQUIRED);
        errors
    }

    fn destination(&self) -> Destination {
        Destination::Dashboard
    }
}

impl Draft for Comment {
    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_user_id(&mut self, user_id: Option<RecordId>) {
        self.user_id = user_id;
    }

    fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("content", &self.content, CONTENT_REQUIRED);
        errors
    }

    fn destination(&self) -> Destination {
        match self.post_id {
            Some(post_id) => Destination::Post(post_id),
            None => Destination::Dashboard,
        }
    }
}

/// Empty comment draft attached to `post_id`, as shown on a create screen.
pub fn new_comment(post_id: Option<RecordId>) -> Comment {
    Comment {
        post_id,
        ..Comment::default()
    }
}
