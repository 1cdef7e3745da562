use std::sync::Arc;

use blogdesk::application::error::{ErrorChannel, render_banner};
use blogdesk::config::{ListSettings, LoadError, Settings};
use blogdesk::domain::types::RecordId;
use blogdesk::infra::error::InfraError;
use blogdesk::infra::http::{CommentsApi, HttpTransport, PostsApi};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("{resource} {operation} failed")]
    Request {
        resource: &'static str,
        operation: &'static str,
    },
    #[error("{resource} not saved: validation failed")]
    Invalid { resource: &'static str },
    #[error("{resource} {id} not found")]
    NotFound {
        resource: &'static str,
        id: RecordId,
    },
    #[error("failed to render output: {0}")]
    Output(String),
}

/// Everything a command handler needs: one transport, the session-wide error
/// channel, and the acting user.
pub struct Ctx {
    transport: HttpTransport,
    pub errors: ErrorChannel,
    pub actor: Option<RecordId>,
    pub lists: ListSettings,
}

impl Ctx {
    pub fn new(settings: &Settings) -> Result<Self, CliError> {
        Ok(Self {
            transport: HttpTransport::new(&settings.api)?,
            errors: ErrorChannel::new(),
            actor: settings.session.user_id,
            lists: settings.lists.clone(),
        })
    }

    pub fn posts(&self) -> Arc<PostsApi<HttpTransport>> {
        Arc::new(PostsApi::new(self.transport.clone()))
    }

    pub fn comments(&self) -> Arc<CommentsApi<HttpTransport>> {
        Arc::new(CommentsApi::new(self.transport.clone()))
    }

    pub fn banner(&self) -> Vec<String> {
        render_banner(&self.errors.snapshot())
    }
}
