use std::sync::Arc;

use blogdesk_api_types::ApiErrorBody;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

pub(crate) const METRIC_REQUEST_FAILURE_TOTAL: &str = "blogdesk_request_failure_total";

/// Any failure of a round-trip to the API.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    #[error("request failed with status {status}")]
    Status { status: u16, body: ApiErrorBody },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            RequestError::Transport(_) | RequestError::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Top-level message from the response body, else this error's own text.
    pub fn message(&self) -> String {
        match self {
            RequestError::Status {
                body: ApiErrorBody {
                    message: Some(message),
                    ..
                },
                ..
            } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Every validation message from the body in document order, falling
    /// back to the single top-level message.
    pub fn messages(&self) -> Vec<String> {
        if let RequestError::Status { body, .. } = self {
            let flattened = body.field_messages();
            if !flattened.is_empty() {
                return flattened;
            }
        }
        vec![self.message()]
    }
}

/// Last error status and messages shown by a screen's banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub status: Option<u16>,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(error: &RequestError) -> Self {
        Self {
            status: error.status(),
            messages: error.messages(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.messages.is_empty()
    }
}

/// Session-wide error slot, created once at the application root and handed
/// to every view. Cloning shares the slot.
#[derive(Debug, Clone)]
pub struct ErrorChannel {
    tx: Arc<watch::Sender<ErrorReport>>,
}

impl ErrorChannel {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ErrorReport::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn set_status(&self, status: Option<u16>) {
        self.tx.send_if_modified(|report| {
            if report.status == status {
                return false;
            }
            report.status = status;
            true
        });
    }

    pub fn set_errors(&self, messages: Vec<String>) {
        self.tx.send_if_modified(|report| {
            if report.messages == messages {
                return false;
            }
            report.messages = messages;
            true
        });
    }

    pub fn clear(&self) {
        self.set_status(None);
        self.set_errors(Vec::new());
    }

    pub fn report(&self, error: &RequestError) {
        let ErrorReport { status, messages } = ErrorReport::from_error(error);
        self.set_status(status);
        self.set_errors(messages);
    }

    pub fn snapshot(&self) -> ErrorReport {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ErrorReport> {
        self.tx.subscribe()
    }
}

impl Default for ErrorChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Passive reader of the error channel.
#[derive(Debug)]
pub struct ErrorBanner {
    rx: watch::Receiver<ErrorReport>,
}

impl ErrorBanner {
    pub fn new(channel: &ErrorChannel) -> Self {
        Self {
            rx: channel.subscribe(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        render_banner(&self.rx.borrow())
    }

    /// Wait for the next change; `false` once the channel is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

pub fn render_banner(report: &ErrorReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.messages.len() + 1);
    if let Some(status) = report.status {
        lines.push(format!("Error {status}"));
    }
    lines.extend(report.messages.iter().cloned());
    lines
}
