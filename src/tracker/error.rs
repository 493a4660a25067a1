//! Error taxonomy for the remote tracker.
//!
//! The engine deliberately treats every variant from a mutating call
//! the same way (try the next path), because JIRA's error responses do
//! not reliably distinguish workflow restrictions from other failures.
//! The classification here still matters for logging and for the
//! transport-retry decision in the client.

use thiserror::Error;

/// Errors from the remote issue-tracking service.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// Network-layer failure (DNS, connection, timeout). The only
    /// variant the client retries.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// HTTP 401/403: the session lacks rights for the operation.
    #[error("permission denied (status {status}): {message}")]
    PermissionDenied { status: u16, message: String },

    /// HTTP 400 whose body mentions the workflow/screen: the write is
    /// forbidden in the item's current lifecycle state.
    #[error("workflow forbids the operation: {message}")]
    WorkflowForbidden { message: String },

    /// HTTP 404: unknown item, transition or field.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// Any other non-success response.
    #[error("server error (status {status}): {message}")]
    Server { status: u16, message: String },
}

impl TrackerError {
    /// Classify a non-success HTTP response.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => TrackerError::PermissionDenied { status, message },
            404 => TrackerError::NotFound { message },
            400 if looks_like_workflow_rejection(&message) => {
                TrackerError::WorkflowForbidden { message }
            }
            _ => TrackerError::Server { status, message },
        }
    }
}

fn looks_like_workflow_rejection(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("workflow") || lower.contains("screen") || lower.contains("not on the")
}
