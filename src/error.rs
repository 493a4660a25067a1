use thiserror::Error;

use crate::tracker::TrackerError;

/// Fatal, run-level errors. Per-item failures never appear here; they
/// are recorded in the item's report and the batch keeps going.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("No JIRA base URL configured. Set `base_url` in fixsweep.toml.")]
    MissingBaseUrl,

    #[error("No access token configured. Set `token` in fixsweep.toml or export JIRA_TOKEN.")]
    MissingToken,

    #[error("Failed to list items: {0}")]
    Listing(#[source] TrackerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_error_wraps_tracker_error() {
        let inner = TrackerError::Server {
            status: 500,
            message: "search exploded".into(),
        };
        let err = SweepError::Listing(inner);
        assert!(err.to_string().contains("Failed to list items"));
        assert!(err.to_string().contains("search exploded"));
    }

    #[test]
    fn missing_credentials_messages_name_the_fix() {
        assert!(SweepError::MissingBaseUrl.to_string().contains("base_url"));
        assert!(SweepError::MissingToken.to_string().contains("JIRA_TOKEN"));
    }
}
