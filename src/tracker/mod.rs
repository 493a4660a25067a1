pub mod client;
pub mod error;
pub mod types;

use std::collections::HashSet;

use async_trait::async_trait;

pub use client::JiraClient;
pub use error::TrackerError;
pub use types::{Transition, WorkItem};

/// The remote-service operations the reconciliation engine consumes.
///
/// [`JiraClient`] is the production implementation; tests inject an
/// in-memory fake. Every method is a single request/response exchange
/// against the authoritative server state.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Fetch one page of items matching `query`. A page shorter than
    /// `page_size` (or empty) means the listing is exhausted.
    async fn search_page(
        &self,
        query: &str,
        start_at: u32,
        page_size: u32,
    ) -> Result<Vec<WorkItem>, TrackerError>;

    /// The set of fields editable on the item in its current state.
    async fn editable_fields(&self, key: &str) -> Result<HashSet<String>, TrackerError>;

    /// Replace the item's fix-version list with `versions`.
    /// `notify`: `None` uses the server default, `Some(b)` sets the
    /// explicit user-notification flag on the request.
    async fn write_fix_versions(
        &self,
        key: &str,
        versions: &[String],
        notify: Option<bool>,
    ) -> Result<(), TrackerError>;

    /// The transitions available on the item right now.
    async fn transitions(&self, key: &str) -> Result<Vec<Transition>, TrackerError>;

    /// Apply a transition, optionally carrying a fix-version patch to
    /// be applied atomically with the status change.
    async fn apply_transition(
        &self,
        key: &str,
        transition_id: &str,
        fix_versions: Option<&[String]>,
    ) -> Result<(), TrackerError>;

    /// Authoritative, uncached re-read of a single item.
    async fn read_item(&self, key: &str) -> Result<WorkItem, TrackerError>;
}
