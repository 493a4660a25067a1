use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The phases of the per-item reconciliation procedure.
///
/// Each item flows forward through:
/// INIT → DIRECT_ATTEMPTED → TRANSITION_SEARCH → REOPEN_CYCLE → FINAL_VERIFY
///
/// No phase is revisited; phases may be skipped when an earlier one
/// terminates the item (or when the reopen preconditions do not hold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Init,
    DirectAttempted,
    TransitionSearch,
    ReopenCycle,
    FinalVerify,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Init => write!(f, "INIT"),
            Phase::DirectAttempted => write!(f, "DIRECT_ATTEMPTED"),
            Phase::TransitionSearch => write!(f, "TRANSITION_SEARCH"),
            Phase::ReopenCycle => write!(f, "REOPEN_CYCLE"),
            Phase::FinalVerify => write!(f, "FINAL_VERIFY"),
        }
    }
}

/// Which strategy achieved the removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalStrategy {
    /// Plain field update succeeded and verified.
    Direct,
    /// A workflow transition carried the field patch.
    Transition,
    /// Reopen, update, restore original status.
    ReopenCycle,
    /// Every call reported failure but the final authoritative read
    /// showed the value gone anyway.
    DespiteReportedError,
}

impl fmt::Display for RemovalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemovalStrategy::Direct => write!(f, "direct update"),
            RemovalStrategy::Transition => write!(f, "transition-carried update"),
            RemovalStrategy::ReopenCycle => write!(f, "reopen cycle"),
            RemovalStrategy::DespiteReportedError => write!(f, "confirmed despite reported errors"),
        }
    }
}

/// Per-item terminal result. `Removed` is only ever produced after a
/// fresh authoritative read confirmed the value is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalOutcome {
    /// The item did not hold the target value. Idempotent no-op,
    /// nothing was written.
    AlreadyAbsent,
    Removed(RemovalStrategy),
    NotRemoved,
}

impl RemovalOutcome {
    pub fn is_removed(&self) -> bool {
        matches!(self, RemovalOutcome::Removed(_))
    }
}

/// Whether the original lifecycle status was put back after a reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Restoration {
    /// No reopen happened, so there was nothing to restore.
    NotAttempted,
    Restored,
    /// The item was left in a non-original lifecycle state. Degraded
    /// but non-fatal; the removal outcome stands on its own.
    Failed,
}

/// Immutable record of one item's reconciliation, surfaced to the
/// caller and the console. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemReport {
    pub key: String,
    pub outcome: RemovalOutcome,
    pub restoration: Restoration,
    /// Advisory edit-metadata probe: whether the server listed the
    /// field as editable before any attempt. `None` when the probe
    /// itself failed. Informational only, never gates a strategy.
    pub field_reported_editable: Option<bool>,
    /// Phases actually entered, in order.
    pub phases: Vec<Phase>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ItemReport {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
