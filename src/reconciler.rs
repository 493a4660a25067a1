//! The field reconciliation engine.
//!
//! Given a work item that holds the target fix version, walks an
//! explicit phase sequence (direct update, transition-carried update,
//! reopen cycle, final verification) until an authoritative re-read
//! confirms the value is gone or every strategy is exhausted. A
//! `Removed` outcome is never produced from a mutating call's return
//! code alone.

use chrono::Utc;

use crate::engine::{
    ItemReport, Phase, RemovalOutcome, RemovalStrategy, Restoration, StatusRestorer,
    TransitionExplorer,
};
use crate::tracker::types::FIX_VERSIONS_FIELD;
use crate::tracker::{Tracker, WorkItem};

/// Statuses eligible for the reopen cycle, compared case-insensitively.
const TERMINAL_STATUSES: [&str; 3] = ["closed", "resolved", "done"];

/// Update variants tried after a successful reopen: server default,
/// then explicit notification suppress, then explicit notify.
const REOPEN_UPDATE_VARIANTS: [Option<bool>; 3] = [None, Some(false), Some(true)];

fn is_terminal_status(status: &str) -> bool {
    let lower = status.to_lowercase();
    TERMINAL_STATUSES.contains(&lower.as_str())
}

pub struct Reconciler<'a> {
    tracker: &'a dyn Tracker,
    explorer: TransitionExplorer,
    restorer: StatusRestorer,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        tracker: &'a dyn Tracker,
        explorer: TransitionExplorer,
        restorer: StatusRestorer,
    ) -> Self {
        Self {
            tracker,
            explorer,
            restorer,
        }
    }

    /// Reconcile one item: remove `target` from its fix versions if at
    /// all possible, reverting any lifecycle side effects afterwards.
    ///
    /// Per-item failures are data, not errors: the report always
    /// comes back and the batch moves on.
    pub async fn reconcile(&self, item: &WorkItem, target: &str) -> ItemReport {
        let started_at = Utc::now();
        let mut phases = vec![Phase::Init];

        // Idempotent skip: nothing to do, nothing to verify.
        if !item.has_version(target) {
            return self.report(
                item,
                RemovalOutcome::AlreadyAbsent,
                Restoration::NotAttempted,
                None,
                phases,
                started_at,
            );
        }

        // Advisory capability probe. A failed probe degrades to
        // "unknown"; either way the direct attempt still runs first.
        let probed = match self.tracker.editable_fields(&item.key).await {
            Ok(fields) => Some(fields.contains(FIX_VERSIONS_FIELD)),
            Err(_) => None,
        };

        let remaining = item.versions_without(target);

        // Phase: direct field update.
        phases.push(Phase::DirectAttempted);
        if self
            .tracker
            .write_fix_versions(&item.key, &remaining, None)
            .await
            .is_ok()
            && self.confirmed_absent(&item.key, target).await
        {
            return self.report(
                item,
                RemovalOutcome::Removed(RemovalStrategy::Direct),
                Restoration::NotAttempted,
                probed,
                phases,
                started_at,
            );
        }
        // Any direct-write failure (workflow rejection, permission,
        // transport, unknown) escalates. The server's error taxonomy
        // cannot be trusted to tell a permanent refusal from a blip.

        // Phase: transition-carried update.
        phases.push(Phase::TransitionSearch);
        let transitions = self.tracker.transitions(&item.key).await.unwrap_or_default();
        for candidate in self.explorer.rank(&transitions) {
            let applied = self
                .tracker
                .apply_transition(&item.key, &candidate.id, Some(&remaining))
                .await
                .is_ok();
            if applied && self.confirmed_absent(&item.key, target).await {
                return self.report(
                    item,
                    RemovalOutcome::Removed(RemovalStrategy::Transition),
                    Restoration::NotAttempted,
                    probed,
                    phases,
                    started_at,
                );
            }
        }

        // Phase: reopen cycle. Only for items sitting in a terminal
        // status with a reopen transition on offer. Once entered, it
        // runs to completion including restoration.
        let mut restoration = Restoration::NotAttempted;
        if is_terminal_status(&item.status) {
            if let Some(reopen) = self.explorer.find_reopen(&transitions) {
                phases.push(Phase::ReopenCycle);
                let original_status = item.status.clone();

                if self
                    .tracker
                    .apply_transition(&item.key, &reopen.id, None)
                    .await
                    .is_ok()
                {
                    for notify in REOPEN_UPDATE_VARIANTS {
                        if self
                            .tracker
                            .write_fix_versions(&item.key, &remaining, notify)
                            .await
                            .is_ok()
                        {
                            break;
                        }
                    }

                    // One authoritative read settles both questions:
                    // did a variant land, or did the reopen transition
                    // itself carry the change.
                    let removed = self.confirmed_absent(&item.key, target).await;

                    // Restoration runs whether or not removal worked;
                    // the reopen is a side effect that must not dangle.
                    restoration = self
                        .restorer
                        .restore(self.tracker, &item.key, &original_status)
                        .await;

                    if removed {
                        return self.report(
                            item,
                            RemovalOutcome::Removed(RemovalStrategy::ReopenCycle),
                            restoration,
                            probed,
                            phases,
                            started_at,
                        );
                    }
                }
                // Reopen call failed: nothing changed, nothing to restore.
            }
        }

        // Phase: final verification. JIRA can apply a change while
        // returning an error, so the last word goes to a fresh read.
        phases.push(Phase::FinalVerify);
        let outcome = if self.confirmed_absent(&item.key, target).await {
            RemovalOutcome::Removed(RemovalStrategy::DespiteReportedError)
        } else {
            RemovalOutcome::NotRemoved
        };
        self.report(item, outcome, restoration, probed, phases, started_at)
    }

    /// Fresh authoritative read; `true` only when the read succeeded
    /// and the target value is gone. A failed read never counts as
    /// confirmation.
    async fn confirmed_absent(&self, key: &str, target: &str) -> bool {
        match self.tracker.read_item(key).await {
            Ok(fresh) => !fresh.has_version(target),
            Err(_) => false,
        }
    }

    fn report(
        &self,
        item: &WorkItem,
        outcome: RemovalOutcome,
        restoration: Restoration,
        field_reported_editable: Option<bool>,
        phases: Vec<Phase>,
        started_at: chrono::DateTime<Utc>,
    ) -> ItemReport {
        ItemReport {
            key: item.key.clone(),
            outcome,
            restoration,
            field_reported_editable,
            phases,
            started_at,
            finished_at: Utc::now(),
        }
    }
}
