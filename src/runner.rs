//! Batch driver: lists the selected items page by page, runs the
//! reconciliation engine on each in turn, and tallies outcomes.
//!
//! Only run-level problems (failing to list, missing credentials) are
//! errors here. A cancellation request is honored between items, never
//! mid-item, so a reopen cycle always completes its restoration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::SweepConfig;
use crate::engine::{
    ItemReport, RemovalOutcome, RemovalStrategy, Restoration, StatusRestorer, TransitionExplorer,
};
use crate::error::SweepError;
use crate::reconciler::Reconciler;
use crate::tracker::{Tracker, WorkItem};
use crate::ui::SweepProgress;

/// Tally of a whole run, printed at the end.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub processed: u32,
    pub removed_direct: u32,
    pub removed_transition: u32,
    pub removed_reopen: u32,
    pub removed_despite_error: u32,
    pub already_absent: u32,
    pub not_removed: u32,
    pub restoration_failures: u32,
    pub interrupted: bool,
}

impl RunSummary {
    fn record(&mut self, report: &ItemReport) {
        self.processed += 1;
        match report.outcome {
            RemovalOutcome::AlreadyAbsent => self.already_absent += 1,
            RemovalOutcome::Removed(RemovalStrategy::Direct) => self.removed_direct += 1,
            RemovalOutcome::Removed(RemovalStrategy::Transition) => self.removed_transition += 1,
            RemovalOutcome::Removed(RemovalStrategy::ReopenCycle) => self.removed_reopen += 1,
            RemovalOutcome::Removed(RemovalStrategy::DespiteReportedError) => {
                self.removed_despite_error += 1
            }
            RemovalOutcome::NotRemoved => self.not_removed += 1,
        }
        if report.restoration == Restoration::Failed {
            self.restoration_failures += 1;
        }
    }

    pub fn removed_total(&self) -> u32 {
        self.removed_direct
            + self.removed_transition
            + self.removed_reopen
            + self.removed_despite_error
    }
}

pub struct SweepRunner<'a> {
    tracker: &'a dyn Tracker,
    explorer: TransitionExplorer,
    restorer: StatusRestorer,
    page_size: u32,
    max_results: Option<u32>,
    cancel: Arc<AtomicBool>,
    verbose: bool,
}

impl<'a> SweepRunner<'a> {
    pub fn new(
        tracker: &'a dyn Tracker,
        config: &SweepConfig,
        page_size: u32,
        max_results: Option<u32>,
        cancel: Arc<AtomicBool>,
        verbose: bool,
    ) -> Self {
        Self {
            tracker,
            explorer: TransitionExplorer::new(config.explorer.clone()),
            restorer: StatusRestorer::new(config.restorer.clone()),
            page_size,
            max_results,
            cancel,
            verbose,
        }
    }

    /// Fetch every matching item up front, page by page. Stops at a
    /// short page or at `max_results`, whichever comes first. A
    /// listing failure aborts the run.
    pub async fn list_items(&self, query: &str) -> Result<Vec<WorkItem>, SweepError> {
        let mut all: Vec<WorkItem> = Vec::new();
        let mut start_at = 0u32;

        loop {
            let page = self
                .tracker
                .search_page(query, start_at, self.page_size)
                .await
                .map_err(SweepError::Listing)?;
            let fetched = page.len() as u32;
            all.extend(page);

            if let Some(cap) = self.max_results
                && all.len() as u32 >= cap
            {
                all.truncate(cap as usize);
                break;
            }
            if fetched < self.page_size {
                break;
            }
            start_at += self.page_size;
        }

        Ok(all)
    }

    /// The full sweep: list, reconcile each item, tally.
    pub async fn run(&self, query: &str, target: &str) -> Result<RunSummary, SweepError> {
        let items = self.list_items(query).await?;
        let ui = SweepProgress::start(items.len() as u64);
        let engine = Reconciler::new(self.tracker, self.explorer.clone(), self.restorer.clone());

        let mut summary = RunSummary::default();
        for item in &items {
            // Checked between items only; a reopen cycle in flight is
            // never abandoned.
            if self.cancel.load(Ordering::SeqCst) {
                summary.interrupted = true;
                break;
            }

            ui.item(item);
            let report = engine.reconcile(item, target).await;
            ui.outcome(&report, target);
            if self.verbose {
                ui.phase_trail(&report);
            }
            summary.record(&report);
        }

        ui.finish(&summary);
        Ok(summary)
    }

    /// Read-only pass: report which matching items hold the value.
    pub async fn scan(&self, query: &str, target: &str) -> Result<(usize, usize), SweepError> {
        let items = self.list_items(query).await?;
        let ui = SweepProgress::start(items.len() as u64);

        let mut holding = 0;
        for item in &items {
            if item.has_version(target) {
                holding += 1;
            }
            ui.scan_line(item, target);
        }
        ui.finish_scan(items.len(), holding, target);
        Ok((items.len(), holding))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::tracker::{Transition, TrackerError};

    /// Fake that serves canned pages and accepts direct writes.
    struct PagedTracker {
        items: Mutex<Vec<WorkItem>>,
        search_calls: Mutex<Vec<u32>>,
        fail_listing: bool,
    }

    impl PagedTracker {
        fn with_items(count: usize, versions: &[&str]) -> Self {
            let items = (0..count)
                .map(|i| WorkItem {
                    key: format!("HP-{i}"),
                    summary: format!("item {i}"),
                    status: "Open".into(),
                    item_type: "Bug".into(),
                    fix_versions: versions.iter().map(|s| s.to_string()).collect(),
                })
                .collect();
            Self {
                items: Mutex::new(items),
                search_calls: Mutex::new(Vec::new()),
                fail_listing: false,
            }
        }
    }

    #[async_trait]
    impl Tracker for PagedTracker {
        async fn search_page(
            &self,
            _query: &str,
            start_at: u32,
            page_size: u32,
        ) -> Result<Vec<WorkItem>, TrackerError> {
            if self.fail_listing {
                return Err(TrackerError::Server {
                    status: 500,
                    message: "search unavailable".into(),
                });
            }
            self.search_calls.lock().unwrap().push(start_at);
            let items = self.items.lock().unwrap();
            let start = start_at as usize;
            let end = (start + page_size as usize).min(items.len());
            Ok(items.get(start..end).unwrap_or_default().to_vec())
        }

        async fn editable_fields(&self, _key: &str) -> Result<HashSet<String>, TrackerError> {
            Ok(HashSet::new())
        }

        async fn write_fix_versions(
            &self,
            key: &str,
            versions: &[String],
            _notify: Option<bool>,
        ) -> Result<(), TrackerError> {
            let mut items = self.items.lock().unwrap();
            if let Some(item) = items.iter_mut().find(|i| i.key == key) {
                item.fix_versions = versions.to_vec();
            }
            Ok(())
        }

        async fn transitions(&self, _key: &str) -> Result<Vec<Transition>, TrackerError> {
            Ok(Vec::new())
        }

        async fn apply_transition(
            &self,
            _key: &str,
            _transition_id: &str,
            _fix_versions: Option<&[String]>,
        ) -> Result<(), TrackerError> {
            Ok(())
        }

        async fn read_item(&self, key: &str) -> Result<WorkItem, TrackerError> {
            let items = self.items.lock().unwrap();
            items
                .iter()
                .find(|i| i.key == key)
                .cloned()
                .ok_or(TrackerError::NotFound {
                    message: format!("{key} not found"),
                })
        }
    }

    fn runner<'a>(tracker: &'a PagedTracker, page_size: u32, max: Option<u32>) -> SweepRunner<'a> {
        SweepRunner::new(
            tracker,
            &SweepConfig::default(),
            page_size,
            max,
            Arc::new(AtomicBool::new(false)),
            false,
        )
    }

    #[tokio::test]
    async fn listing_paginates_until_short_page() {
        let tracker = PagedTracker::with_items(5, &["1.0"]);
        let items = runner(&tracker, 2, None).list_items("q").await.unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(*tracker.search_calls.lock().unwrap(), vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn listing_honors_max_results() {
        let tracker = PagedTracker::with_items(5, &["1.0"]);
        let items = runner(&tracker, 2, Some(3)).list_items("q").await.unwrap();
        assert_eq!(items.len(), 3);
        // Capped after the second page; no third fetch.
        assert_eq!(*tracker.search_calls.lock().unwrap(), vec![0, 2]);
    }

    #[tokio::test]
    async fn listing_failure_is_fatal() {
        let mut tracker = PagedTracker::with_items(1, &["1.0"]);
        tracker.fail_listing = true;
        let err = runner(&tracker, 10, None).list_items("q").await.unwrap_err();
        assert!(matches!(err, SweepError::Listing(_)));
    }

    #[tokio::test]
    async fn run_tallies_direct_removals_and_skips() {
        let tracker = PagedTracker::with_items(3, &["1.0", "2.0"]);
        // One item does not hold the target.
        tracker.items.lock().unwrap()[2].fix_versions = vec!["2.0".into()];

        let summary = runner(&tracker, 10, None).run("q", "1.0").await.unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.removed_direct, 2);
        assert_eq!(summary.already_absent, 1);
        assert_eq!(summary.not_removed, 0);
        assert_eq!(summary.removed_total(), 2);
        assert!(!summary.interrupted);
    }

    #[tokio::test]
    async fn cancellation_stops_between_items() {
        let tracker = PagedTracker::with_items(4, &["1.0"]);
        let cancel = Arc::new(AtomicBool::new(true));
        let runner = SweepRunner::new(
            &tracker,
            &SweepConfig::default(),
            10,
            None,
            cancel,
            false,
        );

        let summary = runner.run("q", "1.0").await.unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.processed, 0);
    }

    #[tokio::test]
    async fn scan_counts_holders_without_writing() {
        let tracker = PagedTracker::with_items(3, &["1.0"]);
        tracker.items.lock().unwrap()[0].fix_versions = vec!["9.9".into()];

        let (total, holding) = runner(&tracker, 10, None).scan("q", "1.0").await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(holding, 2);
        // No writes happened.
        let items = tracker.items.lock().unwrap();
        assert!(items[1].fix_versions.contains(&"1.0".to_string()));
    }
}
