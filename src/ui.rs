//! Terminal output: progress bar across the batch, one styled line
//! per item outcome, and the final tally.
//!
//! Uses `indicatif` for the bar and `console` for color styles. All
//! per-item lines go through `ProgressBar::println` so they do not
//! clobber the bar.

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::engine::{ItemReport, RemovalOutcome, RemovalStrategy, Restoration};
use crate::runner::RunSummary;
use crate::tracker::WorkItem;

pub struct SweepProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
    dim: Style,
    key: Style,
}

impl SweepProgress {
    /// Start a bar sized to the number of selected items.
    pub fn start(total: u64) -> Self {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .expect("invalid template")
                .progress_chars("=> "),
        );

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            dim: Style::new().dim(),
            key: Style::new().blue().bold(),
        }
    }

    /// Announce the item about to be processed.
    pub fn item(&self, item: &WorkItem) {
        self.pb.set_message(item.key.clone());
        self.pb.println(format!(
            "{}: {} ({}, {})",
            self.key.apply_to(&item.key),
            item.summary,
            item.item_type,
            item.status,
        ));
    }

    /// One outcome line per item.
    pub fn outcome(&self, report: &ItemReport, target: &str) {
        let line = match report.outcome {
            RemovalOutcome::AlreadyAbsent => format!(
                "  {} does not carry '{target}', skipped",
                self.dim.apply_to(&report.key)
            ),
            RemovalOutcome::Removed(strategy) => {
                let suffix = match strategy {
                    RemovalStrategy::Direct => "",
                    RemovalStrategy::Transition => " via workflow transition",
                    RemovalStrategy::ReopenCycle => " via reopen cycle",
                    RemovalStrategy::DespiteReportedError => " (confirmed despite reported errors)",
                };
                format!(
                    "  {} removed '{target}' from {}{suffix}",
                    self.green.apply_to("✓"),
                    report.key
                )
            }
            RemovalOutcome::NotRemoved => format!(
                "  {} could not remove '{target}' from {} (all strategies exhausted)",
                self.red.apply_to("✗"),
                report.key
            ),
        };
        self.pb.println(line);

        if report.restoration == Restoration::Failed {
            self.pb.println(format!(
                "  {} {} was left in a non-original lifecycle state",
                self.yellow.apply_to("⚠"),
                report.key
            ));
        }

        self.pb.inc(1);
    }

    /// Verbose mode: which phases the engine actually entered.
    pub fn phase_trail(&self, report: &ItemReport) {
        let trail: Vec<String> = report.phases.iter().map(|p| p.to_string()).collect();
        self.pb.println(format!(
            "  {}",
            self.dim
                .apply_to(format!("phases: {} ({}ms)", trail.join(" > "), report.duration_ms()))
        ));
    }

    /// Line for a `scan` pass (read-only).
    pub fn scan_line(&self, item: &WorkItem, target: &str) {
        let line = if item.has_version(target) {
            format!(
                "{} holds '{target}' (status: {})",
                self.yellow.apply_to(&item.key),
                item.status
            )
        } else {
            format!("{} does not hold '{target}'", self.dim.apply_to(&item.key))
        };
        self.pb.println(line);
        self.pb.inc(1);
    }

    /// Finish a scan pass with its small tally.
    pub fn finish_scan(&self, total: usize, holding: usize, target: &str) {
        self.pb.finish_and_clear();
        println!();
        println!(
            "{} of {} matching items hold '{target}'",
            self.yellow.apply_to(holding.to_string()),
            total
        );
    }

    /// Finish the bar and print the tally.
    pub fn finish(&self, summary: &RunSummary) {
        self.pb.finish_and_clear();
        println!();
        println!("{}", self.green.apply_to("─── Sweep Summary ───"));
        println!("  items processed:       {}", summary.processed);
        println!("  removed (direct):      {}", summary.removed_direct);
        println!("  removed (transition):  {}", summary.removed_transition);
        println!("  removed (reopen):      {}", summary.removed_reopen);
        println!("  removed (post-error):  {}", summary.removed_despite_error);
        println!("  already absent:        {}", summary.already_absent);
        println!("  not removed:           {}", summary.not_removed);
        if summary.restoration_failures > 0 {
            println!(
                "  {}  {}",
                self.yellow.apply_to("restoration failures:"),
                summary.restoration_failures
            );
        }
        if summary.interrupted {
            println!(
                "  {}",
                self.yellow.apply_to("run interrupted before completion")
            );
        }
    }
}
