//! Returns an item to an equivalent terminal status after a reopen.
//!
//! Matching is heuristic by necessity: workflows rarely expose a
//! transition literally named after the status, so a synonym table
//! maps each terminal status to the transition-name tokens that tend
//! to lead back to it. The table is configurable for non-default
//! workflow vocabularies.

use std::collections::HashMap;

use serde::Deserialize;

use super::explorer::name_contains;
use super::outcome::Restoration;
use crate::tracker::{Tracker, Transition};

/// Synonym table: lowercase original status → transition-name tokens.
/// The first transition (in server order) matching any token wins.
#[derive(Debug, Clone, Deserialize)]
pub struct RestorerConfig {
    #[serde(default = "default_synonyms")]
    pub synonyms: HashMap<String, Vec<String>>,
}

fn default_synonyms() -> HashMap<String, Vec<String>> {
    HashMap::from([
        (
            "closed".to_string(),
            vec!["close".into(), "resolve".into(), "done".into(), "complete".into()],
        ),
        (
            "resolved".to_string(),
            vec!["resolve".into(), "close".into(), "done".into(), "complete".into()],
        ),
        (
            "done".to_string(),
            vec!["done".into(), "complete".into(), "close".into(), "resolve".into()],
        ),
    ])
}

impl Default for RestorerConfig {
    fn default() -> Self {
        Self {
            synonyms: default_synonyms(),
        }
    }
}

#[derive(Clone)]
pub struct StatusRestorer {
    config: RestorerConfig,
}

impl StatusRestorer {
    pub fn new(config: RestorerConfig) -> Self {
        Self { config }
    }

    /// Pick the transition most likely to restore `original_status`.
    ///
    /// Synonym tokens are tried first; if none match, any transition
    /// whose name literally contains the status name is accepted.
    pub fn select<'a>(
        &self,
        original_status: &str,
        transitions: &'a [Transition],
    ) -> Option<&'a Transition> {
        let status_key = original_status.to_lowercase();

        if let Some(tokens) = self.config.synonyms.get(&status_key) {
            let matched = transitions
                .iter()
                .find(|t| tokens.iter().any(|tok| name_contains(t, tok)));
            if matched.is_some() {
                return matched;
            }
        }

        transitions.iter().find(|t| name_contains(t, &status_key))
    }

    /// Fetch current transitions and apply the first restoring match.
    /// Best-effort: every failure path degrades to
    /// [`Restoration::Failed`], never to an error.
    pub async fn restore(
        &self,
        tracker: &dyn Tracker,
        key: &str,
        original_status: &str,
    ) -> Restoration {
        let transitions = match tracker.transitions(key).await {
            Ok(ts) => ts,
            Err(_) => return Restoration::Failed,
        };

        let Some(transition) = self.select(original_status, &transitions) else {
            return Restoration::Failed;
        };

        match tracker.apply_transition(key, &transition.id, None).await {
            Ok(()) => Restoration::Restored,
            Err(_) => Restoration::Failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(id: &str, name: &str) -> Transition {
        Transition {
            id: id.into(),
            name: name.into(),
        }
    }

    fn restorer() -> StatusRestorer {
        StatusRestorer::new(RestorerConfig::default())
    }

    #[test]
    fn closed_prefers_close_synonym() {
        let transitions = vec![t("1", "Start Progress"), t("2", "Close Issue")];
        let selected = restorer().select("Closed", &transitions).unwrap();
        assert_eq!(selected.id, "2");
    }

    #[test]
    fn resolved_accepts_any_synonym() {
        let transitions = vec![t("1", "Mark Complete")];
        let selected = restorer().select("Resolved", &transitions).unwrap();
        assert_eq!(selected.id, "1");
    }

    #[test]
    fn first_matching_transition_wins_in_server_order() {
        let transitions = vec![t("1", "Close Issue"), t("2", "Mark as Done")];
        let selected = restorer().select("Done", &transitions).unwrap();
        assert_eq!(selected.id, "1");
    }

    #[test]
    fn literal_fallback_for_unknown_status() {
        let transitions = vec![t("1", "Back to Verified"), t("2", "Close")];
        let selected = restorer().select("Verified", &transitions).unwrap();
        assert_eq!(selected.id, "1");
    }

    #[test]
    fn no_match_returns_none() {
        let transitions = vec![t("1", "Start Progress")];
        assert!(restorer().select("Closed", &transitions).is_none());
    }

    #[test]
    fn status_match_is_case_insensitive() {
        let transitions = vec![t("1", "CLOSE ISSUE")];
        let selected = restorer().select("closed", &transitions).unwrap();
        assert_eq!(selected.id, "1");
    }
}
