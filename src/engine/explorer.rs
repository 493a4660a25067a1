//! Ranks available workflow transitions by how likely they are to
//! accept a field patch, using name-token tiers.
//!
//! Tier tokens are data, not code: the defaults mirror common JIRA
//! workflow vocabulary, and deployments with localized or custom
//! workflows can override them in `fixsweep.toml`.

use serde::Deserialize;

use crate::tracker::Transition;

/// Token tiers for transition ranking, tried in order. A final
/// catch-all tier of every not-yet-selected transition is implicit.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_tier_tokens")]
    pub tier_tokens: Vec<Vec<String>>,
    /// Maximum candidates attempted per tier.
    #[serde(default = "default_per_tier_cap")]
    pub per_tier_cap: usize,
}

fn default_tier_tokens() -> Vec<Vec<String>> {
    vec![
        vec!["edit".into()],
        vec!["update".into()],
        vec!["reopen".into()],
        vec![
            "modify".into(),
            "change".into(),
            "start".into(),
            "progress".into(),
        ],
    ]
}

fn default_per_tier_cap() -> usize {
    5
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            tier_tokens: default_tier_tokens(),
            per_tier_cap: default_per_tier_cap(),
        }
    }
}

/// Case-insensitive substring match of `token` in the transition name.
pub fn name_contains(transition: &Transition, token: &str) -> bool {
    transition.name.to_lowercase().contains(&token.to_lowercase())
}

/// Plans the attempt order over a fixed snapshot of transitions.
#[derive(Clone)]
pub struct TransitionExplorer {
    config: ExplorerConfig,
}

impl TransitionExplorer {
    pub fn new(config: ExplorerConfig) -> Self {
        Self { config }
    }

    /// Flatten the tiers into a single attempt order.
    ///
    /// Within a tier the server's returned order is preserved; a
    /// transition matching several tiers is attempted once, in its
    /// earliest tier; each tier contributes at most `per_tier_cap`
    /// candidates. The trailing catch-all tier holds everything the
    /// token tiers did not select.
    pub fn rank<'a>(&self, transitions: &'a [Transition]) -> Vec<&'a Transition> {
        let mut ranked: Vec<&Transition> = Vec::new();
        let mut taken: Vec<&str> = Vec::new();

        for tokens in &self.config.tier_tokens {
            let mut tier_count = 0;
            for t in transitions {
                if tier_count >= self.config.per_tier_cap {
                    break;
                }
                if taken.contains(&t.id.as_str()) {
                    continue;
                }
                if tokens.iter().any(|tok| name_contains(t, tok)) {
                    ranked.push(t);
                    taken.push(&t.id);
                    tier_count += 1;
                }
            }
        }

        // Catch-all tier: all remaining, server order.
        let mut tier_count = 0;
        for t in transitions {
            if tier_count >= self.config.per_tier_cap {
                break;
            }
            if !taken.contains(&t.id.as_str()) {
                ranked.push(t);
                tier_count += 1;
            }
        }

        ranked
    }

    /// First transition whose name contains "reopen", if any.
    pub fn find_reopen<'a>(&self, transitions: &'a [Transition]) -> Option<&'a Transition> {
        transitions.iter().find(|t| name_contains(t, "reopen"))
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

    fn explorer() -> TransitionExplorer {
        TransitionExplorer::new(ExplorerConfig::default())
    }

    #[test]
    fn edit_tier_wins_over_later_tiers() {
        let transitions = vec![
            t("1", "Start Progress"),
            t("2", "Reopen Issue"),
            t("3", "Edit Closed Issue"),
            t("4", "Update Fields"),
        ];
        let ranked = explorer().rank(&transitions);
        let names: Vec<&str> = ranked.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Edit Closed Issue",
                "Update Fields",
                "Reopen Issue",
                "Start Progress"
            ]
        );
    }

    #[test]
    fn server_order_preserved_within_tier() {
        let transitions = vec![
            t("9", "Edit B"),
            t("2", "Edit A"),
            t("5", "Edit C"),
        ];
        let ranked = explorer().rank(&transitions);
        let names: Vec<&str> = ranked.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Edit B", "Edit A", "Edit C"]);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let transitions = vec![t("1", "REOPEN AND REVIEW")];
        let ranked = explorer().rank(&transitions);
        assert_eq!(ranked.len(), 1);
        assert!(explorer().find_reopen(&transitions).is_some());
    }

    #[test]
    fn multi_tier_match_attempted_once() {
        // "Edit and Update" matches tier 1 and tier 2.
        let transitions = vec![t("1", "Edit and Update"), t("2", "Close")];
        let ranked = explorer().rank(&transitions);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "1");
        assert_eq!(ranked[1].id, "2");
    }

    #[test]
    fn per_tier_cap_applies() {
        let transitions: Vec<Transition> = (0..8)
            .map(|i| t(&i.to_string(), &format!("Edit {i}")))
            .collect();
        let ranked = explorer().rank(&transitions);
        // 5 from the edit tier, the rest from the catch-all tier.
        assert_eq!(ranked.len(), 8);
        assert_eq!(ranked[0].name, "Edit 0");
        assert_eq!(ranked[4].name, "Edit 4");
        // Catch-all picks up the ones the capped tier skipped.
        assert_eq!(ranked[5].name, "Edit 5");
    }

    #[test]
    fn catch_all_holds_unmatched_transitions() {
        let transitions = vec![t("1", "Close Issue"), t("2", "Resolve Issue")];
        let ranked = explorer().rank(&transitions);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Close Issue");
    }

    #[test]
    fn no_reopen_when_absent() {
        let transitions = vec![t("1", "Close Issue")];
        assert!(explorer().find_reopen(&transitions).is_none());
    }

    #[test]
    fn custom_tier_tokens_respected() {
        let config = ExplorerConfig {
            tier_tokens: vec![vec!["wiederöffnen".into()]],
            per_tier_cap: 5,
        };
        let ex = TransitionExplorer::new(config);
        let transitions = vec![t("1", "Vorgang wiederöffnen"), t("2", "Edit")];
        let ranked = ex.rank(&transitions);
        assert_eq!(ranked[0].id, "1");
    }
}
