//! Built-in ruleset table.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A named game system with its ordered turn phases.
///
/// When `one_turn_for_all_players` is set, phases are ignored and the
/// table tracks a single shared turn.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ruleset {
    /// Display name of the game system.
    name: String,
    /// Ordered phase names for a single player turn.
    #[serde(default)]
    phases: Vec<String>,
    /// Whether players share one turn and phases are not tracked.
    #[serde(default)]
    one_turn_for_all_players: bool,
}

impl Ruleset {
    /// Creates a ruleset from a name and its phases.
    #[instrument(skip(phases))]
    pub fn new(name: &str, phases: &[&str], one_turn_for_all_players: bool) -> Self {
        Self {
            name: name.to_string(),
            phases: phases.iter().map(|p| p.to_string()).collect(),
            one_turn_for_all_players,
        }
    }

    /// Returns a copy with the shared-turn flag replaced.
    pub fn with_one_turn_for_all_players(mut self, value: bool) -> Self {
        self.one_turn_for_all_players = value;
        self
    }
}

/// Returns the rulesets shipped with the application.
#[instrument]
pub fn builtin_rulesets() -> Vec<Ruleset> {
    vec![
        Ruleset::new(
            "Warhammer 40K (10th Edition)",
            &[
                "Command Phase",
                "Movement Phase",
                "Shooting Phase",
                "Charge Phase",
                "Fight Phase",
                "End Phase",
            ],
            false,
        ),
        Ruleset::new(
            "Kill Team (2021)",
            &[
                "Initiative Phase",
                "Movement Phase",
                "Shooting Phase",
                "Fight Phase",
                "Morale Phase",
            ],
            false,
        ),
        Ruleset::new(
            "Necromunda (2022 edition)",
            &["Recovery Phase", "Action Phase", "End Phase"],
            false,
        ),
        Ruleset::new(
            "Age of Sigmar (4th Edition)",
            &[
                "Start of Turn Phase",
                "Hero Phase",
                "Movement Phase",
                "Shooting Phase",
                "Charge Phase",
                "Combat Phase",
                "End of Turn Phase",
            ],
            false,
        ),
        Ruleset::new(
            "Warcry (3rd edition)",
            &[
                "Set Up Phase",
                "Players' Phase (activating models alternately)",
                "End Phase",
            ],
            false,
        ),
        Ruleset::new(
            "Blood Bowl (2020 edition)",
            &[
                "Pre-Match Phase",
                "Kick-Off Phase",
                "Team Turn (both teams alternate)",
                "End of Turn Phase",
                "Post-Match Phase",
            ],
            false,
        ),
        Ruleset::new(
            "Bunny Kingdom",
            &[
                "Draft Phase (players select cards)",
                "Build Phase (place cards on the board)",
                "Scoring Phase (calculate points based on card placement)",
            ],
            false,
        ),
        Ruleset::new("Chess", &[], true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_names_are_unique() {
        let rules = builtin_rulesets();
        let mut names: Vec<_> = rules.iter().map(|r| r.name().clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), rules.len());
    }

    #[test]
    fn test_chess_ignores_phases() {
        let rules = builtin_rulesets();
        let chess = rules.last().expect("table is not empty");
        assert!(chess.phases().is_empty());
        assert!(*chess.one_turn_for_all_players());
    }

    #[test]
    fn test_ruleset_json_uses_camel_case() {
        let ruleset = Ruleset::new("Test", &["A"], true);
        let json = serde_json::to_string(&ruleset).expect("serializes");
        assert!(json.contains("\"oneTurnForAllPlayers\":true"));
    }
}
