//! Rule engine — filters the rule catalog by context and partitions by role.
//!
//! Evaluation priority is constraint > anchor > preference > embellishment.
//! Two anchors competing for the same `(trigger, affects slot)` key is an
//! authoring error: it is reported as a diagnostic and resolved
//! first-registered-wins in stable catalog order, never as a failure.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Affects, Part, Role, Rule, Trigger};
use crate::diag::Diagnostic;
use crate::timeline::ChordEntry;

/// The user's generation choices, passed explicitly into every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub genre: String,
    pub level: u32,
    pub progression_id: String,
    /// Instrument string carrying the key root (1-6); presentation detail,
    /// but required before generation may proceed.
    pub root_string: Option<u8>,
    /// 0-100; the probability (in percent) of a uniformly random preference
    /// pick instead of a weighted one.
    pub randomness: u8,
    pub part: Part,
}

/// Keep the rules matching a selection: same part, genre membership, and
/// `min_level <= level <= max_level` (an absent max never bounds above).
pub fn active_rules<'a>(selection: &Selection, rules: &'a [Rule]) -> Vec<&'a Rule> {
    rules
        .iter()
        .filter(|rule| {
            rule.part == selection.part
                && rule.genre_tags.iter().any(|g| g == &selection.genre)
                && selection.level >= rule.min_level
                && rule.max_level.map_or(true, |max| selection.level <= max)
        })
        .collect()
}

/// Active rules partitioned by role, in stable catalog order.
#[derive(Debug, Clone, Default)]
pub struct OrganizedRules<'a> {
    pub constraints: Vec<&'a Rule>,
    pub anchors: Vec<&'a Rule>,
    pub preferences: Vec<&'a Rule>,
    pub embellishments: Vec<&'a Rule>,
}

impl<'a> OrganizedRules<'a> {
    /// Whether any role bucket holds a rule.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
            && self.anchors.is_empty()
            && self.preferences.is_empty()
            && self.embellishments.is_empty()
    }
}

/// Partition rules by role and detect anchor-anchor conflicts.
pub fn resolve_conflicts<'a>(rules: &[&'a Rule]) -> (OrganizedRules<'a>, Vec<Diagnostic>) {
    let mut organized = OrganizedRules::default();
    for rule in rules {
        match rule.role {
            Role::Constraint => organized.constraints.push(rule),
            Role::Anchor => organized.anchors.push(rule),
            Role::Preference => organized.preferences.push(rule),
            Role::Embellishment => organized.embellishments.push(rule),
        }
    }

    let diagnostics = find_anchor_conflicts(&organized.anchors);
    (organized, diagnostics)
}

/// Two anchors on the same `(trigger, affects slot)` key are a data error:
/// both are mandatory, but only the first-registered one can win.
fn find_anchor_conflicts(anchors: &[&Rule]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let mut by_key: HashMap<(Trigger, Affects), &Rule> = HashMap::new();

    for rule in anchors {
        match by_key.get(&(rule.trigger, rule.affects_slot)) {
            Some(first) => diagnostics.push(Diagnostic::new(format!(
                "anchor conflict: '{}' and '{}' both target {:?}:{:?}; keeping '{}'",
                first.id, rule.id, rule.trigger, rule.affects_slot, first.id
            ))),
            None => {
                by_key.insert((rule.trigger, rule.affects_slot), rule);
            }
        }
    }

    diagnostics
}

/// Narrow organized rules to the ones triggered at a specific beat.
pub fn rules_for_context<'a>(
    organized: &OrganizedRules<'a>,
    _bar: u32,
    beat: u32,
    current_chord: &ChordEntry,
    previous_chord: Option<&ChordEntry>,
) -> OrganizedRules<'a> {
    let matches = |rule: &Rule| match rule.trigger {
        Trigger::Always => true,
        Trigger::Beat1 => beat == 1,
        Trigger::Beat3 => beat == 3,
        Trigger::ChordChange => previous_chord.is_some_and(|prev| prev != current_chord),
    };

    OrganizedRules {
        constraints: organized
            .constraints
            .iter()
            .filter(|r| matches(r))
            .copied()
            .collect(),
        anchors: organized
            .anchors
            .iter()
            .filter(|r| matches(r))
            .copied()
            .collect(),
        preferences: organized
            .preferences
            .iter()
            .filter(|r| matches(r))
            .copied()
            .collect(),
        embellishments: organized
            .embellishments
            .iter()
            .filter(|r| matches(r))
            .copied()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin, Affects};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn selection(genre: &str, level: u32, part: Part) -> Selection {
        Selection {
            genre: genre.to_string(),
            level,
            progression_id: "blues-12bar".to_string(),
            root_string: Some(6),
            randomness: 50,
            part,
        }
    }

    fn chord(symbol: &str) -> ChordEntry {
        ChordEntry::from_symbol(symbol, 1)
    }

    #[test]
    fn filters_by_part_genre_and_level() {
        let catalog = builtin::catalog();
        let rules = active_rules(&selection("blues", 1, Part::Bass), &catalog.rules);
        assert!(!rules.is_empty());
        assert!(rules
            .iter()
            .all(|r| r.part == Part::Bass && r.genre_tags.contains(&"blues".to_string())));
        // The level-2 embellishment is excluded at level 1.
        assert!(!rules.iter().any(|r| r.id == "bass-blues-embellishment-walk"));

        let rules_l2 = active_rules(&selection("blues", 2, Part::Bass), &catalog.rules);
        assert!(rules_l2
            .iter()
            .any(|r| r.id == "bass-blues-embellishment-walk"));
    }

    #[test]
    fn unknown_genre_matches_nothing() {
        let catalog = builtin::catalog();
        assert!(active_rules(&selection("metal", 1, Part::Bass), &catalog.rules).is_empty());
    }

    #[test]
    fn level_bounds_are_inclusive() {
        let mut rule = builtin::catalog().rules[0].clone();
        rule.min_level = 2;
        rule.max_level = Some(4);
        let rules = vec![rule];

        for (level, expected) in [(1, false), (2, true), (4, true), (5, false)] {
            let found = !active_rules(&selection("blues", level, Part::Bass), &rules).is_empty();
            assert_eq!(found, expected, "level {level}");
        }
    }

    #[test]
    fn random_selections_never_break_level_bounds() {
        // Randomized pairing of selections and catalogs, seeded for
        // reproducibility.
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let base = builtin::catalog().rules;

        for _ in 0..200 {
            let mut rules = base.clone();
            for rule in &mut rules {
                rule.min_level = rng.gen_range(1..=5);
                rule.max_level = if rng.gen_bool(0.5) {
                    None
                } else {
                    Some(rng.gen_range(rule.min_level..=6))
                };
            }
            let level = rng.gen_range(1..=6);
            let sel = selection("blues", level, Part::Bass);
            for rule in active_rules(&sel, &rules) {
                assert!(rule.min_level <= level);
                if let Some(max) = rule.max_level {
                    assert!(level <= max);
                }
            }
        }
    }

    #[test]
    fn partition_by_role() {
        let catalog = builtin::catalog();
        let active = active_rules(&selection("blues", 2, Part::Bass), &catalog.rules);
        let (organized, diagnostics) = resolve_conflicts(&active);
        assert_eq!(organized.anchors.len(), 1);
        assert_eq!(organized.preferences.len(), 1);
        assert_eq!(organized.constraints.len(), 1);
        assert_eq!(organized.embellishments.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn anchor_conflict_is_diagnosed_first_wins() {
        let catalog = builtin::catalog();
        let mut first = catalog.rules[0].clone();
        first.role = Role::Anchor;
        first.trigger = Trigger::Beat1;
        first.affects_slot = Affects::TargetTone;
        let mut second = first.clone();
        second.id = "competing-anchor".to_string();

        let rules = [&first, &second];
        let (organized, diagnostics) = resolve_conflicts(&rules);
        assert_eq!(organized.anchors.len(), 2, "both stay registered");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains(&first.id));
        assert!(diagnostics[0].message.contains("competing-anchor"));
    }

    #[test]
    fn trigger_matching() {
        let catalog = builtin::catalog();
        let active = active_rules(&selection("blues", 1, Part::Bass), &catalog.rules);
        let (organized, _) = resolve_conflicts(&active);

        let i7 = chord("I7");
        let iv7 = chord("IV7");

        // Beat 1: anchor fires, beat-3 preference does not.
        let at_beat1 = rules_for_context(&organized, 1, 1, &i7, None);
        assert_eq!(at_beat1.anchors.len(), 1);
        assert!(at_beat1.preferences.is_empty());
        assert_eq!(at_beat1.constraints.len(), 1, "always-constraint fires");

        // Beat 3: preference fires, anchor does not.
        let at_beat3 = rules_for_context(&organized, 1, 3, &i7, None);
        assert!(at_beat3.anchors.is_empty());
        assert_eq!(at_beat3.preferences.len(), 1);

        // Chord change fires only when the chord actually changes.
        let lead = active_rules(&selection("blues", 1, Part::Lead), &catalog.rules);
        let (lead_rules, _) = resolve_conflicts(&lead);
        let no_change = rules_for_context(&lead_rules, 5, 1, &i7, Some(&i7));
        assert!(no_change.preferences.is_empty());
        let change = rules_for_context(&lead_rules, 5, 1, &iv7, Some(&i7));
        assert_eq!(change.preferences.len(), 1);
        let first_bar = rules_for_context(&lead_rules, 1, 1, &i7, None);
        assert!(first_bar.preferences.is_empty(), "no previous chord yet");
    }
}
