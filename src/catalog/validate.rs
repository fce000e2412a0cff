//! Eager catalog validation — cross-reference checks before generation.
//!
//! Validation never fails hard: every finding is a [`Diagnostic`] and the
//! engine's documented fallbacks (skip-missing, first-wins) keep generation
//! alive. Running this at load time surfaces authoring errors up front
//! instead of mid-resolution.

use std::collections::HashSet;

use super::{Catalog, RuleCategory};
use crate::diag::Diagnostic;

/// Valid range for walk step counts.
pub const WALK_STEP_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Check a catalog for dangling references and malformed entries.
pub fn validate(catalog: &Catalog) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    check_duplicate_ids(catalog, &mut diagnostics);

    for rule in &catalog.rich_rules {
        match rule.category {
            RuleCategory::Normal => match &rule.riff_id {
                None => diagnostics.push(Diagnostic::new(format!(
                    "rule '{}' has no riff id",
                    rule.id
                ))),
                Some(riff_id) if catalog.riff(riff_id).is_none() => diagnostics.push(
                    Diagnostic::new(format!(
                        "rule '{}' references unknown riff '{}'",
                        rule.id, riff_id
                    )),
                ),
                Some(_) => {}
            },
            RuleCategory::Walk => {
                if !rule.genre_profiles.contains_key("custom") {
                    diagnostics.push(Diagnostic::new(format!(
                        "walk rule '{}' is missing the 'custom' fallback profile",
                        rule.id
                    )));
                }
                if let Some(params) = &rule.default_parameters {
                    if !WALK_STEP_RANGE.contains(&params.steps) {
                        diagnostics.push(Diagnostic::new(format!(
                            "walk rule '{}' default steps {} outside {}..={}",
                            rule.id,
                            params.steps,
                            WALK_STEP_RANGE.start(),
                            WALK_STEP_RANGE.end()
                        )));
                    }
                }
            }
        }
    }

    for progression in &catalog.progressions {
        if progression.chords.is_empty() {
            diagnostics.push(Diagnostic::new(format!(
                "progression '{}' has no chords",
                progression.id
            )));
        }
        for (i, chord) in progression.chords.iter().enumerate() {
            if chord.bars == 0 {
                diagnostics.push(Diagnostic::new(format!(
                    "progression '{}' chord {} is held for zero bars",
                    progression.id, i
                )));
            }
        }
    }

    diagnostics
}

fn check_duplicate_ids(catalog: &Catalog, diagnostics: &mut Vec<Diagnostic>) {
    let mut report = |kind: &str, ids: Vec<&str>| {
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                diagnostics.push(Diagnostic::new(format!("duplicate {kind} id '{id}'")));
            }
        }
    };

    report("rule", catalog.rules.iter().map(|r| r.id.as_str()).collect());
    report(
        "rich rule",
        catalog.rich_rules.iter().map(|r| r.id.as_str()).collect(),
    );
    report("riff", catalog.riffs.iter().map(|r| r.id.as_str()).collect());
    report(
        "progression",
        catalog.progressions.iter().map(|p| p.id.as_str()).collect(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin, RichRule, WalkParameters};
    use crate::timeline::Progression;

    #[test]
    fn builtin_catalog_validates_cleanly() {
        assert!(validate(&builtin::catalog()).is_empty());
    }

    #[test]
    fn dangling_riff_reference_is_reported() {
        let mut catalog = builtin::catalog();
        catalog.rich_rules.push(RichRule {
            id: "broken".to_string(),
            name: "Broken".to_string(),
            riff_id: Some("no_such_riff".to_string()),
            ..catalog.rich_rules[0].clone()
        });
        let diagnostics = validate(&catalog);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("no_such_riff"));
    }

    #[test]
    fn walk_rule_without_custom_profile_is_reported() {
        let mut catalog = builtin::catalog();
        let mut walk = catalog.rich_rule("walking_bass").unwrap().clone();
        walk.id = "bad_walk".to_string();
        walk.genre_profiles.remove("custom");
        catalog.rich_rules.push(walk);
        let diagnostics = validate(&catalog);
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("custom") && d.message.contains("bad_walk")));
    }

    #[test]
    fn out_of_range_steps_are_reported() {
        let mut catalog = builtin::catalog();
        let mut walk = catalog.rich_rule("walking_bass").unwrap().clone();
        walk.id = "wide_walk".to_string();
        walk.default_parameters = Some(WalkParameters {
            steps: 9,
            ..WalkParameters::default()
        });
        catalog.rich_rules.push(walk);
        let diagnostics = validate(&catalog);
        assert!(diagnostics.iter().any(|d| d.message.contains("steps 9")));
    }

    #[test]
    fn duplicate_and_empty_entries_are_reported() {
        let mut catalog = builtin::catalog();
        catalog.rules.push(catalog.rules[0].clone());
        catalog
            .progressions
            .push(Progression::from_symbols("empty", "C", &[], &[], ""));
        let diagnostics = validate(&catalog);
        assert!(diagnostics.iter().any(|d| d.message.contains("duplicate")));
        assert!(diagnostics.iter().any(|d| d.message.contains("no chords")));
    }
}
