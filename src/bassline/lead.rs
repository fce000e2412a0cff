//! Lead applicability report — which rules and licks a selection can draw on.
//!
//! Lead lines are assembled from licks rather than per-beat rules; this
//! reports the material a validated selection has available without
//! generating notes.

use crate::catalog::{Catalog, Lick, Rule};
use crate::engine::{active_rules, Selection};

use super::{validate_selection, ValidationError};

/// The material applicable to a lead selection.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadReport<'a> {
    pub rules: Vec<&'a Rule>,
    pub licks: Vec<&'a Lick>,
}

/// Collect the rules and licks applicable to a selection.
///
/// Rules filter like any part (genre, level window); licks require genre
/// membership and an exact level match.
pub fn lead_applicability<'a>(
    selection: &Selection,
    catalog: &'a Catalog,
) -> Result<LeadReport<'a>, ValidationError> {
    validate_selection(selection)?;

    let rules = active_rules(selection, &catalog.rules);
    let licks = catalog
        .licks
        .iter()
        .filter(|lick| {
            lick.genre_tags.iter().any(|g| g == &selection.genre) && lick.level == selection.level
        })
        .collect();

    Ok(LeadReport { rules, licks })
}

/// Render the report as text: each rule with its role and action, each lick
/// with its note degrees.
pub fn format_lead_report(report: &LeadReport<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!("Applicable rules: {}\n", report.rules.len()));
    for rule in &report.rules {
        out.push_str(&format!(
            "  - {} ({:?}): {}\n",
            rule.id, rule.role, rule.action
        ));
    }

    out.push_str(&format!("Applicable licks: {}\n", report.licks.len()));
    for lick in &report.licks {
        let degrees: Vec<&str> = lick.notes.iter().map(|n| n.degree.as_str()).collect();
        out.push_str(&format!("  - {}: {}\n", lick.id, lick.explanation));
        out.push_str(&format!("    Notes: {}\n", degrees.join(", ")));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin, Part};

    fn selection(level: u32) -> Selection {
        Selection {
            genre: "blues".to_string(),
            level,
            progression_id: "blues-12bar".to_string(),
            root_string: Some(1),
            randomness: 0,
            part: Part::Lead,
        }
    }

    #[test]
    fn blues_level_one_material() {
        let catalog = builtin::catalog();
        let report = lead_applicability(&selection(1), &catalog).unwrap();

        assert_eq!(report.rules.len(), 2);
        assert!(report.rules.iter().all(|r| r.part == Part::Lead));

        assert_eq!(report.licks.len(), 2);
        assert!(report.licks.iter().all(|l| l.level == 1));
    }

    #[test]
    fn lick_level_match_is_exact() {
        let catalog = builtin::catalog();
        let report = lead_applicability(&selection(2), &catalog).unwrap();
        // Level-2 selection sees only the level-2 lick, not the level-1 ones.
        assert_eq!(report.licks.len(), 1);
        assert_eq!(report.licks[0].id, "blues-l2-lick1");
    }

    #[test]
    fn invalid_selection_is_rejected() {
        let catalog = builtin::catalog();
        let mut sel = selection(1);
        sel.genre = String::new();
        assert_eq!(
            lead_applicability(&sel, &catalog),
            Err(ValidationError::MissingGenre)
        );
    }

    #[test]
    fn report_text_lists_material() {
        let catalog = builtin::catalog();
        let report = lead_applicability(&selection(1), &catalog).unwrap();
        let text = format_lead_report(&report);
        assert!(text.contains("Applicable rules: 2"));
        assert!(text.contains("lead-blues-constraint-scale"));
        assert!(text.contains("Notes: 1, b3, 4, 5"));
    }
}
