//! Bass generator — per-beat anchor → preference → constraint resolution.
//!
//! The simpler of the two orchestrators: no riffs, no slots. Each beat of
//! each bar gathers its triggered rules, lets constraints pin the rhythm,
//! anchors pick a mandatory target tone, and preferences choose among
//! root/fifth options through an injected random source.

pub mod lead;

use std::fmt;

use rand::Rng;

use crate::catalog::{Affects, Role, Rule};
use crate::diag::Diagnostic;
use crate::engine::{active_rules, resolve_conflicts, rules_for_context, Selection};
use crate::theory::Degree;
use crate::timeline::{Progression, BEATS_PER_BAR};

/// A rejected generation request, with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingGenre,
    MissingLevel,
    MissingProgression,
    MissingRootString,
    UnknownProgression(String),
    NoRulesEnabled,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingGenre => write!(f, "no genre selected"),
            ValidationError::MissingLevel => write!(f, "no level selected"),
            ValidationError::MissingProgression => write!(f, "no chord progression selected"),
            ValidationError::MissingRootString => write!(f, "no root string selected"),
            ValidationError::UnknownProgression(id) => write!(f, "unknown progression '{id}'"),
            ValidationError::NoRulesEnabled => write!(f, "no rules enabled for this selection"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// One generated bass note, bar/beat-addressed.
#[derive(Debug, Clone, PartialEq)]
pub struct BassNote {
    pub bar: u32,
    pub beat: u32,
    pub degree: Degree,
    pub octave_offset: i8,
    pub duration: f32,
}

/// A rule that contributed to a beat's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedBeatRule {
    pub id: String,
    pub role: Role,
}

/// The rules that fired on one beat, for traceability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatRules {
    pub bar: u32,
    pub beat: u32,
    pub rules: Vec<AppliedBeatRule>,
}

/// A generated bass line plus its rule trace and any data warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct BassLine {
    pub notes: Vec<BassNote>,
    pub applied: Vec<BeatRules>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Check that a selection is complete enough to generate from.
pub fn validate_selection(selection: &Selection) -> Result<(), ValidationError> {
    if selection.genre.is_empty() {
        return Err(ValidationError::MissingGenre);
    }
    if selection.level == 0 {
        return Err(ValidationError::MissingLevel);
    }
    if selection.progression_id.is_empty() {
        return Err(ValidationError::MissingProgression);
    }
    if selection.root_string.is_none() {
        return Err(ValidationError::MissingRootString);
    }
    Ok(())
}

/// Generate a bass line for a progression.
///
/// Returns a validation error (never a silent empty success) when the
/// selection is incomplete or no rules are enabled for it.
pub fn generate_bass_line(
    selection: &Selection,
    progression: &Progression,
    rules: &[Rule],
    rng: &mut impl Rng,
) -> Result<BassLine, ValidationError> {
    validate_selection(selection)?;

    let active = active_rules(selection, rules);
    if active.is_empty() {
        return Err(ValidationError::NoRulesEnabled);
    }
    let (organized, diagnostics) = resolve_conflicts(&active);

    let mut notes = Vec::new();
    let mut applied = Vec::new();
    let bar_chords = progression.bar_chords();

    for (bar_index, chord) in bar_chords.iter().enumerate() {
        let bar = bar_index as u32 + 1;
        let previous = if bar_index > 0 {
            Some(bar_chords[bar_index - 1])
        } else {
            None
        };

        for beat in 1..=BEATS_PER_BAR {
            let context_rules = rules_for_context(&organized, bar, beat, chord, previous);

            // Constraints currently only pin the rhythm; quarter notes are
            // the single supported value.
            let mut duration = 1.0;
            for constraint in &context_rules.constraints {
                if constraint.affects_slot == Affects::Rhythm
                    && constraint.action.contains("quarter")
                {
                    duration = 1.0;
                }
            }

            let anchor_tone = apply_anchors(&context_rules.anchors, chord.degree);
            let chosen = apply_preferences(
                &context_rules.preferences,
                anchor_tone,
                chord.degree,
                selection.randomness,
                rng,
            );

            // Embellishments are accepted by the data model but not yet
            // applied.

            notes.push(BassNote {
                bar,
                beat,
                degree: chosen,
                octave_offset: 0,
                duration,
            });

            if !context_rules.anchors.is_empty() || !context_rules.preferences.is_empty() {
                applied.push(BeatRules {
                    bar,
                    beat,
                    rules: context_rules
                        .anchors
                        .iter()
                        .chain(context_rules.preferences.iter())
                        .map(|rule| AppliedBeatRule {
                            id: rule.id.clone(),
                            role: rule.role,
                        })
                        .collect(),
                });
            }
        }
    }

    Ok(BassLine {
        notes,
        applied,
        diagnostics,
    })
}

/// Generate a bass line for the progression named by the selection.
pub fn generate_for_selection(
    catalog: &crate::catalog::Catalog,
    selection: &Selection,
    rng: &mut impl Rng,
) -> Result<BassLine, ValidationError> {
    validate_selection(selection)?;
    let progression = catalog
        .progression(&selection.progression_id)
        .ok_or_else(|| ValidationError::UnknownProgression(selection.progression_id.clone()))?;
    generate_bass_line(selection, progression, &catalog.rules, rng)
}

/// First anchor targeting the tone slot wins: "root" takes the chord root,
/// "fifth"/"5th" the diatonic fifth. No match defaults to the root.
fn apply_anchors(anchors: &[&Rule], chord_root: Degree) -> Degree {
    for rule in anchors {
        if rule.affects_slot != Affects::TargetTone {
            continue;
        }
        if rule.action.contains("root") {
            return chord_root;
        }
        if rule.action.contains("fifth") || rule.action.contains("5th") {
            return chord_root.fifth();
        }
    }
    chord_root
}

/// Choose among the weighted preference options, or keep the anchor tone
/// when no preference applies.
fn apply_preferences(
    preferences: &[&Rule],
    anchor_tone: Degree,
    chord_root: Degree,
    randomness: u8,
    rng: &mut impl Rng,
) -> Degree {
    if preferences.is_empty() {
        return anchor_tone;
    }

    let mut options: Vec<(Degree, f64)> = Vec::new();
    for rule in preferences {
        if rule.affects_slot != Affects::TargetTone {
            continue;
        }
        let weight = rule.weight.unwrap_or(0.5);
        if rule.action.contains("5th") {
            options.push((chord_root.fifth(), weight));
        }
        if rule.action.contains("root") {
            options.push((chord_root, weight));
        }
    }

    if options.is_empty() {
        return anchor_tone;
    }

    // Higher randomness = more uniform choice; only meaningful with at
    // least two options.
    let random_factor = randomness as f64 / 100.0;
    if rng.gen::<f64>() < random_factor && options.len() > 1 {
        return options[rng.gen_range(0..options.len())].0;
    }

    let total_weight: f64 = options.iter().map(|(_, w)| w).sum();
    let mut draw = rng.gen::<f64>() * total_weight;
    for (degree, weight) in &options {
        draw -= weight;
        if draw <= 0.0 {
            return *degree;
        }
    }

    options[0].0
}

/// Render a bass line in the legacy one-line-per-note form.
pub fn format_bass_line(line: &BassLine) -> String {
    let mut out = String::new();
    for note in &line.notes {
        out.push_str(&format!(
            "Bar {} Beat {}: {}\n",
            note.bar,
            note.beat,
            note.degree.number()
        ));
    }
    out
}
