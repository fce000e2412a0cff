//! Pipeline orchestrator — applies bound rules to a timeline and emits
//! ordered note events per part.
//!
//! Every applied rule derives a beat span and a specificity rank from its
//! slot. Applications run in specificity-descending order over a per-beat
//! coverage map: once a beat is owned by a more specific rule, less specific
//! events landing there are discarded. This holds for every insertion order,
//! which is the engine's core arbitration guarantee.

pub mod report;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Register, RichRule, Riff, RuleCategory, WalkParameters};
use crate::diag::Diagnostic;
use crate::pitch::{octave_for_register, resolve_pitch_ref, resolve_register, PitchContext};
use crate::theory::{semitones_to_degree_label, DegreeLabel};
use crate::timeline::{Progression, RuleSlot, Timeline};
use crate::walk::resolve_walk_rule;

/// A part (voice) note events are generated for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub muted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_register: Option<Register>,
}

impl PartConfig {
    pub fn new(id: &str, name: &str, default_register: Option<Register>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            muted: false,
            default_register,
        }
    }
}

/// A rule bound to a slot for one part (or all parts when `part_id` is
/// `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppliedRule {
    pub rule_id: String,
    pub slot: RuleSlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub register_override: Option<Register>,
    /// Required for walk rules; the rule's defaults apply when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<WalkParameters>,
}

impl AppliedRule {
    pub fn new(rule_id: &str, slot: RuleSlot) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            slot,
            part_id: None,
            register_override: None,
            parameters: None,
        }
    }
}

/// The caller-owned set of rule bindings.
///
/// At most one binding exists per exact `(slot, part_id)` pair; binding the
/// same pair again replaces the previous rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppliedRuleSet {
    bindings: Vec<AppliedRule>,
}

impl AppliedRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a rule, replacing any prior binding on the same slot/part pair.
    pub fn bind(&mut self, applied: AppliedRule) {
        match self
            .bindings
            .iter_mut()
            .find(|b| b.slot == applied.slot && b.part_id == applied.part_id)
        {
            Some(existing) => *existing = applied,
            None => self.bindings.push(applied),
        }
    }

    /// Remove the binding on a slot/part pair, if any.
    pub fn unbind(&mut self, slot: RuleSlot, part_id: Option<&str>) {
        self.bindings
            .retain(|b| !(b.slot == slot && b.part_id.as_deref() == part_id));
    }

    pub fn iter(&self) -> impl Iterator<Item = &AppliedRule> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<AppliedRule> for AppliedRuleSet {
    fn from_iter<T: IntoIterator<Item = AppliedRule>>(iter: T) -> Self {
        let mut set = Self::new();
        for applied in iter {
            set.bind(applied);
        }
        set
    }
}

/// A fully resolved note: absolute beat, concrete degree and octave.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub start_beat: u32,
    pub duration: f32,
    pub degree: DegreeLabel,
    pub octave: i8,
    pub part_id: String,
    pub part_name: String,
}

/// The events generated for one part.
#[derive(Debug, Clone, PartialEq)]
pub struct PartEvents {
    pub part: PartConfig,
    pub events: Vec<NoteEvent>,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub timeline: Timeline,
    pub note_events: Vec<PartEvents>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A riff event relocated to an absolute start beat.
struct InstantiatedEvent {
    start_beat: u32,
    duration: f32,
    pitch_ref: crate::catalog::PitchRef,
}

/// One applied rule with its derived span and rank.
struct Application<'a> {
    applied: &'a AppliedRule,
    rule: &'a RichRule,
    riff: Option<&'a Riff>,
    start_beat: u32,
    specificity: u8,
    current_chord: usize,
    next_chord: usize,
}

/// Run the full generation pipeline for every non-muted part.
pub fn execute_pipeline(
    catalog: &Catalog,
    progression: &Progression,
    parts: &[PartConfig],
    applied_rules: &AppliedRuleSet,
) -> PipelineResult {
    let timeline = Timeline::build(progression);
    let mut diagnostics = Vec::new();
    let mut note_events = Vec::new();

    for part in parts {
        if part.muted {
            continue;
        }

        let mut applications = collect_applications(
            catalog,
            &timeline,
            applied_rules,
            &part.id,
            &mut diagnostics,
        );

        // Most specific first; ties in slot rank run in start-beat order.
        applications.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then(a.start_beat.cmp(&b.start_beat))
        });

        let mut coverage: HashMap<u32, u8> = HashMap::new();
        let mut events = Vec::new();

        for application in &applications {
            apply(
                application,
                part,
                &timeline,
                &mut coverage,
                &mut events,
            );
        }

        events.sort_by_key(|e| e.start_beat);

        note_events.push(PartEvents {
            part: part.clone(),
            events,
        });
    }

    PipelineResult {
        timeline,
        note_events,
        diagnostics,
    }
}

/// Resolve each binding for a part into an application with a concrete
/// span. Unresolvable rule/riff ids are skipped with a diagnostic; slots
/// pointing outside the timeline are skipped silently.
fn collect_applications<'a>(
    catalog: &'a Catalog,
    timeline: &Timeline,
    applied_rules: &'a AppliedRuleSet,
    part_id: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Application<'a>> {
    let mut applications = Vec::new();

    for applied in applied_rules.iter() {
        if applied.part_id.as_deref().is_some_and(|p| p != part_id) {
            continue;
        }

        let Some(rule) = catalog.rich_rule(&applied.rule_id) else {
            diagnostics.push(Diagnostic::new(format!(
                "applied rule references unknown rule '{}'",
                applied.rule_id
            )));
            continue;
        };

        let riff = match rule.category {
            // Walks are resolved per instantiation, against the local chord
            // context.
            RuleCategory::Walk => None,
            RuleCategory::Normal => {
                let riff = rule.riff_id.as_deref().and_then(|id| catalog.riff(id));
                if riff.is_none() {
                    diagnostics.push(Diagnostic::new(format!(
                        "rule '{}' references unknown riff '{}'",
                        rule.id,
                        rule.riff_id.as_deref().unwrap_or("<none>")
                    )));
                    continue;
                }
                riff
            }
        };

        let resolved = match applied.slot {
            RuleSlot::Bar { index } => timeline
                .bars
                .get(index)
                .map(|bar| (bar.start_beat, 4, bar.chord_index, bar.chord_index + 1)),
            RuleSlot::Chord { index } => timeline
                .chord_boundaries
                .get(index)
                .map(|boundary| (boundary.start_beat, 3, index, index + 1)),
            RuleSlot::Transition { from, to } => {
                let valid = timeline.chord_boundaries.get(from).is_some();
                timeline
                    .chord_boundaries
                    .get(to)
                    .filter(|_| valid)
                    .map(|to_boundary| (to_boundary.start_beat, 2, from, to))
            }
            RuleSlot::LastChord => timeline.chord_boundaries.last().map(|boundary| {
                let last = timeline.chord_boundaries.len() - 1;
                (boundary.start_beat, 1, last, last)
            }),
            RuleSlot::Global => Some((1, 0, 0, 1)),
        };

        let Some((start_beat, specificity, current_chord, next_chord)) = resolved else {
            continue;
        };

        applications.push(Application {
            applied,
            rule,
            riff,
            start_beat,
            specificity,
            current_chord,
            next_chord,
        });
    }

    applications
}

/// Instantiate one application and merge its events through the coverage
/// map.
fn apply(
    application: &Application<'_>,
    part: &PartConfig,
    timeline: &Timeline,
    coverage: &mut HashMap<u32, u8>,
    events: &mut Vec<NoteEvent>,
) {
    let register = resolve_register(
        application.applied.register_override,
        part.default_register,
        application.rule.default_register,
    );

    if application.applied.slot == RuleSlot::Global {
        // Global rules repeat their riff in every bar, each bar resolved
        // against its own chord.
        for bar in &timeline.bars {
            let next_chord = if bar.chord_index + 1 < timeline.chord_boundaries.len() {
                bar.chord_index + 1
            } else {
                bar.chord_index
            };
            let context = PitchContext {
                timeline,
                current_chord_index: bar.chord_index,
                current_beat: bar.start_beat,
                next_chord_index: next_chord,
            };
            let instantiated = instantiate(application, bar.start_beat, &context);
            merge_events(
                &instantiated,
                application.specificity,
                bar.chord_index,
                part,
                timeline,
                register,
                coverage,
                events,
            );
        }
    } else {
        let next_chord = if application.next_chord < timeline.chord_boundaries.len() {
            application.next_chord
        } else {
            application.current_chord
        };
        let context = PitchContext {
            timeline,
            current_chord_index: application.current_chord,
            current_beat: application.start_beat,
            next_chord_index: next_chord,
        };
        let instantiated = instantiate(application, application.start_beat, &context);
        merge_events(
            &instantiated,
            application.specificity,
            application.current_chord,
            part,
            timeline,
            register,
            coverage,
            events,
        );
    }
}

/// Resolve the application's riff (static or walk) and relocate its events
/// to absolute beats.
fn instantiate(
    application: &Application<'_>,
    start_beat: u32,
    context: &PitchContext<'_>,
) -> Vec<InstantiatedEvent> {
    match application.riff {
        Some(riff) => instantiate_riff(riff, start_beat),
        None => {
            let parameters = application
                .applied
                .parameters
                .clone()
                .unwrap_or_else(|| application.rule.walk_defaults());
            let resolved = resolve_walk_rule(application.rule, &parameters, context);
            instantiate_riff(&resolved, start_beat)
        }
    }
}

/// Relocate a riff's 1-based relative beats to absolute timeline beats.
fn instantiate_riff(riff: &Riff, start_beat: u32) -> Vec<InstantiatedEvent> {
    riff.events
        .iter()
        .map(|event| InstantiatedEvent {
            start_beat: start_beat + event.start_beat - 1,
            duration: event.duration,
            pitch_ref: event.pitch_ref.clone(),
        })
        .collect()
}

/// Push instantiated events through the coverage map and resolve the
/// survivors against the chord actually sounding at their beat.
fn merge_events(
    instantiated: &[InstantiatedEvent],
    specificity: u8,
    fallback_chord: usize,
    part: &PartConfig,
    timeline: &Timeline,
    register: Register,
    coverage: &mut HashMap<u32, u8>,
    events: &mut Vec<NoteEvent>,
) {
    for event in instantiated {
        let beat = event.start_beat;

        if coverage.get(&beat).is_some_and(|&owner| owner > specificity) {
            continue;
        }
        coverage.insert(beat, specificity);

        // A riff may span a chord boundary; the pitch context is re-derived
        // from the beat the event actually lands on. Beats past the last
        // boundary keep the application's own chord.
        let chord_index = timeline.boundary_at_beat(beat).unwrap_or(fallback_chord);
        let next_chord = if chord_index + 1 < timeline.chord_boundaries.len() {
            chord_index + 1
        } else {
            chord_index
        };
        let context = PitchContext {
            timeline,
            current_chord_index: chord_index,
            current_beat: beat,
            next_chord_index: next_chord,
        };

        let semitones = resolve_pitch_ref(&event.pitch_ref, &context);
        events.push(NoteEvent {
            start_beat: beat,
            duration: event.duration,
            degree: semitones_to_degree_label(semitones as i32),
            octave: octave_for_register(register),
            part_id: part.id.clone(),
            part_name: part.name.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin;

    fn bass_part() -> PartConfig {
        PartConfig::new("bass", "Bass", Some(Register::Low))
    }

    #[test]
    fn rebinding_replaces_prior_binding() {
        let mut set = AppliedRuleSet::new();
        set.bind(AppliedRule::new("default_root_hold", RuleSlot::Global));
        set.bind(AppliedRule::new("oom_pah", RuleSlot::Global));
        assert_eq!(set.len(), 1);
        assert_eq!(set.iter().next().unwrap().rule_id, "oom_pah");

        // A different part id is a different binding.
        let mut scoped = AppliedRule::new("oom_pah", RuleSlot::Global);
        scoped.part_id = Some("bass".to_string());
        set.bind(scoped);
        assert_eq!(set.len(), 2);

        set.unbind(RuleSlot::Global, None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn global_rule_repeats_per_bar() {
        let catalog = builtin::catalog();
        let progression = catalog.progression("I_IV_V_I").unwrap();
        let mut set = AppliedRuleSet::new();
        set.bind(AppliedRule::new("oom_pah", RuleSlot::Global));

        let result = execute_pipeline(&catalog, progression, &[bass_part()], &set);
        let events = &result.note_events[0].events;

        // Two events per bar over four bars.
        assert_eq!(events.len(), 8);
        assert_eq!(
            events.iter().map(|e| e.start_beat).collect::<Vec<_>>(),
            vec![1, 3, 5, 7, 9, 11, 13, 15]
        );
    }

    #[test]
    fn muted_parts_are_skipped() {
        let catalog = builtin::catalog();
        let progression = catalog.progression("I_IV_V_I").unwrap();
        let mut part = bass_part();
        part.muted = true;
        let mut set = AppliedRuleSet::new();
        set.bind(AppliedRule::new("oom_pah", RuleSlot::Global));

        let result = execute_pipeline(&catalog, progression, &[part], &set);
        assert!(result.note_events.is_empty());
    }

    #[test]
    fn unknown_rule_id_is_skipped_with_diagnostic() {
        let catalog = builtin::catalog();
        let progression = catalog.progression("I_IV_V_I").unwrap();
        let mut set = AppliedRuleSet::new();
        set.bind(AppliedRule::new("no_such_rule", RuleSlot::Global));

        let result = execute_pipeline(&catalog, progression, &[bass_part()], &set);
        assert!(result.note_events[0].events.is_empty());
        assert_eq!(result.diagnostics.len(), 1);
        assert!(result.diagnostics[0].message.contains("no_such_rule"));
    }

    #[test]
    fn invalid_slot_index_is_skipped() {
        let catalog = builtin::catalog();
        let progression = catalog.progression("I_IV_V_I").unwrap();
        let mut set = AppliedRuleSet::new();
        set.bind(AppliedRule::new(
            "oom_pah",
            RuleSlot::Bar { index: 99 },
        ));

        let result = execute_pipeline(&catalog, progression, &[bass_part()], &set);
        assert!(result.note_events[0].events.is_empty());
    }

    #[test]
    fn register_override_beats_part_default() {
        let catalog = builtin::catalog();
        let progression = catalog.progression("I_IV_V_I").unwrap();
        let mut applied = AppliedRule::new("default_root_hold", RuleSlot::Global);
        applied.register_override = Some(Register::High);
        let mut set = AppliedRuleSet::new();
        set.bind(applied);

        let result = execute_pipeline(&catalog, progression, &[bass_part()], &set);
        assert!(result.note_events[0]
            .events
            .iter()
            .all(|e| e.octave == 4));
    }
}
