//! Walk resolver — parametric stepwise motion between two harmonic anchors.
//!
//! A walk rule carries no static riff. Given a parameter set and a harmonic
//! context it synthesizes one: intermediate tones spaced evenly along the
//! circular distance from the start anchor to the target, an approach tone
//! one semitone off the target, and the two anchors themselves, laid onto
//! the rule's fixed timeline template. The resolved riff's beats are
//! relative to the bar the walk begins in; the orchestrator converts them
//! to absolute beats like any other riff.

use crate::catalog::{
    ApproachPreference, ApproachStrategy, GenreProfile, NoteSource, OctaveStrategy, PitchBasis,
    PitchRef, RichRule, Riff, RiffEvent, TemplateRole, TimelineTemplate, WalkDirection,
    WalkParameters, WalkTarget,
};
use crate::pitch::PitchContext;
use crate::theory::{semitones_to_degree_label, snap_to_scale, Degree, DegreeLabel};
use crate::timeline::{Timeline, BEATS_PER_BAR};

/// Resolved melodic direction of one walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Resolve a walk rule into a concrete riff.
pub fn resolve_walk_rule(
    rule: &RichRule,
    parameters: &WalkParameters,
    context: &PitchContext<'_>,
) -> Riff {
    let profile = genre_profile(rule, &parameters.genre_profile);

    let start_anchor = chord_root(context.current_chord_index, context.timeline);
    let target_anchor = match parameters.target {
        WalkTarget::NextChordRoot => chord_root(context.next_chord_index, context.timeline),
        WalkTarget::CurrentChordRoot => start_anchor,
    };

    let direction = resolve_direction(parameters.direction, start_anchor, target_anchor);

    let steps = if parameters.steps == 0 {
        3
    } else {
        parameters.steps
    };
    let walk_notes = generate_walk_steps(
        start_anchor,
        target_anchor,
        steps,
        direction,
        &profile,
        parameters.approach_strategy,
    );

    let template = rule
        .timeline_template
        .clone()
        .unwrap_or_else(TimelineTemplate::walk_default);

    let mut events = Vec::with_capacity(template.events.len());
    for template_event in &template.events {
        let beat = template_event.bar_offset * BEATS_PER_BAR + template_event.beat;

        let degree = match template_event.role {
            TemplateRole::StartAnchor => DegreeLabel::exact(start_anchor),
            TemplateRole::TargetAnchor => DegreeLabel::exact(target_anchor),
            TemplateRole::WalkStep => {
                let step_index = template_event.step_index.unwrap_or(1).saturating_sub(1) as usize;
                match walk_notes.get(step_index) {
                    Some(note) => *note,
                    // Template slots past the generated step count fall back
                    // to plain linear interpolation.
                    None => interpolate_step(start_anchor, target_anchor, step_index, steps),
                }
            }
            TemplateRole::ApproachTone => approach_tone(
                target_anchor,
                direction,
                &profile,
                parameters.approach_strategy,
            ),
        };

        events.push(RiffEvent {
            start_beat: beat,
            duration: 1.0,
            pitch_ref: degree_to_pitch_ref(degree, template_event.note_source),
            octave_strategy: OctaveStrategy::Nearest,
        });
    }

    Riff {
        id: format!("{}_resolved", rule.id),
        length_beats: template.length_beats,
        explanation: format!(
            "Walk from {start_anchor} to {target_anchor} using {steps} steps"
        ),
        events,
    }
}

/// Look up the requested genre profile, falling back to `custom`, then to a
/// plain diatonic profile if the rule carries neither.
fn genre_profile(rule: &RichRule, name: &str) -> GenreProfile {
    rule.genre_profiles
        .get(name)
        .or_else(|| rule.genre_profiles.get("custom"))
        .cloned()
        .unwrap_or(GenreProfile {
            preferred_approach: ApproachPreference::Diatonic,
            description: String::new(),
        })
}

/// Root degree of a chord by boundary index; out of range degrades to I.
fn chord_root(chord_index: usize, timeline: &Timeline) -> Degree {
    timeline.chord_root(chord_index)
}

/// Pick the walking direction: as given, or by the shorter circular path
/// (ties favor up).
fn resolve_direction(direction: WalkDirection, start: Degree, target: Degree) -> Direction {
    match direction {
        WalkDirection::Up => Direction::Up,
        WalkDirection::Down => Direction::Down,
        WalkDirection::Auto => {
            let start_semitones = start.semitones() as i32;
            let target_semitones = target.semitones() as i32;
            let up = (target_semitones - start_semitones).rem_euclid(12);
            let down = (start_semitones - target_semitones).rem_euclid(12);
            if up <= down {
                Direction::Up
            } else {
                Direction::Down
            }
        }
    }
}

/// Generate the intermediate walk tones.
///
/// The circular distance from start to target (a zero distance walks the
/// full octave, never a no-op) is divided into `steps + 1` even increments;
/// the `+1` reserves the slot just before the target for the approach tone.
fn generate_walk_steps(
    start: Degree,
    target: Degree,
    steps: u8,
    direction: Direction,
    profile: &GenreProfile,
    strategy: ApproachStrategy,
) -> Vec<DegreeLabel> {
    let start_semitones = start.semitones() as i32;
    let target_semitones = target.semitones() as i32;

    let mut total_distance = match direction {
        Direction::Up => (target_semitones - start_semitones).rem_euclid(12),
        Direction::Down => (start_semitones - target_semitones).rem_euclid(12),
    };
    if total_distance == 0 {
        total_distance = 12;
    }

    let step_size = total_distance as f64 / (steps as f64 + 1.0);

    let mut notes = Vec::with_capacity(steps as usize);
    for i in 1..=steps as i32 {
        let delta = (step_size * i as f64).round() as i32;
        let mut semitones = match direction {
            Direction::Up => (start_semitones + delta).rem_euclid(12) as u8,
            Direction::Down => (start_semitones - delta).rem_euclid(12) as u8,
        };

        if snaps_to_scale(profile, strategy) {
            semitones = snap_to_scale(semitones);
        }

        notes.push(semitones_to_degree_label(semitones as i32));
    }

    notes
}

/// Linear semitone interpolation between the anchors at a step's fractional
/// position.
fn interpolate_step(start: Degree, target: Degree, step_index: usize, steps: u8) -> DegreeLabel {
    let start_semitones = start.semitones() as f64;
    let target_semitones = target.semitones() as f64;
    let progress = (step_index as f64 + 1.0) / (steps as f64 + 1.0);
    let interpolated =
        (start_semitones + (target_semitones - start_semitones) * progress).round() as i32;
    semitones_to_degree_label(interpolated)
}

/// One semitone below the target when approaching from below, one above
/// when approaching from above.
fn approach_tone(
    target: Degree,
    direction: Direction,
    profile: &GenreProfile,
    strategy: ApproachStrategy,
) -> DegreeLabel {
    let target_semitones = target.semitones() as i32;
    let mut semitones = match direction {
        Direction::Up => (target_semitones - 1).rem_euclid(12) as u8,
        Direction::Down => (target_semitones + 1).rem_euclid(12) as u8,
    };

    if snaps_to_scale(profile, strategy) {
        semitones = snap_to_scale(semitones);
    }

    semitones_to_degree_label(semitones as i32)
}

/// Diatonic snapping applies when the profile prefers it and the caller has
/// not forced a chromatic strategy.
fn snaps_to_scale(profile: &GenreProfile, strategy: ApproachStrategy) -> bool {
    profile.preferred_approach == ApproachPreference::Diatonic
        && strategy != ApproachStrategy::Chromatic
}

/// Pin a resolved degree to its chord so downstream resolution stays
/// uniform with ordinary riffs.
fn degree_to_pitch_ref(degree: DegreeLabel, note_source: NoteSource) -> PitchRef {
    PitchRef {
        basis: match note_source {
            NoteSource::TargetChordRoot => PitchBasis::NextChord,
            NoteSource::CurrentChordRoot => PitchBasis::CurrentChord,
        },
        offset: 0,
        degree_hint: Some(degree.to_string()),
    }
}
