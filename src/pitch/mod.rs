//! Pitch and register resolution — from abstract references to concrete
//! (degree, octave) pairs.
//!
//! Resolution never fails: a reference pointing outside the timeline
//! degrades to the key root (semitone 0), and register resolution bottoms
//! out at `Mid`. Callers treat these as degraded, not fatal, results.

use crate::catalog::{PitchBasis, PitchRef, Register};
use crate::theory::semitones_to_degree_label;
use crate::timeline::Timeline;

/// The harmonic context a pitch reference is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct PitchContext<'a> {
    pub timeline: &'a Timeline,
    pub current_chord_index: usize,
    pub current_beat: u32,
    pub next_chord_index: usize,
}

impl<'a> PitchContext<'a> {
    /// Context anchored at a chord boundary's first beat.
    pub fn at_chord(timeline: &'a Timeline, current: usize, next: usize) -> Self {
        let current_beat = timeline
            .chord_boundaries
            .get(current)
            .map(|b| b.start_beat)
            .unwrap_or(1);
        Self {
            timeline,
            current_chord_index: current,
            current_beat,
            next_chord_index: next,
        }
    }
}

/// Resolve a pitch reference to a semitone offset from the key root, in
/// [0, 11].
pub fn resolve_pitch_ref(pitch_ref: &PitchRef, context: &PitchContext<'_>) -> u8 {
    let base = match pitch_ref.basis {
        // The key root is the origin of the degree lattice.
        PitchBasis::KeyRoot => 0,
        PitchBasis::CurrentChord => chord_root_semitones(context, context.current_chord_index),
        PitchBasis::NextChord => chord_root_semitones(context, context.next_chord_index),
        PitchBasis::ChordTone => {
            let root = chord_root_semitones(context, context.current_chord_index);
            match pitch_ref.degree_hint.as_deref() {
                Some("3") => (root + 4) % 12,
                Some("5") => (root + 7) % 12,
                // "1" and anything unrecognized fall back to the root.
                _ => root,
            }
        }
    };

    (base as i32 + pitch_ref.offset).rem_euclid(12) as u8
}

/// Root semitones of a chord by boundary index; out of range degrades to 0.
fn chord_root_semitones(context: &PitchContext<'_>, chord_index: usize) -> u8 {
    if chord_index >= context.timeline.chord_boundaries.len() {
        return 0;
    }
    context.timeline.chord_root(chord_index).semitones()
}

/// Resolve the register for a rule application.
///
/// Priority: slot-level override, then the part default, then the rule
/// default, then `Mid`.
pub fn resolve_register(
    slot_override: Option<Register>,
    part_default: Option<Register>,
    rule_default: Option<Register>,
) -> Register {
    slot_override
        .or(part_default)
        .or(rule_default)
        .unwrap_or(Register::Mid)
}

/// Base octave for a register band (middle C = C4).
pub fn octave_for_register(register: Register) -> i8 {
    match register {
        Register::Low => 2,
        Register::Mid => 3,
        Register::High => 4,
    }
}

/// Resolve a pitch reference all the way to a degree label and octave.
pub fn resolve_pitch(
    pitch_ref: &PitchRef,
    context: &PitchContext<'_>,
    register: Register,
) -> (crate::theory::DegreeLabel, i8) {
    let semitones = resolve_pitch_ref(pitch_ref, context);
    let degree = semitones_to_degree_label(semitones as i32);
    (degree, octave_for_register(register))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::Degree;
    use crate::timeline::Progression;

    fn timeline() -> Timeline {
        Timeline::build(&Progression::from_symbols(
            "test",
            "C",
            &[],
            &["I", "IV", "V"],
            "",
        ))
    }

    fn pitch_ref(basis: PitchBasis, offset: i32, hint: Option<&str>) -> PitchRef {
        PitchRef {
            basis,
            offset,
            degree_hint: hint.map(|h| h.to_string()),
        }
    }

    #[test]
    fn key_root_is_zero() {
        let tl = timeline();
        let ctx = PitchContext::at_chord(&tl, 0, 1);
        assert_eq!(resolve_pitch_ref(&pitch_ref(PitchBasis::KeyRoot, 0, None), &ctx), 0);
    }

    #[test]
    fn chord_bases_resolve_to_roots() {
        let tl = timeline();
        let ctx = PitchContext::at_chord(&tl, 1, 2);
        // Current chord is IV (5 semitones), next is V (7).
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::CurrentChord, 0, None), &ctx),
            5
        );
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::NextChord, 0, None), &ctx),
            7
        );
    }

    #[test]
    fn chord_tone_hints() {
        let tl = timeline();
        let ctx = PitchContext::at_chord(&tl, 0, 1);
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::ChordTone, 0, Some("1")), &ctx),
            0
        );
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::ChordTone, 0, Some("3")), &ctx),
            4
        );
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::ChordTone, 0, Some("5")), &ctx),
            7
        );
        // Unrecognized hints fall back to the root.
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::ChordTone, 0, Some("b9")), &ctx),
            0
        );
    }

    #[test]
    fn offset_wraps_into_octave() {
        let tl = timeline();
        let ctx = PitchContext::at_chord(&tl, 2, 2);
        // V (7) + 7 = 14 -> 2.
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::CurrentChord, 7, None), &ctx),
            2
        );
        // V (7) - 9 = -2 -> 10.
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::CurrentChord, -9, None), &ctx),
            10
        );
    }

    #[test]
    fn out_of_range_chord_degrades_to_zero() {
        let tl = timeline();
        let ctx = PitchContext::at_chord(&tl, 99, 100);
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::CurrentChord, 0, None), &ctx),
            0
        );
        assert_eq!(
            resolve_pitch_ref(&pitch_ref(PitchBasis::NextChord, 0, None), &ctx),
            0
        );
    }

    #[test]
    fn register_priority_chain() {
        assert_eq!(
            resolve_register(Some(Register::High), Some(Register::Low), Some(Register::Mid)),
            Register::High
        );
        assert_eq!(
            resolve_register(None, Some(Register::Low), Some(Register::Mid)),
            Register::Low
        );
        assert_eq!(
            resolve_register(None, None, Some(Register::High)),
            Register::High
        );
        assert_eq!(resolve_register(None, None, None), Register::Mid);
    }

    #[test]
    fn octave_bands() {
        assert_eq!(octave_for_register(Register::Low), 2);
        assert_eq!(octave_for_register(Register::Mid), 3);
        assert_eq!(octave_for_register(Register::High), 4);
    }

    #[test]
    fn full_resolution_to_label() {
        let tl = timeline();
        let ctx = PitchContext::at_chord(&tl, 1, 2);
        let (degree, octave) = resolve_pitch(
            &pitch_ref(PitchBasis::CurrentChord, 0, None),
            &ctx,
            Register::Low,
        );
        assert_eq!(degree.degree, Degree::IV);
        assert!(degree.is_diatonic());
        assert_eq!(octave, 2);
    }
}
