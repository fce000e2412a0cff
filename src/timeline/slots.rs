//! Rule slots — the addressable positions a rule can be bound to.
//!
//! Slots are ranked by specificity for beat-coverage arbitration: a rule
//! bound to a single bar always beats one bound to a chord span, which beats
//! a transition, the last chord, and finally the global slot.

use serde::{Deserialize, Serialize};

use super::Timeline;

/// An addressable position on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleSlot {
    /// The whole timeline; the bound riff repeats every bar.
    Global,
    /// A single bar.
    Bar { index: usize },
    /// The full span of one chord.
    Chord { index: usize },
    /// The handoff between two adjacent chords.
    Transition { from: usize, to: usize },
    /// The final chord of the progression.
    LastChord,
}

impl RuleSlot {
    /// Specificity rank used for arbitration: bar > chord > transition >
    /// lastChord > global. Higher wins on overlapping beats.
    pub fn specificity(&self) -> u8 {
        match self {
            RuleSlot::Bar { .. } => 4,
            RuleSlot::Chord { .. } => 3,
            RuleSlot::Transition { .. } => 2,
            RuleSlot::LastChord => 1,
            RuleSlot::Global => 0,
        }
    }
}

/// Enumerate every bindable slot for a timeline: one global slot, one per
/// bar, one per chord, one per adjacent chord pair, and a last-chord slot
/// when the timeline has any chords at all.
pub fn enumerate_slots(timeline: &Timeline) -> Vec<RuleSlot> {
    let mut slots = vec![RuleSlot::Global];

    for index in 0..timeline.bars.len() {
        slots.push(RuleSlot::Bar { index });
    }

    for index in 0..timeline.chord_boundaries.len() {
        slots.push(RuleSlot::Chord { index });
    }

    for from in 0..timeline.chord_boundaries.len().saturating_sub(1) {
        slots.push(RuleSlot::Transition {
            from,
            to: from + 1,
        });
    }

    if !timeline.chord_boundaries.is_empty() {
        slots.push(RuleSlot::LastChord);
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Progression;

    fn timeline() -> Timeline {
        Timeline::build(&Progression::from_symbols(
            "test",
            "C",
            &[],
            &["I", "I", "IV", "V"],
            "",
        ))
    }

    #[test]
    fn specificity_ordering() {
        let bar = RuleSlot::Bar { index: 0 };
        let chord = RuleSlot::Chord { index: 0 };
        let transition = RuleSlot::Transition { from: 0, to: 1 };
        assert!(bar.specificity() > chord.specificity());
        assert!(chord.specificity() > transition.specificity());
        assert!(transition.specificity() > RuleSlot::LastChord.specificity());
        assert!(RuleSlot::LastChord.specificity() > RuleSlot::Global.specificity());
    }

    #[test]
    fn enumerates_all_slot_kinds() {
        // 4 bars merged to 3 chords.
        let slots = enumerate_slots(&timeline());
        let globals = slots.iter().filter(|s| **s == RuleSlot::Global).count();
        let bars = slots
            .iter()
            .filter(|s| matches!(s, RuleSlot::Bar { .. }))
            .count();
        let chords = slots
            .iter()
            .filter(|s| matches!(s, RuleSlot::Chord { .. }))
            .count();
        let transitions = slots
            .iter()
            .filter(|s| matches!(s, RuleSlot::Transition { .. }))
            .count();
        let last = slots.iter().filter(|s| **s == RuleSlot::LastChord).count();

        assert_eq!(globals, 1);
        assert_eq!(bars, 4);
        assert_eq!(chords, 3);
        assert_eq!(transitions, 2);
        assert_eq!(last, 1);
        assert_eq!(slots.len(), 11);
    }

    #[test]
    fn transitions_link_adjacent_chords() {
        let slots = enumerate_slots(&timeline());
        let transitions: Vec<_> = slots
            .iter()
            .filter_map(|s| match s {
                RuleSlot::Transition { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(transitions, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn empty_timeline_has_only_global() {
        let empty = Timeline {
            key: String::new(),
            bars: Vec::new(),
            chord_boundaries: Vec::new(),
        };
        assert_eq!(enumerate_slots(&empty), vec![RuleSlot::Global]);
    }

    #[test]
    fn slot_yaml_shape() {
        let yaml = "type: transition\nfrom: 0\nto: 1\n";
        let slot: RuleSlot = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(slot, RuleSlot::Transition { from: 0, to: 1 });

        let last: RuleSlot = serde_yaml::from_str("type: lastChord").unwrap();
        assert_eq!(last, RuleSlot::LastChord);
    }
}
