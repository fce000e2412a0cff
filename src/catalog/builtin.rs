//! Built-in catalog — the data set shipped with the crate.
//!
//! User catalogs loaded from YAML append to these entries; they never
//! replace them.

use std::collections::BTreeMap;

use super::{
    Affects, ApproachPreference, Catalog, GenreProfile, Lick, LickNote, OctaveStrategy, Part,
    PitchBasis, PitchRef, Register, RichRule, Riff, RiffEvent, Role, Rule, RuleCategory, Scale,
    TimelineTemplate, Trigger, WalkParameters,
};
use crate::theory::Degree;
use crate::timeline::{ChordEntry, Progression};

/// Build the full built-in catalog.
pub fn catalog() -> Catalog {
    Catalog {
        rules: rules(),
        rich_rules: rich_rules(),
        riffs: riffs(),
        progressions: progressions(),
        scales: scales(),
        licks: licks(),
    }
}

fn rule(
    id: &str,
    part: Part,
    genres: &[&str],
    min_level: u32,
    role: Role,
    affects_slot: Affects,
    trigger: Trigger,
    action: &str,
    weight: Option<f64>,
) -> Rule {
    Rule {
        id: id.to_string(),
        part,
        genre_tags: genres.iter().map(|g| g.to_string()).collect(),
        min_level,
        max_level: None,
        role,
        affects_slot,
        trigger,
        action: action.to_string(),
        weight,
    }
}

fn rules() -> Vec<Rule> {
    vec![
        // Bass rules for blues.
        rule(
            "bass-blues-anchor-beat1",
            Part::Bass,
            &["blues"],
            1,
            Role::Anchor,
            Affects::TargetTone,
            Trigger::Beat1,
            "play root of current chord",
            None,
        ),
        rule(
            "bass-blues-preference-beat3",
            Part::Bass,
            &["blues"],
            1,
            Role::Preference,
            Affects::TargetTone,
            Trigger::Beat3,
            "prefer 5th or root",
            Some(0.7),
        ),
        rule(
            "bass-blues-constraint-rhythm",
            Part::Bass,
            &["blues"],
            1,
            Role::Constraint,
            Affects::Rhythm,
            Trigger::Always,
            "quarter notes only",
            None,
        ),
        rule(
            "bass-blues-embellishment-walk",
            Part::Bass,
            &["blues"],
            2,
            Role::Embellishment,
            Affects::Motion,
            Trigger::ChordChange,
            "allow walking bass line",
            Some(0.5),
        ),
        // Bass rules for pop.
        rule(
            "bass-pop-anchor-beat1",
            Part::Bass,
            &["pop"],
            1,
            Role::Anchor,
            Affects::TargetTone,
            Trigger::Beat1,
            "play root of current chord",
            None,
        ),
        rule(
            "bass-pop-preference-beat3",
            Part::Bass,
            &["pop"],
            1,
            Role::Preference,
            Affects::TargetTone,
            Trigger::Beat3,
            "prefer 5th",
            Some(0.8),
        ),
        // Lead rules for blues.
        rule(
            "lead-blues-constraint-scale",
            Part::Lead,
            &["blues"],
            1,
            Role::Constraint,
            Affects::TargetTone,
            Trigger::Always,
            "use minor pentatonic scale",
            None,
        ),
        rule(
            "lead-blues-preference-resolution",
            Part::Lead,
            &["blues"],
            1,
            Role::Preference,
            Affects::TargetTone,
            Trigger::ChordChange,
            "prefer chord tones",
            Some(0.6),
        ),
    ]
}

fn riffs() -> Vec<Riff> {
    vec![
        Riff {
            id: "chord_root_hold".to_string(),
            length_beats: 4,
            explanation: "Sustain the current chord root for the full bar.".to_string(),
            events: vec![RiffEvent {
                start_beat: 1,
                duration: 4.0,
                pitch_ref: PitchRef::current_chord_root(),
                octave_strategy: OctaveStrategy::Nearest,
            }],
        },
        Riff {
            id: "oom_pah_I_V".to_string(),
            length_beats: 4,
            explanation: "Classic oom-pah pattern: root on beat 1, fifth on beat 3.".to_string(),
            events: vec![
                RiffEvent {
                    start_beat: 1,
                    duration: 1.0,
                    pitch_ref: PitchRef::current_chord_root(),
                    octave_strategy: OctaveStrategy::Nearest,
                },
                RiffEvent {
                    start_beat: 3,
                    duration: 1.0,
                    pitch_ref: PitchRef {
                        basis: PitchBasis::CurrentChord,
                        offset: 7,
                        degree_hint: Some("5".to_string()),
                    },
                    octave_strategy: OctaveStrategy::Nearest,
                },
            ],
        },
    ]
}

fn rich_rules() -> Vec<RichRule> {
    vec![
        RichRule {
            id: "default_root_hold".to_string(),
            name: "Root Hold".to_string(),
            riff_id: Some("chord_root_hold".to_string()),
            category: RuleCategory::Normal,
            tags: vec!["bass".to_string(), "sustain".to_string()],
            default_register: None,
            default_parameters: None,
            genre_profiles: BTreeMap::new(),
            timeline_template: None,
        },
        RichRule {
            id: "oom_pah".to_string(),
            name: "Oom-Pah".to_string(),
            riff_id: Some("oom_pah_I_V".to_string()),
            category: RuleCategory::Normal,
            tags: vec!["bass".to_string(), "country".to_string()],
            default_register: Some(Register::Low),
            default_parameters: None,
            genre_profiles: BTreeMap::new(),
            timeline_template: None,
        },
        RichRule {
            id: "walking_bass".to_string(),
            name: "Walking Bass".to_string(),
            riff_id: None,
            category: RuleCategory::Walk,
            tags: vec!["bass".to_string(), "motion".to_string()],
            default_register: Some(Register::Low),
            default_parameters: Some(WalkParameters::default()),
            genre_profiles: walk_profiles(),
            timeline_template: Some(TimelineTemplate::walk_default()),
        },
    ]
}

fn walk_profiles() -> BTreeMap<String, GenreProfile> {
    let mut profiles = BTreeMap::new();
    profiles.insert(
        "blues".to_string(),
        GenreProfile {
            preferred_approach: ApproachPreference::Chromatic,
            description: "Chromatic passing tones into the next chord.".to_string(),
        },
    );
    profiles.insert(
        "jazz".to_string(),
        GenreProfile {
            preferred_approach: ApproachPreference::Chromatic,
            description: "Chromatic walking with leading tones.".to_string(),
        },
    );
    profiles.insert(
        "pop".to_string(),
        GenreProfile {
            preferred_approach: ApproachPreference::Diatonic,
            description: "Scale-tone walking, no accidentals.".to_string(),
        },
    );
    profiles.insert(
        "custom".to_string(),
        GenreProfile {
            preferred_approach: ApproachPreference::Diatonic,
            description: "Fallback profile for unrecognized genres.".to_string(),
        },
    );
    profiles
}

fn progressions() -> Vec<Progression> {
    vec![
        Progression::from_symbols(
            "blues-12bar",
            "A",
            &["blues"],
            &[
                "I7", "I7", "I7", "I7", "IV7", "IV7", "I7", "I7", "V7", "IV7", "I7", "V7",
            ],
            "Standard 12-bar blues progression",
        ),
        Progression::from_symbols(
            "blues-8bar",
            "A",
            &["blues"],
            &["I7", "IV7", "I7", "I7", "IV7", "IV7", "I7", "V7"],
            "8-bar blues variation",
        ),
        Progression::from_symbols(
            "pop-vi-IV-I-V",
            "C",
            &["pop"],
            &["vi", "IV", "I", "V"],
            "Common pop progression (vi-IV-I-V)",
        ),
        Progression::from_symbols(
            "pop-I-V-vi-IV",
            "C",
            &["pop"],
            &["I", "V", "vi", "IV"],
            "Four-chord progression (I-V-vi-IV)",
        ),
        Progression {
            id: "I_IV_V_I".to_string(),
            key: "C".to_string(),
            genre_tags: vec!["pop".to_string()],
            description: "Cadential I-IV-V-I, one bar per chord".to_string(),
            chords: vec![
                ChordEntry {
                    degree: Degree::I,
                    quality: None,
                    bars: 1,
                },
                ChordEntry {
                    degree: Degree::IV,
                    quality: None,
                    bars: 1,
                },
                ChordEntry {
                    degree: Degree::V,
                    quality: None,
                    bars: 1,
                },
                ChordEntry {
                    degree: Degree::I,
                    quality: None,
                    bars: 1,
                },
            ],
        },
    ]
}

fn scales() -> Vec<Scale> {
    let scale = |id: &str, degrees: &[&str]| Scale {
        id: id.to_string(),
        degrees: degrees.iter().map(|d| d.to_string()).collect(),
    };
    vec![
        scale("minor-pentatonic", &["1", "b3", "4", "5", "b7"]),
        scale("major-pentatonic", &["1", "2", "3", "5", "6"]),
        scale("blues-scale", &["1", "b3", "4", "b5", "5", "b7"]),
        scale("major", &["1", "2", "3", "4", "5", "6", "7"]),
        scale("minor", &["1", "2", "b3", "4", "5", "b6", "b7"]),
    ]
}

fn licks() -> Vec<Lick> {
    let note = |degree: &str, octave_offset: i8, duration: f32| LickNote {
        degree: degree.to_string(),
        octave_offset,
        duration,
    };
    vec![
        Lick {
            id: "blues-l1-lick1".to_string(),
            genre_tags: vec!["blues".to_string()],
            level: 1,
            notes: vec![
                note("1", 0, 0.5),
                note("b3", 0, 0.5),
                note("4", 0, 0.5),
                note("5", 0, 0.5),
            ],
            explanation: "Simple ascending minor pentatonic pattern".to_string(),
        },
        Lick {
            id: "blues-l1-lick2".to_string(),
            genre_tags: vec!["blues".to_string()],
            level: 1,
            notes: vec![note("5", 0, 0.5), note("b7", 0, 0.5), note("1", 1, 1.0)],
            explanation: "Descending pattern resolving to octave".to_string(),
        },
        Lick {
            id: "blues-l2-lick1".to_string(),
            genre_tags: vec!["blues".to_string()],
            level: 2,
            notes: vec![
                note("1", 0, 0.25),
                note("b3", 0, 0.25),
                note("4", 0, 0.25),
                note("b5", 0, 0.25),
                note("5", 0, 0.5),
            ],
            explanation: "Blues scale run with blue note".to_string(),
        },
        Lick {
            id: "pop-l1-lick1".to_string(),
            genre_tags: vec!["pop".to_string()],
            level: 1,
            notes: vec![note("1", 0, 0.5), note("3", 0, 0.5), note("5", 0, 1.0)],
            explanation: "Simple major triad arpeggio".to_string(),
        },
    ]
}
