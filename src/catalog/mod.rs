//! Catalog data model — rules, riffs, walk parameters, scales, and licks.
//!
//! Catalogs are immutable reference data: loaded once (built-ins plus an
//! optional user file), validated eagerly, then only read during generation.
//! The atomic [`Rule`] drives the bass generator; the richer [`RichRule`]
//! binds riffs (or a parametric walk) into the full pipeline.

pub mod builtin;
pub mod config;
pub mod validate;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::timeline::Progression;

/// The musical part a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Bass,
    Lead,
    Chords,
}

/// Evaluation priority of a rule: constraints gate feasibility, anchors are
/// mandatory, preferences are weighted choices, embellishments are optional
/// additions (a reserved extension point).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Constraint,
    Anchor,
    Preference,
    Embellishment,
}

/// Which aspect of a beat the rule decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Affects {
    TargetTone,
    Rhythm,
    Motion,
}

/// When a rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    Always,
    Beat1,
    Beat3,
    #[serde(alias = "chord change")]
    ChordChange,
}

/// An atomic declarative behavior consumed by the bass generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub part: Part,
    #[serde(default)]
    pub genre_tags: Vec<String>,
    #[serde(default = "default_min_level")]
    pub min_level: u32,
    /// `None` means unbounded: the rule stays active at every level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_level: Option<u32>,
    pub role: Role,
    pub affects_slot: Affects,
    pub trigger: Trigger,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

fn default_min_level() -> u32 {
    1
}

/// Coarse octave band for a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    Low,
    Mid,
    High,
}

/// What a pitch reference is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PitchBasis {
    KeyRoot,
    CurrentChord,
    NextChord,
    ChordTone,
}

/// An unresolved pointer to a pitch, resolved against a harmonic context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRef {
    pub basis: PitchBasis,
    #[serde(default)]
    pub offset: i32,
    /// Chord-tone selector ("1"/"3"/"5") or, for resolved walks, the full
    /// degree label the step landed on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree_hint: Option<String>,
}

impl PitchRef {
    /// A reference to the root of the chord sounding at the event's beat.
    pub fn current_chord_root() -> Self {
        Self {
            basis: PitchBasis::CurrentChord,
            offset: 0,
            degree_hint: Some("1".to_string()),
        }
    }
}

/// Octave placement policy for a riff event. `Nearest` is the only
/// supported value; octave choice stays register-driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OctaveStrategy {
    #[default]
    Nearest,
}

/// One timed event inside a riff. Beats are 1-based and relative to the
/// riff's own start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiffEvent {
    pub start_beat: u32,
    pub duration: f32,
    pub pitch_ref: PitchRef,
    #[serde(default)]
    pub octave_strategy: OctaveStrategy,
}

/// A declarative, relocatable template of timed pitch events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Riff {
    pub id: String,
    pub length_beats: u32,
    #[serde(default)]
    pub explanation: String,
    pub events: Vec<RiffEvent>,
}

/// Whether a rich rule plays a static riff or resolves a walk dynamically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    #[default]
    Normal,
    Walk,
}

/// Stylistic approach preferred by a genre profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproachPreference {
    Diatonic,
    Chromatic,
}

/// A named bundle of stylistic defaults consumed by the walk resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreProfile {
    pub preferred_approach: ApproachPreference,
    #[serde(default)]
    pub description: String,
}

/// Role an event plays inside a walk template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateRole {
    StartAnchor,
    WalkStep,
    ApproachTone,
    TargetAnchor,
}

/// Which chord an instantiated template event should be pinned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteSource {
    #[default]
    CurrentChordRoot,
    TargetChordRoot,
}

/// One slot of a walk timeline template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEvent {
    /// 1-based beat within the template's bar.
    pub beat: u32,
    /// Whole bars past the walk's starting bar.
    #[serde(default)]
    pub bar_offset: u32,
    pub role: TemplateRole,
    /// 1-based walk step number; only meaningful for `WalkStep` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_index: Option<u8>,
    #[serde(default)]
    pub note_source: NoteSource,
}

/// The fixed beat pattern a walk rule instantiates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineTemplate {
    pub length_beats: u32,
    pub events: Vec<TemplateEvent>,
}

impl TimelineTemplate {
    /// The built-in 5-beat walk pattern: start anchor on beat 1, two walk
    /// steps on beats 2-3, approach tone on beat 4, target anchor on beat 1
    /// of the following bar.
    pub fn walk_default() -> Self {
        Self {
            length_beats: 5,
            events: vec![
                TemplateEvent {
                    beat: 1,
                    bar_offset: 0,
                    role: TemplateRole::StartAnchor,
                    step_index: None,
                    note_source: NoteSource::CurrentChordRoot,
                },
                TemplateEvent {
                    beat: 2,
                    bar_offset: 0,
                    role: TemplateRole::WalkStep,
                    step_index: Some(1),
                    note_source: NoteSource::CurrentChordRoot,
                },
                TemplateEvent {
                    beat: 3,
                    bar_offset: 0,
                    role: TemplateRole::WalkStep,
                    step_index: Some(2),
                    note_source: NoteSource::CurrentChordRoot,
                },
                TemplateEvent {
                    beat: 4,
                    bar_offset: 0,
                    role: TemplateRole::ApproachTone,
                    step_index: None,
                    note_source: NoteSource::CurrentChordRoot,
                },
                TemplateEvent {
                    beat: 1,
                    bar_offset: 1,
                    role: TemplateRole::TargetAnchor,
                    step_index: None,
                    note_source: NoteSource::TargetChordRoot,
                },
            ],
        }
    }
}

/// Which harmonic anchor a walk heads toward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WalkTarget {
    #[default]
    NextChordRoot,
    CurrentChordRoot,
}

/// Melodic direction of a walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalkDirection {
    #[default]
    Auto,
    Up,
    Down,
}

/// How intermediate walk tones relate to the scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApproachStrategy {
    Chromatic,
    Diatonic,
    #[default]
    Mixed,
}

/// Parameter set for one walk instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkParameters {
    #[serde(default)]
    pub target: WalkTarget,
    #[serde(default = "default_walk_steps")]
    pub steps: u8,
    #[serde(default)]
    pub direction: WalkDirection,
    #[serde(default)]
    pub approach_strategy: ApproachStrategy,
    #[serde(default = "default_walk_register")]
    pub register: Register,
    #[serde(default = "default_walk_profile")]
    pub genre_profile: String,
}

fn default_walk_steps() -> u8 {
    3
}

fn default_walk_register() -> Register {
    Register::Low
}

fn default_walk_profile() -> String {
    "custom".to_string()
}

impl Default for WalkParameters {
    fn default() -> Self {
        Self {
            target: WalkTarget::NextChordRoot,
            steps: default_walk_steps(),
            direction: WalkDirection::Auto,
            approach_strategy: ApproachStrategy::Mixed,
            register: default_walk_register(),
            genre_profile: default_walk_profile(),
        }
    }
}

/// A catalog entry for the full pipeline: either a static riff binding or a
/// parametric walk generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichRule {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub riff_id: Option<String>,
    #[serde(default)]
    pub category: RuleCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_register: Option<Register>,
    /// Defaults used when an applied walk rule binds no parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_parameters: Option<WalkParameters>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub genre_profiles: BTreeMap<String, GenreProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_template: Option<TimelineTemplate>,
}

impl RichRule {
    /// The parameters a walk instantiation falls back to when the applied
    /// rule binds none.
    pub fn walk_defaults(&self) -> WalkParameters {
        self.default_parameters.clone().unwrap_or_default()
    }
}

/// A note of a lick, in scale-degree notation ("1", "b3").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LickNote {
    pub degree: String,
    #[serde(default)]
    pub octave_offset: i8,
    pub duration: f32,
}

/// A short musical idea selectable by genre and level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lick {
    pub id: String,
    #[serde(default)]
    pub genre_tags: Vec<String>,
    pub level: u32,
    pub notes: Vec<LickNote>,
    #[serde(default)]
    pub explanation: String,
}

/// A named scale as a list of degree symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub id: String,
    pub degrees: Vec<String>,
}

/// The full read-only data set generation runs against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub rules: Vec<Rule>,
    pub rich_rules: Vec<RichRule>,
    pub riffs: Vec<Riff>,
    pub progressions: Vec<Progression>,
    pub scales: Vec<Scale>,
    pub licks: Vec<Lick>,
}

impl Catalog {
    pub fn rich_rule(&self, id: &str) -> Option<&RichRule> {
        self.rich_rules.iter().find(|r| r.id == id)
    }

    pub fn riff(&self, id: &str) -> Option<&Riff> {
        self.riffs.iter().find(|r| r.id == id)
    }

    pub fn progression(&self, id: &str) -> Option<&Progression> {
        self.progressions.iter().find(|p| p.id == id)
    }

    pub fn scale(&self, id: &str) -> Option<&Scale> {
        self.scales.iter().find(|s| s.id == id)
    }

    /// Genres mentioned by any progression, sorted and deduplicated.
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = self
            .progressions
            .iter()
            .flat_map(|p| p.genre_tags.iter().cloned())
            .collect();
        genres.sort();
        genres.dedup();
        genres
    }
}
