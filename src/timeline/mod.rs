//! Chord progressions and the derived timeline.
//!
//! A [`Progression`] is reference data: an ordered list of chords, each held
//! for one or more bars. [`Timeline::build`] expands it into per-bar records
//! plus chord-boundary metadata, which is what the rule engine and the
//! orchestrators address. Beats are 1-based and bars are fixed at 4 beats.

pub mod slots;

pub use slots::{enumerate_slots, RuleSlot};

use serde::{Deserialize, Serialize};

use crate::theory::{parse_chord_symbol, Degree};

/// Beats per bar. The engine assumes 4/4 throughout.
pub const BEATS_PER_BAR: u32 = 4;

/// One chord in a progression, held for `bars` consecutive bars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordEntry {
    pub degree: Degree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    pub bars: u32,
}

impl ChordEntry {
    /// Parse a chord symbol like "I7" or "vi" into an entry held for `bars`.
    pub fn from_symbol(symbol: &str, bars: u32) -> Self {
        let (degree, quality) = parse_chord_symbol(symbol);
        Self {
            degree,
            quality,
            bars,
        }
    }

    /// Reconstruct the chord symbol ("I7", "IV").
    pub fn symbol(&self) -> String {
        match &self.quality {
            Some(q) => format!("{}{}", self.degree, q),
            None => self.degree.to_string(),
        }
    }
}

/// An ordered chord sequence in a tonal key, plus genre tags for filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub id: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub genre_tags: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub chords: Vec<ChordEntry>,
}

impl Progression {
    /// Build a progression from the legacy one-symbol-per-bar form.
    ///
    /// Consecutive identical symbols merge into a single entry held for that
    /// many bars, so chord boundaries mark actual harmonic changes.
    pub fn from_symbols(
        id: &str,
        key: &str,
        genre_tags: &[&str],
        bars: &[&str],
        description: &str,
    ) -> Self {
        let mut chords: Vec<ChordEntry> = Vec::new();
        for symbol in bars {
            let entry = ChordEntry::from_symbol(symbol, 1);
            match chords.last_mut() {
                Some(last) if last.degree == entry.degree && last.quality == entry.quality => {
                    last.bars += 1
                }
                _ => chords.push(entry),
            }
        }
        Self {
            id: id.to_string(),
            key: key.to_string(),
            genre_tags: genre_tags.iter().map(|s| s.to_string()).collect(),
            description: description.to_string(),
            chords,
        }
    }

    /// The legacy per-bar symbol view: one chord symbol per bar.
    pub fn bar_symbols(&self) -> Vec<String> {
        let mut symbols = Vec::new();
        for chord in &self.chords {
            for _ in 0..chord.bars {
                symbols.push(chord.symbol());
            }
        }
        symbols
    }

    /// The chord entry sounding in each bar, in bar order.
    pub fn bar_chords(&self) -> Vec<&ChordEntry> {
        let mut out = Vec::new();
        for chord in &self.chords {
            for _ in 0..chord.bars {
                out.push(chord);
            }
        }
        out
    }

    /// Total number of bars.
    pub fn total_bars(&self) -> u32 {
        self.chords.iter().map(|c| c.bars).sum()
    }
}

/// One bar of the expanded timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub index: usize,
    pub chord_index: usize,
    pub chord_degree: Degree,
    pub start_beat: u32,
    pub beats: u32,
}

/// The span of beats over which one chord sounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordBoundary {
    pub bar_index: usize,
    pub chord_index: usize,
    pub start_beat: u32,
    pub end_beat: u32,
}

/// A progression expanded into bars and chord boundaries.
///
/// Bars partition the beats contiguously starting at beat 1; each boundary
/// ends one beat before the next begins (or at the timeline end).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub key: String,
    pub bars: Vec<Bar>,
    pub chord_boundaries: Vec<ChordBoundary>,
}

impl Timeline {
    /// Expand a progression into its timeline. Pure and O(total bars).
    pub fn build(progression: &Progression) -> Self {
        let mut bars = Vec::new();
        let mut chord_boundaries = Vec::new();
        let mut current_bar = 0usize;
        let mut current_beat = 1u32;

        for (chord_index, chord) in progression.chords.iter().enumerate() {
            let chord_start_bar = current_bar;
            let chord_start_beat = current_beat;

            for _ in 0..chord.bars {
                bars.push(Bar {
                    index: current_bar,
                    chord_index,
                    chord_degree: chord.degree,
                    start_beat: current_beat,
                    beats: BEATS_PER_BAR,
                });
                current_bar += 1;
                current_beat += BEATS_PER_BAR;
            }

            chord_boundaries.push(ChordBoundary {
                bar_index: chord_start_bar,
                chord_index,
                start_beat: chord_start_beat,
                end_beat: current_beat - 1,
            });
        }

        Self {
            key: progression.key.clone(),
            bars,
            chord_boundaries,
        }
    }

    /// Total number of beats on the timeline.
    pub fn total_beats(&self) -> u32 {
        self.bars.len() as u32 * BEATS_PER_BAR
    }

    /// Root degree of the chord at `chord_index`.
    ///
    /// Out-of-range indices degrade to degree I rather than failing.
    pub fn chord_root(&self, chord_index: usize) -> Degree {
        self.bars
            .iter()
            .find(|b| b.chord_index == chord_index)
            .map(|b| b.chord_degree)
            .unwrap_or(Degree::I)
    }

    /// Index of the chord boundary containing an absolute beat, if any.
    pub fn boundary_at_beat(&self, beat: u32) -> Option<usize> {
        self.chord_boundaries
            .iter()
            .position(|b| beat >= b.start_beat && beat <= b.end_beat)
    }
}
