//! Harmony resolution — scale degrees, semitone offsets, and chromatic labels.
//!
//! Everything here is relative to a major key: the seven diatonic degrees map
//! to fixed semitone offsets from the key root (I = 0). Pitches that fall off
//! the scale are labeled as the nearest degree plus a signed semitone delta,
//! e.g. `IV+1`. The mapping is lossy for chromatic input but round-trips
//! every diatonic degree exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semitone offsets of the major scale, in ascending degree order.
pub const MAJOR_SCALE: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// A diatonic scale degree in a major key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Degree {
    I,
    II,
    III,
    IV,
    V,
    VI,
    VII,
}

impl Degree {
    /// All seven degrees in ascending order.
    pub const ALL: [Degree; 7] = [
        Degree::I,
        Degree::II,
        Degree::III,
        Degree::IV,
        Degree::V,
        Degree::VI,
        Degree::VII,
    ];

    /// Semitone offset from the key root.
    pub fn semitones(self) -> u8 {
        MAJOR_SCALE[self.index()]
    }

    /// Zero-based position in the scale (I = 0).
    pub fn index(self) -> usize {
        match self {
            Degree::I => 0,
            Degree::II => 1,
            Degree::III => 2,
            Degree::IV => 3,
            Degree::V => 4,
            Degree::VI => 5,
            Degree::VII => 6,
        }
    }

    /// Roman-numeral rendering ("I".."VII").
    pub fn roman(self) -> &'static str {
        match self {
            Degree::I => "I",
            Degree::II => "II",
            Degree::III => "III",
            Degree::IV => "IV",
            Degree::V => "V",
            Degree::VI => "VI",
            Degree::VII => "VII",
        }
    }

    /// Arabic rendering ("1".."7"), used for bass-line degree labels.
    pub fn number(self) -> &'static str {
        match self {
            Degree::I => "1",
            Degree::II => "2",
            Degree::III => "3",
            Degree::IV => "4",
            Degree::V => "5",
            Degree::VI => "6",
            Degree::VII => "7",
        }
    }

    /// The diatonic fifth above this degree, wrapping at the octave
    /// (I→V, II→VI, ... IV→I).
    pub fn fifth(self) -> Degree {
        Degree::ALL[(self.index() + 4) % 7]
    }

    /// Parse an uppercase Roman numeral ("I".."VII").
    pub fn from_roman(s: &str) -> Option<Degree> {
        match s {
            "I" => Some(Degree::I),
            "II" => Some(Degree::II),
            "III" => Some(Degree::III),
            "IV" => Some(Degree::IV),
            "V" => Some(Degree::V),
            "VI" => Some(Degree::VI),
            "VII" => Some(Degree::VII),
            _ => None,
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.roman())
    }
}

/// A scale degree plus a signed chromatic offset in semitones.
///
/// Diatonic pitches have offset 0 and render as the bare numeral ("IV").
/// Chromatic pitches render with the delta attached ("IV+1", "III-1").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DegreeLabel {
    pub degree: Degree,
    pub offset: i8,
}

impl DegreeLabel {
    /// An exact (diatonic) degree label.
    pub fn exact(degree: Degree) -> Self {
        Self { degree, offset: 0 }
    }

    /// Whether the label names a diatonic pitch.
    pub fn is_diatonic(self) -> bool {
        self.offset == 0
    }

    /// Semitone offset from the key root, wrapped into [0, 11].
    pub fn semitones(self) -> u8 {
        (self.degree.semitones() as i32 + self.offset as i32).rem_euclid(12) as u8
    }
}

impl fmt::Display for DegreeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset == 0 {
            write!(f, "{}", self.degree)
        } else if self.offset > 0 {
            write!(f, "{}+{}", self.degree, self.offset)
        } else {
            write!(f, "{}{}", self.degree, self.offset)
        }
    }
}

/// Semitone offset of a degree from the key root.
pub fn degree_to_semitones(degree: Degree) -> u8 {
    degree.semitones()
}

/// Convert a semitone value (any integer) to a degree label.
///
/// Exact scale tones return the bare degree. Anything else returns the
/// nearest degree by circular distance (ties go to the first degree in
/// ascending order) with the remaining delta normalized into (−6, 6].
pub fn semitones_to_degree_label(semitones: i32) -> DegreeLabel {
    let normalized = semitones.rem_euclid(12) as u8;

    for degree in Degree::ALL {
        if degree.semitones() == normalized {
            return DegreeLabel::exact(degree);
        }
    }

    let nearest = nearest_degree(normalized);
    let mut offset = normalized as i32 - nearest.semitones() as i32;
    if offset > 6 {
        offset -= 12;
    }
    if offset < -6 {
        offset += 12;
    }
    DegreeLabel {
        degree: nearest,
        offset: offset as i8,
    }
}

/// Snap a semitone value in [0, 11] to the nearest major-scale tone.
///
/// Uses the same circular-distance / first-match tie-break as the nearest
/// degree search, so snapping and labeling agree on ambiguous pitches.
pub fn snap_to_scale(semitones: u8) -> u8 {
    nearest_degree(semitones % 12).semitones()
}

/// Nearest degree to a normalized semitone value by circular distance.
fn nearest_degree(normalized: u8) -> Degree {
    let mut nearest = Degree::I;
    let mut min_distance = 12;
    for degree in Degree::ALL {
        let distance = circular_distance(normalized, degree.semitones());
        if distance < min_distance {
            min_distance = distance;
            nearest = degree;
        }
    }
    nearest
}

/// Distance between two pitch classes on the 12-tone circle.
fn circular_distance(a: u8, b: u8) -> u8 {
    let delta = (a as i32 - b as i32).unsigned_abs() as u8;
    delta.min(12 - delta)
}

/// Split a chord symbol like "I7", "vi" or "V" into its root degree and
/// quality marker. The Roman prefix is case-insensitive; a symbol with no
/// valid prefix falls back to degree I.
pub fn parse_chord_symbol(symbol: &str) -> (Degree, Option<String>) {
    let prefix_len = symbol
        .chars()
        .take_while(|c| matches!(c, 'i' | 'v' | 'x' | 'I' | 'V' | 'X'))
        .count();
    let (prefix, rest) = symbol.split_at(prefix_len);
    let degree = Degree::from_roman(&prefix.to_uppercase()).unwrap_or(Degree::I);
    let quality = if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    };
    (degree, quality)
}
