//! # Core Data Types
//!
//! Input and position types shared by every stage of the mapping pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! Note (input, from the transcription collaborator)
//!   ├── pitch: MIDI 0-127
//!   ├── start_time / end_time: seconds
//!   └── velocity: 0-127
//!
//! FretPosition (where a pitch is played)
//!   ├── string_index: 0 = lowest-pitched string
//!   └── fret: 0 = open string
//!
//! TimeSignature (beats per measure / beat unit)
//! ```
//!
//! ## String Numbering
//! Strings are indexed from the lowest-pitched string upwards, matching the
//! order of the tuning array. In standard tuning `[40, 45, 50, 55, 59, 64]`,
//! index 0 is the low E string and index 5 is the high E string.
//!
//! ## Related Modules
//! - `tuning` - Maps a FretPosition back to a pitch
//! - `resolver` - Produces FretPositions for a pitch
//! - `document` - Binds Notes to chosen FretPositions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest valid MIDI pitch and velocity
pub const MIDI_MAX: u8 = 127;

/// Pitch class names, sharps only (C = 0)
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Scientific pitch name for a MIDI pitch (60 = C4, 40 = E2)
pub fn pitch_name(pitch: u8) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", PITCH_CLASS_NAMES[(pitch % 12) as usize], octave)
}

/// A transcribed note event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub pitch: u8,
    pub start_time: f64, // seconds from the start of the recording
    pub end_time: f64,   // seconds, strictly after start_time
    pub velocity: u8,
}

impl Note {
    pub fn new(pitch: u8, start_time: f64, end_time: f64, velocity: u8) -> Self {
        Self {
            pitch,
            start_time,
            end_time,
            velocity,
        }
    }

    /// Sounding length in seconds
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// A place on the fretboard: one string, one fret.
///
/// Ordering is by string index, then fret, which is also the tie-break order
/// used when two positions cost the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FretPosition {
    pub string_index: usize,
    pub fret: u8,
}

impl FretPosition {
    pub fn new(string_index: usize, fret: u8) -> Self {
        Self { string_index, fret }
    }

    pub fn is_open(&self) -> bool {
        self.fret == 0
    }
}

impl fmt::Display for FretPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}f{}", self.string_index, self.fret)
    }
}

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_unit: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats: 4,
            beat_unit: 4,
        }
    }
}

impl TimeSignature {
    /// Parse a time signature string like "4/4", "3/4" or "6/8".
    ///
    /// Returns `None` for malformed input: missing slash, zero beats, or a beat
    /// unit that is not a power of two up to 32.
    pub fn from_str(s: &str) -> Option<Self> {
        let (beats, unit) = s.trim().split_once('/')?;
        let beats: u8 = beats.trim().parse().ok()?;
        let beat_unit: u8 = unit.trim().parse().ok()?;
        let ts = Self { beats, beat_unit };
        ts.is_valid().then_some(ts)
    }

    pub fn is_valid(&self) -> bool {
        self.beats > 0 && matches!(self.beat_unit, 1 | 2 | 4 | 8 | 16 | 32)
    }

    /// Length of one measure in seconds at `tempo` beats per minute
    pub fn measure_duration(&self, tempo: f64) -> f64 {
        self.beats as f64 * 60.0 / tempo
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_unit)
    }
}
