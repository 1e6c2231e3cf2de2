//! # Tuning Profiles
//!
//! An immutable description of the instrument a tab is written for: the open
//! pitch of every string, the capo offset and the highest usable fret.
//!
//! ## Pitch Formula
//! ```text
//! pitch(string, fret) = open_pitch[string] + capo + fret
//! ```
//! A `TuningProfile` is validated on construction and never changes afterwards,
//! which is what lets the resolver precompute its pitch table once.
//!
//! ## Presets
//! | Preset           | Open pitches               | Notes        |
//! |------------------|----------------------------|--------------|
//! | `standard`       | 40 45 50 55 59 64          | E A D G B E  |
//! | `drop-d`         | 38 45 50 55 59 64          | D A D G B E  |
//! | `half-step-down` | 39 44 49 54 58 63          | Eb Ab Db Gb Bb Eb |
//! | `drop-c`         | 36 43 48 53 57 62          | C G C F A D  |
//! | `open-g`         | 38 43 50 55 59 62          | D G D G B D  |
//! | `open-d`         | 38 45 50 54 57 62          | D A D F# A D |
//! | `dadgad`         | 38 45 50 55 57 62          | D A D G A D  |
//! | `baritone`       | 28 33 38 43 47 52          | E A D G B E, octave down |

use crate::error::TabError;
use crate::types::{pitch_name, FretPosition, MIDI_MAX};
use serde::Serialize;

/// Default highest fret
pub const DEFAULT_FRET_CEILING: u8 = 24;

/// Named tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningPreset {
    Standard,
    DropD,
    HalfStepDown,
    DropC,
    OpenG,
    OpenD,
    Dadgad,
    Baritone,
}

impl TuningPreset {
    /// Parse a preset name (case-insensitive, `-`/`_`/space separated)
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match normalized.as_str() {
            "standard" | "eadgbe" => Some(TuningPreset::Standard),
            "dropd" => Some(TuningPreset::DropD),
            "halfstepdown" | "eb" => Some(TuningPreset::HalfStepDown),
            "dropc" => Some(TuningPreset::DropC),
            "openg" => Some(TuningPreset::OpenG),
            "opend" => Some(TuningPreset::OpenD),
            "dadgad" => Some(TuningPreset::Dadgad),
            "baritone" => Some(TuningPreset::Baritone),
            _ => None,
        }
    }

    /// Open-string pitches, lowest string first
    pub fn open_pitches(&self) -> [u8; 6] {
        match self {
            TuningPreset::Standard => [40, 45, 50, 55, 59, 64],
            TuningPreset::DropD => [38, 45, 50, 55, 59, 64],
            TuningPreset::HalfStepDown => [39, 44, 49, 54, 58, 63],
            TuningPreset::DropC => [36, 43, 48, 53, 57, 62],
            TuningPreset::OpenG => [38, 43, 50, 55, 59, 62],
            TuningPreset::OpenD => [38, 45, 50, 54, 57, 62],
            TuningPreset::Dadgad => [38, 45, 50, 55, 57, 62],
            TuningPreset::Baritone => [28, 33, 38, 43, 47, 52],
        }
    }
}

/// Immutable instrument configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningProfile {
    open_pitches: Vec<u8>,
    capo: u8,
    fret_ceiling: u8,
}

impl Default for TuningProfile {
    fn default() -> Self {
        Self::preset(TuningPreset::Standard)
    }
}

impl TuningProfile {
    /// Build and validate a tuning.
    ///
    /// Rejects an empty string list and any string whose capoed open pitch
    /// would leave the MIDI range.
    pub fn new(open_pitches: Vec<u8>, capo: u8, fret_ceiling: u8) -> Result<Self, TabError> {
        if open_pitches.is_empty() {
            return Err(TabError::TuningError(
                "tuning must have at least one string".to_string(),
            ));
        }
        for (string_index, &open) in open_pitches.iter().enumerate() {
            let effective = open as u16 + capo as u16;
            if effective > MIDI_MAX as u16 {
                return Err(TabError::TuningError(format!(
                    "string {} open pitch {} with capo {} exceeds MIDI range (max {})",
                    string_index, open, capo, MIDI_MAX
                )));
            }
        }
        Ok(Self {
            open_pitches,
            capo,
            fret_ceiling,
        })
    }

    /// A preset tuning, no capo, 24 frets
    pub fn preset(preset: TuningPreset) -> Self {
        Self {
            open_pitches: preset.open_pitches().to_vec(),
            capo: 0,
            fret_ceiling: DEFAULT_FRET_CEILING,
        }
    }

    /// Standard six-string guitar tuning (E A D G B E)
    pub fn standard() -> Self {
        Self::preset(TuningPreset::Standard)
    }

    /// Same strings and ceiling with a different capo
    pub fn with_capo(&self, capo: u8) -> Result<Self, TabError> {
        Self::new(self.open_pitches.clone(), capo, self.fret_ceiling)
    }

    pub fn string_count(&self) -> usize {
        self.open_pitches.len()
    }

    /// Open pitches as tuned, before the capo
    pub fn open_pitches(&self) -> &[u8] {
        &self.open_pitches
    }

    pub fn capo(&self) -> u8 {
        self.capo
    }

    pub fn fret_ceiling(&self) -> u8 {
        self.fret_ceiling
    }

    /// Pitch of an unfretted string with the capo applied
    pub fn effective_open_pitch(&self, string_index: usize) -> Option<u8> {
        self.open_pitches
            .get(string_index)
            .map(|&open| open + self.capo)
    }

    /// Sounding pitch of a position, or `None` if the position is off the
    /// fretboard or above MIDI range
    pub fn pitch_at(&self, position: FretPosition) -> Option<u8> {
        if position.fret > self.fret_ceiling {
            return None;
        }
        let open = self.effective_open_pitch(position.string_index)?;
        let pitch = open as u16 + position.fret as u16;
        (pitch <= MIDI_MAX as u16).then_some(pitch as u8)
    }

    /// Whether the string is one of the two outermost strings
    pub fn is_outer_string(&self, string_index: usize) -> bool {
        string_index == 0 || string_index + 1 == self.string_count()
    }

    /// Whether the string is in the lower-pitched half of the instrument
    pub fn is_low_string(&self, string_index: usize) -> bool {
        string_index < self.string_count() / 2
    }

    /// Human-readable tuning, e.g. "E2-A2-D3-G3-B3-E4"
    pub fn describe(&self) -> String {
        self.open_pitches
            .iter()
            .map(|&p| pitch_name(p))
            .collect::<Vec<_>>()
            .join("-")
    }
}
