//! # Technique Classifier
//!
//! Infers playing techniques from timing, velocity and fret movement.
//!
//! ## Rules
//! Connecting articulations compare a note with the previous note **on the
//! same string** only, using `gap = start_time - previous.end_time`:
//!
//! | Articulation | Condition |
//! |--------------|-----------|
//! | hammer-on    | fret goes up, `gap < legato_max_gap`, velocity lower than previous |
//! | pull-off     | fret goes down, `gap < legato_max_gap`, velocity lower than previous |
//! | slide up/down | `|fret delta| > 1`, `gap <= slide_max_gap`; direction from the delta |
//!
//! Hammer-on and pull-off win over slides. A note carries at most one
//! articulation.
//!
//! Two facets depend on the note alone and may be combined with anything:
//! - **palm mute**: velocity below `palm_mute_velocity`
//! - **harmonic**: fret in `harmonic_frets` and velocity above `harmonic_velocity`

use crate::document::TabNote;
use crate::error::TabError;
use crate::types::MIDI_MAX;
use serde::Serialize;

/// Articulation connecting a note to the previous note on its string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Articulation {
    HammerOn,
    PullOff,
    SlideUp,
    SlideDown,
}

impl Articulation {
    /// Tab notation symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Articulation::HammerOn => "h",
            Articulation::PullOff => "p",
            Articulation::SlideUp => "/",
            Articulation::SlideDown => "\\",
        }
    }
}

/// Technique facets of one tab note. The default is a plain picked note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Technique {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articulation: Option<Articulation>,
    pub palm_mute: bool,
    pub harmonic: bool,
}

impl Technique {
    pub fn is_normal(&self) -> bool {
        *self == Technique::default()
    }

    /// Combined tab notation, e.g. "h", "PM", "/<>"; empty for a normal note
    pub fn notation(&self) -> String {
        let mut notation = String::new();
        if let Some(articulation) = self.articulation {
            notation.push_str(articulation.symbol());
        }
        if self.harmonic {
            notation.push_str("<>");
        }
        if self.palm_mute {
            notation.push_str("PM");
        }
        notation
    }
}

/// Timing and velocity thresholds for technique inference
#[derive(Debug, Clone, PartialEq)]
pub struct TechniqueThresholds {
    pub enabled: bool,
    pub legato_max_gap: f64, // seconds, hammer-on / pull-off
    pub slide_max_gap: f64,  // seconds
    pub palm_mute_velocity: u8,
    pub harmonic_velocity: u8,
    pub harmonic_frets: Vec<u8>,
}

impl Default for TechniqueThresholds {
    fn default() -> Self {
        Self {
            enabled: true,
            legato_max_gap: 0.1,
            slide_max_gap: 0.2,
            palm_mute_velocity: 40,
            harmonic_velocity: 100,
            harmonic_frets: vec![3, 4, 5, 7, 12],
        }
    }
}

impl TechniqueThresholds {
    pub fn validate(&self) -> Result<(), TabError> {
        for (name, gap) in [
            ("legato-max-gap", self.legato_max_gap),
            ("slide-max-gap", self.slide_max_gap),
        ] {
            if !gap.is_finite() || gap < 0.0 {
                return Err(TabError::ConfigError(format!(
                    "{} must be a non-negative number of seconds, got {}",
                    name, gap
                )));
            }
        }
        for (name, velocity) in [
            ("palm-mute-velocity", self.palm_mute_velocity),
            ("harmonic-velocity", self.harmonic_velocity),
        ] {
            if velocity > MIDI_MAX {
                return Err(TabError::ConfigError(format!(
                    "{} must be at most {}, got {}",
                    name, MIDI_MAX, velocity
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct TechniqueClassifier<'a> {
    thresholds: &'a TechniqueThresholds,
}

impl<'a> TechniqueClassifier<'a> {
    pub fn new(thresholds: &'a TechniqueThresholds) -> Self {
        Self { thresholds }
    }

    /// Annotate time-ordered notes in place
    pub fn annotate(&self, notes: &mut [TabNote]) {
        if !self.thresholds.enabled {
            return;
        }
        // Index of the last note seen on each string
        let mut last_on_string: Vec<Option<usize>> = Vec::new();

        for i in 0..notes.len() {
            let string = notes[i].position.string_index;
            if string >= last_on_string.len() {
                last_on_string.resize(string + 1, None);
            }
            let previous = last_on_string[string].map(|j| &notes[j]);
            let technique = self.classify(previous, &notes[i]);
            notes[i].technique = technique;
            last_on_string[string] = Some(i);
        }
    }

    /// Technique of `current`, given the previous note on the same string
    pub fn classify(&self, previous: Option<&TabNote>, current: &TabNote) -> Technique {
        let thresholds = self.thresholds;
        let velocity = current.note.velocity;
        let fret = current.position.fret;

        Technique {
            articulation: previous.and_then(|prev| self.articulation(prev, current)),
            palm_mute: velocity < thresholds.palm_mute_velocity,
            harmonic: velocity > thresholds.harmonic_velocity
                && thresholds.harmonic_frets.contains(&fret),
        }
    }

    fn articulation(&self, previous: &TabNote, current: &TabNote) -> Option<Articulation> {
        let thresholds = self.thresholds;
        let gap = current.note.start_time - previous.note.end_time;
        let delta = current.position.fret as i16 - previous.position.fret as i16;
        let softer = current.note.velocity < previous.note.velocity;

        if gap < thresholds.legato_max_gap && softer {
            if delta > 0 {
                return Some(Articulation::HammerOn);
            }
            if delta < 0 {
                return Some(Articulation::PullOff);
            }
        }
        if delta.abs() > 1 && gap <= thresholds.slide_max_gap {
            return Some(if delta > 0 {
                Articulation::SlideUp
            } else {
                Articulation::SlideDown
            });
        }
        None
    }
}
