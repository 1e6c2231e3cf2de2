//! # Tab Document Types
//!
//! The structured output handed to the rendering/export collaborator.
//!
//! ## Type Hierarchy
//! ```text
//! TabDocument
//!   ├── tuning: TuningProfile (open pitches, capo, fret ceiling)
//!   ├── Vec<Measure>
//!   │     ├── index, time signature, tempo, start time, duration
//!   │     └── Vec<TabEvent>
//!   │           ├── Note(TabNote)      a single note
//!   │           └── Chord(ChordGroup)  simultaneous notes on distinct strings
//!   ├── Vec<UnplayableNote> (warnings)
//!   └── TabStatistics
//! ```
//!
//! Every playable input note is a `TabNote` in exactly one event of exactly one
//! measure; every unplayable input note is an `UnplayableNote` warning.
//!
//! ## Serialization
//! All types serialize with camelCase field names. `TabNote` flattens its note
//! and position, so a note reads as
//! `{"pitch":64,"startTime":0.0,"endTime":0.5,"velocity":80,"stringIndex":5,"fret":0,...}`.

use crate::chords::ChordShape;
use crate::error::TabError;
use crate::technique::Technique;
use crate::tuning::TuningProfile;
use crate::types::{FretPosition, Note, TimeSignature};
use serde::Serialize;

/// A note that no string can play under the current tuning
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplayableNote {
    pub pitch: u8,
    pub start_time: f64,
}

/// A note bound to its chosen fretboard position
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabNote {
    #[serde(flatten)]
    pub note: Note,
    #[serde(flatten)]
    pub position: FretPosition,
    pub technique: Technique,
    pub alternatives: Vec<FretPosition>, // other positions sounding the same pitch
    pub difficulty: f64,
}

impl TabNote {
    pub fn new(
        note: Note,
        position: FretPosition,
        alternatives: Vec<FretPosition>,
        difficulty: f64,
    ) -> Self {
        Self {
            note,
            position,
            technique: Technique::default(),
            alternatives,
            difficulty,
        }
    }

    pub fn start_time(&self) -> f64 {
        self.note.start_time
    }
}

/// Notes struck together, one per string
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordGroup {
    pub notes: Vec<TabNote>,
    pub start_time: f64, // earliest member start
    pub duration: f64,   // until the last member ends
    pub shape: ChordShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
}

impl ChordGroup {
    pub fn positions(&self) -> Vec<FretPosition> {
        self.notes.iter().map(|n| n.position).collect()
    }

    pub fn pitches(&self) -> Vec<u8> {
        self.notes.iter().map(|n| n.note.pitch).collect()
    }

    /// Shape display name, if the shape is labeled
    pub fn shape_name(&self) -> Option<String> {
        self.shape.name()
    }
}

/// One entry in a measure
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TabEvent {
    Note(TabNote),
    Chord(ChordGroup),
}

impl TabEvent {
    pub fn start_time(&self) -> f64 {
        match self {
            TabEvent::Note(note) => note.start_time(),
            TabEvent::Chord(chord) => chord.start_time,
        }
    }

    /// The tab notes of this event, in time order
    pub fn notes(&self) -> &[TabNote] {
        match self {
            TabEvent::Note(note) => std::slice::from_ref(note),
            TabEvent::Chord(chord) => &chord.notes,
        }
    }
}

/// A measure of tablature covering `[start_time, start_time + duration)`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub index: usize,
    pub time_signature: TimeSignature,
    pub tempo: f64,
    pub start_time: f64,
    pub duration: f64,
    pub events: Vec<TabEvent>,
}

impl Measure {
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && time < self.end_time()
    }

    pub fn notes(&self) -> impl Iterator<Item = &TabNote> {
        self.events.iter().flat_map(|e| e.notes())
    }

    pub fn chords(&self) -> impl Iterator<Item = &ChordGroup> {
        self.events.iter().filter_map(|e| match e {
            TabEvent::Chord(chord) => Some(chord),
            TabEvent::Note(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Summary counts for a converted document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabStatistics {
    pub total_notes: usize,
    pub total_measures: usize,
    pub detected_chords: usize,
    pub labeled_chords: usize,
    pub unplayable_notes: usize,
    pub tempo: f64, // initial tempo in BPM
}

/// A complete tablature conversion result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabDocument {
    pub tuning: TuningProfile,
    pub tuning_name: String,
    pub measures: Vec<Measure>,
    pub warnings: Vec<UnplayableNote>,
    pub statistics: TabStatistics,
}

impl TabDocument {
    /// Assemble a document and compute its statistics
    pub fn new(
        tuning: TuningProfile,
        measures: Vec<Measure>,
        warnings: Vec<UnplayableNote>,
        tempo: f64,
    ) -> Self {
        let chords: Vec<&ChordGroup> = measures.iter().flat_map(|m| m.chords()).collect();
        let statistics = TabStatistics {
            total_notes: measures.iter().map(|m| m.notes().count()).sum(),
            total_measures: measures.len(),
            detected_chords: chords.len(),
            labeled_chords: chords.iter().filter(|c| c.shape.is_labeled()).count(),
            unplayable_notes: warnings.len(),
            tempo,
        };
        Self {
            tuning_name: tuning.describe(),
            tuning,
            measures,
            warnings,
            statistics,
        }
    }

    /// Every tab note in time order
    pub fn tab_notes(&self) -> impl Iterator<Item = &TabNote> {
        self.measures.iter().flat_map(|m| m.notes())
    }

    pub fn chords(&self) -> impl Iterator<Item = &ChordGroup> {
        self.measures.iter().flat_map(|m| m.chords())
    }

    pub fn capo(&self) -> u8 {
        self.tuning.capo()
    }

    pub fn to_json(&self) -> Result<String, TabError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, TabError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
