//! # Chords Module
//!
//! Groups simultaneous tab notes into chords and labels them.
//!
//! ## Sub-modules
//! - `shapes` - ChordShape, shape templates and the built-in shape library
//! - `symbol` - Chord symbol identification from pitch classes (C, Am, G7, etc.)
//!
//! ## Grouping
//! Notes are walked in time order. A note starting within `time_tolerance` of
//! the open group's first note belongs to that group; a later note opens the
//! next group. Inside a group, the first note on each string is a member. A
//! further note on an already used string is set aside and emitted as a single
//! note right after the chord.
//!
//! A group with at least `min_chord_size` members becomes a [`ChordGroup`].
//! Smaller groups are emitted as single notes in input order.
//!
//! ## Example
//! ```rust
//! use fretmap::chords::{ChordGroupDetector, ChordOptions, ChordShape, ShapeLibrary};
//! use fretmap::{FretPosition, Note, TabEvent, TabNote, TuningProfile};
//!
//! let tuning = TuningProfile::standard();
//! let options = ChordOptions::default();
//! let library = ShapeLibrary::standard_guitar();
//! let detector = ChordGroupDetector::new(&options, &library, &tuning);
//!
//! // Open C: C3 E3 G3 C4 E4
//! let notes: Vec<TabNote> = [(1, 3, 48), (2, 2, 52), (3, 0, 55), (4, 1, 60), (5, 0, 64)]
//!     .iter()
//!     .map(|&(string, fret, pitch)| {
//!         TabNote::new(Note::new(pitch, 0.0, 1.0, 80), FretPosition::new(string, fret), vec![], 0.0)
//!     })
//!     .collect();
//!
//! let events = detector.detect(notes);
//! assert_eq!(events.len(), 1);
//! match &events[0] {
//!     TabEvent::Chord(chord) => {
//!         assert_eq!(chord.shape, ChordShape::Named { name: "C".to_string(), offset: 0 });
//!         assert_eq!(chord.symbol.as_deref(), Some("C"));
//!     }
//!     TabEvent::Note(_) => panic!("expected a chord"),
//! }
//! ```

mod shapes;
mod symbol;


pub use shapes::{ChordShape, ShapeLibrary, ShapeTemplate};
pub use symbol::identify_chord_symbol;

use crate::document::{ChordGroup, TabEvent, TabNote};
use crate::error::TabError;
use crate::tuning::TuningProfile;
use tracing::debug;

/// Chord grouping options
#[derive(Debug, Clone, PartialEq)]
pub struct ChordOptions {
    pub enabled: bool,
    pub time_tolerance: f64, // seconds
    pub min_chord_size: usize,
}

impl Default for ChordOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            time_tolerance: 0.05,
            min_chord_size: 3,
        }
    }
}

impl ChordOptions {
    pub fn validate(&self) -> Result<(), TabError> {
        if !self.time_tolerance.is_finite() || self.time_tolerance < 0.0 {
            return Err(TabError::ConfigError(format!(
                "chord-time-tolerance must be a non-negative number of seconds, got {}",
                self.time_tolerance
            )));
        }
        if self.min_chord_size < 2 {
            return Err(TabError::ConfigError(format!(
                "min-chord-size must be at least 2, got {}",
                self.min_chord_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct ChordGroupDetector<'a> {
    options: &'a ChordOptions,
    library: &'a ShapeLibrary,
    tuning: &'a TuningProfile,
}

impl<'a> ChordGroupDetector<'a> {
    pub fn new(options: &'a ChordOptions, library: &'a ShapeLibrary, tuning: &'a TuningProfile) -> Self {
        Self {
            options,
            library,
            tuning,
        }
    }

    /// Turn time-ordered tab notes into events, grouping chords
    pub fn detect(&self, notes: Vec<TabNote>) -> Vec<TabEvent> {
        if !self.options.enabled {
            return notes.into_iter().map(TabEvent::Note).collect();
        }

        let mut events = Vec::with_capacity(notes.len());
        // Notes of the open group in input order, flagged when they are members
        let mut group: Vec<(TabNote, bool)> = Vec::new();

        for note in notes {
            let outside_window = group.first().map_or(false, |(first, _)| {
                (note.start_time() - first.start_time()).abs() > self.options.time_tolerance
            });
            if outside_window {
                self.flush(&mut group, &mut events);
            }
            let string = note.position.string_index;
            let member = group
                .iter()
                .all(|(other, joined)| !joined || other.position.string_index != string);
            group.push((note, member));
        }
        self.flush(&mut group, &mut events);
        events
    }

    fn flush(&self, group: &mut Vec<(TabNote, bool)>, events: &mut Vec<TabEvent>) {
        let pending = std::mem::take(group);
        let member_count = pending.iter().filter(|(_, member)| *member).count();

        if member_count < self.options.min_chord_size {
            events.extend(pending.into_iter().map(|(note, _)| TabEvent::Note(note)));
            return;
        }

        let (members, aside): (Vec<_>, Vec<_>) = pending.into_iter().partition(|(_, member)| *member);
        events.push(TabEvent::Chord(
            self.build_chord(members.into_iter().map(|(note, _)| note).collect()),
        ));
        events.extend(aside.into_iter().map(|(note, _)| TabEvent::Note(note)));
    }

    fn build_chord(&self, notes: Vec<TabNote>) -> ChordGroup {
        let positions: Vec<_> = notes.iter().map(|n| n.position).collect();
        let pitches: Vec<u8> = notes.iter().map(|n| n.note.pitch).collect();

        let start_time = notes
            .iter()
            .map(|n| n.note.start_time)
            .fold(f64::INFINITY, f64::min);
        let end_time = notes
            .iter()
            .map(|n| n.note.end_time)
            .fold(f64::NEG_INFINITY, f64::max);

        let shape = self.library.classify(&positions, self.tuning.string_count());
        let symbol = identify_chord_symbol(&pitches);

        debug!(
            start_time,
            size = notes.len(),
            shape = ?shape.name(),
            symbol = ?symbol,
            "chord detected"
        );

        ChordGroup {
            notes,
            start_time,
            duration: end_time - start_time,
            shape,
            symbol,
        }
    }
}
