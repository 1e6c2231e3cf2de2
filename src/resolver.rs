//! # Position Resolver
//!
//! Finds every place on the fretboard where a pitch can be played.
//!
//! For a pitch `p`, a string `s` can play it when
//! `0 <= p - (open_pitch[s] + capo) <= fret_ceiling`. The resolver evaluates
//! this for all 128 MIDI pitches once, when it is built, and answers lookups
//! from that table afterwards. The table is never written after construction,
//! so a resolver can be shared freely between threads.
//!
//! An empty result is a normal outcome: the pitch is below the lowest capoed
//! open string or above the ceiling of every string. Callers decide what to do
//! with it (the selector records an unplayable-note warning).
//!
//! ## Example
//! ```rust
//! use fretmap::{FretPosition, PositionResolver, TuningProfile};
//!
//! let resolver = PositionResolver::new(&TuningProfile::standard());
//!
//! // E4 on every string that reaches it, lowest string first
//! let candidates = resolver.candidates(64);
//! assert_eq!(candidates.first(), Some(&FretPosition::new(0, 24)));
//! assert_eq!(candidates.last(), Some(&FretPosition::new(5, 0)));
//!
//! // Below the low E string
//! assert!(resolver.candidates(28).is_empty());
//! ```

use crate::tuning::TuningProfile;
use crate::types::{FretPosition, MIDI_MAX};

/// Precomputed pitch → candidate positions table for one tuning
#[derive(Debug, Clone)]
pub struct PositionResolver {
    tuning: TuningProfile,
    table: Vec<Vec<FretPosition>>,
}

impl PositionResolver {
    pub fn new(tuning: &TuningProfile) -> Self {
        let table = (0..=MIDI_MAX)
            .map(|pitch| resolve_positions(pitch, tuning))
            .collect();
        Self {
            tuning: tuning.clone(),
            table,
        }
    }

    pub fn tuning(&self) -> &TuningProfile {
        &self.tuning
    }

    /// Candidate positions for a pitch, ordered by string index.
    /// Pitches outside the MIDI range have no candidates.
    pub fn candidates(&self, pitch: u8) -> &[FretPosition] {
        self.table
            .get(pitch as usize)
            .map(|positions| positions.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_playable(&self, pitch: u8) -> bool {
        !self.candidates(pitch).is_empty()
    }

    /// Lowest and highest playable pitch, if anything is playable at all
    pub fn playable_range(&self) -> Option<(u8, u8)> {
        let lowest = (0..=MIDI_MAX).find(|&p| self.is_playable(p))?;
        let highest = (0..=MIDI_MAX).rev().find(|&p| self.is_playable(p))?;
        Some((lowest, highest))
    }
}

/// Solve `pitch = open + capo + fret` on every string
fn resolve_positions(pitch: u8, tuning: &TuningProfile) -> Vec<FretPosition> {
    (0..tuning.string_count())
        .filter_map(|string_index| {
            let open = tuning.effective_open_pitch(string_index)?;
            let fret = pitch.checked_sub(open)?;
            (fret <= tuning.fret_ceiling()).then(|| FretPosition::new(string_index, fret))
        })
        .collect()
}
