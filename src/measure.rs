//! # Measure Segmenter
//!
//! Splits time-ordered tab events into measures.
//!
//! ## Measure Grid
//! `measure_duration = beats × 60 / tempo`. With a single tempo and time
//! signature, measure `n` covers `[n·d, (n+1)·d)`: at 120 BPM in 4/4 an event
//! at 1.999 s lands in measure 0 and one at 2.000 s in measure 1.
//!
//! ## Timing Changes
//! A [`TimingChange`] takes effect from its timestamp forward. It closes the
//! running measure at that timestamp (the measure is shortened) and starts a
//! new grid there. Changes sharing a timestamp are merged, later ones winning.
//!
//! ## Tempo Range
//! Tempos must lie in `(0, MAX_TEMPO]` BPM, for the initial tempo and for every
//! change, so the measure count stays proportional to the length of the music.
//!
//! ## Coverage
//! Measures are emitted from time 0 until the latest note end is covered,
//! including empty measures over silent stretches. No events, no measures.
//! Consecutive measures are contiguous: each starts exactly where the
//! previous one ends.

use crate::document::{Measure, TabEvent};
use crate::error::TabError;
use crate::types::TimeSignature;
use tracing::debug;

/// A tempo and/or time signature change at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct TimingChange {
    pub at: f64, // seconds
    pub tempo: Option<f64>,
    pub time_signature: Option<TimeSignature>,
}

/// Tempo map of one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub tempo: f64, // BPM
    pub time_signature: TimeSignature,
    pub changes: Vec<TimingChange>,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tempo: 120.0,
            time_signature: TimeSignature::default(),
            changes: Vec::new(),
        }
    }
}

/// Highest accepted tempo in BPM. Bounds the number of measures per second of music.
pub const MAX_TEMPO: f64 = 400.0;

fn check_tempo(tempo: f64) -> Result<(), TabError> {
    if !tempo.is_finite() || tempo <= 0.0 || tempo > MAX_TEMPO {
        return Err(TabError::TimingError(format!(
            "tempo must be above 0 and at most {} BPM, got {}",
            MAX_TEMPO, tempo
        )));
    }
    Ok(())
}

fn check_time_signature(ts: &TimeSignature) -> Result<(), TabError> {
    if !ts.is_valid() {
        return Err(TabError::TimingError(format!(
            "time signature {} is not valid",
            ts
        )));
    }
    Ok(())
}

impl Timing {
    pub fn new(tempo: f64, time_signature: TimeSignature) -> Self {
        Self {
            tempo,
            time_signature,
            changes: Vec::new(),
        }
    }

    pub fn with_change(mut self, change: TimingChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn validate(&self) -> Result<(), TabError> {
        check_tempo(self.tempo)?;
        check_time_signature(&self.time_signature)?;

        for change in &self.changes {
            if !change.at.is_finite() || change.at < 0.0 {
                return Err(TabError::TimingError(format!(
                    "timing change time must be a non-negative number of seconds, got {}",
                    change.at
                )));
            }
            if change.tempo.is_none() && change.time_signature.is_none() {
                return Err(TabError::TimingError(format!(
                    "timing change at {} s changes neither tempo nor time signature",
                    change.at
                )));
            }
            if let Some(tempo) = change.tempo {
                check_tempo(tempo)?;
            }
            if let Some(ts) = &change.time_signature {
                check_time_signature(ts)?;
            }
        }
        Ok(())
    }

    /// Measure length in seconds before any change
    pub fn measure_duration(&self) -> f64 {
        self.time_signature.measure_duration(self.tempo)
    }
}

/// A stretch of constant tempo and time signature
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    start: f64,
    tempo: f64,
    time_signature: TimeSignature,
}

#[derive(Debug)]
pub struct MeasureSegmenter<'a> {
    timing: &'a Timing,
}

impl<'a> MeasureSegmenter<'a> {
    /// The timing must already be validated
    pub fn new(timing: &'a Timing) -> Self {
        Self { timing }
    }

    /// Group time-ordered events into measures
    pub fn segment(&self, events: Vec<TabEvent>) -> Vec<Measure> {
        let end = events
            .iter()
            .flat_map(|e| e.notes())
            .map(|n| n.note.end_time)
            .fold(f64::NEG_INFINITY, f64::max);
        if events.is_empty() {
            return Vec::new();
        }

        let mut measures = self.grid(end);
        let mut events = events.into_iter().peekable();
        let last = measures.len().saturating_sub(1);

        for (i, measure) in measures.iter_mut().enumerate() {
            while let Some(event) = events.next_if(|e| i == last || measure.contains(e.start_time())) {
                measure.events.push(event);
            }
        }

        debug!(measures = measures.len(), "segmented into measures");
        measures
    }

    /// Empty measures covering `[0, end)`
    fn grid(&self, end: f64) -> Vec<Measure> {
        let segments = self.segments();
        let mut measures: Vec<Measure> = Vec::new();
        // Start of the next measure; follows the previous end exactly
        let mut cursor = 0.0;

        for (i, segment) in segments.iter().enumerate() {
            let segment_end = segments.get(i + 1).map_or(f64::INFINITY, |next| next.start);
            let duration = segment.time_signature.measure_duration(segment.tempo);

            let mut k = 0u32;
            loop {
                let boundary = segment.start + k as f64 * duration;
                if boundary >= segment_end || boundary >= end {
                    break;
                }
                let next_boundary = (segment.start + (k + 1) as f64 * duration).min(segment_end);
                let measure = Measure {
                    index: measures.len(),
                    time_signature: segment.time_signature,
                    tempo: segment.tempo,
                    start_time: cursor,
                    duration: next_boundary - cursor,
                    events: Vec::new(),
                };
                cursor = measure.end_time();
                measures.push(measure);
                k += 1;
            }
            if segment_end >= end {
                break;
            }
        }
        measures
    }

    /// Constant-timing segments, starting at 0, strictly increasing
    fn segments(&self) -> Vec<Segment> {
        let mut changes: Vec<&TimingChange> = self.timing.changes.iter().collect();
        changes.sort_by(|a, b| a.at.total_cmp(&b.at));

        let mut current = Segment {
            start: 0.0,
            tempo: self.timing.tempo,
            time_signature: self.timing.time_signature,
        };
        let mut segments = Vec::new();
        for change in changes {
            let next = Segment {
                start: change.at,
                tempo: change.tempo.unwrap_or(current.tempo),
                time_signature: change.time_signature.unwrap_or(current.time_signature),
            };
            if change.at > current.start {
                segments.push(current);
                current = next;
            } else {
                current = Segment {
                    start: current.start,
                    ..next
                };
            }
        }
        segments.push(current);
        segments
    }
}
