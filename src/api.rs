//! # Public API
//!
//! Entry points for converting a transcribed note stream into tablature.
//!
//! ## Conversion Functions
//!
//! - [`TabConverter`] - validated configuration plus the precomputed pitch
//!   table; build once, convert many times (also from several threads)
//! - [`convert()`] - one-shot conversion with a [`TabConfig`]
//! - [`convert_yaml()`] - one-shot conversion with a YAML configuration
//!
//! ## Pipeline
//! 1. Validate every input note (fatal [`TabError::InvalidNote`])
//! 2. Stable-sort notes by start time
//! 3. Choose a fretboard position per note; unplayable notes become warnings
//! 4. Annotate playing techniques
//! 5. Group simultaneous notes into chords
//! 6. Split events into measures
//!
//! ## Typical Usage
//!
//! ```rust
//! use fretmap::{Note, TabConfig, TabConverter};
//!
//! let converter = TabConverter::new(TabConfig::default())?;
//! let notes = vec![
//!     Note::new(64, 0.0, 0.5, 80),
//!     Note::new(67, 0.5, 1.0, 80),
//!     Note::new(28, 1.0, 1.5, 80), // below the low E string
//! ];
//!
//! let document = converter.convert(&notes)?;
//! assert_eq!(document.tab_notes().count(), 2);
//! assert_eq!(document.warnings.len(), 1);
//!
//! let json = document.to_json()?;
//! # Ok::<(), fretmap::TabError>(())
//! ```

use crate::chords::{ChordGroupDetector, ShapeLibrary};
use crate::config::TabConfig;
use crate::document::TabDocument;
use crate::error::TabError;
use crate::measure::MeasureSegmenter;
use crate::resolver::PositionResolver;
use crate::selector::PositionSelector;
use crate::technique::TechniqueClassifier;
use crate::types::{Note, MIDI_MAX};
use tracing::info;

/// Reusable converter for one configuration.
///
/// Holds no per-run state; `convert` takes `&self` and may be called
/// concurrently.
#[derive(Debug, Clone)]
pub struct TabConverter {
    config: TabConfig,
    resolver: PositionResolver,
    library: ShapeLibrary,
}

impl TabConverter {
    /// Validate the configuration and build the pitch table
    pub fn new(config: TabConfig) -> Result<Self, TabError> {
        config.validate()?;
        let resolver = PositionResolver::new(&config.tuning);
        Ok(Self {
            config,
            resolver,
            library: ShapeLibrary::standard_guitar(),
        })
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, TabError> {
        Self::new(TabConfig::from_yaml(yaml)?)
    }

    /// Replace the built-in chord shape library
    pub fn with_shape_library(mut self, library: ShapeLibrary) -> Self {
        self.library = library;
        self
    }

    pub fn config(&self) -> &TabConfig {
        &self.config
    }

    pub fn resolver(&self) -> &PositionResolver {
        &self.resolver
    }

    /// Convert a note stream into a tab document
    pub fn convert(&self, notes: &[Note]) -> Result<TabDocument, TabError> {
        validate_notes(notes)?;

        let mut ordered = notes.to_vec();
        ordered.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

        let config = &self.config;
        let selection = PositionSelector::new(
            &self.resolver,
            &config.selection,
            config.chords.time_tolerance,
        )
        .select(&ordered);

        let mut tab_notes = selection.notes;
        TechniqueClassifier::new(&config.techniques).annotate(&mut tab_notes);

        let events =
            ChordGroupDetector::new(&config.chords, &self.library, &config.tuning).detect(tab_notes);
        let measures = MeasureSegmenter::new(&config.timing).segment(events);

        let document = TabDocument::new(
            config.tuning.clone(),
            measures,
            selection.warnings,
            config.timing.tempo,
        );

        let stats = &document.statistics;
        info!(
            notes = stats.total_notes,
            unplayable = stats.unplayable_notes,
            chords = stats.detected_chords,
            measures = stats.total_measures,
            tuning = %document.tuning_name,
            "converted note stream to tab"
        );
        Ok(document)
    }
}

/// Check every note before any is mapped.
///
/// A note is malformed when its pitch or velocity is above 127, its start time
/// is negative or not finite, or it does not end after it starts.
pub fn validate_notes(notes: &[Note]) -> Result<(), TabError> {
    for (index, note) in notes.iter().enumerate() {
        let problem = if note.pitch > MIDI_MAX {
            Some(format!("pitch {} is above {}", note.pitch, MIDI_MAX))
        } else if note.velocity > MIDI_MAX {
            Some(format!("velocity {} is above {}", note.velocity, MIDI_MAX))
        } else if !note.start_time.is_finite() || note.start_time < 0.0 {
            Some(format!("start time {} is not a non-negative number", note.start_time))
        } else if !note.end_time.is_finite() || note.end_time <= note.start_time {
            Some(format!(
                "end time {} does not come after start time {}",
                note.end_time, note.start_time
            ))
        } else {
            None
        };

        if let Some(message) = problem {
            return Err(TabError::InvalidNote { index, message });
        }
    }
    Ok(())
}

/// One-shot conversion.
///
/// Builds a [`TabConverter`] for `config`; prefer a long-lived converter when
/// converting many streams with the same options.
pub fn convert(notes: &[Note], config: &TabConfig) -> Result<TabDocument, TabError> {
    TabConverter::new(config.clone())?.convert(notes)
}

/// One-shot conversion with a YAML configuration
///
/// # Example
/// ```rust
/// use fretmap::{convert_yaml, Note};
///
/// let notes = vec![Note::new(50, 0.0, 1.0, 90)];
/// let document = convert_yaml(&notes, "tuning: drop-d\ntempo: 60")?;
///
/// // 4/4 at 60 BPM: one four-second measure
/// assert_eq!(document.measures.len(), 1);
/// assert_eq!(document.measures[0].duration, 4.0);
/// # Ok::<(), fretmap::TabError>(())
/// ```
pub fn convert_yaml(notes: &[Note], yaml: &str) -> Result<TabDocument, TabError> {
    TabConverter::from_yaml(yaml)?.convert(notes)
}
