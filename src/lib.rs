//! # fretmap
//!
//! Maps a transcribed stream of pitched notes onto guitar fretboard positions
//! and assembles measure-structured tablature.
//!
//! ## Pipeline
//! ```text
//! Notes ─► PositionResolver ─► PositionSelector ─► TechniqueClassifier
//!                                                        │
//!            TabDocument ◄─ MeasureSegmenter ◄─ ChordGroupDetector
//! ```
//!
//! ## Modules
//! - `types` - Note, FretPosition, TimeSignature
//! - `tuning` - TuningProfile and tuning presets
//! - `resolver` - Pitch to candidate positions
//! - `selector` - Cost-based position choice
//! - `technique` - Hammer-on, pull-off, slide, palm mute, harmonic
//! - `chords` - Chord grouping, shapes and symbols
//! - `measure` - Tempo map and measure segmentation
//! - `document` - Output document types
//! - `config` - Validated options and YAML loading
//! - `api` - Conversion entry points
//! - `error` - Error types
//!
//! ## Example
//! ```rust
//! use fretmap::{convert, Note, TabConfig};
//!
//! let notes = vec![Note::new(64, 0.0, 0.5, 80)];
//! let document = convert(&notes, &TabConfig::default())?;
//!
//! let first = document.tab_notes().next().unwrap();
//! assert_eq!((first.position.string_index, first.position.fret), (5, 0));
//! # Ok::<(), fretmap::TabError>(())
//! ```

pub mod api;
pub mod chords;
pub mod config;
pub mod document;
pub mod error;
pub mod measure;
pub mod resolver;
pub mod selector;
pub mod technique;
pub mod tuning;
pub mod types;

pub use api::{convert, convert_yaml, validate_notes, TabConverter};
pub use chords::{identify_chord_symbol, ChordOptions, ChordShape, ShapeLibrary};
pub use config::TabConfig;
pub use document::*;
pub use error::*;
pub use measure::{Timing, TimingChange};
pub use resolver::PositionResolver;
pub use selector::{CostWeights, PositionSelector, SelectionOptions};
pub use technique::{Articulation, Technique, TechniqueThresholds};
pub use tuning::{TuningPreset, TuningProfile};
pub use types::*;
