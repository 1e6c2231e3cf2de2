//! # Error Types
//!
//! This module defines all error types for the fretboard mapping engine.
//!
//! Every error here is fatal and is raised before any note is mapped. The one
//! non-fatal outcome, a note that cannot be played under the current tuning, is
//! not an error: it is recorded as an [`UnplayableNote`](crate::UnplayableNote)
//! warning on the returned document.
//!
//! ## Error Types
//! - `TuningError` - Empty tuning, out-of-range open pitches, bad capo or fret ceiling
//! - `ConfigError` - Preference or threshold values outside their valid range
//! - `TimingError` - Malformed time signature, degenerate tempo, bad timing change
//! - `InvalidNote` - An input note with impossible pitch, velocity or timing
//! - `ConfigParse` - YAML configuration that could not be deserialized
//! - `Serialize` - JSON export failure
//!
//! ## Usage
//! ```rust
//! use fretmap::{TabConfig, TabError};
//!
//! match TabConfig::from_yaml("tuning: [40, 45, 50]\ntempo: 0") {
//!     Ok(_) => println!("valid"),
//!     Err(TabError::TimingError(message)) => eprintln!("timing: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    /// Invalid instrument tuning.
    ///
    /// # Example
    /// ```
    /// # use fretmap::TabError;
    /// let err = TabError::TuningError("tuning must have at least one string".to_string());
    /// assert_eq!(err.to_string(), "Invalid tuning: tuning must have at least one string");
    /// ```
    #[error("Invalid tuning: {0}")]
    TuningError(String),

    /// Invalid selection, chord or technique option.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// Invalid tempo, time signature or timing change.
    ///
    /// # Example
    /// ```
    /// # use fretmap::TabError;
    /// let err = TabError::TimingError("tempo must be positive, got 0".to_string());
    /// assert_eq!(err.to_string(), "Invalid timing: tempo must be positive, got 0");
    /// ```
    #[error("Invalid timing: {0}")]
    TimingError(String),

    /// Malformed input note, identified by its position in the input slice.
    ///
    /// # Example
    /// ```
    /// # use fretmap::TabError;
    /// let err = TabError::InvalidNote {
    ///     index: 3,
    ///     message: "end time 1.0 is not after start time 1.0".to_string(),
    /// };
    /// assert_eq!(
    ///     err.to_string(),
    ///     "Invalid note at index 3: end time 1.0 is not after start time 1.0"
    /// );
    /// ```
    #[error("Invalid note at index {index}: {message}")]
    InvalidNote { index: usize, message: String },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}
