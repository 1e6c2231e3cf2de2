//! # Configuration
//!
//! Run options for one conversion, validated before any note is processed.
//!
//! ## Two Layers
//! - [`TabConfig`] - validated options, built in code or from YAML
//! - [`RawTabConfig`] - kebab-case YAML twin; every key optional, integers read
//!   wide so negative values produce a clear error instead of a parse failure
//!
//! ## YAML Keys
//! ```yaml
//! tuning: drop-d            # preset name, or open pitches lowest first: [38, 45, 50, 55, 59, 64]
//! capo: 2
//! fret-ceiling: 22
//! max-fret-span: 4
//! prefer-open-strings: true
//! prefer-low-positions: true
//! max-position: 12          # fretted candidates above are skipped when possible
//! difficulty-threshold: 0.7 # 0-1
//! home-fret: 6
//! weights:
//!   string-move: 3
//!   span: 5
//! detect-chords: true
//! chord-time-tolerance: 0.05
//! min-chord-size: 3
//! detect-techniques: true
//! legato-max-gap: 0.1
//! slide-max-gap: 0.2
//! palm-mute-velocity: 40
//! harmonic-velocity: 100
//! harmonic-frets: [3, 4, 5, 7, 12]
//! tempo: 120
//! time-signature: 4/4
//! changes:
//!   - at: 8.0
//!     tempo: 90
//!   - at: 16.0
//!     time-signature: 3/4
//! ```
//!
//! ## Example
//! ```rust
//! use fretmap::TabConfig;
//!
//! let config = TabConfig::from_yaml("tuning: drop-d\ncapo: 2\ntime-signature: 3/4").unwrap();
//! assert_eq!(config.tuning.open_pitches()[0], 38);
//! assert_eq!(config.tuning.capo(), 2);
//! assert_eq!(config.timing.time_signature.beats, 3);
//! ```

use crate::chords::ChordOptions;
use crate::error::TabError;
use crate::measure::{Timing, TimingChange};
use crate::selector::{CostWeights, SelectionOptions};
use crate::technique::TechniqueThresholds;
use crate::tuning::{TuningPreset, TuningProfile, DEFAULT_FRET_CEILING};
use crate::types::{TimeSignature, MIDI_MAX};
use serde::Deserialize;

/// Validated options for one conversion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TabConfig {
    pub tuning: TuningProfile,
    pub selection: SelectionOptions,
    pub chords: ChordOptions,
    pub techniques: TechniqueThresholds,
    pub timing: Timing,
}

impl TabConfig {
    /// Default options on another tuning
    pub fn with_tuning(tuning: TuningProfile) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    /// Parse and validate a YAML configuration. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, TabError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawTabConfig = serde_yaml::from_str(yaml)?;
        let config = raw.into_config()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TabError> {
        self.selection.validate()?;
        self.chords.validate()?;
        self.techniques.validate()?;
        self.timing.validate()
    }
}

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawTabConfig {
    pub tuning: Option<RawTuning>,
    pub capo: Option<i64>,
    pub fret_ceiling: Option<i64>,
    pub max_fret_span: Option<i64>,
    pub prefer_open_strings: Option<bool>,
    pub prefer_low_positions: Option<bool>,
    pub max_position: Option<i64>,
    pub difficulty_threshold: Option<f64>,
    pub home_fret: Option<i64>,
    pub weights: Option<RawWeights>,
    pub detect_chords: Option<bool>,
    pub chord_time_tolerance: Option<f64>,
    pub min_chord_size: Option<i64>,
    pub detect_techniques: Option<bool>,
    pub legato_max_gap: Option<f64>,
    pub slide_max_gap: Option<f64>,
    pub palm_mute_velocity: Option<i64>,
    pub harmonic_velocity: Option<i64>,
    pub harmonic_frets: Option<Vec<i64>>,
    pub tempo: Option<f64>,
    pub time_signature: Option<String>, // "N/D"
    pub changes: Option<Vec<RawTimingChange>>,
}

/// Preset name or explicit open pitches
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum RawTuning {
    Preset(String),
    Pitches(Vec<i64>),
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawWeights {
    pub string_move: Option<f64>,
    pub fret_move: Option<f64>,
    pub open_string: Option<f64>,
    pub low_fret: Option<f64>,
    pub difficulty: Option<f64>,
    pub span: Option<f64>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RawTimingChange {
    pub at: f64,
    pub tempo: Option<f64>,
    pub time_signature: Option<String>,
}

/// Narrow a YAML integer to `0..=max`
fn int_in_range(
    key: &str,
    value: i64,
    max: u8,
    error: fn(String) -> TabError,
) -> Result<u8, TabError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or_else(|| error(format!("{} must be between 0 and {}, got {}", key, max, value)))
}

fn parse_time_signature(s: &str) -> Result<TimeSignature, TabError> {
    TimeSignature::from_str(s)
        .ok_or_else(|| TabError::TimingError(format!("Invalid time signature: {}", s)))
}

impl RawTabConfig {
    pub fn into_config(self) -> Result<TabConfig, TabError> {
        let defaults = TabConfig::default();
        Ok(TabConfig {
            tuning: self.tuning_profile()?,
            selection: self.selection(defaults.selection)?,
            chords: self.chords(defaults.chords)?,
            techniques: self.techniques(defaults.techniques)?,
            timing: self.timing(defaults.timing)?,
        })
    }

    fn tuning_profile(&self) -> Result<TuningProfile, TabError> {
        let open_pitches = match &self.tuning {
            None => TuningPreset::Standard.open_pitches().to_vec(),
            Some(RawTuning::Preset(name)) => TuningPreset::from_str(name)
                .ok_or_else(|| TabError::TuningError(format!("Unknown tuning preset: {}", name)))?
                .open_pitches()
                .to_vec(),
            Some(RawTuning::Pitches(pitches)) => pitches
                .iter()
                .map(|&p| int_in_range("tuning pitch", p, MIDI_MAX, TabError::TuningError))
                .collect::<Result<Vec<u8>, _>>()?,
        };
        let capo = match self.capo {
            Some(capo) => int_in_range("capo", capo, MIDI_MAX, TabError::TuningError)?,
            None => 0,
        };
        let fret_ceiling = match self.fret_ceiling {
            Some(ceiling) => int_in_range("fret-ceiling", ceiling, MIDI_MAX, TabError::TuningError)?,
            None => DEFAULT_FRET_CEILING,
        };
        TuningProfile::new(open_pitches, capo, fret_ceiling)
    }

    fn selection(&self, defaults: SelectionOptions) -> Result<SelectionOptions, TabError> {
        let fret = |key: &str, value: Option<i64>| -> Result<Option<u8>, TabError> {
            value
                .map(|v| int_in_range(key, v, MIDI_MAX, TabError::ConfigError))
                .transpose()
        };

        let weights = match &self.weights {
            Some(raw) => {
                let base = defaults.weights.clone();
                CostWeights {
                    string_move: raw.string_move.unwrap_or(base.string_move),
                    fret_move: raw.fret_move.unwrap_or(base.fret_move),
                    open_string: raw.open_string.unwrap_or(base.open_string),
                    low_fret: raw.low_fret.unwrap_or(base.low_fret),
                    difficulty: raw.difficulty.unwrap_or(base.difficulty),
                    span: raw.span.unwrap_or(base.span),
                }
            }
            None => defaults.weights.clone(),
        };

        Ok(SelectionOptions {
            max_fret_span: fret("max-fret-span", self.max_fret_span)?.unwrap_or(defaults.max_fret_span),
            prefer_open_strings: self.prefer_open_strings.unwrap_or(defaults.prefer_open_strings),
            prefer_low_positions: self.prefer_low_positions.unwrap_or(defaults.prefer_low_positions),
            max_position: fret("max-position", self.max_position)?.or(defaults.max_position),
            difficulty_threshold: self.difficulty_threshold.or(defaults.difficulty_threshold),
            home_fret: fret("home-fret", self.home_fret)?.unwrap_or(defaults.home_fret),
            weights,
        })
    }

    fn chords(&self, defaults: ChordOptions) -> Result<ChordOptions, TabError> {
        let min_chord_size = match self.min_chord_size {
            Some(size) if size < 0 => {
                return Err(TabError::ConfigError(format!(
                    "min-chord-size must be at least 2, got {}",
                    size
                )))
            }
            Some(size) => size as usize,
            None => defaults.min_chord_size,
        };
        Ok(ChordOptions {
            enabled: self.detect_chords.unwrap_or(defaults.enabled),
            time_tolerance: self.chord_time_tolerance.unwrap_or(defaults.time_tolerance),
            min_chord_size,
        })
    }

    fn techniques(&self, defaults: TechniqueThresholds) -> Result<TechniqueThresholds, TabError> {
        let velocity = |key: &str, value: Option<i64>, default: u8| -> Result<u8, TabError> {
            match value {
                Some(v) => int_in_range(key, v, MIDI_MAX, TabError::ConfigError),
                None => Ok(default),
            }
        };
        let harmonic_frets = match &self.harmonic_frets {
            Some(frets) => frets
                .iter()
                .map(|&f| int_in_range("harmonic-frets", f, MIDI_MAX, TabError::ConfigError))
                .collect::<Result<Vec<u8>, _>>()?,
            None => defaults.harmonic_frets,
        };
        Ok(TechniqueThresholds {
            enabled: self.detect_techniques.unwrap_or(defaults.enabled),
            legato_max_gap: self.legato_max_gap.unwrap_or(defaults.legato_max_gap),
            slide_max_gap: self.slide_max_gap.unwrap_or(defaults.slide_max_gap),
            palm_mute_velocity: velocity(
                "palm-mute-velocity",
                self.palm_mute_velocity,
                defaults.palm_mute_velocity,
            )?,
            harmonic_velocity: velocity(
                "harmonic-velocity",
                self.harmonic_velocity,
                defaults.harmonic_velocity,
            )?,
            harmonic_frets,
        })
    }

    fn timing(&self, defaults: Timing) -> Result<Timing, TabError> {
        let time_signature = match &self.time_signature {
            Some(ts) => parse_time_signature(ts)?,
            None => defaults.time_signature,
        };
        let changes = match &self.changes {
            Some(changes) => changes
                .iter()
                .map(|change| {
                    Ok(TimingChange {
                        at: change.at,
                        tempo: change.tempo,
                        time_signature: change
                            .time_signature
                            .as_deref()
                            .map(parse_time_signature)
                            .transpose()?,
                    })
                })
                .collect::<Result<Vec<_>, TabError>>()?,
            None => defaults.changes,
        };
        Ok(Timing {
            tempo: self.tempo.unwrap_or(defaults.tempo),
            time_signature,
            changes,
        })
    }
}
