//! # Position Selector
//!
//! Picks one fretboard position for every playable note, walking the notes in
//! time order and looking back exactly one note.
//!
//! ## Cost Function
//! For each candidate `P`, with `P_prev` the position chosen for the previous
//! playable note:
//! ```text
//! cost(P) = string_move * |string(P) - string(P_prev)|
//!         + fret_move   * |fret(P) - fret(P_prev)|
//!         - open_string * [prefer_open_strings && fret(P) == 0]
//!         + low_fret    * [prefer_low_positions] * fret(P) / 12
//!         + difficulty  * difficulty(P)
//!         + span        * max(0, |fret(P) - fret(P_prev)| - max_fret_span)   (fretted P only)
//! ```
//! The cheapest candidate wins; ties go to the lowest string index, then the
//! lowest fret. The first playable note has no history and is chosen by
//! preference alone (see [`PositionSelector::initial_choice`]).
//!
//! ## Candidate Filters
//! Before costing, candidates above `max_position` (fretted only) or harder
//! than `difficulty_threshold` are removed. If that removes everything, the
//! full candidate set is used instead: a preference never discards a playable
//! note. Candidates on a string already used by a simultaneous note are removed
//! last, with the same fallback, so chord members land on distinct strings.
//!
//! ## Unplayable Notes
//! A note with no candidates is skipped, logged, and reported as an
//! [`UnplayableNote`]. It does not reset the playing history.

use crate::document::{TabNote, UnplayableNote};
use crate::error::TabError;
use crate::resolver::PositionResolver;
use crate::tuning::TuningProfile;
use crate::types::{FretPosition, Note};
use tracing::{debug, warn};

/// Weights of the selection cost terms
#[derive(Debug, Clone, PartialEq)]
pub struct CostWeights {
    pub string_move: f64,
    pub fret_move: f64,
    pub open_string: f64,
    pub low_fret: f64,
    pub difficulty: f64,
    pub span: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            string_move: 3.0,
            fret_move: 1.0,
            open_string: 2.0,
            low_fret: 1.0,
            difficulty: 2.0,
            span: 5.0,
        }
    }
}

impl CostWeights {
    fn validate(&self) -> Result<(), TabError> {
        let named = [
            ("string-move", self.string_move),
            ("fret-move", self.fret_move),
            ("open-string", self.open_string),
            ("low-fret", self.low_fret),
            ("difficulty", self.difficulty),
            ("span", self.span),
        ];
        for (name, weight) in named {
            if !weight.is_finite() || weight < 0.0 {
                return Err(TabError::ConfigError(format!(
                    "weight {} must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        Ok(())
    }
}

/// Preferences and thresholds for position selection
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionOptions {
    pub max_fret_span: u8,
    pub prefer_open_strings: bool,
    pub prefer_low_positions: bool,
    pub max_position: Option<u8>,         // highest preferred fret for fretted notes
    pub difficulty_threshold: Option<f64>, // 0-1, harder candidates are filtered
    pub home_fret: u8,                    // first-note target when no preference is set
    pub weights: CostWeights,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            max_fret_span: 4,
            prefer_open_strings: true,
            prefer_low_positions: true,
            max_position: None,
            difficulty_threshold: None,
            home_fret: 6,
            weights: CostWeights::default(),
        }
    }
}

impl SelectionOptions {
    pub fn validate(&self) -> Result<(), TabError> {
        if let Some(threshold) = self.difficulty_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(TabError::ConfigError(format!(
                    "difficulty-threshold must be between 0 and 1, got {}",
                    threshold
                )));
            }
        }
        self.weights.validate()
    }
}

/// How hard a position is to fret, from 0 (open string) to 1.
///
/// Rises with fret height, with extra weight above the 12th fret, on the two
/// outermost strings, and for frets above 15 on the lower half of the strings.
pub fn difficulty(position: FretPosition, tuning: &TuningProfile) -> f64 {
    if position.is_open() {
        return 0.0;
    }
    let fret = position.fret as f64;
    let mut difficulty = fret / 24.0 * 0.3;

    if position.fret > 12 {
        difficulty += (fret - 12.0) / 12.0 * 0.3;
    }
    if tuning.is_outer_string(position.string_index) {
        difficulty += 0.1;
    }
    if position.fret > 15 && tuning.is_low_string(position.string_index) {
        difficulty += 0.2;
    }

    difficulty.min(1.0)
}

/// Strings already taken by notes starting together
#[derive(Debug, Default)]
struct SimultaneousCluster {
    anchor: Option<f64>,
    strings: Vec<usize>,
}

impl SimultaneousCluster {
    /// Start a new cluster unless `start_time` is within `tolerance` of the anchor
    fn advance(&mut self, start_time: f64, tolerance: f64) {
        match self.anchor {
            Some(anchor) if (start_time - anchor).abs() <= tolerance => {}
            _ => {
                self.anchor = Some(start_time);
                self.strings.clear();
            }
        }
    }
}

/// Output of a selection pass
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub notes: Vec<TabNote>,
    pub warnings: Vec<UnplayableNote>,
}

/// Causal, one-step-lookback position chooser
#[derive(Debug)]
pub struct PositionSelector<'a> {
    resolver: &'a PositionResolver,
    options: &'a SelectionOptions,
    simultaneity_tolerance: f64,
}

impl<'a> PositionSelector<'a> {
    pub fn new(
        resolver: &'a PositionResolver,
        options: &'a SelectionOptions,
        simultaneity_tolerance: f64,
    ) -> Self {
        Self {
            resolver,
            options,
            simultaneity_tolerance,
        }
    }

    /// Choose positions for time-ordered notes
    pub fn select(&self, notes: &[Note]) -> Selection {
        let mut selection = Selection::default();
        let mut previous: Option<FretPosition> = None;
        let mut cluster = SimultaneousCluster::default();

        for note in notes {
            let candidates = self.resolver.candidates(note.pitch);
            if candidates.is_empty() {
                warn!(
                    pitch = note.pitch,
                    start_time = note.start_time,
                    range = ?self.resolver.playable_range(),
                    "note out of range for tuning, dropped"
                );
                selection.warnings.push(UnplayableNote {
                    pitch: note.pitch,
                    start_time: note.start_time,
                });
                continue;
            }

            cluster.advance(note.start_time, self.simultaneity_tolerance);
            let pool = self.candidate_pool(candidates, &cluster.strings);
            let chosen = match previous {
                None => self.initial_choice(&pool),
                Some(prev) => self.cheapest(&pool, prev),
            };

            debug!(
                pitch = note.pitch,
                start_time = note.start_time,
                string = chosen.string_index,
                fret = chosen.fret,
                "selected position"
            );

            cluster.strings.push(chosen.string_index);
            let alternatives = candidates
                .iter()
                .copied()
                .filter(|&p| p != chosen)
                .collect();
            selection.notes.push(TabNote::new(
                note.clone(),
                chosen,
                alternatives,
                difficulty(chosen, self.resolver.tuning()),
            ));
            previous = Some(chosen);
        }

        selection
    }

    /// Apply preference filters, then the distinct-string filter, falling back
    /// a step whenever a filter leaves nothing
    fn candidate_pool(&self, candidates: &[FretPosition], taken: &[usize]) -> Vec<FretPosition> {
        let tuning = self.resolver.tuning();
        let preferred: Vec<FretPosition> = candidates
            .iter()
            .copied()
            .filter(|p| match self.options.max_position {
                Some(max) => p.is_open() || p.fret <= max,
                None => true,
            })
            .filter(|&p| match self.options.difficulty_threshold {
                Some(threshold) => difficulty(p, tuning) <= threshold,
                None => true,
            })
            .collect();
        let preferred = if preferred.is_empty() {
            candidates.to_vec()
        } else {
            preferred
        };

        let free: Vec<FretPosition> = preferred
            .iter()
            .copied()
            .filter(|p| !taken.contains(&p.string_index))
            .collect();
        if free.is_empty() {
            preferred
        } else {
            free
        }
    }

    /// Selection cost of `candidate` after playing `previous`
    pub fn cost(&self, candidate: FretPosition, previous: FretPosition) -> f64 {
        let options = self.options;
        let weights = &options.weights;
        let string_move = candidate.string_index.abs_diff(previous.string_index) as f64;
        let fret_move = candidate.fret.abs_diff(previous.fret);

        let mut cost = weights.string_move * string_move + weights.fret_move * fret_move as f64;

        if options.prefer_open_strings && candidate.is_open() {
            cost -= weights.open_string;
        }
        if options.prefer_low_positions {
            cost += weights.low_fret * candidate.fret as f64 / 12.0;
        }
        cost += weights.difficulty * difficulty(candidate, self.resolver.tuning());

        if !candidate.is_open() && fret_move > options.max_fret_span {
            cost += weights.span * (fret_move - options.max_fret_span) as f64;
        }

        cost
    }

    /// Cheapest candidate relative to `previous`; ties by string, then fret
    fn cheapest(&self, pool: &[FretPosition], previous: FretPosition) -> FretPosition {
        pool.iter()
            .map(|&p| (self.cost(p, previous), p))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
            .map(|(_, p)| p)
            .unwrap_or(previous)
    }

    /// Choice for a note with no playing history.
    ///
    /// - `prefer_low_positions`: the lowest fret
    /// - else `prefer_open_strings`: an open string, if any
    /// - otherwise: the fret nearest `home_fret`
    pub fn initial_choice(&self, pool: &[FretPosition]) -> FretPosition {
        let options = self.options;
        let by_key = |key: &dyn Fn(&FretPosition) -> u8| {
            pool.iter().copied().min_by_key(|p| (key(p), *p))
        };

        let choice = if options.prefer_low_positions {
            by_key(&|p| p.fret)
        } else if options.prefer_open_strings && pool.iter().any(|p| p.is_open()) {
            by_key(&|p| if p.is_open() { 0 } else { 1 })
        } else {
            by_key(&|p| p.fret.abs_diff(options.home_fret))
        };
        choice.unwrap_or(FretPosition::new(0, 0))
    }
}
