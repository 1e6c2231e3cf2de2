//! Chord shape templates and matching
//!
//! A template is the set of (string, fret) positions of a common fingering.
//! A chord matches a template when its positions equal the template after
//! moving every fretted template position up by the same number of frets
//! (barre transposition). Open strings in a template stay open.

use crate::types::FretPosition;
use serde::Serialize;

/// Shape classification of a chord
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChordShape {
    /// No template and no common barre fret
    Unlabeled,
    /// A library template, moved up `offset` frets
    Named { name: String, offset: u8 },
    /// Every fretted note on one fret
    Barre { fret: u8 },
}

impl ChordShape {
    pub fn is_labeled(&self) -> bool {
        !matches!(self, ChordShape::Unlabeled)
    }

    /// Display name, e.g. "C", "E shape +2", "Barre 5"
    pub fn name(&self) -> Option<String> {
        match self {
            ChordShape::Unlabeled => None,
            ChordShape::Named { name, offset: 0 } => Some(name.clone()),
            ChordShape::Named { name, offset } => Some(format!("{} shape +{}", name, offset)),
            ChordShape::Barre { fret } => Some(format!("Barre {}", fret)),
        }
    }
}

/// One named fingering
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTemplate {
    pub name: String,
    pub positions: Vec<FretPosition>,
}

impl ShapeTemplate {
    pub fn new(name: &str, positions: &[(usize, u8)]) -> Self {
        Self {
            name: name.to_string(),
            positions: positions
                .iter()
                .map(|&(string, fret)| FretPosition::new(string, fret))
                .collect(),
        }
    }

    /// Barre offset at which this template reproduces `positions` exactly
    pub fn match_offset(&self, positions: &[FretPosition]) -> Option<u8> {
        if positions.len() != self.positions.len() {
            return None;
        }
        let lowest_fretted = |ps: &[FretPosition]| ps.iter().filter(|p| !p.is_open()).map(|p| p.fret).min();

        let offset = match (lowest_fretted(positions), lowest_fretted(&self.positions)) {
            (Some(chord), Some(template)) => chord.checked_sub(template)?,
            (None, None) => 0,
            _ => return None,
        };

        let all_present = self.positions.iter().all(|t| {
            let moved = if t.is_open() {
                *t
            } else {
                FretPosition::new(t.string_index, t.fret.saturating_add(offset))
            };
            positions.contains(&moved)
        });
        // Equal sizes and distinct strings make containment equality
        all_present.then_some(offset)
    }
}

/// Ordered collection of templates for one string count
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeLibrary {
    string_count: usize,
    templates: Vec<ShapeTemplate>,
}

impl ShapeLibrary {
    pub fn new(string_count: usize, templates: Vec<ShapeTemplate>) -> Self {
        Self {
            string_count,
            templates,
        }
    }

    /// Open-position shapes for a six-string guitar, string 0 = low E
    pub fn standard_guitar() -> Self {
        let templates = vec![
            // Major
            ShapeTemplate::new("C", &[(1, 3), (2, 2), (3, 0), (4, 1), (5, 0)]),
            ShapeTemplate::new("G", &[(0, 3), (1, 2), (2, 0), (3, 0), (4, 0), (5, 3)]),
            ShapeTemplate::new("D", &[(2, 0), (3, 2), (4, 3), (5, 2)]),
            ShapeTemplate::new("A", &[(1, 0), (2, 2), (3, 2), (4, 2), (5, 0)]),
            ShapeTemplate::new("E", &[(0, 0), (1, 2), (2, 2), (3, 1), (4, 0), (5, 0)]),
            ShapeTemplate::new("F", &[(0, 1), (1, 3), (2, 3), (3, 2), (4, 1), (5, 1)]),
            // Minor
            ShapeTemplate::new("Am", &[(1, 0), (2, 2), (3, 2), (4, 1), (5, 0)]),
            ShapeTemplate::new("Em", &[(0, 0), (1, 2), (2, 2), (3, 0), (4, 0), (5, 0)]),
            ShapeTemplate::new("Dm", &[(2, 0), (3, 2), (4, 3), (5, 1)]),
            // Dominant 7th
            ShapeTemplate::new("G7", &[(0, 3), (1, 2), (2, 0), (3, 0), (4, 0), (5, 1)]),
            ShapeTemplate::new("C7", &[(1, 3), (2, 2), (3, 3), (4, 1), (5, 0)]),
            ShapeTemplate::new("D7", &[(2, 0), (3, 2), (4, 1), (5, 2)]),
        ];
        Self::new(6, templates)
    }

    pub fn string_count(&self) -> usize {
        self.string_count
    }

    pub fn templates(&self) -> &[ShapeTemplate] {
        &self.templates
    }

    /// Classify chord positions: first matching template, else a common
    /// barre fret, else unlabeled. Templates only apply to instruments with
    /// the library's string count.
    pub fn classify(&self, positions: &[FretPosition], string_count: usize) -> ChordShape {
        if string_count == self.string_count {
            for template in &self.templates {
                if let Some(offset) = template.match_offset(positions) {
                    return ChordShape::Named {
                        name: template.name.clone(),
                        offset,
                    };
                }
            }
        }

        let fretted: Vec<u8> = positions
            .iter()
            .filter(|p| !p.is_open())
            .map(|p| p.fret)
            .collect();
        match fretted.first() {
            Some(&first) if fretted.iter().all(|&f| f == first) => ChordShape::Barre { fret: first },
            _ => ChordShape::Unlabeled,
        }
    }
}

impl Default for ShapeLibrary {
    fn default() -> Self {
        Self::standard_guitar()
    }
}
