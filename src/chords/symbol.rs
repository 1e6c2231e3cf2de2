//! Chord symbol identification
//!
//! Names a set of sounding pitches (C, Am, G7, Dm7, etc.) by matching its pitch
//! classes against common chord interval patterns.

use crate::types::PITCH_CLASS_NAMES;

/// Chord qualities as (suffix, intervals above the root).
/// Four-note qualities come first so a seventh chord is not named as its triad.
const QUALITIES: [(&str, &[u8]); 9] = [
    ("7", &[0, 4, 7, 10]),
    ("maj7", &[0, 4, 7, 11]),
    ("m7", &[0, 3, 7, 10]),
    ("", &[0, 4, 7]),
    ("m", &[0, 3, 7]),
    ("dim", &[0, 3, 6]),
    ("aug", &[0, 4, 8]),
    ("sus4", &[0, 5, 7]),
    ("sus2", &[0, 2, 7]),
];

/// Identify a chord symbol from MIDI pitches.
///
/// The lowest sounding pitch is tried as the root first, then the remaining
/// pitch classes in ascending order. An exact pitch-class match is preferred;
/// failing that, the largest pattern fully contained in the chord is used
/// (extra tones such as doubled or added notes are ignored).
///
/// # Examples
/// ```
/// use fretmap::chords::identify_chord_symbol;
///
/// assert_eq!(identify_chord_symbol(&[48, 52, 55]), Some("C".to_string()));
/// assert_eq!(identify_chord_symbol(&[45, 52, 57, 60, 64]), Some("Am".to_string()));
/// assert_eq!(identify_chord_symbol(&[43, 47, 50, 53]), Some("G7".to_string()));
/// assert_eq!(identify_chord_symbol(&[60, 61]), None);
/// ```
pub fn identify_chord_symbol(pitches: &[u8]) -> Option<String> {
    let bass = *pitches.iter().min()?;
    let mut classes: Vec<u8> = pitches.iter().map(|p| p % 12).collect();
    classes.sort_unstable();
    classes.dedup();

    let bass_class = bass % 12;
    let roots: Vec<u8> = std::iter::once(bass_class)
        .chain(classes.iter().copied().filter(|&c| c != bass_class))
        .collect();

    let intervals_from = |root: u8| -> Vec<u8> {
        let mut intervals: Vec<u8> = classes.iter().map(|&c| (c + 12 - root) % 12).collect();
        intervals.sort_unstable();
        intervals
    };

    // Exact match
    for &root in &roots {
        let intervals = intervals_from(root);
        for (suffix, pattern) in QUALITIES {
            if intervals.as_slice() == pattern {
                return Some(format!("{}{}", PITCH_CLASS_NAMES[root as usize], suffix));
            }
        }
    }

    // Largest contained pattern
    let mut best: Option<(usize, String)> = None;
    for &root in &roots {
        let intervals = intervals_from(root);
        for (suffix, pattern) in QUALITIES {
            let contained = pattern.iter().all(|i| intervals.contains(i));
            let better = best.as_ref().map_or(true, |(size, _)| pattern.len() > *size);
            if contained && better {
                best = Some((
                    pattern.len(),
                    format!("{}{}", PITCH_CLASS_NAMES[root as usize], suffix),
                ));
            }
        }
    }
    best.map(|(_, symbol)| symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chord_identification() {
        // Major triads
        assert_eq!(identify_chord_symbol(&[60, 64, 67]), Some("C".to_string()));
        assert_eq!(identify_chord_symbol(&[54, 58, 61]), Some("F#".to_string()));

        // Minor triad in open position: A E A C E
        assert_eq!(identify_chord_symbol(&[45, 52, 57, 60, 64]), Some("Am".to_string()));

        // Sevenths
        assert_eq!(identify_chord_symbol(&[48, 52, 55, 59]), Some("Cmaj7".to_string()));
        assert_eq!(identify_chord_symbol(&[50, 53, 57, 60]), Some("Dm7".to_string()));

        // Sus and altered triads
        assert_eq!(identify_chord_symbol(&[50, 55, 57]), Some("Dsus4".to_string()));
        assert_eq!(identify_chord_symbol(&[59, 62, 65]), Some("Bdim".to_string()));
    }

    #[test]
    fn test_bass_note_picks_root() {
        // C E G with E in the bass still spells a C triad
        assert_eq!(identify_chord_symbol(&[52, 55, 60]), Some("C".to_string()));
        // C D G: sus2 on C when C is the bass
        assert_eq!(identify_chord_symbol(&[48, 50, 55]), Some("Csus2".to_string()));
    }

    #[test]
    fn test_added_tone_falls_back_to_contained_pattern() {
        // C D E G (Cadd9) has no exact pattern; the contained triad names it
        assert_eq!(identify_chord_symbol(&[48, 50, 52, 55]), Some("C".to_string()));
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(identify_chord_symbol(&[]), None);
        assert_eq!(identify_chord_symbol(&[60, 61, 62]), None);
    }
}
