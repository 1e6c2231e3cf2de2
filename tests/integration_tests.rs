//! Integration tests for the fretboard mapping engine
//!
//! Tests the full conversion pipeline from a note stream to a tab document.

use fretmap::technique::TechniqueClassifier;
use fretmap::{
    convert, convert_yaml, Articulation, ChordShape, FretPosition, Note, TabConfig, TabConverter,
    TabError, TabEvent, TabNote, TechniqueThresholds, TuningPreset, TuningProfile,
};

fn converter() -> TabConverter {
    TabConverter::new(TabConfig::default()).unwrap()
}

/// A stream of single notes, 300 ms apart, walking up and down two octaves
fn melody(len: usize) -> Vec<Note> {
    (0..len)
        .map(|i| {
            let start = i as f64 * 0.3;
            Note::new(40 + (i * 7 % 30) as u8, start, start + 0.25, 70 + (i % 40) as u8)
        })
        .collect()
}

#[test]
fn test_open_high_e_for_e4() {
    let document = converter().convert(&[Note::new(64, 0.0, 0.5, 80)]).unwrap();
    let note = document.tab_notes().next().unwrap();
    assert_eq!(note.position, FretPosition::new(5, 0));
    assert!(note.alternatives.contains(&FretPosition::new(4, 5)));
    assert_eq!(note.difficulty, 0.0);
}

#[test]
fn test_unplayable_note_becomes_warning() {
    let document = converter().convert(&[Note::new(28, 0.0, 0.5, 80)]).unwrap();
    assert_eq!(document.tab_notes().count(), 0);
    assert_eq!(document.warnings.len(), 1);
    assert_eq!(document.warnings[0].pitch, 28);
    assert_eq!(document.warnings[0].start_time, 0.0);
    assert!(document.measures.is_empty());
}

#[test]
fn test_simultaneous_triad_is_one_chord() {
    let notes = vec![
        Note::new(60, 2.0, 3.0, 80),
        Note::new(64, 2.0, 3.0, 80),
        Note::new(67, 2.0, 3.0, 80),
    ];
    let document = converter().convert(&notes).unwrap();

    let chords: Vec<_> = document.chords().collect();
    assert_eq!(chords.len(), 1);
    assert_eq!(chords[0].notes.len(), 3);
    assert_eq!(chords[0].symbol.as_deref(), Some("C"));

    // Measure 0 is silent, the chord sits in measure 1
    assert_eq!(document.measures.len(), 2);
    assert!(document.measures[0].is_empty());
    assert_eq!(document.measures[1].chords().count(), 1);
}

#[test]
fn test_open_c_chord_is_labeled() {
    let notes: Vec<Note> = [48, 52, 55, 60, 64]
        .iter()
        .map(|&pitch| Note::new(pitch, 0.0, 1.0, 80))
        .collect();
    let document = converter().convert(&notes).unwrap();

    let chord = document.chords().next().unwrap();
    assert_eq!(
        chord.positions(),
        vec![
            FretPosition::new(1, 3),
            FretPosition::new(2, 2),
            FretPosition::new(3, 0),
            FretPosition::new(4, 1),
            FretPosition::new(5, 0),
        ]
    );
    assert_eq!(
        chord.shape,
        ChordShape::Named {
            name: "C".to_string(),
            offset: 0
        }
    );
    assert_eq!(document.statistics.labeled_chords, 1);
}

#[test]
fn test_note_on_used_string_stays_single() {
    // E2 D3 G3 form the chord; F2 can only sit on the low string E2 already holds
    let notes = vec![
        Note::new(40, 0.0, 1.0, 80),
        Note::new(50, 0.0, 1.0, 80),
        Note::new(41, 0.0, 1.0, 80),
        Note::new(55, 0.0, 1.0, 80),
    ];
    let document = converter().convert(&notes).unwrap();

    let chords: Vec<_> = document.chords().collect();
    assert_eq!(chords.len(), 1);
    assert_eq!(chords[0].pitches(), vec![40, 50, 55]);
    assert_eq!(document.tab_notes().count(), 4);

    let events = &document.measures[0].events;
    assert_eq!(events.len(), 2);
    match &events[1] {
        TabEvent::Note(note) => {
            assert_eq!(note.note.pitch, 41);
            assert_eq!(note.position, FretPosition::new(0, 1));
        }
        TabEvent::Chord(_) => panic!("expected the F2 as a single note"),
    }
}

#[test]
fn test_measure_boundary_at_120_bpm() {
    let notes = vec![Note::new(64, 1.999, 2.1, 80), Note::new(67, 2.0, 2.5, 80)];
    let document = converter().convert(&notes).unwrap();

    assert_eq!(document.measures[0].duration, 2.0);
    let first: Vec<f64> = document.measures[0].notes().map(|n| n.start_time()).collect();
    let second: Vec<f64> = document.measures[1].notes().map(|n| n.start_time()).collect();
    assert_eq!(first, vec![1.999]);
    assert_eq!(second, vec![2.0]);
}

#[test]
fn test_pull_off_on_same_string() {
    // A4 then G4 on the high E string: fret 5, then fret 3 just after, softer
    let notes = vec![Note::new(69, 0.0, 0.5, 90), Note::new(67, 0.51, 1.0, 70)];
    let document = converter().convert(&notes).unwrap();
    let tab: Vec<&TabNote> = document.tab_notes().collect();

    assert_eq!(tab[0].position, FretPosition::new(5, 5));
    assert_eq!(tab[1].position, FretPosition::new(5, 3));
    assert_eq!(tab[1].technique.articulation, Some(Articulation::PullOff));
}

#[test]
fn test_hammer_on_on_same_string() {
    let notes = vec![Note::new(69, 0.0, 0.5, 90), Note::new(71, 0.53, 1.0, 70)];
    let document = converter().convert(&notes).unwrap();
    let tab: Vec<&TabNote> = document.tab_notes().collect();

    assert_eq!(tab[1].position, FretPosition::new(5, 7));
    assert_eq!(tab[1].technique.articulation, Some(Articulation::HammerOn));
    assert_eq!(tab[1].technique.notation(), "h");
}

#[test]
fn test_legato_pair_on_g_string() {
    let thresholds = TechniqueThresholds::default();
    let classifier = TechniqueClassifier::new(&thresholds);
    let low = TabNote::new(Note::new(60, 0.0, 0.5, 90), FretPosition::new(3, 5), vec![], 0.0);
    let high = TabNote::new(Note::new(62, 0.53, 1.0, 70), FretPosition::new(3, 7), vec![], 0.0);

    let up = classifier.classify(Some(&low), &high);
    assert_eq!(up.articulation, Some(Articulation::HammerOn));

    let mut reversed_high = high.clone();
    reversed_high.note = Note::new(62, 0.0, 0.5, 90);
    let mut reversed_low = low.clone();
    reversed_low.note = Note::new(60, 0.53, 1.0, 70);
    let down = classifier.classify(Some(&reversed_high), &reversed_low);
    assert_eq!(down.articulation, Some(Articulation::PullOff));
}

#[test]
fn test_every_note_accounted_for() {
    let mut notes = melody(24);
    notes.push(Note::new(20, 1.0, 1.2, 80));
    notes.push(Note::new(120, 2.0, 2.2, 80));

    let document = converter().convert(&notes).unwrap();
    assert_eq!(document.warnings.len(), 2);
    assert_eq!(document.tab_notes().count() + document.warnings.len(), notes.len());
    assert_eq!(document.statistics.total_notes, 24);
    assert_eq!(document.statistics.unplayable_notes, 2);
}

#[test]
fn test_positions_sound_the_input_pitch() {
    let tuning = TuningProfile::standard().with_capo(3).unwrap();
    let converter = TabConverter::new(TabConfig::with_tuning(tuning.clone())).unwrap();
    let document = converter.convert(&melody(30)).unwrap();

    for note in document.tab_notes() {
        assert_eq!(tuning.pitch_at(note.position), Some(note.note.pitch));
        assert!(note.position.fret <= tuning.fret_ceiling());
        for alternative in &note.alternatives {
            assert_eq!(tuning.pitch_at(*alternative), Some(note.note.pitch));
        }
    }
}

#[test]
fn test_conversion_is_idempotent() {
    let converter = converter();
    let notes = melody(40);
    assert_eq!(converter.convert(&notes).unwrap(), converter.convert(&notes).unwrap());
}

#[test]
fn test_measures_partition_time() {
    let notes = melody(40);
    let document = converter().convert(&notes).unwrap();

    assert_eq!(document.measures[0].start_time, 0.0);
    for pair in document.measures.windows(2) {
        assert_eq!(pair[0].end_time(), pair[1].start_time);
    }
    for measure in &document.measures {
        for note in measure.notes() {
            assert!(measure.contains(note.start_time()));
        }
    }

    let expected: Vec<f64> = notes.iter().map(|n| n.start_time).collect();
    let flattened: Vec<f64> = document.tab_notes().map(|n| n.start_time()).collect();
    assert_eq!(flattened, expected);

    let last_end = notes.iter().map(|n| n.end_time).fold(0.0, f64::max);
    assert!(document.measures.last().unwrap().end_time() >= last_end);
}

#[test]
fn test_parallel_conversions() {
    let converter = converter();
    let streams: Vec<Vec<Note>> = (10..14).map(melody).collect();
    let sequential: Vec<_> = streams
        .iter()
        .map(|notes| converter.convert(notes).unwrap())
        .collect();

    let shared = &converter;
    let parallel: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = streams
            .iter()
            .map(|notes| scope.spawn(move || shared.convert(notes).unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(parallel, sequential);
}

#[test]
fn test_capo_shifts_positions() {
    let config = TabConfig::with_tuning(TuningProfile::standard().with_capo(2).unwrap());
    let notes = vec![Note::new(66, 0.0, 0.5, 80), Note::new(41, 1.0, 1.5, 80)];
    let document = convert(&notes, &config).unwrap();

    let note = document.tab_notes().next().unwrap();
    assert_eq!(note.position, FretPosition::new(5, 0));
    // F2 is below the capoed low string
    assert_eq!(document.warnings.len(), 1);
    assert_eq!(document.capo(), 2);
}

#[test]
fn test_drop_d_low_string() {
    let config = TabConfig::with_tuning(TuningProfile::preset(TuningPreset::DropD));
    let document = convert(&[Note::new(38, 0.0, 1.0, 80)], &config).unwrap();
    assert_eq!(
        document.tab_notes().next().unwrap().position,
        FretPosition::new(0, 0)
    );
    assert_eq!(document.tuning_name, "D2-A2-D3-G3-B3-E4");
}

#[test]
fn test_yaml_tempo_change() {
    let yaml = r#"
tempo: 120
time-signature: 4/4
changes:
  - at: 4.0
    tempo: 60
"#;
    let notes = vec![
        Note::new(64, 0.0, 0.5, 80),
        Note::new(64, 3.5, 4.0, 80),
        Note::new(64, 5.0, 5.5, 80),
    ];
    let document = convert_yaml(&notes, yaml).unwrap();

    assert_eq!(document.measures.len(), 3);
    assert_eq!(document.measures[2].start_time, 4.0);
    assert_eq!(document.measures[2].tempo, 60.0);
    assert_eq!(document.measures[2].duration, 4.0);
    assert_eq!(document.measures[2].notes().count(), 1);
    assert_eq!(document.statistics.tempo, 120.0);
}

#[test]
fn test_disabled_chords_and_techniques() {
    let yaml = "detect-chords: false\ndetect-techniques: false";
    let notes = vec![
        Note::new(60, 0.0, 1.0, 80),
        Note::new(64, 0.0, 1.0, 80),
        Note::new(67, 0.0, 1.0, 30),
    ];
    let document = convert_yaml(&notes, yaml).unwrap();
    assert_eq!(document.chords().count(), 0);
    assert!(document.measures[0]
        .events
        .iter()
        .all(|e| matches!(e, TabEvent::Note(_))));
    assert!(document.tab_notes().all(|n| n.technique.is_normal()));
}

#[test]
fn test_empty_input() {
    let document = converter().convert(&[]).unwrap();
    assert!(document.measures.is_empty());
    assert!(document.warnings.is_empty());
    assert_eq!(document.statistics.total_notes, 0);
}

#[test]
fn test_invalid_note_rejected() {
    let notes = vec![Note::new(64, 0.0, 0.5, 80), Note::new(64, 1.0, 0.5, 80)];
    match converter().convert(&notes) {
        Err(TabError::InvalidNote { index, .. }) => assert_eq!(index, 1),
        other => panic!("expected InvalidNote, got {:?}", other),
    }
}

#[test]
fn test_invalid_configurations() {
    assert!(matches!(
        TabConverter::from_yaml("tuning: []"),
        Err(TabError::TuningError(_))
    ));
    assert!(matches!(
        TabConverter::from_yaml("capo: -2"),
        Err(TabError::TuningError(_))
    ));
    assert!(matches!(
        TabConverter::from_yaml("time-signature: four"),
        Err(TabError::TimingError(_))
    ));
    assert!(matches!(
        TabConverter::from_yaml("tempo: 0"),
        Err(TabError::TimingError(_))
    ));
    assert!(matches!(
        convert_yaml(&[Note::new(64, 0.0, 0.5, 80)], "tempo: 1.0e7"),
        Err(TabError::TimingError(_))
    ));
    assert!(matches!(
        TabConverter::from_yaml("tuning: ["),
        Err(TabError::ConfigParse(_))
    ));
}

#[test]
fn test_json_export() {
    let notes = vec![
        Note::new(60, 0.0, 1.0, 80),
        Note::new(64, 0.0, 1.0, 80),
        Note::new(67, 0.0, 1.0, 80),
        Note::new(28, 1.0, 1.5, 80),
    ];
    let document = converter().convert(&notes).unwrap();
    let json = document.to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["tuningName"], "E2-A2-D3-G3-B3-E4");
    assert_eq!(value["tuning"]["openPitches"][0], 40);
    assert_eq!(value["warnings"][0]["pitch"], 28);
    assert_eq!(value["statistics"]["detectedChords"], 1);

    let chord = &value["measures"][0]["events"][0];
    assert_eq!(chord["type"], "chord");
    assert_eq!(chord["symbol"], "C");
    assert_eq!(chord["notes"].as_array().map(|n| n.len()), Some(3));
    assert!(chord["shape"]["kind"].is_string());
}
