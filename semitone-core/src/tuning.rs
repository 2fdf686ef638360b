//! # Musical Tuning Module
//!
//! Equal-temperament calculations for the tuner: mapping a detected
//! frequency onto the nearest note, measuring the deviation in cents,
//! and looking notes up by their 88-key piano index.
//!
//! ## Features
//! - MIDI-based nearest-note mapping with A4 = 440 Hz
//! - Cent deviation calculations for tuning accuracy
//! - 88-key piano table (A0 to C8) for manual-target tuning
//! - Note name to key index conversions

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Concert pitch reference, A4.
pub const A4_FREQUENCY: f32 = 440.0;

/// MIDI note number of A4.
pub const A4_MIDI: i32 = 69;

/// Lowest frequency treated as on-instrument, A0.
pub const MIN_FREQUENCY: f32 = 27.5;

/// Highest frequency treated as on-instrument, C8.
pub const MAX_FREQUENCY: f32 = 4186.0;

/// Number of keys on a standard piano.
pub const PIANO_KEYS: u8 = 88;

// The 88-key range in MIDI note numbers: A0 is 21, C8 is 108.
const LOWEST_PIANO_MIDI: i32 = 21;
const HIGHEST_PIANO_MIDI: i32 = 108;

const PITCH_CLASSES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A detected frequency mapped onto the equal-tempered scale.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteInfo {
    /// Note name (pitch class + octave, e.g. "A4" or "C#3").
    pub name: String,
    /// MIDI note number of the nearest note.
    pub midi: i32,
    /// Exact equal-tempered frequency of the nearest note.
    pub target_frequency: f32,
    /// Signed deviation from the target, always in (-50, +50] cents.
    pub cents: f32,
    /// Piano key index (1-88) when the nearest note is on the keyboard.
    /// Absent means "valid pitch, outside the instrument range", which
    /// is distinct from no pitch at all.
    pub piano_key: Option<u8>,
}

/// A single musical note with its name and frequency.
#[derive(Debug, Clone)]
struct Note {
    name: String,
    frequency: f32,
}

/// Statically computed notes for a standard 88-key piano (A0 to C8),
/// indexed by key number minus one.
static NOTES: Lazy<Vec<Note>> = Lazy::new(|| {
    (LOWEST_PIANO_MIDI..=HIGHEST_PIANO_MIDI)
        .map(|midi| Note {
            name: note_name(midi),
            frequency: midi_frequency(midi),
        })
        .collect()
});

/// Static map for quick note name to key index lookups.
static KEY_BY_NAME: Lazy<BTreeMap<String, u8>> = Lazy::new(|| {
    NOTES
        .iter()
        .enumerate()
        .map(|(i, note)| (note.name.clone(), (i + 1) as u8))
        .collect()
});

/// Equal-tempered frequency of a MIDI note number.
///
/// Adjacent notes are spaced by a constant ratio of 2^(1/12), anchored
/// at A4 = 440 Hz = MIDI 69.
pub fn midi_frequency(midi: i32) -> f32 {
    A4_FREQUENCY * 2.0_f32.powf((midi - A4_MIDI) as f32 / 12.0)
}

/// Note name for a MIDI note number.
///
/// The pitch class cycles from C; the octave number changes at C, so
/// MIDI 60 is "C4" and MIDI 59 is "B3".
pub fn note_name(midi: i32) -> String {
    let class = PITCH_CLASSES[midi.rem_euclid(12) as usize];
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", class, octave)
}

/// Calculates the deviation of a frequency from a target in cents.
///
/// 100 cents is one semitone; positive values are sharp, negative flat.
pub fn cents_between(freq: f32, target: f32) -> f32 {
    1200.0 * (freq / target).log2()
}

/// Maps a frequency onto the nearest equal-tempered note.
///
/// Callers are expected to filter to [`MIN_FREQUENCY`, `MAX_FREQUENCY`]
/// first; for frequencies outside the 88-key range the mapping is still
/// produced but `piano_key` is absent.
///
/// # Arguments
/// * `frequency` - A finite, positive frequency in Hz
pub fn map_to_note(frequency: f32) -> NoteInfo {
    let float_midi = A4_MIDI as f32 + 12.0 * (frequency / A4_FREQUENCY).log2();
    let midi = float_midi.round() as i32;
    let target_frequency = midi_frequency(midi);
    let cents = cents_between(frequency, target_frequency);

    let piano_key = if (LOWEST_PIANO_MIDI..=HIGHEST_PIANO_MIDI).contains(&midi) {
        Some((midi - (LOWEST_PIANO_MIDI - 1)) as u8)
    } else {
        None
    };

    NoteInfo {
        name: note_name(midi),
        midi,
        target_frequency,
        cents,
        piano_key,
    }
}

/// Note name and target frequency for a piano key index (1-88).
///
/// Key 1 is A0, key 49 is A4, key 88 is C8. Out-of-range indices
/// return `None`.
pub fn note_for_key(key: u8) -> Option<(String, f32)> {
    if key == 0 || key > PIANO_KEYS {
        return None;
    }
    let note = &NOTES[(key - 1) as usize];
    Some((note.name.clone(), note.frequency))
}

/// Piano key index (1-88) for a note name such as "A4" or "C#3".
pub fn key_for_name(name: &str) -> Option<u8> {
    KEY_BY_NAME.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_maps_exactly() {
        let info = map_to_note(440.0);
        assert_eq!(info.name, "A4");
        assert_eq!(info.midi, 69);
        assert_eq!(info.piano_key, Some(49));
        assert!(info.cents.abs() < 0.01, "cents was {}", info.cents);
        assert!((info.target_frequency - 440.0).abs() < 1e-3);
    }

    #[test]
    fn test_middle_c() {
        let info = map_to_note(261.63);
        assert_eq!(info.name, "C4");
        assert_eq!(info.piano_key, Some(40));
        assert!(info.cents.abs() < 0.5, "cents was {}", info.cents);
    }

    #[test]
    fn test_keyboard_endpoints() {
        let low = map_to_note(MIN_FREQUENCY);
        assert_eq!(low.name, "A0");
        assert_eq!(low.piano_key, Some(1));

        let high = map_to_note(MAX_FREQUENCY);
        assert_eq!(high.name, "C8");
        assert_eq!(high.piano_key, Some(88));
    }

    #[test]
    fn test_above_keyboard_has_no_key() {
        let info = map_to_note(20_000.0);
        assert_eq!(info.piano_key, None);
    }

    #[test]
    fn test_below_keyboard_has_no_key() {
        let info = map_to_note(10.0);
        assert_eq!(info.piano_key, None);
    }

    #[test]
    fn test_cents_bounded_and_note_stable() {
        // Sweep a few octaves in fifth-of-a-semitone steps, staying off
        // the exact half-semitone boundary where rounding direction is a
        // coin toss; the deviation must stay within half a semitone and
        // the target frequency must map back to the same note.
        for step in 0..(4 * 12 * 5) {
            let frequency = 55.0 * 2.0_f32.powf(step as f32 / 60.0);
            let info = map_to_note(frequency);
            assert!(
                info.cents > -50.0 && info.cents <= 50.0,
                "{frequency} Hz deviated by {} cents",
                info.cents
            );
            let round_trip = map_to_note(info.target_frequency);
            assert_eq!(round_trip.midi, info.midi, "round trip moved at {frequency} Hz");
        }
    }

    #[test]
    fn test_sharp_and_flat_signs() {
        assert!(map_to_note(443.0).cents > 0.0);
        assert!(map_to_note(437.0).cents < 0.0);
    }

    #[test]
    fn test_key_lookup() {
        assert_eq!(note_for_key(0), None);
        assert_eq!(note_for_key(89), None);

        let (name, freq) = note_for_key(49).expect("A4");
        assert_eq!(name, "A4");
        assert!((freq - 440.0).abs() < 1e-3);

        let (name, freq) = note_for_key(1).expect("A0");
        assert_eq!(name, "A0");
        assert!((freq - 27.5).abs() < 1e-2);

        let (name, freq) = note_for_key(88).expect("C8");
        assert_eq!(name, "C8");
        assert!((freq - 4186.0).abs() < 0.1);
    }

    #[test]
    fn test_name_lookup_inverts_key_lookup() {
        for key in 1..=PIANO_KEYS {
            let (name, _) = note_for_key(key).expect("valid key");
            assert_eq!(key_for_name(&name), Some(key));
        }
        assert_eq!(key_for_name("H4"), None);
    }

    #[test]
    fn test_cents_between_octave() {
        assert!((cents_between(880.0, 440.0) - 1200.0).abs() < 1e-3);
        assert!((cents_between(220.0, 440.0) + 1200.0).abs() < 1e-3);
    }
}
