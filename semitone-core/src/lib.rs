// semitone-core/src/lib.rs

//! The core logic for the semitone chromatic tuner.
//! This crate is responsible for signal gating, pitch detection,
//! and note mapping. It is completely headless and contains no
//! audio-capture or GUI code: the host owns the microphone and the
//! display, feeds fixed-size blocks of mono samples in here, and
//! renders the returned frames.

pub mod analysis;
pub mod config;
pub mod fft;
pub mod gate;
pub mod pitch;
pub mod tuning;

pub use analysis::{Tuner, TuningMode};
pub use config::TunerConfig;
pub use tuning::NoteInfo;

/// Represents the result of a single audio analysis frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisFrame {
    /// Root-mean-square energy of the block. Always present, even when
    /// the gate did not pass, so the host can drive a level meter.
    pub rms: f32,
    /// Magnitude spectrum of the block (up to Nyquist), for the
    /// spectrogram visualization.
    pub spectrum: Vec<f32>,
    /// What the analysis concluded for this block.
    pub reading: Reading,
}

/// Per-block outcome of the analysis pipeline.
///
/// The three non-note cases are ordinary outcomes, not errors: the host
/// is expected to show a "too quiet", "listening" or "out of range"
/// state for them.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    /// Block energy was below the gate threshold.
    TooQuiet,
    /// The gate passed but no periodic signal was found.
    NoPitch,
    /// A pitch was found but it lies outside the instrument range.
    OutOfRange {
        /// The detected frequency in Hz.
        frequency: f32,
    },
    /// A pitch was found and mapped onto the equal-tempered scale.
    Note {
        /// The detected frequency in Hz.
        frequency: f32,
        /// Nearest note, target frequency, cents deviation and key index.
        note: NoteInfo,
        /// Deviation from the manually selected key, when one is set.
        cents_to_target: Option<f32>,
    },
}
