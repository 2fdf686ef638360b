//! # Analysis Session Module
//!
//! Ties the gate, pitch estimator and note mapper together into a
//! per-block pipeline. The session object replaces the process-wide
//! globals of a typical tuner app: it owns the configuration and the
//! two pieces of shared mutable state (sensitivity and tuning mode), so
//! a host can run analysis on a dedicated audio thread while its UI
//! thread adjusts settings.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::config::TunerConfig;
use crate::{AnalysisFrame, Reading, fft, gate, pitch, tuning};

/// How deviation is measured for a detected note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TuningMode {
    /// Measure against the nearest equal-tempered note.
    Auto,
    /// Also measure against a selected piano key (1-88).
    Manual {
        /// Piano key index of the target note.
        key: u8,
    },
}

/// An analysis session for one tuner instance.
///
/// `process_block` carries no state from one call to the next; every
/// call allocates and discards its own working buffers, so identical
/// input always produces an identical frame and the session can be
/// shared across threads.
#[derive(Debug)]
pub struct Tuner {
    config: TunerConfig,
    /// Gate sensitivity (1-100), read fresh on every block.
    sensitivity: AtomicU8,
    /// Selected piano key (1-88); 0 encodes auto mode.
    target_key: AtomicU8,
}

impl Tuner {
    /// Creates a session from a configuration, rejecting invalid ones.
    pub fn new(config: TunerConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let sensitivity = AtomicU8::new(config.sensitivity);
        Ok(Self {
            config,
            sensitivity,
            target_key: AtomicU8::new(0),
        })
    }

    /// The configuration this session was built from.
    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Current sensitivity setting (1-100).
    pub fn sensitivity(&self) -> u8 {
        self.sensitivity.load(Ordering::Relaxed)
    }

    /// Updates the sensitivity, clamped into [1, 100]. Takes effect on
    /// the next block.
    pub fn set_sensitivity(&self, sensitivity: u8) {
        self.sensitivity.store(sensitivity.clamp(1, 100), Ordering::Relaxed);
    }

    /// Current tuning mode.
    pub fn mode(&self) -> TuningMode {
        match self.target_key.load(Ordering::Relaxed) {
            0 => TuningMode::Auto,
            key => TuningMode::Manual { key },
        }
    }

    /// Switches between automatic and manual-target tuning. Manual key
    /// indices are clamped onto the keyboard (1-88).
    pub fn set_mode(&self, mode: TuningMode) {
        let raw = match mode {
            TuningMode::Auto => 0,
            TuningMode::Manual { key } => key.clamp(1, tuning::PIANO_KEYS),
        };
        self.target_key.store(raw, Ordering::Relaxed);
    }

    /// Runs the full analysis pipeline on one block of samples.
    ///
    /// Pipeline order: magnitude spectrum, energy gate, YIN estimate,
    /// spectrum refinement, absolute range filter, note mapping,
    /// keyboard-range check, manual-target deviation. The returned
    /// frame always carries the raw RMS and the display spectrum; the
    /// reading tag tells the host which state to present.
    pub fn process_block(&self, block: &[f32], sample_rate: u32) -> AnalysisFrame {
        let rms = gate::block_rms(block);
        let spectrum = fft::magnitude_spectrum(block);

        let threshold = gate::threshold_for_sensitivity(
            self.sensitivity(),
            self.config.gate_floor,
            self.config.gate_ceiling,
        );
        if rms <= threshold {
            return AnalysisFrame { rms, spectrum, reading: Reading::TooQuiet };
        }

        let Some(rough) =
            pitch::estimate_pitch_with_threshold(block, sample_rate, self.config.yin_threshold)
        else {
            return AnalysisFrame { rms, spectrum, reading: Reading::NoPitch };
        };
        let frequency =
            pitch::refine_from_spectrum(&spectrum, rough, sample_rate).unwrap_or(rough);

        if frequency < self.config.min_frequency || frequency > self.config.max_frequency {
            return AnalysisFrame { rms, spectrum, reading: Reading::OutOfRange { frequency } };
        }

        let note = tuning::map_to_note(frequency);
        if note.piano_key.is_none() {
            // A valid pitch that rounds to a note off the keyboard is
            // still "out of range", not "no pitch".
            return AnalysisFrame { rms, spectrum, reading: Reading::OutOfRange { frequency } };
        }

        let cents_to_target = match self.mode() {
            TuningMode::Auto => None,
            TuningMode::Manual { key } => tuning::note_for_key(key)
                .map(|(_, target)| tuning::cents_between(frequency, target)),
        };

        AnalysisFrame {
            rms,
            spectrum,
            reading: Reading::Note { frequency, note, cents_to_target },
        }
    }
}

impl Default for Tuner {
    fn default() -> Self {
        // The default config is always valid.
        Self::new(TunerConfig::default()).expect("default config validates")
    }
}
