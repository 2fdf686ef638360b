//! # Spectrum Module
//!
//! FFT helpers for the analysis pipeline. The magnitude spectrum of
//! each block feeds the host's spectrogram display and the spectral
//! refinement of the detected pitch.
//!
//! ## Features
//! - Forward FFT via RustFFT
//! - Hann windowing for reduced spectral leakage
//! - DC offset removal before analysis

use rustfft::{FftPlanner, num_complex::Complex};

/// Removes the DC offset from a signal by making its average value zero.
fn remove_dc_offset(signal: &mut [f32]) {
    if signal.is_empty() {
        return;
    }
    let mean = signal.iter().sum::<f32>() / signal.len() as f32;
    if mean.abs() > 1e-6 {
        for sample in signal.iter_mut() {
            *sample -= mean;
        }
    }
}

/// Applies a Hann window in place to taper the block edges to zero.
fn apply_hann_window(buffer: &mut [f32]) {
    let n = buffer.len();
    if n < 2 {
        return;
    }
    let step = 2.0 * std::f32::consts::PI / (n - 1) as f32;
    for (i, sample) in buffer.iter_mut().enumerate() {
        *sample *= 0.5 * (1.0 - (step * i as f32).cos());
    }
}

/// Computes the magnitude spectrum of a block, up to Nyquist.
///
/// The block is DC-corrected and Hann-windowed, transformed with a
/// forward FFT of the block length, and reduced to the magnitudes of
/// the first half of the spectrum. Returns an empty vector for blocks
/// too short to transform.
pub fn magnitude_spectrum(block: &[f32]) -> Vec<f32> {
    if block.len() < 2 {
        return Vec::new();
    }

    let mut samples = block.to_vec();
    remove_dc_offset(&mut samples);
    apply_hann_window(&mut samples);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(samples.len());

    let mut spectrum: Vec<Complex<f32>> = samples
        .into_iter()
        .map(|re| Complex { re, im: 0.0 })
        .collect();
    fft.process(&mut spectrum);

    let half = spectrum.len() / 2;
    spectrum.iter().take(half).map(|c| c.norm()).collect()
}
