//! # Pitch Detection Module
//!
//! This module implements the YIN pitch detection algorithm for
//! monophonic input, plus a spectrum-based refinement stage.
//!
//! ## Features
//! - YIN difference function with cumulative mean normalization
//! - Absolute-threshold dip search with local-minimum descent
//! - Parabolic interpolation for sub-sample accuracy
//! - Spectrum refinement for sub-bin precision on stable tones

/// Absolute threshold for the normalized difference search. Lags whose
/// normalized value stays above this never qualify as a period.
pub const YIN_THRESHOLD: f32 = 0.15;

/// Estimates the fundamental frequency of a block of samples.
///
/// Candidate periods up to half the block length are scored with the
/// YIN cumulative mean normalized difference function; the first lag
/// that dips below [`YIN_THRESHOLD`] is walked down to its local
/// minimum and refined with parabolic interpolation.
///
/// # Arguments
/// * `block` - Input audio samples, mono, roughly within [-1, 1]
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * `Some(frequency)` - Detected fundamental frequency in Hz
/// * `None` - No periodic signal found (silence, noise, or a
///   degenerate intermediate value)
pub fn estimate_pitch(block: &[f32], sample_rate: u32) -> Option<f32> {
    estimate_pitch_with_threshold(block, sample_rate, YIN_THRESHOLD)
}

/// [`estimate_pitch`] with an explicit dip threshold, for sessions that
/// expose the threshold as configuration.
pub fn estimate_pitch_with_threshold(
    block: &[f32],
    sample_rate: u32,
    threshold: f32,
) -> Option<f32> {
    let tau_max = block.len() / 2;
    if tau_max < 3 || sample_rate == 0 {
        return None;
    }

    // --- Step 1: Difference function ---
    let mut diff = vec![0.0f32; tau_max];
    for tau in 1..tau_max {
        let mut sum = 0.0;
        for i in 0..tau_max {
            let delta = block[i] - block[i + tau];
            sum += delta * delta;
        }
        diff[tau] = sum;
    }

    // --- Step 2: Cumulative mean normalized difference ---
    // Lag 0 is a sentinel and never selected; a vanishing or non-finite
    // running sum pins the lag at the sentinel value as well.
    diff[0] = 1.0;
    let mut running_sum = 0.0;
    for tau in 1..tau_max {
        running_sum += diff[tau];
        if running_sum > 0.0 && running_sum.is_finite() {
            diff[tau] *= tau as f32 / running_sum;
        } else {
            diff[tau] = 1.0;
        }
    }

    // --- Step 3: Absolute threshold search ---
    // On the first lag under the threshold, keep advancing while the
    // curve still falls, so the period lands on the bottom of the dip
    // rather than its leading edge.
    let mut period = 0;
    let mut tau = 2;
    while tau < tau_max {
        if diff[tau] < threshold {
            while tau + 1 < tau_max && diff[tau + 1] < diff[tau] {
                tau += 1;
            }
            period = tau;
            break;
        }
        tau += 1;
    }
    if period == 0 {
        return None;
    }

    // --- Step 4: Parabolic interpolation for sub-sample accuracy ---
    let better_tau = interpolate_minimum(&diff, period);

    // --- Step 5: Lag to frequency ---
    let frequency = sample_rate as f32 / better_tau;
    if frequency.is_finite() && frequency > 0.0 {
        Some(frequency)
    } else {
        None
    }
}

/// Refines an integer lag to a fractional one by fitting a parabola
/// through the normalized difference values around it.
///
/// The right neighbor is clamped at the buffer bound; a flat or
/// non-finite parabola keeps the integer lag.
fn interpolate_minimum(diff: &[f32], period: usize) -> f32 {
    let y1 = diff[period - 1];
    let y2 = diff[period];
    let y3 = diff[(period + 1).min(diff.len() - 1)];

    let denominator = 2.0 * (2.0 * y2 - y3 - y1);
    if !denominator.is_finite() || denominator.abs() < f32::EPSILON {
        return period as f32;
    }
    period as f32 + (y3 - y1) / denominator
}

/// Refines a frequency estimate using a pre-computed magnitude spectrum.
///
/// Searches for the magnitude peak within two bins of the rough
/// estimate and interpolates its position on the log-magnitude curve.
/// Every degenerate case (peak on a spectrum edge, vanishing
/// magnitudes, flat parabola) falls back to the rough estimate, so the
/// caller can always unwrap a returned value.
///
/// # Arguments
/// * `magnitudes` - Magnitude spectrum of the analyzed block
/// * `rough_freq` - Initial frequency estimate in Hz
/// * `sample_rate` - Sample rate in Hz
///
/// # Returns
/// * `Some(frequency)` - Refined (or unchanged) estimate
/// * `None` - The rough estimate was not a valid frequency
pub fn refine_from_spectrum(magnitudes: &[f32], rough_freq: f32, sample_rate: u32) -> Option<f32> {
    if !rough_freq.is_finite() || rough_freq <= 0.0 {
        return None;
    }
    if magnitudes.len() < 3 || sample_rate == 0 {
        return Some(rough_freq);
    }

    let fft_size = magnitudes.len() * 2;
    let hz_per_bin = sample_rate as f32 / fft_size as f32;
    let target_bin = rough_freq / hz_per_bin;

    let start = (target_bin - 2.0).max(0.0) as usize;
    let end = ((target_bin + 2.0) as usize).min(magnitudes.len() - 1);
    if start >= end {
        return Some(rough_freq);
    }

    let Some(peak) = magnitudes[start..=end]
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(offset, _)| start + offset)
    else {
        return Some(rough_freq);
    };

    // Interpolation needs both neighbors inside the spectrum.
    if peak == 0 || peak + 1 >= magnitudes.len() {
        return Some(rough_freq);
    }

    let y1 = magnitudes[peak - 1].ln();
    let y2 = magnitudes[peak].ln();
    let y3 = magnitudes[peak + 1].ln();
    if !y1.is_finite() || !y2.is_finite() || !y3.is_finite() {
        return Some(rough_freq);
    }

    let denominator = 2.0 * y2 - y1 - y3;
    if denominator.abs() < 1e-6 {
        return Some(rough_freq);
    }

    let peak_shift = (y3 - y1) / (2.0 * denominator);
    let refined = (peak as f32 + peak_shift) * hz_per_bin;
    if refined.is_finite() && refined > 0.0 {
        Some(refined)
    } else {
        Some(rough_freq)
    }
}
