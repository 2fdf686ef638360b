//! # Signal Gate Module
//!
//! Energy gating for the analysis pipeline. The gate measures the
//! root-mean-square energy of an incoming block and compares it against
//! a threshold derived from the user-facing sensitivity setting, so that
//! pitch detection only runs on blocks that actually carry signal.

/// Gate threshold at maximum sensitivity (100).
pub const GATE_FLOOR: f32 = 0.0005;

/// Gate threshold at minimum sensitivity (1).
pub const GATE_CEILING: f32 = 0.01;

/// Computes the root-mean-square energy of a block.
///
/// An empty block has an energy of exactly 0.0, so silence and missing
/// data both fail the gate.
pub fn block_rms(block: &[f32]) -> f32 {
    if block.is_empty() {
        return 0.0;
    }
    (block.iter().map(|&s| s * s).sum::<f32>() / block.len() as f32).sqrt()
}

/// Maps a sensitivity setting onto a gate threshold.
///
/// Interpolates linearly between `ceiling` (sensitivity 1, least
/// sensitive) and `floor` (sensitivity 100, most sensitive). The setting
/// is clamped into [1, 100] first, so the result never leaves the
/// configured band.
pub fn threshold_for_sensitivity(sensitivity: u8, floor: f32, ceiling: f32) -> f32 {
    let s = sensitivity.clamp(1, 100) as f32;
    ceiling - (s / 100.0) * (ceiling - floor)
}

/// Returns true when the block is loud enough to analyze.
pub fn should_analyze(block: &[f32], threshold: f32) -> bool {
    block_rms(block) > threshold
}
