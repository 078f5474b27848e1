//! Per-sample phase advance math.
//!
//! The primary phase wraps into [0, 1) every sample. The sub phase does
//! not: its wrap is owned by the sub-harmonic divider, so that sub-cycle
//! boundaries stay locked to primary-cycle boundaries instead of
//! free-running. `advance_wrapped` and `advance_free` encode that
//! asymmetry; callers must not swap one for the other.

use libm::floorf;

/// Lower bound on per-sample phase travel. Keeps the crossing math away
/// from a division by zero when a lane's frequency is zero.
pub const DELTA_PHASE_MIN: f32 = 1e-6;

/// Upper bound on per-sample phase travel. Guarantees at most one
/// crossing of each threshold per sample, which the edge detector
/// relies on.
pub const DELTA_PHASE_MAX: f32 = 0.35;

/// Phase travelled in one sample at `freq` Hz, clamped to the legal range.
#[inline]
pub fn delta_phase(freq: f32, delta_time: f32) -> f32 {
    (freq * delta_time).clamp(DELTA_PHASE_MIN, DELTA_PHASE_MAX)
}

/// Wrap a phase into [0, 1). Handles negative phases (soft-sync reversal).
#[inline]
pub fn wrap(phase: f32) -> f32 {
    phase - floorf(phase)
}

/// Advance and wrap the primary phase.
#[inline]
pub fn advance_wrapped(phase: f32, delta: f32) -> f32 {
    wrap(phase + delta)
}

/// Advance the sub phase without wrapping.
#[inline]
pub fn advance_free(phase: f32, delta: f32) -> f32 {
    phase + delta
}
