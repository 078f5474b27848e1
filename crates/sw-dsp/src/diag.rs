//! Diagnostic hook for invariant violations on the sample path.

/// Receiver for engine diagnostics.
///
/// Injected at voice construction. Implementations must be realtime-safe
/// (no allocation, no blocking) since callbacks fire from the sample path.
pub trait Diag: Send + Sync {
    /// The unwrapped sub phase exceeded its safety bound and was saturated.
    /// Indicates a divider/frequency mismatch, not a recoverable condition.
    fn sub_phase_overflow(&self, lane: usize, value: f32);
}

/// Discards all diagnostics.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullDiag;

impl Diag for NullDiag {
    fn sub_phase_overflow(&self, _lane: usize, _value: f32) {}
}
