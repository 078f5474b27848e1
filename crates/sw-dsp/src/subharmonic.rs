//! Sub-harmonic cycle divider.
//!
//! Counts completed primary cycles per lane and reports when the sub
//! phase must reset, keeping the sub oscillator's period an exact
//! integer multiple of the primary period. A free-running divided
//! oscillator would drift; this one is re-locked at every rollover.

use crate::MAX_LANES;

/// Smallest legal division amount.
pub const DIVISION_MIN: u32 = 1;

/// Largest legal division amount.
pub const DIVISION_MAX: u32 = 32;

/// Per-lane cycle counter driving the sub-phase reset.
///
/// A fresh divider fires on the first completed cycle, then once every
/// `division` cycles.
#[derive(Clone, Debug)]
pub struct SubDivider {
    division: [u32; MAX_LANES],
    counter: [u32; MAX_LANES],
}

impl SubDivider {
    pub fn new() -> Self {
        Self {
            division: [1; MAX_LANES],
            counter: [1; MAX_LANES],
        }
    }

    /// Set the per-lane division amounts.
    ///
    /// Values outside [1, 32] are a configuration error. A running
    /// counter is clamped up to 1 so a shrunken division still fires at
    /// the next cycle boundary instead of stalling.
    pub fn configure(&mut self, division: [u32; MAX_LANES]) {
        for (lane, &d) in division.iter().enumerate() {
            assert!(
                (DIVISION_MIN..=DIVISION_MAX).contains(&d),
                "sub division out of range: {d}"
            );
            self.division[lane] = d;
            if self.counter[lane] < 1 {
                self.counter[lane] = 1;
            }
        }
    }

    /// Division amount for `lane`.
    pub fn division(&self, lane: usize) -> u32 {
        self.division[lane]
    }

    /// Register one completed primary cycle on `lane`. Returns true when
    /// the divider rolls over and the caller must reset the sub phase.
    pub fn on_cycle(&mut self, lane: usize) -> bool {
        debug_assert!(self.counter[lane] > 0);
        self.counter[lane] -= 1;
        if self.counter[lane] == 0 {
            self.counter[lane] = self.division[lane];
            true
        } else {
            false
        }
    }
}

impl Default for SubDivider {
    fn default() -> Self {
        Self::new()
    }
}
