//! Ring buffer of pending band-limited step corrections.

use alloc::sync::Arc;

use crate::kernel::MinBlepTable;

/// Ring capacity: fits kernels up to 16 zero crossings per side.
const RING_CAP: usize = 32;

/// Accumulates minBLEP correction tails for one lane of one waveform.
///
/// `insert_discontinuity` time-aligns the scaled step residual into the
/// ring; `process` consumes one sample of summed correction and advances
/// the read position. Overlapping discontinuities sum linearly. Both
/// operations are allocation-free and bounded by the kernel span.
#[derive(Clone, Debug)]
pub struct MinBlepBuffer {
    table: Arc<MinBlepTable>,
    buf: [f32; RING_CAP],
    pos: usize,
}

impl MinBlepBuffer {
    /// Create a buffer over `table`. The table's span must fit the ring.
    pub fn new(table: Arc<MinBlepTable>) -> Self {
        assert!(table.span() <= RING_CAP, "kernel span exceeds ring capacity");
        Self {
            table,
            buf: [0.0; RING_CAP],
            pos: 0,
        }
    }

    /// Record a discontinuity of `amplitude` at `offset` samples relative
    /// to the just-computed position. `offset` must lie in (-1, 0];
    /// anything else, including NaN, is ignored.
    pub fn insert_discontinuity(&mut self, offset: f32, amplitude: f32) {
        if !(offset > -1.0 && offset <= 0.0) {
            return;
        }
        let span = self.table.span();
        let oversample = self.table.oversample() as f32;
        for j in 0..span {
            let index = (j as f32 - offset) * oversample;
            let slot = (self.pos + j) % span;
            self.buf[slot] += amplitude * self.table.residual_at(index);
        }
    }

    /// Correction for the current sample; advances the read position.
    pub fn process(&mut self) -> f32 {
        let span = self.table.span();
        if span == 0 {
            return 0.0;
        }
        let v = self.buf[self.pos];
        self.buf[self.pos] = 0.0;
        self.pos = (self.pos + 1) % span;
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// Table whose residual is 1.0 everywhere: every pending slot gets
    /// exactly the inserted amplitude.
    fn probe_table() -> Arc<MinBlepTable> {
        Arc::new(MinBlepTable::from_impulse(vec![2.0; 2 * 2 * 4 + 1], 2, 4))
    }

    #[test]
    fn fresh_buffer_is_silent() {
        let mut b = MinBlepBuffer::new(probe_table());
        for _ in 0..10 {
            assert_eq!(b.process(), 0.0);
        }
    }

    #[test]
    fn empty_table_is_a_no_op() {
        let mut b = MinBlepBuffer::new(Arc::new(MinBlepTable::empty()));
        b.insert_discontinuity(-0.5, 2.0);
        for _ in 0..10 {
            assert_eq!(b.process(), 0.0);
        }
    }

    #[test]
    fn out_of_range_offsets_are_ignored() {
        let mut b = MinBlepBuffer::new(probe_table());
        b.insert_discontinuity(0.5, 1.0);
        b.insert_discontinuity(-1.0, 1.0);
        b.insert_discontinuity(-2.0, 1.0);
        b.insert_discontinuity(f32::NAN, 1.0);
        for _ in 0..8 {
            assert_eq!(b.process(), 0.0);
        }
    }

    #[test]
    fn probe_insert_fills_span_with_amplitude() {
        let mut b = MinBlepBuffer::new(probe_table());
        b.insert_discontinuity(-0.25, 1.5);
        for _ in 0..4 {
            assert!((b.process() - 1.5).abs() < 1e-6);
        }
        // Fully decayed after the span
        for _ in 0..4 {
            assert_eq!(b.process(), 0.0);
        }
    }

    #[test]
    fn overlapping_discontinuities_sum_linearly() {
        let mut once = MinBlepBuffer::new(probe_table());
        once.insert_discontinuity(-0.5, 3.0);

        let mut twice = MinBlepBuffer::new(probe_table());
        twice.insert_discontinuity(-0.5, 1.0);
        twice.insert_discontinuity(-0.5, 2.0);

        for _ in 0..8 {
            assert!((once.process() - twice.process()).abs() < 1e-6);
        }
    }

    #[test]
    #[cfg(feature = "std")]
    fn generated_kernel_correction_decays() {
        let table = Arc::new(MinBlepTable::generate(4, 8));
        let mut b = MinBlepBuffer::new(table);
        b.insert_discontinuity(0.0, 2.0);
        let first = b.process();
        // The step has not risen yet at the start, so the correction
        // initially cancels most of the jump.
        assert!(first < -0.2, "first correction {}", first);
        let mut last = first;
        for _ in 0..7 {
            last = b.process();
        }
        assert!(last.abs() < 0.2, "final correction {}", last);
        // Ring is clean after the span
        for _ in 0..8 {
            assert_eq!(b.process(), 0.0);
        }
    }

    #[test]
    fn insert_mid_stream_lands_relative_to_cursor() {
        let mut b = MinBlepBuffer::new(probe_table());
        // Consume a few samples so the cursor is not at slot zero.
        for _ in 0..3 {
            b.process();
        }
        b.insert_discontinuity(-0.5, 1.0);
        for _ in 0..4 {
            assert!((b.process() - 1.0).abs() < 1e-6);
        }
        assert_eq!(b.process(), 0.0);
    }
}
