//! minBLEP impulse table provider.
//!
//! The engine treats the table as opaque: any impulse whose final entry
//! is the settled step value of 1.0 works, including tables generated
//! offline and handed in through `from_impulse`. `generate` builds the
//! default table (windowed sinc, cepstral minimum-phase reconstruction,
//! integration, normalization) once at startup. Nothing here runs on
//! the audio path.

use alloc::vec::Vec;

#[cfg(feature = "std")]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use once_cell::sync::Lazy;
#[cfg(feature = "std")]
use rustfft::{num_complex::Complex, FftPlanner};

/// Zero crossings per side of the default kernel.
pub const DEFAULT_ZERO_CROSSINGS: usize = 16;

/// Oversampling factor of the default kernel.
pub const DEFAULT_OVERSAMPLE: usize = 32;

#[cfg(feature = "std")]
static SHARED: Lazy<Arc<MinBlepTable>> =
    Lazy::new(|| Arc::new(MinBlepTable::generate(DEFAULT_ZERO_CROSSINGS, DEFAULT_OVERSAMPLE)));

/// A band-limited step impulse table.
///
/// `impulse` holds `2 * zero_crossings * oversample + 1` samples rising
/// from near 0 to exactly 1.0 at the end.
#[derive(Clone, Debug)]
pub struct MinBlepTable {
    impulse: Vec<f32>,
    zero_crossings: usize,
    oversample: usize,
}

impl MinBlepTable {
    /// Wrap a caller-supplied impulse table.
    ///
    /// `impulse.len()` must equal `2 * zero_crossings * oversample + 1`,
    /// or be zero, which disables correction entirely.
    pub fn from_impulse(impulse: Vec<f32>, zero_crossings: usize, oversample: usize) -> Self {
        if !impulse.is_empty() {
            assert_eq!(impulse.len(), 2 * zero_crossings * oversample + 1);
        }
        Self {
            impulse,
            zero_crossings,
            oversample,
        }
    }

    /// A zero-length table: corrections become identically zero and the
    /// engine degenerates to its naive evaluators.
    pub fn empty() -> Self {
        Self {
            impulse: Vec::new(),
            zero_crossings: 0,
            oversample: 0,
        }
    }

    /// The process-wide default table, built on first use.
    #[cfg(feature = "std")]
    pub fn shared() -> Arc<Self> {
        SHARED.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.impulse.is_empty()
    }

    pub fn oversample(&self) -> usize {
        self.oversample
    }

    /// Ring span in output samples covered by one inserted step.
    pub fn span(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            2 * self.zero_crossings
        }
    }

    /// Residual (impulse minus the settled unit step) at a fractional
    /// table index, linearly interpolated. Indices run from 0 to
    /// `span * oversample` inclusive.
    #[inline]
    pub fn residual_at(&self, index: f32) -> f32 {
        let i = index as usize;
        let frac = index - i as f32;
        let a = self.impulse[i];
        let b = if i + 1 < self.impulse.len() {
            self.impulse[i + 1]
        } else {
            a
        };
        (a + (b - a) * frac) - 1.0
    }

    /// Build the minimum-phase band-limited step.
    ///
    /// Windowed sinc, real cepstrum, minimum-phase fold, cumulative sum,
    /// then normalization so the settled value is exactly 1.0.
    #[cfg(feature = "std")]
    pub fn generate(zero_crossings: usize, oversample: usize) -> Self {
        let n = 2 * zero_crossings * oversample;
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n);
        let ifft = planner.plan_fft_inverse(n);
        let scale = 1.0 / n as f32;

        // Symmetric sinc with `zero_crossings` lobes per side, windowed.
        let mut buf: Vec<Complex<f32>> = (0..n)
            .map(|i| {
                let t = i as f32 / (n - 1) as f32;
                let p = (2.0 * t - 1.0) * zero_crossings as f32;
                Complex::new(sinc(p) * blackman_harris(t), 0.0)
            })
            .collect();

        // Real cepstrum: log magnitude spectrum back to the time domain.
        // The -30 floor guards the log against zero bins.
        fft.process(&mut buf);
        for bin in buf.iter_mut() {
            *bin = Complex::new(bin.norm().ln().max(-30.0), 0.0);
        }
        ifft.process(&mut buf);
        for bin in buf.iter_mut() {
            *bin = Complex::new(bin.re * scale, 0.0);
        }

        // Fold the cepstrum so the reconstructed phase is minimum.
        for i in 1..n / 2 {
            buf[i] *= 2.0;
        }
        for bin in buf.iter_mut().skip((n + 1) / 2) {
            *bin = Complex::new(0.0, 0.0);
        }

        // Back through exp to recover the minimum-phase impulse.
        fft.process(&mut buf);
        for bin in buf.iter_mut() {
            *bin = bin.exp();
        }
        ifft.process(&mut buf);

        // Integrate the impulse into a step and normalize the settled value.
        let mut impulse = Vec::with_capacity(n + 1);
        let mut total = 0.0f32;
        for bin in &buf {
            total += bin.re * scale;
            impulse.push(total);
        }
        let norm = 1.0 / impulse[n - 1];
        for v in impulse.iter_mut() {
            *v *= norm;
        }
        impulse.push(1.0);

        Self {
            impulse,
            zero_crossings,
            oversample,
        }
    }
}

#[cfg(feature = "std")]
fn sinc(x: f32) -> f32 {
    if x == 0.0 {
        1.0
    } else {
        let px = core::f32::consts::PI * x;
        px.sin() / px
    }
}

/// Blackman-Harris window over t in [0, 1].
#[cfg(feature = "std")]
fn blackman_harris(t: f32) -> f32 {
    const A0: f32 = 0.35875;
    const A1: f32 = 0.48829;
    const A2: f32 = 0.14128;
    const A3: f32 = 0.01168;
    let w = core::f32::consts::TAU * t;
    A0 - A1 * w.cos() + A2 * (2.0 * w).cos() - A3 * (3.0 * w).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    #[cfg(feature = "std")]
    fn generated_table_has_expected_shape() {
        let table = MinBlepTable::generate(4, 8);
        assert_eq!(table.span(), 8);
        assert_eq!(table.oversample(), 8);
        // 2 * 4 * 8 + 1 entries, settled value exactly 1
        assert!(!table.is_empty());
        assert_eq!(table.impulse.len(), 65);
        assert_eq!(*table.impulse.last().unwrap(), 1.0);
        assert!(table.impulse.iter().all(|v| v.is_finite()));
        assert!(table.impulse.iter().all(|v| v.abs() < 2.0));
    }

    #[test]
    #[cfg(feature = "std")]
    fn residual_settles_to_zero() {
        let table = MinBlepTable::generate(4, 8);
        assert_eq!(table.residual_at(64.0), 0.0);
        // Early residual is a real correction (the step has not risen yet)
        assert!(table.residual_at(0.0) < -0.1);
    }

    #[test]
    #[cfg(feature = "std")]
    fn generation_is_deterministic() {
        let a = MinBlepTable::generate(4, 8);
        let b = MinBlepTable::generate(4, 8);
        assert_eq!(a.impulse, b.impulse);
    }

    #[test]
    fn empty_table_has_no_span() {
        let table = MinBlepTable::empty();
        assert!(table.is_empty());
        assert_eq!(table.span(), 0);
    }

    #[test]
    fn from_impulse_accepts_matching_length() {
        let table = MinBlepTable::from_impulse(vec![1.0; 2 * 2 * 4 + 1], 2, 4);
        assert_eq!(table.span(), 4);
    }

    #[test]
    #[should_panic]
    fn from_impulse_rejects_wrong_length() {
        let _ = MinBlepTable::from_impulse(vec![1.0; 10], 2, 4);
    }

    #[test]
    fn residual_interpolates_linearly() {
        // Impulse 0, 0.5, 1.0, 1.0, 1.0 over a (1, 2) table
        let table = MinBlepTable::from_impulse(vec![0.0, 0.5, 1.0, 1.0, 1.0], 1, 2);
        assert!((table.residual_at(0.5) - (0.25 - 1.0)).abs() < 1e-6);
        assert!((table.residual_at(1.0) - (0.5 - 1.0)).abs() < 1e-6);
        assert_eq!(table.residual_at(4.0), 0.0);
    }

    #[test]
    #[cfg(feature = "std")]
    fn shared_table_is_cached() {
        let a = MinBlepTable::shared();
        let b = MinBlepTable::shared();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.span(), 2 * DEFAULT_ZERO_CROSSINGS);
    }
}
