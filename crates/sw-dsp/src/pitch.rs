//! Volt-per-octave pitch to frequency conversion.
//!
//! Control-rate only; the approximation avoids a transcendental call so
//! reconfiguration stays cheap even when driven every block.

/// Frequency of C4, the 0 V reference.
pub const FREQ_C4: f32 = 261.6256;

/// 2^x for non-negative x below the f32 exponent range.
///
/// Splits into an integer exponent (set directly in the float bits) and
/// a 5th-order Taylor series on the fractional part. Relative error is
/// below 1e-4 across the fractional range.
#[inline]
pub fn approx_exp2(x: f32) -> f32 {
    let xi = x as i32;
    let xf = x - xi as f32;
    let p = 1.0
        + xf * (0.693_147_2
            + xf * (0.240_226_5
                + xf * (0.055_504_1 + xf * (0.009_618_13 + xf * 0.001_333_36))));
    f32::from_bits(((xi + 127) as u32) << 23) * p
}

/// Convert a volt-per-octave pitch (0 V = C4) to Hz.
///
/// The +30 / 2^30 offset keeps the exponent argument positive across the
/// whole modular pitch range, which `approx_exp2` requires.
#[inline]
pub fn volt_to_hz(pitch: f32) -> f32 {
    FREQ_C4 * approx_exp2(pitch + 30.0) / 1_073_741_824.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exp2_exact_at_integers() {
        assert_eq!(approx_exp2(0.0), 1.0);
        assert_eq!(approx_exp2(1.0), 2.0);
        assert_eq!(approx_exp2(10.0), 1024.0);
    }

    #[test]
    fn exp2_close_on_fractions() {
        for i in 0..50 {
            let x = i as f32 * 0.17;
            let exact = (x as f64).exp2() as f32;
            let approx = approx_exp2(x);
            let rel = ((approx - exact) / exact).abs();
            assert!(rel < 2e-4, "x={} approx={} exact={}", x, approx, exact);
        }
    }

    #[test]
    fn zero_volts_is_c4() {
        assert!((volt_to_hz(0.0) - FREQ_C4).abs() < 0.01);
    }

    #[test]
    fn one_volt_doubles() {
        let base = volt_to_hz(0.0);
        let up = volt_to_hz(1.0);
        assert!((up / base - 2.0).abs() < 1e-4);
    }

    #[test]
    fn negative_volts_halve() {
        let base = volt_to_hz(0.0);
        let down = volt_to_hz(-1.0);
        assert!((base / down - 2.0).abs() < 1e-3);
    }

    #[test]
    fn a4_is_440() {
        // A4 is 9 semitones above C4
        let hz = volt_to_hz(9.0 / 12.0);
        assert!((hz - 440.0).abs() < 0.5, "got {}", hz);
    }
}
