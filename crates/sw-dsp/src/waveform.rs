//! Pure waveform evaluators.
//!
//! Stateless maps from phase to sample, so the sync path can probe a
//! hypothetical phase without touching voice state. Digital shapes are
//! the ideal piecewise forms; analog shapes run the phase through an
//! exponential-style curve for rounder corners and richer low-order
//! harmonics.

use libm::{fabsf, fminf, truncf};

/// How the evaluators shape their output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Shaping {
    /// Ideal piecewise waveforms.
    #[default]
    Digital,
    /// Exponential-curve shaped variants.
    Analog,
}

/// Rational shaping curve used by the analog saw and triangle.
/// Maps [0, 1] onto [1, -1] with an exponential-style bow.
#[inline]
pub fn exp_curve(x: f32) -> f32 {
    (3.0 + x * (-13.0 + 5.0 * x)) / (3.0 + 2.0 * x)
}

/// 7th-order Padé approximant of sin(2πx), accurate on [0, 1].
#[inline]
fn sin2pi_pade(x: f32) -> f32 {
    let x = x - 0.5;
    let x2 = x * x;
    let x3 = x2 * x;
    let x5 = x3 * x2;
    let x7 = x5 * x2;
    (-6.283_19 * x + 35.353 * x3 - 44.904_3 * x5 + 16.095_1 * x7)
        / (1.0 + 0.953_136 * x2 + 0.430_238 * x2 * x2 + 0.098_140_8 * x3 * x3)
}

/// Square wave: +1 below the duty threshold, -1 above.
#[inline]
pub fn square(phase: f32, pulse_width: f32) -> f32 {
    if phase < pulse_width {
        1.0
    } else {
        -1.0
    }
}

/// Sawtooth with its discontinuity at phase 0.5.
#[inline]
pub fn saw(phase: f32, shaping: Shaping) -> f32 {
    let mut x = phase + 0.5;
    x -= truncf(x);
    match shaping {
        Shaping::Digital => 2.0 * x - 1.0,
        Shaping::Analog => -exp_curve(x),
    }
}

/// Triangle, peaking at phase 0.25.
#[inline]
pub fn triangle(phase: f32, shaping: Shaping) -> f32 {
    match shaping {
        Shaping::Digital => 1.0 - 4.0 * fminf(fabsf(phase - 0.25), fabsf(phase - 1.25)),
        Shaping::Analog => {
            let mut x = phase + 0.25;
            x -= truncf(x);
            let second_half = x >= 0.5;
            x *= 2.0;
            x -= truncf(x);
            if second_half {
                exp_curve(x)
            } else {
                -exp_curve(x)
            }
        }
    }
}

/// Sine. Digital mode is the Padé approximant; analog mode a two-piece
/// quadratic with slightly richer harmonics.
#[inline]
pub fn sine(phase: f32, shaping: Shaping) -> f32 {
    match shaping {
        Shaping::Digital => sin2pi_pade(phase),
        Shaping::Analog => {
            let first_half = phase < 0.5;
            let x = phase - if first_half { 0.25 } else { 0.75 };
            let v = 1.0 - 16.0 * x * x;
            if first_half {
                v
            } else {
                -v
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_follows_pulse_width() {
        assert_eq!(square(0.25, 0.5), 1.0);
        assert_eq!(square(0.75, 0.5), -1.0);
        assert_eq!(square(0.05, 0.1), 1.0);
        assert_eq!(square(0.15, 0.1), -1.0);
    }

    #[test]
    fn saw_digital_values() {
        assert!((saw(0.0, Shaping::Digital) - 0.0).abs() < 1e-6);
        assert!((saw(0.25, Shaping::Digital) - 0.5).abs() < 1e-6);
        // Discontinuity sits at 0.5: just below approaches +1, at 0.5 jumps to -1
        assert!(saw(0.4999, Shaping::Digital) > 0.99);
        assert!((saw(0.5, Shaping::Digital) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn triangle_digital_extremes() {
        assert!((triangle(0.25, Shaping::Digital) - 1.0).abs() < 1e-6);
        assert!((triangle(0.75, Shaping::Digital) + 1.0).abs() < 1e-6);
        assert!(triangle(0.0, Shaping::Digital).abs() < 1e-6);
        assert!(triangle(0.5, Shaping::Digital).abs() < 1e-6);
    }

    #[test]
    fn sine_digital_tracks_reference() {
        for i in 0..100 {
            let phase = i as f32 / 100.0;
            let expected = libm::sinf(core::f32::consts::TAU * phase);
            let got = sine(phase, Shaping::Digital);
            assert!(
                (got - expected).abs() < 5e-3,
                "phase {} got {} expected {}",
                phase,
                got,
                expected
            );
        }
    }

    #[test]
    fn sine_analog_peaks() {
        assert!((sine(0.25, Shaping::Analog) - 1.0).abs() < 1e-6);
        assert!((sine(0.75, Shaping::Analog) + 1.0).abs() < 1e-6);
        assert!(sine(0.0, Shaping::Analog).abs() < 1e-6);
    }

    #[test]
    fn exp_curve_endpoints() {
        assert!((exp_curve(0.0) - 1.0).abs() < 1e-6);
        assert!((exp_curve(1.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn analog_shapes_stay_bounded() {
        for i in 0..200 {
            let phase = i as f32 / 200.0;
            for v in [
                saw(phase, Shaping::Analog),
                triangle(phase, Shaping::Analog),
                sine(phase, Shaping::Analog),
            ] {
                assert!(v.abs() <= 1.01, "phase {} value {}", phase, v);
            }
        }
    }

    #[test]
    fn evaluators_are_pure() {
        for _ in 0..2 {
            assert_eq!(saw(0.37, Shaping::Digital), saw(0.37, Shaping::Digital));
            assert_eq!(sine(0.37, Shaping::Analog), sine(0.37, Shaping::Analog));
            assert_eq!(
                triangle(0.37, Shaping::Analog),
                triangle(0.37, Shaping::Analog)
            );
        }
    }
}
