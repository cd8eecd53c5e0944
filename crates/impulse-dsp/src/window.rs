//! Window functions for spectral analysis and filter design.
//!
//! Symmetric windows feed FIR design, periodic (DFT-even) windows suit
//! spectral analysis where the window repeats with the transform length.

use crate::error::{DspError, DspResult};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Window function types.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type")]
pub enum WindowType {
    /// No windowing (rectangular window).
    Rectangular,

    /// Hann (raised cosine) window - good general purpose.
    Hann,

    /// Hamming window - slightly better sidelobe rejection than Hann.
    Hamming,

    /// Blackman window - excellent sidelobe rejection.
    Blackman,

    /// Triangular window reaching zero at both ends.
    Bartlett,

    /// Kaiser-Bessel window with configurable beta parameter.
    Kaiser { beta: f64 },
}

impl Default for WindowType {
    fn default() -> Self {
        Self::Hamming
    }
}

impl WindowType {
    /// Check the window parameters before generating coefficients.
    ///
    /// Kaiser beta must be finite, non-negative and small enough that
    /// `I0(beta)` stays representable.
    pub fn validate(&self) -> DspResult<()> {
        match *self {
            WindowType::Kaiser { beta } => {
                if !(beta.is_finite() && beta >= 0.0) {
                    return Err(DspError::invalid(format!(
                        "kaiser beta must be finite and non-negative, got {beta}"
                    )));
                }
                if !bessel_i0(beta).is_finite() {
                    return Err(DspError::invalid(format!(
                        "kaiser beta {beta} overflows the window normalization"
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Compute the zeroth-order modified Bessel function of the first kind, I_0(x).
///
/// Sums the power series Σ ((x/2)^k / k!)² until the terms stop contributing.
/// NaN maps to NaN and an infinite argument to infinity; arguments past about
/// 713 overflow to infinity.
pub fn bessel_i0(x: f64) -> f64 {
    if !x.is_finite() {
        return x.abs();
    }

    let half = x.abs() / 2.0;
    let mut sum = 1.0;
    let mut term = 1.0;
    let mut k = 1.0;

    loop {
        term *= (half / k) * (half / k);
        sum += term;
        if !term.is_finite() || term < sum * 1e-16 {
            break;
        }
        k += 1.0;
    }

    sum
}

/// Kaiser's beta for a desired stopband attenuation in dB.
pub fn kaiser_beta(attenuation_db: f64) -> f64 {
    if attenuation_db > 50.0 {
        0.1102 * (attenuation_db - 8.7)
    } else if attenuation_db > 21.0 {
        let a = attenuation_db - 21.0;
        0.5842 * a.powf(0.4) + 0.07886 * a
    } else {
        0.0
    }
}

/// Number of taps a Kaiser-windowed filter needs for the given attenuation.
///
/// `width` is the transition width normalized so that 1.0 is the Nyquist
/// frequency.
pub fn kaiser_order(attenuation_db: f64, width: f64) -> usize {
    let taps = (attenuation_db - 7.95) / 2.285 / (PI * width) + 1.0;
    taps.ceil().max(1.0) as usize
}

/// Generate window coefficients for a given window type and length.
///
/// The window is symmetric; odd lengths peak at exactly 1.0 in the center.
///
/// # Arguments
///
/// * `window_type` - Type of window function to generate
/// * `length` - Number of points in the window
///
/// # Returns
///
/// Vector of window coefficients, length `length`.
pub fn generate_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let n = length as f64;
    let mut window = Vec::with_capacity(length);

    match window_type {
        WindowType::Rectangular => {
            window.resize(length, 1.0);
        }

        WindowType::Hann => {
            for i in 0..length {
                let x = i as f64 / (n - 1.0);
                window.push(0.5 * (1.0 - (2.0 * PI * x).cos()));
            }
        }

        WindowType::Hamming => {
            for i in 0..length {
                let x = i as f64 / (n - 1.0);
                window.push(0.54 - 0.46 * (2.0 * PI * x).cos());
            }
        }

        WindowType::Blackman => {
            for i in 0..length {
                let x = i as f64 / (n - 1.0);
                window.push(0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos());
            }
        }

        WindowType::Bartlett => {
            for i in 0..length {
                let x = 2.0 * i as f64 / (n - 1.0) - 1.0;
                window.push(1.0 - x.abs());
            }
        }

        WindowType::Kaiser { beta } => {
            let denom = bessel_i0(beta);
            for i in 0..length {
                let x = 2.0 * i as f64 / (n - 1.0) - 1.0; // Range [-1, 1]
                let arg = beta * (1.0 - x * x).max(0.0).sqrt();
                window.push(bessel_i0(arg) / denom);
            }
        }
    }

    window
}

/// Generate a periodic (DFT-even) window.
///
/// This is the symmetric window of `length + 1` points with the last point
/// dropped.
pub fn generate_periodic_window(window_type: WindowType, length: usize) -> Vec<f64> {
    if length <= 1 {
        return generate_window(window_type, length);
    }

    let mut window = generate_window(window_type, length + 1);
    window.truncate(length);
    window
}

/// Multiply `signal` by the symmetric window of the same length.
pub fn apply_window(signal: &mut [f64], window_type: WindowType) {
    let window = generate_window(window_type, signal.len());
    for (x, w) in signal.iter_mut().zip(window) {
        *x *= w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bessel_i0() {
        // I_0(0) = 1
        assert!((bessel_i0(0.0) - 1.0).abs() < 1e-15);

        assert!((bessel_i0(1.0) - 1.2660658777520082).abs() < 1e-14);
        assert!((bessel_i0(3.0) - 4.880792585865024).abs() < 1e-13);
        assert!((bessel_i0(10.0) - 2815.716628466254).abs() < 1e-9);

        // Symmetry: I_0(-x) = I_0(x)
        assert!((bessel_i0(-2.0) - bessel_i0(2.0)).abs() < 1e-15);
    }

    #[test]
    fn test_rectangular_window() {
        let window = generate_window(WindowType::Rectangular, 10);
        assert_eq!(window.len(), 10);
        assert!(window.iter().all(|&w| (w - 1.0).abs() < 1e-10));
    }

    #[test]
    fn test_hann_window() {
        let window = generate_window(WindowType::Hann, 65);
        assert_eq!(window.len(), 65);

        // Hann window starts and ends at 0
        assert!(window[0].abs() < 1e-12);
        assert!(window[64].abs() < 1e-12);

        // Peak at center
        assert!((window[32] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hamming_and_blackman_edges() {
        let hamming = generate_window(WindowType::Hamming, 9);
        assert!((hamming[0] - 0.08).abs() < 1e-12);
        assert!((hamming[4] - 1.0).abs() < 1e-12);

        let blackman = generate_window(WindowType::Blackman, 9);
        assert!(blackman[0].abs() < 1e-12);
        assert!((blackman[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bartlett_window() {
        let window = generate_window(WindowType::Bartlett, 5);
        let expected = [0.0, 0.5, 1.0, 0.5, 0.0];
        for (w, e) in window.iter().zip(expected.iter()) {
            assert!((w - e).abs() < 1e-12);
        }
    }

    #[test]
    fn test_kaiser_window() {
        let window = generate_window(WindowType::Kaiser { beta: 6.0 }, 65);
        assert_eq!(window.len(), 65);

        // Kaiser window has maximum at center
        assert!((window[32] - 1.0).abs() < 1e-12);

        // Window tapers to edges: 1 / I_0(6)
        assert!((window[0] - 1.0 / bessel_i0(6.0)).abs() < 1e-12);
        assert!(window[0] < 0.1);

        // beta = 0 is rectangular
        let flat = generate_window(WindowType::Kaiser { beta: 0.0 }, 8);
        assert!(flat.iter().all(|&w| (w - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_window_symmetry() {
        for kind in [
            WindowType::Hann,
            WindowType::Hamming,
            WindowType::Blackman,
            WindowType::Bartlett,
            WindowType::Kaiser { beta: 6.0 },
        ] {
            let window = generate_window(kind, 64);
            for i in 0..32 {
                assert!(
                    (window[i] - window[63 - i]).abs() < 1e-12,
                    "{:?} asymmetric at index {}: {} vs {}",
                    kind,
                    i,
                    window[i],
                    window[63 - i]
                );
            }
        }
    }

    #[test]
    fn test_periodic_window() {
        let window = generate_periodic_window(WindowType::Hann, 4);
        let expected = [0.0, 0.5, 1.0, 0.5];
        assert_eq!(window.len(), 4);
        for (w, e) in window.iter().zip(expected.iter()) {
            assert!((w - e).abs() < 1e-12);
        }
        assert_eq!(generate_periodic_window(WindowType::Hann, 1), vec![1.0]);
        assert!(generate_periodic_window(WindowType::Hann, 0).is_empty());
    }

    #[test]
    fn test_kaiser_design_formulas() {
        assert_eq!(kaiser_beta(10.0), 0.0);
        assert!((kaiser_beta(60.0) - 0.1102 * 51.3).abs() < 1e-12);
        assert!((kaiser_beta(40.0) - 3.395321052).abs() < 1e-6);

        // 65 dB with a transition of 0.1 * Nyquist
        assert_eq!(kaiser_order(65.0, 0.1), 81);
    }

    #[test]
    fn test_apply_window() {
        let mut signal = vec![2.0; 5];
        apply_window(&mut signal, WindowType::Bartlett);
        assert_eq!(signal, vec![0.0, 1.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_bessel_i0_non_finite_terminates() {
        assert!(bessel_i0(f64::NAN).is_nan());
        assert_eq!(bessel_i0(f64::INFINITY), f64::INFINITY);
        assert_eq!(bessel_i0(f64::NEG_INFINITY), f64::INFINITY);
        assert_eq!(bessel_i0(1e300), f64::INFINITY);
        assert_eq!(bessel_i0(1000.0), f64::INFINITY);
        // Below the overflow threshold
        assert!(bessel_i0(700.0).is_finite());
    }

    #[test]
    fn test_window_validate() {
        assert!(WindowType::Hann.validate().is_ok());
        assert!(WindowType::Kaiser { beta: 8.6 }.validate().is_ok());
        assert!(WindowType::Kaiser { beta: 0.0 }.validate().is_ok());
        for beta in [f64::NAN, f64::INFINITY, -1.0, 1000.0] {
            let err = WindowType::Kaiser { beta }.validate().unwrap_err();
            assert!(err.is_invalid_argument(), "beta = {beta}");
        }
    }

    #[test]
    fn test_window_type_serde() {
        let json = serde_json::to_string(&WindowType::Kaiser { beta: 5.0 }).unwrap();
        assert_eq!(json, r#"{"type":"kaiser","beta":5.0}"#);
        let back: WindowType = serde_json::from_str(r#"{"type":"hann"}"#).unwrap();
        assert_eq!(back, WindowType::Hann);
        assert_eq!(WindowType::default(), WindowType::Hamming);
    }
}
