//! Linear-phase FIR filter design.
//!
//! - [`firls`]: least-squares fit to a piecewise-linear desired response
//! - [`firwin`]: windowed-sinc design from cutoff frequencies
//!
//! Frequencies are given in the same units as `fs`; with `fs = 2.0` they
//! are normalized so that 1.0 is the Nyquist frequency.

use crate::error::{DspError, DspResult};
use crate::window::{generate_window, WindowType};
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

/// Normalized sinc, sin(πx)/(πx).
pub fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// Design a type I linear-phase FIR filter by weighted least squares.
///
/// `bands` holds pairs of band edges and `desired` the gain at each edge;
/// the response is linear between the two edges of a band and unconstrained
/// between bands. `weight` carries one non-negative weight per band and
/// defaults to all ones.
///
/// # Returns
///
/// `numtaps` symmetric coefficients.
pub fn firls(
    numtaps: usize,
    bands: &[f64],
    desired: &[f64],
    weight: Option<&[f64]>,
    fs: f64,
) -> DspResult<Vec<f64>> {
    if numtaps == 0 || numtaps % 2 == 0 {
        return Err(DspError::invalid(format!(
            "numtaps must be odd and positive, got {numtaps}"
        )));
    }
    if !(fs > 0.0) {
        return Err(DspError::invalid(format!("fs must be positive, got {fs}")));
    }
    if bands.is_empty() || bands.len() % 2 != 0 {
        return Err(DspError::invalid(format!(
            "bands must contain edge pairs, got {} values",
            bands.len()
        )));
    }
    if desired.len() != bands.len() {
        return Err(DspError::LengthMismatch {
            expected: bands.len(),
            actual: desired.len(),
        });
    }

    let nyquist = fs / 2.0;
    let edges: Vec<f64> = bands.iter().map(|&f| f / nyquist).collect();
    if edges.iter().any(|&f| !(0.0..=1.0).contains(&f)) {
        return Err(DspError::invalid("band edges must lie within [0, fs/2]"));
    }
    if edges.windows(2).any(|w| w[1] < w[0]) {
        return Err(DspError::invalid("band edges must be monotonically non-decreasing"));
    }
    if edges.chunks(2).any(|band| band[0] >= band[1]) {
        return Err(DspError::invalid("each band must have a positive width"));
    }

    let band_count = edges.len() / 2;
    let weights = match weight {
        Some(w) if w.len() != band_count => {
            return Err(DspError::LengthMismatch {
                expected: band_count,
                actual: w.len(),
            })
        }
        Some(w) if w.iter().any(|&v| !(v >= 0.0)) => {
            return Err(DspError::invalid("band weights must be non-negative"));
        }
        Some(w) => w.to_vec(),
        None => vec![1.0; band_count],
    };

    let half = (numtaps - 1) / 2;
    let order = half + 1;

    // q[n] = Σ_k w_k (f1 sinc(f1 n) - f0 sinc(f0 n)) over each band [f0, f1]
    let q: Vec<f64> = (0..numtaps)
        .map(|n| {
            let n = n as f64;
            edges
                .chunks(2)
                .zip(&weights)
                .map(|(band, w)| w * (band[1] * sinc(band[1] * n) - band[0] * sinc(band[0] * n)))
                .sum()
        })
        .collect();

    // Toeplitz plus Hankel
    let system = Array2::from_shape_fn((order, order), |(i, j)| {
        q[i.abs_diff(j)] + q[i + j]
    });

    let mut rhs = Array1::<f64>::zeros(order);
    for ((band, gains), w) in edges.chunks(2).zip(desired.chunks(2)).zip(&weights) {
        let slope = (gains[1] - gains[0]) / (band[1] - band[0]);
        let intercept = gains[0] - band[0] * slope;

        for (n, b) in rhs.iter_mut().enumerate() {
            let term = |f: f64| {
                let nf = n as f64;
                let mut t = f * (slope * f + intercept) * sinc(f * nf);
                if n == 0 {
                    t -= slope * f * f / 2.0;
                } else {
                    t += slope * (nf * PI * f).cos() / (PI * nf).powi(2);
                }
                t
            };
            *b += w * (term(band[1]) - term(band[0]));
        }
    }

    let a = solve(system, rhs)?;

    let mut coeffs = Vec::with_capacity(numtaps);
    coeffs.extend(a.iter().skip(1).rev());
    coeffs.push(2.0 * a[0]);
    coeffs.extend(a.iter().skip(1));

    tracing::debug!(numtaps, bands = band_count, "Designed least-squares FIR");
    Ok(coeffs)
}

/// Solve `a x = b` by Gaussian elimination with partial pivoting.
fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> DspResult<Array1<f64>> {
    let n = b.len();
    let scale = a.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    let tolerance = scale * n as f64 * f64::EPSILON;

    for k in 0..n {
        let pivot = (k..n)
            .max_by(|&i, &j| a[[i, k]].abs().total_cmp(&a[[j, k]].abs()))
            .unwrap_or(k);

        if !(a[[pivot, k]].abs() > tolerance) {
            return Err(DspError::NumericalInstability(format!(
                "least-squares system is singular at column {k}"
            )));
        }

        if pivot != k {
            for j in 0..n {
                a.swap([k, j], [pivot, j]);
            }
            b.swap(k, pivot);
        }

        for i in (k + 1)..n {
            let factor = a[[i, k]] / a[[k, k]];
            if factor == 0.0 {
                continue;
            }
            for j in k..n {
                a[[i, j]] -= factor * a[[k, j]];
            }
            b[i] -= factor * b[k];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| a[[i, j]] * x[j]).sum();
        x[i] = (b[i] - tail) / a[[i, i]];
    }

    Ok(x)
}

/// Design a FIR filter with the window method.
///
/// `cutoff` lists the band edges in increasing order, strictly between 0 and
/// fs/2. With `pass_zero` the first band (starting at DC) is a passband,
/// otherwise a stopband. The taps are scaled for unit gain at the center of
/// the first passband.
pub fn firwin(
    numtaps: usize,
    cutoff: &[f64],
    window: WindowType,
    pass_zero: bool,
    fs: f64,
) -> DspResult<Vec<f64>> {
    if numtaps == 0 {
        return Err(DspError::invalid("numtaps must be at least 1"));
    }
    if !(fs > 0.0) {
        return Err(DspError::invalid(format!("fs must be positive, got {fs}")));
    }
    if cutoff.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    window.validate()?;

    let nyquist = fs / 2.0;
    let mut edges: Vec<f64> = cutoff.iter().map(|&f| f / nyquist).collect();
    if edges.iter().any(|&f| !(f > 0.0 && f < 1.0)) {
        return Err(DspError::invalid(
            "cutoff frequencies must lie strictly between 0 and fs/2",
        ));
    }
    if edges.windows(2).any(|w| w[1] <= w[0]) {
        return Err(DspError::invalid("cutoff frequencies must be strictly increasing"));
    }

    let pass_nyquist = (edges.len() % 2 == 1) ^ pass_zero;
    if pass_nyquist && numtaps % 2 == 0 {
        return Err(DspError::invalid(
            "a filter passing the Nyquist frequency needs an odd number of taps",
        ));
    }

    if pass_zero {
        edges.insert(0, 0.0);
    }
    if pass_nyquist {
        edges.push(1.0);
    }

    let alpha = 0.5 * (numtaps as f64 - 1.0);
    let offsets: Vec<f64> = (0..numtaps).map(|i| i as f64 - alpha).collect();

    let mut h: Vec<f64> = offsets
        .iter()
        .map(|&m| {
            edges
                .chunks(2)
                .map(|band| band[1] * sinc(band[1] * m) - band[0] * sinc(band[0] * m))
                .sum()
        })
        .collect();

    for (tap, w) in h.iter_mut().zip(generate_window(window, numtaps)) {
        *tap *= w;
    }

    let (left, right) = (edges[0], edges[1]);
    let scale_frequency = if left == 0.0 {
        0.0
    } else if right == 1.0 {
        1.0
    } else {
        0.5 * (left + right)
    };
    let gain: f64 = h
        .iter()
        .zip(&offsets)
        .map(|(tap, m)| tap * (PI * m * scale_frequency).cos())
        .sum();

    if gain.abs() < f64::EPSILON {
        return Err(DspError::NumericalInstability(
            "filter has no gain at the passband center".into(),
        ));
    }
    for tap in h.iter_mut() {
        *tap /= gain;
    }

    Ok(h)
}

/// Frequency response magnitude of `taps` at a normalized frequency
/// (1.0 = Nyquist).
pub fn response_magnitude(taps: &[f64], frequency: f64) -> f64 {
    let omega = PI * frequency;
    let (re, im) = taps
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(re, im), (n, &h)| {
            let phase = omega * n as f64;
            (re + h * phase.cos(), im - h * phase.sin())
        });
    re.hypot(im)
}
