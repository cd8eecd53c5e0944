//! Roots of unity for FFT twiddle factors.
//!
//! [`TwiddleGenerator`] serves `e^{-2πi k/N}` for any `k` from two compact
//! tables of roughly `sqrt(N/2)` entries each. A lookup is one complex
//! multiplication: `v1[k & mask] * v2[k >> shift]`. Indices past `N/2` are
//! mirrored through `root(N - k) = conj(root(k))`, so only the upper half of
//! the circle is ever tabulated.

use crate::error::{DspError, DspResult};
use num_complex::Complex64;
use std::f64::consts::PI;

/// `e^{-2πi x/n}`, evaluated with cos/sin arguments restricted to `[0, π/4]`.
///
/// `x` is reduced modulo `n`. `x == 0` yields exactly `(1, 0)`. An order of
/// zero is rejected with [`DspError::InvalidLength`].
pub fn nth_root_of_unity(x: usize, n: usize) -> DspResult<Complex64> {
    if n == 0 {
        return Err(DspError::InvalidLength(0));
    }
    Ok(octant_root(x % n, n, 0.25 * PI / n as f64))
}

/// Root for `0 <= x <= n`, where `ang = π / (4n)`.
///
/// `8x` expresses the angle in units of `ang`: a full turn is `8n`, a
/// quadrant `2n` and an octant `n`.
fn octant_root(x: usize, n: usize, ang: f64) -> Complex64 {
    let x8 = x << 3;
    let (cos, sin) = if x8 < 4 * n {
        upper_half(x8, n, ang)
    } else {
        let (cos, sin) = upper_half(8 * n - x8, n, ang);
        (cos, -sin)
    };
    // (cos, sin) is e^{+iθ}; twiddles use the negative exponent.
    Complex64::new(cos, -sin)
}

/// `(cos θ, sin θ)` for `θ = x·ang` in `[0, π]`.
#[inline]
fn upper_half(x: usize, n: usize, ang: f64) -> (f64, f64) {
    if x < 2 * n {
        first_quadrant(x, n, ang)
    } else {
        let (cos, sin) = first_quadrant(x - 2 * n, n, ang);
        (-sin, cos)
    }
}

/// `(cos θ, sin θ)` for `θ = x·ang` in `[0, π/2]`.
#[inline]
fn first_quadrant(x: usize, n: usize, ang: f64) -> (f64, f64) {
    if x < n {
        let a = x as f64 * ang;
        (a.cos(), a.sin())
    } else {
        // Reflect about π/4.
        let a = (2 * n - x) as f64 * ang;
        (a.sin(), a.cos())
    }
}

/// Compressed table of `e^{-2πi k/N}`.
#[derive(Clone, Debug)]
pub struct TwiddleGenerator {
    /// Order of the roots.
    n: usize,

    /// `2^shift - 1`.
    mask: usize,

    /// log2 of the `v1` length.
    shift: u32,

    /// Fine table: `root(i)` for `i` in `0..2^shift`.
    v1: Vec<Complex64>,

    /// Coarse table: `root(j << shift)`.
    v2: Vec<Complex64>,
}

impl TwiddleGenerator {
    /// Build the tables for roots of order `n`. Fails with
    /// [`DspError::InvalidLength`] for `n == 0`.
    pub fn new(n: usize) -> DspResult<Self> {
        if n == 0 {
            return Err(DspError::InvalidLength(0));
        }

        let ang = 0.25 * PI / n as f64;
        let nval = (n + 2) / 2;

        let mut shift = 1u32;
        while (1usize << shift) * (1usize << shift) < nval {
            shift += 1;
        }
        let mask = (1usize << shift) - 1;

        let mut v1 = Vec::with_capacity(mask + 1);
        v1.push(Complex64::new(1.0, 0.0));
        v1.extend((1..=mask).map(|i| octant_root(i, n, ang)));

        let v2_len = (nval + mask) / (mask + 1);
        let mut v2 = Vec::with_capacity(v2_len);
        v2.push(Complex64::new(1.0, 0.0));
        v2.extend((1..v2_len).map(|j| octant_root(j * (mask + 1), n, ang)));

        Ok(Self { n, mask, shift, v1, v2 })
    }

    /// Order of the roots (the transform length).
    #[inline]
    pub fn order(&self) -> usize {
        self.n
    }

    /// Sizes of the fine and coarse tables.
    pub fn table_sizes(&self) -> (usize, usize) {
        (self.v1.len(), self.v2.len())
    }

    /// `e^{-2πi idx/N}`. Indices are taken modulo `N`.
    #[inline]
    pub fn get(&self, idx: usize) -> Complex64 {
        let idx = if idx >= self.n { idx % self.n } else { idx };
        if 2 * idx <= self.n {
            self.combine(idx)
        } else {
            self.combine(self.n - idx).conj()
        }
    }

    #[inline]
    fn combine(&self, idx: usize) -> Complex64 {
        self.v1[idx & self.mask] * self.v2[idx >> self.shift]
    }

    /// Materialize the whole table, `N` entries.
    pub fn to_vec(&self) -> Vec<Complex64> {
        (0..self.n).map(|k| self.get(k)).collect()
    }
}
