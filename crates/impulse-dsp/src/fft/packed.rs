//! Packed layout for real-input spectra.
//!
//! The forward transform of `N` real samples has `N/2 + 1` distinct complex
//! bins, and `Im(Y0)` (plus `Im(Y_{N/2})` when `N` is even) is always zero.
//! Dropping those zeros packs the spectrum into exactly `N` reals:
//!
//! ```text
//! N = 5:  [Re Y0, Re Y1, Im Y1, Re Y2, Im Y2]
//! N = 6:  [Re Y0, Re Y1, Im Y1, Re Y2, Im Y2, Re Y3]
//! ```
//!
//! [`unpack`] and [`pack`] convert between that layout and the half spectrum,
//! and [`symmetrize`] rebuilds the full `N`-point spectrum through Hermitian
//! symmetry, `Y[N-k] = conj(Y[k])`.

use crate::error::{DspError, DspResult};
use num_complex::Complex64;

/// Number of distinct bins in the spectrum of `n` real samples.
#[inline]
pub fn half_len(n: usize) -> usize {
    n / 2 + 1
}

/// Expand a packed spectrum into its `N/2 + 1` complex bins.
///
/// # Errors
///
/// Returns [`DspError::InvalidLength`] for an empty input.
pub fn unpack(packed: &[f64]) -> DspResult<Vec<Complex64>> {
    let (&dc, rest) = packed
        .split_first()
        .ok_or(DspError::InvalidLength(0))?;

    let mut half = Vec::with_capacity(half_len(packed.len()));
    half.push(Complex64::new(dc, 0.0));
    // Odd positions start a bin; even positions complete it. A trailing lone
    // real is the Nyquist bin of an even length.
    half.extend(
        rest.chunks(2)
            .map(|pair| Complex64::new(pair[0], pair.get(1).copied().unwrap_or(0.0))),
    );
    Ok(half)
}

/// Drop the always-zero imaginary parts of a half spectrum.
///
/// Inverse of [`unpack`]. Imaginary parts that the layout has no slot for are
/// discarded, whatever their value.
///
/// # Errors
///
/// - [`DspError::InvalidLength`] if `n == 0`
/// - [`DspError::LengthMismatch`] if `half.len() != n / 2 + 1`
pub fn pack(half: &[Complex64], n: usize) -> DspResult<Vec<f64>> {
    if n == 0 {
        return Err(DspError::InvalidLength(n));
    }
    if half.len() != half_len(n) {
        return Err(DspError::LengthMismatch {
            expected: half_len(n),
            actual: half.len(),
        });
    }

    let mut packed = Vec::with_capacity(n);
    packed.push(half[0].re);
    for (k, bin) in half.iter().enumerate().skip(1) {
        packed.push(bin.re);
        if 2 * k != n {
            packed.push(bin.im);
        }
    }
    debug_assert_eq!(packed.len(), n);
    Ok(packed)
}

/// Input to [`symmetrize`].
#[derive(Clone, Copy, Debug)]
pub enum HalfSpectrum<'a> {
    /// A packed spectrum; its length is the signal length.
    Packed(&'a [f64]),

    /// Unpacked bins together with the length of the original signal.
    Complex {
        values: &'a [Complex64],
        len: usize,
    },
}

impl<'a> HalfSpectrum<'a> {
    /// Unpacked bins with the signal length guessed from the data.
    ///
    /// `N/2 + 1` bins fit both `N = 2h - 2` and `N = 2h - 1`. The guess picks
    /// the even length when the last imaginary part is exactly zero, which
    /// misreads odd-length spectra whose last bin happens to be real. Prefer
    /// [`HalfSpectrum::Complex`] with the known length.
    pub fn infer(values: &'a [Complex64]) -> Self {
        let len = infer_signal_len(values);
        tracing::warn!(
            bins = values.len(),
            len,
            "Inferring signal length from half spectrum parity"
        );
        Self::Complex { values, len }
    }

    /// Length of the full spectrum [`symmetrize`] produces.
    pub fn target_len(&self) -> usize {
        match *self {
            Self::Packed(packed) => packed.len(),
            Self::Complex { len, .. } => len,
        }
    }
}

/// Guess the signal length behind `values.len()` half-spectrum bins.
pub fn infer_signal_len(values: &[Complex64]) -> usize {
    match values {
        [] => 0,
        [_] => 1,
        [.., last] if last.im == 0.0 => 2 * values.len() - 2,
        _ => 2 * values.len() - 1,
    }
}

/// Rebuild the full `N`-point spectrum of a real signal.
///
/// # Errors
///
/// - [`DspError::InvalidLength`] for an empty spectrum or `len == 0`
/// - [`DspError::LengthMismatch`] if the bin count does not match `len`
pub fn symmetrize(input: HalfSpectrum<'_>) -> DspResult<Vec<Complex64>> {
    let len = input.target_len();
    let mut full = match input {
        HalfSpectrum::Packed(packed) => unpack(packed)?,
        HalfSpectrum::Complex { values, len } => {
            if len == 0 {
                return Err(DspError::InvalidLength(len));
            }
            if values.len() != half_len(len) {
                return Err(DspError::LengthMismatch {
                    expected: half_len(len),
                    actual: values.len(),
                });
            }
            values.to_vec()
        }
    };

    full.resize(len, Complex64::new(0.0, 0.0));
    for k in 1..(len + 1) / 2 {
        full[len - k] = full[k].conj();
    }
    Ok(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(n: usize) -> Vec<f64> {
        (0..n).map(|i| (0.7 * i as f64).sin() + 0.25 * i as f64).collect()
    }

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_unpack_odd_length() {
        let half = unpack(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(half, vec![c(1.0, 0.0), c(2.0, 3.0), c(4.0, 5.0)]);
    }

    #[test]
    fn test_unpack_even_length() {
        let half = unpack(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(half, vec![c(1.0, 0.0), c(2.0, 3.0), c(4.0, 0.0)]);
    }

    #[test]
    fn test_unpack_short_inputs() {
        assert_eq!(unpack(&[7.0]).unwrap(), vec![c(7.0, 0.0)]);
        assert_eq!(unpack(&[7.0, -1.0]).unwrap(), vec![c(7.0, 0.0), c(-1.0, 0.0)]);
        assert!(matches!(unpack(&[]), Err(DspError::InvalidLength(0))));
    }

    #[test]
    fn test_unpack_lengths() {
        for n in 1..64 {
            assert_eq!(unpack(&samples(n)).unwrap().len(), half_len(n));
        }
    }

    #[test]
    fn test_pack_unpack_round_trip() {
        for n in 1..64 {
            let packed = samples(n);
            let half = unpack(&packed).unwrap();
            assert_eq!(pack(&half, n).unwrap(), packed, "n = {n}");
        }
    }

    #[test]
    fn test_pack_validates_lengths() {
        let half = vec![c(1.0, 0.0); 3];
        assert!(matches!(pack(&half, 0), Err(DspError::InvalidLength(0))));
        assert!(matches!(
            pack(&half, 6),
            Err(DspError::LengthMismatch { expected: 4, actual: 3 })
        ));
        assert!(pack(&half, 4).is_ok());
        assert!(pack(&half, 5).is_ok());
    }

    #[test]
    fn test_symmetrize_packed() {
        let full = symmetrize(HalfSpectrum::Packed(&[1.0, 2.0, 3.0, 4.0, 5.0])).unwrap();
        assert_eq!(
            full,
            vec![c(1.0, 0.0), c(2.0, 3.0), c(4.0, 5.0), c(4.0, -5.0), c(2.0, -3.0)]
        );

        let full = symmetrize(HalfSpectrum::Packed(&[1.0, 2.0, 3.0, 4.0])).unwrap();
        assert_eq!(full, vec![c(1.0, 0.0), c(2.0, 3.0), c(4.0, 0.0), c(2.0, -3.0)]);
    }

    #[test]
    fn test_symmetrize_is_hermitian() {
        for n in 1..50 {
            let full = symmetrize(HalfSpectrum::Packed(&samples(n))).unwrap();
            assert_eq!(full.len(), n);
            for k in 1..n {
                assert_eq!(full[n - k], full[k].conj(), "n = {n}, k = {k}");
            }
        }
    }

    #[test]
    fn test_symmetrize_complex_needs_matching_length() {
        let half = [c(1.0, 0.0), c(2.0, 1.0), c(3.0, 0.0)];
        let full = symmetrize(HalfSpectrum::Complex { values: &half, len: 5 }).unwrap();
        assert_eq!(full.len(), 5);
        assert_eq!(full[4], c(2.0, -1.0));
        assert_eq!(full[3], c(3.0, 0.0));

        let full = symmetrize(HalfSpectrum::Complex { values: &half, len: 4 }).unwrap();
        assert_eq!(full, vec![c(1.0, 0.0), c(2.0, 1.0), c(3.0, 0.0), c(2.0, -1.0)]);

        let err = symmetrize(HalfSpectrum::Complex { values: &half, len: 7 });
        assert!(matches!(err, Err(DspError::LengthMismatch { expected: 4, actual: 3 })));
    }

    #[test]
    fn test_length_inference() {
        assert_eq!(infer_signal_len(&[]), 0);
        assert_eq!(infer_signal_len(&[c(1.0, 0.0)]), 1);
        assert_eq!(infer_signal_len(&[c(1.0, 0.0), c(2.0, 1.0), c(3.0, 0.0)]), 4);
        assert_eq!(infer_signal_len(&[c(1.0, 0.0), c(2.0, 1.0), c(3.0, 0.5)]), 5);

        let values = [c(1.0, 0.0), c(2.0, 1.0), c(3.0, 0.5)];
        let inferred = HalfSpectrum::infer(&values);
        assert_eq!(inferred.target_len(), 5);
        assert_eq!(symmetrize(inferred).unwrap().len(), 5);
    }
}
