//! High-performance convolution using overlap-save FFT method.
//!
//! This module provides efficient convolution for long signals,
//! using parallel processing with Rayon.

use crate::error::{DspError, DspResult};
use crate::fft::{good_size, FftEngine};
use num_complex::Complex64;
use rayon::prelude::*;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kernels up to this length are applied directly by [`fir_filter`].
const DIRECT_FILTER_MAX_TAPS: usize = 64;

/// FFT sizing strategy for convolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FftSizeStrategy {
    /// 4x impulse length rounded up to a fast length, minimum 1024.
    #[default]
    Auto,

    /// User-specified block size. Any length not shorter than the impulse
    /// is accepted; lengths from [`good_size`] run fastest.
    Fixed { size: usize },
}

/// High-performance convolution engine.
///
/// Uses the overlap-save method with pre-computed impulse FFT
/// for efficient processing of long signals.
pub struct ConvolutionEngine {
    /// Pre-computed half spectrum of the impulse response, already scaled
    /// by 1/fft_size.
    impulse_fft: Vec<Complex64>,

    /// FFT block size.
    fft_size: usize,

    /// Overlap size (impulse length - 1).
    overlap: usize,

    /// Valid output size per chunk.
    valid_size: usize,

    /// Original impulse length.
    impulse_len: usize,

    /// Cached FFT plans.
    fft_forward: Arc<dyn RealToComplex<f64>>,
    fft_inverse: Arc<dyn ComplexToReal<f64>>,
}

impl fmt::Debug for ConvolutionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvolutionEngine")
            .field("fft_size", &self.fft_size)
            .field("overlap", &self.overlap)
            .field("valid_size", &self.valid_size)
            .field("impulse_len", &self.impulse_len)
            .finish_non_exhaustive()
    }
}

impl ConvolutionEngine {
    /// Create a convolution engine for a given impulse response.
    ///
    /// Uses automatic sizing (4x impulse length, minimum 1024).
    /// For custom FFT sizing, use [`ConvolutionEngine::with_strategy`].
    pub fn new(impulse: &[f64]) -> DspResult<Self> {
        Self::with_strategy(impulse, FftSizeStrategy::Auto)
    }

    /// Create a convolution engine with a custom FFT sizing strategy.
    pub fn with_strategy(impulse: &[f64], strategy: FftSizeStrategy) -> DspResult<Self> {
        let impulse_len = impulse.len();
        if impulse_len == 0 {
            return Err(DspError::InsufficientData { needed: 1, got: 0 });
        }

        let fft_size = match strategy {
            FftSizeStrategy::Auto => good_size((impulse_len * 4).max(1024)),
            FftSizeStrategy::Fixed { size } => {
                if size == 0 {
                    return Err(DspError::InvalidLength(size));
                }
                if size < impulse_len {
                    return Err(DspError::invalid(format!(
                        "FFT size {} is smaller than impulse length {}",
                        size, impulse_len
                    )));
                }
                size
            }
        };
        let overlap = impulse_len - 1;
        let valid_size = fft_size - overlap;

        tracing::debug!(fft_size, impulse_len, valid_size, "ConvolutionEngine sizing");

        let mut planner = RealFftPlanner::<f64>::new();
        let fft_forward = planner.plan_fft_forward(fft_size);
        let fft_inverse = planner.plan_fft_inverse(fft_size);

        // Compute impulse FFT
        let mut padded = impulse.to_vec();
        padded.resize(fft_size, 0.0);
        let mut impulse_fft = fft_forward.make_output_vec();
        fft_forward
            .process(&mut padded, &mut impulse_fft)
            .map_err(|e| DspError::ExecutionFailure(e.to_string()))?;

        let scale = 1.0 / fft_size as f64;
        for h in impulse_fft.iter_mut() {
            *h *= scale;
        }

        Ok(Self {
            impulse_fft,
            fft_size,
            overlap,
            valid_size,
            impulse_len,
            fft_forward,
            fft_inverse,
        })
    }

    /// Convolve an input signal with the impulse response.
    ///
    /// Returns the full convolution of length `input.len() + impulse_len - 1`.
    /// Uses parallel processing for large inputs.
    pub fn convolve(&self, input: &[f64]) -> DspResult<Vec<f64>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let output_len = input.len() + self.impulse_len - 1;
        let num_chunks = output_len.div_ceil(self.valid_size);

        let chunks: Vec<Vec<f64>> = if num_chunks <= 2 {
            // Small input: process sequentially
            (0..num_chunks)
                .map(|chunk_idx| self.process_chunk(input, chunk_idx))
                .collect::<DspResult<_>>()?
        } else {
            (0..num_chunks)
                .into_par_iter()
                .map(|chunk_idx| self.process_chunk(input, chunk_idx))
                .collect::<DspResult<_>>()?
        };

        // Overlap-save: discard first `overlap` samples of every chunk
        let mut output = Vec::with_capacity(output_len);
        for chunk in chunks {
            let take = self.valid_size.min(output_len - output.len());
            output.extend_from_slice(&chunk[self.overlap..self.overlap + take]);
        }

        Ok(output)
    }

    /// Build chunk `chunk_idx` of the input, starting `overlap` samples
    /// before its valid region, and convolve it.
    fn process_chunk(&self, input: &[f64], chunk_idx: usize) -> DspResult<Vec<f64>> {
        let input_pos = (chunk_idx * self.valid_size) as isize - self.overlap as isize;

        let mut chunk = vec![0.0; self.fft_size];
        for (i, slot) in chunk.iter_mut().enumerate() {
            let src_idx = input_pos + i as isize;
            if src_idx >= 0 && (src_idx as usize) < input.len() {
                *slot = input[src_idx as usize];
            }
            // Otherwise remains 0 (zero-padding)
        }

        self.convolve_chunk(chunk)
    }

    /// Circularly convolve a single block using FFT.
    fn convolve_chunk(&self, mut chunk: Vec<f64>) -> DspResult<Vec<f64>> {
        let mut spectrum = self.fft_forward.make_output_vec();
        self.fft_forward
            .process(&mut chunk, &mut spectrum)
            .map_err(|e| DspError::ExecutionFailure(e.to_string()))?;

        for (c, h) in spectrum.iter_mut().zip(self.impulse_fft.iter()) {
            *c *= *h;
        }

        // The inverse requires real DC and Nyquist bins
        spectrum[0].im = 0.0;
        if self.fft_size % 2 == 0 {
            if let Some(last) = spectrum.last_mut() {
                last.im = 0.0;
            }
        }

        self.fft_inverse
            .process(&mut spectrum, &mut chunk)
            .map_err(|e| DspError::ExecutionFailure(e.to_string()))?;
        Ok(chunk)
    }

    /// Get the impulse response length.
    pub fn impulse_length(&self) -> usize {
        self.impulse_len
    }

    /// Get the FFT size being used.
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of initial output samples before the impulse response fully
    /// overlaps the input.
    #[inline]
    pub fn transient_samples(&self) -> usize {
        self.impulse_len.saturating_sub(1)
    }

    /// Convolve and drop the initial transient.
    pub fn convolve_steady_state(&self, input: &[f64]) -> DspResult<Vec<f64>> {
        let full_output = self.convolve(input)?;
        let discard = self.transient_samples();

        if discard >= full_output.len() {
            // Not enough output for steady-state
            Ok(Vec::new())
        } else {
            Ok(full_output[discard..].to_vec())
        }
    }
}

/// Direct convolution (for comparison/validation).
///
/// This is O(n*m) and should only be used for short signals.
/// Returns an empty vector when either input is empty.
pub fn direct_convolve(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }

    let output_len = signal.len() + kernel.len() - 1;
    let mut output = vec![0.0; output_len];

    for (i, &s) in signal.iter().enumerate() {
        for (j, &k) in kernel.iter().enumerate() {
            output[i + j] += s * k;
        }
    }

    output
}

/// Simple FFT-based convolution (single block).
///
/// Good for moderate-sized signals where overlap-save overhead isn't worth it.
pub fn fft_convolve(signal: &[f64], kernel: &[f64]) -> DspResult<Vec<f64>> {
    if signal.is_empty() || kernel.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }

    let output_len = signal.len() + kernel.len() - 1;
    let fft_size = good_size(output_len);

    let mut engine = FftEngine::new();

    let mut signal_fft = engine.rfft(&zero_padded(signal, fft_size))?;
    let kernel_fft = engine.rfft(&zero_padded(kernel, fft_size))?;

    for (s, k) in signal_fft.iter_mut().zip(kernel_fft.iter()) {
        *s *= *k;
    }

    let mut output = engine.irfft(&signal_fft, fft_size)?;
    output.truncate(output_len);
    Ok(output)
}

fn zero_padded(data: &[f64], len: usize) -> Vec<f64> {
    let mut padded = data.to_vec();
    padded.resize(len, 0.0);
    padded
}

/// Apply a FIR filter causally.
///
/// The output has the same length as `signal`: y[n] = Σ taps[k]·x[n-k].
pub fn fir_filter(taps: &[f64], signal: &[f64]) -> DspResult<Vec<f64>> {
    if taps.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    if signal.is_empty() {
        return Ok(Vec::new());
    }

    let mut output = if taps.len() <= DIRECT_FILTER_MAX_TAPS {
        direct_convolve(signal, taps)
    } else {
        ConvolutionEngine::new(taps)?.convolve(signal)?
    };
    output.truncate(signal.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_all_close(expected: &[f64], actual: &[f64], tol: f64) {
        assert_eq!(expected.len(), actual.len());
        for (i, (&e, &a)) in expected.iter().zip(actual.iter()).enumerate() {
            assert!((e - a).abs() < tol, "Mismatch at index {}: {} vs {}", i, e, a);
        }
    }

    #[test]
    fn test_direct_convolve_impulse() {
        // Convolving with a delta function should return the input
        let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let kernel = vec![1.0]; // Delta function

        let result = direct_convolve(&signal, &kernel);
        assert_eq!(result, signal);
    }

    #[test]
    fn test_direct_convolve_shift() {
        // Convolving with [0, 1] should shift by one sample
        let signal = vec![1.0, 2.0, 3.0, 4.0];
        let kernel = vec![0.0, 1.0];

        let result = direct_convolve(&signal, &kernel);
        assert_eq!(result, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_direct_convolve_empty() {
        assert!(direct_convolve(&[], &[1.0]).is_empty());
        assert!(direct_convolve(&[1.0], &[]).is_empty());
    }

    #[test]
    fn test_fft_convolve_matches_direct() {
        let signal = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let kernel = vec![1.0, 0.5, 0.25];

        let direct = direct_convolve(&signal, &kernel);
        let fft = fft_convolve(&signal, &kernel).unwrap();

        assert_all_close(&direct, &fft, 1e-10);
        assert!(fft_convolve(&[], &kernel).is_err());
    }

    #[test]
    fn test_convolution_engine() {
        let signal: Vec<f64> = (0..10000).map(|i| ((i * 7) % 13) as f64 - 6.0).collect();
        let kernel = vec![1.0, 0.5, 0.25, 0.125];

        let engine = ConvolutionEngine::new(&kernel).unwrap();
        assert_eq!(engine.fft_size(), 1024);
        let result = engine.convolve(&signal).unwrap();

        // Verify output length
        assert_eq!(result.len(), signal.len() + kernel.len() - 1);

        let direct = direct_convolve(&signal, &kernel);
        assert_all_close(&direct, &result, 1e-9);
    }

    #[test]
    fn test_fixed_odd_block_size() {
        let signal: Vec<f64> = (0..50).map(|i| (i as f64 * 0.3).sin()).collect();
        let kernel = vec![0.25, -0.5, 1.0, 0.75, 0.1];

        let engine =
            ConvolutionEngine::with_strategy(&kernel, FftSizeStrategy::Fixed { size: 15 }).unwrap();
        assert_eq!(engine.fft_size(), 15);

        let result = engine.convolve(&signal).unwrap();
        assert_all_close(&direct_convolve(&signal, &kernel), &result, 1e-12);
    }

    #[test]
    fn test_engine_validation() {
        assert!(ConvolutionEngine::new(&[]).is_err());
        let too_small =
            ConvolutionEngine::with_strategy(&[1.0; 8], FftSizeStrategy::Fixed { size: 4 });
        assert!(matches!(too_small, Err(ref e) if e.is_invalid_argument()));

        let engine = ConvolutionEngine::new(&[1.0, 2.0]).unwrap();
        assert!(engine.convolve(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_engine_debug_lists_geometry() {
        let engine =
            ConvolutionEngine::with_strategy(&[1.0; 8], FftSizeStrategy::Fixed { size: 32 })
                .unwrap();
        let text = format!("{engine:?}");
        assert!(text.starts_with("ConvolutionEngine {"), "{text}");
        assert!(text.contains("fft_size: 32"), "{text}");
        assert!(text.contains("overlap: 7"), "{text}");
        assert!(text.contains("valid_size: 25"), "{text}");
        assert!(text.contains("impulse_len: 8"), "{text}");
    }

    #[test]
    fn test_convolve_steady_state() {
        let kernel = vec![1.0, 0.5, 0.25, 0.125]; // 4 samples
        let signal = vec![1.0; 100];

        let engine = ConvolutionEngine::new(&kernel).unwrap();
        assert_eq!(engine.transient_samples(), 3);
        assert_eq!(engine.impulse_length(), 4);

        // Full convolution
        let full = engine.convolve(&signal).unwrap();
        assert_eq!(full.len(), 103); // 100 + 4 - 1

        let steady = engine.convolve_steady_state(&signal).unwrap();
        assert_eq!(steady.len(), 100); // 103 - 3
        assert_all_close(&full[3..], &steady, 1e-10);
        assert!((steady[0] - 1.875).abs() < 1e-10);
    }

    #[test]
    fn test_fir_filter_is_causal_and_truncated() {
        let signal = vec![1.0, 0.0, 0.0, 2.0, 0.0];
        let taps = vec![0.5, 0.25];

        let filtered = fir_filter(&taps, &signal).unwrap();
        assert_eq!(filtered, vec![0.5, 0.25, 0.0, 1.0, 0.5]);

        // Long kernels go through the overlap-save engine
        let long_taps: Vec<f64> = (0..100).map(|i| 1.0 / (i + 1) as f64).collect();
        let long_signal: Vec<f64> = (0..300).map(|i| (i as f64 * 0.05).cos()).collect();
        let expected = &direct_convolve(&long_signal, &long_taps)[..300];
        assert_all_close(expected, &fir_filter(&long_taps, &long_signal).unwrap(), 1e-9);

        assert!(fir_filter(&[], &signal).is_err());
    }
}
