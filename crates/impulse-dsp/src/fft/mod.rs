//! FFT/IFFT operations.
//!
//! This module provides a high-level FFT engine with:
//! - Per-length [`RealFftPlan`] caching
//! - Real-to-complex transforms in packed and unpacked layouts
//! - Selectable [`Normalization`]
//! - Any transform length, not only powers of two
//!
//! The planning pieces live in submodules: [`factorize`] splits the length
//! into radices, [`twiddle`] serves roots of unity, [`plan`] lays out the
//! twiddle buffer and [`packed`] converts spectra between layouts. The
//! butterflies themselves run in an [`FftBackend`].

pub mod backend;
pub mod factorize;
pub mod packed;
pub mod plan;
pub mod twiddle;

pub use backend::{FftBackend, RustFftBackend};
pub use factorize::{factorize, good_size, FactorSequence};
pub use packed::{half_len, pack, symmetrize, unpack, HalfSpectrum};
pub use plan::{FactorKind, PlanFactor, RealFftPlan, TwiddleSpan};
pub use twiddle::{nth_root_of_unity, TwiddleGenerator};

use crate::error::{DspError, DspResult};
use impulse_types::{FftDirection, Normalization, Signal};
use num_complex::Complex64;
use std::collections::HashMap;
use std::sync::Arc;

/// FFT engine with cached plans.
pub struct FftEngine<B: FftBackend = RustFftBackend> {
    /// Executes the butterflies.
    backend: B,

    /// Real FFT plans by length.
    plans: HashMap<usize, Arc<RealFftPlan>>,

    /// Scaling used by the convenience methods.
    normalization: Normalization,
}

impl FftEngine {
    /// Create a new FFT engine on the `rustfft` backend.
    pub fn new() -> Self {
        Self::with_backend(RustFftBackend::new())
    }
}

impl Default for FftEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: FftBackend> FftEngine<B> {
    /// Create an engine on a custom backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            plans: HashMap::new(),
            normalization: Normalization::default(),
        }
    }

    /// Builder-style override of the default normalization.
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    pub fn set_normalization(&mut self, normalization: Normalization) {
        self.normalization = normalization;
    }

    /// Get the cached real FFT plan for `len`, building it on first use.
    pub fn plan(&mut self, len: usize) -> DspResult<Arc<RealFftPlan>> {
        if let Some(plan) = self.plans.get(&len) {
            return Ok(Arc::clone(plan));
        }

        let plan = Arc::new(RealFftPlan::new(len)?);
        tracing::debug!(len, cached = self.plans.len(), "Caching real FFT plan");
        self.plans.insert(len, Arc::clone(&plan));
        Ok(plan)
    }

    /// Number of cached plans.
    pub fn cached_plans(&self) -> usize {
        self.plans.len()
    }

    /// Perform forward FFT on complex data in-place.
    pub fn fft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        self.complex_inplace(data, FftDirection::Forward, self.normalization)
    }

    /// Perform inverse FFT on complex data in-place.
    pub fn ifft_inplace(&mut self, data: &mut [Complex64]) -> DspResult<()> {
        self.complex_inplace(data, FftDirection::Inverse, self.normalization)
    }

    /// Perform forward FFT on complex data, returning new buffer.
    pub fn fft(&mut self, data: &[Complex64]) -> DspResult<Vec<Complex64>> {
        let mut result = data.to_vec();
        self.fft_inplace(&mut result)?;
        Ok(result)
    }

    /// Perform inverse FFT on complex data, returning new buffer.
    pub fn ifft(&mut self, data: &[Complex64]) -> DspResult<Vec<Complex64>> {
        let mut result = data.to_vec();
        self.ifft_inplace(&mut result)?;
        Ok(result)
    }

    fn complex_inplace(
        &mut self,
        data: &mut [Complex64],
        direction: FftDirection,
        normalization: Normalization,
    ) -> DspResult<()> {
        let len = data.len();
        if len == 0 {
            return Err(DspError::InvalidLength(len));
        }

        self.backend.complex(data, direction)?;
        scale_complex(data, normalization.factor(len, direction));
        Ok(())
    }

    /// Forward real FFT in place, leaving the packed layout.
    pub fn rfft_packed_inplace(&mut self, data: &mut [f64]) -> DspResult<()> {
        self.real_inplace(data, FftDirection::Forward, self.normalization)
    }

    /// Inverse of [`FftEngine::rfft_packed_inplace`].
    pub fn irfft_packed_inplace(&mut self, data: &mut [f64]) -> DspResult<()> {
        self.real_inplace(data, FftDirection::Inverse, self.normalization)
    }

    /// Forward real FFT into the packed layout.
    ///
    /// Input: N real samples
    /// Output: N reals, see [`packed`]
    pub fn rfft_packed(&mut self, data: &[f64]) -> DspResult<Vec<f64>> {
        let mut result = data.to_vec();
        self.rfft_packed_inplace(&mut result)?;
        Ok(result)
    }

    /// Inverse real FFT from the packed layout.
    pub fn irfft_packed(&mut self, packed: &[f64]) -> DspResult<Vec<f64>> {
        let mut result = packed.to_vec();
        self.irfft_packed_inplace(&mut result)?;
        Ok(result)
    }

    fn real_inplace(
        &mut self,
        data: &mut [f64],
        direction: FftDirection,
        normalization: Normalization,
    ) -> DspResult<()> {
        let plan = self.plan(data.len())?;
        match direction {
            FftDirection::Forward => self.backend.forward_packed(&plan, data)?,
            FftDirection::Inverse => self.backend.backward_packed(&plan, data)?,
        }
        scale_real(data, normalization.factor(plan.len(), direction));
        Ok(())
    }

    /// Perform forward real-to-complex FFT.
    ///
    /// Input: N real samples
    /// Output: N/2 + 1 complex samples (Hermitian symmetry exploited)
    pub fn rfft(&mut self, data: &[f64]) -> DspResult<Vec<Complex64>> {
        unpack(&self.rfft_packed(data)?)
    }

    /// Perform inverse complex-to-real FFT.
    ///
    /// Input: N/2 + 1 complex samples
    /// Output: N real samples
    ///
    /// The imaginary parts of the DC bin and, for even `output_len`, the
    /// Nyquist bin are ignored.
    pub fn irfft(&mut self, data: &[Complex64], output_len: usize) -> DspResult<Vec<f64>> {
        let mut packed = pack(data, output_len)?;
        self.irfft_packed_inplace(&mut packed)?;
        Ok(packed)
    }

    /// Forward real FFT expanded to all N bins.
    pub fn rfft_full(&mut self, data: &[f64]) -> DspResult<Vec<Complex64>> {
        let packed = self.rfft_packed(data)?;
        symmetrize(HalfSpectrum::Packed(&packed))
    }

    /// Transform a real or complex signal.
    ///
    /// - complex input yields a complex output of the same length
    /// - real input, forward, yields the `N/2 + 1` bin half spectrum
    /// - real input, inverse, is promoted to complex first
    pub fn transform(
        &mut self,
        signal: &Signal,
        direction: FftDirection,
        normalization: Normalization,
    ) -> DspResult<Signal> {
        match (signal, direction) {
            (Signal::Real(samples), FftDirection::Forward) => {
                let mut packed = samples.clone();
                self.real_inplace(&mut packed, direction, normalization)?;
                Ok(Signal::Complex(unpack(&packed)?))
            }
            _ => {
                let mut data = signal.clone().into_complex();
                self.complex_inplace(&mut data, direction, normalization)?;
                Ok(Signal::Complex(data))
            }
        }
    }
}

fn scale_complex(data: &mut [Complex64], factor: f64) {
    if factor != 1.0 {
        for x in data.iter_mut() {
            *x *= factor;
        }
    }
}

fn scale_real(data: &mut [f64], factor: f64) {
    if factor != 1.0 {
        for x in data.iter_mut() {
            *x *= factor;
        }
    }
}

/// Compute the power spectrum (magnitude squared) of a signal.
pub fn power_spectrum(signal: &[f64]) -> DspResult<Vec<f64>> {
    let mut engine = FftEngine::new();
    let spectrum = engine.rfft(signal)?;
    Ok(spectrum.iter().map(|c| c.norm_sqr()).collect())
}

/// Compute the magnitude spectrum of a signal.
pub fn magnitude_spectrum(signal: &[f64]) -> DspResult<Vec<f64>> {
    let mut engine = FftEngine::new();
    let spectrum = engine.rfft(signal)?;
    Ok(spectrum.iter().map(|c| c.norm()).collect())
}

/// Compute the phase spectrum of a signal (in radians).
pub fn phase_spectrum(signal: &[f64]) -> DspResult<Vec<f64>> {
    let mut engine = FftEngine::new();
    let spectrum = engine.rfft(signal)?;
    Ok(spectrum.iter().map(|c| c.arg()).collect())
}

/// Zero-pad a signal to the next fast transform length.
pub fn zero_pad_to_good_size(signal: &[f64]) -> Vec<f64> {
    zero_pad(signal, good_size(signal.len()))
}

/// Zero-pad a signal to a specific length.
pub fn zero_pad(signal: &[f64], new_len: usize) -> Vec<f64> {
    let mut result = signal.to_vec();
    if new_len > signal.len() {
        result.resize(new_len, 0.0);
    }
    result
}
