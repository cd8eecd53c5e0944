//! Execution backends for planned transforms.
//!
//! The planning layer decides factorization, twiddles and data layout; a
//! backend runs the butterflies. [`RustFftBackend`] delegates to `rustfft`
//! for complex data and `realfft` for real data, caching their plans by
//! length. Backends never normalize.

use super::packed::{pack, unpack};
use super::plan::RealFftPlan;
use crate::error::{DspError, DspResult};
use impulse_types::FftDirection;
use num_complex::Complex64;
use realfft::RealFftPlanner;
use rustfft::FftPlanner;

/// Executes unnormalized transforms for a [`RealFftPlan`].
pub trait FftBackend {
    /// Forward transform of `plan.len()` real samples, in place, leaving the
    /// packed spectrum layout.
    fn forward_packed(&mut self, plan: &RealFftPlan, data: &mut [f64]) -> DspResult<()>;

    /// Inverse of [`FftBackend::forward_packed`], in place, unnormalized.
    fn backward_packed(&mut self, plan: &RealFftPlan, data: &mut [f64]) -> DspResult<()>;

    /// Complex transform of any non-zero length, in place.
    fn complex(&mut self, data: &mut [Complex64], direction: FftDirection) -> DspResult<()>;
}

/// Backend on top of `rustfft` and `realfft`.
///
/// Only the plan's length is read: `realfft` factorizes and builds twiddles
/// on its own, so the plan's factor descriptors and twiddle arena are not
/// consulted on this path.
pub struct RustFftBackend {
    /// Complex FFT planner.
    complex_planner: FftPlanner<f64>,

    /// Real FFT planner.
    real_planner: RealFftPlanner<f64>,
}

impl RustFftBackend {
    pub fn new() -> Self {
        Self {
            complex_planner: FftPlanner::new(),
            real_planner: RealFftPlanner::new(),
        }
    }
}

impl Default for RustFftBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn check_plan_len(plan: &RealFftPlan, data: &[f64]) -> DspResult<()> {
    if data.len() != plan.len() {
        return Err(DspError::LengthMismatch {
            expected: plan.len(),
            actual: data.len(),
        });
    }
    Ok(())
}

impl FftBackend for RustFftBackend {
    fn forward_packed(&mut self, plan: &RealFftPlan, data: &mut [f64]) -> DspResult<()> {
        check_plan_len(plan, data)?;
        if plan.is_empty() {
            // Length 1: the transform is the identity.
            return Ok(());
        }

        let r2c = self.real_planner.plan_fft_forward(plan.len());
        let mut input = data.to_vec();
        let mut spectrum = r2c.make_output_vec();
        r2c.process(&mut input, &mut spectrum)
            .map_err(|e| DspError::ExecutionFailure(e.to_string()))?;

        data.copy_from_slice(&pack(&spectrum, plan.len())?);
        Ok(())
    }

    fn backward_packed(&mut self, plan: &RealFftPlan, data: &mut [f64]) -> DspResult<()> {
        check_plan_len(plan, data)?;
        if plan.is_empty() {
            return Ok(());
        }

        let c2r = self.real_planner.plan_fft_inverse(plan.len());
        let mut spectrum = unpack(data)?;
        let mut output = c2r.make_output_vec();
        c2r.process(&mut spectrum, &mut output)
            .map_err(|e| DspError::ExecutionFailure(e.to_string()))?;

        data.copy_from_slice(&output);
        Ok(())
    }

    fn complex(&mut self, data: &mut [Complex64], direction: FftDirection) -> DspResult<()> {
        if data.is_empty() {
            return Err(DspError::InvalidLength(0));
        }

        let direction = match direction {
            FftDirection::Forward => rustfft::FftDirection::Forward,
            FftDirection::Inverse => rustfft::FftDirection::Inverse,
        };
        let fft = self.complex_planner.plan_fft(data.len(), direction);
        fft.process(data);
        Ok(())
    }
}
