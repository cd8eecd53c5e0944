//! Sample-rate conversion.
//!
//! - [`upfirdn`]: upsample, FIR filter, downsample in one pass
//! - [`resample_poly`]: rational-factor resampling with an anti-aliasing
//!   filter designed by [`firwin`]
//! - [`resample_fft`]: band-limited resampling in the Fourier domain
//!
//! Polyphase resampling keeps the signal aligned: sample `i` of the output
//! sits at input position `i * down / up`.

use crate::error::{DspError, DspResult};
use crate::fft::FftEngine;
use crate::fir::firwin;
use crate::window::WindowType;
use num_complex::Complex64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Outputs below this count are computed on the calling thread.
const PARALLEL_MIN_OUTPUTS: usize = 4096;

/// Anti-aliasing filter settings for [`resample_poly`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyphaseConfig {
    /// Window applied to the ideal lowpass.
    pub window: WindowType,

    /// Filter half-length per polyphase branch. The full filter has
    /// `2 * taps_per_phase * max(up, down) + 1` taps.
    pub taps_per_phase: usize,
}

impl Default for PolyphaseConfig {
    fn default() -> Self {
        Self {
            window: WindowType::Kaiser { beta: 5.0 },
            taps_per_phase: 10,
        }
    }
}

/// Length of the [`upfirdn`] output.
#[inline]
pub fn upfirdn_len(filter_len: usize, input_len: usize, up: usize, down: usize) -> usize {
    ((input_len - 1) * up + filter_len - 1) / down + 1
}

/// Upsample by `up`, filter with `h`, downsample by `down`.
///
/// Equivalent to inserting `up - 1` zeros after every input sample,
/// convolving with `h` and keeping every `down`-th sample, without
/// materializing the zeros.
pub fn upfirdn(h: &[f64], x: &[f64], up: usize, down: usize) -> DspResult<Vec<f64>> {
    if up == 0 || down == 0 {
        return Err(DspError::invalid(format!(
            "up and down must be positive, got {up} and {down}"
        )));
    }
    if h.is_empty() || x.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }

    let output_len = upfirdn_len(h.len(), x.len(), up, down);

    let sample = |i: usize| -> f64 {
        let pos = i * down;
        // Only taps aligned with a non-zero upsampled input contribute
        let mut k = pos % up;
        let mut acc = 0.0;
        while k <= pos && k < h.len() {
            let j = (pos - k) / up;
            if j < x.len() {
                acc += h[k] * x[j];
            }
            k += up;
        }
        acc
    };

    let output = if output_len < PARALLEL_MIN_OUTPUTS {
        (0..output_len).map(sample).collect()
    } else {
        (0..output_len).into_par_iter().map(sample).collect()
    };

    Ok(output)
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Resample `x` by the rational factor `up / down` with a polyphase filter.
///
/// The output has `ceil(x.len() * up / down)` samples.
pub fn resample_poly(
    x: &[f64],
    up: usize,
    down: usize,
    config: &PolyphaseConfig,
) -> DspResult<Vec<f64>> {
    if up == 0 || down == 0 {
        return Err(DspError::invalid(format!(
            "up and down must be positive, got {up} and {down}"
        )));
    }
    if config.taps_per_phase == 0 {
        return Err(DspError::invalid("taps_per_phase must be at least 1"));
    }
    config.window.validate()?;
    if x.is_empty() {
        return Ok(Vec::new());
    }

    let g = gcd(up, down);
    let (up, down) = (up / g, down / g);
    if up == 1 && down == 1 {
        return Ok(x.to_vec());
    }

    let input_len = x.len();
    let output_len = (input_len * up).div_ceil(down);

    let max_rate = up.max(down);
    let half_len = config.taps_per_phase * max_rate;
    let mut taps = firwin(
        2 * half_len + 1,
        &[1.0 / max_rate as f64],
        config.window,
        true,
        2.0,
    )?;
    for tap in taps.iter_mut() {
        *tap *= up as f64;
    }

    // Pad the filter so the output samples land on the filter center
    let pre_pad = down - half_len % down;
    let pre_remove = (half_len + pre_pad) / down;
    let mut post_pad = 0;
    while upfirdn_len(taps.len() + pre_pad + post_pad, input_len, up, down)
        < output_len + pre_remove
    {
        post_pad += 1;
    }

    let mut h = vec![0.0; pre_pad];
    h.extend_from_slice(&taps);
    h.resize(h.len() + post_pad, 0.0);

    tracing::debug!(up, down, taps = h.len(), output_len, "Polyphase resampling");

    let mut y = upfirdn(&h, x, up, down)?;
    y.truncate(pre_remove + output_len);
    Ok(y.split_off(pre_remove))
}

/// Resample `x` to `num` samples by truncating or zero-padding its spectrum.
///
/// The signal is treated as periodic. An even-length Nyquist bin is split
/// between the positive and negative halves when upsampling and folded back
/// when downsampling.
pub fn resample_fft(x: &[f64], num: usize) -> DspResult<Vec<f64>> {
    if x.is_empty() {
        return Err(DspError::InsufficientData { needed: 1, got: 0 });
    }
    if num == 0 {
        return Err(DspError::InvalidLength(num));
    }

    let input_len = x.len();
    let mut engine = FftEngine::new();
    let spectrum = engine.rfft(x)?;

    let kept = num.min(input_len);
    let nyquist = kept / 2 + 1;

    let mut resampled = vec![Complex64::new(0.0, 0.0); num / 2 + 1];
    resampled[..nyquist].copy_from_slice(&spectrum[..nyquist]);

    if kept % 2 == 0 {
        if num < input_len {
            resampled[kept / 2] *= 2.0;
        } else if input_len < num {
            resampled[kept / 2] *= 0.5;
        }
    }

    let mut y = engine.irfft(&resampled, num)?;
    let scale = num as f64 / input_len as f64;
    for v in y.iter_mut() {
        *v *= scale;
    }
    Ok(y)
}
