//! Measure a FIR lowpass with a maximum length sequence.
//!
//! Drives the filter with one period of a bipolar MLS, resamples the
//! response and reports the packed-spectrum magnitudes at a few bins.
//! Set `RUST_LOG=debug` to see plan construction and cache activity.
//!
//! An optional first argument is a JSON resampler config, e.g.
//! `{"window":{"type":"hann"},"taps_per_phase":6}`.

use anyhow::{Context, Result};
use impulse_dsp::fft::{half_len, FftEngine, HalfSpectrum};
use impulse_dsp::{firls, resample_poly, Lfsr, PolyphaseConfig};
use impulse_types::{FftDirection, Normalization, Signal};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config: PolyphaseConfig = match std::env::args().nth(1) {
        Some(json) => serde_json::from_str(&json).context("Invalid resampler config")?,
        None => PolyphaseConfig::default(),
    };

    let mut lfsr = Lfsr::max_length(10)?;
    let excitation = lfsr.generate_bipolar(lfsr.period() as usize);
    tracing::info!(len = excitation.len(), "Generated MLS excitation");

    let taps = firls(
        31,
        &[0.0, 0.2, 0.3, 1.0],
        &[1.0, 1.0, 0.0, 0.0],
        None,
        2.0,
    )
    .context("Lowpass design failed")?;

    let response = impulse_dsp::convolution::fir_filter(&taps, &excitation)?;
    let resampled = resample_poly(&response, 3, 2, &config)?;
    tracing::info!(
        input = response.len(),
        output = resampled.len(),
        "Resampled filter response"
    );

    let mut engine = FftEngine::new().with_normalization(Normalization::Ortho);
    let plan = engine.plan(resampled.len())?;
    tracing::info!(
        len = plan.len(),
        factors = ?plan.sequence().factors(),
        twiddles = plan.twiddle_buffer().len(),
        "Planned real FFT"
    );

    let packed = engine.rfft_packed(&resampled)?;
    let full = impulse_dsp::fft::symmetrize(HalfSpectrum::Packed(&packed))?;
    let bins = half_len(resampled.len());
    for k in [0, bins / 8, bins / 4, bins / 2, bins - 1] {
        tracing::info!(bin = k, magnitude = full[k].norm(), "Spectrum");
    }

    let roundtrip = engine.transform(
        &Signal::Complex(full),
        FftDirection::Inverse,
        Normalization::Ortho,
    )?;
    let error = roundtrip
        .real_parts()
        .iter()
        .zip(&resampled)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    tracing::info!(max_error = error, "Round trip");

    Ok(())
}
