//! # impulse-dsp
//!
//! Signal processing core built around an arbitrary-length real FFT planner.
//!
//! - **FFT/IFFT**: factorization, twiddle tables, plans and packed-real
//!   spectra, executed by a pluggable backend
//! - **Convolution**: overlap-save FFT convolution with Rayon
//! - **FIR design**: least-squares and windowed-sinc linear-phase filters
//! - **Resampling**: polyphase and Fourier-domain rate conversion
//! - **Windows**: Hann, Hamming, Blackman, Bartlett and Kaiser
//! - **Sequences**: maximum length sequences and prime utilities

pub mod error;
pub mod fft;
pub mod convolution;
pub mod fir;
pub mod lfsr;
pub mod primes;
pub mod resample;
pub mod window;

pub use error::{DspError, DspResult};
pub use fft::{FftBackend, FftEngine, RealFftPlan, RustFftBackend};
pub use convolution::ConvolutionEngine;
pub use fir::{firls, firwin};
pub use lfsr::{max_len_seq, Lfsr};
pub use resample::{resample_fft, resample_poly, upfirdn, PolyphaseConfig};
pub use window::WindowType;
