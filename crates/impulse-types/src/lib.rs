//! # impulse-types
//!
//! Value types shared across the impulse workspace:
//! - Transform direction and normalization conventions
//! - Caller-facing sample buffers that are either real or complex

pub mod signal;
pub mod transform;

pub use signal::*;
pub use transform::*;

/// Re-export num_complex for convenience
pub use num_complex::Complex64;
