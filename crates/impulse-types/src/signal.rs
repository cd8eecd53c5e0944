//! Caller-facing sample buffers.
//!
//! A [`Signal`] is what the high-level transform API accepts and returns:
//! either real samples or complex samples. Real input to a forward transform
//! comes back as a complex half spectrum of `len / 2 + 1` bins.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// A real- or complex-valued sample buffer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "samples", rename_all = "lowercase")]
pub enum Signal {
    /// Real samples.
    Real(Vec<f64>),

    /// Complex samples.
    Complex(Vec<Complex64>),
}

impl Signal {
    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Self::Real(samples) => samples.len(),
            Self::Complex(samples) => samples.len(),
        }
    }

    /// Check if the signal is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_real(&self) -> bool {
        matches!(self, Self::Real(_))
    }

    /// Borrow the real samples, if this is a real signal.
    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            Self::Real(samples) => Some(samples),
            Self::Complex(_) => None,
        }
    }

    /// Borrow the complex samples, if this is a complex signal.
    pub fn as_complex(&self) -> Option<&[Complex64]> {
        match self {
            Self::Real(_) => None,
            Self::Complex(samples) => Some(samples),
        }
    }

    /// Convert into complex samples, promoting real values with a zero imaginary part.
    pub fn into_complex(self) -> Vec<Complex64> {
        match self {
            Self::Real(samples) => samples.into_iter().map(|v| Complex64::new(v, 0.0)).collect(),
            Self::Complex(samples) => samples,
        }
    }

    /// Real parts of every sample.
    pub fn real_parts(&self) -> Vec<f64> {
        match self {
            Self::Real(samples) => samples.clone(),
            Self::Complex(samples) => samples.iter().map(|c| c.re).collect(),
        }
    }

    /// Largest sample magnitude.
    pub fn max_abs(&self) -> f64 {
        match self {
            Self::Real(samples) => samples.iter().map(|v| v.abs()).fold(0.0, f64::max),
            Self::Complex(samples) => samples.iter().map(|c| c.norm()).fold(0.0, f64::max),
        }
    }

    /// Total energy, the sum of squared magnitudes.
    pub fn energy(&self) -> f64 {
        match self {
            Self::Real(samples) => samples.iter().map(|v| v * v).sum(),
            Self::Complex(samples) => samples.iter().map(|c| c.norm_sqr()).sum(),
        }
    }
}

impl From<Vec<f64>> for Signal {
    fn from(samples: Vec<f64>) -> Self {
        Self::Real(samples)
    }
}

impl From<Vec<Complex64>> for Signal {
    fn from(samples: Vec<Complex64>) -> Self {
        Self::Complex(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_basics() {
        let real = Signal::from(vec![3.0, -4.0]);
        assert_eq!(real.len(), 2);
        assert!(real.is_real());
        assert_eq!(real.as_real(), Some(&[3.0, -4.0][..]));
        assert!(real.as_complex().is_none());
        assert!((real.max_abs() - 4.0).abs() < 1e-15);
        assert!((real.energy() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_promotion_to_complex() {
        let promoted = Signal::Real(vec![1.0, 2.0]).into_complex();
        assert_eq!(promoted, vec![Complex64::new(1.0, 0.0), Complex64::new(2.0, 0.0)]);

        let complex = Signal::Complex(vec![Complex64::new(0.0, 1.0)]);
        assert_eq!(complex.real_parts(), vec![0.0]);
        assert!((complex.energy() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_serde_round_trip() {
        let signal = Signal::Complex(vec![Complex64::new(1.0, -1.0)]);
        let json = serde_json::to_string(&signal).unwrap();
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, signal);
    }
}
