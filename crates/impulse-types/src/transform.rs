//! Transform direction and scaling conventions.
//!
//! The scaling rules mirror the usual `norm=` switch of array libraries:
//!
//! | mode       | forward     | inverse     |
//! |------------|-------------|-------------|
//! | `Backward` | 1           | 1/N         |
//! | `Ortho`    | 1/√N        | 1/√N        |
//! | `Forward`  | 1/N         | 1           |
//! | `Custom`   | value       | value       |

use serde::{Deserialize, Serialize};

/// Direction of a Fourier transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FftDirection {
    /// Time to frequency, kernel e^{-2πi kn/N}.
    #[default]
    Forward,
    /// Frequency to time, kernel e^{+2πi kn/N}.
    Inverse,
}

impl FftDirection {
    #[inline]
    pub fn is_forward(&self) -> bool {
        matches!(self, Self::Forward)
    }

    /// The opposite direction.
    #[inline]
    pub fn reverse(&self) -> Self {
        match self {
            Self::Forward => Self::Inverse,
            Self::Inverse => Self::Forward,
        }
    }
}

/// Normalization applied to transform output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// Unscaled forward, 1/N on the inverse.
    #[default]
    Backward,
    /// 1/√N in both directions (unitary transform).
    Ortho,
    /// 1/N on the forward, unscaled inverse.
    Forward,
    /// Explicit factor applied in both directions.
    Custom(f64),
}

impl Normalization {
    /// Scale factor for a transform of length `len` in `direction`.
    pub fn factor(&self, len: usize, direction: FftDirection) -> f64 {
        let n = len.max(1) as f64;
        match (self, direction) {
            (Self::Backward, FftDirection::Forward) => 1.0,
            (Self::Backward, FftDirection::Inverse) => 1.0 / n,
            (Self::Ortho, _) => 1.0 / n.sqrt(),
            (Self::Forward, FftDirection::Forward) => 1.0 / n,
            (Self::Forward, FftDirection::Inverse) => 1.0,
            (Self::Custom(value), _) => *value,
        }
    }

    /// Whether the factor for `direction` is exactly one, so scaling can be skipped.
    #[inline]
    pub fn is_identity(&self, len: usize, direction: FftDirection) -> bool {
        self.factor(len, direction) == 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backward_factors() {
        let norm = Normalization::Backward;
        assert_eq!(norm.factor(8, FftDirection::Forward), 1.0);
        assert!((norm.factor(8, FftDirection::Inverse) - 0.125).abs() < 1e-15);
    }

    #[test]
    fn test_ortho_is_symmetric() {
        let norm = Normalization::Ortho;
        let f = norm.factor(16, FftDirection::Forward);
        let i = norm.factor(16, FftDirection::Inverse);
        assert!((f - 0.25).abs() < 1e-15);
        assert_eq!(f, i);
    }

    #[test]
    fn test_forward_and_custom() {
        assert!((Normalization::Forward.factor(4, FftDirection::Forward) - 0.25).abs() < 1e-15);
        assert_eq!(Normalization::Forward.factor(4, FftDirection::Inverse), 1.0);
        assert_eq!(Normalization::Custom(3.0).factor(4, FftDirection::Inverse), 3.0);
        assert!(Normalization::Custom(1.0).is_identity(99, FftDirection::Forward));
    }

    #[test]
    fn test_round_trip_products() {
        // Every built-in mode scales a forward+inverse pair by exactly 1/N overall.
        for norm in [Normalization::Backward, Normalization::Ortho, Normalization::Forward] {
            let total = norm.factor(10, FftDirection::Forward) * norm.factor(10, FftDirection::Inverse);
            assert!((total - 0.1).abs() < 1e-15, "{norm:?}");
        }
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Normalization::Ortho).unwrap();
        assert_eq!(json, "\"ortho\"");

        let custom: Normalization = serde_json::from_str("{\"custom\":0.5}").unwrap();
        assert_eq!(custom, Normalization::Custom(0.5));

        let dir: FftDirection = serde_json::from_str("\"inverse\"").unwrap();
        assert_eq!(dir, FftDirection::Inverse);
        assert_eq!(dir.reverse(), FftDirection::Forward);
    }
}
