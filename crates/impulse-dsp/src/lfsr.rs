//! Maximum length sequences from a Fibonacci linear feedback shift register.

use crate::error::{DspError, DspResult};

/// Largest supported register width.
pub const MAX_BITS: u32 = 32;

/// Feedback taps giving a maximal-length register for each width in 2..=32.
const MLS_TAPS: [&[u32]; 31] = [
    &[1],
    &[2],
    &[3],
    &[3],
    &[5],
    &[6],
    &[7, 6, 1],
    &[5],
    &[7],
    &[9],
    &[11, 10, 4],
    &[12, 11, 8],
    &[13, 12, 2],
    &[14],
    &[15, 13, 4],
    &[14],
    &[11],
    &[18, 17, 14],
    &[17],
    &[19],
    &[21],
    &[18],
    &[23, 22, 17],
    &[22],
    &[25, 24, 20],
    &[26, 25, 22],
    &[25],
    &[27],
    &[29, 28, 7],
    &[28],
    &[31, 30, 10],
];

/// Primitive feedback taps for an `nbits` register, if tabulated.
pub fn mls_taps(nbits: u32) -> Option<&'static [u32]> {
    if (2..=MAX_BITS).contains(&nbits) {
        Some(MLS_TAPS[(nbits - 2) as usize])
    } else {
        None
    }
}

/// Fibonacci LFSR.
///
/// Each step emits the oldest register bit, then feeds back the XOR of
/// that bit and every tapped bit. Bit `i` of [`Lfsr::state`] is the bit
/// emitted `i` steps from now, before feedback reaches it.
#[derive(Clone, Debug)]
pub struct Lfsr {
    /// Current register contents.
    state: u64,

    /// Initial register contents, restored by `reset`.
    seed: u64,

    /// Feedback taps (XOR mask).
    taps: u64,

    /// Register width.
    nbits: u32,

    /// Bits generated so far.
    count: u64,
}

impl Lfsr {
    /// Create a register with explicit taps and seed.
    ///
    /// Taps are positions in `1..=nbits`; `nbits` folds onto the output bit.
    /// Only the low `nbits` bits of `seed` are used and they must not all be
    /// zero.
    pub fn new(nbits: u32, taps: &[u32], seed: u64) -> DspResult<Self> {
        if !(1..=MAX_BITS).contains(&nbits) {
            return Err(DspError::invalid(format!(
                "register width must be in 1..={MAX_BITS}, got {nbits}"
            )));
        }
        if let Some(&tap) = taps.iter().find(|&&t| t == 0 || t > nbits) {
            return Err(DspError::invalid(format!(
                "tap {tap} outside 1..={nbits}"
            )));
        }

        let seed = seed & Self::register_mask(nbits);
        if seed == 0 {
            return Err(DspError::invalid("LFSR state must not be all zeros"));
        }

        let taps = taps.iter().fold(0u64, |mask, &t| mask | 1 << (t % nbits));

        Ok(Self {
            state: seed,
            seed,
            taps,
            nbits,
            count: 0,
        })
    }

    /// Maximal-length register of width `nbits`, seeded with all ones.
    pub fn max_length(nbits: u32) -> DspResult<Self> {
        let taps = mls_taps(nbits).ok_or_else(|| {
            DspError::invalid(format!(
                "no maximal-length taps for {nbits} bits, supported widths are 2..={MAX_BITS}"
            ))
        })?;
        Self::new(nbits, taps, Self::register_mask(nbits))
    }

    /// Same taps, different seed.
    pub fn with_seed(self, seed: u64) -> DspResult<Self> {
        let seed = seed & Self::register_mask(self.nbits);
        if seed == 0 {
            return Err(DspError::invalid("LFSR state must not be all zeros"));
        }
        Ok(Self {
            state: seed,
            seed,
            count: 0,
            ..self
        })
    }

    #[inline]
    fn register_mask(nbits: u32) -> u64 {
        (1u64 << nbits) - 1
    }

    /// Register width.
    pub fn nbits(&self) -> u32 {
        self.nbits
    }

    /// Period of a maximal-length register of this width, `2^nbits - 1`.
    ///
    /// Registers built from non-primitive taps repeat sooner.
    pub fn period(&self) -> u64 {
        Self::register_mask(self.nbits)
    }

    /// Current register contents.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Generate the next bit.
    pub fn next_bit(&mut self) -> u8 {
        let out = self.state & 1;
        // XOR the output bit with all tapped bits
        let feedback = out ^ u64::from((self.state & self.taps).count_ones() & 1);

        // Shift and insert feedback
        self.state = (self.state >> 1) | (feedback << (self.nbits - 1));
        self.count += 1;

        out as u8
    }

    /// Generate N bits.
    pub fn generate(&mut self, n: usize) -> Vec<u8> {
        (0..n).map(|_| self.next_bit()).collect()
    }

    /// Generate N samples mapped to +1.0 for a one and -1.0 for a zero.
    pub fn generate_bipolar(&mut self, n: usize) -> Vec<f64> {
        (0..n)
            .map(|_| if self.next_bit() == 1 { 1.0 } else { -1.0 })
            .collect()
    }

    /// Reset the generator to its seed.
    pub fn reset(&mut self) {
        self.state = self.seed;
        self.count = 0;
    }

    /// Get the current count of generated bits.
    pub fn bit_count(&self) -> u64 {
        self.count
    }
}

/// One full period of the maximum length sequence of width `nbits`,
/// starting from the all-ones state.
pub fn max_len_seq(nbits: u32) -> DspResult<Vec<u8>> {
    let mut lfsr = Lfsr::max_length(nbits)?;
    let period = lfsr.period() as usize;
    Ok(lfsr.generate(period))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mls4_sequence() {
        let seq = max_len_seq(4).unwrap();
        assert_eq!(seq, vec![1, 1, 1, 1, 0, 1, 0, 1, 1, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn test_mls3_sequence() {
        assert_eq!(max_len_seq(3).unwrap(), vec![1, 1, 1, 0, 1, 0, 0]);
    }

    #[test]
    fn test_custom_seed_and_state() {
        let mut lfsr = Lfsr::max_length(5).unwrap().with_seed(0b01001).unwrap();
        assert_eq!(lfsr.generate(10), vec![1, 0, 0, 1, 0, 0, 0, 0, 1, 0]);
        assert_eq!(lfsr.state(), 0b11101);
        assert_eq!(lfsr.bit_count(), 10);

        lfsr.reset();
        assert_eq!(lfsr.state(), 0b01001);
        assert_eq!(lfsr.bit_count(), 0);
    }

    #[test]
    fn test_sequence_length() {
        for nbits in 2..=16 {
            let mut lfsr = Lfsr::max_length(nbits).unwrap();
            let initial = lfsr.state();
            let period = lfsr.period();

            // Generate full sequence, never revisiting the start early
            for step in 1..=period {
                lfsr.next_bit();
                if step < period {
                    assert_ne!(lfsr.state(), initial, "nbits {nbits} repeats at {step}");
                }
            }

            // Should return to initial state
            assert_eq!(lfsr.state(), initial, "nbits {nbits}");
        }
    }

    #[test]
    fn test_mls_balance() {
        // One more one than zeros over a period
        for nbits in [7, 10, 13] {
            let bits = max_len_seq(nbits).unwrap();
            let ones: usize = bits.iter().map(|&b| b as usize).sum();
            assert_eq!(ones, 1 << (nbits - 1));
            assert_eq!(bits.len() - ones, (1 << (nbits - 1)) - 1);
        }
    }

    #[test]
    fn test_bipolar_autocorrelation() {
        let mut lfsr = Lfsr::max_length(6).unwrap();
        let n = lfsr.period() as usize;
        let x = lfsr.generate_bipolar(n);
        assert!(x.iter().all(|&v| v == 1.0 || v == -1.0));

        // Circular autocorrelation is n at lag 0 and -1 elsewhere
        for lag in 0..n {
            let r: f64 = (0..n).map(|i| x[i] * x[(i + lag) % n]).sum();
            let expected = if lag == 0 { n as f64 } else { -1.0 };
            assert!((r - expected).abs() < 1e-12, "lag {lag}: {r}");
        }
    }

    #[test]
    fn test_top_widths_are_tabulated() {
        assert_eq!(mls_taps(32), Some(&[31, 30, 10][..]));
        assert_eq!(Lfsr::max_length(32).unwrap().period(), u32::MAX as u64);
        let mut lfsr = Lfsr::max_length(32).unwrap();
        assert_eq!(lfsr.generate(32), vec![1; 32]);
    }

    #[test]
    fn test_validation() {
        assert!(Lfsr::max_length(1).is_err());
        assert!(Lfsr::max_length(33).unwrap_err().is_invalid_argument());
        assert!(Lfsr::new(4, &[3], 0).is_err());
        // Seed bits above the register width are dropped
        assert!(Lfsr::new(4, &[3], 0b1_0000).is_err());
        assert!(Lfsr::new(4, &[5], 1).is_err());
        assert!(Lfsr::new(4, &[0], 1).is_err());
        assert!(Lfsr::max_length(4).unwrap().with_seed(0).is_err());
    }
}
