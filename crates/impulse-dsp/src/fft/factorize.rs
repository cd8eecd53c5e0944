//! Transform length factorization.
//!
//! A length `N` is split into the radices the real-FFT passes run with:
//! factors of 4 first, then at most one factor of 2 which is moved to the
//! front of the list, then odd primes in ascending order.

use crate::error::{DspError, DspResult};

/// Gaps between consecutive integers coprime to 210 = 2·3·5·7, starting at 11.
///
/// One turn of the wheel advances by exactly 210 and visits 48 candidates,
/// skipping every multiple of 2, 3, 5 and 7.
const WHEEL_210: [usize; 48] = [
    2, 4, 2, 4, 6, 2, 6, 4, 2, 4, 6, 6, 2, 6, 4, 2, 6, 4, 6, 8, 4, 2, 4, 2, 4, 8, 6, 4, 6, 2,
    4, 6, 2, 6, 6, 4, 2, 4, 6, 2, 6, 4, 2, 4, 2, 10, 2, 10,
];

/// Small primes tried before the wheel takes over.
const SMALL_ODD_PRIMES: [usize; 3] = [3, 5, 7];

/// Ordered radix list for one transform length.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FactorSequence {
    /// Transform length the factors multiply to.
    transform_len: usize,

    /// Radices in pass order.
    factors: Vec<usize>,
}

impl FactorSequence {
    /// Transform length this sequence factorizes.
    #[inline]
    pub fn transform_len(&self) -> usize {
        self.transform_len
    }

    /// Radices in pass order.
    #[inline]
    pub fn factors(&self) -> &[usize] {
        &self.factors
    }

    /// Number of passes.
    #[inline]
    pub fn count(&self) -> usize {
        self.factors.len()
    }

    /// True only for the degenerate length-1 transform.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.factors.iter().copied()
    }

    /// Product of all factors.
    pub fn product(&self) -> usize {
        self.factors.iter().product()
    }
}

/// Factorize a transform length into its pass radices.
///
/// # Errors
///
/// Returns [`DspError::InvalidLength`] for `n == 0`.
pub fn factorize(n: usize) -> DspResult<FactorSequence> {
    if n == 0 {
        return Err(DspError::InvalidLength(n));
    }

    let mut rest = n;
    let mut factors = Vec::new();

    while rest % 4 == 0 {
        factors.push(4);
        rest /= 4;
    }
    let fours = factors.len();

    let has_two = rest % 2 == 0;
    if has_two {
        factors.push(2);
        rest /= 2;
    }

    for divisor in SMALL_ODD_PRIMES {
        while rest % divisor == 0 {
            factors.push(divisor);
            rest /= divisor;
        }
    }

    let mut divisor = 11;
    'wheel: loop {
        for gap in WHEEL_210 {
            if divisor > rest / divisor {
                break 'wheel;
            }
            while rest % divisor == 0 {
                factors.push(divisor);
                rest /= divisor;
            }
            divisor += gap;
        }
    }
    if rest > 1 {
        factors.push(rest);
    }

    // The lone 2 leads so the outermost pass uses the radix-2 butterfly.
    if has_two {
        factors[..=fours].rotate_right(1);
    }

    Ok(FactorSequence {
        transform_len: n,
        factors,
    })
}

/// Smallest length `>= n` whose prime factors all lie in {2, 3, 5, 7, 11}.
///
/// Lengths up to 6 are returned unchanged, as is any `n` so close to
/// `usize::MAX` that no such length is representable.
pub fn good_size(n: usize) -> usize {
    if n <= 6 {
        return n;
    }

    let limit = n.saturating_mul(2);
    let mut best = limit;
    let mut f2 = 1;
    while f2 < best {
        let mut f23 = f2;
        while f23 < best {
            let mut f235 = f23;
            while f235 < best {
                let mut f2357 = f235;
                while f2357 < best {
                    let mut f235711 = f2357;
                    while f235711 < best {
                        if f235711 >= n {
                            best = f235711;
                        }
                        f235711 = match f235711.checked_mul(11) {
                            Some(next) => next,
                            None => break,
                        };
                    }
                    f2357 = match f2357.checked_mul(7) {
                        Some(next) => next,
                        None => break,
                    };
                }
                f235 = match f235.checked_mul(5) {
                    Some(next) => next,
                    None => break,
                };
            }
            f23 = match f23.checked_mul(3) {
                Some(next) => next,
                None => break,
            };
        }
        f2 = match f2.checked_mul(2) {
            Some(next) => next,
            None => break,
        };
    }

    // Only reachable when 2n saturated and no smooth length fits in usize.
    if best == limit && n.checked_mul(2).is_none() {
        return n;
    }
    best
}
