//! Real-FFT plan assembly.
//!
//! A [`RealFftPlan`] ties a [`FactorSequence`] to the twiddle coefficients
//! each pass of a mixed-radix real FFT needs. All coefficients live in one
//! contiguous buffer; every factor descriptor only records spans into it.
//!
//! Per factor `f` at pass `k`, with `l1` the product of the preceding factors
//! and `ido = N / (l1·f)`:
//!
//! - the standard table holds `(f-1)·(ido-1)` values: for `j` in `1..f` and
//!   `i` in `1..=(ido-1)/2`, slots `(j-1)(ido-1) + 2i - 2` and `... + 2i - 1`
//!   hold the real and imaginary part of `root(j·l1·i)`. The last factor has
//!   `ido == 1` and gets no table.
//! - factors above 5 run the generic radix kernel and carry an extra table of
//!   `2f` values: `root((i/2)·N/f)` and its conjugate in mirrored slots.
//!
//! The plan does not run butterflies itself. [`super::RustFftBackend`] uses
//! only [`RealFftPlan::len`] and lets `realfft` plan internally; the
//! descriptors and tables serve backends that execute them directly.

use super::factorize::{factorize, FactorSequence};
use super::twiddle::TwiddleGenerator;
use crate::error::DspResult;

/// Largest radix with a dedicated butterfly.
pub const MAX_SPECIALIZED_RADIX: usize = 5;

/// Which kernel family executes a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FactorKind {
    /// Radix 2, 3, 4 or 5 with a hand-written butterfly.
    Specialized(usize),
    /// Any larger prime, run by the generic kernel.
    Generic(usize),
}

impl FactorKind {
    /// Classify a radix.
    pub fn of(factor: usize) -> Self {
        if factor > MAX_SPECIALIZED_RADIX {
            Self::Generic(factor)
        } else {
            Self::Specialized(factor)
        }
    }

    /// The radix itself.
    #[inline]
    pub fn radix(&self) -> usize {
        match *self {
            Self::Specialized(f) | Self::Generic(f) => f,
        }
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic(_))
    }

    /// Size of the extra generic-kernel table.
    #[inline]
    pub fn generic_table_len(&self) -> usize {
        match *self {
            Self::Specialized(_) => 0,
            Self::Generic(f) => 2 * f,
        }
    }
}

/// A half-open range inside the plan's coefficient buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TwiddleSpan {
    pub start: usize,
    pub len: usize,
}

impl TwiddleSpan {
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// One pass of the transform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanFactor {
    /// Radix and kernel family.
    pub kind: FactorKind,

    /// Product of the radices of all earlier passes.
    pub l1: usize,

    /// Inner stride, `N / (l1 * radix)`.
    pub ido: usize,

    /// Per-step twiddles. `None` for the last pass.
    pub twiddles: Option<TwiddleSpan>,

    /// Generic-kernel twiddles, present for radices above 5.
    pub generic: Option<TwiddleSpan>,
}

impl PlanFactor {
    #[inline]
    pub fn radix(&self) -> usize {
        self.kind.radix()
    }

    /// Number of buffer slots the standard table occupies.
    #[inline]
    pub fn standard_table_len(&self) -> usize {
        (self.radix() - 1) * (self.ido - 1)
    }
}

/// Precomputed plan for real FFTs of one length.
///
/// Immutable once built, so it can be shared across threads behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct RealFftPlan {
    len: usize,
    sequence: FactorSequence,
    factors: Vec<PlanFactor>,
    mem: Vec<f64>,
}

impl RealFftPlan {
    /// Build a plan for length `n`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::DspError::InvalidLength`] for `n == 0`.
    pub fn new(n: usize) -> DspResult<Self> {
        let sequence = factorize(n)?;
        let factors = Self::layout(&sequence);
        let total = factors
            .iter()
            .map(|f| f.twiddles.map_or(0, |s| s.len) + f.generic.map_or(0, |s| s.len))
            .sum();

        let mut plan = Self {
            len: n,
            sequence,
            factors,
            mem: vec![0.0; total],
        };
        plan.fill_twiddles()?;

        tracing::debug!(
            len = n,
            factors = ?plan.sequence.factors(),
            twiddle_len = plan.mem.len(),
            "Built real FFT plan"
        );

        Ok(plan)
    }

    /// Assign each pass its spans, in pass order, back to back.
    fn layout(sequence: &FactorSequence) -> Vec<PlanFactor> {
        let n = sequence.transform_len();
        let last = sequence.count().saturating_sub(1);
        let mut l1 = 1;
        let mut offset = 0;

        sequence
            .iter()
            .enumerate()
            .map(|(k, radix)| {
                let kind = FactorKind::of(radix);
                let ido = n / (l1 * radix);

                let twiddles = (k < last).then(|| {
                    let span = TwiddleSpan {
                        start: offset,
                        len: (radix - 1) * (ido - 1),
                    };
                    offset = span.end();
                    span
                });
                let generic = kind.is_generic().then(|| {
                    let span = TwiddleSpan {
                        start: offset,
                        len: kind.generic_table_len(),
                    };
                    offset = span.end();
                    span
                });

                let factor = PlanFactor {
                    kind,
                    l1,
                    ido,
                    twiddles,
                    generic,
                };
                l1 *= radix;
                factor
            })
            .collect()
    }

    fn fill_twiddles(&mut self) -> DspResult<()> {
        if self.factors.is_empty() {
            return Ok(());
        }

        let n = self.len;
        let roots = TwiddleGenerator::new(n)?;

        for factor in &self.factors {
            let radix = factor.radix();

            if let Some(span) = factor.twiddles {
                let table = &mut self.mem[span.start..span.end()];
                let ido = factor.ido;
                for j in 1..radix {
                    let row = (j - 1) * (ido - 1);
                    for i in 1..=(ido - 1) / 2 {
                        let w = roots.get(j * factor.l1 * i);
                        table[row + 2 * i - 2] = w.re;
                        table[row + 2 * i - 1] = w.im;
                    }
                }
            }

            if let Some(span) = factor.generic {
                let table = &mut self.mem[span.start..span.end()];
                let stride = n / radix;
                table[0] = 1.0;
                table[1] = 0.0;
                let (mut i, mut ic) = (2, 2 * radix - 2);
                while i <= ic {
                    let w = roots.get(i / 2 * stride);
                    table[i] = w.re;
                    table[i + 1] = w.im;
                    table[ic] = w.re;
                    table[ic + 1] = -w.im;
                    i += 2;
                    ic -= 2;
                }
            }
        }

        Ok(())
    }

    /// Transform length.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True for the degenerate length-1 plan, which has no passes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// The factorization the plan was built from.
    #[inline]
    pub fn sequence(&self) -> &FactorSequence {
        &self.sequence
    }

    /// Pass descriptors in execution order.
    #[inline]
    pub fn factors(&self) -> &[PlanFactor] {
        &self.factors
    }

    /// The shared coefficient buffer.
    #[inline]
    pub fn twiddle_buffer(&self) -> &[f64] {
        &self.mem
    }

    /// Standard twiddles of pass `k`, empty for the last pass.
    pub fn twiddles(&self, k: usize) -> &[f64] {
        self.factors[k]
            .twiddles
            .map_or(&[][..], |span| &self.mem[span.start..span.end()])
    }

    /// Generic-kernel twiddles of pass `k`, if its radix needs them.
    pub fn generic_twiddles(&self, k: usize) -> Option<&[f64]> {
        self.factors[k]
            .generic
            .map(|span| &self.mem[span.start..span.end()])
    }

    /// Total coefficient count, the size a plan for `sequence` needs.
    pub fn twiddle_len(sequence: &FactorSequence) -> usize {
        let n = sequence.transform_len();
        let mut l1 = 1;
        let mut total = 0;
        for radix in sequence.iter() {
            let ido = n / (l1 * radix);
            total += (radix - 1) * (ido - 1) + FactorKind::of(radix).generic_table_len();
            l1 *= radix;
        }
        total
    }
}
