use super::backend::HomomorphicBackend;
use super::context::EvaluationContext;
use super::errors::ExtremaResult;
use super::polynomial::ComparisonPolynomial;
use rayon::prelude::*;
use tracing::trace;

/// Ciphertext that decrypts to exactly 0 or 1 under correct parameters.
#[derive(Debug, Clone)]
pub struct IndicatorBit<C> {
    ct: C,
}

impl<C> IndicatorBit<C> {
    /// Wraps a ciphertext the caller knows to encrypt 0 or 1.
    pub fn assume_binary(ct: C) -> Self {
        Self { ct }
    }

    pub fn ciphertext(&self) -> &C {
        &self.ct
    }

    /// `1 - bit`.
    pub fn complement<B>(&self, ctx: &EvaluationContext<'_, B>) -> ExtremaResult<Self>
    where
        B: HomomorphicBackend<Ciphertext = C>,
    {
        Ok(Self {
            ct: ctx.one_minus(&self.ct)?,
        })
    }
}

/// Largest power of two strictly below `k`, for `k >= 2`.
fn split_point(k: usize) -> usize {
    1 << (usize::BITS - 1 - (k - 1).leading_zeros())
}

/// Encrypted comparisons driven by a [`ComparisonPolynomial`].
#[derive(Debug, Clone, Copy)]
pub struct ComparisonCircuit<'p> {
    polynomial: &'p ComparisonPolynomial,
}

impl<'p> ComparisonCircuit<'p> {
    pub fn new(polynomial: &'p ComparisonPolynomial) -> Self {
        Self { polynomial }
    }

    pub fn polynomial(&self) -> &'p ComparisonPolynomial {
        self.polynomial
    }

    pub fn depth(&self) -> u32 {
        self.polynomial.depth()
    }

    /// `[x, x^2, ..., x^d]` with every `x^k` at depth `ceil(log2 k)`.
    ///
    /// `x^k = x^p * x^(k-p)` for the largest power of two `p < k`. Powers in
    /// the same depth band only read lower bands, so each band is computed in
    /// parallel.
    fn powers<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        x: &B::Ciphertext,
    ) -> ExtremaResult<Vec<B::Ciphertext>> {
        let degree = self.polynomial.degree();
        let mut powers = Vec::with_capacity(degree);
        powers.push(x.clone());

        let mut band_start = 2;
        while band_start <= degree {
            let band_end = (2 * (band_start - 1)).min(degree);
            let lower = powers.as_slice();
            let band = (band_start..=band_end)
                .into_par_iter()
                .map(|k| {
                    let p = split_point(k);
                    ctx.multiply(&lower[p - 1], &lower[k - p - 1])
                })
                .collect::<ExtremaResult<Vec<_>>>()?;
            trace!(band_start, band_end, "computed power band");
            powers.extend(band);
            band_start = band_end + 1;
        }
        Ok(powers)
    }

    /// `sum c_k x^k` from a power table; with `mirrored`, evaluates `P(-x)`.
    fn combine<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        powers: &[B::Ciphertext],
        mirrored: bool,
    ) -> ExtremaResult<B::Ciphertext> {
        let t = ctx.plaintext_modulus();
        let mut acc: Option<B::Ciphertext> = None;
        for (k, &coeff) in self.polynomial.coefficients().iter().enumerate().skip(1) {
            if coeff == 0 {
                continue;
            }
            let coeff = if mirrored && k % 2 == 1 {
                (t - coeff) % t
            } else {
                coeff
            };
            let term = ctx.mul_plain(&powers[k - 1], coeff)?;
            acc = Some(match acc {
                Some(sum) => ctx.add(&sum, &term)?,
                None => term,
            });
        }
        let sum = match acc {
            Some(sum) => sum,
            None => ctx.mul_plain(&powers[0], 0)?,
        };
        match self.polynomial.coefficients()[0] {
            0 => Ok(sum),
            constant => ctx.add_plain(&sum, constant),
        }
    }

    fn difference_powers<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        a: &B::Ciphertext,
        b: &B::Ciphertext,
    ) -> ExtremaResult<Vec<B::Ciphertext>> {
        ctx.ensure_budget(&[a, b], self.depth())?;
        let diff = ctx.sub(a, b)?;
        self.powers(ctx, &diff)
    }

    /// Encrypted `a > b`; equality maps to 0.
    pub fn greater_than<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        a: &B::Ciphertext,
        b: &B::Ciphertext,
    ) -> ExtremaResult<IndicatorBit<B::Ciphertext>> {
        let powers = self.difference_powers(ctx, a, b)?;
        Ok(IndicatorBit::assume_binary(self.combine(ctx, &powers, false)?))
    }

    /// Encrypted `a < b`.
    pub fn less_than<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        a: &B::Ciphertext,
        b: &B::Ciphertext,
    ) -> ExtremaResult<IndicatorBit<B::Ciphertext>> {
        self.greater_than(ctx, b, a)
    }

    /// `NOT (a < b)`: 1 when `a` wins a max comparison, ties included.
    pub fn greater_or_equal_left<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        a: &B::Ciphertext,
        b: &B::Ciphertext,
    ) -> ExtremaResult<IndicatorBit<B::Ciphertext>> {
        self.less_than(ctx, a, b)?.complement(ctx)
    }

    /// `NOT (a > b)`: 1 when `a` wins a min comparison, ties included.
    pub fn less_or_equal_left<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        a: &B::Ciphertext,
        b: &B::Ciphertext,
    ) -> ExtremaResult<IndicatorBit<B::Ciphertext>> {
        self.greater_than(ctx, a, b)?.complement(ctx)
    }

    /// Both left-preferring bits from one power table of `a - b`.
    ///
    /// `P(a - b)` gives `a > b`; `P(b - a)` reuses the same powers with the odd
    /// coefficients negated. Returns `(greater_or_equal_left, less_or_equal_left)`.
    pub fn compare_both<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        a: &B::Ciphertext,
        b: &B::Ciphertext,
    ) -> ExtremaResult<(IndicatorBit<B::Ciphertext>, IndicatorBit<B::Ciphertext>)> {
        let powers = self.difference_powers(ctx, a, b)?;
        let greater = IndicatorBit::assume_binary(self.combine(ctx, &powers, false)?);
        let less = IndicatorBit::assume_binary(self.combine(ctx, &powers, true)?);
        Ok((less.complement(ctx)?, greater.complement(ctx)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extrema::ExtremaError;
    use crate::residue::ResidueBackend;

    fn setup(t: u64, ceiling: u32) -> (ResidueBackend, ComparisonPolynomial) {
        (
            ResidueBackend::new(t, ceiling).unwrap(),
            ComparisonPolynomial::interpolate(t).unwrap(),
        )
    }

    #[test]
    fn test_split_point() {
        assert_eq!(split_point(2), 1);
        assert_eq!(split_point(3), 2);
        assert_eq!(split_point(4), 2);
        assert_eq!(split_point(5), 4);
        assert_eq!(split_point(16), 8);
        assert_eq!(split_point(17), 16);
    }

    #[test]
    fn test_powers_depth() {
        let (backend, polynomial) = setup(17, 8);
        let ctx = EvaluationContext::new(&backend);
        let circuit = ComparisonCircuit::new(&polynomial);
        let x = backend.encrypt(3).unwrap();
        let powers = circuit.powers(&ctx, &x).unwrap();
        assert_eq!(powers.len(), 16);
        for (i, power) in powers.iter().enumerate() {
            let k = i as u32 + 1;
            assert_eq!(backend.decrypt(power), crate::math::primes::mod_pow(3, k as u64, 17));
            let expected_depth = if k == 1 { 0 } else { 32 - (k - 1).leading_zeros() };
            assert_eq!(power.level, 8 - expected_depth, "k={k}");
        }
    }

    #[test]
    fn test_all_comparisons_small_modulus() {
        let (backend, polynomial) = setup(17, 8);
        let ctx = EvaluationContext::new(&backend);
        let circuit = ComparisonCircuit::new(&polynomial);
        for a in 0..=8u64 {
            for b in 0..=8u64 {
                let ca = backend.encrypt(a).unwrap();
                let cb = backend.encrypt(b).unwrap();
                let gt = circuit.greater_than(&ctx, &ca, &cb).unwrap();
                let lt = circuit.less_than(&ctx, &ca, &cb).unwrap();
                let (ge, le) = circuit.compare_both(&ctx, &ca, &cb).unwrap();
                assert_eq!(backend.decrypt(gt.ciphertext()), u64::from(a > b));
                assert_eq!(backend.decrypt(lt.ciphertext()), u64::from(a < b));
                assert_eq!(backend.decrypt(ge.ciphertext()), u64::from(a >= b));
                assert_eq!(backend.decrypt(le.ciphertext()), u64::from(a <= b));
                assert_eq!(ge.ciphertext().level, 8 - circuit.depth());
            }
        }
    }

    #[test]
    fn test_left_preferring_bits_match_single_predicates() {
        let (backend, polynomial) = setup(101, 8);
        let ctx = EvaluationContext::new(&backend);
        let circuit = ComparisonCircuit::new(&polynomial);
        for (a, b) in [(50u64, 0u64), (0, 50), (23, 23), (7, 8)] {
            let ca = backend.encrypt(a).unwrap();
            let cb = backend.encrypt(b).unwrap();
            let ge = circuit.greater_or_equal_left(&ctx, &ca, &cb).unwrap();
            let le = circuit.less_or_equal_left(&ctx, &ca, &cb).unwrap();
            assert_eq!(backend.decrypt(ge.ciphertext()), u64::from(a >= b));
            assert_eq!(backend.decrypt(le.ciphertext()), u64::from(a <= b));
        }
    }

    #[test]
    fn test_budget_checked_before_evaluation() {
        let (backend, polynomial) = setup(17, 3);
        let ctx = EvaluationContext::new(&backend);
        let circuit = ComparisonCircuit::new(&polynomial);
        let a = backend.encrypt(1).unwrap();
        let b = backend.encrypt(2).unwrap();
        assert!(matches!(
            circuit.greater_than(&ctx, &a, &b),
            Err(ExtremaError::NoiseBudgetExhausted {
                needed: 4,
                remaining: 3
            })
        ));
    }
}
