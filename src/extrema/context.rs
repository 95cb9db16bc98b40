use super::backend::HomomorphicBackend;
use super::errors::{ExtremaError, ExtremaResult};
use tracing::trace;

/// Backend operations with depth enforcement.
///
/// Every multiplicative operation checks the remaining depth of its operands
/// before touching them, since a spent level cannot be recovered.
pub struct EvaluationContext<'a, B: HomomorphicBackend> {
    backend: &'a B,
}

impl<B: HomomorphicBackend> Clone for EvaluationContext<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: HomomorphicBackend> Copy for EvaluationContext<'_, B> {}

impl<'a, B: HomomorphicBackend> EvaluationContext<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.backend.plaintext_modulus()
    }

    pub fn depth_ceiling(&self) -> u32 {
        self.backend.depth_ceiling()
    }

    pub fn remaining(&self, ct: &B::Ciphertext) -> u32 {
        self.backend.remaining_depth(ct)
    }

    /// Smallest remaining depth among `cts`, or the ceiling when empty.
    pub fn min_remaining<'c>(&self, cts: impl IntoIterator<Item = &'c B::Ciphertext>) -> u32
    where
        B::Ciphertext: 'c,
    {
        cts.into_iter()
            .map(|ct| self.remaining(ct))
            .min()
            .unwrap_or_else(|| self.depth_ceiling())
    }

    /// Fails with `NoiseBudgetExhausted` unless every operand has `needed` levels left.
    pub fn ensure_budget(&self, cts: &[&B::Ciphertext], needed: u32) -> ExtremaResult<()> {
        let remaining = self.min_remaining(cts.iter().copied());
        trace!(needed, remaining, "budget check");
        if remaining < needed {
            return Err(ExtremaError::NoiseBudgetExhausted { needed, remaining });
        }
        Ok(())
    }

    pub fn add(&self, lhs: &B::Ciphertext, rhs: &B::Ciphertext) -> ExtremaResult<B::Ciphertext> {
        self.backend.add(lhs, rhs).map_err(ExtremaError::backend)
    }

    pub fn sub(&self, lhs: &B::Ciphertext, rhs: &B::Ciphertext) -> ExtremaResult<B::Ciphertext> {
        self.backend.sub(lhs, rhs).map_err(ExtremaError::backend)
    }

    pub fn negate(&self, ct: &B::Ciphertext) -> B::Ciphertext {
        self.backend.negate(ct)
    }

    pub fn add_plain(&self, ct: &B::Ciphertext, scalar: u64) -> ExtremaResult<B::Ciphertext> {
        self.backend.add_plain(ct, scalar).map_err(ExtremaError::backend)
    }

    pub fn mul_plain(&self, ct: &B::Ciphertext, scalar: u64) -> ExtremaResult<B::Ciphertext> {
        self.backend.mul_plain(ct, scalar).map_err(ExtremaError::backend)
    }

    /// `1 - ct`, depth-free.
    pub fn one_minus(&self, ct: &B::Ciphertext) -> ExtremaResult<B::Ciphertext> {
        self.add_plain(&self.negate(ct), 1)
    }

    /// Product without relinearization; the caller must relinearize before
    /// multiplying the result again.
    pub fn multiply_unrelinearized(
        &self,
        lhs: &B::Ciphertext,
        rhs: &B::Ciphertext,
    ) -> ExtremaResult<B::Ciphertext> {
        self.ensure_budget(&[lhs, rhs], 1)?;
        self.backend.multiply(lhs, rhs).map_err(ExtremaError::backend)
    }

    pub fn relinearize(&self, ct: &B::Ciphertext) -> ExtremaResult<B::Ciphertext> {
        self.backend.relinearize(ct).map_err(ExtremaError::backend)
    }

    /// Relinearized product, one level.
    pub fn multiply(&self, lhs: &B::Ciphertext, rhs: &B::Ciphertext) -> ExtremaResult<B::Ciphertext> {
        let product = self.multiply_unrelinearized(lhs, rhs)?;
        self.relinearize(&product)
    }

    /// Running homomorphic sum; no depth cost.
    pub fn sum(&self, cts: &[B::Ciphertext]) -> ExtremaResult<B::Ciphertext> {
        let (first, rest) = cts.split_first().ok_or(ExtremaError::EmptyInput)?;
        rest.iter()
            .try_fold(first.clone(), |acc, ct| self.add(&acc, ct))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residue::ResidueBackend;

    #[test]
    fn test_multiply_checks_budget_first() {
        let backend = ResidueBackend::new(17, 1).unwrap();
        let ctx = EvaluationContext::new(&backend);
        let a = backend.encrypt(3).unwrap();
        let b = ctx.multiply(&a, &a).unwrap();
        assert_eq!(backend.decrypt(&b), 9);
        assert_eq!(ctx.remaining(&b), 0);

        let err = ctx.multiply(&b, &a).unwrap_err();
        assert!(matches!(
            err,
            ExtremaError::NoiseBudgetExhausted {
                needed: 1,
                remaining: 0
            }
        ));
    }

    #[test]
    fn test_one_minus_and_sum() {
        let backend = ResidueBackend::new(17, 4).unwrap();
        let ctx = EvaluationContext::new(&backend);
        let bit = backend.encrypt(1).unwrap();
        assert_eq!(backend.decrypt(&ctx.one_minus(&bit).unwrap()), 0);

        let cts: Vec<_> = [5, 9, 10].iter().map(|&v| backend.encrypt(v).unwrap()).collect();
        assert_eq!(backend.decrypt(&ctx.sum(&cts).unwrap()), 7);
        assert!(matches!(ctx.sum(&[]), Err(ExtremaError::EmptyInput)));
    }

    #[test]
    fn test_backend_errors_are_wrapped() {
        let backend = ResidueBackend::new(17, 2).unwrap();
        let ctx = EvaluationContext::new(&backend);
        let a = backend.encrypt(3).unwrap();
        let raw = ctx.multiply_unrelinearized(&a, &a).unwrap();
        let err = ctx.multiply(&raw, &a).unwrap_err();
        assert!(matches!(err, ExtremaError::Backend { .. }));
    }
}
