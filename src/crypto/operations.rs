//! Homomorphic operations on BFV ciphertexts.
use super::engine::BfvParams;
use super::errors::{BfvError, BfvResult};
use super::types::BfvCiphertext;
use crate::extrema::HomomorphicBackend;
use crate::keys::RelinearizationKey;
use crate::math::centered_residue;
use crate::rings::{PolySampler, ScaledTensor};

/// Evaluation half of the scheme: parameters plus the relinearization key.
#[derive(Debug, Clone)]
pub struct BfvEvaluator<P, const DEGREE: usize>
where
    P: ScaledTensor<DEGREE>,
{
    params: BfvParams<DEGREE>,
    relin_key: RelinearizationKey<P, DEGREE>,
}

impl<P, const DEGREE: usize> BfvEvaluator<P, DEGREE>
where
    P: ScaledTensor<DEGREE> + PolySampler<DEGREE>,
{
    pub fn new(params: BfvParams<DEGREE>, relin_key: RelinearizationKey<P, DEGREE>) -> Self {
        Self { params, relin_key }
    }

    pub fn params(&self) -> &BfvParams<DEGREE> {
        &self.params
    }

    fn combine(
        lhs: &BfvCiphertext<P, DEGREE>,
        rhs: &BfvCiphertext<P, DEGREE>,
        negate_rhs: bool,
    ) -> BfvCiphertext<P, DEGREE> {
        let apply = |acc: &mut P, term: &P| {
            if negate_rhs {
                *acc -= term;
            } else {
                *acc += term;
            }
        };

        let mut c0 = lhs.c0.clone();
        apply(&mut c0, &rhs.c0);
        let mut c1 = lhs.c1.clone();
        apply(&mut c1, &rhs.c1);

        let c2 = match (&lhs.c2, &rhs.c2) {
            (None, None) => None,
            (Some(a), None) => Some(a.clone()),
            (None, Some(b)) => {
                let mut c2 = P::zero();
                apply(&mut c2, b);
                Some(c2)
            }
            (Some(a), Some(b)) => {
                let mut c2 = a.clone();
                apply(&mut c2, b);
                Some(c2)
            }
        };

        BfvCiphertext {
            c0,
            c1,
            c2,
            level: lhs.level.min(rhs.level),
        }
    }

    pub fn add(
        &self,
        lhs: &BfvCiphertext<P, DEGREE>,
        rhs: &BfvCiphertext<P, DEGREE>,
    ) -> BfvCiphertext<P, DEGREE> {
        Self::combine(lhs, rhs, false)
    }

    pub fn sub(
        &self,
        lhs: &BfvCiphertext<P, DEGREE>,
        rhs: &BfvCiphertext<P, DEGREE>,
    ) -> BfvCiphertext<P, DEGREE> {
        Self::combine(lhs, rhs, true)
    }

    pub fn negate(&self, ct: &BfvCiphertext<P, DEGREE>) -> BfvCiphertext<P, DEGREE> {
        BfvCiphertext {
            c0: -ct.c0.clone(),
            c1: -ct.c1.clone(),
            c2: ct.c2.clone().map(|c2| -c2),
            level: ct.level,
        }
    }

    pub fn add_plain(&self, ct: &BfvCiphertext<P, DEGREE>, scalar: u64) -> BfvCiphertext<P, DEGREE> {
        let mut out = ct.clone();
        out.c0
            .add_scaled_constant(scalar, self.params.plaintext_modulus);
        out
    }

    /// Scales every component by the centered representative of `scalar mod t`.
    pub fn mul_plain(&self, ct: &BfvCiphertext<P, DEGREE>, scalar: u64) -> BfvCiphertext<P, DEGREE> {
        let modulus = self.params.plaintext_modulus;
        let factor = centered_residue(scalar % modulus, modulus);
        let mut out = ct.clone();
        out.c0.mul_scalar_assign(factor);
        out.c1.mul_scalar_assign(factor);
        if let Some(c2) = out.c2.as_mut() {
            c2.mul_scalar_assign(factor);
        }
        out
    }

    /// Tensor product scaled by `t/q`; the result has three components.
    pub fn multiply(
        &self,
        lhs: &BfvCiphertext<P, DEGREE>,
        rhs: &BfvCiphertext<P, DEGREE>,
    ) -> BfvResult<BfvCiphertext<P, DEGREE>> {
        for ct in [lhs, rhs] {
            if !ct.is_linear() {
                return Err(BfvError::DegreeMismatch {
                    expected: 2,
                    actual: ct.size(),
                });
            }
        }
        let level = lhs.level.min(rhs.level);
        if level == 0 {
            return Err(BfvError::LevelExhausted);
        }

        let [c0, c1, c2] = P::tensor_scaled(
            [&lhs.c0, &lhs.c1],
            [&rhs.c0, &rhs.c1],
            self.params.plaintext_modulus,
        );
        Ok(BfvCiphertext {
            c0,
            c1,
            c2: Some(c2),
            level: level - 1,
        })
    }

    /// Folds `c2` back into `(c0, c1)`. Linear ciphertexts pass through.
    pub fn relinearize(&self, ct: &BfvCiphertext<P, DEGREE>) -> BfvCiphertext<P, DEGREE> {
        let Some(c2) = &ct.c2 else {
            return ct.clone();
        };
        let mut c0 = ct.c0.clone();
        let mut c1 = ct.c1.clone();
        self.relin_key.apply(&mut c0, &mut c1, c2);
        BfvCiphertext {
            c0,
            c1,
            c2: None,
            level: ct.level,
        }
    }
}

impl<P, const DEGREE: usize> HomomorphicBackend for BfvEvaluator<P, DEGREE>
where
    P: ScaledTensor<DEGREE> + PolySampler<DEGREE>,
{
    type Ciphertext = BfvCiphertext<P, DEGREE>;
    type Error = BfvError;

    fn plaintext_modulus(&self) -> u64 {
        self.params.plaintext_modulus
    }

    fn depth_ceiling(&self) -> u32 {
        self.params.depth_ceiling
    }

    fn remaining_depth(&self, ct: &Self::Ciphertext) -> u32 {
        ct.level
    }

    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> BfvResult<Self::Ciphertext> {
        Ok(BfvEvaluator::add(self, lhs, rhs))
    }

    fn sub(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> BfvResult<Self::Ciphertext> {
        Ok(BfvEvaluator::sub(self, lhs, rhs))
    }

    fn negate(&self, ct: &Self::Ciphertext) -> Self::Ciphertext {
        BfvEvaluator::negate(self, ct)
    }

    fn add_plain(&self, ct: &Self::Ciphertext, scalar: u64) -> BfvResult<Self::Ciphertext> {
        Ok(BfvEvaluator::add_plain(self, ct, scalar))
    }

    fn mul_plain(&self, ct: &Self::Ciphertext, scalar: u64) -> BfvResult<Self::Ciphertext> {
        Ok(BfvEvaluator::mul_plain(self, ct, scalar))
    }

    fn multiply(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext) -> BfvResult<Self::Ciphertext> {
        BfvEvaluator::multiply(self, lhs, rhs)
    }

    fn relinearize(&self, ct: &Self::Ciphertext) -> BfvResult<Self::Ciphertext> {
        Ok(BfvEvaluator::relinearize(self, ct))
    }
}
