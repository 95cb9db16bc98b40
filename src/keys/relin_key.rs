use crate::keys::SecretKey;
use crate::rings::{PolySampler, ScaledTensor};
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RelinearizationKeyError {
    #[error("Invalid error standard deviation: {0} (must be finite and positive)")]
    InvalidErrorStd(f64),
}

/// Parameters for relinearization key generation
#[derive(Debug, Clone, Copy)]
pub struct RelinearizationKeyParams<const DEGREE: usize> {
    /// Standard deviation for the error distribution
    pub error_std: f64,
}

impl<const DEGREE: usize> RelinearizationKeyParams<DEGREE> {
    pub fn new(error_std: f64) -> Result<Self, RelinearizationKeyError> {
        let params = Self { error_std };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), RelinearizationKeyError> {
        if self.error_std.is_finite() && self.error_std > 0.0 {
            Ok(())
        } else {
            Err(RelinearizationKeyError::InvalidErrorStd(self.error_std))
        }
    }
}

/// Relinearization key used to transform ciphertexts after multiplication
///
/// Holds one RLWE sample per gadget digit. Component `i` satisfies
/// `b_i + a_i * s = B^i * s^2 - e_i`, so a degree-2 term `c2 * s^2` is replaced
/// by `sum_i d_i(c2) * (b_i + a_i * s)` where `d_i` are the gadget digits of `c2`.
#[derive(Debug, Clone)]
pub struct RelinearizationKey<P, const DEGREE: usize>
where
    P: ScaledTensor<DEGREE>,
{
    pub components: Vec<(P, P)>,
}

impl<P, const DEGREE: usize> RelinearizationKey<P, DEGREE>
where
    P: ScaledTensor<DEGREE> + PolySampler<DEGREE>,
{
    pub fn generate<R: Rng + ?Sized>(
        secret_key: &SecretKey<P, DEGREE>,
        params: &RelinearizationKeyParams<DEGREE>,
        rng: &mut R,
    ) -> Result<Self, RelinearizationKeyError> {
        params.validate()?;

        let s_squared = secret_key.squared();
        let components = (0..P::GADGET_DIGITS)
            .map(|digit| {
                let a = P::sample_uniform(rng);
                let e = P::sample_gaussian(params.error_std, rng);

                let mut a_times_s = a.clone();
                a_times_s *= &secret_key.poly;
                a_times_s += &e;
                let mut b = -a_times_s;
                b += &s_squared.gadget_scale(digit);
                (b, a)
            })
            .collect();

        Ok(RelinearizationKey { components })
    }

    /// Folds `c2` into `(c0, c1)`.
    pub fn apply(&self, c0: &mut P, c1: &mut P, c2: &P) {
        for (digit, (b, a)) in c2.gadget_decompose().iter().zip(&self.components) {
            let mut term0 = digit.clone();
            term0 *= b;
            *c0 += &term0;

            let mut term1 = digit.clone();
            term1 *= a;
            *c1 += &term1;
        }
    }
}
