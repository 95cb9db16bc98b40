use crate::keys::SecretKey;
use crate::rings::{PolyRing, PolySampler};
use rand::Rng;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PublicKeyError {
    #[error("Invalid error standard deviation: {0} (must be finite and positive)")]
    InvalidErrorStd(f64),
}

/// Parameters for generating a public key.
#[derive(Debug, Clone, Copy)]
pub struct PublicKeyParams<const DEGREE: usize> {
    /// Standard deviation for the error distribution
    pub error_std: f64,
}

impl<const DEGREE: usize> PublicKeyParams<DEGREE> {
    pub fn validate(&self) -> Result<(), PublicKeyError> {
        if self.error_std.is_finite() && self.error_std > 0.0 {
            Ok(())
        } else {
            Err(PublicKeyError::InvalidErrorStd(self.error_std))
        }
    }
}

/// RLWE public key `(b, a)` with `b = -(a * s + e)`.
#[derive(Debug, Clone)]
pub struct PublicKey<P, const DEGREE: usize>
where
    P: PolyRing<DEGREE>,
{
    pub b: P,
    pub a: P,
}

impl<P, const DEGREE: usize> PublicKey<P, DEGREE>
where
    P: PolyRing<DEGREE> + PolySampler<DEGREE>,
{
    pub fn generate<R: Rng + ?Sized>(
        secret_key: &SecretKey<P, DEGREE>,
        params: &PublicKeyParams<DEGREE>,
        rng: &mut R,
    ) -> Result<Self, PublicKeyError> {
        params.validate()?;

        let a = P::sample_uniform(rng);
        let e = P::sample_gaussian(params.error_std, rng);

        let mut a_times_s = a.clone();
        a_times_s *= &secret_key.poly;
        a_times_s += &e;
        let b = -a_times_s;

        Ok(PublicKey { b, a })
    }
}
