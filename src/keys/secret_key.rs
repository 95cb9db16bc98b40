//! Secret Key (sk): a sparse ternary polynomial s(X) with coefficients in {-1, 0, 1}.
use crate::rings::{PolyRing, PolySampler};
use rand::Rng;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SecretKeyError {
    #[error("Hamming weight {0} exceeds ring dimension {1}")]
    InvalidHammingWeight(usize, usize),
    #[error("Hamming weight must be non-zero")]
    ZeroHammingWeight,
}

/// Parameters for sampling a secret key.
#[derive(Debug, Clone, Copy)]
pub struct SecretKeyParams<const DEGREE: usize> {
    pub hamming_weight: usize,
}

impl<const DEGREE: usize> SecretKeyParams<DEGREE> {
    pub fn new(hamming_weight: usize) -> Result<Self, SecretKeyError> {
        let params = Self { hamming_weight };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), SecretKeyError> {
        if self.hamming_weight == 0 {
            Err(SecretKeyError::ZeroHammingWeight)
        } else if self.hamming_weight > DEGREE {
            Err(SecretKeyError::InvalidHammingWeight(self.hamming_weight, DEGREE))
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
pub struct SecretKey<P, const DEGREE: usize>
where
    P: PolyRing<DEGREE>,
{
    pub poly: P,
    _degree: PhantomData<[(); DEGREE]>,
}

impl<P, const DEGREE: usize> SecretKey<P, DEGREE>
where
    P: PolyRing<DEGREE> + PolySampler<DEGREE>,
{
    pub fn generate<R: Rng + ?Sized>(
        params: &SecretKeyParams<DEGREE>,
        rng: &mut R,
    ) -> Result<Self, SecretKeyError> {
        params.validate()?;
        Ok(Self {
            poly: P::sample_tribits(params.hamming_weight, rng),
            _degree: PhantomData,
        })
    }

    /// `s^2`, the target of the relinearization key.
    pub fn squared(&self) -> P {
        let mut out = self.poly.clone();
        out *= &self.poly;
        out
    }
}
