use super::builder::BfvParamsBuilder;
use super::errors::{BfvError, BfvResult};
use super::operations::BfvEvaluator;
use super::types::BfvCiphertext;
use crate::extrema::Candidate;
use crate::keys::{
    PublicKey, PublicKeyParams, RelinearizationKey, RelinearizationKeyParams, SecretKey,
    SecretKeyParams,
};
use crate::math::GAUSSIAN_TAIL_CUT;
use crate::rings::{PolySampler, ScaledTensor};
use rand::Rng;
use std::marker::PhantomData;
use tracing::{debug, instrument};

/// `log2 q` for the ciphertext ring `Z_{2^256}[X]/(X^N + 1)`.
pub const CIPHERTEXT_MODULUS_BITS: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BfvParams<const DEGREE: usize> {
    pub plaintext_modulus: u64,
    pub depth_ceiling: u32,
    pub error_std: f64,
    pub hamming_weight: usize,
}

impl<const DEGREE: usize> BfvParams<DEGREE> {
    pub fn builder() -> BfvParamsBuilder<DEGREE> {
        BfvParamsBuilder::new()
    }

    /// Heuristic count of multiplicative levels that keep decryption correct.
    ///
    /// Decryption fails once the noise reaches `delta / 2`, roughly
    /// `2^(256 - log t - 1)`. Relinearization with 64-bit digits sets a noise
    /// floor of about `2^64 * N * 4 * e_max`, where `e_max` is the clamped
    /// error bound. A polynomial evaluation adds a one-off `t^2` for its
    /// plaintext coefficients and sums, and every level multiplies the noise
    /// by about `4 N t`.
    pub fn supported_depth(plaintext_modulus: u64, error_std: f64) -> u32 {
        let t_bits = u64::BITS - plaintext_modulus.leading_zeros();
        let log_n = DEGREE.max(1).trailing_zeros();
        let error_bits = (GAUSSIAN_TAIL_CUT * error_std).log2().ceil().max(1.0) as u32;

        let threshold = CIPHERTEXT_MODULUS_BITS.saturating_sub(t_bits + 1);
        let floor = 64 + 2 + log_n + error_bits + 2 * t_bits;
        let per_level = log_n + t_bits + 2;
        threshold.saturating_sub(floor) / per_level
    }

    /// Bit length of `delta / 2`, the noise magnitude at which decryption breaks.
    pub fn noise_threshold_bits(&self) -> u32 {
        let t_bits = u64::BITS - self.plaintext_modulus.leading_zeros();
        CIPHERTEXT_MODULUS_BITS - t_bits - 1
    }
}

pub struct BfvEngine<P, const DEGREE: usize>
where
    P: ScaledTensor<DEGREE> + PolySampler<DEGREE>,
{
    pub params: BfvParams<DEGREE>,
    _ring: PhantomData<P>,
}

impl<P, const DEGREE: usize> BfvEngine<P, DEGREE>
where
    P: ScaledTensor<DEGREE> + PolySampler<DEGREE>,
{
    pub fn new(params: BfvParams<DEGREE>) -> Self {
        Self {
            params,
            _ring: PhantomData,
        }
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.params.plaintext_modulus
    }

    pub fn generate_secret_key<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> BfvResult<SecretKey<P, DEGREE>> {
        let sk_params = SecretKeyParams::new(self.params.hamming_weight)?;
        Ok(SecretKey::generate(&sk_params, rng)?)
    }

    pub fn generate_public_key<R: Rng + ?Sized>(
        &self,
        secret_key: &SecretKey<P, DEGREE>,
        rng: &mut R,
    ) -> BfvResult<PublicKey<P, DEGREE>> {
        let pk_params = PublicKeyParams {
            error_std: self.params.error_std,
        };
        Ok(PublicKey::generate(secret_key, &pk_params, rng)?)
    }

    pub fn generate_relinearization_key<R: Rng + ?Sized>(
        &self,
        secret_key: &SecretKey<P, DEGREE>,
        rng: &mut R,
    ) -> BfvResult<RelinearizationKey<P, DEGREE>> {
        let relin_params = RelinearizationKeyParams::new(self.params.error_std)?;
        Ok(RelinearizationKey::generate(secret_key, &relin_params, rng)?)
    }

    /// Evaluator owning the relinearization key, shareable across threads.
    pub fn evaluator(&self, relin_key: RelinearizationKey<P, DEGREE>) -> BfvEvaluator<P, DEGREE> {
        BfvEvaluator::new(self.params, relin_key)
    }

    /// Encrypts `value` in the constant coefficient at the full depth ceiling.
    pub fn encrypt<R: Rng + ?Sized>(
        &self,
        value: u64,
        public_key: &PublicKey<P, DEGREE>,
        rng: &mut R,
    ) -> BfvResult<BfvCiphertext<P, DEGREE>> {
        let modulus = self.params.plaintext_modulus;
        if value >= modulus {
            return Err(BfvError::PlaintextOutOfRange { value, modulus });
        }

        let u = P::sample_tribits(self.params.hamming_weight, rng);
        let e0 = P::sample_gaussian(self.params.error_std, rng);
        let e1 = P::sample_gaussian(self.params.error_std, rng);

        // c0 = b * u + e0 + delta * m
        let mut c0 = public_key.b.clone();
        c0 *= &u;
        c0 += &e0;
        c0.add_scaled_constant(value, modulus);

        // c1 = a * u + e1
        let mut c1 = public_key.a.clone();
        c1 *= &u;
        c1 += &e1;

        Ok(BfvCiphertext {
            c0,
            c1,
            c2: None,
            level: self.params.depth_ceiling,
        })
    }

    /// Encrypts each value with its position as index, ready for reduction.
    ///
    /// Values must lie in `[0, (t-1)/2]`; larger ones fail with `NotComparable`.
    #[instrument(skip(self, values, public_key, rng), fields(len = values.len()))]
    pub fn encrypt_candidates<R: Rng + ?Sized>(
        &self,
        values: &[u64],
        public_key: &PublicKey<P, DEGREE>,
        rng: &mut R,
    ) -> BfvResult<Vec<Candidate<BfvCiphertext<P, DEGREE>>>> {
        let max_value = (self.params.plaintext_modulus - 1) / 2;
        if let Some(&value) = values.iter().find(|&&v| v > max_value) {
            return Err(BfvError::NotComparable { value, max_value });
        }
        let candidates = values
            .iter()
            .enumerate()
            .map(|(position, &value)| {
                let value = self.encrypt(value, public_key, &mut *rng)?;
                let index = self.encrypt(position as u64, public_key, &mut *rng)?;
                Ok(Candidate::new(value, index))
            })
            .collect::<BfvResult<Vec<_>>>()?;
        debug!(count = candidates.len(), "encrypted candidates");
        Ok(candidates)
    }

    /// `c0 + c1 * s (+ c2 * s^2)`, i.e. `delta * m + noise` modulo `q`.
    fn phase(ciphertext: &BfvCiphertext<P, DEGREE>, secret_key: &SecretKey<P, DEGREE>) -> P {
        let mut result = ciphertext.c1.clone();
        result *= &secret_key.poly;
        result += &ciphertext.c0;
        if let Some(c2) = &ciphertext.c2 {
            let mut term = c2.clone();
            term *= &secret_key.squared();
            result += &term;
        }
        result
    }

    pub fn decrypt(
        &self,
        ciphertext: &BfvCiphertext<P, DEGREE>,
        secret_key: &SecretKey<P, DEGREE>,
    ) -> u64 {
        Self::phase(ciphertext, secret_key).decode_constant(self.params.plaintext_modulus)
    }

    /// Bit length of the noise around the decrypted message.
    pub fn noise_bits(
        &self,
        ciphertext: &BfvCiphertext<P, DEGREE>,
        secret_key: &SecretKey<P, DEGREE>,
    ) -> u32 {
        let modulus = self.params.plaintext_modulus;
        let phase = Self::phase(ciphertext, secret_key);
        let message = phase.decode_constant(modulus);
        phase.noise_bits(message, modulus)
    }

    /// Bits of noise growth left before decryption breaks.
    pub fn noise_budget_bits(
        &self,
        ciphertext: &BfvCiphertext<P, DEGREE>,
        secret_key: &SecretKey<P, DEGREE>,
    ) -> u32 {
        self.params
            .noise_threshold_bits()
            .saturating_sub(self.noise_bits(ciphertext, secret_key))
    }
}
