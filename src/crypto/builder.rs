use super::engine::BfvParams;
use super::errors::{BfvError, BfvResult};
use crate::math::{MAX_PLAINTEXT_MODULUS, is_prime};

const DEFAULT_ERROR_STD: f64 = 3.2;

pub struct BfvParamsBuilder<const DEGREE: usize> {
    plaintext_modulus: Option<u64>,
    depth_ceiling: Option<u32>,
    error_std: Option<f64>,
    hamming_weight: Option<usize>,
}

impl<const DEGREE: usize> Default for BfvParamsBuilder<DEGREE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DEGREE: usize> BfvParamsBuilder<DEGREE> {
    pub fn new() -> Self {
        Self {
            plaintext_modulus: None,
            depth_ceiling: None,
            error_std: None,
            hamming_weight: None,
        }
    }

    pub fn plaintext_modulus(mut self, modulus: u64) -> Self {
        self.plaintext_modulus = Some(modulus);
        self
    }

    pub fn depth_ceiling(mut self, depth: u32) -> Self {
        self.depth_ceiling = Some(depth);
        self
    }

    pub fn error_std(mut self, std_dev: f64) -> Self {
        self.error_std = Some(std_dev);
        self
    }

    pub fn hamming_weight(mut self, weight: usize) -> Self {
        self.hamming_weight = Some(weight);
        self
    }

    pub fn build(self) -> BfvResult<BfvParams<DEGREE>> {
        let invalid = |message: String| BfvError::InvalidParameter { message };

        if DEGREE < 2 || !DEGREE.is_power_of_two() {
            return Err(invalid(format!(
                "ring degree {DEGREE} must be a power of two >= 2"
            )));
        }

        let plaintext_modulus = self
            .plaintext_modulus
            .ok_or_else(|| invalid("plaintext modulus is required".into()))?;
        if plaintext_modulus < 3
            || plaintext_modulus >= MAX_PLAINTEXT_MODULUS
            || !is_prime(plaintext_modulus)
        {
            return Err(invalid(format!(
                "plaintext modulus {plaintext_modulus} must be an odd prime below 2^31"
            )));
        }

        let error_std = self.error_std.unwrap_or(DEFAULT_ERROR_STD);
        if !(error_std.is_finite() && error_std > 0.0) {
            return Err(invalid(format!(
                "error standard deviation {error_std} must be finite and positive"
            )));
        }

        let hamming_weight = self.hamming_weight.unwrap_or(DEGREE / 2);
        if hamming_weight == 0 || hamming_weight > DEGREE {
            return Err(invalid(format!(
                "hamming weight {hamming_weight} must lie in 1..={DEGREE}"
            )));
        }

        let supported = BfvParams::<DEGREE>::supported_depth(plaintext_modulus, error_std);
        let depth_ceiling = self.depth_ceiling.unwrap_or(supported);
        if depth_ceiling > supported {
            return Err(invalid(format!(
                "depth ceiling {depth_ceiling} exceeds the {supported} levels supported for t = {plaintext_modulus}, N = {DEGREE}"
            )));
        }

        Ok(BfvParams {
            plaintext_modulus,
            depth_ceiling,
            error_std,
            hamming_weight,
        })
    }
}
