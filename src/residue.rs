//! Transparent backend evaluating circuits directly on residues modulo `t`.
//!
//! It offers no confidentiality whatsoever. It keeps the same level and degree
//! bookkeeping as the lattice scheme, which makes it suitable for checking
//! circuit correctness and depth accounting at plaintext moduli the toy BFV
//! parameters cannot reach.
use crate::extrema::{Candidate, HomomorphicBackend};
use crate::math::MAX_PLAINTEXT_MODULUS;
use crate::math::primes::mul_mod;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResidueError {
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Value {value} out of range for modulus {modulus}")]
    ValueOutOfRange { value: u64, modulus: u64 },

    #[error("Value {value} cannot be compared: candidates must lie in [0, {max_value}]")]
    NotComparable { value: u64, max_value: u64 },

    #[error("Ciphertext has no multiplicative levels left")]
    LevelExhausted,

    #[error("Ciphertext degree mismatch: expected {expected}, got {actual}")]
    DegreeMismatch { expected: usize, actual: usize },
}

pub type ResidueResult<T> = Result<T, ResidueError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueCiphertext {
    pub residue: u64,
    pub level: u32,
    /// 1 when relinearized, 2 after an unrelinearized multiplication.
    pub degree: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ResidueBackend {
    plaintext_modulus: u64,
    depth_ceiling: u32,
}

impl ResidueBackend {
    pub fn new(plaintext_modulus: u64, depth_ceiling: u32) -> ResidueResult<Self> {
        if !(2..MAX_PLAINTEXT_MODULUS).contains(&plaintext_modulus) {
            return Err(ResidueError::InvalidParameter {
                message: format!(
                    "plaintext modulus {plaintext_modulus} must lie in [2, {MAX_PLAINTEXT_MODULUS})"
                ),
            });
        }
        Ok(Self {
            plaintext_modulus,
            depth_ceiling,
        })
    }

    pub fn encrypt(&self, value: u64) -> ResidueResult<ResidueCiphertext> {
        if value >= self.plaintext_modulus {
            return Err(ResidueError::ValueOutOfRange {
                value,
                modulus: self.plaintext_modulus,
            });
        }
        Ok(ResidueCiphertext {
            residue: value,
            level: self.depth_ceiling,
            degree: 1,
        })
    }

    pub fn decrypt(&self, ct: &ResidueCiphertext) -> u64 {
        ct.residue
    }

    /// Pairs each value with its position. Values above `(t-1)/2` are refused,
    /// since the comparison circuit would order them wrongly.
    pub fn encrypt_candidates(&self, values: &[u64]) -> ResidueResult<Vec<Candidate<ResidueCiphertext>>> {
        let max_value = (self.plaintext_modulus - 1) / 2;
        values
            .iter()
            .enumerate()
            .map(|(position, &value)| {
                if value > max_value {
                    return Err(ResidueError::NotComparable { value, max_value });
                }
                Ok(Candidate::new(
                    self.encrypt(value)?,
                    self.encrypt(position as u64)?,
                ))
            })
            .collect()
    }

    fn linear(&self, lhs: &ResidueCiphertext, rhs: &ResidueCiphertext, residue: u64) -> ResidueCiphertext {
        ResidueCiphertext {
            residue,
            level: lhs.level.min(rhs.level),
            degree: lhs.degree.max(rhs.degree),
        }
    }
}

impl HomomorphicBackend for ResidueBackend {
    type Ciphertext = ResidueCiphertext;
    type Error = ResidueError;

    fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    fn depth_ceiling(&self) -> u32 {
        self.depth_ceiling
    }

    fn remaining_depth(&self, ct: &ResidueCiphertext) -> u32 {
        ct.level
    }

    fn add(&self, lhs: &ResidueCiphertext, rhs: &ResidueCiphertext) -> ResidueResult<ResidueCiphertext> {
        let t = self.plaintext_modulus;
        Ok(self.linear(lhs, rhs, (lhs.residue + rhs.residue) % t))
    }

    fn sub(&self, lhs: &ResidueCiphertext, rhs: &ResidueCiphertext) -> ResidueResult<ResidueCiphertext> {
        let t = self.plaintext_modulus;
        Ok(self.linear(lhs, rhs, (lhs.residue + t - rhs.residue) % t))
    }

    fn negate(&self, ct: &ResidueCiphertext) -> ResidueCiphertext {
        let t = self.plaintext_modulus;
        ResidueCiphertext {
            residue: (t - ct.residue) % t,
            ..*ct
        }
    }

    fn add_plain(&self, ct: &ResidueCiphertext, scalar: u64) -> ResidueResult<ResidueCiphertext> {
        let t = self.plaintext_modulus;
        Ok(ResidueCiphertext {
            residue: (ct.residue + scalar % t) % t,
            ..*ct
        })
    }

    fn mul_plain(&self, ct: &ResidueCiphertext, scalar: u64) -> ResidueResult<ResidueCiphertext> {
        Ok(ResidueCiphertext {
            residue: mul_mod(ct.residue, scalar % self.plaintext_modulus, self.plaintext_modulus),
            ..*ct
        })
    }

    fn multiply(&self, lhs: &ResidueCiphertext, rhs: &ResidueCiphertext) -> ResidueResult<ResidueCiphertext> {
        for ct in [lhs, rhs] {
            if ct.degree != 1 {
                return Err(ResidueError::DegreeMismatch {
                    expected: 1,
                    actual: ct.degree,
                });
            }
        }
        let level = lhs.level.min(rhs.level);
        if level == 0 {
            return Err(ResidueError::LevelExhausted);
        }
        Ok(ResidueCiphertext {
            residue: mul_mod(lhs.residue, rhs.residue, self.plaintext_modulus),
            level: level - 1,
            degree: 2,
        })
    }

    fn relinearize(&self, ct: &ResidueCiphertext) -> ResidueResult<ResidueCiphertext> {
        Ok(ResidueCiphertext { degree: 1, ..*ct })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_wraps_modulo_t() {
        let backend = ResidueBackend::new(17, 3).unwrap();
        let a = backend.encrypt(12).unwrap();
        let b = backend.encrypt(9).unwrap();
        assert_eq!(backend.add(&a, &b).unwrap().residue, 4);
        assert_eq!(backend.sub(&b, &a).unwrap().residue, 14);
        assert_eq!(backend.negate(&a).residue, 5);
        assert_eq!(backend.add_plain(&a, 30).unwrap().residue, 8);
        assert_eq!(backend.mul_plain(&a, 3).unwrap().residue, 2);
    }

    #[test]
    fn test_multiply_tracks_levels_and_degree() {
        let backend = ResidueBackend::new(17, 1).unwrap();
        let a = backend.encrypt(3).unwrap();
        let product = backend.multiply(&a, &a).unwrap();
        assert_eq!(product.level, 0);
        assert_eq!(product.degree, 2);
        assert_eq!(product.residue, 9);

        assert_eq!(
            backend.multiply(&product, &a),
            Err(ResidueError::DegreeMismatch {
                expected: 1,
                actual: 2
            })
        );
        let relin = backend.relinearize(&product).unwrap();
        assert_eq!(backend.multiply(&relin, &a), Err(ResidueError::LevelExhausted));
    }

    #[test]
    fn test_encrypt_rejects_out_of_range() {
        let backend = ResidueBackend::new(17, 1).unwrap();
        assert_eq!(
            backend.encrypt(17),
            Err(ResidueError::ValueOutOfRange {
                value: 17,
                modulus: 17
            })
        );
        assert!(ResidueBackend::new(1, 4).is_err());
    }

    #[test]
    fn test_modulus_capped() {
        assert!(ResidueBackend::new(MAX_PLAINTEXT_MODULUS - 1, 4).is_ok());
        for t in [MAX_PLAINTEXT_MODULUS, u64::MAX] {
            assert!(matches!(
                ResidueBackend::new(t, 4),
                Err(ResidueError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_candidates_limited_to_comparable_half() {
        let backend = ResidueBackend::new(17, 15).unwrap();
        assert_eq!(backend.encrypt_candidates(&[8, 0]).unwrap().len(), 2);
        assert_eq!(
            backend.encrypt_candidates(&[12, 2]).unwrap_err(),
            ResidueError::NotComparable {
                value: 12,
                max_value: 8
            }
        );
        // plain encryption still covers all of Z_t
        assert_eq!(backend.encrypt(16).unwrap().residue, 16);
    }

    #[test]
    fn test_candidates_carry_positions() {
        let backend = ResidueBackend::new(101, 4).unwrap();
        let candidates = backend.encrypt_candidates(&[7, 3, 50]).unwrap();
        let indices: Vec<u64> = candidates.iter().map(|c| backend.decrypt(&c.index)).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
}
