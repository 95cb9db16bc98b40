use crate::keys::{PublicKeyError, RelinearizationKeyError, SecretKeyError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BfvError {
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Plaintext {value} out of range for modulus {modulus}")]
    PlaintextOutOfRange { value: u64, modulus: u64 },

    #[error("Plaintext {value} cannot be compared: candidates must lie in [0, {max_value}]")]
    NotComparable { value: u64, max_value: u64 },

    #[error("Ciphertext has no multiplicative levels left")]
    LevelExhausted,

    #[error("Ciphertext degree mismatch: expected {expected}, got {actual}")]
    DegreeMismatch { expected: usize, actual: usize },

    #[error("Secret key generation failed: {source}")]
    SecretKey {
        #[from]
        source: SecretKeyError,
    },

    #[error("Public key generation failed: {source}")]
    PublicKey {
        #[from]
        source: PublicKeyError,
    },

    #[error("Relinearization key generation failed: {source}")]
    RelinearizationKey {
        #[from]
        source: RelinearizationKeyError,
    },
}

pub type BfvResult<T> = Result<T, BfvError>;
