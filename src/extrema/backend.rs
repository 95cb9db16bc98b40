//! The narrow operation set the evaluator consumes from an encryption scheme.
use std::fmt::Debug;

/// Primitive homomorphic operations over scalar ciphertexts modulo the
/// plaintext modulus `t`.
///
/// Every ciphertext carries a remaining multiplicative depth. Only
/// [`HomomorphicBackend::multiply`] consumes depth; it returns an
/// un-relinearized ciphertext that must pass through
/// [`HomomorphicBackend::relinearize`] before it can be multiplied again.
/// Additions accept un-relinearized operands so that several products can be
/// summed and relinearized once.
pub trait HomomorphicBackend: Send + Sync {
    type Ciphertext: Clone + Debug + Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    fn plaintext_modulus(&self) -> u64;

    /// Depth of a freshly encrypted ciphertext.
    fn depth_ceiling(&self) -> u32;

    fn remaining_depth(&self, ct: &Self::Ciphertext) -> u32;

    fn add(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext)
    -> Result<Self::Ciphertext, Self::Error>;

    fn sub(&self, lhs: &Self::Ciphertext, rhs: &Self::Ciphertext)
    -> Result<Self::Ciphertext, Self::Error>;

    fn negate(&self, ct: &Self::Ciphertext) -> Self::Ciphertext;

    /// Adds the plaintext constant `scalar mod t`.
    fn add_plain(&self, ct: &Self::Ciphertext, scalar: u64) -> Result<Self::Ciphertext, Self::Error>;

    /// Multiplies by the plaintext constant `scalar mod t`. Depth-free.
    fn mul_plain(&self, ct: &Self::Ciphertext, scalar: u64) -> Result<Self::Ciphertext, Self::Error>;

    /// Ciphertext product; consumes one level and leaves the result unrelinearized.
    fn multiply(
        &self,
        lhs: &Self::Ciphertext,
        rhs: &Self::Ciphertext,
    ) -> Result<Self::Ciphertext, Self::Error>;

    fn relinearize(&self, ct: &Self::Ciphertext) -> Result<Self::Ciphertext, Self::Error>;
}
