use rand::Rng;
use std::fmt::Debug;
use std::ops::{AddAssign, MulAssign, Neg, SubAssign};

// Core polynomial ring trait - every BFV operation works on this
pub trait PolyRing<const DEGREE: usize>:
    Clone
    + Debug
    + Send
    + Sync
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + Neg<Output = Self>
{
    fn zero() -> Self;

    /// Builds a polynomial from small signed coefficients; missing entries are zero.
    fn from_coeffs(coeffs: &[i64]) -> Self;

    fn mul_scalar_assign(&mut self, scalar: i64);
}

// Sampling trait - provides common sampling operations for polynomials
pub trait PolySampler<const DEGREE: usize>: PolyRing<DEGREE> {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self;
    fn sample_gaussian<R: Rng + ?Sized>(std_dev: f64, rng: &mut R) -> Self;
    fn sample_tribits<R: Rng + ?Sized>(hamming_weight: usize, rng: &mut R) -> Self;
}

/// Arithmetic that needs the integer lift of coefficients rather than their
/// residues: the `t/q` scaling of a ciphertext tensor product, gadget
/// decomposition for relinearization, and the plaintext scaling factor
/// `delta = floor(q / t)`.
pub trait ScaledTensor<const DEGREE: usize>: PolyRing<DEGREE> {
    /// Number of digits produced by [`ScaledTensor::gadget_decompose`].
    const GADGET_DIGITS: usize;

    /// Computes `round(t/q * (a0 + a1*s) * (b0 + b1*s))` component-wise over
    /// the integers and returns the three coefficients of `1, s, s^2`.
    fn tensor_scaled(lhs: [&Self; 2], rhs: [&Self; 2], plaintext_modulus: u64) -> [Self; 3];

    /// Splits `self` into small digits `d_i` with `self = sum d_i * B^i`.
    fn gadget_decompose(&self) -> Vec<Self>;

    /// Returns `self * B^digit` for the gadget base `B`.
    fn gadget_scale(&self, digit: usize) -> Self;

    /// Adds `delta * plaintext` to the constant coefficient.
    fn add_scaled_constant(&mut self, plaintext: u64, plaintext_modulus: u64);

    /// Recovers `round(t * c_0 / q) mod t` from the constant coefficient.
    fn decode_constant(&self, plaintext_modulus: u64) -> u64;

    /// Bit length of the largest centered coefficient of `self - delta * plaintext`.
    fn noise_bits(&self, plaintext: u64, plaintext_modulus: u64) -> u32;
}
