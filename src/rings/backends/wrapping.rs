use crate::math::{gaussian_coefficients, ternary_coefficients, uniform_words};
use crate::rings::traits::{PolyRing, PolySampler, ScaledTensor};
use crypto_bigint::{U1024, U256};
use rand::Rng;
use std::ops::{AddAssign, MulAssign, Neg, SubAssign};

const WORDS: usize = 4;
const WIDE_WORDS: usize = 16;

/// Polynomial in `Z_q[X]/(X^DEGREE + 1)` with `q = 2^256`.
///
/// Coefficients are stored as `U256` residues and every ring operation is a
/// wrapping operation, so reduction modulo `q` is free. Coefficients whose top
/// bit is set are read as negative when an integer lift is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrappingPolyRing<const DEGREE: usize> {
    coeffs: [U256; DEGREE],
}

impl<const DEGREE: usize> WrappingPolyRing<DEGREE> {
    pub fn coefficients(&self) -> &[U256; DEGREE] {
        &self.coeffs
    }
}

/// Scaling factor `floor(2^256 / t)`, by schoolbook long division over words.
pub fn delta(plaintext_modulus: u64) -> U256 {
    debug_assert!(plaintext_modulus > 1);
    let divisor = plaintext_modulus as u128;
    let mut words = [0u64; WORDS];
    let mut remainder: u128 = 1;
    for i in (0..WORDS).rev() {
        let current = remainder << 64;
        words[i] = (current / divisor) as u64;
        remainder = current % divisor;
    }
    U256::from_words(words)
}

fn from_i64(value: i64) -> U256 {
    let magnitude = U256::from_u64(value.unsigned_abs());
    if value < 0 {
        U256::ZERO.wrapping_sub(&magnitude)
    } else {
        magnitude
    }
}

fn is_negative(value: &U256) -> bool {
    value.as_words()[WORDS - 1] >> 63 == 1
}

/// Two's-complement sign extension of a centered `U256` residue.
fn sign_extend(value: &U256) -> U1024 {
    let fill = if is_negative(value) { u64::MAX } else { 0 };
    let mut wide = [fill; WIDE_WORDS];
    wide[..WORDS].copy_from_slice(value.as_words());
    U1024::from_words(wide)
}

/// Zero extension, used when the residue is read as an unsigned integer.
fn zero_extend(value: &U256) -> U1024 {
    let mut wide = [0u64; WIDE_WORDS];
    wide[..WORDS].copy_from_slice(value.as_words());
    U1024::from_words(wide)
}

/// `2^255`, the rounding offset for a division by `2^256`.
fn half_modulus_wide() -> U1024 {
    let mut wide = [0u64; WIDE_WORDS];
    wide[WORDS - 1] = 1 << 63;
    U1024::from_words(wide)
}

/// `round(t * x / 2^256) mod 2^256` for a signed wide integer `x`.
fn scale_down(value: &U1024, plaintext_modulus: u64) -> U256 {
    let scaled = value
        .wrapping_mul(&U1024::from_u64(plaintext_modulus))
        .wrapping_add(&half_modulus_wide());
    let words = scaled.as_words();
    let mut out = [0u64; WORDS];
    out.copy_from_slice(&words[WORDS..2 * WORDS]);
    U256::from_words(out)
}

fn bit_length(value: &U256) -> u32 {
    let words = value.as_words();
    for i in (0..WORDS).rev() {
        if words[i] != 0 {
            return 64 * i as u32 + (64 - words[i].leading_zeros());
        }
    }
    0
}

/// Negacyclic convolution of sign-extended operands over 1024-bit integers.
fn wide_negacyclic<const DEGREE: usize>(
    lhs: &[U1024; DEGREE],
    rhs: &[U1024; DEGREE],
    acc: &mut [U1024; DEGREE],
) {
    for (i, a) in lhs.iter().enumerate() {
        for (j, b) in rhs.iter().enumerate() {
            let product = a.wrapping_mul(b);
            let k = i + j;
            if k < DEGREE {
                acc[k] = acc[k].wrapping_add(&product);
            } else {
                acc[k - DEGREE] = acc[k - DEGREE].wrapping_sub(&product);
            }
        }
    }
}

impl<const DEGREE: usize> AddAssign<&Self> for WrappingPolyRing<DEGREE> {
    fn add_assign(&mut self, rhs: &Self) {
        for (lhs, rhs) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
            *lhs = lhs.wrapping_add(rhs);
        }
    }
}

impl<const DEGREE: usize> SubAssign<&Self> for WrappingPolyRing<DEGREE> {
    fn sub_assign(&mut self, rhs: &Self) {
        for (lhs, rhs) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
            *lhs = lhs.wrapping_sub(rhs);
        }
    }
}

impl<const DEGREE: usize> MulAssign<&Self> for WrappingPolyRing<DEGREE> {
    fn mul_assign(&mut self, rhs: &Self) {
        let mut result = [U256::ZERO; DEGREE];
        for i in 0..DEGREE {
            for j in 0..DEGREE {
                let product = self.coeffs[i].wrapping_mul(&rhs.coeffs[j]);
                let k = i + j;
                // X^DEGREE = -1
                if k < DEGREE {
                    result[k] = result[k].wrapping_add(&product);
                } else {
                    result[k - DEGREE] = result[k - DEGREE].wrapping_sub(&product);
                }
            }
        }
        self.coeffs = result;
    }
}

impl<const DEGREE: usize> Neg for WrappingPolyRing<DEGREE> {
    type Output = Self;

    fn neg(mut self) -> Self {
        for coeff in &mut self.coeffs {
            *coeff = U256::ZERO.wrapping_sub(coeff);
        }
        self
    }
}

impl<const DEGREE: usize> PolyRing<DEGREE> for WrappingPolyRing<DEGREE> {
    fn zero() -> Self {
        Self {
            coeffs: [U256::ZERO; DEGREE],
        }
    }

    fn from_coeffs(coeffs: &[i64]) -> Self {
        let mut out = Self::zero();
        for (slot, &value) in out.coeffs.iter_mut().zip(coeffs.iter()) {
            *slot = from_i64(value);
        }
        out
    }

    fn mul_scalar_assign(&mut self, scalar: i64) {
        let scalar = from_i64(scalar);
        for coeff in &mut self.coeffs {
            *coeff = coeff.wrapping_mul(&scalar);
        }
    }
}

impl<const DEGREE: usize> PolySampler<DEGREE> for WrappingPolyRing<DEGREE> {
    fn sample_uniform<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let blocks = uniform_words::<DEGREE, WORDS, R>(rng);
        let mut out = Self::zero();
        for (slot, block) in out.coeffs.iter_mut().zip(blocks.iter()) {
            *slot = U256::from_words(*block);
        }
        out
    }

    fn sample_gaussian<R: Rng + ?Sized>(std_dev: f64, rng: &mut R) -> Self {
        Self::from_coeffs(&gaussian_coefficients::<DEGREE, R>(std_dev, rng))
    }

    fn sample_tribits<R: Rng + ?Sized>(hamming_weight: usize, rng: &mut R) -> Self {
        Self::from_coeffs(&ternary_coefficients::<DEGREE, R>(hamming_weight, rng))
    }
}

impl<const DEGREE: usize> ScaledTensor<DEGREE> for WrappingPolyRing<DEGREE> {
    const GADGET_DIGITS: usize = WORDS;

    fn tensor_scaled(lhs: [&Self; 2], rhs: [&Self; 2], plaintext_modulus: u64) -> [Self; 3] {
        let lift = |poly: &Self| poly.coeffs.map(|c| sign_extend(&c));
        let (a0, a1) = (lift(lhs[0]), lift(lhs[1]));
        let (b0, b1) = (lift(rhs[0]), lift(rhs[1]));

        let mut d0 = [U1024::ZERO; DEGREE];
        let mut d1 = [U1024::ZERO; DEGREE];
        let mut d2 = [U1024::ZERO; DEGREE];
        wide_negacyclic(&a0, &b0, &mut d0);
        wide_negacyclic(&a0, &b1, &mut d1);
        wide_negacyclic(&a1, &b0, &mut d1);
        wide_negacyclic(&a1, &b1, &mut d2);

        let scale = |wide: [U1024; DEGREE]| Self {
            coeffs: wide.map(|x| scale_down(&x, plaintext_modulus)),
        };
        [scale(d0), scale(d1), scale(d2)]
    }

    fn gadget_decompose(&self) -> Vec<Self> {
        (0..WORDS)
            .map(|digit| Self {
                coeffs: self.coeffs.map(|c| U256::from_u64(c.as_words()[digit])),
            })
            .collect()
    }

    fn gadget_scale(&self, digit: usize) -> Self {
        let shift = |c: U256| {
            let words = c.as_words();
            let mut out = [0u64; WORDS];
            for j in digit..WORDS {
                out[j] = words[j - digit];
            }
            U256::from_words(out)
        };
        Self {
            coeffs: self.coeffs.map(shift),
        }
    }

    fn add_scaled_constant(&mut self, plaintext: u64, plaintext_modulus: u64) {
        if DEGREE == 0 {
            return;
        }
        let message = U256::from_u64(plaintext % plaintext_modulus);
        self.coeffs[0] =
            self.coeffs[0].wrapping_add(&delta(plaintext_modulus).wrapping_mul(&message));
    }

    fn decode_constant(&self, plaintext_modulus: u64) -> u64 {
        let Some(constant) = self.coeffs.first() else {
            return 0;
        };
        let scaled = zero_extend(constant)
            .wrapping_mul(&U1024::from_u64(plaintext_modulus))
            .wrapping_add(&half_modulus_wide());
        scaled.as_words()[WORDS] % plaintext_modulus
    }

    fn noise_bits(&self, plaintext: u64, plaintext_modulus: u64) -> u32 {
        let mut error = *self;
        if DEGREE > 0 {
            let message = U256::from_u64(plaintext % plaintext_modulus);
            error.coeffs[0] =
                error.coeffs[0].wrapping_sub(&delta(plaintext_modulus).wrapping_mul(&message));
        }
        error
            .coeffs
            .iter()
            .map(|c| {
                let centered = if is_negative(c) {
                    U256::ZERO.wrapping_sub(c)
                } else {
                    *c
                };
                bit_length(&centered)
            })
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    type Ring = WrappingPolyRing<16>;

    #[test]
    fn test_delta_matches_division() {
        // 2^256 / 2 = 2^255
        let half = delta(2);
        assert_eq!(half.as_words(), &[0, 0, 0, 1 << 63]);

        let d = delta(17);
        let times_t = d.wrapping_mul(&U256::from_u64(17));
        // delta * t = 2^256 - (2^256 mod 17), and 2^256 mod 17 = 1
        assert_eq!(U256::ZERO.wrapping_sub(&times_t), U256::from_u64(1));
    }

    #[test]
    fn test_negacyclic_wraparound() {
        let mut c = [0i64; 16];
        c[15] = 1;
        let mut x = Ring::from_coeffs(&c);
        let y = x;
        x *= &y;
        // X^15 * X^15 = X^30 = -X^14
        let expected = {
            let mut c = [0i64; 16];
            c[14] = -1;
            Ring::from_coeffs(&c)
        };
        assert_eq!(x, expected);
    }

    #[test]
    fn test_add_sub_neg() {
        let a = Ring::from_coeffs(&[3, -2, 7]);
        let b = Ring::from_coeffs(&[1, 5, -7]);
        let mut sum = a;
        sum += &b;
        assert_eq!(sum, Ring::from_coeffs(&[4, 3, 0]));
        sum -= &b;
        assert_eq!(sum, a);
        let mut zero = a;
        zero += &(-a);
        assert_eq!(zero, Ring::zero());
    }

    #[test]
    fn test_mul_scalar() {
        let mut a = Ring::from_coeffs(&[3, -2]);
        a.mul_scalar_assign(-4);
        assert_eq!(a, Ring::from_coeffs(&[-12, 8]));
    }

    #[test]
    fn test_encode_decode_constant() {
        for t in [17u64, 101, 19661] {
            for m in [0, 1, t / 2, t - 1] {
                let mut p = Ring::from_coeffs(&[5, -3, 2]);
                p.add_scaled_constant(m, t);
                assert_eq!(p.decode_constant(t), m, "t={t} m={m}");
                assert!(p.noise_bits(m, t) <= 3);
            }
        }
    }

    #[test]
    fn test_noise_bits_of_small_error() {
        let mut p = Ring::from_coeffs(&[-1000, 0, 12]);
        p.add_scaled_constant(9, 17);
        assert_eq!(p.noise_bits(9, 17), 10);
    }

    #[test]
    fn test_gadget_round_trip() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let a = Ring::sample_uniform(&mut rng);
        let mut rebuilt = Ring::zero();
        for (i, digit) in a.gadget_decompose().iter().enumerate() {
            rebuilt += &digit.gadget_scale(i);
        }
        assert_eq!(rebuilt, a);
    }

    #[test]
    fn test_tensor_scaled_of_encodings() {
        // (delta*3) * (delta*5) * t / q ~ delta*15 for trivial ciphertexts (m, 0)
        let t = 17;
        let mut lhs = Ring::zero();
        lhs.add_scaled_constant(3, t);
        let mut rhs = Ring::zero();
        rhs.add_scaled_constant(5, t);
        let zero = Ring::zero();
        let [d0, d1, d2] = Ring::tensor_scaled([&lhs, &zero], [&rhs, &zero], t);
        assert_eq!(d0.decode_constant(t), 15);
        assert_eq!(d1, Ring::zero());
        assert_eq!(d2, Ring::zero());
    }

    #[test]
    fn test_tribits_weight() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let s = Ring::sample_tribits(8, &mut rng);
        let nonzero = s.coefficients().iter().filter(|c| **c != U256::ZERO).count();
        assert_eq!(nonzero, 8);
    }
}
