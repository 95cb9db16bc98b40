//! Primality for plaintext moduli.
//!
//! The comparison polynomial is interpolated over the field `Z_t`, so `t` has
//! to be prime. Miller-Rabin over the first twelve prime bases is exact for
//! every `u64`.

/// Exclusive upper bound on plaintext moduli. Below it a sum or a product of
/// two residues fits in a `u64`.
pub const MAX_PLAINTEXT_MODULUS: u64 = 1 << 31;

const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// `(a * b) mod modulus` through a `u128` product.
pub(crate) fn mul_mod(a: u64, b: u64, modulus: u64) -> u64 {
    debug_assert!(modulus > 0);
    ((a as u128 * b as u128) % modulus as u128) as u64
}

/// `base^exp mod modulus` by square-and-multiply.
pub(crate) fn mod_pow(base: u64, exp: u64, modulus: u64) -> u64 {
    debug_assert!(modulus > 0);
    let mut result = 1 % modulus;
    let mut square = base % modulus;
    let mut exp = exp;
    while exp != 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, square, modulus);
        }
        square = mul_mod(square, square, modulus);
        exp >>= 1;
    }
    result
}

/// True when `witness` proves the odd number `n = odd * 2^shift + 1` composite.
fn is_witness(witness: u64, n: u64, odd: u64, shift: u32) -> bool {
    let mut x = mod_pow(witness, odd, n);
    if x == 1 || x == n - 1 {
        return false;
    }
    for _ in 1..shift {
        x = mul_mod(x, x, n);
        if x == n - 1 {
            return false;
        }
    }
    true
}

pub fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if let Some(&p) = WITNESSES.iter().find(|&&p| n % p == 0) {
        return n == p;
    }
    let shift = (n - 1).trailing_zeros();
    let odd = (n - 1) >> shift;
    !WITNESSES.iter().any(|&w| is_witness(w, n, odd, shift))
}

/// Smallest prime `p >= value`, or `None` past the end of `u64`.
pub fn next_prime(value: u64) -> Option<u64> {
    if value <= 2 {
        return Some(2);
    }
    let mut candidate = value | 1;
    while !is_prime(candidate) {
        candidate = candidate.checked_add(2)?;
    }
    Some(candidate)
}
