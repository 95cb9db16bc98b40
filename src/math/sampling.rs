//! Randomness for key generation and encryption.
//!
//! Every sampler takes the caller's RNG, so a seeded `ChaCha20Rng` gives
//! reproducible keys and noise in tests.
use rand::Rng;
use rand::seq::index;
use rand_distr::{Distribution, Normal};

/// Error samples are clamped to this many standard deviations.
///
/// The depth heuristic in `BfvParams::supported_depth` assumes the same bound.
pub const GAUSSIAN_TAIL_CUT: f64 = 6.0;

/// Samples `DEGREE` blocks of `WORDS` uniformly random 64-bit words.
///
/// With a power-of-two ciphertext modulus every block is a uniform residue,
/// so no rejection step is needed.
pub fn uniform_words<const DEGREE: usize, const WORDS: usize, R: Rng + ?Sized>(
    rng: &mut R,
) -> [[u64; WORDS]; DEGREE] {
    std::array::from_fn(|_| std::array::from_fn(|_| rng.random::<u64>()))
}

/// Rounded Gaussian error centered at zero, clamped to `GAUSSIAN_TAIL_CUT * std_dev`.
///
/// # Panics
///
/// Panics if `std_dev` is not finite and positive. Callers validate it
/// through the key parameter structs first.
pub fn gaussian_coefficients<const DEGREE: usize, R: Rng + ?Sized>(
    std_dev: f64,
    rng: &mut R,
) -> [i64; DEGREE] {
    let normal = match Normal::new(0.0, std_dev) {
        Ok(normal) if std_dev.is_finite() && std_dev > 0.0 => normal,
        _ => panic!("gaussian_coefficients: std_dev {std_dev} must be finite and positive"),
    };
    let bound = (GAUSSIAN_TAIL_CUT * std_dev).ceil();
    std::array::from_fn(|_| normal.sample(rng).clamp(-bound, bound).round() as i64)
}

/// Ternary polynomial with exactly `hamming_weight` entries in `{-1, 1}`.
///
/// # Panics
///
/// Panics if `hamming_weight > DEGREE`.
pub fn ternary_coefficients<const DEGREE: usize, R: Rng + ?Sized>(
    hamming_weight: usize,
    rng: &mut R,
) -> [i64; DEGREE] {
    assert!(
        hamming_weight <= DEGREE,
        "ternary_coefficients: weight {hamming_weight} exceeds degree {DEGREE}"
    );
    let mut out = [0i64; DEGREE];
    for position in index::sample(rng, DEGREE, hamming_weight) {
        out[position] = if rng.random_bool(0.5) { 1 } else { -1 };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_uniform_blocks_differ() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let blocks = uniform_words::<16, 4, _>(&mut rng);
        // a zero word has probability 2^-64 per draw
        assert!(blocks.iter().flatten().all(|&w| w != 0));
        assert_ne!(blocks[0], blocks[1]);
    }

    #[test]
    fn test_uniform_sign_bit_balanced() {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let blocks = uniform_words::<4096, 4, _>(&mut rng);
        let negative = blocks.iter().filter(|b| b[3] >> 63 == 1).count();
        assert!((1843..=2253).contains(&negative), "negative = {negative}");
    }

    #[test]
    fn test_gaussian_respects_tail_cut() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        for _ in 0..64 {
            let coeffs = gaussian_coefficients::<16, _>(3.2, &mut rng);
            assert!(coeffs.iter().all(|&e| e.abs() <= 20));
        }
    }

    #[test]
    fn test_gaussian_moments() {
        const SAMPLES: usize = 8192;
        let std_dev = 3.2;
        let mut rng = ChaCha20Rng::seed_from_u64(99);
        let coeffs = gaussian_coefficients::<SAMPLES, _>(std_dev, &mut rng);

        let mean = coeffs.iter().sum::<i64>() as f64 / SAMPLES as f64;
        let variance = coeffs
            .iter()
            .map(|&e| (e as f64 - mean).powi(2))
            .sum::<f64>()
            / SAMPLES as f64;
        assert!(mean.abs() < 0.25, "mean {mean}");
        // rounding adds 1/12 to the variance
        assert!((variance - 10.32).abs() < 2.0, "variance {variance}");
    }

    #[test]
    #[should_panic(expected = "must be finite and positive")]
    fn test_gaussian_rejects_zero_std() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        gaussian_coefficients::<16, _>(0.0, &mut rng);
    }

    #[test]
    #[should_panic(expected = "must be finite and positive")]
    fn test_gaussian_rejects_nan_std() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        gaussian_coefficients::<16, _>(f64::NAN, &mut rng);
    }

    #[test]
    fn test_ternary_weight() {
        let mut rng = ChaCha20Rng::seed_from_u64(123);
        for weight in [0, 1, 8, 16] {
            let coeffs = ternary_coefficients::<16, _>(weight, &mut rng);
            assert_eq!(coeffs.iter().filter(|&&c| c != 0).count(), weight);
            assert!(coeffs.iter().all(|&c| (-1..=1).contains(&c)));
        }
    }

    #[test]
    #[should_panic(expected = "exceeds degree")]
    fn test_ternary_rejects_oversized_weight() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        ternary_coefficients::<16, _>(17, &mut rng);
    }
}
