use super::errors::{ExtremaError, ExtremaResult};
use crate::math::{is_prime, next_prime};
use rayon::prelude::*;
use tracing::{info, instrument};

/// Exclusive bound on the modulus of a comparison polynomial.
///
/// Interpolation keeps `t - 1` power sums per rayon worker and costs about
/// `t^2 / 2` modular multiplications; a degree `t - 1` evaluation also needs
/// `ceil(log2(t - 1))` levels, more than any practical depth ceiling past
/// this point.
pub const MAX_COMPARISON_MODULUS: u64 = 1 << 17;

/// Step polynomial `P` over `Z_t` with `P(x) = 1` for `x` in `[1, (t-1)/2]` and
/// `P(x) = 0` everywhere else, including `x = 0`.
///
/// Values are restricted to `[0, (t-1)/2]`, so for two values `a`, `b` the
/// residue `a - b` lands in the upper half exactly when `a < b`. `P(a - b)` is
/// then the strict `a > b` indicator.
///
/// Lagrange interpolation over all of `Z_t` collapses to a closed form because
/// `(x - a)^(t-1)` is `0` at `x = a` and `1` elsewhere:
///
/// ```text
/// P(x) = sum_{a=1}^{h} (1 - (x - a)^(t-1)),   c_0 = 0,   c_k = -sum_{a=1}^{h} a^(t-1-k)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonPolynomial {
    plaintext_modulus: u64,
    coefficients: Vec<u64>,
    depth: u32,
}

fn ceil_log2(value: usize) -> u32 {
    if value <= 1 {
        0
    } else {
        usize::BITS - (value - 1).leading_zeros()
    }
}

impl ComparisonPolynomial {
    /// Interpolates the polynomial for `plaintext_modulus` and checks that one
    /// comparison plus one selection fits within `depth_ceiling` levels.
    #[instrument]
    pub fn derive(plaintext_modulus: u64, depth_ceiling: u32) -> ExtremaResult<Self> {
        // The leading coefficient -(t-1)/2 never vanishes, so the degree is
        // t - 1 and an oversized modulus can be refused before interpolating.
        if plaintext_modulus >= 3 {
            let depth = ceil_log2((plaintext_modulus - 1) as usize);
            if depth >= depth_ceiling {
                return Err(ExtremaError::parameter(format!(
                    "comparison modulo {plaintext_modulus} needs {depth} levels plus one \
                     for selection, but the scheme supports {depth_ceiling}"
                )));
            }
        }
        let polynomial = Self::interpolate(plaintext_modulus)?;
        polynomial.check_fits(depth_ceiling)?;
        info!(
            degree = polynomial.degree(),
            depth = polynomial.depth,
            node_depth = polynomial.node_depth(),
            "derived comparison polynomial"
        );
        Ok(polynomial)
    }

    /// Interpolation alone, without a depth check.
    pub fn interpolate(plaintext_modulus: u64) -> ExtremaResult<Self> {
        let t = plaintext_modulus;
        if t < 3 || t >= MAX_COMPARISON_MODULUS || !is_prime(t) {
            return Err(ExtremaError::parameter(format!(
                "plaintext modulus {t} must be an odd prime below {MAX_COMPARISON_MODULUS}"
            )));
        }

        let half = (t - 1) / 2;
        let width = (t - 1) as usize;

        // power_sums[j] = sum_{a=1}^{h} a^j for j in 0..t-1
        let power_sums = (1..=half)
            .into_par_iter()
            .fold(
                || vec![0u64; width],
                |mut acc, a| {
                    let mut power = 1u64;
                    for slot in acc.iter_mut() {
                        *slot = (*slot + power) % t;
                        power = power * a % t;
                    }
                    acc
                },
            )
            .reduce(
                || vec![0u64; width],
                |mut lhs, rhs| {
                    for (l, r) in lhs.iter_mut().zip(rhs) {
                        *l = (*l + r) % t;
                    }
                    lhs
                },
            );

        let mut coefficients = vec![0u64; width + 1];
        for (k, coeff) in coefficients.iter_mut().enumerate().skip(1) {
            *coeff = (t - power_sums[width - k]) % t;
        }
        while coefficients.len() > 1 && coefficients.last() == Some(&0) {
            coefficients.pop();
        }

        let depth = ceil_log2(coefficients.len() - 1);
        Ok(Self {
            plaintext_modulus: t,
            coefficients,
            depth,
        })
    }

    /// Smallest admissible modulus whose value range `[0, (t-1)/2]` covers `max_value`.
    pub fn modulus_for_range(max_value: u64) -> Option<u64> {
        let lower = max_value.checked_mul(2)?.checked_add(1)?;
        next_prime(lower.max(3)).filter(|&t| t < MAX_COMPARISON_MODULUS)
    }

    /// Fails with `Parameter` unless a full tournament node fits in `depth_ceiling`.
    pub fn check_fits(&self, depth_ceiling: u32) -> ExtremaResult<()> {
        if self.node_depth() > depth_ceiling {
            return Err(ExtremaError::parameter(format!(
                "comparison of degree {} needs {} levels plus one for selection, \
                 but the scheme supports {depth_ceiling}",
                self.degree(),
                self.depth
            )));
        }
        Ok(())
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    /// Coefficients `c_0..=c_d` in ascending order.
    pub fn coefficients(&self) -> &[u64] {
        &self.coefficients
    }

    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Multiplicative depth of one evaluation, `ceil(log2(d))`.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Depth of one tournament node: a comparison followed by a selection.
    pub fn node_depth(&self) -> u32 {
        self.depth + 1
    }

    /// Largest value that compares correctly.
    pub fn max_value(&self) -> u64 {
        (self.plaintext_modulus - 1) / 2
    }

    /// Plaintext evaluation by Horner's rule.
    pub fn evaluate(&self, x: u64) -> u64 {
        let t = self.plaintext_modulus;
        let x = x % t;
        self.coefficients
            .iter()
            .rev()
            .fold(0u64, |acc, &c| (acc * x + c) % t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_function_small_moduli() {
        for t in [3u64, 5, 7, 13, 17, 101] {
            let p = ComparisonPolynomial::interpolate(t).unwrap();
            let half = (t - 1) / 2;
            for x in 0..t {
                let expected = u64::from((1..=half).contains(&x));
                assert_eq!(p.evaluate(x), expected, "t={t} x={x}");
            }
        }
    }

    #[test]
    fn test_degree_and_depth() {
        let p = ComparisonPolynomial::interpolate(17).unwrap();
        assert_eq!(p.degree(), 16);
        assert_eq!(p.depth(), 4);
        assert_eq!(p.node_depth(), 5);
        assert_eq!(p.coefficients()[0], 0);
        assert_eq!(p.max_value(), 8);

        let p = ComparisonPolynomial::interpolate(101).unwrap();
        assert_eq!(p.degree(), 100);
        assert_eq!(p.depth(), 7);

        let p = ComparisonPolynomial::interpolate(3).unwrap();
        assert_eq!(p.degree(), 2);
        assert_eq!(p.depth(), 1);
    }

    #[test]
    fn test_compares_values_in_range() {
        let t = 101;
        let p = ComparisonPolynomial::interpolate(t).unwrap();
        for a in 0..=p.max_value() {
            for b in 0..=p.max_value() {
                let diff = (a + t - b) % t;
                assert_eq!(p.evaluate(diff), u64::from(a > b), "a={a} b={b}");
            }
        }
    }

    #[test]
    fn test_rejects_bad_moduli() {
        for t in [0u64, 1, 2, 9, 19663, MAX_COMPARISON_MODULUS + 11] {
            assert!(
                matches!(
                    ComparisonPolynomial::interpolate(t),
                    Err(ExtremaError::Parameter { .. })
                ),
                "t={t}"
            );
        }
    }

    #[test]
    fn test_large_prime_refused_before_interpolating() {
        // both are prime, so only the size bound rejects them
        let above = next_prime(MAX_COMPARISON_MODULUS).unwrap();
        for t in [above, 2_147_483_647] {
            assert!(
                matches!(
                    ComparisonPolynomial::interpolate(t),
                    Err(ExtremaError::Parameter { .. })
                ),
                "t={t}"
            );
            assert!(matches!(
                ComparisonPolynomial::derive(t, u32::MAX),
                Err(ExtremaError::Parameter { .. })
            ));
        }
    }

    #[test]
    fn test_derive_checks_depth_ceiling() {
        assert!(ComparisonPolynomial::derive(17, 5).is_ok());
        assert!(matches!(
            ComparisonPolynomial::derive(17, 4),
            Err(ExtremaError::Parameter { .. })
        ));
    }

    #[test]
    fn test_modulus_for_range() {
        assert_eq!(ComparisonPolynomial::modulus_for_range(9812), Some(19661));
        assert_eq!(ComparisonPolynomial::modulus_for_range(8), Some(17));
        assert_eq!(ComparisonPolynomial::modulus_for_range(0), Some(3));
        assert_eq!(ComparisonPolynomial::modulus_for_range(1 << 31), None);
        assert_eq!(ComparisonPolynomial::modulus_for_range(1 << 16), None);
    }

    #[test]
    fn test_ceil_log2() {
        assert_eq!(ceil_log2(1), 0);
        assert_eq!(ceil_log2(2), 1);
        assert_eq!(ceil_log2(16), 4);
        assert_eq!(ceil_log2(17), 5);
        assert_eq!(ceil_log2(19660), 15);
    }
}
