use proptest::prelude::*;
use toy_bfv_extrema::{PolyRing, ScaledTensor, WrappingPolyRing};

const DEGREE: usize = 8;
type Ring = WrappingPolyRing<DEGREE>;

// Strategy to generate polynomials with small signed coefficients
fn poly_strategy() -> impl Strategy<Value = Ring> {
    prop::collection::vec(-1_000_000i64..1_000_000i64, 0..=DEGREE)
        .prop_map(|coeffs| Ring::from_coeffs(&coeffs))
}

proptest! {
    #[test]
    fn test_addition_associativity(p1 in poly_strategy(), p2 in poly_strategy(), p3 in poly_strategy()) {
        let mut lhs = p1;
        lhs += &p2;
        lhs += &p3;
        let mut rhs = p2;
        rhs += &p3;
        rhs += &p1;
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_multiplication_commutativity(p1 in poly_strategy(), p2 in poly_strategy()) {
        let mut lhs = p1;
        lhs *= &p2;
        let mut rhs = p2;
        rhs *= &p1;
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_distributivity(p1 in poly_strategy(), p2 in poly_strategy(), p3 in poly_strategy()) {
        let mut sum = p2;
        sum += &p3;
        let mut lhs = p1;
        lhs *= &sum;

        let mut a = p1;
        a *= &p2;
        let mut b = p1;
        b *= &p3;
        a += &b;
        prop_assert_eq!(lhs, a);
    }

    #[test]
    fn test_additive_inverse(p in poly_strategy()) {
        let mut sum = p;
        sum += &(-p);
        prop_assert_eq!(sum, Ring::zero());
        let mut diff = p;
        diff -= &p;
        prop_assert_eq!(diff, Ring::zero());
    }

    #[test]
    fn test_scalar_matches_constant_polynomial(p in poly_strategy(), scalar in -1000i64..1000) {
        let mut lhs = p;
        lhs.mul_scalar_assign(scalar);
        let mut rhs = p;
        rhs *= &Ring::from_coeffs(&[scalar]);
        prop_assert_eq!(lhs, rhs);
    }

    #[test]
    fn test_encoding_survives_small_noise(
        noise in prop::collection::vec(-(1i64 << 40) + 1..(1i64 << 40), DEGREE),
        m in 0u64..101,
    ) {
        let mut p = Ring::from_coeffs(&noise);
        p.add_scaled_constant(m, 101);
        prop_assert_eq!(p.decode_constant(101), m);
        prop_assert!(p.noise_bits(m, 101) <= 40);
    }

    #[test]
    fn test_gadget_decomposition_recomposes(p in poly_strategy()) {
        let mut rebuilt = Ring::zero();
        for (digit, part) in p.gadget_decompose().iter().enumerate() {
            rebuilt += &part.gadget_scale(digit);
        }
        prop_assert_eq!(rebuilt, p);
    }
}

#[test]
fn test_negacyclic_identity() {
    // X^(N-1) * X = X^N = -1
    let mut x_top = [0i64; DEGREE];
    x_top[DEGREE - 1] = 1;
    let mut product = Ring::from_coeffs(&x_top);
    product *= &Ring::from_coeffs(&[0, 1]);
    assert_eq!(product, Ring::from_coeffs(&[-1]));
}
