use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use toy_bfv_extrema::{
    BfvEngine, BfvParams, ComparisonPolynomial, ExtremaEvaluator, ResidueBackend, Ring16,
};
use tracing_subscriber::EnvFilter;

const DEGREE: usize = 16;

fn residue_session(values: &[u64]) -> Result<(), Box<dyn std::error::Error>> {
    let max_value = values.iter().copied().max().unwrap_or(0);
    let modulus = ComparisonPolynomial::modulus_for_range(max_value)
        .ok_or("value range too large for a comparison polynomial")?;
    let node_depth = ComparisonPolynomial::interpolate(modulus)?.node_depth();
    let height = values.len().next_power_of_two().trailing_zeros();

    println!("🧮 Residue backend (no encryption), t = {modulus}");
    let backend = ResidueBackend::new(modulus, node_depth * height)?;
    let evaluator = ExtremaEvaluator::new(&backend)?;
    println!(
        "  comparison degree {}, depth {}, node depth {}, up to {} inputs",
        evaluator.polynomial().degree(),
        evaluator.polynomial().depth(),
        node_depth,
        evaluator.max_inputs()
    );

    let cts = values
        .iter()
        .map(|&v| backend.encrypt(v))
        .collect::<Result<Vec<_>, _>>()?;
    let sum = evaluator.reduce_sum(&cts)?;
    println!("  sum: {}", backend.decrypt(&sum));

    let (max, min) = evaluator.reduce_extrema(backend.encrypt_candidates(values)?)?;
    println!(
        "  max: {} at index {}",
        backend.decrypt(&max.value),
        backend.decrypt(&max.index)
    );
    println!(
        "  min: {} at index {}",
        backend.decrypt(&min.value),
        backend.decrypt(&min.index)
    );
    Ok(())
}

fn bfv_session(values: &[u64]) -> Result<(), Box<dyn std::error::Error>> {
    let params = BfvParams::<DEGREE>::builder()
        .plaintext_modulus(17)
        .depth_ceiling(10)
        .build()?;
    let engine = BfvEngine::<Ring16, DEGREE>::new(params);
    let mut rng = ChaCha20Rng::seed_from_u64(42);

    println!("\n🔐 Toy BFV, N = {DEGREE}, t = 17, depth ceiling 10");
    let secret_key = engine.generate_secret_key(&mut rng)?;
    let public_key = engine.generate_public_key(&secret_key, &mut rng)?;
    let relin_key = engine.generate_relinearization_key(&secret_key, &mut rng)?;
    let backend = engine.evaluator(relin_key);
    let evaluator = ExtremaEvaluator::new(&backend)?;
    println!("  inputs: {values:?} (up to {} per reduction)", evaluator.max_inputs());

    let candidates = engine.encrypt_candidates(values, &public_key, &mut rng)?;
    let (max, min) = evaluator.reduce_extrema(candidates)?;
    println!(
        "  max: {} at index {} (noise budget {} bits)",
        engine.decrypt(&max.value, &secret_key),
        engine.decrypt(&max.index, &secret_key),
        engine.noise_budget_bits(&max.value, &secret_key)
    );
    println!(
        "  min: {} at index {} (noise budget {} bits)",
        engine.decrypt(&min.value, &secret_key),
        engine.decrypt(&min.index, &secret_key),
        engine.noise_budget_bits(&min.value, &secret_key)
    );

    let too_many = engine.encrypt_candidates(&[1, 2, 3, 4, 5], &public_key, &mut rng)?;
    if let Err(err) = evaluator.reduce_max(too_many) {
        println!("  5 inputs: {err}");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    residue_session(&[9, 1, 17, 1000, 3197, 9812, 751])?;
    bfv_session(&[3, 8, 8, 0])?;
    Ok(())
}
