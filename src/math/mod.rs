pub mod primes;
pub mod sampling;
pub mod utils;

pub use primes::{MAX_PLAINTEXT_MODULUS, is_prime, next_prime};
pub use sampling::{GAUSSIAN_TAIL_CUT, gaussian_coefficients, ternary_coefficients, uniform_words};
pub use utils::centered_residue;
