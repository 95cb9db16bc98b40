//! Encrypted max/min-with-index over a toy leveled BFV scheme.
pub mod crypto;
pub mod extrema;
pub mod keys;
pub mod math;
pub mod residue;
pub mod rings;

pub use crypto::{BfvCiphertext, BfvEngine, BfvError, BfvEvaluator, BfvParams, BfvParamsBuilder};
pub use extrema::{
    Candidate, ComparisonCircuit, ComparisonPolynomial, EncryptedSelector, EvaluationContext,
    ExtremaError, ExtremaEvaluator, ExtremaEvaluatorBuilder, ExtremaResult, Extremum,
    HomomorphicBackend, IndicatorBit, LeftmostWins, TieBreakPolicy, TournamentPlan,
    TournamentReducer,
};
pub use keys::{PublicKey, RelinearizationKey, SecretKey};
pub use residue::{ResidueBackend, ResidueCiphertext, ResidueError};
pub use rings::{PolyRing, PolySampler, ScaledTensor, WrappingPolyRing};

/// Ring used throughout the tests and the demo: `N = 16`.
pub type Ring16 = WrappingPolyRing<16>;
