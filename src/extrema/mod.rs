//! Homomorphic max/min-with-index evaluation.
//!
//! Candidates are `(value, index)` ciphertext pairs. A balanced tournament
//! compares neighbours with a Lagrange step polynomial and keeps the winner
//! through an arithmetic multiplexer, so no branch ever depends on plaintext
//! data. Ties resolve to the left operand, which is the earlier input.

pub mod backend;
pub mod candidate;
pub mod circuit;
pub mod context;
pub mod errors;
pub mod evaluator;
pub mod polynomial;
pub mod selector;
pub mod tiebreak;
pub mod tournament;

pub use backend::HomomorphicBackend;
pub use candidate::Candidate;
pub use circuit::{ComparisonCircuit, IndicatorBit};
pub use context::EvaluationContext;
pub use errors::{ExtremaError, ExtremaResult};
pub use evaluator::{ExtremaEvaluator, ExtremaEvaluatorBuilder};
pub use polynomial::{ComparisonPolynomial, MAX_COMPARISON_MODULUS};
pub use selector::EncryptedSelector;
pub use tiebreak::{Extremum, LeftmostWins, TieBreakPolicy};
pub use tournament::{ReductionNode, TournamentPlan, TournamentReducer};
