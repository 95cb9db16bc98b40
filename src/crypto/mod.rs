//! Toy leveled BFV over `Z_{2^256}[X]/(X^N + 1)`.
//!
//! Scalars are coefficient-encoded in the constant term, so there is no slot
//! packing and no rotation. Parameters are far too small to be secure.

pub mod builder;
pub mod engine;
pub mod errors;
pub mod operations;
pub mod types;

pub use builder::BfvParamsBuilder;
pub use engine::{BfvEngine, BfvParams};
pub use errors::{BfvError, BfvResult};
pub use operations::BfvEvaluator;
pub use types::BfvCiphertext;
