use super::backend::HomomorphicBackend;
use super::candidate::Candidate;
use super::circuit::ComparisonCircuit;
use super::context::EvaluationContext;
use super::errors::{ExtremaError, ExtremaResult};
use super::polynomial::ComparisonPolynomial;
use super::tiebreak::{Extremum, LeftmostWins, TieBreakPolicy};
use super::tournament::{TournamentPlan, TournamentReducer};
use std::sync::Arc;
use tracing::instrument;

pub struct ExtremaEvaluatorBuilder<'b, B: HomomorphicBackend, T: TieBreakPolicy = LeftmostWins> {
    backend: &'b B,
    polynomial: Option<Arc<ComparisonPolynomial>>,
    parallel: Option<bool>,
    policy: T,
}

impl<'b, B: HomomorphicBackend> ExtremaEvaluatorBuilder<'b, B, LeftmostWins> {
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            polynomial: None,
            parallel: None,
            policy: LeftmostWins,
        }
    }
}

impl<'b, B: HomomorphicBackend, T: TieBreakPolicy> ExtremaEvaluatorBuilder<'b, B, T> {
    /// Reuses an already derived polynomial instead of interpolating again.
    pub fn polynomial(mut self, polynomial: Arc<ComparisonPolynomial>) -> Self {
        self.polynomial = Some(polynomial);
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    pub fn tie_break<U: TieBreakPolicy>(self, policy: U) -> ExtremaEvaluatorBuilder<'b, B, U> {
        ExtremaEvaluatorBuilder {
            backend: self.backend,
            polynomial: self.polynomial,
            parallel: self.parallel,
            policy,
        }
    }

    pub fn build(self) -> ExtremaResult<ExtremaEvaluator<'b, B, T>> {
        let modulus = self.backend.plaintext_modulus();
        let ceiling = self.backend.depth_ceiling();

        let polynomial = match self.polynomial {
            Some(polynomial) => {
                if polynomial.plaintext_modulus() != modulus {
                    return Err(ExtremaError::parameter(format!(
                        "polynomial derived for modulus {}, backend uses {modulus}",
                        polynomial.plaintext_modulus()
                    )));
                }
                polynomial.check_fits(ceiling)?;
                polynomial
            }
            None => Arc::new(ComparisonPolynomial::derive(modulus, ceiling)?),
        };

        Ok(ExtremaEvaluator {
            backend: self.backend,
            polynomial,
            policy: self.policy,
            parallel: self.parallel.unwrap_or(true),
        })
    }
}

/// Max/min-with-index reductions over one backend.
pub struct ExtremaEvaluator<'b, B: HomomorphicBackend, T: TieBreakPolicy = LeftmostWins> {
    backend: &'b B,
    polynomial: Arc<ComparisonPolynomial>,
    policy: T,
    parallel: bool,
}

impl<'b, B: HomomorphicBackend> ExtremaEvaluator<'b, B, LeftmostWins> {
    pub fn builder(backend: &'b B) -> ExtremaEvaluatorBuilder<'b, B, LeftmostWins> {
        ExtremaEvaluatorBuilder::new(backend)
    }

    /// Evaluator with default settings.
    pub fn new(backend: &'b B) -> ExtremaResult<Self> {
        Self::builder(backend).build()
    }
}

impl<'b, B: HomomorphicBackend, T: TieBreakPolicy> ExtremaEvaluator<'b, B, T> {
    pub fn polynomial(&self) -> &Arc<ComparisonPolynomial> {
        &self.polynomial
    }

    pub fn context(&self) -> EvaluationContext<'b, B> {
        EvaluationContext::new(self.backend)
    }

    /// Largest number of fresh candidates a reduction accepts.
    pub fn max_inputs(&self) -> usize {
        TournamentPlan::max_inputs(self.backend.depth_ceiling(), self.polynomial.node_depth())
    }

    fn reducer(&self) -> TournamentReducer<'_, B, T> {
        TournamentReducer::new(
            EvaluationContext::new(self.backend),
            ComparisonCircuit::new(&self.polynomial),
            &self.policy,
            self.parallel,
        )
    }

    /// Largest value with the earliest index at which it occurs.
    #[instrument(skip_all, fields(inputs = candidates.len()))]
    pub fn reduce_max(
        &self,
        candidates: Vec<Candidate<B::Ciphertext>>,
    ) -> ExtremaResult<Candidate<B::Ciphertext>> {
        self.reducer().reduce(candidates, Extremum::Max)
    }

    /// Smallest value with the earliest index at which it occurs.
    #[instrument(skip_all, fields(inputs = candidates.len()))]
    pub fn reduce_min(
        &self,
        candidates: Vec<Candidate<B::Ciphertext>>,
    ) -> ExtremaResult<Candidate<B::Ciphertext>> {
        self.reducer().reduce(candidates, Extremum::Min)
    }

    /// `(max, min)` with the leaf comparisons shared between both trees.
    #[instrument(skip_all, fields(inputs = candidates.len()))]
    pub fn reduce_extrema(
        &self,
        candidates: Vec<Candidate<B::Ciphertext>>,
    ) -> ExtremaResult<(Candidate<B::Ciphertext>, Candidate<B::Ciphertext>)> {
        self.reducer().reduce_both(candidates)
    }

    /// Homomorphic sum of the inputs; consumes no depth.
    pub fn reduce_sum(&self, ciphertexts: &[B::Ciphertext]) -> ExtremaResult<B::Ciphertext> {
        self.context().sum(ciphertexts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residue::ResidueBackend;

    #[test]
    fn test_build_derives_polynomial() {
        let backend = ResidueBackend::new(17, 10).unwrap();
        let evaluator = ExtremaEvaluator::new(&backend).unwrap();
        assert_eq!(evaluator.polynomial().degree(), 16);
        assert_eq!(evaluator.max_inputs(), 4);
    }

    #[test]
    fn test_shared_polynomial_must_match_backend() {
        let polynomial = Arc::new(ComparisonPolynomial::interpolate(17).unwrap());
        let backend = ResidueBackend::new(101, 10).unwrap();
        let result = ExtremaEvaluator::builder(&backend)
            .polynomial(polynomial.clone())
            .build();
        assert!(matches!(result, Err(ExtremaError::Parameter { .. })));

        let shallow = ResidueBackend::new(17, 4).unwrap();
        let result = ExtremaEvaluator::builder(&shallow).polynomial(polynomial).build();
        assert!(matches!(result, Err(ExtremaError::Parameter { .. })));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let backend = ResidueBackend::new(17, 15).unwrap();
        let values = [4, 8, 1, 8, 0, 3, 1];
        for parallel in [false, true] {
            let evaluator = ExtremaEvaluator::builder(&backend)
                .parallel(parallel)
                .build()
                .unwrap();
            let (max, min) = evaluator
                .reduce_extrema(backend.encrypt_candidates(&values).unwrap())
                .unwrap();
            assert_eq!((backend.decrypt(&max.value), backend.decrypt(&max.index)), (8, 1));
            assert_eq!((backend.decrypt(&min.value), backend.decrypt(&min.index)), (0, 4));
        }
    }

    #[test]
    fn test_reduce_sum() {
        let backend = ResidueBackend::new(101, 5).unwrap();
        // depth 7 + 1 does not fit in 5 levels
        assert!(matches!(
            ExtremaEvaluator::new(&backend),
            Err(ExtremaError::Parameter { .. })
        ));

        let backend = ResidueBackend::new(101, 8).unwrap();
        let evaluator = ExtremaEvaluator::new(&backend).unwrap();
        let cts: Vec<_> = [40, 30, 50].iter().map(|&v| backend.encrypt(v).unwrap()).collect();
        assert_eq!(backend.decrypt(&evaluator.reduce_sum(&cts).unwrap()), 19);
        assert!(matches!(evaluator.reduce_sum(&[]), Err(ExtremaError::EmptyInput)));
    }
}
