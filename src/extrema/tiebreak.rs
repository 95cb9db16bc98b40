use super::backend::HomomorphicBackend;
use super::circuit::{ComparisonCircuit, IndicatorBit};
use super::context::EvaluationContext;
use super::errors::ExtremaResult;
use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Max,
    Min,
}

/// Decides which operand of a tournament node survives.
///
/// The returned bit selects the left operand when it decrypts to 1.
pub trait TieBreakPolicy: Debug + Send + Sync {
    fn select_left<B: HomomorphicBackend>(
        &self,
        circuit: &ComparisonCircuit<'_>,
        ctx: &EvaluationContext<'_, B>,
        extremum: Extremum,
        left: &B::Ciphertext,
        right: &B::Ciphertext,
    ) -> ExtremaResult<IndicatorBit<B::Ciphertext>>;

    /// `(max bit, min bit)` for the same pair, sharing work where possible.
    fn select_left_both<B: HomomorphicBackend>(
        &self,
        circuit: &ComparisonCircuit<'_>,
        ctx: &EvaluationContext<'_, B>,
        left: &B::Ciphertext,
        right: &B::Ciphertext,
    ) -> ExtremaResult<(IndicatorBit<B::Ciphertext>, IndicatorBit<B::Ciphertext>)> {
        Ok((
            self.select_left(circuit, ctx, Extremum::Max, left, right)?,
            self.select_left(circuit, ctx, Extremum::Min, left, right)?,
        ))
    }
}

/// Equal values resolve to the left operand.
///
/// The tournament keeps input order, so the left operand always holds the
/// earlier index and the first occurrence wins for max and min alike. No
/// encrypted index comparison is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeftmostWins;

impl TieBreakPolicy for LeftmostWins {
    fn select_left<B: HomomorphicBackend>(
        &self,
        circuit: &ComparisonCircuit<'_>,
        ctx: &EvaluationContext<'_, B>,
        extremum: Extremum,
        left: &B::Ciphertext,
        right: &B::Ciphertext,
    ) -> ExtremaResult<IndicatorBit<B::Ciphertext>> {
        match extremum {
            Extremum::Max => circuit.greater_or_equal_left(ctx, left, right),
            Extremum::Min => circuit.less_or_equal_left(ctx, left, right),
        }
    }

    fn select_left_both<B: HomomorphicBackend>(
        &self,
        circuit: &ComparisonCircuit<'_>,
        ctx: &EvaluationContext<'_, B>,
        left: &B::Ciphertext,
        right: &B::Ciphertext,
    ) -> ExtremaResult<(IndicatorBit<B::Ciphertext>, IndicatorBit<B::Ciphertext>)> {
        circuit.compare_both(ctx, left, right)
    }
}
