use super::backend::HomomorphicBackend;
use super::candidate::Candidate;
use super::circuit::IndicatorBit;
use super::context::EvaluationContext;
use super::errors::ExtremaResult;

/// Arithmetic multiplexer over candidates.
///
/// `select(bit, x, y) = bit * x + (1 - bit) * y`, applied to the value and the
/// index with the same bit. Costs one level; each field is relinearized once.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncryptedSelector;

impl EncryptedSelector {
    pub fn select<B: HomomorphicBackend>(
        &self,
        ctx: &EvaluationContext<'_, B>,
        bit: &IndicatorBit<B::Ciphertext>,
        x: &Candidate<B::Ciphertext>,
        y: &Candidate<B::Ciphertext>,
    ) -> ExtremaResult<Candidate<B::Ciphertext>> {
        x.remaining_depth(ctx)?;
        y.remaining_depth(ctx)?;
        ctx.ensure_budget(&[bit.ciphertext(), &x.value, &y.value], 1)?;

        let not_bit = bit.complement(ctx)?;
        let value = Self::mux(ctx, bit, &not_bit, &x.value, &y.value)?;
        let index = Self::mux(ctx, bit, &not_bit, &x.index, &y.index)?;
        Ok(Candidate::new(value, index))
    }

    fn mux<B: HomomorphicBackend>(
        ctx: &EvaluationContext<'_, B>,
        bit: &IndicatorBit<B::Ciphertext>,
        not_bit: &IndicatorBit<B::Ciphertext>,
        x: &B::Ciphertext,
        y: &B::Ciphertext,
    ) -> ExtremaResult<B::Ciphertext> {
        let chosen = ctx.multiply_unrelinearized(bit.ciphertext(), x)?;
        let other = ctx.multiply_unrelinearized(not_bit.ciphertext(), y)?;
        ctx.relinearize(&ctx.add(&chosen, &other)?)
    }
}
