use super::backend::HomomorphicBackend;
use super::context::EvaluationContext;
use super::errors::{ExtremaError, ExtremaResult};

/// Encrypted `(value, index)` pair.
///
/// Both fields go through the same operations with the same indicator bit,
/// so they always carry the same remaining depth.
#[derive(Debug, Clone)]
pub struct Candidate<C> {
    pub value: C,
    pub index: C,
}

impl<C> Candidate<C> {
    pub fn new(value: C, index: C) -> Self {
        Self { value, index }
    }

    /// Remaining depth shared by both fields.
    ///
    /// Fails with `CandidateOutOfLockstep` when the fields disagree.
    pub fn remaining_depth<B>(&self, ctx: &EvaluationContext<'_, B>) -> ExtremaResult<u32>
    where
        B: HomomorphicBackend<Ciphertext = C>,
    {
        let value = ctx.remaining(&self.value);
        let index = ctx.remaining(&self.index);
        if value != index {
            return Err(ExtremaError::CandidateOutOfLockstep { value, index });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::residue::ResidueBackend;

    #[test]
    fn test_lockstep_detection() {
        let backend = ResidueBackend::new(17, 3).unwrap();
        let ctx = EvaluationContext::new(&backend);
        let value = backend.encrypt(4).unwrap();
        let index = backend.encrypt(0).unwrap();

        let fresh = Candidate::new(value, index);
        assert_eq!(fresh.remaining_depth(&ctx).unwrap(), 3);

        let squared = ctx.multiply(&value, &value).unwrap();
        let skewed = Candidate::new(squared, index);
        assert!(matches!(
            skewed.remaining_depth(&ctx),
            Err(ExtremaError::CandidateOutOfLockstep { value: 2, index: 3 })
        ));
    }
}
