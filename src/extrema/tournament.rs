use super::backend::HomomorphicBackend;
use super::candidate::Candidate;
use super::circuit::ComparisonCircuit;
use super::context::EvaluationContext;
use super::errors::{ExtremaError, ExtremaResult};
use super::selector::EncryptedSelector;
use super::tiebreak::{Extremum, TieBreakPolicy};
use rayon::prelude::*;
use tracing::{debug, info, instrument, trace};

/// Internal tournament node, indexing into the previous level.
///
/// A node without `right` carries its single child up unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReductionNode {
    pub left: usize,
    pub right: Option<usize>,
}

/// Array-backed balanced tree over `inputs` leaves, stored level by level.
///
/// Level `i` pairs neighbours `(2j, 2j + 1)` of level `i - 1`, so left-to-right
/// input order is preserved at every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TournamentPlan {
    inputs: usize,
    levels: Vec<Vec<ReductionNode>>,
}

impl TournamentPlan {
    pub fn new(inputs: usize) -> Self {
        let mut levels = Vec::new();
        let mut width = inputs;
        while width > 1 {
            let level: Vec<ReductionNode> = (0..width)
                .step_by(2)
                .map(|left| ReductionNode {
                    left,
                    right: (left + 1 < width).then_some(left + 1),
                })
                .collect();
            width = level.len();
            levels.push(level);
        }
        Self { inputs, levels }
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }

    pub fn levels(&self) -> &[Vec<ReductionNode>] {
        &self.levels
    }

    /// Number of comparison levels, `ceil(log2(inputs))`.
    pub fn height(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn comparisons(&self) -> usize {
        self.levels
            .iter()
            .flatten()
            .filter(|node| node.right.is_some())
            .count()
    }

    pub fn required_depth(&self, node_depth: u32) -> u32 {
        self.height().saturating_mul(node_depth)
    }

    /// Largest input count whose tree fits in `available` levels.
    pub fn max_inputs(available: u32, node_depth: u32) -> usize {
        if node_depth == 0 {
            return usize::MAX;
        }
        let height = available / node_depth;
        if height >= usize::BITS {
            usize::MAX
        } else {
            1 << height
        }
    }
}

/// Folds candidates to one extremum with a comparison and a selection per node.
pub struct TournamentReducer<'a, B: HomomorphicBackend, T: TieBreakPolicy> {
    ctx: EvaluationContext<'a, B>,
    circuit: ComparisonCircuit<'a>,
    selector: EncryptedSelector,
    policy: &'a T,
    parallel: bool,
}

impl<'a, B: HomomorphicBackend, T: TieBreakPolicy> TournamentReducer<'a, B, T> {
    pub fn new(
        ctx: EvaluationContext<'a, B>,
        circuit: ComparisonCircuit<'a>,
        policy: &'a T,
        parallel: bool,
    ) -> Self {
        Self {
            ctx,
            circuit,
            selector: EncryptedSelector,
            policy,
            parallel,
        }
    }

    pub fn node_depth(&self) -> u32 {
        self.circuit.polynomial().node_depth()
    }

    /// Reduces to one candidate holding the extremum and its leftmost index.
    #[instrument(skip(self, candidates), fields(inputs = candidates.len()))]
    pub fn reduce(
        &self,
        candidates: Vec<Candidate<B::Ciphertext>>,
        extremum: Extremum,
    ) -> ExtremaResult<Candidate<B::Ciphertext>> {
        let plan = self.preflight(&candidates)?;
        info!(
            height = plan.height(),
            comparisons = plan.comparisons(),
            "starting tournament"
        );
        self.run_levels(&plan, plan.levels(), candidates, extremum)
    }

    /// Max and min trees over the same inputs.
    ///
    /// The first level computes both bits of each pair from one shared power
    /// table; the two trees then run independently.
    #[instrument(skip(self, candidates), fields(inputs = candidates.len()))]
    pub fn reduce_both(
        &self,
        candidates: Vec<Candidate<B::Ciphertext>>,
    ) -> ExtremaResult<(Candidate<B::Ciphertext>, Candidate<B::Ciphertext>)> {
        let plan = self.preflight(&candidates)?;
        let Some((first, rest)) = plan.levels().split_first() else {
            let single = candidates.into_iter().next().ok_or(ExtremaError::EmptyInput)?;
            return Ok((single.clone(), single));
        };
        info!(
            height = plan.height(),
            comparisons = plan.comparisons(),
            "starting paired tournament"
        );

        let pairs = self.map_level(first, |node| self.combine_both(&plan, node, &candidates))?;
        debug!(level = 0, width = pairs.len(), "paired level complete");
        let (maxima, minima): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();

        let (max, min) = self.join(
            || self.run_levels(&plan, rest, maxima, Extremum::Max),
            || self.run_levels(&plan, rest, minima, Extremum::Min),
        );
        Ok((max?, min?))
    }

    /// Validates inputs and the whole tree's depth before any evaluation.
    fn preflight(&self, candidates: &[Candidate<B::Ciphertext>]) -> ExtremaResult<TournamentPlan> {
        if candidates.is_empty() {
            return Err(ExtremaError::EmptyInput);
        }
        let mut available = u32::MAX;
        for candidate in candidates {
            available = available.min(candidate.remaining_depth(&self.ctx)?);
        }

        let plan = TournamentPlan::new(candidates.len());
        let required = plan.required_depth(self.node_depth());
        debug!(required, available, "tournament depth check");
        if required > available {
            return Err(ExtremaError::DepthBudgetExceeded {
                inputs: candidates.len(),
                required,
                available,
            });
        }
        Ok(plan)
    }

    fn run_levels(
        &self,
        plan: &TournamentPlan,
        levels: &[Vec<ReductionNode>],
        mut current: Vec<Candidate<B::Ciphertext>>,
        extremum: Extremum,
    ) -> ExtremaResult<Candidate<B::Ciphertext>> {
        for (depth, level) in levels.iter().enumerate() {
            current = self.map_level(level, |node| self.combine(plan, node, &current, extremum))?;
            debug!(?extremum, level = depth, width = current.len(), "level complete");
        }
        current.pop().ok_or(ExtremaError::EmptyInput)
    }

    /// Budget shared by both children of a node.
    fn node_budget(
        &self,
        plan: &TournamentPlan,
        left: &Candidate<B::Ciphertext>,
        right: &Candidate<B::Ciphertext>,
    ) -> ExtremaResult<()> {
        let available = left.remaining_depth(&self.ctx)?.min(right.remaining_depth(&self.ctx)?);
        let required = self.node_depth();
        if available < required {
            return Err(ExtremaError::DepthBudgetExceeded {
                inputs: plan.inputs(),
                required,
                available,
            });
        }
        Ok(())
    }

    fn combine(
        &self,
        plan: &TournamentPlan,
        node: &ReductionNode,
        previous: &[Candidate<B::Ciphertext>],
        extremum: Extremum,
    ) -> ExtremaResult<Candidate<B::Ciphertext>> {
        let left = &previous[node.left];
        let Some(right) = node.right.map(|i| &previous[i]) else {
            return Ok(left.clone());
        };
        self.node_budget(plan, left, right)?;
        trace!(left = node.left, ?extremum, "combining node");

        let bit = self
            .policy
            .select_left(&self.circuit, &self.ctx, extremum, &left.value, &right.value)?;
        self.selector.select(&self.ctx, &bit, left, right)
    }

    fn combine_both(
        &self,
        plan: &TournamentPlan,
        node: &ReductionNode,
        previous: &[Candidate<B::Ciphertext>],
    ) -> ExtremaResult<(Candidate<B::Ciphertext>, Candidate<B::Ciphertext>)> {
        let left = &previous[node.left];
        let Some(right) = node.right.map(|i| &previous[i]) else {
            return Ok((left.clone(), left.clone()));
        };
        self.node_budget(plan, left, right)?;

        let (max_bit, min_bit) =
            self.policy
                .select_left_both(&self.circuit, &self.ctx, &left.value, &right.value)?;
        let (max, min) = self.join(
            || self.selector.select(&self.ctx, &max_bit, left, right),
            || self.selector.select(&self.ctx, &min_bit, left, right),
        );
        Ok((max?, min?))
    }

    /// Evaluates every node of a level; returning is the barrier before the next level.
    fn map_level<O, F>(&self, level: &[ReductionNode], f: F) -> ExtremaResult<Vec<O>>
    where
        O: Send,
        F: Fn(&ReductionNode) -> ExtremaResult<O> + Send + Sync,
    {
        if self.parallel {
            level.par_iter().map(f).collect()
        } else {
            level.iter().map(f).collect()
        }
    }

    fn join<RA, RB>(
        &self,
        a: impl FnOnce() -> RA + Send,
        b: impl FnOnce() -> RB + Send,
    ) -> (RA, RB)
    where
        RA: Send,
        RB: Send,
    {
        if self.parallel {
            rayon::join(a, b)
        } else {
            (a(), b())
        }
    }
}
