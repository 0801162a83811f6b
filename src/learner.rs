use crate::{automaton::Automaton, oracle::Membership};

/// Symbols of the hypothesis a learner maintains.
pub type LearnerSymbol<L> = <<L as Learner>::Hypothesis as Automaton>::Symbol;

/// An active learner, for example an L* variant or a discrimination tree learner, that maintains a hypothesis
/// and refines it in response to counterexamples. The teaching loops read the hypothesis at the start of each
/// iteration and never modify it themselves.
pub trait Learner {
    /// The type of hypothesis the learner constructs.
    type Hypothesis: Automaton;

    /// The current hypothesis.
    fn hypothesis(&self) -> &Self::Hypothesis;

    /// Processes a counterexample on which the current hypothesis is wrong and returns the number of
    /// internal refinement steps this took. Membership queries can be posed through `membership`.
    ///
    /// If `batched` is set, the teacher scores words in batches and the learner may process the counterexample
    /// in batches as well. `max_refinements` optionally caps the number of refinement steps. Afterwards the
    /// hypothesis should no longer exhibit the same mistake, this is not verified by the teacher.
    fn new_counterexample(
        &mut self,
        counterexample: &[LearnerSymbol<Self>],
        membership: &dyn Membership<LearnerSymbol<Self>>,
        batched: bool,
        max_refinements: Option<usize>,
    ) -> usize;
}
