use crate::alphabet::Symbol;

mod dfa;
pub use dfa::{DFABuilder, DFA};

/// The view that a teacher has on a hypothesis: it can only ask whether a word is accepted. The number of
/// states and accepting states is only used for reporting, a learner is free to use any representation.
///
/// The hypothesis is owned and refined by the [`crate::Learner`], the teacher never mutates it.
pub trait Automaton {
    /// The type of symbols the automaton reads.
    type Symbol: Symbol;

    /// Returns true if and only if the automaton accepts `word`.
    fn accepts(&self, word: &[Self::Symbol]) -> bool;

    /// The number of states.
    fn size(&self) -> usize;

    /// The number of accepting states.
    fn final_state_count(&self) -> usize;
}

impl<D: Automaton> Automaton for &D {
    type Symbol = D::Symbol;

    fn accepts(&self, word: &[Self::Symbol]) -> bool {
        D::accepts(self, word)
    }

    fn size(&self) -> usize {
        D::size(self)
    }

    fn final_state_count(&self) -> usize {
        D::final_state_count(self)
    }
}
