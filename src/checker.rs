use tracing::trace;

use crate::{
    alphabet::{Alphabet, SymbolOf},
    automaton::{Automaton, DFA},
    word::{FiniteWord, Word},
};

/// Checks a hypothesis against a specification and produces words on which the hypothesis violates it.
///
/// A superset specification over-approximates the intended language, so a violation is a word that the
/// hypothesis accepts but the specification rejects. A subset specification under-approximates it, here a
/// violation is a word the specification accepts but the hypothesis rejects. In both cases the verdict of the
/// specification on a returned word is `!self.is_super_set()`.
pub trait SpecificationChecker<H: Automaton> {
    /// Returns a word on which `hypothesis` violates the specification, if there is one.
    fn check_for_counterexample(&self, hypothesis: &H) -> Option<Word<H::Symbol>>;

    /// Whether the specification is a superset (as opposed to a subset) of the intended language.
    fn is_super_set(&self) -> bool;
}

/// A specification given as a [`DFA`]. Violations are found by intersecting the hypothesis with the
/// (negated) specification, the returned words are shortest violations.
#[derive(Debug, Clone)]
pub struct DfaChecker<A: Alphabet> {
    specification: DFA<A>,
    super_set: bool,
}

impl<A: Alphabet> DfaChecker<A> {
    /// The hypothesis must not accept anything outside of `specification`.
    pub fn superset(specification: DFA<A>) -> Self {
        Self {
            specification,
            super_set: true,
        }
    }

    /// The hypothesis must accept everything in `specification`.
    pub fn subset(specification: DFA<A>) -> Self {
        Self {
            specification,
            super_set: false,
        }
    }

    /// Returns a reference to the specification automaton.
    pub fn specification(&self) -> &DFA<A> {
        &self.specification
    }
}

impl<A: Alphabet> SpecificationChecker<DFA<A>> for DfaChecker<A> {
    fn check_for_counterexample(&self, hypothesis: &DFA<A>) -> Option<Word<SymbolOf<A>>> {
        let violations = if self.super_set {
            hypothesis.intersection(&self.specification.negation())
        } else {
            self.specification.intersection(&hypothesis.negation())
        };
        let word = violations.give_word();
        if let Some(word) = &word {
            trace!("hypothesis violates specification on {}", word.as_string());
        }
        word
    }

    fn is_super_set(&self) -> bool {
        self.super_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{binary, parity_dfa};

    fn only_zeros() -> DFA {
        DFA::builder(binary())
            .with_state_colors([true, false])
            .with_edges([(0, '0', 0), (0, '1', 1), (1, '0', 1), (1, '1', 1)])
            .into_dfa(0)
            .unwrap()
    }

    #[test]
    fn superset_specification() {
        let checker = DfaChecker::superset(only_zeros());
        assert!(checker.is_super_set());
        assert_eq!(
            checker.check_for_counterexample(&DFA::universal(binary())),
            Some(vec!['1'])
        );
        assert_eq!(checker.check_for_counterexample(&only_zeros()), None);
        assert_eq!(
            checker.check_for_counterexample(&DFA::empty(binary())),
            None
        );
    }

    #[test]
    fn subset_specification() {
        let checker = DfaChecker::subset(parity_dfa());
        assert!(!checker.is_super_set());
        assert_eq!(
            checker.check_for_counterexample(&DFA::empty(binary())),
            Some(vec![])
        );
        assert_eq!(
            checker.check_for_counterexample(&only_zeros()),
            Some(vec!['1', '1'])
        );
        assert_eq!(
            checker.check_for_counterexample(&DFA::universal(binary())),
            None
        );
    }
}
