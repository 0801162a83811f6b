//! Statistical teachers for extracting deterministic finite automata from opaque classifiers.
//!
//! The target of learning is some black box, for example a trained recurrent network, that can only be asked
//! whether it accepts a given word (see [`TargetModel`]) or, more efficiently, to score a whole batch of words at
//! once (see [`target::BatchScoring`]). Since exact equivalence queries are impossible against such a model, the
//! [`PacOracle`] answers them approximately: it draws random words and compares the verdicts of the hypothesis with
//! those of the target. The number of words it draws for the `k`-th query is chosen such that over an arbitrary
//! sequence of queries, the probability of accepting a hypothesis that disagrees with the target on more than an
//! `epsilon` fraction of words stays below `delta`.
//!
//! The [`PacTeacher`] then drives an external [`Learner`] through repeated rounds of
//! hypothesis, counterexample and refinement. There are three variants of this loop
//! - [`PacTeacher::teach`] refines until the oracle finds no more counterexamples,
//! - [`PacTeacher::check_and_teach`] first exhausts the counterexamples a [`SpecificationChecker`] can provide
//!   for free, and only then pays for statistical queries,
//! - [`PacTeacher::teach_a_superset`] only ensures that the hypothesis does not under-approximate the target.
//!
//! All loops are bounded by a [`Budget`], termination through convergence is not guaranteed.
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// The prelude is supposed to make using this package easier. Including everything, i.e.
/// `use automata_pac::prelude::*;` should be enough to use the package.
pub mod prelude {
    pub use super::{
        alphabet::{Alphabet, CharAlphabet, Symbol, SymbolOf},
        automaton::{Automaton, DFABuilder, DFA},
        bounds::{equivalence_rounds, hoeffding_samples, Accuracy},
        checker::{DfaChecker, SpecificationChecker},
        config::PacConfig,
        error::{AutomatonError, PacError},
        learner::{Learner, LearnerSymbol},
        math,
        oracle::{Batched, Inclusion, Membership, PacOracle, QueryMode, WordByWord},
        progress::{Progress, ProgressReport, TracingProgress},
        sampling::{RandomWords, WordLength, WordSampler},
        target::{BatchScoring, Classifier, TargetModel, ACCEPTANCE_THRESHOLD},
        teacher::{Budget, Exhaustion, Outcome, PacTeacher},
        word::{FiniteWord, Word},
    };

    #[cfg(feature = "measure")]
    pub use super::{
        distance::{DistanceMatrix, SampledLanguages},
        teacher::TracePoint,
    };
}

/// Type aliases for the hash based collections used throughout the crate.
pub mod math;

/// Module that contains definitions for dealing with alphabets.
pub mod alphabet;
pub use alphabet::{Alphabet, CharAlphabet};

/// Finite words and helpers for enumerating them.
pub mod word;

/// The hypothesis side: the [`Automaton`] trait and a dense [`automaton::DFA`].
#[allow(clippy::upper_case_acronyms)]
pub mod automaton;
pub use automaton::{Automaton, DFA};

/// The black box the teacher is answering questions about.
pub mod target;
pub use target::TargetModel;

/// Drawing random words.
pub mod sampling;

/// Confidence bounds, i.e. how many samples a statistical guarantee requires.
pub mod bounds;

pub mod error;

/// The PAC equivalence oracle.
pub mod oracle;
pub use oracle::PacOracle;

mod learner;
pub use learner::{Learner, LearnerSymbol};

/// Specification checkers which provide counterexamples without sampling.
pub mod checker;
pub use checker::SpecificationChecker;

/// The teaching loops.
pub mod teacher;
pub use teacher::{Budget, Outcome, PacTeacher};

/// Hooks for observing a running teaching session.
pub mod progress;

/// Statistical distances between models, computed on a shared sample.
#[cfg(feature = "measure")]
pub mod distance;

/// Bundled configuration with environment overrides.
pub mod config;

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    /// The language of all words over `{0, 1}` that contain an even number of `1`s.
    pub fn parity_dfa() -> DFA {
        DFA::builder(CharAlphabet::new(vec!['0', '1']))
            .with_state_colors([true, false])
            .with_edges([(0, '0', 0), (0, '1', 1), (1, '0', 1), (1, '1', 0)])
            .into_dfa(0)
            .expect("parity automaton is complete")
    }

    pub fn binary() -> CharAlphabet {
        CharAlphabet::new(vec!['0', '1'])
    }

    pub fn odd_ones(word: &[char]) -> bool {
        word.iter().filter(|c| **c == '1').count() % 2 == 1
    }

    /// A learner that walks through a fixed list of hypotheses, moving on to the next one
    /// whenever it receives a counterexample. It remains on the last hypothesis forever.
    pub struct ScriptedLearner {
        hypotheses: Vec<DFA>,
        position: usize,
        refinements: usize,
        pub received: Vec<Vec<char>>,
        pub batched_flags: Vec<bool>,
    }

    impl ScriptedLearner {
        pub fn new(hypotheses: Vec<DFA>, refinements: usize) -> Self {
            assert!(!hypotheses.is_empty());
            Self {
                hypotheses,
                position: 0,
                refinements,
                received: vec![],
                batched_flags: vec![],
            }
        }

        pub fn total_refinements(&self) -> usize {
            self.received.len() * self.refinements
        }
    }

    impl Learner for ScriptedLearner {
        type Hypothesis = DFA;

        fn hypothesis(&self) -> &DFA {
            &self.hypotheses[self.position]
        }

        fn new_counterexample(
            &mut self,
            counterexample: &[char],
            membership: &dyn Membership<char>,
            batched: bool,
            _max_refinements: Option<usize>,
        ) -> usize {
            // the teacher must be able to answer membership queries while we refine
            let _ = membership.membership_query(counterexample);
            self.received.push(counterexample.to_vec());
            self.batched_flags.push(batched);
            self.position = (self.position + 1).min(self.hypotheses.len() - 1);
            self.refinements
        }
    }

    #[test]
    fn parity_fixture() {
        let dfa = parity_dfa();
        assert!(dfa.accepts(&[]));
        assert!(dfa.accepts(&['1', '0', '1']));
        assert!(!dfa.accepts(&['0', '1']));
        for word in crate::word::words_up_to(binary().universe(), 5) {
            assert_eq!(dfa.accepts(&word), !odd_ones(&word));
        }
    }
}
