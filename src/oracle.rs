use tracing::{debug, trace};

use crate::{
    alphabet::{Alphabet, SymbolOf},
    automaton::Automaton,
    bounds::Accuracy,
    error::PacError,
    sampling::{RandomWords, WordSampler},
    target::{BatchScoring, TargetModel, ACCEPTANCE_THRESHOLD},
    word::{FiniteWord, Word},
};

/// Default number of words that are scored together in [`Batched`] mode.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Answers membership queries without any side effects. This is what a [`crate::Learner`] gets to see of
/// the teacher while it processes a counterexample.
pub trait Membership<S> {
    /// Returns true if and only if the target accepts `word`.
    fn membership_query(&self, word: &[S]) -> bool;
}

/// Determines how a [`PacOracle`] obtains the verdicts of its target. The mode is fixed when the oracle is
/// constructed, it only changes the granularity in which words are sent to the target, never the number
/// of words that are drawn.
pub trait QueryMode<T: TargetModel> {
    /// Whether the target is queried in batches, this is passed on to the learner.
    const BATCHED: bool;

    /// How many words are drawn and classified together.
    fn chunk_size(&self) -> usize;

    /// Classifies all `words`, the result is in the order of `words`.
    fn classify(&self, target: &T, words: &[Word<SymbolOf<T::Alphabet>>]) -> Vec<bool>;
}

/// Poses one membership query per sampled word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordByWord;

impl<T: TargetModel> QueryMode<T> for WordByWord {
    const BATCHED: bool = false;

    fn chunk_size(&self) -> usize {
        1
    }

    fn classify(&self, target: &T, words: &[Word<SymbolOf<T::Alphabet>>]) -> Vec<bool> {
        words.iter().map(|word| target.is_word_in(word)).collect()
    }
}

/// Scores sampled words in batches of a fixed size through [`BatchScoring::score_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batched {
    size: usize,
}

impl Batched {
    /// Creates a batched mode with the given (positive) batch size.
    pub fn with_size(size: usize) -> Result<Self, PacError> {
        if size == 0 {
            return Err(PacError::InvalidBatchSize);
        }
        Ok(Self { size })
    }

    /// The number of words per batch.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for Batched {
    fn default() -> Self {
        Self {
            size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl<T: BatchScoring> QueryMode<T> for Batched {
    const BATCHED: bool = true;

    fn chunk_size(&self) -> usize {
        self.size
    }

    fn classify(&self, target: &T, words: &[Word<SymbolOf<T::Alphabet>>]) -> Vec<bool> {
        let scores = target.score_batch(words);
        debug_assert_eq!(scores.len(), words.len(), "one score per word expected");
        scores
            .into_iter()
            .map(|score| score > ACCEPTANCE_THRESHOLD)
            .collect()
    }
}

/// Which language inclusion a one-sided query tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inclusion {
    /// The target language is contained in the hypothesis, a counterexample is accepted by the target
    /// but rejected by the hypothesis.
    TargetInHypothesis,
    /// The hypothesis language is contained in the target, a counterexample is accepted by the hypothesis
    /// but rejected by the target.
    HypothesisInTarget,
}

impl Inclusion {
    fn violated_by(self, target: bool, hypothesis: bool) -> bool {
        match self {
            Inclusion::TargetInHypothesis => target && !hypothesis,
            Inclusion::HypothesisInTarget => hypothesis && !target,
        }
    }
}

/// An equivalence oracle that answers queries about the target `T` approximately by sampling random words.
///
/// Every query costs one unit of the cumulative confidence budget, which is tracked in
/// [`PacOracle::queries_asked`]: the more queries have been asked before, the more words a query draws
/// (see [`crate::bounds::equivalence_rounds`]). The teaching loops reset this counter when a session starts
/// and additionally charge it for every refinement step a learner reports.
#[derive(Debug, Clone)]
pub struct PacOracle<T, M = WordByWord, R = RandomWords> {
    target: T,
    mode: M,
    sampler: R,
    accuracy: Accuracy,
    queries_asked: usize,
}

impl<T: TargetModel> PacOracle<T, WordByWord, RandomWords> {
    /// Creates an oracle that poses one membership query per sampled word.
    pub fn new(target: T, epsilon: f64, delta: f64) -> Result<Self, PacError> {
        Ok(Self::with_mode(
            target,
            WordByWord,
            RandomWords::default(),
            Accuracy::new(epsilon, delta)?,
        ))
    }
}

impl<T: BatchScoring> PacOracle<T, Batched, RandomWords> {
    /// Creates an oracle that scores sampled words in batches of [`DEFAULT_BATCH_SIZE`].
    pub fn batched(target: T, epsilon: f64, delta: f64) -> Result<Self, PacError> {
        Ok(Self::with_mode(
            target,
            Batched::default(),
            RandomWords::default(),
            Accuracy::new(epsilon, delta)?,
        ))
    }
}

impl<T, M, R> PacOracle<T, M, R> {
    /// Creates an oracle from its parts.
    pub fn with_mode(target: T, mode: M, sampler: R, accuracy: Accuracy) -> Self {
        Self {
            target,
            mode,
            sampler,
            accuracy,
            queries_asked: 0,
        }
    }

    /// Replaces the sampler, keeping all other state.
    pub fn with_sampler<Q>(self, sampler: Q) -> PacOracle<T, M, Q> {
        PacOracle {
            target: self.target,
            mode: self.mode,
            sampler,
            accuracy: self.accuracy,
            queries_asked: self.queries_asked,
        }
    }

    /// Returns a reference to the target.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// The (validated) error and confidence bounds.
    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Gives mutable access to the sampler, e.g. for reseeding it before a session.
    pub fn sampler_mut(&mut self) -> &mut R {
        &mut self.sampler
    }

    /// The number of query units charged in the current session.
    pub fn queries_asked(&self) -> usize {
        self.queries_asked
    }

    /// Starts a fresh session by setting [`PacOracle::queries_asked`] back to zero.
    pub fn reset(&mut self) {
        self.queries_asked = 0;
    }

    /// Charges `units` additional query units, this is how refinement steps of a learner are accounted for.
    pub fn charge(&mut self, units: usize) {
        self.queries_asked += units;
    }
}

impl<T, M, R> PacOracle<T, M, R>
where
    T: TargetModel,
    M: QueryMode<T>,
    R: WordSampler<SymbolOf<T::Alphabet>>,
{
    /// Whether the target is queried in batches.
    pub fn is_batched(&self) -> bool {
        M::BATCHED
    }

    /// Looks for a word on which `hypothesis` and the target disagree. Returns `None` if no such word was found
    /// among the required number of samples.
    pub fn equivalence_query<H>(&mut self, hypothesis: &H) -> Option<Word<SymbolOf<T::Alphabet>>>
    where
        H: Automaton<Symbol = SymbolOf<T::Alphabet>>,
    {
        self.search(hypothesis, |target, hypothesis| target != hypothesis)
    }

    /// Looks for a word that the target accepts but `hypothesis` rejects.
    pub fn target_subset_of_hypothesis<H>(&mut self, hypothesis: &H) -> Option<Word<SymbolOf<T::Alphabet>>>
    where
        H: Automaton<Symbol = SymbolOf<T::Alphabet>>,
    {
        self.subset_query(Inclusion::TargetInHypothesis, hypothesis)
    }

    /// Looks for a word that `hypothesis` accepts but the target rejects.
    pub fn hypothesis_subset_of_target<H>(&mut self, hypothesis: &H) -> Option<Word<SymbolOf<T::Alphabet>>>
    where
        H: Automaton<Symbol = SymbolOf<T::Alphabet>>,
    {
        self.subset_query(Inclusion::HypothesisInTarget, hypothesis)
    }

    /// Looks for a word violating the given `inclusion`.
    pub fn subset_query<H>(
        &mut self,
        inclusion: Inclusion,
        hypothesis: &H,
    ) -> Option<Word<SymbolOf<T::Alphabet>>>
    where
        H: Automaton<Symbol = SymbolOf<T::Alphabet>>,
    {
        self.search(hypothesis, |target, hypothesis| {
            inclusion.violated_by(target, hypothesis)
        })
    }

    fn search<H, F>(&mut self, hypothesis: &H, disagree: F) -> Option<Word<SymbolOf<T::Alphabet>>>
    where
        H: Automaton<Symbol = SymbolOf<T::Alphabet>>,
        F: Fn(bool, bool) -> bool,
    {
        let rounds = self.accuracy.rounds(self.queries_asked);
        self.queries_asked += 1;
        trace!(
            "query {} draws {rounds} words in chunks of {}",
            self.queries_asked,
            self.mode.chunk_size()
        );

        let chunk = self.mode.chunk_size().max(1);
        let mut issued = 0;
        while issued < rounds {
            let count = chunk.min(rounds - issued);
            let words = self
                .sampler
                .sample_batch(self.target.alphabet().universe(), count);
            issued += count;

            let verdicts = self.mode.classify(&self.target, &words);
            let mismatch = words
                .iter()
                .zip(verdicts)
                .position(|(word, target)| disagree(target, hypothesis.accepts(word)));
            if let Some(position) = mismatch {
                let counterexample = words.into_iter().nth(position)?;
                debug!(
                    "found counterexample {} after {} of {rounds} words",
                    counterexample.as_string(),
                    issued - count + position + 1
                );
                return Some(counterexample);
            }
        }
        trace!("no counterexample among {rounds} words");
        None
    }
}

impl<T: TargetModel, M, R> Membership<SymbolOf<T::Alphabet>> for PacOracle<T, M, R> {
    fn membership_query(&self, word: &[SymbolOf<T::Alphabet>]) -> bool {
        self.target.is_word_in(word)
    }
}
