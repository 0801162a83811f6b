use std::fmt::Debug;

use crate::{
    alphabet::{Alphabet, SymbolOf},
    automaton::{Automaton, DFA},
    word::Word,
};

/// A score strictly above this value means that a scoring model accepts the word.
pub const ACCEPTANCE_THRESHOLD: f64 = 0.5;

/// The opaque language a teacher is answering queries about. It is only ever read, so
/// the same model may back any number of teaching sessions.
pub trait TargetModel {
    /// The alphabet over which words are drawn.
    type Alphabet: Alphabet;

    /// Returns a reference to the alphabet of the model.
    fn alphabet(&self) -> &Self::Alphabet;

    /// Returns true if and only if the model accepts `word`.
    fn is_word_in(&self, word: &[SymbolOf<Self::Alphabet>]) -> bool;
}

/// Models that can score many words at once, which is usually much faster than posing individual
/// membership queries (think of a neural network evaluating a whole batch in one pass).
/// A word is considered accepted if its score exceeds [`ACCEPTANCE_THRESHOLD`].
pub trait BatchScoring: TargetModel {
    /// Produces one score in `[0, 1]` per word, in the order of `words`.
    fn score_batch(&self, words: &[Word<SymbolOf<Self::Alphabet>>]) -> Vec<f64>;
}

impl<T: TargetModel> TargetModel for &T {
    type Alphabet = T::Alphabet;

    fn alphabet(&self) -> &Self::Alphabet {
        T::alphabet(self)
    }

    fn is_word_in(&self, word: &[SymbolOf<Self::Alphabet>]) -> bool {
        T::is_word_in(self, word)
    }
}

impl<T: BatchScoring> BatchScoring for &T {
    fn score_batch(&self, words: &[Word<SymbolOf<Self::Alphabet>>]) -> Vec<f64> {
        T::score_batch(self, words)
    }
}

impl<A: Alphabet> TargetModel for DFA<A> {
    type Alphabet = A;

    fn alphabet(&self) -> &A {
        DFA::alphabet(self)
    }

    fn is_word_in(&self, word: &[SymbolOf<A>]) -> bool {
        self.accepts(word)
    }
}

/// A target given by an alphabet and a scoring function, for example a closure wrapping the forward pass of
/// some classifier. The function is used both for individual membership queries and for batches.
#[derive(Clone)]
pub struct Classifier<A, F> {
    alphabet: A,
    score: F,
}

impl<A: Alphabet, F: Fn(&[SymbolOf<A>]) -> f64> Classifier<A, F> {
    /// Creates a new classifier from an alphabet and a scoring function.
    pub fn new(alphabet: A, score: F) -> Self {
        Self { alphabet, score }
    }

    /// Returns the raw score of `word`.
    pub fn score(&self, word: &[SymbolOf<A>]) -> f64 {
        (self.score)(word)
    }
}

impl<A: Debug, F> Debug for Classifier<A, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Classifier over {:?}", self.alphabet)
    }
}

impl<A: Alphabet, F: Fn(&[SymbolOf<A>]) -> f64> TargetModel for Classifier<A, F> {
    type Alphabet = A;

    fn alphabet(&self) -> &A {
        &self.alphabet
    }

    fn is_word_in(&self, word: &[SymbolOf<A>]) -> bool {
        self.score(word) > ACCEPTANCE_THRESHOLD
    }
}

impl<A: Alphabet, F: Fn(&[SymbolOf<A>]) -> f64> BatchScoring for Classifier<A, F> {
    fn score_batch(&self, words: &[Word<SymbolOf<A>>]) -> Vec<f64> {
        words.iter().map(|word| self.score(word)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{binary, odd_ones, parity_dfa};

    #[test]
    fn scores_and_membership_agree() {
        let classifier = Classifier::new(binary(), |w: &[char]| if odd_ones(w) { 0.2 } else { 0.8 });
        let words = vec![vec![], vec!['1'], vec!['1', '1'], vec!['0', '1', '0']];
        let scores = classifier.score_batch(&words);
        assert_eq!(scores, vec![0.8, 0.2, 0.8, 0.2]);
        for (word, score) in words.iter().zip(scores) {
            assert_eq!(classifier.is_word_in(word), score > ACCEPTANCE_THRESHOLD);
            assert_eq!(classifier.is_word_in(word), parity_dfa().is_word_in(word));
        }
    }

    #[test]
    fn borrowed_targets() {
        let classifier = Classifier::new(binary(), |w: &[char]| if odd_ones(w) { 0.0 } else { 1.0 });
        let borrowed = &classifier;
        assert_eq!(borrowed.alphabet(), &binary());
        assert!(borrowed.is_word_in(&['1', '1']));
        assert_eq!(borrowed.score_batch(&[vec!['1']]), vec![0.0]);

        let dfa = parity_dfa();
        assert_eq!(TargetModel::is_word_in(&&dfa, &['1']), dfa.is_word_in(&['1']));
    }

    #[test]
    fn threshold_is_exclusive() {
        let undecided = Classifier::new(binary(), |_: &[char]| ACCEPTANCE_THRESHOLD);
        assert!(!undecided.is_word_in(&['0']));
    }
}
