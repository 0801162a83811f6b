use std::fmt::Display;

use itertools::Itertools;

/// A finite word is simply a sequence of symbols. Counterexamples and sampled words are always owned.
pub type Word<S> = Vec<S>;

/// Helper for displaying finite words, mainly used when logging counterexamples.
pub trait FiniteWord {
    /// Concatenates the string representations of all symbols, the empty word is shown as `ε`.
    fn as_string(&self) -> String;
}

impl<S: Display> FiniteWord for [S] {
    fn as_string(&self) -> String {
        if self.is_empty() {
            return "ε".to_string();
        }
        self.iter().join("")
    }
}

impl<S: Display> FiniteWord for Vec<S> {
    fn as_string(&self) -> String {
        self.as_slice().as_string()
    }
}

/// Enumerates all words over `universe` of length at most `max_length`, ordered by length
/// first and lexicographically (w.r.t. the order of `universe`) second.
pub fn words_up_to<S: Copy>(universe: &[S], max_length: usize) -> impl Iterator<Item = Word<S>> + '_ {
    std::iter::successors(Some(vec![Word::new()]), move |level: &Vec<Word<S>>| {
        Some(
            level
                .iter()
                .flat_map(|prefix| {
                    universe.iter().map(move |sym| {
                        let mut extended = prefix.clone();
                        extended.push(*sym);
                        extended
                    })
                })
                .collect(),
        )
    })
    .take(max_length + 1)
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::{words_up_to, FiniteWord};

    #[test]
    fn enumerate_words() {
        let words: Vec<_> = words_up_to(&['a', 'b'], 2).collect();
        assert_eq!(words.len(), 7);
        assert_eq!(words[0], Vec::<char>::new());
        assert_eq!(words[1], vec!['a']);
        assert_eq!(words[6], vec!['b', 'b']);
        assert_eq!(words_up_to(&['0', '1'], 6).count(), 127);
        assert_eq!(words_up_to::<char>(&[], 3).count(), 1);
    }

    #[test]
    fn display_words() {
        assert_eq!(vec!['a', 'b'].as_string(), "ab");
        assert_eq!(Vec::<char>::new().as_string(), "ε");
    }
}
