use std::{
    fmt::{Debug, Display},
    hash::Hash,
};

use itertools::Itertools;

/// A symbol of an alphabet, which is also the type of the symbols in a word.
pub trait Symbol: PartialEq + Eq + Debug + Display + Copy + Ord + PartialOrd + Hash {}
impl<S: PartialEq + Eq + Debug + Display + Copy + Ord + PartialOrd + Hash> Symbol for S {}

/// Helper type for accessing the [`Symbol`] type of an [`Alphabet`].
pub type SymbolOf<A> = <A as Alphabet>::Symbol;

/// An alphabet abstracts a finite, ordered collection of [`Symbol`]s. The order matters as it
/// determines the layout of transition tables and the order in which words are enumerated.
pub trait Alphabet: Clone + Debug {
    /// The type of symbols in this alphabet.
    type Symbol: Symbol;

    /// Returns all symbols of the alphabet in their canonical order.
    fn universe(&self) -> &[Self::Symbol];

    /// Returns the number of symbols in the alphabet.
    fn size(&self) -> usize {
        self.universe().len()
    }

    /// Returns true if and only if the given symbol is part of the alphabet.
    fn contains(&self, symbol: Self::Symbol) -> bool {
        self.universe().contains(&symbol)
    }

    /// Returns the position of `symbol` in the universe of the alphabet, if it exists.
    fn position(&self, symbol: Self::Symbol) -> Option<usize> {
        self.universe().iter().position(|s| *s == symbol)
    }
}

/// Represents an alphabet where a [`Symbol`] is just a single `char`.
#[derive(Clone, Hash, PartialEq, Eq, Debug, PartialOrd, Ord)]
pub struct CharAlphabet(Vec<char>);

impl CharAlphabet {
    /// Creates a new [`CharAlphabet`] alphabet of the given size. The symbols are just the first `size` letters
    /// of the alphabet, i.e. 'a' to 'z'.
    pub fn of_size(size: usize) -> Self {
        assert!(size <= 26, "Alphabet is too large");
        Self((0..size).map(|i| (b'a' + i as u8) as char).collect())
    }

    /// Creates a new [`CharAlphabet`] from the given symbols. Duplicates are removed, the
    /// order of first occurrence is kept.
    pub fn new(symbols: Vec<char>) -> Self {
        Self(symbols.into_iter().unique().collect())
    }
}

impl std::ops::Index<usize> for CharAlphabet {
    type Output = char;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl From<Vec<char>> for CharAlphabet {
    fn from(value: Vec<char>) -> Self {
        Self::new(value)
    }
}

impl FromIterator<char> for CharAlphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Self(iter.into_iter().unique().sorted().collect())
    }
}

impl Alphabet for CharAlphabet {
    type Symbol = char;

    fn universe(&self) -> &[char] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_alphabets() {
        let alphabet = CharAlphabet::of_size(3);
        assert_eq!(alphabet.universe(), &['a', 'b', 'c']);
        assert_eq!(alphabet.position('c'), Some(2));
        assert!(!alphabet.contains('d'));

        let collected: CharAlphabet = "banana".chars().collect();
        assert_eq!(collected.universe(), &['a', 'b', 'n']);
        assert_eq!(CharAlphabet::new(vec!['1', '0', '1']).size(), 2);
        assert_eq!(collected[1], 'b');
    }
}
