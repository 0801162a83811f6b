use std::collections::VecDeque;

use bit_set::BitSet;
use tracing::trace;

use crate::{
    alphabet::{Alphabet, CharAlphabet, SymbolOf},
    error::AutomatonError,
    math,
    word::Word,
};

use super::Automaton;

/// A deterministic finite automaton (DFA) over the alphabet `A`, stored as a dense transition table.
/// It accepts a finite word if the run on it ends in an accepting state. Words containing a symbol
/// that is not part of the alphabet are rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DFA<A: Alphabet = CharAlphabet> {
    alphabet: A,
    initial: usize,
    states: usize,
    // successor of state `q` on the `i`-th symbol of the alphabet sits at `q * alphabet.size() + i`
    transitions: Vec<usize>,
    accepting: BitSet,
}

impl<A: Alphabet> DFA<A> {
    /// Returns a [`DFABuilder`] for constructing an automaton over `alphabet`.
    pub fn builder(alphabet: A) -> DFABuilder<A> {
        DFABuilder {
            alphabet,
            colors: vec![],
            edges: vec![],
        }
    }

    /// The single state automaton accepting every word over `alphabet`.
    pub fn universal(alphabet: A) -> Self {
        Self::single_state(alphabet, true)
    }

    /// The single state automaton accepting no word at all.
    pub fn empty(alphabet: A) -> Self {
        Self::single_state(alphabet, false)
    }

    fn single_state(alphabet: A, accepting: bool) -> Self {
        let mut colors = BitSet::with_capacity(1);
        if accepting {
            colors.insert(0);
        }
        Self {
            transitions: vec![0; alphabet.size()],
            alphabet,
            initial: 0,
            states: 1,
            accepting: colors,
        }
    }

    /// Returns a reference to the underlying alphabet.
    pub fn alphabet(&self) -> &A {
        &self.alphabet
    }

    /// The designated initial state.
    pub fn initial(&self) -> usize {
        self.initial
    }

    /// Returns true if `state` is accepting.
    pub fn is_accepting(&self, state: usize) -> bool {
        self.accepting.contains(state)
    }

    /// Returns an iterator over the indices of all accepting states.
    pub fn accepting_states(&self) -> impl Iterator<Item = usize> + '_ {
        self.accepting.iter()
    }

    /// Returns the state reached from `state` by reading `symbol`, if both exist.
    pub fn successor(&self, state: usize, symbol: SymbolOf<A>) -> Option<usize> {
        if state >= self.states {
            return None;
        }
        let position = self.alphabet.position(symbol)?;
        Some(self.transitions[state * self.alphabet.size() + position])
    }

    /// Runs the automaton on `word` from the initial state and returns the reached state. Gives
    /// `None` if the word contains a symbol that is not in the alphabet.
    pub fn reached_state(&self, word: &[SymbolOf<A>]) -> Option<usize> {
        word.iter()
            .try_fold(self.initial, |state, sym| self.successor(state, *sym))
    }

    /// Computes the negation of `self` by swapping accepting and non-accepting states.
    pub fn negation(&self) -> Self {
        let accepting = (0..self.states)
            .filter(|q| !self.accepting.contains(*q))
            .collect();
        Self {
            accepting,
            ..self.clone()
        }
    }

    /// Computes the intersection of `self` with `other` through a product construction restricted to the
    /// reachable part. The result is over the alphabet of `self`; symbols that `other` does not know lead
    /// to a rejecting sink on its side.
    pub fn intersection(&self, other: &DFA<A>) -> Self {
        let k = self.alphabet.size();
        let mut indices: math::Map<(usize, Option<usize>), usize> = math::Map::default();
        let mut queue = VecDeque::new();
        let mut transitions = vec![];
        let mut accepting = BitSet::new();

        let start = (self.initial, Some(other.initial));
        indices.insert(start, 0);
        queue.push_back(start);

        while let Some((left, right)) = queue.pop_front() {
            let index = indices[&(left, right)];
            if self.is_accepting(left) && right.is_some_and(|r| other.is_accepting(r)) {
                accepting.insert(index);
            }
            transitions.resize((index + 1) * k, 0);
            for (i, sym) in self.alphabet.universe().iter().enumerate() {
                let target = (
                    self.transitions[left * k + i],
                    right.and_then(|r| other.successor(r, *sym)),
                );
                let next = indices.len();
                let target_index = *indices.entry(target).or_insert_with(|| {
                    queue.push_back(target);
                    next
                });
                transitions[index * k + i] = target_index;
            }
        }

        trace!(
            "intersection of automata with {} and {} states has {} reachable states",
            self.states,
            other.states,
            indices.len()
        );

        Self {
            alphabet: self.alphabet.clone(),
            initial: 0,
            states: indices.len(),
            transitions,
            accepting,
        }
    }

    /// Tries to construct a shortest word that is accepted. If the accepted language is empty, the
    /// function returns `None`. Among the shortest words, the one that is smallest with respect to the order
    /// of the alphabet is returned.
    pub fn give_word(&self) -> Option<Word<SymbolOf<A>>> {
        let mut parent: Vec<Option<(usize, SymbolOf<A>)>> = vec![None; self.states];
        let mut seen = BitSet::with_capacity(self.states);
        let mut queue = VecDeque::from([self.initial]);
        seen.insert(self.initial);

        while let Some(state) = queue.pop_front() {
            if self.is_accepting(state) {
                let mut word = vec![];
                let mut current = state;
                while let Some((previous, sym)) = parent[current] {
                    word.push(sym);
                    current = previous;
                }
                word.reverse();
                return Some(word);
            }
            for sym in self.alphabet.universe() {
                if let Some(target) = self.successor(state, *sym) {
                    if seen.insert(target) {
                        parent[target] = Some((state, *sym));
                        queue.push_back(target);
                    }
                }
            }
        }
        None
    }

    /// Returns true if and only if the accepted language is empty.
    pub fn is_empty_language(&self) -> bool {
        self.give_word().is_none()
    }
}

impl<A: Alphabet> Automaton for DFA<A> {
    type Symbol = SymbolOf<A>;

    fn accepts(&self, word: &[Self::Symbol]) -> bool {
        self.reached_state(word)
            .is_some_and(|state| self.is_accepting(state))
    }

    fn size(&self) -> usize {
        self.states
    }

    fn final_state_count(&self) -> usize {
        self.accepting.len()
    }
}

/// Builds a [`DFA`] from a list of state colors and a list of edges. The `i`-th color determines
/// whether state `i` is accepting, an edge `(p, a, q)` leads from `p` to `q` on symbol `a`.
#[derive(Clone, Debug)]
pub struct DFABuilder<A: Alphabet> {
    alphabet: A,
    colors: Vec<bool>,
    edges: Vec<(usize, SymbolOf<A>, usize)>,
}

impl<A: Alphabet> DFABuilder<A> {
    /// Sets the acceptance of the states, which also determines the number of states.
    pub fn with_state_colors<I: IntoIterator<Item = bool>>(mut self, colors: I) -> Self {
        self.colors = colors.into_iter().collect();
        self
    }

    /// Adds the given edges.
    pub fn with_edges<I: IntoIterator<Item = (usize, SymbolOf<A>, usize)>>(mut self, edges: I) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Assembles the automaton with the given initial state. Every state needs precisely one outgoing
    /// transition per symbol.
    pub fn into_dfa(self, initial: usize) -> Result<DFA<A>, AutomatonError> {
        let states = self.colors.len();
        if states == 0 {
            return Err(AutomatonError::NoStates);
        }
        let in_range = |state: usize| {
            if state < states {
                Ok(state)
            } else {
                Err(AutomatonError::StateOutOfRange { state, size: states })
            }
        };
        in_range(initial)?;

        let k = self.alphabet.size();
        let mut table: Vec<Option<usize>> = vec![None; states * k];
        for (source, sym, target) in self.edges {
            let source = in_range(source)?;
            let target = in_range(target)?;
            let position = self
                .alphabet
                .position(sym)
                .ok_or_else(|| AutomatonError::UnknownSymbol(sym.to_string()))?;
            match &mut table[source * k + position] {
                Some(existing) if *existing != target => {
                    return Err(AutomatonError::Nondeterministic {
                        state: source,
                        symbol: sym.to_string(),
                    })
                }
                slot => *slot = Some(target),
            }
        }

        let transitions = table
            .into_iter()
            .enumerate()
            .map(|(i, target)| {
                target.ok_or_else(|| AutomatonError::Incomplete {
                    state: i / k,
                    symbol: self.alphabet.universe()[i % k].to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let accepting = self
            .colors
            .iter()
            .enumerate()
            .filter_map(|(q, accepting)| accepting.then_some(q))
            .collect();

        Ok(DFA {
            alphabet: self.alphabet,
            initial,
            states,
            transitions,
            accepting,
        })
    }
}
