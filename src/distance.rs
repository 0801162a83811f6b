use std::fmt::Display;

use crate::{
    alphabet::Symbol,
    bounds::hoeffding_samples,
    error::PacError,
    sampling::WordSampler,
    word::Word,
};

/// A fixed sample of random words together with the cached verdicts of a number of registered models.
///
/// The disagreement frequency of two models on the sample estimates the probability mass of the symmetric
/// difference of their languages. When the sample is drawn with [`SampledLanguages::draw`], the estimate for any
/// fixed pair lies within `width` of the true value with probability at least `1 - confidence`. Since the sample
/// is reused, a registered model is queried once per word and never again.
#[derive(Debug, Clone)]
pub struct SampledLanguages<S> {
    words: Vec<Word<S>>,
    verdicts: Vec<Vec<bool>>,
}

impl<S: Symbol> SampledLanguages<S> {
    /// Draws as many words as [`hoeffding_samples`] requires for the given `width` and `confidence`.
    pub fn draw<R: WordSampler<S>>(
        sampler: &mut R,
        universe: &[S],
        width: f64,
        confidence: f64,
    ) -> Result<Self, PacError> {
        let count = hoeffding_samples(width, confidence)?;
        Ok(Self::from_words(sampler.sample_batch(universe, count)))
    }

    /// Uses the given words as sample.
    pub fn from_words(words: Vec<Word<S>>) -> Self {
        Self {
            words,
            verdicts: vec![],
        }
    }

    /// The sampled words.
    pub fn words(&self) -> &[Word<S>] {
        &self.words
    }

    /// The number of sampled words.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the sample is empty.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The number of registered models.
    pub fn models(&self) -> usize {
        self.verdicts.len()
    }

    /// Evaluates `model` on every sampled word, stores the verdicts and returns the index under which
    /// the model can be referred to.
    pub fn register<F: Fn(&[S]) -> bool>(&mut self, model: F) -> usize {
        self.verdicts
            .push(self.words.iter().map(|word| model(word.as_slice())).collect());
        self.verdicts.len() - 1
    }

    /// The cached verdicts of the model with the given index.
    pub fn verdicts(&self, index: usize) -> &[bool] {
        &self.verdicts[index]
    }

    /// The fraction of sampled words on which the registered models `left` and `right` disagree.
    pub fn distance(&self, left: usize, right: usize) -> f64 {
        self.frequency(self.verdicts[left].iter().zip(&self.verdicts[right]), |l, r| l != r)
    }

    /// The fraction of sampled words accepted by `left` and rejected by `right`, which estimates how badly the
    /// language of `left` fails to be a subset of the language of `right`.
    pub fn subset_violation(&self, left: usize, right: usize) -> f64 {
        self.frequency(self.verdicts[left].iter().zip(&self.verdicts[right]), |l, r| {
            l && !r
        })
    }

    /// The distance between the registered model `index` and some further `model`, which is evaluated on the
    /// sample but not registered.
    pub fn distance_to<F: Fn(&[S]) -> bool>(&self, index: usize, model: F) -> f64 {
        let fresh: Vec<_> = self.words.iter().map(|word| model(word.as_slice())).collect();
        self.frequency(self.verdicts[index].iter().zip(&fresh), |l, r| l != r)
    }

    /// Computes the pairwise distances between all registered models.
    pub fn matrix(&self) -> DistanceMatrix {
        let models = self.models();
        DistanceMatrix {
            distances: (0..models)
                .map(|i| (0..models).map(|j| self.distance(i, j)).collect())
                .collect(),
        }
    }

    fn frequency<'a, I, F>(&self, pairs: I, event: F) -> f64
    where
        I: Iterator<Item = (&'a bool, &'a bool)>,
        F: Fn(bool, bool) -> bool,
    {
        if self.words.is_empty() {
            return 0.0;
        }
        let hits = pairs.filter(|(l, r)| event(**l, **r)).count();
        hits as f64 / self.words.len() as f64
    }
}

/// Symmetric matrix of estimated distances between registered models.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    distances: Vec<Vec<f64>>,
}

impl DistanceMatrix {
    /// The estimated distance between the models `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.distances[i][j]
    }

    /// The number of models.
    pub fn size(&self) -> usize {
        self.distances.len()
    }
}

impl Display for DistanceMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut builder = tabled::builder::Builder::default();
        builder.push_record(
            std::iter::once(String::new()).chain((0..self.size()).map(|j| format!("M{j}"))),
        );
        for (i, row) in self.distances.iter().enumerate() {
            builder.push_record(
                std::iter::once(format!("M{i}")).chain(row.iter().map(|d| format!("{d:.4}"))),
            );
        }
        write!(
            f,
            "{}",
            builder
                .build()
                .with(tabled::settings::Style::rounded())
                .to_string()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        automaton::{Automaton, DFA},
        sampling::RandomWords,
        tests::{binary, parity_dfa},
    };

    fn sample() -> SampledLanguages<char> {
        let mut sampler = RandomWords::seeded(11);
        SampledLanguages::draw(&mut sampler, &['0', '1'], 0.05, 0.05).unwrap()
    }

    #[test]
    fn sample_size_follows_hoeffding() {
        assert_eq!(sample().len(), 738);
        let mut sampler = RandomWords::seeded(0);
        assert!(SampledLanguages::draw(&mut sampler, &['0'], 0.0, 0.1).is_err());
    }

    #[test]
    fn pairwise_distances() {
        let parity = parity_dfa();
        let universal = DFA::universal(binary());
        let mut languages = sample();
        let p = languages.register(|w| parity.accepts(w));
        let u = languages.register(|w| universal.accepts(w));
        let q = languages.register(|w| parity.accepts(w));

        // every word with an odd number of ones, i.e. (1 - 0.05) / 2 of the mass
        let d = languages.distance(p, u);
        assert!((d - 0.475).abs() < 0.1, "distance was {d}");
        assert_eq!(languages.distance(p, q), 0.0);
        assert_eq!(languages.distance(u, p), d);

        assert_eq!(languages.subset_violation(p, u), 0.0);
        assert_eq!(languages.subset_violation(u, p), d);
        assert_eq!(languages.distance_to(u, |w| parity.accepts(w)), d);

        let matrix = languages.matrix();
        assert_eq!(matrix.size(), 3);
        assert_eq!(matrix.get(0, 1), d);
        assert_eq!(matrix.get(2, 2), 0.0);
        let rendered = matrix.to_string();
        assert!(rendered.contains("M2"));
        assert!(rendered.contains("0.0000"));
    }

    #[test]
    fn empty_sample_has_no_distance() {
        let mut languages = SampledLanguages::<char>::from_words(vec![]);
        let a = languages.register(|_| true);
        let b = languages.register(|_| false);
        assert!(languages.is_empty());
        assert_eq!(languages.distance(a, b), 0.0);
    }
}
