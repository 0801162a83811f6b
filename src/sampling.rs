use tracing::trace;

use crate::{error::PacError, word::Word};

/// Geometric word lengths are cut off at this length.
pub const MAX_GEOMETRIC_LENGTH: usize = 1 << 12;

/// Something that can draw random words over a given universe of symbols. The teacher only relies on every
/// call producing a fresh word, the distribution is up to the implementation.
pub trait WordSampler<S> {
    /// Draws a single word.
    fn sample_word(&mut self, universe: &[S]) -> Word<S>;

    /// Draws `count` words, in order. The default implementation draws one word after the other, so sampling a
    /// batch of `n` words is indistinguishable from `n` calls to [`WordSampler::sample_word`].
    fn sample_batch(&mut self, universe: &[S], count: usize) -> Vec<Word<S>> {
        (0..count).map(|_| self.sample_word(universe)).collect()
    }
}

impl<S, R: WordSampler<S> + ?Sized> WordSampler<S> for &mut R {
    fn sample_word(&mut self, universe: &[S]) -> Word<S> {
        R::sample_word(self, universe)
    }

    fn sample_batch(&mut self, universe: &[S], count: usize) -> Vec<Word<S>> {
        R::sample_batch(self, universe, count)
    }
}

/// The distribution from which the length of a random word is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WordLength {
    /// Uniformly from `min..=max`.
    Uniform {
        /// Shortest possible length.
        min: usize,
        /// Longest possible length.
        max: usize,
    },
    /// Before each symbol, the word ends with probability `stop_probability`, which gives an expected
    /// length of `1 / stop_probability - 1`.
    Geometric {
        /// Probability of ending the word before the next symbol.
        stop_probability: f64,
    },
}

impl WordLength {
    /// Uniformly distributed lengths in `min..=max`.
    pub fn uniform(min: usize, max: usize) -> Result<Self, PacError> {
        if min > max {
            return Err(PacError::InvalidLengthRange { min, max });
        }
        Ok(Self::Uniform { min, max })
    }

    /// Geometrically distributed lengths, `stop_probability` must lie in `(0, 1]`.
    pub fn geometric(stop_probability: f64) -> Result<Self, PacError> {
        if !(stop_probability > 0.0 && stop_probability <= 1.0) {
            return Err(PacError::InvalidStopProbability(stop_probability));
        }
        Ok(Self::Geometric { stop_probability })
    }

    fn draw(&self, rng: &mut fastrand::Rng) -> usize {
        match *self {
            WordLength::Uniform { min, max } => rng.usize(min..=max),
            WordLength::Geometric { stop_probability } => {
                let mut length = 0;
                while length < MAX_GEOMETRIC_LENGTH && rng.f64() >= stop_probability {
                    length += 1;
                }
                length
            }
        }
    }
}

impl Default for WordLength {
    fn default() -> Self {
        Self::Geometric {
            stop_probability: 0.05,
        }
    }
}

/// Draws words whose symbols are picked uniformly and independently, with a length drawn from a
/// [`WordLength`] distribution. Seeding the sampler makes the whole sequence of drawn words reproducible.
#[derive(Debug, Clone)]
pub struct RandomWords {
    rng: fastrand::Rng,
    length: WordLength,
}

impl RandomWords {
    /// Creates a sampler with the given length distribution and a randomly seeded generator.
    pub fn new(length: WordLength) -> Self {
        Self {
            rng: fastrand::Rng::new(),
            length,
        }
    }

    /// Creates a sampler with the given length distribution and a fixed seed.
    pub fn with_seed(seed: u64, length: WordLength) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            length,
        }
    }

    /// Shorthand for a seeded sampler using the default length distribution.
    pub fn seeded(seed: u64) -> Self {
        Self::with_seed(seed, WordLength::default())
    }

    /// Reseeds the underlying generator.
    pub fn reseed(&mut self, seed: u64) {
        self.rng.seed(seed);
    }

    /// The length distribution in use.
    pub fn length(&self) -> WordLength {
        self.length
    }
}

impl Default for RandomWords {
    fn default() -> Self {
        Self::new(WordLength::default())
    }
}

impl<S: Copy> WordSampler<S> for RandomWords {
    fn sample_word(&mut self, universe: &[S]) -> Word<S> {
        if universe.is_empty() {
            return vec![];
        }
        let length = self.length.draw(&mut self.rng);
        (0..length)
            .map(|_| universe[self.rng.usize(..universe.len())])
            .collect()
    }

    fn sample_batch(&mut self, universe: &[S], count: usize) -> Vec<Word<S>> {
        trace!("drawing batch of {count} random words");
        (0..count).map(|_| self.sample_word(universe)).collect()
    }
}
