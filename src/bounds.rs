use std::f64::consts::LN_2;

use crate::error::PacError;

/// Computes the number of random words that the equivalence query following `previous` earlier queries must
/// draw, which is
/// ```text
/// ceil( (1 / epsilon) * ( ln(1 / delta) + ln(2) * (previous + 1) ) )
/// ```
/// Query `k` thereby gets a failure budget of `delta / 2^(k+1)`, so by a union bound the probability that any
/// hypothesis with error above `epsilon` is accepted over an unbounded sequence of queries stays below `delta`.
///
/// The parameters are not validated, use [`Accuracy`] for that.
pub fn equivalence_rounds(epsilon: f64, delta: f64, previous: usize) -> usize {
    let rounds = (1.0 / epsilon) * ((1.0 / delta).ln() + LN_2 * (previous as f64 + 1.0));
    rounds.ceil() as usize
}

/// Computes how many samples are needed such that the empirical frequency of some event lies within `width` of
/// its true probability with probability at least `1 - confidence`. By Hoeffding's inequality this is
/// `ceil( ln(2 / confidence) / (2 * width^2) )`.
pub fn hoeffding_samples(width: f64, confidence: f64) -> Result<usize, PacError> {
    if !in_unit_interval(width) {
        return Err(PacError::InvalidWidth(width));
    }
    if !in_unit_interval(confidence) {
        return Err(PacError::InvalidConfidence(confidence));
    }
    Ok(((2.0 / confidence).ln() / (2.0 * width * width)).ceil() as usize)
}

fn in_unit_interval(value: f64) -> bool {
    value > 0.0 && value <= 1.0
}

/// The statistical guarantee a [`crate::PacOracle`] works towards: an accepted hypothesis disagrees with the target
/// on at most an `epsilon` fraction of words, except with probability at most `delta`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accuracy {
    epsilon: f64,
    delta: f64,
}

impl Accuracy {
    /// Creates a new instance, both values have to lie in `(0, 1]`.
    pub fn new(epsilon: f64, delta: f64) -> Result<Self, PacError> {
        if !in_unit_interval(epsilon) {
            return Err(PacError::InvalidEpsilon(epsilon));
        }
        if !in_unit_interval(delta) {
            return Err(PacError::InvalidDelta(delta));
        }
        Ok(Self { epsilon, delta })
    }

    /// The error bound.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// The confidence bound.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// See [`equivalence_rounds`].
    pub fn rounds(&self, previous: usize) -> usize {
        equivalence_rounds(self.epsilon, self.delta, previous)
    }
}

impl Default for Accuracy {
    fn default() -> Self {
        Self {
            epsilon: 0.001,
            delta: 0.001,
        }
    }
}
