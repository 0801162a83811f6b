//! Errors that can occur when setting up a teaching session or constructing an automaton.
//!
//! Note that a teaching session itself never fails: running out of budget or discovering that the target
//! violates its specification are regular [`crate::Outcome`]s.
use thiserror::Error;

/// Errors arising from invalid parameters of oracles, samplers and measurements.
#[derive(Debug, Clone, PartialEq, Error)]
#[allow(missing_docs)]
pub enum PacError {
    #[error("epsilon must lie in (0, 1], got {0}")]
    InvalidEpsilon(f64),
    #[error("delta must lie in (0, 1], got {0}")]
    InvalidDelta(f64),
    #[error("interval width must lie in (0, 1], got {0}")]
    InvalidWidth(f64),
    #[error("confidence must lie in (0, 1], got {0}")]
    InvalidConfidence(f64),
    #[error("batch size must be positive")]
    InvalidBatchSize,
    #[error("stop probability of geometric word length must lie in (0, 1], got {0}")]
    InvalidStopProbability(f64),
    #[error("word length range {min}..={max} is empty")]
    InvalidLengthRange { min: usize, max: usize },
    #[error("could not parse value `{value}` of environment variable {key}")]
    Environment { key: &'static str, value: String },
}

/// Errors that can occur when building a [`crate::DFA`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[allow(missing_docs)]
pub enum AutomatonError {
    #[error("symbol `{0}` is not part of the alphabet")]
    UnknownSymbol(String),
    #[error("state {state} does not exist, automaton has {size} states")]
    StateOutOfRange { state: usize, size: usize },
    #[error("state {state} has no transition on `{symbol}`")]
    Incomplete { state: usize, symbol: String },
    #[error("state {state} has more than one transition on `{symbol}`")]
    Nondeterministic { state: usize, symbol: String },
    #[error("an automaton needs at least one state")]
    NoStates,
}
