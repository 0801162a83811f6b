use std::{str::FromStr, time::Duration};

use tracing::debug;

use crate::{
    bounds::Accuracy,
    error::PacError,
    oracle::{Batched, PacOracle, WordByWord, DEFAULT_BATCH_SIZE},
    progress::{TracingProgress, DEFAULT_REPORT_INTERVAL},
    sampling::{RandomWords, WordLength},
    target::{BatchScoring, TargetModel},
    teacher::{Budget, PacTeacher, DEFAULT_MAX_QUERIES},
};

/// Environment variable overriding [`PacConfig::epsilon`].
pub const EPSILON_VAR: &str = "PAC_EPSILON";
/// Environment variable overriding [`PacConfig::delta`].
pub const DELTA_VAR: &str = "PAC_DELTA";
/// Environment variable overriding [`PacConfig::batch_size`].
pub const BATCH_SIZE_VAR: &str = "PAC_BATCH_SIZE";
/// Environment variable overriding [`PacConfig::max_queries`].
pub const MAX_QUERIES_VAR: &str = "PAC_MAX_QUERIES";
/// Environment variable setting [`PacConfig::wall_clock`] in (fractional) seconds.
pub const WALL_CLOCK_VAR: &str = "PAC_WALL_CLOCK_SECS";
/// Environment variable setting [`PacConfig::seed`].
pub const SEED_VAR: &str = "PAC_SEED";

/// All knobs of a teaching setup in one place.
///
/// The values are only validated once something is built from them, e.g. [`PacConfig::oracle`] fails with
/// [`PacError::InvalidEpsilon`] if `epsilon` lies outside of `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacConfig {
    /// Tolerated probability mass of the difference between hypothesis and target.
    pub epsilon: f64,
    /// Tolerated probability of accepting a hypothesis that is further than `epsilon` from the target.
    pub delta: f64,
    /// Words per batch in batched mode.
    pub batch_size: usize,
    /// Iterations between two progress reports.
    pub report_every: usize,
    /// Query units a session may consume.
    pub max_queries: usize,
    /// Optional time limit of a session.
    pub wall_clock: Option<Duration>,
    /// Seed of the word sampler, a random one is used if this is `None`.
    pub seed: Option<u64>,
    /// Distribution of the lengths of sampled words.
    pub word_length: WordLength,
}

impl Default for PacConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.001,
            delta: 0.001,
            batch_size: DEFAULT_BATCH_SIZE,
            report_every: DEFAULT_REPORT_INTERVAL,
            max_queries: DEFAULT_MAX_QUERIES,
            wall_clock: None,
            seed: None,
            word_length: WordLength::default(),
        }
    }
}

impl PacConfig {
    /// Starts from the defaults and applies the overrides found in the process environment.
    pub fn from_env() -> Result<Self, PacError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Starts from the defaults and applies the overrides that `lookup` returns for the keys
    /// [`EPSILON_VAR`], [`DELTA_VAR`], [`BATCH_SIZE_VAR`], [`MAX_QUERIES_VAR`], [`WALL_CLOCK_VAR`] and
    /// [`SEED_VAR`]. A value that cannot be parsed yields [`PacError::Environment`].
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, PacError> {
        let mut config = Self::default();
        if let Some(epsilon) = parse(&lookup, EPSILON_VAR)? {
            config.epsilon = epsilon;
        }
        if let Some(delta) = parse(&lookup, DELTA_VAR)? {
            config.delta = delta;
        }
        if let Some(batch_size) = parse(&lookup, BATCH_SIZE_VAR)? {
            config.batch_size = batch_size;
        }
        if let Some(max_queries) = parse(&lookup, MAX_QUERIES_VAR)? {
            config.max_queries = max_queries;
        }
        if let Some(seconds) = parse::<f64, _>(&lookup, WALL_CLOCK_VAR)? {
            let limit = Duration::try_from_secs_f64(seconds).map_err(|_| PacError::Environment {
                key: WALL_CLOCK_VAR,
                value: seconds.to_string(),
            })?;
            config.wall_clock = Some(limit);
        }
        config.seed = parse(&lookup, SEED_VAR)?;
        debug!("using configuration {config:?}");
        Ok(config)
    }

    /// The validated accuracy parameters.
    pub fn accuracy(&self) -> Result<Accuracy, PacError> {
        Accuracy::new(self.epsilon, self.delta)
    }

    /// The budget of a single session.
    pub fn budget(&self) -> Budget {
        let budget = Budget::queries(self.max_queries);
        match self.wall_clock {
            Some(limit) => budget.with_wall_clock(limit),
            None => budget,
        }
    }

    /// A sampler with the configured length distribution, seeded if a seed is set.
    pub fn sampler(&self) -> RandomWords {
        match self.seed {
            Some(seed) => RandomWords::with_seed(seed, self.word_length),
            None => RandomWords::new(self.word_length),
        }
    }

    /// An oracle that poses one membership query per sampled word.
    pub fn oracle<T: TargetModel>(&self, target: T) -> Result<PacOracle<T>, PacError> {
        Ok(PacOracle::with_mode(
            target,
            WordByWord,
            self.sampler(),
            self.accuracy()?,
        ))
    }

    /// An oracle that scores sampled words in batches of [`PacConfig::batch_size`].
    pub fn batched_oracle<T: BatchScoring>(
        &self,
        target: T,
    ) -> Result<PacOracle<T, Batched>, PacError> {
        Ok(PacOracle::with_mode(
            target,
            Batched::with_size(self.batch_size)?,
            self.sampler(),
            self.accuracy()?,
        ))
    }

    /// A teacher around [`PacConfig::oracle`] that logs its progress.
    pub fn teacher<T: TargetModel>(
        &self,
        target: T,
    ) -> Result<PacTeacher<T, WordByWord, RandomWords, TracingProgress>, PacError> {
        Ok(PacTeacher::new(self.oracle(target)?).with_progress(TracingProgress, self.report_every))
    }

    /// A teacher around [`PacConfig::batched_oracle`] that logs its progress.
    pub fn batched_teacher<T: BatchScoring>(
        &self,
        target: T,
    ) -> Result<PacTeacher<T, Batched, RandomWords, TracingProgress>, PacError> {
        Ok(PacTeacher::new(self.batched_oracle(target)?)
            .with_progress(TracingProgress, self.report_every))
    }
}

fn parse<T: FromStr, F: Fn(&str) -> Option<String>>(
    lookup: &F,
    key: &'static str,
) -> Result<Option<T>, PacError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PacError::Environment { key, value }),
    }
}
