use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::{
    alphabet::SymbolOf,
    automaton::Automaton,
    checker::SpecificationChecker,
    learner::Learner,
    oracle::{Inclusion, PacOracle, QueryMode, WordByWord},
    progress::{Progress, ProgressReport, DEFAULT_REPORT_INTERVAL},
    sampling::{RandomWords, WordSampler},
    target::TargetModel,
    word::{FiniteWord, Word},
};

#[cfg(feature = "measure")]
use crate::{alphabet::Alphabet, distance::SampledLanguages, error::PacError};

/// Default number of query units a teaching session may consume.
pub const DEFAULT_MAX_QUERIES: usize = 600;

/// Limits a teaching session. The limits are checked once at the start of every iteration, an ongoing
/// query or refinement is never interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// The session ends once more than this many query units have been charged, where each equivalence
    /// (or inclusion) query and each refinement step reported by the learner costs one unit.
    pub max_queries: usize,
    /// Optional guard on the elapsed time, the session ends once it is reached.
    pub wall_clock: Option<Duration>,
    /// Passed on to the learner with every counterexample.
    pub max_refinements: Option<usize>,
}

impl Budget {
    /// A budget of `max_queries` query units without a wall-clock guard.
    pub fn queries(max_queries: usize) -> Self {
        Self {
            max_queries,
            wall_clock: None,
            max_refinements: None,
        }
    }

    /// Adds a wall-clock guard.
    pub fn with_wall_clock(self, limit: Duration) -> Self {
        Self {
            wall_clock: Some(limit),
            ..self
        }
    }

    /// Caps the number of refinement steps per counterexample.
    pub fn with_max_refinements(self, max_refinements: usize) -> Self {
        Self {
            max_refinements: Some(max_refinements),
            ..self
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::queries(DEFAULT_MAX_QUERIES)
    }
}

/// Which limit of a [`Budget`] ended a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exhaustion {
    /// More query units than allowed were charged.
    Queries,
    /// The wall-clock guard was reached.
    WallClock,
}

/// How a teaching session ended. In every case the final hypothesis stays available on the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<S> {
    /// The oracle found no further counterexample, the hypothesis is accepted.
    Converged,
    /// The budget ran out before the hypothesis was accepted.
    Exhausted(Exhaustion),
    /// The target itself violates the specification on the contained word, so either the target or the
    /// specification is wrong and teaching cannot meaningfully continue.
    SpecificationMismatch(Word<S>),
}

impl<S> Outcome<S> {
    /// Whether the hypothesis was accepted.
    pub fn is_converged(&self) -> bool {
        matches!(self, Outcome::Converged)
    }

    /// The word on which the target violates the specification, if that is how the session ended.
    pub fn mismatch(&self) -> Option<&[S]> {
        match self {
            Outcome::SpecificationMismatch(word) => Some(word),
            _ => None,
        }
    }
}

/// One measurement of [`PacTeacher::teach_and_trace`], taken after a refinement.
#[cfg(feature = "measure")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    /// Number of states of the refined hypothesis.
    pub hypothesis_size: usize,
    /// Estimated distance between the hypothesis and the reference language.
    pub distance_to_reference: f64,
    /// Estimated distance between the hypothesis and the target.
    pub distance_to_target: f64,
}

/// Runs the teaching loops against a [`PacOracle`], reporting to the progress hook `P`.
///
/// The oracle is meant to be reused across sessions: every `teach*` method starts by resetting the query
/// counter of the oracle. At most one session can run at a time, which the `&mut self` receivers enforce.
#[derive(Debug, Clone)]
pub struct PacTeacher<T, M = WordByWord, R = RandomWords, P = ()> {
    oracle: PacOracle<T, M, R>,
    progress: P,
    report_every: usize,
}

impl<T, M, R> PacTeacher<T, M, R, ()> {
    /// Creates a teacher that does not report progress.
    pub fn new(oracle: PacOracle<T, M, R>) -> Self {
        Self {
            oracle,
            progress: (),
            report_every: DEFAULT_REPORT_INTERVAL,
        }
    }
}

impl<T, M, R, P> PacTeacher<T, M, R, P> {
    /// Replaces the progress hook. It is invoked every `report_every`-th iteration, `0` disables the
    /// periodic reports but keeps the final one.
    pub fn with_progress<Q: Progress>(self, progress: Q, report_every: usize) -> PacTeacher<T, M, R, Q> {
        PacTeacher {
            oracle: self.oracle,
            progress,
            report_every,
        }
    }

    /// Returns a reference to the oracle.
    pub fn oracle(&self) -> &PacOracle<T, M, R> {
        &self.oracle
    }

    /// Returns a mutable reference to the oracle.
    pub fn oracle_mut(&mut self) -> &mut PacOracle<T, M, R> {
        &mut self.oracle
    }

    /// Returns a reference to the progress hook.
    pub fn progress(&self) -> &P {
        &self.progress
    }

    /// Consumes the teacher, giving back its oracle.
    pub fn into_oracle(self) -> PacOracle<T, M, R> {
        self.oracle
    }

    /// The query units charged in the current (or last) session.
    pub fn queries_asked(&self) -> usize {
        self.oracle.queries_asked()
    }
}

/// Bookkeeping of one running session.
struct Session {
    budget: Budget,
    report_every: usize,
    started: Instant,
    last_report: Instant,
    iteration: usize,
}

impl Session {
    fn start(budget: Budget, report_every: usize) -> Self {
        let now = Instant::now();
        Self {
            budget,
            report_every,
            started: now,
            last_report: now,
            iteration: 0,
        }
    }

    fn exhausted(&self, queries_asked: usize) -> Option<Exhaustion> {
        if queries_asked > self.budget.max_queries {
            return Some(Exhaustion::Queries);
        }
        match self.budget.wall_clock {
            Some(limit) if self.started.elapsed() >= limit => Some(Exhaustion::WallClock),
            _ => None,
        }
    }

    fn report(&self, queries_asked: usize, hypothesis_size: usize, now: Instant) -> ProgressReport {
        ProgressReport {
            iteration: self.iteration,
            queries_asked,
            hypothesis_size,
            elapsed: now - self.started,
            since_last: now - self.last_report,
        }
    }

    fn advance<P: Progress>(&mut self, progress: &mut P, queries_asked: usize, hypothesis_size: usize) {
        self.iteration += 1;
        if self.report_every > 0 && self.iteration % self.report_every == 0 {
            let now = Instant::now();
            progress.report(&self.report(queries_asked, hypothesis_size, now));
            self.last_report = now;
        }
    }

    fn finish<P: Progress, S>(
        &self,
        progress: &mut P,
        queries_asked: usize,
        hypothesis_size: usize,
        outcome: &Outcome<S>,
    ) {
        let report = self.report(queries_asked, hypothesis_size, Instant::now());
        match outcome {
            Outcome::Converged => info!(
                "hypothesis with {hypothesis_size} states accepted after {} rounds and {queries_asked} queries",
                self.iteration
            ),
            Outcome::Exhausted(reason) => info!(
                "budget exhausted ({reason:?}) after {} rounds and {queries_asked} queries",
                self.iteration
            ),
            Outcome::SpecificationMismatch(_) => {}
        }
        progress.finished(&report);
    }
}

impl<T, M, R, P> PacTeacher<T, M, R, P>
where
    T: TargetModel,
    M: QueryMode<T>,
    R: WordSampler<SymbolOf<T::Alphabet>>,
    P: Progress,
{
    /// Refines the hypothesis of `learner` until an equivalence query finds no counterexample or the budget is
    /// exhausted. Each query costs one unit, each refinement step reported by the learner another one.
    pub fn teach<L>(&mut self, learner: &mut L, budget: Budget) -> Outcome<SymbolOf<T::Alphabet>>
    where
        L: Learner,
        L::Hypothesis: Automaton<Symbol = SymbolOf<T::Alphabet>>,
    {
        self.drive(learner, budget, |oracle, hypothesis| {
            oracle.equivalence_query(hypothesis)
        })
    }

    /// Like [`PacTeacher::teach`], but only ensures that the hypothesis accepts (approximately) everything
    /// the target accepts, i.e. counterexamples are words the target accepts and the hypothesis rejects.
    pub fn teach_a_superset<L>(&mut self, learner: &mut L, budget: Budget) -> Outcome<SymbolOf<T::Alphabet>>
    where
        L: Learner,
        L::Hypothesis: Automaton<Symbol = SymbolOf<T::Alphabet>>,
    {
        self.drive(learner, budget, |oracle, hypothesis| {
            oracle.target_subset_of_hypothesis(hypothesis)
        })
    }

    /// Teaching guided by a specification. In each iteration, `checker` is asked for a word on which the
    /// hypothesis violates the specification first, as such words come without any sampling cost.
    /// - If there is one and the target agrees with the specification on it, the word refines the hypothesis.
    ///   This costs as many units as the learner reports refinement steps, but at least one.
    /// - If there is one and the target disagrees with the specification, the session ends with
    ///   [`Outcome::SpecificationMismatch`].
    /// - Otherwise a one-sided query in the direction `inclusion` is posed. If it finds nothing, the hypothesis
    ///   is accepted, otherwise its counterexample refines the hypothesis as in [`PacTeacher::teach`].
    pub fn check_and_teach<L, C>(
        &mut self,
        learner: &mut L,
        checker: &C,
        inclusion: Inclusion,
        budget: Budget,
    ) -> Outcome<SymbolOf<T::Alphabet>>
    where
        L: Learner,
        L::Hypothesis: Automaton<Symbol = SymbolOf<T::Alphabet>>,
        C: SpecificationChecker<L::Hypothesis>,
    {
        self.oracle.reset();
        let specification_verdict = !checker.is_super_set();
        let mut session = Session::start(budget, self.report_every);

        let outcome = loop {
            if let Some(reason) = session.exhausted(self.oracle.queries_asked()) {
                break Outcome::Exhausted(reason);
            }
            session.advance(
                &mut self.progress,
                self.oracle.queries_asked(),
                learner.hypothesis().size(),
            );

            if let Some(word) = checker.check_for_counterexample(learner.hypothesis()) {
                if self.oracle.target().is_word_in(&word) != specification_verdict {
                    warn!(
                        "target violates the specification on {}",
                        word.as_string()
                    );
                    break Outcome::SpecificationMismatch(word);
                }
                debug!("specification provides counterexample {}", word.as_string());
                let refinements = self.refine(learner, &word, &budget);
                self.oracle.charge(refinements.max(1));
                continue;
            }

            match self.oracle.subset_query(inclusion, learner.hypothesis()) {
                None => break Outcome::Converged,
                Some(counterexample) => {
                    let refinements = self.refine(learner, &counterexample, &budget);
                    self.oracle.charge(refinements);
                }
            }
        };

        session.finish(
            &mut self.progress,
            self.oracle.queries_asked(),
            learner.hypothesis().size(),
            &outcome,
        );
        outcome
    }

    /// Runs [`PacTeacher::teach`] and measures after every refinement how far the hypothesis is from a
    /// `reference` language (e.g. the automaton the target was trained on) and from the target. All
    /// measurements use one sample of [`crate::bounds::hoeffding_samples`]`(width, confidence)` words drawn
    /// up front, on which the verdicts of reference and target are computed only once.
    #[cfg(feature = "measure")]
    pub fn teach_and_trace<L, D>(
        &mut self,
        learner: &mut L,
        reference: &D,
        width: f64,
        confidence: f64,
        budget: Budget,
    ) -> Result<(Outcome<SymbolOf<T::Alphabet>>, Vec<TracePoint>), PacError>
    where
        L: Learner,
        L::Hypothesis: Automaton<Symbol = SymbolOf<T::Alphabet>>,
        D: Automaton<Symbol = SymbolOf<T::Alphabet>>,
    {
        let universe = self.oracle.target().alphabet().universe().to_vec();
        let mut sample =
            SampledLanguages::draw(self.oracle.sampler_mut(), &universe, width, confidence)?;
        let reference_index = sample.register(|word| reference.accepts(word));
        let target = self.oracle.target();
        let target_index = sample.register(|word| target.is_word_in(word));
        debug!("tracing distances on {} sampled words", sample.len());

        let mut points = vec![];
        self.oracle.reset();
        let mut session = Session::start(budget, self.report_every);
        let outcome = loop {
            if let Some(reason) = session.exhausted(self.oracle.queries_asked()) {
                break Outcome::Exhausted(reason);
            }
            session.advance(
                &mut self.progress,
                self.oracle.queries_asked(),
                learner.hypothesis().size(),
            );

            let Some(counterexample) = self.oracle.equivalence_query(learner.hypothesis()) else {
                break Outcome::Converged;
            };
            let refinements = self.refine(learner, &counterexample, &budget);
            self.oracle.charge(refinements);

            let hypothesis = learner.hypothesis();
            let point = TracePoint {
                hypothesis_size: hypothesis.size(),
                distance_to_reference: sample
                    .distance_to(reference_index, |word| hypothesis.accepts(word)),
                distance_to_target: sample.distance_to(target_index, |word| hypothesis.accepts(word)),
            };
            debug!(
                "hypothesis with {} states is {:.4} from reference and {:.4} from target",
                point.hypothesis_size, point.distance_to_reference, point.distance_to_target
            );
            points.push(point);
        };

        session.finish(
            &mut self.progress,
            self.oracle.queries_asked(),
            learner.hypothesis().size(),
            &outcome,
        );
        Ok((outcome, points))
    }

    fn drive<L, Q>(&mut self, learner: &mut L, budget: Budget, query: Q) -> Outcome<SymbolOf<T::Alphabet>>
    where
        L: Learner,
        L::Hypothesis: Automaton<Symbol = SymbolOf<T::Alphabet>>,
        Q: Fn(&mut PacOracle<T, M, R>, &L::Hypothesis) -> Option<Word<SymbolOf<T::Alphabet>>>,
    {
        self.oracle.reset();
        let mut session = Session::start(budget, self.report_every);

        let outcome = loop {
            if let Some(reason) = session.exhausted(self.oracle.queries_asked()) {
                break Outcome::Exhausted(reason);
            }
            session.advance(
                &mut self.progress,
                self.oracle.queries_asked(),
                learner.hypothesis().size(),
            );

            let Some(counterexample) = query(&mut self.oracle, learner.hypothesis()) else {
                break Outcome::Converged;
            };
            let refinements = self.refine(learner, &counterexample, &budget);
            self.oracle.charge(refinements);
        };

        session.finish(
            &mut self.progress,
            self.oracle.queries_asked(),
            learner.hypothesis().size(),
            &outcome,
        );
        outcome
    }

    fn refine<L>(&self, learner: &mut L, counterexample: &[SymbolOf<T::Alphabet>], budget: &Budget) -> usize
    where
        L: Learner,
        L::Hypothesis: Automaton<Symbol = SymbolOf<T::Alphabet>>,
    {
        let refinements = learner.new_counterexample(
            counterexample,
            &self.oracle,
            self.oracle.is_batched(),
            budget.max_refinements,
        );
        debug!(
            "counterexample {} took {refinements} refinement steps",
            counterexample.as_string()
        );
        refinements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        automaton::DFA,
        progress::TracingProgress,
        target::Classifier,
        tests::{binary, odd_ones, parity_dfa, ScriptedLearner},
        word::words_up_to,
    };

    fn teacher(seed: u64) -> PacTeacher<DFA> {
        let oracle = PacOracle::new(parity_dfa(), 0.05, 0.05)
            .unwrap()
            .with_sampler(RandomWords::seeded(seed));
        PacTeacher::new(oracle)
    }

    fn parity_script(refinements: usize) -> ScriptedLearner {
        ScriptedLearner::new(
            vec![
                DFA::universal(binary()),
                DFA::empty(binary()),
                parity_dfa(),
            ],
            refinements,
        )
    }

    /// Proposes the same word for every hypothesis.
    struct FixedWord {
        word: Vec<char>,
        super_set: bool,
    }

    impl<H: Automaton<Symbol = char>> SpecificationChecker<H> for FixedWord {
        fn check_for_counterexample(&self, _hypothesis: &H) -> Option<Word<char>> {
            Some(self.word.clone())
        }

        fn is_super_set(&self) -> bool {
            self.super_set
        }
    }

    #[derive(Default)]
    struct Recorder {
        reports: Vec<usize>,
        finished: Option<ProgressReport>,
    }

    impl Progress for Recorder {
        fn report(&mut self, report: &ProgressReport) {
            self.reports.push(report.iteration);
        }

        fn finished(&mut self, report: &ProgressReport) {
            self.finished = Some(*report);
        }
    }

    #[test_log::test]
    fn learns_parity() {
        let mut teacher = teacher(5).with_progress(TracingProgress, 1);
        let mut learner = parity_script(1);
        let outcome = teacher.teach(&mut learner, Budget::queries(50));
        assert_eq!(outcome, Outcome::Converged);
        assert!(outcome.is_converged());

        assert_eq!(learner.received.len(), 2);
        assert!(odd_ones(&learner.received[0]));
        assert!(!odd_ones(&learner.received[1]));
        // three queries and one refinement step per counterexample
        assert_eq!(teacher.queries_asked(), 5);
        for word in words_up_to(binary().universe(), 6) {
            assert_eq!(learner.hypothesis().accepts(&word), !odd_ones(&word));
        }

        // a second session starts from zero
        assert_eq!(teacher.teach(&mut learner, Budget::queries(50)), Outcome::Converged);
        assert_eq!(teacher.queries_asked(), 1);
    }

    #[test]
    fn refinement_steps_are_charged() {
        let mut teacher = teacher(5);
        let mut learner = parity_script(3);
        assert!(teacher.teach(&mut learner, Budget::default()).is_converged());
        assert_eq!(
            teacher.queries_asked(),
            3 + learner.total_refinements()
        );
        assert_eq!(teacher.queries_asked(), 9);
    }

    #[test]
    fn stuck_learner_exhausts_budget() {
        let mut teacher = teacher(1);
        let mut learner = ScriptedLearner::new(vec![DFA::universal(binary())], 1);
        let outcome = teacher.teach(&mut learner, Budget::queries(5));
        assert_eq!(outcome, Outcome::Exhausted(Exhaustion::Queries));
        assert_eq!(learner.received.len(), 3);
        assert_eq!(teacher.queries_asked(), 6);
        assert!(learner.received.iter().all(|word| odd_ones(word)));
    }

    #[test]
    fn wall_clock_guard() {
        let mut teacher = teacher(1);
        let mut learner = parity_script(1);
        let budget = Budget::queries(100).with_wall_clock(Duration::ZERO);
        assert_eq!(
            teacher.teach(&mut learner, budget),
            Outcome::Exhausted(Exhaustion::WallClock)
        );
        assert!(learner.received.is_empty());
        assert_eq!(teacher.queries_asked(), 0);
    }

    #[test]
    fn progress_is_reported_periodically() {
        let mut teacher = teacher(1).with_progress(Recorder::default(), 2);
        let mut learner = ScriptedLearner::new(vec![DFA::universal(binary())], 1);
        teacher.teach(&mut learner, Budget::queries(5));
        assert_eq!(teacher.progress().reports, vec![2]);
        let last = teacher.progress().finished.unwrap();
        assert_eq!(last.iteration, 3);
        assert_eq!(last.queries_asked, 6);
        assert_eq!(last.hypothesis_size, 1);
    }

    #[test]
    fn specification_counterexamples_cost_at_least_one_unit() {
        let mut teacher = teacher(2);
        let mut learner = ScriptedLearner::new(vec![DFA::universal(binary())], 0);
        let checker = FixedWord {
            word: vec!['1'],
            super_set: true,
        };
        let outcome = teacher.check_and_teach(
            &mut learner,
            &checker,
            Inclusion::HypothesisInTarget,
            Budget::queries(10),
        );
        assert_eq!(outcome, Outcome::Exhausted(Exhaustion::Queries));
        assert_eq!(learner.received.len(), 11);
        assert!(learner.received.iter().all(|word| word == &['1']));
        assert_eq!(teacher.queries_asked(), 11);
    }

    #[test_log::test]
    fn target_contradicting_the_specification() {
        let mut teacher = teacher(2);
        let mut learner = parity_script(1);

        // a superset specification rejects the word, but the target accepts it
        let checker = FixedWord {
            word: vec!['1', '1'],
            super_set: true,
        };
        let outcome = teacher.check_and_teach(
            &mut learner,
            &checker,
            Inclusion::HypothesisInTarget,
            Budget::default(),
        );
        assert_eq!(outcome.mismatch(), Some(&['1', '1'][..]));
        assert!(learner.received.is_empty());

        // a subset specification accepts the word, but the target rejects it
        let checker = FixedWord {
            word: vec!['1'],
            super_set: false,
        };
        let outcome = teacher.check_and_teach(
            &mut learner,
            &checker,
            Inclusion::TargetInHypothesis,
            Budget::default(),
        );
        assert_eq!(outcome, Outcome::SpecificationMismatch(vec!['1']));
        assert!(learner.received.is_empty());
    }

    #[test]
    fn checker_before_sampling() {
        let mut teacher = teacher(3);
        let mut learner =
            ScriptedLearner::new(vec![DFA::universal(binary()), parity_dfa()], 1);
        let checker = crate::checker::DfaChecker::superset(parity_dfa());
        let outcome = teacher.check_and_teach(
            &mut learner,
            &checker,
            Inclusion::HypothesisInTarget,
            Budget::default(),
        );
        assert!(outcome.is_converged());
        assert_eq!(learner.received, vec![vec!['1']]);
        // one refinement step plus one inclusion query
        assert_eq!(teacher.queries_asked(), 2);
    }

    #[test]
    fn superset_teaching_accepts_over_approximation() {
        let mut teacher = teacher(4);
        let mut learner =
            ScriptedLearner::new(vec![DFA::empty(binary()), DFA::universal(binary())], 1);
        let outcome = teacher.teach_a_superset(&mut learner, Budget::default());
        assert!(outcome.is_converged());
        assert_eq!(learner.received.len(), 1);
        assert!(!odd_ones(&learner.received[0]));
        assert_eq!(teacher.queries_asked(), 3);
        // the accepted hypothesis is not equivalent to the target
        assert!(teacher
            .oracle_mut()
            .equivalence_query(&DFA::universal(binary()))
            .is_some());
    }

    #[test]
    fn learner_is_told_about_batching() {
        let target = Classifier::new(binary(), |w: &[char]| if odd_ones(w) { 0.0 } else { 1.0 });
        let oracle = PacOracle::batched(target, 0.05, 0.05)
            .unwrap()
            .with_sampler(RandomWords::seeded(9));
        let mut teacher = PacTeacher::new(oracle);
        let mut learner =
            ScriptedLearner::new(vec![DFA::universal(binary()), parity_dfa()], 1);
        assert!(teacher.teach(&mut learner, Budget::default()).is_converged());
        assert_eq!(learner.batched_flags, vec![true]);

        let mut learner =
            ScriptedLearner::new(vec![DFA::universal(binary()), parity_dfa()], 1);
        self::teacher(9).teach(&mut learner, Budget::default());
        assert_eq!(learner.batched_flags, vec![false]);
    }

    #[cfg(feature = "measure")]
    #[test]
    fn trace_records_distances() {
        let mut teacher = teacher(6);
        let mut learner =
            ScriptedLearner::new(vec![DFA::universal(binary()), parity_dfa()], 1);
        let reference = parity_dfa();
        let (outcome, points) = teacher
            .teach_and_trace(&mut learner, &reference, 0.05, 0.05, Budget::default())
            .unwrap();
        assert!(outcome.is_converged());
        assert_eq!(
            points,
            vec![TracePoint {
                hypothesis_size: 2,
                distance_to_reference: 0.0,
                distance_to_target: 0.0,
            }]
        );

        assert_eq!(
            teacher
                .teach_and_trace(&mut learner, &reference, 0.0, 0.05, Budget::default())
                .unwrap_err(),
            PacError::InvalidWidth(0.0)
        );
    }
}
