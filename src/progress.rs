use std::time::Duration;

use tracing::info;

/// Default number of iterations between two progress reports.
pub const DEFAULT_REPORT_INTERVAL: usize = 100;

/// A snapshot of a running teaching session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    /// Number of completed iterations of the loop.
    pub iteration: usize,
    /// Query units charged so far.
    pub queries_asked: usize,
    /// Number of states of the current hypothesis.
    pub hypothesis_size: usize,
    /// Time since the session started.
    pub elapsed: Duration,
    /// Time since the previous report.
    pub since_last: Duration,
}

/// Observes a teaching session. [`Progress::report`] is invoked every `n`-th iteration (as configured on the
/// [`crate::PacTeacher`]), [`Progress::finished`] once when the session ends, however it ends.
pub trait Progress {
    /// Periodic report.
    fn report(&mut self, report: &ProgressReport);

    /// Final report.
    fn finished(&mut self, report: &ProgressReport) {
        let _ = report;
    }
}

impl Progress for () {
    fn report(&mut self, _report: &ProgressReport) {}
}

impl<P: Progress + ?Sized> Progress for &mut P {
    fn report(&mut self, report: &ProgressReport) {
        P::report(self, report)
    }

    fn finished(&mut self, report: &ProgressReport) {
        P::finished(self, report)
    }
}

/// Emits progress reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl Progress for TracingProgress {
    fn report(&mut self, report: &ProgressReport) {
        info!(
            "round {}: {:.2?} since start, {:.2?} since last report, {} queries charged, hypothesis has {} states",
            report.iteration,
            report.elapsed,
            report.since_last,
            report.queries_asked,
            report.hypothesis_size
        );
    }

    fn finished(&mut self, report: &ProgressReport) {
        info!(
            "teaching ended after {} rounds and {:.2?}, {} queries charged, hypothesis has {} states",
            report.iteration, report.elapsed, report.queries_asked, report.hypothesis_size
        );
    }
}
