#![warn(missing_docs)]
//! SweepBench Report - Progress Lines and Console Sinks
//!
//! Every timed loop is narrated as a fixed sequence of phase lines:
//!
//! ```text
//! [Size:10]:insert(1024): starting
//! [Size:10]:insert(1024): setup complete
//! [Size:10]:insert(1024): running
//! [Size:10]:insert(1024): finished
//! [Size:10]:insert(1024): cleaning up
//! [Size:10]:insert(1024): complete
//! ```
//!
//! Lines go to a [`ConsoleSink`]: plain stdout, an indicatif progress bar, or
//! an in-memory buffer.

mod sink;

pub use sink::{ConsoleSink, MemorySink, ProgressSink, StdoutSink};

use std::fmt;

/// Point in a timed loop's lifecycle that gets reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Before the case setup hooks
    Start,
    /// Setup hooks returned
    SetupComplete,
    /// Timed loop is about to start
    Running,
    /// Timed loop stopped
    Finished,
    /// Before the case cleanup hooks
    CleanupInProgress,
    /// Cleanup hooks returned
    Complete,
}

impl Phase {
    /// Text appended to the line for this phase
    pub fn text(self) -> &'static str {
        match self {
            Phase::Start => "starting",
            Phase::SetupComplete => "setup complete",
            Phase::Running => "running",
            Phase::Finished => "finished",
            Phase::CleanupInProgress => "cleaning up",
            Phase::Complete => "complete",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Format one progress line: `{label}:{case}({args}): {phase}`
pub fn format_line(label: &str, case: &str, args: &str, phase: Phase) -> String {
    format!("{}:{}({}): {}", label, case, args, phase)
}

/// Formats phase lines and forwards them, with progress, to a sink
pub struct Reporter {
    sink: Box<dyn ConsoleSink>,
}

impl Reporter {
    /// Report through `sink`
    pub fn new(sink: impl ConsoleSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
        }
    }

    /// Plain lines on stdout
    pub fn stdout() -> Self {
        Self::new(StdoutSink)
    }

    /// Lines printed above a progress bar on stderr
    pub fn progress() -> Self {
        Self::new(ProgressSink::new())
    }

    /// Announce how many timed loops the run will perform
    pub fn begin(&mut self, planned_loops: u64) {
        self.sink.start(planned_loops);
    }

    /// Report a phase of one timed loop
    pub fn phase(&mut self, label: &str, case: &str, args: &str, phase: Phase) {
        let line = format_line(label, case, args, phase);
        self.sink.emit(&line);
        if phase == Phase::Complete {
            self.sink.advance();
        }
    }

    /// The run is over
    pub fn finish(&mut self) {
        self.sink.finish();
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line("[Size:10]", "insert", "1024", Phase::Start),
            "[Size:10]:insert(1024): starting"
        );
        assert_eq!(
            format_line("[]", "scan", "", Phase::CleanupInProgress),
            "[]:scan(): cleaning up"
        );
        assert_eq!(
            format_line("[A:1-B:x]", "put", "1, users", Phase::SetupComplete),
            "[A:1-B:x]:put(1, users): setup complete"
        );
    }

    #[test]
    fn test_reporter_advances_on_complete() {
        let sink = MemorySink::new();
        let mut reporter = Reporter::new(sink.clone());
        reporter.begin(2);
        for phase in [
            Phase::Start,
            Phase::SetupComplete,
            Phase::Running,
            Phase::Finished,
            Phase::CleanupInProgress,
            Phase::Complete,
        ] {
            reporter.phase("[]", "scan", "", phase);
        }
        reporter.finish();

        assert_eq!(sink.lines().len(), 6);
        assert_eq!(sink.lines()[5], "[]:scan(): complete");
        assert_eq!(sink.planned(), 2);
        assert_eq!(sink.completed(), 1);
        assert!(sink.is_finished());
    }
}
