//! Console Sinks

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Destination for progress lines.
///
/// Emission is ordered and best effort; nothing is ever read back.
pub trait ConsoleSink {
    /// Write one line
    fn emit(&mut self, line: &str);

    /// A run with `total` timed loops is starting
    fn start(&mut self, _total: u64) {}

    /// One timed loop completed
    fn advance(&mut self) {}

    /// The run ended
    fn finish(&mut self) {}
}

/// Plain lines on stdout
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ConsoleSink for StdoutSink {
    fn emit(&mut self, line: &str) {
        println!("{}", line);
    }
}

/// Lines printed above an indicatif progress bar counting timed loops.
///
/// Lines go to their own writer (stdout by default) with the bar suspended,
/// so they are kept even when the bar is hidden because stderr is not a
/// terminal.
pub struct ProgressSink {
    bar: Option<ProgressBar>,
    target: Option<ProgressDrawTarget>,
    out: Box<dyn Write>,
}

impl ProgressSink {
    /// Bar drawn on stderr
    pub fn new() -> Self {
        Self {
            bar: None,
            target: None,
            out: Box::new(std::io::stdout()),
        }
    }

    /// Bar drawn to a specific target
    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::new()
        }
    }

    /// Lines written to `out` instead of stdout
    pub fn with_writer(mut self, out: impl Write + 'static) -> Self {
        self.out = Box::new(out);
        self
    }

    /// Number of timed loops advanced so far
    pub fn position(&self) -> u64 {
        self.bar.as_ref().map_or(0, ProgressBar::position)
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleSink for ProgressSink {
    fn emit(&mut self, line: &str) {
        let out = &mut self.out;
        match &self.bar {
            Some(pb) => pb.suspend(|| {
                let _ = writeln!(out, "{}", line);
            }),
            None => {
                let _ = writeln!(out, "{}", line);
            }
        }
    }

    fn start(&mut self, total: u64) {
        let pb = match self.target.take() {
            Some(target) => ProgressBar::with_draw_target(Some(total), target),
            None => ProgressBar::new(total),
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Running");
        self.bar = Some(pb);
    }

    fn advance(&mut self) {
        if let Some(pb) = &self.bar {
            pb.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(pb) = &self.bar {
            pb.finish_with_message("Complete");
        }
    }
}

#[derive(Debug, Default)]
struct MemoryLog {
    lines: Vec<String>,
    planned: u64,
    completed: u64,
    finished: bool,
}

/// Shared in-memory buffer; clones observe the same log
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    log: Rc<RefCell<MemoryLog>>,
}

impl MemorySink {
    /// Empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.log.borrow().lines.clone()
    }

    /// Total announced by the last `start`
    pub fn planned(&self) -> u64 {
        self.log.borrow().planned
    }

    /// Timed loops advanced
    pub fn completed(&self) -> u64 {
        self.log.borrow().completed
    }

    /// Whether `finish` was called
    pub fn is_finished(&self) -> bool {
        self.log.borrow().finished
    }
}

impl ConsoleSink for MemorySink {
    fn emit(&mut self, line: &str) {
        self.log.borrow_mut().lines.push(line.to_string());
    }

    fn start(&mut self, total: u64) {
        self.log.borrow_mut().planned = total;
    }

    fn advance(&mut self) {
        self.log.borrow_mut().completed += 1;
    }

    fn finish(&mut self) {
        self.log.borrow_mut().finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer whose bytes stay readable after the sink takes ownership
    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    #[test]
    fn test_hidden_bar_keeps_lines() {
        let out = Captured::default();
        let mut sink =
            ProgressSink::with_draw_target(ProgressDrawTarget::hidden()).with_writer(out.clone());
        sink.emit("before start");
        sink.start(1);
        sink.emit("[Size:10]:Insert(1024): starting");
        sink.advance();
        sink.emit("[Size:10]:Insert(1024): complete");
        sink.finish();

        assert_eq!(
            out.text(),
            "before start\n[Size:10]:Insert(1024): starting\n[Size:10]:Insert(1024): complete\n"
        );
    }

    #[test]
    fn test_progress_sink_counts_loops() {
        let mut sink = ProgressSink::with_draw_target(ProgressDrawTarget::hidden())
            .with_writer(std::io::sink());
        assert_eq!(sink.position(), 0);
        sink.start(3);
        sink.emit("[]:scan(): starting");
        sink.advance();
        sink.advance();
        assert_eq!(sink.position(), 2);
        sink.finish();
    }

    #[test]
    fn test_memory_sink_clones_share_log() {
        let sink = MemorySink::new();
        let mut writer = sink.clone();
        writer.emit("one");
        writer.emit("two");
        assert_eq!(sink.lines(), vec!["one", "two"]);
        assert!(!sink.is_finished());
    }
}
