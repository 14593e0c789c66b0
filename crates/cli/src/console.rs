//! Plain status lines on stderr.

use std::io::{self, Write};

use srcbatch_engine::{ProgressReporter, StatusBar};
use tracing::debug;

/// Prints `[<label> <elapsed>s] <message>` for every progress notification.
pub struct ConsoleProgress<W> {
    bar: StatusBar,
    out: W,
}

impl ConsoleProgress<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> ConsoleProgress<W> {
    pub fn new(out: W) -> Self {
        Self {
            bar: StatusBar::default(),
            out,
        }
    }

    fn print(&mut self) {
        let line = format_line(self.bar.label(), self.bar.runtime().as_secs(), self.bar.message());
        // A closed stderr must not abort the run.
        if let Err(error) = writeln!(self.out, "{line}") {
            debug!(error = %error, "failed to write progress line");
        }
    }
}

impl<W: Write + Send> ProgressReporter for ConsoleProgress<W> {
    fn reset(&mut self, label: &str, message: &str) {
        self.bar.reset(label, message);
        self.print();
    }

    fn update(&mut self, message: &str) {
        self.bar.update(message);
        self.print();
    }

    fn complete(&mut self, message: &str) {
        self.bar.complete(message);
        self.print();
    }
}

fn format_line(label: &str, elapsed_secs: u64, message: &str) -> String {
    format!("[{label} {elapsed_secs}s] {message}")
}
