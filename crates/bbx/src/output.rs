//! Diagnostics for the terminal.
//!
//! Everything here goes to stderr: `bbx render` may be writing HTML to stdout,
//! and the two streams must never mix.

use console::{Style, Term};

/// Prefix for constructs the renderer left as source text.
const REJECTED_PREFIX: &str = "warning";

/// Colored stderr writer for render diagnostics.
pub(crate) struct Output {
    term: Term,
    green: Style,
    yellow: Style,
    red: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            red: Style::new().red(),
        }
    }

    /// Plain progress line, e.g. the file that was written.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Green line for a clean `bbx check`.
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// One yellow line per construct the renderer rejected, in document order.
    pub(crate) fn rejected(&self, warnings: &[String]) {
        for warning in warnings {
            let line = rejection_line(warning);
            let _ = self.term.write_line(&self.yellow.apply_to(line).to_string());
        }
    }

    /// Red line for a failed command.
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}

fn rejection_line(warning: &str) -> String {
    format!("{REJECTED_PREFIX}: {warning}")
}
