//! Per-render mutable state.

use std::collections::HashMap;

/// State threaded through one full-document render and discarded afterwards.
#[derive(Debug, Default)]
pub struct ParseContext {
    /// Bodies of extracted `[code]` regions, in order of appearance.
    pub code_blocks: Vec<String>,
    /// How many containers were rendered for each label.
    pub box_counts: HashMap<String, usize>,
    /// Number of profile links rendered so far; the next link gets this value.
    pub profile_cards: usize,
    /// Advisory diagnostics for rejected constructs.
    pub warnings: Vec<String>,
}

impl ParseContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more container with this label.
    pub(crate) fn count_box(&mut self, label: &str) {
        *self.box_counts.entry(label.to_owned()).or_default() += 1;
    }

    /// Take the next profile-card sequence number.
    pub(crate) fn next_profile_card(&mut self) -> usize {
        let next = self.profile_cards;
        self.profile_cards += 1;
        next
    }

    /// Record a diagnostic for the host to report.
    pub(crate) fn warn(&mut self, message: String) {
        tracing::debug!("{message}");
        self.warnings.push(message);
    }
}
