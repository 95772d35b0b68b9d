//! Identifier sources for containers and image-map hotspots.

use std::collections::HashMap;

use uuid::Uuid;

/// Source of identifiers for generated markup.
///
/// Container ids key into [`BoxState`](crate::BoxState); hotspot sequence
/// numbers correlate hover events with the tooltip handler and must stay unique
/// for the whole session, across renders.
pub trait IdGenerator {
    /// Called once at the start of every render.
    fn begin_document(&mut self) {}

    /// Produce a fresh identifier for an element of the given kind (e.g. `"box"`).
    fn generate_id(&mut self, kind: &str) -> String;

    /// Next hotspot sequence number.
    fn next_tooltip_sequence(&mut self) -> u64;
}

/// Ids derived from document order: `box-0`, `box-1`, ...
///
/// Counters restart for every document, so a container keeps its id (and its
/// open/closed state) across edits that do not add or remove containers before
/// it. The tooltip sequence never restarts.
#[derive(Debug, Default)]
pub struct DeterministicIds {
    counters: HashMap<String, usize>,
    tooltip: u64,
}

impl DeterministicIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for DeterministicIds {
    fn begin_document(&mut self) {
        self.counters.clear();
    }

    fn generate_id(&mut self, kind: &str) -> String {
        let counter = self.counters.entry(kind.to_owned()).or_default();
        let id = format!("{kind}-{counter}");
        *counter += 1;
        id
    }

    fn next_tooltip_sequence(&mut self) -> u64 {
        let next = self.tooltip;
        self.tooltip += 1;
        next
    }
}

/// Random ids (`box-3f2a9c1`), fresh on every render.
///
/// State recorded against one render can not be matched to the next one.
#[derive(Debug, Default)]
pub struct RandomIds {
    tooltip: u64,
}

impl RandomIds {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for RandomIds {
    fn generate_id(&mut self, kind: &str) -> String {
        let uuid = Uuid::new_v4().simple().to_string();
        format!("{kind}-{}", &uuid[..7])
    }

    fn next_tooltip_sequence(&mut self) -> u64 {
        let next = self.tooltip;
        self.tooltip += 1;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_ids_per_kind() {
        let mut ids = DeterministicIds::new();
        assert_eq!(ids.generate_id("box"), "box-0");
        assert_eq!(ids.generate_id("box"), "box-1");
        assert_eq!(ids.generate_id("panel"), "panel-0");
    }

    #[test]
    fn test_deterministic_ids_restart_per_document() {
        let mut ids = DeterministicIds::new();
        ids.begin_document();
        ids.generate_id("box");
        ids.begin_document();
        assert_eq!(ids.generate_id("box"), "box-0");
    }

    #[test]
    fn test_tooltip_sequence_survives_documents() {
        let mut ids = DeterministicIds::new();
        assert_eq!(ids.next_tooltip_sequence(), 0);
        ids.begin_document();
        assert_eq!(ids.next_tooltip_sequence(), 1);
    }

    #[test]
    fn test_random_ids_are_distinct() {
        let mut ids = RandomIds::new();
        let a = ids.generate_id("box");
        let b = ids.generate_id("box");
        assert!(a.starts_with("box-"));
        assert_eq!(a.len(), "box-".len() + 7);
        assert_ne!(a, b);
    }
}
