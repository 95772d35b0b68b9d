//! Open/closed state of collapsible containers.
//!
//! The engine only reads this state. It is owned by the host and changed by its
//! toggle handler (`window.toggleBox` in the generated markup).

use std::collections::HashMap;

/// Visual state of one container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BoxVisibility {
    Open,
    #[default]
    Closed,
}

impl BoxVisibility {
    #[must_use]
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Open => Self::Closed,
            Self::Closed => Self::Open,
        }
    }
}

/// Read access to container state, keyed by container id.
pub trait BoxStateLookup {
    /// State of the container with this id. Unknown ids are closed.
    fn lookup_box_state(&self, id: &str) -> BoxVisibility;
}

/// Mapping from container id to its visual state.
///
/// # Example
///
/// ```
/// use bbx_renderer::{BoxState, BoxStateLookup, BoxVisibility};
///
/// let mut state = BoxState::new();
/// state.toggle("box-0");
/// assert_eq!(state.lookup_box_state("box-0"), BoxVisibility::Open);
/// assert_eq!(state.lookup_box_state("box-1"), BoxVisibility::Closed);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct BoxState {
    states: HashMap<String, BoxVisibility>,
}

impl BoxState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the state of a container.
    pub fn set(&mut self, id: impl Into<String>, visibility: BoxVisibility) {
        self.states.insert(id.into(), visibility);
    }

    /// Flip a container between open and closed, returning the new state.
    pub fn toggle(&mut self, id: &str) -> BoxVisibility {
        let next = self.lookup_box_state(id).toggled();
        self.states.insert(id.to_owned(), next);
        next
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl BoxStateLookup for BoxState {
    fn lookup_box_state(&self, id: &str) -> BoxVisibility {
        self.states.get(id).copied().unwrap_or_default()
    }
}

impl BoxStateLookup for HashMap<String, BoxVisibility> {
    fn lookup_box_state(&self, id: &str) -> BoxVisibility {
        self.get(id).copied().unwrap_or_default()
    }
}

impl FromIterator<(String, BoxVisibility)> for BoxState {
    fn from_iter<T: IntoIterator<Item = (String, BoxVisibility)>>(iter: T) -> Self {
        Self {
            states: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_is_closed() {
        let state = BoxState::new();
        assert_eq!(state.lookup_box_state("missing"), BoxVisibility::Closed);
        assert!(state.is_empty());
    }

    #[test]
    fn test_set_and_lookup() {
        let mut state = BoxState::new();
        state.set("box-3", BoxVisibility::Open);
        assert!(state.lookup_box_state("box-3").is_open());
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut state = BoxState::new();
        assert_eq!(state.toggle("a"), BoxVisibility::Open);
        assert_eq!(state.toggle("a"), BoxVisibility::Closed);
    }

    #[test]
    fn test_hash_map_lookup() {
        let map: HashMap<String, BoxVisibility> =
            [("x".to_owned(), BoxVisibility::Open)].into_iter().collect();
        assert!(map.lookup_box_state("x").is_open());
        assert!(!map.lookup_box_state("y").is_open());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_state_file() {
        let state: BoxState =
            serde_json::from_str(r#"{"box-0": "open", "box-1": "closed"}"#).unwrap();
        assert!(state.lookup_box_state("box-0").is_open());
        assert!(!state.lookup_box_state("box-1").is_open());
    }
}
