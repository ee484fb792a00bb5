//! Events - the decoupled channel between the verb interface and consumers.

mod bus;

pub use bus::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Well-known event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    // Translation verbs
    DefaultRead,
    DefaultRewritten,
    DefaultsChanged,

    // Windprint rig
    ModeSwitched,

    // Pattern intervention
    VerbUsed,
    PatternResolved,
    EncounterStarted,
    EncounterCompleted,

    // Narrative
    ChapterAdvanced,
    CivicRuleRestored,

    // World
    DriftReduced,
    DistrictEntered,
}

/// A single emitted event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_type: EventType,
    pub payload: BTreeMap<String, Value>,
    /// Originating component, for diagnostics only.
    pub source: String,
}

impl Event {
    /// Create an event with an empty payload.
    pub fn new(event_type: EventType, source: impl Into<String>) -> Self {
        Self {
            event_type,
            payload: BTreeMap::new(),
            source: source.into(),
        }
    }

    /// Add a payload field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Payload field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }

    /// String payload field by name.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The `key` field carried by default lifecycle events.
    pub fn default_key(&self) -> Option<&str> {
        self.get_str("key")
    }
}
