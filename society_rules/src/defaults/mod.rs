//! Defaults - the rewritable assumptions every system reads from.
//!
//! A default has two fixed endpoints. It starts at the rigid value and, once
//! the player has read it, can be rewritten to the accommodating value.

mod catalog;
mod registry;

pub use catalog::*;
pub use registry::*;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which aspect of the Society a default governs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefaultCategory {
    /// Speed expectations, window widths.
    Timing,
    /// Visual density, audio load, clutter.
    Sensory,
    /// Path strictness, alternatives.
    Routing,
    /// Communication norms, expression modes.
    Social,
    /// Penalty severity, retry cost.
    Failure,
    /// Gate presence, opt-in and opt-out.
    Consent,
}

impl DefaultCategory {
    /// All categories in declaration order.
    pub const ALL: [DefaultCategory; 6] = [
        DefaultCategory::Timing,
        DefaultCategory::Sensory,
        DefaultCategory::Routing,
        DefaultCategory::Social,
        DefaultCategory::Failure,
        DefaultCategory::Consent,
    ];

    /// Upper-case name used in summaries.
    pub fn name(&self) -> &'static str {
        match self {
            DefaultCategory::Timing => "TIMING",
            DefaultCategory::Sensory => "SENSORY",
            DefaultCategory::Routing => "ROUTING",
            DefaultCategory::Social => "SOCIAL",
            DefaultCategory::Failure => "FAILURE",
            DefaultCategory::Consent => "CONSENT",
        }
    }
}

impl std::fmt::Display for DefaultCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Lifecycle position of a single default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DefaultState {
    RigidUnread,
    RigidRead,
    /// Terminal for the session.
    Rewritten,
}

/// Maximum hint length in a [`DefaultSummary`] before truncation.
pub const HINT_LENGTH: usize = 60;

/// Short, player-facing summary of an unread default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultSummary {
    pub key: String,
    pub label: String,
    pub category: DefaultCategory,
    pub hint: String,
}

/// A single rewritable default.
///
/// Identity and endpoints are fixed at construction. The only mutable
/// state is the read/rewritten status and the current value, and those
/// move forward only. Deserialized entries are checked against the same
/// rules before they exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "DefaultEntryRecord")]
pub struct DefaultEntry {
    key: String,
    label: String,
    description: String,
    category: DefaultCategory,
    rigid_value: f64,
    rewritten_value: f64,
    current_value: f64,
    is_read: bool,
    is_rewritten: bool,
}

/// Unchecked wire shape of a [`DefaultEntry`].
#[derive(Deserialize)]
struct DefaultEntryRecord {
    key: String,
    label: String,
    description: String,
    category: DefaultCategory,
    rigid_value: f64,
    rewritten_value: f64,
    current_value: f64,
    is_read: bool,
    is_rewritten: bool,
}

impl TryFrom<DefaultEntryRecord> for DefaultEntry {
    type Error = ConfigError;

    fn try_from(record: DefaultEntryRecord) -> Result<Self, Self::Error> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            owner: format!("default '{}'", record.key),
            reason: reason.to_string(),
        };
        if record.is_rewritten && !record.is_read {
            return Err(invalid("rewritten before it was read"));
        }
        let expected = if record.is_rewritten { record.rewritten_value } else { record.rigid_value };
        if record.current_value != expected {
            return Err(invalid("current value does not match its state"));
        }
        Ok(Self {
            key: record.key,
            label: record.label,
            description: record.description,
            category: record.category,
            rigid_value: record.rigid_value,
            rewritten_value: record.rewritten_value,
            current_value: record.current_value,
            is_read: record.is_read,
            is_rewritten: record.is_rewritten,
        })
    }
}

impl DefaultEntry {
    /// Create a default in its rigid, unread state.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        category: DefaultCategory,
        rigid_value: f64,
        rewritten_value: f64,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
            category,
            rigid_value,
            rewritten_value,
            current_value: rigid_value,
            is_read: false,
            is_rewritten: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> DefaultCategory {
        self.category
    }

    pub fn rigid_value(&self) -> f64 {
        self.rigid_value
    }

    pub fn rewritten_value(&self) -> f64 {
        self.rewritten_value
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    pub fn is_read(&self) -> bool {
        self.is_read
    }

    pub fn is_rewritten(&self) -> bool {
        self.is_rewritten
    }

    /// Current lifecycle position.
    pub fn state(&self) -> DefaultState {
        match (self.is_read, self.is_rewritten) {
            (_, true) => DefaultState::Rewritten,
            (true, false) => DefaultState::RigidRead,
            (false, false) => DefaultState::RigidUnread,
        }
    }

    /// Read Default: reveal the assumption.
    ///
    /// Always succeeds. Reading again returns the same text and changes
    /// nothing further.
    pub fn read(&mut self) -> String {
        self.is_read = true;
        self.describe()
    }

    /// Rewrite Default: switch to the accommodating value.
    ///
    /// Returns `false` without touching state when the default has not been
    /// read. Rewriting an already rewritten default is a successful no-op.
    pub fn rewrite(&mut self) -> bool {
        if !self.is_read {
            return false;
        }
        self.is_rewritten = true;
        self.current_value = self.rewritten_value;
        true
    }

    /// Text revealed by [`read`](Self::read).
    pub fn describe(&self) -> String {
        format!(
            "[{}]\n  Assumption: {}\n  Current value: {}\n  Rigid default: {}",
            self.label, self.description, self.current_value, self.rigid_value
        )
    }

    /// Summary used when scanning an area.
    pub fn summary(&self) -> DefaultSummary {
        let hint = if self.description.chars().count() > HINT_LENGTH {
            let cut: String = self.description.chars().take(HINT_LENGTH).collect();
            format!("{}…", cut)
        } else {
            self.description.clone()
        };

        DefaultSummary {
            key: self.key.clone(),
            label: self.label.clone(),
            category: self.category,
            hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing_window() -> DefaultEntry {
        DefaultEntry::new(
            "timing_window",
            "Timing Window Width",
            "Assumes all players react within 200 ms.",
            DefaultCategory::Timing,
            0.2,
            0.5,
        )
    }

    #[test]
    fn test_new_default_is_rigid() {
        let entry = timing_window();
        assert_eq!(entry.current_value(), 0.2);
        assert_eq!(entry.state(), DefaultState::RigidUnread);
        assert!(!entry.is_read());
        assert!(!entry.is_rewritten());
    }

    #[test]
    fn test_rewrite_requires_read() {
        let mut entry = timing_window();
        assert!(!entry.rewrite());
        assert_eq!(entry.current_value(), 0.2);
        assert_eq!(entry.state(), DefaultState::RigidUnread);
    }

    #[test]
    fn test_read_then_rewrite() {
        let mut entry = timing_window();
        let text = entry.read();
        assert!(text.contains("Timing Window Width"));
        assert!(text.contains("200 ms"));
        assert_eq!(entry.state(), DefaultState::RigidRead);

        assert!(entry.rewrite());
        assert_eq!(entry.current_value(), 0.5);
        assert_eq!(entry.state(), DefaultState::Rewritten);
    }

    #[test]
    fn test_read_is_idempotent() {
        let mut entry = timing_window();
        let first = entry.read();
        let second = entry.read();
        assert_eq!(first, second);
        assert_eq!(entry.current_value(), 0.2);
    }

    #[test]
    fn test_repeated_rewrite_is_success() {
        let mut entry = timing_window();
        entry.read();
        assert!(entry.rewrite());
        assert!(entry.rewrite());
        assert_eq!(entry.current_value(), 0.5);
    }

    #[test]
    fn test_summary_truncates_long_hint() {
        let entry = DefaultEntry::new(
            "visual_clutter",
            "Visual Density",
            "All particle effects, decorations, and ambient motion rendered simultaneously.",
            DefaultCategory::Sensory,
            1.0,
            0.4,
        );
        let summary = entry.summary();
        assert!(summary.hint.ends_with('…'));
        assert_eq!(summary.hint.chars().count(), HINT_LENGTH + 1);

        let short = timing_window().summary();
        assert_eq!(short.hint, "Assumes all players react within 200 ms.");
        assert_eq!(short.category, DefaultCategory::Timing);
    }

    #[test]
    fn test_deserialize_keeps_consistent_entry() {
        let mut entry = timing_window();
        entry.read();
        entry.rewrite();
        let json = serde_json::to_string(&entry).unwrap();
        let back: DefaultEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.state(), DefaultState::Rewritten);
        assert_eq!(back.current_value(), 0.5);
    }

    #[test]
    fn test_deserialize_rejects_unread_rewrite() {
        let json = r#"{"key":"timing_window","label":"Timing","description":"d",
            "category":"Timing","rigid_value":0.2,"rewritten_value":0.5,
            "current_value":42.0,"is_read":false,"is_rewritten":true}"#;
        let err = serde_json::from_str::<DefaultEntry>(json).unwrap_err();
        assert!(err.to_string().contains("rewritten before it was read"));
    }

    #[test]
    fn test_deserialize_rejects_drifted_value() {
        let json = r#"{"key":"timing_window","label":"Timing","description":"d",
            "category":"Timing","rigid_value":0.2,"rewritten_value":0.5,
            "current_value":42.0,"is_read":true,"is_rewritten":true}"#;
        let err = serde_json::from_str::<DefaultEntry>(json).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }
}
