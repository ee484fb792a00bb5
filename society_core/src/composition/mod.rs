//! Preset and composition layer.
//!
//! Presets and player compositions are override maps layered over the
//! registry at read time. Nothing in this module writes to the registry.

use serde::{Deserialize, Serialize};
use society_rules::{
    validate_override_values, ConfigResult, DefaultCategory, DefaultsRegistry, Preset,
    ValueSource,
};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Read-only view: override if present, registry value otherwise.
#[derive(Debug, Clone, Copy)]
pub struct PresetOverlay<'a> {
    registry: &'a DefaultsRegistry,
    overrides: Option<&'a BTreeMap<String, f64>>,
}

impl<'a> PresetOverlay<'a> {
    pub fn new(registry: &'a DefaultsRegistry, overrides: &'a BTreeMap<String, f64>) -> Self {
        Self {
            registry,
            overrides: Some(overrides),
        }
    }

    /// Overlay with no overrides; reads straight through to the registry.
    pub fn passthrough(registry: &'a DefaultsRegistry) -> Self {
        Self {
            registry,
            overrides: None,
        }
    }

    pub fn of_preset(registry: &'a DefaultsRegistry, preset: &'a Preset) -> Self {
        Self::new(registry, &preset.overrides)
    }

    /// Effective value for `key`. Unknown keys stay `None` even if an
    /// override names them.
    pub fn effective_value(&self, key: &str) -> Option<f64> {
        let base = self.registry.get(key)?;
        Some(self.override_for(key).unwrap_or(base))
    }

    pub fn override_for(&self, key: &str) -> Option<f64> {
        self.overrides.and_then(|o| o.get(key).copied())
    }

    /// Whether the overlay changes what consumers see for `key`.
    pub fn is_overridden(&self, key: &str) -> bool {
        self.override_for(key).is_some()
    }

    pub fn registry(&self) -> &'a DefaultsRegistry {
        self.registry
    }
}

impl ValueSource for PresetOverlay<'_> {
    fn value(&self, key: &str) -> Option<f64> {
        self.effective_value(key)
    }
}

/// Unique identifier for a player-composed preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetId(pub Uuid);

impl PresetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PresetId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PresetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A preset the player arranged themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposedPreset {
    pub id: PresetId,
    pub name: String,
    pub note: Option<String>,
    pub overrides: BTreeMap<String, f64>,
}

impl ComposedPreset {
    pub fn new(name: impl Into<String>, overrides: BTreeMap<String, f64>) -> Self {
        Self {
            id: PresetId::new(),
            name: name.into(),
            note: None,
            overrides,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Reject unknown keys and out-of-range values.
    pub fn validate(&self, registry: &DefaultsRegistry) -> ConfigResult<()> {
        let owner = format!("composed preset '{}'", self.name);
        registry.ensure_keys(&owner, self.overrides.keys().map(String::as_str))?;
        validate_override_values(&owner, &self.overrides)
    }

    /// Convert into a catalog-style preset.
    pub fn to_preset(&self) -> Preset {
        Preset {
            id: self.id.to_string(),
            name: self.name.clone(),
            description: self.note.clone().unwrap_or_default(),
            overrides: self.overrides.clone(),
        }
    }
}

/// One card on the composition board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionCard {
    pub key: String,
    pub label: String,
    pub is_rewritten: bool,
    pub current_value: f64,
    pub rigid_value: f64,
    pub rewritten_value: f64,
}

/// Every default grouped by category, for the player to arrange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionBoard {
    /// Category name -> cards in registration order.
    pub categories: BTreeMap<String, Vec<CompositionCard>>,
    pub rewrite_progress: f64,
}

impl CompositionBoard {
    pub fn from_registry(registry: &DefaultsRegistry) -> Self {
        let categories = DefaultCategory::ALL
            .iter()
            .map(|&category| {
                let cards = registry
                    .by_category(category)
                    .into_iter()
                    .map(|d| CompositionCard {
                        key: d.key().to_string(),
                        label: d.label().to_string(),
                        is_rewritten: d.is_rewritten(),
                        current_value: d.current_value(),
                        rigid_value: d.rigid_value(),
                        rewritten_value: d.rewritten_value(),
                    })
                    .collect();
                (category.name().to_string(), cards)
            })
            .collect();

        Self {
            categories,
            rewrite_progress: registry.progress(),
        }
    }

    /// Overrides that pin every rewritten default at its rewritten value.
    pub fn rewritten_overrides(&self) -> BTreeMap<String, f64> {
        self.categories
            .values()
            .flatten()
            .filter(|card| card.is_rewritten)
            .map(|card| (card.key.clone(), card.rewritten_value))
            .collect()
    }
}
