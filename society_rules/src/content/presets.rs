//! Accessibility presets: named, read-only override bundles.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::defaults::DefaultsRegistry;
use crate::error::{ConfigError, ConfigResult};

const BUILTIN_PRESETS: &str = include_str!("../../data/presets.toml");

/// A named set of override values.
///
/// Applying a preset never mutates the registry; consumers see it only
/// through an overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub overrides: BTreeMap<String, f64>,
}

impl Preset {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, value: f64) -> Self {
        self.overrides.insert(key.into(), value);
        self
    }

    /// Override for `key`, if the preset sets one.
    pub fn override_for(&self, key: &str) -> Option<f64> {
        self.overrides.get(key).copied()
    }

    /// Reject unknown keys and non-finite or negative values.
    pub fn validate(&self, registry: &DefaultsRegistry) -> ConfigResult<()> {
        let owner = format!("preset '{}'", self.id);
        registry.ensure_keys(&owner, self.overrides.keys().map(String::as_str))?;
        validate_override_values(&owner, &self.overrides)
    }
}

/// Shared value check for presets and player compositions.
pub fn validate_override_values(owner: &str, overrides: &BTreeMap<String, f64>) -> ConfigResult<()> {
    for (key, value) in overrides {
        if !value.is_finite() || *value < 0.0 {
            return Err(ConfigError::InvalidValue {
                owner: owner.to_string(),
                reason: format!("override '{}' = {} must be finite and non-negative", key, value),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    preset: Vec<Preset>,
}

/// The preset catalog, in file order.
#[derive(Debug, Clone, Default)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    /// Parse a TOML catalog without registry validation.
    pub fn parse(source: &str) -> ConfigResult<Self> {
        let file: PresetFile = toml::from_str(source)?;

        let mut seen = HashSet::new();
        for preset in &file.preset {
            if !seen.insert(preset.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    kind: "preset",
                    id: preset.id.clone(),
                });
            }
        }

        Ok(Self {
            presets: file.preset,
        })
    }

    /// Parse and validate against `registry`.
    pub fn load(source: &str, registry: &DefaultsRegistry) -> ConfigResult<Self> {
        let catalog = Self::parse(source)?;
        catalog.validate(registry)?;
        log::debug!("loaded {} presets", catalog.len());
        Ok(catalog)
    }

    /// The embedded built-in presets.
    pub fn builtin(registry: &DefaultsRegistry) -> ConfigResult<Self> {
        Self::load(BUILTIN_PRESETS, registry)
    }

    pub fn validate(&self, registry: &DefaultsRegistry) -> ConfigResult<()> {
        self.presets.iter().try_for_each(|p| p.validate(registry))
    }

    pub fn get(&self, id: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
