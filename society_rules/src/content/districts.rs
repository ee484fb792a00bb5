//! The Society's districts and their drift levels.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::defaults::DefaultsRegistry;
use crate::error::{ConfigError, ConfigResult};

const BUILTIN_DISTRICTS: &str = include_str!("../../data/districts.toml");

/// A district within the Society.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color_theme: String,
    pub wind_pattern: String,
    /// Drift corruption from 0.0 (resolved) to 1.0 (full).
    #[serde(default = "full_drift")]
    pub drift_level: f64,
    #[serde(default)]
    pub defaults_present: Vec<String>,
    #[serde(default)]
    pub is_unlocked: bool,
}

fn full_drift() -> f64 {
    1.0
}

impl District {
    /// Lower drift, clamped at zero.
    pub fn reduce_drift(&mut self, amount: f64) {
        self.drift_level = (self.drift_level - amount).max(0.0);
    }
}

#[derive(Debug, Deserialize)]
struct DistrictFile {
    #[serde(default)]
    district: Vec<District>,
}

/// All districts, in file order.
#[derive(Debug, Clone, Default)]
pub struct DistrictMap {
    districts: Vec<District>,
}

impl DistrictMap {
    pub fn parse(source: &str) -> ConfigResult<Self> {
        let file: DistrictFile = toml::from_str(source)?;

        let mut seen = HashSet::new();
        for district in &file.district {
            if !seen.insert(district.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    kind: "district",
                    id: district.id.clone(),
                });
            }
        }

        Ok(Self {
            districts: file.district,
        })
    }

    pub fn load(source: &str, registry: &DefaultsRegistry) -> ConfigResult<Self> {
        let map = Self::parse(source)?;
        map.validate(registry)?;
        Ok(map)
    }

    pub fn builtin(registry: &DefaultsRegistry) -> ConfigResult<Self> {
        Self::load(BUILTIN_DISTRICTS, registry)
    }

    pub fn validate(&self, registry: &DefaultsRegistry) -> ConfigResult<()> {
        for district in &self.districts {
            registry.ensure_keys(
                &format!("district '{}'", district.id),
                district.defaults_present.iter().map(String::as_str),
            )?;
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&District> {
        self.districts.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut District> {
        self.districts.iter_mut().find(|d| d.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &District> {
        self.districts.iter()
    }

    pub fn len(&self) -> usize {
        self.districts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}
