//! Distortions: places where a rigid default warps the world.
//!
//! Each distortion names the registry key that causes it. Rewriting that
//! default is what resolves it.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::defaults::DefaultsRegistry;
use crate::error::{ConfigError, ConfigResult};

const BUILTIN_DISTORTIONS: &str = include_str!("../../data/distortions.toml");

/// How a rigid default shows up in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistortionType {
    /// Geometry that rewrites its own rules.
    ContradictorySpace,
    /// Garbled communication.
    SignalCorruption,
    /// A path that punishes the unexpected route.
    PathwayPenalty,
    /// One assumed reaction speed.
    TimingLock,
    /// Too much at once.
    SensoryFlood,
}

impl DistortionType {
    pub const ALL: [DistortionType; 5] = [
        DistortionType::ContradictorySpace,
        DistortionType::SignalCorruption,
        DistortionType::PathwayPenalty,
        DistortionType::TimingLock,
        DistortionType::SensoryFlood,
    ];

    /// Player-facing nudge toward the default behind the distortion.
    pub fn hint(&self) -> &'static str {
        match self {
            DistortionType::ContradictorySpace => {
                "This space changes its own rules. Look for the timing assumption."
            }
            DistortionType::SignalCorruption => {
                "The signal is garbled. Something assumes one communication mode."
            }
            DistortionType::PathwayPenalty => {
                "This path punishes you for not taking the 'expected' route."
            }
            DistortionType::TimingLock => "Everything here assumes you react at one speed.",
            DistortionType::SensoryFlood => {
                "Too much happening at once. The density default is too high."
            }
        }
    }
}

/// A warped place in the world, tied to one default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distortion {
    pub id: String,
    pub distortion_type: DistortionType,
    pub description: String,
    /// 0.0 (gone) to 1.0 (overwhelming).
    #[serde(default = "default_severity")]
    pub severity: f64,
    /// Registry key whose rewrite resolves this distortion.
    pub linked_default: String,
    #[serde(default)]
    pub is_resolved: bool,
}

fn default_severity() -> f64 {
    0.8
}

impl Distortion {
    pub fn hint(&self) -> &'static str {
        self.distortion_type.hint()
    }

    pub fn resolve(&mut self) {
        self.is_resolved = true;
        self.severity = 0.0;
    }
}

#[derive(Debug, Deserialize)]
struct DistortionFile {
    #[serde(default)]
    distortion: Vec<Distortion>,
}

/// All distortions, in file order.
#[derive(Debug, Clone, Default)]
pub struct DistortionSet {
    distortions: Vec<Distortion>,
}

impl DistortionSet {
    /// Parse, rejecting duplicate ids and out-of-range severity.
    pub fn parse(source: &str) -> ConfigResult<Self> {
        let file: DistortionFile = toml::from_str(source)?;

        let mut seen = HashSet::new();
        for distortion in &file.distortion {
            if !seen.insert(distortion.id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    kind: "distortion",
                    id: distortion.id.clone(),
                });
            }
            if !(0.0..=1.0).contains(&distortion.severity) {
                return Err(ConfigError::InvalidValue {
                    owner: format!("distortion '{}'", distortion.id),
                    reason: format!("severity {} outside 0.0..=1.0", distortion.severity),
                });
            }
        }

        Ok(Self {
            distortions: file.distortion,
        })
    }

    pub fn load(source: &str, registry: &DefaultsRegistry) -> ConfigResult<Self> {
        let set = Self::parse(source)?;
        set.validate(registry)?;
        Ok(set)
    }

    pub fn builtin(registry: &DefaultsRegistry) -> ConfigResult<Self> {
        Self::load(BUILTIN_DISTORTIONS, registry)
    }

    pub fn validate(&self, registry: &DefaultsRegistry) -> ConfigResult<()> {
        for distortion in &self.distortions {
            registry.ensure_keys(
                &format!("distortion '{}'", distortion.id),
                [distortion.linked_default.as_str()],
            )?;
        }
        Ok(())
    }

    /// Resolve every open distortion whose linked default is rewritten.
    ///
    /// Returns the ids resolved by this call.
    pub fn resolve_rewritten(&mut self, registry: &DefaultsRegistry) -> Vec<String> {
        let mut resolved = Vec::new();
        for distortion in self.distortions.iter_mut().filter(|d| !d.is_resolved) {
            let rewritten = registry
                .get_default(&distortion.linked_default)
                .is_some_and(|entry| entry.is_rewritten());
            if rewritten {
                distortion.resolve();
                resolved.push(distortion.id.clone());
            }
        }
        resolved
    }

    pub fn get(&self, id: &str) -> Option<&Distortion> {
        self.distortions.iter().find(|d| d.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Distortion> {
        self.distortions.iter_mut().find(|d| d.id == id)
    }

    /// Unresolved distortions.
    pub fn active(&self) -> impl Iterator<Item = &Distortion> {
        self.distortions.iter().filter(|d| !d.is_resolved)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Distortion> {
        self.distortions.iter()
    }

    pub fn len(&self) -> usize {
        self.distortions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distortions.is_empty()
    }
}
