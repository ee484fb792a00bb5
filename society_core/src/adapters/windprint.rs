//! Windprint Rig: the player's dual-mode tool.
//!
//! The rig owns only its own mode and energy. Timing and route values are
//! read from a [`ValueSource`] on every query and modified on the way out.

use serde::{Deserialize, Serialize};
use society_rules::{
    cushion, guard, ModeCost, ValueSource, WindprintMode, ENERGY_MAX, ENERGY_REGEN,
    MODE_SWITCH_COST,
};
use thiserror::Error;

use super::{resolve, AdapterKey, TimingModifier};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RigError {
    #[error("insufficient energy to switch to {mode}: need {required}, have {available}")]
    InsufficientEnergy {
        mode: WindprintMode,
        required: f64,
        available: f64,
    },
}

/// Effect magnitudes granted by a mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ModeEffects {
    Cushion {
        timing_multiplier: f64,
        clutter_reduction: f64,
        hazard_slowdown: f64,
        safe_pocket_rate: f64,
    },
    Guard {
        rhythm_pin_strength: f64,
        jitter_stabilisation: f64,
        consent_gates: bool,
        edge_claim_range: f64,
    },
}

impl ModeEffects {
    pub fn of(mode: WindprintMode) -> Self {
        match mode {
            WindprintMode::Cushion => ModeEffects::Cushion {
                timing_multiplier: cushion::TIMING_MULTIPLIER,
                clutter_reduction: cushion::CLUTTER_REDUCTION,
                hazard_slowdown: cushion::HAZARD_SLOWDOWN,
                safe_pocket_rate: cushion::SAFE_POCKET_RATE,
            },
            WindprintMode::Guard => ModeEffects::Guard {
                rhythm_pin_strength: guard::RHYTHM_PIN_STRENGTH,
                jitter_stabilisation: guard::JITTER_STABILISATION,
                consent_gates: true,
                edge_claim_range: guard::EDGE_CLAIM_RANGE,
            },
        }
    }
}

/// A successful activation: what the mode does and what it costs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeActivation {
    pub mode: WindprintMode,
    pub effects: ModeEffects,
    pub costs: &'static [ModeCost],
    /// Energy spent on this activation.
    pub energy_spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindprintRig {
    active_mode: Option<WindprintMode>,
    energy: f64,
}

impl Default for WindprintRig {
    fn default() -> Self {
        Self::new()
    }
}

impl WindprintRig {
    pub fn new() -> Self {
        Self {
            active_mode: None,
            energy: ENERGY_MAX,
        }
    }

    pub fn active_mode(&self) -> Option<WindprintMode> {
        self.active_mode
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Switch to `mode`. Flipping directly from the other mode costs energy.
    pub fn activate(&mut self, mode: WindprintMode) -> Result<ModeActivation, RigError> {
        let cost = match self.active_mode {
            Some(current) if current != mode => MODE_SWITCH_COST,
            _ => 0.0,
        };
        if self.energy < cost {
            return Err(RigError::InsufficientEnergy {
                mode,
                required: cost,
                available: self.energy,
            });
        }

        self.energy -= cost;
        self.active_mode = Some(mode);
        log::debug!("windprint {} active, energy {:.1}", mode, self.energy);

        Ok(ModeActivation {
            mode,
            effects: ModeEffects::of(mode),
            costs: mode.costs(),
            energy_spent: cost,
        })
    }

    pub fn deactivate(&mut self) {
        self.active_mode = None;
    }

    pub fn is_cushion_active(&self) -> bool {
        self.active_mode == Some(WindprintMode::Cushion)
    }

    pub fn is_guard_active(&self) -> bool {
        self.active_mode == Some(WindprintMode::Guard)
    }

    /// Current timing window, widened while Cushion is active.
    pub fn timing_multiplier<S>(&self, source: &S) -> f64
    where
        S: ValueSource + ?Sized,
    {
        let base = resolve(source, AdapterKey::TimingWindow);
        if self.is_cushion_active() {
            base * cushion::TIMING_MULTIPLIER
        } else {
            base
        }
    }

    /// Share of alternative routes open right now.
    pub fn route_flexibility<S>(&self, source: &S) -> f64
    where
        S: ValueSource + ?Sized,
    {
        super::route_flexibility(source, self.active_mode)
    }

    /// Modifier for the movement adapter.
    pub fn timing_modifier(&self) -> TimingModifier {
        if self.is_cushion_active() {
            TimingModifier::CUSHION
        } else {
            TimingModifier::NONE
        }
    }

    /// Regenerate energy while idle.
    pub fn update(&mut self, delta: f64) {
        if self.active_mode.is_none() {
            self.energy = (self.energy + ENERGY_REGEN * delta).min(ENERGY_MAX);
        }
    }
}
