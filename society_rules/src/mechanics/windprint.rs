//! Windprint Rig modes and their fixed effect tables.

use serde::{Deserialize, Serialize};

/// The rig's two modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindprintMode {
    /// Softness: widens timing, reduces clutter.
    Cushion,
    /// Boundaries: pins rhythms, creates consent gates.
    Guard,
}

impl WindprintMode {
    /// Tag recorded on rewrite events.
    pub fn as_str(&self) -> &'static str {
        match self {
            WindprintMode::Cushion => "cushion",
            WindprintMode::Guard => "guard",
        }
    }

    /// Trade-offs paid while the mode is active.
    pub fn costs(&self) -> &'static [ModeCost] {
        match self {
            WindprintMode::Cushion => &CUSHION_COSTS,
            WindprintMode::Guard => &GUARD_COSTS,
        }
    }
}

impl std::fmt::Display for WindprintMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trade-off incurred while a mode is active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeCost {
    pub label: &'static str,
    pub description: &'static str,
    /// 0.0 - 1.0 severity.
    pub magnitude: f64,
}

pub const CUSHION_COSTS: [ModeCost; 2] = [
    ModeCost {
        label: "Entropy Bleed",
        description: "Visual noise increases in adjacent, un-cushioned areas.",
        magnitude: 0.3,
    },
    ModeCost {
        label: "Platform Drift",
        description: "Unexplored platforms may shift while Cushion stabilises the current zone.",
        magnitude: 0.2,
    },
];

pub const GUARD_COSTS: [ModeCost; 2] = [
    ModeCost {
        label: "Route Lock",
        description: "Some alternative routes become inaccessible while Guard pins the path.",
        magnitude: 0.4,
    },
    ModeCost {
        label: "Exploration Narrowing",
        description: "Peripheral areas are less responsive while Guard holds.",
        magnitude: 0.25,
    },
];

/// Cushion mode effect magnitudes.
pub mod cushion {
    pub const TIMING_MULTIPLIER: f64 = 1.5;
    pub const SAFE_POCKET_RATE: f64 = 0.3;
    pub const CLUTTER_REDUCTION: f64 = 0.6;
    pub const HAZARD_SLOWDOWN: f64 = 0.5;
    pub const WIND_IMPACT_REDUCTION: f64 = 0.8;
}

/// Guard mode effect magnitudes.
pub mod guard {
    pub const RHYTHM_PIN_STRENGTH: f64 = 0.8;
    pub const JITTER_STABILISATION: f64 = 0.9;
    /// Meters.
    pub const EDGE_CLAIM_RANGE: f64 = 3.0;
    /// Seconds.
    pub const BOUNDARY_HOLD_DURATION: f64 = 5.0;
    /// Fraction of alternative routes still open while Guard is active.
    pub const ROUTE_FLEXIBILITY: f64 = 0.5;
}

pub const ENERGY_MAX: f64 = 100.0;
/// Per second, only while no mode is active.
pub const ENERGY_REGEN: f64 = 5.0;
/// Paid when flipping directly between modes.
pub const MODE_SWITCH_COST: f64 = 5.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_tags() {
        assert_eq!(WindprintMode::Cushion.as_str(), "cushion");
        assert_eq!(WindprintMode::Guard.to_string(), "guard");
    }

    #[test]
    fn test_every_mode_has_costs() {
        assert_eq!(WindprintMode::Cushion.costs().len(), 2);
        assert!(WindprintMode::Guard
            .costs()
            .iter()
            .all(|c| c.magnitude > 0.0 && c.magnitude <= 1.0));
    }
}
