//! Macro state of a playthrough: chapter flow, drift, civic rules.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::mechanics::{Verb, WindprintMode};

pub const TOTAL_CHAPTERS: u32 = 12;

/// Drift removed per chapter advanced or civic rule restored.
pub const DRIFT_REDUCTION_PER_STEP: f64 = 1.0 / TOTAL_CHAPTERS as f64;

/// Macro phase of the Society.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Phase {
    /// Before the game's timeline.
    AxiomActive,
    StandardDefaults,
    #[default]
    TheDrift,
    AxiomRestoring,
    /// Victory.
    PluralCoherence,
}

/// Qualitative drift bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriftLevel {
    None,
    Low,
    Moderate,
    High,
    Critical,
}

impl DriftLevel {
    /// Band for a drift intensity in 0.0 - 1.0.
    pub fn from_intensity(intensity: f64) -> Self {
        match intensity {
            i if i <= 0.0 => DriftLevel::None,
            i if i <= 0.25 => DriftLevel::Low,
            i if i <= 0.5 => DriftLevel::Moderate,
            i if i <= 0.75 => DriftLevel::High,
            _ => DriftLevel::Critical,
        }
    }
}

/// Top-level mutable state for a single playthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocietyState {
    pub current_chapter: u32,
    pub phase: Phase,
    /// 1.0 = full drift, 0.0 = resolved.
    pub drift_intensity: f64,

    pub civic_rules_restored: BTreeSet<String>,
    pub districts_visited: BTreeSet<String>,

    /// Windprint record, used for finale personalisation.
    pub cushion_uses: u32,
    pub guard_uses: u32,
    pub verb_usage: BTreeMap<Verb, u32>,
}

impl Default for SocietyState {
    fn default() -> Self {
        Self {
            current_chapter: 1,
            phase: Phase::TheDrift,
            drift_intensity: 1.0,
            civic_rules_restored: BTreeSet::new(),
            districts_visited: BTreeSet::new(),
            cushion_uses: 0,
            guard_uses: 0,
            verb_usage: BTreeMap::new(),
        }
    }
}

impl SocietyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to the next chapter. Returns `false` at the final chapter.
    pub fn advance_chapter(&mut self) -> bool {
        if self.current_chapter >= TOTAL_CHAPTERS {
            return false;
        }
        self.current_chapter += 1;
        self.reduce_drift();
        true
    }

    /// Mark a civic rule restored. Returns `false` if it already was.
    pub fn restore_civic_rule(&mut self, rule_id: impl Into<String>) -> bool {
        let inserted = self.civic_rules_restored.insert(rule_id.into());
        if inserted {
            self.reduce_drift();
        }
        inserted
    }

    /// Record a district visit. Returns `true` on the first visit.
    pub fn visit_district(&mut self, district_id: impl Into<String>) -> bool {
        self.districts_visited.insert(district_id.into())
    }

    pub fn record_mode_use(&mut self, mode: WindprintMode) {
        match mode {
            WindprintMode::Cushion => self.cushion_uses += 1,
            WindprintMode::Guard => self.guard_uses += 1,
        }
    }

    pub fn record_verb_use(&mut self, verb: Verb) {
        *self.verb_usage.entry(verb).or_default() += 1;
    }

    fn reduce_drift(&mut self) {
        self.drift_intensity = (self.drift_intensity - DRIFT_REDUCTION_PER_STEP).max(0.0);
        self.update_phase();
    }

    fn update_phase(&mut self) {
        // Float steps of 1/12 can leave a tiny residue above zero.
        if self.drift_intensity <= 1e-9 {
            self.drift_intensity = 0.0;
        }
        self.phase = if self.drift_intensity == 0.0 {
            Phase::PluralCoherence
        } else if self.drift_intensity < 0.5 {
            Phase::AxiomRestoring
        } else {
            Phase::TheDrift
        };
    }

    pub fn drift_level(&self) -> DriftLevel {
        DriftLevel::from_intensity(self.drift_intensity)
    }

    /// Fraction of chapters completed.
    pub fn progress_fraction(&self) -> f64 {
        f64::from(self.current_chapter - 1) / f64::from(TOTAL_CHAPTERS)
    }

    pub fn is_victory(&self) -> bool {
        self.phase == Phase::PluralCoherence
    }

    /// Cushion unless Guard has strictly more uses.
    pub fn preferred_mode(&self) -> WindprintMode {
        if self.cushion_uses >= self.guard_uses {
            WindprintMode::Cushion
        } else {
            WindprintMode::Guard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = SocietyState::new();
        assert_eq!(state.current_chapter, 1);
        assert_eq!(state.phase, Phase::TheDrift);
        assert_eq!(state.drift_level(), DriftLevel::Critical);
        assert_eq!(state.progress_fraction(), 0.0);
    }

    #[test]
    fn test_advance_chapter_reduces_drift() {
        let mut state = SocietyState::new();
        assert!(state.advance_chapter());
        assert_eq!(state.current_chapter, 2);
        assert!((state.drift_intensity - 11.0 / 12.0).abs() < 1e-9);
        assert_eq!(state.phase, Phase::TheDrift);
    }

    #[test]
    fn test_phase_progression() {
        let mut state = SocietyState::new();
        for _ in 0..7 {
            state.advance_chapter();
        }
        assert_eq!(state.phase, Phase::AxiomRestoring);

        while state.advance_chapter() {}
        assert_eq!(state.current_chapter, TOTAL_CHAPTERS);
        assert!(!state.is_victory());

        state.restore_civic_rule("PLURAL_COHERENCE");
        assert!(state.is_victory());
        assert_eq!(state.drift_intensity, 0.0);
        assert_eq!(state.drift_level(), DriftLevel::None);
    }

    #[test]
    fn test_civic_rule_restored_once() {
        let mut state = SocietyState::new();
        assert!(state.restore_civic_rule("ACCESS_WITHOUT_PROOF"));
        let drift = state.drift_intensity;
        assert!(!state.restore_civic_rule("ACCESS_WITHOUT_PROOF"));
        assert_eq!(state.drift_intensity, drift);
    }

    #[test]
    fn test_preferred_mode() {
        let mut state = SocietyState::new();
        assert_eq!(state.preferred_mode(), WindprintMode::Cushion);

        state.record_mode_use(WindprintMode::Guard);
        assert_eq!(state.preferred_mode(), WindprintMode::Guard);

        state.record_mode_use(WindprintMode::Cushion);
        assert_eq!(state.preferred_mode(), WindprintMode::Cushion);
    }

    #[test]
    fn test_verb_usage() {
        let mut state = SocietyState::new();
        state.record_verb_use(Verb::Pulse);
        state.record_verb_use(Verb::Pulse);
        assert_eq!(state.verb_usage[&Verb::Pulse], 2);
    }
}
