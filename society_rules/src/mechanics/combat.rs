//! Non-violent symbolic combat: pattern intervention and signal decoding.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Player verbs used to resolve antagonistic patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    /// Clears and resets cycles.
    Pulse,
    /// Interrupts loops.
    ThreadLash,
    /// Shields, creates safe footholds.
    RadiantHold,
    /// Pins a rhythm.
    EdgeClaim,
    /// Cleans signal corruption.
    Retune,
}

impl Verb {
    pub const ALL: [Verb; 5] = [
        Verb::Pulse,
        Verb::ThreadLash,
        Verb::RadiantHold,
        Verb::EdgeClaim,
        Verb::Retune,
    ];

    /// Tag used in event payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Pulse => "pulse",
            Verb::ThreadLash => "thread_lash",
            Verb::RadiantHold => "radiant_hold",
            Verb::EdgeClaim => "edge_claim",
            Verb::Retune => "retune",
        }
    }

    /// Static tuning for this verb.
    pub fn stats(&self) -> VerbStats {
        match self {
            Verb::Pulse => VerbStats::new(10, 1.0, 5.0, 0.0),
            Verb::ThreadLash => VerbStats::new(15, 1.5, 8.0, 0.0),
            Verb::RadiantHold => VerbStats::new(20, 2.0, 3.0, 3.0),
            Verb::EdgeClaim => VerbStats::new(15, 1.5, 4.0, 5.0),
            Verb::Retune => VerbStats::new(25, 3.0, 6.0, 0.0),
        }
    }
}

/// Cost and reach of a verb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerbStats {
    pub energy_cost: u32,
    /// Seconds.
    pub cooldown: f64,
    /// Meters.
    pub effect_radius: f64,
    /// Seconds the effect lingers; 0.0 = instant.
    pub duration: f64,
}

impl VerbStats {
    const fn new(energy_cost: u32, cooldown: f64, effect_radius: f64, duration: f64) -> Self {
        Self {
            energy_cost,
            cooldown,
            effect_radius,
            duration,
        }
    }
}

/// Kinds of antagonistic pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    /// Social scripts given motion.
    EchoForm,
    /// Broken rules manifested physically.
    Distortion,
    /// Sensory overload as weather.
    NoiseBeast,
}

impl PatternKind {
    pub const ALL: [PatternKind; 3] = [
        PatternKind::EchoForm,
        PatternKind::Distortion,
        PatternKind::NoiseBeast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::EchoForm => "echo_form",
            PatternKind::Distortion => "distortion",
            PatternKind::NoiseBeast => "noise_beast",
        }
    }

    /// The verb that resolves this pattern fastest.
    pub fn primary_verb(&self) -> Verb {
        match self {
            PatternKind::EchoForm => Verb::ThreadLash,
            PatternKind::Distortion => Verb::Pulse,
            PatternKind::NoiseBeast => Verb::Retune,
        }
    }

    /// The second-best verb.
    pub fn secondary_verb(&self) -> Verb {
        match self {
            PatternKind::EchoForm => Verb::EdgeClaim,
            PatternKind::Distortion => Verb::EdgeClaim,
            PatternKind::NoiseBeast => Verb::RadiantHold,
        }
    }
}

pub const PRIMARY_EFFECTIVENESS: f64 = 0.4;
pub const SECONDARY_EFFECTIVENESS: f64 = 0.25;
pub const BASE_EFFECTIVENESS: f64 = 0.1;

/// Data-driven `(PatternKind, Verb) -> weight` lookup.
///
/// Pairs that are not listed fall back to the base weight, so every verb
/// makes some progress against every pattern.
#[derive(Debug, Clone)]
pub struct EffectivenessTable {
    weights: HashMap<(PatternKind, Verb), f64>,
    base: f64,
}

impl EffectivenessTable {
    /// An empty table where every pair has the same weight.
    pub fn uniform(base: f64) -> Self {
        Self {
            weights: HashMap::new(),
            base,
        }
    }

    /// Override a single pair.
    pub fn with_weight(mut self, kind: PatternKind, verb: Verb, weight: f64) -> Self {
        self.weights.insert((kind, verb), weight);
        self
    }

    /// Weight for a pair.
    pub fn weight(&self, kind: PatternKind, verb: Verb) -> f64 {
        self.weights.get(&(kind, verb)).copied().unwrap_or(self.base)
    }

    /// Verb with the highest weight against `kind`.
    pub fn recommended_verb(&self, kind: PatternKind) -> Verb {
        Verb::ALL
            .into_iter()
            .max_by(|a, b| {
                self.weight(kind, *a)
                    .partial_cmp(&self.weight(kind, *b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(Verb::Pulse)
    }
}

impl Default for EffectivenessTable {
    fn default() -> Self {
        PatternKind::ALL
            .into_iter()
            .fold(Self::uniform(BASE_EFFECTIVENESS), |table, kind| {
                table
                    .with_weight(kind, kind.primary_verb(), PRIMARY_EFFECTIVENESS)
                    .with_weight(kind, kind.secondary_verb(), SECONDARY_EFFECTIVENESS)
            })
    }
}

/// An antagonistic pattern to be resolved, not killed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntagPattern {
    pub kind: PatternKind,
    pub name: String,
    /// 0.0 - 1.0.
    pub intensity: f64,
    /// 0.0 - 1.0; resolved at 1.0.
    pub resolution_progress: f64,
}

impl AntagPattern {
    pub fn new(kind: PatternKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            intensity: 0.8,
            resolution_progress: 0.0,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution_progress >= 1.0
    }

    /// Apply a verb and return the progress gained.
    pub fn receive_verb(&mut self, verb: Verb, table: &EffectivenessTable) -> f64 {
        let gain = table.weight(self.kind, verb);
        self.resolution_progress = (self.resolution_progress + gain).min(1.0);
        gain
    }
}

/// A group of patterns the player resolves together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encounter {
    pub name: String,
    pub patterns: Vec<AntagPattern>,
    pub is_active: bool,
}

impl Encounter {
    pub fn new(name: impl Into<String>, patterns: Vec<AntagPattern>) -> Self {
        Self {
            name: name.into(),
            patterns,
            is_active: true,
        }
    }

    /// All patterns resolved.
    pub fn is_complete(&self) -> bool {
        self.patterns.iter().all(AntagPattern::is_resolved)
    }

    /// Mean resolution progress across patterns.
    pub fn resolution_progress(&self) -> f64 {
        if self.patterns.is_empty() {
            return 1.0;
        }
        self.patterns.iter().map(|p| p.resolution_progress).sum::<f64>()
            / self.patterns.len() as f64
    }

    /// Deactivate once complete. Returns whether it is complete.
    pub fn resolve_check(&mut self) -> bool {
        let complete = self.is_complete();
        if complete {
            self.is_active = false;
        }
        complete
    }
}

/// Corruption above which a signal reads as garbled.
pub const SIGNAL_CORRUPTION_THRESHOLD: f64 = 0.5;

/// A message garbled by rigid communication defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub message: String,
    /// 0.0 is clean, 1.0 is fully corrupted.
    #[serde(default)]
    pub corruption: f64,
    #[serde(default)]
    pub decoded: bool,
}

impl Signal {
    pub fn new(id: impl Into<String>, message: impl Into<String>, corruption: f64) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            corruption: corruption.clamp(0.0, 1.0),
            decoded: false,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        self.corruption > SIGNAL_CORRUPTION_THRESHOLD
    }

    /// Clear the corruption and return the clean message.
    pub fn decode(&mut self) -> &str {
        self.decoded = true;
        self.corruption = 0.0;
        &self.message
    }
}
