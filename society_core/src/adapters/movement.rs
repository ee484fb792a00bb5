//! Movement timing and traversal rules.
//!
//! This models what the player can do, not how anything moves on screen.
//! An engine adapter turns the results into physics and animation calls.

use serde::{Deserialize, Serialize};
use society_rules::{cushion, guard, ValueSource};

use super::{resolve, AdapterKey};

/// Multiplicative overlay applied to timing values at read time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingModifier {
    /// Scales timing window, coyote time and jump buffer.
    pub window_multiplier: f64,
    /// Scales platform rhythm.
    pub rhythm_multiplier: f64,
}

impl TimingModifier {
    /// No modification.
    pub const NONE: TimingModifier = TimingModifier {
        window_multiplier: 1.0,
        rhythm_multiplier: 1.0,
    };

    /// Cushion softening: wider windows, slower hazards.
    pub const CUSHION: TimingModifier = TimingModifier {
        window_multiplier: cushion::TIMING_MULTIPLIER,
        rhythm_multiplier: cushion::HAZARD_SLOWDOWN,
    };
}

impl Default for TimingModifier {
    fn default() -> Self {
        Self::NONE
    }
}

/// Timing values movement uses this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementTiming {
    /// Seconds.
    pub timing_window: f64,
    /// Seconds of grace after leaving a ledge.
    pub coyote_time: f64,
    /// Seconds an early jump press is remembered.
    pub jump_buffer: f64,
    /// Platform tempo as a fraction of full speed.
    pub platform_rhythm: f64,
}

impl MovementTiming {
    /// Derive timing from current values with `modifier` layered on top.
    pub fn derive<S>(source: &S, modifier: TimingModifier) -> Self
    where
        S: ValueSource + ?Sized,
    {
        Self {
            timing_window: resolve(source, AdapterKey::TimingWindow) * modifier.window_multiplier,
            coyote_time: resolve(source, AdapterKey::CoyoteTime) * modifier.window_multiplier,
            jump_buffer: resolve(source, AdapterKey::JumpBuffer) * modifier.window_multiplier,
            platform_rhythm: resolve(source, AdapterKey::PlatformRhythm)
                * modifier.rhythm_multiplier,
        }
    }
}

/// Snapshot of the player's traversal state each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraversalState {
    pub is_grounded: bool,
    pub is_wall_running: bool,
    pub is_gliding: bool,
    pub is_grappling: bool,
    /// 0 = none, 1-3 = triple hop chain.
    pub current_hop: u8,
    pub air_dashes_remaining: u8,
    pub coyote_timer: f64,
    pub jump_buffer_timer: f64,
    pub glide_stamina: f64,
}

impl Default for TraversalState {
    fn default() -> Self {
        Self {
            is_grounded: true,
            is_wall_running: false,
            is_gliding: false,
            is_grappling: false,
            current_hop: 0,
            air_dashes_remaining: 1,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            glide_stamina: 100.0,
        }
    }
}

impl TraversalState {
    /// Step off a ledge, starting the coyote grace period.
    pub fn leave_ledge(&mut self, timing: &MovementTiming) {
        self.is_grounded = false;
        self.coyote_timer = timing.coyote_time;
    }

    /// Press jump while airborne; remembered for the buffer window.
    pub fn buffer_jump(&mut self, timing: &MovementTiming) {
        self.jump_buffer_timer = timing.jump_buffer;
    }

    /// Land and consume any buffered jump. Returns whether one fires.
    pub fn land(&mut self) -> bool {
        self.is_grounded = true;
        self.coyote_timer = 0.0;
        self.air_dashes_remaining = 1;
        let buffered = self.jump_buffer_timer > 0.0;
        self.jump_buffer_timer = 0.0;
        buffered
    }

    /// Advance timers by `delta` seconds.
    pub fn tick(&mut self, delta: f64) {
        self.coyote_timer = (self.coyote_timer - delta).max(0.0);
        self.jump_buffer_timer = (self.jump_buffer_timer - delta).max(0.0);
    }
}

/// Result of a hop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HopResult {
    pub hop_number: u8,
    /// Meters.
    pub height: f64,
    pub speed_multiplier: f64,
    pub timing_multiplier: f64,
}

/// Guard-mode traversal effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardTraversal {
    pub jitter_reduction: f64,
    pub route_flexibility: f64,
}

/// Pure rule layer describing movement verbs.
pub struct MovementRules;

impl MovementRules {
    pub const BASE_SPEED: f64 = 5.0;
    pub const TRIPLE_HOP_HEIGHTS: [f64; 3] = [1.5, 2.5, 3.5];
    /// Seconds to chain hops.
    pub const TRIPLE_HOP_WINDOW: f64 = 0.5;
    pub const AIR_DASH_DISTANCE: f64 = 4.0;
    pub const WALL_RUN_SPEED: f64 = 4.0;
    pub const GLIDE_SPEED: f64 = 3.0;
    pub const GRAPPLE_SPEED: f64 = 10.0;

    const CUSHION_HOP_HEIGHT: f64 = 1.1;
    const CUSHION_HOP_SPEED: f64 = 0.9;

    pub fn can_jump(state: &TraversalState) -> bool {
        state.is_grounded || state.coyote_timer > 0.0 || state.is_wall_running
    }

    /// Next hop in the triple-hop chain; wraps after the third.
    pub fn resolve_hop(state: &TraversalState) -> HopResult {
        let hop_number = if state.current_hop < 3 {
            state.current_hop + 1
        } else {
            1
        };
        HopResult {
            hop_number,
            height: Self::TRIPLE_HOP_HEIGHTS[usize::from(hop_number - 1)],
            speed_multiplier: 1.0,
            timing_multiplier: 1.0,
        }
    }

    pub fn can_air_dash(state: &TraversalState) -> bool {
        !state.is_grounded && state.air_dashes_remaining > 0
    }

    pub fn can_wall_run(state: &TraversalState) -> bool {
        !state.is_grounded && !state.is_wall_running
    }

    pub fn can_glide(state: &TraversalState) -> bool {
        !state.is_grounded && state.glide_stamina > 0.0
    }

    pub fn can_grapple(state: &TraversalState) -> bool {
        !state.is_grappling
    }

    /// Cushion makes a hop higher, smoother and more forgiving.
    pub fn apply_cushion(hop: HopResult) -> HopResult {
        HopResult {
            height: hop.height * Self::CUSHION_HOP_HEIGHT,
            speed_multiplier: Self::CUSHION_HOP_SPEED,
            timing_multiplier: cushion::TIMING_MULTIPLIER,
            ..hop
        }
    }

    /// Guard stabilises traversal at the cost of alternative routes.
    pub fn guard_traversal() -> GuardTraversal {
        GuardTraversal {
            jitter_reduction: guard::JITTER_STABILISATION,
            route_flexibility: guard::ROUTE_FLEXIBILITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use society_rules::{keys, DefaultsRegistry};

    #[test]
    fn test_timing_tracks_registry() {
        let mut registry = DefaultsRegistry::standard();
        let before = MovementTiming::derive(&registry, TimingModifier::NONE);
        assert_eq!(before.timing_window, 0.2);
        assert_eq!(before.coyote_time, 0.0);

        registry.read(keys::COYOTE_TIME);
        registry.rewrite(keys::COYOTE_TIME);

        let after = MovementTiming::derive(&registry, TimingModifier::NONE);
        assert_eq!(after.coyote_time, 0.2);
    }

    #[test]
    fn test_modifier_is_multiplicative_and_not_persisted() {
        let registry = DefaultsRegistry::standard();
        let cushioned = MovementTiming::derive(&registry, TimingModifier::CUSHION);
        assert!((cushioned.timing_window - 0.3).abs() < 1e-9);
        assert!((cushioned.platform_rhythm - 0.5).abs() < 1e-9);
        assert_eq!(registry.get(keys::TIMING_WINDOW), Some(0.2));
    }

    #[test]
    fn test_coyote_time_gates_jump() {
        let mut registry = DefaultsRegistry::standard();
        let mut state = TraversalState::default();

        state.leave_ledge(&MovementTiming::derive(&registry, TimingModifier::NONE));
        assert!(!MovementRules::can_jump(&state));

        registry.read(keys::COYOTE_TIME);
        registry.rewrite(keys::COYOTE_TIME);
        let mut state = TraversalState::default();
        state.leave_ledge(&MovementTiming::derive(&registry, TimingModifier::NONE));
        assert!(MovementRules::can_jump(&state));

        state.tick(0.25);
        assert!(!MovementRules::can_jump(&state));
    }

    #[test]
    fn test_jump_buffer() {
        let mut registry = DefaultsRegistry::standard();
        registry.read(keys::JUMP_BUFFER);
        registry.rewrite(keys::JUMP_BUFFER);
        let timing = MovementTiming::derive(&registry, TimingModifier::NONE);

        let mut state = TraversalState::default();
        state.leave_ledge(&timing);
        state.buffer_jump(&timing);
        state.tick(0.1);
        assert!(state.land());

        state.leave_ledge(&timing);
        state.buffer_jump(&timing);
        state.tick(0.2);
        assert!(!state.land());
    }

    #[test]
    fn test_triple_hop_wraps() {
        let mut state = TraversalState::default();
        let heights: Vec<f64> = (0..4)
            .map(|_| {
                let hop = MovementRules::resolve_hop(&state);
                state.current_hop = hop.hop_number;
                hop.height
            })
            .collect();
        assert_eq!(heights, vec![1.5, 2.5, 3.5, 1.5]);
    }

    #[test]
    fn test_cushion_hop() {
        let hop = MovementRules::resolve_hop(&TraversalState::default());
        let cushioned = MovementRules::apply_cushion(hop);
        assert!((cushioned.height - 1.65).abs() < 1e-9);
        assert_eq!(cushioned.speed_multiplier, 0.9);
        assert_eq!(cushioned.timing_multiplier, 1.5);
        assert_eq!(cushioned.hop_number, 1);
    }

    #[test]
    fn test_airborne_verbs() {
        let mut state = TraversalState::default();
        assert!(!MovementRules::can_air_dash(&state));
        assert!(!MovementRules::can_glide(&state));
        assert!(MovementRules::can_grapple(&state));

        state.is_grounded = false;
        assert!(MovementRules::can_air_dash(&state));
        assert!(MovementRules::can_wall_run(&state));
        assert!(MovementRules::can_glide(&state));

        state.glide_stamina = 0.0;
        assert!(!MovementRules::can_glide(&state));
    }
}
