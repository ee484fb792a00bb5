//! Propagation tracing: one read and rewrite, observed through every adapter.

use serde::Serialize;
use society_rules::{ConfigError, ValueSource, WindprintMode};
use std::cell::RefCell;
use std::rc::Rc;

use crate::adapters::{
    CombatTuning, MovementTiming, RouteVisibility, SensoryProfile, SubtitleStyle, WindprintRig,
};
use crate::events::EventType;
use crate::session::{Session, SessionResult};

/// Everything the adapters derive at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterSnapshot {
    pub movement: MovementTiming,
    pub sensory: SensoryProfile,
    pub combat: CombatTuning,
    pub routes: RouteVisibility,
    pub rig_timing: f64,
    pub rig_route_flexibility: f64,
}

impl AdapterSnapshot {
    pub fn capture<S>(source: &S, rig: &WindprintRig) -> Self
    where
        S: ValueSource + ?Sized,
    {
        Self {
            movement: MovementTiming::derive(source, rig.timing_modifier()),
            sensory: SensoryProfile::derive(source, rig.active_mode(), SubtitleStyle::default()),
            combat: CombatTuning::derive(source),
            routes: RouteVisibility::derive(source, rig.active_mode()),
            rig_timing: rig.timing_multiplier(source),
            rig_route_flexibility: rig.route_flexibility(source),
        }
    }

    /// Flat (name, value) view used for diffing.
    pub fn fields(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("movement.timing_window", self.movement.timing_window),
            ("movement.coyote_time", self.movement.coyote_time),
            ("movement.jump_buffer", self.movement.jump_buffer),
            ("movement.platform_rhythm", self.movement.platform_rhythm),
            ("sensory.visual_density", self.sensory.visual_density),
            ("sensory.audio_layers", self.sensory.audio_layers),
            ("sensory.screen_shake", self.sensory.screen_shake),
            ("sensory.motion_intensity", self.sensory.motion_intensity),
            ("combat.vulnerability_window", self.combat.vulnerability_window),
            ("combat.failure_penalty", self.combat.failure_penalty),
            ("combat.retry_cost", self.combat.retry_cost),
            (
                "routes.alternative_routes",
                f64::from(self.routes.alternative_routes),
            ),
            (
                "routes.show_safe_routes",
                if self.routes.show_safe_routes { 1.0 } else { 0.0 },
            ),
            ("rig.timing", self.rig_timing),
            ("rig.route_flexibility", self.rig_route_flexibility),
        ]
    }

    /// Names of fields whose value differs from `other`.
    pub fn changed_fields(&self, other: &AdapterSnapshot) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .zip(other.fields())
            .filter(|((_, a), (_, b))| a != b)
            .map(|((name, _), _)| name)
            .collect()
    }
}

/// The full effect of rewriting one default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropagationTrace {
    pub key: String,
    pub mode: WindprintMode,
    pub description: String,
    pub rewritten: bool,
    pub value_before: f64,
    pub value_after: f64,
    pub before: AdapterSnapshot,
    pub after: AdapterSnapshot,
    /// Adapter outputs that moved.
    pub changed: Vec<&'static str>,
    /// Chapters that teach this default.
    pub taught_in_chapters: Vec<u32>,
    /// Presets that override this default.
    pub overridden_by_presets: Vec<String>,
    /// Events emitted by the read and rewrite, in order.
    pub events: Vec<EventType>,
}

/// Read then rewrite `key` and record what every adapter sees before and after.
///
/// Adapters observe the session's effective values, so an active preset that
/// overrides `key` hides the rewrite from them.
pub fn trace_propagation(
    session: &mut Session,
    key: &str,
    mode: WindprintMode,
) -> SessionResult<PropagationTrace> {
    let value_before = session
        .registry()
        .get(key)
        .ok_or_else(|| ConfigError::UnknownKey {
            owner: "propagation trace".to_string(),
            key: key.to_string(),
        })?;
    let before = AdapterSnapshot::capture(&session.effective(), session.rig());

    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut subscriptions = Vec::new();
    for event_type in [EventType::DefaultRead, EventType::DefaultRewritten] {
        let sink = Rc::clone(&seen);
        let id = session
            .bus_mut()
            .observe(event_type, move |event| sink.borrow_mut().push(event.event_type));
        subscriptions.push((event_type, id));
    }

    let outcome = {
        let mut verbs = session.verbs();
        verbs.read_default(key).and_then(|description| {
            let rewritten = verbs.rewrite_default(key, mode.as_str())?;
            Ok((description.unwrap_or_default(), rewritten))
        })
    };
    for (event_type, id) in subscriptions {
        session.bus_mut().unsubscribe(event_type, id);
    }
    let (description, rewritten) = outcome?;

    let after = AdapterSnapshot::capture(&session.effective(), session.rig());
    let value_after = session.registry().get(key).unwrap_or(value_before);
    let changed = before.changed_fields(&after);
    log::debug!("trace of '{}' changed {:?}", key, changed);

    let content = session.content();
    let taught_in_chapters = content.chapters.teaching(key).iter().map(|c| c.number).collect();
    let overridden_by_presets = content
        .presets
        .iter()
        .filter(|p| p.override_for(key).is_some())
        .map(|p| p.id.clone())
        .collect();
    let events = seen.borrow().clone();

    Ok(PropagationTrace {
        key: key.to_string(),
        mode,
        description,
        rewritten,
        value_before,
        value_after,
        before,
        after,
        changed,
        taught_in_chapters,
        overridden_by_presets,
        events,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DispatchPolicy;
    use crate::session::{SessionConfig, SessionError};
    use society_rules::keys;

    fn session() -> Session {
        Session::new(SessionConfig::default().with_dispatch_policy(DispatchPolicy::Propagate))
            .unwrap()
    }

    #[test]
    fn test_trace_screen_shake() {
        let mut session = session();
        let trace = trace_propagation(&mut session, keys::SCREEN_SHAKE, WindprintMode::Guard).unwrap();

        assert!(trace.rewritten);
        assert_eq!(trace.value_before, 1.0);
        assert_eq!(trace.value_after, 0.0);
        assert_eq!(trace.changed, vec!["sensory.screen_shake"]);
        assert_eq!(
            trace.events,
            vec![EventType::DefaultRead, EventType::DefaultRewritten]
        );
        assert_eq!(trace.taught_in_chapters.len(), 1);
        assert!(trace.overridden_by_presets.contains(&"gentle".to_string()));
    }

    #[test]
    fn test_trace_leaves_no_subscribers() {
        let mut session = session();
        trace_propagation(&mut session, keys::COYOTE_TIME, WindprintMode::Cushion).unwrap();
        assert_eq!(session.bus().subscriber_count(EventType::DefaultRead), 0);
        assert_eq!(session.bus().subscriber_count(EventType::DefaultRewritten), 0);
    }

    #[test]
    fn test_trace_unknown_key() {
        let mut session = session();
        let err = trace_propagation(&mut session, "gravity", WindprintMode::Cushion).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_preset_masks_rewrite() {
        let mut session = session();
        session.apply_preset("gentle").unwrap();
        let trace = trace_propagation(&mut session, keys::SCREEN_SHAKE, WindprintMode::Guard).unwrap();
        assert!(trace.rewritten);
        assert!(trace.changed.is_empty());
    }

    #[test]
    fn test_snapshot_routes_follow_rig_mode() {
        let mut registry = society_rules::DefaultsRegistry::standard();
        registry.read(keys::ROUTE_STRICTNESS);
        registry.rewrite(keys::ROUTE_STRICTNESS);
        let mut rig = WindprintRig::new();

        let open = AdapterSnapshot::capture(&registry, &rig);
        rig.activate(WindprintMode::Guard).unwrap();
        let guarded = AdapterSnapshot::capture(&registry, &rig);

        assert_eq!(open.routes.alternative_routes, 3);
        assert_eq!(guarded.routes.alternative_routes, 1);
        assert!((guarded.rig_route_flexibility - 0.35).abs() < 1e-9);
        assert!(open.changed_fields(&guarded).contains(&"routes.alternative_routes"));
    }
}
