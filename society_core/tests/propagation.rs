//! End-to-end propagation through a session.

use std::cell::RefCell;
use std::rc::Rc;

use society_core::{
    trace_propagation, CombatTuning, DispatchPolicy, EventType, HandlerError, MovementTiming,
    SensoryProfile, Session, SessionConfig, SubtitleStyle, TimingModifier,
};
use society_rules::{keys, WindprintMode};

fn session() -> Session {
    Session::new(SessionConfig::default().with_dispatch_policy(DispatchPolicy::Propagate))
        .expect("standard session")
}

#[test]
fn test_rewrite_before_read_is_refused() {
    let mut session = session();
    assert_eq!(session.registry().get(keys::TIMING_WINDOW), Some(0.2));

    let rewritten = session
        .verbs()
        .rewrite_default(keys::TIMING_WINDOW, "cushion")
        .unwrap();

    assert!(!rewritten);
    assert_eq!(session.registry().get(keys::TIMING_WINDOW), Some(0.2));
    assert!(session.bus().history().is_empty());
}

#[test]
fn test_read_then_rewrite_records_two_events() {
    let mut session = session();
    {
        let mut verbs = session.verbs();
        verbs.read_default(keys::TIMING_WINDOW).unwrap();
        assert!(verbs.rewrite_default(keys::TIMING_WINDOW, "cushion").unwrap());
    }

    assert_eq!(session.registry().get(keys::TIMING_WINDOW), Some(0.5));
    let types: Vec<_> = session.bus().history().iter().map(|e| e.event_type).collect();
    assert_eq!(types, vec![EventType::DefaultRead, EventType::DefaultRewritten]);
}

#[test]
fn test_adapters_see_rewrite_on_next_query() {
    let mut session = session();
    let before = MovementTiming::derive(&session.effective(), TimingModifier::NONE);
    let combat_before = CombatTuning::derive(&session.effective());

    {
        let mut verbs = session.verbs();
        verbs.read_default(keys::TIMING_WINDOW).unwrap();
        verbs.rewrite_default(keys::TIMING_WINDOW, "cushion").unwrap();
    }

    let after = MovementTiming::derive(&session.effective(), TimingModifier::NONE);
    let combat_after = CombatTuning::derive(&session.effective());
    assert_eq!(before.timing_window, 0.2);
    assert_eq!(after.timing_window, 0.5);
    assert!(combat_after.vulnerability_window > combat_before.vulnerability_window);
}

#[test]
fn test_every_rewrite_is_preceded_by_its_read() {
    let mut session = session();
    let order = Rc::new(RefCell::new(Vec::new()));
    for event_type in [EventType::DefaultRead, EventType::DefaultRewritten] {
        let sink = Rc::clone(&order);
        session.bus_mut().observe(event_type, move |event| {
            let key = event.default_key().unwrap_or_default().to_string();
            sink.borrow_mut().push((event.event_type, key));
        });
    }

    let keys: Vec<String> = session.registry().keys().map(str::to_string).collect();
    {
        let mut verbs = session.verbs();
        for key in keys.iter().rev() {
            verbs.rewrite_default(key, "guard").unwrap();
            verbs.read_default(key).unwrap();
            verbs.read_default(key).unwrap();
            verbs.rewrite_default(key, "guard").unwrap();
        }
    }

    let order = order.borrow();
    for key in &keys {
        let positions: Vec<_> = order
            .iter()
            .enumerate()
            .filter(|(_, (_, k))| k == key)
            .map(|(i, (t, _))| (i, *t))
            .collect();
        assert_eq!(positions.len(), 2, "{key}");
        assert_eq!(positions[0].1, EventType::DefaultRead);
        assert_eq!(positions[1].1, EventType::DefaultRewritten);
        assert!(positions[0].0 < positions[1].0);
    }
    assert!(session.registry().all_rewritten());
}

#[test]
fn test_subscribers_run_in_registration_order() {
    let mut session = session();
    let calls = Rc::new(RefCell::new(Vec::new()));
    for name in ["renderer", "mixer", "hud"] {
        let sink = Rc::clone(&calls);
        session
            .bus_mut()
            .observe(EventType::DefaultRewritten, move |_| sink.borrow_mut().push(name));
    }

    {
        let mut verbs = session.verbs();
        verbs.read_default(keys::VISUAL_CLUTTER).unwrap();
        verbs.rewrite_default(keys::VISUAL_CLUTTER, "cushion").unwrap();
    }
    assert_eq!(*calls.borrow(), vec!["renderer", "mixer", "hud"]);
}

#[test]
fn test_isolated_handler_failure_does_not_stop_dispatch() {
    let mut session =
        Session::new(SessionConfig::default().with_dispatch_policy(DispatchPolicy::Isolate))
            .unwrap();
    let reached = Rc::new(RefCell::new(false));
    let sink = Rc::clone(&reached);
    session
        .bus_mut()
        .subscribe(EventType::DefaultRewritten, |_| Err(HandlerError::new("boom")));
    session
        .bus_mut()
        .observe(EventType::DefaultRewritten, move |_| *sink.borrow_mut() = true);

    let mut verbs = session.verbs();
    verbs.read_default(keys::SCREEN_SHAKE).unwrap();
    assert!(verbs.rewrite_default(keys::SCREEN_SHAKE, "guard").unwrap());
    assert!(*reached.borrow());
}

#[test]
fn test_preset_and_mode_layer_over_rewrites() {
    let mut session = session();
    {
        let mut verbs = session.verbs();
        verbs.read_default(keys::VISUAL_CLUTTER).unwrap();
        verbs.rewrite_default(keys::VISUAL_CLUTTER, "cushion").unwrap();
    }
    let rewritten = SensoryProfile::derive(&session.effective(), None, SubtitleStyle::Standard);
    assert!((rewritten.visual_density - 0.4).abs() < 1e-9);

    session.switch_mode(WindprintMode::Cushion).unwrap();
    let cushioned = SensoryProfile::derive(
        &session.effective(),
        session.rig().active_mode(),
        SubtitleStyle::Standard,
    );
    assert!((cushioned.visual_density - 0.16).abs() < 1e-9);

    session.apply_preset("focused").unwrap();
    let focused = SensoryProfile::derive(&session.effective(), None, SubtitleStyle::Standard);
    assert!((focused.visual_density - 0.2).abs() < 1e-9);
    assert!((session.registry().get(keys::VISUAL_CLUTTER).unwrap() - 0.4).abs() < 1e-9);
}

#[test]
fn test_full_trace_across_the_catalog() {
    let mut session = session();
    let keys: Vec<String> = session.registry().keys().map(str::to_string).collect();

    for key in &keys {
        let trace = trace_propagation(&mut session, key, WindprintMode::Cushion).unwrap();
        assert!(trace.rewritten, "{key}");
        assert_eq!(
            trace.events,
            vec![EventType::DefaultRead, EventType::DefaultRewritten],
            "{key}"
        );
        assert_eq!(trace.taught_in_chapters.len(), 1, "{key}");
    }

    assert_eq!(session.registry().progress(), 1.0);
    assert_eq!(session.bus().history().len(), keys.len() * 2);
}

#[test]
fn test_trace_serializes_to_json() {
    let mut session = session();
    let trace = trace_propagation(&mut session, keys::COYOTE_TIME, WindprintMode::Cushion).unwrap();
    let json = serde_json::to_value(&trace).unwrap();
    assert_eq!(json["key"], "coyote_time");
    assert_eq!(json["mode"], "cushion");
    assert_eq!(json["changed"][0], "movement.coyote_time");
}
