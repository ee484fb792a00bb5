//! A single playthrough: the owner of the registry and the bus.
//!
//! Queries borrow the registry immutably. Mutation goes through
//! [`Session::verbs`], and the borrow checker keeps every other path out.

use serde::{Deserialize, Serialize};
use society_rules::{
    ConfigError, DefaultSummary, DefaultsRegistry, EffectivenessTable, Encounter, Preset,
    SocietyContent, SocietyState, Verb, WindprintMode,
};
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

use crate::adapters::{AdapterKey, ModeActivation, RigError, WindprintRig};
use crate::composition::{ComposedPreset, CompositionBoard, PresetOverlay};
use crate::events::{
    DispatchError, DispatchPolicy, Event, EventBus, EventBusConfig, EventType,
};
use crate::verbs::TranslationVerbs;

const SESSION_SOURCE: &str = "session";
const COMPOSITION_SOURCE: &str = "composition";

/// Unique identifier for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session settings, loadable from TOML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Bound on the event history; `None` keeps everything.
    pub history_limit: Option<usize>,
    pub dispatch_policy: DispatchPolicy,
    /// Preset id applied at startup.
    pub starting_preset: Option<String>,
}

impl SessionConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, SessionError> {
        toml::from_str(source).map_err(|e| SessionError::Config(ConfigError::Parse(e)))
    }

    pub fn with_starting_preset(mut self, preset_id: impl Into<String>) -> Self {
        self.starting_preset = Some(preset_id.into());
        self
    }

    pub fn with_dispatch_policy(mut self, policy: DispatchPolicy) -> Self {
        self.dispatch_policy = policy;
        self
    }

    fn bus_config(&self) -> EventBusConfig {
        EventBusConfig {
            history_limit: self.history_limit,
            dispatch_policy: self.dispatch_policy,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Rig(#[from] RigError),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("unknown district '{0}'")]
    UnknownDistrict(String),

    #[error("no encounter is active")]
    NoActiveEncounter,

    #[error("encounter has no pattern at index {0}")]
    UnknownPattern(usize),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Outcome of one verb against one pattern.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VerbOutcome {
    pub verb: Verb,
    pub gain: f64,
    pub pattern_resolved: bool,
    pub encounter_complete: bool,
}

/// Owns all mutable state of one playthrough.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    registry: DefaultsRegistry,
    bus: EventBus,
    content: SocietyContent,
    state: SocietyState,
    rig: WindprintRig,
    effectiveness: EffectivenessTable,
    active_preset: Option<Preset>,
    encounter: Option<Encounter>,
}

impl Session {
    /// Start a session over the standard catalog.
    pub fn new(config: SessionConfig) -> SessionResult<Self> {
        Self::with_registry(DefaultsRegistry::standard(), config)
    }

    /// Start a session over a custom registry.
    ///
    /// Fails before any play happens if adapters or content reference a key
    /// the registry lacks, or if the starting preset is unknown.
    pub fn with_registry(registry: DefaultsRegistry, config: SessionConfig) -> SessionResult<Self> {
        registry.ensure_keys("adapters", AdapterKey::all_keys())?;
        let content = SocietyContent::builtin(&registry)?;

        let mut session = Self {
            id: SessionId::new(),
            registry,
            bus: EventBus::with_config(config.bus_config()),
            content,
            state: SocietyState::new(),
            rig: WindprintRig::new(),
            effectiveness: EffectivenessTable::default(),
            active_preset: None,
            encounter: None,
        };

        if let Some(preset_id) = &config.starting_preset {
            let preset = session.lookup_preset(preset_id)?;
            session.active_preset = Some(preset);
        }

        log::info!(
            "session {} started with {} defaults, preset {}",
            session.id,
            session.registry.len(),
            session
                .active_preset
                .as_ref()
                .map_or("none", |p| p.id.as_str())
        );
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn registry(&self) -> &DefaultsRegistry {
        &self.registry
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// For subscribing and unsubscribing.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn content(&self) -> &SocietyContent {
        &self.content
    }

    pub fn state(&self) -> &SocietyState {
        &self.state
    }

    pub fn rig(&self) -> &WindprintRig {
        &self.rig
    }

    pub fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    /// The translation verbs for this session.
    pub fn verbs(&mut self) -> TranslationVerbs<'_> {
        TranslationVerbs::new(&mut self.registry, &mut self.bus)
    }

    // -- Presets --

    pub fn active_preset(&self) -> Option<&Preset> {
        self.active_preset.as_ref()
    }

    /// Values as consumers should see them: the active preset over the registry.
    pub fn effective(&self) -> PresetOverlay<'_> {
        match &self.active_preset {
            Some(preset) => PresetOverlay::of_preset(&self.registry, preset),
            None => PresetOverlay::passthrough(&self.registry),
        }
    }

    /// Apply a catalog preset.
    pub fn apply_preset(&mut self, preset_id: &str) -> SessionResult<()> {
        let preset = self.lookup_preset(preset_id)?;
        log::info!("applying preset '{}'", preset.id);
        let event = Self::defaults_changed(&preset, SESSION_SOURCE);
        self.active_preset = Some(preset);
        self.bus.emit(event)?;
        Ok(())
    }

    /// Drop the active preset; consumers read the registry directly again.
    pub fn clear_preset(&mut self) -> SessionResult<()> {
        if self.active_preset.take().is_some() {
            log::info!("preset cleared");
            self.bus.emit(
                Event::new(EventType::DefaultsChanged, SESSION_SOURCE)
                    .with("preset_name", serde_json::Value::Null),
            )?;
        }
        Ok(())
    }

    /// Grouped view of every default for composing a preset.
    pub fn composition_board(&self) -> CompositionBoard {
        CompositionBoard::from_registry(&self.registry)
    }

    /// Validate and apply a player-composed preset.
    pub fn compose_preset(
        &mut self,
        name: &str,
        overrides: BTreeMap<String, f64>,
        note: Option<&str>,
    ) -> SessionResult<ComposedPreset> {
        let mut composed = ComposedPreset::new(name, overrides);
        if let Some(note) = note {
            composed = composed.with_note(note);
        }
        composed.validate(&self.registry)?;

        let preset = composed.to_preset();
        log::info!("applying composed preset '{}'", composed.name);
        let event = Self::defaults_changed(&preset, COMPOSITION_SOURCE);
        self.active_preset = Some(preset);
        self.bus.emit(event)?;
        Ok(composed)
    }

    fn lookup_preset(&self, preset_id: &str) -> SessionResult<Preset> {
        self.content
            .presets
            .get(preset_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownPreset(preset_id.to_string()))
    }

    fn defaults_changed(preset: &Preset, source: &str) -> Event {
        let values: serde_json::Map<String, serde_json::Value> = preset
            .overrides
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::from(*v)))
            .collect();
        Event::new(EventType::DefaultsChanged, source)
            .with("preset_id", preset.id.as_str())
            .with("preset_name", preset.name.as_str())
            .with("values", values)
    }

    // -- Narrative and world --

    /// Move to the next chapter. Returns `false` at the last chapter.
    pub fn advance_chapter(&mut self) -> SessionResult<bool> {
        if !self.state.advance_chapter() {
            return Ok(false);
        }
        let chapter = self.state.current_chapter;
        let name = self
            .content
            .chapters
            .get(chapter)
            .map(|c| c.name.clone())
            .unwrap_or_default();

        self.bus.emit(
            Event::new(EventType::ChapterAdvanced, SESSION_SOURCE)
                .with("chapter", chapter)
                .with("name", name),
        )?;
        self.emit_drift()?;
        Ok(true)
    }

    /// Restore the civic rule of the current chapter.
    ///
    /// Also lowers drift in the chapter's district. Returns `false` if the
    /// rule was already restored.
    pub fn restore_civic_rule(&mut self) -> SessionResult<bool> {
        let Some(chapter) = self.content.chapters.get(self.state.current_chapter) else {
            return Ok(false);
        };
        let rule_id = chapter.civic_rule_id.clone();
        let location = chapter.location.clone();

        if !self.state.restore_civic_rule(rule_id.as_str()) {
            return Ok(false);
        }
        if let Some(district) = self.content.districts.get_mut(&location) {
            district.reduce_drift(society_rules::DRIFT_REDUCTION_PER_STEP);
        }

        self.bus.emit(
            Event::new(EventType::CivicRuleRestored, SESSION_SOURCE)
                .with("rule", rule_id)
                .with("district", location),
        )?;
        self.emit_drift()?;
        Ok(true)
    }

    fn emit_drift(&mut self) -> SessionResult<()> {
        self.bus.emit(
            Event::new(EventType::DriftReduced, SESSION_SOURCE)
                .with("intensity", self.state.drift_intensity)
                .with("phase", format!("{:?}", self.state.phase)),
        )?;
        Ok(())
    }

    /// Enter a district and return the unread defaults it holds.
    pub fn enter_district(&mut self, district_id: &str) -> SessionResult<Vec<DefaultSummary>> {
        let district = self
            .content
            .districts
            .get_mut(district_id)
            .ok_or_else(|| SessionError::UnknownDistrict(district_id.to_string()))?;
        district.is_unlocked = true;
        let present = district.defaults_present.clone();

        let first_visit = self.state.visit_district(district_id);
        self.bus.emit(
            Event::new(EventType::DistrictEntered, SESSION_SOURCE)
                .with("district", district_id)
                .with("first_visit", first_visit),
        )?;

        Ok(self.verbs().scan_area(present.iter().map(String::as_str)))
    }

    /// Resolve distortions whose linked default has been rewritten.
    ///
    /// Returns the ids resolved by this call.
    pub fn settle_distortions(&mut self) -> Vec<String> {
        let resolved = self.content.distortions.resolve_rewritten(&self.registry);
        for id in &resolved {
            log::info!("distortion '{}' resolved", id);
        }
        resolved
    }

    // -- Windprint --

    pub fn switch_mode(&mut self, mode: WindprintMode) -> SessionResult<ModeActivation> {
        let activation = self.rig.activate(mode)?;
        self.state.record_mode_use(mode);
        self.bus.emit(
            Event::new(EventType::ModeSwitched, SESSION_SOURCE)
                .with("mode", mode.as_str())
                .with("energy", self.rig.energy()),
        )?;
        Ok(activation)
    }

    pub fn deactivate_mode(&mut self) {
        self.rig.deactivate();
    }

    /// Advance time-based state by `delta` seconds.
    pub fn update(&mut self, delta: f64) {
        self.rig.update(delta);
    }

    // -- Encounters --

    /// Begin an encounter, replacing any active one.
    pub fn start_encounter(&mut self, encounter: Encounter) -> SessionResult<()> {
        let event = Event::new(EventType::EncounterStarted, SESSION_SOURCE)
            .with("name", encounter.name.as_str())
            .with("patterns", encounter.patterns.len());
        self.encounter = Some(encounter);
        self.bus.emit(event)?;
        Ok(())
    }

    /// Apply `verb` to the pattern at `pattern_index`.
    pub fn use_verb(&mut self, verb: Verb, pattern_index: usize) -> SessionResult<VerbOutcome> {
        let encounter = self
            .encounter
            .as_mut()
            .ok_or(SessionError::NoActiveEncounter)?;
        let pattern = encounter
            .patterns
            .get_mut(pattern_index)
            .ok_or(SessionError::UnknownPattern(pattern_index))?;

        let was_resolved = pattern.is_resolved();
        let gain = pattern.receive_verb(verb, &self.effectiveness);
        let pattern_resolved = !was_resolved && pattern.is_resolved();
        let pattern_name = pattern.name.clone();
        let pattern_kind = pattern.kind;
        let encounter_complete = encounter.resolve_check();
        let encounter_name = encounter.name.clone();

        self.state.record_verb_use(verb);
        self.bus.emit(
            Event::new(EventType::VerbUsed, SESSION_SOURCE)
                .with("verb", verb.as_str())
                .with("pattern", pattern_name.as_str())
                .with("gain", gain),
        )?;
        if pattern_resolved {
            self.bus.emit(
                Event::new(EventType::PatternResolved, SESSION_SOURCE)
                    .with("pattern", pattern_name)
                    .with("kind", pattern_kind.as_str()),
            )?;
        }
        if encounter_complete {
            self.encounter = None;
            self.bus.emit(
                Event::new(EventType::EncounterCompleted, SESSION_SOURCE)
                    .with("name", encounter_name),
            )?;
        }

        Ok(VerbOutcome {
            verb,
            gain,
            pattern_resolved,
            encounter_complete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use society_rules::{keys, AntagPattern, DefaultCategory, DefaultEntry, PatternKind};

    fn session() -> Session {
        Session::new(SessionConfig::default().with_dispatch_policy(DispatchPolicy::Propagate))
            .unwrap()
    }

    #[test]
    fn test_new_session() {
        let session = session();
        assert_eq!(session.registry().len(), 15);
        assert_eq!(session.registry().progress(), 0.0);
        assert!(session.active_preset().is_none());
        assert!(session.bus().history().is_empty());
    }

    #[test]
    fn test_registry_missing_adapter_key_fails() {
        let registry = DefaultsRegistry::new().with(DefaultEntry::new(
            keys::TIMING_WINDOW,
            "Timing",
            "narrow",
            DefaultCategory::Timing,
            0.2,
            0.5,
        ));
        let err = Session::with_registry(registry, SessionConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Config(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_unknown_starting_preset_fails() {
        let config = SessionConfig::default().with_starting_preset("turbo");
        assert!(matches!(
            Session::new(config),
            Err(SessionError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_config_from_toml() {
        let config = SessionConfig::from_toml_str(
            r#"
            history_limit = 8
            dispatch_policy = "isolate"
            starting_preset = "gentle"
            "#,
        )
        .unwrap();
        assert_eq!(config.history_limit, Some(8));
        assert_eq!(config.dispatch_policy, DispatchPolicy::Isolate);

        let session = Session::new(config).unwrap();
        assert_eq!(session.active_preset().map(|p| p.id.as_str()), Some("gentle"));
        assert_eq!(session.bus().config().history_limit, Some(8));
    }

    #[test]
    fn test_config_rejects_bad_toml() {
        assert!(SessionConfig::from_toml_str("history_limit = \"many\"").is_err());
    }

    #[test]
    fn test_config_rejects_misspelled_field() {
        let err = SessionConfig::from_toml_str("histroy_limit = 8").unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::Parse(_))));
        assert!(err.to_string().contains("histroy_limit"));

        let config = SessionConfig::from_toml_str("history_limit = 8").unwrap();
        assert_eq!(config.history_limit, Some(8));
    }

    #[test]
    fn test_preset_overlay_does_not_touch_registry() {
        let mut session = session();
        session.apply_preset("gentle").unwrap();

        assert_eq!(session.effective().effective_value(keys::TIMING_WINDOW), Some(0.6));
        assert_eq!(session.registry().get(keys::TIMING_WINDOW), Some(0.2));

        let changed = session.bus().history_of(EventType::DefaultsChanged);
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].get_str("preset_id"), Some("gentle"));

        session.clear_preset().unwrap();
        assert_eq!(session.effective().effective_value(keys::TIMING_WINDOW), Some(0.2));
        assert!(matches!(
            session.apply_preset("turbo"),
            Err(SessionError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_compose_preset() {
        let mut session = session();
        let overrides = BTreeMap::from([(keys::CONSENT_GATES.to_string(), 1.0)]);
        let composed = session
            .compose_preset("Quiet Market", overrides, Some("for June"))
            .unwrap();
        assert_eq!(composed.note.as_deref(), Some("for June"));
        assert_eq!(session.effective().effective_value(keys::CONSENT_GATES), Some(1.0));

        let event = &session.bus().history_of(EventType::DefaultsChanged)[0];
        assert_eq!(event.get_str("preset_name"), Some("Quiet Market"));
        assert_eq!(event.source, COMPOSITION_SOURCE);

        let bad = BTreeMap::from([("gravity".to_string(), 1.0)]);
        assert!(session.compose_preset("Broken", bad, None).is_err());
        assert_eq!(session.active_preset().map(|p| p.name.as_str()), Some("Quiet Market"));
    }

    #[test]
    fn test_chapter_and_drift_events() {
        let mut session = session();
        assert!(session.advance_chapter().unwrap());
        assert!(session.restore_civic_rule().unwrap());
        assert!(!session.restore_civic_rule().unwrap());

        let types: Vec<_> = session.bus().history().iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EventType::ChapterAdvanced,
                EventType::DriftReduced,
                EventType::CivicRuleRestored,
                EventType::DriftReduced,
            ]
        );
        assert_eq!(session.state().current_chapter, 2);
        assert!(session.state().drift_intensity < 1.0);
    }

    #[test]
    fn test_enter_district_scans_defaults() {
        let mut session = session();
        let district_id = session.content().districts.iter().next().unwrap().id.clone();
        let present = session.content().districts.get(&district_id).unwrap().defaults_present.len();

        let found = session.enter_district(&district_id).unwrap();
        assert_eq!(found.len(), present);
        assert!(session.state().districts_visited.contains(&district_id));

        let entered = &session.bus().history_of(EventType::DistrictEntered)[0];
        assert_eq!(entered.get("first_visit").and_then(|v| v.as_bool()), Some(true));

        assert!(matches!(
            session.enter_district("nowhere"),
            Err(SessionError::UnknownDistrict(_))
        ));
    }

    #[test]
    fn test_switch_mode() {
        let mut session = session();
        session.switch_mode(WindprintMode::Cushion).unwrap();
        session.switch_mode(WindprintMode::Guard).unwrap();
        assert_eq!(session.state().cushion_uses, 1);
        assert_eq!(session.state().guard_uses, 1);
        assert_eq!(session.bus().history_of(EventType::ModeSwitched).len(), 2);
        assert!(session.rig().is_guard_active());
    }

    #[test]
    fn test_encounter_flow() {
        let mut session = session();
        assert!(matches!(
            session.use_verb(Verb::Pulse, 0),
            Err(SessionError::NoActiveEncounter)
        ));

        session
            .start_encounter(Encounter::new(
                "Static at the gate",
                vec![AntagPattern::new(PatternKind::Distortion, "Jitter")],
            ))
            .unwrap();
        assert!(matches!(
            session.use_verb(Verb::Pulse, 3),
            Err(SessionError::UnknownPattern(3))
        ));

        // 0.4 per primary verb: three uses resolve it.
        let outcomes: Vec<_> = (0..3)
            .map(|_| session.use_verb(Verb::Pulse, 0).unwrap())
            .collect();
        assert!(!outcomes[1].pattern_resolved);
        assert!(outcomes[2].pattern_resolved);
        assert!(outcomes[2].encounter_complete);
        assert!(session.encounter().is_none());
        assert_eq!(session.state().verb_usage[&Verb::Pulse], 3);

        assert_eq!(session.bus().history_of(EventType::VerbUsed).len(), 3);
        assert_eq!(session.bus().history_of(EventType::PatternResolved).len(), 1);
        assert_eq!(session.bus().history_of(EventType::EncounterCompleted).len(), 1);
    }

    #[test]
    fn test_settle_distortions_after_rewrite() {
        let mut session = session();
        assert!(session.settle_distortions().is_empty());

        let mut verbs = session.verbs();
        verbs.read_default("visual_clutter").unwrap();
        assert!(verbs.rewrite_default("visual_clutter", "cushion").unwrap());

        assert_eq!(session.settle_distortions(), vec!["market_crush".to_string()]);
        let crush = session.content().distortions.get("market_crush").unwrap();
        assert!(crush.is_resolved);
        assert_eq!(crush.severity, 0.0);
        assert_eq!(session.content().distortions.active().count(), 4);
    }
}
