//! The standard catalog of Society defaults.

use super::{DefaultCategory, DefaultEntry, DefaultsRegistry};

/// Stable keys of the standard catalog.
pub mod keys {
    pub const TIMING_WINDOW: &str = "timing_window";
    pub const PLATFORM_RHYTHM: &str = "platform_rhythm";
    pub const COYOTE_TIME: &str = "coyote_time";
    pub const JUMP_BUFFER: &str = "jump_buffer";

    pub const VISUAL_CLUTTER: &str = "visual_clutter";
    pub const AUDIO_LAYERING: &str = "audio_layering";
    pub const SCREEN_SHAKE: &str = "screen_shake";

    pub const ROUTE_STRICTNESS: &str = "route_strictness";
    pub const SAFE_ROUTE_VISIBILITY: &str = "safe_route_visibility";

    pub const COMMUNICATION_RIGIDITY: &str = "communication_rigidity";
    pub const SOCIAL_SCRIPT_PENALTY: &str = "social_script_penalty";

    pub const FAILURE_PENALTY: &str = "failure_penalty";
    pub const RETRY_COST: &str = "retry_cost";

    pub const CONSENT_GATES: &str = "consent_gates";
    pub const OPT_OUT_AVAILABLE: &str = "opt_out_available";
}

/// (key, label, description, category, rigid, rewritten)
type CatalogRow = (
    &'static str,
    &'static str,
    &'static str,
    DefaultCategory,
    f64,
    f64,
);

const STANDARD_CATALOG: [CatalogRow; 15] = [
    // Timing
    (
        keys::TIMING_WINDOW,
        "Timing Window Width",
        "Assumes all players react within 200 ms. Penalises slower processing speeds.",
        DefaultCategory::Timing,
        0.2,
        0.5,
    ),
    (
        keys::PLATFORM_RHYTHM,
        "Platform Rhythm",
        "Platforms move at one fixed tempo. No accommodation for observation before action.",
        DefaultCategory::Timing,
        1.0,
        0.6,
    ),
    (
        keys::COYOTE_TIME,
        "Coyote Time",
        "Zero grace period after leaving a ledge. Assumes instant spatial awareness.",
        DefaultCategory::Timing,
        0.0,
        0.2,
    ),
    (
        keys::JUMP_BUFFER,
        "Jump Buffer Window",
        "No input buffering. Requires frame-perfect timing.",
        DefaultCategory::Timing,
        0.0,
        0.15,
    ),
    // Sensory
    (
        keys::VISUAL_CLUTTER,
        "Visual Density",
        "All particle effects, decorations, and ambient motion rendered simultaneously. \
         Assumes high sensory filtering.",
        DefaultCategory::Sensory,
        1.0,
        0.4,
    ),
    (
        keys::AUDIO_LAYERING,
        "Audio Layering",
        "Multiple concurrent audio streams with no ducking. Assumes ability to parse layered sound.",
        DefaultCategory::Sensory,
        1.0,
        0.5,
    ),
    (
        keys::SCREEN_SHAKE,
        "Screen Shake Intensity",
        "Full camera shake on impacts. Assumes vestibular comfort.",
        DefaultCategory::Sensory,
        1.0,
        0.0,
    ),
    // Routing
    (
        keys::ROUTE_STRICTNESS,
        "Route Strictness",
        "Single valid path through each area. Penalises alternative approaches.",
        DefaultCategory::Routing,
        1.0,
        0.3,
    ),
    (
        keys::SAFE_ROUTE_VISIBILITY,
        "Safe Route Visibility",
        "Accessible routes are hidden behind harder paths. Assumes safe routes are 'easy mode'.",
        DefaultCategory::Routing,
        0.0,
        1.0,
    ),
    // Social
    (
        keys::COMMUNICATION_RIGIDITY,
        "Communication Mode",
        "Only one expression style is accepted. Penalises non-verbal or icon-based communication.",
        DefaultCategory::Social,
        1.0,
        0.0,
    ),
    (
        keys::SOCIAL_SCRIPT_PENALTY,
        "Social Script Penalty",
        "NPCs penalise 'unexpected' dialogue responses. Assumes one correct conversational flow.",
        DefaultCategory::Social,
        1.0,
        0.0,
    ),
    // Failure
    (
        keys::FAILURE_PENALTY,
        "Failure Penalty",
        "Falling or missing a jump resets significant progress. \
         Assumes failure is deviation, not information.",
        DefaultCategory::Failure,
        1.0,
        0.1,
    ),
    (
        keys::RETRY_COST,
        "Retry Cost",
        "Retrying a section costs resources. Assumes learning happens on the first attempt.",
        DefaultCategory::Failure,
        1.0,
        0.0,
    ),
    // Consent
    (
        keys::CONSENT_GATES,
        "Consent Gates",
        "No confirmation before danger zones. Assumes willingness to proceed.",
        DefaultCategory::Consent,
        0.0,
        1.0,
    ),
    (
        keys::OPT_OUT_AVAILABLE,
        "Opt-Out Availability",
        "No way to leave an encounter once started. Assumes commitment is always free.",
        DefaultCategory::Consent,
        0.0,
        1.0,
    ),
];

impl DefaultsRegistry {
    /// Registry pre-populated with every standard Society default.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for (key, label, description, category, rigid, rewritten) in STANDARD_CATALOG {
            registry.register(DefaultEntry::new(
                key,
                label,
                description,
                category,
                rigid,
                rewritten,
            ));
        }
        log::debug!("registered {} standard defaults", registry.len());
        registry
    }
}
