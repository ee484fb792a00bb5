//! The one place where a missing default is replaced by a constant.
//!
//! Every adapter resolves its inputs through [`resolve`]. A missing key
//! falls back to that key's rigid baseline and logs a warning. Sessions
//! validate [`AdapterKey::ALL`] at startup, so in a validated session the
//! fallback never fires.

use serde::{Deserialize, Serialize};
use society_rules::{keys, ValueSource};

/// Registry keys consumed by adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdapterKey {
    TimingWindow,
    CoyoteTime,
    JumpBuffer,
    PlatformRhythm,
    VisualClutter,
    AudioLayering,
    ScreenShake,
    RouteStrictness,
    SafeRouteVisibility,
    FailurePenalty,
    RetryCost,
}

impl AdapterKey {
    pub const ALL: [AdapterKey; 11] = [
        AdapterKey::TimingWindow,
        AdapterKey::CoyoteTime,
        AdapterKey::JumpBuffer,
        AdapterKey::PlatformRhythm,
        AdapterKey::VisualClutter,
        AdapterKey::AudioLayering,
        AdapterKey::ScreenShake,
        AdapterKey::RouteStrictness,
        AdapterKey::SafeRouteVisibility,
        AdapterKey::FailurePenalty,
        AdapterKey::RetryCost,
    ];

    /// Registry key.
    pub fn key(&self) -> &'static str {
        match self {
            AdapterKey::TimingWindow => keys::TIMING_WINDOW,
            AdapterKey::CoyoteTime => keys::COYOTE_TIME,
            AdapterKey::JumpBuffer => keys::JUMP_BUFFER,
            AdapterKey::PlatformRhythm => keys::PLATFORM_RHYTHM,
            AdapterKey::VisualClutter => keys::VISUAL_CLUTTER,
            AdapterKey::AudioLayering => keys::AUDIO_LAYERING,
            AdapterKey::ScreenShake => keys::SCREEN_SHAKE,
            AdapterKey::RouteStrictness => keys::ROUTE_STRICTNESS,
            AdapterKey::SafeRouteVisibility => keys::SAFE_ROUTE_VISIBILITY,
            AdapterKey::FailurePenalty => keys::FAILURE_PENALTY,
            AdapterKey::RetryCost => keys::RETRY_COST,
        }
    }

    /// Value used when the key is missing: the rigid baseline.
    pub fn fallback(&self) -> f64 {
        match self {
            AdapterKey::TimingWindow => 0.2,
            AdapterKey::CoyoteTime => 0.0,
            AdapterKey::JumpBuffer => 0.0,
            AdapterKey::PlatformRhythm => 1.0,
            AdapterKey::VisualClutter => 1.0,
            AdapterKey::AudioLayering => 1.0,
            AdapterKey::ScreenShake => 1.0,
            AdapterKey::RouteStrictness => 1.0,
            AdapterKey::SafeRouteVisibility => 0.0,
            AdapterKey::FailurePenalty => 1.0,
            AdapterKey::RetryCost => 1.0,
        }
    }

    /// All registry keys adapters depend on.
    pub fn all_keys() -> impl Iterator<Item = &'static str> {
        Self::ALL.into_iter().map(|k| k.key())
    }
}

/// Value of `key` from `source`, or its documented fallback.
pub fn resolve<S>(source: &S, key: AdapterKey) -> f64
where
    S: ValueSource + ?Sized,
{
    match source.value(key.key()) {
        Some(value) => value,
        None => {
            log::warn!(
                "default '{}' missing, using fallback {}",
                key.key(),
                key.fallback()
            );
            key.fallback()
        }
    }
}
