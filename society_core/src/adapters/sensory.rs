//! Sensory presentation derived from registry values.

use serde::{Deserialize, Serialize};
use society_rules::{cushion, guard, ValueSource, WindprintMode};

use super::{resolve, AdapterKey};

/// Subtitle presentation. A player preference, not a Society default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleStyle {
    #[default]
    Standard,
    HighContrast,
    DyslexiaFriendly,
    /// Speaker tags and dialogue only.
    Minimal,
}

/// What the renderer and mixer should present this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensoryProfile {
    /// 0.0 = minimal, 1.0 = full.
    pub visual_density: f64,
    /// 0.0 = single layer, 1.0 = all concurrent streams.
    pub audio_layers: f64,
    pub screen_shake: f64,
    /// Ambient and platform motion, tied to platform rhythm.
    pub motion_intensity: f64,
    pub subtitle_style: SubtitleStyle,
}

impl SensoryProfile {
    /// Derive the profile, applying the active mode's softening on top.
    pub fn derive<S>(source: &S, mode: Option<WindprintMode>, subtitle_style: SubtitleStyle) -> Self
    where
        S: ValueSource + ?Sized,
    {
        let mut profile = Self {
            visual_density: resolve(source, AdapterKey::VisualClutter),
            audio_layers: resolve(source, AdapterKey::AudioLayering),
            screen_shake: resolve(source, AdapterKey::ScreenShake),
            motion_intensity: resolve(source, AdapterKey::PlatformRhythm),
            subtitle_style,
        };

        match mode {
            Some(WindprintMode::Cushion) => {
                profile.visual_density *= 1.0 - cushion::CLUTTER_REDUCTION;
            }
            Some(WindprintMode::Guard) => {
                profile.screen_shake *= 1.0 - guard::JITTER_STABILISATION;
            }
            None => {}
        }

        profile
    }

    /// True when nothing is shaking or moving.
    pub fn is_still(&self) -> bool {
        self.screen_shake == 0.0 && self.motion_intensity == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use society_rules::{keys, DefaultsRegistry};

    #[test]
    fn test_rigid_profile() {
        let registry = DefaultsRegistry::standard();
        let profile = SensoryProfile::derive(&registry, None, SubtitleStyle::default());
        assert_eq!(profile.visual_density, 1.0);
        assert_eq!(profile.audio_layers, 1.0);
        assert_eq!(profile.screen_shake, 1.0);
        assert_eq!(profile.motion_intensity, 1.0);
        assert_eq!(profile.subtitle_style, SubtitleStyle::Standard);
    }

    #[test]
    fn test_rewritten_shake_is_zero() {
        let mut registry = DefaultsRegistry::standard();
        registry.read(keys::SCREEN_SHAKE);
        registry.rewrite(keys::SCREEN_SHAKE);
        let profile = SensoryProfile::derive(&registry, None, SubtitleStyle::DyslexiaFriendly);
        assert_eq!(profile.screen_shake, 0.0);
        assert_eq!(profile.subtitle_style, SubtitleStyle::DyslexiaFriendly);
    }

    #[test]
    fn test_mode_softening() {
        let registry = DefaultsRegistry::standard();

        let cushioned =
            SensoryProfile::derive(&registry, Some(WindprintMode::Cushion), SubtitleStyle::Minimal);
        assert!((cushioned.visual_density - 0.4).abs() < 1e-9);
        assert_eq!(cushioned.screen_shake, 1.0);

        let guarded =
            SensoryProfile::derive(&registry, Some(WindprintMode::Guard), SubtitleStyle::Minimal);
        assert!((guarded.screen_shake - 0.1).abs() < 1e-9);
        assert_eq!(guarded.visual_density, 1.0);
    }

    #[test]
    fn test_subtitle_style_names() {
        let names: Vec<String> = [
            SubtitleStyle::Standard,
            SubtitleStyle::HighContrast,
            SubtitleStyle::DyslexiaFriendly,
            SubtitleStyle::Minimal,
        ]
        .iter()
        .map(|style| serde_json::to_string(style).unwrap())
        .collect();
        assert_eq!(
            names,
            [r#""standard""#, r#""high_contrast""#, r#""dyslexia_friendly""#, r#""minimal""#]
        );
        assert!(serde_json::from_str::<SubtitleStyle>(r#""large""#).is_err());
    }
}
