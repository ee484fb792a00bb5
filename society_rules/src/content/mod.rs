//! Content records that reference registry keys.
//!
//! Content is loaded from TOML once at startup and validated against the
//! registry before play begins. Nothing here is hot-reloaded.

mod chapters;
mod distortions;
mod districts;
mod presets;

pub use chapters::*;
pub use distortions::*;
pub use districts::*;
pub use presets::*;

use crate::defaults::DefaultsRegistry;
use crate::error::ConfigResult;

/// All built-in content, validated against one registry.
#[derive(Debug, Clone)]
pub struct SocietyContent {
    pub presets: PresetCatalog,
    pub chapters: ChapterBook,
    pub districts: DistrictMap,
    pub distortions: DistortionSet,
}

impl SocietyContent {
    /// Load the embedded content and validate every key reference.
    pub fn builtin(registry: &DefaultsRegistry) -> ConfigResult<Self> {
        Ok(Self {
            presets: PresetCatalog::builtin(registry)?,
            chapters: ChapterBook::builtin(registry)?,
            districts: DistrictMap::builtin(registry)?,
            distortions: DistortionSet::builtin(registry)?,
        })
    }

    /// Re-run validation, e.g. after swapping in a custom registry.
    pub fn validate(&self, registry: &DefaultsRegistry) -> ConfigResult<()> {
        self.presets.validate(registry)?;
        self.chapters.validate(registry)?;
        self.districts.validate(registry)?;
        self.distortions.validate(registry)
    }
}
