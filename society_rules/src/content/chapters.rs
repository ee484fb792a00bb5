//! Chapter records and the defaults each chapter teaches.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::defaults::DefaultsRegistry;
use crate::error::{ConfigError, ConfigResult};

const BUILTIN_CHAPTERS: &str = include_str!("../../data/chapters.toml");

/// One of the story chapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: u32,
    pub name: String,
    /// District id.
    pub location: String,
    pub theme: String,
    pub civic_rule_id: String,
    pub primary_mechanic: String,
    #[serde(default)]
    pub npcs: Vec<String>,
    /// Registry keys this chapter teaches.
    #[serde(default)]
    pub defaults_to_rewrite: Vec<String>,
}

impl Chapter {
    pub fn teaches(&self, key: &str) -> bool {
        self.defaults_to_rewrite.iter().any(|k| k == key)
    }
}

#[derive(Debug, Deserialize)]
struct ChapterFile {
    #[serde(default)]
    chapter: Vec<Chapter>,
}

/// Ordered chapters, numbered 1..=N without gaps.
#[derive(Debug, Clone, Default)]
pub struct ChapterBook {
    chapters: Vec<Chapter>,
}

impl ChapterBook {
    /// Parse and check numbering.
    pub fn parse(source: &str) -> ConfigResult<Self> {
        let mut file: ChapterFile = toml::from_str(source)?;

        let mut seen = HashSet::new();
        for chapter in &file.chapter {
            if !seen.insert(chapter.number) {
                return Err(ConfigError::DuplicateId {
                    kind: "chapter",
                    id: chapter.number.to_string(),
                });
            }
        }

        file.chapter.sort_by_key(|c| c.number);
        for (expected, chapter) in (1u32..).zip(&file.chapter) {
            if chapter.number != expected {
                return Err(ConfigError::InvalidValue {
                    owner: format!("chapter '{}'", chapter.name),
                    reason: format!("expected chapter {}, found {}", expected, chapter.number),
                });
            }
        }

        Ok(Self {
            chapters: file.chapter,
        })
    }

    /// Parse and validate `defaults_to_rewrite` against `registry`.
    pub fn load(source: &str, registry: &DefaultsRegistry) -> ConfigResult<Self> {
        let book = Self::parse(source)?;
        book.validate(registry)?;
        Ok(book)
    }

    pub fn builtin(registry: &DefaultsRegistry) -> ConfigResult<Self> {
        Self::load(BUILTIN_CHAPTERS, registry)
    }

    pub fn validate(&self, registry: &DefaultsRegistry) -> ConfigResult<()> {
        for chapter in &self.chapters {
            registry.ensure_keys(
                &format!("chapter {} '{}'", chapter.number, chapter.name),
                chapter.defaults_to_rewrite.iter().map(String::as_str),
            )?;
        }
        Ok(())
    }

    /// Chapter by 1-based number.
    pub fn get(&self, number: u32) -> Option<&Chapter> {
        let index = number.checked_sub(1)? as usize;
        self.chapters.get(index)
    }

    /// Chapters that teach `key`.
    pub fn teaching(&self, key: &str) -> Vec<&Chapter> {
        self.chapters.iter().filter(|c| c.teaches(key)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chapter> {
        self.chapters.iter()
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}
