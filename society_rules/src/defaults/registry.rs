//! Defaults Registry - the single source of truth for every tunable value.

use serde::Serialize;
use std::collections::HashMap;

use super::{DefaultCategory, DefaultEntry};
use crate::error::{ConfigError, ConfigResult};

/// Anything that can answer "what is the value of this default right now".
///
/// Consumers read through this trait so they work the same against the
/// raw registry and against a preset overlay.
pub trait ValueSource {
    /// Current value for `key`, or `None` when the key is unknown.
    fn value(&self, key: &str) -> Option<f64>;
}

/// Central registry of every rewritable default in the Society.
///
/// Entries keep their registration order so listings are deterministic.
/// Counters and progress are derived on demand and never stored.
#[derive(Debug, Clone, Serialize, Default)]
pub struct DefaultsRegistry {
    entries: Vec<DefaultEntry>,

    /// Key -> position in `entries`.
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DefaultsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a default during initialization.
    ///
    /// # Panics
    ///
    /// Panics when the key is already registered.
    pub fn register(&mut self, entry: DefaultEntry) {
        if self.index.contains_key(entry.key()) {
            panic!("default '{}' registered twice", entry.key());
        }
        self.index.insert(entry.key().to_string(), self.entries.len());
        self.entries.push(entry);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, entry: DefaultEntry) -> Self {
        self.register(entry);
        self
    }

    /// Current value of a default, or `None` for an unknown key.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.get_default(key).map(DefaultEntry::current_value)
    }

    /// Full entry for inspection.
    pub fn get_default(&self, key: &str) -> Option<&DefaultEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    fn get_default_mut(&mut self, key: &str) -> Option<&mut DefaultEntry> {
        match self.index.get(key) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    /// Read a default. `None` for an unknown key.
    pub fn read(&mut self, key: &str) -> Option<String> {
        self.get_default_mut(key).map(DefaultEntry::read)
    }

    /// Rewrite a default. `false` for an unknown key or an unread default.
    pub fn rewrite(&mut self, key: &str) -> bool {
        self.get_default_mut(key)
            .map(DefaultEntry::rewrite)
            .unwrap_or(false)
    }

    /// Whether `key` is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &DefaultEntry> {
        self.entries.iter()
    }

    /// All keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(DefaultEntry::key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Defaults the player can still Read.
    pub fn list_readable(&self) -> Vec<&DefaultEntry> {
        self.entries.iter().filter(|d| !d.is_read()).collect()
    }

    /// Defaults that have been Read but not yet Rewritten.
    pub fn list_rewritable(&self) -> Vec<&DefaultEntry> {
        self.entries
            .iter()
            .filter(|d| d.is_read() && !d.is_rewritten())
            .collect()
    }

    /// Victory check. Vacuously true for an empty registry.
    pub fn all_rewritten(&self) -> bool {
        self.entries.iter().all(DefaultEntry::is_rewritten)
    }

    pub fn read_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_read()).count()
    }

    pub fn rewritten_count(&self) -> usize {
        self.entries.iter().filter(|d| d.is_rewritten()).count()
    }

    /// Fraction of defaults rewritten, 0.0 for an empty registry.
    pub fn progress(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.rewritten_count() as f64 / self.entries.len() as f64
    }

    /// All defaults in a category, regardless of status.
    pub fn by_category(&self, category: DefaultCategory) -> Vec<&DefaultEntry> {
        self.entries
            .iter()
            .filter(|d| d.category() == category)
            .collect()
    }

    /// Check that every key referenced by `owner` is registered.
    ///
    /// Used by content loaders at startup so a typo surfaces before play.
    pub fn ensure_keys<'a, I>(&self, owner: &str, keys: I) -> ConfigResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for key in keys {
            if !self.contains(key) {
                return Err(ConfigError::UnknownKey {
                    owner: owner.to_string(),
                    key: key.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl ValueSource for DefaultsRegistry {
    fn value(&self, key: &str) -> Option<f64> {
        self.get(key)
    }
}
