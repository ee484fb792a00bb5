//! Translation verbs - the only path through which defaults change.
//!
//! A [`TranslationVerbs`] view borrows the session's registry and bus
//! mutably for as long as it lives. Obtain one from
//! [`Session::verbs`](crate::Session::verbs).

use society_rules::{DefaultSummary, DefaultsRegistry};

use crate::events::{DispatchError, Event, EventBus, EventType};

/// Event source tag for everything emitted here.
pub const VERB_SOURCE: &str = "translation_verbs";

/// Read and rewrite defaults, announcing each state change on the bus.
///
/// Every operation validates, mutates the registry, then emits. The registry
/// stays borrowed here during dispatch, so handlers see the post-mutation
/// value only through the event's `value` payload. A handler failure under
/// [`DispatchPolicy::Propagate`](crate::DispatchPolicy::Propagate) surfaces
/// as `Err`, but the mutation has already been applied.
pub struct TranslationVerbs<'a> {
    registry: &'a mut DefaultsRegistry,
    bus: &'a mut EventBus,
}

impl<'a> TranslationVerbs<'a> {
    pub(crate) fn new(registry: &'a mut DefaultsRegistry, bus: &'a mut EventBus) -> Self {
        Self { registry, bus }
    }

    /// Reveal the hidden assumption behind a default.
    ///
    /// Returns `Ok(None)` for an unknown key. `DefaultRead` is emitted on the
    /// first read only; later reads return the description silently.
    pub fn read_default(&mut self, key: &str) -> Result<Option<String>, DispatchError> {
        let first_read = match self.registry.get_default(key) {
            Some(entry) => !entry.is_read(),
            None => return Ok(None),
        };

        let Some(description) = self.registry.read(key) else {
            return Ok(None);
        };
        log::debug!("read default '{}'", key);

        if first_read {
            self.bus.emit(
                Event::new(EventType::DefaultRead, VERB_SOURCE)
                    .with("key", key)
                    .with("description", description.clone()),
            )?;
        }
        Ok(Some(description))
    }

    /// Rewrite a previously read default.
    ///
    /// `via_mode` is a free-form tag ("cushion", "guard", "dialogue", ...)
    /// carried on the event. It does not affect the value. Returns `Ok(false)`
    /// for an unknown or unread key. Rewriting twice succeeds without a
    /// second event.
    pub fn rewrite_default(&mut self, key: &str, via_mode: &str) -> Result<bool, DispatchError> {
        let already_rewritten = match self.registry.get_default(key) {
            Some(entry) => entry.is_rewritten(),
            None => return Ok(false),
        };

        if !self.registry.rewrite(key) {
            log::debug!("rewrite of '{}' refused: not read yet", key);
            return Ok(false);
        }
        if already_rewritten {
            return Ok(true);
        }

        let value = self.registry.get(key).unwrap_or_default();
        log::debug!("rewrote default '{}' via {} -> {}", key, via_mode, value);

        self.bus.emit(
            Event::new(EventType::DefaultRewritten, VERB_SOURCE)
                .with("key", key)
                .with("mode", via_mode)
                .with("value", value),
        )?;
        Ok(true)
    }

    /// Unread defaults among `keys`. Unknown keys are skipped.
    pub fn scan_area<'k, I>(&self, keys: I) -> Vec<DefaultSummary>
    where
        I: IntoIterator<Item = &'k str>,
    {
        keys.into_iter()
            .filter_map(|key| self.registry.get_default(key))
            .filter(|entry| !entry.is_read())
            .map(|entry| entry.summary())
            .collect()
    }

    /// Read-only view of the registry.
    pub fn registry(&self) -> &DefaultsRegistry {
        self.registry
    }
}
