//! Synchronous, single-threaded event bus with a diagnostic history.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

use super::{Event, EventType};

/// Failure reported by a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type HandlerResult = Result<(), HandlerError>;

/// A subscriber failure surfaced to the emitting caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("subscriber {subscription} failed on {event_type:?}: {source}")]
pub struct DispatchError {
    pub event_type: EventType,
    pub subscription: SubscriptionId,
    #[source]
    pub source: HandlerError,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What `emit` does when a subscriber fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Stop dispatch and return the error to the caller.
    Propagate,
    /// Log the error and keep dispatching.
    Isolate,
}

impl Default for DispatchPolicy {
    /// Propagate in debug builds, isolate in release builds.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            DispatchPolicy::Propagate
        } else {
            DispatchPolicy::Isolate
        }
    }
}

/// Bus settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EventBusConfig {
    /// Oldest events are dropped past this many. `None` keeps everything.
    pub history_limit: Option<usize>,
    pub dispatch_policy: DispatchPolicy,
}

type Handler = Box<dyn FnMut(&Event) -> HandlerResult>;

/// Publish/subscribe channel.
///
/// Dispatch is synchronous: every handler subscribed to an event's type
/// has run, in subscription order, by the time `emit` returns.
pub struct EventBus {
    config: EventBusConfig,
    handlers: BTreeMap<EventType, Vec<(SubscriptionId, Handler)>>,
    history: VecDeque<Event>,
    next_subscription: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            config,
            handlers: BTreeMap::new(),
            history: VecDeque::new(),
            next_subscription: 1,
        }
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    /// Register a fallible handler for one event type.
    pub fn subscribe<F>(&mut self, event_type: EventType, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) -> HandlerResult + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;

        self.handlers
            .entry(event_type)
            .or_default()
            .push((id, Box::new(handler)));

        log::debug!("subscription {} registered for {:?}", id, event_type);
        id
    }

    /// Register a handler that cannot fail.
    pub fn observe<F>(&mut self, event_type: EventType, mut handler: F) -> SubscriptionId
    where
        F: FnMut(&Event) + 'static,
    {
        self.subscribe(event_type, move |event| {
            handler(event);
            Ok(())
        })
    }

    /// Remove a handler. Unknown ids are ignored and return `false`.
    pub fn unsubscribe(&mut self, event_type: EventType, id: SubscriptionId) -> bool {
        let Some(handlers) = self.handlers.get_mut(&event_type) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(sub_id, _)| *sub_id != id);
        before != handlers.len()
    }

    /// Number of handlers for an event type.
    pub fn subscriber_count(&self, event_type: EventType) -> usize {
        self.handlers.get(&event_type).map_or(0, Vec::len)
    }

    /// Record the event and run every handler for its type.
    pub fn emit(&mut self, event: Event) -> Result<(), DispatchError> {
        let event_type = event.event_type;
        self.record(event.clone());

        let policy = self.config.dispatch_policy;
        let Some(handlers) = self.handlers.get_mut(&event_type) else {
            return Ok(());
        };
        log::debug!("dispatching {:?} to {} handlers", event_type, handlers.len());

        for (id, handler) in handlers.iter_mut() {
            if let Err(source) = handler(&event) {
                let error = DispatchError {
                    event_type,
                    subscription: *id,
                    source,
                };
                match policy {
                    DispatchPolicy::Propagate => return Err(error),
                    DispatchPolicy::Isolate => log::warn!("{}", error),
                }
            }
        }
        Ok(())
    }

    fn record(&mut self, event: Event) {
        self.history.push_back(event);
        if let Some(limit) = self.config.history_limit {
            while self.history.len() > limit {
                self.history.pop_front();
            }
        }
    }

    /// Events emitted since the last clear, oldest first.
    pub fn history(&self) -> &VecDeque<Event> {
        &self.history
    }

    /// History entries of one type.
    pub fn history_of(&self, event_type: EventType) -> Vec<&Event> {
        self.history
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("config", &self.config)
            .field(
                "handlers",
                &self
                    .handlers
                    .iter()
                    .map(|(t, h)| (*t, h.len()))
                    .collect::<Vec<_>>(),
            )
            .field("history_len", &self.history.len())
            .finish()
    }
}
