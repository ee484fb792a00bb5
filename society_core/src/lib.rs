//! # Society Core
//!
//! The engine around the Defaults Registry. It holds the event bus, the
//! translation verbs that are the only mutation path into the registry,
//! the consumer adapters that derive behaviour from registry values, and
//! the preset composition layer.
//!
//! ## Core Components
//!
//! - **events**: synchronous publish/subscribe with a diagnostic history
//! - **verbs**: Read Default / Rewrite Default, the two-phase protocol
//! - **adapters**: movement, sensory, combat, Windprint and route consumers
//! - **composition**: preset overlays and player-composed presets
//! - **session**: owns the registry and bus for one playthrough
//! - **diagnostics**: traces one rewrite through every adapter
//!
//! ## Design Philosophy
//!
//! - **Pull-based**: adapters re-derive from the registry on every query
//! - **Single mutator**: only the verb interface can change registry state
//! - **Fail fast on content**: bad key references stop startup, not play

pub mod adapters;
pub mod composition;
pub mod diagnostics;
pub mod events;
pub mod session;
pub mod verbs;

pub use adapters::*;
pub use composition::*;
pub use diagnostics::*;
pub use events::*;
pub use session::*;
pub use verbs::*;
