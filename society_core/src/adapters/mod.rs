//! Consumer adapters - derive domain behaviour from registry values.
//!
//! Adapters read through [`ValueSource`](society_rules::ValueSource) and
//! never write back. Transient modifiers such as an active Windprint mode are
//! applied at read time on top of the registry value.

mod combat;
mod fallback;
mod movement;
mod routes;
mod sensory;
mod windprint;

pub use combat::*;
pub use fallback::*;
pub use movement::*;
pub use routes::*;
pub use sensory::*;
pub use windprint::*;
