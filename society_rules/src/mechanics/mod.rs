//! Game mechanics: combat verbs, antagonistic patterns, signals, Windprint modes.

mod combat;
mod windprint;

pub use combat::*;
pub use windprint::*;
