//! # Society Rules
//!
//! The rule book of Spiny Flannel Society: the Defaults Registry, the
//! mechanics tables, and the content records that reference registry keys.
//! This crate owns data and invariants only. It does not dispatch events
//! or drive the game loop.

pub mod content;
pub mod defaults;
pub mod error;
pub mod mechanics;
pub mod society_state;

pub use content::*;
pub use defaults::*;
pub use error::*;
pub use mechanics::*;
pub use society_state::*;
