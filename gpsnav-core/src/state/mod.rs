//! Navigation state machine
//!
//! Defines which activity the navigator is running.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;
pub mod menu;

pub use events::NavEvent;
pub use machine::NavState;
pub use menu::{MainMenu, MenuAction, MenuItem};
