//! Input handling module
//!
//! Provides raw input state tracking and the mapping from keys to actions.

mod command;
mod state;

pub use command::{InputAction, InputMapper};
pub use state::Input;
