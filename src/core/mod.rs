//! Core engine module
//!
//! Contains the frame loop, the event queue, configuration and level files

mod config;
mod engine;
mod events;
mod scene;
mod time;

pub use config::{EngineConfig, GameConfig};
pub use engine::{Engine, EngineContext, Game};
pub use events::{EventQueue, GameEvent};
pub use scene::{EntityKind, LevelError, Scene, SceneEntity, ScriptStep, ScriptedInput};
pub use time::{MAX_FRAME_DELTA, Time};
