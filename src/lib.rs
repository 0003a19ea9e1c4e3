//! Game logic for a small 3D exploration level
//!
//! This crate provides:
//! - An explicit frame loop with fixed physics steps and an event queue
//! - Entity Component System (ECS) architecture with deferred despawn
//! - Physics simulation with rapier3d
//! - Input handling with winit key codes
//! - Sound cues played with rodio
//! - The level itself: collectibles, doors, breakables, bridges, health
//!   zones and the stagship exit
//!
//! Rendering is left to the host, which reads transforms, `Appearance`
//! components and the `Hud`.

pub mod audio;
pub mod core;
pub mod ecs;
pub mod gameplay;
pub mod input;
pub mod physics;
pub mod renderer;
pub mod ui;

// Re-exports for convenience
pub use glam;
pub use hecs;
pub use rapier3d;
pub use winit;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::audio::{AudioCue, AudioManager, CueLog, CuePlayer};
    pub use crate::core::{
        Engine, EngineConfig, EngineContext, Game, GameConfig, GameEvent, LevelError, Scene,
    };
    pub use crate::ecs::{Name, Tag, Transform, World};
    pub use crate::gameplay::{Level, LevelSummary, PlayerState, Target};
    pub use crate::input::{Input, InputAction, InputMapper};
    pub use crate::physics::{ColliderHandle, Physics, RigidBodyHandle};
    pub use crate::renderer::{Appearance, Camera, Material};
    pub use crate::ui::Hud;
    pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
    pub use winit::keyboard::KeyCode;
}
