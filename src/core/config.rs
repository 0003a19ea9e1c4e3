//! Engine and gameplay configuration

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::gameplay::{CrystalLatch, ThirdPersonController};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name used in log output
    pub title: String,
    /// Seconds per physics step
    pub fixed_timestep: f32,
    /// Fixed steps allowed per frame before time is dropped
    pub max_substeps: u32,
    pub gravity: Vec3,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: String::from("stagship"),
            fixed_timestep: 0.02,
            max_substeps: 5,
            gravity: Vec3::new(0.0, -9.81, 0.0),
        }
    }
}

impl EngineConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the physics step length; non-positive values are ignored
    pub fn with_fixed_timestep(mut self, seconds: f32) -> Self {
        if seconds > 0.0 {
            self.fixed_timestep = seconds;
        }
        self
    }

    pub fn with_max_substeps(mut self, steps: u32) -> Self {
        self.max_substeps = steps.max(1);
        self
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }
}

/// Gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Reach of the interaction ray from the camera
    pub interaction_distance: f32,
    pub max_health: i32,
    /// Impulse given to a fired projectile
    pub fire_strength: f32,
    /// Seconds before a projectile despawns
    pub projectile_lifetime: f32,
    /// Value of the coin a broken box drops
    pub box_coin_value: i32,
    pub move_speed: f32,
    pub rotation_speed: f32,
    pub jump_force: f32,
    pub ground_check_distance: f32,
    /// Seconds the completion message stays up
    pub message_duration: f32,
    pub crystal_latch: CrystalLatch,
}

impl Default for GameConfig {
    fn default() -> Self {
        let controller = ThirdPersonController::default();
        Self {
            interaction_distance: 2.0,
            max_health: 100,
            fire_strength: 5.0,
            projectile_lifetime: 5.0,
            box_coin_value: 1,
            move_speed: controller.move_speed,
            rotation_speed: controller.rotation_speed,
            jump_force: controller.jump_force,
            ground_check_distance: controller.ground_check_distance,
            message_duration: 3.0,
            crystal_latch: CrystalLatch::default(),
        }
    }
}

impl GameConfig {
    /// Controller tuned by this config, for a body whose feet are
    /// `foot_offset` below its origin
    pub fn controller(&self, foot_offset: f32) -> ThirdPersonController {
        ThirdPersonController {
            move_speed: self.move_speed,
            rotation_speed: self.rotation_speed,
            jump_force: self.jump_force,
            ground_check_distance: self.ground_check_distance,
            foot_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_builders() {
        let config = EngineConfig::default()
            .with_title("test")
            .with_fixed_timestep(0.01)
            .with_fixed_timestep(-1.0)
            .with_max_substeps(0);

        assert_eq!(config.title, "test");
        assert_eq!(config.fixed_timestep, 0.01);
        assert_eq!(config.max_substeps, 1);
    }

    #[test]
    fn test_game_config_partial_ron() {
        let config: GameConfig =
            ron::from_str("(max_health: 50, crystal_latch: OnCollect)").unwrap();

        assert_eq!(config.max_health, 50);
        assert_eq!(config.crystal_latch, CrystalLatch::OnCollect);
        assert_eq!(config.interaction_distance, 2.0);
        assert_eq!(config.message_duration, 3.0);
    }

    #[test]
    fn test_controller_from_config() {
        let config = GameConfig {
            jump_force: 8.0,
            ..Default::default()
        };
        let controller = config.controller(1.0);
        assert_eq!(controller.jump_force, 8.0);
        assert_eq!(controller.move_speed, 5.0);
    }
}
