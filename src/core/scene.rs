//! Level description, serialization and validation
//!
//! Levels are saved and loaded as RON (Rusty Object Notation) or JSON. A
//! level lists the objects to spawn, the gameplay tuning, and an optional
//! scripted input track for headless runs.

use std::fs;
use std::path::Path;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::core::GameConfig;
use crate::ecs::Transform;
use crate::gameplay::{CollectibleKind, DestructibleKind, ZoneEffect};
use crate::input::{Input, InputAction};

/// What an entry in the level spawns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Static box the player walks on
    Ground { half_extents: Vec3 },
    /// Static box that blocks movement
    Wall { half_extents: Vec3 },
    Collectible(CollectibleKind),
    Door { locked: bool, half_extents: Vec3 },
    Destructible(DestructibleKind),
    /// Platform oscillating between `min_y` and `max_y` above its start height
    Bridge {
        half_extents: Vec3,
        min_y: f32,
        max_y: f32,
        speed: f32,
    },
    HealthZone {
        effect: ZoneEffect,
        half_extents: Vec3,
    },
    /// Reaching it with the crystal completes the level
    Stagship { half_extents: Vec3 },
}

/// One object in the level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneEntity {
    #[serde(default)]
    pub name: Option<String>,
    pub transform: Transform,
    pub kind: EntityKind,
}

impl SceneEntity {
    pub fn new(kind: EntityKind, position: Vec3) -> Self {
        Self {
            name: None,
            transform: Transform::from_position(position),
            kind,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Input fed to the game by a headless run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScriptedInput {
    /// Trigger a discrete action
    Action(InputAction),
    /// Hold the movement axes at this value
    Axes(Vec2),
    /// Stop holding the movement axes
    ReleaseAxes,
    /// Camera look delta, in mouse units
    Look(Vec2),
}

impl ScriptedInput {
    /// Feed this input into the frame's input state
    pub fn apply(self, input: &mut Input) {
        match self {
            Self::Action(action) => input.inject_action(action),
            Self::Axes(axes) => input.set_axes(Some(axes)),
            Self::ReleaseAxes => input.set_axes(None),
            Self::Look(delta) => input.process_mouse_delta(delta),
        }
    }
}

/// Input applied at the start of frame `frame`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub frame: u64,
    pub input: ScriptedInput,
}

/// A playable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Level name
    pub name: String,
    /// Level format version
    pub version: u32,
    /// Where the player starts and respawns
    pub spawn_point: Vec3,
    #[serde(default)]
    pub config: GameConfig,
    pub entities: Vec<SceneEntity>,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

impl Scene {
    /// Create a new empty level
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            spawn_point: Vec3::new(0.0, 1.0, 0.0),
            config: GameConfig::default(),
            entities: Vec::new(),
            script: Vec::new(),
        }
    }

    /// Add an entity to the level
    pub fn add_entity(&mut self, entity: SceneEntity) -> usize {
        let index = self.entities.len();
        self.entities.push(entity);
        index
    }

    /// Add a scripted input
    pub fn add_step(&mut self, frame: u64, input: ScriptedInput) {
        self.script.push(ScriptStep { frame, input });
    }

    /// Scripted inputs for `frame`, in file order
    pub fn steps_at(&self, frame: u64) -> impl Iterator<Item = &ScriptedInput> {
        self.script
            .iter()
            .filter(move |step| step.frame == frame)
            .map(|step| &step.input)
    }

    /// Last frame with scripted input
    pub fn script_end(&self) -> Option<u64> {
        self.script.iter().map(|step| step.frame).max()
    }

    /// Check values the game cannot recover from
    ///
    /// # Errors
    ///
    /// Returns the first invalid entity or setting found
    pub fn validate(&self) -> Result<(), LevelError> {
        for (index, entity) in self.entities.iter().enumerate() {
            match entity.kind {
                EntityKind::Bridge {
                    min_y,
                    max_y,
                    speed,
                    ..
                } => {
                    if min_y > max_y {
                        return Err(LevelError::Invalid(format!(
                            "bridge {index}: min_y {min_y} is above max_y {max_y}"
                        )));
                    }
                    if speed < 0.0 {
                        return Err(LevelError::Invalid(format!(
                            "bridge {index}: negative speed {speed}"
                        )));
                    }
                }
                EntityKind::HealthZone {
                    effect: ZoneEffect::Damage { interval, .. },
                    ..
                } if interval < 0.0 => {
                    return Err(LevelError::Invalid(format!(
                        "hazard {index}: negative damage interval {interval}"
                    )));
                }
                _ => {}
            }
        }

        if self.config.max_health <= 0 {
            return Err(LevelError::Invalid(format!(
                "max_health must be positive, got {}",
                self.config.max_health
            )));
        }
        Ok(())
    }

    /// Save the level to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let ron_string = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| LevelError::SerializeError(e.to_string()))?;
        fs::write(path, ron_string).map_err(|e| LevelError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a level from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, deserialization fails or
    /// the level is invalid
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let content = fs::read_to_string(path).map_err(|e| LevelError::IoError(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Parse and validate a RON level
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the level is invalid
    pub fn from_ron_str(content: &str) -> Result<Self, LevelError> {
        let scene: Scene =
            ron::from_str(content).map_err(|e| LevelError::DeserializeError(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Save the level to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        let json_string = serde_json::to_string_pretty(self)
            .map_err(|e| LevelError::SerializeError(e.to_string()))?;
        fs::write(path, json_string).map_err(|e| LevelError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Load a level from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, deserialization fails or
    /// the level is invalid
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let content = fs::read_to_string(path).map_err(|e| LevelError::IoError(e.to_string()))?;
        let scene: Scene = serde_json::from_str(&content)
            .map_err(|e| LevelError::DeserializeError(e.to_string()))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Load a level, picking the format from the file extension
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::load_json(path),
            _ => Self::load_ron(path),
        }
    }

    /// Get the number of entities
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Check if the level is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Small built-in level with a scripted walkthrough
    ///
    /// The player starts facing -Z. Pickups float at eye height so the
    /// interaction ray reaches them.
    pub fn demo() -> Self {
        let mut scene = Scene::new("Demo");
        let eye = 1.6;

        scene.add_entity(
            SceneEntity::new(
                EntityKind::Ground {
                    half_extents: Vec3::new(30.0, 0.5, 30.0),
                },
                Vec3::new(0.0, -0.5, 0.0),
            )
            .named("Ground"),
        );

        scene.add_entity(
            SceneEntity::new(
                EntityKind::Collectible(CollectibleKind::Coin { value: 1 }),
                Vec3::new(0.0, eye, -1.5),
            )
            .named("Coin"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::Collectible(CollectibleKind::Keycard),
                Vec3::new(0.0, eye, -4.0),
            )
            .named("Keycard"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::Door {
                    locked: true,
                    half_extents: Vec3::new(1.0, 1.5, 0.1),
                },
                Vec3::new(0.0, 1.5, -7.5),
            )
            .named("Door"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::Destructible(DestructibleKind::Box),
                Vec3::new(4.0, 0.5, -2.0),
            )
            .named("Box"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::Destructible(DestructibleKind::Glass),
                Vec3::new(-4.0, 0.5, -2.0),
            )
            .named("Glass"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::Bridge {
                    half_extents: Vec3::new(1.5, 0.2, 3.0),
                    min_y: 0.1,
                    max_y: 2.0,
                    speed: 1.0,
                },
                Vec3::new(8.0, 0.0, -10.0),
            )
            .named("Bridge"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::HealthZone {
                    effect: ZoneEffect::Heal { amount: 1 },
                    half_extents: Vec3::new(1.5, 0.05, 1.5),
                },
                Vec3::new(-8.0, 0.05, 0.0),
            )
            .named("Spring"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::HealthZone {
                    effect: ZoneEffect::Damage {
                        amount: 1,
                        interval: 1.0,
                    },
                    half_extents: Vec3::new(1.5, 0.05, 1.5),
                },
                Vec3::new(8.0, 0.05, 0.0),
            )
            .named("Lava"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::Collectible(CollectibleKind::Crystal),
                Vec3::new(0.0, eye, -10.0),
            )
            .named("Crystal"),
        );
        scene.add_entity(
            SceneEntity::new(
                EntityKind::Stagship {
                    half_extents: Vec3::new(2.0, 1.0, 2.0),
                },
                Vec3::new(0.0, 1.0, -14.0),
            )
            .named("Stagship"),
        );

        // At 0.02 s per frame the player covers 0.1 per frame of held axes.
        // Take the coin, walk to the keycard and take it, open the door,
        // grab the crystal and walk into the stagship.
        let forward = Vec2::new(0.0, 1.0);
        scene.add_step(1, ScriptedInput::Action(InputAction::Interact));
        scene.add_step(2, ScriptedInput::Axes(forward));
        scene.add_step(20, ScriptedInput::ReleaseAxes);
        scene.add_step(22, ScriptedInput::Action(InputAction::Interact));
        scene.add_step(23, ScriptedInput::Axes(forward));
        scene.add_step(65, ScriptedInput::ReleaseAxes);
        scene.add_step(67, ScriptedInput::Action(InputAction::Interact));
        scene.add_step(68, ScriptedInput::Axes(forward));
        scene.add_step(93, ScriptedInput::ReleaseAxes);
        scene.add_step(95, ScriptedInput::Action(InputAction::Interact));
        scene.add_step(96, ScriptedInput::Axes(forward));
        scene.add_step(140, ScriptedInput::ReleaseAxes);
        scene.add_step(141, ScriptedInput::Action(InputAction::Fire));
        scene
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Errors that can occur while loading or saving a level
#[derive(Debug, Clone)]
pub enum LevelError {
    /// IO error
    IoError(String),
    /// Serialization error
    SerializeError(String),
    /// Deserialization error
    DeserializeError(String),
    /// The level parsed but cannot be played
    Invalid(String),
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IoError(e) => write!(f, "IO error: {e}"),
            Self::SerializeError(e) => write!(f, "Serialization error: {e}"),
            Self::DeserializeError(e) => write!(f, "Deserialization error: {e}"),
            Self::Invalid(e) => write!(f, "Invalid level: {e}"),
        }
    }
}

impl std::error::Error for LevelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_serialization_ron() {
        let mut scene = Scene::new("Test Level");
        scene.add_entity(
            SceneEntity::new(
                EntityKind::Collectible(CollectibleKind::Coin { value: 2 }),
                Vec3::new(1.0, 2.0, 3.0),
            )
            .named("Coin"),
        );
        scene.add_step(3, ScriptedInput::Action(InputAction::Interact));

        let ron_str =
            ron::ser::to_string_pretty(&scene, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("Coin"));

        let loaded = Scene::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded.name, "Test Level");
        assert_eq!(loaded.entities.len(), 1);
        assert_eq!(loaded.entities[0].name, Some("Coin".to_string()));
        assert_eq!(loaded.steps_at(3).count(), 1);
    }

    #[test]
    fn test_level_serialization_json() {
        let scene = Scene::demo();

        let json_str = serde_json::to_string(&scene).unwrap();
        let loaded: Scene = serde_json::from_str(&json_str).unwrap();

        assert_eq!(loaded.name, "Demo");
        assert_eq!(loaded.entity_count(), scene.entity_count());
        assert_eq!(loaded.script_end(), scene.script_end());
    }

    #[test]
    fn test_save_and_load_files() {
        let scene = Scene::demo();
        let dir = std::env::temp_dir();
        let stem = format!("stagship-level-{}", std::process::id());

        for ext in ["ron", "json"] {
            let path = dir.join(format!("{stem}.{ext}"));
            match ext {
                "ron" => scene.save_ron(&path).unwrap(),
                _ => scene.save_json(&path).unwrap(),
            }

            let loaded = Scene::load(&path).unwrap();
            fs::remove_file(&path).unwrap();

            assert_eq!(loaded.name, scene.name);
            assert_eq!(loaded.spawn_point, scene.spawn_point);
            assert_eq!(loaded.entities, scene.entities);
            assert_eq!(loaded.script_end(), scene.script_end());
            assert_eq!(loaded.config, scene.config);
        }
    }

    #[test]
    fn test_config_and_script_are_optional() {
        let ron_str = r#"(
            name: "Bare",
            version: 1,
            spawn_point: (0.0, 1.0, 0.0),
            entities: [],
        )"#;

        let scene = Scene::from_ron_str(ron_str).unwrap();
        assert!(scene.is_empty());
        assert!(scene.script.is_empty());
        assert_eq!(scene.config, GameConfig::default());
    }

    #[test]
    fn test_reversed_bridge_bounds_rejected() {
        let mut scene = Scene::new("Bad Bridge");
        scene.add_entity(SceneEntity::new(
            EntityKind::Bridge {
                half_extents: Vec3::ONE,
                min_y: 2.0,
                max_y: 0.1,
                speed: 1.0,
            },
            Vec3::ZERO,
        ));

        assert!(matches!(scene.validate(), Err(LevelError::Invalid(_))));
    }

    #[test]
    fn test_demo_is_valid() {
        let scene = Scene::demo();
        assert!(scene.validate().is_ok());
        assert!(scene.script_end().is_some());
    }

    #[test]
    fn test_missing_file() {
        let result = Scene::load("/nonexistent/level.ron");
        assert!(matches!(result, Err(LevelError::IoError(_))));
    }
}
