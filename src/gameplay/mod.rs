//! Game objects and the level that drives them
//!
//! Each object type keeps its rules free of the ECS and physics so they can
//! be tested alone; `Level` wires them to entities, contacts and input.

mod bridge;
mod collectible;
mod controller;
mod destructible;
mod door;
mod health;
mod level;
mod player;
mod sinks;

pub use bridge::Bridge;
pub use collectible::{Collectible, CollectibleKind};
pub use controller::{ThirdPersonController, facing};
pub use destructible::{Breakage, Destructible, DestructibleKind};
pub use door::{Door, DoorInteraction, DoorLockVisual};
pub use health::{Health, HealthZone, ZoneEffect};
pub use level::{Level, LevelSummary};
pub use player::{CrystalLatch, Interaction, PlayerState, Retarget, Target};
pub use sinks::{HealthChange, HealthSink, InventorySink, ScoreSink};
