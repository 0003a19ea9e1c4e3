//! The player's state, interaction target and pickup handling

use hecs::Entity;
use serde::{Deserialize, Serialize};

use super::health::Health;
use super::sinks::{HealthChange, HealthSink, InventorySink, ScoreSink};
use crate::ecs::Tag;

/// When seeing or taking the crystal sets `has_crystal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrystalLatch {
    /// Targeting the crystal latches it; the crystal can only be
    /// collected after that.
    #[default]
    OnSight,
    /// Only collecting the crystal latches it
    OnCollect,
}

/// The single object the player is currently looking at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Target {
    #[default]
    None,
    Coin(Entity),
    Keycard(Entity),
    Door(Entity),
    Crystal(Entity),
}

impl Target {
    /// Classify a ray hit by its tag
    pub fn from_tag(entity: Entity, tag: Option<Tag>) -> Self {
        match tag {
            Some(Tag::Collectible) => Self::Coin(entity),
            Some(Tag::Keycard) => Self::Keycard(entity),
            Some(Tag::Door) => Self::Door(entity),
            Some(Tag::Crystal) => Self::Crystal(entity),
            _ => Self::None,
        }
    }

    pub fn entity(self) -> Option<Entity> {
        match self {
            Self::None => None,
            Self::Coin(e) | Self::Keycard(e) | Self::Door(e) | Self::Crystal(e) => Some(e),
        }
    }

    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

/// Highlight changes needed after retargeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Retarget {
    pub unhighlight: Option<Entity>,
    pub highlight: Option<Entity>,
}

impl Retarget {
    pub fn is_empty(&self) -> bool {
        self.unhighlight.is_none() && self.highlight.is_none()
    }
}

/// What an interact press should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Collect a coin, keycard or crystal
    Collect(Entity),
    UseDoor(Entity),
    Nothing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub score: i32,
    pub health: Health,
    pub has_keycard: bool,
    pub has_crystal: bool,
    pub coins_collected: u32,
    target: Target,
    crystal_latch: CrystalLatch,
}

impl PlayerState {
    pub fn new(max_health: i32, crystal_latch: CrystalLatch) -> Self {
        Self {
            score: 0,
            health: Health::new(max_health),
            has_keycard: false,
            has_crystal: false,
            coins_collected: 0,
            target: Target::None,
            crystal_latch,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn crystal_latch(&self) -> CrystalLatch {
        self.crystal_latch
    }

    /// Track what the interaction ray sees this frame.
    ///
    /// The previous target is always unhighlighted before a different one is
    /// highlighted.
    pub fn retarget(&mut self, seen: Target) -> Retarget {
        if let Target::Crystal(_) = seen
            && self.crystal_latch == CrystalLatch::OnSight
            && !self.has_crystal
        {
            log::debug!("Crystal spotted");
            self.has_crystal = true;
        }

        if seen == self.target {
            return Retarget::default();
        }

        let change = Retarget {
            unhighlight: self.target.entity(),
            highlight: seen.entity(),
        };
        self.target = seen;
        change
    }

    /// Forget the target without highlight bookkeeping (it was consumed)
    pub fn clear_target(&mut self) {
        self.target = Target::None;
    }

    /// Drop the target if it refers to `entity`
    pub fn forget(&mut self, entity: Entity) {
        if self.target.entity() == Some(entity) {
            self.target = Target::None;
        }
    }

    /// Decide what interacting does with the current target.
    ///
    /// Priority is coin, keycard, door, crystal; the crystal needs
    /// `has_crystal` when it latches on sight.
    pub fn interaction(&self) -> Interaction {
        match self.target {
            Target::Coin(e) | Target::Keycard(e) => Interaction::Collect(e),
            Target::Door(e) => Interaction::UseDoor(e),
            Target::Crystal(e) => {
                let allowed = match self.crystal_latch {
                    CrystalLatch::OnSight => self.has_crystal,
                    CrystalLatch::OnCollect => true,
                };
                if allowed {
                    Interaction::Collect(e)
                } else {
                    Interaction::Nothing
                }
            }
            Target::None => Interaction::Nothing,
        }
    }
}

impl ScoreSink for PlayerState {
    fn modify_score(&mut self, amount: i32) {
        self.score = self.score.saturating_add(amount);
        log::debug!("Score: {}", self.score);
    }

    fn coin_collected(&mut self) {
        self.coins_collected += 1;
    }
}

impl HealthSink for PlayerState {
    fn modify_health(&mut self, amount: i32) -> HealthChange {
        let change = self.health.apply(amount);
        log::debug!("Health: {}", self.health.current());
        change
    }
}

impl InventorySink for PlayerState {
    fn has_keycard(&self) -> bool {
        self.has_keycard
    }

    fn grant_keycard(&mut self) {
        self.has_keycard = true;
    }

    fn grant_crystal(&mut self) {
        self.has_crystal = true;
    }
}
