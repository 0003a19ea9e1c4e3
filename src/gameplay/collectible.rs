//! Coins, keycards and crystals

use serde::{Deserialize, Serialize};

use super::sinks::{InventorySink, ScoreSink};
use crate::audio::AudioCue;
use crate::ecs::Tag;
use crate::renderer::{Material, MaterialSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Coin { value: i32 },
    Keycard,
    Crystal,
}

impl CollectibleKind {
    pub const fn tag(self) -> Tag {
        match self {
            Self::Coin { .. } => Tag::Collectible,
            Self::Keycard => Tag::Keycard,
            Self::Crystal => Tag::Crystal,
        }
    }

    pub const fn cue(self) -> AudioCue {
        match self {
            Self::Coin { .. } => AudioCue::Coin,
            Self::Keycard => AudioCue::Keycard,
            Self::Crystal => AudioCue::Crystal,
        }
    }

    pub fn materials(self) -> MaterialSet {
        let base = match self {
            Self::Coin { .. } => Material::gold(),
            Self::Keycard => Material::shiny(glam::Vec3::new(0.2, 0.4, 1.0)),
            Self::Crystal => Material::shiny(glam::Vec3::new(0.7, 0.2, 0.9)),
        };
        MaterialSet::new(base)
    }
}

/// Something the player picks up by interacting with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collectible {
    pub kind: CollectibleKind,
    collected: bool,
}

impl Collectible {
    pub fn new(kind: CollectibleKind) -> Self {
        Self {
            kind,
            collected: false,
        }
    }

    pub fn coin(value: i32) -> Self {
        Self::new(CollectibleKind::Coin { value })
    }

    pub fn is_collected(&self) -> bool {
        self.collected
    }

    /// Apply the pickup to `collector`.
    ///
    /// Returns `false` without touching the collector if this was already
    /// collected.
    pub fn collect<C>(&mut self, collector: &mut C) -> bool
    where
        C: ScoreSink + InventorySink + ?Sized,
    {
        if self.collected {
            return false;
        }
        self.collected = true;

        match self.kind {
            CollectibleKind::Coin { value } => {
                log::info!("Coin collected!");
                collector.modify_score(value);
                collector.coin_collected();
            }
            CollectibleKind::Keycard => {
                log::info!("Keycard collected!");
                collector.grant_keycard();
            }
            CollectibleKind::Crystal => {
                log::info!("Crystal collected!");
                collector.grant_crystal();
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Bag {
        score: i32,
        coins: u32,
        keycard: bool,
        crystal: bool,
    }

    impl ScoreSink for Bag {
        fn modify_score(&mut self, amount: i32) {
            self.score += amount;
        }

        fn coin_collected(&mut self) {
            self.coins += 1;
        }
    }

    impl InventorySink for Bag {
        fn has_keycard(&self) -> bool {
            self.keycard
        }

        fn grant_keycard(&mut self) {
            self.keycard = true;
        }

        fn grant_crystal(&mut self) {
            self.crystal = true;
        }
    }

    #[test]
    fn test_coin_collect_is_idempotent() {
        let mut bag = Bag::default();
        let mut coin = Collectible::coin(5);

        assert!(coin.collect(&mut bag));
        assert!(!coin.collect(&mut bag));
        assert!(!coin.collect(&mut bag));

        assert_eq!(bag.score, 5);
        assert_eq!(bag.coins, 1);
        assert!(coin.is_collected());
    }

    #[test]
    fn test_keycard_and_crystal_grant_inventory() {
        let mut bag = Bag::default();

        Collectible::new(CollectibleKind::Keycard).collect(&mut bag);
        assert!(bag.keycard);
        assert!(!bag.crystal);

        Collectible::new(CollectibleKind::Crystal).collect(&mut bag);
        assert!(bag.crystal);
        assert_eq!(bag.score, 0);
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(CollectibleKind::Coin { value: 1 }.tag(), Tag::Collectible);
        assert_eq!(CollectibleKind::Keycard.tag(), Tag::Keycard);
        assert_eq!(CollectibleKind::Crystal.cue(), AudioCue::Crystal);
    }
}
