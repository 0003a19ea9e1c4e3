//! Narrow capabilities the player exposes to the objects it touches
//!
//! Collectibles, doors and health zones only see the part of the player
//! they act on.

/// Result of changing health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthChange {
    /// Health is now this value
    Changed(i32),
    /// Health hit zero; it was reset to max and the owner must respawn
    Died,
}

pub trait ScoreSink {
    fn modify_score(&mut self, amount: i32);

    /// A coin was picked up (coin counter on the HUD)
    fn coin_collected(&mut self) {}
}

pub trait HealthSink {
    fn modify_health(&mut self, amount: i32) -> HealthChange;
}

pub trait InventorySink {
    fn has_keycard(&self) -> bool;

    fn grant_keycard(&mut self);

    fn grant_crystal(&mut self);
}
