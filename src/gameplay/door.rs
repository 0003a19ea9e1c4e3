//! Doors and their lock visuals

use std::f32::consts::FRAC_PI_2;

use super::sinks::InventorySink;
use crate::renderer::{Appearance, Material, MaterialSet, MaterialVariant};

/// Presents a door's locked / unlocked / highlighted look
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DoorLockVisual {
    locked: bool,
}

impl DoorLockVisual {
    pub fn new(locked: bool) -> Self {
        Self { locked }
    }

    pub fn materials() -> MaterialSet {
        MaterialSet::new(Material::gray()).with_locked(Material::red())
    }

    pub fn set_locked(&mut self, locked: bool, appearance: &mut Appearance) {
        self.locked = locked;
        self.refresh(appearance);
    }

    pub fn highlight(&self, appearance: &mut Appearance) {
        appearance.set_variant(MaterialVariant::Highlight);
    }

    /// Back to the locked or default look
    pub fn unhighlight(&self, appearance: &mut Appearance) {
        self.refresh(appearance);
    }

    fn refresh(&self, appearance: &mut Appearance) {
        appearance.set_variant(if self.locked {
            MaterialVariant::Locked
        } else {
            MaterialVariant::Default
        });
    }
}

/// What happened when the player used a door
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorInteraction {
    /// Locked and the player has no keycard
    Refused,
    /// Unlocked with the keycard, then toggled
    Unlocked { open: bool },
    Toggled { open: bool },
}

impl DoorInteraction {
    /// Whether the door swung
    pub fn toggled(self) -> bool {
        !matches!(self, Self::Refused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Door {
    locked: bool,
    open: bool,
}

impl Door {
    pub fn new(locked: bool) -> Self {
        Self {
            locked,
            open: false,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn interact(&mut self, player: &dyn InventorySink) -> DoorInteraction {
        if !self.locked {
            let open = self.toggle();
            return DoorInteraction::Toggled { open };
        }

        if !player.has_keycard() {
            log::info!("Door is locked! Find a keycard to unlock it.");
            return DoorInteraction::Refused;
        }

        self.locked = false;
        log::info!("Door unlocked!");
        let open = self.toggle();
        DoorInteraction::Unlocked { open }
    }

    /// Flip open/closed and return the new state
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Yaw change for the swing that just happened
    pub fn swing_yaw(open: bool) -> f32 {
        if open { FRAC_PI_2 } else { -FRAC_PI_2 }
    }
}
