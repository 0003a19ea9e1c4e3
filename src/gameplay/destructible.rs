//! Boxes and glass that break when shot

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::audio::AudioCue;
use crate::ecs::Tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DestructibleKind {
    /// Drops a coin
    Box,
    Glass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Destructible {
    pub kind: DestructibleKind,
}

/// What breaking a destructible should do
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakage {
    pub cue: AudioCue,
    pub position: Vec3,
    /// Where to drop a coin, if any
    pub coin_at: Option<Vec3>,
}

impl Destructible {
    pub fn new(kind: DestructibleKind) -> Self {
        Self { kind }
    }

    /// React to a contact with something tagged `other`.
    ///
    /// Only projectiles break things.
    pub fn on_contact(&self, other: Option<Tag>, position: Vec3) -> Option<Breakage> {
        if other != Some(Tag::Projectile) {
            return None;
        }

        let (cue, coin_at) = match self.kind {
            DestructibleKind::Box => {
                log::info!("Box has been hit.");
                (AudioCue::BoxHit, Some(position))
            }
            DestructibleKind::Glass => {
                log::info!("Glass has been hit.");
                (AudioCue::GlassHit, None)
            }
        };

        Some(Breakage {
            cue,
            position,
            coin_at,
        })
    }
}
