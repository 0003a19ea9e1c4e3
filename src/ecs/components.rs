//! Common ECS components

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::physics::{ColliderHandle, RigidBodyHandle};

/// Transform component for position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as a quaternion
    pub rotation: Quat,
    /// Scale factor
    pub scale: Vec3,
}

impl Transform {
    /// Create a new transform at the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Get the transformation matrix
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Get the forward direction (negative Z in local space)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Get the right direction (positive X in local space)
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Yaw around world up, in radians
    pub fn yaw(&self) -> f32 {
        let (yaw, _, _) = self.rotation.to_euler(glam::EulerRot::YXZ);
        yaw
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Name component for debugging
#[derive(Debug, Clone)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Category tag used to classify contacts and raycast hits.
///
/// An entity without a `Tag` is untagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    Player,
    /// Coins
    Collectible,
    Keycard,
    Door,
    Crystal,
    Projectile,
    HealingArea,
    HazardArea,
    /// The level exit
    Stagship,
}

impl Tag {
    pub const fn as_str(self) -> &'static str {
        match self {
            Tag::Player => "Player",
            Tag::Collectible => "Collectible",
            Tag::Keycard => "Keycard",
            Tag::Door => "Door",
            Tag::Crystal => "Crystal",
            Tag::Projectile => "Projectile",
            Tag::HealingArea => "HealingArea",
            Tag::HazardArea => "HazardArea",
            Tag::Stagship => "Stagship",
        }
    }
}

/// Links an entity to its rigid body and collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Despawns the entity once the game clock passes `expires_at`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lifetime {
    /// Game time in seconds
    pub expires_at: f64,
}

impl Lifetime {
    /// Lifetime ending `seconds` after `now`
    pub fn after(now: f64, seconds: f32) -> Self {
        Self {
            expires_at: now + f64::from(seconds),
        }
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_directions() {
        let t = Transform::from_position_rotation(
            Vec3::ZERO,
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        assert!((t.forward() - Vec3::NEG_X).length() < 1e-5);
        assert!((t.right() - Vec3::NEG_Z).length() < 1e-5);
        assert!((t.yaw() - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_lifetime_expiry() {
        let lifetime = Lifetime::after(10.0, 5.0);
        assert!(!lifetime.is_expired(14.9));
        assert!(lifetime.is_expired(15.0));
    }
}
