//! Third-person follow camera
//!
//! The camera orbits the player by yaw and pitch and sits `distance` behind
//! an eye point above the player's origin. Gameplay reads it for the
//! interaction ray and for camera-relative movement.

use glam::Vec3;

/// Camera following the player
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Direction the camera is looking at
    pub direction: Vec3,
    /// Up vector
    pub up: Vec3,
    /// Eye height above the followed origin
    pub eye_height: f32,
    /// Distance behind the eye point
    pub distance: f32,
    /// Radians per unit of mouse delta
    pub sensitivity: f32,
    /// Yaw angle (rotation around Y axis)
    yaw: f32,
    /// Pitch angle (rotation around X axis)
    pitch: f32,
}

impl Camera {
    /// Create a camera looking down -Z
    pub fn new() -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Z,
            up: Vec3::Y,
            eye_height: 1.5,
            distance: 0.0,
            sensitivity: 0.003,
            yaw: -90.0_f32.to_radians(),
            pitch: 0.0,
        };
        camera.update_direction();
        camera
    }

    /// Rotate camera using mouse delta
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * self.sensitivity;
        self.pitch -= delta_y * self.sensitivity;

        // Clamp pitch to avoid gimbal lock
        let max_pitch = 89.0_f32.to_radians();
        self.pitch = self.pitch.clamp(-max_pitch, max_pitch);

        self.update_direction();
    }

    /// Place the camera behind the followed point
    pub fn follow(&mut self, target: Vec3) {
        let eye = target + Vec3::Y * self.eye_height;
        self.position = eye - self.direction * self.distance;
    }

    fn update_direction(&mut self) {
        self.direction = Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize();
    }

    /// Get the right vector
    pub fn right(&self) -> Vec3 {
        self.direction.cross(self.up).normalize()
    }

    /// Get the forward vector (same as direction)
    pub fn forward(&self) -> Vec3 {
        self.direction
    }

    /// Forward flattened onto the ground plane
    pub fn planar_forward(&self) -> Vec3 {
        Vec3::new(self.direction.x, 0.0, self.direction.z).normalize_or_zero()
    }

    /// Right flattened onto the ground plane
    pub fn planar_right(&self) -> Vec3 {
        let right = self.right();
        Vec3::new(right.x, 0.0, right.z).normalize_or_zero()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera_looks_down_negative_z() {
        let camera = Camera::new();
        assert!((camera.forward() - Vec3::NEG_Z).length() < 1e-5);
        assert!((camera.right() - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_planar_vectors_ignore_pitch() {
        let mut camera = Camera::new();
        camera.rotate(0.0, -200.0); // look up
        assert!(camera.forward().y > 0.3);

        let forward = camera.planar_forward();
        assert!(forward.y.abs() < 1e-6);
        assert!((forward.length() - 1.0).abs() < 1e-5);
        assert!((forward - Vec3::NEG_Z).length() < 1e-4);

        let right = camera.planar_right();
        assert!(right.y.abs() < 1e-6);
        assert!((right - Vec3::X).length() < 1e-4);
    }

    #[test]
    fn test_follow_places_camera_behind_eye() {
        let mut camera = Camera::new();
        camera.distance = 2.0;
        camera.follow(Vec3::new(1.0, 0.0, 0.0));

        assert!((camera.position - Vec3::new(1.0, 1.5, 2.0)).length() < 1e-5);
    }
}
