//! Third-person locomotion and jumping

use glam::{Quat, Vec2, Vec3};

use crate::physics::{Physics, RigidBodyHandle};
use crate::renderer::Camera;

/// Camera-relative character controller
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThirdPersonController {
    pub move_speed: f32,
    /// Slerp rate toward the movement direction, per second
    pub rotation_speed: f32,
    /// Upward impulse applied on jump
    pub jump_force: f32,
    /// Length of the downward ground check below the feet
    pub ground_check_distance: f32,
    /// Distance from the body origin down to the feet
    pub foot_offset: f32,
}

impl Default for ThirdPersonController {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            rotation_speed: 10.0,
            jump_force: 5.0,
            ground_check_distance: 0.5,
            foot_offset: 1.0,
        }
    }
}

impl ThirdPersonController {
    /// Position delta for one step: `axes.x` strafes along the camera's
    /// flattened right, `axes.y` moves along its flattened forward.
    pub fn planar_move(&self, camera: &Camera, axes: Vec2, dt: f32) -> Vec3 {
        let forward = camera.planar_forward();
        let right = camera.planar_right();
        (forward * axes.y + right * axes.x) * self.move_speed * dt
    }

    /// Turn `current` part of the way toward facing `movement`
    pub fn turn_toward(&self, current: Quat, movement: Vec3, dt: f32) -> Quat {
        if movement.x == 0.0 && movement.z == 0.0 {
            return current;
        }
        let target = facing(movement);
        current.slerp(target, (self.rotation_speed * dt).clamp(0.0, 1.0))
    }

    /// Fixed-step movement of the character body
    pub fn fixed_update(
        &self,
        physics: &mut Physics,
        body: RigidBodyHandle,
        camera: &Camera,
        axes: Vec2,
        dt: f32,
    ) {
        let movement = self.planar_move(camera, axes, dt);
        if movement == Vec3::ZERO {
            return;
        }

        let (Some(position), Some(rotation)) =
            (physics.get_position(body), physics.get_rotation(body))
        else {
            return;
        };

        physics.set_position(body, position + movement);
        physics.set_rotation(body, self.turn_toward(rotation, movement, dt));
    }

    /// Whether there is ground just below the feet
    pub fn is_grounded(&self, physics: &Physics, body: RigidBodyHandle) -> bool {
        let Some(position) = physics.get_position(body) else {
            return false;
        };
        // Start slightly above the feet so resting contact still registers
        let lift = 0.05;
        let origin = position - Vec3::Y * (self.foot_offset - lift);
        physics
            .raycast_excluding(
                origin,
                Vec3::NEG_Y,
                self.ground_check_distance + lift,
                Some(body),
            )
            .is_some()
    }

    /// Jump if grounded. Returns the take-off position when the jump happened.
    pub fn jump(&self, physics: &mut Physics, body: RigidBodyHandle) -> Option<Vec3> {
        if !self.is_grounded(physics, body) {
            return None;
        }

        let position = physics.get_position(body)?;
        let velocity = physics.get_linear_velocity(body).unwrap_or(Vec3::ZERO);
        physics.set_linear_velocity(body, Vec3::new(velocity.x, 0.0, velocity.z));
        physics.apply_impulse(body, Vec3::Y * self.jump_force);
        Some(position)
    }
}

/// Rotation whose forward (-Z) points along `direction` on the ground plane
pub fn facing(direction: Vec3) -> Quat {
    Quat::from_rotation_y((-direction.x).atan2(-direction.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_move_ignores_camera_pitch() {
        let controller = ThirdPersonController::default();
        let mut camera = Camera::new();
        camera.rotate(0.0, 250.0); // looking down
        assert!(camera.forward().y < -0.5);
        let movement = controller.planar_move(&camera, Vec2::new(0.0, 1.0), 0.1);

        assert!(movement.y.abs() < 1e-6);
        assert!((movement - Vec3::new(0.0, 0.0, -0.5)).length() < 1e-5);
    }

    #[test]
    fn test_planar_move_strafes_right() {
        let controller = ThirdPersonController::default();
        let movement = controller.planar_move(&Camera::new(), Vec2::new(1.0, 0.0), 0.02);
        assert!((movement - Vec3::new(0.1, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_facing_points_forward_along_direction() {
        for direction in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z, Vec3::new(1.0, 0.0, 1.0)] {
            let forward = facing(direction) * Vec3::NEG_Z;
            assert!((forward - direction.normalize()).length() < 1e-5);
        }
    }

    #[test]
    fn test_turn_toward_is_gradual() {
        let controller = ThirdPersonController::default();
        let turned = controller.turn_toward(Quat::IDENTITY, Vec3::X, 0.02);
        let full = facing(Vec3::X);

        assert!(turned.angle_between(Quat::IDENTITY) > 0.0);
        assert!(turned.angle_between(full) > 0.0);

        let unchanged = controller.turn_toward(Quat::IDENTITY, Vec3::ZERO, 0.02);
        assert_eq!(unchanged, Quat::IDENTITY);
    }

    fn character_on_ground(physics: &mut Physics, height: f32) -> RigidBodyHandle {
        let floor = physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        physics.add_box_collider(floor, Vec3::new(20.0, 0.1, 20.0), 1.0);

        let body = physics.create_character_body(Vec3::new(0.0, height, 0.0), Quat::IDENTITY);
        physics.add_capsule_collider(body, 0.5, 0.5, 1.0);
        physics.update_query_pipeline();
        body
    }

    #[test]
    fn test_ground_check() {
        let controller = ThirdPersonController::default();

        let mut physics = Physics::new();
        // Feet resting on the floor top (y = 0.1)
        let standing = character_on_ground(&mut physics, 1.1);
        assert!(controller.is_grounded(&physics, standing));

        let mut physics = Physics::new();
        let airborne = character_on_ground(&mut physics, 3.0);
        assert!(!controller.is_grounded(&physics, airborne));
        assert!(controller.jump(&mut physics, airborne).is_none());
    }

    #[test]
    fn test_jump_resets_vertical_velocity_then_lifts() {
        let controller = ThirdPersonController::default();
        let mut physics = Physics::new();
        let body = character_on_ground(&mut physics, 1.1);
        physics.step(1.0 / 50.0);
        physics.set_linear_velocity(body, Vec3::new(1.0, -3.0, 0.0));

        assert!(controller.jump(&mut physics, body).is_some());
        let velocity = physics.get_linear_velocity(body).unwrap();
        assert!(velocity.y > 0.0);
        assert!((velocity.x - 1.0).abs() < 1e-5);
    }
}
