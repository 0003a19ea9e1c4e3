//! Physics simulation using rapier3d

use glam::{Quat, Vec3};
use hecs::Entity;
use rapier3d::na::{self, UnitQuaternion};
use rapier3d::prelude::*;
use rustc_hash::FxHashSet;

/// Handle to a rigid body in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle(pub rapier3d::dynamics::RigidBodyHandle);

/// Handle to a collider in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

/// Convert glam Quat to rapier3d UnitQuaternion
fn quat_to_rapier(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(na::Quaternion::new(q.w, q.x, q.y, q.z))
}

/// Convert rapier3d UnitQuaternion to glam Quat
fn rapier_to_quat(uq: &UnitQuaternion<f32>) -> Quat {
    let q = uq.quaternion();
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

fn isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    Isometry::from_parts(
        na::Translation3::new(position.x, position.y, position.z),
        quat_to_rapier(rotation),
    )
}

/// Unordered pair of colliders in contact
type ContactKey = (rapier3d::geometry::ColliderHandle, rapier3d::geometry::ColliderHandle);

/// Contacts observed during one physics step
#[derive(Debug, Clone, Default)]
pub struct ContactReport {
    /// Pairs that started touching this step
    pub started: Vec<(ColliderHandle, ColliderHandle)>,
    /// Pairs touching at the end of this step, including the new ones
    pub touching: Vec<(ColliderHandle, ColliderHandle)>,
}

/// Physics world manager
pub struct Physics {
    /// Gravity vector
    pub gravity: Vec3,
    /// Physics pipeline
    pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase
    broad_phase: DefaultBroadPhase,
    /// Narrow phase
    narrow_phase: NarrowPhase,
    /// Rigid body set
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,
    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,
    /// CCD solver
    ccd_solver: CCDSolver,
    /// Query pipeline for raycasting
    query_pipeline: QueryPipeline,
    /// Integration parameters
    integration_parameters: IntegrationParameters,
    /// Pairs in contact after the previous step
    touching: FxHashSet<ContactKey>,
}

impl Physics {
    /// Create a new physics world with default gravity
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            touching: FxHashSet::default(),
        }
    }

    /// Step the physics simulation and report contacts
    pub fn step(&mut self, dt: f32) -> ContactReport {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![self.gravity.x, self.gravity.y, self.gravity.z],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        self.collect_contacts()
    }

    /// Diff the narrow phase against the previous step
    fn collect_contacts(&mut self) -> ContactReport {
        let now: FxHashSet<ContactKey> = self
            .narrow_phase
            .contact_pairs()
            .filter(|pair| pair.has_any_active_contact)
            .map(|pair| ordered(pair.collider1, pair.collider2))
            .collect();

        let mut report = ContactReport::default();
        for &(a, b) in &now {
            let pair = (ColliderHandle(a), ColliderHandle(b));
            if !self.touching.contains(&(a, b)) {
                report.started.push(pair);
            }
            report.touching.push(pair);
        }
        self.touching = now;
        report
    }

    /// Refresh the query pipeline after bodies were added or teleported
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Create a static rigid body (doesn't move)
    pub fn create_static_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .position(isometry(position, rotation))
            .build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Create a dynamic rigid body (affected by forces)
    pub fn create_dynamic_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .position(isometry(position, rotation))
            .ccd_enabled(true)
            .build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Create a dynamic body that never tips over (rotation driven by code)
    pub fn create_character_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .position(isometry(position, rotation))
            .lock_rotations()
            .build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Create a kinematic rigid body (controlled directly)
    pub fn create_kinematic_body(&mut self, position: Vec3, rotation: Quat) -> RigidBodyHandle {
        let body = RigidBodyBuilder::kinematic_position_based()
            .position(isometry(position, rotation))
            .build();

        RigidBodyHandle(self.rigid_body_set.insert(body))
    }

    /// Add a box collider to a rigid body
    pub fn add_box_collider(
        &mut self,
        body: RigidBodyHandle,
        half_extents: Vec3,
        density: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .density(density)
            .build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Add a sphere collider to a rigid body
    pub fn add_sphere_collider(
        &mut self,
        body: RigidBodyHandle,
        radius: f32,
        density: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::ball(radius).density(density).build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Add a capsule collider to a rigid body
    pub fn add_capsule_collider(
        &mut self,
        body: RigidBodyHandle,
        half_height: f32,
        radius: f32,
        density: f32,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::capsule_y(half_height, radius)
            .density(density)
            .build();

        ColliderHandle(self.collider_set.insert_with_parent(
            collider,
            body.0,
            &mut self.rigid_body_set,
        ))
    }

    /// Record which entity owns a collider, so hits and contacts resolve to it
    pub fn set_collider_owner(&mut self, collider: ColliderHandle, owner: Entity) {
        if let Some(c) = self.collider_set.get_mut(collider.0) {
            c.user_data = u128::from(owner.to_bits().get());
        }
    }

    /// Entity that owns a collider
    pub fn collider_owner(&self, collider: ColliderHandle) -> Option<Entity> {
        let c = self.collider_set.get(collider.0)?;
        u64::try_from(c.user_data).ok().and_then(Entity::from_bits)
    }

    /// Get the position of a rigid body
    pub fn get_position(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let pos = rb.translation();
            Vec3::new(pos.x, pos.y, pos.z)
        })
    }

    /// Get the rotation of a rigid body
    pub fn get_rotation(&self, body: RigidBodyHandle) -> Option<Quat> {
        self.rigid_body_set
            .get(body.0)
            .map(|rb| rapier_to_quat(rb.rotation()))
    }

    /// Teleport a body
    pub fn set_position(&mut self, body: RigidBodyHandle, position: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_translation(vector![position.x, position.y, position.z], true);
        }
    }

    /// Set the orientation of a body
    pub fn set_rotation(&mut self, body: RigidBodyHandle, rotation: Quat) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_rotation(quat_to_rapier(rotation), true);
        }
    }

    /// Set the target pose of a kinematic body for the next step
    pub fn set_kinematic_pose(&mut self, body: RigidBodyHandle, position: Vec3, rotation: Quat) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_next_kinematic_position(isometry(position, rotation));
        }
    }

    /// Apply an impulse to a dynamic body
    pub fn apply_impulse(&mut self, body: RigidBodyHandle, impulse: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
        }
    }

    /// Set the linear velocity of a body
    pub fn set_linear_velocity(&mut self, body: RigidBodyHandle, velocity: Vec3) {
        if let Some(rb) = self.rigid_body_set.get_mut(body.0) {
            rb.set_linvel(vector![velocity.x, velocity.y, velocity.z], true);
        }
    }

    /// Get the linear velocity of a body
    pub fn get_linear_velocity(&self, body: RigidBodyHandle) -> Option<Vec3> {
        self.rigid_body_set.get(body.0).map(|rb| {
            let vel = rb.linvel();
            Vec3::new(vel.x, vel.y, vel.z)
        })
    }

    /// Get the mass of a body
    pub fn get_mass(&self, body: RigidBodyHandle) -> Option<f32> {
        self.rigid_body_set.get(body.0).map(|rb| rb.mass())
    }

    /// Cast a ray and return the first hit
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        self.raycast_excluding(origin, direction, max_distance, None)
    }

    /// Cast a ray that ignores one body (usually the caster's own)
    pub fn raycast_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<RigidBodyHandle>,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let mut filter = QueryFilter::default();
        if let Some(body) = exclude {
            filter = filter.exclude_rigid_body(body.0);
        }

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(handle, distance)| {
                let point = ray.point_at(distance);
                let collider = ColliderHandle(handle);
                RaycastHit {
                    collider,
                    entity: self.collider_owner(collider),
                    point: Vec3::new(point.x, point.y, point.z),
                    distance,
                }
            })
    }

    /// Remove a rigid body and its colliders
    pub fn remove_body(&mut self, body: RigidBodyHandle) {
        self.rigid_body_set.remove(
            body.0,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Number of live rigid bodies
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

fn ordered(
    a: rapier3d::geometry::ColliderHandle,
    b: rapier3d::geometry::ColliderHandle,
) -> ContactKey {
    if a.into_raw_parts() <= b.into_raw_parts() {
        (a, b)
    } else {
        (b, a)
    }
}

/// Result of a raycast
#[derive(Debug, Clone)]
pub struct RaycastHit {
    /// The collider that was hit
    pub collider: ColliderHandle,
    /// Entity owning the collider, if any
    pub entity: Option<Entity>,
    /// The point of intersection
    pub point: Vec3,
    /// Distance from ray origin
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground(physics: &mut Physics) -> ColliderHandle {
        let body = physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        physics.add_box_collider(body, Vec3::new(50.0, 0.1, 50.0), 1.0)
    }

    #[test]
    fn test_raycast_resolves_owner() {
        let mut physics = Physics::new();
        let mut world = hecs::World::new();
        let owner = world.spawn(());

        let body = physics.create_static_body(Vec3::new(0.0, 0.0, -3.0), Quat::IDENTITY);
        let collider = physics.add_box_collider(body, Vec3::splat(0.5), 1.0);
        physics.set_collider_owner(collider, owner);
        physics.update_query_pipeline();

        let hit = physics
            .raycast(Vec3::ZERO, Vec3::NEG_Z, 10.0)
            .expect("box in front of the ray");
        assert_eq!(hit.entity, Some(owner));
        assert!((hit.distance - 2.5).abs() < 1e-3);

        assert!(physics.raycast(Vec3::ZERO, Vec3::NEG_Z, 2.0).is_none());
        assert!(physics.raycast(Vec3::ZERO, Vec3::Z, 10.0).is_none());
    }

    #[test]
    fn test_raycast_excluding_own_body() {
        let mut physics = Physics::new();
        let own = physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        physics.add_sphere_collider(own, 0.5, 1.0);
        physics.update_query_pipeline();

        assert!(physics.raycast(Vec3::ZERO, Vec3::X, 5.0).is_some());
        assert!(
            physics
                .raycast_excluding(Vec3::ZERO, Vec3::X, 5.0, Some(own))
                .is_none()
        );
    }

    #[test]
    fn test_contact_started_once_then_touching() {
        let mut physics = Physics::new();
        let floor = ground(&mut physics);

        let ball = physics.create_dynamic_body(Vec3::new(0.0, 0.6, 0.0), Quat::IDENTITY);
        let ball_collider = physics.add_sphere_collider(ball, 0.5, 1.0);

        let mut started = 0;
        let mut touching_steps = 0;
        for _ in 0..120 {
            let report = physics.step(1.0 / 60.0);
            started += report
                .started
                .iter()
                .filter(|(a, b)| {
                    (*a == floor && *b == ball_collider) || (*a == ball_collider && *b == floor)
                })
                .count();
            if !report.touching.is_empty() {
                touching_steps += 1;
            }
        }

        assert_eq!(started, 1, "contact begins once while resting");
        assert!(touching_steps > 60);
    }

    #[test]
    fn test_impulse_changes_velocity() {
        let mut physics = Physics::with_gravity(Vec3::ZERO);
        let body = physics.create_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        physics.add_sphere_collider(body, 0.5, 1.0);
        physics.step(1.0 / 60.0);

        let mass = physics.get_mass(body).unwrap();
        assert!(mass > 0.0);
        physics.apply_impulse(body, Vec3::Y * mass * 2.0);
        let velocity = physics.get_linear_velocity(body).unwrap();
        assert!((velocity.y - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_remove_body() {
        let mut physics = Physics::new();
        let body = physics.create_dynamic_body(Vec3::ZERO, Quat::IDENTITY);
        physics.add_sphere_collider(body, 0.5, 1.0);
        assert_eq!(physics.body_count(), 1);

        physics.remove_body(body);
        assert_eq!(physics.body_count(), 0);
        assert!(physics.get_position(body).is_none());
    }
}
