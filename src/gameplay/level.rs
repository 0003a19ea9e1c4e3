//! The playable level
//!
//! `Level` spawns a `Scene` into the world and runs the player: camera
//! follow, the interaction ray, interact / fire / jump input, health zones,
//! breakables, bridges and the stagship exit.

use std::fmt;

use glam::{Quat, Vec3};
use hecs::Entity;

use super::bridge::Bridge;
use super::collectible::{Collectible, CollectibleKind};
use super::controller::{ThirdPersonController, facing};
use super::destructible::{Destructible, DestructibleKind};
use super::door::{Door, DoorInteraction, DoorLockVisual};
use super::health::HealthZone;
use super::player::{Interaction, PlayerState, Target};
use super::sinks::HealthChange;
use crate::audio::AudioCue;
use crate::core::{EngineContext, EntityKind, Game, GameConfig, GameEvent, Scene, SceneEntity};
use crate::ecs::{Lifetime, Name, PhysicsBody, Tag, Transform};
use crate::input::InputAction;
use crate::renderer::{Appearance, Material, MaterialSet, MaterialVariant};
use crate::ui::{COMPLETION_MESSAGE, Hud};

const PLAYER_HALF_HEIGHT: f32 = 0.5;
const PLAYER_RADIUS: f32 = 0.5;
/// Camera eye above the player's origin
const EYE_HEIGHT: f32 = 0.6;
const PICKUP_RADIUS: f32 = 0.3;
const DESTRUCTIBLE_HALF_EXTENT: f32 = 0.5;
const PROJECTILE_RADIUS: f32 = 0.1;
const PROJECTILE_MASS: f32 = 0.25;
/// Gun point relative to the player, along its facing and up
const GUN_FORWARD: f32 = 0.8;
const GUN_UP: f32 = 0.5;

/// World-space axis a door swings around
#[derive(Debug, Clone, Copy, PartialEq)]
struct Hinge {
    pivot: Vec3,
}

/// End-of-run numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSummary {
    pub score: i32,
    pub health: i32,
    pub coins: u32,
    pub has_keycard: bool,
    pub has_crystal: bool,
    pub deaths: u32,
    pub completed: bool,
}

impl fmt::Display for LevelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score {} | health {} | coins {} | keycard {} | crystal {} | deaths {} | {}",
            self.score,
            self.health,
            self.coins,
            if self.has_keycard { "yes" } else { "no" },
            if self.has_crystal { "yes" } else { "no" },
            self.deaths,
            if self.completed { "completed" } else { "not completed" },
        )
    }
}

pub struct Level {
    scene: Scene,
    config: GameConfig,
    controller: ThirdPersonController,
    player: PlayerState,
    player_entity: Option<Entity>,
    player_body: Option<PhysicsBody>,
    /// Entities spawned for `scene.entities`, by index
    spawned: Vec<Entity>,
    deaths: u32,
    completed: bool,
}

impl Level {
    pub fn new(scene: Scene) -> Self {
        let config = scene.config.clone();
        Self {
            controller: config.controller(PLAYER_HALF_HEIGHT + PLAYER_RADIUS),
            player: PlayerState::new(config.max_health, config.crystal_latch),
            config,
            scene,
            player_entity: None,
            player_body: None,
            spawned: Vec::new(),
            deaths: 0,
            completed: false,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    pub fn player_entity(&self) -> Option<Entity> {
        self.player_entity
    }

    pub fn player_body(&self) -> Option<PhysicsBody> {
        self.player_body
    }

    /// Entity spawned for the scene entry at `index`
    pub fn entity(&self, index: usize) -> Option<Entity> {
        self.spawned.get(index).copied()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn summary(&self) -> LevelSummary {
        LevelSummary {
            score: self.player.score,
            health: self.player.health.current(),
            coins: self.player.coins_collected,
            has_keycard: self.player.has_keycard,
            has_crystal: self.player.has_crystal,
            deaths: self.deaths,
            completed: self.completed,
        }
    }

    fn spawn_player(&mut self, ctx: &mut EngineContext) {
        let spawn = self.scene.spawn_point;
        let body = ctx.physics.create_character_body(spawn, Quat::IDENTITY);
        let collider = ctx
            .physics
            .add_capsule_collider(body, PLAYER_HALF_HEIGHT, PLAYER_RADIUS, 1.0);
        let physics_body = PhysicsBody { body, collider };

        let entity = ctx.world.spawn((
            Name::new("Player"),
            Tag::Player,
            Transform::from_position(spawn),
            physics_body,
        ));
        ctx.physics.set_collider_owner(collider, entity);

        self.player_entity = Some(entity);
        self.player_body = Some(physics_body);
    }

    fn spawn_entity(&self, ctx: &mut EngineContext, entry: &SceneEntity) -> Entity {
        let transform = entry.transform;
        let name = entry
            .name
            .clone()
            .unwrap_or_else(|| kind_name(&entry.kind).to_string());

        let entity = match entry.kind {
            EntityKind::Ground { half_extents } | EntityKind::Wall { half_extents } => {
                let body = static_box(ctx, transform, half_extents);
                ctx.world.spawn((
                    transform,
                    body,
                    Appearance::new(MaterialSet::new(Material::gray())),
                ))
            }
            EntityKind::Collectible(kind) => {
                return spawn_collectible(ctx, Collectible::new(kind), transform, name);
            }
            EntityKind::Door {
                locked,
                half_extents,
            } => {
                let body = ctx
                    .physics
                    .create_kinematic_body(transform.position, transform.rotation);
                let collider = ctx.physics.add_box_collider(body, half_extents, 1.0);

                let mut appearance = Appearance::new(DoorLockVisual::materials());
                let mut visual = DoorLockVisual::default();
                visual.set_locked(locked, &mut appearance);

                let pivot = transform.position
                    + transform.rotation * Vec3::new(-half_extents.x, 0.0, 0.0);

                ctx.world.spawn((
                    Tag::Door,
                    transform,
                    PhysicsBody { body, collider },
                    Door::new(locked),
                    visual,
                    appearance,
                    Hinge { pivot },
                ))
            }
            EntityKind::Destructible(kind) => {
                let body = static_box(ctx, transform, Vec3::splat(DESTRUCTIBLE_HALF_EXTENT));
                let material = match kind {
                    DestructibleKind::Box => Material::new(Vec3::new(0.6, 0.4, 0.2)),
                    DestructibleKind::Glass => Material::shiny(Vec3::new(0.7, 0.9, 1.0)),
                };
                ctx.world.spawn((
                    transform,
                    body,
                    Destructible::new(kind),
                    Appearance::new(MaterialSet::new(material)),
                ))
            }
            EntityKind::Bridge {
                half_extents,
                min_y,
                max_y,
                speed,
            } => {
                let body = ctx
                    .physics
                    .create_kinematic_body(transform.position, transform.rotation);
                let collider = ctx.physics.add_box_collider(body, half_extents, 1.0);
                ctx.world.spawn((
                    transform,
                    PhysicsBody { body, collider },
                    Bridge::new(transform.position.y, min_y, max_y, speed),
                    Appearance::new(MaterialSet::new(Material::gray())),
                ))
            }
            EntityKind::HealthZone {
                effect,
                half_extents,
            } => {
                let body = static_box(ctx, transform, half_extents);
                let zone = HealthZone::new(effect);
                let (tag, color) = if zone.is_hazard() {
                    (Tag::HazardArea, Vec3::new(1.0, 0.3, 0.0))
                } else {
                    (Tag::HealingArea, Vec3::new(0.2, 0.9, 0.3))
                };
                ctx.world.spawn((
                    tag,
                    transform,
                    body,
                    zone,
                    Appearance::new(MaterialSet::new(Material::new(color))),
                ))
            }
            EntityKind::Stagship { half_extents } => {
                let body = static_box(ctx, transform, half_extents);
                ctx.world.spawn((
                    Tag::Stagship,
                    transform,
                    body,
                    Appearance::new(MaterialSet::new(Material::shiny(Vec3::splat(0.9)))),
                ))
            }
        };

        finish_spawn(ctx, entity, name)
    }

    fn update_camera(&self, ctx: &mut EngineContext) {
        let look = ctx.input.mouse_delta();
        if look != glam::Vec2::ZERO {
            ctx.camera.rotate(look.x, look.y);
        }

        let Some(body) = self.player_body else {
            return;
        };
        if let Some(position) = ctx.physics.get_position(body.body) {
            ctx.camera.follow(position);
        }
    }

    /// Cast the interaction ray and move the highlight to what it hits
    fn update_targeting(&mut self, ctx: &mut EngineContext) {
        let exclude = self.player_body.map(|b| b.body);
        let hit = ctx.physics.raycast_excluding(
            ctx.camera.position,
            ctx.camera.forward(),
            self.config.interaction_distance,
            exclude,
        );

        let seen = hit
            .and_then(|hit| hit.entity)
            .filter(|entity| ctx.world.is_live(*entity))
            .map_or(Target::None, |entity| {
                Target::from_tag(entity, ctx.world.get_copy::<Tag>(entity))
            });

        let change = self.player.retarget(seen);
        if let Some(entity) = change.unhighlight {
            set_highlight(ctx, entity, false);
        }
        if let Some(entity) = change.highlight {
            set_highlight(ctx, entity, true);
        }
    }

    fn update_bridges(ctx: &mut EngineContext) {
        let dt = ctx.time.delta_seconds();
        let mut moves = Vec::new();
        for (_, (bridge, transform, body)) in ctx
            .world
            .query_mut::<(&mut Bridge, &mut Transform, &PhysicsBody)>()
        {
            transform.position.y = bridge.tick(transform.position.y, dt);
            moves.push((body.body, transform.position, transform.rotation));
        }
        for (body, position, rotation) in moves {
            ctx.physics.set_kinematic_pose(body, position, rotation);
        }
    }

    fn interact(&mut self, ctx: &mut EngineContext) {
        match self.player.interaction() {
            Interaction::Collect(entity) => self.collect(ctx, entity),
            Interaction::UseDoor(entity) => self.use_door(ctx, entity),
            Interaction::Nothing => log::debug!("Nothing to interact with"),
        }
    }

    fn collect(&mut self, ctx: &mut EngineContext, entity: Entity) {
        if !ctx.world.is_live(entity) {
            log::debug!("Target {entity:?} is already gone");
            self.player.forget(entity);
            return;
        }

        let score = self.player.score;
        let collected = match ctx.world.get_mut::<Collectible>(entity) {
            Ok(mut collectible) => {
                log::debug!("Interacting with {:?}", collectible.kind);
                collectible.collect(&mut self.player).then_some(collectible.kind)
            }
            Err(_) => {
                log::warn!("Target {entity:?} is not collectible");
                None
            }
        };
        self.player.clear_target();

        let Some(kind) = collected else {
            return;
        };

        let position = ctx.world.get_copy::<Transform>(entity).map(|t| t.position);
        ctx.play_sound(kind.cue(), position);
        ctx.events.push(GameEvent::Collected {
            entity,
            tag: kind.tag(),
        });
        ctx.world.queue_despawn(entity);

        if kind == CollectibleKind::Keycard {
            ctx.hud.show_keycard();
        }
        if self.player.score != score {
            ctx.events.push(GameEvent::ScoreChanged {
                score: self.player.score,
            });
        }
        self.refresh_hud(&mut ctx.hud);
    }

    fn use_door(&mut self, ctx: &mut EngineContext, entity: Entity) {
        let result = match ctx.world.get_mut::<Door>(entity) {
            Ok(mut door) => door.interact(&self.player),
            Err(_) => {
                log::warn!("Door {entity:?} is gone");
                self.player.forget(entity);
                return;
            }
        };

        if let DoorInteraction::Unlocked { .. } = result {
            unlock_visual(ctx, entity);
        }

        let (DoorInteraction::Unlocked { open } | DoorInteraction::Toggled { open }) = result
        else {
            return;
        };

        self.swing_door(ctx, entity, open);
        let position = ctx.world.get_copy::<Transform>(entity).map(|t| t.position);
        ctx.play_sound(AudioCue::Door, position);
        ctx.events.push(GameEvent::DoorToggled { entity, open });
    }

    /// Rotate a door a quarter turn around its hinge
    fn swing_door(&self, ctx: &mut EngineContext, entity: Entity, open: bool) {
        let (Some(hinge), Some(body)) = (
            ctx.world.get_copy::<Hinge>(entity),
            ctx.world.get_copy::<PhysicsBody>(entity),
        ) else {
            return;
        };

        let swing = Quat::from_rotation_y(Door::swing_yaw(open));
        let pose = match ctx.world.get_mut::<Transform>(entity) {
            Ok(mut transform) => {
                transform.position = hinge.pivot + swing * (transform.position - hinge.pivot);
                transform.rotation = (swing * transform.rotation).normalize();
                *transform
            }
            Err(_) => return,
        };
        ctx.physics
            .set_kinematic_pose(body.body, pose.position, pose.rotation);
    }

    fn fire(&mut self, ctx: &mut EngineContext) {
        let Some(player) = self.player_body else {
            return;
        };
        let Some(position) = ctx.physics.get_position(player.body) else {
            return;
        };

        ctx.play_sound(AudioCue::Fire, Some(position));

        let mut forward = ctx.camera.planar_forward();
        if forward == Vec3::ZERO {
            forward = ctx
                .physics
                .get_rotation(player.body)
                .map_or(Vec3::NEG_Z, |r| r * Vec3::NEG_Z);
        }
        let rotation = facing(forward);
        ctx.physics.set_rotation(player.body, rotation);

        let gun_point = position + forward * GUN_FORWARD + Vec3::Y * GUN_UP;
        let body = ctx.physics.create_dynamic_body(gun_point, rotation);
        let volume = 4.0 / 3.0 * std::f32::consts::PI * PROJECTILE_RADIUS.powi(3);
        let collider =
            ctx.physics
                .add_sphere_collider(body, PROJECTILE_RADIUS, PROJECTILE_MASS / volume);
        // Impulse over the known mass; the body's own mass is not computed
        // until the next physics step
        ctx.physics
            .set_linear_velocity(body, forward * (self.config.fire_strength / PROJECTILE_MASS));

        let now = ctx.time.elapsed_seconds();
        let entity = ctx.world.spawn((
            Tag::Projectile,
            Transform::from_position_rotation(gun_point, rotation),
            PhysicsBody { body, collider },
            Lifetime::after(now, self.config.projectile_lifetime),
            Appearance::new(MaterialSet::new(Material::gray())),
        ));
        finish_spawn(ctx, entity, "Projectile".to_string());
        log::debug!("Fired projectile from {gun_point}");
    }

    fn jump(&mut self, ctx: &mut EngineContext) {
        let Some(player) = self.player_body else {
            return;
        };
        match self.controller.jump(&mut ctx.physics, player.body) {
            Some(position) => ctx.play_sound(AudioCue::Jump, Some(position)),
            None => log::debug!("Not grounded, can't jump"),
        }
    }

    fn contact_began(&mut self, ctx: &mut EngineContext, a: Entity, b: Entity) {
        for (this, other) in [(a, b), (b, a)] {
            if ctx.world.has::<Destructible>(this) {
                self.break_destructible(ctx, this, other);
            } else if Some(this) == self.player_entity
                && ctx.world.get_copy::<Tag>(other) == Some(Tag::Stagship)
            {
                self.reach_stagship(ctx);
            }
        }
    }

    fn break_destructible(&mut self, ctx: &mut EngineContext, entity: Entity, other: Entity) {
        // Already broken this frame, or hit by a projectile that already broke something
        if !ctx.world.is_live(entity) || !ctx.world.is_live(other) {
            return;
        }
        let (Some(destructible), Some(transform)) = (
            ctx.world.get_copy::<Destructible>(entity),
            ctx.world.get_copy::<Transform>(entity),
        ) else {
            return;
        };

        let Some(breakage) =
            destructible.on_contact(ctx.world.get_copy::<Tag>(other), transform.position)
        else {
            return;
        };

        ctx.play_sound(breakage.cue, Some(breakage.position));
        if let Some(at) = breakage.coin_at {
            let coin = Collectible::coin(self.config.box_coin_value);
            spawn_collectible(ctx, coin, Transform::from_position(at), "Coin".to_string());
        }
        ctx.world.queue_despawn(other);
        ctx.world.queue_despawn(entity);
        ctx.events.push(GameEvent::Destroyed { entity });
    }

    fn reach_stagship(&mut self, ctx: &mut EngineContext) {
        if !self.player.has_crystal {
            log::debug!("The stagship needs the crystal");
            return;
        }

        log::info!("You have completed the game!");
        let now = ctx.time.elapsed_seconds();
        ctx.hud
            .show_message(COMPLETION_MESSAGE, now, self.config.message_duration);
        self.completed = true;
        ctx.events.push(GameEvent::LevelCompleted);
    }

    fn contact_stay(&mut self, ctx: &mut EngineContext, a: Entity, b: Entity) {
        let Some(player) = self.player_entity else {
            return;
        };
        let zone = if a == player {
            b
        } else if b == player {
            a
        } else {
            return;
        };

        let now = ctx.time.elapsed_seconds();
        let (change, hazard) = match ctx.world.get_mut::<HealthZone>(zone) {
            Ok(mut health_zone) => (
                health_zone.apply(now, &mut self.player),
                health_zone.is_hazard(),
            ),
            Err(_) => return,
        };

        let Some(change) = change else {
            return;
        };
        if hazard {
            let position = self
                .player_body
                .and_then(|body| ctx.physics.get_position(body.body));
            ctx.play_sound(AudioCue::Hazard, position);
        }

        match change {
            HealthChange::Changed(health) => {
                ctx.events.push(GameEvent::HealthChanged { health });
            }
            HealthChange::Died => self.respawn(ctx),
        }
        self.refresh_hud(&mut ctx.hud);
    }

    /// Put the player back at the spawn point, at rest
    fn respawn(&mut self, ctx: &mut EngineContext) {
        let spawn = self.scene.spawn_point;
        if let Some(player) = self.player_body {
            ctx.physics.set_position(player.body, spawn);
            ctx.physics.set_linear_velocity(player.body, Vec3::ZERO);
        }
        self.deaths += 1;
        ctx.events.push(GameEvent::PlayerRespawned { position: spawn });
        ctx.events.push(GameEvent::HealthChanged {
            health: self.player.health.current(),
        });
    }

    fn refresh_hud(&self, hud: &mut Hud) {
        hud.set_score(self.player.score);
        hud.set_health(self.player.health.current());
        hud.set_coins(self.player.coins_collected);
        if self.player.has_keycard {
            hud.show_keycard();
        }
    }
}

impl Game for Level {
    fn init(&mut self, ctx: &mut EngineContext) {
        log::info!(
            "Loading level '{}' ({} entities)",
            self.scene.name,
            self.scene.entity_count()
        );

        ctx.camera.eye_height = EYE_HEIGHT;
        ctx.hud = Hud::new(self.player.score, self.player.health.current());

        self.spawn_player(ctx);
        let spawned = self
            .scene
            .entities
            .iter()
            .map(|entry| self.spawn_entity(ctx, entry))
            .collect();
        self.spawned = spawned;

        ctx.camera.follow(self.scene.spawn_point);
        ctx.physics.update_query_pipeline();
    }

    fn update(&mut self, ctx: &mut EngineContext) {
        self.update_camera(ctx);
        self.update_targeting(ctx);
        Self::update_bridges(ctx);
        ctx.expire_lifetimes();
        ctx.hud.update(ctx.time.elapsed_seconds());
    }

    fn fixed_update(&mut self, ctx: &mut EngineContext) {
        let Some(player) = self.player_body else {
            return;
        };
        let axes = ctx.input.movement_axes(&ctx.mapper);
        let dt = ctx.time.fixed_delta_seconds();
        self.controller
            .fixed_update(&mut ctx.physics, player.body, &ctx.camera, axes, dt);
    }

    fn handle_event(&mut self, ctx: &mut EngineContext, event: &GameEvent) {
        match *event {
            GameEvent::Input(InputAction::Interact) => self.interact(ctx),
            GameEvent::Input(InputAction::Fire) => self.fire(ctx),
            GameEvent::Input(InputAction::Jump) => self.jump(ctx),
            GameEvent::ContactBegan { entity_a, entity_b } => {
                self.contact_began(ctx, entity_a, entity_b);
            }
            GameEvent::ContactStay { entity_a, entity_b } => {
                self.contact_stay(ctx, entity_a, entity_b);
            }
            _ => {}
        }
    }

    fn shutdown(&mut self, _ctx: &mut EngineContext) {
        log::info!("Level '{}' finished: {}", self.scene.name, self.summary());
    }
}

fn kind_name(kind: &EntityKind) -> &'static str {
    match kind {
        EntityKind::Ground { .. } => "Ground",
        EntityKind::Wall { .. } => "Wall",
        EntityKind::Collectible(CollectibleKind::Coin { .. }) => "Coin",
        EntityKind::Collectible(CollectibleKind::Keycard) => "Keycard",
        EntityKind::Collectible(CollectibleKind::Crystal) => "Crystal",
        EntityKind::Door { .. } => "Door",
        EntityKind::Destructible(DestructibleKind::Box) => "Box",
        EntityKind::Destructible(DestructibleKind::Glass) => "Glass",
        EntityKind::Bridge { .. } => "Bridge",
        EntityKind::HealthZone { .. } => "HealthZone",
        EntityKind::Stagship { .. } => "Stagship",
    }
}

fn static_box(ctx: &mut EngineContext, transform: Transform, half_extents: Vec3) -> PhysicsBody {
    let body = ctx
        .physics
        .create_static_body(transform.position, transform.rotation);
    let collider = ctx.physics.add_box_collider(body, half_extents, 1.0);
    PhysicsBody { body, collider }
}

fn spawn_collectible(
    ctx: &mut EngineContext,
    collectible: Collectible,
    transform: Transform,
    name: String,
) -> Entity {
    let kind = collectible.kind;
    let body = ctx
        .physics
        .create_static_body(transform.position, transform.rotation);
    let collider = ctx.physics.add_sphere_collider(body, PICKUP_RADIUS, 1.0);
    let entity = ctx.world.spawn((
        kind.tag(),
        transform,
        PhysicsBody { body, collider },
        collectible,
        Appearance::new(kind.materials()),
    ));
    finish_spawn(ctx, entity, name)
}

/// Name the entity and point its collider back at it
fn finish_spawn(ctx: &mut EngineContext, entity: Entity, name: String) -> Entity {
    if let Some(body) = ctx.world.get_copy::<PhysicsBody>(entity) {
        ctx.physics.set_collider_owner(body.collider, entity);
    }
    if ctx.world.insert(entity, (Name(name),)).is_err() {
        log::warn!("Spawned entity {entity:?} vanished");
    }
    entity
}

/// Show a door as unlocked while it is still targeted
fn unlock_visual(ctx: &mut EngineContext, entity: Entity) {
    let Some(mut visual) = ctx.world.get_copy::<DoorLockVisual>(entity) else {
        log::debug!("Door {entity:?} has no lock visual");
        return;
    };
    if let Ok(mut appearance) = ctx.world.get_mut::<Appearance>(entity) {
        visual.set_locked(false, &mut appearance);
        visual.highlight(&mut appearance);
    }
    if let Ok(mut stored) = ctx.world.get_mut::<DoorLockVisual>(entity) {
        *stored = visual;
    }
}

fn set_highlight(ctx: &mut EngineContext, entity: Entity, on: bool) {
    let visual = ctx.world.get_copy::<DoorLockVisual>(entity);
    let Ok(mut appearance) = ctx.world.get_mut::<Appearance>(entity) else {
        log::debug!("No appearance on {entity:?}");
        return;
    };

    match (visual, on) {
        (Some(visual), true) => visual.highlight(&mut appearance),
        (Some(visual), false) => visual.unhighlight(&mut appearance),
        (None, true) => appearance.set_variant(MaterialVariant::Highlight),
        (None, false) => appearance.set_variant(MaterialVariant::Default),
    }
}
