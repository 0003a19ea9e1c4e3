//! Core Engine struct and main game loop
//!
//! The loop is driven by the host: each `Engine::step` advances one frame.
//! Within a frame the order is fixed:
//!
//! 1. triggered input actions are queued and the event buffers swap
//! 2. `Game::update` runs once
//! 3. the frame's events are dispatched to `Game::handle_event`
//! 4. zero or more fixed steps run `Game::fixed_update` and the physics
//!    step, queueing contact events for the next frame
//! 5. requested sound cues go to the audio player
//! 6. entities marked for despawn are removed with their physics bodies
//! 7. per-frame input is cleared

use crate::audio::{AudioCue, CuePlayer};
use crate::core::{EngineConfig, EventQueue, GameEvent, ScriptStep, Time};
use crate::ecs::{Lifetime, PhysicsBody, Transform, World};
use crate::input::{Input, InputMapper};
use crate::physics::{ColliderHandle, ContactReport, Physics};
use crate::renderer::Camera;
use crate::ui::Hud;

/// Game trait that users implement
pub trait Game: 'static {
    /// Called once before the first frame
    fn init(&mut self, engine: &mut EngineContext);

    /// Called every frame for game logic updates
    fn update(&mut self, engine: &mut EngineContext);

    /// Called once per fixed physics step, before the physics world steps
    fn fixed_update(&mut self, _engine: &mut EngineContext) {}

    /// Called for every event queued during the previous frame
    fn handle_event(&mut self, _engine: &mut EngineContext, _event: &GameEvent) {}

    /// Called when the game is shutting down
    fn shutdown(&mut self, _engine: &mut EngineContext) {}
}

/// Context passed to game callbacks
pub struct EngineContext {
    /// Time tracking
    pub time: Time,
    /// Input state
    pub input: Input,
    /// Key and button bindings
    pub mapper: InputMapper,
    /// ECS world
    pub world: World,
    /// Physics world
    pub physics: Physics,
    /// Events for this frame and the next
    pub events: EventQueue,
    pub hud: Hud,
    pub camera: Camera,
    /// Where sound cues go; cues are dropped without one
    audio: Option<Box<dyn CuePlayer>>,
    /// Pending events already routed to audio
    routed: usize,
}

impl EngineContext {
    fn new(config: &EngineConfig) -> Self {
        Self {
            time: Time::with_fixed_delta(config.fixed_timestep),
            input: Input::new(),
            mapper: InputMapper::with_defaults(),
            world: World::new(),
            physics: Physics::with_gravity(config.gravity),
            events: EventQueue::new(),
            hud: Hud::new(0, 0),
            camera: Camera::new(),
            audio: None,
            routed: 0,
        }
    }

    /// Request a sound cue; it plays at the end of this frame
    pub fn play_sound(&mut self, cue: AudioCue, position: Option<glam::Vec3>) {
        self.events.push(GameEvent::sound(cue, position));
    }

    pub fn set_audio(&mut self, player: Box<dyn CuePlayer>) {
        self.audio = Some(player);
    }

    /// Mark entities whose lifetime ran out for despawn
    pub fn expire_lifetimes(&mut self) -> usize {
        let now = self.time.elapsed_seconds();
        let expired: Vec<_> = self
            .world
            .query::<&Lifetime>()
            .iter()
            .filter(|(_, lifetime)| lifetime.is_expired(now))
            .map(|(entity, _)| entity)
            .collect();

        expired
            .into_iter()
            .filter(|entity| self.world.queue_despawn(*entity))
            .count()
    }

    fn queue_input_actions(&mut self) {
        for action in self.input.triggered_actions(&self.mapper) {
            self.events.push(GameEvent::Input(action));
        }
    }

    fn swap_events(&mut self) {
        self.route_audio();
        self.events.swap();
        self.routed = 0;
    }

    /// Play cues requested since the last routing
    fn route_audio(&mut self) {
        let cues = self
            .events
            .pending()
            .skip(self.routed)
            .filter_map(|event| match event {
                GameEvent::PlaySound { cue, position } => Some((*cue, *position)),
                _ => None,
            });

        match self.audio.as_mut() {
            Some(player) => cues.for_each(|(cue, position)| player.play(cue, position)),
            None => cues.for_each(|(cue, _)| log::trace!("no audio player for {}", cue.name())),
        }
        self.routed = self.events.pending_count();
    }

    /// Copy body poses into transforms
    fn sync_transforms(&mut self) {
        for (_, (transform, body)) in self.world.query_mut::<(&mut Transform, &PhysicsBody)>() {
            if let Some(position) = self.physics.get_position(body.body) {
                transform.position = position;
            }
            if let Some(rotation) = self.physics.get_rotation(body.body) {
                transform.rotation = rotation;
            }
        }
    }

    fn queue_contacts(&mut self, report: &ContactReport) {
        let physics = &self.physics;
        let owners = |(a, b): (ColliderHandle, ColliderHandle)| {
            Some((physics.collider_owner(a)?, physics.collider_owner(b)?))
        };

        let began: Vec<_> = report.started.iter().copied().filter_map(owners).collect();
        let stay: Vec<_> = report.touching.iter().copied().filter_map(owners).collect();

        for (entity_a, entity_b) in began {
            self.events.push(GameEvent::ContactBegan { entity_a, entity_b });
        }
        for (entity_a, entity_b) in stay {
            self.events.push(GameEvent::ContactStay { entity_a, entity_b });
        }
    }

    /// Remove marked entities and their bodies
    fn flush_despawns(&mut self) -> usize {
        let pending = self.world.take_pending_despawns();
        if pending.is_empty() {
            return 0;
        }

        for entity in &pending {
            if let Some(body) = self.world.get_copy::<PhysicsBody>(*entity) {
                self.physics.remove_body(body.body);
            }
            if self.world.despawn(*entity).is_err() {
                log::debug!("entity {entity:?} was already gone");
            }
        }
        self.physics.update_query_pipeline();
        pending.len()
    }
}

/// Main engine struct
pub struct Engine<G: Game> {
    config: EngineConfig,
    game: G,
    context: EngineContext,
    /// Unsimulated time carried to the next frame
    accumulator: f32,
    initialized: bool,
}

impl<G: Game> Engine<G> {
    /// Create a new engine with the given game
    pub fn new(config: EngineConfig, game: G) -> Self {
        let context = EngineContext::new(&config);
        Self {
            config,
            game,
            context,
            accumulator: 0.0,
            initialized: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.context
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Initialize the game; `step` does this on first use
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        log::info!("Starting engine: {}", self.config.title);
        self.game.init(&mut self.context);
        self.context.physics.update_query_pipeline();
        self.initialized = true;
        log::info!("Engine initialized successfully");
    }

    /// Advance one frame of `dt` seconds
    pub fn step(&mut self, dt: f32) {
        self.init();

        let ctx = &mut self.context;
        ctx.time.advance(dt);
        let dt = ctx.time.delta_seconds();

        ctx.queue_input_actions();
        ctx.swap_events();

        self.game.update(ctx);

        while let Some(event) = ctx.events.pop() {
            self.game.handle_event(ctx, &event);
        }

        let fixed = self.config.fixed_timestep;
        self.accumulator += dt;
        let mut steps = 0;
        while self.accumulator >= fixed && steps < self.config.max_substeps {
            self.game.fixed_update(ctx);
            let report = ctx.physics.step(fixed);
            ctx.sync_transforms();
            ctx.queue_contacts(&report);
            self.accumulator -= fixed;
            steps += 1;
        }
        if self.accumulator >= fixed {
            log::debug!(
                "Dropping {:.3}s of simulation after {steps} substeps",
                self.accumulator
            );
            self.accumulator = 0.0;
        }

        ctx.route_audio();
        ctx.flush_despawns();
        ctx.input.update();
    }

    /// Advance `frames` frames of `dt` seconds each
    pub fn run_frames(&mut self, frames: u64, dt: f32) {
        for _ in 0..frames {
            self.step(dt);
        }
    }

    /// Advance `frames` frames, applying scripted input at the start of the
    /// frame it names. Frames are numbered from 0.
    pub fn run_script(&mut self, script: &[ScriptStep], frames: u64, dt: f32) {
        for frame in 0..frames {
            for step in script.iter().filter(|step| step.frame == frame) {
                step.input.apply(&mut self.context.input);
            }
            self.step(dt);
        }
    }

    /// Shut the game down
    pub fn shutdown(&mut self) {
        if self.initialized {
            log::info!("Shutting down");
            self.game.shutdown(&mut self.context);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::CueLog;
    use crate::input::InputAction;
    use glam::{Quat, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        updates: u32,
        fixed_updates: u32,
        events: Vec<GameEvent>,
    }

    impl Game for Recorder {
        fn init(&mut self, _engine: &mut EngineContext) {}

        fn update(&mut self, _engine: &mut EngineContext) {
            self.updates += 1;
        }

        fn fixed_update(&mut self, _engine: &mut EngineContext) {
            self.fixed_updates += 1;
        }

        fn handle_event(&mut self, _engine: &mut EngineContext, event: &GameEvent) {
            self.events.push(event.clone());
        }
    }

    #[test]
    fn test_fixed_steps_follow_accumulator() {
        let mut engine = Engine::new(EngineConfig::default(), Recorder::default());

        engine.step(0.01);
        assert_eq!(engine.game().fixed_updates, 0);
        engine.step(0.01);
        assert_eq!(engine.game().fixed_updates, 1);
        engine.step(0.05);
        assert_eq!(engine.game().fixed_updates, 3);
        assert_eq!(engine.game().updates, 3);
    }

    #[test]
    fn test_long_frames_are_capped() {
        let config = EngineConfig::default().with_max_substeps(3);
        let mut engine = Engine::new(config, Recorder::default());

        engine.step(1.0);
        assert_eq!(engine.game().fixed_updates, 3);
        engine.step(0.0);
        assert_eq!(engine.game().fixed_updates, 3);
    }

    #[test]
    fn test_runaway_frame_deltas_do_not_panic() {
        let mut engine = Engine::new(EngineConfig::default(), Recorder::default());

        engine.step(1e20);
        assert_eq!(engine.context().time.elapsed_seconds(), 1.0);
        assert_eq!(engine.game().fixed_updates, 5);

        engine.step(f32::INFINITY);
        engine.step(f32::NAN);
        assert_eq!(engine.context().time.elapsed_seconds(), 1.0);
        assert_eq!(engine.game().fixed_updates, 5);
        assert_eq!(engine.game().updates, 3);
    }

    #[test]
    fn test_injected_action_handled_same_frame() {
        let mut engine = Engine::new(EngineConfig::default(), Recorder::default());
        engine.context_mut().input.inject_action(InputAction::Interact);
        engine.step(0.02);

        assert!(matches!(
            engine.game().events.as_slice(),
            [GameEvent::Input(InputAction::Interact)]
        ));

        // Cleared after the frame
        engine.step(0.02);
        assert_eq!(engine.game().events.len(), 1);
    }

    struct Shared(Rc<RefCell<CueLog>>);

    impl CuePlayer for Shared {
        fn play(&mut self, cue: AudioCue, position: Option<Vec3>) {
            self.0.borrow_mut().play(cue, position);
        }
    }

    struct Beeper;

    impl Game for Beeper {
        fn init(&mut self, _engine: &mut EngineContext) {}

        fn update(&mut self, engine: &mut EngineContext) {
            engine.play_sound(AudioCue::Jump, None);
        }
    }

    #[test]
    fn test_cues_play_once_in_the_frame_they_are_requested() {
        let log = Rc::new(RefCell::new(CueLog::new()));
        let mut engine = Engine::new(EngineConfig::default(), Beeper);
        engine.context_mut().set_audio(Box::new(Shared(Rc::clone(&log))));

        engine.step(0.02);
        assert_eq!(log.borrow().count(AudioCue::Jump), 1);
        engine.step(0.02);
        assert_eq!(log.borrow().count(AudioCue::Jump), 2);

        // Host requests before a step are routed too
        engine.context_mut().play_sound(AudioCue::Door, None);
        engine.step(0.02);
        assert_eq!(log.borrow().count(AudioCue::Door), 1);
        assert_eq!(log.borrow().count(AudioCue::Jump), 3);
    }

    #[test]
    fn test_lifetime_despawns_entity_and_body() {
        let mut engine = Engine::new(EngineConfig::default(), Recorder::default());
        engine.init();

        let ctx = engine.context_mut();
        let body = ctx.physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        let collider = ctx.physics.add_sphere_collider(body, 0.1, 1.0);
        let entity = ctx.world.spawn((
            Transform::default(),
            PhysicsBody { body, collider },
            Lifetime::after(0.0, 0.05),
        ));

        engine.step(0.02);
        assert_eq!(engine.context_mut().expire_lifetimes(), 0);
        engine.step(0.04);
        assert_eq!(engine.context_mut().expire_lifetimes(), 1);
        engine.step(0.0);

        assert!(!engine.context().world.contains(entity));
        assert_eq!(engine.context().physics.body_count(), 0);
    }

    #[test]
    fn test_contacts_become_events() {
        let mut engine = Engine::new(EngineConfig::default(), Recorder::default());
        engine.init();

        let ctx = engine.context_mut();
        let floor_body = ctx.physics.create_static_body(Vec3::ZERO, Quat::IDENTITY);
        let floor_collider =
            ctx.physics.add_box_collider(floor_body, Vec3::new(5.0, 0.1, 5.0), 1.0);
        let floor = ctx.world.spawn((
            Transform::default(),
            PhysicsBody {
                body: floor_body,
                collider: floor_collider,
            },
        ));
        ctx.physics.set_collider_owner(floor_collider, floor);

        let ball_body = ctx.physics.create_dynamic_body(Vec3::new(0.0, 0.5, 0.0), Quat::IDENTITY);
        let ball_collider = ctx.physics.add_sphere_collider(ball_body, 0.25, 1.0);
        let ball = ctx.world.spawn((
            Transform::default(),
            PhysicsBody {
                body: ball_body,
                collider: ball_collider,
            },
        ));
        ctx.physics.set_collider_owner(ball_collider, ball);

        engine.run_frames(60, 0.02);

        let events = &engine.game().events;
        let began = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ContactBegan { .. }))
            .count();
        let stays = events
            .iter()
            .filter(|e| matches!(e, GameEvent::ContactStay { .. }))
            .count();
        assert!(began >= 1);
        assert!(stays > 10);

        // Transform follows the falling body
        let transform = engine.context().world.get_copy::<Transform>(ball).unwrap();
        assert!(transform.position.y < 0.5);
    }
}
