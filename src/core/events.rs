//! Event Queue
//!
//! A double-buffered queue of `GameEvent`s. Events pushed while a frame runs
//! are handled in the next frame; events the host pushes before calling
//! `Engine::step` are handled in that step, since the swap happens first.
//!
//! # Example
//!
//! ```ignore
//! events.push(GameEvent::Input(InputAction::Interact));
//! events.swap();
//! for event in events.drain() {
//!     game.handle_event(ctx, &event);
//! }
//! ```

use std::collections::VecDeque;

use glam::Vec3;
use hecs::Entity;

use crate::audio::AudioCue;
use crate::ecs::Tag;
use crate::input::InputAction;

// ============================================================================
// Event Types
// ============================================================================

/// Things that happened, or were requested, in the game world.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum GameEvent {
    // -------------------------------------------------------------------------
    // Input
    // -------------------------------------------------------------------------
    /// A discrete input action was triggered.
    Input(InputAction),

    // -------------------------------------------------------------------------
    // Physics
    // -------------------------------------------------------------------------
    /// Two entities started touching.
    ContactBegan {
        entity_a: Entity,
        entity_b: Entity,
    },

    /// Two entities are touching at the end of a physics step.
    ContactStay {
        entity_a: Entity,
        entity_b: Entity,
    },

    // -------------------------------------------------------------------------
    // Audio
    // -------------------------------------------------------------------------
    /// Request to play a sound cue.
    PlaySound {
        cue: AudioCue,
        /// Position for 3D audio (None for 2D)
        position: Option<Vec3>,
    },

    // -------------------------------------------------------------------------
    // Game state
    // -------------------------------------------------------------------------
    /// Player score changed.
    ScoreChanged { score: i32 },

    /// Player health changed.
    HealthChanged { health: i32 },

    /// Player health dropped to zero and the player respawned.
    PlayerRespawned { position: Vec3 },

    /// A collectible was picked up.
    Collected { entity: Entity, tag: Tag },

    /// A door opened or closed.
    DoorToggled { entity: Entity, open: bool },

    /// A destructible was broken.
    Destroyed { entity: Entity },

    /// The player reached the stagship with the crystal.
    LevelCompleted,
}

impl GameEvent {
    /// Sound request helper
    pub fn sound(cue: AudioCue, position: Option<Vec3>) -> Self {
        Self::PlaySound { cue, position }
    }
}

// ============================================================================
// Event Queue
// ============================================================================

/// Double-buffered event queue for frame-consistent event processing.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<GameEvent>,
    /// Events from previous frame, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Events left unprocessed from the previous frame are dropped.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous frame.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Pop the next event ready for processing.
    #[inline]
    pub fn pop(&mut self) -> Option<GameEvent> {
        self.processing.pop_front()
    }

    /// Drain all events from the previous frame.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Events queued for next frame.
    pub fn pending(&self) -> impl Iterator<Item = &GameEvent> {
        self.pending.iter()
    }

    /// Get the number of events pending for next frame.
    #[must_use]
    #[inline]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Clear all events (both pending and processing).
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::ScoreChanged { score: 100 });
        assert!(queue.is_empty(), "Events should not be visible before swap");

        queue.swap();
        assert_eq!(queue.len(), 1);

        let events: Vec<_> = queue.iter().collect();
        assert!(matches!(events[0], GameEvent::ScoreChanged { score: 100 }));
    }

    #[test]
    fn test_event_queue_double_buffer_isolation() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::ScoreChanged { score: 1 });
        queue.swap();

        // Pushed while frame 1's events are being handled
        queue.push(GameEvent::ScoreChanged { score: 2 });

        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::ScoreChanged { score: 1 }));

        queue.swap();
        let events: Vec<_> = queue.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], GameEvent::ScoreChanged { score: 2 }));
    }

    #[test]
    fn test_event_queue_pop_in_order() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::Input(InputAction::Interact));
        queue.push(GameEvent::Input(InputAction::Fire));
        queue.swap();

        assert!(matches!(
            queue.pop(),
            Some(GameEvent::Input(InputAction::Interact))
        ));
        assert!(matches!(queue.pop(), Some(GameEvent::Input(InputAction::Fire))));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_event_queue_clear() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::ScoreChanged { score: 50 });
        queue.swap();
        queue.push(GameEvent::LevelCompleted);

        queue.clear();

        assert!(queue.is_empty());
        assert_eq!(queue.pending_count(), 0);
    }

    #[test]
    fn test_play_sound_event() {
        let event = GameEvent::sound(AudioCue::Door, Some(Vec3::ZERO));

        if let GameEvent::PlaySound { cue, position } = event {
            assert_eq!(cue, AudioCue::Door);
            assert!(position.is_some());
        } else {
            panic!("Wrong event type");
        }
    }
}
