//! World wrapper around hecs
//!
//! Despawning is deferred: `queue_despawn` marks an entity, and the engine
//! removes every marked entity at the end of the frame. Marked entities are
//! still readable until then but should no longer react to events.

use hecs::Entity;
use smallvec::SmallVec;

/// Game world containing all entities and components
pub struct World {
    /// The underlying hecs world
    pub inner: hecs::World,
    /// Entities marked for removal at the end of the frame
    pending_despawn: SmallVec<[Entity; 8]>,
}

impl World {
    /// Create a new empty world
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
            pending_despawn: SmallVec::new(),
        }
    }

    /// Spawn an entity with the given components
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Add components to an existing entity
    pub fn insert(
        &mut self,
        entity: Entity,
        components: impl hecs::DynamicBundle,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert(entity, components)
    }

    /// Despawn an entity immediately
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        self.inner.despawn(entity)
    }

    /// Mark an entity for removal at the end of the frame.
    ///
    /// Returns `false` if the entity is gone or already marked.
    pub fn queue_despawn(&mut self, entity: Entity) -> bool {
        if !self.inner.contains(entity) || self.pending_despawn.contains(&entity) {
            return false;
        }
        self.pending_despawn.push(entity);
        true
    }

    /// Whether the entity is marked for removal
    pub fn is_despawn_pending(&self, entity: Entity) -> bool {
        self.pending_despawn.contains(&entity)
    }

    /// Whether the entity exists and is not marked for removal
    pub fn is_live(&self, entity: Entity) -> bool {
        self.inner.contains(entity) && !self.is_despawn_pending(entity)
    }

    /// Take the marked entities, leaving the queue empty
    pub fn take_pending_despawns(&mut self) -> SmallVec<[Entity; 8]> {
        std::mem::take(&mut self.pending_despawn)
    }

    /// Get a reference to a component
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to a component
    pub fn get_mut<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<hecs::RefMut<'_, T>, hecs::ComponentError> {
        self.inner.get::<&mut T>(entity)
    }

    /// Copy a component out of an entity
    pub fn get_copy<T: hecs::Component + Copy>(&self, entity: Entity) -> Option<T> {
        self.inner.get::<&T>(entity).ok().map(|c| *c)
    }

    /// Check if an entity has a component
    pub fn has<T: hecs::Component>(&self, entity: Entity) -> bool {
        self.inner
            .entity(entity)
            .map(|e| e.has::<T>())
            .unwrap_or(false)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Query for entities with specific components
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query::<Q>()
    }

    /// Query for entities with specific components (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut::<Q>()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Name, Tag};

    #[test]
    fn test_queue_despawn_is_deferred() {
        let mut world = World::new();
        let entity = world.spawn((Name::new("box"),));

        assert!(world.queue_despawn(entity));
        assert!(!world.queue_despawn(entity), "second mark is refused");

        assert!(world.contains(entity));
        assert!(!world.is_live(entity));

        for e in world.take_pending_despawns() {
            world.despawn(e).unwrap();
        }
        assert!(!world.contains(entity));
        assert!(world.take_pending_despawns().is_empty());
    }

    #[test]
    fn test_has_and_get_copy() {
        let mut world = World::new();
        let entity = world.spawn((Tag::Door,));

        assert!(world.has::<Tag>(entity));
        assert!(!world.has::<Name>(entity));
        assert_eq!(world.get_copy::<Tag>(entity), Some(Tag::Door));
    }
}
