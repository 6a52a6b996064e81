//! Entity storage with stable ids and whole-level teardown.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;

/// Handle to an entity in an [`EntityArena`].
///
/// Ids carry the arena generation they were issued in. Clearing the arena
/// starts a new generation, so ids held across a level change (for example
/// a pending removal) never resolve to an entity of the next level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    generation: u32,
    index: u32,
}

/// Slot vector of entities. Removing an entity leaves a hole so other ids
/// stay valid.
#[derive(Debug, Default)]
pub struct EntityArena {
    slots: Vec<Option<Entity>>,
    generation: u32,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity and return its id.
    pub fn insert(&mut self, entity: Entity) -> EntityId {
        let index = self.slots.len() as u32;
        self.slots.push(Some(entity));
        EntityId {
            generation: self.generation,
            index,
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        if id.generation != self.generation {
            return None;
        }
        self.slots.get(id.index as usize)?.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id.generation != self.generation {
            return None;
        }
        self.slots.get_mut(id.index as usize)?.as_mut()
    }

    /// Remove an entity. Stale or unknown ids are ignored.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        if id.generation != self.generation {
            return None;
        }
        self.slots.get_mut(id.index as usize)?.take()
    }

    /// Drop every entity and invalidate all ids handed out so far.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        let generation = self.generation;
        self.slots.iter().enumerate().filter_map(move |(index, slot)| {
            slot.as_ref().map(|entity| {
                (
                    EntityId {
                        generation,
                        index: index as u32,
                    },
                    entity,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut Entity)> {
        let generation = self.generation;
        self.slots.iter_mut().enumerate().filter_map(move |(index, slot)| {
            slot.as_mut().map(|entity| {
                (
                    EntityId {
                        generation,
                        index: index as u32,
                    },
                    entity,
                )
            })
        })
    }
}
