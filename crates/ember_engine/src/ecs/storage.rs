//! # Component Storage
//!
//! One [`SparseSet`] per component type. The sparse array is indexed by the
//! raw entity id and points into dense, tightly packed arrays of entities and
//! component values, so iteration touches only live components.
//!
//! [`AnyStorage`] erases the component type so the world can hold every
//! storage in one map and still remove an entity from all of them.

use super::{Component, EntityId};
use std::any::Any;

/// Sparse/dense storage for a single component type
pub struct SparseSet<T> {
    sparse: Vec<Option<u32>>,
    entities: Vec<EntityId>,
    data: Vec<T>,
}

impl<T> Default for SparseSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SparseSet<T> {
    /// Create an empty set
    pub const fn new() -> Self {
        Self {
            sparse: Vec::new(),
            entities: Vec::new(),
            data: Vec::new(),
        }
    }

    fn dense_index(&self, entity: EntityId) -> Option<usize> {
        self.sparse
            .get(entity.index())
            .copied()
            .flatten()
            .map(|index| index as usize)
    }

    /// Insert a value, returning it back if the entity already has one
    #[allow(clippy::cast_possible_truncation)]
    pub fn insert(&mut self, entity: EntityId, value: T) -> Result<(), T> {
        if self.contains(entity) {
            return Err(value);
        }
        if self.sparse.len() <= entity.index() {
            self.sparse.resize(entity.index() + 1, None);
        }
        self.sparse[entity.index()] = Some(self.data.len() as u32);
        self.entities.push(entity);
        self.data.push(value);
        Ok(())
    }

    /// Whether the entity has a value in this set
    pub fn contains(&self, entity: EntityId) -> bool {
        self.dense_index(entity).is_some()
    }

    /// Borrow an entity's value
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.dense_index(entity).map(|index| &self.data[index])
    }

    /// Mutably borrow an entity's value
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        self.dense_index(entity).map(move |index| &mut self.data[index])
    }

    /// Remove an entity's value; the last element fills the hole
    #[allow(clippy::cast_possible_truncation)]
    pub fn remove(&mut self, entity: EntityId) -> Option<T> {
        let index = self.dense_index(entity)?;
        self.sparse[entity.index()] = None;
        let value = self.data.swap_remove(index);
        self.entities.swap_remove(index);
        if let Some(&moved) = self.entities.get(index) {
            self.sparse[moved.index()] = Some(index as u32);
        }
        Some(value)
    }

    /// Entities in dense order
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate `(entity, value)` pairs in dense order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().copied().zip(self.data.iter())
    }

    /// Iterate `(entity, value)` pairs mutably in dense order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entities.iter().copied().zip(self.data.iter_mut())
    }
}

/// Type-erased view of a [`SparseSet`]
pub trait AnyStorage: Any + Send + Sync {
    /// Drop the entity's component if present
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Whether the entity has a component in this storage
    fn contains_entity(&self, entity: EntityId) -> bool;

    /// Number of components stored
    fn component_count(&self) -> usize;

    /// Entities in dense order
    fn entity_ids(&self) -> &[EntityId];

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> AnyStorage for SparseSet<T> {
    fn remove_entity(&mut self, entity: EntityId) -> bool {
        self.remove(entity).is_some()
    }

    fn contains_entity(&self, entity: EntityId) -> bool {
        self.contains(entity)
    }

    fn component_count(&self) -> usize {
        self.len()
    }

    fn entity_ids(&self) -> &[EntityId] {
        self.entities()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> EntityId {
        EntityId::new(raw)
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = SparseSet::new();
        assert!(set.insert(id(3), "a").is_ok());
        assert_eq!(set.insert(id(3), "b"), Err("b"));
        assert_eq!(set.get(id(3)), Some(&"a"));
        assert_eq!(set.get(id(0)), None);
    }

    #[test]
    fn test_remove_keeps_other_entries_addressable() {
        let mut set = SparseSet::new();
        for raw in 0..4 {
            set.insert(id(raw), raw * 10).unwrap();
        }
        assert_eq!(set.remove(id(1)), Some(10));
        assert_eq!(set.remove(id(1)), None);
        assert_eq!(set.len(), 3);
        for raw in [0, 2, 3] {
            assert_eq!(set.get(id(raw)), Some(&(raw * 10)));
        }
        assert!(!set.contains(id(1)));
    }

    #[test]
    fn test_iteration_follows_dense_order() {
        let mut set = SparseSet::new();
        set.insert(id(7), 'x').unwrap();
        set.insert(id(2), 'y').unwrap();
        let order: Vec<_> = set.iter().map(|(e, v)| (e.id(), *v)).collect();
        assert_eq!(order, vec![(7, 'x'), (2, 'y')]);

        for (_, value) in set.iter_mut() {
            *value = 'z';
        }
        assert_eq!(set.get(id(2)), Some(&'z'));
    }
}
