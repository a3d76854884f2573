//! ECS World implementation
//!
//! The world is the component store: it allocates entity ids, owns one
//! [`SparseSet`] per component type, answers views, and runs on-add hooks
//! registered by its owner.

use super::{
    query::{ComponentSet, View},
    storage::{AnyStorage, SparseSet},
    Component, EntityId,
};
use std::any::{type_name, TypeId};
use std::collections::{BTreeSet, HashMap};

/// Callback run right after a component of a given type is attached
pub type ComponentHook = fn(&mut World, EntityId);

/// State consulted by on-add hooks, kept current by the owning scene
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HookContext {
    /// Current viewport width in pixels
    pub viewport_width: u32,
    /// Current viewport height in pixels
    pub viewport_height: u32,
    /// Whether the owning scene is in Runtime
    pub running: bool,
}

/// ECS World containing all entities and components
#[derive(Default)]
pub struct World {
    next_entity_id: u32,
    entities: BTreeSet<EntityId>,
    component_storages: HashMap<TypeId, Box<dyn AnyStorage>>,
    on_add: HashMap<TypeId, ComponentHook>,
    hook_context: HookContext,
}

impl World {
    /// Create a new world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new entity
    pub fn create_entity(&mut self) -> EntityId {
        let entity = EntityId::new(self.next_entity_id);
        self.next_entity_id += 1;
        self.entities.insert(entity);
        entity
    }

    /// Whether the entity exists
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.entities.contains(&entity)
    }

    /// Remove the entity and every component attached to it
    pub fn destroy_entity(&mut self, entity: EntityId) -> bool {
        if !self.entities.remove(&entity) {
            return false;
        }
        for storage in self.component_storages.values_mut() {
            storage.remove_entity(entity);
        }
        true
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate every live entity in id order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().copied()
    }

    /// Run `callback` for every live entity regardless of its components
    pub fn each(&self, mut callback: impl FnMut(EntityId)) {
        for entity in &self.entities {
            callback(*entity);
        }
    }

    /// Attach a component and run its on-add hook.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive or already has a `T`.
    pub fn add_component<T: Component>(&mut self, entity: EntityId, component: T) -> &mut T {
        assert!(self.is_alive(entity), "{entity} does not exist");
        if self.storage_mut::<T>().insert(entity, component).is_err() {
            panic!("{entity} already has component {}", type_name::<T>());
        }

        if let Some(hook) = self.on_add.get(&TypeId::of::<T>()).copied() {
            hook(self, entity);
        }

        self.storage_mut::<T>()
            .get_mut(entity)
            .unwrap_or_else(|| panic!("{} removed by its own on-add hook", type_name::<T>()))
    }

    /// Attach or overwrite a component without running hooks
    pub fn add_or_replace_component<T: Component>(&mut self, entity: EntityId, component: T) -> &mut T {
        assert!(self.is_alive(entity), "{entity} does not exist");
        let storage = self.storage_mut::<T>();
        storage.remove(entity);
        if storage.insert(entity, component).is_err() {
            unreachable!("component slot was just cleared");
        }
        self.storage_mut::<T>()
            .get_mut(entity)
            .unwrap_or_else(|| unreachable!("component was just inserted"))
    }

    /// Borrow a component
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Mutably borrow a component
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()?
            .get_mut(entity)
    }

    /// Whether the entity has a `T`
    pub fn has_component<T: Component>(&self, entity: EntityId) -> bool {
        self.storage::<T>().is_some_and(|storage| storage.contains(entity))
    }

    /// Detach and return a component
    pub fn remove_component<T: Component>(&mut self, entity: EntityId) -> Option<T> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()?
            .remove(entity)
    }

    /// Entities carrying every type in `Q`
    pub fn view<Q: ComponentSet>(&self) -> View {
        View::collect::<Q>(self)
    }

    /// Iterate `(entity, component)` for one type
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.storage::<T>().into_iter().flat_map(|storage| storage.iter())
    }

    /// Iterate `(entity, component)` mutably for one type
    pub fn iter_mut<T: Component>(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.component_storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<SparseSet<T>>())
            .into_iter()
            .flat_map(|storage| storage.iter_mut())
    }

    /// Number of components of type `T`
    pub fn component_count<T: Component>(&self) -> usize {
        self.storage::<T>().map_or(0, |storage| storage.len())
    }

    /// Register a hook run after every `add_component::<T>`
    pub fn on_add<T: Component>(&mut self, hook: ComponentHook) {
        self.on_add.insert(TypeId::of::<T>(), hook);
    }

    /// Drop every registered hook
    pub fn clear_hooks(&mut self) {
        self.on_add.clear();
    }

    /// State visible to hooks
    pub const fn hook_context(&self) -> HookContext {
        self.hook_context
    }

    /// Mutable state visible to hooks
    pub fn hook_context_mut(&mut self) -> &mut HookContext {
        &mut self.hook_context
    }

    pub(super) fn storage_by_type(&self, type_id: TypeId) -> Option<&dyn AnyStorage> {
        self.component_storages.get(&type_id).map(|storage| &**storage)
    }

    fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.component_storages
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<SparseSet<T>>()
    }

    fn storage_mut<T: Component>(&mut self) -> &mut SparseSet<T> {
        self.component_storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(SparseSet::<T>::new()))
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .unwrap_or_else(|| unreachable!("storage registered under a foreign TypeId"))
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("storages", &self.component_storages.len())
            .field("hook_context", &self.hook_context)
            .finish_non_exhaustive()
    }
}
