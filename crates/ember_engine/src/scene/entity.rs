//! Entity handles
//!
//! An entity id paired with a borrow of its scene. Handles cannot outlive
//! the scene and are meant to be created on the spot, not stored.

use crate::ecs::components::{IdComponent, TagComponent};
use crate::ecs::{Component, EntityId};
use crate::foundation::id::PersistentId;
use crate::scene::Scene;

/// Read-only entity handle
#[derive(Clone, Copy)]
pub struct EntityRef<'a> {
    id: EntityId,
    scene: &'a Scene,
}

impl<'a> EntityRef<'a> {
    pub(crate) const fn new(id: EntityId, scene: &'a Scene) -> Self {
        Self { id, scene }
    }

    /// Transient id
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the entity still exists
    pub fn is_valid(&self) -> bool {
        self.scene.world().is_alive(self.id)
    }

    /// Component of type `T`, if attached
    pub fn try_get<T: Component>(&self) -> Option<&'a T> {
        self.scene.world().get_component::<T>(self.id)
    }

    /// Component of type `T`
    ///
    /// # Panics
    ///
    /// Panics when the entity has no `T`.
    pub fn get<T: Component>(&self) -> &'a T {
        self.try_get::<T>().unwrap_or_else(|| {
            panic!("{} does not have component {}", self.id, std::any::type_name::<T>())
        })
    }

    /// Whether a `T` is attached
    pub fn has<T: Component>(&self) -> bool {
        self.scene.world().has_component::<T>(self.id)
    }

    /// Persistent id
    pub fn uuid(&self) -> PersistentId {
        self.get::<IdComponent>().id
    }

    /// Tag
    pub fn name(&self) -> &'a str {
        &self.get::<TagComponent>().tag
    }
}

/// Mutable entity handle
pub struct EntityMut<'a> {
    id: EntityId,
    scene: &'a mut Scene,
}

impl<'a> EntityMut<'a> {
    pub(crate) fn new(id: EntityId, scene: &'a mut Scene) -> Self {
        Self { id, scene }
    }

    /// Transient id
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Attach a component
    ///
    /// # Panics
    ///
    /// Panics when a `T` is already attached.
    pub fn add<T: Component>(&mut self, component: T) -> &mut T {
        self.scene.world_mut().add_component(self.id, component)
    }

    /// Attach or overwrite a component
    pub fn add_or_replace<T: Component>(&mut self, component: T) -> &mut T {
        self.scene.world_mut().add_or_replace_component(self.id, component)
    }

    /// Mutable component of type `T`, if attached
    pub fn try_get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.scene.world_mut().get_component_mut::<T>(self.id)
    }

    /// Mutable component of type `T`
    ///
    /// # Panics
    ///
    /// Panics when the entity has no `T`.
    pub fn get_mut<T: Component>(&mut self) -> &mut T {
        let id = self.id;
        self.try_get_mut::<T>()
            .unwrap_or_else(|| panic!("{id} does not have component {}", std::any::type_name::<T>()))
    }

    /// Component of type `T`, if attached
    pub fn try_get<T: Component>(&self) -> Option<&T> {
        self.scene.world().get_component::<T>(self.id)
    }

    /// Whether a `T` is attached
    pub fn has<T: Component>(&self) -> bool {
        self.scene.world().has_component::<T>(self.id)
    }

    /// Detach a component
    pub fn remove<T: Component>(&mut self) -> Option<T> {
        self.scene.world_mut().remove_component::<T>(self.id)
    }

    /// Read-only view of the same entity
    pub fn as_entity_ref(&self) -> EntityRef<'_> {
        EntityRef::new(self.id, self.scene)
    }
}

#[cfg(test)]
mod tests {
    use crate::ecs::components::{CircleRendererComponent, TransformComponent};
    use crate::scene::Scene;

    #[test]
    fn test_handle_accessors() {
        let mut scene = Scene::new();
        let id = scene.create_entity("Player");

        {
            let mut entity = scene.entity_mut(id);
            entity.add(CircleRendererComponent::default());
            entity.get_mut::<TransformComponent>().translation.y = 2.0;
            assert!(entity.has::<CircleRendererComponent>());
            assert!(entity.remove::<CircleRendererComponent>().is_some());
            assert!(entity.try_get::<CircleRendererComponent>().is_none());
        }

        let entity = scene.entity(id);
        assert!(entity.is_valid());
        assert_eq!(entity.name(), "Player");
        assert_eq!(entity.get::<TransformComponent>().translation.y, 2.0);
        assert_eq!(scene.get_entity_by_id(entity.uuid()), Some(id));
    }

    #[test]
    #[should_panic(expected = "does not have component")]
    fn test_missing_component_panics() {
        let mut scene = Scene::new();
        let id = scene.create_entity("Empty");
        let _ = scene.entity(id).get::<CircleRendererComponent>();
    }
}
