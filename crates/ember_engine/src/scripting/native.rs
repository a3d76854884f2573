//! In-process behaviours
//!
//! A [`ScriptableEntity`] is plain Rust code attached to an entity through a
//! `NativeScriptComponent`. Instances exist only while a scene is running.

use crate::ecs::components::NativeScriptComponent;
use crate::ecs::{Component, EntityId, World};
use crate::foundation::time::Timestep;

/// Access a behaviour has to its own entity and the rest of the world
pub struct NativeScriptContext<'a> {
    world: &'a mut World,
    entity: EntityId,
}

impl<'a> NativeScriptContext<'a> {
    /// Context for one entity
    pub fn new(world: &'a mut World, entity: EntityId) -> Self {
        Self { world, entity }
    }

    /// The entity the behaviour is attached to
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Shared world access
    pub fn world(&self) -> &World {
        self.world
    }

    /// Mutable world access
    pub fn world_mut(&mut self) -> &mut World {
        self.world
    }

    /// Component on the owning entity
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.world.get_component::<T>(self.entity)
    }

    /// Mutable component on the owning entity
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.world.get_component_mut::<T>(self.entity)
    }

    /// Whether the owning entity has a `T`
    pub fn has_component<T: Component>(&self) -> bool {
        self.world.has_component::<T>(self.entity)
    }
}

/// Behaviour written in Rust
pub trait ScriptableEntity: Send + Sync {
    /// Called once when the scene starts running, or on attach while it runs
    fn on_create(&mut self, _context: &mut NativeScriptContext<'_>) {}

    /// Called every frame the scene advances
    fn on_update(&mut self, _context: &mut NativeScriptContext<'_>, _ts: Timestep) {}

    /// Called when the scene stops running
    fn on_destroy(&mut self, _context: &mut NativeScriptContext<'_>) {}
}

/// Create and initialize the behaviour of one entity if it has none yet
pub fn instantiate(world: &mut World, entity: EntityId) {
    let Some(component) = world.get_component_mut::<NativeScriptComponent>(entity) else {
        return;
    };
    if component.instance.is_some() {
        return;
    }
    let mut instance = component.instantiate();
    log::debug!("Instantiating {} on {entity}", component.type_name());

    instance.on_create(&mut NativeScriptContext::new(world, entity));
    if let Some(component) = world.get_component_mut::<NativeScriptComponent>(entity) {
        component.instance = Some(instance);
    }
}

/// Hook run when a `NativeScriptComponent` is attached
pub fn on_native_script_added(world: &mut World, entity: EntityId) {
    if world.hook_context().running {
        instantiate(world, entity);
    }
}

/// Create behaviours for every entity that has a native script
pub fn instantiate_all(world: &mut World) {
    for entity in world.view::<(NativeScriptComponent,)>() {
        instantiate(world, entity);
    }
}

/// Advance every live behaviour
pub fn update_all(world: &mut World, ts: Timestep) {
    for entity in world.view::<(NativeScriptComponent,)>() {
        let Some(mut instance) = world
            .get_component_mut::<NativeScriptComponent>(entity)
            .and_then(|component| component.instance.take())
        else {
            continue;
        };
        instance.on_update(&mut NativeScriptContext::new(world, entity), ts);
        if let Some(component) = world.get_component_mut::<NativeScriptComponent>(entity) {
            component.instance = Some(instance);
        }
    }
}

/// Call `on_destroy` on every live behaviour and drop it
pub fn destroy_all(world: &mut World) {
    for entity in world.view::<(NativeScriptComponent,)>() {
        let Some(mut instance) = world
            .get_component_mut::<NativeScriptComponent>(entity)
            .and_then(|component| component.instance.take())
        else {
            continue;
        };
        instance.on_destroy(&mut NativeScriptContext::new(world, entity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::TransformComponent;

    #[derive(Default)]
    struct Mover {
        ticks: u32,
    }

    impl ScriptableEntity for Mover {
        fn on_create(&mut self, context: &mut NativeScriptContext<'_>) {
            if let Some(transform) = context.get_component_mut::<TransformComponent>() {
                transform.translation.z = -1.0;
            }
        }

        fn on_update(&mut self, context: &mut NativeScriptContext<'_>, ts: Timestep) {
            self.ticks += 1;
            if let Some(transform) = context.get_component_mut::<TransformComponent>() {
                transform.translation.x += ts.seconds();
            }
        }

        fn on_destroy(&mut self, context: &mut NativeScriptContext<'_>) {
            if let Some(transform) = context.get_component_mut::<TransformComponent>() {
                transform.translation.y = self.ticks as f32;
            }
        }
    }

    fn world_with_mover() -> (World, EntityId) {
        let mut world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, TransformComponent::default());
        world.add_component(entity, NativeScriptComponent::bind::<Mover>());
        (world, entity)
    }

    #[test]
    fn test_lifecycle() {
        let (mut world, entity) = world_with_mover();
        instantiate_all(&mut world);
        update_all(&mut world, Timestep::from_seconds(0.5));
        update_all(&mut world, Timestep::from_seconds(0.5));
        destroy_all(&mut world);

        let transform = world.get_component::<TransformComponent>(entity).unwrap();
        assert_eq!(transform.translation.x, 1.0);
        assert_eq!(transform.translation.y, 2.0);
        assert_eq!(transform.translation.z, -1.0);
        assert!(world.get_component::<NativeScriptComponent>(entity).unwrap().instance.is_none());
    }

    #[test]
    fn test_hook_instantiates_only_while_running() {
        let mut world = World::new();
        world.on_add::<NativeScriptComponent>(on_native_script_added);

        let idle = world.create_entity();
        world.add_component(idle, TransformComponent::default());
        world.add_component(idle, NativeScriptComponent::bind::<Mover>());
        assert!(world.get_component::<NativeScriptComponent>(idle).unwrap().instance.is_none());

        world.hook_context_mut().running = true;
        let live = world.create_entity();
        world.add_component(live, TransformComponent::default());
        world.add_component(live, NativeScriptComponent::bind::<Mover>());
        assert!(world.get_component::<NativeScriptComponent>(live).unwrap().instance.is_some());
    }
}
