//! # ECS ↔ Solver Bridge
//!
//! Maps authoring components onto solver bodies and back.
//!
//! - [`build_physics_world`]: one body per `RigidBody2DComponent`, one
//!   collider per box/circle collider on the same entity, shapes scaled by
//!   the transform.
//! - [`sync_transforms`]: copies solver poses back into transforms after
//!   each step. The flow is one-way; transform edits made while the
//!   simulation runs are not pushed into the solver.
//! - [`clear_runtime_handles`]: drops every live handle at stop.
//! - [`simulated_body_mut`]: the live solver body behind an entity.

use crate::core::config::PhysicsConfig;
use crate::ecs::components::{
    BodyType, BoxCollider2DComponent, CircleCollider2DComponent, IdComponent, PhysicsMaterial,
    RigidBody2DComponent, TransformComponent,
};
use crate::ecs::{EntityId, World};
use crate::physics::{PhysicsError, PhysicsResult, PhysicsWorld2D};
use rapier2d::prelude::*;

impl From<BodyType> for RigidBodyType {
    fn from(body_type: BodyType) -> Self {
        match body_type {
            BodyType::Static => Self::Fixed,
            BodyType::Dynamic => Self::Dynamic,
            BodyType::Kinematic => Self::KinematicVelocityBased,
        }
    }
}

impl From<RigidBodyType> for BodyType {
    fn from(body_type: RigidBodyType) -> Self {
        match body_type {
            RigidBodyType::Fixed => Self::Static,
            RigidBodyType::Dynamic => Self::Dynamic,
            RigidBodyType::KinematicVelocityBased | RigidBodyType::KinematicPositionBased => Self::Kinematic,
        }
    }
}

/// Mass given to dynamic bodies that have no collider
pub const DEFAULT_BODY_MASS: f32 = 1.0;

fn with_material(builder: ColliderBuilder, offset: Vector, material: &PhysicsMaterial) -> ColliderBuilder {
    // The solver has no per-collider restitution threshold; the value stays on the component.
    builder
        .translation(offset)
        .density(material.density)
        .friction(material.friction)
        .restitution(material.restitution)
}

/// Create a solver world holding one body per rigid body component.
///
/// Handles are written back into the components.
pub fn build_physics_world(world: &mut World, config: &PhysicsConfig) -> PhysicsWorld2D {
    let mut physics = PhysicsWorld2D::new(config);

    for entity in world.view::<(RigidBody2DComponent, TransformComponent)>() {
        let transform = world
            .get_component::<TransformComponent>(entity)
            .copied()
            .unwrap_or_default();
        let Some(rigid_body) = world.get_component::<RigidBody2DComponent>(entity).copied() else {
            continue;
        };
        let user_data = world
            .get_component::<IdComponent>(entity)
            .map_or(0, |identity| identity.id.as_u128());

        let mut builder = RigidBodyBuilder::new(rigid_body.body_type.into())
            .translation(Vector::new(transform.translation.x, transform.translation.y))
            .rotation(transform.rotation.z)
            .user_data(user_data);
        if rigid_body.fixed_rotation {
            builder = builder.lock_rotations();
        }
        // A body without fixtures still needs mass to respond to gravity.
        let has_fixture = world.has_component::<BoxCollider2DComponent>(entity)
            || world.has_component::<CircleCollider2DComponent>(entity);
        if rigid_body.body_type == BodyType::Dynamic && !has_fixture {
            builder = builder.additional_mass(DEFAULT_BODY_MASS);
        }
        let body = physics.add_rigid_body(builder.build());

        if let Some(component) = world.get_component_mut::<RigidBody2DComponent>(entity) {
            component.runtime_body = Some(body);
        }

        if let Some(collider) = world.get_component::<BoxCollider2DComponent>(entity).copied() {
            let shape = ColliderBuilder::cuboid(
                collider.size.x * transform.scale.x,
                collider.size.y * transform.scale.y,
            );
            let offset = Vector::new(collider.offset.x, collider.offset.y);
            let handle = physics.add_collider(with_material(shape, offset, &collider.material).build(), body);
            if let Some(component) = world.get_component_mut::<BoxCollider2DComponent>(entity) {
                component.runtime_fixture = Some(handle);
            }
        }

        if let Some(collider) = world.get_component::<CircleCollider2DComponent>(entity).copied() {
            let shape = ColliderBuilder::ball(transform.scale.x * collider.radius);
            let offset = Vector::new(collider.offset.x, collider.offset.y);
            let handle = physics.add_collider(with_material(shape, offset, &collider.material).build(), body);
            if let Some(component) = world.get_component_mut::<CircleCollider2DComponent>(entity) {
                component.runtime_fixture = Some(handle);
            }
        }
    }

    log::debug!("Physics world built with {} bodies", physics.body_count());
    physics
}

/// Copy solver poses of every simulated body back into transforms
pub fn sync_transforms(world: &mut World, physics: &PhysicsWorld2D) {
    for entity in world.view::<(RigidBody2DComponent, TransformComponent)>() {
        let Some(handle) = world
            .get_component::<RigidBody2DComponent>(entity)
            .and_then(|rigid_body| rigid_body.runtime_body)
        else {
            continue;
        };
        let Some(body) = physics.rigid_body(handle) else {
            continue;
        };
        if body.is_fixed() {
            continue;
        }

        let position = body.translation();
        let (x, y) = (position.x, position.y);
        let angle = body.rotation().angle();
        if let Some(transform) = world.get_component_mut::<TransformComponent>(entity) {
            transform.translation.x = x;
            transform.translation.y = y;
            transform.rotation.z = angle;
        }
    }
}

/// Invalidate every live body and fixture handle
pub fn clear_runtime_handles(world: &mut World) {
    for (_, rigid_body) in world.iter_mut::<RigidBody2DComponent>() {
        rigid_body.runtime_body = None;
    }
    for (_, collider) in world.iter_mut::<BoxCollider2DComponent>() {
        collider.runtime_fixture = None;
    }
    for (_, collider) in world.iter_mut::<CircleCollider2DComponent>() {
        collider.runtime_fixture = None;
    }
}

/// Live solver body of `entity` while the simulation runs
pub fn simulated_body_mut<'a>(
    world: &World,
    physics: Option<&'a mut PhysicsWorld2D>,
    entity: EntityId,
) -> PhysicsResult<&'a mut RigidBody> {
    let handle = world
        .get_component::<RigidBody2DComponent>(entity)
        .and_then(|rigid_body| rigid_body.runtime_body)
        .ok_or(PhysicsError::NoSimulatedBody(entity))?;
    physics
        .ok_or(PhysicsError::NotRunning)?
        .rigid_body_mut(handle)
        .ok_or(PhysicsError::StaleHandle(entity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::id::PersistentId;
    use crate::foundation::math::{Vec2, Vec3};
    use approx::assert_relative_eq;

    fn spawn(world: &mut World, y: f32, body_type: BodyType) -> crate::ecs::EntityId {
        let entity = world.create_entity();
        world.add_component(entity, IdComponent { id: PersistentId::new() });
        world.add_component(entity, TransformComponent::from_translation(Vec3::new(0.0, y, 0.0)));
        world.add_component(entity, RigidBody2DComponent::new(body_type));
        entity
    }

    #[test]
    fn test_bodies_and_fixtures_created() {
        let mut world = World::new();
        let entity = spawn(&mut world, 4.0, BodyType::Dynamic);
        world.get_component_mut::<TransformComponent>(entity).unwrap().scale = Vec3::new(2.0, 3.0, 1.0);
        world.add_component(
            entity,
            BoxCollider2DComponent {
                offset: Vec2::new(0.25, 0.0),
                ..Default::default()
            },
        );

        let physics = build_physics_world(&mut world, &PhysicsConfig::default());
        assert_eq!(physics.body_count(), 1);

        let rigid_body = world.get_component::<RigidBody2DComponent>(entity).unwrap();
        let body = physics.rigid_body(rigid_body.runtime_body.unwrap()).unwrap();
        assert!(body.is_dynamic());
        let expected_id = world.get_component::<IdComponent>(entity).unwrap().id.as_u128();
        assert_eq!(body.user_data, expected_id);

        let fixture = world
            .get_component::<BoxCollider2DComponent>(entity)
            .unwrap()
            .runtime_fixture
            .unwrap();
        let collider = physics.collider(fixture).unwrap();
        let cuboid = collider.shape().as_cuboid().unwrap();
        assert_relative_eq!(cuboid.half_extents.x, 1.0);
        assert_relative_eq!(cuboid.half_extents.y, 1.5);
        assert_relative_eq!(collider.friction(), 0.5);
    }

    #[test]
    fn test_sync_moves_dynamic_but_not_static() {
        let mut world = World::new();
        let falling = spawn(&mut world, 10.0, BodyType::Dynamic);
        let ground = spawn(&mut world, -10.0, BodyType::Static);

        let mut physics = build_physics_world(&mut world, &PhysicsConfig::default());
        physics.step();
        sync_transforms(&mut world, &physics);

        assert!(world.get_component::<TransformComponent>(falling).unwrap().translation.y < 10.0);
        assert_relative_eq!(
            world.get_component::<TransformComponent>(ground).unwrap().translation.y,
            -10.0
        );
    }

    #[test]
    fn test_clear_handles() {
        let mut world = World::new();
        let entity = spawn(&mut world, 0.0, BodyType::Kinematic);
        world.add_component(entity, CircleCollider2DComponent::default());
        let _physics = build_physics_world(&mut world, &PhysicsConfig::default());
        clear_runtime_handles(&mut world);
        assert!(world.get_component::<RigidBody2DComponent>(entity).unwrap().runtime_body.is_none());
        assert!(world
            .get_component::<CircleCollider2DComponent>(entity)
            .unwrap()
            .runtime_fixture
            .is_none());
    }

    #[test]
    fn test_simulated_body_lookup() {
        let mut world = World::new();
        let entity = spawn(&mut world, 2.0, BodyType::Dynamic);
        let bare = world.create_entity();
        assert_eq!(
            simulated_body_mut(&world, None, entity).err(),
            Some(PhysicsError::NoSimulatedBody(entity))
        );

        let mut physics = build_physics_world(&mut world, &PhysicsConfig::default());
        assert_eq!(
            simulated_body_mut(&world, None, entity).err(),
            Some(PhysicsError::NotRunning)
        );
        assert!(simulated_body_mut(&world, Some(&mut physics), bare).is_err());

        let body = simulated_body_mut(&world, Some(&mut physics), entity).unwrap();
        body.set_linvel(Vector::new(1.0, 0.0), true);
        assert_relative_eq!(physics.rigid_body(
            world.get_component::<RigidBody2DComponent>(entity).unwrap().runtime_body.unwrap()
        ).unwrap().linvel().x, 1.0);
    }

    #[test]
    fn test_body_type_mapping() {
        assert_eq!(RigidBodyType::from(BodyType::Static), RigidBodyType::Fixed);
        assert_eq!(BodyType::from(RigidBodyType::KinematicPositionBased), BodyType::Kinematic);
    }
}
