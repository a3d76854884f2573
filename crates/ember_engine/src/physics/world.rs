//! Rapier-backed 2D physics world
//!
//! Owns every solver set and pipeline object and advances them by a fixed
//! timestep. The scene creates one at simulation start and drops it at stop.

use crate::core::config::PhysicsConfig;
use rapier2d::prelude::*;
use std::fmt;

/// One 2D solver world
pub struct PhysicsWorld2D {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    gravity: Vector,
    frame: u64,
}

impl Default for PhysicsWorld2D {
    fn default() -> Self {
        Self::new(&PhysicsConfig::default())
    }
}

impl fmt::Debug for PhysicsWorld2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsWorld2D")
            .field("frame", &self.frame)
            .field("rigid_body_count", &self.rigid_body_set.len())
            .field("collider_count", &self.collider_set.len())
            .finish_non_exhaustive()
    }
}

impl PhysicsWorld2D {
    /// Create an empty world from configuration
    pub fn new(config: &PhysicsConfig) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: config.fixed_timestep,
            num_solver_iterations: config.velocity_iterations.max(1),
            num_internal_stabilization_iterations: config.position_iterations,
            ..Default::default()
        };

        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(config.gravity[0], config.gravity[1]),
            frame: 0,
        }
    }

    /// Advance by one fixed timestep
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
        self.frame += 1;
    }

    /// Insert a body
    pub fn add_rigid_body(&mut self, rigid_body: RigidBody) -> RigidBodyHandle {
        self.rigid_body_set.insert(rigid_body)
    }

    /// Attach a collider to a body
    pub fn add_collider(&mut self, collider: Collider, parent: RigidBodyHandle) -> ColliderHandle {
        self.collider_set
            .insert_with_parent(collider, parent, &mut self.rigid_body_set)
    }

    /// Remove a body together with its colliders
    pub fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    /// Borrow a body
    pub fn rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle)
    }

    /// Mutably borrow a body
    pub fn rigid_body_mut(&mut self, handle: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle)
    }

    /// Borrow a collider
    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.collider_set.get(handle)
    }

    /// Number of bodies
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Steps taken so far
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Solver settings passed to every step
    pub const fn integration_parameters(&self) -> &IntegrationParameters {
        &self.integration_parameters
    }

    /// Seconds per step
    pub const fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }
}
