//! 2D physics
//!
//! The solver is Rapier. The engine owns only the mapping between ECS
//! components and solver bodies, plus a thin world wrapper stepping it at a
//! fixed rate.

pub mod bridge;
pub mod world;

pub use bridge::{build_physics_world, clear_runtime_handles, simulated_body_mut, sync_transforms, DEFAULT_BODY_MASS};
pub use world::PhysicsWorld2D;

use crate::ecs::EntityId;
use thiserror::Error;

/// Physics errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicsError {
    /// The entity has no rigid body, or its body was never created
    #[error("{0} has no simulated body")]
    NoSimulatedBody(EntityId),

    /// No solver world exists outside Runtime and Simulate
    #[error("physics world is not running")]
    NotRunning,

    /// The stored handle does not name a body in the current world
    #[error("{0} holds a handle from another physics world")]
    StaleHandle(EntityId),
}

/// Result type for physics lookups
pub type PhysicsResult<T> = Result<T, PhysicsError>;
