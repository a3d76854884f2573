//! 2D physics components
//!
//! Authoring data for the physics bridge. Runtime handles are only set
//! between simulation start and stop and are cleared again on stop.

use crate::ecs::Component;
use crate::foundation::math::Vec2;
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};
use std::fmt;
use std::str::FromStr;

/// How the solver treats a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// Never moves
    #[default]
    Static,
    /// Fully simulated
    Dynamic,
    /// Moved by velocity only, unaffected by forces
    Kinematic,
}

impl BodyType {
    /// Name used in scene documents
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Static => "Static",
            Self::Dynamic => "Dynamic",
            Self::Kinematic => "Kinematic",
        }
    }
}

impl fmt::Display for BodyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Static" => Ok(Self::Static),
            "Dynamic" => Ok(Self::Dynamic),
            "Kinematic" => Ok(Self::Kinematic),
            other => Err(format!("unknown body type '{other}'")),
        }
    }
}

/// Rigid body authoring data
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RigidBody2DComponent {
    /// Simulation mode
    pub body_type: BodyType,
    /// Lock rotation
    pub fixed_rotation: bool,
    /// Live solver body, `None` outside simulation
    pub runtime_body: Option<RigidBodyHandle>,
}

impl RigidBody2DComponent {
    /// Body of the given type
    pub const fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            fixed_rotation: false,
            runtime_body: None,
        }
    }
}

impl Component for RigidBody2DComponent {}

/// Surface material shared by both collider shapes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsMaterial {
    /// Mass per unit area
    pub density: f32,
    /// Coulomb friction coefficient
    pub friction: f32,
    /// Bounciness
    pub restitution: f32,
    /// Impact speed under which contacts do not bounce
    pub restitution_threshold: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self {
            density: 1.0,
            friction: 0.5,
            restitution: 0.0,
            restitution_threshold: 0.5,
        }
    }
}

/// Box fixture; `size` is the half extent before transform scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCollider2DComponent {
    /// Local offset from the body origin
    pub offset: Vec2,
    /// Half extents
    pub size: Vec2,
    /// Surface material
    pub material: PhysicsMaterial,
    /// Live solver collider, `None` outside simulation
    pub runtime_fixture: Option<ColliderHandle>,
}

impl Default for BoxCollider2DComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::zeros(),
            size: Vec2::new(0.5, 0.5),
            material: PhysicsMaterial::default(),
            runtime_fixture: None,
        }
    }
}

impl Component for BoxCollider2DComponent {}

/// Circle fixture; `radius` is scaled by the transform's x scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleCollider2DComponent {
    /// Local offset from the body origin
    pub offset: Vec2,
    /// Radius before scale
    pub radius: f32,
    /// Surface material
    pub material: PhysicsMaterial,
    /// Live solver collider, `None` outside simulation
    pub runtime_fixture: Option<ColliderHandle>,
}

impl Default for CircleCollider2DComponent {
    fn default() -> Self {
        Self {
            offset: Vec2::zeros(),
            radius: 0.5,
            material: PhysicsMaterial::default(),
            runtime_fixture: None,
        }
    }
}

impl Component for CircleCollider2DComponent {}
