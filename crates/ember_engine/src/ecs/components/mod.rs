//! ECS Components module
//!
//! The closed set of component types a scene knows how to copy, serialize
//! and simulate.

pub mod camera;
pub mod identity;
pub mod physics;
pub mod renderer;
pub mod script;
pub mod transform;

pub use camera::CameraComponent;
pub use identity::{IdComponent, TagComponent};
pub use physics::{
    BodyType, BoxCollider2DComponent, CircleCollider2DComponent, PhysicsMaterial, RigidBody2DComponent,
};
pub use renderer::{CircleRendererComponent, SpriteRendererComponent, TextComponent};
pub use script::{NativeScriptComponent, ScriptComponent};
pub use transform::TransformComponent;
