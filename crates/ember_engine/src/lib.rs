//! # Ember Engine
//!
//! A 2D engine runtime: scenes of entities and components, a Rapier physics
//! bridge, Rhai scripting with hot reload, and a batched quad/circle/line/text
//! renderer behind a pluggable graphics backend.
//!
//! ## Features
//!
//! - **ECS**: typed sparse-set storage, views and on-add hooks
//! - **Scenes**: Edit/Runtime/Simulate state machine with deep copy for play mode
//! - **Physics**: rigid bodies and box/circle colliders stepped at a fixed rate
//! - **Scripting**: Rhai classes with reflected fields and a per-entity field cache
//! - **Rendering**: 20,000 quads and 32 texture slots per batch
//! - **Documents**: YAML scenes, projects and asset registries
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ember_engine::prelude::*;
//!
//! struct Game;
//!
//! impl Layer for Game {
//!     fn on_attach(&mut self, services: &mut EngineServices) {
//!         let scene = services.session.edit_scene_mut();
//!         let camera = scene.create_entity("Camera");
//!         scene.world_mut().add_component(camera, CameraComponent::default());
//!     }
//!
//!     fn on_update(&mut self, services: &mut EngineServices, ts: Timestep) {
//!         let EngineServices { session, scripts, renderer, .. } = services;
//!         session.on_update(ts, scripts, renderer);
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     ember_engine::foundation::logging::init();
//!     let mut engine = Engine::new(EngineConfig::default(), Box::new(HeadlessBackend::new()))?;
//!     engine.push_layer(Box::new(Game));
//!     engine.run(60, Timestep::from_seconds(1.0 / 60.0));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;
pub mod foundation;

// Runtime subsystems
pub mod assets;
pub mod ecs;
pub mod input;
pub mod physics;
pub mod project;
pub mod render;
pub mod scene;
pub mod scripting;

mod engine;

pub use engine::{Engine, EngineError, EngineServices, Layer};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetHandle, AssetType, EditorAssetManager},
        core::config::{EngineConfig, PhysicsConfig, RendererConfig, ScriptingConfig},
        ecs::{
            components::{
                BodyType, BoxCollider2DComponent, CameraComponent, CircleCollider2DComponent,
                CircleRendererComponent, IdComponent, NativeScriptComponent, RigidBody2DComponent, ScriptComponent,
                SpriteRendererComponent, TagComponent, TextComponent, TransformComponent,
            },
            EntityId, World,
        },
        foundation::{
            id::PersistentId,
            math::{Mat4, Vec2, Vec3, Vec4},
            time::Timestep,
        },
        input::{InputState, KeyCode, KeyboardState},
        project::Project,
        render::{Camera, EditorCamera, GraphicsBackend, HeadlessBackend, Renderer2D},
        scene::{EditorSession, Scene, SceneCamera, SceneError, SceneSerializer, SceneState},
        scripting::{ScriptEngine, ScriptableEntity},
        Engine, EngineError, EngineServices, Layer,
    };
}
