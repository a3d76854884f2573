//! # Scene
//!
//! Entities with components, the Edit/Runtime/Simulate state machine, scene
//! cameras, YAML documents and editor play-mode orchestration.
//!
//! ## Architecture
//!
//! ```text
//! EditorSession ── play/simulate ──▶ Scene::copy ──▶ active Scene
//!       │                                               │
//!       │                          ┌────────────────────┼──────────────┐
//!       ▼                          ▼                    ▼              ▼
//! SceneSerializer            ScriptEngine         PhysicsWorld2D   Renderer2D
//! (YAML documents)           (scripts first)      (then physics)   (then render)
//! ```

pub mod camera;
pub mod entity;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod serializer;
pub mod session;

#[cfg(test)]
mod tests;

pub use camera::{ProjectionType, SceneCamera};
pub use entity::{EntityMut, EntityRef};
pub use scene::{Scene, SceneState, SceneStorage, DEFAULT_ENTITY_NAME, DEFAULT_SCENE_NAME};
pub use serializer::{SceneSerializer, SerializerError, SerializerResult, TextureLoader};
pub use session::EditorSession;

use crate::assets::AssetError;
use crate::project::ProjectError;
use crate::scripting::ScriptError;
use std::path::PathBuf;
use thiserror::Error;

/// Scene errors
#[derive(Error, Debug)]
pub enum SceneError {
    /// A start or stop was requested from the wrong state
    #[error("invalid scene transition from {from} to {to}")]
    InvalidTransition {
        /// State the scene was in
        from: SceneState,
        /// State that was requested
        to: SceneState,
    },

    /// Reading or writing a scene document failed
    #[error(transparent)]
    Serializer(#[from] SerializerError),

    /// Loading the project failed
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// Loading the asset registry failed
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Loading the script assembly failed
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The operation needs an open project
    #[error("no project is open")]
    NoProject,

    /// The file is not a scene document
    #[error("could not load '{0}': not a scene file")]
    NotASceneFile(PathBuf),

    /// Save was requested before the scene had a path
    #[error("scene has no file path")]
    NoScenePath,

    /// The operation is only allowed while editing
    #[error("operation not allowed while the scene is in {0}")]
    NotEditing(SceneState),
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
