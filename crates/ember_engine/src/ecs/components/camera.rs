//! Camera component

use crate::ecs::Component;
use crate::scene::SceneCamera;

/// Scene camera attached to an entity
///
/// The first camera found with `primary` set drives runtime rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraComponent {
    /// Projection parameters
    pub camera: SceneCamera,
    /// Whether this camera renders the runtime view
    pub primary: bool,
    /// Keep the aspect ratio when the viewport is resized
    pub fixed_aspect_ratio: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            camera: SceneCamera::default(),
            primary: true,
            fixed_aspect_ratio: false,
        }
    }
}

impl Component for CameraComponent {}
