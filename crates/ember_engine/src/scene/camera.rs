//! Scene camera
//!
//! Projection parameters owned by a `CameraComponent`. The view matrix comes
//! from the owning entity's transform.

use crate::foundation::math::Mat4;
use crate::render::Camera;
use std::fmt;

/// Projection model of a [`SceneCamera`]
///
/// Stored in scene documents as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionType {
    /// Vertical field of view
    Perspective = 0,
    /// Fixed world-space height
    #[default]
    Orthographic = 1,
}

impl ProjectionType {
    /// Integer used in scene documents
    pub const fn as_index(self) -> i32 {
        self as i32
    }

    /// Parse the document integer, `None` if out of range
    pub const fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Perspective),
            1 => Some(Self::Orthographic),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Perspective => f.write_str("Perspective"),
            Self::Orthographic => f.write_str("Orthographic"),
        }
    }
}

/// Camera whose projection tracks the viewport aspect ratio
#[derive(Debug, Clone, PartialEq)]
pub struct SceneCamera {
    projection_type: ProjectionType,
    perspective_fov: f32,
    perspective_near: f32,
    perspective_far: f32,
    orthographic_size: f32,
    orthographic_near: f32,
    orthographic_far: f32,
    aspect_ratio: f32,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self {
            projection_type: ProjectionType::Orthographic,
            perspective_fov: 45.0_f32.to_radians(),
            perspective_near: 0.01,
            perspective_far: 1000.0,
            orthographic_size: 10.0,
            orthographic_near: -1.0,
            orthographic_far: 1.0,
            aspect_ratio: 1.0,
        }
    }
}

impl SceneCamera {
    /// Orthographic camera with default parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to orthographic projection
    pub fn set_orthographic(&mut self, size: f32, near_clip: f32, far_clip: f32) {
        self.projection_type = ProjectionType::Orthographic;
        self.orthographic_size = size;
        self.orthographic_near = near_clip;
        self.orthographic_far = far_clip;
    }

    /// Switch to perspective projection; `fov` is vertical, in radians
    pub fn set_perspective(&mut self, fov: f32, near_clip: f32, far_clip: f32) {
        self.projection_type = ProjectionType::Perspective;
        self.perspective_fov = fov;
        self.perspective_near = near_clip;
        self.perspective_far = far_clip;
    }

    /// Update the aspect ratio; zero-sized viewports are ignored
    #[allow(clippy::cast_precision_loss)]
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect_ratio = width as f32 / height as f32;
    }

    /// Current aspect ratio
    pub const fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Current projection model
    pub const fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    /// Select the projection model
    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        self.projection_type = projection_type;
    }

    /// Vertical field of view in radians
    pub const fn perspective_fov(&self) -> f32 {
        self.perspective_fov
    }

    /// Set the vertical field of view in radians
    pub fn set_perspective_fov(&mut self, fov: f32) {
        self.perspective_fov = fov;
    }

    /// Perspective near plane
    pub const fn perspective_near(&self) -> f32 {
        self.perspective_near
    }

    /// Set the perspective near plane
    pub fn set_perspective_near(&mut self, near_clip: f32) {
        self.perspective_near = near_clip;
    }

    /// Perspective far plane
    pub const fn perspective_far(&self) -> f32 {
        self.perspective_far
    }

    /// Set the perspective far plane
    pub fn set_perspective_far(&mut self, far_clip: f32) {
        self.perspective_far = far_clip;
    }

    /// World-space height of the orthographic view
    pub const fn orthographic_size(&self) -> f32 {
        self.orthographic_size
    }

    /// Set the orthographic height
    pub fn set_orthographic_size(&mut self, size: f32) {
        self.orthographic_size = size;
    }

    /// Orthographic near plane
    pub const fn orthographic_near(&self) -> f32 {
        self.orthographic_near
    }

    /// Set the orthographic near plane
    pub fn set_orthographic_near(&mut self, near_clip: f32) {
        self.orthographic_near = near_clip;
    }

    /// Orthographic far plane
    pub const fn orthographic_far(&self) -> f32 {
        self.orthographic_far
    }

    /// Set the orthographic far plane
    pub fn set_orthographic_far(&mut self, far_clip: f32) {
        self.orthographic_far = far_clip;
    }

    fn perspective_projection(&self) -> Mat4 {
        // nalgebra asserts on a zero aspect ratio and on coincident clip planes
        if self.aspect_ratio.abs() <= f32::EPSILON
            || (self.perspective_far - self.perspective_near).abs() <= f32::EPSILON
        {
            return Mat4::identity();
        }
        Mat4::new_perspective(
            self.aspect_ratio,
            self.perspective_fov,
            self.perspective_near,
            self.perspective_far,
        )
    }

    fn orthographic_projection(&self) -> Mat4 {
        let half_height = self.orthographic_size * 0.5;
        let half_width = half_height * self.aspect_ratio;
        if half_width.abs() <= f32::EPSILON
            || half_height.abs() <= f32::EPSILON
            || (self.orthographic_far - self.orthographic_near).abs() <= f32::EPSILON
        {
            return Mat4::identity();
        }
        Mat4::new_orthographic(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.orthographic_near,
            self.orthographic_far,
        )
    }
}

impl Camera for SceneCamera {
    fn projection(&self) -> Mat4 {
        match self.projection_type {
            ProjectionType::Perspective => self.perspective_projection(),
            ProjectionType::Orthographic => self.orthographic_projection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec4;
    use approx::assert_relative_eq;

    #[test]
    fn test_orthographic_maps_view_edges() {
        let mut camera = SceneCamera::new();
        camera.set_viewport_size(200, 100);
        assert_relative_eq!(camera.aspect_ratio(), 2.0);

        // size 10 at aspect 2 spans x in [-10, 10] and y in [-5, 5]
        let corner = camera.projection() * Vec4::new(10.0, 5.0, 0.0, 1.0);
        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_zero_viewport_ignored() {
        let mut camera = SceneCamera::new();
        camera.set_viewport_size(0, 720);
        assert_relative_eq!(camera.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_degenerate_projection_is_identity() {
        let mut camera = SceneCamera::new();
        camera.set_orthographic(0.0, -1.0, 1.0);
        assert_eq!(camera.projection(), Mat4::identity());

        camera.set_perspective(1.0, 5.0, 5.0);
        assert_eq!(camera.projection(), Mat4::identity());
    }

    #[test]
    fn test_projection_type_index() {
        assert_eq!(ProjectionType::from_index(0), Some(ProjectionType::Perspective));
        assert_eq!(ProjectionType::Orthographic.as_index(), 1);
        assert_eq!(ProjectionType::from_index(7), None);
    }
}
