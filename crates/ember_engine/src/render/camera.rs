//! Cameras the 2D renderer can begin a scene with

use crate::foundation::math::{inverse_or_identity, Mat4, Quat, Vec2, Vec3};

/// Anything that provides a projection matrix
///
/// The view matrix comes from the camera's transform, supplied separately.
pub trait Camera {
    /// Projection matrix
    fn projection(&self) -> Mat4;
}

/// Free-roaming editor camera orbiting a focal point
#[derive(Debug, Clone, PartialEq)]
pub struct EditorCamera {
    fov: f32,
    aspect_ratio: f32,
    near_clip: f32,
    far_clip: f32,
    focal_point: Vec3,
    distance: f32,
    pitch: f32,
    yaw: f32,
    viewport: Vec2,
}

impl Default for EditorCamera {
    fn default() -> Self {
        Self::new(45.0_f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0)
    }
}

impl EditorCamera {
    /// Create an editor camera looking down -Z at the origin
    pub fn new(fov: f32, aspect_ratio: f32, near_clip: f32, far_clip: f32) -> Self {
        Self {
            fov,
            aspect_ratio,
            near_clip,
            far_clip,
            focal_point: Vec3::zeros(),
            distance: 10.0,
            pitch: 0.0,
            yaw: 0.0,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }

    /// Match the viewport size
    #[allow(clippy::cast_precision_loss)]
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Vec2::new(width as f32, height as f32);
        self.aspect_ratio = self.viewport.x / self.viewport.y;
    }

    /// Orientation from pitch and yaw
    pub fn orientation(&self) -> Quat {
        Quat::from_euler_angles(-self.pitch, -self.yaw, 0.0)
    }

    /// Eye position
    pub fn position(&self) -> Vec3 {
        self.focal_point - self.forward_direction() * self.distance
    }

    /// Looking direction
    pub fn forward_direction(&self) -> Vec3 {
        self.orientation() * Vec3::new(0.0, 0.0, -1.0)
    }

    /// View matrix
    pub fn view_matrix(&self) -> Mat4 {
        let transform = Mat4::new_translation(&self.position()) * self.orientation().to_homogeneous();
        inverse_or_identity(&transform)
    }

    /// Combined projection and view
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view_matrix()
    }

    /// Move the focal point in the view plane
    pub fn pan(&mut self, delta: Vec2) {
        let right = self.orientation() * Vec3::new(1.0, 0.0, 0.0);
        let up = self.orientation() * Vec3::new(0.0, 1.0, 0.0);
        self.focal_point += (-right * delta.x + up * delta.y) * self.distance;
    }

    /// Orbit around the focal point
    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw += delta.x;
        self.pitch += delta.y;
    }

    /// Move towards or away from the focal point
    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta * self.distance.max(1.0)).max(1.0);
    }

    /// Distance to the focal point
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    /// Set the focal point
    pub fn set_focal_point(&mut self, focal_point: Vec3) {
        self.focal_point = focal_point;
    }
}

impl Camera for EditorCamera {
    fn projection(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect_ratio, self.fov, self.near_clip, self.far_clip)
    }
}
