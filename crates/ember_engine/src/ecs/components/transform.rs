//! Transform component for the ECS system
//!
//! Pure data: translation, euler rotation in radians and scale. The model
//! matrix is derived on demand as `T * R * S`.

use crate::ecs::Component;
use crate::foundation::math::{compose_transform, Mat4, Quat, Vec3};

/// ECS Transform component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponent {
    /// Position
    pub translation: Vec3,

    /// Euler rotation in radians
    pub rotation: Vec3,

    /// Scale factors
    pub scale: Vec3,
}

impl Component for TransformComponent {}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl TransformComponent {
    /// Create from translation only
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    /// Set the translation
    pub const fn with_translation(mut self, translation: Vec3) -> Self {
        self.translation = translation;
        self
    }

    /// Set the euler rotation
    pub const fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the scale
    pub const fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation as a quaternion
    pub fn quaternion(&self) -> Quat {
        Quat::from_euler_angles(self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Local model matrix
    pub fn to_matrix(&self) -> Mat4 {
        compose_transform(&self.translation, &self.rotation, &self.scale)
    }
}
