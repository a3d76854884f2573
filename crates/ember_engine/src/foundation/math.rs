//! Math utilities and types
//!
//! Thin aliases over `nalgebra` used by every subsystem, plus the
//! transform composition shared by the scene, the renderer and the physics bridge.

pub use nalgebra::{Matrix4, UnitQuaternion, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type (also used for RGBA colors)
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Build a model matrix from translation, euler rotation (radians, XYZ) and scale.
///
/// Matches `T * R * S`, the order used for every renderable and camera transform.
pub fn compose_transform(translation: &Vec3, rotation: &Vec3, scale: &Vec3) -> Mat4 {
    let rotation = Quat::from_euler_angles(rotation.x, rotation.y, rotation.z);
    Mat4::new_translation(translation)
        * rotation.to_homogeneous()
        * Mat4::new_nonuniform_scaling(scale)
}

/// Invert a matrix, falling back to identity for singular input.
pub fn inverse_or_identity(matrix: &Mat4) -> Mat4 {
    matrix.try_inverse().unwrap_or_else(Mat4::identity)
}
