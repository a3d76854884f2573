//! Vertex layouts for the 2D batches
//!
//! All layouts are `#[repr(C)]`, padding-free and `Pod`, so a batch is
//! submitted to the backend as a plain byte slice. Every vertex carries the
//! owning entity's integer tag for editor mouse picking (`-1` for none).

use bytemuck::{Pod, Zeroable};

/// Quad and sprite vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// World position
    pub position: [f32; 3],
    /// RGBA tint
    pub color: [f32; 4],
    /// Texture coordinate before tiling
    pub tex_coord: [f32; 2],
    /// Bound texture slot
    pub tex_index: u32,
    /// Texture coordinate multiplier
    pub tiling_factor: f32,
    /// Owning entity tag
    pub entity_id: i32,
}

/// Circle vertex; the fragment stage derives the disc from `local_position`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CircleVertex {
    /// World position
    pub world_position: [f32; 3],
    /// Ring thickness, 1.0 for a filled disc
    pub thickness: f32,
    /// Position in the unit square, -1..1
    pub local_position: [f32; 2],
    /// RGBA color
    pub color: [f32; 4],
    /// Edge softness
    pub fade: f32,
    /// Owning entity tag
    pub entity_id: i32,
}

/// Line endpoint
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    /// World position
    pub position: [f32; 3],
    /// RGBA color
    pub color: [f32; 4],
    /// Owning entity tag
    pub entity_id: i32,
}

/// Text glyph vertex sampling the bound font atlas
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TextVertex {
    /// World position
    pub position: [f32; 3],
    /// RGBA color
    pub color: [f32; 4],
    /// Atlas texture coordinate
    pub tex_coord: [f32; 2],
    /// Owning entity tag
    pub entity_id: i32,
}
