//! 2D rendering
//!
//! The batch renderer and the data it consumes. Graphics API specifics live
//! behind [`GraphicsBackend`]; [`HeadlessBackend`] is the built-in recorder.

pub mod backend;
pub mod camera;
pub mod font;
pub mod renderer_2d;
pub mod texture;
pub mod vertex;

pub use backend::{
    BatchKind, BatchSubmission, DrawCallRecord, DrawRecorder, GraphicsBackend, HeadlessBackend, RenderError,
    RenderResult, RendererId,
};
pub use camera::{Camera, EditorCamera};
pub use font::{Font, FontMetrics, Glyph};
pub use renderer_2d::{Renderer2D, RendererStats, TextParams, NO_ENTITY};
pub use texture::{ImageFormat, Texture2D, TextureSpecification};
