//! # Graphics Backend Seam
//!
//! The batch renderer never talks to a graphics API directly. Everything
//! below the vertex-byte level (buffers, shaders, pipelines, texture storage)
//! sits behind [`GraphicsBackend`], implemented by the windowed application.
//!
//! [`HeadlessBackend`] is a complete in-memory implementation that records
//! every submission. Tools and tests use it to run scenes without a GPU.

use crate::foundation::math::Mat4;
use crate::render::texture::{Texture2D, TextureSpecification};
use parking_lot::Mutex;
use std::sync::Arc;

/// Opaque backend object handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RendererId(pub u32);

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors raised by the renderer or its backend
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The backend rejected an operation
    #[error("Backend error: {0}")]
    Backend(String),

    /// Pixel data does not match the texture specification
    #[error("Texture data size mismatch: expected {expected} bytes, got {actual}")]
    TextureDataSize {
        /// Bytes required by the specification
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },
}

/// Shader family a batch is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchKind {
    /// Textured quads and sprites
    Quad,
    /// Circles and rings
    Circle,
    /// Line list
    Line,
    /// Font atlas glyphs
    Text,
}

/// One batch handed to the backend for a single draw call
#[derive(Debug)]
pub struct BatchSubmission<'a> {
    /// Which pipeline to draw with
    pub kind: BatchKind,
    /// Exactly the vertex bytes written since the batch started
    pub vertex_data: &'a [u8],
    /// Vertices in `vertex_data`
    pub vertex_count: u32,
    /// Indices to draw from the shared quad index buffer, 0 for lines
    pub index_count: u32,
    /// Textures to bind, by slot
    pub textures: &'a [Texture2D],
    /// Rasterized line width, meaningful for lines only
    pub line_width: f32,
}

/// Graphics API used by the batch renderer
pub trait GraphicsBackend {
    /// Allocate texture storage and upload optional initial pixels
    fn create_texture(&mut self, spec: &TextureSpecification, pixels: Option<&[u8]>) -> RenderResult<RendererId>;

    /// Upload the static quad index pattern shared by quad, circle and text batches
    fn upload_quad_indices(&mut self, indices: &[u32]);

    /// Write the per-frame camera buffer
    fn set_view_projection(&mut self, view_projection: &Mat4);

    /// Draw one batch
    fn submit(&mut self, batch: &BatchSubmission<'_>);
}

/// What [`HeadlessBackend`] remembers about a submission
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCallRecord {
    /// Pipeline used
    pub kind: BatchKind,
    /// Vertices submitted
    pub vertex_count: u32,
    /// Indices drawn
    pub index_count: u32,
    /// Bytes uploaded
    pub byte_len: usize,
    /// Distinct textures bound
    pub texture_count: usize,
}

#[derive(Debug, Default)]
struct Recording {
    draw_calls: Vec<DrawCallRecord>,
    camera_uploads: usize,
    last_view_projection: Option<Mat4>,
    textures_created: u32,
    index_count: usize,
}

/// Shared read access to a [`HeadlessBackend`]'s recording
#[derive(Debug, Clone, Default)]
pub struct DrawRecorder(Arc<Mutex<Recording>>);

impl DrawRecorder {
    /// Every submission so far
    pub fn draw_calls(&self) -> Vec<DrawCallRecord> {
        self.0.lock().draw_calls.clone()
    }

    /// Submissions of one kind
    pub fn draw_calls_of(&self, kind: BatchKind) -> Vec<DrawCallRecord> {
        self.0
            .lock()
            .draw_calls
            .iter()
            .filter(|call| call.kind == kind)
            .cloned()
            .collect()
    }

    /// Number of `set_view_projection` calls
    pub fn camera_uploads(&self) -> usize {
        self.0.lock().camera_uploads
    }

    /// Most recent camera matrix
    pub fn last_view_projection(&self) -> Option<Mat4> {
        self.0.lock().last_view_projection
    }

    /// Textures allocated
    pub fn textures_created(&self) -> u32 {
        self.0.lock().textures_created
    }

    /// Length of the uploaded quad index buffer
    pub fn quad_index_count(&self) -> usize {
        self.0.lock().index_count
    }

    /// Forget recorded submissions
    pub fn clear(&self) {
        let mut recording = self.0.lock();
        recording.draw_calls.clear();
        recording.camera_uploads = 0;
    }
}

/// Backend that draws nothing and records everything
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    recorder: DrawRecorder,
}

impl HeadlessBackend {
    /// Create a headless backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for inspecting submissions after the backend is moved into a renderer
    pub fn recorder(&self) -> DrawRecorder {
        self.recorder.clone()
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn create_texture(&mut self, spec: &TextureSpecification, pixels: Option<&[u8]>) -> RenderResult<RendererId> {
        if let Some(pixels) = pixels {
            if pixels.len() != spec.data_size() {
                return Err(RenderError::TextureDataSize {
                    expected: spec.data_size(),
                    actual: pixels.len(),
                });
            }
        }
        let mut recording = self.recorder.0.lock();
        recording.textures_created += 1;
        Ok(RendererId(recording.textures_created))
    }

    fn upload_quad_indices(&mut self, indices: &[u32]) {
        self.recorder.0.lock().index_count = indices.len();
    }

    fn set_view_projection(&mut self, view_projection: &Mat4) {
        let mut recording = self.recorder.0.lock();
        recording.camera_uploads += 1;
        recording.last_view_projection = Some(*view_projection);
    }

    fn submit(&mut self, batch: &BatchSubmission<'_>) {
        log::trace!(
            "{:?} batch: {} vertices, {} indices, {} textures",
            batch.kind,
            batch.vertex_count,
            batch.index_count,
            batch.textures.len()
        );
        self.recorder.0.lock().draw_calls.push(DrawCallRecord {
            kind: batch.kind,
            vertex_count: batch.vertex_count,
            index_count: batch.index_count,
            byte_len: batch.vertex_data.len(),
            texture_count: batch.textures.len(),
        });
    }
}
