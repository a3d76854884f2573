//! Textures
//!
//! A [`Texture2D`] is a shared handle to GPU texture storage owned by the
//! graphics backend. Equality is identity: two handles are equal only if
//! they refer to the same upload, whatever their pixel content.

use crate::render::backend::RendererId;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pixel formats understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// Single channel
    R8,
    /// Three channels
    Rgb8,
    /// Four channels
    #[default]
    Rgba8,
    /// Four float channels
    Rgba32F,
}

impl ImageFormat {
    /// Bytes per pixel
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::R8 => 1,
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
            Self::Rgba32F => 16,
        }
    }

    /// Format for an 8-bit image with the given channel count
    pub const fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::R8),
            3 => Some(Self::Rgb8),
            4 => Some(Self::Rgba8),
            _ => None,
        }
    }
}

/// Texture creation parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureSpecification {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: ImageFormat,
    /// Whether the backend should build mipmaps
    pub generate_mips: bool,
}

impl TextureSpecification {
    /// RGBA8 texture of the given size
    pub const fn rgba(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: ImageFormat::Rgba8,
            generate_mips: true,
        }
    }

    /// Byte length of a full upload
    pub const fn data_size(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

#[derive(Debug)]
struct TextureInner {
    renderer_id: RendererId,
    specification: TextureSpecification,
    path: Option<PathBuf>,
}

/// Shared handle to an uploaded texture
#[derive(Debug, Clone)]
pub struct Texture2D(Arc<TextureInner>);

impl Texture2D {
    pub(crate) fn new(renderer_id: RendererId, specification: TextureSpecification, path: Option<PathBuf>) -> Self {
        Self(Arc::new(TextureInner {
            renderer_id,
            specification,
            path,
        }))
    }

    /// Backend handle
    pub fn renderer_id(&self) -> RendererId {
        self.0.renderer_id
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.0.specification.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.0.specification.height
    }

    /// Creation parameters
    pub fn specification(&self) -> &TextureSpecification {
        &self.0.specification
    }

    /// Source file, if loaded from disk
    pub fn path(&self) -> Option<&Path> {
        self.0.path.as_deref()
    }
}

impl PartialEq for Texture2D {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Texture2D {}
