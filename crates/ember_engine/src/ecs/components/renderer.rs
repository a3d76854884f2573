//! Renderable components: sprites, circles and text

use crate::ecs::Component;
use crate::foundation::math::Vec4;
use crate::render::{Font, Texture2D};
use std::sync::Arc;

/// Flat or textured quad
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRendererComponent {
    /// Tint color
    pub color: Vec4,
    /// Optional texture; `None` draws with the white texture
    pub texture: Option<Texture2D>,
    /// Texture coordinate multiplier
    pub tiling_factor: f32,
}

impl Default for SpriteRendererComponent {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            texture: None,
            tiling_factor: 1.0,
        }
    }
}

impl SpriteRendererComponent {
    /// Sprite with a solid color
    pub const fn with_color(color: Vec4) -> Self {
        Self {
            color,
            texture: None,
            tiling_factor: 1.0,
        }
    }
}

impl Component for SpriteRendererComponent {}

/// Ring or disc drawn by the circle shader
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleRendererComponent {
    /// Fill color
    pub color: Vec4,
    /// 1.0 is a filled disc, smaller values make a ring
    pub thickness: f32,
    /// Edge softness
    pub fade: f32,
}

impl Default for CircleRendererComponent {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            thickness: 1.0,
            fade: 0.005,
        }
    }
}

impl Component for CircleRendererComponent {}

/// Text rendered from a font atlas
#[derive(Debug, Clone)]
pub struct TextComponent {
    /// Content
    pub text: String,
    /// Font to lay out with; the renderer's default font is used when unset
    pub font: Option<Arc<Font>>,
    /// Glyph color
    pub color: Vec4,
    /// Extra advance between glyphs
    pub kerning: f32,
    /// Extra advance between lines
    pub line_spacing: f32,
}

impl Default for TextComponent {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: None,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            kerning: 0.0,
            line_spacing: 0.0,
        }
    }
}

impl PartialEq for TextComponent {
    fn eq(&self, other: &Self) -> bool {
        let same_font = match (&self.font, &other.font) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_font
            && self.text == other.text
            && self.color == other.color
            && self.kerning == other.kerning
            && self.line_spacing == other.line_spacing
    }
}

impl Component for TextComponent {}
