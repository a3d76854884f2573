//! Fonts for batched text
//!
//! Font decoding and atlas generation happen outside the engine. A [`Font`]
//! is the result: an uploaded atlas texture plus per-glyph metrics in em
//! units, which is all the text batch needs to lay out glyph quads.

use crate::render::texture::Texture2D;
use std::collections::HashMap;

/// Placement and atlas location of one glyph
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Horizontal advance in em units
    pub advance: f32,
    /// Quad bounds relative to the pen position: left, bottom, right, top (em)
    pub plane_bounds: [f32; 4],
    /// Atlas region in pixels: left, bottom, right, top
    pub atlas_bounds: [f32; 4],
}

/// Vertical font metrics in em units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Baseline-to-baseline distance
    pub line_height: f32,
    /// Height above the baseline
    pub ascender: f32,
    /// Depth below the baseline, negative
    pub descender: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self {
            line_height: 1.0,
            ascender: 0.8,
            descender: -0.2,
        }
    }
}

/// Atlas texture plus glyph metrics
#[derive(Debug)]
pub struct Font {
    atlas: Texture2D,
    metrics: FontMetrics,
    glyphs: HashMap<char, Glyph>,
}

impl Font {
    /// Assemble a font from externally generated metrics
    pub fn new(atlas: Texture2D, metrics: FontMetrics, glyphs: HashMap<char, Glyph>) -> Self {
        Self { atlas, metrics, glyphs }
    }

    /// Monospace font from a bitmap atlas laid out as a grid of equal cells,
    /// row-major from the top-left, starting at `first`.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_grid(atlas: Texture2D, columns: u32, rows: u32, first: char) -> Self {
        let cell_w = atlas.width() as f32 / columns.max(1) as f32;
        let cell_h = atlas.height() as f32 / rows.max(1) as f32;
        let metrics = FontMetrics::default();
        let mut glyphs = HashMap::new();

        for index in 0..columns * rows {
            let Some(ch) = char::from_u32(first as u32 + index) else {
                continue;
            };
            let column = (index % columns) as f32;
            let row = (index / columns) as f32;
            let top = atlas.height() as f32 - row * cell_h;
            glyphs.insert(
                ch,
                Glyph {
                    advance: 0.6,
                    plane_bounds: [0.0, metrics.descender, 0.6, metrics.ascender],
                    atlas_bounds: [column * cell_w, top - cell_h, (column + 1.0) * cell_w, top],
                },
            );
        }

        Self::new(atlas, metrics, glyphs)
    }

    /// Atlas texture
    pub const fn atlas(&self) -> &Texture2D {
        &self.atlas
    }

    /// Vertical metrics
    pub const fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Look up a glyph, falling back to `?`
    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch).or_else(|| self.glyphs.get(&'?'))
    }

    /// Advance of a space, taken from the space glyph when present
    pub fn space_advance(&self) -> f32 {
        self.glyphs.get(&' ').map_or(0.25, |glyph| glyph.advance)
    }
}
