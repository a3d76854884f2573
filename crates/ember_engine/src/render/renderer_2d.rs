//! # 2D Batch Renderer
//!
//! Accumulates quads, circles, lines and text glyphs into pre-allocated
//! vertex arrays and hands each array to the backend as one draw call.
//!
//! ## Architecture
//!
//! - **Batches**: one vertex array per shader family. Quads, circles and glyphs
//!   share a static index buffer of `max_quads * 6` indices; lines are a plain
//!   line list.
//! - **Texture slots**: slot 0 is a 1x1 white texture. Other textures are found
//!   by identity with a linear search, and a new slot is allocated on a miss.
//! - **Flushing**: `end_scene` submits the non-empty batches in the fixed order
//!   quads, circles, lines, text. A full batch or an exhausted slot table
//!   flushes everything and restarts mid-scene instead of failing.

use crate::core::config::RendererConfig;
use crate::ecs::components::{SpriteRendererComponent, TextComponent};
use crate::foundation::math::{inverse_or_identity, Mat4, Vec2, Vec3, Vec4};
use crate::render::backend::{BatchKind, BatchSubmission, GraphicsBackend, RenderError, RenderResult};
use crate::render::camera::{Camera, EditorCamera};
use crate::render::font::Font;
use crate::render::texture::{Texture2D, TextureSpecification};
use crate::render::vertex::{CircleVertex, LineVertex, QuadVertex, TextVertex};
use std::path::PathBuf;
use std::sync::Arc;

/// Entity tag for geometry not owned by an entity
pub const NO_ENTITY: i32 = -1;

const QUAD_VERTEX_POSITIONS: [[f32; 4]; 4] = [
    [-0.5, -0.5, 0.0, 1.0],
    [0.5, -0.5, 0.0, 1.0],
    [0.5, 0.5, 0.0, 1.0],
    [-0.5, 0.5, 0.0, 1.0],
];

const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Per-frame renderer statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Draw calls submitted
    pub draw_calls: u32,
    /// Quads drawn
    pub quad_count: u32,
    /// Circles drawn
    pub circle_count: u32,
    /// Lines drawn
    pub line_count: u32,
    /// Text glyphs drawn
    pub glyph_count: u32,
}

impl RendererStats {
    /// Vertices generated
    pub const fn total_vertex_count(&self) -> u32 {
        (self.quad_count + self.circle_count + self.glyph_count) * 4 + self.line_count * 2
    }

    /// Indices generated for indexed batches
    pub const fn total_index_count(&self) -> u32 {
        (self.quad_count + self.circle_count + self.glyph_count) * 6
    }
}

/// Layout parameters for [`Renderer2D::draw_string`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextParams {
    /// Glyph color
    pub color: Vec4,
    /// Extra advance between glyphs
    pub kerning: f32,
    /// Extra advance between lines
    pub line_spacing: f32,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            kerning: 0.0,
            line_spacing: 0.0,
        }
    }
}

/// Batched 2D renderer
pub struct Renderer2D {
    backend: Box<dyn GraphicsBackend>,
    config: RendererConfig,
    white_texture: Texture2D,
    texture_slots: Vec<Texture2D>,
    quad_vertices: Vec<QuadVertex>,
    circle_vertices: Vec<CircleVertex>,
    line_vertices: Vec<LineVertex>,
    text_vertices: Vec<TextVertex>,
    font_atlas: Option<Texture2D>,
    default_font: Option<Arc<Font>>,
    line_width: f32,
    stats: RendererStats,
}

impl Renderer2D {
    /// Create a renderer with the reference limits
    pub fn new(backend: Box<dyn GraphicsBackend>) -> RenderResult<Self> {
        Self::with_config(backend, RendererConfig::default())
    }

    /// Create a renderer with explicit limits
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_config(mut backend: Box<dyn GraphicsBackend>, config: RendererConfig) -> RenderResult<Self> {
        config
            .validate()
            .map_err(|e| RenderError::Backend(e.to_string()))?;

        let indices: Vec<u32> = (0..config.max_quads as u32)
            .flat_map(|quad| {
                let offset = quad * 4;
                [offset, offset + 1, offset + 2, offset + 2, offset + 3, offset]
            })
            .collect();
        backend.upload_quad_indices(&indices);

        let white_spec = TextureSpecification::rgba(1, 1);
        let white_id = backend.create_texture(&white_spec, Some(&[0xff; 4]))?;
        let white_texture = Texture2D::new(white_id, white_spec, None);

        log::info!(
            "Renderer2D initialized: {} quads per batch, {} texture slots",
            config.max_quads,
            config.max_texture_slots
        );

        let mut texture_slots = Vec::with_capacity(config.max_texture_slots);
        texture_slots.push(white_texture.clone());

        Ok(Self {
            backend,
            white_texture,
            texture_slots,
            quad_vertices: Vec::with_capacity(config.max_vertices()),
            circle_vertices: Vec::with_capacity(config.max_vertices()),
            line_vertices: Vec::with_capacity(config.max_vertices()),
            text_vertices: Vec::with_capacity(config.max_vertices()),
            font_atlas: None,
            default_font: None,
            line_width: config.line_width,
            stats: RendererStats::default(),
            config,
        })
    }

    /// Upload a texture through the backend
    pub fn create_texture(
        &mut self,
        spec: TextureSpecification,
        pixels: Option<&[u8]>,
        path: Option<PathBuf>,
    ) -> RenderResult<Texture2D> {
        if let Some(pixels) = pixels {
            if pixels.len() != spec.data_size() {
                return Err(RenderError::TextureDataSize {
                    expected: spec.data_size(),
                    actual: pixels.len(),
                });
            }
        }
        let id = self.backend.create_texture(&spec, pixels)?;
        Ok(Texture2D::new(id, spec, path))
    }

    /// The texture bound at slot 0
    pub const fn white_texture(&self) -> &Texture2D {
        &self.white_texture
    }

    /// Font used by text components without one
    pub fn set_default_font(&mut self, font: Arc<Font>) {
        self.default_font = Some(font);
    }

    /// Active limits
    pub const fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Begin a scene viewed by `camera` placed at `transform`
    pub fn begin_scene(&mut self, camera: &dyn Camera, transform: &Mat4) {
        let view_projection = camera.projection() * inverse_or_identity(transform);
        self.begin_scene_with_view_projection(&view_projection);
    }

    /// Begin a scene viewed by the editor camera
    pub fn begin_scene_editor(&mut self, camera: &EditorCamera) {
        self.begin_scene_with_view_projection(&camera.view_projection());
    }

    /// Begin a scene with a precomputed view-projection matrix
    pub fn begin_scene_with_view_projection(&mut self, view_projection: &Mat4) {
        self.backend.set_view_projection(view_projection);
        self.start_batch();
    }

    /// Flush every pending batch
    pub fn end_scene(&mut self) {
        self.flush();
    }

    fn start_batch(&mut self) {
        self.quad_vertices.clear();
        self.circle_vertices.clear();
        self.line_vertices.clear();
        self.text_vertices.clear();
        self.texture_slots.truncate(1);
        self.font_atlas = None;
    }

    fn next_batch(&mut self) {
        self.flush();
        self.start_batch();
    }

    #[allow(clippy::cast_possible_truncation)]
    fn flush(&mut self) {
        if !self.quad_vertices.is_empty() {
            let vertex_count = self.quad_vertices.len() as u32;
            self.backend.submit(&BatchSubmission {
                kind: BatchKind::Quad,
                vertex_data: bytemuck::cast_slice(&self.quad_vertices),
                vertex_count,
                index_count: vertex_count / 4 * 6,
                textures: &self.texture_slots,
                line_width: self.line_width,
            });
            self.stats.draw_calls += 1;
        }

        if !self.circle_vertices.is_empty() {
            let vertex_count = self.circle_vertices.len() as u32;
            self.backend.submit(&BatchSubmission {
                kind: BatchKind::Circle,
                vertex_data: bytemuck::cast_slice(&self.circle_vertices),
                vertex_count,
                index_count: vertex_count / 4 * 6,
                textures: &[],
                line_width: self.line_width,
            });
            self.stats.draw_calls += 1;
        }

        if !self.line_vertices.is_empty() {
            self.backend.submit(&BatchSubmission {
                kind: BatchKind::Line,
                vertex_data: bytemuck::cast_slice(&self.line_vertices),
                vertex_count: self.line_vertices.len() as u32,
                index_count: 0,
                textures: &[],
                line_width: self.line_width,
            });
            self.stats.draw_calls += 1;
        }

        if let (false, Some(atlas)) = (self.text_vertices.is_empty(), &self.font_atlas) {
            let vertex_count = self.text_vertices.len() as u32;
            self.backend.submit(&BatchSubmission {
                kind: BatchKind::Text,
                vertex_data: bytemuck::cast_slice(&self.text_vertices),
                vertex_count,
                index_count: vertex_count / 4 * 6,
                textures: std::slice::from_ref(atlas),
                line_width: self.line_width,
            });
            self.stats.draw_calls += 1;
        }
    }

    fn quad_index_count(&self) -> usize {
        self.quad_vertices.len() / 4 * 6
    }

    #[allow(clippy::cast_possible_truncation)]
    fn texture_index(&mut self, texture: &Texture2D) -> u32 {
        if let Some(slot) = self.texture_slots.iter().skip(1).position(|bound| bound == texture) {
            return slot as u32 + 1;
        }
        if self.texture_slots.len() >= self.config.max_texture_slots {
            self.next_batch();
        }
        self.texture_slots.push(texture.clone());
        (self.texture_slots.len() - 1) as u32
    }

    fn push_quad(&mut self, transform: &Mat4, color: &Vec4, texture: Option<&Texture2D>, tiling_factor: f32, entity: i32) {
        if self.quad_index_count() >= self.config.max_indices() {
            self.next_batch();
        }
        let tex_index = texture.map_or(0, |texture| self.texture_index(texture));

        for (corner, tex_coord) in QUAD_VERTEX_POSITIONS.iter().zip(QUAD_TEX_COORDS) {
            let position = transform * Vec4::from(*corner);
            self.quad_vertices.push(QuadVertex {
                position: [position.x, position.y, position.z],
                color: (*color).into(),
                tex_coord,
                tex_index,
                tiling_factor,
                entity_id: entity,
            });
        }
        self.stats.quad_count += 1;
    }

    /// Flat colored quad centred on `position`
    pub fn draw_quad(&mut self, position: &Vec3, size: &Vec2, color: &Vec4) {
        let transform = quad_transform(position, size, 0.0);
        self.push_quad(&transform, color, None, 1.0, NO_ENTITY);
    }

    /// Flat colored quad rotated around Z by `rotation` radians
    pub fn draw_rotated_quad(&mut self, position: &Vec3, size: &Vec2, rotation: f32, color: &Vec4) {
        let transform = quad_transform(position, size, rotation);
        self.push_quad(&transform, color, None, 1.0, NO_ENTITY);
    }

    /// Flat colored unit quad under `transform`
    pub fn draw_quad_transform(&mut self, transform: &Mat4, color: &Vec4, entity: i32) {
        self.push_quad(transform, color, None, 1.0, entity);
    }

    /// Textured unit quad under `transform`
    pub fn draw_textured_quad(
        &mut self,
        transform: &Mat4,
        texture: &Texture2D,
        tiling_factor: f32,
        tint: &Vec4,
        entity: i32,
    ) {
        self.push_quad(transform, tint, Some(texture), tiling_factor, entity);
    }

    /// Sprite component under `transform`
    pub fn draw_sprite(&mut self, transform: &Mat4, sprite: &SpriteRendererComponent, entity: i32) {
        match &sprite.texture {
            Some(texture) => self.push_quad(transform, &sprite.color, Some(texture), sprite.tiling_factor, entity),
            None => self.push_quad(transform, &sprite.color, None, 1.0, entity),
        }
    }

    /// Circle inscribed in the unit quad under `transform`
    pub fn draw_circle(&mut self, transform: &Mat4, color: &Vec4, thickness: f32, fade: f32, entity: i32) {
        if self.circle_vertices.len() / 4 * 6 >= self.config.max_indices() {
            self.next_batch();
        }
        for corner in &QUAD_VERTEX_POSITIONS {
            let world = transform * Vec4::from(*corner);
            self.circle_vertices.push(CircleVertex {
                world_position: [world.x, world.y, world.z],
                thickness,
                local_position: [corner[0] * 2.0, corner[1] * 2.0],
                color: (*color).into(),
                fade,
                entity_id: entity,
            });
        }
        self.stats.circle_count += 1;
    }

    /// Line segment
    pub fn draw_line(&mut self, p0: &Vec3, p1: &Vec3, color: &Vec4, entity: i32) {
        if self.line_vertices.len() + 2 > self.config.max_vertices() {
            self.next_batch();
        }
        for point in [p0, p1] {
            self.line_vertices.push(LineVertex {
                position: [point.x, point.y, point.z],
                color: (*color).into(),
                entity_id: entity,
            });
        }
        self.stats.line_count += 1;
    }

    /// Axis-aligned rectangle outline centred on `position`
    pub fn draw_rect(&mut self, position: &Vec3, size: &Vec2, color: &Vec4, entity: i32) {
        let half = size * 0.5;
        let corners = [
            Vec3::new(position.x - half.x, position.y - half.y, position.z),
            Vec3::new(position.x + half.x, position.y - half.y, position.z),
            Vec3::new(position.x + half.x, position.y + half.y, position.z),
            Vec3::new(position.x - half.x, position.y + half.y, position.z),
        ];
        self.draw_outline(&corners, color, entity);
    }

    /// Outline of the unit quad under `transform`
    pub fn draw_rect_transform(&mut self, transform: &Mat4, color: &Vec4, entity: i32) {
        let corners = QUAD_VERTEX_POSITIONS.map(|corner| (transform * Vec4::from(corner)).xyz());
        self.draw_outline(&corners, color, entity);
    }

    fn draw_outline(&mut self, corners: &[Vec3; 4], color: &Vec4, entity: i32) {
        for i in 0..4 {
            self.draw_line(&corners[i], &corners[(i + 1) % 4], color, entity);
        }
    }

    fn reserve_glyph(&mut self, atlas: &Texture2D) {
        if self.text_vertices.len() / 4 * 6 >= self.config.max_indices() {
            self.next_batch();
        }
        let atlas_changed = self.font_atlas.as_ref().is_some_and(|current| current != atlas);
        if atlas_changed && !self.text_vertices.is_empty() {
            self.next_batch();
        }
        self.font_atlas = Some(atlas.clone());
    }

    /// Lay out `text` with `font` and append one quad per visible glyph
    #[allow(clippy::cast_precision_loss)]
    pub fn draw_string(&mut self, text: &str, font: &Font, transform: &Mat4, params: &TextParams, entity: i32) {
        let metrics = *font.metrics();
        let em = metrics.ascender - metrics.descender;
        let fs_scale = if em.abs() > f32::EPSILON { 1.0 / em } else { 1.0 };
        let space = fs_scale * font.space_advance() + params.kerning;
        let atlas_size = Vec2::new(font.atlas().width() as f32, font.atlas().height() as f32);
        let color: [f32; 4] = params.color.into();

        let mut x = 0.0_f32;
        let mut y = 0.0_f32;
        for ch in text.chars() {
            match ch {
                '\r' => continue,
                '\n' => {
                    x = 0.0;
                    y -= fs_scale * metrics.line_height + params.line_spacing;
                    continue;
                }
                ' ' => {
                    x += space;
                    continue;
                }
                '\t' => {
                    x += space * 4.0;
                    continue;
                }
                _ => {}
            }
            let Some(glyph) = font.glyph(ch).copied() else {
                continue;
            };
            self.reserve_glyph(font.atlas());

            let [pl, pb, pr, pt] = glyph.plane_bounds;
            let quad_min = Vec2::new(pl * fs_scale + x, pb * fs_scale + y);
            let quad_max = Vec2::new(pr * fs_scale + x, pt * fs_scale + y);
            let [al, ab, ar, at] = glyph.atlas_bounds;
            let tex_min = [al / atlas_size.x, ab / atlas_size.y];
            let tex_max = [ar / atlas_size.x, at / atlas_size.y];

            let corners = [
                (quad_min.x, quad_min.y, [tex_min[0], tex_min[1]]),
                (quad_min.x, quad_max.y, [tex_min[0], tex_max[1]]),
                (quad_max.x, quad_max.y, [tex_max[0], tex_max[1]]),
                (quad_max.x, quad_min.y, [tex_max[0], tex_min[1]]),
            ];
            for (cx, cy, tex_coord) in corners {
                let position = transform * Vec4::new(cx, cy, 0.0, 1.0);
                self.text_vertices.push(TextVertex {
                    position: [position.x, position.y, position.z],
                    color,
                    tex_coord,
                    entity_id: entity,
                });
            }
            self.stats.glyph_count += 1;

            x += fs_scale * glyph.advance + params.kerning;
        }
    }

    /// Text component under `transform`; skipped when no font is available
    pub fn draw_text_component(&mut self, transform: &Mat4, text: &TextComponent, entity: i32) {
        let Some(font) = text.font.clone().or_else(|| self.default_font.clone()) else {
            log::trace!("Skipping text for entity {entity}: no font");
            return;
        };
        let params = TextParams {
            color: text.color,
            kerning: text.kerning,
            line_spacing: text.line_spacing,
        };
        self.draw_string(&text.text, &font, transform, &params, entity);
    }

    /// Current line width
    pub const fn line_width(&self) -> f32 {
        self.line_width
    }

    /// Set the width used by subsequent line flushes
    pub fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
    }

    /// Statistics since the last reset
    pub const fn stats(&self) -> RendererStats {
        self.stats
    }

    /// Zero the statistics
    pub fn reset_stats(&mut self) {
        self.stats = RendererStats::default();
    }
}

fn quad_transform(position: &Vec3, size: &Vec2, rotation: f32) -> Mat4 {
    Mat4::new_translation(position)
        * Mat4::new_rotation(Vec3::new(0.0, 0.0, rotation))
        * Mat4::new_nonuniform_scaling(&Vec3::new(size.x, size.y, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backend::{DrawRecorder, HeadlessBackend};
    use approx::assert_relative_eq;

    fn renderer(config: RendererConfig) -> (Renderer2D, DrawRecorder) {
        let backend = HeadlessBackend::new();
        let recorder = backend.recorder();
        let renderer = Renderer2D::with_config(Box::new(backend), config).unwrap();
        (renderer, recorder)
    }

    fn texture(renderer: &mut Renderer2D) -> Texture2D {
        renderer
            .create_texture(TextureSpecification::rgba(1, 1), Some(&[0, 0, 0, 255]), None)
            .unwrap()
    }

    fn white() -> Vec4 {
        Vec4::new(1.0, 1.0, 1.0, 1.0)
    }

    #[test]
    fn test_one_quad_over_capacity_splits_into_two_draw_calls() {
        let config = RendererConfig::default();
        let max_quads = config.max_quads;
        let (mut renderer, recorder) = renderer(config);

        renderer.begin_scene_with_view_projection(&Mat4::identity());
        for _ in 0..=max_quads {
            renderer.draw_quad_transform(&Mat4::identity(), &white(), NO_ENTITY);
        }
        renderer.end_scene();

        let calls = recorder.draw_calls_of(BatchKind::Quad);
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].vertex_count as usize, max_quads * 4);
        assert_eq!(calls[0].index_count as usize, max_quads * 6);
        assert_eq!(calls[0].byte_len, max_quads * 4 * std::mem::size_of::<QuadVertex>());
        assert_eq!(calls[1].vertex_count, 4);
        assert_eq!(renderer.stats().quad_count as usize, max_quads + 1);
    }

    #[test]
    fn test_texture_slot_exhaustion_forces_flush() {
        let config = RendererConfig::default();
        let slots = config.max_texture_slots;
        let (mut renderer, recorder) = renderer(config);
        let textures: Vec<_> = (0..=slots).map(|_| texture(&mut renderer)).collect();

        renderer.begin_scene_with_view_projection(&Mat4::identity());
        for texture in &textures {
            renderer.draw_textured_quad(&Mat4::identity(), texture, 1.0, &white(), NO_ENTITY);
        }
        renderer.end_scene();

        let calls = recorder.draw_calls_of(BatchKind::Quad);
        assert!(calls.len() >= 2);
        assert!(calls.iter().all(|call| call.texture_count <= slots));
        assert_eq!(calls[0].texture_count, slots);
        assert_eq!(calls[0].vertex_count as usize, (slots - 1) * 4);
    }

    #[test]
    fn test_repeated_texture_reuses_slot() {
        let (mut renderer, recorder) = renderer(RendererConfig::default());
        let tex = texture(&mut renderer);

        renderer.begin_scene_with_view_projection(&Mat4::identity());
        renderer.draw_textured_quad(&Mat4::identity(), &tex, 2.0, &white(), 3);
        renderer.draw_textured_quad(&Mat4::identity(), &tex.clone(), 2.0, &white(), 4);
        renderer.draw_quad(&Vec3::zeros(), &Vec2::new(1.0, 1.0), &white());
        renderer.end_scene();

        let calls = recorder.draw_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].texture_count, 2);
        assert_eq!(calls[0].vertex_count, 12);
    }

    #[test]
    fn test_flush_order_is_quads_circles_lines_text() {
        let (mut renderer, recorder) = renderer(RendererConfig::default());
        let atlas = texture(&mut renderer);
        let font = Font::from_grid(atlas, 16, 8, ' ');

        renderer.begin_scene_with_view_projection(&Mat4::identity());
        renderer.draw_string("hi", &font, &Mat4::identity(), &TextParams::default(), NO_ENTITY);
        renderer.draw_line(&Vec3::zeros(), &Vec3::new(1.0, 0.0, 0.0), &white(), NO_ENTITY);
        renderer.draw_circle(&Mat4::identity(), &white(), 1.0, 0.005, NO_ENTITY);
        renderer.draw_quad(&Vec3::zeros(), &Vec2::new(1.0, 1.0), &white());
        renderer.end_scene();

        let kinds: Vec<_> = recorder.draw_calls().iter().map(|call| call.kind).collect();
        assert_eq!(
            kinds,
            vec![BatchKind::Quad, BatchKind::Circle, BatchKind::Line, BatchKind::Text]
        );
        assert_eq!(renderer.stats().draw_calls, 4);
    }

    #[test]
    fn test_empty_scene_submits_nothing() {
        let (mut renderer, recorder) = renderer(RendererConfig::default());
        renderer.begin_scene_with_view_projection(&Mat4::identity());
        renderer.end_scene();
        assert!(recorder.draw_calls().is_empty());
        assert_eq!(recorder.camera_uploads(), 1);
        assert_eq!(recorder.quad_index_count(), RendererConfig::default().max_indices());
    }

    #[test]
    fn test_circle_batch_respects_capacity() {
        let (mut renderer, recorder) = renderer(RendererConfig::new().with_max_quads(2));
        renderer.begin_scene_with_view_projection(&Mat4::identity());
        for _ in 0..5 {
            renderer.draw_circle(&Mat4::identity(), &white(), 0.5, 0.01, 1);
        }
        renderer.end_scene();
        let counts: Vec<_> = recorder
            .draw_calls_of(BatchKind::Circle)
            .iter()
            .map(|call| call.vertex_count)
            .collect();
        assert_eq!(counts, vec![8, 8, 4]);
    }

    #[test]
    fn test_rect_is_four_lines() {
        let (mut renderer, recorder) = renderer(RendererConfig::default());
        renderer.set_line_width(4.0);
        renderer.begin_scene_with_view_projection(&Mat4::identity());
        renderer.draw_rect(&Vec3::zeros(), &Vec2::new(2.0, 1.0), &white(), NO_ENTITY);
        renderer.draw_rect_transform(&Mat4::identity(), &white(), NO_ENTITY);
        renderer.end_scene();

        let lines = recorder.draw_calls_of(BatchKind::Line);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].vertex_count, 16);
        assert_eq!(renderer.stats().line_count, 8);
        assert_relative_eq!(renderer.line_width(), 4.0);
    }

    #[test]
    fn test_string_layout_skips_whitespace() {
        let (mut renderer, _recorder) = renderer(RendererConfig::default());
        let atlas = texture(&mut renderer);
        let font = Font::from_grid(atlas, 16, 8, ' ');

        renderer.begin_scene_with_view_projection(&Mat4::identity());
        renderer.draw_string("ab c\r\nd", &font, &Mat4::identity(), &TextParams::default(), 0);
        renderer.end_scene();
        assert_eq!(renderer.stats().glyph_count, 4);
    }

    #[test]
    fn test_text_component_without_font_is_skipped() {
        let (mut renderer, recorder) = renderer(RendererConfig::default());
        let text = TextComponent {
            text: "hello".to_string(),
            ..Default::default()
        };
        renderer.begin_scene_with_view_projection(&Mat4::identity());
        renderer.draw_text_component(&Mat4::identity(), &text, 0);
        renderer.end_scene();
        assert!(recorder.draw_calls().is_empty());
    }

    #[test]
    fn test_stats_reset() {
        let (mut renderer, _recorder) = renderer(RendererConfig::default());
        renderer.begin_scene_with_view_projection(&Mat4::identity());
        renderer.draw_quad(&Vec3::zeros(), &Vec2::new(1.0, 1.0), &white());
        renderer.end_scene();
        assert_eq!(renderer.stats().total_vertex_count(), 4);
        renderer.reset_stats();
        assert_eq!(renderer.stats(), RendererStats::default());
    }

    #[test]
    fn test_texture_data_validated() {
        let (mut renderer, _recorder) = renderer(RendererConfig::default());
        let result = renderer.create_texture(TextureSpecification::rgba(2, 2), Some(&[0; 3]), None);
        assert!(matches!(result, Err(RenderError::TextureDataSize { expected: 16, actual: 3 })));
    }
}
