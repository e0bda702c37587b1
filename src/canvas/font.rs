//! Glyph atlases built from OpenType outlines.
//!
//! `FontFactory` rasterizes every supported rune of a font into one R8 atlas by
//! filling its outline with the canvas renderer, then records per-glyph atlas
//! coordinates, metrics and kerning. All metrics of a `Font` are normalized by
//! `1 / (ascender - descender)`, so a font size of 1.0 yields a line whose
//! visible extent is one unit.

use std::collections::HashMap;

use ttf_parser::{Face, GlyphId, OutlineBuilder, Rect};

use crate::errors::*;
use crate::math::{Aabb2, Color, Matrix4, Point2, Vector2, Vector3};
use crate::video::prelude::*;

use super::mesh::TextVertex;
use super::path::{Fill, FillMode, Shape};
use super::renderer::{DrawState, Renderer};

impl_handle!(FontHandle);

/// Runes rasterized into the atlas, in cell order.
pub fn supported_runes() -> impl Iterator<Item = char> {
    (0x20u8..=0x7E)
        .map(char::from)
        .chain((0x410u32..=0x44F).filter_map(::std::char::from_u32))
}

/// Vertex budget of the factory renderer. Glyphs are flushed one at a time.
const FACTORY_VERTICES: usize = 65_536;

/// Partitioning of a square atlas into a grid of padded cells.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AtlasLayout {
    pub size: u32,
    pub cells_per_row: u32,
    /// Fraction of a cell left empty on every side.
    pub padding: f32,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        AtlasLayout {
            size: 2048,
            cells_per_row: 16,
            padding: 0.04,
        }
    }
}

impl AtlasLayout {
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.size as f32 / self.cells_per_row as f32
    }

    #[inline]
    pub fn padding_size(&self) -> f32 {
        self.cell_size() * self.padding
    }

    /// Edge length of the square a glyph is fitted into.
    #[inline]
    pub fn content_size(&self) -> f32 {
        self.cell_size() - 2.0 * self.padding_size()
    }

    /// Nominal pixels per em of the rasterized outlines.
    #[inline]
    pub fn ppem(&self) -> u32 {
        self.content_size().floor() as u32
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        (self.cells_per_row * self.cells_per_row) as usize
    }

    /// Top left corner of the content square of cell `index`, in atlas pixels
    /// with y pointing down.
    pub fn content_origin(&self, index: usize) -> Point2<f32> {
        let n = self.cells_per_row as usize;
        let cell = self.cell_size();
        let padding = self.padding_size();
        Point2::new(
            (index % n) as f32 * cell + padding,
            (index / n) as f32 * cell + padding,
        )
    }

    /// The rectangle a glyph of `width` by `height` units occupies inside cell
    /// `index`. The longer side spans the content square and the glyph is
    /// centered along the shorter one.
    pub fn fit(&self, index: usize, width: f32, height: f32) -> Aabb2<f32> {
        let origin = self.content_origin(index);
        let content = self.content_size();

        let size = if width >= height {
            Vector2::new(content, content * height / width)
        } else {
            Vector2::new(content * width / height, content)
        };

        let margin = (Vector2::new(content, content) - size) * 0.5;
        Aabb2::with_size(origin + margin, size)
    }

    /// Normalized texture coordinates of an atlas rectangle. The vertical axis
    /// is flipped so that v = 0 is the bottom row of the atlas.
    pub fn uv(&self, rect: &Aabb2<f32>) -> Aabb2<f32> {
        let size = self.size as f32;
        Aabb2::new(
            Point2::new(rect.min.x / size, 1.0 - rect.max.y / size),
            Point2::new(rect.max.x / size, 1.0 - rect.min.y / size),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    /// Atlas coordinates; `min.y` is the bottom edge of the glyph.
    pub uv: Aabb2<f32>,
    pub advance: f32,
    pub ascent: f32,
    pub descent: f32,
    pub left_bearing: f32,
    pub right_bearing: f32,
    /// Adjustments added to the pen when this glyph follows the key rune.
    pub kerns: HashMap<char, f32>,
}

impl Glyph {
    /// The kerning between `previous` and this glyph.
    #[inline]
    pub fn kern(&self, previous: char) -> f32 {
        self.kerns.get(&previous).cloned().unwrap_or(0.0)
    }

    /// The quad of this glyph relative to the pen at the top of a line, for a
    /// font size of 1.0.
    pub fn bounds(&self, line_ascent: f32) -> Aabb2<f32> {
        Aabb2::new(
            Point2::new(self.left_bearing, line_ascent - self.ascent),
            Point2::new(self.advance - self.right_bearing, line_ascent + self.descent),
        )
    }
}

#[derive(Debug)]
pub struct Font {
    pub family_name: String,
    pub sub_family_name: String,
    pub line_height: f32,
    pub line_ascent: f32,
    pub line_descent: f32,
    pub ppem: u32,
    glyphs: HashMap<char, Glyph>,
    texture: TextureHandle,
}

impl Font {
    #[inline]
    pub fn glyph(&self, rune: char) -> Option<&Glyph> {
        self.glyphs.get(&rune)
    }

    #[inline]
    pub fn glyphs(&self) -> &HashMap<char, Glyph> {
        &self.glyphs
    }

    /// The mipmapped R8 atlas.
    #[inline]
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Size of the box `text` occupies at `font_size`. `\n` starts a new line,
    /// `\r` returns to the start of the current one.
    pub fn text_size(&self, text: &str, font_size: f32) -> Vector2<f32> {
        let mut width = 0.0f32;
        let mut lines = 1;
        let mut x = 0.0f32;
        let mut previous = None;

        for rune in text.chars() {
            match rune {
                '\n' => {
                    x = 0.0;
                    lines += 1;
                    previous = None;
                }
                '\r' => {
                    x = 0.0;
                    previous = None;
                }
                _ => {
                    // Runes without a glyph are skipped, kerning included.
                    if let Some(glyph) = self.glyph(rune) {
                        if let Some(p) = previous {
                            x += glyph.kern(p);
                        }

                        x += glyph.advance;
                        width = width.max(x);
                        previous = Some(rune);
                    }
                }
            }
        }

        Vector2::new(width, lines as f32 * self.line_height) * font_size
    }

    /// Lays out `text` with its top left corner at `origin` and returns the
    /// quads of its visible glyphs, six vertices each.
    pub fn layout(&self, text: &str, origin: Vector2<f32>, font_size: f32) -> Vec<TextVertex> {
        let mut vertices = Vec::with_capacity(text.len() * 6);
        let mut pen = origin;
        let mut previous = None;

        for rune in text.chars() {
            match rune {
                '\n' => {
                    pen = Vector2::new(origin.x, pen.y + self.line_height * font_size);
                    previous = None;
                    continue;
                }
                '\r' => {
                    pen.x = origin.x;
                    previous = None;
                    continue;
                }
                _ => {}
            }

            let glyph = match self.glyph(rune) {
                Some(v) => v,
                None => continue,
            };

            if let Some(p) = previous {
                pen.x += glyph.kern(p) * font_size;
            }

            previous = Some(rune);
            if !rune.is_whitespace() {
                let b = glyph.bounds(self.line_ascent);
                let (x0, y0) = (pen.x + b.min.x * font_size, pen.y + b.min.y * font_size);
                let (x1, y1) = (pen.x + b.max.x * font_size, pen.y + b.max.y * font_size);
                let uv = glyph.uv;

                let vertex = |x: f32, y: f32, u: f32, v: f32| TextVertex {
                    position: Vector2::new(x, y),
                    uv: Vector2::new(u, v),
                };

                vertices.push(vertex(x0, y0, uv.min.x, uv.max.y));
                vertices.push(vertex(x0, y1, uv.min.x, uv.min.y));
                vertices.push(vertex(x1, y1, uv.max.x, uv.min.y));
                vertices.push(vertex(x0, y0, uv.min.x, uv.max.y));
                vertices.push(vertex(x1, y1, uv.max.x, uv.min.y));
                vertices.push(vertex(x1, y0, uv.max.x, uv.max.y));
            }

            pen.x += glyph.advance * font_size;
        }

        vertices
    }

    pub fn delete(self, device: &mut Device) -> Result<()> {
        device.delete_texture(self.texture)
    }
}

/// Forwards outline segments into a shape path.
struct ShapeBuilder<'a> {
    shape: &'a mut Shape,
}

impl<'a> OutlineBuilder for ShapeBuilder<'a> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.shape.path.move_to(Vector2::new(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.shape.path.line_to(Vector2::new(x, y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.shape
            .path
            .quad_to(Vector2::new(x1, y1), Vector2::new(x, y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.shape.path.cube_to(
            Vector2::new(x1, y1),
            Vector2::new(x2, y2),
            Vector2::new(x, y),
        );
    }

    fn close(&mut self) {
        self.shape.path.close_loop();
    }
}

/// Bounds of an extracted outline. Glyphs with an empty outline yield `None`
/// and stay blank; an outline that stopped halfway is malformed.
fn outline_bounds(rune: char, outline: Option<Rect>, shape: &Shape) -> Result<Option<Aabb2<f32>>> {
    match outline {
        Some(rect) => Ok(Some(Aabb2::new(
            Point2::new(f32::from(rect.x_min), f32::from(rect.y_min)),
            Point2::new(f32::from(rect.x_max), f32::from(rect.y_max)),
        ))),
        None if shape.path.is_empty() => Ok(None),
        None => Err(Error::FontGlyph(format!("malformed outline for {:?}", rune))),
    }
}

fn face_name(face: &Face, id: u16) -> String {
    face.names()
        .into_iter()
        .filter(|v| v.name_id == id)
        .find_map(|v| v.to_string())
        .unwrap_or_default()
}

/// Rasterizes fonts into glyph atlases.
pub struct FontFactory {
    layout: AtlasLayout,
    renderer: Renderer,
    framebuffer: FramebufferHandle,
    guard: ResourceGuard,
}

impl FontFactory {
    pub fn new(device: &mut Device) -> Result<Self> {
        FontFactory::with_layout(device, AtlasLayout::default())
    }

    pub fn with_layout(device: &mut Device, layout: AtlasLayout) -> Result<Self> {
        let mut guard = ResourceGuard::new();
        let framebuffer = match Self::target(device, &mut guard, layout.size) {
            Ok(v) => v,
            Err(err) => {
                guard.release(device)?;
                return Err(err);
            }
        };

        let renderer = match Renderer::new(device, FACTORY_VERTICES) {
            Ok(v) => v,
            Err(err) => {
                guard.release(device)?;
                return Err(err);
            }
        };

        Ok(FontFactory {
            layout,
            renderer,
            framebuffer,
            guard,
        })
    }

    /// The R8 color and stencil target glyphs are filled into.
    fn target(device: &mut Device, guard: &mut ResourceGuard, size: u32) -> Result<FramebufferHandle> {
        let color = guard.create_texture(device, TextureParams::new(TextureFormat::R8, size, size), None)?;
        let depth_stencil = guard.create_texture(
            device,
            TextureParams::new(TextureFormat::Depth24Stencil8, size, size),
            None,
        )?;

        guard.create_framebuffer(
            device,
            FramebufferParams::new()
                .with_color(color)
                .with_depth(depth_stencil),
        )
    }

    #[inline]
    pub fn layout(&self) -> &AtlasLayout {
        &self.layout
    }

    pub fn delete(mut self, device: &mut Device) -> Result<()> {
        self.renderer.delete(device)?;
        self.guard.release(device)
    }

    /// Parses `bytes` as an OpenType font and builds its atlas.
    pub fn create(&mut self, device: &mut Device, bytes: &[u8]) -> Result<Font> {
        let face = Face::parse(bytes, 0).map_err(|err| Error::FontParse(format!("{}", err)))?;

        let ascender = f32::from(face.ascender());
        let descender = f32::from(face.descender());
        let extent = ascender - descender;
        if extent <= 0.0 {
            return Err(Error::FontParse("ascender is not above descender".into()));
        }

        let scale = 1.0 / extent;
        let runes: Vec<char> = supported_runes().collect();
        if runes.len() > self.layout.capacity() {
            return Err(Error::FontGlyph(format!(
                "{} runes do not fit {} atlas cells",
                runes.len(),
                self.layout.capacity()
            )));
        }

        let ids: Vec<GlyphId> = runes
            .iter()
            .map(|&v| face.glyph_index(v).unwrap_or(GlyphId(0)))
            .collect();

        let mut glyphs = HashMap::with_capacity(runes.len() + 1);
        let mut cleared = false;
        for (index, (&rune, &id)) in runes.iter().zip(ids.iter()).enumerate() {
            let advance = face
                .glyph_hor_advance(id)
                .ok_or_else(|| Error::FontGlyph(format!("no advance for {:?}", rune)))?;

            let advance = f32::from(advance);
            let mut glyph = Glyph {
                uv: Aabb2::zero(),
                advance: advance * scale,
                ascent: 0.0,
                descent: 0.0,
                left_bearing: 0.0,
                right_bearing: 0.0,
                kerns: HashMap::new(),
            };

            if !rune.is_whitespace() {
                let mut shape = Shape::new(Fill::new(Color::WHITE, FillMode::NonZero));
                let outline = face.outline_glyph(id, &mut ShapeBuilder { shape: &mut shape });
                let bbox = match outline_bounds(rune, outline, &shape)? {
                    Some(v) => v,
                    None => {
                        trace!("Glyph for {:?} has no outline.", rune);
                        glyph.kerns = kerning(&face, &runes, &ids, id, scale);
                        glyphs.insert(rune, glyph);
                        continue;
                    }
                };

                let area = self.raster(device, index, &shape, &bbox, !cleared)?;
                cleared = true;
                glyph.uv = self.layout.uv(&area);
                glyph.left_bearing = bbox.min.x * scale;
                glyph.right_bearing = (advance - bbox.max.x) * scale;
                glyph.ascent = bbox.max.y * scale;
                glyph.descent = -bbox.min.y * scale;
            }

            glyph.kerns = kerning(&face, &runes, &ids, id, scale);
            glyphs.insert(rune, glyph);
        }

        if let Some(space) = glyphs.get(&' ').cloned() {
            glyphs.insert('\t', space);
        }

        let mut params = TextureParams::new(TextureFormat::R8, self.layout.size, self.layout.size);
        params.mipmap = true;
        let texture = device.create_texture(params, None)?;
        let copied = device
            .copy_to_texture(self.framebuffer, texture)
            .and_then(|_| device.generate_mipmaps(texture));

        if let Err(err) = copied {
            device.delete_texture(texture)?;
            return Err(err);
        }

        let font = Font {
            family_name: face_name(&face, ttf_parser::name_id::FAMILY),
            sub_family_name: face_name(&face, ttf_parser::name_id::SUBFAMILY),
            line_height: (extent + f32::from(face.line_gap())) * scale,
            line_ascent: ascender * scale,
            line_descent: -descender * scale,
            ppem: self.layout.ppem(),
            glyphs,
            texture,
        };

        debug!(
            "Created font {} {} with {} glyphs.",
            font.family_name,
            font.sub_family_name,
            font.glyphs.len()
        );

        Ok(font)
    }

    /// Fills `shape`, given in outline units with bounding box `bbox`, into
    /// cell `index`. Returns the covered atlas rectangle.
    fn raster(
        &mut self,
        device: &mut Device,
        index: usize,
        shape: &Shape,
        bbox: &Aabb2<f32>,
        clear: bool,
    ) -> Result<Aabb2<f32>> {
        let (w, h) = (bbox.width(), bbox.height());
        let area = self.layout.fit(index, w.max(1.0), h.max(1.0));
        let s = area.width().max(area.height()) / w.max(h).max(1.0);

        let transform = Matrix4::from_translation(Vector3::new(
            area.min.x - bbox.min.x * s,
            area.min.y + bbox.max.y * s,
            0.0,
        )) * Matrix4::from_nonuniform_scale(s, -s, 1.0);

        let size = self.layout.size as f32;
        let cell = self.layout.cell_size();
        let origin = self.layout.content_origin(index) - Vector2::new(1.0, 1.0) * self.layout.padding_size();
        let clip = Aabb2::with_size(origin, Vector2::new(cell, cell));

        self.renderer.begin(Vector2::new(size, size));
        self.renderer
            .fill_shape(&DrawState::new(clip).with_transform(transform), shape)?;

        let viewport = Viewport::with_size(self.layout.size, self.layout.size);
        let mut pass = RenderPassInfo::new(self.framebuffer, viewport).clear_stencil(0);
        if clear {
            pass = pass.clear_color(Color::TRANSPARENT);
        }

        self.renderer.end(device, pass)?;
        Ok(area)
    }
}

/// Non-zero kerning of every supported rune followed by glyph `id`.
fn kerning(face: &Face, runes: &[char], ids: &[GlyphId], id: GlyphId, scale: f32) -> HashMap<char, f32> {
    let mut kerns = HashMap::new();
    let table = match face.tables().kern {
        Some(v) => v,
        None => return kerns,
    };

    for (&rune, &left) in runes.iter().zip(ids.iter()) {
        let value = table
            .subtables
            .into_iter()
            .filter(|v| v.horizontal && !v.variable)
            .find_map(|v| v.glyphs_kerning(left, id));

        if let Some(value) = value.filter(|&v| v != 0) {
            kerns.insert(rune, f32::from(value) * scale);
        }
    }

    kerns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atlas_cells() {
        let layout = AtlasLayout::default();
        assert_ulps_eq!(layout.cell_size(), 128.0);
        assert_relative_eq!(layout.padding_size(), 5.12, epsilon = 1e-4);
        assert_relative_eq!(layout.content_size(), 117.76, epsilon = 1e-4);
        assert_eq!(layout.ppem(), 117);

        let origin = layout.content_origin(17);
        assert_relative_eq!(origin.x, 128.0 + 5.12, epsilon = 1e-4);
        assert_relative_eq!(origin.y, 128.0 + 5.12, epsilon = 1e-4);
    }

    #[test]
    fn fit_preserves_aspect() {
        let layout = AtlasLayout::default();

        let wide = layout.fit(0, 200.0, 100.0);
        assert_relative_eq!(wide.width(), 117.76, epsilon = 1e-3);
        assert_relative_eq!(wide.height(), 58.88, epsilon = 1e-3);
        assert_relative_eq!(wide.min.y, 5.12 + 29.44, epsilon = 1e-3);

        let tall = layout.fit(0, 50.0, 100.0);
        assert_relative_eq!(tall.width(), 58.88, epsilon = 1e-3);
        assert_relative_eq!(tall.height(), 117.76, epsilon = 1e-3);
        assert_relative_eq!(tall.min.x, 5.12 + 29.44, epsilon = 1e-3);
    }

    #[test]
    fn uv_is_flipped() {
        let layout = AtlasLayout::default();
        let rect = Aabb2::new(Point2::new(0.0, 0.0), Point2::new(1024.0, 512.0));
        let uv = layout.uv(&rect);
        assert_ulps_eq!(uv.min.x, 0.0);
        assert_ulps_eq!(uv.max.x, 0.5);
        assert_ulps_eq!(uv.min.y, 0.75);
        assert_ulps_eq!(uv.max.y, 1.0);
    }

    #[test]
    fn runes() {
        let runes: Vec<char> = supported_runes().collect();
        assert_eq!(runes.len(), 95 + 64);
        assert_eq!(runes[0], ' ');
        assert_eq!(runes['A' as usize - 0x20], 'A');
        assert!(runes.contains(&'Ж'));
    }

    #[test]
    fn empty_outlines_stay_blank() {
        let mut shape = Shape::new(Fill::default());
        assert_eq!(outline_bounds('Ж', None, &shape).unwrap(), None);

        let rect = Rect {
            x_min: -10,
            y_min: 0,
            x_max: 20,
            y_max: 40,
        };

        let bbox = outline_bounds('A', Some(rect), &shape).unwrap().unwrap();
        assert_ulps_eq!(bbox.min.x, -10.0);
        assert_ulps_eq!(bbox.max.y, 40.0);

        shape.path.move_to(Vector2::new(0.0, 0.0));
        shape.path.line_to(Vector2::new(1.0, 0.0));
        match outline_bounds('A', None, &shape) {
            Err(Error::FontGlyph(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
