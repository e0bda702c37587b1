use crate::errors::*;
use crate::math::{Aabb2, Color, Matrix4, Point2, Vector2, Vector3};
use crate::settings::CanvasSettings;
use crate::utils::ObjectPool;
use crate::video::prelude::*;

use super::font::{Font, FontFactory, FontHandle};
use super::path::{Contour, ContourPoint, Fill, FillMode, ImageFill, Shape, Stroke, TESSELLATION_SEGMENTS};
use super::renderer::{DrawState, Renderer};

/// The drawing state of one level of the layer stack.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Layer {
    /// Offset added to every position drawn on this layer.
    pub translation: Vector2<i32>,
    /// Visible area in canvas coordinates, translation already applied.
    pub clip: Aabb2<i32>,
    pub solid_color: Color,
    pub stroke_color: Color,
    pub stroke_size: i32,
    pub font: Option<FontHandle>,
    pub font_size: f32,
}

impl Layer {
    fn base(size: Vector2<u32>) -> Self {
        Layer {
            translation: Vector2::new(0, 0),
            clip: Aabb2::new(Point2::new(0, 0), Point2::new(size.x as i32, size.y as i32)),
            solid_color: Color::WHITE,
            stroke_color: Color::BLACK,
            stroke_size: 1,
            font: None,
            font_size: 16.0,
        }
    }
}

enum OpenPath {
    Shape(Shape),
    Contour(Contour),
}

/// A 2D drawing surface.
///
/// Drawing happens between `begin` and `end`. Positions are in logical pixels
/// with the origin at the top left corner; `resize` sets the logical size and
/// `resize_framebuffer` the size of the target in physical pixels.
///
/// The canvas keeps a stack of layers. `push` copies the current layer, so the
/// translation, clip, colors and font set afterwards are undone by the matching
/// `pop`.
pub struct Canvas {
    renderer: Renderer,
    factory: Option<FontFactory>,
    fonts: ObjectPool<FontHandle, Font>,
    layers: Vec<Layer>,
    depth: usize,
    size: Vector2<u32>,
    framebuffer: FramebufferHandle,
    framebuffer_size: Vector2<u32>,
    clear_color: Option<Color>,
    path: Option<OpenPath>,
}

impl Canvas {
    /// Creates a canvas of `size` logical pixels drawing into the screen.
    pub fn new(device: &mut Device, settings: &CanvasSettings, size: Vector2<u32>) -> Result<Self> {
        let renderer = Renderer::new(device, settings.max_vertices)?;
        let depth = settings.max_layer_depth.max(1);

        Ok(Canvas {
            renderer,
            factory: None,
            fonts: ObjectPool::new(),
            layers: vec![Layer::base(size); depth],
            depth: 0,
            size,
            framebuffer: FramebufferHandle::screen(),
            framebuffer_size: size,
            clear_color: settings.clear_color,
            path: None,
        })
    }

    /// Releases the canvas and every font it created.
    pub fn delete(mut self, device: &mut Device) -> Result<()> {
        let handles: Vec<FontHandle> = self.fonts.iter().map(|(h, _)| h).collect();
        for handle in handles {
            if let Some(font) = self.fonts.free(handle) {
                font.delete(device)?;
            }
        }

        if let Some(factory) = self.factory.take() {
            factory.delete(device)?;
        }

        self.renderer.delete(device)
    }

    #[inline]
    pub fn size(&self) -> Vector2<u32> {
        self.size
    }

    /// Sets the logical size, effective from the next `begin`.
    pub fn resize(&mut self, size: Vector2<u32>) {
        self.size = size;
    }

    /// Sets the size of the render target in physical pixels.
    pub fn resize_framebuffer(&mut self, size: Vector2<u32>) {
        self.framebuffer_size = size;
    }

    /// Draws into `framebuffer` instead of the screen.
    pub fn set_target(&mut self, framebuffer: FramebufferHandle) {
        self.framebuffer = framebuffer;
    }

    #[inline]
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Starts a frame. The layer stack is reset to a single base layer.
    pub fn begin(&mut self) {
        self.depth = 0;
        self.layers[0] = Layer::base(self.size);
        self.path = None;
        self.renderer
            .begin(Vector2::new(self.size.x as f32, self.size.y as f32));
    }

    /// Executes everything drawn since `begin` in one render pass.
    pub fn end(&mut self, device: &mut Device) -> Result<()> {
        if self.path.take().is_some() {
            warn!("Canvas frame ended with an open path, it has been discarded.");
        }

        let viewport = Viewport::with_size(self.framebuffer_size.x, self.framebuffer_size.y);
        let mut pass = RenderPassInfo::new(self.framebuffer, viewport).clear_stencil(0);
        if let Some(color) = self.clear_color {
            pass = pass.clear_color(color);
        }

        self.renderer.end(device, pass)
    }
}

impl Canvas {
    #[inline]
    pub fn layer(&self) -> &Layer {
        &self.layers[self.depth]
    }

    #[inline]
    fn layer_mut(&mut self) -> &mut Layer {
        &mut self.layers[self.depth]
    }

    /// The number of layers pushed above the base layer.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn push(&mut self) -> Result<()> {
        if self.depth + 1 >= self.layers.len() {
            return Err(Invariant::StackOverflow.into());
        }

        self.layers[self.depth + 1] = self.layers[self.depth];
        self.depth += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(Invariant::StackUnderflow.into());
        }

        self.depth -= 1;
        Ok(())
    }

    pub fn translate(&mut self, delta: Vector2<i32>) {
        self.layer_mut().translation += delta;
    }

    /// Restricts drawing to `bounds`, given in the coordinates of the current
    /// layer. The result never exceeds the current clip.
    pub fn clip(&mut self, bounds: Aabb2<i32>) {
        let layer = self.layer_mut();
        let world = bounds.translate(layer.translation);
        layer.clip = layer.clip.intersect(&world);
    }

    #[inline]
    pub fn solid_color(&self) -> Color {
        self.layer().solid_color
    }

    #[inline]
    pub fn set_solid_color(&mut self, color: Color) {
        self.layer_mut().solid_color = color;
    }

    #[inline]
    pub fn stroke_color(&self) -> Color {
        self.layer().stroke_color
    }

    #[inline]
    pub fn set_stroke_color(&mut self, color: Color) {
        self.layer_mut().stroke_color = color;
    }

    #[inline]
    pub fn stroke_size(&self) -> i32 {
        self.layer().stroke_size
    }

    #[inline]
    pub fn set_stroke_size(&mut self, size: i32) {
        self.layer_mut().stroke_size = size;
    }

    #[inline]
    pub fn font_size(&self) -> f32 {
        self.layer().font_size
    }

    #[inline]
    pub fn set_font_size(&mut self, size: f32) {
        self.layer_mut().font_size = size;
    }

    #[inline]
    pub fn current_font(&self) -> Option<FontHandle> {
        self.layer().font
    }

    #[inline]
    pub fn set_font(&mut self, font: Option<FontHandle>) {
        self.layer_mut().font = font;
    }

    fn offset(&self, p: Vector2<f32>) -> Vector2<f32> {
        let t = self.layer().translation;
        Vector2::new(p.x + t.x as f32, p.y + t.y as f32)
    }

    fn state(&self) -> DrawState {
        let clip = self.layer().clip;
        DrawState::new(Aabb2::new(
            Point2::new(clip.min.x as f32, clip.min.y as f32),
            Point2::new(clip.max.x as f32, clip.max.y as f32),
        ))
    }

    fn stroke(&self) -> Stroke {
        let layer = self.layer();
        Stroke::new(layer.stroke_size as f32, layer.stroke_color)
    }
}

impl Canvas {
    /// Builds an atlas for an OpenType font.
    pub fn create_font(&mut self, device: &mut Device, bytes: &[u8]) -> Result<FontHandle> {
        if self.factory.is_none() {
            self.factory = Some(FontFactory::new(device)?);
        }

        let font = match self.factory.as_mut() {
            Some(factory) => factory.create(device, bytes)?,
            None => return Err(Invariant::ResourceReleased.into()),
        };

        Ok(self.fonts.create(font))
    }

    #[inline]
    pub fn font(&self, handle: FontHandle) -> Option<&Font> {
        self.fonts.get(handle)
    }

    pub fn delete_font(&mut self, device: &mut Device, handle: FontHandle) -> Result<()> {
        let font = self
            .fonts
            .free(handle)
            .ok_or(Invariant::ResourceAlreadyReleased)?;

        font.delete(device)
    }

    /// Size of `text` with the font and font size of the current layer.
    pub fn text_size(&self, text: &str) -> Vector2<f32> {
        let layer = self.layer();
        match layer.font.and_then(|v| self.fonts.get(v)) {
            Some(font) => font.text_size(text, layer.font_size),
            None => Vector2::new(0.0, 0.0),
        }
    }

    /// Draws `text` in the solid color with its top left corner at `position`.
    /// Nothing is drawn while the current layer has no font.
    pub fn draw_text(&mut self, text: &str, position: Vector2<f32>) -> Result<()> {
        let layer = *self.layer();
        let handle = match layer.font {
            Some(v) => v,
            None => return Ok(()),
        };

        let font = self.fonts.get(handle).ok_or(Invariant::ResourceReleased)?;
        let vertices = font.layout(text, self.offset(position), layer.font_size);
        let texture = font.texture();

        let state = self.state();
        self.renderer
            .draw_text(&state, &vertices, layer.solid_color, texture)
    }
}

impl Canvas {
    /// Fills an axis-aligned rectangle with the solid color.
    pub fn fill_rectangle(&mut self, position: Vector2<f32>, size: Vector2<f32>) -> Result<()> {
        let fill = Fill::new(self.solid_color(), FillMode::None);
        self.fill_quad(position, size, &fill)
    }

    /// Draws `texture` stretched over a rectangle, tinted with the solid color.
    pub fn draw_image(
        &mut self,
        texture: TextureHandle,
        position: Vector2<f32>,
        size: Vector2<f32>,
    ) -> Result<()> {
        let origin = self.offset(position);
        let transform = Matrix4::from_nonuniform_scale(1.0 / size.x, 1.0 / size.y, 1.0)
            * Matrix4::from_translation(Vector3::new(-origin.x, -origin.y, 0.0));

        let fill = Fill {
            color: self.solid_color(),
            image: Some(ImageFill { texture, transform }),
            mode: FillMode::None,
        };

        self.fill_quad(position, size, &fill)
    }

    fn fill_quad(&mut self, position: Vector2<f32>, size: Vector2<f32>, fill: &Fill) -> Result<()> {
        let p = self.offset(position);
        let (x0, y0, x1, y1) = (p.x, p.y, p.x + size.x, p.y + size.y);
        let vertices = [
            Vector2::new(x0, y0),
            Vector2::new(x0, y1),
            Vector2::new(x1, y1),
            Vector2::new(x0, y0),
            Vector2::new(x1, y1),
            Vector2::new(x1, y0),
        ];

        let state = self.state();
        self.renderer.fill_triangles(&state, &vertices, fill)
    }

    pub fn fill_triangle(&mut self, a: Vector2<f32>, b: Vector2<f32>, c: Vector2<f32>) -> Result<()> {
        let vertices = [self.offset(a), self.offset(b), self.offset(c)];
        let fill = Fill::new(self.solid_color(), FillMode::None);
        let state = self.state();
        self.renderer.fill_triangles(&state, &vertices, &fill)
    }

    pub fn fill_circle(&mut self, center: Vector2<f32>, radius: f32) -> Result<()> {
        let segments = TESSELLATION_SEGMENTS * 2;
        let mut shape = Shape::new(Fill::new(self.solid_color(), FillMode::None));
        let c = self.offset(center);

        for i in 0..segments {
            let a = i as f32 / segments as f32 * ::std::f32::consts::PI * 2.0;
            let p = Vector2::new(c.x + radius * a.cos(), c.y + radius * a.sin());
            shape.path.line_to(p);
        }

        shape.path.close_loop();
        let state = self.state();
        self.renderer.fill_shape(&state, &shape)
    }

    /// Fills a rectangle whose corners are rounded by quadratic arcs of
    /// `radius`, clamped to half the shorter side.
    pub fn fill_round_rectangle(
        &mut self,
        position: Vector2<f32>,
        size: Vector2<f32>,
        radius: f32,
    ) -> Result<()> {
        let r = radius.max(0.0).min(size.x.min(size.y) * 0.5);
        let p = self.offset(position);
        let (x0, y0, x1, y1) = (p.x, p.y, p.x + size.x, p.y + size.y);
        let v = Vector2::new;

        let mut shape = Shape::new(Fill::new(self.solid_color(), FillMode::None));
        let path = &mut shape.path;
        path.move_to(v(x0 + r, y0));
        path.line_to(v(x1 - r, y0));
        path.quad_to(v(x1, y0), v(x1, y0 + r));
        path.line_to(v(x1, y1 - r));
        path.quad_to(v(x1, y1), v(x1 - r, y1));
        path.line_to(v(x0 + r, y1));
        path.quad_to(v(x0, y1), v(x0, y1 - r));
        path.line_to(v(x0, y0 + r));
        path.quad_to(v(x0, y0), v(x0 + r, y0));

        let state = self.state();
        self.renderer.fill_shape(&state, &shape)
    }

    /// Strokes a segment with the stroke color and size.
    pub fn draw_line(&mut self, a: Vector2<f32>, b: Vector2<f32>) -> Result<()> {
        let stroke = self.stroke();
        let mut contour = Contour::new();
        contour.move_to(ContourPoint::new(self.offset(a), stroke));
        contour.line_to(ContourPoint::new(self.offset(b), stroke));

        let state = self.state();
        self.renderer.stroke_contour(&state, &contour)
    }
}

impl Canvas {
    /// Opens a filled path. Any path still open is discarded.
    pub fn begin_shape(&mut self, fill: Fill) {
        self.path = Some(OpenPath::Shape(Shape::new(fill)));
    }

    /// Fills the open shape.
    pub fn end_shape(&mut self) -> Result<()> {
        match self.path.take() {
            Some(OpenPath::Shape(shape)) => {
                let state = self.state();
                self.renderer.fill_shape(&state, &shape)
            }
            other => {
                self.path = other;
                Err(Invariant::NoActivePath.into())
            }
        }
    }

    /// Opens a stroked path. Points take the stroke color and size of the
    /// current layer at the time they are added.
    pub fn begin_contour(&mut self) {
        self.path = Some(OpenPath::Contour(Contour::new()));
    }

    /// Strokes the open contour.
    pub fn end_contour(&mut self) -> Result<()> {
        match self.path.take() {
            Some(OpenPath::Contour(contour)) => {
                let state = self.state();
                self.renderer.stroke_contour(&state, &contour)
            }
            other => {
                self.path = other;
                Err(Invariant::NoActivePath.into())
            }
        }
    }

    pub fn move_to(&mut self, p: Vector2<f32>) -> Result<()> {
        let (p, stroke) = (self.offset(p), self.stroke());
        match self.path {
            Some(OpenPath::Shape(ref mut v)) => v.path.move_to(p),
            Some(OpenPath::Contour(ref mut v)) => v.move_to(ContourPoint::new(p, stroke)),
            None => return Err(Invariant::NoActivePath.into()),
        }

        Ok(())
    }

    pub fn line_to(&mut self, p: Vector2<f32>) -> Result<()> {
        let (p, stroke) = (self.offset(p), self.stroke());
        match self.path {
            Some(OpenPath::Shape(ref mut v)) => v.path.line_to(p),
            Some(OpenPath::Contour(ref mut v)) => v.line_to(ContourPoint::new(p, stroke)),
            None => return Err(Invariant::NoActivePath.into()),
        }

        Ok(())
    }

    pub fn quad_to(&mut self, control: Vector2<f32>, end: Vector2<f32>) -> Result<()> {
        let (c, e, stroke) = (self.offset(control), self.offset(end), self.stroke());
        match self.path {
            Some(OpenPath::Shape(ref mut v)) => v.path.quad_to(c, e),
            Some(OpenPath::Contour(ref mut v)) => v.quad_to(c, ContourPoint::new(e, stroke)),
            None => return Err(Invariant::NoActivePath.into()),
        }

        Ok(())
    }

    pub fn cube_to(&mut self, c1: Vector2<f32>, c2: Vector2<f32>, end: Vector2<f32>) -> Result<()> {
        let (c1, c2) = (self.offset(c1), self.offset(c2));
        let (e, stroke) = (self.offset(end), self.stroke());
        match self.path {
            Some(OpenPath::Shape(ref mut v)) => v.path.cube_to(c1, c2, e),
            Some(OpenPath::Contour(ref mut v)) => v.cube_to(c1, c2, ContourPoint::new(e, stroke)),
            None => return Err(Invariant::NoActivePath.into()),
        }

        Ok(())
    }

    /// Returns to the first point of the current sub-path.
    pub fn close_loop(&mut self) -> Result<()> {
        match self.path {
            Some(OpenPath::Shape(ref mut v)) => v.path.close_loop(),
            Some(OpenPath::Contour(ref mut v)) => v.close_loop(),
            None => return Err(Invariant::NoActivePath.into()),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas(device: &mut Device, depth: usize) -> Canvas {
        let settings = CanvasSettings {
            max_vertices: 4096,
            max_layer_depth: depth,
            clear_color: None,
        };

        Canvas::new(device, &settings, Vector2::new(100, 50)).unwrap()
    }

    #[test]
    fn push_pop_restores_the_layer() {
        let mut device = Device::headless();
        let mut canvas = canvas(&mut device, 256);
        canvas.begin();

        let base = *canvas.layer();
        canvas.push().unwrap();
        canvas.translate(Vector2::new(3, 4));
        canvas.set_solid_color(Color::RED);
        canvas.set_stroke_size(5);
        canvas.set_font_size(30.0);
        canvas.clip(Aabb2::new(Point2::new(0, 0), Point2::new(10, 10)));
        assert_ne!(*canvas.layer(), base);

        canvas.pop().unwrap();
        assert_eq!(*canvas.layer(), base);
        assert_eq!(canvas.pop().unwrap_err().invariant(), Some(Invariant::StackUnderflow));
    }

    #[test]
    fn stack_depth_is_bounded() {
        let mut device = Device::headless();
        let mut canvas = canvas(&mut device, 4);
        canvas.begin();

        for _ in 0..3 {
            canvas.push().unwrap();
        }

        assert_eq!(canvas.depth(), 3);
        assert_eq!(canvas.push().unwrap_err().invariant(), Some(Invariant::StackOverflow));
    }

    #[test]
    fn clip_is_translated_and_nested() {
        let mut device = Device::headless();
        let mut canvas = canvas(&mut device, 8);
        canvas.begin();

        canvas.push().unwrap();
        canvas.translate(Vector2::new(10, 10));
        canvas.clip(Aabb2::new(Point2::new(0, 0), Point2::new(20, 20)));
        assert_eq!(
            canvas.layer().clip,
            Aabb2::new(Point2::new(10, 10), Point2::new(30, 30))
        );

        canvas.push().unwrap();
        canvas.clip(Aabb2::new(Point2::new(15, -5), Point2::new(40, 5)));
        assert_eq!(
            canvas.layer().clip,
            Aabb2::new(Point2::new(25, 10), Point2::new(30, 15))
        );
    }

    #[test]
    fn path_calls_need_an_open_path() {
        let mut device = Device::headless();
        let mut canvas = canvas(&mut device, 8);
        canvas.begin();

        let err = canvas.line_to(Vector2::new(1.0, 1.0)).unwrap_err();
        assert_eq!(err.invariant(), Some(Invariant::NoActivePath));

        canvas.begin_contour();
        canvas.move_to(Vector2::new(0.0, 0.0)).unwrap();
        canvas.line_to(Vector2::new(10.0, 0.0)).unwrap();
        assert_eq!(canvas.end_shape().unwrap_err().invariant(), Some(Invariant::NoActivePath));
        canvas.end_contour().unwrap();
        assert_eq!(canvas.renderer().contours().offset(), 4);
    }
}
