//! Turns shapes, contours and glyph quads into pipeline-bound draw commands.
//!
//! Everything drawn between `begin` and `end` is appended to three meshes and
//! recorded into one command queue. `end` uploads the meshes and submits the
//! queue inside a single render pass.
//!
//! Filled shapes go through a stencil state machine. With `FillMode::None` a
//! sub-shape is drawn as one fan. Otherwise every sub-shape is first drawn into
//! the stencil buffer only, incrementing on front faces and decrementing on back
//! faces, which leaves the winding count of each pixel. The shape is then drawn
//! again with a stencil test selecting non-zero (or odd) counts, and the test
//! replaces the stencil value with zero so the next shape starts clean.

use crate::errors::*;
use crate::math::{Aabb2, Color, Matrix4, Point2, SquareMatrix, Vector2, Vector4};
use crate::video::prelude::*;

use super::mesh::{ContourVertex, Mesh, ShapeVertex, TextVertex};
use super::path::{self, Contour, Fill, FillMode, Shape};
use super::shaders;

/// Per-draw state: a transform applied in the vertex stage and a clip
/// rectangle in screen coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawState {
    pub transform: Matrix4<f32>,
    pub clip: Aabb2<f32>,
}

impl DrawState {
    pub fn new(clip: Aabb2<f32>) -> Self {
        DrawState {
            transform: Matrix4::identity(),
            clip,
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f32>) -> Self {
        self.transform = transform;
        self
    }
}

/// Locations of the uniforms shared by all canvas programs. Programs that do
/// not declare one get `UniformLocation::NONE`, which the queue ignores.
#[derive(Debug, Copy, Clone)]
struct CanvasUniforms {
    projection: UniformLocation,
    transform: UniformLocation,
    texture_transform: UniformLocation,
    clip_distances: UniformLocation,
    color: UniformLocation,
    texture: UniformLocation,
}

impl CanvasUniforms {
    fn resolve(device: &mut Device, program: ProgramHandle) -> Result<Self> {
        Ok(CanvasUniforms {
            projection: device.uniform_location(program, "projectionMatrixIn")?,
            transform: device.uniform_location(program, "transformMatrixIn")?,
            texture_transform: device.uniform_location(program, "textureTransformMatrixIn")?,
            clip_distances: device.uniform_location(program, "clipDistancesIn")?,
            color: device.uniform_location(program, "colorIn")?,
            texture: device.uniform_location(program, "textureIn")?,
        })
    }
}

#[derive(Debug, Copy, Clone)]
struct CanvasProgram {
    handle: ProgramHandle,
    uniforms: CanvasUniforms,
}

impl CanvasProgram {
    fn new(
        device: &mut Device,
        guard: &mut ResourceGuard,
        source: &shaders::ProgramSource,
    ) -> Result<Self> {
        let handle = guard.create_render_program(device, &source.vs, &source.fs)?;
        let uniforms = CanvasUniforms::resolve(device, handle)?;
        Ok(CanvasProgram { handle, uniforms })
    }
}

/// The immutable pipelines of the canvas.
#[derive(Debug, Copy, Clone)]
pub struct CanvasPipelines {
    pub shape_triangles: PipelineHandle,
    pub shape_fan: PipelineHandle,
    pub shape_mask: PipelineHandle,
    pub shape_nonzero: PipelineHandle,
    pub shape_odd: PipelineHandle,
    pub contour: PipelineHandle,
    pub text: PipelineHandle,
}

fn base_params(
    program: ProgramHandle,
    vertex_array: VertexArrayHandle,
    topology: Topology,
) -> PipelineParams {
    let mut params = PipelineParams::new(program, Some(vertex_array)).with_topology(topology);
    params.clip_distances = 4;
    params.blend = BlendState::alpha();
    params
}

/// Writes winding counts into the stencil buffer without touching color.
fn mask_params(program: ProgramHandle, vertex_array: VertexArrayHandle) -> PipelineParams {
    let mut params = base_params(program, vertex_array, Topology::TriangleFan);
    params.color_write = [false; 4];
    params.blend = BlendState::default();
    params.stencil.test = true;
    params.stencil.front = StencilFace {
        pass: StencilOp::IncrWrap,
        comparison: Comparison::Always,
        ..Default::default()
    };
    params.stencil.back = StencilFace {
        pass: StencilOp::DecrWrap,
        comparison: Comparison::Always,
        ..Default::default()
    };
    params
}

/// Paints where `stencil & compare_mask != 0` and resets those pixels to zero.
fn cover_params(
    program: ProgramHandle,
    vertex_array: VertexArrayHandle,
    compare_mask: u32,
) -> PipelineParams {
    let face = StencilFace {
        // Even counts fail the odd test; zero them as well.
        fail: StencilOp::Zero,
        depth_fail: StencilOp::Keep,
        pass: StencilOp::Replace,
        comparison: Comparison::NotEqual,
        reference: 0,
        compare_mask,
        write_mask: 0xFF,
    };

    let mut params = base_params(program, vertex_array, Topology::TriangleFan);
    params.stencil = StencilState {
        test: true,
        front: face,
        back: face,
    };
    params
}

pub struct Renderer {
    shapes: Mesh<ShapeVertex>,
    contours: Mesh<ContourVertex>,
    texts: Mesh<TextVertex>,
    shape_program: CanvasProgram,
    contour_program: CanvasProgram,
    text_program: CanvasProgram,
    pipelines: CanvasPipelines,
    white: TextureHandle,
    queue: CommandQueue,
    projection: Matrix4<f32>,
    guard: ResourceGuard,
}

impl Renderer {
    /// Creates the programs, pipelines and meshes of a renderer whose meshes
    /// hold `max_vertices` each. Nothing is left allocated if any of them
    /// fails.
    pub fn new(device: &mut Device, max_vertices: usize) -> Result<Self> {
        let mut guard = ResourceGuard::new();
        match Self::allocate(device, &mut guard, max_vertices) {
            Ok(mut v) => {
                v.guard = guard;
                debug!("Created canvas renderer with {} vertices per mesh.", max_vertices);
                Ok(v)
            }
            Err(err) => {
                guard.release(device)?;
                Err(err)
            }
        }
    }

    fn allocate(device: &mut Device, guard: &mut ResourceGuard, max_vertices: usize) -> Result<Self> {
        let shapes = Mesh::<ShapeVertex>::allocate(device, guard, max_vertices)?;
        let contours = Mesh::<ContourVertex>::allocate(device, guard, max_vertices)?;
        let texts = Mesh::<TextVertex>::allocate(device, guard, max_vertices)?;

        let shape_program = CanvasProgram::new(device, guard, &shaders::shape())?;
        let contour_program = CanvasProgram::new(device, guard, &shaders::contour())?;
        let text_program = CanvasProgram::new(device, guard, &shaders::text())?;

        let sp = shape_program.handle;
        let sva = shapes.vertex_array();
        let pipelines = CanvasPipelines {
            shape_triangles: guard.create_pipeline(device, base_params(sp, sva, Topology::Triangles))?,
            shape_fan: guard.create_pipeline(device, base_params(sp, sva, Topology::TriangleFan))?,
            shape_mask: guard.create_pipeline(device, mask_params(sp, sva))?,
            shape_nonzero: guard.create_pipeline(device, cover_params(sp, sva, 0xFF))?,
            shape_odd: guard.create_pipeline(device, cover_params(sp, sva, 0x01))?,
            contour: guard.create_pipeline(
                device,
                base_params(contour_program.handle, contours.vertex_array(), Topology::TriangleStrip),
            )?,
            text: guard.create_pipeline(
                device,
                base_params(text_program.handle, texts.vertex_array(), Topology::Triangles),
            )?,
        };

        let params = TextureParams {
            filter: TextureFilter::Nearest,
            ..TextureParams::new(TextureFormat::RGBA8, 1, 1)
        };

        let white = guard.create_texture(device, params, Some(&TextureData::TwoD(vec![255; 4])))?;

        Ok(Renderer {
            shapes,
            contours,
            texts,
            shape_program,
            contour_program,
            text_program,
            pipelines,
            white,
            queue: CommandQueue::new(),
            projection: Matrix4::identity(),
            guard: ResourceGuard::new(),
        })
    }

    /// Releases every GPU resource of this renderer.
    pub fn delete(mut self, device: &mut Device) -> Result<()> {
        self.guard.release(device)
    }

    #[inline]
    pub fn pipelines(&self) -> &CanvasPipelines {
        &self.pipelines
    }

    /// The commands recorded since `begin`.
    #[inline]
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    #[inline]
    pub fn shapes(&self) -> &Mesh<ShapeVertex> {
        &self.shapes
    }

    #[inline]
    pub fn contours(&self) -> &Mesh<ContourVertex> {
        &self.contours
    }

    #[inline]
    pub fn texts(&self) -> &Mesh<TextVertex> {
        &self.texts
    }

    /// Starts a frame of `size` logical pixels, with the origin at the top left
    /// corner and y pointing down.
    pub fn begin(&mut self, size: Vector2<f32>) {
        self.shapes.reset();
        self.contours.reset();
        self.texts.reset();
        self.queue.reset();
        self.projection = crate::math::ortho(0.0, size.x, size.y, 0.0, 0.0, 1.0);
    }

    /// Uploads the meshes and executes everything recorded since `begin` in
    /// the render pass described by `pass`.
    pub fn end(&mut self, device: &mut Device, pass: RenderPassInfo) -> Result<()> {
        self.shapes.update(device)?;
        self.contours.update(device)?;
        self.texts.update(device)?;

        device.begin_render_pass(pass)?;
        device.submit(&mut self.queue)?;
        device.end_render_pass()
    }

    fn bind(
        &mut self,
        pipeline: PipelineHandle,
        program: CanvasProgram,
        state: &DrawState,
        color: Color,
        texture: TextureHandle,
        texture_transform: &Matrix4<f32>,
    ) -> Result<()> {
        let u = program.uniforms;
        let clip = Vector4::new(state.clip.min.x, state.clip.max.x, state.clip.min.y, state.clip.max.y);

        self.queue.bind_pipeline(pipeline);
        self.queue.uniform_matrix_4f(u.projection, &self.projection)?;
        self.queue.uniform_matrix_4f(u.transform, &state.transform)?;
        self.queue.uniform_matrix_4f(u.texture_transform, texture_transform)?;
        self.queue.uniform_4f(u.clip_distances, clip)?;
        self.queue.uniform_4f(u.color, Vector4::new(color.r, color.g, color.b, color.a))?;
        self.queue.uniform_1i(u.texture, 0)?;
        self.queue.texture_unit(0, texture)
    }

    fn bind_fill(&mut self, pipeline: PipelineHandle, state: &DrawState, fill: &Fill) -> Result<()> {
        let (texture, transform) = match fill.image {
            Some(image) => (image.texture, image.transform),
            None => (self.white, Matrix4::identity()),
        };

        let program = self.shape_program;
        self.bind(pipeline, program, state, fill.color, texture, &transform)
    }

    /// Draws a list of independent triangles.
    pub fn fill_triangles(
        &mut self,
        state: &DrawState,
        vertices: &[Vector2<f32>],
        fill: &Fill,
    ) -> Result<()> {
        if vertices.len() < 3 {
            return Ok(());
        }

        let offset = self.shapes.offset();
        for &v in vertices {
            self.shapes.append(ShapeVertex { position: v })?;
        }

        let pipeline = self.pipelines.shape_triangles;
        self.bind_fill(pipeline, state, fill)?;
        self.queue.draw(offset, vertices.len() as u32, 1)
    }

    /// Fills every sub-shape of `shape` with its fill rule.
    pub fn fill_shape(&mut self, state: &DrawState, shape: &Shape) -> Result<()> {
        let base = self.shapes.offset();
        for &v in shape.path.points() {
            self.shapes.append(ShapeVertex { position: v })?;
        }

        let fans: Vec<(u32, u32)> = shape
            .path
            .sub_paths()
            .iter()
            .filter(|v| v.count >= 3)
            .map(|v| (base + v.offset as u32, v.count as u32))
            .collect();

        if fans.is_empty() {
            return Ok(());
        }

        let cover = match shape.fill.mode {
            FillMode::None => {
                let pipeline = self.pipelines.shape_fan;
                return self.draw_fans(pipeline, state, &shape.fill, &fans);
            }
            FillMode::NonZero => self.pipelines.shape_nonzero,
            FillMode::Odd => self.pipelines.shape_odd,
        };

        let mask = self.pipelines.shape_mask;
        self.draw_fans(mask, state, &shape.fill, &fans)?;
        self.draw_fans(cover, state, &shape.fill, &fans)
    }

    fn draw_fans(
        &mut self,
        pipeline: PipelineHandle,
        state: &DrawState,
        fill: &Fill,
        fans: &[(u32, u32)],
    ) -> Result<()> {
        self.bind_fill(pipeline, state, fill)?;
        for &(offset, count) in fans {
            self.queue.draw(offset, count, 1)?;
        }

        Ok(())
    }

    /// Strokes every sub-contour of `contour` with the per-point stroke sizes
    /// and colors.
    pub fn stroke_contour(&mut self, state: &DrawState, contour: &Contour) -> Result<()> {
        let mut strips = Vec::with_capacity(contour.sub_paths().len());
        for i in 0..contour.sub_paths().len() {
            let outline = path::stroke_outline(contour.sub_points(i));
            if outline.is_empty() {
                continue;
            }

            let offset = self.contours.offset();
            for &(position, color) in &outline {
                self.contours.append(ContourVertex {
                    position,
                    color: color.rgba8(),
                })?;
            }

            strips.push((offset, outline.len() as u32));
        }

        if strips.is_empty() {
            return Ok(());
        }

        let (pipeline, program, white) = (self.pipelines.contour, self.contour_program, self.white);
        self.bind(pipeline, program, state, Color::WHITE, white, &Matrix4::identity())?;
        for (offset, count) in strips {
            self.queue.draw(offset, count, 1)?;
        }

        Ok(())
    }

    /// Draws glyph quads sampling the R8 `atlas`, tinted with `color`.
    pub fn draw_text(
        &mut self,
        state: &DrawState,
        vertices: &[TextVertex],
        color: Color,
        atlas: TextureHandle,
    ) -> Result<()> {
        if vertices.is_empty() {
            return Ok(());
        }

        let offset = self.texts.offset();
        for &v in vertices {
            self.texts.append(v)?;
        }

        let (pipeline, program) = (self.pipelines.text, self.text_program);
        self.bind(pipeline, program, state, color, atlas, &Matrix4::identity())?;
        self.queue.draw(offset, vertices.len() as u32, 1)
    }
}

/// Clip rectangle covering `size`.
pub fn full_clip(size: Vector2<f32>) -> Aabb2<f32> {
    Aabb2::new(Point2::new(0.0, 0.0), Point2::new(size.x, size.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::path::Path;
    use crate::video::backends::headless::HeadlessVisitor;

    fn square() -> Shape {
        let mut shape = Shape::new(Fill::new(Color::GREEN, FillMode::Odd));
        shape.path.move_to(Vector2::new(0.0, 0.0));
        shape.path.line_to(Vector2::new(10.0, 0.0));
        shape.path.line_to(Vector2::new(10.0, 10.0));
        shape.path.close_loop();
        shape
    }

    fn draws(queue: &CommandQueue) -> Vec<(u32, u32)> {
        queue
            .commands()
            .iter()
            .filter_map(|v| match *v {
                Command::Draw { offset, count, .. } => Some((offset, count)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn odd_fill_masks_then_covers() {
        let mut device = Device::headless();
        let mut renderer = Renderer::new(&mut device, 1024).unwrap();
        let size = Vector2::new(64.0, 64.0);
        renderer.begin(size);

        renderer
            .fill_shape(&DrawState::new(full_clip(size)), &square())
            .unwrap();

        let binds: Vec<_> = renderer
            .queue()
            .commands()
            .iter()
            .filter_map(|v| match *v {
                Command::BindPipeline(h) => Some(h),
                _ => None,
            })
            .collect();

        let p = *renderer.pipelines();
        assert_eq!(binds, vec![p.shape_mask, p.shape_odd]);
        assert_eq!(draws(renderer.queue()), vec![(0, 4), (0, 4)]);

        let odd = device.pipeline(p.shape_odd).unwrap();
        assert_eq!(odd.stencil.front.compare_mask, 0x01);
        assert_eq!(odd.stencil.front.pass, StencilOp::Replace);

        let pass = RenderPassInfo::new(device.screen_framebuffer(), Viewport::with_size(64, 64))
            .clear_stencil(0);
        renderer.end(&mut device, pass).unwrap();
        assert!(renderer.queue().is_empty());
        assert_eq!(device.stats().draw_calls, 2);

        renderer.delete(&mut device).unwrap();
    }

    #[test]
    fn degenerate_sub_shapes_are_skipped() {
        let mut device = Device::headless();
        let mut renderer = Renderer::new(&mut device, 64).unwrap();
        renderer.begin(Vector2::new(8.0, 8.0));

        let mut shape = Shape::new(Fill::new(Color::RED, FillMode::NonZero));
        shape.path = Path::new();
        shape.path.move_to(Vector2::new(0.0, 0.0));
        shape.path.line_to(Vector2::new(1.0, 1.0));

        let state = DrawState::new(full_clip(Vector2::new(8.0, 8.0)));
        renderer.fill_shape(&state, &shape).unwrap();
        assert!(renderer.queue().is_empty());
        assert_eq!(renderer.shapes().offset(), 2);
    }

    #[test]
    fn failed_construction_releases_everything() {
        for limit in 0.. {
            assert!(limit < 64);

            let mut device = Device::new(Box::new(HeadlessVisitor::with_limit(limit)));
            match Renderer::new(&mut device, 16) {
                Ok(renderer) => {
                    assert!(device.live_resources() > 0);
                    renderer.delete(&mut device).unwrap();
                    assert_eq!(device.live_resources(), 0);
                    return;
                }
                Err(Error::Backend(_)) => assert_eq!(device.live_resources(), 0),
                Err(err) => panic!("unexpected {:?}", err),
            }
        }
    }
}
