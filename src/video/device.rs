//! The front-end of the GPU abstraction.
//!
//! `Device` owns every resource description in handle pools and validates each
//! call against the resource and recording rules before handing it to the
//! backend `Visitor`. It must only be used from the GPU thread.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::object_pool::ObjectPool;

use super::assets::prelude::*;
use super::backends::{self, Visitor};
use super::command::{Command, CommandQueue};
use super::pass::{RenderPassInfo, Viewport};

/// Counters of the current frame, reset by `Device::advance`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub passes: u32,
    pub pipeline_binds: u32,
    pub draw_calls: u32,
    pub vertices: u32,
}

pub struct Device {
    visitor: Box<dyn Visitor>,
    buffers: ObjectPool<BufferHandle, BufferParams>,
    textures: ObjectPool<TextureHandle, TextureParams>,
    shaders: ObjectPool<ShaderHandle, ShaderStage>,
    programs: ObjectPool<ProgramHandle, ProgramParams>,
    uniforms: HashMap<ProgramHandle, HashMap<String, UniformLocation>>,
    vertex_arrays: ObjectPool<VertexArrayHandle, VertexArrayParams>,
    framebuffers: ObjectPool<FramebufferHandle, FramebufferParams>,
    pipelines: ObjectPool<PipelineHandle, PipelineParams>,
    pass: Option<RenderPassInfo>,
    bound: Option<PipelineHandle>,
    stats: FrameStats,
}

impl Device {
    pub fn new(visitor: Box<dyn Visitor>) -> Self {
        Device {
            visitor,
            buffers: ObjectPool::new(),
            textures: ObjectPool::new(),
            shaders: ObjectPool::new(),
            programs: ObjectPool::new(),
            uniforms: HashMap::new(),
            vertex_arrays: ObjectPool::new(),
            framebuffers: ObjectPool::new(),
            pipelines: ObjectPool::new(),
            pass: None,
            bound: None,
            stats: FrameStats::default(),
        }
    }

    /// A device without a graphics context, see `backends::headless`.
    pub fn headless() -> Self {
        info!("Creating headless video device.");
        Device::new(backends::new_headless())
    }

    /// A device driving the OpenGL context that is current on this thread.
    pub unsafe fn gl<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const ::std::os::raw::c_void,
    {
        let visitor = backends::new_gl(loader)?;
        Ok(Device::new(visitor))
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// The number of resources of any kind that are alive.
    pub fn live_resources(&self) -> usize {
        self.buffers.len()
            + self.textures.len()
            + self.shaders.len()
            + self.programs.len()
            + self.vertex_arrays.len()
            + self.framebuffers.len()
            + self.pipelines.len()
    }

    /// Finishes the current frame.
    pub fn advance(&mut self) -> Result<()> {
        unsafe { self.visitor.advance()? };
        self.stats = FrameStats::default();
        Ok(())
    }

    /// Blocks until the backend has executed every submitted command.
    pub fn flush(&mut self) -> Result<()> {
        unsafe { self.visitor.flush() }
    }
}

impl Device {
    pub fn create_buffer(
        &mut self,
        params: BufferParams,
        data: Option<&[u8]>,
    ) -> Result<BufferHandle> {
        params.validate(data)?;

        let handle = self.buffers.create(params);
        if let Err(err) = unsafe { self.visitor.create_buffer(handle, &params, data) } {
            self.buffers.free(handle);
            return Err(err);
        }

        debug!("Created {} with {:?}.", handle, params);
        Ok(handle)
    }

    /// Writes `data` at byte `offset` of a dynamic buffer.
    pub fn update_buffer(&mut self, handle: BufferHandle, offset: usize, data: &[u8]) -> Result<()> {
        let params = self
            .buffers
            .get(handle)
            .ok_or(Invariant::ResourceReleased)?;

        params.validate_update(offset, data.len())?;
        if data.is_empty() {
            return Ok(());
        }

        unsafe { self.visitor.update_buffer(handle, offset, data) }
    }

    pub fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        if !self.buffers.contains(handle) {
            return Err(Invariant::ResourceAlreadyReleased.into());
        }

        unsafe { self.visitor.delete_buffer(handle)? };
        self.buffers.free(handle);
        debug!("Deleted {}.", handle);
        Ok(())
    }

    #[inline]
    pub fn buffer(&self, handle: BufferHandle) -> Option<&BufferParams> {
        self.buffers.get(handle)
    }
}

impl Device {
    pub fn create_texture(
        &mut self,
        params: TextureParams,
        data: Option<&TextureData>,
    ) -> Result<TextureHandle> {
        params.validate(data)?;

        let handle = self.textures.create(params);
        if let Err(err) = unsafe { self.visitor.create_texture(handle, &params, data) } {
            self.textures.free(handle);
            return Err(err);
        }

        debug!("Created {} with {:?}.", handle, params);
        Ok(handle)
    }

    pub fn generate_mipmaps(&mut self, handle: TextureHandle) -> Result<()> {
        if !self.textures.contains(handle) {
            return Err(Invariant::ResourceReleased.into());
        }

        unsafe { self.visitor.generate_mipmaps(handle) }
    }

    pub fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        if !self.textures.contains(handle) {
            return Err(Invariant::ResourceAlreadyReleased.into());
        }

        unsafe { self.visitor.delete_texture(handle)? };
        self.textures.free(handle);
        debug!("Deleted {}.", handle);
        Ok(())
    }

    #[inline]
    pub fn texture(&self, handle: TextureHandle) -> Option<&TextureParams> {
        self.textures.get(handle)
    }
}

impl Device {
    pub fn create_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderHandle> {
        let handle = self.shaders.create(stage);
        if let Err(err) = unsafe { self.visitor.create_shader(handle, stage, source) } {
            self.shaders.free(handle);
            return Err(err);
        }

        debug!("Created {} ({:?}).", handle, stage);
        Ok(handle)
    }

    pub fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        if !self.shaders.contains(handle) {
            return Err(Invariant::ResourceAlreadyReleased.into());
        }

        unsafe { self.visitor.delete_shader(handle)? };
        self.shaders.free(handle);
        Ok(())
    }

    pub fn create_program(&mut self, shaders: &[ShaderHandle]) -> Result<ProgramHandle> {
        if shaders.iter().any(|&v| !self.shaders.contains(v)) {
            return Err(Invariant::ResourceReleased.into());
        }

        let params = ProgramParams {
            shaders: shaders.iter().cloned().collect(),
        };

        let handle = self.programs.create(params);
        if let Err(err) = unsafe { self.visitor.create_program(handle, shaders) } {
            self.programs.free(handle);
            return Err(err);
        }

        self.uniforms.insert(handle, HashMap::new());
        debug!("Created {} from {} shaders.", handle, shaders.len());
        Ok(handle)
    }

    /// Compiles a vertex and a fragment stage and links them. The intermediate
    /// shader objects are released once the program is linked.
    pub fn create_render_program(&mut self, vs: &str, fs: &str) -> Result<ProgramHandle> {
        let vs = self.create_shader(ShaderStage::Vertex, vs)?;
        let fs = match self.create_shader(ShaderStage::Fragment, fs) {
            Ok(v) => v,
            Err(err) => {
                self.delete_shader(vs)?;
                return Err(err);
            }
        };

        let program = self.create_program(&[vs, fs]);
        self.delete_shader(vs)?;
        self.delete_shader(fs)?;
        program
    }

    /// Resolves a uniform of `program` by name. Unknown names yield
    /// `UniformLocation::NONE`.
    pub fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Result<UniformLocation> {
        if !self.programs.contains(program) {
            return Err(Invariant::ResourceReleased.into());
        }

        let cache = self
            .uniforms
            .get_mut(&program)
            .ok_or(Invariant::ResourceReleased)?;

        if let Some(&location) = cache.get(name) {
            return Ok(location);
        }

        let location = unsafe { self.visitor.uniform_location(program, name)? };
        cache.insert(name.to_owned(), location);
        Ok(location)
    }

    pub fn delete_program(&mut self, handle: ProgramHandle) -> Result<()> {
        if !self.programs.contains(handle) {
            return Err(Invariant::ResourceAlreadyReleased.into());
        }

        unsafe { self.visitor.delete_program(handle)? };
        self.programs.free(handle);
        self.uniforms.remove(&handle);
        debug!("Deleted {}.", handle);
        Ok(())
    }

    #[inline]
    pub fn program(&self, handle: ProgramHandle) -> Option<&ProgramParams> {
        self.programs.get(handle)
    }
}

impl Device {
    pub fn create_vertex_array(&mut self, params: VertexArrayParams) -> Result<VertexArrayHandle> {
        let released = params
            .attributes
            .iter()
            .map(|v| v.buffer)
            .chain(params.index_buffer)
            .any(|v| !self.buffers.contains(v));

        if released {
            return Err(Invariant::ResourceReleased.into());
        }

        let handle = self.vertex_arrays.create(params);
        let result = match self.vertex_arrays.get(handle) {
            Some(params) => unsafe { self.visitor.create_vertex_array(handle, params) },
            None => Err(Invariant::ResourceReleased.into()),
        };

        if let Err(err) = result {
            self.vertex_arrays.free(handle);
            return Err(err);
        }

        debug!("Created {}.", handle);
        Ok(handle)
    }

    pub fn delete_vertex_array(&mut self, handle: VertexArrayHandle) -> Result<()> {
        if !self.vertex_arrays.contains(handle) {
            return Err(Invariant::ResourceAlreadyReleased.into());
        }

        unsafe { self.visitor.delete_vertex_array(handle)? };
        self.vertex_arrays.free(handle);
        Ok(())
    }

    #[inline]
    pub fn vertex_array(&self, handle: VertexArrayHandle) -> Option<&VertexArrayParams> {
        self.vertex_arrays.get(handle)
    }
}

impl Device {
    /// Creates a framebuffer. Attachments must be alive, share one size, and
    /// have color formats on color slots and a depth format on the depth slot.
    pub fn create_framebuffer(&mut self, params: FramebufferParams) -> Result<FramebufferHandle> {
        self.validate_framebuffer(&params)?;

        let handle = self.framebuffers.create(params);
        let result = match self.framebuffers.get(handle) {
            Some(params) => unsafe { self.visitor.create_framebuffer(handle, params) },
            None => Err(Invariant::ResourceReleased.into()),
        };

        if let Err(err) = result {
            self.framebuffers.free(handle);
            return Err(err);
        }

        debug!("Created {}.", handle);
        Ok(handle)
    }

    fn validate_framebuffer(&self, params: &FramebufferParams) -> Result<()> {
        if params.colors.is_empty() && params.depth.is_none() {
            return Err(Error::FramebufferIncomplete("no attachments".into()));
        }

        let mut dimensions: SmallVec<[Vector2<u32>; 5]> = SmallVec::new();
        for (i, &color) in params.colors.iter().enumerate() {
            let texture = self
                .textures
                .get(color)
                .ok_or(Invariant::ResourceReleased)?;

            if texture.format.is_depth() || texture.kind != TextureKind::TwoD {
                let reason = format!("color attachment {} is not a 2D color texture", i);
                return Err(Error::FramebufferIncomplete(reason));
            }

            dimensions.push(texture.dimensions);
        }

        if let Some(depth) = params.depth {
            let texture = self
                .textures
                .get(depth)
                .ok_or(Invariant::ResourceReleased)?;

            if !texture.format.is_depth() {
                let reason = "depth attachment has a color format".to_owned();
                return Err(Error::FramebufferIncomplete(reason));
            }

            dimensions.push(texture.dimensions);
        }

        if dimensions.iter().any(|&v| v != dimensions[0]) {
            let reason = "attachments differ in size".to_owned();
            return Err(Error::FramebufferIncomplete(reason));
        }

        Ok(())
    }

    pub fn delete_framebuffer(&mut self, handle: FramebufferHandle) -> Result<()> {
        if handle.is_screen() || !self.framebuffers.contains(handle) {
            return Err(Invariant::ResourceAlreadyReleased.into());
        }

        unsafe { self.visitor.delete_framebuffer(handle)? };
        self.framebuffers.free(handle);
        debug!("Deleted {}.", handle);
        Ok(())
    }

    #[inline]
    pub fn framebuffer(&self, handle: FramebufferHandle) -> Option<&FramebufferParams> {
        self.framebuffers.get(handle)
    }

    /// The window framebuffer.
    #[inline]
    pub fn screen_framebuffer(&self) -> FramebufferHandle {
        FramebufferHandle::screen()
    }

    /// Size of the attachments of an offscreen framebuffer.
    pub fn framebuffer_dimensions(&self, handle: FramebufferHandle) -> Option<Vector2<u32>> {
        let params = self.framebuffers.get(handle)?;
        params
            .colors
            .first()
            .cloned()
            .or(params.depth)
            .and_then(|v| self.textures.get(v))
            .map(|v| v.dimensions)
    }
}

impl Device {
    pub fn create_pipeline(&mut self, params: PipelineParams) -> Result<PipelineHandle> {
        if !self.programs.contains(params.program) {
            return Err(Invariant::ResourceReleased.into());
        }

        if let Some(va) = params.vertex_array {
            if !self.vertex_arrays.contains(va) {
                return Err(Invariant::ResourceReleased.into());
            }
        }

        let handle = self.pipelines.create(params);
        if let Err(err) = unsafe { self.visitor.create_pipeline(handle, &params) } {
            self.pipelines.free(handle);
            return Err(err);
        }

        debug!("Created {}.", handle);
        Ok(handle)
    }

    pub fn delete_pipeline(&mut self, handle: PipelineHandle) -> Result<()> {
        if !self.pipelines.contains(handle) {
            return Err(Invariant::ResourceAlreadyReleased.into());
        }

        unsafe { self.visitor.delete_pipeline(handle)? };
        self.pipelines.free(handle);
        if self.bound == Some(handle) {
            self.bound = None;
        }

        Ok(())
    }

    /// The immutable state of a pipeline.
    #[inline]
    pub fn pipeline(&self, handle: PipelineHandle) -> Option<&PipelineParams> {
        self.pipelines.get(handle)
    }
}

impl Device {
    #[inline]
    pub fn is_in_render_pass(&self) -> bool {
        self.pass.is_some()
    }

    pub fn begin_render_pass(&mut self, info: RenderPassInfo) -> Result<()> {
        if self.pass.is_some() {
            self.abort_render_pass();
            return Err(Invariant::RenderPassNested.into());
        }

        if !info.framebuffer.is_screen() && !self.framebuffers.contains(info.framebuffer) {
            return Err(Invariant::ResourceReleased.into());
        }

        unsafe { self.visitor.begin_pass(&info)? };

        trace!("Begin render pass on {}.", info.framebuffer);
        self.pass = Some(info);
        self.bound = None;
        self.stats.passes += 1;
        Ok(())
    }

    /// Executes every command of `queue` in order and empties it. A failure
    /// aborts the active render pass.
    pub fn submit(&mut self, queue: &mut CommandQueue) -> Result<()> {
        trace!("Submit {} commands.", queue.len());

        let result = self.execute(queue.commands());
        queue.reset();

        if let Err(err) = result {
            self.abort_render_pass();
            return Err(err);
        }

        Ok(())
    }

    fn execute(&mut self, commands: &[Command]) -> Result<()> {
        if self.pass.is_none() {
            return Err(Invariant::RenderPassMissing.into());
        }

        for command in commands {
            match *command {
                Command::BindPipeline(handle) => {
                    if self.bound == Some(handle) {
                        continue;
                    }

                    let params = self
                        .pipelines
                        .get(handle)
                        .ok_or(Invariant::ResourceReleased)?;

                    unsafe { self.visitor.bind_pipeline(handle, params)? };
                    self.bound = Some(handle);
                    self.stats.pipeline_binds += 1;
                }

                Command::Uniform(location, ref value) => unsafe {
                    self.visitor.bind_uniform(location, value)?;
                },

                Command::TextureUnit(slot, texture) => {
                    if !self.textures.contains(texture) {
                        return Err(Invariant::ResourceReleased.into());
                    }

                    unsafe { self.visitor.bind_texture(slot, texture)? };
                }

                Command::Draw {
                    offset,
                    count,
                    instances,
                } => {
                    let params = self.bound_pipeline()?;
                    if params.vertex_array.is_none() {
                        return Err(Invariant::NoVertexArray.into());
                    }

                    let topology = params.topology;
                    unsafe { self.visitor.draw(topology, offset, count, instances)? };
                    self.stats.draw_calls += 1;
                    self.stats.vertices += count * instances;
                }

                Command::DrawIndexed {
                    offset,
                    count,
                    instances,
                } => {
                    let params = self.bound_pipeline()?;
                    let va = params.vertex_array.ok_or(Invariant::NoVertexArray)?;
                    let va = self
                        .vertex_arrays
                        .get(va)
                        .ok_or(Invariant::ResourceReleased)?;

                    if va.index_buffer.is_none() {
                        return Err(Invariant::NoIndexBuffer.into());
                    }

                    let topology = params.topology;
                    unsafe { self.visitor.draw_indexed(topology, offset, count, instances)? };
                    self.stats.draw_calls += 1;
                    self.stats.vertices += count * instances;
                }
            }
        }

        Ok(())
    }

    fn bound_pipeline(&self) -> Result<&PipelineParams> {
        let handle = self.bound.ok_or(Invariant::NoActivePipeline)?;
        let params = self
            .pipelines
            .get(handle)
            .ok_or(Invariant::ResourceReleased)?;

        Ok(params)
    }

    pub fn end_render_pass(&mut self) -> Result<()> {
        let info = self.pass.take().ok_or(Invariant::RenderPassMissing)?;
        self.bound = None;

        unsafe { self.visitor.end_pass()? };
        trace!("End render pass on {}.", info.framebuffer);
        Ok(())
    }

    /// Drops the active pass, if any, without resolving it.
    fn abort_render_pass(&mut self) {
        if let Some(info) = self.pass.take() {
            self.bound = None;
            warn!("Aborted render pass on {}.", info.framebuffer);
            if let Err(err) = unsafe { self.visitor.end_pass() } {
                warn!("Failed to unbind aborted render pass: {}", err);
            }
        }
    }
}

impl Device {
    /// Copies color attachment 0 of `framebuffer` into level 0 of `texture`. The
    /// copied area is the size of `texture`.
    pub fn copy_to_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        texture: TextureHandle,
    ) -> Result<()> {
        if !framebuffer.is_screen() && !self.framebuffers.contains(framebuffer) {
            return Err(Invariant::ResourceReleased.into());
        }

        let dimensions = self
            .textures
            .get(texture)
            .ok_or(Invariant::ResourceReleased)?
            .dimensions;

        unsafe {
            self.visitor
                .copy_to_texture(framebuffer, texture, dimensions.x, dimensions.y)
        }
    }

    /// Reads back an area of color attachment 0. The bytes are laid out row by
    /// row from the bottom, in the format of the attachment.
    pub fn read_pixels(&mut self, framebuffer: FramebufferHandle, area: Viewport) -> Result<Vec<u8>> {
        let format = if framebuffer.is_screen() {
            TextureFormat::RGBA8
        } else {
            let params = self
                .framebuffers
                .get(framebuffer)
                .ok_or(Invariant::ResourceReleased)?;

            params
                .colors
                .first()
                .and_then(|&v| self.textures.get(v))
                .map(|v| v.format)
                .ok_or_else(|| Error::FramebufferIncomplete("no color attachment".into()))?
        };

        let len = area.width as usize * area.height as usize * format.size();
        let mut out = vec![0u8; len];
        unsafe {
            self.visitor
                .read_pixels(framebuffer, area, format, &mut out)?
        };

        Ok(out)
    }
}
