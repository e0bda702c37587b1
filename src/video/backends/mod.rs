//! The backend of the video module. A backend is responsible for one thing only:
//! translating validated resource and command calls into a graphics API.
//!
//! All front-end validation happens in `Device`; a backend may assume handles it
//! receives are alive unless stated otherwise.

pub mod headless;
pub mod utils;

pub mod gl;

use super::assets::prelude::*;
use super::command::UniformValue;
use super::pass::{RenderPassInfo, Viewport};

use crate::errors::*;

pub trait Visitor {
    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: &BufferParams,
        data: Option<&[u8]>,
    ) -> Result<()>;

    unsafe fn update_buffer(&mut self, handle: BufferHandle, offset: usize, data: &[u8])
        -> Result<()>;

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()>;

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: &TextureParams,
        data: Option<&TextureData>,
    ) -> Result<()>;

    unsafe fn generate_mipmaps(&mut self, handle: TextureHandle) -> Result<()>;

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()>;

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()>;

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()>;

    unsafe fn create_program(&mut self, handle: ProgramHandle, shaders: &[ShaderHandle])
        -> Result<()>;

    /// Looks up a uniform, returning `UniformLocation::NONE` if it does not exist.
    unsafe fn uniform_location(&mut self, handle: ProgramHandle, name: &str)
        -> Result<UniformLocation>;

    unsafe fn delete_program(&mut self, handle: ProgramHandle) -> Result<()>;

    unsafe fn create_vertex_array(
        &mut self,
        handle: VertexArrayHandle,
        params: &VertexArrayParams,
    ) -> Result<()>;

    unsafe fn delete_vertex_array(&mut self, handle: VertexArrayHandle) -> Result<()>;

    unsafe fn create_framebuffer(
        &mut self,
        handle: FramebufferHandle,
        params: &FramebufferParams,
    ) -> Result<()>;

    unsafe fn delete_framebuffer(&mut self, handle: FramebufferHandle) -> Result<()>;

    unsafe fn create_pipeline(&mut self, handle: PipelineHandle, params: &PipelineParams)
        -> Result<()>;

    unsafe fn delete_pipeline(&mut self, handle: PipelineHandle) -> Result<()>;

    /// Binds the target of `info`, sets viewport and scissor and performs the
    /// clear load operations.
    unsafe fn begin_pass(&mut self, info: &RenderPassInfo) -> Result<()>;

    unsafe fn bind_pipeline(&mut self, handle: PipelineHandle, params: &PipelineParams)
        -> Result<()>;

    unsafe fn bind_uniform(&mut self, location: UniformLocation, value: &UniformValue)
        -> Result<()>;

    unsafe fn bind_texture(&mut self, slot: u32, handle: TextureHandle) -> Result<()>;

    unsafe fn draw(&mut self, topology: Topology, offset: u32, count: u32, instances: u32)
        -> Result<()>;

    unsafe fn draw_indexed(
        &mut self,
        topology: Topology,
        offset: u32,
        count: u32,
        instances: u32,
    ) -> Result<()>;

    unsafe fn end_pass(&mut self) -> Result<()>;

    /// Copies color attachment 0 of `framebuffer` into level 0 of `texture`.
    unsafe fn copy_to_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        texture: TextureHandle,
        width: u32,
        height: u32,
    ) -> Result<()>;

    /// Reads the pixels of color attachment 0 within `area` into `out`.
    unsafe fn read_pixels(
        &mut self,
        framebuffer: FramebufferHandle,
        area: Viewport,
        format: TextureFormat,
        out: &mut [u8],
    ) -> Result<()>;

    /// Blocks until all submitted work is complete.
    unsafe fn flush(&mut self) -> Result<()>;

    /// Advance one frame, it will be called every frames.
    unsafe fn advance(&mut self) -> Result<()>;
}

/// Creates the OpenGL 4.6 core backend. `loader` resolves GL symbols of the
/// context that is current on this thread, and must stay so for the lifetime of
/// the backend.
pub unsafe fn new_gl<F>(loader: F) -> Result<Box<dyn Visitor>>
where
    F: FnMut(&'static str) -> *const ::std::os::raw::c_void,
{
    ::gl::load_with(loader);
    let visitor = self::gl::visitor::GLVisitor::new()?;
    Ok(Box::new(visitor))
}

pub fn new_headless() -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new())
}
