//! A backend without a graphics context. It keeps enough bookkeeping to behave
//! like a real driver towards the front-end: slots must be vacant on create and
//! occupied on delete, programs resolve the uniforms their sources declare, and
//! read-backs yield zeroed pixels.
//!
//! A limit on the number of live resources can be set to simulate a driver
//! running out of memory.

use std::collections::HashMap;

use super::super::assets::prelude::*;
use super::super::command::UniformValue;
use super::super::pass::{RenderPassInfo, Viewport};
use super::utils::DataVec;
use super::Visitor;

use crate::errors::*;

#[derive(Default)]
pub struct HeadlessVisitor {
    buffers: DataVec<BufferParams>,
    textures: DataVec<TextureParams>,
    shaders: DataVec<String>,
    programs: DataVec<HashMap<String, i32>>,
    vertex_arrays: DataVec<()>,
    framebuffers: DataVec<()>,
    pipelines: DataVec<()>,
    live: usize,
    limit: Option<usize>,
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        Default::default()
    }

    /// A backend that refuses to create anything while `limit` resources are
    /// alive.
    pub fn with_limit(limit: usize) -> Self {
        HeadlessVisitor {
            limit: Some(limit),
            ..Default::default()
        }
    }

    fn allocate<F>(&mut self, create: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if let Some(limit) = self.limit {
            if self.live >= limit {
                return Err(Error::Backend(format!(
                    "out of memory with {} resources alive",
                    self.live
                )));
            }
        }

        create(self)?;
        self.live += 1;
        Ok(())
    }

    fn deallocate<T>(&mut self, result: Result<T>) -> Result<()> {
        result?;
        self.live -= 1;
        Ok(())
    }
}

/// Collects the names of `uniform` declarations, in source order.
pub fn parse_uniforms(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in source.lines() {
        let line = line.split("//").next().unwrap_or("");
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if !tokens.contains(&"uniform") {
            continue;
        }

        if let Some(last) = tokens.last() {
            let name = last.trim_end_matches(';');
            let name = name.split('[').next().unwrap_or(name);
            if !name.is_empty() && name != "uniform" {
                names.push(name.to_owned());
            }
        }
    }

    names
}

impl Visitor for HeadlessVisitor {
    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: &BufferParams,
        _: Option<&[u8]>,
    ) -> Result<()> {
        self.allocate(|v| v.buffers.create(handle, *params))
    }

    unsafe fn update_buffer(&mut self, handle: BufferHandle, _: usize, _: &[u8]) -> Result<()> {
        self.buffers.get_or_released(handle).map(|_| ())
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        let result = self.buffers.free(handle);
        self.deallocate(result)
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: &TextureParams,
        _: Option<&TextureData>,
    ) -> Result<()> {
        self.allocate(|v| v.textures.create(handle, *params))
    }

    unsafe fn generate_mipmaps(&mut self, handle: TextureHandle) -> Result<()> {
        self.textures.get_or_released(handle).map(|_| ())
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        let result = self.textures.free(handle);
        self.deallocate(result)
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        _: ShaderStage,
        source: &str,
    ) -> Result<()> {
        self.allocate(|v| v.shaders.create(handle, source.to_owned()))
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let result = self.shaders.free(handle);
        self.deallocate(result)
    }

    unsafe fn create_program(
        &mut self,
        handle: ProgramHandle,
        shaders: &[ShaderHandle],
    ) -> Result<()> {
        let mut uniforms = HashMap::new();
        for &shader in shaders {
            for name in parse_uniforms(self.shaders.get_or_released(shader)?) {
                let next = uniforms.len() as i32;
                uniforms.entry(name).or_insert(next);
            }
        }

        self.allocate(|v| v.programs.create(handle, uniforms))
    }

    unsafe fn uniform_location(
        &mut self,
        handle: ProgramHandle,
        name: &str,
    ) -> Result<UniformLocation> {
        let uniforms = self.programs.get_or_released(handle)?;
        Ok(uniforms
            .get(name)
            .map(|&v| UniformLocation::new(v))
            .unwrap_or(UniformLocation::NONE))
    }

    unsafe fn delete_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let result = self.programs.free(handle);
        self.deallocate(result)
    }

    unsafe fn create_vertex_array(
        &mut self,
        handle: VertexArrayHandle,
        _: &VertexArrayParams,
    ) -> Result<()> {
        self.allocate(|v| v.vertex_arrays.create(handle, ()))
    }

    unsafe fn delete_vertex_array(&mut self, handle: VertexArrayHandle) -> Result<()> {
        let result = self.vertex_arrays.free(handle);
        self.deallocate(result)
    }

    unsafe fn create_framebuffer(
        &mut self,
        handle: FramebufferHandle,
        _: &FramebufferParams,
    ) -> Result<()> {
        self.allocate(|v| v.framebuffers.create(handle, ()))
    }

    unsafe fn delete_framebuffer(&mut self, handle: FramebufferHandle) -> Result<()> {
        let result = self.framebuffers.free(handle);
        self.deallocate(result)
    }

    unsafe fn create_pipeline(&mut self, handle: PipelineHandle, _: &PipelineParams) -> Result<()> {
        self.allocate(|v| v.pipelines.create(handle, ()))
    }

    unsafe fn delete_pipeline(&mut self, handle: PipelineHandle) -> Result<()> {
        let result = self.pipelines.free(handle);
        self.deallocate(result)
    }

    unsafe fn begin_pass(&mut self, _: &RenderPassInfo) -> Result<()> {
        Ok(())
    }

    unsafe fn bind_pipeline(&mut self, _: PipelineHandle, _: &PipelineParams) -> Result<()> {
        Ok(())
    }

    unsafe fn bind_uniform(&mut self, _: UniformLocation, _: &UniformValue) -> Result<()> {
        Ok(())
    }

    unsafe fn bind_texture(&mut self, _: u32, _: TextureHandle) -> Result<()> {
        Ok(())
    }

    unsafe fn draw(&mut self, _: Topology, _: u32, _: u32, _: u32) -> Result<()> {
        Ok(())
    }

    unsafe fn draw_indexed(&mut self, _: Topology, _: u32, _: u32, _: u32) -> Result<()> {
        Ok(())
    }

    unsafe fn end_pass(&mut self) -> Result<()> {
        Ok(())
    }

    unsafe fn copy_to_texture(
        &mut self,
        _: FramebufferHandle,
        _: TextureHandle,
        _: u32,
        _: u32,
    ) -> Result<()> {
        Ok(())
    }

    unsafe fn read_pixels(
        &mut self,
        _: FramebufferHandle,
        _: Viewport,
        _: TextureFormat,
        out: &mut [u8],
    ) -> Result<()> {
        for v in out.iter_mut() {
            *v = 0;
        }

        Ok(())
    }

    unsafe fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    unsafe fn advance(&mut self) -> Result<()> {
        Ok(())
    }
}
