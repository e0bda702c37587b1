use super::assets::prelude::*;
use super::device::Device;

use crate::errors::*;

/// Remembers the resources created through it and releases them together.
///
/// Resources are released in reverse creation order so that dependants (say a
/// pipeline) go before what they reference (its vertex array and program).
#[derive(Debug, Default)]
pub struct ResourceGuard {
    stack: Vec<Resource>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Buffer(BufferHandle),
    Texture(TextureHandle),
    Program(ProgramHandle),
    VertexArray(VertexArrayHandle),
    Framebuffer(FramebufferHandle),
    Pipeline(PipelineHandle),
}

macro_rules! impl_resource {
    ($handle:ident, $variant:ident) => {
        impl From<$handle> for Resource {
            fn from(handle: $handle) -> Resource {
                Resource::$variant(handle)
            }
        }
    };
}

impl_resource!(BufferHandle, Buffer);
impl_resource!(TextureHandle, Texture);
impl_resource!(ProgramHandle, Program);
impl_resource!(VertexArrayHandle, VertexArray);
impl_resource!(FramebufferHandle, Framebuffer);
impl_resource!(PipelineHandle, Pipeline);

impl ResourceGuard {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Takes ownership of a resource created elsewhere.
    pub fn push<T>(&mut self, resource: T) -> T
    where
        T: Copy + Into<Resource>,
    {
        self.stack.push(resource.into());
        resource
    }

    #[inline]
    pub fn create_buffer(
        &mut self,
        device: &mut Device,
        params: BufferParams,
        data: Option<&[u8]>,
    ) -> Result<BufferHandle> {
        let v = device.create_buffer(params, data)?;
        Ok(self.push(v))
    }

    #[inline]
    pub fn create_texture(
        &mut self,
        device: &mut Device,
        params: TextureParams,
        data: Option<&TextureData>,
    ) -> Result<TextureHandle> {
        let v = device.create_texture(params, data)?;
        Ok(self.push(v))
    }

    #[inline]
    pub fn create_render_program(
        &mut self,
        device: &mut Device,
        vs: &str,
        fs: &str,
    ) -> Result<ProgramHandle> {
        let v = device.create_render_program(vs, fs)?;
        Ok(self.push(v))
    }

    #[inline]
    pub fn create_vertex_array(
        &mut self,
        device: &mut Device,
        params: VertexArrayParams,
    ) -> Result<VertexArrayHandle> {
        let v = device.create_vertex_array(params)?;
        Ok(self.push(v))
    }

    #[inline]
    pub fn create_framebuffer(
        &mut self,
        device: &mut Device,
        params: FramebufferParams,
    ) -> Result<FramebufferHandle> {
        let v = device.create_framebuffer(params)?;
        Ok(self.push(v))
    }

    #[inline]
    pub fn create_pipeline(
        &mut self,
        device: &mut Device,
        params: PipelineParams,
    ) -> Result<PipelineHandle> {
        let v = device.create_pipeline(params)?;
        Ok(self.push(v))
    }

    /// Stops tracking every resource without releasing it.
    pub fn forget(&mut self) {
        self.stack.clear();
    }

    /// Releases every resource held by this guard. All of them are attempted
    /// even if one fails; the first error is returned.
    pub fn release(&mut self, device: &mut Device) -> Result<()> {
        let mut result = Ok(());
        while let Some(v) = self.stack.pop() {
            let r = match v {
                Resource::Buffer(h) => device.delete_buffer(h),
                Resource::Texture(h) => device.delete_texture(h),
                Resource::Program(h) => device.delete_program(h),
                Resource::VertexArray(h) => device.delete_vertex_array(h),
                Resource::Framebuffer(h) => device.delete_framebuffer(h),
                Resource::Pipeline(h) => device.delete_pipeline(h),
            };

            if result.is_ok() {
                result = r;
            }
        }

        result
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        if !self.stack.is_empty() {
            warn!(
                "ResourceGuard dropped while still holding {} resources.",
                self.stack.len()
            );
        }
    }
}
