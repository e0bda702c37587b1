use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

use gl;
use gl::types::*;

use crate::errors::*;

use super::super::super::assets::prelude::*;
use super::super::super::command::UniformValue;
use super::super::super::pass::{RenderPassInfo, Viewport};
use super::super::utils::DataVec;
use super::super::Visitor;
use super::capabilities::Capabilities;
use super::types;

#[derive(Debug, Copy, Clone)]
struct GLBuffer {
    id: GLuint,
    dynamic: bool,
}

#[derive(Debug, Copy, Clone)]
struct GLTexture {
    id: GLuint,
    target: GLenum,
    format: TextureFormat,
}

#[derive(Debug, Copy, Clone)]
struct GLPipeline {
    program: GLuint,
    vao: GLuint,
    params: PipelineParams,
}

pub struct GLVisitor {
    capabilities: Capabilities,
    buffers: DataVec<GLBuffer>,
    textures: DataVec<GLTexture>,
    shaders: DataVec<GLuint>,
    programs: DataVec<GLuint>,
    vertex_arrays: DataVec<GLuint>,
    framebuffers: DataVec<GLuint>,
    pipelines: DataVec<GLPipeline>,
    clip_distances: u8,
}

impl GLVisitor {
    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);
        capabilities.check()?;

        gl::PixelStorei(gl::UNPACK_ALIGNMENT, 1);
        gl::PixelStorei(gl::PACK_ALIGNMENT, 1);
        gl::Enable(gl::TEXTURE_CUBE_MAP_SEAMLESS);
        check()?;

        Ok(GLVisitor {
            capabilities,
            buffers: DataVec::new(),
            textures: DataVec::new(),
            shaders: DataVec::new(),
            programs: DataVec::new(),
            vertex_arrays: DataVec::new(),
            framebuffers: DataVec::new(),
            pipelines: DataVec::new(),
            clip_distances: 0,
        })
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn framebuffer_id(&self, handle: FramebufferHandle) -> Result<GLuint> {
        if handle.is_screen() {
            Ok(0)
        } else {
            self.framebuffers.get_or_released(handle).map(|v| *v)
        }
    }
}

impl Visitor for GLVisitor {
    unsafe fn create_buffer(
        &mut self,
        handle: BufferHandle,
        params: &BufferParams,
        data: Option<&[u8]>,
    ) -> Result<()> {
        let mut id = 0;
        gl::GenBuffers(1, &mut id);

        let usage = if params.dynamic {
            gl::DYNAMIC_DRAW
        } else {
            gl::STATIC_DRAW
        };

        gl::BindBuffer(gl::COPY_WRITE_BUFFER, id);
        gl::BufferData(
            gl::COPY_WRITE_BUFFER,
            params.size as GLsizeiptr,
            ptr::null(),
            usage,
        );

        if let Some(bytes) = data.filter(|v| !v.is_empty()) {
            gl::BufferSubData(
                gl::COPY_WRITE_BUFFER,
                0,
                bytes.len() as GLsizeiptr,
                bytes.as_ptr() as *const c_void,
            );
        }

        gl::BindBuffer(gl::COPY_WRITE_BUFFER, 0);
        if let Err(err) = check() {
            gl::DeleteBuffers(1, &id);
            return Err(err);
        }

        self.buffers.create(
            handle,
            GLBuffer {
                id,
                dynamic: params.dynamic,
            },
        )
    }

    unsafe fn update_buffer(
        &mut self,
        handle: BufferHandle,
        offset: usize,
        data: &[u8],
    ) -> Result<()> {
        let buffer = *self.buffers.get_or_released(handle)?;
        if !buffer.dynamic {
            return Err(Invariant::ImmutableBuffer.into());
        }

        gl::BindBuffer(gl::COPY_WRITE_BUFFER, buffer.id);
        gl::BufferSubData(
            gl::COPY_WRITE_BUFFER,
            offset as GLintptr,
            data.len() as GLsizeiptr,
            data.as_ptr() as *const c_void,
        );

        gl::BindBuffer(gl::COPY_WRITE_BUFFER, 0);
        check()
    }

    unsafe fn delete_buffer(&mut self, handle: BufferHandle) -> Result<()> {
        let buffer = self.buffers.free(handle)?;
        gl::DeleteBuffers(1, &buffer.id);
        check()
    }

    unsafe fn create_texture(
        &mut self,
        handle: TextureHandle,
        params: &TextureParams,
        data: Option<&TextureData>,
    ) -> Result<()> {
        let target = match params.kind {
            TextureKind::TwoD => gl::TEXTURE_2D,
            TextureKind::Cube => gl::TEXTURE_CUBE_MAP,
        };

        let (internal, format, tp) = types::texture_format(params.format);
        let (w, h) = (params.dimensions.x as GLsizei, params.dimensions.y as GLsizei);

        let mut id = 0;
        gl::GenTextures(1, &mut id);
        gl::BindTexture(target, id);
        gl::TexStorage2D(target, params.levels() as GLsizei, internal, w, h);

        let upload = |target: GLenum, bytes: &[u8]| {
            if !bytes.is_empty() {
                gl::TexSubImage2D(
                    target,
                    0,
                    0,
                    0,
                    w,
                    h,
                    format,
                    tp,
                    bytes.as_ptr() as *const c_void,
                );
            }
        };

        match data {
            Some(TextureData::TwoD(bytes)) => upload(gl::TEXTURE_2D, bytes),
            Some(TextureData::Cube(cube)) => {
                for (i, bytes) in cube.faces().iter().enumerate() {
                    upload(gl::TEXTURE_CUBE_MAP_POSITIVE_X + i as GLenum, bytes);
                }
            }
            None => {}
        }

        Self::bind_texture_params(target, params)?;
        if params.mipmap && data.is_some() {
            gl::GenerateMipmap(target);
        }

        gl::BindTexture(target, 0);
        if let Err(err) = check() {
            gl::DeleteTextures(1, &id);
            return Err(err);
        }

        self.textures.create(
            handle,
            GLTexture {
                id,
                target,
                format: params.format,
            },
        )
    }

    unsafe fn generate_mipmaps(&mut self, handle: TextureHandle) -> Result<()> {
        let texture = *self.textures.get_or_released(handle)?;
        gl::BindTexture(texture.target, texture.id);
        gl::GenerateMipmap(texture.target);
        gl::BindTexture(texture.target, 0);
        check()
    }

    unsafe fn delete_texture(&mut self, handle: TextureHandle) -> Result<()> {
        let texture = self.textures.free(handle)?;
        gl::DeleteTextures(1, &texture.id);
        check()
    }

    unsafe fn create_shader(
        &mut self,
        handle: ShaderHandle,
        stage: ShaderStage,
        source: &str,
    ) -> Result<()> {
        let id = Self::compile(stage.into(), source)?;
        self.shaders.create(handle, id)
    }

    unsafe fn delete_shader(&mut self, handle: ShaderHandle) -> Result<()> {
        let id = self.shaders.free(handle)?;
        gl::DeleteShader(id);
        check()
    }

    unsafe fn create_program(
        &mut self,
        handle: ProgramHandle,
        shaders: &[ShaderHandle],
    ) -> Result<()> {
        let mut ids = Vec::with_capacity(shaders.len());
        for &v in shaders {
            ids.push(*self.shaders.get_or_released(v)?);
        }

        let id = Self::link(&ids)?;
        self.programs.create(handle, id)
    }

    unsafe fn uniform_location(
        &mut self,
        handle: ProgramHandle,
        name: &str,
    ) -> Result<UniformLocation> {
        let id = *self.programs.get_or_released(handle)?;
        let c_name = CString::new(name.as_bytes())
            .map_err(|_| Error::Backend(format!("uniform name {:?} contains NUL", name)))?;

        let location = gl::GetUniformLocation(id, c_name.as_ptr());
        check()?;
        Ok(UniformLocation::new(location))
    }

    unsafe fn delete_program(&mut self, handle: ProgramHandle) -> Result<()> {
        let id = self.programs.free(handle)?;
        gl::DeleteProgram(id);
        check()
    }

    unsafe fn create_vertex_array(
        &mut self,
        handle: VertexArrayHandle,
        params: &VertexArrayParams,
    ) -> Result<()> {
        let mut id = 0;
        gl::GenVertexArrays(1, &mut id);
        gl::BindVertexArray(id);

        for v in &params.attributes {
            let buffer = self.buffers.get_or_released(v.buffer)?;
            gl::BindBuffer(gl::ARRAY_BUFFER, buffer.id);
            gl::EnableVertexAttribArray(v.location);
            gl::VertexAttribPointer(
                v.location,
                GLint::from(v.components),
                v.format.into(),
                if v.normalized { gl::TRUE } else { gl::FALSE },
                v.stride as GLsizei,
                v.offset as usize as *const c_void,
            );
        }

        if let Some(ib) = params.index_buffer {
            let buffer = self.buffers.get_or_released(ib)?;
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, buffer.id);
        }

        gl::BindVertexArray(0);
        gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        if let Err(err) = check() {
            gl::DeleteVertexArrays(1, &id);
            return Err(err);
        }

        self.vertex_arrays.create(handle, id)
    }

    unsafe fn delete_vertex_array(&mut self, handle: VertexArrayHandle) -> Result<()> {
        let id = self.vertex_arrays.free(handle)?;
        gl::DeleteVertexArrays(1, &id);
        check()
    }

    unsafe fn create_framebuffer(
        &mut self,
        handle: FramebufferHandle,
        params: &FramebufferParams,
    ) -> Result<()> {
        let mut id = 0;
        gl::GenFramebuffers(1, &mut id);
        gl::BindFramebuffer(gl::FRAMEBUFFER, id);

        let mut buffers = Vec::with_capacity(params.colors.len());
        for (i, &v) in params.colors.iter().enumerate() {
            let texture = self.textures.get_or_released(v)?;
            let location = gl::COLOR_ATTACHMENT0 + i as GLenum;
            gl::FramebufferTexture2D(gl::FRAMEBUFFER, location, gl::TEXTURE_2D, texture.id, 0);
            buffers.push(location);
        }

        if let Some(v) = params.depth {
            let texture = self.textures.get_or_released(v)?;
            gl::FramebufferTexture2D(
                gl::FRAMEBUFFER,
                types::depth_attachment(texture.format),
                gl::TEXTURE_2D,
                texture.id,
                0,
            );
        }

        if buffers.is_empty() {
            gl::DrawBuffer(gl::NONE);
            gl::ReadBuffer(gl::NONE);
        } else {
            gl::DrawBuffers(buffers.len() as GLsizei, buffers.as_ptr());
        }

        let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        if status != gl::FRAMEBUFFER_COMPLETE {
            gl::DeleteFramebuffers(1, &id);
            return Err(Error::FramebufferIncomplete(
                framebuffer_status(status).to_owned(),
            ));
        }

        check()?;
        self.framebuffers.create(handle, id)
    }

    unsafe fn delete_framebuffer(&mut self, handle: FramebufferHandle) -> Result<()> {
        let id = self.framebuffers.free(handle)?;
        gl::DeleteFramebuffers(1, &id);
        check()
    }

    unsafe fn create_pipeline(&mut self, handle: PipelineHandle, params: &PipelineParams) -> Result<()> {
        let program = *self.programs.get_or_released(params.program)?;
        let vao = match params.vertex_array {
            Some(v) => *self.vertex_arrays.get_or_released(v)?,
            None => 0,
        };

        self.pipelines.create(
            handle,
            GLPipeline {
                program,
                vao,
                params: *params,
            },
        )
    }

    unsafe fn delete_pipeline(&mut self, handle: PipelineHandle) -> Result<()> {
        self.pipelines.free(handle).map(|_| ())
    }

    unsafe fn begin_pass(&mut self, info: &RenderPassInfo) -> Result<()> {
        let id = self.framebuffer_id(info.framebuffer)?;
        gl::BindFramebuffer(gl::FRAMEBUFFER, id);

        let vp = info.viewport;
        gl::Viewport(vp.x, vp.y, vp.width as GLsizei, vp.height as GLsizei);

        match info.scissor {
            Some(v) => {
                gl::Enable(gl::SCISSOR_TEST);
                gl::Scissor(v.x, v.y, v.width as GLsizei, v.height as GLsizei);
            }
            None => gl::Disable(gl::SCISSOR_TEST),
        }

        let mut bits = 0;
        if let Some(v) = info.color.load.clear_value() {
            bits |= gl::COLOR_BUFFER_BIT;
            gl::ColorMask(gl::TRUE, gl::TRUE, gl::TRUE, gl::TRUE);
            gl::ClearColor(v.r, v.g, v.b, v.a);
        }

        if let Some(v) = info.depth.load.clear_value() {
            bits |= gl::DEPTH_BUFFER_BIT;
            gl::DepthMask(gl::TRUE);
            gl::ClearDepth(f64::from(v));
        }

        if let Some(v) = info.stencil.load.clear_value() {
            bits |= gl::STENCIL_BUFFER_BIT;
            gl::StencilMask(0xFF);
            gl::ClearStencil(v);
        }

        if bits != 0 {
            gl::Clear(bits);
        }

        check()
    }

    unsafe fn bind_pipeline(&mut self, handle: PipelineHandle, _: &PipelineParams) -> Result<()> {
        let pipeline = *self.pipelines.get_or_released(handle)?;
        let params = &pipeline.params;

        gl::UseProgram(pipeline.program);
        gl::BindVertexArray(pipeline.vao);

        match Option::<GLenum>::from(params.culling) {
            Some(face) => {
                gl::Enable(gl::CULL_FACE);
                gl::CullFace(face);
            }
            None => gl::Disable(gl::CULL_FACE),
        }

        gl::FrontFace(params.front_face.into());
        gl::LineWidth(params.line_width);

        if params.depth.test {
            gl::Enable(gl::DEPTH_TEST);
            gl::DepthFunc(params.depth.comparison.into());
        } else {
            gl::Disable(gl::DEPTH_TEST);
        }

        gl::DepthMask(if params.depth.write { gl::TRUE } else { gl::FALSE });

        if params.stencil.test {
            gl::Enable(gl::STENCIL_TEST);
            for &(face, ref v) in &[
                (gl::FRONT, params.stencil.front),
                (gl::BACK, params.stencil.back),
            ] {
                gl::StencilFuncSeparate(face, v.comparison.into(), v.reference, v.compare_mask);
                gl::StencilOpSeparate(face, v.fail.into(), v.depth_fail.into(), v.pass.into());
                gl::StencilMaskSeparate(face, v.write_mask);
            }
        } else {
            gl::Disable(gl::STENCIL_TEST);
        }

        let mask = |v: bool| if v { gl::TRUE } else { gl::FALSE };
        let cw = params.color_write;
        gl::ColorMask(mask(cw[0]), mask(cw[1]), mask(cw[2]), mask(cw[3]));

        let blend = &params.blend;
        if blend.enabled {
            gl::Enable(gl::BLEND);
            gl::BlendFuncSeparate(
                blend.src_color.into(),
                blend.dst_color.into(),
                blend.src_alpha.into(),
                blend.dst_alpha.into(),
            );
            gl::BlendEquationSeparate(blend.op_color.into(), blend.op_alpha.into());
            let c = blend.constant;
            gl::BlendColor(c.r, c.g, c.b, c.a);
        } else {
            gl::Disable(gl::BLEND);
        }

        if self.clip_distances != params.clip_distances {
            for i in 0..8u8 {
                if i < params.clip_distances {
                    gl::Enable(gl::CLIP_DISTANCE0 + GLenum::from(i));
                } else {
                    gl::Disable(gl::CLIP_DISTANCE0 + GLenum::from(i));
                }
            }

            self.clip_distances = params.clip_distances;
        }

        check()
    }

    unsafe fn bind_uniform(&mut self, location: UniformLocation, value: &UniformValue) -> Result<()> {
        let location = location.raw();
        match *value {
            UniformValue::I32(v) => gl::Uniform1i(location, v),
            UniformValue::F32(v) => gl::Uniform1f(location, v),
            UniformValue::Vector3f(ref v) => gl::Uniform3fv(location, 1, v.as_ptr()),
            UniformValue::Vector4f(ref v) => gl::Uniform4fv(location, 1, v.as_ptr()),
            UniformValue::Matrix4f(ref v) => {
                gl::UniformMatrix4fv(location, 1, gl::FALSE, v[0].as_ptr())
            }
        }

        check()
    }

    unsafe fn bind_texture(&mut self, slot: u32, handle: TextureHandle) -> Result<()> {
        let texture = *self.textures.get_or_released(handle)?;
        gl::ActiveTexture(gl::TEXTURE0 + slot);
        gl::BindTexture(texture.target, texture.id);
        check()
    }

    unsafe fn draw(&mut self, topology: Topology, offset: u32, count: u32, instances: u32) -> Result<()> {
        gl::DrawArraysInstanced(
            topology.into(),
            offset as GLint,
            count as GLsizei,
            instances as GLsizei,
        );

        check()
    }

    unsafe fn draw_indexed(
        &mut self,
        topology: Topology,
        offset: u32,
        count: u32,
        instances: u32,
    ) -> Result<()> {
        gl::DrawElementsInstanced(
            topology.into(),
            count as GLsizei,
            gl::UNSIGNED_SHORT,
            (offset as usize * 2) as *const c_void,
            instances as GLsizei,
        );

        check()
    }

    unsafe fn end_pass(&mut self) -> Result<()> {
        gl::Disable(gl::SCISSOR_TEST);
        gl::BindVertexArray(0);
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        check()
    }

    unsafe fn copy_to_texture(
        &mut self,
        framebuffer: FramebufferHandle,
        handle: TextureHandle,
        width: u32,
        height: u32,
    ) -> Result<()> {
        let id = self.framebuffer_id(framebuffer)?;
        let texture = *self.textures.get_or_released(handle)?;

        gl::BindFramebuffer(gl::READ_FRAMEBUFFER, id);
        gl::ReadBuffer(if id == 0 { gl::BACK } else { gl::COLOR_ATTACHMENT0 });
        gl::BindTexture(gl::TEXTURE_2D, texture.id);
        gl::CopyTexSubImage2D(
            gl::TEXTURE_2D,
            0,
            0,
            0,
            0,
            0,
            width as GLsizei,
            height as GLsizei,
        );

        gl::BindTexture(gl::TEXTURE_2D, 0);
        gl::BindFramebuffer(gl::READ_FRAMEBUFFER, 0);
        check()
    }

    unsafe fn read_pixels(
        &mut self,
        framebuffer: FramebufferHandle,
        area: Viewport,
        format: TextureFormat,
        out: &mut [u8],
    ) -> Result<()> {
        let id = self.framebuffer_id(framebuffer)?;
        let (_, client, tp) = types::texture_format(format);

        gl::BindFramebuffer(gl::READ_FRAMEBUFFER, id);
        gl::ReadBuffer(if id == 0 { gl::BACK } else { gl::COLOR_ATTACHMENT0 });
        gl::ReadPixels(
            area.x,
            area.y,
            area.width as GLsizei,
            area.height as GLsizei,
            client,
            tp,
            out.as_mut_ptr() as *mut c_void,
        );

        gl::BindFramebuffer(gl::READ_FRAMEBUFFER, 0);
        check()
    }

    unsafe fn flush(&mut self) -> Result<()> {
        gl::Finish();
        check()
    }

    unsafe fn advance(&mut self) -> Result<()> {
        check()
    }
}

impl GLVisitor {
    unsafe fn compile(stage: GLenum, src: &str) -> Result<GLuint> {
        let c_str = CString::new(src.as_bytes())
            .map_err(|_| Error::ShaderCompile("source contains NUL".into()))?;

        let shader = gl::CreateShader(stage);
        gl::ShaderSource(shader, 1, &c_str.as_ptr(), ptr::null());
        gl::CompileShader(shader);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetShaderInfoLog(
                shader,
                len,
                ptr::null_mut(),
                buf.as_mut_ptr() as *mut GLchar,
            );

            gl::DeleteShader(shader);
            return Err(Error::ShaderCompile(info_log(&buf)));
        }

        Ok(shader)
    }

    unsafe fn link(shaders: &[GLuint]) -> Result<GLuint> {
        let program = gl::CreateProgram();
        for &shader in shaders {
            gl::AttachShader(program, shader);
        }

        gl::LinkProgram(program);

        for &shader in shaders {
            gl::DetachShader(program, shader);
        }

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len: GLint = 0;
            gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
            let mut buf = vec![0u8; len.max(1) as usize];
            gl::GetProgramInfoLog(
                program,
                len,
                ptr::null_mut(),
                buf.as_mut_ptr() as *mut GLchar,
            );

            gl::DeleteProgram(program);
            return Err(Error::ProgramLink(info_log(&buf)));
        }

        Ok(program)
    }

    unsafe fn bind_texture_params(target: GLenum, params: &TextureParams) -> Result<()> {
        let wrap: GLenum = params.wrap.into();
        gl::TexParameteri(target, gl::TEXTURE_WRAP_S, wrap as GLint);
        gl::TexParameteri(target, gl::TEXTURE_WRAP_T, wrap as GLint);
        if target == gl::TEXTURE_CUBE_MAP {
            gl::TexParameteri(target, gl::TEXTURE_WRAP_R, wrap as GLint);
        }

        let mipmap = params.levels() > 1;
        let (min, mag) = match params.filter {
            TextureFilter::Nearest if mipmap => (gl::NEAREST_MIPMAP_NEAREST, gl::NEAREST),
            TextureFilter::Nearest => (gl::NEAREST, gl::NEAREST),
            TextureFilter::Linear if mipmap => (gl::LINEAR_MIPMAP_LINEAR, gl::LINEAR),
            TextureFilter::Linear => (gl::LINEAR, gl::LINEAR),
        };

        gl::TexParameteri(target, gl::TEXTURE_MIN_FILTER, min as GLint);
        gl::TexParameteri(target, gl::TEXTURE_MAG_FILTER, mag as GLint);
        gl::TexParameteri(target, gl::TEXTURE_BASE_LEVEL, 0);
        gl::TexParameteri(
            target,
            gl::TEXTURE_MAX_LEVEL,
            (params.levels() - 1) as GLint,
        );

        check()
    }
}

fn info_log(buf: &[u8]) -> String {
    let end = buf.iter().position(|&v| v == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

fn framebuffer_status(status: GLenum) -> &'static str {
    match status {
        gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => {
            "the framebuffer attachment points are framebuffer incomplete"
        }
        gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
            "the framebuffer does not have at least one image attached to it"
        }
        gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => "a draw buffer has no attached image",
        gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => "the read buffer has no attached image",
        gl::FRAMEBUFFER_UNSUPPORTED => {
            "the combination of internal formats of the attached images is unsupported"
        }
        gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => "attachments differ in sample counts",
        _ => "unknown framebuffer status",
    }
}

unsafe fn check() -> Result<()> {
    let reason = match gl::GetError() {
        gl::NO_ERROR => return Ok(()),
        gl::INVALID_ENUM => "[GL] An unacceptable value is specified for an enumerated argument.",
        gl::INVALID_VALUE => "[GL] A numeric argument is out of range.",
        gl::INVALID_OPERATION => {
            "[GL] The specified operation is not allowed in the current state."
        }
        gl::INVALID_FRAMEBUFFER_OPERATION => {
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        }
        gl::OUT_OF_MEMORY => "[GL] There is not enough memory left to execute the command.",
        _ => "[GL] Oops, Unknown OpenGL error.",
    };

    Err(Error::Backend(reason.to_owned()))
}
