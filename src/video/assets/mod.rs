//! Resource descriptions of the GPU abstraction. Every resource is named by a
//! typed handle and described by a plain `*Params` value.

pub mod buffer;
pub mod framebuffer;
pub mod pipeline;
pub mod program;
pub mod shader;
pub mod texture;
pub mod vertex_array;

pub mod prelude {
    pub use super::buffer::{BufferHandle, BufferKind, BufferParams};
    pub use super::framebuffer::{FramebufferHandle, FramebufferParams};
    pub use super::pipeline::{
        BlendFactor, BlendOp, BlendState, Comparison, CullFace, DepthState, FrontFace,
        PipelineHandle, PipelineParams, StencilFace, StencilOp, StencilState, Topology,
    };
    pub use super::program::{ProgramHandle, ProgramParams, UniformLocation};
    pub use super::shader::{ShaderHandle, ShaderSource, ShaderStage};
    pub use super::texture::{
        CubeData, TextureData, TextureFilter, TextureFormat, TextureHandle, TextureKind,
        TextureParams, TextureWrap,
    };
    pub use super::vertex_array::{
        VertexArrayHandle, VertexArrayParams, VertexAttribute, VertexFormat,
    };
}
