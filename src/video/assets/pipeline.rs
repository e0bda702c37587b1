//! Immutable pipeline state objects.
//!
//! A pipeline bundles everything the rasterizer needs besides uniforms and
//! textures: the program, the vertex array, topology, culling, depth, stencil,
//! blending and color masks. Once created it never changes; a different state
//! means a different pipeline.

use crate::math::Color;

use super::program::ProgramHandle;
use super::vertex_array::VertexArrayHandle;

impl_handle!(PipelineHandle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CullFace {
    Nothing,
    Front,
    Back,
    FrontAndBack,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Comparison {
    Never,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    Always,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    Incr,
    IncrWrap,
    Decr,
    DecrWrap,
    Invert,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthState {
    pub test: bool,
    pub write: bool,
    pub comparison: Comparison,
}

impl Default for DepthState {
    fn default() -> Self {
        DepthState {
            test: false,
            write: false,
            comparison: Comparison::Less,
        }
    }
}

/// Stencil operations and masks of one face orientation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StencilFace {
    pub fail: StencilOp,
    pub depth_fail: StencilOp,
    pub pass: StencilOp,
    pub comparison: Comparison,
    pub reference: i32,
    pub compare_mask: u32,
    pub write_mask: u32,
}

impl Default for StencilFace {
    fn default() -> Self {
        StencilFace {
            fail: StencilOp::Keep,
            depth_fail: StencilOp::Keep,
            pass: StencilOp::Keep,
            comparison: Comparison::Always,
            reference: 0,
            compare_mask: 0xFF,
            write_mask: 0xFF,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct StencilState {
    pub test: bool,
    pub front: StencilFace,
    pub back: StencilFace,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendState {
    pub enabled: bool,
    pub src_color: BlendFactor,
    pub dst_color: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
    pub op_color: BlendOp,
    pub op_alpha: BlendOp,
    pub constant: Color,
}

impl Default for BlendState {
    fn default() -> Self {
        BlendState {
            enabled: false,
            src_color: BlendFactor::One,
            dst_color: BlendFactor::Zero,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::Zero,
            op_color: BlendOp::Add,
            op_alpha: BlendOp::Add,
            constant: Color::TRANSPARENT,
        }
    }
}

impl BlendState {
    /// Classic `src * a + dst * (1 - a)` blending.
    pub fn alpha() -> Self {
        BlendState {
            enabled: true,
            src_color: BlendFactor::SrcAlpha,
            dst_color: BlendFactor::OneMinusSrcAlpha,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::OneMinusSrcAlpha,
            ..Default::default()
        }
    }

    /// `src + dst`.
    pub fn additive() -> Self {
        BlendState {
            enabled: true,
            src_color: BlendFactor::One,
            dst_color: BlendFactor::One,
            src_alpha: BlendFactor::One,
            dst_alpha: BlendFactor::One,
            ..Default::default()
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PipelineParams {
    pub program: ProgramHandle,
    pub vertex_array: Option<VertexArrayHandle>,
    pub topology: Topology,
    pub culling: CullFace,
    pub front_face: FrontFace,
    pub line_width: f32,
    /// Number of `gl_ClipDistance` outputs the vertex stage writes.
    pub clip_distances: u8,
    pub depth: DepthState,
    pub stencil: StencilState,
    pub color_write: [bool; 4],
    pub blend: BlendState,
}

impl PipelineParams {
    pub fn new(program: ProgramHandle, vertex_array: Option<VertexArrayHandle>) -> Self {
        PipelineParams {
            program,
            vertex_array,
            topology: Topology::Triangles,
            culling: CullFace::Nothing,
            front_face: FrontFace::CounterClockwise,
            line_width: 1.0,
            clip_distances: 0,
            depth: DepthState::default(),
            stencil: StencilState::default(),
            color_write: [true; 4],
            blend: BlendState::default(),
        }
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }
}
