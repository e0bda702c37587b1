//! The error model shared by the video, canvas and scene modules.
//!
//! Violations of the API contract are reported as `Error::InvariantViolated` with the
//! broken rule attached. Everything the driver or the input data can cause (shader logs,
//! incomplete framebuffers, malformed fonts) gets a dedicated variant instead.

use std::fmt;

/// The rules of the resource and recording contract.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Invariant {
    ResourceReleased,
    ResourceAlreadyAllocated,
    ResourceAlreadyReleased,
    ImmutableBuffer,
    NoActivePipeline,
    NoVertexArray,
    NoIndexBuffer,
    RenderPassNested,
    RenderPassMissing,
    NoActivePath,
    StackUnderflow,
    StackOverflow,
    UnsupportedFoVMode,
    UnsupportedToneMapping,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let rule = match *self {
            Invariant::ResourceReleased => "resource used after it was released",
            Invariant::ResourceAlreadyAllocated => "resource slot is already allocated",
            Invariant::ResourceAlreadyReleased => "resource released more than once",
            Invariant::ImmutableBuffer => "update of an immutable buffer",
            Invariant::NoActivePipeline => "command recorded before any pipeline was bound",
            Invariant::NoVertexArray => "draw with a pipeline that has no vertex array",
            Invariant::NoIndexBuffer => "indexed draw with a vertex array that has no index buffer",
            Invariant::RenderPassNested => "render pass begun inside another render pass",
            Invariant::RenderPassMissing => "operation requires an active render pass",
            Invariant::NoActivePath => "path command issued with no open shape or contour",
            Invariant::StackUnderflow => "layer stack popped below its base layer",
            Invariant::StackOverflow => "layer stack pushed above its maximum depth",
            Invariant::UnsupportedFoVMode => "unsupported field-of-view mode",
            Invariant::UnsupportedToneMapping => "unsupported tone mapping",
        };

        write!(f, "{}", rule)
    }
}

#[derive(Debug, Clone, PartialEq, Fail)]
pub enum Error {
    #[fail(display = "Invariant violated: {}.", _0)]
    InvariantViolated(Invariant),
    #[fail(display = "Failed to compile shader, errors: \n{}", _0)]
    ShaderCompile(String),
    #[fail(display = "Failed to link program, errors: \n{}", _0)]
    ProgramLink(String),
    #[fail(display = "Framebuffer is incomplete: {}", _0)]
    FramebufferIncomplete(String),
    #[fail(
        display = "Buffer overflow, {} bytes at offset {} exceeds capacity {}.",
        len, offset, capacity
    )]
    BufferOverflow {
        offset: usize,
        len: usize,
        capacity: usize,
    },
    #[fail(display = "Failed to extract glyph: {}", _0)]
    FontGlyph(String),
    #[fail(display = "Failed to parse font: {}", _0)]
    FontParse(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
    #[fail(display = "Invalid settings: {}", _0)]
    Settings(String),
    #[fail(display = "Worker thread is disconnected.")]
    WorkerDisconnected,
}

impl Error {
    /// Returns the violated rule if this is a programming error.
    pub fn invariant(&self) -> Option<Invariant> {
        match *self {
            Error::InvariantViolated(rule) => Some(rule),
            _ => None,
        }
    }
}

impl From<Invariant> for Error {
    fn from(rule: Invariant) -> Self {
        Error::InvariantViolated(rule)
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;
