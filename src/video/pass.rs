//! Render pass descriptions.

use crate::math::Color;

use super::assets::prelude::FramebufferHandle;

/// A rectangle in integer pixels, relative to the lower-left corner of the
/// target framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Viewport {
            x,
            y,
            width,
            height,
        }
    }

    /// A viewport covering `width × height` from the origin.
    pub fn with_size(width: u32, height: u32) -> Self {
        Viewport::new(0, 0, width, height)
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// What happens to an attachment when a pass begins.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LoadOp<T> {
    /// Keep the previous contents.
    Load,
    /// Paint the attachment with the value before any draw.
    Clear(T),
    /// Contents are undefined.
    DontCare,
}

impl<T: Copy> LoadOp<T> {
    #[inline]
    pub fn clear_value(&self) -> Option<T> {
        match *self {
            LoadOp::Clear(v) => Some(v),
            _ => None,
        }
    }
}

/// What happens to an attachment when a pass ends.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    DontCare,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AttachmentOps<T> {
    pub load: LoadOp<T>,
    pub store: StoreOp,
}

impl<T> Default for AttachmentOps<T> {
    fn default() -> Self {
        AttachmentOps {
            load: LoadOp::Load,
            store: StoreOp::Store,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderPassInfo {
    pub framebuffer: FramebufferHandle,
    pub viewport: Viewport,
    pub scissor: Option<Viewport>,
    pub color: AttachmentOps<Color>,
    pub depth: AttachmentOps<f32>,
    pub stencil: AttachmentOps<i32>,
}

impl RenderPassInfo {
    /// A pass that loads and stores every attachment of `framebuffer`.
    pub fn new(framebuffer: FramebufferHandle, viewport: Viewport) -> Self {
        RenderPassInfo {
            framebuffer,
            viewport,
            scissor: None,
            color: AttachmentOps::default(),
            depth: AttachmentOps::default(),
            stencil: AttachmentOps::default(),
        }
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.color.load = LoadOp::Clear(color);
        self
    }

    pub fn clear_depth(mut self, depth: f32) -> Self {
        self.depth.load = LoadOp::Clear(depth);
        self
    }

    pub fn clear_stencil(mut self, stencil: i32) -> Self {
        self.stencil.load = LoadOp::Clear(stencil);
        self
    }

    pub fn scissor(mut self, scissor: Viewport) -> Self {
        self.scissor = Some(scissor);
        self
    }
}
