//! Offscreen render targets assembled from texture attachments.

use smallvec::SmallVec;

use super::texture::TextureHandle;

impl_handle!(FramebufferHandle);

impl FramebufferHandle {
    /// The default framebuffer of the window. It is never allocated nor released.
    #[inline]
    pub fn screen() -> Self {
        FramebufferHandle::default()
    }

    #[inline]
    pub fn is_screen(self) -> bool {
        self == Self::screen()
    }
}

/// Color attachments are bound in order to `COLOR_ATTACHMENT0..n`. The depth
/// attachment may be a depth or depth-stencil texture and may be shared between
/// several framebuffers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FramebufferParams {
    pub colors: SmallVec<[TextureHandle; 4]>,
    pub depth: Option<TextureHandle>,
}

impl FramebufferParams {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_color(mut self, texture: TextureHandle) -> Self {
        self.colors.push(texture);
        self
    }

    pub fn with_depth(mut self, texture: TextureHandle) -> Self {
        self.depth = Some(texture);
        self
    }
}
