//! A small GPU abstraction: typed resources, immutable pipelines, deferred
//! command queues and render passes.
//!
//! # Resources
//!
//! Buffers, textures, shaders, programs, vertex arrays, framebuffers and
//! pipelines are created through a `Device` and named by typed handles. Every
//! handle must be released exactly once; using a released handle fails with
//! `Invariant::ResourceReleased` and releasing it again with
//! `Invariant::ResourceAlreadyReleased`.
//!
//! # Recording
//!
//! A `CommandQueue` records pipeline binds, uniform writes, texture bindings and
//! draws. It is executed by `Device::submit`, which is only legal between
//! `Device::begin_render_pass` and `Device::end_render_pass`.
//!
//! ```
//! use prism::video::prelude::*;
//!
//! let mut device = Device::headless();
//! let viewport = Viewport::with_size(64, 64);
//! let pass = RenderPassInfo::new(device.screen_framebuffer(), viewport)
//!     .clear_color(Color::BLACK);
//!
//! let mut queue = CommandQueue::new();
//! device.begin_render_pass(pass).unwrap();
//! device.submit(&mut queue).unwrap();
//! device.end_render_pass().unwrap();
//! ```

pub mod assets;
pub mod backends;
pub mod command;
pub mod device;
pub mod guard;
pub mod pass;

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::command::{Command, CommandQueue, UniformValue};
    pub use super::device::{Device, FrameStats};
    pub use super::guard::ResourceGuard;
    pub use super::pass::{AttachmentOps, LoadOp, RenderPassInfo, StoreOp, Viewport};
    pub use crate::math::Color;
}
