//! # What is This?
//!
//! Prism is a pair of real-time renderers sharing a small GPU abstraction:
//!
//! * `video` exposes buffers, textures, shaders, programs, vertex arrays,
//!   framebuffers and immutable pipelines, recorded into command queues and
//!   executed inside render passes. It ships an OpenGL 4.6 core backend and a
//!   headless backend.
//! * `canvas` draws 2D vector graphics: rectangles, images, text through a
//!   glyph atlas, stroked contours and stencil-filled paths with the non-zero
//!   and even-odd rules.
//! * `scene` renders 3D scenes with a deferred PBR pipeline, HDR lighting, a
//!   skybox, auto exposure and tone mapping.
//!
//! Every GPU call happens on one thread. `sched` lets other threads queue work
//! onto it.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[cfg(test)]
#[macro_use]
extern crate approx;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod math;

pub mod video;

pub mod canvas;
pub mod scene;

pub mod sched;
pub mod settings;

pub mod prelude;
