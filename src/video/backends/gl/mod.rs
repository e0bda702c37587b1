//! OpenGL 4.6 core backend.

pub mod capabilities;
pub mod types;
pub mod visitor;
