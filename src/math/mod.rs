//! Math utils. Vectors, matrices and angles come straight from `cgmath`.

pub use cgmath::*;

pub mod aabb;
pub use self::aabb::Aabb2;

pub mod color;
pub use self::color::Color;
