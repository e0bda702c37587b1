//! Surface description consumed by the geometry pass.

use crate::errors::*;
use crate::math::Color;
use crate::video::prelude::*;

use super::shaders::{self, PbrFeatures};

/// Compiles and links a geometry program with `features`.
pub fn create_pbr_program(device: &mut Device, features: PbrFeatures) -> Result<ProgramHandle> {
    let source = shaders::geometry(features);
    device.create_render_program(&source.vs, &source.fs)
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    /// A program created by `create_pbr_program`.
    pub program: ProgramHandle,
    /// Reserved for a shadow pass; not drawn by the deferred renderer.
    pub shadow_program: Option<ProgramHandle>,
    pub back_face_culling: bool,
    pub albedo_color: Color,
    /// Sampled when the program was built with `PbrFeatures::albedo_texture`.
    pub albedo_texture: Option<TextureHandle>,
    pub metalness: f32,
    pub metalness_texture: Option<TextureHandle>,
    pub roughness: f32,
    pub roughness_texture: Option<TextureHandle>,
    pub normal_scale: f32,
    pub normal_texture: Option<TextureHandle>,
    /// Fragments whose albedo alpha is below this value are discarded.
    pub alpha_threshold: f32,
}

impl Material {
    pub fn new(program: ProgramHandle) -> Self {
        Material {
            program,
            shadow_program: None,
            back_face_culling: true,
            albedo_color: Color::WHITE,
            albedo_texture: None,
            metalness: 0.0,
            metalness_texture: None,
            roughness: 0.5,
            roughness_texture: None,
            normal_scale: 1.0,
            normal_texture: None,
            alpha_threshold: 0.0,
        }
    }

    #[inline]
    pub fn culling(&self) -> CullFace {
        if self.back_face_culling {
            CullFace::Back
        } else {
            CullFace::Nothing
        }
    }
}
