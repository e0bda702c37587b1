//! GLSL sources of the deferred pipeline.

pub use crate::canvas::shaders::ProgramSource;
use crate::settings::ToneMapping;
use crate::video::assets::prelude::ShaderSource;

pub const GEOMETRY_VS: &str = include_str!("shaders/geometry.vs");
pub const GEOMETRY_FS: &str = include_str!("shaders/geometry.fs");
pub const FULLSCREEN_VS: &str = include_str!("shaders/fullscreen.vs");
pub const LIGHTING_FS: &str = include_str!("shaders/lighting.fs");
pub const SKYBOX_VS: &str = include_str!("shaders/skybox.vs");
pub const SKYBOX_FS: &str = include_str!("shaders/skybox.fs");
pub const PROBE_FS: &str = include_str!("shaders/probe.fs");
pub const POSTPROCESS_FS: &str = include_str!("shaders/postprocess.fs");

/// Optional inputs of the geometry program.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct PbrFeatures {
    /// Multiplies the albedo color with `albedoTwoDTextureIn`.
    pub albedo_texture: bool,
    /// Reads texture coordinates from attribute location 3.
    pub tex_coord0: bool,
}

impl PbrFeatures {
    fn assemble(self, body: &str) -> String {
        ShaderSource::new(body)
            .define_if("USES_ALBEDO_TEXTURE", self.albedo_texture)
            .define_if("USES_TEX_COORD0", self.tex_coord0)
            .assemble()
    }
}

/// Writes base color, metalness, normal and roughness into the G-buffer.
pub fn geometry(features: PbrFeatures) -> ProgramSource {
    ProgramSource {
        vs: features.assemble(GEOMETRY_VS),
        fs: features.assemble(GEOMETRY_FS),
    }
}

/// Resolves one directional light from the G-buffer.
pub fn lighting() -> ProgramSource {
    fullscreen(LIGHTING_FS)
}

pub fn skybox() -> ProgramSource {
    ProgramSource {
        vs: ShaderSource::new(SKYBOX_VS).assemble(),
        fs: ShaderSource::new(SKYBOX_FS).assemble(),
    }
}

/// Averages the HDR target into a single pixel.
pub fn probe() -> ProgramSource {
    fullscreen(PROBE_FS)
}

/// Maps the exposed HDR target to the screen with `tone_mapping`.
pub fn postprocess(tone_mapping: ToneMapping) -> ProgramSource {
    ProgramSource {
        vs: ShaderSource::new(FULLSCREEN_VS).assemble(),
        fs: ShaderSource::new(POSTPROCESS_FS)
            .define(tone_mapping.feature())
            .assemble(),
    }
}

fn fullscreen(fs: &str) -> ProgramSource {
    ProgramSource {
        vs: ShaderSource::new(FULLSCREEN_VS).assemble(),
        fs: ShaderSource::new(fs).assemble(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::backends::headless::parse_uniforms;

    #[test]
    fn geometry_features() {
        let plain = geometry(PbrFeatures::default());
        assert!(!plain.fs.contains("#define USES_ALBEDO_TEXTURE"));

        let features = PbrFeatures {
            albedo_texture: true,
            tex_coord0: true,
        };

        let textured = geometry(features);
        assert!(textured.vs.contains("#define USES_TEX_COORD0\n"));
        assert!(textured.fs.contains("#define USES_ALBEDO_TEXTURE\n"));
        assert_eq!(
            parse_uniforms(&textured.fs),
            vec![
                "albedoColorIn",
                "metalnessIn",
                "roughnessIn",
                "alphaThresholdIn",
                "albedoTwoDTextureIn",
            ]
        );
    }

    #[test]
    fn lighting_uniforms() {
        let names = parse_uniforms(&lighting().fs);
        assert_eq!(names.len(), 8);
        assert_eq!(names[0], "fbColor0TextureIn");
        assert_eq!(names[7], "lightIntensityIn");
    }

    #[test]
    fn tone_mapping_feature() {
        let source = postprocess(ToneMapping::Exponential);
        assert!(source.fs.contains("#define MODE_EXPONENTIAL\n"));
        assert_eq!(
            parse_uniforms(&source.fs),
            vec!["fbColor0TextureIn", "exposureIn"]
        );
    }
}
