//! GLSL sources of the canvas programs.

use crate::video::assets::prelude::ShaderSource;

pub const SHAPE_VS: &str = include_str!("shaders/shape.vs");
pub const SHAPE_FS: &str = include_str!("shaders/shape.fs");
pub const CONTOUR_VS: &str = include_str!("shaders/contour.vs");
pub const CONTOUR_FS: &str = include_str!("shaders/contour.fs");
pub const TEXT_VS: &str = include_str!("shaders/text.vs");
pub const TEXT_FS: &str = include_str!("shaders/text.fs");

/// The assembled stages of one program.
#[derive(Debug, Clone)]
pub struct ProgramSource {
    pub vs: String,
    pub fs: String,
}

impl ProgramSource {
    fn new(vs: &str, fs: &str) -> Self {
        ProgramSource {
            vs: ShaderSource::new(vs).assemble(),
            fs: ShaderSource::new(fs).assemble(),
        }
    }
}

/// Filled shapes, optionally textured.
pub fn shape() -> ProgramSource {
    ProgramSource::new(SHAPE_VS, SHAPE_FS)
}

/// Stroked contours with per-vertex colors.
pub fn contour() -> ProgramSource {
    ProgramSource::new(CONTOUR_VS, CONTOUR_FS)
}

/// Glyph quads sampling a coverage atlas.
pub fn text() -> ProgramSource {
    ProgramSource::new(TEXT_VS, TEXT_FS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::backends::headless::parse_uniforms;

    #[test]
    fn stable_uniform_names() {
        let shape = shape();
        assert!(shape.vs.starts_with("#version 460\n"));

        let mut names = parse_uniforms(&shape.vs);
        names.extend(parse_uniforms(&shape.fs));
        assert_eq!(
            names,
            vec![
                "projectionMatrixIn",
                "transformMatrixIn",
                "textureTransformMatrixIn",
                "clipDistancesIn",
                "colorIn",
                "textureIn",
            ]
        );

        let text = text();
        assert!(text.vs.contains("gl_ClipDistance[4]"));
        assert!(parse_uniforms(&text.fs).contains(&"textureIn".to_owned()));
    }
}
