//! Shader stages and the feature-toggle source assembler.

impl_handle!(ShaderHandle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Assembles GLSL from a template body.
///
/// The output is a `#version` line, one `#define` line per feature in insertion
/// order, the body and a trailing newline. Templates are expected to guard every
/// optional block with `#ifdef`, so unknown features are harmless.
///
/// ```
/// use prism::video::assets::prelude::ShaderSource;
///
/// let src = ShaderSource::new("void main() {}")
///     .define("USES_ALBEDO_TEXTURE")
///     .assemble();
///
/// assert_eq!(src, "#version 460\n#define USES_ALBEDO_TEXTURE\nvoid main() {}\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource<'a> {
    version: u32,
    features: Vec<&'a str>,
    body: &'a str,
}

impl<'a> ShaderSource<'a> {
    pub const DEFAULT_VERSION: u32 = 460;

    pub fn new(body: &'a str) -> Self {
        ShaderSource {
            version: Self::DEFAULT_VERSION,
            features: Vec::new(),
            body,
        }
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn define(mut self, feature: &'a str) -> Self {
        self.features.push(feature);
        self
    }

    /// Defines `feature` only if `enabled`.
    pub fn define_if(self, feature: &'a str, enabled: bool) -> Self {
        if enabled {
            self.define(feature)
        } else {
            self
        }
    }

    pub fn assemble(&self) -> String {
        let mut src = String::with_capacity(self.body.len() + 64);
        src.push_str(&format!("#version {}\n", self.version));
        for feature in &self.features {
            src.push_str("#define ");
            src.push_str(feature);
            src.push('\n');
        }

        src.push_str(self.body);
        src.push('\n');
        src
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_keep_insertion_order() {
        let src = ShaderSource::new("body")
            .version(330)
            .define("B")
            .define_if("SKIPPED", false)
            .define("A")
            .assemble();

        assert_eq!(src, "#version 330\n#define B\n#define A\nbody\n");
    }

    #[test]
    fn no_features() {
        assert_eq!(ShaderSource::new("").assemble(), "#version 460\n\n");
    }
}
