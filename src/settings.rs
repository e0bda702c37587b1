//! Configuration of the canvas and scene renderers.
//!
//! Every field has a default, so a settings file only needs to name what it
//! overrides:
//!
//! ```
//! use prism::settings::{Settings, ToneMapping};
//!
//! let settings = Settings::from_json(r#"{ "scene": { "tone_mapping": "exponential" } }"#).unwrap();
//! assert_eq!(settings.scene.tone_mapping, ToneMapping::Exponential);
//! assert_eq!(settings.canvas.max_layer_depth, 256);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::math::Color;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub canvas: CanvasSettings,
    pub scene: SceneSettings,
}

impl Settings {
    /// Reads overrides from a JSON document.
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|err| Error::Settings(format!("{}", err)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSettings {
    /// Capacity of each canvas mesh, in vertices.
    pub max_vertices: usize,
    /// Depth of the layer stack, base layer included.
    pub max_layer_depth: usize,
    /// Color the target is cleared to when a frame ends. `None` keeps what is
    /// already there.
    pub clear_color: Option<Color>,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        CanvasSettings {
            max_vertices: crate::canvas::mesh::MAX_VERTICES,
            max_layer_depth: 256,
            clear_color: None,
        }
    }
}

/// The curve mapping HDR color to the displayable range.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneMapping {
    /// `x / (x + 1)`
    Reinhard,
    /// `1 - 2^-x`
    Exponential,
}

impl ToneMapping {
    /// The shader feature selecting this curve.
    pub fn feature(self) -> &'static str {
        match self {
            ToneMapping::Reinhard => "MODE_REINHARD",
            ToneMapping::Exponential => "MODE_EXPONENTIAL",
        }
    }
}

impl FromStr for ToneMapping {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "reinhard" => Ok(ToneMapping::Reinhard),
            "exponential" => Ok(ToneMapping::Exponential),
            _ => Err(Invariant::UnsupportedToneMapping.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub tone_mapping: ToneMapping,
    /// Stores albedo and metalness as RGBA32F instead of RGBA8.
    pub high_precision_albedo: bool,
    /// Feeds the exposure probe back into the camera exposure every frame.
    pub auto_exposure: bool,
    /// Background of the geometry and lighting passes.
    pub sky_color: Color,
}

impl Default for SceneSettings {
    fn default() -> Self {
        SceneSettings {
            tone_mapping: ToneMapping::Reinhard,
            high_precision_albedo: false,
            auto_exposure: true,
            sky_color: Color::new(0.2, 0.3, 0.4, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.canvas.max_vertices, 524_288);
        assert_eq!(settings.scene.tone_mapping, ToneMapping::Reinhard);
        assert!(settings.scene.auto_exposure);
    }

    #[test]
    fn overrides() {
        let source = r#"{
            "canvas": { "max_layer_depth": 8, "clear_color": { "r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0 } },
            "scene": { "high_precision_albedo": true }
        }"#;

        let settings = Settings::from_json(source).unwrap();
        assert_eq!(settings.canvas.max_layer_depth, 8);
        assert_eq!(settings.canvas.clear_color, Some(Color::RED));
        assert_eq!(settings.canvas.max_vertices, 524_288);
        assert!(settings.scene.high_precision_albedo);
    }

    #[test]
    fn tone_mapping_names() {
        assert_eq!("exponential".parse::<ToneMapping>(), Ok(ToneMapping::Exponential));

        let err = "filmic".parse::<ToneMapping>().unwrap_err();
        assert_eq!(err.invariant(), Some(Invariant::UnsupportedToneMapping));
        assert!(Settings::from_json(r#"{ "scene": { "tone_mapping": "filmic" } }"#).is_err());
    }
}
