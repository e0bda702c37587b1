//! A device through which the player views the world.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::math;
use crate::math::{Deg, Matrix4, One, Quaternion, Rad, SquareMatrix, Vector2, Vector3};
use crate::video::prelude::Viewport;

/// Distance of the near clipping plane.
pub const NEAR: f32 = 0.5;
/// Distance of the far clipping plane.
pub const FAR: f32 = 900.0;

/// Which extent of the view the field of view angle measures.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoVMode {
    /// The angle is vertical; wider viewports see more horizontally.
    HorizontalPlus,
    /// The angle is horizontal; taller viewports see more vertically.
    VerticalMinus,
    /// Orthographic, one world unit per pixel.
    PixelBased,
}

impl FromStr for FoVMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "horizontal_plus" => Ok(FoVMode::HorizontalPlus),
            "vertical_minus" => Ok(FoVMode::VerticalMinus),
            "pixel_based" => Ok(FoVMode::PixelBased),
            _ => Err(Invariant::UnsupportedFoVMode.into()),
        }
    }
}

/// The active camera of a scene.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub fov: Rad<f32>,
    pub fov_mode: FoVMode,
    /// Multiplier applied to HDR colors before tone mapping.
    pub exposure: f32,
    /// Reserved. The renderer takes the auto exposure switch from its settings.
    pub auto_exposure: bool,
    /// Reserved, not used by the renderer.
    pub focus_range: Vector2<f32>,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            fov: Deg(60.0).into(),
            fov_mode: FoVMode::HorizontalPlus,
            exposure: 1.0,
            auto_exposure: false,
            focus_range: Vector2::new(NEAR, FAR),
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Camera {
    /// Local to world transform of the camera.
    pub fn camera_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// World to view transform. The camera looks down its local negative z-axis.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera_matrix()
            .invert()
            .unwrap_or_else(Matrix4::identity)
    }
}

/// Builds the projection of `camera` for `viewport`, with the fixed `NEAR` and
/// `FAR` planes.
pub fn projection_matrix(camera: &Camera, viewport: Viewport) -> Matrix4<f32> {
    let (w, h) = (viewport.width.max(1) as f32, viewport.height.max(1) as f32);
    let extent = NEAR * (camera.fov.0 * 0.5).tan();

    match camera.fov_mode {
        FoVMode::HorizontalPlus => {
            let half_height = extent;
            let half_width = half_height * (w / h);
            math::frustum(-half_width, half_width, -half_height, half_height, NEAR, FAR)
        }
        FoVMode::VerticalMinus => {
            let half_width = extent;
            let half_height = half_width * (h / w);
            math::frustum(-half_width, half_width, -half_height, half_height, NEAR, FAR)
        }
        FoVMode::PixelBased => math::ortho(-w * 0.5, w * 0.5, -h * 0.5, h * 0.5, NEAR, FAR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_extents(m: &Matrix4<f32>) -> (f32, f32) {
        (NEAR / m.x.x, NEAR / m.y.y)
    }

    #[test]
    fn horizontal_plus_keeps_vertical_extent() {
        let camera = Camera {
            fov: Deg(90.0).into(),
            fov_mode: FoVMode::HorizontalPlus,
            ..Default::default()
        };

        let m = projection_matrix(&camera, Viewport::with_size(1920, 1080));
        let (w, h) = half_extents(&m);
        assert_relative_eq!(h, 0.5, epsilon = 1e-5);
        assert_relative_eq!(w, 0.5 * 1920.0 / 1080.0, epsilon = 1e-5);
    }

    #[test]
    fn vertical_minus_keeps_horizontal_extent() {
        let camera = Camera {
            fov: Deg(90.0).into(),
            fov_mode: FoVMode::VerticalMinus,
            ..Default::default()
        };

        let m = projection_matrix(&camera, Viewport::with_size(1920, 1080));
        let (w, h) = half_extents(&m);
        assert_relative_eq!(w, 0.5, epsilon = 1e-5);
        assert_relative_eq!(h, 0.28125, epsilon = 1e-5);
    }

    #[test]
    fn pixel_based_is_orthographic() {
        let camera = Camera {
            fov_mode: FoVMode::PixelBased,
            ..Default::default()
        };

        let m = projection_matrix(&camera, Viewport::with_size(200, 100));
        assert_relative_eq!(m.x.x, 2.0 / 200.0);
        assert_relative_eq!(m.y.y, 2.0 / 100.0);
        assert_relative_eq!(m.w.w, 1.0);
    }

    #[test]
    fn near_and_far_planes() {
        let m = projection_matrix(&Camera::default(), Viewport::with_size(64, 64));
        let near = m * math::Vector4::new(0.0, 0.0, -NEAR, 1.0);
        let far = m * math::Vector4::new(0.0, 0.0, -FAR, 1.0);
        assert_relative_eq!(near.z / near.w, -1.0, epsilon = 1e-4);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn fov_mode_names() {
        assert_eq!("vertical_minus".parse::<FoVMode>().unwrap(), FoVMode::VerticalMinus);
        let err = "diagonal".parse::<FoVMode>().unwrap_err();
        assert_eq!(err.invariant(), Some(Invariant::UnsupportedFoVMode));
    }

    #[test]
    fn view_inverts_camera() {
        let camera = Camera {
            position: Vector3::new(1.0, 2.0, 3.0),
            ..Default::default()
        };

        let p = camera.view_matrix() * math::Vector4::new(1.0, 2.0, 3.0, 1.0);
        assert_relative_eq!(p.x, 0.0);
        assert_relative_eq!(p.y, 0.0);
        assert_relative_eq!(p.z, 0.0);
    }
}
