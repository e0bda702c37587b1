use serde::{Deserialize, Serialize};

/// A RGBA `Color`. Each component is a floating point value, nominally within
/// `[0, 1]` but HDR values are allowed.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Color { r, g, b, a }
    }

    /// Linear interpolation in RGBA space, `t = 0` yields `self`.
    #[inline]
    pub fn lerp(self, rhs: Color, t: f32) -> Self {
        let s = 1.0 - t;
        Color::new(
            s * self.r + t * rhs.r,
            s * self.g + t * rhs.g,
            s * self.b + t * rhs.b,
            s * self.a + t * rhs.a,
        )
    }

    /// Clip to [0.0, 1.0] range.
    pub fn clip(self) -> Self {
        Color::new(
            self.r.max(0.0).min(1.0),
            self.g.max(0.0).min(1.0),
            self.b.max(0.0).min(1.0),
            self.a.max(0.0).min(1.0),
        )
    }

    /// Relative luminance with the sRGB weights.
    #[inline]
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Replaces the alpha channel.
    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Color { a, ..self }
    }

    #[inline]
    pub fn rgb(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    #[inline]
    pub fn rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn rgba8(self) -> [u8; 4] {
        let v = self.clip();
        [
            (v.r * 255.0).round() as u8,
            (v.g * 255.0).round() as u8,
            (v.b * 255.0).round() as u8,
            (v.a * 255.0).round() as u8,
        ]
    }
}

impl From<[u8; 4]> for Color {
    fn from(v: [u8; 4]) -> Self {
        Color::new(
            f32::from(v[0]) / 255.0,
            f32::from(v[1]) / 255.0,
            f32::from(v[2]) / 255.0,
            f32::from(v[3]) / 255.0,
        )
    }
}

impl From<[f32; 4]> for Color {
    fn from(v: [f32; 4]) -> Self {
        Color::new(v[0], v[1], v[2], v[3])
    }
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const GRAY: Color = Color::new(0.5, 0.5, 0.5, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
}
