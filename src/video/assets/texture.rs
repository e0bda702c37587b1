//! Two-dimensional and cube textures. Depth formats double as framebuffer
//! attachments.

use crate::errors::*;
use crate::math::Vector2;

impl_handle!(TextureHandle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    RGBA8,
    SRGB8Alpha8,
    RGBA32F,
    R8,
    Depth32,
    Depth24Stencil8,
}

impl TextureFormat {
    /// Bytes per texel in client memory.
    pub fn size(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::RGBA8 | TextureFormat::SRGB8Alpha8 => 4,
            TextureFormat::Depth32 | TextureFormat::Depth24Stencil8 => 4,
            TextureFormat::RGBA32F => 16,
        }
    }

    #[inline]
    pub fn is_depth(self) -> bool {
        self == TextureFormat::Depth32 || self == TextureFormat::Depth24Stencil8
    }

    #[inline]
    pub fn has_stencil(self) -> bool {
        self == TextureFormat::Depth24Stencil8
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureKind {
    TwoD,
    Cube,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureWrap {
    Repeat,
    Mirror,
    Clamp,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureParams {
    pub kind: TextureKind,
    pub format: TextureFormat,
    pub dimensions: Vector2<u32>,
    pub wrap: TextureWrap,
    pub filter: TextureFilter,
    pub mipmap: bool,
}

impl Default for TextureParams {
    fn default() -> Self {
        TextureParams {
            kind: TextureKind::TwoD,
            format: TextureFormat::RGBA8,
            dimensions: Vector2::new(0, 0),
            wrap: TextureWrap::Clamp,
            filter: TextureFilter::Linear,
            mipmap: false,
        }
    }
}

impl TextureParams {
    pub fn new(format: TextureFormat, width: u32, height: u32) -> Self {
        TextureParams {
            format,
            dimensions: Vector2::new(width, height),
            ..Default::default()
        }
    }

    /// Number of mip levels allocated for this texture.
    pub fn levels(&self) -> u32 {
        if self.mipmap {
            let max = self.dimensions.x.max(self.dimensions.y).max(1);
            32 - max.leading_zeros()
        } else {
            1
        }
    }

    /// Bytes of one face at level 0.
    #[inline]
    pub fn face_size(&self) -> usize {
        self.format.size() * self.dimensions.x as usize * self.dimensions.y as usize
    }

    pub fn validate(&self, data: Option<&TextureData>) -> Result<()> {
        let faces: Vec<&[u8]> = match (self.kind, data) {
            (_, None) => return Ok(()),
            (TextureKind::TwoD, Some(TextureData::TwoD(bytes))) => vec![&bytes[..]],
            (TextureKind::Cube, Some(TextureData::Cube(cube))) => cube.faces().to_vec(),
            _ => return Err(Error::Backend("texture data does not match its kind".into())),
        };

        let capacity = self.face_size();
        for bytes in faces {
            if bytes.len() > capacity {
                return Err(Error::BufferOverflow {
                    offset: 0,
                    len: bytes.len(),
                    capacity,
                });
            }
        }

        Ok(())
    }
}

/// Pixels of the six sides of a cube, named as seen from inside the cube.
#[derive(Debug, Clone, Default)]
pub struct CubeData {
    pub right: Vec<u8>,
    pub left: Vec<u8>,
    pub top: Vec<u8>,
    pub bottom: Vec<u8>,
    pub front: Vec<u8>,
    pub back: Vec<u8>,
}

impl CubeData {
    /// Faces in upload order `+X, -X, +Y, -Y, +Z, -Z`. The top side goes to `-Y`
    /// and the bottom side to `+Y` to match the cube map coordinate system.
    pub fn faces(&self) -> [&[u8]; 6] {
        [
            &self.right,
            &self.left,
            &self.bottom,
            &self.top,
            &self.front,
            &self.back,
        ]
    }
}

#[derive(Debug, Clone)]
pub enum TextureData {
    TwoD(Vec<u8>),
    Cube(CubeData),
}
