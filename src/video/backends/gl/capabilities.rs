use std::cmp;
use std::ffi;

use gl;
use gl::types::*;

use crate::errors::*;

/// Describes the OpenGL context profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Profile {
    Core,
    Compatibility,
}

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        match (*self, *other) {
            (Version::GL(a, b), Version::GL(c, d)) | (Version::ES(a, b), Version::ES(c, d)) => {
                Some((a, b).cmp(&(c, d)))
            }
            _ => None,
        }
    }
}

impl Version {
    /// Parses a `GL_VERSION` string like `"4.6.0 NVIDIA 535.54"` or
    /// `"OpenGL ES 3.2 Mesa"`.
    pub fn parse_str(desc: &str) -> Result<Version> {
        let (es, desc) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else {
            (false, desc)
        };

        let malformed = || Error::Backend(format!("[GL] Malformed version string {:?}.", desc));
        let desc = desc.split(' ').next().ok_or_else(malformed)?;

        let mut iter = desc.split('.');
        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    /// Obtains the OpenGL version of the current context using the loaded functions.
    ///
    /// # Unsafe
    ///
    /// You must ensure that the functions belong to the current context.
    pub unsafe fn parse() -> Result<Version> {
        Self::parse_str(&parse_str(gl::VERSION)?)
    }
}

/// Represents the capabilities of the context. Contrary to the state, these
/// values never change.
#[derive(Debug)]
pub struct Capabilities {
    pub version: Version,
    pub vendor: String,
    pub renderer: String,
    pub profile: Option<Profile>,
    /// The context is in debug mode.
    pub debug: bool,
    /// Maximum width and height of `glViewport`.
    pub max_viewport_dims: (u32, u32),
    /// Maximum number of textures that can be bound to a program.
    pub max_combined_texture_image_units: u32,
    /// Maximum number of color attachment bind points.
    pub max_color_attachments: u32,
    /// Maximum number of `gl_ClipDistance` outputs.
    pub max_clip_distances: u32,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        let version = Version::parse()?;

        let mut flags = 0;
        gl::GetIntegerv(gl::CONTEXT_FLAGS, &mut flags);

        Ok(Capabilities {
            version,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
            profile: Self::parse_profile(),
            debug: (flags as GLenum & gl::CONTEXT_FLAG_DEBUG_BIT) != 0,
            max_viewport_dims: Self::parse_viewport_dims(),
            max_combined_texture_image_units: parse_u32(gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS),
            max_color_attachments: parse_u32(gl::MAX_COLOR_ATTACHMENTS),
            max_clip_distances: parse_u32(gl::MAX_CLIP_DISTANCES),
        })
    }

    #[inline]
    unsafe fn parse_viewport_dims() -> (u32, u32) {
        let mut val: [GLint; 2] = [0, 0];
        gl::GetIntegerv(gl::MAX_VIEWPORT_DIMS, val.as_mut_ptr());
        (val[0] as u32, val[1] as u32)
    }

    #[inline]
    unsafe fn parse_profile() -> Option<Profile> {
        let mut val = 0;
        gl::GetIntegerv(gl::CONTEXT_PROFILE_MASK, &mut val);
        let val = val as GLenum;
        if (val & gl::CONTEXT_COMPATIBILITY_PROFILE_BIT) != 0 {
            Some(Profile::Compatibility)
        } else if (val & gl::CONTEXT_CORE_PROFILE_BIT) != 0 {
            Some(Profile::Core)
        } else {
            None
        }
    }

    /// Rejects contexts that lack what the renderers rely on.
    pub fn check(&self) -> Result<()> {
        if !(self.version >= Version::GL(3, 3)) {
            let reason = format!("OpenGL 3.3 or later is required, got {:?}.", self.version);
            return Err(Error::Backend(reason));
        }

        if self.version < Version::GL(4, 6) {
            warn!("Running on {:?}, shaders target GLSL 4.60.", self.version);
        }

        if self.max_clip_distances < 4 {
            return Err(Error::Backend("4 clip distances are required.".into()));
        }

        if self.max_color_attachments < 2 {
            return Err(Error::Backend("2 color attachments are required.".into()));
        }

        Ok(())
    }
}

#[inline]
unsafe fn parse_u32(id: GLenum) -> u32 {
    let mut val = 0;
    gl::GetIntegerv(id, &mut val);
    val.max(0) as u32
}

unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        return Err(Error::Backend(format!("[GL] String of {} is null.", id)));
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| Error::Backend(format!("[GL] String of {} is malformed.", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version() {
        let v = Version::parse_str("4.6.0 NVIDIA 535.54.03").unwrap();
        assert_eq!(v, Version::GL(4, 6));
        assert!(v >= Version::GL(3, 3));
        assert!(v < Version::GL(4, 7));

        let v = Version::parse_str("OpenGL ES 3.2 Mesa 23.0").unwrap();
        assert_eq!(v, Version::ES(3, 2));
        assert_eq!(v.partial_cmp(&Version::GL(3, 2)), None);

        assert!(Version::parse_str("garbage").is_err());
    }
}
