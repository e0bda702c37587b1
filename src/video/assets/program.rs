//! Linked shader programs and their uniform locations.

use smallvec::SmallVec;

use super::shader::ShaderHandle;

impl_handle!(ProgramHandle);

/// The shader stages a program was linked from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramParams {
    pub shaders: SmallVec<[ShaderHandle; 2]>,
}

/// Opaque location of a uniform inside a linked program.
///
/// Names that the program does not declare (or that the linker optimized away)
/// resolve to `UniformLocation::NONE`; commands writing to it are dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) i32);

impl UniformLocation {
    pub const NONE: UniformLocation = UniformLocation(-1);

    #[inline]
    pub fn new(location: i32) -> Self {
        if location < 0 {
            Self::NONE
        } else {
            UniformLocation(location)
        }
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub fn raw(self) -> i32 {
        self.0
    }
}

impl Default for UniformLocation {
    fn default() -> Self {
        Self::NONE
    }
}
