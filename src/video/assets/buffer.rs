//! Linear GPU memory holding vertices or `u16` indices.

use crate::errors::*;

impl_handle!(BufferHandle);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// The size of a buffer is fixed at allocation. Only `dynamic` buffers accept
/// updates afterwards.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferParams {
    pub kind: BufferKind,
    pub size: usize,
    pub dynamic: bool,
}

impl BufferParams {
    pub fn vertex(size: usize, dynamic: bool) -> Self {
        BufferParams {
            kind: BufferKind::Vertex,
            size,
            dynamic,
        }
    }

    pub fn index(size: usize, dynamic: bool) -> Self {
        BufferParams {
            kind: BufferKind::Index,
            size,
            dynamic,
        }
    }

    /// Checks the initial contents of a new buffer.
    pub fn validate(&self, data: Option<&[u8]>) -> Result<()> {
        if let Some(bytes) = data {
            if bytes.len() > self.size {
                return Err(Error::BufferOverflow {
                    offset: 0,
                    len: bytes.len(),
                    capacity: self.size,
                });
            }
        }

        Ok(())
    }

    /// Checks an `update(offset, bytes)` against this buffer.
    pub fn validate_update(&self, offset: usize, len: usize) -> Result<()> {
        if !self.dynamic {
            return Err(Invariant::ImmutableBuffer.into());
        }

        if offset + len > self.size {
            return Err(Error::BufferOverflow {
                offset,
                len,
                capacity: self.size,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_bounds() {
        let params = BufferParams::vertex(16, true);
        assert!(params.validate_update(0, 16).is_ok());
        assert!(params.validate_update(8, 8).is_ok());
        assert!(params.validate_update(9, 8).is_err());

        let params = BufferParams::index(16, false);
        assert_eq!(
            params.validate_update(0, 2).unwrap_err().invariant(),
            Some(Invariant::ImmutableBuffer)
        );
    }
}
