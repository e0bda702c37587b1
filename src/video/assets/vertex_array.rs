//! Vertex arrays bind interleaved attributes of vertex buffers to shader
//! locations, plus an optional `u16` index buffer.

use smallvec::SmallVec;

use super::buffer::BufferHandle;

impl_handle!(VertexArrayHandle);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VertexFormat {
    Float,
    UByte,
}

impl VertexFormat {
    pub fn size(self) -> u32 {
        match self {
            VertexFormat::Float => 4,
            VertexFormat::UByte => 1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub buffer: BufferHandle,
    pub format: VertexFormat,
    pub components: u8,
    pub normalized: bool,
    pub stride: u32,
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexArrayParams {
    pub attributes: SmallVec<[VertexAttribute; 6]>,
    pub index_buffer: Option<BufferHandle>,
}

impl VertexArrayParams {
    /// Starts an interleaved layout over `buffer`, where every vertex occupies
    /// `stride` bytes.
    pub fn build(buffer: BufferHandle, stride: u32) -> VertexLayoutBuilder {
        VertexLayoutBuilder {
            buffer,
            stride,
            offset: 0,
            params: VertexArrayParams::default(),
        }
    }
}

pub struct VertexLayoutBuilder {
    buffer: BufferHandle,
    stride: u32,
    offset: u32,
    params: VertexArrayParams,
}

impl VertexLayoutBuilder {
    /// Appends an attribute right after the previous one.
    pub fn with(
        mut self,
        location: u32,
        format: VertexFormat,
        components: u8,
        normalized: bool,
    ) -> Self {
        self.params.attributes.push(VertexAttribute {
            location,
            buffer: self.buffer,
            format,
            components,
            normalized,
            stride: self.stride,
            offset: self.offset,
        });

        self.offset += format.size() * u32::from(components);
        self
    }

    pub fn with_index_buffer(mut self, buffer: BufferHandle) -> Self {
        self.params.index_buffer = Some(buffer);
        self
    }

    pub fn finish(self) -> VertexArrayParams {
        self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaved_offsets() {
        let vb = BufferHandle::default();
        let params = VertexArrayParams::build(vb, 12)
            .with(0, VertexFormat::Float, 2, false)
            .with(1, VertexFormat::UByte, 4, true)
            .finish();

        assert_eq!(params.attributes.len(), 2);
        assert_eq!(params.attributes[1].offset, 8);
        assert_eq!(params.attributes[1].stride, 12);
        assert!(params.index_buffer.is_none());
    }
}
