//! Append-only vertex streams uploaded once per frame.

use std::marker::PhantomData;

use crate::errors::*;
use crate::math::Vector2;
use crate::utils::{Plotter, Scanner};
use crate::video::prelude::*;

/// Default capacity of every canvas mesh, in vertices.
pub const MAX_VERTICES: usize = 524_288;

/// A vertex layout that can be written into and read back from a mesh.
pub trait MeshVertex: Copy + Sized {
    /// Bytes per vertex.
    const SIZE: usize;

    fn plot(&self, plotter: &mut Plotter) -> Result<()>;

    fn scan(scanner: &mut Scanner) -> Result<Self>;

    fn layout(buffer: BufferHandle) -> VertexArrayParams;
}

/// Position only, used by filled shapes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ShapeVertex {
    pub position: Vector2<f32>,
}

/// Position and a normalized RGBA8 color, used by stroked contours.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContourVertex {
    pub position: Vector2<f32>,
    pub color: [u8; 4],
}

/// Position and atlas coordinates, used by text.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextVertex {
    pub position: Vector2<f32>,
    pub uv: Vector2<f32>,
}

impl ShapeVertex {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        ShapeVertex {
            position: Vector2::new(x, y),
        }
    }
}

impl MeshVertex for ShapeVertex {
    const SIZE: usize = 8;

    fn plot(&self, plotter: &mut Plotter) -> Result<()> {
        plotter.plot_f32(self.position.x)?;
        plotter.plot_f32(self.position.y)
    }

    fn scan(scanner: &mut Scanner) -> Result<Self> {
        let x = scanner.scan_f32()?;
        let y = scanner.scan_f32()?;
        Ok(ShapeVertex::new(x, y))
    }

    fn layout(buffer: BufferHandle) -> VertexArrayParams {
        VertexArrayParams::build(buffer, Self::SIZE as u32)
            .with(0, VertexFormat::Float, 2, false)
            .finish()
    }
}

impl MeshVertex for ContourVertex {
    const SIZE: usize = 12;

    fn plot(&self, plotter: &mut Plotter) -> Result<()> {
        plotter.plot_f32(self.position.x)?;
        plotter.plot_f32(self.position.y)?;
        plotter.plot_bytes(&self.color)
    }

    fn scan(scanner: &mut Scanner) -> Result<Self> {
        let x = scanner.scan_f32()?;
        let y = scanner.scan_f32()?;
        let mut color = [0u8; 4];
        for v in &mut color {
            *v = scanner.scan_u8()?;
        }

        Ok(ContourVertex {
            position: Vector2::new(x, y),
            color,
        })
    }

    fn layout(buffer: BufferHandle) -> VertexArrayParams {
        VertexArrayParams::build(buffer, Self::SIZE as u32)
            .with(0, VertexFormat::Float, 2, false)
            .with(1, VertexFormat::UByte, 4, true)
            .finish()
    }
}

impl MeshVertex for TextVertex {
    const SIZE: usize = 16;

    fn plot(&self, plotter: &mut Plotter) -> Result<()> {
        plotter.plot_f32(self.position.x)?;
        plotter.plot_f32(self.position.y)?;
        plotter.plot_f32(self.uv.x)?;
        plotter.plot_f32(self.uv.y)
    }

    fn scan(scanner: &mut Scanner) -> Result<Self> {
        let position = Vector2::new(scanner.scan_f32()?, scanner.scan_f32()?);
        let uv = Vector2::new(scanner.scan_f32()?, scanner.scan_f32()?);
        Ok(TextVertex { position, uv })
    }

    fn layout(buffer: BufferHandle) -> VertexArrayParams {
        VertexArrayParams::build(buffer, Self::SIZE as u32)
            .with(0, VertexFormat::Float, 2, false)
            .with(1, VertexFormat::Float, 2, false)
            .finish()
    }
}

/// A CPU-side vertex stream mirrored by a dynamic GPU buffer.
///
/// Vertices are appended between `reset` calls and uploaded in one go by
/// `update`. `offset` is the index the next appended vertex will have, which is
/// what draw commands use as their start.
pub struct Mesh<V: MeshVertex> {
    buffer: BufferHandle,
    vertex_array: VertexArrayHandle,
    bytes: Vec<u8>,
    cursor: usize,
    _vertex: PhantomData<V>,
}

impl<V: MeshVertex> Mesh<V> {
    pub fn new(device: &mut Device, max_vertices: usize) -> Result<Self> {
        let mut guard = ResourceGuard::new();
        match Self::allocate(device, &mut guard, max_vertices) {
            Ok(v) => {
                guard.forget();
                Ok(v)
            }
            Err(err) => {
                guard.release(device)?;
                Err(err)
            }
        }
    }

    /// Creates a mesh whose buffer and vertex array are tracked by `guard`.
    pub fn allocate(
        device: &mut Device,
        guard: &mut ResourceGuard,
        max_vertices: usize,
    ) -> Result<Self> {
        let size = max_vertices.checked_mul(V::SIZE).ok_or_else(|| {
            Error::Settings(format!(
                "{} vertices of {} bytes do not fit in a buffer",
                max_vertices,
                V::SIZE
            ))
        })?;

        let buffer = guard.create_buffer(device, BufferParams::vertex(size, true), None)?;
        let vertex_array = guard.create_vertex_array(device, V::layout(buffer))?;

        Ok(Mesh {
            buffer,
            vertex_array,
            bytes: vec![0; size],
            cursor: 0,
            _vertex: PhantomData,
        })
    }

    #[inline]
    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    /// The number of vertices appended since the last reset.
    #[inline]
    pub fn offset(&self) -> u32 {
        (self.cursor / V::SIZE) as u32
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.bytes.len() / V::SIZE
    }

    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Writes one vertex. Fails with `BufferOverflow` once the mesh is full, in
    /// which case nothing is written.
    pub fn append(&mut self, vertex: V) -> Result<()> {
        let mut plotter: Plotter = Plotter::new(&mut self.bytes);
        plotter.seek(self.cursor)?;
        vertex.plot(&mut plotter)?;
        self.cursor = plotter.offset();
        Ok(())
    }

    /// Reads back the vertex at `index`.
    pub fn vertex(&self, index: u32) -> Result<V> {
        let mut scanner: Scanner = Scanner::new(&self.bytes[..self.cursor]);
        scanner.seek(index as usize * V::SIZE)?;
        V::scan(&mut scanner)
    }

    /// Uploads the appended bytes to the start of the GPU buffer.
    pub fn update(&self, device: &mut Device) -> Result<()> {
        device.update_buffer(self.buffer, 0, &self.bytes[..self.cursor])
    }

    pub fn delete(self, device: &mut Device) -> Result<()> {
        device.delete_vertex_array(self.vertex_array)?;
        device.delete_buffer(self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::backends::headless::HeadlessVisitor;

    #[test]
    fn append_and_read_back() {
        let mut device = Device::headless();
        let mut mesh = Mesh::<ContourVertex>::new(&mut device, 4).unwrap();
        assert_eq!(mesh.offset(), 0);

        let v = ContourVertex {
            position: Vector2::new(1.0, 2.0),
            color: [255, 0, 128, 255],
        };

        mesh.append(v).unwrap();
        mesh.append(v).unwrap();
        assert_eq!(mesh.offset(), 2);
        assert_eq!(mesh.vertex(1).unwrap(), v);
        assert!(mesh.vertex(2).is_err());

        mesh.update(&mut device).unwrap();
        mesh.reset();
        assert_eq!(mesh.offset(), 0);
        mesh.delete(&mut device).unwrap();
    }

    #[test]
    fn overflow_keeps_the_cursor() {
        let mut device = Device::headless();
        let mut mesh = Mesh::<ShapeVertex>::new(&mut device, 2).unwrap();
        mesh.append(ShapeVertex::new(0.0, 0.0)).unwrap();
        mesh.append(ShapeVertex::new(1.0, 0.0)).unwrap();

        match mesh.append(ShapeVertex::new(2.0, 0.0)) {
            Err(Error::BufferOverflow { capacity, .. }) => assert_eq!(capacity, 16),
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(mesh.offset(), 2);
    }

    #[test]
    fn oversized_meshes_are_rejected() {
        let mut device = Device::headless();
        match Mesh::<TextVertex>::new(&mut device, usize::max_value() / 8) {
            Err(Error::Settings(_)) => {}
            other => panic!("unexpected {:?}", other.map(|v| v.capacity())),
        }

        assert_eq!(device.live_resources(), 0);
    }

    #[test]
    fn failed_meshes_release_their_buffer() {
        let mut device = Device::new(Box::new(HeadlessVisitor::with_limit(1)));
        match Mesh::<ShapeVertex>::new(&mut device, 4) {
            Err(Error::Backend(_)) => {}
            other => panic!("unexpected {:?}", other.map(|v| v.capacity())),
        }

        assert_eq!(device.live_resources(), 0);
    }
}
