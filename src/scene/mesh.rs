//! Indexed static meshes and the built-in quad and cube.

use crate::errors::*;
use crate::math::{Vector2, Vector3};
use crate::utils::Plotter;
use crate::video::prelude::*;

/// Attribute locations shared by every scene program.
pub mod attributes {
    pub const COORD: u32 = 0;
    pub const NORMAL: u32 = 1;
    pub const TANGENT: u32 = 2;
    pub const TEX_COORD: u32 = 3;
    pub const COLOR: u32 = 4;
}

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

pub const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 0, 2, 3, // -z
    4, 6, 5, 4, 7, 6, // +z
    0, 4, 5, 0, 5, 1, // -y
    3, 2, 6, 3, 6, 7, // +y
    0, 3, 7, 0, 7, 4, // -x
    1, 5, 6, 1, 6, 2, // +x
];

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StaticVertex {
    pub coord: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub tex_coord: Vector2<f32>,
}

impl StaticVertex {
    pub const SIZE: usize = 32;

    pub fn new(coord: Vector3<f32>) -> Self {
        StaticVertex {
            coord,
            normal: Vector3::new(0.0, 0.0, 0.0),
            tex_coord: Vector2::new(0.0, 0.0),
        }
    }

    fn plot(&self, plotter: &mut Plotter) -> Result<()> {
        for &v in &[self.coord.x, self.coord.y, self.coord.z] {
            plotter.plot_f32(v)?;
        }

        for &v in &[self.normal.x, self.normal.y, self.normal.z] {
            plotter.plot_f32(v)?;
        }

        plotter.plot_f32(self.tex_coord.x)?;
        plotter.plot_f32(self.tex_coord.y)
    }
}

/// An immutable vertex and index buffer pair with its vertex array.
#[derive(Debug, Copy, Clone)]
pub struct StaticMesh {
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,
    vertex_array: VertexArrayHandle,
    count: u32,
}

impl StaticMesh {
    pub fn new(device: &mut Device, vertices: &[StaticVertex], indices: &[u16]) -> Result<Self> {
        let mut bytes = vec![0; vertices.len() * StaticVertex::SIZE];
        {
            let mut plotter: Plotter = Plotter::new(&mut bytes);
            for v in vertices {
                v.plot(&mut plotter)?;
            }
        }

        let mut index_bytes = vec![0; indices.len() * 2];
        {
            let mut plotter: Plotter = Plotter::new(&mut index_bytes);
            for &v in indices {
                plotter.plot_u16(v)?;
            }
        }

        let mut guard = ResourceGuard::new();
        let result = Self::allocate(device, &mut guard, &bytes, &index_bytes);
        match result {
            Ok((vertex_buffer, index_buffer, vertex_array)) => {
                guard.forget();
                Ok(StaticMesh {
                    vertex_buffer,
                    index_buffer,
                    vertex_array,
                    count: indices.len() as u32,
                })
            }
            Err(err) => {
                guard.release(device)?;
                Err(err)
            }
        }
    }

    fn allocate(
        device: &mut Device,
        guard: &mut ResourceGuard,
        vertices: &[u8],
        indices: &[u8],
    ) -> Result<(BufferHandle, BufferHandle, VertexArrayHandle)> {
        let vb = guard.create_buffer(device, BufferParams::vertex(vertices.len(), false), Some(vertices))?;
        let ib = guard.create_buffer(device, BufferParams::index(indices.len(), false), Some(indices))?;

        let params = VertexArrayParams::build(vb, StaticVertex::SIZE as u32)
            .with(attributes::COORD, VertexFormat::Float, 3, false)
            .with(attributes::NORMAL, VertexFormat::Float, 3, false)
            .with(attributes::TEX_COORD, VertexFormat::Float, 2, false)
            .with_index_buffer(ib)
            .finish();

        let va = guard.create_vertex_array(device, params)?;
        Ok((vb, ib, va))
    }

    /// Four vertices at `±1` in the xy plane.
    pub fn quad(device: &mut Device) -> Result<Self> {
        let vertices: Vec<StaticVertex> = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
            .iter()
            .map(|&(x, y)| StaticVertex {
                coord: Vector3::new(x, y, 0.0),
                normal: Vector3::new(0.0, 0.0, 1.0),
                tex_coord: Vector2::new(x * 0.5 + 0.5, y * 0.5 + 0.5),
            })
            .collect();

        Self::new(device, &vertices, &QUAD_INDICES)
    }

    /// Eight vertices at `±1` on every axis.
    pub fn cube(device: &mut Device) -> Result<Self> {
        let vertices: Vec<StaticVertex> = cube_corners()
            .iter()
            .map(|&v| StaticVertex::new(v))
            .collect();

        Self::new(device, &vertices, &CUBE_INDICES)
    }

    #[inline]
    pub fn vertex_array(&self) -> VertexArrayHandle {
        self.vertex_array
    }

    /// Number of indices.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Hands the buffers and vertex array of this mesh over to `guard`.
    pub fn track(&self, guard: &mut ResourceGuard) {
        guard.push(self.vertex_buffer);
        guard.push(self.index_buffer);
        guard.push(self.vertex_array);
    }

    pub fn delete(self, device: &mut Device) -> Result<()> {
        device.delete_vertex_array(self.vertex_array)?;
        device.delete_buffer(self.index_buffer)?;
        device.delete_buffer(self.vertex_buffer)
    }
}

/// Corners ordered bottom face first (`-z`), counter-clockwise from `(-1, -1)`.
fn cube_corners() -> [Vector3<f32>; 8] {
    [
        Vector3::new(-1.0, -1.0, -1.0),
        Vector3::new(1.0, -1.0, -1.0),
        Vector3::new(1.0, 1.0, -1.0),
        Vector3::new(-1.0, 1.0, -1.0),
        Vector3::new(-1.0, -1.0, 1.0),
        Vector3::new(1.0, -1.0, 1.0),
        Vector3::new(1.0, 1.0, 1.0),
        Vector3::new(-1.0, 1.0, 1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_meshes() {
        let mut device = Device::headless();
        let quad = StaticMesh::quad(&mut device).unwrap();
        let cube = StaticMesh::cube(&mut device).unwrap();
        assert_eq!(quad.count(), 6);
        assert_eq!(cube.count(), 36);

        let va = device.vertex_array(quad.vertex_array()).unwrap();
        assert!(va.index_buffer.is_some());

        quad.delete(&mut device).unwrap();
        cube.delete(&mut device).unwrap();
        assert_eq!(device.live_resources(), 0);
    }

    #[test]
    fn tracked_meshes_are_released_with_the_guard() {
        let mut device = Device::headless();
        let mut guard = ResourceGuard::new();
        let quad = StaticMesh::quad(&mut device).unwrap();
        quad.track(&mut guard);
        assert_eq!(guard.len(), 3);

        guard.release(&mut device).unwrap();
        assert!(device.vertex_array(quad.vertex_array()).is_none());
        assert_eq!(device.live_resources(), 0);
    }

    #[test]
    fn cube_faces_cover_every_corner() {
        let mut uses = [0; 8];
        for &v in CUBE_INDICES.iter() {
            uses[v as usize] += 1;
        }

        // Every corner touches three faces.
        assert!(uses.iter().all(|&v| v >= 3));
        assert_eq!(uses.iter().sum::<i32>(), 36);
    }
}
