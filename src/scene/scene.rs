//! The scene container read by the deferred renderer.
//!
//! Renderables and lights live in object pools. A separate list per kind keeps
//! their insertion order, which is the order the renderer draws them in.

use crate::math::{Color, Matrix4, SquareMatrix, Vector3};
use crate::settings::SceneSettings;
use crate::utils::ObjectPool;
use crate::video::prelude::*;

use super::camera::Camera;
use super::material::Material;

impl_handle!(RenderableHandle);
impl_handle!(DirectionalLightHandle);

/// A range of indices drawn with one material.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SubMesh {
    pub topology: Topology,
    pub offset: u32,
    pub count: u32,
    pub material: Material,
}

/// An indexed vertex array split into sub-meshes.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMesh {
    pub vertex_array: VertexArrayHandle,
    pub sub_meshes: Vec<SubMesh>,
}

/// A node of a model hierarchy. `matrix` is relative to the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    pub matrix: Matrix4<f32>,
    pub mesh: Option<ModelMesh>,
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn new(mesh: ModelMesh) -> Self {
        ModelNode {
            matrix: Matrix4::identity(),
            mesh: Some(mesh),
            children: Vec::new(),
        }
    }
}

/// A sub-mesh ready to draw, with the world matrix of its node.
#[derive(Debug, Copy, Clone)]
pub struct MeshDraw<'a> {
    pub model_matrix: Matrix4<f32>,
    pub vertex_array: VertexArrayHandle,
    pub sub_mesh: &'a SubMesh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Renderable {
    pub matrix: Matrix4<f32>,
    pub nodes: Vec<ModelNode>,
}

impl Renderable {
    pub fn new(matrix: Matrix4<f32>, nodes: Vec<ModelNode>) -> Self {
        Renderable { matrix, nodes }
    }

    /// Flattens the node hierarchy depth first.
    pub fn draws(&self) -> Vec<MeshDraw> {
        let mut out = Vec::new();
        for node in &self.nodes {
            collect(node, self.matrix, &mut out);
        }

        out
    }
}

fn collect<'a>(node: &'a ModelNode, parent: Matrix4<f32>, out: &mut Vec<MeshDraw<'a>>) {
    let world = parent * node.matrix;
    if let Some(ref mesh) = node.mesh {
        for sub_mesh in &mesh.sub_meshes {
            out.push(MeshDraw {
                model_matrix: world,
                vertex_array: mesh.vertex_array,
                sub_mesh,
            });
        }
    }

    for child in &node.children {
        collect(child, world, out);
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DirectionalLight {
    /// The direction the light travels in, in world space.
    pub direction: Vector3<f32>,
    /// Radiance per color channel.
    pub intensity: Vector3<f32>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sky {
    pub color: Color,
    /// A cube texture drawn behind every renderable.
    pub skybox: Option<TextureHandle>,
}

pub struct Scene {
    renderables: ObjectPool<RenderableHandle, Renderable>,
    renderable_order: Vec<RenderableHandle>,
    lights: ObjectPool<DirectionalLightHandle, DirectionalLight>,
    light_order: Vec<DirectionalLightHandle>,
    pub sky: Sky,
    pub camera: Camera,
}

impl Scene {
    pub fn new(settings: &SceneSettings) -> Self {
        Scene {
            renderables: ObjectPool::new(),
            renderable_order: Vec::new(),
            lights: ObjectPool::new(),
            light_order: Vec::new(),
            sky: Sky {
                color: settings.sky_color,
                skybox: None,
            },
            camera: Camera::default(),
        }
    }

    pub fn create_renderable(&mut self, renderable: Renderable) -> RenderableHandle {
        let handle = self.renderables.create(renderable);
        self.renderable_order.push(handle);
        handle
    }

    pub fn renderable(&self, handle: RenderableHandle) -> Option<&Renderable> {
        self.renderables.get(handle)
    }

    pub fn renderable_mut(&mut self, handle: RenderableHandle) -> Option<&mut Renderable> {
        self.renderables.get_mut(handle)
    }

    pub fn delete_renderable(&mut self, handle: RenderableHandle) -> Option<Renderable> {
        let v = self.renderables.free(handle)?;
        self.renderable_order.retain(|&h| h != handle);
        Some(v)
    }

    /// Renderables in insertion order.
    pub fn renderables(&self) -> impl Iterator<Item = &Renderable> {
        let pool = &self.renderables;
        self.renderable_order.iter().filter_map(move |&h| pool.get(h))
    }

    pub fn create_directional_light(&mut self, light: DirectionalLight) -> DirectionalLightHandle {
        let handle = self.lights.create(light);
        self.light_order.push(handle);
        handle
    }

    pub fn directional_light(&self, handle: DirectionalLightHandle) -> Option<&DirectionalLight> {
        self.lights.get(handle)
    }

    pub fn directional_light_mut(
        &mut self,
        handle: DirectionalLightHandle,
    ) -> Option<&mut DirectionalLight> {
        self.lights.get_mut(handle)
    }

    pub fn delete_directional_light(
        &mut self,
        handle: DirectionalLightHandle,
    ) -> Option<DirectionalLight> {
        let v = self.lights.free(handle)?;
        self.light_order.retain(|&h| h != handle);
        Some(v)
    }

    /// Directional lights in insertion order.
    pub fn directional_lights(&self) -> impl Iterator<Item = &DirectionalLight> {
        let pool = &self.lights;
        self.light_order.iter().filter_map(move |&h| pool.get(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;

    fn light(x: f32) -> DirectionalLight {
        DirectionalLight {
            direction: Vector3::new(x, -1.0, 0.0),
            intensity: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    #[test]
    fn lights_keep_insertion_order() {
        let mut scene = Scene::new(&SceneSettings::default());
        let a = scene.create_directional_light(light(1.0));
        scene.create_directional_light(light(2.0));
        scene.delete_directional_light(a).unwrap();
        scene.create_directional_light(light(3.0));

        let xs: Vec<f32> = scene.directional_lights().map(|v| v.direction.x).collect();
        assert_eq!(xs, vec![2.0, 3.0]);
        assert!(scene.delete_directional_light(a).is_none());
    }

    #[test]
    fn node_matrices_compose() {
        let sub_mesh = SubMesh {
            topology: Topology::Triangles,
            offset: 0,
            count: 3,
            material: Material::new(ProgramHandle::default()),
        };

        let mesh = ModelMesh {
            vertex_array: VertexArrayHandle::default(),
            sub_meshes: vec![sub_mesh],
        };

        let mut child = ModelNode::new(mesh.clone());
        child.matrix = Matrix4::from_translation(Vector3::new(0.0, 2.0, 0.0));

        let mut root = ModelNode::new(mesh);
        root.children.push(child);

        let parent = Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0));
        let renderable = Renderable::new(parent, vec![root]);
        let draws = renderable.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].model_matrix, parent);
        assert_eq!(
            draws[1].model_matrix.w.truncate(),
            Vector3::new(1.0, 2.0, 0.0)
        );
    }
}
