//! The deferred PBR renderer.
//!
//! A frame runs five passes:
//!
//! 1. Geometry. Every sub-mesh writes base color, metalness, normal and
//!    roughness into the G-buffer, depth tested with `LessOrEqual`.
//! 2. Lighting. A full-screen quad per directional light accumulates radiance
//!    into the HDR target with additive blending. The HDR target shares the
//!    depth texture of the G-buffer.
//! 3. Forward. The skybox is drawn at depth 1 where nothing else was.
//! 4. Exposure probe. The HDR target is averaged into a 1×1 texture which is
//!    read back to drive auto exposure.
//! 5. Postprocess. The exposed HDR target is tone mapped to the screen.

use std::collections::HashMap;

use crate::errors::*;
use crate::math::{Color, Matrix4, Vector3, Vector4};
use crate::settings::{SceneSettings, ToneMapping};
use crate::utils::Scanner;
use crate::video::prelude::*;

use super::camera::{projection_matrix, Camera};
use super::framebuffers::Framebuffers;
use super::mesh::StaticMesh;
use super::scene::{MeshDraw, Scene};
use super::shaders;

/// Weight of a new probe sample in the exposure moving average.
pub const EXPOSURE_SMOOTHING: f32 = 0.005;

/// Relative luminance of a linear RGB color.
#[inline]
pub fn luminance(rgb: Vector3<f32>) -> f32 {
    0.2126 * rgb.x + 0.7152 * rgb.y + 0.0722 * rgb.z
}

/// Moves `last` toward the exposure that maps the average color `rgb` to
/// middle gray. A sample without positive finite luminance leaves `last`
/// unchanged.
pub fn next_exposure(last: f32, rgb: Vector3<f32>) -> f32 {
    let y = luminance(rgb);
    if y <= 0.0 || !y.is_finite() {
        warn!("Exposure probe returned luminance {}, keeping exposure {}.", y, last);
        return last;
    }

    let target = 1.0 / (9.8 * y);
    (1.0 - EXPOSURE_SMOOTHING) * last + EXPOSURE_SMOOTHING * target
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ProgramHandle,
    vertex_array: VertexArrayHandle,
    topology: Topology,
    culling: CullFace,
}

#[derive(Debug, Copy, Clone)]
struct GeometryUniforms {
    projection: UniformLocation,
    view: UniformLocation,
    model: UniformLocation,
    albedo_color: UniformLocation,
    metalness: UniformLocation,
    roughness: UniformLocation,
    alpha_threshold: UniformLocation,
    albedo_texture: UniformLocation,
}

impl GeometryUniforms {
    fn resolve(device: &mut Device, program: ProgramHandle) -> Result<Self> {
        Ok(GeometryUniforms {
            projection: device.uniform_location(program, "projectionMatrixIn")?,
            view: device.uniform_location(program, "viewMatrixIn")?,
            model: device.uniform_location(program, "modelMatrixIn")?,
            albedo_color: device.uniform_location(program, "albedoColorIn")?,
            metalness: device.uniform_location(program, "metalnessIn")?,
            roughness: device.uniform_location(program, "roughnessIn")?,
            alpha_threshold: device.uniform_location(program, "alphaThresholdIn")?,
            albedo_texture: device.uniform_location(program, "albedoTwoDTextureIn")?,
        })
    }
}

#[derive(Debug, Copy, Clone)]
struct LightingUniforms {
    color0: UniformLocation,
    color1: UniformLocation,
    depth: UniformLocation,
    projection: UniformLocation,
    view: UniformLocation,
    camera: UniformLocation,
    direction: UniformLocation,
    intensity: UniformLocation,
}

impl LightingUniforms {
    fn resolve(device: &mut Device, program: ProgramHandle) -> Result<Self> {
        Ok(LightingUniforms {
            color0: device.uniform_location(program, "fbColor0TextureIn")?,
            color1: device.uniform_location(program, "fbColor1TextureIn")?,
            depth: device.uniform_location(program, "fbDepthTextureIn")?,
            projection: device.uniform_location(program, "projectionMatrixIn")?,
            view: device.uniform_location(program, "viewMatrixIn")?,
            camera: device.uniform_location(program, "cameraMatrixIn")?,
            direction: device.uniform_location(program, "lightDirectionIn")?,
            intensity: device.uniform_location(program, "lightIntensityIn")?,
        })
    }
}

/// The pipeline of a built-in program and the uniform locations it needs.
#[derive(Debug, Copy, Clone)]
struct Stage<U> {
    pipeline: PipelineHandle,
    uniforms: U,
}

impl<U> Stage<U> {
    fn new<F>(
        device: &mut Device,
        guard: &mut ResourceGuard,
        source: &shaders::ProgramSource,
        params: F,
        resolve: fn(&mut Device, ProgramHandle) -> Result<U>,
    ) -> Result<Self>
    where
        F: FnOnce(ProgramHandle) -> PipelineParams,
    {
        let program = guard.create_render_program(device, &source.vs, &source.fs)?;
        let uniforms = resolve(device, program)?;
        let pipeline = guard.create_pipeline(device, params(program))?;
        Ok(Stage { pipeline, uniforms })
    }
}

#[derive(Debug, Copy, Clone)]
struct SkyboxUniforms {
    projection: UniformLocation,
    view: UniformLocation,
    skybox: UniformLocation,
}

fn resolve_skybox(device: &mut Device, program: ProgramHandle) -> Result<SkyboxUniforms> {
    Ok(SkyboxUniforms {
        projection: device.uniform_location(program, "projectionMatrixIn")?,
        view: device.uniform_location(program, "viewMatrixIn")?,
        skybox: device.uniform_location(program, "skyboxTextureIn")?,
    })
}

#[derive(Debug, Copy, Clone)]
struct ProbeUniforms {
    hdr: UniformLocation,
}

fn resolve_probe(device: &mut Device, program: ProgramHandle) -> Result<ProbeUniforms> {
    Ok(ProbeUniforms {
        hdr: device.uniform_location(program, "hdrIn")?,
    })
}

#[derive(Debug, Copy, Clone)]
struct PostprocessUniforms {
    color0: UniformLocation,
    exposure: UniformLocation,
}

fn resolve_postprocess(device: &mut Device, program: ProgramHandle) -> Result<PostprocessUniforms> {
    Ok(PostprocessUniforms {
        color0: device.uniform_location(program, "fbColor0TextureIn")?,
        exposure: device.uniform_location(program, "exposureIn")?,
    })
}

pub struct Renderer {
    settings: SceneSettings,
    framebuffers: Framebuffers,
    quad: StaticMesh,
    cube: StaticMesh,
    lighting: Stage<LightingUniforms>,
    skybox: Stage<SkyboxUniforms>,
    probe: Stage<ProbeUniforms>,
    postprocess: Stage<PostprocessUniforms>,
    geometry_pipelines: HashMap<PipelineKey, PipelineHandle>,
    geometry_uniforms: HashMap<ProgramHandle, GeometryUniforms>,
    queue: CommandQueue,
    last_exposure: f32,
    guard: ResourceGuard,
}

impl Renderer {
    /// Creates the renderer with offscreen targets of `width × height`. Nothing
    /// is left allocated if any of its resources fails.
    pub fn new(device: &mut Device, settings: &SceneSettings, width: u32, height: u32) -> Result<Self> {
        let mut guard = ResourceGuard::new();
        match Self::allocate(device, &mut guard, settings, width, height) {
            Ok(mut v) => {
                v.guard = guard;
                info!(
                    "Created scene renderer of {}x{} with {:?} tone mapping.",
                    width, height, settings.tone_mapping
                );
                Ok(v)
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
        settings: &SceneSettings,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let quad = StaticMesh::quad(device)?;
        quad.track(guard);
        let cube = StaticMesh::cube(device)?;
        cube.track(guard);

        let qva = quad.vertex_array();
        let lighting = Stage::new(
            device,
            guard,
            &shaders::lighting(),
            |p| {
                let mut params = PipelineParams::new(p, Some(qva));
                params.blend = BlendState::additive();
                params
            },
            LightingUniforms::resolve,
        )?;

        let cva = cube.vertex_array();
        let skybox = Stage::new(
            device,
            guard,
            &shaders::skybox(),
            |p| {
                let mut params = PipelineParams::new(p, Some(cva));
                params.depth = DepthState {
                    test: true,
                    write: false,
                    comparison: Comparison::LessOrEqual,
                };
                params
            },
            resolve_skybox,
        )?;

        let probe = Stage::new(
            device,
            guard,
            &shaders::probe(),
            |p| PipelineParams::new(p, Some(qva)),
            resolve_probe,
        )?;

        let postprocess = Stage::new(
            device,
            guard,
            &shaders::postprocess(settings.tone_mapping),
            |p| PipelineParams::new(p, Some(qva)),
            resolve_postprocess,
        )?;

        // Last, as it releases its own targets when it fails.
        let framebuffers = Framebuffers::new(device, width, height, settings.high_precision_albedo)?;

        Ok(Renderer {
            settings: settings.clone(),
            framebuffers,
            quad,
            cube,
            lighting,
            skybox,
            probe,
            postprocess,
            geometry_pipelines: HashMap::new(),
            geometry_uniforms: HashMap::new(),
            queue: CommandQueue::new(),
            last_exposure: 1.0,
            guard: ResourceGuard::new(),
        })
    }

    pub fn delete(mut self, device: &mut Device) -> Result<()> {
        for (_, v) in self.geometry_pipelines.drain() {
            device.delete_pipeline(v)?;
        }

        self.framebuffers.delete(device)?;
        self.guard.release(device)
    }

    /// Reallocates the offscreen targets.
    pub fn resize(&mut self, device: &mut Device, width: u32, height: u32) -> Result<()> {
        let framebuffers =
            Framebuffers::new(device, width, height, self.settings.high_precision_albedo)?;
        let old = ::std::mem::replace(&mut self.framebuffers, framebuffers);
        old.delete(device)
    }

    #[inline]
    pub fn framebuffers(&self) -> &Framebuffers {
        &self.framebuffers
    }

    #[inline]
    pub fn tone_mapping(&self) -> ToneMapping {
        self.settings.tone_mapping
    }

    /// The smoothed exposure fed back from the probe, starting at 1.
    #[inline]
    pub fn last_exposure(&self) -> f32 {
        self.last_exposure
    }

    /// The number of distinct geometry pipelines created so far.
    #[inline]
    pub fn geometry_pipelines(&self) -> usize {
        self.geometry_pipelines.len()
    }

    /// Renders `scene` and composes the result into `viewport` of the screen.
    pub fn draw(&mut self, device: &mut Device, scene: &Scene, viewport: Viewport) -> Result<()> {
        let camera = &scene.camera;
        let projection = projection_matrix(camera, viewport);
        let view = camera.view_matrix();

        self.geometry_pass(device, scene, &projection, &view)?;
        self.lighting_pass(device, scene, &projection, camera)?;

        if let Some(skybox) = scene.sky.skybox {
            self.forward_pass(device, skybox, &projection, &view)?;
        }

        if self.settings.auto_exposure {
            self.probe_pass(device)?;
        }

        self.postprocess_pass(device, camera, viewport)
    }

    /// Executes the recorded queue inside `pass`.
    fn flush(&mut self, device: &mut Device, pass: RenderPassInfo) -> Result<()> {
        if let Err(err) = device.begin_render_pass(pass) {
            self.queue.reset();
            return Err(err);
        }

        device.submit(&mut self.queue)?;
        device.end_render_pass()
    }

    fn geometry_pass(
        &mut self,
        device: &mut Device,
        scene: &Scene,
        projection: &Matrix4<f32>,
        view: &Matrix4<f32>,
    ) -> Result<()> {
        let sky = scene.sky.color.with_alpha(1.0);
        let pass = RenderPassInfo::new(self.framebuffers.geometry, self.framebuffers.viewport())
            .clear_color(sky)
            .clear_depth(1.0);

        device.begin_render_pass(pass)?;
        for renderable in scene.renderables() {
            for draw in renderable.draws() {
                if let Err(err) = self.draw_mesh(device, &draw, projection, view) {
                    self.queue.reset();
                    device.end_render_pass()?;
                    return Err(err);
                }
            }
        }

        device.submit(&mut self.queue)?;
        device.end_render_pass()
    }

    fn draw_mesh(
        &mut self,
        device: &mut Device,
        draw: &MeshDraw,
        projection: &Matrix4<f32>,
        view: &Matrix4<f32>,
    ) -> Result<()> {
        let material = &draw.sub_mesh.material;
        let key = PipelineKey {
            program: material.program,
            vertex_array: draw.vertex_array,
            topology: draw.sub_mesh.topology,
            culling: material.culling(),
        };

        let pipeline = self.geometry_pipeline(device, key)?;
        let uniforms = self.geometry_uniforms(device, material.program)?;

        let c = material.albedo_color;
        let q = &mut self.queue;
        q.bind_pipeline(pipeline);
        q.uniform_matrix_4f(uniforms.projection, projection)?;
        q.uniform_matrix_4f(uniforms.view, view)?;
        q.uniform_matrix_4f(uniforms.model, &draw.model_matrix)?;
        q.uniform_4f(uniforms.albedo_color, Vector4::new(c.r, c.g, c.b, c.a))?;
        q.uniform_1f(uniforms.metalness, material.metalness)?;
        q.uniform_1f(uniforms.roughness, material.roughness)?;
        q.uniform_1f(uniforms.alpha_threshold, material.alpha_threshold)?;

        if let Some(texture) = material.albedo_texture {
            q.uniform_1i(uniforms.albedo_texture, 0)?;
            q.texture_unit(0, texture)?;
        }

        q.draw_indexed(draw.sub_mesh.offset, draw.sub_mesh.count, 1)
    }

    fn geometry_pipeline(&mut self, device: &mut Device, key: PipelineKey) -> Result<PipelineHandle> {
        if let Some(&v) = self.geometry_pipelines.get(&key) {
            return Ok(v);
        }

        let mut params =
            PipelineParams::new(key.program, Some(key.vertex_array)).with_topology(key.topology);
        params.culling = key.culling;
        params.depth = DepthState {
            test: true,
            write: true,
            comparison: Comparison::LessOrEqual,
        };

        let pipeline = device.create_pipeline(params)?;
        self.geometry_pipelines.insert(key, pipeline);
        Ok(pipeline)
    }

    fn geometry_uniforms(
        &mut self,
        device: &mut Device,
        program: ProgramHandle,
    ) -> Result<GeometryUniforms> {
        if let Some(&v) = self.geometry_uniforms.get(&program) {
            return Ok(v);
        }

        let uniforms = GeometryUniforms::resolve(device, program)?;
        self.geometry_uniforms.insert(program, uniforms);
        Ok(uniforms)
    }

    fn lighting_pass(
        &mut self,
        device: &mut Device,
        scene: &Scene,
        projection: &Matrix4<f32>,
        camera: &Camera,
    ) -> Result<()> {
        let fbs = &self.framebuffers;
        let sky = scene.sky.color.with_alpha(1.0);
        let pass = RenderPassInfo::new(fbs.lighting, fbs.viewport()).clear_color(sky);

        let u = self.lighting.uniforms;
        let q = &mut self.queue;
        for light in scene.directional_lights() {
            q.bind_pipeline(self.lighting.pipeline);
            q.uniform_1i(u.color0, 0)?;
            q.uniform_1i(u.color1, 1)?;
            q.uniform_1i(u.depth, 2)?;
            q.texture_unit(0, fbs.albedo_metalness)?;
            q.texture_unit(1, fbs.normal_roughness)?;
            q.texture_unit(2, fbs.depth)?;
            q.uniform_matrix_4f(u.projection, projection)?;
            q.uniform_matrix_4f(u.view, &camera.view_matrix())?;
            q.uniform_matrix_4f(u.camera, &camera.camera_matrix())?;
            q.uniform_3f(u.direction, light.direction)?;
            q.uniform_3f(u.intensity, light.intensity)?;
            q.draw_indexed(0, self.quad.count(), 1)?;
        }

        self.flush(device, pass)
    }

    fn forward_pass(
        &mut self,
        device: &mut Device,
        skybox: TextureHandle,
        projection: &Matrix4<f32>,
        view: &Matrix4<f32>,
    ) -> Result<()> {
        let fbs = &self.framebuffers;
        let pass = RenderPassInfo::new(fbs.lighting, fbs.viewport());

        let u = self.skybox.uniforms;
        let q = &mut self.queue;
        q.bind_pipeline(self.skybox.pipeline);
        q.uniform_matrix_4f(u.projection, projection)?;
        q.uniform_matrix_4f(u.view, view)?;
        q.uniform_1i(u.skybox, 0)?;
        q.texture_unit(0, skybox)?;
        q.draw_indexed(0, self.cube.count(), 1)?;

        self.flush(device, pass)
    }

    fn probe_pass(&mut self, device: &mut Device) -> Result<()> {
        let fbs = &self.framebuffers;
        let area = Viewport::with_size(1, 1);
        let pass = RenderPassInfo::new(fbs.exposure, area).clear_color(Color::BLACK);

        let q = &mut self.queue;
        q.bind_pipeline(self.probe.pipeline);
        q.uniform_1i(self.probe.uniforms.hdr, 0)?;
        q.texture_unit(0, fbs.hdr)?;
        q.draw_indexed(0, self.quad.count(), 1)?;

        self.flush(device, pass)?;

        let fbs = &self.framebuffers;
        let pixel = device.read_pixels(fbs.exposure, area)?;
        let mut scanner: Scanner = Scanner::new(&pixel);
        let rgb = Vector3::new(scanner.scan_f32()?, scanner.scan_f32()?, scanner.scan_f32()?);

        self.last_exposure = next_exposure(self.last_exposure, rgb);
        trace!("Exposure probe {:?}, exposure {}.", rgb, self.last_exposure);
        Ok(())
    }

    fn postprocess_pass(&mut self, device: &mut Device, camera: &Camera, viewport: Viewport) -> Result<()> {
        let exposure = if self.settings.auto_exposure {
            camera.exposure * self.last_exposure
        } else {
            camera.exposure
        };

        let pass = RenderPassInfo::new(device.screen_framebuffer(), viewport).scissor(viewport);

        let u = self.postprocess.uniforms;
        let q = &mut self.queue;
        q.bind_pipeline(self.postprocess.pipeline);
        q.uniform_1i(u.color0, 0)?;
        q.texture_unit(0, self.framebuffers.hdr)?;
        q.uniform_1f(u.exposure, exposure)?;
        q.draw_indexed(0, self.quad.count(), 1)?;

        self.flush(device, pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exposure_step() {
        // A gray probe whose luminance is 0.1.
        let next = next_exposure(1.0, Vector3::new(0.1, 0.1, 0.1));
        let target = 1.0 / (9.8 * 0.1);
        assert_relative_eq!(next, 0.995 + 0.005 * target, epsilon = 1e-6);
        assert_relative_eq!(next, 1.000102, epsilon = 1e-5);
    }

    #[test]
    fn exposure_converges_geometrically() {
        let rgb = Vector3::new(0.5, 0.5, 0.5);
        let target = 1.0 / (9.8 * luminance(rgb));

        let mut exposure = 1.0;
        let mut error = (exposure - target).abs();
        for _ in 0..100 {
            exposure = next_exposure(exposure, rgb);
            let e = (exposure - target).abs();
            assert_relative_eq!(e, error * 0.995, epsilon = 1e-4);
            error = e;
        }
    }

    #[test]
    fn exposure_ignores_black_probes() {
        assert_eq!(next_exposure(2.0, Vector3::new(0.0, 0.0, 0.0)), 2.0);
        assert_eq!(next_exposure(2.0, Vector3::new(::std::f32::NAN, 0.0, 0.0)), 2.0);
    }
}
