#[macro_use]
extern crate approx;
extern crate env_logger;
extern crate prism;

use prism::errors::*;
use prism::math::*;
use approx::assert_relative_eq;
use prism::scene::*;
use prism::settings::{SceneSettings, ToneMapping};
use prism::video::backends::headless::HeadlessVisitor;
use prism::video::prelude::*;

struct Fixture {
    device: Device,
    renderer: Renderer,
    scene: Scene,
    cube: StaticMesh,
    material: Material,
}

fn fixture(settings: &SceneSettings) -> Fixture {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut device = Device::headless();
    let renderer = Renderer::new(&mut device, settings, 64, 32).unwrap();
    let cube = StaticMesh::cube(&mut device).unwrap();
    let program = create_pbr_program(&mut device, PbrFeatures::default()).unwrap();

    Fixture {
        device,
        renderer,
        scene: Scene::new(settings),
        cube,
        material: Material::new(program),
    }
}

fn renderable(cube: &StaticMesh, material: Material, x: f32) -> Renderable {
    let mesh = ModelMesh {
        vertex_array: cube.vertex_array(),
        sub_meshes: vec![SubMesh {
            topology: Topology::Triangles,
            offset: 0,
            count: cube.count(),
            material,
        }],
    };

    let matrix = Matrix4::from_translation(Vector3::new(x, 0.0, -5.0));
    Renderable::new(matrix, vec![ModelNode::new(mesh)])
}

fn sun() -> DirectionalLight {
    DirectionalLight {
        direction: Vector3::new(0.0, -1.0, -1.0).normalize(),
        intensity: Vector3::new(3.0, 3.0, 3.0),
    }
}

#[test]
fn horizontal_plus_projection() {
    let camera = Camera {
        fov: Deg(90.0).into(),
        fov_mode: FoVMode::HorizontalPlus,
        ..Default::default()
    };

    let m = projection_matrix(&camera, Viewport::with_size(1920, 1080));
    assert_relative_eq!(NEAR / m.y.y, 0.5, epsilon = 1e-5);
    assert_relative_eq!(NEAR / m.x.x, 0.5 * 1920.0 / 1080.0, epsilon = 1e-4);

    let far = m * Vector4::new(0.0, 0.0, -FAR, 1.0);
    assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-4);
}

#[test]
fn vertical_minus_projection() {
    let camera = Camera {
        fov: Deg(90.0).into(),
        fov_mode: FoVMode::VerticalMinus,
        ..Default::default()
    };

    let m = projection_matrix(&camera, Viewport::with_size(1920, 1080));
    assert_relative_eq!(NEAR / m.x.x, 0.5, epsilon = 1e-5);
    assert_relative_eq!(NEAR / m.y.y, 0.28125, epsilon = 1e-5);
}

#[test]
fn exposure_moves_towards_the_target() {
    let next = next_exposure(1.0, Vector3::new(0.1, 0.1, 0.1));
    assert_relative_eq!(next, 1.000102, epsilon = 1e-5);
    assert_relative_eq!(luminance(Vector3::new(1.0, 1.0, 1.0)), 1.0, epsilon = 1e-5);
}

#[test]
fn draws_every_pass() {
    let mut f = fixture(&SceneSettings::default());
    f.scene
        .create_renderable(renderable(&f.cube, f.material, -1.0));
    f.scene
        .create_renderable(renderable(&f.cube, f.material, 1.0));
    f.scene.create_directional_light(sun());
    f.scene.create_directional_light(sun());

    let viewport = Viewport::with_size(64, 32);
    f.renderer
        .draw(&mut f.device, &f.scene, viewport)
        .unwrap();

    // geometry, lighting, probe and postprocess.
    let stats = f.device.stats();
    assert_eq!(stats.passes, 4);
    assert_eq!(stats.draw_calls, 2 + 2 + 1 + 1);
    assert!(!f.device.is_in_render_pass());
    assert_eq!(f.renderer.geometry_pipelines(), 1);

    // The headless probe reads back black, which leaves the exposure alone.
    assert_eq!(f.renderer.last_exposure(), 1.0);
}

#[test]
fn skybox_adds_a_forward_pass() {
    let mut f = fixture(&SceneSettings::default());
    let mut params = TextureParams::new(TextureFormat::RGBA8, 16, 16);
    params.kind = TextureKind::Cube;
    let skybox = f.device.create_texture(params, None).unwrap();
    f.scene.sky.skybox = Some(skybox);

    f.renderer
        .draw(&mut f.device, &f.scene, Viewport::with_size(64, 32))
        .unwrap();

    let stats = f.device.stats();
    assert_eq!(stats.passes, 5);
    assert_eq!(stats.draw_calls, 3);
}

#[test]
fn manual_exposure_skips_the_probe() {
    let settings = SceneSettings {
        auto_exposure: false,
        tone_mapping: ToneMapping::Exponential,
        ..Default::default()
    };

    let mut f = fixture(&settings);
    assert_eq!(f.renderer.tone_mapping(), ToneMapping::Exponential);

    f.renderer
        .draw(&mut f.device, &f.scene, Viewport::with_size(64, 32))
        .unwrap();

    let stats = f.device.stats();
    assert_eq!(stats.passes, 3);
    assert_eq!(stats.draw_calls, 1);
}

#[test]
fn pipelines_are_cached_per_state() {
    let mut f = fixture(&SceneSettings::default());
    let mut double_sided = f.material;
    double_sided.back_face_culling = false;

    f.scene
        .create_renderable(renderable(&f.cube, f.material, 0.0));
    f.scene
        .create_renderable(renderable(&f.cube, double_sided, 1.0));

    for _ in 0..3 {
        f.renderer
            .draw(&mut f.device, &f.scene, Viewport::with_size(64, 32))
            .unwrap();
        f.device.advance().unwrap();
    }

    assert_eq!(f.renderer.geometry_pipelines(), 2);
}

#[test]
fn deleted_programs_abort_the_frame() {
    let mut f = fixture(&SceneSettings::default());
    f.scene
        .create_renderable(renderable(&f.cube, f.material, 0.0));
    f.device.delete_program(f.material.program).unwrap();

    let err = f
        .renderer
        .draw(&mut f.device, &f.scene, Viewport::with_size(64, 32))
        .unwrap_err();
    assert_eq!(err.invariant(), Some(Invariant::ResourceReleased));
    assert!(!f.device.is_in_render_pass());
}

#[test]
fn resize_replaces_the_targets() {
    let mut f = fixture(&SceneSettings::default());
    let old = f.renderer.framebuffers().hdr;

    f.renderer.resize(&mut f.device, 128, 96).unwrap();
    assert!(f.device.texture(old).is_none());

    let fbs = f.renderer.framebuffers();
    assert_eq!(fbs.size(), Vector2::new(128, 96));
    assert_eq!(
        f.device.framebuffer_dimensions(fbs.lighting),
        Some(Vector2::new(128, 96))
    );

    f.renderer
        .draw(&mut f.device, &f.scene, Viewport::with_size(128, 96))
        .unwrap();

    f.renderer.delete(&mut f.device).unwrap();
    f.cube.delete(&mut f.device).unwrap();
}

#[test]
fn scene_keeps_insertion_order() {
    let mut f = fixture(&SceneSettings::default());
    let a = f
        .scene
        .create_renderable(renderable(&f.cube, f.material, 1.0));
    f.scene
        .create_renderable(renderable(&f.cube, f.material, 2.0));
    f.scene
        .create_renderable(renderable(&f.cube, f.material, 3.0));

    f.scene.renderable_mut(a).unwrap().matrix =
        Matrix4::from_translation(Vector3::new(4.0, 0.0, 0.0));
    let xs: Vec<f32> = f.scene.renderables().map(|v| v.matrix.w.x).collect();
    assert_eq!(xs, vec![4.0, 2.0, 3.0]);

    assert!(f.scene.delete_renderable(a).is_some());
    assert!(f.scene.renderable(a).is_none());
    assert_eq!(f.scene.renderables().count(), 2);
}

#[test]
fn failed_construction_releases_everything() {
    let settings = SceneSettings::default();
    for limit in 0.. {
        assert!(limit < 128);

        let mut device = Device::new(Box::new(HeadlessVisitor::with_limit(limit)));
        match Renderer::new(&mut device, &settings, 16, 16) {
            Ok(renderer) => {
                renderer.delete(&mut device).unwrap();
                assert_eq!(device.live_resources(), 0);
                return;
            }
            Err(Error::Backend(_)) => assert_eq!(device.live_resources(), 0),
            Err(err) => panic!("unexpected {:?}", err),
        }
    }
}
