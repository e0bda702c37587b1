extern crate env_logger;
extern crate prism;

use prism::canvas::*;
use prism::errors::*;
use prism::math::*;
use prism::settings::CanvasSettings;
use prism::video::prelude::*;

fn canvas(device: &mut Device) -> Canvas {
    let _ = env_logger::builder().is_test(true).try_init();

    let settings = CanvasSettings {
        max_vertices: 4096,
        ..Default::default()
    };

    let mut canvas = Canvas::new(device, &settings, Vector2::new(100, 50)).unwrap();
    canvas.begin();
    canvas
}

fn positions(canvas: &Canvas, offset: u32, count: u32) -> Vec<Vector2<f32>> {
    let shapes = canvas.renderer().shapes();
    (offset..offset + count)
        .map(|i| shapes.vertex(i).unwrap().position)
        .collect()
}

fn binds(canvas: &Canvas) -> Vec<PipelineHandle> {
    canvas
        .renderer()
        .queue()
        .commands()
        .iter()
        .filter_map(|v| match *v {
            Command::BindPipeline(h) => Some(h),
            _ => None,
        })
        .collect()
}

fn draws(canvas: &Canvas) -> Vec<(u32, u32)> {
    canvas
        .renderer()
        .queue()
        .commands()
        .iter()
        .filter_map(|v| match *v {
            Command::Draw { offset, count, .. } => Some((offset, count)),
            _ => None,
        })
        .collect()
}

#[test]
fn rectangle_is_two_triangles() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    canvas.set_solid_color(Color::new(1.0, 0.0, 0.0, 1.0));
    canvas
        .fill_rectangle(Vector2::new(10.0, 10.0), Vector2::new(30.0, 20.0))
        .unwrap();

    assert_eq!(canvas.renderer().shapes().offset(), 6);
    assert_eq!(
        positions(&canvas, 0, 6),
        vec![
            Vector2::new(10.0, 10.0),
            Vector2::new(10.0, 30.0),
            Vector2::new(40.0, 30.0),
            Vector2::new(10.0, 10.0),
            Vector2::new(40.0, 30.0),
            Vector2::new(40.0, 10.0),
        ]
    );

    let triangles = canvas.renderer().pipelines().shape_triangles;
    assert_eq!(binds(&canvas), vec![triangles]);
    assert_eq!(draws(&canvas), vec![(0, 6)]);
    assert_eq!(
        device.pipeline(triangles).unwrap().topology,
        Topology::Triangles
    );

    canvas.end(&mut device).unwrap();
    let stats = device.stats();
    assert_eq!(stats.passes, 1);
    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.vertices, 6);
}

#[test]
fn translation_is_scoped_to_the_layer() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);
    let size = Vector2::new(10.0, 10.0);

    canvas.push().unwrap();
    canvas.translate(Vector2::new(5, 5));
    canvas.fill_rectangle(Vector2::new(0.0, 0.0), size).unwrap();
    canvas.pop().unwrap();
    canvas.fill_rectangle(Vector2::new(0.0, 0.0), size).unwrap();

    assert_eq!(positions(&canvas, 0, 1), vec![Vector2::new(5.0, 5.0)]);
    assert_eq!(positions(&canvas, 6, 1), vec![Vector2::new(0.0, 0.0)]);
}

#[test]
fn non_zero_shape_masks_then_covers() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    canvas.begin_shape(Fill::new(Color::new(0.0, 1.0, 0.0, 1.0), FillMode::NonZero));
    canvas.move_to(Vector2::new(0.0, 0.0)).unwrap();
    canvas.line_to(Vector2::new(10.0, 0.0)).unwrap();
    canvas.line_to(Vector2::new(10.0, 10.0)).unwrap();
    canvas.line_to(Vector2::new(0.0, 10.0)).unwrap();
    canvas.close_loop().unwrap();
    canvas.end_shape().unwrap();

    let pipelines = *canvas.renderer().pipelines();
    assert_eq!(binds(&canvas), vec![pipelines.shape_mask, pipelines.shape_nonzero]);
    assert_eq!(draws(&canvas), vec![(0, 5), (0, 5)]);

    let mask = *device.pipeline(pipelines.shape_mask).unwrap();
    assert_eq!(mask.topology, Topology::TriangleFan);
    assert_eq!(mask.color_write, [false; 4]);
    assert!(mask.stencil.test);
    assert_eq!(mask.stencil.front.pass, StencilOp::IncrWrap);
    assert_eq!(mask.stencil.back.pass, StencilOp::DecrWrap);

    let cover = *device.pipeline(pipelines.shape_nonzero).unwrap();
    assert_eq!(cover.topology, Topology::TriangleFan);
    assert_eq!(cover.color_write, [true; 4]);
    assert_eq!(cover.stencil.front.comparison, Comparison::NotEqual);
    assert_eq!(cover.stencil.front.reference, 0);
    assert_eq!(cover.stencil.front.compare_mask, 0xFF);
    assert_eq!(cover.stencil.front.pass, StencilOp::Replace);

    canvas.end(&mut device).unwrap();
    assert_eq!(device.stats().pipeline_binds, 2);
}

#[test]
fn odd_shapes_test_the_lowest_bit() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    canvas.begin_shape(Fill::new(Color::BLUE, FillMode::Odd));
    canvas.move_to(Vector2::new(0.0, 0.0)).unwrap();
    canvas.line_to(Vector2::new(10.0, 0.0)).unwrap();
    canvas.line_to(Vector2::new(0.0, 10.0)).unwrap();
    canvas.move_to(Vector2::new(20.0, 0.0)).unwrap();
    canvas.line_to(Vector2::new(30.0, 0.0)).unwrap();
    canvas.line_to(Vector2::new(20.0, 10.0)).unwrap();
    canvas.end_shape().unwrap();

    let pipelines = *canvas.renderer().pipelines();
    assert_eq!(binds(&canvas), vec![pipelines.shape_mask, pipelines.shape_odd]);
    assert_eq!(draws(&canvas), vec![(0, 3), (3, 3), (0, 3), (3, 3)]);

    let cover = device.pipeline(pipelines.shape_odd).unwrap();
    assert_eq!(cover.stencil.front.compare_mask, 0x01);
}

#[test]
fn degenerate_sub_paths_are_skipped() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    canvas.begin_shape(Fill::new(Color::BLUE, FillMode::NonZero));
    canvas.move_to(Vector2::new(0.0, 0.0)).unwrap();
    canvas.line_to(Vector2::new(10.0, 0.0)).unwrap();
    canvas.end_shape().unwrap();

    assert!(canvas.renderer().queue().is_empty());
}

#[test]
fn stack_is_bounded_on_both_ends() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    let err = canvas.pop().unwrap_err();
    assert_eq!(err.invariant(), Some(Invariant::StackUnderflow));

    for _ in 0..255 {
        canvas.push().unwrap();
    }

    assert_eq!(canvas.depth(), 255);
    let err = canvas.push().unwrap_err();
    assert_eq!(err.invariant(), Some(Invariant::StackOverflow));

    canvas.begin();
    assert_eq!(canvas.depth(), 0);
}

#[test]
fn pushed_layers_inherit_and_restore() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    canvas.set_stroke_size(3);
    canvas.set_solid_color(Color::RED);
    let base = *canvas.layer();

    canvas.push().unwrap();
    assert_eq!(*canvas.layer(), base);

    canvas.set_solid_color(Color::GREEN);
    canvas.set_font_size(24.0);
    canvas.clip(Aabb2::new(Point2::new(10, 10), Point2::new(20, 20)));
    assert_eq!(canvas.solid_color(), Color::GREEN);

    canvas.pop().unwrap();
    assert_eq!(*canvas.layer(), base);
    assert_eq!(canvas.stroke_size(), 3);
}

#[test]
fn images_map_the_rectangle_to_unit_coordinates() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);
    let texture = device
        .create_texture(TextureParams::new(TextureFormat::RGBA8, 4, 4), None)
        .unwrap();

    canvas.translate(Vector2::new(10, 0));
    canvas
        .draw_image(texture, Vector2::new(10.0, 20.0), Vector2::new(40.0, 20.0))
        .unwrap();

    let commands = canvas.renderer().queue().commands();
    assert!(commands.contains(&Command::TextureUnit(0, texture)));

    let transform = Matrix4::from_nonuniform_scale(1.0 / 40.0, 1.0 / 20.0, 1.0)
        * Matrix4::from_translation(Vector3::new(-20.0, -20.0, 0.0));
    let corner = transform * Vector4::new(60.0, 40.0, 0.0, 1.0);
    assert_eq!((corner.x, corner.y), (1.0, 1.0));

    let expected: [[f32; 4]; 4] = transform.into();
    let uploaded = commands.iter().any(|v| match *v {
        Command::Uniform(_, UniformValue::Matrix4f(m)) => m == expected,
        _ => false,
    });
    assert!(uploaded);

    canvas.end(&mut device).unwrap();
}

#[test]
fn contours_use_the_layer_stroke() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    canvas.set_stroke_size(4);
    canvas.set_stroke_color(Color::RED);
    canvas
        .draw_line(Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0))
        .unwrap();

    let contours = canvas.renderer().contours();
    assert_eq!(contours.offset(), 4);
    for i in 0..4 {
        let v = contours.vertex(i).unwrap();
        assert_eq!(v.color, Color::RED.rgba8());
        assert_eq!(v.position.y.abs(), 2.0);
    }

    let contour = canvas.renderer().pipelines().contour;
    assert_eq!(binds(&canvas), vec![contour]);
    assert_eq!(draws(&canvas), vec![(0, 4)]);
}

#[test]
fn path_commands_need_an_open_path() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    let err = canvas.line_to(Vector2::new(1.0, 1.0)).unwrap_err();
    assert_eq!(err.invariant(), Some(Invariant::NoActivePath));

    canvas.begin_contour();
    let err = canvas.end_shape().unwrap_err();
    assert_eq!(err.invariant(), Some(Invariant::NoActivePath));

    canvas.move_to(Vector2::new(0.0, 0.0)).unwrap();
    canvas.line_to(Vector2::new(5.0, 0.0)).unwrap();
    canvas.end_contour().unwrap();

    let err = canvas.end_contour().unwrap_err();
    assert_eq!(err.invariant(), Some(Invariant::NoActivePath));
}

#[test]
fn circles_are_fans() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    canvas.fill_circle(Vector2::new(50.0, 25.0), 10.0).unwrap();

    let fan = canvas.renderer().pipelines().shape_fan;
    assert_eq!(binds(&canvas), vec![fan]);
    assert_eq!(draws(&canvas), vec![(0, 61)]);

    let first = positions(&canvas, 0, 1)[0];
    assert!((first.x - 60.0).abs() < 1e-4);
    assert!((first.y - 25.0).abs() < 1e-4);
}

#[test]
fn mesh_capacity_is_enforced() {
    let mut device = Device::headless();
    let settings = CanvasSettings {
        max_vertices: 8,
        ..Default::default()
    };

    let mut canvas = Canvas::new(&mut device, &settings, Vector2::new(100, 50)).unwrap();
    canvas.begin();

    let size = Vector2::new(1.0, 1.0);
    canvas.fill_rectangle(Vector2::new(0.0, 0.0), size).unwrap();
    match canvas.fill_rectangle(Vector2::new(0.0, 0.0), size) {
        Err(Error::BufferOverflow { .. }) => {}
        other => panic!("unexpected {:?}", other),
    }

    canvas.delete(&mut device).unwrap();
}

#[test]
fn text_without_a_font_draws_nothing() {
    let mut device = Device::headless();
    let mut canvas = canvas(&mut device);

    assert_eq!(canvas.text_size("hello"), Vector2::new(0.0, 0.0));
    canvas.draw_text("hello", Vector2::new(0.0, 0.0)).unwrap();
    assert!(canvas.renderer().queue().is_empty());
}

#[test]
fn frames_draw_into_the_target() {
    let mut device = Device::headless();
    let settings = CanvasSettings {
        max_vertices: 1024,
        clear_color: Some(Color::BLACK),
        ..Default::default()
    };

    let color = device
        .create_texture(TextureParams::new(TextureFormat::RGBA8, 64, 32), None)
        .unwrap();
    let stencil = device
        .create_texture(TextureParams::new(TextureFormat::Depth24Stencil8, 64, 32), None)
        .unwrap();
    let target = device
        .create_framebuffer(FramebufferParams::new().with_color(color).with_depth(stencil))
        .unwrap();

    let mut canvas = Canvas::new(&mut device, &settings, Vector2::new(32, 16)).unwrap();
    canvas.set_target(target);
    canvas.resize_framebuffer(Vector2::new(64, 32));

    for _ in 0..2 {
        canvas.begin();
        canvas.begin_contour();
        canvas
            .fill_round_rectangle(Vector2::new(2.0, 2.0), Vector2::new(20.0, 10.0), 4.0)
            .unwrap();
        canvas.end(&mut device).unwrap();
        assert!(!device.is_in_render_pass());
    }

    assert_eq!(device.stats().passes, 2);
    assert_eq!(device.stats().draw_calls, 2);
    canvas.delete(&mut device).unwrap();
}
