mod support;

use softrast::{
    extra, Color, Error, FrameBuffer, Mesh, RasterConfig, RenderStats, RenderTarget, Shading,
    Texture, Vector3H,
};
use support::*;

/// 250 scaled by the default light hitting a +z facing surface, `1/sqrt(3)`.
const LIT: u8 = 144;

#[test]
fn single_triangle_end_to_end() {
    let mut cam = camera(64, 64);
    let mut meshes = [mesh(
        &triangle([[0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]]),
        Color::default(),
    )];

    for shading in [Shading::Flat, Shading::Smooth] {
        let config = RasterConfig {
            shading,
            ..Default::default()
        };
        let (fb, stats) = render(&mut meshes, &mut cam, &config);

        assert_eq!(stats.triangles_drawn, 1);
        assert_eq!(stats.triangles_culled, 0);
        assert_eq!(stats.pixels_overdrawn, 0);
        assert!(stats.pixels_drawn > 0);

        // Screen corners land at (32, 32), (64, 32) and (32, 0).
        assert_eq!(fb.pixel(40, 20), [LIT, LIT, LIT, 255]);
        assert!(approx_eq(fb.depth_at(40, 20), 0.1, 1e-5));

        for (x, y) in [(60, 5), (10, 10), (40, 40)] {
            assert_eq!(fb.pixel(x, y), [0; 4]);
            assert_eq!(fb.depth_at(x, y), 0.0);
        }

        // The triangle lies in the z = -1 plane, so every covered cell holds near / 1.
        let covered: Vec<f32> = fb.depth().iter().copied().filter(|&d| d > 0.0).collect();
        assert_eq!(covered.len() as u64, stats.pixels_drawn);
        for d in covered {
            assert!(approx_eq(d, 0.1, 1e-5), "depth {d}");
        }
    }
}

#[test]
fn back_faces_leave_the_frame_untouched() {
    let mut cam = camera(32, 32);
    let mut meshes = [mesh(
        &triangle([[0.0, 0.0, -1.0], [0.0, 1.0, -1.0], [1.0, 0.0, -1.0]]),
        Color::default(),
    )];
    let (fb, stats) = render(&mut meshes, &mut cam, &RasterConfig::default());

    assert_eq!(stats.triangles_culled, 1);
    assert_eq!(stats.pixels_drawn, 0);
    assert!(fb.pixels().iter().all(|&p| p == 0));
}

#[test]
fn overlapping_meshes_are_order_independent() {
    let near = triangle([[-0.5, -0.5, -1.0], [0.5, -0.5, -1.0], [0.0, 0.5, -1.0]]);
    let far = triangle([[-2.0, -2.0, -2.0], [2.0, -2.0, -2.0], [0.0, 2.0, -2.0]]);
    let config = RasterConfig::default();

    let mut cam = camera(64, 64);
    let (front_first, a) = render(
        &mut [
            mesh(&near, Color::WHITE),
            mesh(&far, Color::new(250, 0, 0)),
        ],
        &mut cam,
        &config,
    );
    let (back_first, b) = render(
        &mut [
            mesh(&far, Color::new(250, 0, 0)),
            mesh(&near, Color::WHITE),
        ],
        &mut cam,
        &config,
    );

    assert_eq!(front_first.pixels(), back_first.pixels());
    assert_eq!(front_first.depth(), back_first.depth());

    // Drawing the far triangle last overwrites nothing, drawing it first gets it overdrawn.
    assert_eq!(a.pixels_overdrawn, 0);
    assert!(b.pixels_overdrawn > 0);
    assert_eq!(a.pixels_drawn + b.pixels_overdrawn, b.pixels_drawn);

    // The near triangle wins in the middle, the far one shows around it.
    assert_eq!(front_first.pixel(32, 32), [147, 147, 147, 255]);
    assert_eq!(front_first.pixel(32, 60)[1], 0);
    assert!(front_first.pixel(32, 60)[0] > 0);
}

#[test]
fn single_mesh_is_sorted_front_to_back() {
    let geo = softrast::Geometry {
        positions: vec![
            [-2.0, -2.0, -2.0],
            [2.0, -2.0, -2.0],
            [0.0, 2.0, -2.0],
            [-0.5, -0.5, -1.0],
            [0.5, -0.5, -1.0],
            [0.0, 0.5, -1.0],
        ],
        faces: vec![softrast::Face::new([0, 1, 2]), softrast::Face::new([3, 4, 5])],
        ..Default::default()
    };
    let mut cam = camera(64, 64);
    let (_, stats) = render(&mut [mesh(&geo, Color::WHITE)], &mut cam, &RasterConfig::default());

    assert_eq!(stats.swaps, 1);
    assert_eq!(stats.pixels_overdrawn, 0);
}

#[test]
fn moving_the_camera_matches_moving_the_world() {
    let config = RasterConfig::default();

    let mut moved_camera = camera(48, 48);
    moved_camera.set_position(&Vector3H::new(0.0, 0.0, 3.0));
    let mut cube = mesh(&extra::cube(1.0), Color::WHITE);
    cube.set_local_rotation(30.0, 45.0, 0.0);
    let (a, _) = render(&mut [cube], &mut moved_camera, &config);

    let mut fixed_camera = camera(48, 48);
    let mut cube = mesh(&extra::cube(1.0), Color::WHITE);
    cube.set_local_rotation(30.0, 45.0, 0.0);
    cube.set_world_position(&Vector3H::new(0.0, 0.0, -3.0));
    let (b, _) = render(&mut [cube], &mut fixed_camera, &config);

    assert!(a.depth().iter().any(|&d| d > 0.0));
    assert_eq!(a.pixels(), b.pixels());
}

#[test]
fn cube_seen_head_on_culls_everything_but_the_front() {
    let mut cam = camera(48, 48);
    cam.set_position(&Vector3H::new(0.0, 0.0, 3.0));
    let (_, stats) = render(
        &mut [mesh(&extra::cube(1.0), Color::WHITE)],
        &mut cam,
        &RasterConfig::default(),
    );

    assert_eq!(stats.triangles_drawn, 2);
    assert_eq!(stats.triangles_culled, 10);
}

#[test]
fn camera_inverse_round_trip() {
    let mut cam = camera(16, 16);
    cam.rotate_y(33.0);
    cam.rotate_x(-12.0);
    cam.move_forward(4.0);

    let pose = *cam.view_matrix();
    let inverse = *cam.camera_matrix();
    let p = Vector3H::new(1.5, -7.0, 0.25);
    let back = transformed(&pose, transformed(&inverse, p));

    assert!(approx_eq(back.x, p.x, 1e-4));
    assert!(approx_eq(back.y, p.y, 1e-4));
    assert!(approx_eq(back.z, p.z, 1e-4));
}

#[test]
fn framed_obj_model_renders() {
    let src = "
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
f 1 4 3 2
f 2 3 7 6
f 5 6 7 8
f 3 4 8 7
f 1 8 4
f 1 5 8
f 1 2 6 5
f 1 2
";
    // The stray two-corner face is dropped, the rest of the model still loads.
    let geo = extra::obj::parse(src);
    assert_eq!(geo.faces.len(), 12);

    let mut mesh = Mesh::load(&geo).unwrap();
    let mut cam = extra::frame_bounds(mesh.bounds(), 60.0, 40, 30).unwrap();
    let mut fb = FrameBuffer::new(40, 30);
    let mut stats = RenderStats::default();

    mesh.project(&mut cam);
    mesh.render(&mut fb.target(), None, &RasterConfig::default(), &mut stats);

    assert_eq!(stats.triangles_drawn, 2);
    assert_eq!(fb.pixel(20, 15)[3], 255);
    assert!(fb.depth_at(20, 15) > 0.0);
}

#[test]
fn textured_quad_samples_perspective_correct() {
    let src = "
v -0.5 -0.5 -1
v 0.5 -0.5 -1
v 0.5 0.5 -1
v -0.5 0.5 -1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1 4/4/1
";
    let red = [255, 0, 0, 255];
    let green = [0, 255, 0, 255];
    let blue = [0, 0, 255, 255];
    let white = [255, 255, 255, 255];
    let texture = Texture::new(2, vec![red, green, blue, white]).unwrap();

    let mut mesh = Mesh::load(&extra::obj::parse(src)).unwrap();
    let mut cam = camera(64, 64);
    let mut fb = FrameBuffer::new(64, 64);
    let mut stats = RenderStats::default();
    let config = RasterConfig {
        textured: true,
        ..Default::default()
    };

    mesh.project(&mut cam);
    mesh.render(&mut fb.target(), Some(&texture), &config, &mut stats);

    // The quad covers 16..48 on both axes, t grows upwards.
    assert_eq!(fb.pixel(20, 20), [LIT, 0, 0, 255]);
    assert_eq!(fb.pixel(44, 20), [0, LIT, 0, 255]);
    assert_eq!(fb.pixel(20, 44), [0, 0, LIT, 255]);
    assert_eq!(fb.pixel(44, 44), [LIT, LIT, LIT, 255]);

    // Without the flag the base color shows through.
    fb.clear();
    mesh.render(&mut fb.target(), Some(&texture), &RasterConfig::default(), &mut stats);
    assert_eq!(fb.pixel(20, 20), [LIT, LIT, LIT, 255]);
}

#[test]
fn invalid_input_is_reported() {
    let mut geo = triangle([[0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [0.0, 1.0, -1.0]]);
    geo.faces[0].vertices[2] = 3;
    assert_eq!(
        Mesh::load(&geo).unwrap_err(),
        Error::PositionIndex {
            face: 0,
            index: 3,
            len: 3
        }
    );

    let mut pixels = vec![0u8; 4 * 4 * 4];
    let mut depth = vec![0.0f32; 15];
    assert!(matches!(
        RenderTarget::new(&mut pixels, &mut depth, 4, 4),
        Err(Error::BufferSize { kind: "depth", .. })
    ));

    assert!(matches!(
        softrast::Camera::new(60.0, 0.1, 10.0, 8, 0),
        Err(Error::EmptyViewport { .. })
    ));
}

#[cfg(feature = "serde")]
#[test]
fn configuration_round_trips_through_json() {
    let config = RasterConfig {
        shading: Shading::Flat,
        textured: true,
        light: softrast::Light::new(softrast::Vector3::new(0.0, -1.0, 0.0)),
    };
    let json = serde_json::to_string(&config).unwrap();
    let back: RasterConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);

    let camera: softrast::CameraConfig = serde_json::from_str(r#"{"fov": 75.0}"#).unwrap();
    assert_eq!(camera.fov, 75.0);
    assert_eq!(camera.near, softrast::CameraConfig::default().near);
}
