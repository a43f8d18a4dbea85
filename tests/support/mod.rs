//! Test support library
//! Provides scene builders and comparison helpers for the integration tests.
#![allow(dead_code)]

use softrast::{
    Camera, Color, Face, FrameBuffer, Geometry, Mesh, RasterConfig, RenderStats, Vector3H,
};

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() < eps
}

/// A single counter-clockwise triangle with the given corners.
pub fn triangle(points: [[f32; 3]; 3]) -> Geometry {
    Geometry {
        positions: points.to_vec(),
        faces: vec![Face::new([0, 1, 2])],
        ..Default::default()
    }
}

/// A camera at the origin looking down -z with a 90 degree field of view.
pub fn camera(width: usize, height: usize) -> Camera {
    Camera::new(90.0, 0.1, 100.0, width, height).unwrap()
}

/// Loads `geometry` as a mesh with a uniform base color.
pub fn mesh(geometry: &Geometry, color: Color) -> Mesh {
    let mut mesh = Mesh::load(geometry).unwrap();
    mesh.set_color(color);
    mesh
}

/// Projects and renders every mesh, in order, into one frame buffer.
pub fn render(
    meshes: &mut [Mesh],
    camera: &mut Camera,
    config: &RasterConfig,
) -> (FrameBuffer, RenderStats) {
    let (w, h) = camera.viewport();
    let mut fb = FrameBuffer::new(w, h);
    let mut stats = RenderStats::default();

    for mesh in meshes {
        mesh.project(camera);
        mesh.render(&mut fb.target(), None, config, &mut stats);
    }

    (fb, stats)
}

/// Moves a point through a matrix, returning the result.
pub fn transformed(m: &softrast::Matrix4, p: Vector3H) -> Vector3H {
    let mut out = Vector3H::default();
    m.transform(&p, &mut out);
    out
}
