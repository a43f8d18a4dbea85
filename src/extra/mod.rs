//! Extra miscellaneous helpers: model loading, test geometry and scene setup.

pub mod obj;

use crate::{Bounds, Camera, CameraConfig, Face, Geometry, Result, Vector3H};

/// Smallest near plane distance [`frame_bounds`] will produce.
pub const MIN_NEAR: f32 = 1.0e-3;

const CUBE_VERTICES: [[f32; 3]; 8] = [
    [-0.5, -0.5, -0.5],
    [0.5, -0.5, -0.5],
    [0.5, 0.5, -0.5],
    [-0.5, 0.5, -0.5],
    [-0.5, -0.5, 0.5],
    [0.5, -0.5, 0.5],
    [0.5, 0.5, 0.5],
    [-0.5, 0.5, 0.5],
];

const CUBE_INDICES: [[usize; 3]; 12] = [
    [0, 2, 1],
    [0, 3, 2],
    [1, 2, 6],
    [6, 5, 1],
    [4, 5, 6],
    [6, 7, 4],
    [2, 3, 6],
    [6, 3, 7],
    [0, 7, 3],
    [0, 4, 7],
    [0, 1, 5],
    [0, 5, 4],
];

/// An axis aligned cube centered at the origin, with outward, counter-clockwise faces.
///
/// The cube carries no normals, so [`Mesh::load`](crate::Mesh::load) generates smooth ones.
pub fn cube(size: f32) -> Geometry {
    Geometry {
        positions: CUBE_VERTICES.map(|v| v.map(|c| c * size)).to_vec(),
        faces: CUBE_INDICES.iter().map(|&f| Face::new(f)).collect(),
        ..Default::default()
    }
}

/// Places a camera so that the given bounds are in view.
///
/// The camera sits on the +z axis at twice the bounding sphere radius, looking down -z. The near
/// and far planes hug the front and the back of the box, with near clamped to [`MIN_NEAR`] in case
/// the box reaches past the camera.
pub fn frame_bounds(bounds: &Bounds, fov: f32, width: usize, height: usize) -> Result<Camera> {
    let distance = 2.0 * bounds.radius();

    let config = CameraConfig {
        fov,
        near: (distance - bounds.max.z).max(MIN_NEAR),
        far: distance - bounds.min.z,
    };

    log::debug!(
        "framing bounds: camera at z {}, near {}, far {}",
        distance,
        config.near,
        config.far
    );

    let mut camera = Camera::from_config(&config, width, height)?;
    camera.set_position(&Vector3H::new(0.0, 0.0, distance));

    Ok(camera)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mesh;

    #[test]
    fn cube_faces_point_outward() {
        let geo = cube(2.0);
        let mesh = Mesh::load(&geo).unwrap();
        for (i, f) in geo.faces.iter().enumerate() {
            let [a, b, c] = f.vertices.map(|i| Vector3H::from(geo.positions[i]));
            let (mut ab, mut ac, mut n) = (b, c, Vector3H::default());
            ab.sub(&a);
            ac.sub(&a);
            n.cross(&ab, &ac);
            // The face centroid points away from the center, like the face normal.
            let mut centroid = a;
            centroid.add(&b);
            centroid.add(&c);
            assert!(n.dot(&centroid) > 0.0, "face {i} points inward");
        }
        assert_eq!(mesh.bounds().max.xyz(), crate::Vector3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn framing_places_camera_on_z() {
        let mesh = Mesh::load(&cube(2.0)).unwrap();
        let cam = frame_bounds(mesh.bounds(), 60.0, 64, 48).unwrap();
        let r = libm::sqrtf(3.0);

        assert!((cam.position().z - 2.0 * r).abs() < 1e-5);
        assert!((cam.near() - (2.0 * r - 1.0)).abs() < 1e-5);
        assert!((cam.far() - (2.0 * r + 1.0)).abs() < 1e-5);
        assert_eq!(cam.fov(), 60.0);
    }

    #[test]
    fn framing_clamps_near() {
        // A box far in front of its own center radius.
        let bounds = Bounds {
            min: Vector3H::new(-1.0, -1.0, 10.0),
            max: Vector3H::new(1.0, 1.0, 12.0),
        };
        let cam = frame_bounds(&bounds, 45.0, 8, 8).unwrap();
        assert_eq!(cam.near(), MIN_NEAR);
    }
}
