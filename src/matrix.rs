//! Rigid transforms and projections.

use nalgebra as na;

use crate::Vector3H;

/// A 4x4 transform.
///
/// Conceptually three basis axes plus a position. Storage is column-major, so in terms of the
/// flat 16 element layout the x axis lives at `0..3`, the y axis at `4..7`, the z axis at `8..11`
/// and the position at `12..15`. Projection matrices additionally use indices 11 and 15 (the
/// bottom row).
///
/// Rotations keep the 3x3 block orthonormal. That invariant is what makes
/// [`Matrix4::transpose_rotation`] a valid inverse of the rotation part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4(pub na::Matrix4<f32>);

impl Default for Matrix4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix4 {
    pub fn identity() -> Self {
        Self(na::Matrix4::identity())
    }

    /// Flat column-major view of the 16 elements.
    pub fn as_slice(&self) -> &[f32] {
        self.0.as_slice()
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        self.0.as_mut_slice()
    }

    fn axis(&self, col: usize) -> Vector3H {
        Vector3H::direction(self.0[(0, col)], self.0[(1, col)], self.0[(2, col)])
    }

    fn set_axis(&mut self, col: usize, v: &Vector3H) {
        self.0[(0, col)] = v.x;
        self.0[(1, col)] = v.y;
        self.0[(2, col)] = v.z;
    }

    pub fn x_axis(&self) -> Vector3H {
        self.axis(0)
    }

    pub fn y_axis(&self) -> Vector3H {
        self.axis(1)
    }

    pub fn z_axis(&self) -> Vector3H {
        self.axis(2)
    }

    pub fn set_x_axis(&mut self, v: &Vector3H) {
        self.set_axis(0, v)
    }

    pub fn set_y_axis(&mut self, v: &Vector3H) {
        self.set_axis(1, v)
    }

    pub fn set_z_axis(&mut self, v: &Vector3H) {
        self.set_axis(2, v)
    }

    pub fn position(&self) -> Vector3H {
        Vector3H::new(self.0[(0, 3)], self.0[(1, 3)], self.0[(2, 3)])
    }

    pub fn set_position(&mut self, v: &Vector3H) {
        self.set_axis(3, v)
    }

    /// The viewing direction, which is the negative z axis.
    pub fn direction(&self) -> Vector3H {
        let mut dir = self.z_axis();
        dir.scale(-1.0);
        dir
    }

    /// Rotates the y and z axes around the local x axis.
    pub fn rotate_x(&mut self, degrees: f32) {
        let x = self.x_axis();
        let mut y = self.y_axis();
        let mut z = self.z_axis();
        y.rotate_towards(&mut z, &x, degrees);
        self.set_y_axis(&y);
        self.set_z_axis(&z);
    }

    /// Rotates the z and x axes around the local y axis.
    pub fn rotate_y(&mut self, degrees: f32) {
        let mut x = self.x_axis();
        let y = self.y_axis();
        let mut z = self.z_axis();
        z.rotate_towards(&mut x, &y, degrees);
        self.set_z_axis(&z);
        self.set_x_axis(&x);
    }

    /// Rotates the x and y axes around the local z axis.
    pub fn rotate_z(&mut self, degrees: f32) {
        let mut x = self.x_axis();
        let mut y = self.y_axis();
        let z = self.z_axis();
        x.rotate_towards(&mut y, &z, degrees);
        self.set_x_axis(&x);
        self.set_y_axis(&y);
    }

    /// Sets an absolute orientation: the basis is reset, then rotated around x, y and z in that
    /// order. The position is kept.
    pub fn rotate(&mut self, x: f32, y: f32, z: f32) {
        self.0.fixed_view_mut::<3, 3>(0, 0).fill_with_identity();
        self.rotate_x(x);
        self.rotate_y(y);
        self.rotate_z(z);
    }

    /// Moves the position along the viewing direction.
    pub fn move_forward(&mut self, dist: f32) {
        let mut step = self.direction();
        step.scale(dist);
        let mut pos = self.position();
        pos.add(&step);
        self.set_position(&pos);
    }

    /// `dst = self * src`, including the bottom row, so projection matrices produce a
    /// homogeneous `w`.
    pub fn transform(&self, src: &Vector3H, dst: &mut Vector3H) {
        dst.0 = self.0 * src.0;
    }

    /// Applies only the 3x3 block, for directions such as normals.
    pub fn transform_direction(&self, src: &Vector3H, dst: &mut Vector3H) {
        let v = self.0.fixed_view::<3, 3>(0, 0) * src.xyz();
        dst.set_xyz(&v);
        dst.0.w = 0.0;
    }

    /// Transposes the 3x3 rotation block in place.
    ///
    /// This only inverts the rotation when the block is orthonormal.
    pub fn transpose_rotation(&mut self) {
        self.0.swap((0, 1), (1, 0));
        self.0.swap((0, 2), (2, 0));
        self.0.swap((1, 2), (2, 1));
    }
}
