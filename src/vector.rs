//! Homogeneous vectors.
//!
//! [`Vector3H`] is the working vector of the whole pipeline. Almost every operation mutates the
//! vector in place, and the space conversions write into a caller supplied destination, so the
//! per-frame stage arrays of a [`Mesh`](crate::Mesh) are filled without any allocation.

use core::ops::{Deref, DerefMut};

use crate::{Vector3, Vector4};

const DEGREES_TO_RADIANS: f32 = core::f32::consts::PI / 180.0;

/// A 3D vector in homogeneous coordinates: `x`, `y`, `z`, `w`.
///
/// Points have `w = 1`, which is also the default. Arithmetic only ever touches the first three
/// lanes, `w` is carried along untouched (except by [`Vector3H::copy_from`] and the space
/// conversions).
///
/// Lanes are reachable as fields through `Deref`, i.e. `v.x`, `v.w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector3H(pub Vector4);

impl Default for Vector3H {
    fn default() -> Self {
        Self(Vector4::new(0.0, 0.0, 0.0, 1.0))
    }
}

impl Deref for Vector3H {
    type Target = Vector4;

    fn deref(&self) -> &Vector4 {
        &self.0
    }
}

impl DerefMut for Vector3H {
    fn deref_mut(&mut self) -> &mut Vector4 {
        &mut self.0
    }
}

impl From<[f32; 3]> for Vector3H {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl Vector3H {
    /// Creates a point (`w = 1`).
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vector4::new(x, y, z, 1.0))
    }

    /// Creates a direction (`w = 0`), which is unaffected by translation.
    pub const fn direction(x: f32, y: f32, z: f32) -> Self {
        Self(Vector4::new(x, y, z, 0.0))
    }

    /// The first three lanes.
    pub fn xyz(&self) -> Vector3 {
        self.0.xyz()
    }

    /// Overwrites the first three lanes, keeping `w`.
    pub fn set_xyz(&mut self, v: &Vector3) {
        self.0.x = v.x;
        self.0.y = v.y;
        self.0.z = v.z;
    }

    /// Stores `a x b` in `self`.
    pub fn cross(&mut self, a: &Vector3H, b: &Vector3H) {
        let x = a.y * b.z - a.z * b.y;
        let y = a.z * b.x - a.x * b.z;
        let z = a.x * b.y - a.y * b.x;
        self.0.x = x;
        self.0.y = y;
        self.0.z = z;
    }

    /// 3 lane dot product, `w` is ignored.
    pub fn dot(&self, v: &Vector3H) -> f32 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    pub fn add(&mut self, v: &Vector3H) {
        self.0.x += v.x;
        self.0.y += v.y;
        self.0.z += v.z;
    }

    pub fn sub(&mut self, v: &Vector3H) {
        self.0.x -= v.x;
        self.0.y -= v.y;
        self.0.z -= v.z;
    }

    pub fn scale(&mut self, s: f32) {
        self.0.x *= s;
        self.0.y *= s;
        self.0.z *= s;
    }

    /// Component-wise multiplication.
    pub fn multiply(&mut self, v: &Vector3H) {
        self.0.x *= v.x;
        self.0.y *= v.y;
        self.0.z *= v.z;
    }

    /// Copies all four lanes.
    pub fn copy_from(&mut self, v: &Vector3H) {
        self.0 = v.0;
    }

    pub fn length(&self) -> f32 {
        libm::sqrtf(self.dot(self))
    }

    /// Scales the vector to unit length.
    ///
    /// Not guarded against zero length: a degenerate vector turns into NaN/Inf lanes. Callers are
    /// expected to feed non-degenerate geometry.
    pub fn normalize(&mut self) {
        self.scale(1.0 / self.length());
    }

    /// Incremental rotation of an orthonormal axis system.
    ///
    /// `self`, `to` and `about` are three mutually perpendicular unit axes. `self` is rotated by
    /// `degrees` towards `to`, around `about`, and `to` is rebuilt as `about x self` so that the
    /// system stays orthonormal instead of accumulating drift.
    pub fn rotate_towards(&mut self, to: &mut Vector3H, about: &Vector3H, degrees: f32) {
        let angle = degrees * DEGREES_TO_RADIANS;
        self.scale(libm::cosf(angle));
        to.scale(libm::sinf(angle));
        self.add(to);
        self.normalize();
        to.cross(about, self);
    }

    /// Perspective divide: `out = (x/w, y/w, z/w, 1)`.
    pub fn to_clip_space(&self, out: &mut Vector3H) {
        let inv_w = 1.0 / self.w;
        out.0 = Vector4::new(self.x * inv_w, self.y * inv_w, self.z * inv_w, 1.0);
    }

    /// Viewport mapping of a clip space vector.
    ///
    /// `x` goes from `[-1, 1]` to `[0, width]`, `y` from `[-1, 1]` to `[height, 0]` (top-left
    /// origin). `z` and `w` are copied as is.
    pub fn to_screen_space(&self, half_width: f32, half_height: f32, out: &mut Vector3H) {
        out.copy_from(self);
        out.0.x = half_width * (self.x + 1.0);
        out.0.y = half_height * (1.0 - self.y);
    }
}
