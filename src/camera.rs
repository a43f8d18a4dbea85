//! Camera pose and projection.

use crate::{Error, Matrix4, Result, Vector3H};

const DEGREES_TO_RADIANS: f32 = core::f32::consts::PI / 180.0;

/// Static camera properties.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    /// Vertical field of view, in degrees.
    pub fov: f32,
    pub near: f32,
    /// Kept for bookkeeping only. The projection puts the far plane at infinity.
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// Perspective camera.
///
/// The camera owns its pose (the view matrix) and derives two matrices from it on demand:
///
/// - the camera matrix, the inverse of the pose, mapping world space into camera space;
/// - the projection matrix, mapping camera space into homogeneous clip coordinates.
///
/// Both are cached. Pose mutations mark the camera matrix dirty, viewport changes mark the
/// projection dirty, and the accessors recompute at most once per mutation.
///
/// The camera looks down its local negative z axis. With an identity pose it sits at the origin
/// looking down world -z, with +y up.
#[derive(Debug, Clone)]
pub struct Camera {
    config: CameraConfig,
    width: usize,
    height: usize,
    view: Matrix4,
    camera: Matrix4,
    projection: Matrix4,
    view_changed: bool,
    projection_changed: bool,
}

fn check_viewport(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        Err(Error::EmptyViewport { width, height })
    } else {
        Ok(())
    }
}

impl Camera {
    /// Creates a camera at the origin.
    ///
    /// `fov` is the vertical field of view in degrees. `far` is stored but not used by the
    /// projection, so there is no far-plane clipping.
    pub fn new(fov: f32, near: f32, far: f32, width: usize, height: usize) -> Result<Self> {
        Self::from_config(&CameraConfig { fov, near, far }, width, height)
    }

    pub fn from_config(config: &CameraConfig, width: usize, height: usize) -> Result<Self> {
        check_viewport(width, height)?;

        Ok(Self {
            config: *config,
            width,
            height,
            view: Matrix4::identity(),
            camera: Matrix4::identity(),
            projection: Matrix4::identity(),
            view_changed: true,
            projection_changed: true,
        })
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn fov(&self) -> f32 {
        self.config.fov
    }

    pub fn near(&self) -> f32 {
        self.config.near
    }

    pub fn far(&self) -> f32 {
        self.config.far
    }

    pub fn viewport(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Half of the viewport dimensions, as used by the screen space mapping.
    pub fn half_viewport(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// The pose. Mutate it through the camera methods so the cache stays coherent.
    pub fn view_matrix(&self) -> &Matrix4 {
        &self.view
    }

    pub fn position(&self) -> Vector3H {
        self.view.position()
    }

    pub fn direction(&self) -> Vector3H {
        self.view.direction()
    }

    pub fn set_position(&mut self, v: &Vector3H) {
        self.view.set_position(v);
        self.view_changed = true;
    }

    pub fn move_forward(&mut self, dist: f32) {
        self.view.move_forward(dist);
        self.view_changed = true;
    }

    pub fn rotate_x(&mut self, degrees: f32) {
        self.view.rotate_x(degrees);
        self.view_changed = true;
    }

    pub fn rotate_y(&mut self, degrees: f32) {
        self.view.rotate_y(degrees);
        self.view_changed = true;
    }

    pub fn rotate_z(&mut self, degrees: f32) {
        self.view.rotate_z(degrees);
        self.view_changed = true;
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) -> Result<()> {
        check_viewport(width, height)?;
        self.width = width;
        self.height = height;
        self.projection_changed = true;
        Ok(())
    }

    /// Whether the next [`Camera::camera_matrix`] call recomputes.
    pub fn view_changed(&self) -> bool {
        self.view_changed
    }

    /// Whether the next [`Camera::projection_matrix`] call recomputes.
    pub fn projection_changed(&self) -> bool {
        self.projection_changed
    }

    /// Reverse-Z infinite perspective projection.
    ///
    /// Camera space depth `-near` maps to 1, and depth tends to 0 towards infinity, which spends
    /// most of the float precision close to the camera. Clip `w` becomes the distance in front of
    /// the camera (`-z`).
    fn update_projection_matrix(&mut self) {
        let aspect = self.width as f32 / self.height as f32;
        let f = 1.0 / libm::tanf(self.config.fov * DEGREES_TO_RADIANS / 2.0);

        log::trace!(
            "projection update: fov {} aspect {} near {}",
            self.config.fov,
            aspect,
            self.config.near
        );

        let m = self.projection.as_mut_slice();
        m[0] = f / aspect;
        m[5] = f;
        m[10] = 0.0;
        m[11] = -1.0;
        m[14] = self.config.near;
        m[15] = 0.0;
    }

    pub fn projection_matrix(&mut self) -> &Matrix4 {
        if self.projection_changed {
            self.update_projection_matrix();
            self.projection_changed = false;
        }

        &self.projection
    }

    /// Inverts the pose.
    ///
    /// The inverse of a rigid transform `[R | p]` is `[R^T | -R^T p]`. The rotated position is
    /// built from dot products with the pose axes, and since `R` is orthonormal its inverse is
    /// just the transpose.
    fn update_camera_matrix(&mut self) {
        let x = self.view.x_axis();
        let y = self.view.y_axis();
        let z = self.view.z_axis();
        let p = self.view.position();

        self.camera.set_x_axis(&x);
        self.camera.set_y_axis(&y);
        self.camera.set_z_axis(&z);
        self.camera
            .set_position(&Vector3H::new(-x.dot(&p), -y.dot(&p), -z.dot(&p)));

        self.camera.transpose_rotation();
    }

    pub fn camera_matrix(&mut self) -> &Matrix4 {
        if self.view_changed {
            self.update_camera_matrix();
            self.view_changed = false;
        }

        &self.camera
    }
}
