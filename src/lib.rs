//! # softrast
//!
//! ```text
//!            .+#.
//!          .+####.
//!        .+#######.
//!      .+##########+.
//!    .+#####softrast##.
//!  .+##################+.
//! +======================+
//! ```
//!
//! ## Software triangle rasterizer
//!
//! `softrast` is a `no_std` compatible CPU rasterization core. A frame goes through these stages:
//!
//! - Vertex transform: local, world, camera, projection, clip and screen space, one preallocated
//!   array per stage (see [`Mesh::project`]).
//! - Front to back ordering of triangles (see [`Mesh::sort`]).
//! - Edge function rasterization with a reverse-Z depth buffer, perspective-correct attribute
//!   interpolation, Lambert lighting and optional textures (see [`Triangle::draw`]).
//!
//! The output is a flat RGBA8 pixel buffer plus a depth buffer, which makes the core agnostic of
//! whatever presents the image.
//!
//! With `test-bin` feature, `demos/spin.rs` renders a spinning mesh to the terminal through
//! `crossterm`.
//!
//! ## Example
//!
//! ```
//! use softrast::{extra, Camera, FrameBuffer, Mesh, RasterConfig, RenderStats, Vector3H};
//!
//! let mut mesh = Mesh::load(&extra::cube(1.0)).unwrap();
//! let mut camera = Camera::new(60.0, 0.1, 100.0, 80, 60).unwrap();
//! camera.set_position(&Vector3H::new(0.0, 0.0, 3.0));
//!
//! let mut fb = FrameBuffer::new(80, 60);
//! let mut stats = RenderStats::default();
//!
//! mesh.set_local_rotation(30.0, 45.0, 0.0);
//! mesh.project(&mut camera);
//! mesh.render(&mut fb.target(), None, &RasterConfig::default(), &mut stats);
//!
//! assert!(stats.pixels_drawn > 0);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use nalgebra as na;

pub mod camera;
pub mod error;
pub mod extra;
pub mod material;
pub mod matrix;
pub mod mesh;
pub mod raster;
pub mod vector;

pub use camera::{Camera, CameraConfig};
pub use error::{Error, Result};
pub use material::{Color, Light, Shading, Texture};
pub use matrix::Matrix4;
pub use mesh::{Bounds, Face, Geometry, Mesh};
pub use raster::{FrameBuffer, RasterConfig, RenderStats, RenderTarget, Triangle, VertexStreams};
pub use vector::Vector3H;

pub type Vector3 = na::Vector3<f32>;
pub type Vector4 = na::Vector4<f32>;
