//! Triangle scan conversion.
//!
//! Triangles are rasterized with edge functions over their screen space bounding box. The three
//! edge values are evaluated once at the first pixel center and then stepped with constant
//! per-pixel and per-scanline deltas, so the inner loop is a handful of adds and dot products.

use alloc::{vec, vec::Vec};
use core::fmt;

use crate::{Color, Error, Light, Result, Shading, Texture, Vector3, Vector3H};

/// Rasterizer configuration, resolved once per triangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RasterConfig {
    pub shading: Shading,
    /// Sample the texture passed to the render call. Only applies to triangles that carry texture
    /// coordinates.
    pub textured: bool,
    pub light: Light,
}

/// Per-frame diagnostics.
///
/// The rasterizer only ever adds to these. Reset them whenever a new measurement window starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderStats {
    pub triangles_drawn: u64,
    pub triangles_culled: u64,
    pub pixels_drawn: u64,
    /// Pixels that replaced an earlier, farther pixel of the same frame.
    pub pixels_overdrawn: u64,
    /// Element moves performed by the depth-ordering sort.
    pub swaps: u64,
}

impl RenderStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn merge(&mut self, other: &RenderStats) {
        self.triangles_drawn += other.triangles_drawn;
        self.triangles_culled += other.triangles_culled;
        self.pixels_drawn += other.pixels_drawn;
        self.pixels_overdrawn += other.pixels_overdrawn;
        self.swaps += other.swaps;
    }

    /// Averages over `frames` frames, rounding down.
    pub fn per_frame(&self, frames: u64) -> RenderStats {
        let frames = frames.max(1);
        RenderStats {
            triangles_drawn: self.triangles_drawn / frames,
            triangles_culled: self.triangles_culled / frames,
            pixels_drawn: self.pixels_drawn / frames,
            pixels_overdrawn: self.pixels_overdrawn / frames,
            swaps: self.swaps / frames,
        }
    }
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "triangles drawn/culled {}/{}, pixels drawn/overdrawn {}/{}, swaps {}",
            self.triangles_drawn,
            self.triangles_culled,
            self.pixels_drawn,
            self.pixels_overdrawn,
            self.swaps
        )
    }
}

/// Borrowed output buffers for one frame.
///
/// `pixels` is RGBA8, row-major, top-left origin. `depth` holds one float per pixel, cleared to
/// 0, which under the reverse-Z convention means "nothing drawn yet".
pub struct RenderTarget<'a> {
    pixels: &'a mut [u8],
    depth: &'a mut [f32],
    width: usize,
    height: usize,
}

impl<'a> RenderTarget<'a> {
    pub fn new(
        pixels: &'a mut [u8],
        depth: &'a mut [f32],
        width: usize,
        height: usize,
    ) -> Result<Self> {
        let len = width * height;

        if pixels.len() != len * 4 {
            return Err(Error::BufferSize {
                kind: "pixel",
                width,
                height,
                expected: len * 4,
                actual: pixels.len(),
            });
        }

        if depth.len() != len {
            return Err(Error::BufferSize {
                kind: "depth",
                width,
                height,
                expected: len,
                actual: depth.len(),
            });
        }

        Ok(Self {
            pixels,
            depth,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

/// Owned pixel and depth buffers.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    pixels: Vec<u8>,
    depth: Vec<f32>,
    width: usize,
    height: usize,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            depth: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Resizes the buffers, leaving them cleared.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height * 4, 0);
        self.depth.clear();
        self.depth.resize(width * height, 0.0);
    }

    /// Clears pixels to transparent black and depth to 0.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
        self.depth.fill(0.0);
    }

    pub fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget {
            pixels: &mut self.pixels,
            depth: &mut self.depth,
            width: self.width,
            height: self.height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn depth_at(&self, x: usize, y: usize) -> f32 {
        self.depth[y * self.width + x]
    }
}

/// Per-vertex inputs of the rasterizer, indexed by a triangle's corner indices.
#[derive(Clone, Copy)]
pub struct VertexStreams<'a> {
    /// Screen space positions. `z` is the projected depth, `w` the pre-divide clip `w` (the
    /// distance in front of the camera).
    pub screen: &'a [Vector3H],
    pub normals: &'a [Vector3H],
    /// Texture coordinates in `x` (s) and `y` (t).
    pub tex_coords: &'a [Vector3H],
}

/// Twice the signed area of `abc` in screen space (y down).
///
/// Positive when the vertices run counter-clockwise on screen, which is the front-facing
/// winding.
#[inline]
pub fn determinant(a: &Vector3H, b: &Vector3H, c: &Vector3H) -> f32 {
    let (abx, aby) = (b.x - a.x, b.y - a.y);
    let (acx, acy) = (c.x - a.x, c.y - a.y);
    aby * acx - abx * acy
}

/// Top-left fill rule: a pixel center exactly on an edge belongs to the triangle only if the
/// edge is a top edge (horizontal, running left) or a left edge (running down).
#[inline]
fn is_top_left(start: &Vector3H, end: &Vector3H) -> bool {
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    dy > 0.0 || (dy == 0.0 && dx < 0.0)
}

#[inline]
fn covers(w: f32, top_left: bool) -> bool {
    w > 0.0 || (w == 0.0 && top_left)
}

fn min3(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).min(c)
}

fn max3(a: f32, b: f32, c: f32) -> f32 {
    a.max(b).max(c)
}

/// Clamps a float pixel bound into `0..=limit`.
fn clamp_bound(v: f32, limit: usize) -> usize {
    if v <= 0.0 {
        0
    } else {
        (v as usize).min(limit)
    }
}

/// Gathers one attribute lane of the three corners.
fn lanes(stream: &[Vector3H], idx: [usize; 3], lane: usize) -> Vector3 {
    Vector3::new(stream[idx[0]][lane], stream[idx[1]][lane], stream[idx[2]][lane])
}

/// One triangle of a mesh: corner indices into the vertex streams and a base color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub normals: [usize; 3],
    pub tex_coords: Option<[usize; 3]>,
    pub color: Color,
}

impl Triangle {
    pub fn new(
        vertices: [usize; 3],
        normals: [usize; 3],
        tex_coords: Option<[usize; 3]>,
        color: Color,
    ) -> Self {
        Self {
            vertices,
            normals,
            tex_coords,
            color,
        }
    }

    /// Draws the visible, nearest pixels of this triangle.
    ///
    /// Back-facing and zero-area triangles are culled. Indices are not validated here; an index
    /// outside a stream panics rather than reading foreign memory.
    pub fn draw(
        &self,
        streams: &VertexStreams,
        texture: Option<&Texture>,
        config: &RasterConfig,
        target: &mut RenderTarget,
        stats: &mut RenderStats,
    ) {
        let [va, vb, vc] = self.vertices.map(|i| &streams.screen[i]);

        let det = determinant(va, vb, vc);

        if det <= 0.0 {
            stats.triangles_culled += 1;
            return;
        }

        stats.triangles_drawn += 1;

        // Normalizing the edge values is folded into the per-vertex attributes below, so the
        // pixel loop never divides by the determinant.
        let inv_det = 1.0 / det;

        let xmin = clamp_bound(libm::floorf(min3(va.x, vb.x, vc.x)), target.width);
        let xmax = clamp_bound(libm::ceilf(max3(va.x, vb.x, vc.x)), target.width);
        let ymin = clamp_bound(libm::floorf(min3(va.y, vb.y, vc.y)), target.height);
        let ymax = clamp_bound(libm::ceilf(max3(va.y, vb.y, vc.y)), target.height);

        if xmin >= xmax || ymin >= ymax {
            return;
        }

        // Edge values are sampled at pixel centers.
        let p = Vector3H::new(xmin as f32 + 0.5, ymin as f32 + 0.5, 0.0);

        // [0]: distance of p from bc, [1]: from ca, [2]: from ab.
        let mut w_row = Vector3::new(
            determinant(vb, vc, &p),
            determinant(vc, va, &p),
            determinant(va, vb, &p),
        );
        let dwdx = Vector3::new(vb.y - vc.y, vc.y - va.y, va.y - vb.y);
        let dwdy = Vector3::new(vb.x - vc.x, vc.x - va.x, va.x - vb.x);

        let top_left = [
            is_top_left(vb, vc),
            is_top_left(vc, va),
            is_top_left(va, vb),
        ];

        // Projected depth is already linear in screen space under this projection.
        let projected_z = Vector3::new(va.z, vb.z, vc.z) * inv_det;

        // Reciprocal depths, linear in screen space, for perspective-correct attributes.
        let w_inv = Vector3::new(1.0 / va.w, 1.0 / vb.w, 1.0 / vc.w) * inv_det;

        let smooth = config.shading == Shading::Smooth;
        let (n_x, n_y, n_z) = if smooth {
            (
                lanes(streams.normals, self.normals, 0).component_mul(&w_inv),
                lanes(streams.normals, self.normals, 1).component_mul(&w_inv),
                lanes(streams.normals, self.normals, 2).component_mul(&w_inv),
            )
        } else {
            (Vector3::zeros(), Vector3::zeros(), Vector3::zeros())
        };

        let texturing = match (config.textured, texture, self.tex_coords) {
            (true, Some(tex), Some(idx)) => Some((
                tex,
                lanes(streams.tex_coords, idx, 0).component_mul(&w_inv),
                lanes(streams.tex_coords, idx, 1).component_mul(&w_inv),
            )),
            _ => None,
        };

        let flat_weight = config
            .light
            .lambert(&streams.normals[self.normals[0]].xyz());
        let base = self.color.as_vec();

        for y in ymin..ymax {
            let mut w = w_row;
            let mut offset = y * target.width + xmin;

            for _ in xmin..xmax {
                if covers(w.x, top_left[0]) && covers(w.y, top_left[1]) && covers(w.z, top_left[2])
                {
                    let z = projected_z.dot(&w);
                    let prev = target.depth[offset];

                    if z > prev {
                        stats.pixels_drawn += 1;
                        if prev > 0.0 {
                            stats.pixels_overdrawn += 1;
                        }
                        target.depth[offset] = z;

                        // The 1/w normalization of the normal is skipped, renormalization
                        // removes it anyway.
                        let n_weight = if smooth {
                            let n = Vector3::new(n_x.dot(&w), n_y.dot(&w), n_z.dot(&w));
                            config.light.lambert(&n.normalize())
                        } else {
                            flat_weight
                        };

                        let mut color = base * n_weight;

                        if let Some((tex, s_w, t_w)) = &texturing {
                            let depth = 1.0 / w_inv.dot(&w);
                            let s = s_w.dot(&w) * depth;
                            let t = t_w.dot(&w) * depth;
                            color.component_mul_assign(&tex.sample(s, t));
                        }

                        let rgba = Color::from_vec(&color).to_rgba();
                        target.pixels[offset * 4..offset * 4 + 4].copy_from_slice(&rgba);
                    }
                }

                offset += 1;
                w -= dwdx;
            }

            w_row += dwdy;
        }
    }
}
