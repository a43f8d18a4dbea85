//! Surface appearance: base colors, the light, shading modes and textures.

use alloc::vec::Vec;

use crate::{Error, Result, Vector3};

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for Color {
    /// Off-white, slightly below full intensity.
    fn default() -> Self {
        Self::new(250, 250, 250)
    }
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as floats in the `0..=255` range.
    pub fn as_vec(&self) -> Vector3 {
        Vector3::new(self.r as f32, self.g as f32, self.b as f32)
    }

    /// Rounds and clamps a `0..=255` float color back to bytes.
    pub fn from_vec(v: &Vector3) -> Self {
        let quantize = |c: f32| libm::roundf(c).clamp(0.0, 255.0) as u8;
        Self::new(quantize(v.x), quantize(v.y), quantize(v.z))
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

/// A single directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Light {
    direction: Vector3,
}

impl Default for Light {
    /// A light at `(inf, inf, inf)`, shining towards the origin.
    fn default() -> Self {
        Self::new(Vector3::new(-1.0, -1.0, -1.0))
    }
}

impl Light {
    /// `direction` is the direction the light travels in. It is normalized here.
    pub fn new(direction: Vector3) -> Self {
        Self {
            direction: direction.normalize(),
        }
    }

    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// Lambert factor `max(0, -n.l)` for a unit normal.
    #[inline]
    pub fn lambert(&self, normal: &Vector3) -> f32 {
        (-normal.dot(&self.direction)).max(0.0)
    }
}

/// How normals are evaluated across a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shading {
    /// One light factor per triangle, from the normal at its first corner.
    Flat,
    /// Vertex normals interpolated perspective-correctly and renormalized per pixel.
    #[default]
    Smooth,
}

/// A square RGBA8 texture, sampled with nearest lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    size: usize,
    texels: Vec<[u8; 4]>,
}

impl Texture {
    /// Wraps `size * size` row-major texels, top row first.
    pub fn new(size: usize, texels: Vec<[u8; 4]>) -> Result<Self> {
        let expected = size * size;
        if size == 0 || texels.len() != expected {
            return Err(Error::TextureSize {
                size,
                expected,
                actual: texels.len(),
            });
        }

        Ok(Self { size, texels })
    }

    /// A checkerboard of `cells x cells` squares.
    pub fn checker(size: usize, cells: usize, a: Color, b: Color) -> Result<Self> {
        let cell = (size / cells.max(1)).max(1);
        let texels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if (x / cell + y / cell) % 2 == 0 {
                    a.to_rgba()
                } else {
                    b.to_rgba()
                }
            })
            .collect();
        Self::new(size, texels)
    }

    #[cfg(feature = "image")]
    pub fn from_image(image: &image::RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        let (width, height) = (width as usize, height as usize);
        if width != height {
            return Err(Error::NonSquareTexture { width, height });
        }
        Self::new(width, image.pixels().map(|p| p.0).collect())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Nearest texel at `(s, t)`, as per-channel factors in `0..=1`.
    ///
    /// Coordinates are truncated to texel indices and clamped to the edge. `t = 0` is the bottom
    /// row, as in OBJ files.
    #[inline]
    pub fn sample(&self, s: f32, t: f32) -> Vector3 {
        let last = self.size - 1;
        let n = self.size as f32;
        // Float to int casts saturate, so negative coordinates land on 0.
        let col = ((s * n) as usize).min(last);
        let row = (((1.0 - t) * n) as usize).min(last);
        let [r, g, b, _] = self.texels[row * self.size + col];
        Vector3::new(r as f32, g as f32, b as f32) / 255.0
    }
}
