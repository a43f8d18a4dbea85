//! Geometry ingestion and the per-vertex transform pipeline.

use alloc::{vec, vec::Vec};

use crate::{
    Camera, Color, Error, Matrix4, RasterConfig, RenderStats, RenderTarget, Result, Texture,
    Triangle, Vector3H, VertexStreams,
};

/// One triangle of raw geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub vertices: [usize; 3],
    pub tex_coords: Option<[usize; 3]>,
    pub normals: Option<[usize; 3]>,
}

impl Face {
    pub fn new(vertices: [usize; 3]) -> Self {
        Self {
            vertices,
            tex_coords: None,
            normals: None,
        }
    }

    /// Builds a face from sentinel encoded indices, where `-1` (or any negative index) marks an
    /// absent texture coordinate or normal. A triple is kept only if all three corners are set.
    pub fn from_raw(vertices: [usize; 3], tex_coords: [i64; 3], normals: [i64; 3]) -> Self {
        fn present(idx: [i64; 3]) -> Option<[usize; 3]> {
            if idx.iter().all(|&i| i >= 0) {
                Some(idx.map(|i| i as usize))
            } else {
                None
            }
        }

        Self {
            vertices,
            tex_coords: present(tex_coords),
            normals: present(normals),
        }
    }
}

/// Raw mesh data as produced by a loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    /// `(s, t)` pairs.
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
}

/// Axis aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vector3H,
    pub max: Vector3H,
}

impl Default for Bounds {
    /// Inverted, infinitely empty bounds. Any point expands them.
    fn default() -> Self {
        Self {
            min: Vector3H::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            max: Vector3H::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }
}

impl Bounds {
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Vector3H>) -> Self {
        let mut bounds = Self::default();
        for p in points {
            bounds.expand(p);
        }
        bounds
    }

    pub fn expand(&mut self, p: &Vector3H) {
        self.min.0.x = self.min.x.min(p.x);
        self.min.0.y = self.min.y.min(p.y);
        self.min.0.z = self.min.z.min(p.z);
        self.max.0.x = self.max.x.max(p.x);
        self.max.0.y = self.max.y.max(p.y);
        self.max.0.z = self.max.z.max(p.z);
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vector3H {
        let mut c = self.min;
        c.add(&self.max);
        c.scale(0.5);
        c
    }

    /// Radius of the bounding sphere around [`Bounds::center`].
    pub fn radius(&self) -> f32 {
        let mut extents = self.max;
        extents.sub(&self.center());
        extents.length()
    }
}

/// Computes area weighted vertex normals.
///
/// Each triangle contributes its non-normalized face normal, whose length is proportional to the
/// triangle area, to all three of its vertices. The sums are normalized at the end. A vertex that
/// only touches degenerate triangles ends up with NaN lanes.
pub fn vertex_normals(positions: &[Vector3H], faces: &[Face]) -> Vec<Vector3H> {
    let mut normals = vec![Vector3H::direction(0.0, 0.0, 0.0); positions.len()];

    let mut ab = Vector3H::default();
    let mut ac = Vector3H::default();
    let mut face_normal = Vector3H::default();

    for face in faces {
        let [a, b, c] = face.vertices.map(|i| &positions[i]);

        ab.copy_from(b);
        ab.sub(a);
        ac.copy_from(c);
        ac.sub(a);
        face_normal.cross(&ab, &ac);

        for i in face.vertices {
            normals[i].add(&face_normal);
        }
    }

    for n in normals.iter_mut() {
        n.normalize();
    }

    normals
}

/// Insertion sort in descending key order.
///
/// Returns the number of element moves, which is 0 for already sorted input and `n(n-1)/2` for
/// input in exactly the opposite order. Sorting is stable.
pub fn insertion_sort_desc<T: Copy>(items: &mut [T], key: impl Fn(&T) -> f32) -> u64 {
    let mut swaps = 0;

    for i in 1..items.len() {
        let candidate = items[i];
        let candidate_key = key(&candidate);
        let mut j = i;

        while j > 0 && key(&items[j - 1]) < candidate_key {
            items[j] = items[j - 1];
            swaps += 1;
            j -= 1;
        }

        items[j] = candidate;
    }

    swaps
}

/// A triangle mesh together with its transform pipeline.
///
/// Every pipeline stage has its own vertex array. The arrays are allocated once on load and then
/// overwritten in place by every [`Mesh::project`] call:
///
/// ```text
/// coordinates -> local -> world -> camera -> projected -> clip -> screen
/// ```
///
/// Normals go through the local transform only. A world transform with rotation will therefore
/// leave the lighting stale.
#[derive(Debug, Clone)]
pub struct Mesh {
    local_transform: Matrix4,
    world_transform: Matrix4,

    coordinates: Vec<Vector3H>,
    local: Vec<Vector3H>,
    world: Vec<Vector3H>,
    camera: Vec<Vector3H>,
    projected: Vec<Vector3H>,
    clip: Vec<Vector3H>,
    screen: Vec<Vector3H>,

    local_normals: Vec<Vector3H>,
    world_normals: Vec<Vector3H>,
    tex_coords: Vec<Vector3H>,

    triangles: Vec<Triangle>,
    bounds: Bounds,
}

fn check_indices(
    face: usize,
    idx: &[usize; 3],
    len: usize,
    err: fn(usize, usize, usize) -> Error,
) -> Result<()> {
    match idx.iter().find(|&&i| i >= len) {
        Some(&index) => Err(err(face, index, len)),
        None => Ok(()),
    }
}

impl Mesh {
    /// Builds a mesh from raw geometry.
    ///
    /// All indices are validated up front, so rendering never reads out of bounds. Faces without
    /// normal indices get generated, area weighted vertex normals, appended after any normals the
    /// geometry already carries. Returns an error for the first index out of range.
    pub fn load(geometry: &Geometry) -> Result<Self> {
        let positions = geometry.positions.len();
        let normals = geometry.normals.len();
        let tex_coords = geometry.tex_coords.len();

        for (n, face) in geometry.faces.iter().enumerate() {
            check_indices(n, &face.vertices, positions, |face, index, len| {
                Error::PositionIndex { face, index, len }
            })?;
            if let Some(idx) = &face.normals {
                check_indices(n, idx, normals, |face, index, len| Error::NormalIndex {
                    face,
                    index,
                    len,
                })?;
            }
            if let Some(idx) = &face.tex_coords {
                check_indices(n, idx, tex_coords, |face, index, len| {
                    Error::TexCoordIndex { face, index, len }
                })?;
            }
        }

        log::debug!(
            "loading mesh: {} vertices, {} triangles",
            positions,
            geometry.faces.len()
        );

        let coordinates: Vec<Vector3H> =
            geometry.positions.iter().map(|&p| Vector3H::from(p)).collect();

        let mut local_normals: Vec<Vector3H> = geometry
            .normals
            .iter()
            .map(|&[x, y, z]| Vector3H::direction(x, y, z))
            .collect();

        // Generated normals are indexed like the positions, offset past the loaded ones.
        let generated_offset = local_normals.len();
        if geometry.faces.iter().any(|f| f.normals.is_none()) {
            log::debug!("generating vertex normals");
            local_normals.extend(vertex_normals(&coordinates, &geometry.faces));
        }

        let tex_coords = geometry
            .tex_coords
            .iter()
            .map(|&[s, t]| Vector3H::new(s, t, 0.0))
            .collect();

        let color = Color::default();
        let triangles = geometry
            .faces
            .iter()
            .map(|f| {
                let normals = f
                    .normals
                    .unwrap_or_else(|| f.vertices.map(|i| i + generated_offset));
                Triangle::new(f.vertices, normals, f.tex_coords, color)
            })
            .collect();

        let stage = vec![Vector3H::default(); positions];

        let mut mesh = Self {
            local_transform: Matrix4::identity(),
            world_transform: Matrix4::identity(),
            coordinates,
            local: stage.clone(),
            world: stage.clone(),
            camera: stage.clone(),
            projected: stage.clone(),
            clip: stage.clone(),
            screen: stage,
            world_normals: vec![Vector3H::direction(0.0, 0.0, 0.0); local_normals.len()],
            local_normals,
            tex_coords,
            triangles,
            bounds: Bounds::default(),
        };

        mesh.apply_local_transform();
        mesh.bounds = Bounds::from_points(&mesh.local);

        Ok(mesh)
    }

    /// Bounds of the locally transformed vertices, as of load time.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn local_transform(&self) -> &Matrix4 {
        &self.local_transform
    }

    pub fn world_transform(&self) -> &Matrix4 {
        &self.world_transform
    }

    pub fn world_transform_mut(&mut self) -> &mut Matrix4 {
        &mut self.world_transform
    }

    /// Sets the absolute local orientation, in degrees around x, y and z.
    pub fn set_local_rotation(&mut self, x: f32, y: f32, z: f32) {
        self.local_transform.rotate(x, y, z);
    }

    pub fn set_local_position(&mut self, v: &Vector3H) {
        self.local_transform.set_position(v);
    }

    pub fn set_world_position(&mut self, v: &Vector3H) {
        self.world_transform.set_position(v);
    }

    /// Sets the base color of every triangle.
    pub fn set_color(&mut self, color: Color) {
        for t in self.triangles.iter_mut() {
            t.color = color;
        }
    }

    pub fn local_coordinates(&self) -> &[Vector3H] {
        &self.local
    }

    pub fn world_coordinates(&self) -> &[Vector3H] {
        &self.world
    }

    pub fn camera_coordinates(&self) -> &[Vector3H] {
        &self.camera
    }

    pub fn projected_coordinates(&self) -> &[Vector3H] {
        &self.projected
    }

    pub fn clip_coordinates(&self) -> &[Vector3H] {
        &self.clip
    }

    /// Screen space vertices. `w` holds the pre-divide clip `w`.
    pub fn screen_coordinates(&self) -> &[Vector3H] {
        &self.screen
    }

    pub fn normals(&self) -> &[Vector3H] {
        &self.world_normals
    }

    fn apply_local_transform(&mut self) {
        for (src, dst) in self.coordinates.iter().zip(self.local.iter_mut()) {
            self.local_transform.transform(src, dst);
        }
    }

    /// Runs every vertex and normal through the pipeline for the given camera.
    pub fn project(&mut self, camera: &mut Camera) {
        self.apply_local_transform();

        for (src, dst) in self.local.iter().zip(self.world.iter_mut()) {
            self.world_transform.transform(src, dst);
        }

        let camera_matrix = *camera.camera_matrix();
        for (src, dst) in self.world.iter().zip(self.camera.iter_mut()) {
            camera_matrix.transform(src, dst);
        }

        let projection = *camera.projection_matrix();
        for (src, dst) in self.camera.iter().zip(self.projected.iter_mut()) {
            projection.transform(src, dst);
        }

        let (half_width, half_height) = camera.half_viewport();
        for ((projected, clip), screen) in self
            .projected
            .iter()
            .zip(self.clip.iter_mut())
            .zip(self.screen.iter_mut())
        {
            projected.to_clip_space(clip);
            clip.to_screen_space(half_width, half_height, screen);
            // The rasterizer needs the pre-divide w for reciprocal depth interpolation.
            screen.0.w = projected.w;
        }

        // Local rotation only, see the type level docs.
        for (src, dst) in self.local_normals.iter().zip(self.world_normals.iter_mut()) {
            self.local_transform.transform_direction(src, dst);
        }
    }

    /// Orders triangles front to back by the screen `w` of their first vertex.
    ///
    /// The order changes little from frame to frame, so the insertion sort runs in close to
    /// linear time. Visibility is decided by the depth buffer, the order only saves shading work
    /// on pixels that would be overwritten anyway.
    pub fn sort(&mut self, stats: &mut RenderStats) {
        let screen = &self.screen;
        stats.swaps += insertion_sort_desc(&mut self.triangles, |t| -screen[t.vertices[0]].w);
    }

    /// Sorts and rasterizes all triangles into `target`.
    ///
    /// Expects a preceding [`Mesh::project`] call for the current camera.
    pub fn render(
        &mut self,
        target: &mut RenderTarget,
        texture: Option<&Texture>,
        config: &RasterConfig,
        stats: &mut RenderStats,
    ) {
        self.sort(stats);

        let streams = VertexStreams {
            screen: &self.screen,
            normals: &self.world_normals,
            tex_coords: &self.tex_coords,
        };

        for triangle in &self.triangles {
            triangle.draw(&streams, texture, config, target, stats);
        }
    }
}
