use crate::attrs::FaceAttrs;
use crate::constants::{
    COLOR_COMPONENTS, INDICES_PER_QUAD, NORMAL_COMPONENTS, POS_COMPONENTS, UV_COMPONENTS,
    VERTS_PER_QUAD,
};
use crate::emit::{quad_positions, quad_uvs};
use crate::face::FaceDirection;

/// Geometry-only triangle split: diagonal from corner 0 to corner 3.
pub const GEOMETRY_QUAD_INDICES: [u32; INDICES_PER_QUAD] = [0, 1, 3, 3, 2, 0];
/// Lit triangle split: diagonal from corner 1 to corner 2.
pub const LIT_QUAD_INDICES: [u32; INDICES_PER_QUAD] = [0, 1, 2, 3, 2, 1];

/// Positions and indices only.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct GeometryBuild {
    pub pos: Vec<f32>,
    pub idx: Vec<u32>,
}

impl GeometryBuild {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all arrays but retains capacity for reuse across chunks.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.idx.clear();
    }

    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        self.pos.reserve(n_quads * VERTS_PER_QUAD * POS_COMPONENTS);
        self.idx.reserve(n_quads * INDICES_PER_QUAD);
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / POS_COMPONENTS
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / INDICES_PER_QUAD
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a `w` x `h` rectangle of slice `(dir, depth)` as four vertices and two triangles.
    pub fn add_face_rect(&mut self, dir: FaceDirection, depth: usize, x: f32, y: f32, w: f32, h: f32) {
        let base = self.vertex_count() as u32;
        for p in quad_positions(dir, depth, x, y, w, h) {
            self.pos.extend_from_slice(&p.to_array());
        }
        self.idx.extend(GEOMETRY_QUAD_INDICES.iter().map(|i| base + i));
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }

    pub fn indices(&self) -> &[u32] {
        &self.idx
    }
}

/// Positions, normals, 4-wide UVs (u, v, texture, light), indices and optional RGBA colors.
#[derive(Clone, Debug, PartialEq)]
pub struct LitBuild {
    pub pos: Vec<f32>,
    pub norm: Vec<f32>,
    pub uv: Vec<f32>,
    pub idx: Vec<u32>,
    /// `None` when the consumer has no use for per-vertex tint.
    pub col: Option<Vec<u8>>,
}

impl Default for LitBuild {
    fn default() -> Self {
        Self::new()
    }
}

impl LitBuild {
    pub fn new() -> Self {
        Self {
            pos: Vec::new(),
            norm: Vec::new(),
            uv: Vec::new(),
            idx: Vec::new(),
            col: Some(Vec::new()),
        }
    }

    pub fn without_colors() -> Self {
        Self {
            col: None,
            ..Self::new()
        }
    }

    /// Clears all arrays but retains capacity for reuse across chunks.
    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.pos.clear();
        self.norm.clear();
        self.uv.clear();
        self.idx.clear();
        if let Some(col) = self.col.as_mut() {
            col.clear();
        }
    }

    /// Pre-reserve capacity for approximately `n_quads` quads worth of data.
    #[inline]
    pub fn reserve_quads(&mut self, n_quads: usize) {
        let verts = n_quads * VERTS_PER_QUAD;
        self.pos.reserve(verts * POS_COMPONENTS);
        self.norm.reserve(verts * NORMAL_COMPONENTS);
        self.uv.reserve(verts * UV_COMPONENTS);
        self.idx.reserve(n_quads * INDICES_PER_QUAD);
        if let Some(col) = self.col.as_mut() {
            col.reserve(verts * COLOR_COMPONENTS);
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.pos.len() / POS_COMPONENTS
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.idx.len() / INDICES_PER_QUAD
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    /// Appends a `w` x `h` rectangle of slice `(dir, depth)`. The texture index and
    /// packed light ride in the third and fourth UV components.
    #[allow(clippy::too_many_arguments)]
    pub fn add_face_rect(
        &mut self,
        dir: FaceDirection,
        depth: usize,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        attrs: FaceAttrs,
    ) {
        let base = self.vertex_count() as u32;
        let n = dir.normal().to_array();
        let tex = f32::from(attrs.texture);
        let light = f32::from(attrs.light.raw());
        let positions = quad_positions(dir, depth, x, y, w, h);
        let uvs = quad_uvs(dir, w, h);
        for (p, [u, v]) in positions.iter().zip(uvs) {
            self.pos.extend_from_slice(&p.to_array());
            self.norm.extend_from_slice(&n);
            self.uv.extend_from_slice(&[u, v, tex, light]);
            if let Some(col) = self.col.as_mut() {
                col.extend_from_slice(&attrs.color.0);
            }
        }
        self.idx.extend(LIT_QUAD_INDICES.iter().map(|i| base + i));
    }

    /// Returns a slice of interleaved vertex positions (x,y,z per vertex).
    pub fn positions(&self) -> &[f32] {
        &self.pos
    }
    /// Returns a slice of interleaved vertex normals (x,y,z per vertex).
    pub fn normals(&self) -> &[f32] {
        &self.norm
    }

    pub fn uvs(&self) -> &[f32] {
        &self.uv
    }

    pub fn indices(&self) -> &[u32] {
        &self.idx
    }

    pub fn colors(&self) -> Option<&[u8]> {
        self.col.as_deref()
    }
}
