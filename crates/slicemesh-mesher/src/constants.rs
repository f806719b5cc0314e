//! Chunk dimensions and buffer layout constants.

/// Voxels per chunk edge.
pub const CHUNK_SIZE: usize = 16;
/// Chunk meshes are centered on the chunk origin; every axis is shifted by this.
pub const CHUNK_HALF_SIZE: usize = CHUNK_SIZE / 2;

/// Worst-case candidates in one slice (one per unit face, nothing merged).
pub const SLICE_AREA: usize = CHUNK_SIZE * CHUNK_SIZE;
/// Slices per mesher: one per (direction, depth).
pub const SLICE_COUNT: usize = crate::face::FaceDirection::COUNT * CHUNK_SIZE;

pub const VERTS_PER_QUAD: usize = 4;
pub const INDICES_PER_QUAD: usize = 6;

// Flat stream strides
pub const POS_COMPONENTS: usize = 3;
pub const NORMAL_COMPONENTS: usize = 3;
pub const UV_COMPONENTS: usize = 4; // u, v, texture index, packed light
pub const COLOR_COMPONENTS: usize = 4;

/// Highest sun or torch level a `PackedLight` can carry (one nibble each).
pub const MAX_LIGHT_LEVEL: u8 = 15;
pub const OPAQUE_ALPHA: u8 = 255;
