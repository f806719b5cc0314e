//! CPU greedy mesher: per-slice quad accumulation and triangle emission (engine-only).
//!
//! Faces are submitted one voxel face at a time in scan order and merged twice:
//! incrementally into row runs while they arrive, then by a single forward
//! sweep at flush time that stacks runs and glues neighbours. Two variants
//! share the machinery:
//!
//! - [`GeometryMesher`] emits positions and indices only.
//! - [`LitMesher`] also emits normals, 4-wide UVs (u, v, texture, light) and
//!   optional per-vertex tint, and never merges faces whose tint, light or
//!   texture differ.
//!
//! Output is in chunk-local coordinates centered on the chunk origin.
#![forbid(unsafe_code)]

pub mod attrs;
pub mod constants;
pub mod emit;
pub mod face;
pub mod mesh_build;
pub mod mesher;
pub mod slice;

pub use attrs::{FaceAttrs, MergeKey, PackedLight, Rgba};
pub use constants::{CHUNK_HALF_SIZE, CHUNK_SIZE, MAX_LIGHT_LEVEL};
pub use emit::{EmittedQuad, QuadSink};
pub use face::{Axis, FaceDirection, ParseFaceDirectionError};
pub use mesh_build::{GEOMETRY_QUAD_INDICES, GeometryBuild, LIT_QUAD_INDICES, LitBuild};
pub use mesher::{FlushStats, GeometryMesher, LitFace, LitMesher, Mesher};
pub use slice::{GeometrySlice, LitSlice, QuadCandidate, Slice, SliceScalar};
