use std::fmt;

use crate::attrs::{FaceAttrs, MergeKey};
use crate::constants::{CHUNK_SIZE, INDICES_PER_QUAD, SLICE_COUNT, VERTS_PER_QUAD};
use crate::emit::QuadSink;
use crate::face::FaceDirection;
use crate::mesh_build::{GeometryBuild, LitBuild};
use crate::slice::{Slice, SliceScalar};

/// Counts for one flush.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Unit faces submitted since the previous flush or clear.
    pub faces: usize,
    pub quads: usize,
    pub vertices: usize,
    pub indices: usize,
}

impl FlushStats {
    fn for_quads(faces: usize, quads: usize) -> Self {
        Self {
            faces,
            quads,
            vertices: quads * VERTS_PER_QUAD,
            indices: quads * INDICES_PER_QUAD,
        }
    }
}

impl fmt::Display for FlushStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "faces={} quads={} verts={} indices={}",
            self.faces, self.quads, self.vertices, self.indices
        )
    }
}

/// One visible voxel face headed for a lit mesher.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LitFace {
    pub dir: FaceDirection,
    pub x: f32,
    pub y: f32,
    pub depth: usize,
    pub attrs: FaceAttrs,
}

/// Greedy mesher for a single chunk at a time.
///
/// Owns one `Slice` per (direction, depth). Submit every visible face with
/// `add_quad`, call `flush_triangles` once, then `clear` before the next chunk.
/// Instances are meant to be owned by one worker and reused; nothing is
/// allocated after `new`.
pub struct Mesher<C, A> {
    slices: Box<[Slice<C, A>]>,
    faces: usize,
}

pub type GeometryMesher = Mesher<u16, ()>;
pub type LitMesher = Mesher<f32, FaceAttrs>;

impl<C: SliceScalar, A: MergeKey> Mesher<C, A> {
    pub fn new() -> Self {
        Self {
            slices: (0..SLICE_COUNT).map(|_| Slice::new()).collect(),
            faces: 0,
        }
    }

    #[inline]
    fn slot(dir: FaceDirection, depth: usize) -> usize {
        debug_assert!(depth < CHUNK_SIZE, "depth {depth} outside [0, {CHUNK_SIZE})");
        dir.index() * CHUNK_SIZE + depth
    }

    /// Routes one face to `slices[dir * CHUNK_SIZE + depth]`.
    #[inline]
    pub fn push_face(&mut self, dir: FaceDirection, x: C, y: C, depth: usize, attrs: A) {
        self.slices[Self::slot(dir, depth)].push_face(x, y, attrs);
        self.faces += 1;
    }

    #[inline]
    pub fn slice(&self, dir: FaceDirection, depth: usize) -> &Slice<C, A> {
        &self.slices[Self::slot(dir, depth)]
    }

    /// Faces submitted since the last flush or clear.
    #[inline]
    pub fn faces_submitted(&self) -> usize {
        self.faces
    }

    /// Candidates currently held across all slices.
    pub fn pending_candidates(&self) -> usize {
        self.slices.iter().map(Slice::len).sum()
    }

    /// Flushes every slice into `sink`, direction-major then depth-minor, so identical
    /// input always yields identical output. Returns the number of quads emitted.
    pub fn flush_into<S>(&mut self, sink: &mut S) -> usize
    where
        S: QuadSink<C, A> + ?Sized,
    {
        let mut quads = 0;
        for dir in FaceDirection::ALL {
            for depth in 0..CHUNK_SIZE {
                let n = self.slices[Self::slot(dir, depth)].flush_into(dir, depth, sink);
                if n > 0 {
                    log::trace!("slice {dir}@{depth}: {n} quad(s)");
                }
                quads += n;
            }
        }
        self.faces = 0;
        quads
    }

    fn flush_counted<S>(&mut self, sink: &mut S) -> FlushStats
    where
        S: QuadSink<C, A> + ?Sized,
    {
        let faces = self.faces;
        let quads = self.flush_into(sink);
        let stats = FlushStats::for_quads(faces, quads);
        log::debug!("mesher flush: {stats}");
        stats
    }

    /// Drops every pending candidate. Slice storage is kept, not zeroed.
    pub fn clear(&mut self) {
        for s in self.slices.iter_mut() {
            s.clear();
        }
        self.faces = 0;
    }
}

impl<C: SliceScalar, A: MergeKey> Default for Mesher<C, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl Mesher<u16, ()> {
    #[inline]
    pub fn add_quad(&mut self, dir: FaceDirection, x: u16, y: u16, depth: usize) {
        self.push_face(dir, x, y, depth, ());
    }

    /// Appends this chunk's merged quads to `out`.
    pub fn flush_triangles(&mut self, out: &mut GeometryBuild) -> FlushStats {
        self.flush_counted(out)
    }
}

impl Mesher<f32, FaceAttrs> {
    #[inline]
    pub fn add_quad(&mut self, dir: FaceDirection, x: f32, y: f32, depth: usize, attrs: FaceAttrs) {
        self.push_face(dir, x, y, depth, attrs);
    }

    pub fn add_faces(&mut self, faces: &[LitFace]) {
        for f in faces {
            self.push_face(f.dir, f.x, f.y, f.depth, f.attrs);
        }
    }

    /// Appends this chunk's merged quads to `out`.
    pub fn flush_triangles(&mut self, out: &mut LitBuild) -> FlushStats {
        self.flush_counted(out)
    }
}
