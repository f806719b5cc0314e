//! One face direction at one depth: a flat arena of quad candidates.
//!
//! Faces arrive in scan order and are folded into the most recently added
//! candidate when they extend its row. `flush_into` then runs one forward
//! sweep that glues candidates horizontally or vertically, hands every
//! survivor to a sink and resets the slice. Storage is allocated once and
//! only overwritten afterwards.

use std::fmt::Debug;
use std::ops::{Add, AddAssign};

use crate::attrs::{FaceAttrs, MergeKey};
use crate::constants::{CHUNK_SIZE, SLICE_AREA};
use crate::emit::QuadSink;
use crate::face::FaceDirection;
use crate::mesh_build::{GeometryBuild, LitBuild};

/// Coordinate type of a candidate. Integers for geometry-only slices, `f32` for lit ones.
pub trait SliceScalar: Copy + Default + PartialEq + Debug + Add<Output = Self> + AddAssign {
    const ONE: Self;
    fn to_f32(self) -> f32;
}

impl SliceScalar for u16 {
    const ONE: u16 = 1;
    #[inline]
    fn to_f32(self) -> f32 {
        f32::from(self)
    }
}

impl SliceScalar for f32 {
    const ONE: f32 = 1.0;
    #[inline]
    fn to_f32(self) -> f32 {
        self
    }
}

/// Axis-aligned rectangle in slice coordinates awaiting emission.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct QuadCandidate<C, A> {
    pub x: C,
    pub y: C,
    pub w: C,
    pub h: C,
    pub attrs: A,
    // Absorbed by an earlier candidate during the current flush.
    used: bool,
}

impl<C: SliceScalar, A: MergeKey> QuadCandidate<C, A> {
    #[inline]
    fn unit(x: C, y: C, attrs: A) -> Self {
        Self {
            x,
            y,
            w: C::ONE,
            h: C::ONE,
            attrs,
            used: false,
        }
    }

    /// `other` starts where this row ends.
    #[inline]
    fn touches_right(&self, other: &Self) -> bool {
        other.y == self.y && other.h == self.h && other.x == self.x + self.w
    }

    /// `other` starts where this column ends.
    #[inline]
    fn touches_above(&self, other: &Self) -> bool {
        other.x == self.x && other.w == self.w && other.y == self.y + self.h
    }
}

pub struct Slice<C, A> {
    quads: Box<[QuadCandidate<C, A>]>,
    count: usize,
    // Most recently added candidate; the only one `push_face` tries to extend.
    last: Option<usize>,
}

pub type GeometrySlice = Slice<u16, ()>;
pub type LitSlice = Slice<f32, FaceAttrs>;

impl<C: SliceScalar, A: MergeKey> Slice<C, A> {
    pub fn new() -> Self {
        Self {
            quads: vec![QuadCandidate::default(); SLICE_AREA].into_boxed_slice(),
            count: 0,
            last: None,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.quads.len()
    }

    /// Live candidates in insertion order.
    #[inline]
    pub fn candidates(&self) -> &[QuadCandidate<C, A>] {
        &self.quads[..self.count]
    }

    /// Appends one unit face at column `x` of row `y`.
    ///
    /// Within a row, `x` must not decrease between calls. A face that continues
    /// the most recently added candidate's row with matching attributes widens
    /// it; anything else takes the next free slot.
    pub fn push_face(&mut self, x: C, y: C, attrs: A) {
        debug_assert!(in_chunk(x), "slice x {x:?} outside [0, {CHUNK_SIZE})");
        debug_assert!(in_chunk(y), "slice y {y:?} outside [0, {CHUNK_SIZE})");
        if let Some(li) = self.last {
            let q = &mut self.quads[li];
            if q.y == y && q.x + q.w == x && q.attrs.merges_with(&attrs) {
                q.w += C::ONE;
                return;
            }
        }
        let slot = self.count;
        // Overflow only happens with duplicate submissions; indexing panics.
        self.quads[slot] = QuadCandidate::unit(x, y, attrs);
        self.count += 1;
        self.last = Some(slot);
    }

    /// Single forward sweep: each surviving candidate absorbs later neighbours that
    /// extend it to the right or upward. Absorbed candidates are never revisited as
    /// absorbers, so the result is not guaranteed maximal.
    fn merge(&mut self) {
        let quads = &mut self.quads[..self.count];
        for k in 0..quads.len() {
            if quads[k].used {
                continue;
            }
            for j in (k + 1)..quads.len() {
                let other = quads[j];
                if other.used || !quads[k].attrs.merges_with(&other.attrs) {
                    continue;
                }
                if quads[k].touches_right(&other) {
                    quads[k].w += other.w;
                    quads[j].used = true;
                } else if quads[k].touches_above(&other) {
                    quads[k].h += other.h;
                    quads[j].used = true;
                }
            }
        }
    }

    /// Merges, hands every surviving quad to `sink`, and empties the slice.
    /// Returns the number of quads emitted; an empty slice does no work.
    pub fn flush_into<S>(&mut self, dir: FaceDirection, depth: usize, sink: &mut S) -> usize
    where
        S: QuadSink<C, A> + ?Sized,
    {
        if self.count == 0 {
            return 0;
        }
        self.merge();
        let mut emitted = 0;
        for q in self.quads[..self.count].iter().filter(|q| !q.used) {
            sink.push_quad(dir, depth, q);
            emitted += 1;
        }
        self.clear();
        emitted
    }

    /// Forgets all candidates. Storage is kept and later overwritten.
    #[inline]
    pub fn clear(&mut self) {
        self.count = 0;
        self.last = None;
    }
}

impl<C: SliceScalar, A: MergeKey> Default for Slice<C, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl Slice<u16, ()> {
    #[inline]
    pub fn add_quad(&mut self, x: u16, y: u16) {
        self.push_face(x, y, ());
    }

    pub fn flush_triangles(
        &mut self,
        dir: FaceDirection,
        depth: usize,
        out: &mut GeometryBuild,
    ) -> usize {
        self.flush_into(dir, depth, out)
    }
}

impl Slice<f32, FaceAttrs> {
    #[inline]
    pub fn add_quad(&mut self, x: f32, y: f32, attrs: FaceAttrs) {
        self.push_face(x, y, attrs);
    }

    pub fn flush_triangles(&mut self, dir: FaceDirection, depth: usize, out: &mut LitBuild) -> usize {
        self.flush_into(dir, depth, out)
    }
}

#[inline]
fn in_chunk<C: SliceScalar>(v: C) -> bool {
    let f = v.to_f32();
    f >= 0.0 && f < CHUNK_SIZE as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attrs::{PackedLight, Rgba};
    use crate::emit::EmittedQuad;

    fn rects(s: &mut GeometrySlice) -> Vec<(u16, u16, u16, u16)> {
        let mut out: Vec<EmittedQuad<u16, ()>> = Vec::new();
        s.flush_into(FaceDirection::Top, 0, &mut out);
        out.iter().map(|q| (q.x, q.y, q.w, q.h)).collect()
    }

    #[test]
    fn row_runs_extend_in_place() {
        let mut s = GeometrySlice::new();
        for x in 0..5 {
            s.add_quad(x, 3);
        }
        assert_eq!(s.len(), 1);
        let c = s.candidates()[0];
        assert_eq!((c.x, c.y, c.w, c.h), (0, 3, 5, 1));
    }

    #[test]
    fn gaps_and_row_changes_start_new_candidates() {
        let mut s = GeometrySlice::new();
        s.add_quad(0, 0);
        s.add_quad(2, 0); // gap
        s.add_quad(3, 1); // new row
        s.add_quad(4, 1);
        assert_eq!(s.len(), 3);
        assert_eq!(s.candidates()[2].w, 2);
    }

    #[test]
    fn only_the_last_candidate_is_extended() {
        let mut s = GeometrySlice::new();
        s.add_quad(0, 0);
        s.add_quad(0, 1);
        s.add_quad(1, 0); // row 0 resumes but the last candidate is on row 1
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn attributes_split_runs() {
        let a = FaceAttrs::new(Rgba::WHITE, PackedLight::new(15, 0), 1);
        let b = FaceAttrs { texture: 2, ..a };
        let mut s = LitSlice::new();
        s.add_quad(0.0, 0.0, a);
        s.add_quad(1.0, 0.0, a);
        s.add_quad(2.0, 0.0, b);
        assert_eq!(s.len(), 2);
        assert_eq!(s.candidates()[0].w, 2.0);
    }

    #[test]
    fn rows_stack_into_one_quad() {
        let mut s = GeometrySlice::new();
        for y in 0..4 {
            for x in 0..4 {
                s.add_quad(x, y);
            }
        }
        assert_eq!(s.len(), 4);
        assert_eq!(rects(&mut s), vec![(0, 0, 4, 4)]);
    }

    #[test]
    fn horizontal_glue_needs_equal_heights() {
        let mut s = GeometrySlice::new();
        // Rows 0 and 1 at x=0..2 stack; a lone face at (2,0) cannot join the 2x2.
        s.add_quad(0, 0);
        s.add_quad(1, 0);
        s.add_quad(0, 1);
        s.add_quad(1, 1);
        s.add_quad(2, 0);
        let mut r = rects(&mut s);
        r.sort();
        assert_eq!(r, vec![(0, 0, 2, 2), (2, 0, 1, 1)]);
    }

    #[test]
    fn sweep_does_not_revisit_earlier_candidates() {
        let mut s = GeometrySlice::new();
        // Interleaved rows: candidates end up as (0,1,w1), (0,0,w2), (1,1,w1).
        s.add_quad(0, 1);
        s.add_quad(0, 0);
        s.add_quad(1, 0);
        s.add_quad(1, 1);
        assert_eq!(s.len(), 3);
        // Candidate 0 grows to (0,1,2,1) only after candidate 1 was already
        // passed over, so the pair never stacks into one 2x2.
        assert_eq!(rects(&mut s), vec![(0, 1, 2, 1), (0, 0, 2, 1)]);
    }

    #[test]
    fn flush_resets_and_second_flush_is_noop() {
        let mut s = GeometrySlice::new();
        s.add_quad(7, 7);
        let mut out = GeometryBuild::default();
        assert_eq!(s.flush_triangles(FaceDirection::Back, 3, &mut out), 1);
        assert!(s.is_empty());
        let before = out.clone();
        assert_eq!(s.flush_triangles(FaceDirection::Back, 3, &mut out), 0);
        assert_eq!(out, before);
    }

    #[test]
    fn storage_survives_clear() {
        let mut s = LitSlice::new();
        let cap = s.capacity();
        s.add_quad(1.0, 1.0, FaceAttrs::default());
        s.clear();
        assert!(s.is_empty());
        assert_eq!(s.capacity(), cap);
        // A stale candidate must not be extended after clear.
        s.add_quad(2.0, 1.0, FaceAttrs::default());
        assert_eq!(s.candidates()[0].x, 2.0);
        assert_eq!(s.candidates()[0].w, 1.0);
    }

    #[test]
    fn sub_voxel_positions_are_kept() {
        let mut s = LitSlice::new();
        s.add_quad(0.5, 2.25, FaceAttrs::default());
        s.add_quad(1.5, 2.25, FaceAttrs::default());
        let c = s.candidates()[0];
        assert_eq!((c.x, c.y, c.w, c.h), (0.5, 2.25, 2.0, 1.0));
    }
}
