use slicemesh_geom::Vec3;

use crate::attrs::FaceAttrs;
use crate::constants::CHUNK_HALF_SIZE;
use crate::face::FaceDirection;
use crate::mesh_build::{GeometryBuild, LitBuild};
use crate::slice::{QuadCandidate, SliceScalar};

// Receives each merged quad a slice flush lets through.
pub trait QuadSink<C, A> {
    fn push_quad(&mut self, dir: FaceDirection, depth: usize, quad: &QuadCandidate<C, A>);
}

/// A merged rectangle together with the slice it came from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EmittedQuad<C, A> {
    pub dir: FaceDirection,
    pub depth: usize,
    pub x: C,
    pub y: C,
    pub w: C,
    pub h: C,
    pub attrs: A,
}

impl<C: SliceScalar, A> EmittedQuad<C, A> {
    #[inline]
    pub fn area(&self) -> f32 {
        self.w.to_f32() * self.h.to_f32()
    }

    /// True when the footprints share interior area (touching edges do not count).
    pub fn overlaps(&self, other: &Self) -> bool {
        let (ax0, ay0) = (self.x.to_f32(), self.y.to_f32());
        let (ax1, ay1) = (ax0 + self.w.to_f32(), ay0 + self.h.to_f32());
        let (bx0, by0) = (other.x.to_f32(), other.y.to_f32());
        let (bx1, by1) = (bx0 + other.w.to_f32(), by0 + other.h.to_f32());
        ax0 < bx1 && bx0 < ax1 && ay0 < by1 && by0 < ay1
    }
}

impl<C: Copy, A: Copy> QuadSink<C, A> for Vec<EmittedQuad<C, A>> {
    #[inline]
    fn push_quad(&mut self, dir: FaceDirection, depth: usize, q: &QuadCandidate<C, A>) {
        self.push(EmittedQuad {
            dir,
            depth,
            x: q.x,
            y: q.y,
            w: q.w,
            h: q.h,
            attrs: q.attrs,
        });
    }
}

impl QuadSink<u16, ()> for GeometryBuild {
    #[inline]
    fn push_quad(&mut self, dir: FaceDirection, depth: usize, q: &QuadCandidate<u16, ()>) {
        self.add_face_rect(dir, depth, q.x.to_f32(), q.y.to_f32(), q.w.to_f32(), q.h.to_f32());
    }
}

impl QuadSink<f32, FaceAttrs> for LitBuild {
    #[inline]
    fn push_quad(&mut self, dir: FaceDirection, depth: usize, q: &QuadCandidate<f32, FaceAttrs>) {
        self.add_face_rect(dir, depth, q.x, q.y, q.w, q.h, q.attrs);
    }
}

/// Chunk-centered corner positions of a `w` x `h` quad at slice position `(x, y)`,
/// in the direction's template order.
#[inline]
pub fn quad_positions(dir: FaceDirection, depth: usize, x: f32, y: f32, w: f32, h: f32) -> [Vec3; 4] {
    let n = dir.plane(depth);
    let half = CHUNK_HALF_SIZE as f32;
    let corners = *dir.corners();
    corners.map(|[cu, cv]| dir.to_world(n, x + cu * w - half, y + cv * h - half))
}

/// Per-corner (u, v) spanning `0..w` by `0..h`, matching `quad_positions` order.
#[inline]
pub fn quad_uvs(dir: FaceDirection, w: f32, h: f32) -> [[f32; 2]; 4] {
    let corners = *dir.corners();
    corners.map(|[cu, cv]| [cu * w, cv * h])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_top_quad_at_mid_depth() {
        let p = quad_positions(FaceDirection::Top, 8, 0.0, 0.0, 1.0, 1.0);
        for v in p {
            assert_eq!(v.y, 1.0);
            assert!(v.x == -8.0 || v.x == -7.0);
            assert!(v.z == -8.0 || v.z == -7.0);
        }
    }

    #[test]
    fn quad_scales_along_free_axes() {
        let p = quad_positions(FaceDirection::Left, 0, 2.0, 3.0, 4.0, 5.0);
        let min_z = p.iter().map(|v| v.z).fold(f32::INFINITY, f32::min);
        let max_z = p.iter().map(|v| v.z).fold(f32::NEG_INFINITY, f32::max);
        let max_y = p.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);
        assert_eq!((min_z, max_z), (2.0 - 8.0, 6.0 - 8.0));
        assert_eq!(max_y, 8.0 - 8.0);
        assert!(p.iter().all(|v| v.x == -8.0));
    }

    #[test]
    fn overlap_ignores_shared_edges() {
        let a = EmittedQuad { dir: FaceDirection::Top, depth: 0, x: 0u16, y: 0, w: 2, h: 2, attrs: () };
        let b = EmittedQuad { x: 2, ..a };
        let c = EmittedQuad { x: 1, y: 1, ..a };
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert_eq!(c.area(), 4.0);
    }
}
