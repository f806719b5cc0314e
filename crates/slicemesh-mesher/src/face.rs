use std::fmt;
use std::str::FromStr;

use slicemesh_geom::Vec3;

use crate::constants::CHUNK_HALF_SIZE;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// The six axis-aligned face directions. Discriminants are the slice-table row.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum FaceDirection {
    Top = 0,
    Bottom = 1,
    Left = 2,
    Right = 3,
    Forward = 4,
    Back = 5,
}

// Unit-quad corners in slice (u, v) space, in vertex order. Corner 0 is the quad
// origin and corner 3 the far corner; both index patterns rely on that. The
// "swapped" table mirrors the winding for directions where u x v opposes the normal.
const CORNERS_UV: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]];
const CORNERS_VU: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];

const FACE_CORNERS: [&[[f32; 2]; 4]; FaceDirection::COUNT] = [
    &CORNERS_VU, // Top:     u=X v=Z, X x Z = -Y
    &CORNERS_UV, // Bottom:  u=X v=Z
    &CORNERS_UV, // Left:    u=Z v=Y, Z x Y = -X
    &CORNERS_VU, // Right:   u=Z v=Y
    &CORNERS_UV, // Forward: u=X v=Y, X x Y = +Z
    &CORNERS_VU, // Back:    u=X v=Y
];

impl FaceDirection {
    pub const COUNT: usize = 6;

    /// Flush order: direction-major.
    pub const ALL: [FaceDirection; FaceDirection::COUNT] = [
        FaceDirection::Top,
        FaceDirection::Bottom,
        FaceDirection::Left,
        FaceDirection::Right,
        FaceDirection::Forward,
        FaceDirection::Back,
    ];

    /// Returns the `[0..6)` index of this direction.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(i: usize) -> Option<FaceDirection> {
        Self::ALL.get(i).copied()
    }

    /// Principal axis the face normal lies on.
    #[inline]
    pub fn axis(self) -> Axis {
        match self {
            FaceDirection::Top | FaceDirection::Bottom => Axis::Y,
            FaceDirection::Left | FaceDirection::Right => Axis::X,
            FaceDirection::Forward | FaceDirection::Back => Axis::Z,
        }
    }

    /// True for Top, Right and Forward.
    #[inline]
    pub fn is_positive(self) -> bool {
        matches!(
            self,
            FaceDirection::Top | FaceDirection::Right | FaceDirection::Forward
        )
    }

    #[inline]
    pub fn opposite(self) -> FaceDirection {
        match self {
            FaceDirection::Top => FaceDirection::Bottom,
            FaceDirection::Bottom => FaceDirection::Top,
            FaceDirection::Left => FaceDirection::Right,
            FaceDirection::Right => FaceDirection::Left,
            FaceDirection::Forward => FaceDirection::Back,
            FaceDirection::Back => FaceDirection::Forward,
        }
    }

    /// Returns the unit-normal vector for this face.
    #[inline]
    pub fn normal(self) -> Vec3 {
        let n = match self.axis() {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        };
        if self.is_positive() { n } else { -n }
    }

    /// Chunk-centered coordinate of the face plane for slice `depth`.
    /// A positive face sits on the far boundary of its voxel, a negative face on the near one.
    #[inline]
    pub fn plane(self, depth: usize) -> f32 {
        if self.is_positive() {
            depth as f32 - (CHUNK_HALF_SIZE - 1) as f32
        } else {
            depth as f32 - CHUNK_HALF_SIZE as f32
        }
    }

    /// Per-direction unit-quad corner template in (u, v).
    #[inline]
    pub fn corners(self) -> &'static [[f32; 2]; 4] {
        FACE_CORNERS[self.index()]
    }

    /// Maps face-local (normal, u, v) onto world xyz.
    /// Top/Bottom: u=X v=Z. Left/Right: u=Z v=Y. Forward/Back: u=X v=Y.
    #[inline]
    pub fn to_world(self, n: f32, u: f32, v: f32) -> Vec3 {
        match self.axis() {
            Axis::Y => Vec3::new(u, n, v),
            Axis::X => Vec3::new(n, v, u),
            Axis::Z => Vec3::new(u, v, n),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FaceDirection::Top => "top",
            FaceDirection::Bottom => "bottom",
            FaceDirection::Left => "left",
            FaceDirection::Right => "right",
            FaceDirection::Forward => "forward",
            FaceDirection::Back => "back",
        }
    }
}

impl fmt::Display for FaceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseFaceDirectionError(pub String);

impl fmt::Display for ParseFaceDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown face direction '{}' (expected top, bottom, left, right, forward or back)",
            self.0
        )
    }
}

impl std::error::Error for ParseFaceDirectionError {}

impl FromStr for FaceDirection {
    type Err = ParseFaceDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaceDirection::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFaceDirectionError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_roundtrip() {
        for d in FaceDirection::ALL {
            assert_eq!(FaceDirection::from_index(d.index()), Some(d));
        }
        assert_eq!(FaceDirection::from_index(6), None);
    }

    #[test]
    fn corner_templates_face_outward() {
        // (c1 - c0) x (c2 - c0) must point along the normal for both index patterns to be CCW.
        for d in FaceDirection::ALL {
            let c = d.corners();
            let p = |i: usize| d.to_world(0.0, c[i][0], c[i][1]);
            let e = (p(1) - p(0)).cross(p(2) - p(0));
            assert!(e.dot(d.normal()) > 0.0, "{d} template winds inward");
            assert_eq!(c[0], [0.0, 0.0]);
            assert_eq!(c[3], [1.0, 1.0]);
        }
    }

    #[test]
    fn plane_offsets() {
        assert_eq!(FaceDirection::Top.plane(8), 1.0);
        assert_eq!(FaceDirection::Bottom.plane(8), 0.0);
        assert_eq!(FaceDirection::Right.plane(0), -7.0);
        assert_eq!(FaceDirection::Left.plane(0), -8.0);
        assert_eq!(FaceDirection::Forward.plane(15), 8.0);
        assert_eq!(FaceDirection::Back.plane(15), 7.0);
    }

    #[test]
    fn normals_are_opposite() {
        for d in FaceDirection::ALL {
            assert_eq!(d.normal(), -d.opposite().normal());
            assert_eq!(d.is_positive(), !d.opposite().is_positive());
        }
    }

    #[test]
    fn parse_names() {
        assert_eq!("Forward".parse::<FaceDirection>(), Ok(FaceDirection::Forward));
        assert_eq!(" top ".parse::<FaceDirection>(), Ok(FaceDirection::Top));
        assert!("up".parse::<FaceDirection>().is_err());
    }
}
