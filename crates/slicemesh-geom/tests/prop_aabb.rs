use proptest::prelude::*;
use slicemesh_geom::{Aabb, Vec3};

fn grid_coord() -> impl Strategy<Value = f32> {
    // Mesh positions are small integers or halves in chunk-local space.
    (-64i32..=64).prop_map(|v| v as f32 * 0.5)
}

fn arb_point() -> impl Strategy<Value = Vec3> {
    (grid_coord(), grid_coord(), grid_coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // Every vertex of a position stream lies inside its bounds, and the bounds touch the extremes.
    #[test]
    fn from_positions_is_tight(points in prop::collection::vec(arb_point(), 1..64)) {
        let flat: Vec<f32> = points.iter().flat_map(|p| p.to_array()).collect();
        let bb = Aabb::from_positions(&flat).unwrap();
        for p in &points {
            prop_assert!(bb.contains(*p));
        }
        let min_x = points.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        prop_assert_eq!(bb.min.x, min_x);
        prop_assert_eq!(bb.max.y, max_y);
    }

    // Growing a box never drops a point it already held.
    #[test]
    fn include_keeps_earlier_points(points in prop::collection::vec(arb_point(), 1..32)) {
        let mut bb = Aabb::point(points[0]);
        for (i, p) in points.iter().enumerate() {
            bb.include(*p);
            for q in &points[..=i] {
                prop_assert!(bb.contains(*q));
            }
        }
        prop_assert!(bb.min.x <= bb.max.x && bb.min.y <= bb.max.y && bb.min.z <= bb.max.z);
    }
}

#[test]
fn empty_stream_has_no_bounds() {
    assert_eq!(Aabb::from_positions(&[]), None);
}

#[test]
fn from_flat_reads_triples() {
    let s = [1.0, 2.0, 3.0, -4.0, 5.0, -6.0];
    assert_eq!(Vec3::from_flat(&s, 1), Vec3::new(-4.0, 5.0, -6.0));
}
