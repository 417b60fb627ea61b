use proptest::prelude::*;
use toroid::{TraceParams, Vec3, trace};

fn params() -> TraceParams {
    TraceParams {
        max_steps: 1000,
        max_height: 1000,
        epsilon: 1e-3,
    }
}

proptest! {
    #[test]
    fn length_matches_distance_to_wall(
        ox in 0.01f32..0.99,
        oy in 1.0f32..10.0,
        oz in 0.01f32..0.99,
        dy in -0.5f32..0.5,
        dz in -0.5f32..0.5,
        k in 2i32..10,
    ) {
        let origin = Vec3::new(ox, oy, oz);
        let dir = Vec3::new(1.0, dy, dz);
        let r = trace(origin, dir, &params(), |x, _, _| x >= k);
        prop_assert!(r.hit);
        prop_assert_eq!(r.hit_cell.0, k);
        prop_assert_eq!(r.last_empty.0, k - 1);
        let expect = (k as f32 - ox) / dir.normalized().x;
        prop_assert!(r.length <= expect);
        prop_assert!((r.length - expect).abs() < 1e-3 + 1e-3, "{} vs {}", r.length, expect);
    }

    #[test]
    fn starting_inside_reports_negative_length(
        ox in 0.01f32..0.99,
        k in 1i32..8,
    ) {
        let origin = Vec3::new(k as f32 + ox, 0.5, 0.5);
        let r = trace(origin, Vec3::new(1.0, 0.0, 0.0), &params(), |x, _, _| x >= 0);
        prop_assert!(r.hit);
        prop_assert_eq!(r.hit_cell.0, -1);
        prop_assert!(r.length < 0.0);
        prop_assert!((r.length + k as f32 + ox).abs() < 2e-3);
    }
}
