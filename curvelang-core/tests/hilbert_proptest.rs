use curvelang_core::hilbert::{coord_of, dist_of};
use proptest::prelude::*;

proptest! {
    #[test]
    fn dist_then_coord_round_trips(p in 1u32..8, d_frac in 0.0f64..1.0) {
        let len = 1u64 << (2 * p);
        let d = ((d_frac * len as f64) as u64).min(len - 1);
        let (x, y) = coord_of(d, p);
        prop_assert_eq!(dist_of(x, y, p), d);
    }

    #[test]
    fn coord_then_dist_round_trips(p in 1u32..8, x_frac in 0.0f64..1.0, y_frac in 0.0f64..1.0) {
        let side = 1u64 << p;
        let x = ((x_frac * side as f64) as u64).min(side - 1);
        let y = ((y_frac * side as f64) as u64).min(side - 1);
        let d = dist_of(x, y, p);
        prop_assert_eq!(coord_of(d, p), (x, y));
    }
}
