use anim_atlas_core::error::AtlasError;
use anim_atlas_core::prelude::*;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

#[test]
fn placements_are_disjoint_and_contained() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let n = rng.gen_range(1..=40usize);
        let size = rng.gen_range(64..=2048u32);
        let aspect = rng.gen_range(0.25..=4.0f64);
        let plan = match plan_grid(size, n, aspect) {
            Ok(p) => p,
            Err(AtlasError::GridDegenerate { .. }) => continue,
            Err(e) => panic!("unexpected error: {e:?}"),
        };
        let canvas = Rect::new(0, 0, size, size);
        let rects: Vec<Rect> = (0..n).map(|i| plan.placement(i).rect).collect();
        for (i, r) in rects.iter().enumerate() {
            assert!(
                canvas.contains(r),
                "frame {i} out of bounds: {r:?} on {size}px canvas"
            );
            assert!(r.x + r.w <= size && r.y + r.h <= size);
            for (j, other) in rects.iter().enumerate().skip(i + 1) {
                assert!(
                    !r.intersects(other),
                    "frames {i} and {j} overlap: {r:?} vs {other:?}"
                );
            }
        }
    }
}

#[test]
fn each_index_maps_to_exactly_one_cell() {
    let plan = plan_grid(1024, 12, 1.0).expect("plan");
    let mut seen = HashSet::new();
    for i in 0..12 {
        let p = plan.placement(i);
        assert_eq!(p.index, i);
        assert!(seen.insert((p.rect.x, p.rect.y)), "cell reused at index {i}");
    }
}

#[test]
fn placement_is_row_major() {
    let plan = plan_grid(900, 6, 1.0).expect("plan");
    // 6 frames, square aspect: sqrt rounds to 2 columns, capacity raises rows.
    assert_eq!(plan.columns, 2);
    assert_eq!(plan.rows, 3);
    assert_eq!(plan.placement(0).rect.x, 0);
    assert_eq!(plan.placement(1).rect.x, plan.cell_w);
    assert_eq!(plan.placement(2).rect.y, plan.cell_h);
    assert_eq!(plan.placement(5).rect, Rect::new(plan.cell_w, 2 * plan.cell_h, plan.cell_w, plan.cell_h));
}
