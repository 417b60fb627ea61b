use proptest::prelude::*;
use toroid_chunk::{Chunk, ChunkCoord};

proptest! {
    // Local indexing is a bijection onto 0..len.
    #[test]
    fn idx_is_dense_and_unique(size in 1usize..6, height in 1usize..6) {
        let c = Chunk::empty(ChunkCoord::new(0, 0), size, height);
        let mut seen = vec![false; c.len()];
        for z in 0..size {
            for y in 0..height {
                for x in 0..size {
                    let i = c.idx(x, y, z);
                    prop_assert!(i < c.len());
                    prop_assert!(!seen[i]);
                    seen[i] = true;
                }
            }
        }
        prop_assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn fill_layers_only_touches_lower_layers(top in 0usize..10) {
        let mut c = Chunk::empty(ChunkCoord::new(0, 0), 4, 8);
        c.fill_layers(top, 2);
        for y in 0..8 {
            let expect = if y < top { 2 } else { 0 };
            prop_assert_eq!(c.get_local(1, y, 3), expect);
        }
    }
}
