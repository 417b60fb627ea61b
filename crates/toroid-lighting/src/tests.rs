use std::sync::Arc;

use super::*;
use toroid_blocks::BlockRegistry;
use toroid_chunk::Chunk;
use toroid_world::WindowDims;

const STONE: u8 = 2;
const GLASS: u8 = 3;
const WATER: u8 = 4;
const TORCH: u8 = 5;

fn registry() -> Arc<BlockRegistry> {
    let text = r#"
[[blocks]]
name = "stone"
id = 2

[[blocks]]
name = "glass"
id = 3
semi_transparent = true

[[blocks]]
name = "water"
id = 4
semi_transparent = true
water = true

[[blocks]]
name = "torch"
id = 5
shape = "cross"
solid = false
emits_light = true
"#;
    Arc::new(BlockRegistry::from_toml_str(text).expect("registry"))
}

fn single_chunk(size: usize, height: usize) -> BlockStore {
    BlockStore::new(WindowDims::new(size, 1, height), registry())
}

#[test]
fn flat_floor_gets_full_sky_above() {
    let mut store = single_chunk(16, 128);
    let c = ChunkCoord::new(0, 0);
    let mut chunk = Chunk::empty(c, 16, 128);
    chunk.fill_layers(1, STONE);
    assert!(store.apply_chunk(&chunk));
    let mut light = LightingEngine::new(&store);
    let out = light.relight(&store, c).expect("in window");
    assert!(!out.sky.aborted);
    for z in 0..16 {
        for x in 0..16 {
            assert_eq!(store.column_height(x, z), 1);
            assert_eq!(light.sample(&store, x, 0, z), (0, 0));
            for y in 1..128 {
                assert_eq!(light.sample(&store, x, y, z), (15, 0), "at {x},{y},{z}");
            }
            assert_eq!(light.corner(x, 1, z).0, 15);
            assert_eq!(light.corner(x, 0, z).0, 0);
        }
    }
}

#[test]
fn torch_light_drops_by_step_per_manhattan_cell() {
    let mut store = single_chunk(16, 16);
    let c = ChunkCoord::new(0, 0);
    store.apply_chunk(&Chunk::empty(c, 16, 16));
    store.set_block(8, 8, 8, TORCH, None);
    let mut light = LightingEngine::new(&store);
    light.relight(&store, c);
    for z in 0..16 {
        for y in 0..16 {
            for x in 0..16 {
                let d = (x - 8i32).abs() + (y - 8i32).abs() + (z - 8i32).abs();
                let expect = (15 - 2 * d).max(0) as u8;
                assert_eq!(light.sample(&store, x, y, z).1, expect, "at {x},{y},{z}");
            }
        }
    }
}

#[test]
fn opaque_walls_stop_light() {
    let mut store = single_chunk(8, 8);
    let c = ChunkCoord::new(0, 0);
    store.apply_chunk(&Chunk::empty(c, 8, 8));
    for z in 0..8 {
        for y in 0..8 {
            store.set_block(4, y, z, STONE, None);
        }
    }
    store.set_block(2, 2, 2, TORCH, None);
    let mut light = LightingEngine::new(&store);
    light.relight(&store, c);
    assert_eq!(light.sample(&store, 3, 2, 2).1, 13);
    assert_eq!(light.sample(&store, 4, 2, 2).1, 0);
    assert_eq!(light.sample(&store, 5, 2, 2).1, 0);
}

#[test]
fn sky_decays_through_glass_and_water() {
    let mut store = single_chunk(4, 8);
    let c = ChunkCoord::new(0, 0);
    store.apply_chunk(&Chunk::empty(c, 4, 8));
    // cover every column so horizontal flooding cannot relight the probe column
    for z in 0..4 {
        for x in 0..4 {
            store.set_block(x, 7, z, GLASS, None);
            store.set_block(x, 6, z, WATER, None);
        }
    }
    let mut light = LightingEngine::new(&store);
    light.relight(&store, c);
    assert_eq!(light.sample(&store, 1, 7, 1).0, 14);
    assert_eq!(light.sample(&store, 1, 6, 1).0, 12);
    assert_eq!(light.sample(&store, 1, 5, 1).0, 12);
    assert_eq!(store.column_height(1, 1), 0);
}

#[test]
fn overhang_shadow_is_filled_from_the_side() {
    let mut store = single_chunk(8, 8);
    let c = ChunkCoord::new(0, 0);
    store.apply_chunk(&Chunk::empty(c, 8, 8));
    // roof over x in [0, 4)
    for z in 0..8 {
        for x in 0..4 {
            store.set_block(x, 5, z, STONE, None);
        }
    }
    let mut light = LightingEngine::new(&store);
    light.relight(&store, c);
    assert_eq!(light.sample(&store, 4, 2, 3).0, 15);
    assert_eq!(light.sample(&store, 3, 2, 3).0, 13);
    assert_eq!(light.sample(&store, 2, 2, 3).0, 11);
    assert_eq!(light.sample(&store, 0, 2, 3).0, 7);
}

#[test]
fn light_crosses_into_loaded_neighbours() {
    // 2x2 chunks of 4x8x4 around tile (0, 0): chunks -1..=0 on both axes
    let mut store = BlockStore::new(WindowDims::new(4, 2, 8), registry());
    for c in store.window_chunks() {
        store.apply_chunk(&Chunk::empty(c, 4, 8));
    }
    let mut chunk = Chunk::empty(ChunkCoord::new(0, 0), 4, 8);
    chunk.set_local(0, 4, 1, TORCH, Default::default());
    store.apply_chunk(&chunk);
    let mut light = LightingEngine::new(&store);

    let here = ChunkCoord::new(0, 0);
    let west = ChunkCoord::new(-1, 0);
    assert!(light.relight(&store, here).unwrap().borders_changed);
    assert_eq!(light.sample(&store, 0, 4, 1).1, 15);
    assert_eq!(light.sample(&store, -1, 4, 1).1, 0);

    light.relight(&store, west);
    assert_eq!(light.sample(&store, -1, 4, 1).1, 13);
    assert_eq!(light.sample(&store, -2, 4, 1).1, 11);

    // nothing changed: same planes
    assert!(!light.relight(&store, here).unwrap().borders_changed);
}

#[test]
fn runaway_local_fill_stops_at_visit_cap() {
    // 32 x 64 x 32 holds more emitters than the cap allows visits
    let mut store = BlockStore::new(WindowDims::new(32, 1, 64), registry());
    let c = ChunkCoord::new(0, 0);
    let mut chunk = Chunk::empty(c, 32, 64);
    chunk.fill_layers(64, TORCH);
    assert!(store.apply_chunk(&chunk));
    let mut light = LightingEngine::new(&store);
    let out = light.relight(&store, c).expect("in window");
    assert_eq!(out.local.seeds, 32 * 64 * 32);
    assert!(out.local.aborted);
    assert_eq!(out.local.visits, MAX_VISITS + 1);
    assert!(!out.sky.aborted);
    assert_eq!(light.sample(&store, 31, 63, 31), (15, 15));
}

#[test]
fn relight_outside_window_is_ignored() {
    let store = single_chunk(4, 8);
    let mut light = LightingEngine::new(&store);
    assert!(light.relight(&store, ChunkCoord::new(3, 0)).is_none());
}

#[test]
fn max_edge_corners_average_their_own_cells() {
    let mut store = single_chunk(4, 8);
    let c = ChunkCoord::new(0, 0);
    store.apply_chunk(&Chunk::empty(c, 4, 8));
    assert!(store.set_block(3, 2, 2, TORCH, None));
    let mut light = LightingEngine::new(&store);
    light.relight(&store, c);
    // x = 4 is the window's max corner row: torch 15 plus 13, 13, 11 beside it
    assert_eq!(light.corner(4, 2, 2).1, 13);
    // x = 0 sits three steps away and must not be overwritten by it
    assert_eq!(light.corner(0, 2, 2).1, 7);
    assert_eq!(light.corner(4, 2, 2).0, 15);
}

#[test]
fn clear_chunk_zeroes_light_and_borders() {
    let mut store = single_chunk(4, 8);
    let c = ChunkCoord::new(0, 0);
    store.apply_chunk(&Chunk::empty(c, 4, 8));
    let mut light = LightingEngine::new(&store);
    light.relight(&store, c);
    assert_eq!(light.sample(&store, 1, 1, 1).0, 15);
    assert!(!light.relight(&store, c).unwrap().borders_changed);
    light.clear_chunk(&store, c);
    assert_eq!(light.sample(&store, 1, 1, 1).0, 0);
    assert_eq!(light.corner(1, 1, 1), (0, 0));
    // the snapshot is gone, so the next pass publishes fresh planes
    assert!(light.relight(&store, c).unwrap().borders_changed);
}
