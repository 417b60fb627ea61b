use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use toroid_blocks::{AtlasLayout, BlockRegistry, Orientation};
use toroid_chunk::{Chunk, ChunkCoord};
use toroid_lighting::LightingEngine;
use toroid_mesh_cpu::build_chunk_mesh;
use toroid_world::{BlockStore, WindowDims};

fn load_registry() -> Arc<BlockRegistry> {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    Arc::new(BlockRegistry::load_from_path(root.join("../../assets/blocks.toml")).unwrap())
}

fn terraced_chunk(reg: &BlockRegistry, size: usize, height: usize) -> Chunk {
    let stone = reg.id_by_name("stone").unwrap_or(2);
    let mut chunk = Chunk::empty(ChunkCoord::new(0, 0), size, height);
    for z in 0..size {
        for x in 0..size {
            let top = 20 + (x * 3 + z * 5) % 12;
            for y in 0..top.min(height) {
                chunk.set_local(x, y, z, stone, Orientation::North);
            }
        }
    }
    chunk
}

fn bench_build_chunk_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chunk_mesh");
    group.measurement_time(Duration::from_secs(5));
    let reg = load_registry();
    let mut store = BlockStore::new(WindowDims::new(16, 1, 128), reg.clone());
    store.apply_chunk(&terraced_chunk(&reg, 16, 128));
    let mut light = LightingEngine::new(&store);
    light.relight(&store, ChunkCoord::new(0, 0));
    let atlas = AtlasLayout::default();
    group.bench_function("terraced_16x128x16", |b| {
        b.iter(|| {
            let out = build_chunk_mesh(&store, light.field(), ChunkCoord::new(0, 0), &atlas);
            black_box(out);
        })
    });
    group.bench_function("relight_16x128x16", |b| {
        b.iter(|| black_box(light.relight(&store, ChunkCoord::new(0, 0))))
    });
    group.finish();
}

criterion_group!(benches, bench_build_chunk_mesh);
criterion_main!(benches);
