use std::time::Instant;

use parking_lot::RwLockWriteGuard;
use toroid_chunk::{Chunk, ChunkCoord};
use toroid_lighting::LightingEngine;
use toroid_mesh_cpu::{ChunkMesh, build_chunk_mesh};
use toroid_world::BlockStore;

use crate::error::TaskError;
use crate::pipeline::{BlockEdit, UpdateMessage, WorldTask};
use crate::runtime::Shared;
use crate::task::{Bucket, Task};

/// Block store plus light buffers; mutated only by tasks.
pub struct WorldState {
    pub store: BlockStore,
    pub lighting: LightingEngine,
}

impl WorldState {
    pub fn new(store: BlockStore) -> Self {
        let lighting = LightingEngine::new(&store);
        Self { store, lighting }
    }
}

/// Output for the renderer.
#[derive(Clone, Debug)]
pub enum MeshEvent {
    Built(ChunkMesh),
    Unloaded { coord: ChunkCoord },
}

pub(crate) fn run_task(shared: &Shared, task: Task<WorldTask>) -> Result<(), TaskError> {
    match task.payload {
        WorldTask::ApplyChunk(chunk) => apply_chunk(shared, &chunk),
        WorldTask::ApplyEdits(edits) => {
            apply_edits(shared, task.coord, &edits);
            Ok(())
        }
        WorldTask::Rebuild | WorldTask::Recolor => {
            rebuild(shared, task.coord);
            Ok(())
        }
    }
}

fn apply_chunk(shared: &Shared, chunk: &Chunk) -> Result<(), TaskError> {
    let mut world = shared.world.write();
    let dims = world.store.dims();
    let cells = chunk.size * chunk.size * chunk.height;
    if chunk.size != dims.chunk_size
        || chunk.height != dims.height
        || chunk.blocks.len() != cells
        || chunk.extra.len() != cells
    {
        return Err(TaskError::ChunkShape {
            coord: chunk.coord,
            size: chunk.size,
            height: chunk.height,
            expect_size: dims.chunk_size,
            expect_height: dims.height,
        });
    }
    // a chunk that arrives after the window moved on is dropped by the store
    world.store.apply_chunk(chunk);
    let dirty = world.store.take_dirty();
    drop(world);
    schedule_dirty(shared, &dirty);
    Ok(())
}

fn apply_edits(shared: &Shared, coord: ChunkCoord, edits: &[BlockEdit]) {
    let mut world = shared.world.write();
    let changed = edits
        .iter()
        .filter(|e| world.store.set_block(e.x, e.y, e.z, e.id, e.orientation))
        .count();
    let dirty = world.store.take_dirty();
    drop(world);
    let added = schedule_dirty(shared, &dirty);
    log::debug!(
        target: "pipeline",
        "chunk ({}, {}): {} of {} edits changed cells, {} chunks dirty, {} extra rebuilds",
        coord.cx,
        coord.cz,
        changed,
        edits.len(),
        dirty.len(),
        added
    );
}

// Every mutated chunk gets a rebuild; those the drain already scheduled are left alone.
fn schedule_dirty(shared: &Shared, dirty: &[ChunkCoord]) -> usize {
    let mut added = 0;
    for &c in dirty {
        if !shared.worker.is_queued(Bucket::Rebuild, c) {
            shared.worker.enqueue(Bucket::Rebuild, c, WorldTask::Rebuild);
            added += 1;
        }
    }
    added
}

fn rebuild(shared: &Shared, c: ChunkCoord) {
    let mut world = shared.world.write();
    if !world.store.is_loaded(c) {
        return;
    }
    let t0 = Instant::now();
    let WorldState { store, lighting } = &mut *world;
    let Some(outcome) = lighting.relight(store, c) else {
        return;
    };
    let t_light = t0.elapsed();

    let world = RwLockWriteGuard::downgrade(world);
    let t1 = Instant::now();
    let mesh = build_chunk_mesh(&world.store, world.lighting.field(), c, &shared.atlas);
    let t_mesh = t1.elapsed();
    let refresh: Vec<ChunkCoord> = if outcome.borders_changed {
        c.neighbors4()
            .into_iter()
            .filter(|&n| world.store.is_loaded(n))
            .collect()
    } else {
        Vec::new()
    };
    drop(world);

    if let Some(mesh) = mesh {
        shared.stats.record_build(t_light, t_mesh);
        log::trace!(
            target: "pipeline",
            "chunk ({}, {}) rebuilt: {} quads, light {:?}, mesh {:?}",
            c.cx,
            c.cz,
            mesh.quad_estimate(),
            t_light,
            t_mesh
        );
        // the receiver only disappears when the runtime is being dropped
        let _ = shared.meshes.send(MeshEvent::Built(mesh));
    }
    shared.light_updates.push_many(
        refresh
            .into_iter()
            .map(|coord| UpdateMessage::LightRefreshRequested { coord }),
    );
}
