use std::sync::Arc;

use hashbrown::HashMap;
use toroid_blocks::{BlockId, BlockRegistry, Orientation};
use toroid_chunk::ChunkCoord;
use toroid_geom::Vec3;
use toroid_mesh_cpu::ChunkMesh;
use toroid_runtime::{
    BlockEdit, ChunkSource, MeshEvent, Runtime, RuntimeError, StatsSnapshot, UpdateMessage,
};
use toroid_world::{BlockStore, WindowDims};

use crate::config::{ConfigError, EngineConfig};
use crate::raycast::{TraceParams, TraceResult, trace};

/// Infinite voxel world seen through a fixed-size window around the observer.
///
/// Reads go straight to the block store under a shared lock; writes are queued as update
/// messages and applied by the runtime, either on its consumer threads or through [`pump`].
///
/// [`pump`]: Engine::pump
pub struct Engine {
    runtime: Runtime,
    registry: Arc<BlockRegistry>,
    dims: WindowDims,
    trace: TraceParams,
    position: Vec3,
    direction: Vec3,
    tile: ChunkCoord,
    elapsed: f64,
    meshes: HashMap<ChunkCoord, ChunkMesh>,
}

impl Engine {
    /// Builds the engine centred on chunk (0, 0) and requests every window chunk from `source`.
    pub fn new(
        config: &EngineConfig,
        registry: Arc<BlockRegistry>,
        source: Arc<dyn ChunkSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let dims = config.window;
        let store = BlockStore::new(dims, Arc::clone(&registry));
        let runtime = Runtime::new(
            store,
            source,
            config.atlas_layout(),
            config.runtime_config(),
        );
        runtime.request_window();
        log::info!(
            "engine window: {} chunks of {}x{}x{} per side",
            dims.chunks_per_side,
            dims.chunk_size,
            dims.height,
            dims.chunk_size
        );
        Ok(Self {
            runtime,
            registry,
            dims,
            trace: config.trace_params(),
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, -1.0),
            tile: ChunkCoord::new(0, 0),
            elapsed: 0.0,
            meshes: HashMap::new(),
        })
    }

    #[inline]
    pub fn dims(&self) -> WindowDims {
        self.dims
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.registry
    }

    /// Chunk column the observer was last reported in.
    #[inline]
    pub fn tile(&self) -> ChunkCoord {
        self.tile
    }

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.runtime.read().store.get_block(x, y, z)
    }

    pub fn get_block_extra(&self, x: i32, y: i32, z: i32) -> u8 {
        self.runtime.read().store.get_extra(x, y, z)
    }

    /// `(sky, local)` light of a cell, 0 outside the window.
    pub fn light_at(&self, x: i32, y: i32, z: i32) -> (u8, u8) {
        let world = self.runtime.read();
        world.lighting.sample(&world.store, x, y, z)
    }

    pub fn set_block(&self, x: i32, y: i32, z: i32, id: BlockId, orientation: Option<Orientation>) {
        self.set_blocks(&[BlockEdit {
            x,
            y,
            z,
            id,
            orientation,
        }]);
    }

    /// Queues a batch of writes, grouped per chunk in arrival order, and reports each one to
    /// the data source.
    pub fn set_blocks(&self, edits: &[BlockEdit]) {
        let mut order: Vec<ChunkCoord> = Vec::new();
        let mut groups: HashMap<ChunkCoord, Vec<BlockEdit>> = HashMap::new();
        for e in edits {
            let c = self.dims.chunk_of(e.x, e.z);
            groups
                .entry(c)
                .or_insert_with(|| {
                    order.push(c);
                    Vec::new()
                })
                .push(*e);
        }
        for coord in order {
            if let Some(edits) = groups.remove(&coord) {
                self.runtime
                    .post(UpdateMessage::BlocksEdited { coord, edits });
            }
        }
        let source = self.runtime.source();
        for e in edits {
            source.set_block(e.x, e.y, e.z, e.id, e.orientation);
        }
    }

    /// First pickable cell along the ray.
    pub fn trace_picking(&self, origin: Vec3, dir: Vec3) -> TraceResult {
        let world = self.runtime.read();
        let reg = world.store.registry();
        trace(origin, dir, &self.trace, |x, y, z| {
            reg.is_pickable(world.store.get_block(x, y, z))
        })
    }

    /// First collidable cell along the ray, or the way out when starting inside one.
    pub fn trace_collision(&self, origin: Vec3, dir: Vec3) -> TraceResult {
        let world = self.runtime.read();
        let reg = world.store.registry();
        trace(origin, dir, &self.trace, |x, y, z| {
            reg.is_collidable(world.store.get_block(x, y, z))
        })
    }

    pub fn update_observer(&mut self, position: Vec3, direction: Vec3) {
        self.position = position;
        self.direction = direction;
    }

    pub fn observer(&self) -> (Vec3, Vec3) {
        (self.position, self.direction)
    }

    /// Per-frame bookkeeping: posts an observer move when the observer crossed into another
    /// chunk and collects finished meshes. Returns the number of mesh events applied.
    pub fn update(&mut self, dt: f32) -> usize {
        self.elapsed += f64::from(dt);
        let (x, _, z) = self.position.floor_cell();
        let tile = self.dims.chunk_of(x, z);
        if tile != self.tile {
            log::debug!(
                "observer moved to chunk ({}, {}) at t={:.2}s",
                tile.cx,
                tile.cz,
                self.elapsed
            );
            self.tile = tile;
            self.runtime.post(UpdateMessage::ObserverMoved { tile });
        }
        self.take_mesh_events().len()
    }

    /// Seconds accumulated through [`Engine::update`].
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn start_threads(&mut self) -> Result<(), RuntimeError> {
        self.runtime.start_threads()
    }

    /// Returns `false` if a consumer thread did not stop within the configured timeout.
    pub fn stop_threads(&mut self) -> bool {
        self.runtime.stop_threads()
    }

    /// Runs one lighting and one consumer cycle on the calling thread.
    pub fn pump(&mut self) -> bool {
        let worked = self.runtime.pump();
        self.take_mesh_events();
        worked
    }

    /// Pumps until idle (or `max_rounds`), then collects meshes.
    pub fn settle(&mut self, max_rounds: usize) -> usize {
        let rounds = self.runtime.pump_until_idle(max_rounds);
        self.take_mesh_events();
        rounds
    }

    /// Drains pending mesh events into the per-chunk cache and returns them.
    pub fn take_mesh_events(&mut self) -> Vec<MeshEvent> {
        let events = self.runtime.drain_mesh_events();
        for e in &events {
            match e {
                MeshEvent::Built(mesh) => {
                    self.meshes.insert(mesh.coord, mesh.clone());
                }
                MeshEvent::Unloaded { coord } => {
                    self.meshes.remove(coord);
                }
            }
        }
        events
    }

    /// Latest mesh per loaded chunk.
    pub fn meshes(&self) -> &HashMap<ChunkCoord, ChunkMesh> {
        &self.meshes
    }

    pub fn last_rebuilds(&self) -> Vec<ChunkCoord> {
        self.runtime.last_rebuilds()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.runtime.stats()
    }
}
