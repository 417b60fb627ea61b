use std::sync::atomic::{AtomicUsize, Ordering};

use fastnoise_lite::{FastNoiseLite, NoiseType};
use toroid_blocks::{BEDROCK, BlockId, BlockRegistry, Orientation};
use toroid_chunk::{Chunk, ChunkCoord};
use toroid_runtime::{ChunkSink, ChunkSource};
use toroid_world::WindowDims;

/// Delivers chunks filled with `id` below `top`, synchronously.
pub struct FlatSource {
    dims: WindowDims,
    top: usize,
    id: BlockId,
    writes: AtomicUsize,
}

impl FlatSource {
    pub fn new(dims: WindowDims, top: usize, id: BlockId) -> Self {
        Self {
            dims,
            top,
            id,
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of block writes reported back by the engine.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl ChunkSource for FlatSource {
    fn request_chunk(&self, coord: ChunkCoord, sink: ChunkSink) {
        let mut chunk = Chunk::empty(coord, self.dims.chunk_size, self.dims.height);
        chunk.fill_layers(self.top, self.id);
        sink.post_chunk(chunk);
    }

    fn set_block(&self, _x: i32, _y: i32, _z: i32, _id: BlockId, _o: Option<Orientation>) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

/// Surface palette picked from the registry by name.
#[derive(Clone, Copy, Debug)]
struct Palette {
    stone: BlockId,
    dirt: BlockId,
    grass: BlockId,
    sand: BlockId,
}

impl Palette {
    fn from_registry(reg: &BlockRegistry) -> Self {
        let pick = |name: &str| reg.id_by_name(name).unwrap_or(BEDROCK);
        Self {
            stone: pick("stone"),
            dirt: pick("dirt"),
            grass: pick("grass"),
            sand: pick("sand"),
        }
    }
}

/// Noise heightmap terrain for the demo binary.
pub struct NoiseSource {
    dims: WindowDims,
    seed: i32,
    palette: Palette,
}

impl NoiseSource {
    pub fn new(dims: WindowDims, seed: i32, reg: &BlockRegistry) -> Self {
        Self {
            dims,
            seed,
            palette: Palette::from_registry(reg),
        }
    }

    pub fn generate(&self, coord: ChunkCoord) -> Chunk {
        let size = self.dims.chunk_size;
        let height = self.dims.height;
        let mut chunk = Chunk::empty(coord, size, height);
        let (x0, z0) = chunk.base();

        let mut noise = FastNoiseLite::with_seed(self.seed);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(0.02));

        let min_h = (height as f32 * 0.15) as i32;
        let max_h = (height as f32 * 0.6) as i32;
        for z in 0..size {
            for x in 0..size {
                let n = noise.get_noise_2d((x0 + x as i32) as f32, (z0 + z as i32) as f32);
                let h = ((n + 1.0) * 0.5 * (max_h - min_h) as f32) as i32 + min_h;
                let top = h.clamp(1, height as i32 - 1) as usize;
                for y in 0..top {
                    let id = if y + 1 == top {
                        if top as f32 <= height as f32 * 0.2 {
                            self.palette.sand
                        } else {
                            self.palette.grass
                        }
                    } else if y + 4 >= top {
                        self.palette.dirt
                    } else {
                        self.palette.stone
                    };
                    chunk.set_local(x, y, z, id, Orientation::North);
                }
            }
        }
        chunk
    }
}

impl ChunkSource for NoiseSource {
    fn request_chunk(&self, coord: ChunkCoord, sink: ChunkSink) {
        sink.post_chunk(self.generate(coord));
    }
}
