use serde::{Deserialize, Serialize};
use toroid_chunk::ChunkCoord;

/// Positive modulo; storage addressing wraps every coordinate with it.
#[inline]
pub fn pmod(v: i32, m: i32) -> i32 {
    v.rem_euclid(m)
}

/// Size of the sliding window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowDims {
    pub chunk_size: usize,
    pub chunks_per_side: usize,
    pub height: usize,
}

impl Default for WindowDims {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            chunks_per_side: 8,
            height: 128,
        }
    }
}

impl WindowDims {
    pub fn new(chunk_size: usize, chunks_per_side: usize, height: usize) -> Self {
        Self {
            chunk_size,
            chunks_per_side,
            height,
        }
    }

    /// Blocks along x and z.
    #[inline]
    pub fn width(&self) -> usize {
        self.chunk_size * self.chunks_per_side
    }

    #[inline]
    pub fn cells(&self) -> usize {
        self.width() * self.width() * self.height
    }

    /// First chunk column covered when the window is centred on `tile`.
    #[inline]
    pub fn origin_chunk(&self, tile: ChunkCoord) -> ChunkCoord {
        let half = (self.chunks_per_side / 2) as i32;
        tile.offset(-half, -half)
    }

    /// Whether chunk column `c` lies inside the window centred on `tile`.
    pub fn covers(&self, tile: ChunkCoord, c: ChunkCoord) -> bool {
        let o = self.origin_chunk(tile);
        let n = self.chunks_per_side as i32;
        c.cx >= o.cx && c.cx < o.cx + n && c.cz >= o.cz && c.cz < o.cz + n
    }

    /// All chunk columns of the window centred on `tile`, row by row.
    pub fn chunks(&self, tile: ChunkCoord) -> Vec<ChunkCoord> {
        let o = self.origin_chunk(tile);
        let n = self.chunks_per_side as i32;
        let mut out = Vec::with_capacity(self.chunks_per_side * self.chunks_per_side);
        for dz in 0..n {
            for dx in 0..n {
                out.push(o.offset(dx, dz));
            }
        }
        out
    }

    /// Chunk column owning block column `(x, z)`.
    #[inline]
    pub fn chunk_of(&self, x: i32, z: i32) -> ChunkCoord {
        let cs = self.chunk_size as i32;
        ChunkCoord::new(x.div_euclid(cs), z.div_euclid(cs))
    }
}

/// Chunks that left and entered the window after a recentre.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowShift {
    pub left: Vec<ChunkCoord>,
    pub entered: Vec<ChunkCoord>,
}

impl WindowShift {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.entered.is_empty()
    }
}
