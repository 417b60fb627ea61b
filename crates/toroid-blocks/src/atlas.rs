use crate::types::{BlockId, Face};

/// 256-entry block id → atlas tile table, one tile per logical face.
#[derive(Clone, Debug)]
pub struct TileTable {
    entries: Vec<[u16; 6]>,
}

impl TileTable {
    pub fn new(missing_tile: u16) -> Self {
        Self {
            entries: vec![[missing_tile; 6]; 256],
        }
    }

    #[inline]
    pub fn tile(&self, id: BlockId, logical: Face) -> u16 {
        self.entries[id as usize][logical.index()]
    }

    #[inline]
    pub fn set(&mut self, id: BlockId, tiles: [u16; 6]) {
        self.entries[id as usize] = tiles;
    }
}

impl Default for TileTable {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Square atlas made of `tiles_per_row × tiles_per_row` equally sized tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtlasLayout {
    pub tiles_per_row: u16,
    /// Fraction of a tile trimmed on each edge to avoid bleeding from neighbours.
    pub inset: f32,
}

impl Default for AtlasLayout {
    fn default() -> Self {
        Self {
            tiles_per_row: 16,
            inset: 0.001,
        }
    }
}

impl AtlasLayout {
    /// `[u0, v0, u1, v1]` of a tile in normalized atlas space.
    pub fn uv_rect(&self, tile: u16) -> [f32; 4] {
        let n = self.tiles_per_row.max(1);
        let size = 1.0 / n as f32;
        let col = (tile % n) as f32;
        let row = ((tile / n) % n) as f32;
        let pad = size * self.inset;
        [
            col * size + pad,
            row * size + pad,
            (col + 1.0) * size - pad,
            (row + 1.0) * size - pad,
        ]
    }
}
