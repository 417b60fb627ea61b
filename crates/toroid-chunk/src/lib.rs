//! Chunk snapshot handed from a data source to the block store.
#![forbid(unsafe_code)]

use toroid_blocks::types::{EXTRA_EMITTER_BIT, EXTRA_ORIENTATION_MASK};
use toroid_blocks::{AIR, BlockId, Orientation};

/// Chunk column coordinate (chunk units, not blocks).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.cx + dx, self.cz + dz)
    }

    #[inline]
    pub fn manhattan(self, other: ChunkCoord) -> u32 {
        self.cx.abs_diff(other.cx) + self.cz.abs_diff(other.cz)
    }

    /// The four orthogonal neighbours (+x, -x, +z, -z).
    pub fn neighbors4(self) -> [ChunkCoord; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

/// Immutable snapshot of one chunk column: `size × height × size` cells.
///
/// Cells are laid out `x + (y + z·height)·size`, matching the block store.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub coord: ChunkCoord,
    pub size: usize,
    pub height: usize,
    pub blocks: Vec<BlockId>,
    pub extra: Vec<u8>,
}

impl Chunk {
    /// All-air chunk.
    pub fn empty(coord: ChunkCoord, size: usize, height: usize) -> Self {
        let n = size * size * height;
        Chunk {
            coord,
            size,
            height,
            blocks: vec![AIR; n],
            extra: vec![0; n],
        }
    }

    /// Builds a chunk from raw arrays; short arrays are padded with air, long ones truncated.
    pub fn from_parts(
        coord: ChunkCoord,
        size: usize,
        height: usize,
        mut blocks: Vec<BlockId>,
        mut extra: Vec<u8>,
    ) -> Self {
        let n = size * size * height;
        blocks.resize(n, AIR);
        extra.resize(n, 0);
        Chunk {
            coord,
            size,
            height,
            blocks,
            extra,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        x + (y + z * self.height) * self.size
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> BlockId {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn extra_local(&self, x: usize, y: usize, z: usize) -> u8 {
        self.extra[self.idx(x, y, z)]
    }

    /// Writes a cell, keeping any emitter flag already present in `extra`.
    pub fn set_local(&mut self, x: usize, y: usize, z: usize, id: BlockId, o: Orientation) {
        let i = self.idx(x, y, z);
        self.blocks[i] = id;
        self.extra[i] = (self.extra[i] & !EXTRA_ORIENTATION_MASK) | o.bits();
    }

    pub fn set_emitter(&mut self, x: usize, y: usize, z: usize, on: bool) {
        let i = self.idx(x, y, z);
        if on {
            self.extra[i] |= EXTRA_EMITTER_BIT;
        } else {
            self.extra[i] &= !EXTRA_EMITTER_BIT;
        }
    }

    /// World-space block origin of this chunk.
    #[inline]
    pub fn base(&self) -> (i32, i32) {
        (
            self.coord.cx * self.size as i32,
            self.coord.cz * self.size as i32,
        )
    }

    /// Fills every cell with `y < top` by `id`; handy for flat test worlds.
    pub fn fill_layers(&mut self, top: usize, id: BlockId) {
        for z in 0..self.size {
            for y in 0..top.min(self.height) {
                for x in 0..self.size {
                    let i = self.idx(x, y, z);
                    self.blocks[i] = id;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_pads_to_full_size() {
        let c = Chunk::from_parts(ChunkCoord::new(0, 0), 4, 8, vec![3; 10], Vec::new());
        assert_eq!(c.len(), 4 * 4 * 8);
        assert_eq!(c.extra.len(), c.len());
        assert_eq!(c.blocks[9], 3);
        assert_eq!(c.blocks[10], AIR);
    }

    #[test]
    fn set_local_keeps_emitter_flag() {
        let mut c = Chunk::empty(ChunkCoord::new(2, -1), 4, 4);
        c.set_emitter(1, 2, 3, true);
        c.set_local(1, 2, 3, 9, Orientation::East);
        assert_eq!(c.get_local(1, 2, 3), 9);
        let e = c.extra_local(1, 2, 3);
        assert_eq!(Orientation::from_extra(e), Orientation::East);
        assert_ne!(e & EXTRA_EMITTER_BIT, 0);
        assert_eq!(c.base(), (8, -4));
    }

    #[test]
    fn neighbours_are_one_step_away() {
        let c = ChunkCoord::new(3, -2);
        for n in c.neighbors4() {
            assert_eq!(c.manhattan(n), 1);
        }
    }
}
