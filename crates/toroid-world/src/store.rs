use std::sync::Arc;

use hashbrown::HashSet;
use toroid_blocks::types::{EXTRA_EMITTER_BIT, EXTRA_ORIENTATION_MASK};
use toroid_blocks::{AIR, BEDROCK, BlockId, BlockRegistry, Orientation};
use toroid_chunk::{Chunk, ChunkCoord};

use crate::bits::BitSet;
use crate::window::{WindowDims, WindowShift, pmod};

/// Fixed-capacity block storage addressed by wrapped coordinates.
///
/// Every cell holds a block id and an `extra` byte (orientation + emitter flag). A per-column
/// height (`1 + y` of the topmost light-opaque block) and a per-cell light-opaque bit are kept
/// in sync by every mutation. The store itself is not synchronized.
pub struct BlockStore {
    dims: WindowDims,
    width: i32,
    height: i32,
    tile: ChunkCoord,
    reg: Arc<BlockRegistry>,
    blocks: Vec<BlockId>,
    extra: Vec<u8>,
    opaque: BitSet,
    heights: Vec<u16>,
    // which chunk column currently occupies each slot
    slots: Vec<Option<ChunkCoord>>,
    dirty: HashSet<ChunkCoord>,
}

impl BlockStore {
    pub fn new(dims: WindowDims, reg: Arc<BlockRegistry>) -> Self {
        let cells = dims.cells();
        let w = dims.width();
        BlockStore {
            dims,
            width: w as i32,
            height: dims.height as i32,
            tile: ChunkCoord::new(0, 0),
            reg,
            blocks: vec![AIR; cells],
            extra: vec![0; cells],
            opaque: BitSet::new(cells),
            heights: vec![0; w * w],
            slots: vec![None; dims.chunks_per_side * dims.chunks_per_side],
            dirty: HashSet::new(),
        }
    }

    #[inline]
    pub fn dims(&self) -> WindowDims {
        self.dims
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn chunk_size(&self) -> i32 {
        self.dims.chunk_size as i32
    }

    /// Chunk column the window is centred on.
    #[inline]
    pub fn tile(&self) -> ChunkCoord {
        self.tile
    }

    #[inline]
    pub fn registry(&self) -> &Arc<BlockRegistry> {
        &self.reg
    }

    #[inline]
    pub fn chunk_of(&self, x: i32, z: i32) -> ChunkCoord {
        self.dims.chunk_of(x, z)
    }

    /// Storage index of a coordinate after wrapping; ignores window bounds.
    #[inline]
    pub fn wrap_index(&self, x: i32, y: i32, z: i32) -> usize {
        let wx = pmod(x, self.width) as usize;
        let wz = pmod(z, self.width) as usize;
        let w = self.width as usize;
        wx + (y as usize + wz * self.height as usize) * w
    }

    #[inline]
    fn column_index(&self, x: i32, z: i32) -> usize {
        pmod(x, self.width) as usize + pmod(z, self.width) as usize * self.width as usize
    }

    #[inline]
    fn slot_index(&self, c: ChunkCoord) -> usize {
        let n = self.dims.chunks_per_side as i32;
        pmod(c.cx, n) as usize + pmod(c.cz, n) as usize * n as usize
    }

    /// Block range `[min, max)` of the window on x and z.
    #[inline]
    pub fn window_bounds(&self) -> (i32, i32, i32, i32) {
        let o = self.dims.origin_chunk(self.tile);
        let cs = self.chunk_size();
        let (x0, z0) = (o.cx * cs, o.cz * cs);
        (x0, z0, x0 + self.width, z0 + self.width)
    }

    #[inline]
    pub fn in_window_column(&self, x: i32, z: i32) -> bool {
        let (x0, z0, x1, z1) = self.window_bounds();
        x >= x0 && x < x1 && z >= z0 && z < z1
    }

    #[inline]
    pub fn in_window(&self, x: i32, y: i32, z: i32) -> bool {
        y >= 0 && y < self.height && self.in_window_column(x, z)
    }

    /// Wrapped index, or `None` outside the current window.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        self.in_window(x, y, z).then(|| self.wrap_index(x, y, z))
    }

    #[inline]
    pub fn contains_chunk(&self, c: ChunkCoord) -> bool {
        self.dims.covers(self.tile, c)
    }

    /// Whether `c` is inside the window and its data has arrived.
    #[inline]
    pub fn is_loaded(&self, c: ChunkCoord) -> bool {
        self.contains_chunk(c) && self.slots[self.slot_index(c)] == Some(c)
    }

    pub fn window_chunks(&self) -> Vec<ChunkCoord> {
        self.dims.chunks(self.tile)
    }

    /// Block id, or bedrock outside the window.
    #[inline]
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        match self.index(x, y, z) {
            Some(i) => self.blocks[i],
            None => BEDROCK,
        }
    }

    /// Auxiliary byte, or 0 outside the window.
    #[inline]
    pub fn get_extra(&self, x: i32, y: i32, z: i32) -> u8 {
        match self.index(x, y, z) {
            Some(i) => self.extra[i],
            None => 0,
        }
    }

    #[inline]
    pub fn orientation(&self, x: i32, y: i32, z: i32) -> Orientation {
        Orientation::from_extra(self.get_extra(x, y, z))
    }

    /// Light-opaque test; everything outside the window is opaque.
    #[inline]
    pub fn is_opaque(&self, x: i32, y: i32, z: i32) -> bool {
        match self.index(x, y, z) {
            Some(i) => self.opaque.get(i),
            None => true,
        }
    }

    #[inline]
    pub fn is_opaque_at(&self, i: usize) -> bool {
        self.opaque.get(i)
    }

    #[inline]
    pub fn block_at(&self, i: usize) -> BlockId {
        self.blocks[i]
    }

    #[inline]
    pub fn is_emitter_at(&self, i: usize) -> bool {
        self.extra[i] & EXTRA_EMITTER_BIT != 0
    }

    /// `1 + y` of the topmost light-opaque block of the column, 0 if none or outside.
    #[inline]
    pub fn column_height(&self, x: i32, z: i32) -> i32 {
        if !self.in_window_column(x, z) {
            return 0;
        }
        self.heights[self.column_index(x, z)] as i32
    }

    /// Writes one cell. Returns `false` (and does nothing) outside the window or when nothing
    /// changed. Orientation defaults to `North`.
    pub fn set_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        id: BlockId,
        orientation: Option<Orientation>,
    ) -> bool {
        let Some(i) = self.index(x, y, z) else {
            return false;
        };
        let mut extra = orientation.unwrap_or_default().bits() & EXTRA_ORIENTATION_MASK;
        if self.reg.emits_light(id) {
            extra |= EXTRA_EMITTER_BIT;
        }
        if self.blocks[i] == id && self.extra[i] == extra {
            return false;
        }
        self.blocks[i] = id;
        self.extra[i] = extra;
        let opaque = self.reg.is_opaque(id);
        self.opaque.set(i, opaque);

        let col = self.column_index(x, z);
        let h = self.heights[col] as i32;
        if opaque && y + 1 > h {
            self.heights[col] = (y + 1) as u16;
        } else if !opaque && y + 1 == h {
            self.heights[col] = self.scan_column(x, z, y) as u16;
        }
        self.dirty.insert(self.chunk_of(x, z));
        true
    }

    // top-down scan for the first opaque cell strictly below `below`
    fn scan_column(&self, x: i32, z: i32, below: i32) -> i32 {
        (0..below)
            .rev()
            .find(|&y| self.opaque.get(self.wrap_index(x, y, z)))
            .map_or(0, |y| y + 1)
    }

    /// Copies a snapshot into its slot. Returns `false` if the chunk is outside the window or
    /// its dimensions do not match the store.
    pub fn apply_chunk(&mut self, chunk: &Chunk) -> bool {
        if !self.contains_chunk(chunk.coord) {
            log::debug!(
                target: "world",
                "dropping chunk ({}, {}) outside window",
                chunk.coord.cx,
                chunk.coord.cz
            );
            return false;
        }
        if chunk.size != self.dims.chunk_size
            || chunk.height != self.dims.height
            || chunk.blocks.len() != chunk.size * chunk.size * chunk.height
            || chunk.extra.len() != chunk.blocks.len()
        {
            log::warn!(
                target: "world",
                "chunk ({}, {}) has size {}x{} but the window expects {}x{}",
                chunk.coord.cx,
                chunk.coord.cz,
                chunk.size,
                chunk.height,
                self.dims.chunk_size,
                self.dims.height
            );
            return false;
        }
        let cs = self.chunk_size();
        let (bx, bz) = chunk.base();
        for lz in 0..cs {
            for y in 0..self.height {
                let dst = self.wrap_index(bx, y, bz + lz);
                let src = chunk.idx(0, y as usize, lz as usize);
                let n = cs as usize;
                self.blocks[dst..dst + n].copy_from_slice(&chunk.blocks[src..src + n]);
                for k in 0..n {
                    let id = chunk.blocks[src + k];
                    let mut e = chunk.extra[src + k];
                    if self.reg.emits_light(id) {
                        e |= EXTRA_EMITTER_BIT;
                    }
                    self.extra[dst + k] = e;
                    self.opaque.set(dst + k, self.reg.is_opaque(id));
                }
            }
        }
        for lz in 0..cs {
            for lx in 0..cs {
                let (x, z) = (bx + lx, bz + lz);
                let h = self.scan_column(x, z, self.height);
                let col = self.column_index(x, z);
                self.heights[col] = h as u16;
            }
        }
        let slot = self.slot_index(chunk.coord);
        self.slots[slot] = Some(chunk.coord);
        self.dirty.insert(chunk.coord);
        true
    }

    /// Resets the slot `c` wraps to: air, no light-opaque bits, zero heights.
    pub fn clear_chunk(&mut self, c: ChunkCoord) {
        let cs = self.chunk_size();
        let (bx, bz) = (c.cx * cs, c.cz * cs);
        for lz in 0..cs {
            for y in 0..self.height {
                let dst = self.wrap_index(bx, y, bz + lz);
                let n = cs as usize;
                self.blocks[dst..dst + n].fill(AIR);
                self.extra[dst..dst + n].fill(0);
                for k in 0..n {
                    self.opaque.set(dst + k, false);
                }
            }
            for lx in 0..cs {
                let col = self.column_index(bx + lx, bz + lz);
                self.heights[col] = 0;
            }
        }
        let slot = self.slot_index(c);
        self.slots[slot] = None;
        self.dirty.remove(&c);
    }

    /// Slides the window to be centred on `tile`. Slots of chunks that left are cleared and
    /// are exactly the slots the entering chunks will occupy.
    pub fn recenter(&mut self, tile: ChunkCoord) -> WindowShift {
        if tile == self.tile {
            return WindowShift::default();
        }
        let old: HashSet<ChunkCoord> = self.dims.chunks(self.tile).into_iter().collect();
        let new = self.dims.chunks(tile);
        let new_set: HashSet<ChunkCoord> = new.iter().copied().collect();
        let mut left: Vec<ChunkCoord> = old.difference(&new_set).copied().collect();
        left.sort();
        let entered: Vec<ChunkCoord> = new.into_iter().filter(|c| !old.contains(c)).collect();
        for &c in &left {
            self.clear_chunk(c);
        }
        log::info!(
            target: "world",
            "window recentred from ({}, {}) to ({}, {}): {} left, {} entered",
            self.tile.cx,
            self.tile.cz,
            tile.cx,
            tile.cz,
            left.len(),
            entered.len()
        );
        self.tile = tile;
        WindowShift { left, entered }
    }

    /// Drains the set of chunks mutated since the last call, sorted.
    pub fn take_dirty(&mut self) -> Vec<ChunkCoord> {
        let mut out: Vec<ChunkCoord> = self.dirty.drain().collect();
        out.sort();
        out
    }
}
