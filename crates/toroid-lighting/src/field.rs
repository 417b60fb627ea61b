use rayon::prelude::*;
use toroid_chunk::ChunkCoord;
use toroid_world::{BlockStore, WindowDims, pmod};

/// Sky and local light for the whole window.
///
/// The write buffers hold one value per cell and share the block store's addressing. The read
/// buffers hold one smoothed value per cell corner and are only refreshed by
/// [`LightField::resolve_chunk`]. They wrap with period `width + 1` on x and z, so the `width + 1`
/// corner rows of the window never share a slot.
pub struct LightField {
    corner_period: i32,
    height: i32,
    pub(crate) sky: Vec<u8>,
    pub(crate) local: Vec<u8>,
    read_sky: Vec<u8>,
    read_local: Vec<u8>,
}

impl LightField {
    pub fn new(dims: WindowDims) -> Self {
        let p = dims.width() + 1;
        let corners = p * p * (dims.height + 1);
        Self {
            corner_period: p as i32,
            height: dims.height as i32,
            sky: vec![0; dims.cells()],
            local: vec![0; dims.cells()],
            read_sky: vec![0; corners],
            read_local: vec![0; corners],
        }
    }

    #[inline]
    fn corner_index(&self, x: i32, y: i32, z: i32) -> usize {
        let p = self.corner_period;
        let column = pmod(z, p) as usize * (self.height as usize + 1);
        pmod(x, p) as usize + (y as usize + column) * p as usize
    }

    /// Write-buffer sky value by storage index.
    #[inline]
    pub fn sky_at(&self, i: usize) -> u8 {
        self.sky[i]
    }

    #[inline]
    pub fn local_at(&self, i: usize) -> u8 {
        self.local[i]
    }

    /// `(sky, local)` of a cell; zero outside the window.
    pub fn sample(&self, store: &BlockStore, x: i32, y: i32, z: i32) -> (u8, u8) {
        match store.index(x, y, z) {
            Some(i) => (self.sky[i], self.local[i]),
            None => (0, 0),
        }
    }

    /// Smoothed `(sky, local)` at the min corner of cell `(x, y, z)`; `y` may equal the height.
    #[inline]
    pub fn corner(&self, x: i32, y: i32, z: i32) -> (u8, u8) {
        if y < 0 || y > self.height {
            return (0, 0);
        }
        let i = self.corner_index(x, y, z);
        (self.read_sky[i], self.read_local[i])
    }

    /// Zeroes both buffers over the chunk's cells and corners.
    pub fn clear_chunk(&mut self, store: &BlockStore, c: ChunkCoord) {
        let cs = store.chunk_size();
        let (bx, bz) = (c.cx * cs, c.cz * cs);
        for lz in 0..cs {
            for y in 0..=self.height {
                for lx in 0..cs {
                    let (x, z) = (bx + lx, bz + lz);
                    if y < self.height {
                        let i = store.wrap_index(x, y, z);
                        self.sky[i] = 0;
                        self.local[i] = 0;
                    }
                    let k = self.corner_index(x, y, z);
                    self.read_sky[k] = 0;
                    self.read_local[k] = 0;
                }
            }
        }
    }

    /// Rebuilds the read buffers for a chunk: every corner of its cells plus one extra row on
    /// the max x/z sides. Each corner averages the non-opaque in-window cells sharing it.
    pub fn resolve_chunk(&mut self, store: &BlockStore, c: ChunkCoord) {
        let cs = store.chunk_size();
        let (bx, bz) = (c.cx * cs, c.cz * cs);
        let h = self.height;
        let sky = &self.sky;
        let local = &self.local;
        let rows: Vec<Vec<(i32, i32, i32, u8, u8)>> = (0..=cs)
            .into_par_iter()
            .map(|lz| {
                let z = bz + lz;
                let mut row = Vec::with_capacity(((cs + 1) * (h + 1)) as usize);
                for y in 0..=h {
                    for lx in 0..=cs {
                        let x = bx + lx;
                        let (s, l) = average_corner(store, sky, local, x, y, z);
                        row.push((x, y, z, s, l));
                    }
                }
                row
            })
            .collect();
        for (x, y, z, s, l) in rows.into_iter().flatten() {
            let k = self.corner_index(x, y, z);
            self.read_sky[k] = s;
            self.read_local[k] = l;
        }
    }
}

// Up to 8 cells share a corner: 4 in layer y and 4 in layer y - 1.
fn average_corner(
    store: &BlockStore,
    sky: &[u8],
    local: &[u8],
    x: i32,
    y: i32,
    z: i32,
) -> (u8, u8) {
    let (mut s, mut l, mut n) = (0u32, 0u32, 0u32);
    for cy in [y - 1, y] {
        for cz in [z - 1, z] {
            for cx in [x - 1, x] {
                if let Some(i) = store.index(cx, cy, cz) {
                    if !store.is_opaque_at(i) {
                        s += sky[i] as u32;
                        l += local[i] as u32;
                        n += 1;
                    }
                }
            }
        }
    }
    if n == 0 {
        return (0, 0);
    }
    (((s + n / 2) / n) as u8, ((l + n / 2) / n) as u8)
}
