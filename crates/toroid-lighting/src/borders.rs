use hashbrown::HashMap;
use toroid_chunk::ChunkCoord;
use toroid_world::BlockStore;

use crate::field::LightField;

/// Edge planes of a chunk's write buffers, `y * size + k` per plane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightBorders {
    pub xn: Vec<u8>,
    pub xp: Vec<u8>,
    pub zn: Vec<u8>,
    pub zp: Vec<u8>,
    pub sk_xn: Vec<u8>,
    pub sk_xp: Vec<u8>,
    pub sk_zn: Vec<u8>,
    pub sk_zp: Vec<u8>,
}

impl LightBorders {
    pub fn new(size: usize, height: usize) -> Self {
        let n = size * height;
        Self {
            xn: vec![0; n],
            xp: vec![0; n],
            zn: vec![0; n],
            zp: vec![0; n],
            sk_xn: vec![0; n],
            sk_xp: vec![0; n],
            sk_zn: vec![0; n],
            sk_zp: vec![0; n],
        }
    }

    pub fn from_field(store: &BlockStore, field: &LightField, c: ChunkCoord) -> Self {
        let cs = store.chunk_size();
        let h = store.height();
        let (bx, bz) = (c.cx * cs, c.cz * cs);
        let mut b = Self::new(cs as usize, h as usize);
        for y in 0..h {
            for k in 0..cs {
                let p = (y * cs + k) as usize;
                let xn = store.wrap_index(bx, y, bz + k);
                let xp = store.wrap_index(bx + cs - 1, y, bz + k);
                let zn = store.wrap_index(bx + k, y, bz);
                let zp = store.wrap_index(bx + k, y, bz + cs - 1);
                b.xn[p] = field.local_at(xn);
                b.xp[p] = field.local_at(xp);
                b.zn[p] = field.local_at(zn);
                b.zp[p] = field.local_at(zp);
                b.sk_xn[p] = field.sky_at(xn);
                b.sk_xp[p] = field.sky_at(xp);
                b.sk_zn[p] = field.sky_at(zn);
                b.sk_zp[p] = field.sky_at(zp);
            }
        }
        b
    }
}

/// Last published border planes per chunk.
#[derive(Default)]
pub struct LightingStore {
    borders: HashMap<ChunkCoord, LightBorders>,
}

impl LightingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the planes; returns whether they differ from the previous snapshot.
    pub fn update_borders(&mut self, c: ChunkCoord, lb: LightBorders) -> bool {
        match self.borders.get_mut(&c) {
            Some(existing) => {
                let changed = *existing != lb;
                if changed {
                    *existing = lb;
                }
                changed
            }
            None => {
                self.borders.insert(c, lb);
                true
            }
        }
    }

    pub fn clear_chunk(&mut self, c: ChunkCoord) {
        self.borders.remove(&c);
    }
}
