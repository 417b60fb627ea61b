use std::mem;

use toroid_chunk::ChunkCoord;
use toroid_world::BlockStore;

pub const MAX_LIGHT: u8 = 15;
/// Light lost per cell step.
pub const LIGHT_STEP: u8 = 2;

const WARN_VISITS: usize = 10_000;
const WARN_VISITS_HIGH: usize = 30_000;
/// Propagation stops past this many visits; the result may be incomplete.
pub const MAX_VISITS: usize = 50_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Channel {
    Sky,
    Local,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FillStats {
    pub seeds: usize,
    pub visits: usize,
    pub aborted: bool,
}

/// One chunk column; propagation never leaves it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Batch {
    pub coord: ChunkCoord,
    pub bx: i32,
    pub bz: i32,
    pub size: i32,
    pub height: i32,
}

impl Batch {
    pub fn new(store: &BlockStore, coord: ChunkCoord) -> Self {
        let cs = store.chunk_size();
        Self {
            coord,
            bx: coord.cx * cs,
            bz: coord.cz * cs,
            size: cs,
            height: store.height(),
        }
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        y >= 0
            && y < self.height
            && x >= self.bx
            && x < self.bx + self.size
            && z >= self.bz
            && z < self.bz + self.size
    }
}

type Cell = (i32, i32, i32);

const NEIGHBORS: [Cell; 6] = [
    (1, 0, 0),
    (-1, 0, 0),
    (0, 1, 0),
    (0, -1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Resets the local channel over the batch; emitter cells start at full strength.
pub(crate) fn init_local(store: &BlockStore, buf: &mut [u8], b: &Batch) -> Vec<Cell> {
    let mut open = Vec::new();
    for lz in 0..b.size {
        for y in 0..b.height {
            for lx in 0..b.size {
                let (x, z) = (b.bx + lx, b.bz + lz);
                let i = store.wrap_index(x, y, z);
                if store.is_emitter_at(i) {
                    buf[i] = MAX_LIGHT;
                    open.push((x, y, z));
                } else {
                    buf[i] = 0;
                }
            }
        }
    }
    open
}

/// Top-down column pass: air keeps the value, semi-transparent cells cost 1, water 2, and
/// everything below the column height (at or under the first opaque cell) is dark.
pub(crate) fn init_sky(store: &BlockStore, buf: &mut [u8], b: &Batch) {
    let reg = store.registry();
    for lz in 0..b.size {
        for lx in 0..b.size {
            let (x, z) = (b.bx + lx, b.bz + lz);
            let top = store.column_height(x, z);
            let mut v = MAX_LIGHT;
            for y in (0..b.height).rev() {
                let i = store.wrap_index(x, y, z);
                if y < top {
                    v = 0;
                } else {
                    let id = store.block_at(i);
                    if reg.is_water(id) {
                        v = v.saturating_sub(2);
                    } else if reg.is_semi_transparent(id) {
                        v = v.saturating_sub(1);
                    }
                }
                buf[i] = v;
            }
        }
    }
}

/// Copies converged values of loaded neighbour chunks inward across the four edges.
pub(crate) fn seed_borders(store: &BlockStore, buf: &mut [u8], b: &Batch, open: &mut Vec<Cell>) {
    let last = b.size - 1;
    let sides: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    for (dx, dz) in sides {
        if !store.is_loaded(b.coord.offset(dx, dz)) {
            continue;
        }
        for k in 0..b.size {
            let (lx, lz) = match (dx, dz) {
                (-1, _) => (0, k),
                (1, _) => (last, k),
                (_, -1) => (k, 0),
                _ => (k, last),
            };
            let (x, z) = (b.bx + lx, b.bz + lz);
            for y in 0..b.height {
                let inner = store.wrap_index(x, y, z);
                if store.is_opaque_at(inner) {
                    continue;
                }
                let nv = buf[store.wrap_index(x + dx, y, z + dz)];
                if nv <= LIGHT_STEP {
                    continue;
                }
                let cand = nv - LIGHT_STEP;
                if buf[inner] < cand {
                    buf[inner] = cand;
                    open.push((x, y, z));
                }
            }
        }
    }
}

/// Lit cells whose horizontal neighbour in the batch is darker by more than a step, i.e. the
/// boundary of overhang shadows.
pub(crate) fn seed_shadow_edges(store: &BlockStore, buf: &[u8], b: &Batch, open: &mut Vec<Cell>) {
    for lz in 0..b.size {
        for y in 0..b.height {
            for lx in 0..b.size {
                let (x, z) = (b.bx + lx, b.bz + lz);
                let i = store.wrap_index(x, y, z);
                let v = buf[i];
                if v <= LIGHT_STEP || store.is_opaque_at(i) {
                    continue;
                }
                let darker = [(1, 0), (-1, 0), (0, 1), (0, -1)].into_iter().any(|(dx, dz)| {
                    let (nx, nz) = (x + dx, z + dz);
                    if !b.contains(nx, y, nz) {
                        return false;
                    }
                    let j = store.wrap_index(nx, y, nz);
                    !store.is_opaque_at(j) && buf[j] < v - LIGHT_STEP
                });
                if darker {
                    open.push((x, y, z));
                }
            }
        }
    }
}

/// Breadth-first decrement-by-step propagation over two alternating open lists.
pub(crate) fn flood_fill(
    store: &BlockStore,
    buf: &mut [u8],
    b: &Batch,
    seeds: Vec<Cell>,
    channel: Channel,
) -> FillStats {
    let mut stats = FillStats {
        seeds: seeds.len(),
        ..FillStats::default()
    };
    let mut current = seeds;
    let mut next: Vec<Cell> = Vec::new();
    while !current.is_empty() {
        for (x, y, z) in current.drain(..) {
            stats.visits += 1;
            match stats.visits {
                WARN_VISITS | WARN_VISITS_HIGH => log::warn!(
                    target: "lighting",
                    "{:?} light in chunk ({}, {}) passed {} visits",
                    channel,
                    b.coord.cx,
                    b.coord.cz,
                    stats.visits
                ),
                v if v > MAX_VISITS => {
                    log::warn!(
                        target: "lighting",
                        "{:?} light in chunk ({}, {}) aborted after {} visits",
                        channel,
                        b.coord.cx,
                        b.coord.cz,
                        MAX_VISITS
                    );
                    stats.aborted = true;
                    return stats;
                }
                _ => {}
            }
            let v = buf[store.wrap_index(x, y, z)];
            if v <= LIGHT_STEP {
                continue;
            }
            let lit = v - LIGHT_STEP;
            for (dx, dy, dz) in NEIGHBORS {
                let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                if !b.contains(nx, ny, nz) {
                    continue;
                }
                let j = store.wrap_index(nx, ny, nz);
                if store.is_opaque_at(j) || buf[j] >= lit {
                    continue;
                }
                buf[j] = lit;
                next.push((nx, ny, nz));
            }
        }
        mem::swap(&mut current, &mut next);
    }
    stats
}
