use hashbrown::{HashMap, HashSet};
use toroid_blocks::{BlockId, Orientation};
use toroid_chunk::{Chunk, ChunkCoord};

use crate::mailbox::Mailbox;
use crate::task::Bucket;
use crate::worker::Worker;

/// One block write in world coordinates. `orientation: None` stores `North`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockEdit {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub id: BlockId,
    pub orientation: Option<Orientation>,
}

impl BlockEdit {
    pub fn new(x: i32, y: i32, z: i32, id: BlockId) -> Self {
        Self {
            x,
            y,
            z,
            id,
            orientation: None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum UpdateMessage {
    ChunkArrived { chunk: Chunk },
    BlocksEdited { coord: ChunkCoord, edits: Vec<BlockEdit> },
    RebuildRequested { coord: ChunkCoord },
    LightRefreshRequested { coord: ChunkCoord },
    ObserverMoved { tile: ChunkCoord },
}

/// Payload of a scheduled world task.
#[derive(Clone, Debug)]
pub enum WorldTask {
    ApplyChunk(Chunk),
    ApplyEdits(Vec<BlockEdit>),
    /// Relight and remesh.
    Rebuild,
    /// Relight and remesh after a neighbour's light changed.
    Recolor,
}

/// What one drain produced.
#[derive(Clone, Debug, Default)]
pub struct Drain {
    pub messages: usize,
    pub tasks: usize,
    /// Latest observer tile seen in this drain, if any.
    pub observer: Option<ChunkCoord>,
    /// Coordinates a rebuild was scheduled for, sorted.
    pub rebuilds: Vec<ChunkCoord>,
}

/// Consumer side of a mailbox: swaps the pending messages out, collapses duplicates and turns
/// them into world tasks.
pub struct Pipeline {
    front: Vec<UpdateMessage>,
    chunk_size: i32,
}

impl Pipeline {
    pub fn new(chunk_size: i32) -> Self {
        Self {
            front: Vec::new(),
            chunk_size,
        }
    }

    /// Chunks whose border an edit at local `(lx, lz)` touches, diagonal included.
    ///
    /// Both edges are checked on each axis, so a one-cell chunk touches all eight neighbours.
    pub fn border_neighbors(&self, coord: ChunkCoord, lx: i32, lz: i32) -> Vec<ChunkCoord> {
        let edges = |v: i32| {
            let mut d = Vec::with_capacity(2);
            if v == 0 {
                d.push(-1);
            }
            if v == self.chunk_size - 1 {
                d.push(1);
            }
            d
        };
        let (xs, zs) = (edges(lx), edges(lz));
        let mut out = Vec::with_capacity(8);
        out.extend(xs.iter().map(|&dx| coord.offset(dx, 0)));
        out.extend(zs.iter().map(|&dz| coord.offset(0, dz)));
        for &dx in &xs {
            out.extend(zs.iter().map(|&dz| coord.offset(dx, dz)));
        }
        out
    }

    pub fn drain(&mut self, mailbox: &Mailbox<UpdateMessage>, worker: &Worker<WorldTask>) -> Drain {
        mailbox.swap_into(&mut self.front);
        let mut out = Drain {
            messages: self.front.len(),
            ..Drain::default()
        };
        if self.front.is_empty() {
            return out;
        }

        let mut chunks: HashMap<ChunkCoord, Chunk> = HashMap::new();
        let mut chunk_order: Vec<ChunkCoord> = Vec::new();
        let mut edits: HashMap<ChunkCoord, Vec<BlockEdit>> = HashMap::new();
        let mut edit_order: Vec<ChunkCoord> = Vec::new();
        let mut rebuild_requests: Vec<ChunkCoord> = Vec::new();
        let mut light_requests: Vec<ChunkCoord> = Vec::new();

        for msg in self.front.drain(..) {
            match msg {
                UpdateMessage::ChunkArrived { chunk } => {
                    let c = chunk.coord;
                    if chunks.insert(c, chunk).is_none() {
                        chunk_order.push(c);
                    }
                }
                UpdateMessage::BlocksEdited { coord, edits: list } => {
                    let slot = edits.entry(coord).or_default();
                    if slot.is_empty() {
                        edit_order.push(coord);
                    }
                    slot.extend(list);
                }
                UpdateMessage::RebuildRequested { coord } => {
                    if !rebuild_requests.contains(&coord) {
                        rebuild_requests.push(coord);
                    }
                }
                UpdateMessage::LightRefreshRequested { coord } => {
                    if !light_requests.contains(&coord) {
                        light_requests.push(coord);
                    }
                }
                UpdateMessage::ObserverMoved { tile } => out.observer = Some(tile),
            }
        }

        let mut rebuilds: Vec<ChunkCoord> = Vec::new();
        let mut seen: HashSet<ChunkCoord> = HashSet::new();
        let mut schedule_rebuild = |c: ChunkCoord| {
            if seen.insert(c) {
                rebuilds.push(c);
            }
        };

        for c in chunk_order {
            if let Some(chunk) = chunks.remove(&c) {
                worker.enqueue(Bucket::Chunk, c, WorldTask::ApplyChunk(chunk));
                out.tasks += 1;
            }
            schedule_rebuild(c);
            for n in c.neighbors4() {
                schedule_rebuild(n);
            }
        }

        for c in edit_order {
            let Some(list) = edits.remove(&c) else {
                continue;
            };
            schedule_rebuild(c);
            let cs = self.chunk_size;
            for e in &list {
                let (lx, lz) = (e.x - c.cx * cs, e.z - c.cz * cs);
                for n in self.border_neighbors(c, lx, lz) {
                    schedule_rebuild(n);
                }
            }
            worker.enqueue(Bucket::Edit, c, WorldTask::ApplyEdits(list));
            out.tasks += 1;
        }

        for c in rebuild_requests {
            schedule_rebuild(c);
        }

        for &c in &rebuilds {
            worker.enqueue(Bucket::Rebuild, c, WorldTask::Rebuild);
            out.tasks += 1;
        }

        for c in light_requests {
            if seen.contains(&c) || worker.is_queued(Bucket::Rebuild, c) {
                continue;
            }
            worker.enqueue(Bucket::Light, c, WorldTask::Recolor);
            out.tasks += 1;
        }

        rebuilds.sort_unstable();
        out.rebuilds = rebuilds;
        log::debug!(
            target: "pipeline",
            "drained {} messages into {} tasks ({} rebuilds)",
            out.messages,
            out.tasks,
            out.rebuilds.len()
        );
        out
    }
}
