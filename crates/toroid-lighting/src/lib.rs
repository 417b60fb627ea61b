//! Two-channel flood-fill lighting over the block window.
#![forbid(unsafe_code)]

mod borders;
mod field;
mod flood;

#[cfg(test)]
mod tests;

use borders::{LightBorders, LightingStore};
pub use field::LightField;
pub use flood::{Channel, FillStats, LIGHT_STEP, MAX_LIGHT, MAX_VISITS};

use toroid_chunk::ChunkCoord;
use toroid_world::BlockStore;

use flood::Batch;

/// Result of relighting one chunk.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LightOutcome {
    pub local: FillStats,
    pub sky: FillStats,
    /// Edge planes changed since the last pass; neighbours should be refreshed.
    pub borders_changed: bool,
}

/// Light buffers plus the border snapshots used to converge light across chunk seams.
pub struct LightingEngine {
    field: LightField,
    borders: LightingStore,
}

impl LightingEngine {
    pub fn new(store: &BlockStore) -> Self {
        Self {
            field: LightField::new(store.dims()),
            borders: LightingStore::new(),
        }
    }

    #[inline]
    pub fn field(&self) -> &LightField {
        &self.field
    }

    /// Recomputes both channels of chunk `c` (local first, then sky) and resolves its read
    /// buffer. Returns `None` when the chunk is outside the window.
    pub fn relight(&mut self, store: &BlockStore, c: ChunkCoord) -> Option<LightOutcome> {
        if !store.contains_chunk(c) {
            return None;
        }
        let b = Batch::new(store, c);

        let mut open = flood::init_local(store, &mut self.field.local, &b);
        flood::seed_borders(store, &mut self.field.local, &b, &mut open);
        let local = flood::flood_fill(store, &mut self.field.local, &b, open, Channel::Local);

        flood::init_sky(store, &mut self.field.sky, &b);
        let mut open = Vec::new();
        flood::seed_borders(store, &mut self.field.sky, &b, &mut open);
        flood::seed_shadow_edges(store, &self.field.sky, &b, &mut open);
        let sky = flood::flood_fill(store, &mut self.field.sky, &b, open, Channel::Sky);

        self.field.resolve_chunk(store, c);
        let planes = LightBorders::from_field(store, &self.field, c);
        let borders_changed = self.borders.update_borders(c, planes);
        log::trace!(
            target: "lighting",
            "chunk ({}, {}) lit: local {} visits, sky {} visits, borders changed: {}",
            c.cx,
            c.cz,
            local.visits,
            sky.visits,
            borders_changed
        );
        Some(LightOutcome {
            local,
            sky,
            borders_changed,
        })
    }

    /// Drops light and border state of a chunk leaving the window.
    pub fn clear_chunk(&mut self, store: &BlockStore, c: ChunkCoord) {
        self.field.clear_chunk(store, c);
        self.borders.clear_chunk(c);
    }

    #[inline]
    pub fn sample(&self, store: &BlockStore, x: i32, y: i32, z: i32) -> (u8, u8) {
        self.field.sample(store, x, y, z)
    }

    #[inline]
    pub fn corner(&self, x: i32, y: i32, z: i32) -> (u8, u8) {
        self.field.corner(x, y, z)
    }
}
