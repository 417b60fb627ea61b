use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::worker::ExecuteReport;

/// Counters updated by the consumers; read from any thread.
#[derive(Default)]
pub struct RuntimeStats {
    executed: AtomicU64,
    failed: AtomicU64,
    deduped: AtomicU64,
    drains: AtomicU64,
    meshes_built: AtomicU64,
    last_light_us: AtomicU64,
    last_mesh_us: AtomicU64,
    dropped_on_stop: AtomicU64,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub executed: u64,
    pub failed: u64,
    pub deduped: u64,
    pub drains: u64,
    pub meshes_built: u64,
    pub last_light_us: u64,
    pub last_mesh_us: u64,
    pub dropped_on_stop: u64,
    /// Queued tasks per bucket (chunk, edit, rebuild, light).
    pub queued: [usize; 4],
}

fn micros(d: Duration) -> u64 {
    d.as_micros().min(u128::from(u64::MAX)) as u64
}

impl RuntimeStats {
    pub fn record_execute(&self, r: &ExecuteReport) {
        self.executed.fetch_add(r.executed as u64, Ordering::Relaxed);
        self.failed.fetch_add(r.failed as u64, Ordering::Relaxed);
        self.deduped.fetch_add(r.deduped as u64, Ordering::Relaxed);
    }

    pub fn record_drain(&self) {
        self.drains.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_build(&self, light: Duration, mesh: Duration) {
        self.meshes_built.fetch_add(1, Ordering::Relaxed);
        self.last_light_us.store(micros(light), Ordering::Relaxed);
        self.last_mesh_us.store(micros(mesh), Ordering::Relaxed);
    }

    pub fn record_dropped(&self, n: usize) {
        self.dropped_on_stop.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self, queued: [usize; 4]) -> StatsSnapshot {
        StatsSnapshot {
            executed: self.executed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            deduped: self.deduped.load(Ordering::Relaxed),
            drains: self.drains.load(Ordering::Relaxed),
            meshes_built: self.meshes_built.load(Ordering::Relaxed),
            last_light_us: self.last_light_us.load(Ordering::Relaxed),
            last_mesh_us: self.last_mesh_us.load(Ordering::Relaxed),
            dropped_on_stop: self.dropped_on_stop.load(Ordering::Relaxed),
            queued,
        }
    }
}
