use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use parking_lot::Mutex;
use toroid_chunk::ChunkCoord;

use crate::error::TaskError;
use crate::task::{Bucket, Task};

struct Queue<P> {
    // sorted lowest priority first so `pop` yields the next task
    tasks: Vec<Task<P>>,
    dirty: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExecuteReport {
    pub executed: usize,
    pub failed: usize,
    pub deduped: usize,
    pub remaining: usize,
}

/// Priority task queue shared between producers and the single execution context.
///
/// Tasks are ordered by bucket, then Manhattan distance to the observer chunk at sort time,
/// then insertion sequence.
pub struct Worker<P> {
    queue: Mutex<Queue<P>>,
    next_seq: AtomicU64,
    observer_x: AtomicI32,
    observer_z: AtomicI32,
}

impl<P> Default for Worker<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Worker<P> {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(Queue {
                tasks: Vec::new(),
                dirty: false,
            }),
            next_seq: AtomicU64::new(0),
            observer_x: AtomicI32::new(0),
            observer_z: AtomicI32::new(0),
        }
    }

    pub fn observer(&self) -> ChunkCoord {
        ChunkCoord::new(
            self.observer_x.load(Ordering::Relaxed),
            self.observer_z.load(Ordering::Relaxed),
        )
    }

    /// Updates the distance reference; queued tasks are re-sorted before the next pop.
    pub fn set_observer(&self, c: ChunkCoord) {
        if c == self.observer() {
            return;
        }
        self.observer_x.store(c.cx, Ordering::Relaxed);
        self.observer_z.store(c.cz, Ordering::Relaxed);
        self.queue.lock().dirty = true;
    }

    pub fn enqueue(&self, bucket: Bucket, coord: ChunkCoord, payload: P) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let mut q = self.queue.lock();
        q.tasks.push(Task {
            bucket,
            coord,
            seq,
            payload,
        });
        q.dirty = true;
        seq
    }

    pub fn len(&self) -> usize {
        self.queue.lock().tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queued task count per bucket, indexed by `Bucket::index`.
    pub fn counts(&self) -> [usize; 4] {
        let mut out = [0; 4];
        for t in &self.queue.lock().tasks {
            out[t.bucket.index()] += 1;
        }
        out
    }

    pub fn is_queued(&self, bucket: Bucket, coord: ChunkCoord) -> bool {
        self.queue
            .lock()
            .tasks
            .iter()
            .any(|t| t.bucket == bucket && t.coord == coord)
    }

    /// Drops every queued task, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut q = self.queue.lock();
        let n = q.tasks.len();
        q.tasks.clear();
        q.dirty = false;
        n
    }

    // Sorts and removes stale rebuild-class duplicates, plus light refreshes of chunks with a
    // rebuild queued (a rebuild relights too); returns the number removed.
    fn prepare(q: &mut Queue<P>, observer: ChunkCoord) -> usize {
        let mut newest: HashMap<(Bucket, ChunkCoord), u64> = HashMap::new();
        for t in q.tasks.iter().filter(|t| t.bucket.dedups()) {
            let e = newest.entry((t.bucket, t.coord)).or_insert(t.seq);
            *e = (*e).max(t.seq);
        }
        let before = q.tasks.len();
        q.tasks.retain(|t| {
            if !t.bucket.dedups() {
                return true;
            }
            if t.bucket == Bucket::Light && newest.contains_key(&(Bucket::Rebuild, t.coord)) {
                return false;
            }
            newest.get(&(t.bucket, t.coord)) == Some(&t.seq)
        });
        let key = |t: &Task<P>| (t.bucket, t.coord.manhattan(observer), t.seq);
        q.tasks.sort_unstable_by(|a, b| key(b).cmp(&key(a)));
        q.dirty = false;
        before - q.tasks.len()
    }

    /// Pops and runs tasks in priority order until the queue is empty or `budget` has elapsed
    /// (checked after each task). Failing tasks are logged and skipped.
    pub fn execute<F>(&self, budget: Duration, mut run: F) -> ExecuteReport
    where
        F: FnMut(Task<P>) -> Result<(), TaskError>,
    {
        let start = Instant::now();
        let mut report = ExecuteReport::default();
        loop {
            let next = {
                let mut q = self.queue.lock();
                if q.dirty {
                    report.deduped += Self::prepare(&mut q, self.observer());
                }
                q.tasks.pop()
            };
            let Some(task) = next else {
                break;
            };
            let (bucket, coord) = (task.bucket, task.coord);
            report.executed += 1;
            if let Err(err) = run(task) {
                report.failed += 1;
                log::warn!(
                    target: "worker",
                    "{:?} task for chunk ({}, {}) failed: {}",
                    bucket,
                    coord.cx,
                    coord.cz,
                    err
                );
            }
            if start.elapsed() > budget {
                break;
            }
        }
        report.remaining = self.len();
        report
    }
}
