use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use toroid_blocks::AtlasLayout;
use toroid_chunk::ChunkCoord;
use toroid_world::BlockStore;

use crate::error::RuntimeError;
use crate::executor::{MeshEvent, WorldState, run_task};
use crate::mailbox::Mailbox;
use crate::pipeline::{Drain, Pipeline, UpdateMessage, WorldTask};
use crate::source::{ChunkSink, ChunkSource};
use crate::stats::{RuntimeStats, StatsSnapshot};
use crate::worker::Worker;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Wall time one consumer cycle may spend running tasks.
    pub task_budget: Duration,
    /// Sleep between idle polls.
    pub poll_interval: Duration,
    /// How long `stop_threads` waits for each consumer to acknowledge.
    pub stop_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            task_budget: Duration::from_millis(8),
            poll_interval: Duration::from_millis(4),
            stop_timeout: Duration::from_secs(2),
        }
    }
}

/// State reachable from both consumer threads and the owning engine.
pub(crate) struct Shared {
    pub world: RwLock<WorldState>,
    pub worker: Worker<WorldTask>,
    pub updates: Arc<Mailbox<UpdateMessage>>,
    pub light_updates: Mailbox<UpdateMessage>,
    pub meshes: Sender<MeshEvent>,
    pub source: Arc<dyn ChunkSource>,
    pub stats: RuntimeStats,
    pub atlas: AtlasLayout,
    pub config: RuntimeConfig,
    chunk_pipeline: Mutex<Pipeline>,
    light_pipeline: Mutex<Pipeline>,
    last_rebuilds: Mutex<Vec<ChunkCoord>>,
}

impl Shared {
    fn sink(&self) -> ChunkSink {
        ChunkSink::new(Arc::clone(&self.updates))
    }

    /// Drains the update mailbox, follows an observer move and runs queued tasks for at most
    /// `budget`. Returns whether anything was done.
    fn chunk_cycle(&self, budget: Duration) -> bool {
        let drain = self
            .chunk_pipeline
            .lock()
            .drain(&self.updates, &self.worker);
        self.record_drain(&drain);
        if let Some(tile) = drain.observer {
            self.move_window(tile);
        }
        if self.worker.is_empty() {
            return drain.messages > 0;
        }
        let report = self.worker.execute(budget, |task| run_task(self, task));
        self.stats.record_execute(&report);
        true
    }

    /// Turns light refresh requests into recolor tasks.
    fn light_cycle(&self) -> bool {
        let drain = self
            .light_pipeline
            .lock()
            .drain(&self.light_updates, &self.worker);
        drain.messages > 0
    }

    fn record_drain(&self, drain: &Drain) {
        if drain.messages == 0 {
            return;
        }
        self.stats.record_drain();
        *self.last_rebuilds.lock() = drain.rebuilds.clone();
    }

    fn move_window(&self, tile: ChunkCoord) {
        let (shift, new_edge) = {
            let mut world = self.world.write();
            let WorldState { store, lighting } = &mut *world;
            let shift = store.recenter(tile);
            for &c in &shift.left {
                lighting.clear_chunk(store, c);
            }
            // chunks that lost a neighbour still hold light and corners seeded from it
            let mut new_edge: Vec<ChunkCoord> = shift
                .left
                .iter()
                .flat_map(|c| c.neighbors4())
                .filter(|&n| store.is_loaded(n))
                .collect();
            new_edge.sort();
            new_edge.dedup();
            (shift, new_edge)
        };
        self.worker.set_observer(tile);
        self.light_updates.push_many(
            new_edge
                .into_iter()
                .map(|coord| UpdateMessage::LightRefreshRequested { coord }),
        );
        for coord in shift.left {
            let _ = self.meshes.send(MeshEvent::Unloaded { coord });
        }
        for c in shift.entered {
            self.source.request_chunk(c, self.sink());
        }
    }
}

struct Threads {
    stop: Arc<AtomicBool>,
    handles: Vec<(&'static str, JoinHandle<()>)>,
    acks: Receiver<&'static str>,
}

/// Owns the shared world, the scheduler and the two consumer threads.
pub struct Runtime {
    shared: Arc<Shared>,
    mesh_rx: Receiver<MeshEvent>,
    threads: Option<Threads>,
}

impl Runtime {
    pub fn new(
        store: BlockStore,
        source: Arc<dyn ChunkSource>,
        atlas: AtlasLayout,
        config: RuntimeConfig,
    ) -> Self {
        let (mesh_tx, mesh_rx) = unbounded();
        let chunk_size = store.chunk_size();
        let tile = store.tile();
        let worker = Worker::new();
        worker.set_observer(tile);
        let shared = Arc::new(Shared {
            world: RwLock::new(WorldState::new(store)),
            worker,
            updates: Arc::new(Mailbox::new()),
            light_updates: Mailbox::new(),
            meshes: mesh_tx,
            source,
            stats: RuntimeStats::default(),
            atlas,
            config,
            chunk_pipeline: Mutex::new(Pipeline::new(chunk_size)),
            light_pipeline: Mutex::new(Pipeline::new(chunk_size)),
            last_rebuilds: Mutex::new(Vec::new()),
        });
        Self {
            shared,
            mesh_rx,
            threads: None,
        }
    }

    /// Asks the data source for every chunk currently in the window.
    pub fn request_window(&self) {
        let chunks = self.shared.world.read().store.window_chunks();
        for c in chunks {
            self.shared.source.request_chunk(c, self.shared.sink());
        }
    }

    pub fn sink(&self) -> ChunkSink {
        self.shared.sink()
    }

    pub fn source(&self) -> &Arc<dyn ChunkSource> {
        &self.shared.source
    }

    pub fn post(&self, msg: UpdateMessage) {
        self.shared.updates.push(msg);
    }

    /// Shared read access for queries such as ray tracing.
    pub fn read(&self) -> RwLockReadGuard<'_, WorldState> {
        self.shared.world.read()
    }

    pub fn worker(&self) -> &Worker<WorldTask> {
        &self.shared.worker
    }

    /// Rebuild coordinates scheduled by the most recent non-empty drain.
    pub fn last_rebuilds(&self) -> Vec<ChunkCoord> {
        self.shared.last_rebuilds.lock().clone()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot(self.shared.worker.counts())
    }

    pub fn threads_running(&self) -> bool {
        self.threads.is_some()
    }

    /// One lighting and one consumer cycle on the calling thread, without a time budget.
    pub fn pump(&self) -> bool {
        let lit = self.shared.light_cycle();
        let worked = self.shared.chunk_cycle(Duration::MAX);
        lit || worked
    }

    /// Pumps until a cycle finds nothing to do or `max_rounds` is reached; returns the number
    /// of rounds that did work.
    pub fn pump_until_idle(&self, max_rounds: usize) -> usize {
        let mut rounds = 0;
        while rounds < max_rounds && self.pump() {
            rounds += 1;
        }
        rounds
    }

    /// Mesh events produced since the last call.
    pub fn drain_mesh_events(&self) -> Vec<MeshEvent> {
        self.mesh_rx.try_iter().collect()
    }

    pub fn start_threads(&mut self) -> Result<(), RuntimeError> {
        if self.threads_running() {
            return Ok(());
        }
        let stop = Arc::new(AtomicBool::new(false));
        let (ack_tx, acks) = unbounded::<&'static str>();
        let mut handles = Vec::with_capacity(2);

        let spawn = |name: &'static str, body: Box<dyn Fn(&Shared) -> bool + Send>| {
            let shared = Arc::clone(&self.shared);
            let stop = Arc::clone(&stop);
            let ack = ack_tx.clone();
            thread::Builder::new()
                .name(name.to_string())
                .spawn(move || {
                    log::debug!(target: "pipeline", "{name} thread started");
                    while !stop.load(Ordering::Acquire) {
                        if !body(&*shared) {
                            thread::sleep(shared.config.poll_interval);
                        }
                    }
                    let _ = ack.send(name);
                })
                .map_err(|source| RuntimeError::Spawn { name, source })
        };

        let chunks = spawn(
            "toroid-chunks",
            Box::new(|s: &Shared| s.chunk_cycle(s.config.task_budget)),
        )?;
        handles.push(("toroid-chunks", chunks));
        match spawn("toroid-light", Box::new(|s: &Shared| s.light_cycle())) {
            Ok(h) => handles.push(("toroid-light", h)),
            Err(e) => {
                stop.store(true, Ordering::Release);
                for (_, h) in handles {
                    let _ = h.join();
                }
                return Err(e);
            }
        }
        log::info!(target: "pipeline", "consumer threads started");
        self.threads = Some(Threads {
            stop,
            handles,
            acks,
        });
        Ok(())
    }

    /// Signals both consumers, waits up to the configured timeout for their acknowledgements
    /// and discards anything still in the mailboxes. Returns `false` if a thread did not
    /// acknowledge in time; that thread is detached.
    pub fn stop_threads(&mut self) -> bool {
        let Some(threads) = self.threads.take() else {
            return true;
        };
        threads.stop.store(true, Ordering::Release);
        let deadline = Instant::now() + self.shared.config.stop_timeout;
        let mut acked: Vec<&'static str> = Vec::with_capacity(threads.handles.len());
        while acked.len() < threads.handles.len() {
            let left = deadline.saturating_duration_since(Instant::now());
            match threads.acks.recv_timeout(left) {
                Ok(name) => acked.push(name),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        let all = acked.len() == threads.handles.len();
        for (name, handle) in threads.handles {
            if acked.contains(&name) {
                let _ = handle.join();
            } else {
                log::warn!(target: "pipeline", "{name} thread did not stop in time; detaching");
            }
        }
        let dropped = self.shared.updates.discard() + self.shared.light_updates.discard();
        self.shared.stats.record_dropped(dropped);
        log::info!(
            target: "pipeline",
            "consumer threads stopped, {} pending messages discarded",
            dropped
        );
        all
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.stop_threads();
    }
}
