use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;
use hashbrown::HashSet;
use toroid_blocks::{AtlasLayout, BEDROCK, BlockRegistry};
use toroid_chunk::{Chunk, ChunkCoord};
use toroid_world::{BlockStore, WindowDims};

fn cc(cx: i32, cz: i32) -> ChunkCoord {
    ChunkCoord::new(cx, cz)
}

fn run_all<P>(w: &Worker<P>) -> Vec<Task<P>> {
    let mut seen = Vec::new();
    w.execute(Duration::MAX, |t| {
        seen.push(t);
        Ok(())
    });
    seen
}

#[test]
fn buckets_run_in_priority_order_at_equal_distance() {
    let w: Worker<()> = Worker::new();
    w.enqueue(Bucket::Light, cc(1, 0), ());
    w.enqueue(Bucket::Rebuild, cc(0, 1), ());
    w.enqueue(Bucket::Chunk, cc(-1, 0), ());
    w.enqueue(Bucket::Edit, cc(0, -1), ());
    let order: Vec<Bucket> = run_all(&w).into_iter().map(|t| t.bucket).collect();
    assert_eq!(
        order,
        vec![Bucket::Chunk, Bucket::Edit, Bucket::Rebuild, Bucket::Light]
    );
    assert!(w.is_empty());
}

#[test]
fn nearer_chunks_first_then_fifo() {
    let w: Worker<u32> = Worker::new();
    w.set_observer(cc(10, 10));
    w.enqueue(Bucket::Chunk, cc(0, 0), 0);
    w.enqueue(Bucket::Chunk, cc(10, 11), 1);
    w.enqueue(Bucket::Chunk, cc(11, 10), 2);
    w.enqueue(Bucket::Chunk, cc(10, 10), 3);
    let order: Vec<u32> = run_all(&w).into_iter().map(|t| t.payload).collect();
    assert_eq!(order, vec![3, 1, 2, 0]);
}

#[test]
fn observer_change_resorts_queue() {
    let w: Worker<u32> = Worker::new();
    w.enqueue(Bucket::Rebuild, cc(0, 0), 0);
    w.enqueue(Bucket::Rebuild, cc(5, 0), 1);
    assert_eq!(w.counts(), [0, 0, 2, 0]);
    w.set_observer(cc(5, 0));
    let order: Vec<u32> = run_all(&w).into_iter().map(|t| t.payload).collect();
    assert_eq!(order, vec![1, 0]);
}

#[test]
fn rebuild_duplicates_keep_newest() {
    let w: Worker<u32> = Worker::new();
    w.enqueue(Bucket::Rebuild, cc(2, 2), 1);
    w.enqueue(Bucket::Rebuild, cc(2, 2), 2);
    w.enqueue(Bucket::Light, cc(2, 2), 3);
    w.enqueue(Bucket::Light, cc(2, 2), 4);
    w.enqueue(Bucket::Edit, cc(2, 2), 5);
    w.enqueue(Bucket::Edit, cc(2, 2), 6);
    let mut payloads = Vec::new();
    let report = w.execute(Duration::MAX, |t| {
        payloads.push(t.payload);
        Ok(())
    });
    // edits are never collapsed; the rebuild covers the light refresh
    assert_eq!(payloads, vec![5, 6, 2]);
    assert_eq!(report.deduped, 3);
    assert_eq!(report.executed, 3);
}

#[test]
fn queued_rebuild_absorbs_light_refresh() {
    let w: Worker<u32> = Worker::new();
    w.enqueue(Bucket::Light, cc(1, 0), 0);
    w.enqueue(Bucket::Light, cc(0, 1), 1);
    w.enqueue(Bucket::Rebuild, cc(1, 0), 2);
    let order: Vec<(Bucket, u32)> = run_all(&w)
        .into_iter()
        .map(|t| (t.bucket, t.payload))
        .collect();
    assert_eq!(order, vec![(Bucket::Rebuild, 2), (Bucket::Light, 1)]);

    // a refresh arriving after the rebuild ran is kept
    w.enqueue(Bucket::Light, cc(1, 0), 3);
    let order: Vec<u32> = run_all(&w).into_iter().map(|t| t.payload).collect();
    assert_eq!(order, vec![3]);
}

#[test]
fn failing_task_is_skipped() {
    let w: Worker<u32> = Worker::new();
    for i in 0..3 {
        w.enqueue(Bucket::Edit, cc(0, 0), i);
    }
    let mut ran = Vec::new();
    let report = w.execute(Duration::MAX, |t| {
        ran.push(t.payload);
        if t.payload == 1 {
            return Err(TaskError::ChunkShape {
                coord: t.coord,
                size: 1,
                height: 1,
                expect_size: 16,
                expect_height: 128,
            });
        }
        Ok(())
    });
    assert_eq!(ran, vec![0, 1, 2]);
    assert_eq!(report.failed, 1);
    assert_eq!(report.executed, 3);
}

#[test]
fn zero_budget_still_runs_one_task() {
    let w: Worker<u32> = Worker::new();
    for i in 0..5 {
        w.enqueue(Bucket::Chunk, cc(i as i32, 0), i);
    }
    let report = w.execute(Duration::ZERO, |_| {
        std::thread::sleep(Duration::from_millis(1));
        Ok(())
    });
    assert_eq!(report.executed, 1);
    assert_eq!(report.remaining, 4);
    assert_eq!(w.len(), 4);
}

#[test]
fn mailbox_swaps_buffers() {
    let mb: Mailbox<u32> = Mailbox::new();
    mb.push(1);
    mb.push_many([2, 3]);
    let mut front = Vec::new();
    mb.swap_into(&mut front);
    assert_eq!(front, vec![1, 2, 3]);
    assert!(mb.is_empty());
    mb.push(4);
    assert_eq!(mb.discard(), 1);
}

fn drain_msgs(msgs: Vec<UpdateMessage>, worker: &Worker<WorldTask>) -> Drain {
    let mb = Mailbox::new();
    mb.push_many(msgs);
    Pipeline::new(16).drain(&mb, worker)
}

#[test]
fn edit_on_max_x_edge_rebuilds_east_neighbour() {
    let w = Worker::new();
    let d = drain_msgs(
        vec![UpdateMessage::BlocksEdited {
            coord: cc(0, 0),
            edits: vec![BlockEdit::new(15, 5, 3, 2)],
        }],
        &w,
    );
    assert_eq!(d.rebuilds, vec![cc(0, 0), cc(1, 0)]);
    assert_eq!(w.counts(), [0, 1, 2, 0]);
}

#[test]
fn edit_on_min_corner_touches_three_neighbours() {
    let p = Pipeline::new(16);
    let mut n = p.border_neighbors(cc(-1, -1), 0, 0);
    n.sort();
    assert_eq!(n, vec![cc(-2, -2), cc(-2, -1), cc(-1, -2)]);
    assert!(p.border_neighbors(cc(0, 0), 7, 8).is_empty());
}

#[test]
fn one_cell_chunks_touch_both_edges() {
    let p = Pipeline::new(1);
    let mut n = p.border_neighbors(cc(0, 0), 0, 0);
    n.sort();
    let mut expect: Vec<ChunkCoord> = (-1..=1)
        .flat_map(|dx| (-1..=1).map(move |dz| cc(dx, dz)))
        .filter(|&c| c != cc(0, 0))
        .collect();
    expect.sort();
    assert_eq!(n, expect);

    let w = Worker::new();
    let mut pipeline = Pipeline::new(1);
    let mb = Mailbox::new();
    mb.push(UpdateMessage::BlocksEdited {
        coord: cc(3, 3),
        edits: vec![BlockEdit::new(3, 0, 3, 2)],
    });
    let out = pipeline.drain(&mb, &w);
    assert!(out.rebuilds.contains(&cc(4, 3)));
    assert!(out.rebuilds.contains(&cc(3, 4)));
    assert!(out.rebuilds.contains(&cc(4, 4)));
    assert_eq!(out.rebuilds.len(), 9);
}

#[test]
fn edits_for_one_chunk_merge_in_order() {
    let w = Worker::new();
    let d = drain_msgs(
        vec![
            UpdateMessage::BlocksEdited {
                coord: cc(0, 0),
                edits: vec![BlockEdit::new(1, 1, 1, 2)],
            },
            UpdateMessage::BlocksEdited {
                coord: cc(0, 0),
                edits: vec![BlockEdit::new(1, 1, 1, 0), BlockEdit::new(2, 1, 1, 3)],
            },
        ],
        &w,
    );
    assert_eq!(d.messages, 2);
    let edits: Vec<Vec<BlockEdit>> = run_all(&w)
        .into_iter()
        .filter_map(|t| match t.payload {
            WorldTask::ApplyEdits(e) => Some(e),
            _ => None,
        })
        .collect();
    assert_eq!(edits.len(), 1);
    let ids: Vec<u8> = edits[0].iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![2, 0, 3]);
}

#[test]
fn chunk_arrival_keeps_latest_and_rebuilds_neighbours() {
    let w = Worker::new();
    let c = cc(3, -2);
    let first = Chunk::empty(c, 16, 8);
    let mut second = Chunk::empty(c, 16, 8);
    second.fill_layers(1, BEDROCK);
    let d = drain_msgs(
        vec![
            UpdateMessage::ChunkArrived { chunk: first },
            UpdateMessage::ChunkArrived {
                chunk: second.clone(),
            },
        ],
        &w,
    );
    assert_eq!(d.tasks, 6);
    let mut expect = vec![c];
    expect.extend(c.neighbors4());
    expect.sort();
    assert_eq!(d.rebuilds, expect);
    let applied: Vec<Chunk> = run_all(&w)
        .into_iter()
        .filter_map(|t| match t.payload {
            WorldTask::ApplyChunk(ch) => Some(ch),
            _ => None,
        })
        .collect();
    assert_eq!(applied, vec![second]);
}

#[test]
fn light_refresh_skipped_when_rebuild_pending() {
    let w = Worker::new();
    let d = drain_msgs(
        vec![
            UpdateMessage::RebuildRequested { coord: cc(2, 2) },
            UpdateMessage::RebuildRequested { coord: cc(2, 2) },
            UpdateMessage::LightRefreshRequested { coord: cc(2, 2) },
            UpdateMessage::LightRefreshRequested { coord: cc(3, 3) },
            UpdateMessage::ObserverMoved { tile: cc(1, 1) },
            UpdateMessage::ObserverMoved { tile: cc(4, 1) },
        ],
        &w,
    );
    assert_eq!(d.observer, Some(cc(4, 1)));
    assert_eq!(w.counts(), [0, 0, 1, 1]);
    // the rebuild is still queued on the worker
    drain_msgs(
        vec![UpdateMessage::LightRefreshRequested { coord: cc(2, 2) }],
        &w,
    );
    assert_eq!(w.counts(), [0, 0, 1, 1]);
    assert!(w.is_queued(Bucket::Light, cc(3, 3)));
}

const SIZE: usize = 4;
const HEIGHT: usize = 8;

struct Floor;

impl ChunkSource for Floor {
    fn request_chunk(&self, coord: ChunkCoord, sink: ChunkSink) {
        let mut chunk = Chunk::empty(coord, SIZE, HEIGHT);
        chunk.fill_layers(1, BEDROCK);
        sink.post_chunk(chunk);
    }
}

fn runtime() -> Runtime {
    let store = BlockStore::new(
        WindowDims::new(SIZE, 4, HEIGHT),
        Arc::new(BlockRegistry::new()),
    );
    Runtime::new(
        store,
        Arc::new(Floor),
        AtlasLayout::default(),
        RuntimeConfig {
            stop_timeout: Duration::from_secs(5),
            ..RuntimeConfig::default()
        },
    )
}

fn built(events: &[MeshEvent]) -> HashSet<ChunkCoord> {
    events
        .iter()
        .filter_map(|e| match e {
            MeshEvent::Built(m) => Some(m.coord),
            MeshEvent::Unloaded { .. } => None,
        })
        .collect()
}

#[test]
fn pump_loads_and_meshes_whole_window() {
    let rt = runtime();
    rt.request_window();
    rt.pump_until_idle(64);
    assert!(rt.worker().is_empty());
    let events = rt.drain_mesh_events();
    assert_eq!(built(&events).len(), 16);
    let world = rt.read();
    assert_eq!(world.store.get_block(0, 0, 0), BEDROCK);
    assert_eq!(world.lighting.sample(&world.store, 1, 3, 1), (15, 0));
    let stats = rt.stats();
    assert_eq!(stats.failed, 0);
    assert!(stats.meshes_built >= 16);
}

#[test]
fn wrong_sized_chunk_fails_its_task_only() {
    let rt = runtime();
    rt.post(UpdateMessage::ChunkArrived {
        chunk: Chunk::empty(cc(0, 0), SIZE + 1, HEIGHT),
    });
    rt.pump();
    assert_eq!(rt.stats().failed, 1);
    assert!(rt.drain_mesh_events().is_empty());
}

#[test]
fn edits_spilling_into_another_chunk_rebuild_it() {
    let rt = runtime();
    rt.request_window();
    rt.pump_until_idle(64);
    rt.drain_mesh_events();
    // grouped under (0, 0), but the second cell lives in (1, 0), away from any border
    rt.post(UpdateMessage::BlocksEdited {
        coord: cc(0, 0),
        edits: vec![
            BlockEdit::new(1, 2, 1, BEDROCK),
            BlockEdit::new(6, 2, 1, BEDROCK),
        ],
    });
    rt.pump();
    assert_eq!(rt.last_rebuilds(), vec![cc(0, 0)]);
    let events = rt.drain_mesh_events();
    assert!(built(&events).contains(&cc(0, 0)));
    assert!(built(&events).contains(&cc(1, 0)));
    assert_eq!(rt.read().store.get_block(6, 2, 1), BEDROCK);
}

#[test]
fn unchanged_edits_add_no_rebuilds() {
    let rt = runtime();
    rt.request_window();
    rt.pump_until_idle(64);
    rt.drain_mesh_events();
    // the floor is already bedrock
    rt.post(UpdateMessage::BlocksEdited {
        coord: cc(0, 0),
        edits: vec![BlockEdit::new(6, 0, 1, BEDROCK)],
    });
    rt.pump();
    let events = rt.drain_mesh_events();
    assert!(!built(&events).contains(&cc(1, 0)));
}

#[test]
fn observer_move_unloads_and_requests() {
    let rt = runtime();
    rt.request_window();
    rt.pump_until_idle(64);
    rt.drain_mesh_events();
    rt.post(UpdateMessage::ObserverMoved { tile: cc(1, 0) });
    rt.pump_until_idle(64);
    let events = rt.drain_mesh_events();
    let unloaded: Vec<ChunkCoord> = events
        .iter()
        .filter_map(|e| match e {
            MeshEvent::Unloaded { coord } => Some(*coord),
            MeshEvent::Built(_) => None,
        })
        .collect();
    assert_eq!(unloaded.len(), 4);
    assert!(unloaded.iter().all(|c| c.cx == -2));
    assert!(built(&events).contains(&cc(2, 0)));
    // the new min edge is relit without its departed neighbours
    assert!(built(&events).contains(&cc(-1, 0)));
    assert_eq!(rt.read().store.get_block(8, 0, 0), BEDROCK);
}

#[test]
fn threads_start_and_stop() {
    let mut rt = runtime();
    rt.start_threads().expect("spawn");
    assert!(rt.threads_running());
    rt.request_window();
    let deadline = Instant::now() + Duration::from_secs(10);
    let mut seen = HashSet::new();
    while seen.len() < 16 && Instant::now() < deadline {
        seen.extend(built(&rt.drain_mesh_events()));
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(seen.len(), 16);
    assert!(rt.stop_threads());
    assert!(!rt.threads_running());
    assert!(rt.stop_threads());
}
