use std::sync::Arc;

use toroid_blocks::{BlockId, Orientation};
use toroid_chunk::{Chunk, ChunkCoord};

use crate::mailbox::Mailbox;
use crate::pipeline::UpdateMessage;

/// Handle a data source uses to deliver chunks, from any thread, at any later time.
#[derive(Clone)]
pub struct ChunkSink {
    updates: Arc<Mailbox<UpdateMessage>>,
}

impl ChunkSink {
    pub fn new(updates: Arc<Mailbox<UpdateMessage>>) -> Self {
        Self { updates }
    }

    pub fn post_chunk(&self, chunk: Chunk) {
        self.updates.push(UpdateMessage::ChunkArrived { chunk });
    }
}

/// Supplies chunk contents and receives block writes (persistence, generation, network).
pub trait ChunkSource: Send + Sync {
    /// Called when `coord` enters the window. Delivery may be synchronous or deferred.
    fn request_chunk(&self, coord: ChunkCoord, sink: ChunkSink);

    /// Notification of a block write made through the engine.
    fn set_block(&self, _x: i32, _y: i32, _z: i32, _id: BlockId, _o: Option<Orientation>) {}
}
