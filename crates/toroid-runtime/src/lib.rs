//! Streaming pipeline: mailboxes, the task scheduler and the consumer threads.
#![forbid(unsafe_code)]

mod error;
mod executor;
mod mailbox;
mod pipeline;
mod runtime;
mod source;
mod stats;
mod task;
mod worker;

#[cfg(test)]
mod tests;

pub use error::{RuntimeError, TaskError};
pub use executor::{MeshEvent, WorldState};
pub use mailbox::Mailbox;
pub use pipeline::{BlockEdit, Drain, Pipeline, UpdateMessage, WorldTask};
pub use runtime::{Runtime, RuntimeConfig};
pub use source::{ChunkSink, ChunkSource};
pub use stats::StatsSnapshot;
pub use task::{Bucket, Task};
pub use worker::{ExecuteReport, Worker};
