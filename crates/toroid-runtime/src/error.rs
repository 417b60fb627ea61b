use std::io;

use thiserror::Error;
use toroid_chunk::ChunkCoord;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("chunk ({}, {}) is {size}x{height}, window expects {expect_size}x{expect_height}", .coord.cx, .coord.cz)]
    ChunkShape {
        coord: ChunkCoord,
        size: usize,
        height: usize,
        expect_size: usize,
        expect_height: usize,
    },
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}
