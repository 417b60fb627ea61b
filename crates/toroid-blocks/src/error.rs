use std::path::PathBuf;

use thiserror::Error;

/// Fatal configuration errors raised while compiling the block table.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid blocks config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("block id {id} defined twice ({first} and {second})")]
    DuplicateId { id: u8, first: String, second: String },
    #[error("more than 256 block definitions")]
    TooManyBlocks,
    #[error("block `{0}` cannot use id 0, which is reserved for air")]
    ReservedAir(String),
    #[error("block `{block}` has unknown shape `{shape}`")]
    UnknownShape { block: String, shape: String },
    #[error("mesh of block `{block}` is not a triangle list ({len} indices)")]
    NonTriangleMesh { block: String, len: usize },
    #[error("mesh of block `{block}` references vertex {index} of {vertices}")]
    MeshIndexOutOfRange {
        block: String,
        index: u32,
        vertices: usize,
    },
    #[error("mesh of block `{block}` has {uvs} uvs for {vertices} vertices")]
    MeshUvMismatch {
        block: String,
        uvs: usize,
        vertices: usize,
    },
}
