//! Infinite chunked voxel world: toroidal block window, streaming task pipeline, flood-fill
//! lighting, surface meshing and grid ray tracing.
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod raycast;
pub mod source;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use raycast::{TraceParams, TraceResult, trace};
pub use source::{FlatSource, NoiseSource};

pub use toroid_blocks::{AIR, BEDROCK, BlockId, BlockRegistry, Orientation};
pub use toroid_chunk::{Chunk, ChunkCoord};
pub use toroid_geom::Vec3;
pub use toroid_mesh_cpu::ChunkMesh;
pub use toroid_runtime::{BlockEdit, ChunkSink, ChunkSource, MeshEvent, StatsSnapshot};
pub use toroid_world::WindowDims;
