//! CPU meshing: hidden-surface removal, per-shape producers and corner shading.
#![forbid(unsafe_code)]

mod build;
mod chunk;
mod emit;
pub mod face;
mod mesh_build;
pub mod shade;


pub use build::{build_chunk_mesh, face_visible};
pub use chunk::ChunkMesh;
pub use emit::{BoxProducer, CrossProducer, EmitCtx, MeshProducer, Producer, emit_shape};
pub use mesh_build::MeshBuild;
pub use shade::MINI_SHADE;
