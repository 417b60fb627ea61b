//! Block metadata table, orientation and atlas tile lookup.
#![forbid(unsafe_code)]

pub mod atlas;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;

pub use atlas::{AtlasLayout, TileTable};
pub use error::RegistryError;
pub use registry::{BlockFlags, BlockRegistry, BlockType};
pub use types::{AIR, BEDROCK, BlockId, Face, Orientation, Shape, StaticMesh};
