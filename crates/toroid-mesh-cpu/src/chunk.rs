use toroid_chunk::ChunkCoord;
use toroid_geom::Aabb;

use crate::mesh_build::MeshBuild;

/// Renderable geometry of one chunk column: opaque and semi-transparent streams.
#[derive(Clone, Debug)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub bbox: Aabb,
    pub opaque: MeshBuild,
    pub translucent: MeshBuild,
}

impl ChunkMesh {
    pub fn quad_estimate(&self) -> usize {
        (self.opaque.index_count() + self.translucent.index_count()) / 6
    }

    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.translucent.is_empty()
    }
}
