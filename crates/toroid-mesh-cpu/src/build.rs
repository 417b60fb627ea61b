use toroid_blocks::{AIR, AtlasLayout, BlockId, BlockRegistry, Face, Shape};
use toroid_chunk::ChunkCoord;
use toroid_geom::{Aabb, Vec3};
use toroid_lighting::LightField;
use toroid_world::BlockStore;

use crate::chunk::ChunkMesh;
use crate::emit::{EmitCtx, emit_shape};
use crate::mesh_build::MeshBuild;

/// Whether the face of `this` towards neighbour `nb` is exposed.
///
/// Exposed when the neighbour is empty or non-solid, does not fill its cell, or is
/// semi-transparent while this block is opaque.
#[inline]
pub fn face_visible(reg: &BlockRegistry, this: BlockId, nb: BlockId) -> bool {
    if nb == AIR || !reg.is_solid(nb) || !matches!(reg.shape(nb), Shape::Cube) {
        return true;
    }
    reg.is_opaque(this) && reg.is_semi_transparent(nb)
}

/// Builds the mesh of chunk `c` from the store and the resolved read buffers. Returns `None`
/// when the chunk is outside the window.
pub fn build_chunk_mesh(
    store: &BlockStore,
    light: &LightField,
    c: ChunkCoord,
    atlas: &AtlasLayout,
) -> Option<ChunkMesh> {
    if !store.contains_chunk(c) {
        return None;
    }
    let reg = store.registry();
    let cs = store.chunk_size();
    let h = store.height();
    let (bx, bz) = (c.cx * cs, c.cz * cs);
    let mut opaque = MeshBuild::default();
    let mut translucent = MeshBuild::default();
    for lz in 0..cs {
        for y in 0..h {
            for lx in 0..cs {
                let (x, z) = (bx + lx, bz + lz);
                let i = store.wrap_index(x, y, z);
                let id = store.block_at(i);
                let shape = reg.shape(id);
                if id == AIR || matches!(shape, Shape::None) {
                    continue;
                }
                let mut visible = [false; 6];
                for face in Face::ALL {
                    let (dx, dy, dz) = face.delta();
                    let (nx, ny, nz) = (x + dx, y + dy, z + dz);
                    // above the world is open sky
                    let nb = if ny >= h { AIR } else { store.get_block(nx, ny, nz) };
                    visible[face.index()] = face_visible(reg, id, nb);
                }
                if !visible.iter().any(|&v| v) {
                    continue;
                }
                let out = if reg.is_semi_transparent(id) || reg.is_water(id) {
                    &mut translucent
                } else {
                    &mut opaque
                };
                let mut ctx = EmitCtx {
                    store,
                    light,
                    reg,
                    atlas,
                    cell: (x, y, z),
                    id,
                    orientation: store.orientation(x, y, z),
                    visible,
                    out,
                };
                emit_shape(shape, &mut ctx);
            }
        }
    }
    let bbox = Aabb::new(
        Vec3::new(bx as f32, 0.0, bz as f32),
        Vec3::new((bx + cs) as f32, h as f32, (bz + cs) as f32),
    );
    log::trace!(
        target: "mesh",
        "chunk ({}, {}) meshed: {} opaque / {} translucent indices",
        c.cx,
        c.cz,
        opaque.index_count(),
        translucent.index_count()
    );
    Some(ChunkMesh {
        coord: c,
        bbox,
        opaque,
        translucent,
    })
}
