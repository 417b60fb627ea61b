use toroid_blocks::{AtlasLayout, BlockId, BlockRegistry, Face, Orientation, Shape, StaticMesh};
use toroid_geom::Vec3;
use toroid_lighting::{LightField, MAX_LIGHT};
use toroid_world::BlockStore;

use crate::face::{corner_st, face_corners, orient_point};
use crate::mesh_build::MeshBuild;
use crate::shade::{occlusion, shade_factor};

/// Everything a producer needs to emit one cell. Visibility has already been decided by the
/// builder; producers only write geometry.
pub struct EmitCtx<'a> {
    pub store: &'a BlockStore,
    pub light: &'a LightField,
    pub reg: &'a BlockRegistry,
    pub atlas: &'a AtlasLayout,
    pub cell: (i32, i32, i32),
    pub id: BlockId,
    pub orientation: Orientation,
    /// Per physical face: whether the face is exposed.
    pub visible: [bool; 6],
    pub out: &'a mut MeshBuild,
}

impl EmitCtx<'_> {
    #[inline]
    fn uv_rect(&self, logical: Face) -> [f32; 4] {
        self.atlas.uv_rect(self.reg.tile(self.id, logical))
    }

    // Own-cell light, used by shapes that do not line up with cell corners.
    fn cell_colour(&self) -> [f32; 2] {
        let (x, y, z) = self.cell;
        let (s, l) = self.light.sample(self.store, x, y, z);
        [s as f32 / MAX_LIGHT as f32, l as f32 / MAX_LIGHT as f32]
    }
}

/// Geometry producer for one block shape.
pub trait Producer {
    fn emit(&self, ctx: &mut EmitCtx<'_>);
}

/// Unit cube; one quad per visible face with corner light and mini-shade.
pub struct BoxProducer;

/// Two crossed diagonal quads, drawn from both sides.
pub struct CrossProducer;

/// Static triangle mesh rotated by the cell orientation.
pub struct MeshProducer<'m>(pub &'m StaticMesh);

impl Producer for BoxProducer {
    fn emit(&self, ctx: &mut EmitCtx<'_>) {
        let (x, y, z) = ctx.cell;
        for face in Face::ALL {
            if !ctx.visible[face.index()] {
                continue;
            }
            let [u0, v0, u1, v1] = ctx.uv_rect(ctx.orientation.logical_face(face));
            let corners = face_corners(face);
            let mut pos = [Vec3::ZERO; 4];
            let mut uvs = [[0.0; 2]; 4];
            let mut cols = [[0.0; 2]; 4];
            for (k, c) in corners.into_iter().enumerate() {
                let (cx, cy, cz) = (x + c[0], y + c[1], z + c[2]);
                pos[k] = Vec3::new(cx as f32, cy as f32, cz as f32);
                let (s, t) = corner_st(face, c);
                uvs[k] = [u0 + s * (u1 - u0), v0 + t * (v1 - v0)];
                let (sky, local) = ctx.light.corner(cx, cy, cz);
                let shade = shade_factor(occlusion(ctx.store, ctx.cell, face, c));
                cols[k] = [
                    sky as f32 / MAX_LIGHT as f32 * shade,
                    local as f32 / MAX_LIGHT as f32 * shade,
                ];
            }
            ctx.out.add_quad(pos, uvs, cols);
        }
    }
}

const CROSS_QUADS: [[[f32; 3]; 4]; 2] = [
    [[0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
];

impl Producer for CrossProducer {
    fn emit(&self, ctx: &mut EmitCtx<'_>) {
        let (x, y, z) = ctx.cell;
        let base = Vec3::new(x as f32, y as f32, z as f32);
        let [u0, v0, u1, v1] = ctx.uv_rect(Face::PosX);
        let col = ctx.cell_colour();
        let front_uv = [[u0, v1], [u1, v1], [u1, v0], [u0, v0]];
        for quad in CROSS_QUADS {
            let pos = quad.map(|p| base + Vec3::from(p));
            ctx.out.add_quad(pos, front_uv, [col; 4]);
            // back side: reversed winding
            let back = [pos[0], pos[3], pos[2], pos[1]];
            let back_uv = [front_uv[0], front_uv[3], front_uv[2], front_uv[1]];
            ctx.out.add_quad(back, back_uv, [col; 4]);
        }
    }
}

impl Producer for MeshProducer<'_> {
    fn emit(&self, ctx: &mut EmitCtx<'_>) {
        let (x, y, z) = ctx.cell;
        let base = Vec3::new(x as f32, y as f32, z as f32);
        let [u0, v0, u1, v1] = ctx.uv_rect(Face::PosX);
        let o = ctx.orientation;
        let pos: Vec<Vec3> = self
            .0
            .positions
            .iter()
            .map(|p| base + Vec3::from(orient_point(o, *p)))
            .collect();
        let uvs: Vec<[f32; 2]> = self
            .0
            .uvs
            .iter()
            .map(|[u, v]| [u0 + u * (u1 - u0), v0 + v * (v1 - v0)])
            .collect();
        let col = ctx.cell_colour();
        ctx.out.add_triangles(&pos, &uvs, &self.0.indices, col);
    }
}

/// Runs the producer selected by the block's shape.
pub fn emit_shape(shape: &Shape, ctx: &mut EmitCtx<'_>) {
    match shape {
        Shape::None => {}
        Shape::Cube => BoxProducer.emit(ctx),
        Shape::Cross => CrossProducer.emit(ctx),
        Shape::Mesh(mesh) => MeshProducer(mesh).emit(ctx),
    }
}
