use toroid_blocks::Face;
use toroid_world::BlockStore;

/// Brightness factor by number of occluders around a vertex (0..=3).
pub const MINI_SHADE: [f32; 4] = [1.0, 0.8, 0.65, 0.5];

/// Tangent axes of a face plane.
#[inline]
fn tangents(face: Face) -> ((i32, i32, i32), (i32, i32, i32)) {
    match face {
        Face::PosY | Face::NegY => ((1, 0, 0), (0, 0, 1)),
        Face::PosX | Face::NegX => ((0, 1, 0), (0, 0, 1)),
        Face::PosZ | Face::NegZ => ((1, 0, 0), (0, 1, 0)),
    }
}

#[inline]
fn occludes(store: &BlockStore, x: i32, y: i32, z: i32) -> bool {
    y >= 0 && y < store.height() && store.is_opaque(x, y, z)
}

/// Occluder count for the vertex of `face` of cell `(x, y, z)` at cube corner `c`.
///
/// Looks at the two side cells and the diagonal cell in the layer in front of the face; two
/// occupied sides count as fully occluded regardless of the diagonal.
pub fn occlusion(store: &BlockStore, (x, y, z): (i32, i32, i32), face: Face, c: [i32; 3]) -> usize {
    let (dx, dy, dz) = face.delta();
    let (ox, oy, oz) = (x + dx, y + dy, z + dz);
    let (u, v) = tangents(face);
    let pick = |axis: (i32, i32, i32)| {
        let along = axis.0 * c[0] + axis.1 * c[1] + axis.2 * c[2];
        if along == 0 { -1 } else { 1 }
    };
    let (su, sv) = (pick(u), pick(v));
    let side1 = occludes(store, ox + u.0 * su, oy + u.1 * su, oz + u.2 * su);
    let side2 = occludes(store, ox + v.0 * sv, oy + v.1 * sv, oz + v.2 * sv);
    if side1 && side2 {
        return 3;
    }
    let corner = occludes(
        store,
        ox + u.0 * su + v.0 * sv,
        oy + u.1 * su + v.1 * sv,
        oz + u.2 * su + v.2 * sv,
    );
    side1 as usize + side2 as usize + corner as usize
}

#[inline]
pub fn shade_factor(occluders: usize) -> f32 {
    MINI_SHADE[occluders.min(3)]
}
