use toroid_blocks::{Face, Orientation};
use toroid_geom::Vec3;

/// Unit-cube corners of each face, counter-clockwise seen from outside.
const FACE_CORNERS: [[[i32; 3]; 4]; 6] = [
    // PosY
    [[0, 1, 0], [0, 1, 1], [1, 1, 1], [1, 1, 0]],
    // NegY
    [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
    // PosX
    [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]],
    // NegX
    [[0, 0, 0], [0, 0, 1], [0, 1, 1], [0, 1, 0]],
    // PosZ
    [[0, 0, 1], [1, 0, 1], [1, 1, 1], [0, 1, 1]],
    // NegZ
    [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]],
];

#[inline]
pub fn face_corners(face: Face) -> [[i32; 3]; 4] {
    FACE_CORNERS[face.index()]
}

#[inline]
pub fn face_normal(face: Face) -> Vec3 {
    let (x, y, z) = face.delta();
    Vec3::new(x as f32, y as f32, z as f32)
}

/// Texture coordinates in `[0,1]^2` of a face corner; `t` grows downwards on side faces.
#[inline]
pub fn corner_st(face: Face, c: [i32; 3]) -> (f32, f32) {
    let [x, y, z] = c.map(|v| v as f32);
    match face {
        Face::PosY | Face::NegY => (x, z),
        Face::PosX => (1.0 - z, 1.0 - y),
        Face::NegX => (z, 1.0 - y),
        Face::PosZ => (x, 1.0 - y),
        Face::NegZ => (1.0 - x, 1.0 - y),
    }
}

/// Rotates a cell-local point about the cell centre so the logical front (`-Z`) faces the
/// orientation's direction.
pub fn orient_point(o: Orientation, p: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = [p[0] - 0.5, p[1] - 0.5, p[2] - 0.5];
    let [rx, ry, rz] = match o {
        Orientation::North => [x, y, z],
        Orientation::South => [-x, y, -z],
        Orientation::East => [-z, y, x],
        Orientation::West => [z, y, -x],
        Orientation::Up => [x, -z, y],
        Orientation::Down => [x, z, -y],
    };
    [rx + 0.5, ry + 0.5, rz + 0.5]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_wind_counter_clockwise_around_the_normal() {
        for face in Face::ALL {
            let c = face_corners(face).map(|v| Vec3::new(v[0] as f32, v[1] as f32, v[2] as f32));
            let n = (c[1] - c[0]).cross(c[2] - c[0]);
            assert_eq!(n.normalized(), face_normal(face), "{face:?}");
        }
    }

    #[test]
    fn orientation_rotation_matches_logical_faces() {
        // The point at the centre of the logical front face must land on the physical front.
        let front = [0.5, 0.5, 0.0];
        for bits in 0..6 {
            let o = Orientation::from_bits(bits);
            let p = orient_point(o, front);
            let (dx, dy, dz) = o.front().delta();
            let expect = [
                0.5 + dx as f32 * 0.5,
                0.5 + dy as f32 * 0.5,
                0.5 + dz as f32 * 0.5,
            ];
            assert_eq!(p, expect, "{o:?}");
        }
    }
}
