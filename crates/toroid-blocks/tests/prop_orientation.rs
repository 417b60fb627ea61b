use proptest::prelude::*;
use toroid_blocks::{AtlasLayout, Face, Orientation};

proptest! {
    // Every orientation remaps the six physical faces onto a permutation of logical faces.
    #[test]
    fn logical_faces_are_a_permutation(bits in 0u8..=255) {
        let o = Orientation::from_extra(bits);
        let mut seen = [false; 6];
        for f in Face::ALL {
            let l = o.logical_face(f);
            prop_assert!(!seen[l.index()]);
            seen[l.index()] = true;
        }
        // Opposite physical faces stay opposite logically.
        for f in Face::ALL {
            let (dx, dy, dz) = f.delta();
            let Some(g) = Face::ALL.into_iter().find(|g| g.delta() == (-dx, -dy, -dz)) else {
                continue;
            };
            let (lx, ly, lz) = o.logical_face(f).delta();
            prop_assert_eq!(o.logical_face(g).delta(), (-lx, -ly, -lz));
        }
    }

    // UV rects are inside the unit square and non-empty.
    #[test]
    fn uv_rects_stay_in_atlas(tile in 0u16..1024, per_row in 1u16..64) {
        let layout = AtlasLayout { tiles_per_row: per_row, inset: 0.001 };
        let [u0, v0, u1, v1] = layout.uv_rect(tile);
        prop_assert!(0.0 <= u0 && u0 < u1 && u1 <= 1.0);
        prop_assert!(0.0 <= v0 && v0 < v1 && v1 <= 1.0);
    }
}

#[test]
fn front_face_follows_orientation() {
    assert_eq!(Orientation::North.front(), Face::NegZ);
    assert_eq!(Orientation::South.front(), Face::PosZ);
    assert_eq!(Orientation::East.front(), Face::PosX);
    assert_eq!(Orientation::West.front(), Face::NegX);
    assert_eq!(Orientation::Up.front(), Face::PosY);
    assert_eq!(Orientation::Down.front(), Face::NegY);
    assert_eq!(Orientation::from_extra(0b1000), Orientation::North);
    assert_eq!(Orientation::from_extra(7), Orientation::North);
}
