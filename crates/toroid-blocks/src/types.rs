use std::sync::Arc;

pub type BlockId = u8;

/// Empty cell.
pub const AIR: BlockId = 0;
/// Returned for every coordinate outside the loaded window.
pub const BEDROCK: BlockId = 1;

/// `extra` byte layout: low 3 bits orientation, bit 3 local-light emitter.
pub const EXTRA_ORIENTATION_MASK: u8 = 0b0111;
pub const EXTRA_EMITTER_BIT: u8 = 0b1000;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Integer grid delta when stepping out through this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::PosY => (0, 1, 0),
            Face::NegY => (0, -1, 0),
            Face::PosX => (1, 0, 0),
            Face::NegX => (-1, 0, 0),
            Face::PosZ => (0, 0, 1),
            Face::NegZ => (0, 0, -1),
        }
    }
}

/// Direction a block's front (logical `NegZ`) points to in the world.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Orientation {
    #[default]
    North = 0,
    South = 1,
    East = 2,
    West = 3,
    Up = 4,
    Down = 5,
}

use Face::{NegX, NegY, NegZ, PosX, PosY, PosZ};

// [orientation][physical face] -> logical face
const LOGICAL_FACE: [[Face; 6]; 6] = [
    // North (identity)
    [PosY, NegY, PosX, NegX, PosZ, NegZ],
    // South: half turn about Y
    [PosY, NegY, NegX, PosX, NegZ, PosZ],
    // East: front faces +X
    [PosY, NegY, NegZ, PosZ, PosX, NegX],
    // West: front faces -X
    [PosY, NegY, PosZ, NegZ, NegX, PosX],
    // Up: front faces +Y
    [NegZ, PosZ, PosX, NegX, PosY, NegY],
    // Down: front faces -Y
    [PosZ, NegZ, PosX, NegX, NegY, PosY],
];

impl Orientation {
    #[inline]
    pub fn from_bits(bits: u8) -> Orientation {
        match bits & EXTRA_ORIENTATION_MASK {
            1 => Orientation::South,
            2 => Orientation::East,
            3 => Orientation::West,
            4 => Orientation::Up,
            5 => Orientation::Down,
            _ => Orientation::North,
        }
    }

    /// Orientation stored in a cell's `extra` byte.
    #[inline]
    pub fn from_extra(extra: u8) -> Orientation {
        Self::from_bits(extra)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Maps a physical (world) face to the block's logical face.
    #[inline]
    pub fn logical_face(self, physical: Face) -> Face {
        LOGICAL_FACE[self as usize][physical.index()]
    }

    /// Physical face the block front points through.
    pub fn front(self) -> Face {
        Face::ALL
            .into_iter()
            .find(|&f| self.logical_face(f) == Face::NegZ)
            .unwrap_or(Face::NegZ)
    }
}

/// Triangle list in cell-local space (`[0,1]^3`), validated at registry build time.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticMesh {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

/// Geometry producer selected for a block id.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Shape {
    /// No geometry (air).
    #[default]
    None,
    /// Unit cube with per-face culling.
    Cube,
    /// Two crossed diagonal billboards.
    Cross,
    /// Arbitrary static triangle mesh.
    Mesh(Arc<StaticMesh>),
}
