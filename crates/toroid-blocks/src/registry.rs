use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use bitflags::bitflags;

use crate::atlas::TileTable;
use crate::config::{BlockDef, BlocksConfig, MeshDef, ShapeConfig, TilesDef};
use crate::error::RegistryError;
use crate::types::{AIR, BEDROCK, BlockId, Face, Shape, StaticMesh};

bitflags! {
    /// Precomputed per-id flags; the lighting and meshing hot loops only touch these.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct BlockFlags: u8 {
        const SOLID = 1 << 0;
        /// Blocks light entirely (solid, not semi-transparent, not water).
        const OPAQUE = 1 << 1;
        const SEMI_TRANSPARENT = 1 << 2;
        const WATER = 1 << 3;
        const PICKABLE = 1 << 4;
        const COLLIDABLE = 1 << 5;
        const EMITS_LIGHT = 1 << 6;
    }
}

#[derive(Clone, Debug)]
pub struct BlockType {
    pub id: BlockId,
    pub name: String,
    pub flags: BlockFlags,
    pub shape: Shape,
}

impl BlockType {
    fn air() -> Self {
        BlockType {
            id: AIR,
            name: "air".into(),
            flags: BlockFlags::empty(),
            shape: Shape::None,
        }
    }

    fn bedrock() -> Self {
        BlockType {
            id: BEDROCK,
            name: "bedrock".into(),
            flags: BlockFlags::SOLID
                | BlockFlags::OPAQUE
                | BlockFlags::PICKABLE
                | BlockFlags::COLLIDABLE,
            shape: Shape::Cube,
        }
    }

    // Undefined ids behave like an opaque cube so stray data stays visible.
    fn placeholder(id: BlockId) -> Self {
        BlockType {
            id,
            name: String::new(),
            ..Self::bedrock()
        }
    }
}

/// Read-only metadata table covering the whole 0–255 id space.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    blocks: Vec<BlockType>,
    flags: [BlockFlags; 256],
    tiles: TileTable,
    by_name: HashMap<String, BlockId>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockRegistry {
    /// Table holding only air (0) and bedrock (1).
    pub fn new() -> Self {
        let mut blocks: Vec<BlockType> = (0..=255u8).map(BlockType::placeholder).collect();
        blocks[AIR as usize] = BlockType::air();
        blocks[BEDROCK as usize] = BlockType::bedrock();
        let mut reg = BlockRegistry {
            blocks,
            flags: [BlockFlags::empty(); 256],
            tiles: TileTable::default(),
            by_name: HashMap::new(),
        };
        reg.reindex();
        reg
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, RegistryError> {
        let cfg: BlocksConfig = toml::from_str(text)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, RegistryError> {
        if cfg.blocks.len() > 256 {
            return Err(RegistryError::TooManyBlocks);
        }
        let mut reg = Self::new();
        reg.tiles = TileTable::new(cfg.missing_tile.unwrap_or(0));
        let mut defined: HashMap<BlockId, String> = HashMap::new();
        let mut next_id: u16 = 2;
        for def in cfg.blocks.into_iter() {
            let id = match def.id {
                Some(id) => id,
                None => {
                    while next_id < 256 && defined.contains_key(&(next_id as u8)) {
                        next_id += 1;
                    }
                    if next_id >= 256 {
                        return Err(RegistryError::TooManyBlocks);
                    }
                    next_id as u8
                }
            };
            if id == AIR && def.name != "air" {
                return Err(RegistryError::ReservedAir(def.name));
            }
            if let Some(first) = defined.get(&id) {
                return Err(RegistryError::DuplicateId {
                    id,
                    first: first.clone(),
                    second: def.name,
                });
            }
            defined.insert(id, def.name.clone());
            if id == AIR {
                continue;
            }
            if let Some(tiles) = def.tiles.as_ref() {
                reg.tiles.set(id, compile_tiles(tiles));
            }
            reg.blocks[id as usize] = compile_block(id, def)?;
        }
        reg.reindex();
        Ok(reg)
    }

    fn reindex(&mut self) {
        for ty in &self.blocks {
            self.flags[ty.id as usize] = ty.flags;
        }
        self.by_name = self
            .blocks
            .iter()
            .filter(|t| !t.name.is_empty())
            .map(|t| (t.name.clone(), t.id))
            .collect();
    }

    #[inline]
    pub fn get(&self, id: BlockId) -> &BlockType {
        &self.blocks[id as usize]
    }

    pub fn id_by_name(&self, name: &str) -> Option<BlockId> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn flags(&self, id: BlockId) -> BlockFlags {
        self.flags[id as usize]
    }

    #[inline]
    pub fn is_solid(&self, id: BlockId) -> bool {
        self.flags(id).contains(BlockFlags::SOLID)
    }

    /// Light-opaque: stops both light channels and sky columns.
    #[inline]
    pub fn is_opaque(&self, id: BlockId) -> bool {
        self.flags(id).contains(BlockFlags::OPAQUE)
    }

    #[inline]
    pub fn is_semi_transparent(&self, id: BlockId) -> bool {
        self.flags(id).contains(BlockFlags::SEMI_TRANSPARENT)
    }

    #[inline]
    pub fn is_water(&self, id: BlockId) -> bool {
        self.flags(id).contains(BlockFlags::WATER)
    }

    #[inline]
    pub fn is_pickable(&self, id: BlockId) -> bool {
        self.flags(id).contains(BlockFlags::PICKABLE)
    }

    #[inline]
    pub fn is_collidable(&self, id: BlockId) -> bool {
        self.flags(id).contains(BlockFlags::COLLIDABLE)
    }

    #[inline]
    pub fn emits_light(&self, id: BlockId) -> bool {
        self.flags(id).contains(BlockFlags::EMITS_LIGHT)
    }

    #[inline]
    pub fn shape(&self, id: BlockId) -> &Shape {
        &self.blocks[id as usize].shape
    }

    #[inline]
    pub fn tiles(&self) -> &TileTable {
        &self.tiles
    }

    /// Atlas tile for a block id and logical face.
    #[inline]
    pub fn tile(&self, id: BlockId, logical: Face) -> u16 {
        self.tiles.tile(id, logical)
    }
}

fn compile_block(id: BlockId, def: BlockDef) -> Result<BlockType, RegistryError> {
    let shape = compile_shape(&def.name, def.shape.as_ref())?;
    let has_geometry = !matches!(shape, Shape::None);
    let solid = def.solid.unwrap_or(has_geometry);
    let semi = def.semi_transparent.unwrap_or(false);
    let water = def.water.unwrap_or(false);
    let mut flags = BlockFlags::empty();
    flags.set(BlockFlags::SOLID, solid);
    flags.set(BlockFlags::SEMI_TRANSPARENT, semi);
    flags.set(BlockFlags::WATER, water);
    flags.set(
        BlockFlags::OPAQUE,
        solid && !semi && !water && matches!(shape, Shape::Cube),
    );
    flags.set(BlockFlags::PICKABLE, def.pickable.unwrap_or(solid || water));
    flags.set(BlockFlags::COLLIDABLE, def.collidable.unwrap_or(solid && !water));
    flags.set(BlockFlags::EMITS_LIGHT, def.emits_light.unwrap_or(false));
    Ok(BlockType {
        id,
        name: def.name,
        flags,
        shape,
    })
}

fn compile_shape(block: &str, cfg: Option<&ShapeConfig>) -> Result<Shape, RegistryError> {
    match cfg {
        None => Ok(Shape::Cube),
        Some(ShapeConfig::Simple(s)) => match s.as_str() {
            "cube" => Ok(Shape::Cube),
            "cross" => Ok(Shape::Cross),
            "none" => Ok(Shape::None),
            other => Err(RegistryError::UnknownShape {
                block: block.to_string(),
                shape: other.to_string(),
            }),
        },
        Some(ShapeConfig::Mesh { mesh }) => Ok(Shape::Mesh(Arc::new(compile_mesh(block, mesh)?))),
    }
}

/// Validates a static mesh; anything but an indexed or sequential triangle list is rejected.
pub fn compile_mesh(block: &str, def: &MeshDef) -> Result<StaticMesh, RegistryError> {
    let vertices = def.positions.len();
    let indices: Vec<u32> = if def.indices.is_empty() {
        (0..vertices as u32).collect()
    } else {
        def.indices.clone()
    };
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(RegistryError::NonTriangleMesh {
            block: block.to_string(),
            len: indices.len(),
        });
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertices) {
        return Err(RegistryError::MeshIndexOutOfRange {
            block: block.to_string(),
            index: bad,
            vertices,
        });
    }
    let uvs = if def.uvs.is_empty() {
        vec![[0.0, 0.0]; vertices]
    } else if def.uvs.len() == vertices {
        def.uvs.clone()
    } else {
        return Err(RegistryError::MeshUvMismatch {
            block: block.to_string(),
            uvs: def.uvs.len(),
            vertices,
        });
    };
    Ok(StaticMesh {
        positions: def.positions.clone(),
        uvs,
        indices,
    })
}

fn compile_tiles(t: &TilesDef) -> [u16; 6] {
    let all = t.all.unwrap_or(0);
    let side = t.side.unwrap_or(all);
    let mut out = [side; 6];
    out[Face::PosY.index()] = t.top.unwrap_or(all);
    out[Face::NegY.index()] = t.bottom.unwrap_or(all);
    out[Face::NegZ.index()] = t.front.unwrap_or(side);
    out
}
