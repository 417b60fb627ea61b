use serde::Deserialize;

/// Root of `blocks.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlocksConfig {
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    /// Atlas tile used for ids that are never defined.
    pub missing_tile: Option<u16>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlockDef {
    pub name: String,
    pub id: Option<u8>,
    pub solid: Option<bool>,
    pub pickable: Option<bool>,
    pub collidable: Option<bool>,
    pub semi_transparent: Option<bool>,
    pub water: Option<bool>,
    pub emits_light: Option<bool>,
    pub shape: Option<ShapeConfig>,
    pub tiles: Option<TilesDef>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ShapeConfig {
    /// `"cube"`, `"cross"` or `"none"`.
    Simple(String),
    Mesh { mesh: MeshDef },
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MeshDef {
    pub positions: Vec<[f32; 3]>,
    #[serde(default)]
    pub uvs: Vec<[f32; 2]>,
    /// Empty means sequential (non-indexed) triangles.
    #[serde(default)]
    pub indices: Vec<u32>,
}

/// Atlas tiles per logical face. More specific keys win over `all`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TilesDef {
    pub all: Option<u16>,
    pub top: Option<u16>,
    pub bottom: Option<u16>,
    pub side: Option<u16>,
    pub front: Option<u16>,
}
