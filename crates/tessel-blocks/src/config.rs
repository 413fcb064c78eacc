use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level TOML document for lookup tables.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TablesConfig {
    #[serde(default)]
    pub materials: BTreeMap<String, MaterialDef>,
    #[serde(default)]
    pub voxels: Vec<VoxelDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MaterialDef {
    #[serde(default = "white")]
    pub color: [f32; 3],
    #[serde(default)]
    pub atlas_index: Option<u32>,
    /// Terrain group name; materials without one land in the default group.
    #[serde(default)]
    pub terrain: Option<String>,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            color: white(),
            atlas_index: None,
            terrain: None,
        }
    }
}

fn white() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn yes() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
pub struct VoxelDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default = "yes")]
    pub solid: bool,
    #[serde(default = "yes")]
    pub opaque: bool,
    /// Material for every face unless overridden below.
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub top: Option<String>,
    #[serde(default)]
    pub bottom: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
}

impl VoxelDef {
    /// Opaque solid voxel using one material on all faces.
    pub fn cube(name: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            solid: true,
            opaque: true,
            material: Some(material.into()),
            top: None,
            bottom: None,
            side: None,
        }
    }

    /// Material name for face direction `dir` (0..6 = +x,-x,+y,-y,+z,-z).
    pub fn material_for_dir(&self, dir: usize) -> Option<&str> {
        let pick = match dir {
            2 => self.top.as_ref(),
            3 => self.bottom.as_ref(),
            _ => self.side.as_ref(),
        };
        pick.or(self.material.as_ref()).map(String::as_str)
    }
}
