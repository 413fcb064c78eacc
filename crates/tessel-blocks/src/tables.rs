use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use crate::config::{MaterialDef, TablesConfig, VoxelDef};
use crate::error::TablesError;
use crate::types::{AIR, FACE_DIRS, MaterialId, TerrainId, VoxelId};

const DEFAULT_TERRAIN: &str = "default";
const AIR_NAME: &str = "air";
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];

/// Flat, read-only lookup tables indexed by voxel or material id.
///
/// Built once (see [`MeshTablesBuilder`]) and shared by every meshing call,
/// typically behind an `Arc`. Ids that were never registered resolve to
/// air-like defaults: not solid, not opaque, no material, default terrain
/// group, white.
#[derive(Clone, Debug)]
pub struct MeshTables {
    solid: Vec<bool>,
    opaque: Vec<bool>,
    face_material: Vec<MaterialId>,
    terrain_of: Vec<TerrainId>,
    atlas_index: Vec<Option<u32>>,
    base_color: Vec<[f32; 3]>,
    voxel_by_name: HashMap<String, VoxelId>,
    material_by_name: HashMap<String, MaterialId>,
    terrain_names: Vec<String>,
}

impl MeshTables {
    pub fn builder() -> MeshTablesBuilder {
        MeshTablesBuilder::new()
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, TablesError> {
        let cfg: TablesConfig = toml::from_str(toml_str)?;
        MeshTablesBuilder::from_config(cfg).build()
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, TablesError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    #[inline]
    pub fn is_solid(&self, id: VoxelId) -> bool {
        self.solid.get(id as usize).copied().unwrap_or(false)
    }

    #[inline]
    pub fn is_opaque(&self, id: VoxelId) -> bool {
        self.opaque.get(id as usize).copied().unwrap_or(false)
    }

    /// Material drawn on face `dir` (0..6 = +x,-x,+y,-y,+z,-z) of voxel `id`.
    #[inline]
    pub fn face_material(&self, id: VoxelId, dir: usize) -> MaterialId {
        debug_assert!(dir < FACE_DIRS);
        self.face_material
            .get(id as usize * FACE_DIRS + dir)
            .copied()
            .unwrap_or(MaterialId::NONE)
    }

    #[inline]
    pub fn terrain_of(&self, mat: MaterialId) -> TerrainId {
        self.terrain_of
            .get(mat.0 as usize)
            .copied()
            .unwrap_or(TerrainId::DEFAULT)
    }

    #[inline]
    pub fn atlas_index(&self, mat: MaterialId) -> Option<u32> {
        self.atlas_index.get(mat.0 as usize).copied().flatten()
    }

    #[inline]
    pub fn base_color(&self, mat: MaterialId) -> [f32; 3] {
        self.base_color.get(mat.0 as usize).copied().unwrap_or(WHITE)
    }

    /// Number of voxel ids covered by the tables (highest id + 1).
    pub fn voxel_count(&self) -> usize {
        self.solid.len()
    }

    /// Number of material ids including the reserved "no material" slot.
    pub fn material_count(&self) -> usize {
        self.terrain_of.len()
    }

    pub fn terrain_count(&self) -> usize {
        self.terrain_names.len()
    }

    pub fn voxel_id(&self, name: &str) -> Option<VoxelId> {
        self.voxel_by_name.get(name).copied()
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.material_by_name.get(name).copied()
    }

    pub fn terrain_id(&self, name: &str) -> Option<TerrainId> {
        self.terrain_names
            .iter()
            .position(|n| n == name)
            .map(|i| TerrainId(i as u16))
    }

    pub fn terrain_name(&self, id: TerrainId) -> Option<&str> {
        self.terrain_names.get(id.0 as usize).map(String::as_str)
    }
}

/// Collects material and voxel definitions and compiles them into [`MeshTables`].
#[derive(Clone, Debug, Default)]
pub struct MeshTablesBuilder {
    materials: BTreeMap<String, MaterialDef>,
    voxels: Vec<VoxelDef>,
}

impl MeshTablesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: TablesConfig) -> Self {
        Self {
            materials: cfg.materials,
            voxels: cfg.voxels,
        }
    }

    pub fn material(mut self, name: impl Into<String>, def: MaterialDef) -> Self {
        self.materials.insert(name.into(), def);
        self
    }

    /// Shorthand for a plain colored material in the default terrain group.
    pub fn color_material(self, name: impl Into<String>, color: [f32; 3]) -> Self {
        self.material(
            name,
            MaterialDef {
                color,
                ..MaterialDef::default()
            },
        )
    }

    pub fn voxel(mut self, def: VoxelDef) -> Self {
        self.voxels.push(def);
        self
    }

    pub fn build(self) -> Result<MeshTables, TablesError> {
        let MeshTablesBuilder { materials, voxels } = self;

        if materials.len() >= u16::MAX as usize {
            return Err(TablesError::TooManyMaterials(materials.len()));
        }

        // Group 0 is always the default group; named groups follow in sorted order.
        let named: BTreeSet<&str> = materials
            .values()
            .filter_map(|m| m.terrain.as_deref())
            .filter(|t| *t != DEFAULT_TERRAIN)
            .collect();
        let mut terrain_names = vec![DEFAULT_TERRAIN.to_string()];
        terrain_names.extend(named.into_iter().map(str::to_string));
        if terrain_names.len() > u16::MAX as usize {
            return Err(TablesError::TooManyTerrainGroups(terrain_names.len()));
        }

        let mat_len = materials.len() + 1;
        let mut terrain_of = Vec::with_capacity(mat_len);
        let mut atlas_index = Vec::with_capacity(mat_len);
        let mut base_color = Vec::with_capacity(mat_len);
        terrain_of.push(TerrainId::DEFAULT);
        atlas_index.push(None);
        base_color.push(WHITE);

        // BTreeMap iteration is sorted, so material ids are stable across loads.
        let mut material_by_name = HashMap::with_capacity(materials.len());
        for (i, (name, def)) in materials.into_iter().enumerate() {
            let id = MaterialId((i + 1) as u16);
            let terrain = match def.terrain.as_deref() {
                None | Some(DEFAULT_TERRAIN) => TerrainId::DEFAULT,
                Some(t) => terrain_names
                    .iter()
                    .position(|n| n == t)
                    .map(|p| TerrainId(p as u16))
                    .unwrap_or(TerrainId::DEFAULT),
            };
            terrain_of.push(terrain);
            atlas_index.push(def.atlas_index);
            base_color.push(def.color);
            material_by_name.insert(name, id);
        }

        let ids = assign_voxel_ids(&voxels)?;
        let voxel_len = ids.iter().map(|&id| id as usize + 1).max().unwrap_or(1);

        let mut solid = vec![false; voxel_len];
        let mut opaque = vec![false; voxel_len];
        let mut face_material = vec![MaterialId::NONE; voxel_len * FACE_DIRS];
        let mut voxel_by_name = HashMap::with_capacity(voxels.len() + 1);
        voxel_by_name.insert(AIR_NAME.to_string(), AIR);

        for (def, &id) in voxels.iter().zip(&ids) {
            if voxel_by_name.insert(def.name.clone(), id).is_some() {
                return Err(TablesError::DuplicateName {
                    kind: "voxel",
                    name: def.name.clone(),
                });
            }
            let ix = id as usize;
            solid[ix] = def.solid;
            opaque[ix] = def.opaque;
            for dir in 0..FACE_DIRS {
                let Some(mat_name) = def.material_for_dir(dir) else {
                    continue;
                };
                let mat = material_by_name.get(mat_name).copied().ok_or_else(|| {
                    TablesError::UnknownMaterial {
                        voxel: def.name.clone(),
                        material: mat_name.to_string(),
                    }
                })?;
                face_material[ix * FACE_DIRS + dir] = mat;
            }
        }

        log::debug!(
            "compiled mesh tables: {} voxel ids, {} materials, {} terrain groups",
            voxel_len,
            mat_len,
            terrain_names.len()
        );

        Ok(MeshTables {
            solid,
            opaque,
            face_material,
            terrain_of,
            atlas_index,
            base_color,
            voxel_by_name,
            material_by_name,
            terrain_names,
        })
    }
}

/// Resolves explicit ids first, then hands out the lowest free ids to the
/// remaining voxels in declaration order.
fn assign_voxel_ids(voxels: &[VoxelDef]) -> Result<Vec<VoxelId>, TablesError> {
    const MAX_IDS: u32 = u16::MAX as u32 + 1;
    let mut ids = vec![AIR; voxels.len()];
    let mut owner: HashMap<VoxelId, &str> = HashMap::from([(AIR, AIR_NAME)]);

    for (slot, def) in voxels.iter().enumerate() {
        let Some(id) = def.id else { continue };
        if id == 0 {
            return Err(TablesError::AirRedefined(def.name.clone()));
        }
        if id >= MAX_IDS {
            return Err(TablesError::VoxelIdOutOfRange {
                name: def.name.clone(),
                id,
                max: MAX_IDS,
            });
        }
        let id = id as VoxelId;
        if let Some(first) = owner.insert(id, def.name.as_str()) {
            return Err(TablesError::DuplicateVoxelId {
                id,
                first: first.to_string(),
                second: def.name.clone(),
            });
        }
        ids[slot] = id;
    }

    let mut next: u32 = 1;
    for (slot, def) in voxels.iter().enumerate() {
        if def.id.is_some() {
            continue;
        }
        while next < MAX_IDS && owner.contains_key(&(next as VoxelId)) {
            next += 1;
        }
        if next >= MAX_IDS {
            return Err(TablesError::VoxelIdOutOfRange {
                name: def.name.clone(),
                id: next,
                max: MAX_IDS,
            });
        }
        let id = next as VoxelId;
        owner.insert(id, def.name.as_str());
        ids[slot] = id;
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MeshTables {
        MeshTables::from_toml_str(
            r#"
            [materials.dirt]
            color = [0.5, 0.3, 0.1]

            [materials.grass_top]
            color = [0.2, 0.8, 0.2]
            atlas_index = 4
            terrain = "atlas"

            [materials.glass]
            terrain = "glass"

            [[voxels]]
            name = "dirt"
            material = "dirt"

            [[voxels]]
            name = "grass"
            material = "dirt"
            top = "grass_top"

            [[voxels]]
            name = "glass"
            id = 9
            opaque = false
            material = "glass"
            "#,
        )
        .expect("tables")
    }

    #[test]
    fn air_is_reserved_and_empty() {
        let t = sample();
        assert_eq!(t.voxel_id("air"), Some(AIR));
        assert!(!t.is_solid(AIR));
        assert!(!t.is_opaque(AIR));
        for dir in 0..FACE_DIRS {
            assert!(t.face_material(AIR, dir).is_none());
        }
    }

    #[test]
    fn implicit_ids_fill_from_one() {
        let t = sample();
        assert_eq!(t.voxel_id("dirt"), Some(1));
        assert_eq!(t.voxel_id("grass"), Some(2));
        assert_eq!(t.voxel_id("glass"), Some(9));
        assert_eq!(t.voxel_count(), 10);
        // Gap ids behave like air
        assert!(!t.is_solid(5));
        assert!(t.face_material(5, 0).is_none());
    }

    #[test]
    fn top_override_only_applies_to_pos_y() {
        let t = sample();
        let grass = t.voxel_id("grass").unwrap();
        let dirt = t.material_id("dirt").unwrap();
        let top = t.material_id("grass_top").unwrap();
        assert_eq!(t.face_material(grass, 2), top);
        for dir in [0, 1, 3, 4, 5] {
            assert_eq!(t.face_material(grass, dir), dirt);
        }
    }

    #[test]
    fn terrain_groups_are_sorted_after_default() {
        let t = sample();
        assert_eq!(t.terrain_name(TerrainId(0)), Some("default"));
        assert_eq!(t.terrain_id("atlas"), Some(TerrainId(1)));
        assert_eq!(t.terrain_id("glass"), Some(TerrainId(2)));
        let top = t.material_id("grass_top").unwrap();
        assert_eq!(t.terrain_of(top), TerrainId(1));
        assert_eq!(t.atlas_index(top), Some(4));
        assert_eq!(t.terrain_of(t.material_id("dirt").unwrap()), TerrainId::DEFAULT);
    }

    #[test]
    fn unknown_ids_resolve_to_defaults() {
        let t = sample();
        assert!(!t.is_solid(u16::MAX));
        assert_eq!(t.base_color(MaterialId(999)), WHITE);
        assert_eq!(t.terrain_of(MaterialId(999)), TerrainId::DEFAULT);
        assert_eq!(t.atlas_index(MaterialId(999)), None);
    }
}
