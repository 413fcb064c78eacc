use std::collections::BTreeMap;

use tessel_blocks::{MaterialId, TerrainId};

use crate::error::MeshError;
use crate::face::FaceDir;
use crate::pool::{Pool, Pooled, Recycle};

/// One merged face.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Quad {
    pub material: MaterialId,
    pub dir: FaceDir,
    /// Chunk-local corner with the smallest coordinates.
    pub origin: [u16; 3],
    /// Extent along the sweep's `U` axis.
    pub width: u16,
    /// Extent along the sweep's `V` axis.
    pub height: u16,
    pub packed_ao: u8,
}

/// Quads of one terrain group, stored column-wise. All columns always have
/// the same length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshedFaceData {
    pub terrain: TerrainId,
    mat_ids: Vec<MaterialId>,
    dirs: Vec<FaceDir>,
    xs: Vec<u16>,
    ys: Vec<u16>,
    zs: Vec<u16>,
    widths: Vec<u16>,
    heights: Vec<u16>,
    packed_ao: Vec<u8>,
}

impl MeshedFaceData {
    pub fn new(terrain: TerrainId) -> Self {
        Self {
            terrain,
            ..Self::default()
        }
    }

    pub fn push(&mut self, q: Quad) {
        self.mat_ids.push(q.material);
        self.dirs.push(q.dir);
        self.xs.push(q.origin[0]);
        self.ys.push(q.origin[1]);
        self.zs.push(q.origin[2]);
        self.widths.push(q.width);
        self.heights.push(q.height);
        self.packed_ao.push(q.packed_ao);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.mat_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.mat_ids.is_empty()
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<Quad> {
        Some(Quad {
            material: *self.mat_ids.get(i)?,
            dir: self.dirs[i],
            origin: [self.xs[i], self.ys[i], self.zs[i]],
            width: self.widths[i],
            height: self.heights[i],
            packed_ao: self.packed_ao[i],
        })
    }

    pub fn quads(&self) -> impl Iterator<Item = Quad> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    pub fn materials(&self) -> &[MaterialId] {
        &self.mat_ids
    }
}

impl Recycle for MeshedFaceData {
    fn recycle(&mut self) {
        self.terrain = TerrainId::DEFAULT;
        self.mat_ids.clear();
        self.dirs.clear();
        self.xs.clear();
        self.ys.clear();
        self.zs.clear();
        self.widths.clear();
        self.heights.clear();
        self.packed_ao.clear();
    }
}

/// Face data of one meshing call, keyed and ordered by terrain group.
#[derive(Debug, Default)]
pub struct FaceDataSet {
    groups: BTreeMap<TerrainId, Pooled<MeshedFaceData>>,
}

impl FaceDataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulator for `terrain`, taken from `pool` on first use.
    pub fn group_mut(
        &mut self,
        terrain: TerrainId,
        pool: &Pool<MeshedFaceData>,
    ) -> Result<&mut MeshedFaceData, MeshError> {
        use std::collections::btree_map::Entry;
        match self.groups.entry(terrain) {
            Entry::Occupied(e) => Ok(&mut **e.into_mut()),
            Entry::Vacant(e) => {
                let mut fd = pool.try_acquire()?;
                fd.terrain = terrain;
                Ok(&mut **e.insert(fd))
            }
        }
    }

    pub fn get(&self, terrain: TerrainId) -> Option<&MeshedFaceData> {
        self.groups.get(&terrain).map(|g| &**g)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TerrainId, &MeshedFaceData)> + '_ {
        self.groups.iter().map(|(t, g)| (*t, &**g))
    }

    /// Number of terrain groups with at least one quad.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_quads(&self) -> usize {
        self.groups.values().map(|g| g.len()).sum()
    }

    /// Every quad in terrain order, then emission order.
    pub fn quads(&self) -> impl Iterator<Item = (TerrainId, Quad)> + '_ {
        self.iter().flat_map(|(t, g)| g.quads().map(move |q| (t, q)))
    }
}
