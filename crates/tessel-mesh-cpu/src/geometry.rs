use std::sync::Arc;

use tessel_blocks::{MeshTables, TerrainId};

use crate::ao::{AoCorners, decide_tri_dir};
use crate::config::MeshConfig;
use crate::descriptor::RequestToken;
use crate::error::MeshError;
use crate::face::plane_axes;
use crate::face_data::{FaceDataSet, MeshedFaceData, Quad};

/// Quads per group that still fit 16-bit vertex indices.
pub const MAX_QUADS_PER_GROUP: usize = (u16::MAX as usize + 1) / 4;

const UV_EPSILON: f32 = 0.0015;

const INDEX_LISTS: [[u16; 6]; 4] = [
    [0, 1, 2, 0, 2, 3],
    [0, 2, 1, 0, 3, 2],
    [1, 2, 3, 1, 3, 0],
    [1, 3, 2, 1, 0, 3],
];

/// Renderer-ready buffers for one terrain group.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainGeometry {
    pub terrain: TerrainId,
    pub request: RequestToken,
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub colors: Vec<f32>,
    pub indices: Vec<u16>,
    /// Per-vertex atlas index, present when the group's first material has one.
    pub atlas_indices: Option<Vec<f32>>,
}

impl TerrainGeometry {
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.indices.len() / 6
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

pub struct GeometryBuilder {
    tables: Arc<MeshTables>,
    config: MeshConfig,
}

impl GeometryBuilder {
    pub fn new(tables: Arc<MeshTables>, config: MeshConfig) -> Self {
        Self { tables, config }
    }

    /// Expands every non-empty group, in terrain order. Fails without output
    /// if any group is too large for 16-bit indices.
    pub fn build(
        &self,
        set: &FaceDataSet,
        request: RequestToken,
    ) -> Result<Vec<TerrainGeometry>, MeshError> {
        for (terrain, fd) in set.iter() {
            if fd.len() > MAX_QUADS_PER_GROUP {
                return Err(MeshError::IndexOverflow {
                    terrain: terrain.0,
                    quads: fd.len(),
                });
            }
        }
        Ok(set
            .iter()
            .filter(|(_, fd)| !fd.is_empty())
            .map(|(terrain, fd)| self.build_group(terrain, fd, request))
            .collect())
    }

    fn build_group(
        &self,
        terrain: TerrainId,
        fd: &MeshedFaceData,
        request: RequestToken,
    ) -> TerrainGeometry {
        let nf = fd.len();
        let uses_atlas = fd
            .materials()
            .first()
            .and_then(|&m| self.tables.atlas_index(m))
            .is_some();

        let mut geo = TerrainGeometry {
            terrain,
            request,
            positions: Vec::with_capacity(nf * 12),
            normals: Vec::with_capacity(nf * 12),
            uvs: Vec::with_capacity(nf * 8),
            colors: Vec::with_capacity(nf * 16),
            indices: Vec::with_capacity(nf * 6),
            atlas_indices: uses_atlas.then(|| Vec::with_capacity(nf * 4)),
        };

        for (f, q) in fd.quads().enumerate() {
            let axis = q.dir.axis();
            let sign = q.dir.sign();
            push_positions(&mut geo.positions, &q);
            push_uvs(&mut geo.uvs, axis, q.width as f32, q.height as f32, sign as f32);
            let n = q.dir.normal();
            for _ in 0..4 {
                geo.normals.extend_from_slice(&n);
            }

            let ao = AoCorners::unpack(q.packed_ao);
            push_indices(&mut geo.indices, f, axis, sign, decide_tri_dir(ao));

            if let Some(atlas) = geo.atlas_indices.as_mut() {
                let ix = self.tables.atlas_index(q.material).map_or(-1.0, |i| i as f32);
                atlas.extend_from_slice(&[ix; 4]);
            }

            let base = self.tables.base_color(q.material);
            if self.config.enable_ao {
                // Vertex order is A, D, C, B.
                for lvl in [ao.a, ao.d, ao.c, ao.b] {
                    let m = self.config.ao_multiplier(lvl);
                    geo.colors
                        .extend_from_slice(&[base[0] * m, base[1] * m, base[2] * m, 1.0]);
                }
            } else {
                for _ in 0..4 {
                    geo.colors
                        .extend_from_slice(&[base[0], base[1], base[2], 1.0]);
                }
            }
        }
        geo
    }
}

fn push_positions(out: &mut Vec<f32>, q: &Quad) {
    let (u, v) = plane_axes(q.dir.axis());
    let loc = q.origin.map(f32::from);
    let mut du = [0.0; 3];
    let mut dv = [0.0; 3];
    du[u] = q.width as f32;
    dv[v] = q.height as f32;
    for corner in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
        for c in 0..3 {
            out.push(loc[c] + du[c] * corner[0] + dv[c] * corner[1]);
        }
    }
}

/// UVs inset by an epsilon. Axis 1 swaps width and height; the face sign
/// flips U, negated again on axis 2.
fn push_uvs(out: &mut Vec<f32>, axis: usize, w: f32, h: f32, dir: f32) {
    let e = UV_EPSILON;
    let mut uv = [e; 8];
    match axis {
        0 => {
            uv[1] = h - e;
            uv[3] = h - e;
            uv[2] = dir * (w - e);
            uv[4] = dir * (w - e);
            uv[0] = dir * e;
            uv[6] = dir * e;
        }
        1 => {
            uv[1] = w - e;
            uv[7] = w - e;
            uv[4] = dir * (h - e);
            uv[6] = dir * (h - e);
            uv[0] = dir * e;
            uv[2] = dir * e;
        }
        _ => {
            uv[1] = h - e;
            uv[3] = h - e;
            uv[2] = -dir * (w - e);
            uv[4] = -dir * (w - e);
            uv[0] = -dir * e;
            uv[6] = -dir * e;
        }
    }
    out.extend_from_slice(&uv);
}

fn push_indices(out: &mut Vec<u16>, face: usize, axis: usize, sign: i32, tri_dir: bool) {
    let sign = if axis == 0 { -sign } else { sign };
    let mut ix = if sign < 0 { 0 } else { 1 };
    if !tri_dir {
        ix += 2;
    }
    let base = (face * 4) as u16;
    out.extend(INDEX_LISTS[ix].iter().map(|&i| base + i));
}
