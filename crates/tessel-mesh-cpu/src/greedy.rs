use std::sync::Arc;
use std::time::Instant;

use tessel_blocks::{AIR, MaterialId, MeshTables};

use crate::ao::{self, FLAT_AO};
use crate::config::{MeshConfig, MissingNeighborPolicy};
use crate::descriptor::ChunkDescriptor;
use crate::error::MeshError;
use crate::face::{FaceDir, SweepAxis, SweepX, SweepY, SweepZ};
use crate::face_data::{FaceDataSet, MeshedFaceData, Quad};
use crate::field::{Solidity, VoxelField};
use crate::pool::Pool;

/// Rectangle of equal mask cells found by [`merge_mask`], in mask coordinates.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct MaskRect {
    pub j: usize,
    pub k: usize,
    pub w: usize,
    pub h: usize,
    pub value: i32,
    pub ao: u8,
}

/// Greedy rectangle merge over a `len x len` mask (`k` rows of `j` cells).
///
/// Scans rows in order, grows each rectangle along `j` first and then along
/// `k`, and zeroes the cells it consumes. `faces` is the number of nonzero
/// cells; the scan stops once they are all consumed, leaving the mask zeroed.
/// AO values only split rectangles when `use_ao` is set.
pub fn merge_mask<E>(
    mask: &mut [i32],
    ao: &[u8],
    len: usize,
    use_ao: bool,
    faces: usize,
    mut emit: impl FnMut(MaskRect) -> Result<(), E>,
) -> Result<(), E> {
    debug_assert!(mask.len() >= len * len);
    let mut remaining = faces;
    if remaining == 0 {
        return Ok(());
    }
    for k in 0..len {
        let mut j = 0;
        while j < len {
            let n = k * len + j;
            let value = mask[n];
            if value == 0 {
                j += 1;
                continue;
            }
            let ao_val = if use_ao { ao[n] } else { FLAT_AO };
            let same = |m: &[i32], ix: usize| m[ix] == value && (!use_ao || ao[ix] == ao_val);

            let mut w = 1;
            while j + w < len && same(mask, n + w) {
                w += 1;
            }
            let mut h = 1;
            'grow: while k + h < len {
                let row = n + h * len;
                for m in 0..w {
                    if !same(mask, row + m) {
                        break 'grow;
                    }
                }
                h += 1;
            }

            for hx in 0..h {
                let row = n + hx * len;
                mask[row..row + w].fill(0);
            }
            emit(MaskRect {
                j,
                k,
                w,
                h,
                value,
                ao: ao_val,
            })?;

            remaining = remaining.saturating_sub(w * h);
            if remaining == 0 {
                return Ok(());
            }
            j += w;
        }
    }
    Ok(())
}

/// Plane-sweep greedy mesher. Owns its mask scratch, so use one per thread.
pub struct GreedyMesher {
    tables: Arc<MeshTables>,
    config: MeshConfig,
    mask: Vec<i32>,
    ao_mask: Vec<u8>,
    face_pool: Pool<MeshedFaceData>,
}

impl GreedyMesher {
    pub fn new(tables: Arc<MeshTables>, config: MeshConfig) -> Result<Self, MeshError> {
        config.validate()?;
        let face_pool = Pool::new("face data", config.max_face_groups);
        Ok(Self {
            tables,
            config,
            mask: Vec::new(),
            ao_mask: Vec::new(),
            face_pool,
        })
    }

    pub fn tables(&self) -> &Arc<MeshTables> {
        &self.tables
    }

    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    pub fn face_pool(&self) -> &Pool<MeshedFaceData> {
        &self.face_pool
    }

    /// Sweeps all three axes and returns the merged quads per terrain group.
    pub fn mesh<F: VoxelField + ?Sized>(
        &mut self,
        field: &F,
        desc: &ChunkDescriptor,
    ) -> Result<FaceDataSet, MeshError> {
        let s = field.size();
        desc.check(s)?;
        field.check_sizes()?;
        let t0 = Instant::now();

        let cells = s * s;
        if self.mask.len() < cells {
            self.mask.resize(cells, 0);
            self.ao_mask.resize(cells, 0);
        }
        // A failed call may leave cells behind.
        self.mask[..cells].fill(0);

        let mut sweep = Sweep {
            field,
            tables: &self.tables,
            config: &self.config,
            desc,
            solidity: Solidity::new(field, &self.tables, self.config.missing_neighbors),
            size: s,
            mask: &mut self.mask[..cells],
            ao_mask: &mut self.ao_mask[..cells],
            pool: &self.face_pool,
            out: FaceDataSet::new(),
        };
        // Empty and fully opaque chunks have no interior faces.
        let edges_only = desc.is_empty || desc.is_full;
        sweep.axis::<SweepX>(edges_only)?;
        sweep.axis::<SweepY>(edges_only)?;
        sweep.axis::<SweepZ>(edges_only)?;
        let out = sweep.out;

        log::debug!(
            target: "mesh",
            "meshed request {}: {} quads in {} groups, {:.2}ms",
            desc.request.0,
            out.total_quads(),
            out.len(),
            t0.elapsed().as_secs_f32() * 1000.0
        );
        Ok(out)
    }
}

struct Sweep<'a, F: ?Sized> {
    field: &'a F,
    tables: &'a MeshTables,
    config: &'a MeshConfig,
    desc: &'a ChunkDescriptor,
    solidity: Solidity<'a, F>,
    size: usize,
    mask: &'a mut [i32],
    ao_mask: &'a mut [u8],
    pool: &'a Pool<MeshedFaceData>,
    out: FaceDataSet,
}

impl<F: VoxelField + ?Sized> Sweep<'_, F> {
    fn axis<A: SweepAxis>(&mut self, edges_only: bool) -> Result<(), MeshError> {
        let s = self.size as i32;

        // The -1 plane belongs to this chunk; the +1 plane to the next one.
        let mut prev = [0; 3];
        prev[A::D] = -1;
        let boundary = self.field.has_neighbor(prev[0], prev[1], prev[2])
            || self.config.missing_neighbors == MissingNeighborPolicy::TreatAsAir;
        if boundary {
            let nf = self.build_mask::<A>(-1, 0, false);
            self.emit::<A>(0, nf)?;
        }
        if edges_only {
            return Ok(());
        }

        for i in 0..s - 1 {
            if A::D == 1 {
                let lo = self.desc.layer_hint(i as usize);
                if lo.is_some() && lo == self.desc.layer_hint(i as usize + 1) {
                    continue;
                }
            }
            let nf = self.build_mask::<A>(i, i + 1, A::D != 1);
            self.emit::<A>(i + 1, nf)?;
        }
        Ok(())
    }

    /// Fills the mask for the faces between layers `ia` and `ib = ia + 1`.
    /// Positive cells are `+D` faces of `ia`, negative cells `-D` faces of `ib`.
    fn build_mask<A: SweepAxis>(&mut self, ia: i32, ib: i32, skip_uniform_rows: bool) -> usize {
        let s = self.size as i32;
        let tables = self.tables;
        let dir_a = 2 * A::D;
        let dir_b = dir_a + 1;
        let use_ao = self.config.enable_ao;
        let skip_rev = self.config.skip_reverse_ao;
        let mut faces = 0;

        for k in 0..s {
            // V is y for the X and Z sweeps; a uniform y layer has no faces
            // between its own voxels.
            if skip_uniform_rows && self.desc.layer_hint(k as usize).is_some() {
                continue;
            }
            let row = (k * s) as usize;
            for j in 0..s {
                let pa = A::xyz(ia, j, k);
                let pb = A::xyz(ib, j, k);
                let a = self.field.voxel(pa[0], pa[1], pa[2]).unwrap_or(AIR);
                let b = self.field.voxel(pb[0], pb[1], pb[2]).unwrap_or(AIR);
                if a == b {
                    continue;
                }
                let op_a = tables.is_opaque(a);
                let op_b = tables.is_opaque(b);
                if op_a && op_b {
                    continue;
                }
                let ma = tables.face_material(a, dir_a);
                let mb = tables.face_material(b, dir_b);
                if ma == mb {
                    continue;
                }

                let n = row + j as usize;
                // Two different non-opaque materials facing each other draw neither face.
                let (value, ipos, ineg) = if op_a || mb.is_none() {
                    (ma.0 as i32, ib, ia)
                } else if op_b || ma.is_none() {
                    (-(mb.0 as i32), ia, ib)
                } else {
                    continue;
                };
                if value == 0 {
                    continue;
                }
                self.mask[n] = value;
                if use_ao {
                    let solidity = &self.solidity;
                    let packed = ao::compute(
                        |i, j, k| solidity.is_solid(A::xyz(i, j, k)),
                        ipos,
                        ineg,
                        j,
                        k,
                        skip_rev,
                    );
                    self.ao_mask[n] = packed;
                }
                faces += 1;
            }
        }
        faces
    }

    fn emit<A: SweepAxis>(&mut self, plane: i32, faces: usize) -> Result<(), MeshError> {
        log::trace!(target: "mesh", "axis {} plane {}: {} face cells", A::D, plane, faces);
        if faces == 0 {
            return Ok(());
        }
        let tables = self.tables;
        let pool = self.pool;
        let out = &mut self.out;
        merge_mask(
            &mut *self.mask,
            &*self.ao_mask,
            self.size,
            self.config.enable_ao,
            faces,
            |r| {
                let material = MaterialId(r.value.unsigned_abs() as u16);
                let origin = A::xyz(plane, r.j as i32, r.k as i32);
                out.group_mut(tables.terrain_of(material), pool)?
                    .push(Quad {
                        material,
                        dir: FaceDir::from_axis(A::D, r.value > 0),
                        origin: origin.map(|c| c as u16),
                        width: r.w as u16,
                        height: r.h as u16,
                        packed_ao: r.ao,
                    });
                Ok(())
            },
        )
    }
}
