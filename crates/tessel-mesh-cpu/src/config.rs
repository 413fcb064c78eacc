use serde::Deserialize;

use crate::error::MeshError;

/// What the mesher does where a neighbor chunk is not loaded.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingNeighborPolicy {
    /// Leave the `-1` boundary plane unmeshed until the neighbor arrives; AO
    /// lookups into the missing chunk read the nearest center voxel instead.
    #[default]
    SkipBoundary,
    /// Mesh the boundary against air and treat missing cells as non-solid.
    TreatAsAir,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshConfig {
    pub enable_ao: bool,
    pub skip_reverse_ao: bool,
    /// Color multipliers for AO levels 1, 2 and 3.
    pub ao_level_multipliers: [f32; 3],
    /// Color multiplier for AO level 0 (reverse AO).
    pub reverse_ao_multiplier: f32,
    pub missing_neighbors: MissingNeighborPolicy,
    /// Snapshots that may be alive at once per copier.
    pub max_snapshots: usize,
    /// Face-data accumulators that may be alive at once per mesher.
    pub max_face_groups: usize,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            enable_ao: true,
            skip_reverse_ao: false,
            ao_level_multipliers: [0.93, 0.8, 0.5],
            reverse_ao_multiplier: 1.0,
            missing_neighbors: MissingNeighborPolicy::SkipBoundary,
            max_snapshots: 64,
            max_face_groups: 256,
        }
    }
}

impl MeshConfig {
    pub fn validate(&self) -> Result<(), MeshError> {
        let mults = self
            .ao_level_multipliers
            .iter()
            .chain(std::iter::once(&self.reverse_ao_multiplier));
        for &m in mults {
            if !m.is_finite() || m < 0.0 {
                return Err(MeshError::InvalidConfig(format!(
                    "AO multiplier {m} must be finite and non-negative"
                )));
            }
        }
        if self.max_snapshots == 0 {
            return Err(MeshError::InvalidConfig("max_snapshots must be > 0".into()));
        }
        if self.max_face_groups == 0 {
            return Err(MeshError::InvalidConfig(
                "max_face_groups must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// AO level (0..=3) to color multiplier.
    #[inline]
    pub fn ao_multiplier(&self, level: u8) -> f32 {
        match level {
            0 => self.reverse_ao_multiplier,
            l => self.ao_level_multipliers[(l.min(3) - 1) as usize],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(MeshConfig::default().validate().is_ok());
    }

    #[test]
    fn negative_multiplier_rejected() {
        let cfg = MeshConfig {
            reverse_ao_multiplier: -0.5,
            ..MeshConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MeshError::InvalidConfig(_))));
    }

    #[test]
    fn multiplier_lookup() {
        let cfg = MeshConfig::default();
        assert_eq!(cfg.ao_multiplier(0), 1.0);
        assert_eq!(cfg.ao_multiplier(1), 0.93);
        assert_eq!(cfg.ao_multiplier(3), 0.5);
    }
}
