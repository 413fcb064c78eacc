use thiserror::Error;

/// Failures while loading or compiling lookup tables. All of them are fatal
/// for mesher construction.
#[derive(Debug, Error)]
pub enum TablesError {
    #[error("failed to read tables file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tables: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("voxel `{voxel}` references unknown material `{material}`")]
    UnknownMaterial { voxel: String, material: String },
    #[error("duplicate {kind} name `{name}`")]
    DuplicateName { kind: &'static str, name: String },
    #[error("voxel id {id} assigned to both `{first}` and `{second}`")]
    DuplicateVoxelId {
        id: u16,
        first: String,
        second: String,
    },
    #[error("voxel `{name}` has id {id}, ids must be below {max}")]
    VoxelIdOutOfRange { name: String, id: u32, max: u32 },
    #[error("voxel `{0}` redefines id 0, which is reserved for air")]
    AirRedefined(String),
    #[error("too many materials ({0}), at most {max} are supported", max = u16::MAX)]
    TooManyMaterials(usize),
    #[error("too many terrain groups ({0})")]
    TooManyTerrainGroups(usize),
}
