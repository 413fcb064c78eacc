use std::path::Path;

use serde::Deserialize;
use tessel_mesh_cpu::MeshConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid world config: {0}")]
    World(String),
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub mesh: MeshConfig,
    pub world: WorldConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub height_frequency: f32,
    /// Lowest and highest surface, as fractions of the region height.
    pub min_height_ratio: f32,
    pub max_height_ratio: f32,
    pub topsoil_thickness: i32,
    pub snow_threshold: f32,
    pub sand_threshold: f32,
    pub tree_chance: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            height_frequency: 0.02,
            min_height_ratio: 0.15,
            max_height_ratio: 0.85,
            topsoil_thickness: 3,
            snow_threshold: 0.75,
            sand_threshold: 0.25,
            tree_chance: 0.02,
        }
    }
}

impl WorldConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let r = 0.0..=1.0;
        if !r.contains(&self.min_height_ratio)
            || !r.contains(&self.max_height_ratio)
            || self.min_height_ratio > self.max_height_ratio
        {
            return Err(ConfigError::World(format!(
                "height ratios {}..{} must be ordered within 0..1",
                self.min_height_ratio, self.max_height_ratio
            )));
        }
        if !r.contains(&self.tree_chance) {
            return Err(ConfigError::World(format!(
                "tree_chance {} must be within 0..1",
                self.tree_chance
            )));
        }
        if self.topsoil_thickness < 0 {
            return Err(ConfigError::World("topsoil_thickness must be >= 0".into()));
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = toml::from_str(s)?;
        cfg.world.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_mesh_cpu::MissingNeighborPolicy;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.mesh, MeshConfig::default());
        assert_eq!(cfg.world.topsoil_thickness, 3);
    }

    #[test]
    fn mesh_table_overrides() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [mesh]
            enable_ao = false
            missing_neighbors = "treat_as_air"
            "#,
        )
        .unwrap();
        assert!(!cfg.mesh.enable_ao);
        assert_eq!(cfg.mesh.missing_neighbors, MissingNeighborPolicy::TreatAsAir);
        assert_eq!(cfg.mesh.ao_level_multipliers, [0.93, 0.8, 0.5]);
    }

    #[test]
    fn bad_world_ratios_rejected() {
        let err = AppConfig::from_toml_str(
            r#"
            [world]
            min_height_ratio = 0.9
            max_height_ratio = 0.2
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::World(_)));
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        for text in [
            "[mesh]\nskip_revers_ao = true\n",
            "[world]\ntree_chanse = 0.5\n",
            "[mesher]\nenable_ao = false\n",
        ] {
            let err = AppConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, ConfigError::Parse(_)), "{text:?} gave {err}");
        }
    }

    #[test]
    fn shipped_config_parses() {
        let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        let cfg = AppConfig::load_from_path(root.join("assets/tessel.toml")).unwrap();
        assert!(cfg.mesh.validate().is_ok());
    }
}
