//! Per-file optimization configuration

use crate::error::Error;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Options supplied once per input file. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OptimizationConfig {
    /// Try the quantized (compressed) export profiles
    pub use_draco: bool,
    /// Recompress textures (handled by the texture collaborator)
    pub use_texture_compression: bool,
    /// Run the adaptive simplification loop
    pub simplify_geometry: bool,
    /// Merge duplicate vertices before simplifying
    pub remove_duplicates: bool,
    /// Requested fraction of vertices to remove, before adaptive tuning
    pub simplification_ratio: f32,
    /// Recompute crease-aware normals on changed geometry
    pub preserve_normals: bool,
    /// Embed images in the exported container
    pub embed_images: bool,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            use_draco: true,
            use_texture_compression: true,
            simplify_geometry: true,
            remove_duplicates: true,
            simplification_ratio: 0.5,
            preserve_normals: true,
            embed_images: true,
        }
    }
}

impl OptimizationConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Configuration that only removes duplicates and re-encodes
    pub fn lossless() -> Self {
        Self {
            simplify_geometry: false,
            simplification_ratio: 0.0,
            ..Self::default()
        }
    }

    pub fn with_simplification_ratio(mut self, ratio: f32) -> Self {
        self.simplification_ratio = ratio;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.simplification_ratio) {
            return Err(Error::InvalidData(format!(
                "Simplification ratio must be between 0.0 and 1.0, got {}",
                self.simplification_ratio
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OptimizationConfig::default();
        assert!(config.simplify_geometry);
        assert_eq!(config.simplification_ratio, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            OptimizationConfig::from_json(r#"{"useDraco": false, "simplificationRatio": 0.25}"#)
                .unwrap();
        assert!(!config.use_draco);
        assert_eq!(config.simplification_ratio, 0.25);
        assert!(config.remove_duplicates);
    }

    #[test]
    fn test_from_json_rejects_bad_ratio() {
        assert!(OptimizationConfig::from_json(r#"{"simplificationRatio": 1.5}"#).is_err());
        assert!(OptimizationConfig::from_json("not json").is_err());
    }
}
