//! Pipeline configuration.
//!
//! Every section carries `#[serde(default)]`, so a JSON file only needs the
//! fields it overrides:
//!
//! ```json
//! { "policy": { "visual_cutoff": 0.4 }, "wall": { "width": 10.0 } }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fusion::FusionConfig;
use crate::render::RenderConfig;
use crate::scene::{LabelStackConfig, WallGeometry};

/// Confidence policy applied downstream of fusion.
///
/// The two cutoffs are independent: a record can be visualized without
/// being official evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Entries strictly above this are drawn and projected.
    pub visual_cutoff: f32,
    /// Entries strictly above this are flagged as official evidence.
    pub official_cutoff: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            visual_cutoff: 0.30,
            official_cutoff: 0.45,
        }
    }
}

/// Top-level configuration for [`crate::Analyzer`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub fusion: FusionConfig,
    pub policy: PolicyConfig,
    pub render: RenderConfig,
    pub wall: WallGeometry,
    pub labels: LabelStackConfig,
}

impl PipelineConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        unit_interval("fusion.confidence_floor", self.fusion.confidence_floor)?;
        unit_interval("fusion.overlap_threshold", self.fusion.overlap_threshold)?;
        unit_interval("policy.visual_cutoff", self.policy.visual_cutoff)?;
        unit_interval("policy.official_cutoff", self.policy.official_cutoff)?;
        if !(self.render.text_scale.is_finite() && self.render.text_scale > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "render.text_scale must be positive, got {}",
                self.render.text_scale
            )));
        }
        self.wall.validate()?;
        self.labels.validate()
    }
}

fn unit_interval(name: &str, v: f32) -> Result<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!("{name} must be in [0, 1], got {v}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = PipelineConfig::default();
        c.validate().unwrap();
        assert_eq!(c.policy.visual_cutoff, 0.30);
        assert_eq!(c.policy.official_cutoff, 0.45);
        assert_eq!(c.fusion.confidence_floor, 0.001);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        std::fs::write(&path, r#"{"policy": {"visual_cutoff": 0.4}, "wall": {"width": 10.0}}"#).unwrap();
        let c = PipelineConfig::from_json_file(&path).unwrap();
        assert_eq!(c.policy.visual_cutoff, 0.4);
        assert_eq!(c.policy.official_cutoff, 0.45);
        assert_eq!(c.wall.width, 10.0);
        assert_eq!(c.wall.segments, 128);
        assert_eq!(c.render.box_thickness, 3);
    }

    #[test]
    fn out_of_range_values_rejected() {
        let mut c = PipelineConfig::default();
        c.policy.visual_cutoff = 1.5;
        assert!(matches!(c.validate(), Err(Error::InvalidConfig(_))));

        let mut c = PipelineConfig::default();
        c.fusion.overlap_threshold = f32::NAN;
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.labels.label_height = -1.0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = PipelineConfig::from_json_file(Path::new("/nonexistent/cfg.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
