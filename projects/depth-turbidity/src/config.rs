use crate::error::{ProfileError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Numeric knobs for one profiling run. Immutable once a run starts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    /// Total depth covered by the video, in meters.
    pub total_depth: f64,
    /// Depth step between samples, in meters.
    pub scale: f64,
    /// Pixels at or above this intensity count as foreground.
    pub threshold: u8,
    /// Signed offset added to the foreground count before dividing.
    #[serde(default)]
    pub trim: i64,
}

impl SamplingConfig {
    pub fn new(total_depth: f64, scale: f64, threshold: u8, trim: i64) -> Self {
        Self {
            total_depth,
            scale,
            threshold,
            trim,
        }
    }

    /// Number of samples the depth range is divided into. May be fractional.
    pub fn sample_count(&self) -> f64 {
        self.total_depth / self.scale
    }

    /// Checks the parts of the config that do not depend on the video.
    pub fn validate(&self) -> Result<()> {
        // Negated comparisons so NaN is rejected too.
        if !(self.total_depth > 0.0) || !self.total_depth.is_finite() {
            return Err(ProfileError::Configuration(format!(
                "total depth must be a positive number of meters (got {})",
                self.total_depth
            )));
        }
        if !(self.scale > 0.0) || !self.scale.is_finite() {
            return Err(ProfileError::Configuration(format!(
                "scale must be a positive number of meters per sample (got {})",
                self.scale
            )));
        }
        let count = self.sample_count();
        if !(count > 0.0) || !count.is_finite() {
            return Err(ProfileError::Configuration(format!(
                "total depth / scale must be positive (got {})",
                count
            )));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SamplingConfig = serde_json::from_str(&content)?;
        Ok(config)
    }
}
