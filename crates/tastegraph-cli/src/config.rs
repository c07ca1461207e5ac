//! Resolve the pipeline configuration: JSON file, then command-line overrides.

use anyhow::{Context, Result};
use std::path::Path;
use tastegraph::PipelineConfig;
use tracing::debug;

/// Values given on the command line. `None` keeps the file or default value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub threshold: Option<f64>,
    pub top_n: Option<usize>,
    pub top_k: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
    }
}

/// Load a JSON config file; no path means defaults.
pub fn load(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: PipelineConfig = serde_json::from_str(&data)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

/// File, then overrides, then validation.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<PipelineConfig> {
    let mut config = load(path)?;
    overrides.apply(&mut config);
    config.validate().context("invalid pipeline configuration")?;
    Ok(config)
}
