use anyhow::{Context, Result};
use gravefield_scatter::DEFAULT_MAX_ATTEMPTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SEED: u64 = 42;

/// Startup settings, read from a JSON file and overridden by CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub assets: PathBuf,
    pub seed: u64,
    /// Scatter attempts allowed per requested instance.
    pub max_attempts: u32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            assets: PathBuf::from("./assets"),
            seed: DEFAULT_SEED,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl DemoConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn with_overrides(mut self, assets: Option<PathBuf>, seed: Option<u64>) -> Self {
        if let Some(assets) = assets {
            self.assets = assets;
        }
        if let Some(seed) = seed {
            self.seed = seed;
        }
        self
    }
}
