//! Startup configuration: which listings to mirror and how many entries
//! to keep, loaded from a RON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Autoindex listing URL.
    pub url: String,
    /// Local folder the files are mirrored into.
    pub folder: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MirrorConfig {
    pub targets: Vec<TargetConfig>,
    /// How many of the newest listing entries to download per target.
    #[serde(default = "default_latest_count")]
    pub latest_count: usize,
    /// Filename prefixes subject to retention pruning. Empty disables the
    /// retention pass.
    #[serde(default)]
    pub prune_prefixes: Vec<String>,
}

impl MirrorConfig {
    /// Files kept per prune prefix: the download count scaled by the number
    /// of targets, so one folder fed by several listings keeps enough.
    pub fn retention_keep_count(&self) -> usize {
        self.latest_count * self.targets.len().max(1)
    }
}

fn default_latest_count() -> usize {
    5
}

pub fn load_config(path: &Path) -> Result<MirrorConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = ron::from_str(&content)?;
    Ok(config)
}
