use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::{AccuracyConfig, DEFAULT_ACCURACY};
use crate::pip::{AdminResolver, FsRepository};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub accuracy: AccuracyConfig,
    pub lookup: LookupConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatasetConfig {
    pub root: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LookupConfig {
    /// Per-lookup deadline; unset means no deadline
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Accuracy defaults, with any key the file leaves out set to level 1
    pub fn default_accuracy(&self) -> AccuracyConfig {
        self.accuracy.or(&AccuracyConfig::uniform(DEFAULT_ACCURACY))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.lookup.timeout_ms.map(Duration::from_millis)
    }

    /// Build a filesystem-backed resolver from this config
    pub fn resolver(&self) -> AdminResolver<FsRepository> {
        let resolver = AdminResolver::new(FsRepository::new(&self.dataset.root));
        match self.timeout() {
            Some(timeout) => resolver.with_deadline(timeout),
            None => resolver,
        }
    }
}
