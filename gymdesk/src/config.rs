//! Configuration file
//!
//! ```toml
//! data_dir = "/var/lib/gymdesk"
//! log_level = "info"
//!
//! [files]
//! users = "user.db"
//! activities = "act.db"
//! packs = "pack.db"
//! ```
//!
//! Every key is optional. Command-line flags win over the file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use gymdesk_engine::DeskPaths;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory relative file paths are resolved against
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub files: DeskPaths,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Record file locations, with `data_dir` overriding the configured one
    pub fn desk_paths(&self, data_dir: Option<&Path>) -> DeskPaths {
        let dir = data_dir
            .or(self.data_dir.as_deref())
            .unwrap_or_else(|| Path::new("."));
        self.files.relative_to(dir)
    }
}
