//! Filesystem helpers for router commands.

pub mod config;
pub mod cut_file;
pub mod linked;
pub mod snapshot;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Canonical paths within `.router/` for a project root.
#[derive(Debug, Clone)]
pub struct RouterPaths {
    pub root: PathBuf,
    pub router_dir: PathBuf,
    pub config_path: PathBuf,
}

impl RouterPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let router_dir = root.join(".router");
        Self {
            root: root.clone(),
            router_dir: router_dir.clone(),
            config_path: router_dir.join("config.toml"),
        }
    }
}

/// Write via a sibling temp file and rename, creating parent directories.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = parent.join(tmp_name);
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace {}", path.display()))?;
    Ok(())
}
