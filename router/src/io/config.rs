//! Router configuration stored under `.router/config.toml`.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::types::ModuleAddress;

/// Router configuration (TOML).
///
/// Missing fields take their defaults, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouterConfig {
    /// Snapshot file, relative to the project root unless absolute.
    pub state_path: PathBuf,

    /// Modules whose code is deployed elsewhere. The CLI treats them as valid
    /// route targets but cannot execute them.
    pub linked_modules: Vec<ModuleAddress>,

    /// Pretty-print snapshots on write.
    pub pretty: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(".router/state.json"),
            linked_modules: Vec::new(),
            pretty: true,
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.state_path.as_os_str().is_empty() {
            return Err(anyhow!("state_path must not be empty"));
        }
        let mut seen = HashSet::new();
        for module in &self.linked_modules {
            if module.is_null() {
                return Err(anyhow!("linked_modules must not contain the null module"));
            }
            if !seen.insert(module) {
                return Err(anyhow!("linked_modules lists {module} twice"));
            }
        }
        Ok(())
    }

    /// Resolve `state_path` against `root`.
    pub fn state_path_in(&self, root: &Path) -> PathBuf {
        if self.state_path.is_absolute() {
            self.state_path.clone()
        } else {
            root.join(&self.state_path)
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RouterConfig::default()`.
pub fn load_config(path: &Path) -> Result<RouterConfig> {
    if !path.exists() {
        let cfg = RouterConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RouterConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &RouterConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    super::write_atomic(path, &buf)
}
