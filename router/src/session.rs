//! Load a persisted router, run one command against it, persist the result.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::core::types::{Cut, ModuleAddress, RouterEvent};
use crate::io::RouterPaths;
use crate::io::config::{RouterConfig, load_config};
use crate::io::cut_file::load_cut;
use crate::io::linked::LinkedModules;
use crate::io::snapshot::{load_snapshot, write_snapshot};
use crate::router::Router;

/// A router restored from `.router/` with its config.
pub struct Session {
    pub paths: RouterPaths,
    pub config: RouterConfig,
    pub state_path: PathBuf,
    pub router: Router<LinkedModules>,
}

impl Session {
    pub fn open(root: &Path) -> Result<Self> {
        let paths = RouterPaths::new(root);
        let config = load_config(&paths.config_path).context("load config.toml")?;
        let state_path = config.state_path_in(root);
        let snapshot = load_snapshot(&state_path).context("load router state")?;
        let host = LinkedModules::new(&config.linked_modules);
        let router = Router::restore(snapshot, host).context("restore router state")?;
        Ok(Self {
            paths,
            config,
            state_path,
            router,
        })
    }

    pub fn save(&self) -> Result<()> {
        write_snapshot(&self.state_path, &self.router.snapshot(), self.config.pretty)
            .context("write router state")
    }

    /// Apply `cut` and persist. Nothing is written when the cut fails.
    pub fn apply_cut(&mut self, caller: ModuleAddress, cut: Cut) -> Result<Vec<RouterEvent>> {
        self.router.apply_cut(caller, cut)?;
        self.save()?;
        let events = self.router.take_events();
        info!(events = events.len(), path = %self.state_path.display(), "cut persisted");
        Ok(events)
    }

    pub fn transfer_ownership(
        &mut self,
        caller: ModuleAddress,
        new_owner: ModuleAddress,
    ) -> Result<Vec<RouterEvent>> {
        self.router.transfer_ownership(caller, new_owner)?;
        self.save()?;
        Ok(self.router.take_events())
    }
}

/// Load the cut file at `cut_path` and apply it to the router under `root`.
pub fn apply_cut_file(root: &Path, caller: ModuleAddress, cut_path: &Path) -> Result<Vec<RouterEvent>> {
    let cut = load_cut(cut_path)?;
    let mut session = Session::open(root)?;
    session.apply_cut(caller, cut)
}
