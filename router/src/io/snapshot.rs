//! Snapshot load/save with schema + invariant validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::debug;

use crate::core::invariants::validate_groups;
use crate::router::RouterSnapshot;

const STATE_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schemas/router_state/v1.schema.json"
));

/// Load and validate a snapshot from disk (schema + route-table invariants).
pub fn load_snapshot(path: &Path) -> Result<RouterSnapshot> {
    debug!(path = %path.display(), "loading router snapshot");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read snapshot {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse snapshot {}", path.display()))?;
    validate_schema(&value)?;
    let snapshot: RouterSnapshot = serde_json::from_value(value)
        .with_context(|| format!("deserialize snapshot {}", path.display()))?;

    let errors = validate_groups(&snapshot.modules);
    if !errors.is_empty() {
        return Err(anyhow!("snapshot invariants failed: {}", errors.join("; ")));
    }
    debug!(modules = snapshot.modules.len(), "router snapshot loaded");
    Ok(snapshot)
}

/// Atomically write a snapshot to disk (temp file + rename).
pub fn write_snapshot(path: &Path, snapshot: &RouterSnapshot, pretty: bool) -> Result<()> {
    debug!(path = %path.display(), modules = snapshot.modules.len(), "writing router snapshot");
    let mut buf = if pretty {
        serde_json::to_string_pretty(snapshot)?
    } else {
        serde_json::to_string(snapshot)?
    };
    buf.push('\n');
    super::write_atomic(path, &buf)
}

fn validate_schema(snapshot: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(STATE_SCHEMA).context("parse state schema")?;
    let compiled = validator_for(&schema).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(snapshot) {
        let messages = compiled
            .iter_errors(snapshot)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "snapshot schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}
