//! Cut files: TOML descriptions of a [`Cut`] for `router cut`.
//!
//! ```toml
//! [[entries]]
//! module = "0x00000000000000000000000000000000000000b1"
//! action = "add"
//! functions = ["getZ()", "0x1234abcd"]
//!
//! [[entries]]
//! action = "remove"          # module defaults to the null address
//! functions = ["getX()"]
//!
//! [init]
//! module = "0x00000000000000000000000000000000000000b1"
//! function = "setZ(uint256)"
//! args = 7
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use crate::core::signature::parse_function_ref;
use crate::core::types::{Call, Cut, CutAction, CutEntry, FunctionId, Initializer, ModuleAddress};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CutFile {
    #[serde(default)]
    entries: Vec<EntryFile>,
    init: Option<InitFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryFile {
    #[serde(default = "null_module")]
    module: ModuleAddress,
    action: CutAction,
    functions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InitFile {
    module: ModuleAddress,
    function: String,
    #[serde(default)]
    args: Value,
}

fn null_module() -> ModuleAddress {
    ModuleAddress::NULL
}

/// Parse cut TOML. Function references may be hex ids or signatures.
pub fn parse_cut(contents: &str) -> Result<Cut> {
    let file: CutFile = toml::from_str(contents).context("parse cut toml")?;
    let mut entries = Vec::with_capacity(file.entries.len());
    for (position, entry) in file.entries.into_iter().enumerate() {
        let functions = resolve_functions(&entry.functions)
            .with_context(|| format!("entries[{position}]"))?;
        entries.push(CutEntry {
            module: entry.module,
            action: entry.action,
            functions,
        });
    }

    let init = match file.init {
        Some(init) => {
            let function = parse_function_ref(&init.function)
                .map_err(|err| anyhow!(err))
                .context("init.function")?;
            Some(Initializer {
                module: init.module,
                call: Call::new(function, init.args),
            })
        }
        None => None,
    };

    Ok(Cut { entries, init })
}

pub fn load_cut(path: &Path) -> Result<Cut> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read cut {}", path.display()))?;
    parse_cut(&contents).with_context(|| format!("load cut {}", path.display()))
}

fn resolve_functions(raw: &[String]) -> Result<Vec<FunctionId>> {
    raw.iter()
        .map(|item| parse_function_ref(item).map_err(|err| anyhow!(err)))
        .collect()
}
