//! Function references written by humans: hex ids or canonical signatures.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::types::FunctionId;

static SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*\(([A-Za-z0-9_\[\]]+(,[A-Za-z0-9_\[\]]+)*)?\)$")
        .expect("signature regex compiles")
});

/// True for canonical signatures such as `setZ(uint256)`. No whitespace allowed.
pub fn is_canonical_signature(raw: &str) -> bool {
    SIGNATURE.is_match(raw)
}

/// Parse `0x`-prefixed hex, or derive the id from a canonical signature.
pub fn parse_function_ref(raw: &str) -> Result<FunctionId, String> {
    let raw = raw.trim();
    if raw.starts_with("0x") {
        return raw.parse().map_err(|err| format!("{err}"));
    }
    if is_canonical_signature(raw) {
        return Ok(FunctionId::from_signature(raw));
    }
    Err(format!(
        "'{raw}' is neither a 0x function id nor a canonical signature like name(type,...)"
    ))
}
