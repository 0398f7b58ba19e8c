//! Shared value types for the route registry.
//!
//! Identifiers and addresses are opaque fixed-width values. They serialize as
//! `0x`-prefixed lowercase hex so snapshots and cut files stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Width of a [`FunctionId`] in bytes.
pub const FUNCTION_ID_LEN: usize = 4;
/// Width of a [`ModuleAddress`] in bytes.
pub const ADDRESS_LEN: usize = 20;

/// Error returned when parsing a hex identifier or address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{input}': {reason}")]
pub struct ParseHexError {
    kind: &'static str,
    input: String,
    reason: String,
}

fn parse_fixed<const N: usize>(kind: &'static str, input: &str) -> Result<[u8; N], ParseHexError> {
    let fail = |reason: String| ParseHexError {
        kind,
        input: input.to_string(),
        reason,
    };
    let digits = input
        .strip_prefix("0x")
        .ok_or_else(|| fail("missing 0x prefix".to_string()))?;
    if digits.len() != N * 2 {
        return Err(fail(format!("expected {} hex digits, got {}", N * 2, digits.len())));
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|err| fail(err.to_string()))?;
    Ok(out)
}

/// Opaque key naming one callable entry point.
///
/// The router only stores and compares identifiers; it never derives them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId([u8; FUNCTION_ID_LEN]);

impl FunctionId {
    pub const fn new(bytes: [u8; FUNCTION_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; FUNCTION_ID_LEN] {
        &self.0
    }

    /// Derive an identifier from a canonical signature such as `getX()`.
    ///
    /// Uses the first four bytes of the SHA-256 digest. Fixtures and the CLI
    /// use this; the registry itself treats identifiers as opaque.
    pub fn from_signature(signature: &str) -> Self {
        let digest = Sha256::digest(signature.as_bytes());
        let mut bytes = [0u8; FUNCTION_ID_LEN];
        bytes.copy_from_slice(&digest[..FUNCTION_ID_LEN]);
        Self(bytes)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionId({self})")
    }
}

impl FromStr for FunctionId {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed("function id", s).map(Self)
    }
}

/// Opaque handle to an external code unit.
///
/// [`ModuleAddress::NULL`] marks "no module" in cut entries and is never a
/// valid route target.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleAddress([u8; ADDRESS_LEN]);

impl ModuleAddress {
    pub const NULL: ModuleAddress = ModuleAddress([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Address whose trailing eight bytes hold `value` big-endian.
    pub const fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LEN];
        let low = value.to_be_bytes();
        let mut i = 0;
        while i < low.len() {
            bytes[ADDRESS_LEN - low.len() + i] = low[i];
            i += 1;
        }
        Self(bytes)
    }

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }
}

impl fmt::Display for ModuleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ModuleAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleAddress({self})")
    }
}

impl FromStr for ModuleAddress {
    type Err = ParseHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_fixed("module address", s).map(Self)
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_serde!(FunctionId);
hex_serde!(ModuleAddress);

/// Edit kind for one cut entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutAction {
    Add,
    Replace,
    Remove,
}

impl fmt::Display for CutAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CutAction::Add => "add",
            CutAction::Replace => "replace",
            CutAction::Remove => "remove",
        };
        f.write_str(label)
    }
}

/// One `{module, action, functions}` edit inside a [`Cut`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutEntry {
    pub module: ModuleAddress,
    pub action: CutAction,
    pub functions: Vec<FunctionId>,
}

impl CutEntry {
    pub fn add(module: ModuleAddress, functions: Vec<FunctionId>) -> Self {
        Self {
            module,
            action: CutAction::Add,
            functions,
        }
    }

    pub fn replace(module: ModuleAddress, functions: Vec<FunctionId>) -> Self {
        Self {
            module,
            action: CutAction::Replace,
            functions,
        }
    }

    /// Remove entries always target [`ModuleAddress::NULL`].
    pub fn remove(functions: Vec<FunctionId>) -> Self {
        Self {
            module: ModuleAddress::NULL,
            action: CutAction::Remove,
            functions,
        }
    }
}

/// Payload forwarded to a module: the entry point plus its arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub function: FunctionId,
    #[serde(default)]
    pub args: Value,
}

impl Call {
    pub fn new(function: FunctionId, args: Value) -> Self {
        Self { function, args }
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function, self.args)
    }
}

/// One-shot call executed after a cut's edits, inside the same atomic step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Initializer {
    pub module: ModuleAddress,
    pub call: Call,
}

/// Atomic batch of route edits with an optional initializer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cut {
    pub entries: Vec<CutEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<Initializer>,
}

impl Cut {
    pub fn new(entries: Vec<CutEntry>) -> Self {
        Self {
            entries,
            init: None,
        }
    }

    pub fn with_init(mut self, init: Initializer) -> Self {
        self.init = Some(init);
        self
    }
}

/// A module together with the identifiers it owns, in its internal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRoutes {
    pub module: ModuleAddress,
    pub functions: Vec<FunctionId>,
}

impl ModuleRoutes {
    pub fn new(module: ModuleAddress, functions: Vec<FunctionId>) -> Self {
        Self { module, functions }
    }
}

/// Notifications emitted by successful mutations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RouterEvent {
    /// A cut (and its initializer, if any) committed.
    CutApplied { cut: Cut },
    /// Ownership changed hands. Emitted even when `previous == current`.
    OwnershipTransferred {
        previous: ModuleAddress,
        current: ModuleAddress,
    },
}
