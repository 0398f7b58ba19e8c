//! Forwarded execution: modules supply code, the router supplies state.
//!
//! A module is anything implementing [`Executable`]. When the router forwards a
//! call it hands the module an [`ExecutionContext`] whose `state` is the
//! router's own [`Storage`], so modules stay logic-only and every durable write
//! lands in the router.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::types::{Call, ModuleAddress};

/// Failure returned by a module. `message` is `None` when the module gave no reason.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecutionFailure {
    pub message: Option<String>,
}

impl ExecutionFailure {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self { message: None }
    }
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or("<no message>"))
    }
}

/// Read/write access to the router's durable key/value state.
pub trait StateAccess {
    fn read(&self, key: &str) -> Option<&Value>;
    fn write(&mut self, key: &str, value: Value);
    fn clear(&mut self, key: &str) -> Option<Value>;
}

/// The router's durable state. Ordered so snapshots serialize deterministically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Storage(BTreeMap<String, Value>);

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl StateAccess for Storage {
    fn read(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn write(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    fn clear(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

/// Everything a module sees while running on the router's behalf.
pub struct ExecutionContext<'a> {
    /// Account that invoked the router (not the router itself).
    pub caller: ModuleAddress,
    /// The router's own address.
    pub router: ModuleAddress,
    pub state: &'a mut dyn StateAccess,
}

/// Code that can be reached by forwarding.
pub trait Executable: Send + Sync {
    fn execute(&self, ctx: &mut ExecutionContext<'_>, call: &Call) -> Result<Value, ExecutionFailure>;
}

/// Lookup of executable code by address.
pub trait ModuleSource {
    fn code_at(&self, address: &ModuleAddress) -> Option<Arc<dyn Executable>>;
}

/// In-process module registry.
#[derive(Default, Clone)]
pub struct ModuleHost {
    code: HashMap<ModuleAddress, Arc<dyn Executable>>,
}

impl ModuleHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `code` at `address`, replacing whatever was there.
    pub fn deploy(&mut self, address: ModuleAddress, code: Arc<dyn Executable>) {
        self.code.insert(address, code);
    }

    pub fn with(mut self, address: ModuleAddress, code: Arc<dyn Executable>) -> Self {
        self.deploy(address, code);
        self
    }

    pub fn addresses(&self) -> impl Iterator<Item = &ModuleAddress> {
        self.code.keys()
    }
}

impl fmt::Debug for ModuleHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut addresses: Vec<_> = self.addresses().collect();
        addresses.sort();
        f.debug_struct("ModuleHost")
            .field("addresses", &addresses)
            .finish()
    }
}

impl ModuleSource for ModuleHost {
    fn code_at(&self, address: &ModuleAddress) -> Option<Arc<dyn Executable>> {
        self.code.get(address).cloned()
    }
}
