//! Module source for processes that only know module addresses.
//!
//! The CLI edits routes for modules whose code lives in another process. Those
//! addresses are valid route targets, but forwarding to them fails.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::core::types::{Call, ModuleAddress};
use crate::module::{Executable, ExecutionContext, ExecutionFailure, ModuleSource};

struct Unlinked {
    address: ModuleAddress,
}

impl Executable for Unlinked {
    fn execute(
        &self,
        _ctx: &mut ExecutionContext<'_>,
        call: &Call,
    ) -> Result<Value, ExecutionFailure> {
        Err(ExecutionFailure::with_message(format!(
            "module {} is not linked into this process (call {})",
            self.address, call.function
        )))
    }
}

/// Addresses configured as `linked_modules`.
pub struct LinkedModules {
    modules: HashMap<ModuleAddress, Arc<dyn Executable>>,
}

impl LinkedModules {
    pub fn new(addresses: &[ModuleAddress]) -> Self {
        let modules = addresses
            .iter()
            .map(|address| {
                let code: Arc<dyn Executable> = Arc::new(Unlinked { address: *address });
                (*address, code)
            })
            .collect();
        Self { modules }
    }
}

impl ModuleSource for LinkedModules {
    fn code_at(&self, address: &ModuleAddress) -> Option<Arc<dyn Executable>> {
        self.modules.get(address).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Storage;
    use crate::test_support::{addr, fid};

    #[test]
    fn linked_modules_count_as_code_but_cannot_run() {
        let linked = LinkedModules::new(&[addr(1)]);
        assert!(linked.code_at(&addr(2)).is_none());

        let code = linked.code_at(&addr(1)).expect("linked");
        let mut storage = Storage::new();
        let mut ctx = ExecutionContext {
            caller: addr(9),
            router: addr(10),
            state: &mut storage,
        };
        let failure = code
            .execute(&mut ctx, &Call::new(fid(1), Value::Null))
            .expect_err("unlinked");
        assert!(
            failure
                .message
                .expect("message")
                .contains("not linked into this process")
        );
    }
}
