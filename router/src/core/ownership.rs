//! Single-owner access gate for mutating entry points.

use serde::{Deserialize, Serialize};

use crate::core::types::{ModuleAddress, RouterEvent};
use crate::error::RouterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipGate {
    owner: ModuleAddress,
}

impl OwnershipGate {
    pub fn new(owner: ModuleAddress) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> ModuleAddress {
        self.owner
    }

    pub fn require_owner(&self, caller: ModuleAddress) -> Result<(), RouterError> {
        if caller != self.owner {
            return Err(RouterError::NotOwner {
                caller,
                owner: self.owner,
            });
        }
        Ok(())
    }

    /// Hand ownership to `new_owner`. Transferring to the current owner is
    /// allowed and still produces an event.
    pub fn transfer(
        &mut self,
        caller: ModuleAddress,
        new_owner: ModuleAddress,
    ) -> Result<RouterEvent, RouterError> {
        self.require_owner(caller)?;
        let previous = self.owner;
        self.owner = new_owner;
        Ok(RouterEvent::OwnershipTransferred {
            previous,
            current: new_owner,
        })
    }
}
