//! # Access Control
//!
//! Single-principal authority gate. The governor is fixed when the registry
//! is constructed; no operation changes it afterwards.

use poi_core::{PrincipalId, RegistryError};

/// Decides whether a caller may mutate the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessControl {
    governor: PrincipalId,
}

impl AccessControl {
    /// Create the gate for the given governor.
    pub fn new(governor: PrincipalId) -> Self {
        Self { governor }
    }

    /// The configured governor.
    pub fn governor(&self) -> PrincipalId {
        self.governor
    }

    /// Whether `caller` is the governor.
    pub fn is_governor(&self, caller: PrincipalId) -> bool {
        caller == self.governor
    }

    /// Reject every caller except the governor.
    pub fn authorize(&self, caller: PrincipalId) -> Result<(), RegistryError> {
        if self.is_governor(caller) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized { caller })
        }
    }
}
