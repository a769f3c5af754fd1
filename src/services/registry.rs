//! Service manager registry.
//!
//! Maps backend names to their constructors so the backend can be chosen
//! from configuration at construction time.

use std::collections::HashMap;

use tracing::{debug, info};

use super::nssm::{NssmServiceManager, NSSM_KIND};
use super::traits::{unknown_manager, ManagerConstructor, ManagerOptions, ServiceManager};
use crate::error::SvcmResult;

/// Registry of all available service manager backends.
pub struct ManagerRegistry {
    backends: HashMap<&'static str, ManagerConstructor>,
}

impl ManagerRegistry {
    /// Create a new registry with all built-in backends.
    pub fn new() -> Self {
        let mut registry = Self {
            backends: HashMap::new(),
        };

        registry.register(NSSM_KIND, NssmServiceManager::boxed);

        debug!(
            count = registry.backends.len(),
            "Service manager registry initialized"
        );

        registry
    }

    /// Register a backend constructor under a name.
    pub fn register(&mut self, kind: &'static str, constructor: ManagerConstructor) {
        self.backends.insert(kind, constructor);
    }

    /// Build a manager of the named backend.
    pub fn create(&self, kind: &str, options: ManagerOptions) -> SvcmResult<Box<dyn ServiceManager>> {
        let constructor = self.backends.get(kind).ok_or_else(|| unknown_manager(kind))?;
        let manager = constructor(options)?;
        info!(kind = kind, service = ?manager.service_name(), "Service manager created");
        Ok(manager)
    }

    /// Whether a backend is registered under the name.
    pub fn contains(&self, kind: &str) -> bool {
        self.backends.contains_key(kind)
    }

    /// List all registered backend names.
    pub fn list(&self) -> Vec<&'static str> {
        self.backends.keys().copied().collect()
    }
}

impl Default for ManagerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
