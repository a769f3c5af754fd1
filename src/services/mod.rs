//! Service manager module.
//!
//! Contains the service manager interface, its backends and the backend
//! registry.
//!
//! ## Adding a New Backend
//!
//! 1. Create a new module in this directory (e.g., `winsw/`)
//! 2. Implement the `ServiceManager` trait, validating everything in the
//!    constructor
//! 3. Register the constructor in `ManagerRegistry::new()`

mod locator;
pub mod nssm;
mod registry;
mod traits;

pub use locator::{ExecutableHandle, ExecutableLocator};
pub use nssm::NssmServiceManager;
pub use registry::ManagerRegistry;
pub use traits::{ManagerConstructor, ManagerOptions, Operation, ServiceManager};
