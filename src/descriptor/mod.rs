//! Service descriptor module.
//!
//! A service descriptor is the per-package INI file that declares how the
//! package runs as a Windows service.

mod reader;
mod types;

pub use types::{DescriptorSection, ServiceDescriptor};
