//! Error types for the service manager.
//!
//! Provides a unified error handling system using thiserror.

mod types;

pub use types::*;
