//! Configuration module for the service agent.
//!
//! Handles loading and validating agent configuration from TOML files.

mod settings;

pub use settings::*;
