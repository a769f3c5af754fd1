//! Windows service management for cluster packages.
//!
//! This crate turns a package's declarative service descriptor into
//! lifecycle operations (install, remove, enable, disable, start, stop,
//! restart, status) carried out by an external service control utility.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod executor;
pub mod package;
pub mod services;
pub mod templates;
pub mod validation;
