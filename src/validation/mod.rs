//! Input validation module.
//!
//! Provides validators for package identifiers and for service install
//! parameters.

mod package_id;
mod parameters;

pub use package_id::validate_package_id;
pub use parameters::{extract_install_args, ParameterSchema};
