//! Package identifier validation.
//!
//! Package ids name a directory in the local package repository and have
//! the form `<name>--<version>`.

use crate::error::{ConfigErrorKind, SvcmError};

/// Separator between package name and version.
const ID_SEPARATOR: &str = "--";

fn invalid(id: &str, message: &str) -> SvcmError {
    SvcmError::Config {
        kind: ConfigErrorKind::InvalidPackageId {
            id: id.to_string(),
            message: message.to_string(),
        },
    }
}

/// Validate a package id and split it into `(name, version)`.
///
/// # Example
///
/// ```
/// use winsvc_agent::validation::validate_package_id;
///
/// let (name, version) = validate_package_id("mesos--1.9.0").unwrap();
/// assert_eq!(name, "mesos");
/// assert_eq!(version, "1.9.0");
/// assert!(validate_package_id("mesos").is_err());
/// ```
pub fn validate_package_id(id: &str) -> Result<(&str, &str), SvcmError> {
    if id.is_empty() {
        return Err(invalid(id, "Package id cannot be empty"));
    }

    // The id becomes a path component
    if id.contains("..")
        || id.contains('/')
        || id.contains('\\')
        || id.contains(':')
        || id.chars().any(char::is_control)
    {
        return Err(invalid(id, "Package id contains invalid characters"));
    }

    let (name, version) = id
        .split_once(ID_SEPARATOR)
        .ok_or_else(|| invalid(id, "Expected <name>--<version>"))?;

    if name.is_empty() {
        return Err(invalid(id, "Package name cannot be empty"));
    }
    if version.is_empty() || version.contains(ID_SEPARATOR) {
        return Err(invalid(id, "Package version is malformed"));
    }

    Ok((name, version))
}
