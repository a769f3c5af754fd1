//! Error types for the service manager.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for service management.
#[derive(Error, Debug)]
pub enum SvcmError {
    /// The control executable could not be located or verified.
    #[error("Service manager setup error: {kind}")]
    Setup { kind: SetupErrorKind },

    /// The service descriptor or package metadata is invalid.
    #[error("Service configuration error: {kind}")]
    Config { kind: ConfigErrorKind },

    /// A lifecycle command could not be built or failed to run.
    #[error("Service manager command error: {kind}")]
    Command { kind: CommandErrorKind },

    /// Agent settings file errors.
    #[error("Settings error: {message}")]
    Settings { message: String },
}

/// Setup error kinds.
#[derive(Error, Debug)]
pub enum SetupErrorKind {
    #[error("Executable not found: {path}")]
    ExecutableNotFound { path: PathBuf },

    #[error("Executable is not a file: {path}")]
    NotAFile { path: PathBuf },

    #[error("Executable broken: {path}: {message}")]
    ExecutableBroken { path: PathBuf, message: String },

    #[error("Executable mismatch: {path}: unexpected identity '{identity}'")]
    IdentityMismatch { path: PathBuf, identity: String },

    #[error("Unknown service manager: {name}")]
    UnknownManager { name: String },
}

/// Configuration error kinds.
#[derive(Error, Debug)]
pub enum ConfigErrorKind {
    #[error("Service configuration file not found: {path}")]
    DescriptorNotFound { path: PathBuf },

    #[error("Can't read {path}: {message}")]
    DescriptorUnreadable { path: PathBuf, message: String },

    #[error("Duplicate section '{section}'")]
    DuplicateSection { section: String },

    #[error("Duplicate option '{option}' in section '{section}'")]
    DuplicateOption { section: String, option: String },

    #[error("Section not found: {section}")]
    SectionNotFound { section: String },

    #[error("Required parameter unavailable: {param}")]
    MissingParameter { param: String },

    #[error("Variable parameters substitution: {message}")]
    Substitution { message: String },

    #[error("Package directory not found: {path}")]
    PackageNotFound { path: PathBuf },

    #[error("Invalid package id '{id}': {message}")]
    InvalidPackageId { id: String, message: String },

    #[error("Package info {path}: {message}")]
    PackageInfo { path: PathBuf, message: String },
}

/// Command error kinds.
#[derive(Error, Debug)]
pub enum CommandErrorKind {
    #[error("Insufficient arguments: {argv:?}")]
    InsufficientArguments { argv: Vec<String> },

    #[error("{argv:?}: {cause}: {stderr}")]
    Failed {
        argv: Vec<String>,
        cause: FailureCause,
        stderr: String,
    },
}

/// Why a spawned control process did not produce a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The process ran to completion with a non-zero (or no) exit code.
    NonZeroExit { code: Option<i32> },
    /// The process outlived its timeout and was killed.
    Timeout { timeout_secs: u64 },
    /// The OS refused to start the process.
    Spawn { message: String },
    /// Waiting on or collecting output from the process failed.
    Wait { message: String },
}

impl FailureCause {
    /// Short machine-friendly tag for the cause.
    pub fn tag(&self) -> &'static str {
        match self {
            FailureCause::NonZeroExit { .. } => "exit",
            FailureCause::Timeout { .. } => "timeout",
            FailureCause::Spawn { .. } => "spawn",
            FailureCause::Wait { .. } => "wait",
        }
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::NonZeroExit { code: Some(code) } => write!(f, "Exit code[{code}]"),
            FailureCause::NonZeroExit { code: None } => write!(f, "Terminated by signal"),
            FailureCause::Timeout { timeout_secs } => {
                write!(f, "Timed out after {timeout_secs} seconds")
            }
            FailureCause::Spawn { message } => write!(f, "Failed to spawn: {message}"),
            FailureCause::Wait { message } => write!(f, "Failed to wait: {message}"),
        }
    }
}

impl SvcmError {
    /// Shorthand for a missing required descriptor parameter.
    pub fn missing_parameter(param: impl Into<String>) -> Self {
        SvcmError::Config {
            kind: ConfigErrorKind::MissingParameter {
                param: param.into(),
            },
        }
    }

    /// Shorthand for an operation that lacks the arguments it needs.
    pub fn insufficient_arguments(argv: Vec<String>) -> Self {
        SvcmError::Command {
            kind: CommandErrorKind::InsufficientArguments { argv },
        }
    }

    /// The failure cause, if this is a failed process invocation.
    pub fn failure_cause(&self) -> Option<&FailureCause> {
        match self {
            SvcmError::Command {
                kind: CommandErrorKind::Failed { cause, .. },
            } => Some(cause),
            _ => None,
        }
    }
}

/// Result type alias for service manager operations.
pub type SvcmResult<T> = Result<T, SvcmError>;
