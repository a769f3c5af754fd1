//! Service manager traits.
//!
//! Defines the lifecycle interface every service manager backend exposes,
//! and the options a backend is constructed from.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::descriptor::ServiceDescriptor;
use crate::error::{SetupErrorKind, SvcmError, SvcmResult};
use crate::executor::{CommandResult, DEFAULT_COMMAND_TIMEOUT, DEFAULT_IDENTITY_TIMEOUT};
use crate::templates::TemplateContext;

/// Lifecycle operations of a managed service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Setup,
    Remove,
    Enable,
    Disable,
    Start,
    Stop,
    Restart,
    Status,
}

impl Operation {
    /// All operations.
    pub const ALL: [Operation; 8] = [
        Operation::Setup,
        Operation::Remove,
        Operation::Enable,
        Operation::Disable,
        Operation::Start,
        Operation::Stop,
        Operation::Restart,
        Operation::Status,
    ];

    /// Lower-case operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Setup => "setup",
            Operation::Remove => "remove",
            Operation::Enable => "enable",
            Operation::Disable => "disable",
            Operation::Start => "start",
            Operation::Stop => "stop",
            Operation::Restart => "restart",
            Operation::Status => "status",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("Unknown operation: {}", s))
    }
}

/// Everything a backend needs to build a ready-to-use manager.
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    /// Package the service belongs to, for diagnostics.
    pub pkg_id: Option<String>,
    /// Parsed service descriptor.
    pub descriptor: ServiceDescriptor,
    /// Substitution variables for install arguments.
    pub template: TemplateContext,
    /// Explicit control executable; searched on `search_path` when unset
    /// or relative.
    pub exec_path: Option<PathBuf>,
    /// Executable search path; the process `PATH` when unset.
    pub search_path: Option<OsString>,
    /// Timeout for lifecycle commands.
    pub command_timeout: Duration,
    /// Timeout for the executable identity check.
    pub identity_timeout: Duration,
}

impl ManagerOptions {
    /// Options with default timeouts and loopback template variables.
    pub fn new(descriptor: ServiceDescriptor) -> Self {
        Self {
            pkg_id: None,
            descriptor,
            template: TemplateContext::default(),
            exec_path: None,
            search_path: None,
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
            identity_timeout: DEFAULT_IDENTITY_TIMEOUT,
        }
    }

    pub fn pkg_id(mut self, pkg_id: impl Into<String>) -> Self {
        self.pkg_id = Some(pkg_id.into());
        self
    }

    pub fn template(mut self, template: TemplateContext) -> Self {
        self.template = template;
        self
    }

    pub fn exec_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.exec_path = Some(path.into());
        self
    }

    pub fn search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn identity_timeout(mut self, timeout: Duration) -> Self {
        self.identity_timeout = timeout;
        self
    }
}

/// A Windows service manager backend.
///
/// Implementations validate everything they need during construction, so
/// a value of this trait is always ready to run lifecycle operations. Each
/// operation spawns at most one control process and blocks until it exits
/// or times out. Callers must not run two operations against the same
/// service concurrently.
pub trait ServiceManager: Send + Sync {
    /// Backend identifier (e.g., "nssm").
    fn kind(&self) -> &'static str;

    /// Name the service is registered under, if known.
    fn service_name(&self) -> Option<&str>;

    /// Register the service.
    fn setup(&self) -> SvcmResult<()>;

    /// Unregister the service.
    fn remove(&self) -> SvcmResult<()>;

    /// Start the service at OS bootstrap.
    fn enable(&self) -> SvcmResult<()>;

    /// Do not start the service at OS bootstrap.
    fn disable(&self) -> SvcmResult<()>;

    /// Start the registered service immediately.
    fn start(&self) -> SvcmResult<()>;

    /// Stop the registered service immediately.
    fn stop(&self) -> SvcmResult<()>;

    /// Restart the registered service immediately.
    fn restart(&self) -> SvcmResult<()>;

    /// Query the service status; interpretation is left to the caller.
    fn status(&self) -> SvcmResult<CommandResult>;

    /// Run an operation by value. Only `status` yields a result.
    fn execute(&self, operation: Operation) -> SvcmResult<Option<CommandResult>> {
        match operation {
            Operation::Setup => self.setup().map(|_| None),
            Operation::Remove => self.remove().map(|_| None),
            Operation::Enable => self.enable().map(|_| None),
            Operation::Disable => self.disable().map(|_| None),
            Operation::Start => self.start().map(|_| None),
            Operation::Stop => self.stop().map(|_| None),
            Operation::Restart => self.restart().map(|_| None),
            Operation::Status => self.status().map(Some),
        }
    }
}

/// Construction hook registered for a backend.
pub type ManagerConstructor = fn(ManagerOptions) -> SvcmResult<Box<dyn ServiceManager>>;

/// Error for a backend name nothing is registered under.
pub(crate) fn unknown_manager(name: &str) -> SvcmError {
    SvcmError::Setup {
        kind: SetupErrorKind::UnknownManager {
            name: name.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
    }

    #[test]
    fn test_unknown_operation() {
        assert!("install".parse::<Operation>().is_err());
        assert!("Start".parse::<Operation>().is_err());
    }

    #[test]
    fn test_options_defaults() {
        let options = ManagerOptions::new(ServiceDescriptor::new());
        assert_eq!(options.command_timeout, Duration::from_secs(30));
        assert_eq!(options.identity_timeout, Duration::from_secs(5));
        assert_eq!(options.template.master_ip, "127.0.0.1");
        assert!(options.exec_path.is_none());
    }
}
