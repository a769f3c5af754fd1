//! NSSM-based Windows service manager.

use std::time::Duration;

use tracing::{debug, info};

use crate::error::SvcmResult;
use crate::executor::{run_command, CommandResult};
use crate::services::locator::{ExecutableHandle, ExecutableLocator};
use crate::services::traits::{ManagerOptions, Operation, ServiceManager};
use crate::templates::TemplateEngine;
use crate::validation::{extract_install_args, ParameterSchema};

use super::command::build_command_line;
use super::params::{NssmParameter, SERVICE_SECTION};

/// Backend identifier.
pub const NSSM_KIND: &str = "nssm";

/// Executable file name looked up on the search path.
pub const NSSM_EXEC_NAME: &str = "nssm.exe";

/// Token the first line of `nssm version` starts with.
pub const NSSM_IDENTITY_PREFIX: &str = "NSSM";

/// Windows service manager driving the NSSM utility.
///
/// The executable and the install arguments are verified once, at
/// construction, and never change afterwards.
#[derive(Debug, Clone)]
pub struct NssmServiceManager {
    pkg_id: Option<String>,
    executable: ExecutableHandle,
    install_args: Vec<String>,
    command_timeout: Duration,
}

impl NssmServiceManager {
    /// Build a manager using the NSSM parameter schema.
    pub fn new(options: ManagerOptions) -> SvcmResult<Self> {
        Self::with_schema(options, &NssmParameter::schema())
    }

    /// Build a manager validating the descriptor against `schema`.
    ///
    /// The executable is located and verified first, then the descriptor
    /// is validated, and finally the install arguments are rendered.
    pub fn with_schema(options: ManagerOptions, schema: &ParameterSchema) -> SvcmResult<Self> {
        let locator = ExecutableLocator {
            file_name: NSSM_EXEC_NAME,
            identity_arg: "version",
            identity_prefix: NSSM_IDENTITY_PREFIX,
            timeout: options.identity_timeout,
        };
        let executable =
            locator.locate(options.exec_path.as_deref(), options.search_path.as_deref())?;

        let raw_args = extract_install_args(&options.descriptor, SERVICE_SECTION, schema)?;
        let install_args = TemplateEngine::new(&options.template)?.render_all(&raw_args)?;

        info!(
            pkg_id = ?options.pkg_id,
            executable = %executable.path().display(),
            service = ?install_args.first(),
            "NSSM service manager ready"
        );

        Ok(Self {
            pkg_id: options.pkg_id,
            executable,
            install_args,
            command_timeout: options.command_timeout,
        })
    }

    /// Construct directly into `ServiceManager` form, for the registry.
    pub fn boxed(options: ManagerOptions) -> SvcmResult<Box<dyn ServiceManager>> {
        Ok(Box::new(Self::new(options)?))
    }

    /// The verified control executable.
    pub fn executable(&self) -> &ExecutableHandle {
        &self.executable
    }

    /// Rendered install arguments.
    pub fn install_args(&self) -> &[String] {
        &self.install_args
    }

    /// Package this manager serves, if known.
    pub fn pkg_id(&self) -> Option<&str> {
        self.pkg_id.as_deref()
    }

    /// Argument vector an operation would run, without running it.
    pub fn command_line(&self, operation: Operation) -> SvcmResult<Vec<String>> {
        build_command_line(&self.executable.program(), &self.install_args, operation)
    }

    fn run(&self, operation: Operation) -> SvcmResult<CommandResult> {
        let argv = self.command_line(operation)?;
        debug!(operation = %operation, argv = ?argv, "Running service operation");

        let result = run_command(&argv, self.command_timeout)?;

        info!(
            pkg_id = ?self.pkg_id,
            service = ?self.service_name(),
            operation = %operation,
            "Service operation completed"
        );
        Ok(result)
    }
}

impl ServiceManager for NssmServiceManager {
    fn kind(&self) -> &'static str {
        NSSM_KIND
    }

    fn service_name(&self) -> Option<&str> {
        self.install_args.first().map(String::as_str)
    }

    fn setup(&self) -> SvcmResult<()> {
        self.run(Operation::Setup).map(|_| ())
    }

    fn remove(&self) -> SvcmResult<()> {
        self.run(Operation::Remove).map(|_| ())
    }

    fn enable(&self) -> SvcmResult<()> {
        self.run(Operation::Enable).map(|_| ())
    }

    fn disable(&self) -> SvcmResult<()> {
        self.run(Operation::Disable).map(|_| ())
    }

    fn start(&self) -> SvcmResult<()> {
        self.run(Operation::Start).map(|_| ())
    }

    fn stop(&self) -> SvcmResult<()> {
        self.run(Operation::Stop).map(|_| ())
    }

    fn restart(&self) -> SvcmResult<()> {
        self.run(Operation::Restart).map(|_| ())
    }

    fn status(&self) -> SvcmResult<CommandResult> {
        self.run(Operation::Status)
    }
}
