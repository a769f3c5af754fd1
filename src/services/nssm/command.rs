//! NSSM command set and command line construction.

use std::fmt;

use crate::error::{SvcmError, SvcmResult};
use crate::services::traits::Operation;

use super::params::{NssmParameter, StartMode};

/// Minimum install arguments: the positional service name and application.
pub const MIN_INSTALL_ARGS: usize = 2;

/// Start mode applied by `disable`.
// TODO: confirm with product whether disable should set SERVICE_DISABLED
// rather than SERVICE_DEMAND_START.
pub const DISABLED_START_MODE: StartMode = StartMode::Demand;

/// NSSM commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NssmCommand {
    Install,
    Remove,
    Start,
    Stop,
    Restart,
    Status,
    Set,
}

impl NssmCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            NssmCommand::Install => "install",
            NssmCommand::Remove => "remove",
            NssmCommand::Start => "start",
            NssmCommand::Stop => "stop",
            NssmCommand::Restart => "restart",
            NssmCommand::Status => "status",
            NssmCommand::Set => "set",
        }
    }

    /// Primitive commands take the service name as their only argument.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            NssmCommand::Start | NssmCommand::Stop | NssmCommand::Restart | NssmCommand::Status
        )
    }
}

impl fmt::Display for NssmCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the full NSSM argument vector for a lifecycle operation.
///
/// `install_args[0]` is the service name. Operations whose arguments are
/// unavailable fail before anything is spawned.
pub fn build_command_line(
    program: &str,
    install_args: &[String],
    operation: Operation,
) -> SvcmResult<Vec<String>> {
    let command = match operation {
        Operation::Setup => NssmCommand::Install,
        Operation::Remove => NssmCommand::Remove,
        Operation::Enable | Operation::Disable => NssmCommand::Set,
        Operation::Start => NssmCommand::Start,
        Operation::Stop => NssmCommand::Stop,
        Operation::Restart => NssmCommand::Restart,
        Operation::Status => NssmCommand::Status,
    };

    let mut argv = vec![program.to_string(), command.as_str().to_string()];

    if operation == Operation::Setup {
        if install_args.len() < MIN_INSTALL_ARGS {
            return Err(SvcmError::insufficient_arguments(argv));
        }
        argv.extend(install_args.iter().cloned());
        return Ok(argv);
    }

    let Some(name) = install_args.first() else {
        return Err(SvcmError::insufficient_arguments(argv));
    };
    argv.push(name.clone());

    match operation {
        Operation::Remove => argv.push("confirm".to_string()),
        Operation::Enable => {
            argv.push(NssmParameter::Start.as_str().to_string());
            argv.push(StartMode::Auto.as_str().to_string());
        }
        Operation::Disable => {
            argv.push(NssmParameter::Start.as_str().to_string());
            argv.push(DISABLED_START_MODE.as_str().to_string());
        }
        _ => debug_assert!(command.is_primitive()),
    }

    Ok(argv)
}
