//! Control process executor.
//!
//! Handles subprocess spawning, execution timeouts and failure classification.

mod subprocess;

pub use subprocess::{
    run_command, CommandResult, SubprocessBuilder, DEFAULT_COMMAND_TIMEOUT,
    DEFAULT_IDENTITY_TIMEOUT,
};
