//! NSSM backend.
//!
//! Drives the Non-Sucking Service Manager (`nssm.exe`) to register and
//! control Windows services.

mod command;
mod manager;
mod params;

pub use command::{build_command_line, NssmCommand, DISABLED_START_MODE, MIN_INSTALL_ARGS};
pub use manager::{NssmServiceManager, NSSM_EXEC_NAME, NSSM_IDENTITY_PREFIX, NSSM_KIND};
pub use params::{NssmParameter, StartMode, SERVICE_SECTION};
