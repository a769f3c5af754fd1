//! Control executable lookup and verification.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{SetupErrorKind, SvcmError, SvcmResult};
use crate::executor::SubprocessBuilder;

/// A control executable that exists and identified itself correctly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableHandle {
    path: PathBuf,
    identity: String,
}

impl ExecutableHandle {
    /// Absolute path of the executable.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// First line the executable printed when asked for its identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Path as the first element of an argument vector.
    pub fn program(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Rules for finding and verifying one kind of control executable.
#[derive(Debug, Clone)]
pub struct ExecutableLocator {
    /// File name searched for when no absolute path is given.
    pub file_name: &'static str,
    /// Argument that makes the executable print its identity.
    pub identity_arg: &'static str,
    /// Prefix the first identity line must start with.
    pub identity_prefix: &'static str,
    /// Timeout for the identity check.
    pub timeout: Duration,
}

impl ExecutableLocator {
    /// Resolve and verify the executable.
    ///
    /// An absolute `explicit` path is used as is. A bare file name, whether
    /// explicit or the default, is looked up in `search_path` (the process
    /// `PATH` when `None`) in list order, first match wins. A relative path
    /// with a directory component resolves against the working directory.
    /// On Unix only files with an execute bit are candidates.
    pub fn locate(
        &self,
        explicit: Option<&Path>,
        search_path: Option<&OsStr>,
    ) -> SvcmResult<ExecutableHandle> {
        let candidate = explicit
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(self.file_name));

        let path = if candidate.is_absolute() {
            candidate
        } else {
            self.search(&candidate, search_path)?
        };

        if !path.is_file() {
            let kind = if path.exists() {
                SetupErrorKind::NotAFile { path }
            } else {
                SetupErrorKind::ExecutableNotFound { path }
            };
            return Err(SvcmError::Setup { kind });
        }

        let identity = self.identify(&path)?;

        info!(
            path = %path.display(),
            identity = %identity,
            "Control executable verified"
        );

        Ok(ExecutableHandle { path, identity })
    }

    fn search(&self, name: &Path, search_path: Option<&OsStr>) -> SvcmResult<PathBuf> {
        let paths: Option<OsString> = search_path
            .map(OsStr::to_os_string)
            .or_else(|| std::env::var_os("PATH"));
        let cwd = std::env::current_dir().unwrap_or_default();

        debug!(name = %name.display(), search_path = ?paths, "Searching for executable");

        which::which_in(name, paths, cwd).map_err(|e| {
            debug!(name = %name.display(), error = %e, "Executable lookup failed");
            SvcmError::Setup {
                kind: SetupErrorKind::ExecutableNotFound {
                    path: name.to_path_buf(),
                },
            }
        })
    }

    fn identify(&self, path: &Path) -> SvcmResult<String> {
        let result = SubprocessBuilder::new(&path.to_string_lossy())
            .arg(self.identity_arg)
            .timeout(self.timeout)
            .run()
            .map_err(|e| SvcmError::Setup {
                kind: SetupErrorKind::ExecutableBroken {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                },
            })?;

        let identity = result.first_line().unwrap_or_default().to_string();
        if !identity.starts_with(self.identity_prefix) {
            return Err(SvcmError::Setup {
                kind: SetupErrorKind::IdentityMismatch {
                    path: path.to_path_buf(),
                    identity,
                },
            });
        }

        Ok(identity)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn locator() -> ExecutableLocator {
        ExecutableLocator {
            file_name: "fake-ctl",
            identity_arg: "version",
            identity_prefix: "FAKE",
            timeout: Duration::from_secs(5),
        }
    }

    fn setup_kind(result: SvcmResult<ExecutableHandle>) -> SetupErrorKind {
        match result {
            Err(SvcmError::Setup { kind }) => kind,
            other => panic!("expected setup error, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_on_search_path() {
        let dir = tempfile::tempdir().unwrap();
        let kind = setup_kind(locator().locate(None, Some(dir.path().as_os_str())));
        assert!(matches!(kind, SetupErrorKind::ExecutableNotFound { .. }));
        assert!(kind.to_string().contains("Executable not found"));
    }

    #[test]
    fn test_non_executable_file_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("fake-ctl"), "#!/bin/sh\necho FAKE\n").unwrap();

        let kind = setup_kind(locator().locate(None, Some(dir.path().as_os_str())));
        assert!(matches!(kind, SetupErrorKind::ExecutableNotFound { .. }));
    }

    #[test]
    fn test_explicit_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("fake-ctl");
        let kind = setup_kind(locator().locate(Some(&missing), None));
        assert!(matches!(kind, SetupErrorKind::ExecutableNotFound { .. }));
    }

    #[test]
    fn test_explicit_path_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let kind = setup_kind(locator().locate(Some(dir.path()), None));
        assert!(matches!(kind, SetupErrorKind::NotAFile { .. }));
    }
}
