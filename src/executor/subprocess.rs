//! Control process execution.
//!
//! Runs the service control utility as a single external process:
//! - No shell interpretation (direct exec of an argument vector)
//! - Timeout enforcement with kill and reap
//! - Captured stdout/stderr, drained while the process runs
//! - Every non-successful outcome classified as a command error

use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{CommandErrorKind, FailureCause, SvcmError, SvcmResult};

/// Timeout applied to lifecycle commands.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to the executable identity check.
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a successful control process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// The exit code reported by the process.
    pub exit_code: i32,
    /// Captured stdout as a string.
    pub stdout: String,
    /// Captured stderr as a string.
    pub stderr: String,
}

impl CommandResult {
    fn from_output(output: &Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or_default(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// First line of stdout, falling back to stderr when stdout is empty.
    pub fn first_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(str::trim)
            .find(|line| !line.is_empty())
    }
}

/// Builder for a control process invocation.
pub struct SubprocessBuilder {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SubprocessBuilder {
    /// Create a new subprocess builder.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Add arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args.extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Set the timeout for the command.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full argument vector, program first.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }

    fn failed(&self, cause: FailureCause, stderr: String) -> SvcmError {
        SvcmError::Command {
            kind: CommandErrorKind::Failed {
                argv: self.argv(),
                cause,
                stderr,
            },
        }
    }

    /// Execute the command once and wait for completion.
    ///
    /// Exit code 0 yields a [`CommandResult`]. A non-zero exit, a timeout
    /// (the process is killed and reaped) or a spawn failure yields a
    /// command error carrying the argument vector and captured stderr.
    pub fn run(self) -> SvcmResult<CommandResult> {
        debug!(
            program = %self.program,
            args = ?self.args,
            timeout_secs = self.timeout.as_secs(),
            "Executing control process"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                self.failed(
                    FailureCause::Spawn {
                        message: e.to_string(),
                    },
                    String::new(),
                )
            })?;

        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let start = Instant::now();
        let poll_interval = Duration::from_millis(50);

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        warn!(
                            program = %self.program,
                            timeout_secs = self.timeout.as_secs(),
                            "Control process timed out, killing"
                        );
                        if let Err(e) = child.kill() {
                            warn!(error = %e, "Failed to kill timed-out process");
                        }
                        let _ = child.wait();
                        // Readers are left detached; a grandchild may still hold the pipes
                        return Err(self.failed(
                            FailureCause::Timeout {
                                timeout_secs: self.timeout.as_secs(),
                            },
                            String::new(),
                        ));
                    }
                    thread::sleep(poll_interval);
                }
                Err(e) => {
                    return Err(self.failed(
                        FailureCause::Wait {
                            message: e.to_string(),
                        },
                        String::new(),
                    ));
                }
            }
        };

        let output = Output {
            status,
            stdout: collect(stdout),
            stderr: collect(stderr),
        };

        debug!(
            exit_code = ?output.status.code(),
            duration_ms = start.elapsed().as_millis(),
            "Control process completed"
        );

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).replace('\n', " ");
            return Err(self.failed(
                FailureCause::NonZeroExit {
                    code: output.status.code(),
                },
                stderr.trim().to_string(),
            ));
        }

        Ok(CommandResult::from_output(&output))
    }
}

/// Read a child pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut buf) {
            warn!(error = %e, "Failed to read control process output");
        }
        buf
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

/// Run a full argument vector (program first) under the given timeout.
pub fn run_command(argv: &[String], timeout: Duration) -> SvcmResult<CommandResult> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| SvcmError::insufficient_arguments(Vec::new()))?;

    SubprocessBuilder::new(program)
        .args(args)
        .timeout(timeout)
        .run()
}
