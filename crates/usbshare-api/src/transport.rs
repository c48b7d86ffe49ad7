// Shared subprocess configuration for invoking the daemon executable.
//
// Every call goes through `TransportConfig::run`, which owns the launch,
// timeout, output capture and exit-status policy so the client methods
// only decide which arguments to pass.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::Error;

/// Executable name looked up on `PATH` when nothing else is configured.
pub const DEFAULT_PROGRAM: &str = "usbipd";

/// Upper bound on a single daemon invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared transport configuration for daemon invocations.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Executable name (resolved via `PATH`) or explicit path.
    pub program: PathBuf,
    /// Hard limit per invocation; the child is killed when it elapses.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Captured output of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl TransportConfig {
    /// Resolve the configured program to an existing file, if any.
    pub fn resolve_program(&self) -> Option<PathBuf> {
        resolve_executable(&self.program)
    }

    /// Run the program with `args`, capturing stdout/stderr.
    ///
    /// A non-zero exit status is an error; so is exceeding `timeout`, in
    /// which case the child is killed when its handle is dropped.
    pub async fn run<I, S>(&self, args: I) -> Result<CommandOutput, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<_> = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect();
        debug!(program = %self.program.display(), ?args, "running daemon command");

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| self.launch_error(source))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| self.launch_error(source))?,
            Err(_) => {
                return Err(Error::Timeout {
                    timeout: self.timeout,
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!(status = ?output.status, stdout_len = stdout.len(), "daemon command finished");

        if !output.status.success() {
            return Err(Error::Exited {
                code: output.status.code(),
                stderr: stderr.trim().to_owned(),
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }

    fn launch_error(&self, source: std::io::Error) -> Error {
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotInstalled {
                program: self.program.clone(),
            }
        } else {
            Error::Launch {
                program: self.program.clone(),
                source,
            }
        }
    }
}

/// Find `program` the way a shell would.
///
/// Paths with more than one component are checked directly; bare names
/// are searched in every `PATH` entry (adding `.exe` on Windows).
pub fn resolve_executable(program: &Path) -> Option<PathBuf> {
    if program.as_os_str().is_empty() {
        return None;
    }
    if program.is_absolute() || program.components().count() > 1 {
        return program.is_file().then(|| program.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) && candidate.extension().is_none() {
            let exe = candidate.with_extension("exe");
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}
