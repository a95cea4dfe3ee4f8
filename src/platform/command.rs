//! External command execution.
//!
//! Package and service backends never spawn processes directly; they go
//! through a [`CommandRunner`] so that their parsing can be exercised with
//! scripted output.

use crate::HostcheckError;
use std::process::Command;
use tracing::debug;

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code (None if terminated by a signal)
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Runs external programs on behalf of the platform backends.
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` and capture its output.
    ///
    /// A non-zero exit status is not an error; only failing to spawn is.
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, HostcheckError>;
}

/// Runs commands on the local machine via `std::process::Command`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, HostcheckError> {
        debug!(program, ?args, "running host query");

        let output = Command::new(program)
            .args(args)
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| HostcheckError::Command {
                command: render(program, args),
                message: e.to_string(),
            })?;

        let result = CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(program, status = ?result.status, "host query finished");
        Ok(result)
    }
}

/// Render a command line for error messages
pub fn render(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Build a `HostcheckError::Command` from a failed command's stderr
pub fn command_error(program: &str, args: &[&str], output: &CommandOutput) -> HostcheckError {
    let stderr = output.stderr.trim();
    let message = if stderr.is_empty() {
        match output.status {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    } else {
        stderr.to_string()
    };

    HostcheckError::Command {
        command: render(program, args),
        message,
    }
}
