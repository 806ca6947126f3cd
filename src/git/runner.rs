//! External command execution
//!
//! Every git, nmcli, pre-commit and pip invocation goes through a
//! [`CommandRunner`]. The process-backed [`SystemRunner`] is the only place
//! that decides whether a failure was caused by lost connectivity.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::error::{CommandError, FailureKind};

/// stderr fragments that mean the network itself was unreachable
const CONNECTIVITY_SIGNATURES: &[&str] = &[
    "could not resolve host",
    "could not resolve hostname",
    "temporary failure in name resolution",
    "name or service not known",
    "network is unreachable",
    "no route to host",
];

/// Runs an external program and captures its output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program args` (inside `cwd` when given)
    ///
    /// Returns stdout with trailing whitespace removed when the program exits
    /// zero, and a classified [`CommandError`] otherwise.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<String, CommandError>;
}

/// [`CommandRunner`] backed by real child processes
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<String, CommandError> {
        let command_line = render_command(program, args);
        debug!(command = %command_line, "running");

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            // Credentials live in the remote URL; never block on a password prompt
            .env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = cwd {
            command.current_dir(dir);
        }

        let output = command
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                command: command_line.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let status = output.status.code();
        let kind = classify_failure(status, &stderr);
        debug!(command = %command_line, ?status, ?kind, "command failed");
        Err(CommandError::Failed {
            command: command_line,
            status,
            stderr,
            kind,
        })
    }
}

/// Decides whether a failed command lost the network or failed on its own
pub fn classify_failure(status: Option<i32>, stderr: &str) -> FailureKind {
    if status.is_none() {
        return FailureKind::Failure;
    }
    let stderr = stderr.to_lowercase();
    if CONNECTIVITY_SIGNATURES
        .iter()
        .any(|signature| stderr.contains(signature))
    {
        FailureKind::Connectivity
    } else {
        FailureKind::Failure
    }
}

/// Renders a command line for logs and error messages
///
/// User information embedded in https URLs is masked.
pub fn render_command(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|arg| redact_userinfo(arg)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn redact_userinfo(arg: &str) -> String {
    let Some(rest) = arg.strip_prefix("https://") else {
        return arg.to_string();
    };
    let authority = rest.split('/').next().unwrap_or_default();
    match authority.rsplit_once('@') {
        Some((_, host)) => format!("https://***@{host}{}", &rest[authority.len()..]),
        None => arg.to_string(),
    }
}

/// Converts borrowed arguments into the owned form [`CommandRunner::run`] takes
pub fn to_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| (*arg).to_string()).collect()
}
