//! Structured failures raised by the command-execution layer

use thiserror::Error;

/// Category of a failed external command, decided where the command ran
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Nonzero exit not attributable to the network
    Failure,
    /// The network, not the remote service, could not be reached
    Connectivity,
}

/// An external command that could not be started or exited nonzero
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("`{command}` failed ({}): {stderr}", describe_status(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
        kind: FailureKind,
    },
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Returns the failure category; a command that never started is a plain failure
    pub fn kind(&self) -> FailureKind {
        match self {
            CommandError::Failed { kind, .. } => *kind,
            CommandError::Spawn { .. } => FailureKind::Failure,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        self.kind() == FailureKind::Connectivity
    }

    /// Captured stderr of the failed command (empty when it never started)
    pub fn stderr(&self) -> &str {
        match self {
            CommandError::Failed { stderr, .. } => stderr,
            CommandError::Spawn { .. } => "",
        }
    }

    pub fn status(&self) -> Option<i32> {
        match self {
            CommandError::Failed { status, .. } => *status,
            CommandError::Spawn { .. } => None,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {code}"),
        None => "terminated by signal".to_string(),
    }
}
