//! Error type shared by repository and orchestrator operations

use thiserror::Error;

use crate::core::discovery::DiscoveryError;
use crate::git::{CommandError, CredentialError};
use crate::vpn::VpnError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Vpn(#[from] VpnError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SyncError {
    /// The underlying command failure, if this error is one
    pub fn as_command(&self) -> Option<&CommandError> {
        match self {
            SyncError::Command(err) => Some(err),
            _ => None,
        }
    }
}
