//! VPN connection control through NetworkManager
//!
//! The VPN is process-wide state. Connecting an already active connection and
//! disconnecting an inactive one are both treated as success.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::VPN_CONNECTION_TYPE;
use crate::git::{to_args, CommandError, CommandRunner};

const NMCLI: &str = "nmcli";
const ALREADY_ACTIVE: &str = "already active";
const NOT_ACTIVE: &str = "not an active connection";

#[derive(Debug, Error)]
pub enum VpnError {
    #[error("no network connection of type `{connection_type}` is configured")]
    NotFound { connection_type: String },
    #[error(transparent)]
    Command(#[from] CommandError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Up,
    Down,
}

impl Action {
    fn verb(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
        }
    }

    /// nmcli's complaint when the connection is already in the requested state
    fn no_op_message(self) -> &'static str {
        match self {
            Action::Up => ALREADY_ACTIVE,
            Action::Down => NOT_ACTIVE,
        }
    }
}

/// Drives the single configured VPN connection
pub struct VpnController {
    runner: Arc<dyn CommandRunner>,
    connection_type: String,
}

impl VpnController {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            connection_type: VPN_CONNECTION_TYPE.to_string(),
        }
    }

    async fn nmcli(&self, args: &[&str]) -> Result<String, CommandError> {
        self.runner.run(NMCLI, &to_args(args), None).await
    }

    async fn nmcli_lines(&self, args: &[&str]) -> Result<Vec<String>, CommandError> {
        Ok(self
            .nmcli(args)
            .await?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Name of the first configured connection classified as VPN
    pub async fn connection_name(&self) -> Result<String, VpnError> {
        let types = self.nmcli_lines(&["-g", "type", "con", "show"]).await?;
        let names = self.nmcli_lines(&["-g", "name", "con", "show"]).await?;

        types
            .iter()
            .zip(names)
            .find(|(connection_type, _)| **connection_type == self.connection_type)
            .map(|(_, name)| name)
            .ok_or_else(|| VpnError::NotFound {
                connection_type: self.connection_type.clone(),
            })
    }

    /// True when the VPN connection is in the active set
    pub async fn is_connected(&self) -> Result<bool, VpnError> {
        let name = self.connection_name().await?;
        let active = self
            .nmcli_lines(&["-g", "name", "con", "show", "--active"])
            .await?;
        Ok(active.contains(&name))
    }

    pub async fn connect(&self) -> Result<(), VpnError> {
        self.apply(Action::Up).await
    }

    pub async fn disconnect(&self) -> Result<(), VpnError> {
        self.apply(Action::Down).await
    }

    /// Connects when inactive, disconnects when active
    pub async fn toggle(&self) -> Result<bool, VpnError> {
        if self.is_connected().await? {
            self.disconnect().await?;
            Ok(false)
        } else {
            self.connect().await?;
            Ok(true)
        }
    }

    async fn apply(&self, action: Action) -> Result<(), VpnError> {
        let name = self.connection_name().await?;
        match self.nmcli(&["con", action.verb(), &name]).await {
            Ok(_) => {
                info!(connection = %name, action = action.verb(), "vpn state changed");
                Ok(())
            }
            Err(err) if is_no_op(&err, action) => {
                debug!(connection = %name, action = action.verb(), "vpn already in requested state");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

fn is_no_op(err: &CommandError, action: Action) -> bool {
    let expected = action.no_op_message();
    err.stderr().contains(expected) || err.to_string().contains(expected)
}
