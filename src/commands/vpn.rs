//! Direct control of the VPN connection

use anyhow::{Context, Result};

use crate::repo::RepoContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VpnAction {
    Toggle,
    Connect,
    Disconnect,
}

impl VpnAction {
    pub fn parse(action: Option<&str>) -> Self {
        match action {
            Some("connect") | Some("up") => VpnAction::Connect,
            Some("disconnect") | Some("down") => VpnAction::Disconnect,
            _ => VpnAction::Toggle,
        }
    }
}

/// Handles the vpn command
pub async fn handle_vpn_command(ctx: &RepoContext, action: VpnAction) -> Result<()> {
    let connected = match action {
        VpnAction::Connect => ctx.vpn.connect().await.map(|()| true),
        VpnAction::Disconnect => ctx.vpn.disconnect().await.map(|()| false),
        VpnAction::Toggle => ctx.vpn.toggle().await,
    }
    .context("vpn command failed")?;

    let name = ctx.vpn.connection_name().await?;
    if connected {
        println!("🔒 {name} connected");
    } else {
        println!("🔓 {name} disconnected");
    }
    Ok(())
}
