//! Shared helpers for command handlers.

use std::io::IsTerminal;

use wgpulse_core::{ConnectionState, InterfaceSource, ProcNetDev, ProfileName, Reconciler};

use crate::config::Context;
use crate::error::CliError;

/// Validate a profile name given on the command line.
pub fn parse_profile(name: &str) -> Result<ProfileName, CliError> {
    Ok(ProfileName::new(name.trim())?)
}

/// Raw live interface listing; empty when it cannot be read.
pub async fn interface_listing(ctx: &Context<'_>) -> String {
    ProcNetDev::new(ctx.config.reconcile.interface_listing.clone())
        .read_listing()
        .await
        .unwrap_or_default()
}

/// One reconciliation pass against the live interface listing.
pub async fn current_state(ctx: &Context<'_>) -> ConnectionState {
    let source = ProcNetDev::new(ctx.config.reconcile.interface_listing.clone());
    Reconciler::new(source, ctx.profiles_dir()).tick().await
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `action` fails with
/// `NonInteractiveRequiresYes` instead of blocking.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)?;
    Ok(confirmed)
}

/// Map a dialoguer failure into CliError.
pub fn prompt_err(e: dialoguer::Error) -> CliError {
    CliError::Io(std::io::Error::other(e))
}
