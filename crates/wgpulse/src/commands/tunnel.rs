//! `wgpulse up` / `wgpulse down`.

use wgpulse_core::{ControlOutcome, TunnelControl};

use crate::cli::{DownArgs, TunnelArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn up(args: &TunnelArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let name = util::parse_profile(&args.name)?;
    let control = TunnelControl::new(ctx.config.control_config()?);

    if let Some(active) = util::current_state(ctx).await.active_profile() {
        if *active == name {
            output::notice(&format!("{name} is already up"), ctx.quiet());
            return Ok(());
        }
        output::notice(
            &output::paint_warning(&format!("{active} is also up"), ctx.color),
            ctx.quiet(),
        );
    }

    control.connect(&name).await?;
    output::notice(&format!("Connected: {name}"), ctx.quiet());
    Ok(())
}

pub async fn down(args: &DownArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let name = match &args.name {
        Some(name) => util::parse_profile(name)?,
        None => util::current_state(ctx)
            .await
            .active_profile()
            .cloned()
            .ok_or(CliError::NoActiveTunnel)?,
    };
    let control = TunnelControl::new(ctx.config.control_config()?);

    match control.disconnect(&name).await? {
        ControlOutcome::Done => {
            output::notice(&format!("Disconnected: {name}"), ctx.quiet());
        }
        ControlOutcome::Warning(reason) => {
            // Shown even with --quiet: the tunnel may still be up.
            eprintln!("{}", output::paint_warning(&reason, ctx.color));
        }
    }
    Ok(())
}
