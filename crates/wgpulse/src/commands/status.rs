//! `wgpulse status`: one reconcile pass and one probe, printed once.

use wgpulse_core::{Monitor, Status, UNKNOWN_MARKER};

use crate::config::Context;
use crate::error::CliError;
use crate::output;

pub async fn handle(ctx: &Context<'_>) -> Result<(), CliError> {
    let status = Monitor::oneshot_status(ctx.config.monitor_config()?).await?;

    let color = ctx.color;
    let out = output::render_single(
        ctx.format,
        &status,
        |s| detail(s, color),
        |s| {
            s.state
                .active_profile()
                .map_or_else(|| s.state.to_string(), ToString::to_string)
        },
    )?;
    output::print_output(&out, ctx.quiet());
    Ok(())
}

fn detail(status: &Status, color: bool) -> String {
    let (address, latency) = match &status.sample {
        Some(sample) => (sample.address_display(), output::paint_latency(sample, color)),
        None => (UNKNOWN_MARKER.to_owned(), UNKNOWN_MARKER.to_owned()),
    };
    output::detail_block(&[
        ("State", output::paint_state(&status.state, color)),
        ("External IP", address),
        ("Latency", latency),
    ])
}
