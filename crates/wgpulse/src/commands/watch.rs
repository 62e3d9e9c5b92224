//! `wgpulse watch`: run the monitor and print every update until Ctrl-C.

use chrono::Local;
use serde::Serialize;
use tokio_stream::StreamExt;

use wgpulse_core::{ConnectionState, Monitor, MonitorUpdate, NetworkSample};

use crate::cli::OutputFormat;
use crate::config::Context;
use crate::error::CliError;
use crate::output;

/// One line of machine-readable watch output.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Event<'a> {
    State { state: &'a ConnectionState },
    Sample { sample: &'a NetworkSample },
}

pub async fn handle(ctx: &Context<'_>) -> Result<(), CliError> {
    let monitor = Monitor::new(ctx.config.monitor_config()?)?;
    let mut updates = monitor.updates();
    monitor.start().await;

    let result = loop {
        tokio::select! {
            biased;
            signal = tokio::signal::ctrl_c() => break signal.map_err(CliError::from),
            update = updates.next() => {
                let Some(update) = update else { break Ok(()) };
                if let Err(e) = print_update(&update, ctx) {
                    break Err(e);
                }
            }
        }
    };

    monitor.shutdown().await;
    result
}

fn print_update(update: &MonitorUpdate, ctx: &Context<'_>) -> Result<(), CliError> {
    let event = match update {
        MonitorUpdate::State(state) => Event::State { state },
        MonitorUpdate::Sample(sample) => Event::Sample { sample },
    };

    let line = match ctx.format {
        // Streams are newline-delimited, so JSON is always compact here.
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json(&event, true)?,
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(&event)?.trim_end()),
        OutputFormat::Table | OutputFormat::Plain => human_line(update, ctx.color),
    };
    output::print_output(&line, ctx.quiet());
    Ok(())
}

fn human_line(update: &MonitorUpdate, color: bool) -> String {
    let at = Local::now().format("%H:%M:%S");
    match update {
        MonitorUpdate::State(state) => format!("[{at}] state    {}", output::paint_state(state, color)),
        MonitorUpdate::Sample(sample) => format!(
            "[{at}] network  ip {}  latency {}",
            sample.address_display(),
            output::paint_latency(sample, color)
        ),
    }
}
