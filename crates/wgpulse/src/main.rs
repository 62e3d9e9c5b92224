mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Completions and config management must work with a broken config file
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wgpulse", &mut std::io::stdout());
            Ok(())
        }
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        cmd => {
            let ctx = config::Context::load(&cli.global)?;
            first_run_hint(&ctx);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &ctx).await
        }
    }
}

/// One-time pointer at `doctor`, shown before the first real command.
fn first_run_hint(ctx: &config::Context<'_>) {
    if !wgpulse_config::is_first_run() {
        return;
    }
    output::notice(
        "First run: check that the WireGuard tools are installed with `wgpulse doctor`.",
        ctx.quiet(),
    );
    if let Err(e) = wgpulse_config::mark_first_run_done() {
        tracing::debug!(error = %e, "could not record first run");
    }
}
