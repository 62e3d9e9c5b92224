//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod autostart;
pub mod config_cmd;
pub mod dns;
pub mod doctor;
pub mod profiles;
pub mod status;
pub mod tunnel;
pub mod util;
pub mod watch;

use crate::cli::Command;
use crate::config::Context;
use crate::error::CliError;

/// Dispatch a command that needs the loaded configuration.
pub async fn dispatch(cmd: Command, ctx: &Context<'_>) -> Result<(), CliError> {
    match cmd {
        Command::Profiles(args) => profiles::handle(args, ctx).await,
        Command::Status => status::handle(ctx).await,
        Command::Watch => watch::handle(ctx).await,
        Command::Up(args) => tunnel::up(&args, ctx).await,
        Command::Down(args) => tunnel::down(&args, ctx).await,
        Command::DnsPatch(args) => dns::handle(&args, ctx),
        Command::Doctor(args) => doctor::handle(&args, ctx).await,
        Command::Autostart(args) => autostart::handle(args, ctx),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
