//! `wgpulse autostart`: XDG autostart entry that brings a tunnel up at login.

use serde::Serialize;

use wgpulse_core::{profiles, system};

use crate::cli::{AutostartArgs, AutostartCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct AutostartStatus {
    enabled: bool,
    file: String,
}

pub fn handle(args: AutostartArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let dir = wgpulse_config::autostart_dir();

    match args.command {
        AutostartCommand::Enable { name } => {
            let name = util::parse_profile(&name)?;
            let profiles_dir = ctx.profiles_dir();
            profiles::existing_profile_path(&profiles_dir, &name)?;

            let exe = std::env::current_exe()?;
            let exec = format!(
                "{} --profiles-dir {} up {name}",
                quote_exec_arg(&exe.display().to_string()),
                quote_exec_arg(&profiles_dir.display().to_string()),
            );
            let file = system::enable_autostart(&dir, &exec)?;
            output::notice(
                &format!("Autostart enabled: {name} ({})", file.display()),
                ctx.quiet(),
            );
            Ok(())
        }

        AutostartCommand::Disable => {
            if system::disable_autostart(&dir)? {
                output::notice("Autostart disabled", ctx.quiet());
            } else {
                output::notice("Autostart was not enabled", ctx.quiet());
            }
            Ok(())
        }

        AutostartCommand::Status => {
            let status = AutostartStatus {
                enabled: system::autostart_enabled(&dir),
                file: system::autostart_file(&dir).display().to_string(),
            };
            let out = output::render_single(
                ctx.format,
                &status,
                |s| {
                    if s.enabled {
                        format!("enabled ({})", s.file)
                    } else {
                        "disabled".to_owned()
                    }
                },
                |s| s.enabled.to_string(),
            )?;
            output::print_output(&out, ctx.quiet());
            Ok(())
        }
    }
}

/// Quote one argument for a desktop entry `Exec=` line.
fn quote_exec_arg(arg: &str) -> String {
    const RESERVED: &[char] = &[
        ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(',
        ')', '`',
    ];
    if !arg.contains(RESERVED) {
        return arg.to_owned();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
