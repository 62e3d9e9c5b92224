//! Config subcommand handlers.

use std::io::IsTerminal;

use dialoguer::{Input, Select};

use wgpulse_core::profiles;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, Context};
use crate::error::CliError;
use crate::output;

use super::util::{self, prompt_err};

const PRIVILEGE_CHOICES: &[(&str, &str)] = &[
    ("sudo", "sudo"),
    ("doas", "doas"),
    ("none (run wg-quick directly)", ""),
];

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let ctx = Context::load(global)?;
            let out = match ctx.format {
                OutputFormat::Table | OutputFormat::Plain => {
                    toml::to_string_pretty(&ctx.config).map_err(CliError::ConfigWrite)?
                }
                OutputFormat::Json => output::render_json(&ctx.config, false)?,
                OutputFormat::JsonCompact => output::render_json(&ctx.config, true)?,
                OutputFormat::Yaml => output::render_yaml(&ctx.config)?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init => init(global),
    }
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let path = config::config_file(global);
    if path.exists()
        && !util::confirm(
            &format!("{} exists. Overwrite?", path.display()),
            "config init",
            global.yes,
        )?
    {
        output::notice("Kept the existing configuration.", global.quiet);
        return Ok(());
    }

    let mut cfg = Config::default();
    if let Some(dir) = &global.profiles_dir {
        cfg.profiles_dir.clone_from(dir);
    }

    if !global.yes && std::io::stdin().is_terminal() {
        eprintln!("✨ wgpulse configuration");
        eprintln!("   Config path: {}\n", path.display());

        let dir: String = Input::new()
            .with_prompt("Profile directory")
            .default(cfg.profiles_dir.display().to_string())
            .interact_text()
            .map_err(prompt_err)?;
        cfg.profiles_dir = dir.trim().into();

        let labels: Vec<&str> = PRIVILEGE_CHOICES.iter().map(|(label, _)| *label).collect();
        let choice = Select::new()
            .with_prompt("Run wg-quick with")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(prompt_err)?;
        cfg.control.privilege_command = PRIVILEGE_CHOICES[choice].1.to_owned();
    }

    // Reject values the runtime would refuse before writing them out.
    cfg.monitor_config()?;
    cfg.control_config()?;

    wgpulse_config::save_config_to(&cfg, &path)?;
    profiles::ensure_profiles_dir(&cfg.profiles_dir())?;

    output::notice(&format!("✓ Wrote {}", path.display()), global.quiet);
    output::notice(
        &format!("  Put your *.conf profiles in {}", cfg.profiles_dir().display()),
        global.quiet,
    );
    Ok(())
}
