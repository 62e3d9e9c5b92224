//! CLI configuration, a thin layer over `wgpulse_config`.
//!
//! Loads the config file (or the one named by `--config`) and applies the
//! `GlobalOpts` overrides on top.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub use wgpulse_config::Config;

/// Everything a command handler needs besides its own arguments.
pub struct Context<'a> {
    pub global: &'a GlobalOpts,
    pub config: Config,
    pub format: OutputFormat,
    pub color: bool,
}

impl<'a> Context<'a> {
    pub fn load(global: &'a GlobalOpts) -> Result<Self, CliError> {
        let mut config = wgpulse_config::load_config_from(&config_file(global))?;
        if let Some(dir) = &global.profiles_dir {
            config.profiles_dir.clone_from(dir);
        }

        let format = global
            .output
            .or_else(|| OutputFormat::from_str(&config.defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color_mode = global
            .color
            .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);

        Ok(Self {
            global,
            config,
            format,
            color: output::should_color(color_mode),
        })
    }

    pub fn profiles_dir(&self) -> PathBuf {
        self.config.profiles_dir()
    }

    pub fn quiet(&self) -> bool {
        self.global.quiet
    }
}

/// Config file in effect: `--config` / `WGPULSE_CONFIG`, else the default path.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(wgpulse_config::config_path)
}
