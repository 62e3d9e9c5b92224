//! Clap derive structures for the `wgpulse` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap and clap_complete so `build.rs` can include it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wgpulse -- WireGuard tunnel monitor and switcher
#[derive(Debug, Parser)]
#[command(
    name = "wgpulse",
    version,
    about = "Monitor and switch WireGuard tunnels from the command line",
    long_about = "Lists wg-quick profiles, brings tunnels up and down, and reports\n\
        which tunnel is active together with the external IP and latency.\n\n\
        Profiles are the *.conf files in the profile directory\n\
        (~/vpn-configs by default).",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Directory containing *.conf profiles (overrides config)
    #[arg(long, short = 'd', env = "WGPULSE_PROFILES_DIR", global = true)]
    pub profiles_dir: Option<PathBuf>,

    /// Config file to load instead of the default location
    #[arg(long, env = "WGPULSE_CONFIG", global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "WGPULSE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, rename and locate profiles
    #[command(alias = "p")]
    Profiles(ProfilesArgs),

    /// Show the active tunnel, external IP and latency once
    #[command(alias = "st")]
    Status,

    /// Continuously report tunnel state and network samples
    #[command(alias = "w")]
    Watch,

    /// Bring a tunnel up
    Up(TunnelArgs),

    /// Take a tunnel down (defaults to the active one)
    Down(DownArgs),

    /// Comment out DNS lines in a profile
    DnsPatch(DnsPatchArgs),

    /// Check that the WireGuard tools are installed
    Doctor(DoctorArgs),

    /// Manage the login autostart entry
    Autostart(AutostartArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Profiles ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List profiles in the profile directory
    #[command(alias = "ls")]
    List,

    /// Rename a profile file
    #[command(alias = "mv")]
    Rename {
        /// Current profile name
        old: String,
        /// New profile name
        new: String,
    },

    /// Print the path of a profile's .conf file
    Path {
        /// Profile name
        name: String,
    },
}

// ── Tunnel control ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TunnelArgs {
    /// Profile name (file stem of the .conf file)
    pub name: String,
}

#[derive(Debug, Args)]
pub struct DownArgs {
    /// Profile name; the currently active tunnel when omitted
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct DnsPatchArgs {
    /// Profile name
    pub name: String,
}

// ── Doctor ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DoctorArgs {
    /// Run the install command for missing packages
    #[arg(long)]
    pub install: bool,
}

// ── Autostart ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AutostartArgs {
    #[command(subcommand)]
    pub command: AutostartCommand,
}

#[derive(Debug, Subcommand)]
pub enum AutostartCommand {
    /// Bring a profile up at login
    Enable {
        /// Profile to connect at login
        name: String,
    },
    /// Remove the autostart entry
    Disable,
    /// Show whether autostart is enabled
    Status,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a config file with default values
    Init,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
