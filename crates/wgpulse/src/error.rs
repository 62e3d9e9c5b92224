//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use wgpulse_config::ConfigError;
use wgpulse_core::{ControlError, CoreError, ProbeError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const TUNNEL: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Profiles ─────────────────────────────────────────────────────
    #[error("Profile '{name}' not found")]
    #[diagnostic(
        code(wgpulse::profile_not_found),
        help("Expected {path}\nRun: wgpulse profiles list")
    )]
    ProfileNotFound { name: String, path: String },

    #[error("Profile '{name}' already exists")]
    #[diagnostic(code(wgpulse::profile_exists))]
    ProfileExists { name: String },

    #[error("Invalid profile name '{name}': {reason}")]
    #[diagnostic(
        code(wgpulse::invalid_profile_name),
        help("Profile names are interface names: up to 15 characters of A-Z a-z 0-9 _ = + . -")
    )]
    InvalidProfileName { name: String, reason: String },

    // ── Tunnel control ───────────────────────────────────────────────
    #[error("No tunnel is active")]
    #[diagnostic(
        code(wgpulse::no_active_tunnel),
        help("Pass the profile explicitly: wgpulse down <name>")
    )]
    NoActiveTunnel,

    #[error("Another connect or disconnect is already in progress")]
    #[diagnostic(code(wgpulse::busy), help("Wait for it to finish and try again."))]
    Busy,

    #[error("Could not launch {program}")]
    #[diagnostic(
        code(wgpulse::launch_failed),
        help("Check that {program} is installed and on PATH.\nRun: wgpulse doctor")
    )]
    LaunchFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {action} {profile} failed: {reason}")]
    #[diagnostic(
        code(wgpulse::tunnel_failed),
        help("The message above is the tool's own error output.")
    )]
    TunnelFailed {
        program: String,
        action: String,
        profile: String,
        reason: String,
    },

    #[error("Could not set up the network probe")]
    #[diagnostic(code(wgpulse::probe_setup))]
    ProbeSetup(#[source] ProbeError),

    // ── Host ─────────────────────────────────────────────────────────
    #[error("Missing required tools: {missing}")]
    #[diagnostic(code(wgpulse::missing_dependencies), help("{hint}"))]
    MissingDependencies { missing: String, hint: String },

    #[error("Install command failed ({status}): {command}")]
    #[diagnostic(
        code(wgpulse::install_failed),
        help("Run the command yourself to see the package manager's output.")
    )]
    InstallFailed { command: String, status: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wgpulse::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(wgpulse::config),
        help("Check the config file, or run: wgpulse config init")
    )]
    Config(Box<figment::Error>),

    #[error("Failed to write configuration: {0}")]
    #[diagnostic(code(wgpulse::config_write))]
    ConfigWrite(#[source] toml::ser::Error),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(wgpulse::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("I/O error on {path}")]
    #[diagnostic(code(wgpulse::io))]
    FileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON output: {0}")]
    #[diagnostic(code(wgpulse::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode YAML output: {0}")]
    #[diagnostic(code(wgpulse::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ProfileNotFound { .. } | Self::NoActiveTunnel => exit_code::NOT_FOUND,
            Self::ProfileExists { .. } | Self::Busy => exit_code::CONFLICT,
            Self::InvalidProfileName { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::TunnelFailed { .. } => exit_code::TUNNEL,
            Self::FileIo { source, .. } | Self::Io(source)
                if source.kind() == std::io::ErrorKind::PermissionDenied =>
            {
                exit_code::PERMISSION
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProfileNotFound { name, path } => Self::ProfileNotFound {
                name,
                path: path.display().to_string(),
            },
            CoreError::ProfileExists { name } => Self::ProfileExists { name },
            CoreError::InvalidProfileName { name, reason } => {
                Self::InvalidProfileName { name, reason }
            }
            CoreError::Io { path, source } => Self::FileIo {
                path: path.display().to_string(),
                source,
            },
            CoreError::Control(control) => control.into(),
        }
    }
}

impl From<ControlError> for CliError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Busy => Self::Busy,
            ControlError::Spawn { program, source } => Self::LaunchFailed { program, source },
            ControlError::ToolFailed {
                program,
                action,
                profile,
                code,
                reason,
            } => Self::TunnelFailed {
                program,
                action: action.to_string(),
                profile,
                reason: match code {
                    Some(code) => format!("{reason} (exit {code})"),
                    None => reason,
                },
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Serialization(e) => Self::ConfigWrite(e),
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}

impl From<ProbeError> for CliError {
    fn from(err: ProbeError) -> Self {
        Self::ProbeSetup(err)
    }
}
