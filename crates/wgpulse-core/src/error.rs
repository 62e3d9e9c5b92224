// ── Core error types ──
//
// Errors surfaced to callers of user-triggered operations (connect,
// disconnect, DNS patch, rename). The background loops never return
// these; probe failures are carried by `ProbeError` and only logged.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Profile errors ───────────────────────────────────────────────
    #[error("Profile not found: {name} (expected {})", .path.display())]
    ProfileNotFound { name: String, path: PathBuf },

    #[error("Profile already exists: {name}")]
    ProfileExists { name: String },

    #[error("Invalid profile name '{name}': {reason}")]
    InvalidProfileName { name: String, reason: String },

    // ── Filesystem errors ────────────────────────────────────────────
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Tunnel control ───────────────────────────────────────────────
    #[error(transparent)]
    Control(#[from] ControlError),
}

impl CoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Lifecycle action passed to the external tunnel tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelAction {
    Up,
    Down,
}

impl TunnelAction {
    /// Subcommand understood by `wg-quick`.
    pub fn as_arg(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for TunnelAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Failures of a `wg-quick up/down` invocation.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("Another connect/disconnect is already in progress")]
    Busy,

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} {action} {profile} failed{}: {reason}", .code.map(|c| format!(" (exit {c})")).unwrap_or_default())]
    ToolFailed {
        program: String,
        action: TunnelAction,
        profile: String,
        code: Option<i32>,
        reason: String,
    },
}

/// Why one half of a network sample could not be measured.
///
/// Never propagated out of the probe loop: the affected field of the
/// sample is left unknown and the cause is logged.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("response is not an IP address: {0:?}")]
    MalformedAddress(String),

    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ping exited with {0}")]
    PingFailed(String),

    #[error("no round-trip time in ping output")]
    MalformedOutput,

    #[error("timed out after {0:?}")]
    TimedOut(std::time::Duration),
}
