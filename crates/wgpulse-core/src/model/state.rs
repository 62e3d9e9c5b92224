// ── Connection state ──

use serde::Serialize;
use std::fmt;

use super::profile_name::ProfileName;

/// Tunnel state inferred from live interface status.
///
/// Produced only by the reconciliation loop and always replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "profile", rename_all = "snake_case")]
pub enum ConnectionState {
    /// No reconciliation tick has completed yet.
    #[default]
    Unknown,
    Disconnected,
    Active(ProfileName),
}

impl ConnectionState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }

    /// The active profile, if any.
    pub fn active_profile(&self) -> Option<&ProfileName> {
        match self {
            Self::Active(p) => Some(p),
            Self::Unknown | Self::Disconnected => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str("unknown"),
            Self::Disconnected => f.write_str("disconnected"),
            Self::Active(p) => write!(f, "active ({p})"),
        }
    }
}
