// ── Runtime configuration ──
//
// These types describe *where* profiles live and *how* to probe and
// control tunnels. They never touch disk: the CLI builds them from the
// config file and hands them in.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Public endpoint answering with the caller's address as plain text.
pub const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org";

/// Reference host for latency probes.
pub const DEFAULT_PING_TARGET: IpAddr = IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1));

/// Live interface listing on Linux.
pub const DEFAULT_INTERFACE_LISTING: &str = "/proc/net/dev";

/// Settings for the external-address / latency probe loop.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Delay between probe cycles.
    pub interval: Duration,
    pub ip_echo_url: Url,
    pub ip_echo_timeout: Duration,
    pub ping_program: String,
    pub ping_target: IpAddr,
    pub ping_timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(7),
            ip_echo_url: default_echo_url(),
            ip_echo_timeout: Duration::from_secs(3),
            ping_program: "ping".into(),
            ping_target: DEFAULT_PING_TARGET,
            ping_timeout: Duration::from_secs(1),
        }
    }
}

#[allow(clippy::expect_used)]
fn default_echo_url() -> Url {
    Url::parse(DEFAULT_IP_ECHO_URL).expect("constant URL is valid")
}

/// Settings for the interface reconciliation loop.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub interval: Duration,
    /// Pseudo-file listing active network devices.
    pub interface_listing: PathBuf,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1500),
            interface_listing: PathBuf::from(DEFAULT_INTERFACE_LISTING),
        }
    }
}

/// Everything a [`Monitor`](crate::Monitor) needs.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Directory holding one `*.conf` file per profile.
    pub profiles_dir: PathBuf,
    pub probe: ProbeConfig,
    pub reconcile: ReconcileConfig,
}

impl MonitorConfig {
    pub fn new(profiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            probe: ProbeConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

/// How `wg-quick` is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlConfig {
    pub profiles_dir: PathBuf,
    /// Privilege wrapper such as `sudo`. `None` runs the tool directly.
    pub privilege_command: Option<String>,
    pub tool: String,
}

impl ControlConfig {
    pub fn new(profiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            profiles_dir: profiles_dir.into(),
            privilege_command: Some("sudo".into()),
            tool: "wg-quick".into(),
        }
    }
}
