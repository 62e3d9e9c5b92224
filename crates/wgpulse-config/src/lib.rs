//! Configuration for the wgpulse CLI.
//!
//! A TOML file layered under `WGPULSE_*` environment variables, path
//! resolution for the config, autostart and profile directories, the
//! first-run marker, and translation to `wgpulse_core` runtime config.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::{BaseDirs, ProjectDirs};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use wgpulse_core::{ControlConfig, MonitorConfig, ProbeConfig, ReconcileConfig};

const APP_NAME: &str = "wgpulse";
const ENV_PREFIX: &str = "WGPULSE_";
const FIRST_RUN_MARKER: &str = ".first_run_done";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding one `*.conf` file per profile. A leading `~/`
    /// is expanded to the home directory.
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: PathBuf,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub probe: ProbeSection,

    #[serde(default)]
    pub reconcile: ReconcileSection,

    #[serde(default)]
    pub control: ControlSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profiles_dir: default_profiles_dir(),
            defaults: Defaults::default(),
            probe: ProbeSection::default(),
            reconcile: ReconcileSection::default(),
            control: ControlSection::default(),
        }
    }
}

fn default_profiles_dir() -> PathBuf {
    PathBuf::from("~/vpn-configs")
}

/// Presentation defaults, overridable per invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

/// `[probe]`: external address and latency measurement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeSection {
    pub interval_secs: u64,
    pub ip_echo_url: String,
    pub ip_echo_timeout_secs: u64,
    pub ping_program: String,
    pub ping_target: String,
    pub ping_timeout_secs: u64,
}

impl Default for ProbeSection {
    fn default() -> Self {
        Self {
            interval_secs: 7,
            ip_echo_url: wgpulse_core::config::DEFAULT_IP_ECHO_URL.into(),
            ip_echo_timeout_secs: 3,
            ping_program: "ping".into(),
            ping_target: wgpulse_core::config::DEFAULT_PING_TARGET.to_string(),
            ping_timeout_secs: 1,
        }
    }
}

/// `[reconcile]`: live interface inspection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReconcileSection {
    pub interval_ms: u64,
    pub interface_listing: PathBuf,
}

impl Default for ReconcileSection {
    fn default() -> Self {
        Self {
            interval_ms: 1500,
            interface_listing: PathBuf::from(wgpulse_core::config::DEFAULT_INTERFACE_LISTING),
        }
    }
}

/// `[control]`: how `wg-quick` is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlSection {
    /// Wrapper granting privileges, e.g. `sudo` or `doas`. Empty runs the
    /// tool directly.
    pub privilege_command: String,
    pub tool: String,
}

impl Default for ControlSection {
    fn default() -> Self {
        Self {
            privilege_command: "sudo".into(),
            tool: "wg-quick".into(),
        }
    }
}

// ── Translation to runtime config ───────────────────────────────────

impl Config {
    /// Profile directory with `~` expanded.
    pub fn profiles_dir(&self) -> PathBuf {
        expand_home(&self.profiles_dir)
    }

    pub fn monitor_config(&self) -> Result<MonitorConfig, ConfigError> {
        let p = &self.probe;
        let ip_echo_url = Url::parse(&p.ip_echo_url)
            .map_err(|e| invalid("probe.ip_echo_url", format!("{e}: {}", p.ip_echo_url)))?;
        if !matches!(ip_echo_url.scheme(), "http" | "https") {
            return Err(invalid("probe.ip_echo_url", "expected an http(s) URL"));
        }
        let ping_target: IpAddr = p
            .ping_target
            .parse()
            .map_err(|_| invalid("probe.ping_target", format!("not an IP address: {}", p.ping_target)))?;
        if p.ping_program.trim().is_empty() {
            return Err(invalid("probe.ping_program", "must not be empty"));
        }

        let probe = ProbeConfig {
            interval: positive_secs("probe.interval_secs", p.interval_secs)?,
            ip_echo_url,
            ip_echo_timeout: positive_secs("probe.ip_echo_timeout_secs", p.ip_echo_timeout_secs)?,
            ping_program: p.ping_program.trim().to_owned(),
            ping_target,
            ping_timeout: positive_secs("probe.ping_timeout_secs", p.ping_timeout_secs)?,
        };

        if self.reconcile.interval_ms == 0 {
            return Err(invalid("reconcile.interval_ms", "must be greater than zero"));
        }
        let reconcile = ReconcileConfig {
            interval: Duration::from_millis(self.reconcile.interval_ms),
            interface_listing: self.reconcile.interface_listing.clone(),
        };

        Ok(MonitorConfig {
            profiles_dir: self.profiles_dir(),
            probe,
            reconcile,
        })
    }

    pub fn control_config(&self) -> Result<ControlConfig, ConfigError> {
        let tool = self.control.tool.trim();
        if tool.is_empty() {
            return Err(invalid("control.tool", "must not be empty"));
        }
        let wrapper = self.control.privilege_command.trim();
        Ok(ControlConfig {
            profiles_dir: self.profiles_dir(),
            privilege_command: (!wrapper.is_empty()).then(|| wrapper.to_owned()),
            tool: tool.to_owned(),
        })
    }
}

fn positive_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

// ── Paths ───────────────────────────────────────────────────────────

/// Per-user configuration directory (`~/.config/wgpulse` on Linux).
pub fn config_dir() -> PathBuf {
    ProjectDirs::from("", "", APP_NAME).map_or_else(
        || home_dir().join(".config").join(APP_NAME),
        |dirs| dirs.config_dir().to_path_buf(),
    )
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// XDG autostart directory (`~/.config/autostart`).
pub fn autostart_dir() -> PathBuf {
    BaseDirs::new().map_or_else(
        || home_dir().join(".config").join("autostart"),
        |dirs| dirs.config_dir().join("autostart"),
    )
}

fn home_dir() -> PathBuf {
    BaseDirs::new().map_or_else(
        || PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into())),
        |dirs| dirs.home_dir().to_path_buf(),
    )
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, still layered under the environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is absent or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── First run ───────────────────────────────────────────────────────

pub fn first_run_marker() -> PathBuf {
    config_dir().join(FIRST_RUN_MARKER)
}

/// True until [`mark_first_run_done`] has been called once.
pub fn is_first_run() -> bool {
    !first_run_marker().exists()
}

pub fn mark_first_run_done() -> Result<(), ConfigError> {
    touch(&first_run_marker())
}

fn touch(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, b"")?;
    Ok(())
}
