// ── Host integration ──
//
// Distribution detection, dependency checks and XDG autostart entries.
// Nothing here is needed by the loops; the CLI uses it for `doctor` and
// `autostart`.

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::CoreError;

pub const OS_RELEASE: &str = "/etc/os-release";

/// File name of the autostart entry inside the XDG autostart directory.
pub const AUTOSTART_FILE_NAME: &str = "wgpulse.desktop";

// ── Distribution ─────────────────────────────────────────────────

/// Linux distribution family, as far as package installation goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Distro {
    Arch,
    Debian,
    Fedora,
    OpenSuse,
    Void,
    Unknown,
}

/// Packages the tunnel tooling depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Package {
    WireguardTools,
    Openresolv,
}

/// Keyword table matched against lowercased os-release content, in order.
const DISTRO_KEYWORDS: &[(Distro, &[&str])] = &[
    (Distro::Arch, &["arch", "manjaro", "endeavouros", "garuda", "artix"]),
    (
        Distro::Debian,
        &["debian", "ubuntu", "mint", "pop", "elementary", "kali", "zorin"],
    ),
    (Distro::Fedora, &["fedora", "rhel", "centos", "rocky", "alma"]),
    (Distro::OpenSuse, &["opensuse", "suse"]),
    (Distro::Void, &["void"]),
];

impl Distro {
    /// Classify from the content of `/etc/os-release`.
    pub fn from_os_release(content: &str) -> Self {
        let content = content.to_lowercase();
        DISTRO_KEYWORDS
            .iter()
            .find(|(_, keys)| keys.iter().any(|k| content.contains(k)))
            .map_or(Self::Unknown, |(distro, _)| *distro)
    }

    /// Read and classify the running system.
    pub fn detect() -> Self {
        Self::detect_from(Path::new(OS_RELEASE))
    }

    pub fn detect_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_os_release(&content),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "os-release unreadable");
                Self::Unknown
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Arch => "Arch / Manjaro / EndeavourOS",
            Self::Debian => "Debian / Ubuntu / Mint / Pop!_OS",
            Self::Fedora => "Fedora / RHEL / CentOS",
            Self::OpenSuse => "openSUSE Tumbleweed / Leap",
            Self::Void => "Void Linux",
            Self::Unknown => "unknown distribution",
        }
    }

    /// Install command with a `{pkgs}` placeholder.
    fn install_template(self) -> Option<&'static str> {
        match self {
            Self::Arch => Some("sudo pacman -S --needed --noconfirm {pkgs}"),
            Self::Debian => Some("sudo apt-get install -y {pkgs}"),
            Self::Fedora => Some("sudo dnf install -y {pkgs}"),
            Self::OpenSuse => Some("sudo zypper install -y {pkgs}"),
            Self::Void => Some("sudo xbps-install -Sy {pkgs}"),
            Self::Unknown => None,
        }
    }

    /// Distribution-specific package name.
    pub fn package_name(self, package: Package) -> &'static str {
        match (self, package) {
            (Self::Debian, Package::WireguardTools) => "wireguard",
            (_, Package::WireguardTools) => "wireguard-tools",
            (_, Package::Openresolv) => "openresolv",
        }
    }
}

impl fmt::Display for Distro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ── Dependencies ─────────────────────────────────────────────────

/// Binaries the tunnel tooling needs, and the package providing each.
pub const REQUIRED_BINARIES: &[(&str, Package)] = &[
    ("wg", Package::WireguardTools),
    ("wg-quick", Package::WireguardTools),
    ("resolvconf", Package::Openresolv),
];

/// Locate `bin` on a `PATH`-style search list.
pub fn find_in_path(bin: &str, search_path: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_path)
        .map(|dir| dir.join(bin))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Required binaries missing from `search_path`.
///
/// An unknown distribution reports nothing, since no install
/// instructions could be offered anyway.
pub fn missing_binaries(distro: Distro, search_path: &OsStr) -> Vec<(&'static str, Package)> {
    if distro == Distro::Unknown {
        return Vec::new();
    }
    REQUIRED_BINARIES
        .iter()
        .filter(|(bin, _)| find_in_path(bin, search_path).is_none())
        .copied()
        .collect()
}

/// Shell command installing `packages`, or `None` when the distribution
/// is unknown or there is nothing to install.
pub fn install_command(distro: Distro, packages: &[Package]) -> Option<String> {
    let template = distro.install_template()?;
    let mut names: Vec<&str> = packages.iter().map(|p| distro.package_name(*p)).collect();
    names.dedup();
    if names.is_empty() {
        return None;
    }
    Some(template.replace("{pkgs}", &names.join(" ")))
}

// ── Autostart ────────────────────────────────────────────────────

/// XDG desktop entry launching `exec` at login.
pub fn desktop_entry(exec: &str) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=wgpulse\n\
         Comment=WireGuard tunnel monitor\n\
         Exec={exec}\n\
         Icon=network-vpn\n\
         Terminal=false\n\
         X-GNOME-Autostart-enabled=true\n"
    )
}

pub fn autostart_file(dir: &Path) -> PathBuf {
    dir.join(AUTOSTART_FILE_NAME)
}

/// Write the autostart entry, creating `dir` if needed.
pub fn enable_autostart(dir: &Path, exec: &str) -> Result<PathBuf, CoreError> {
    std::fs::create_dir_all(dir).map_err(|e| CoreError::io(dir, e))?;
    let file = autostart_file(dir);
    std::fs::write(&file, desktop_entry(exec)).map_err(|e| CoreError::io(&file, e))?;
    debug!(file = %file.display(), "autostart enabled");
    Ok(file)
}

/// Remove the autostart entry. Returns whether one existed.
pub fn disable_autostart(dir: &Path) -> Result<bool, CoreError> {
    let file = autostart_file(dir);
    match std::fs::remove_file(&file) {
        Ok(()) => {
            debug!(file = %file.display(), "autostart disabled");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CoreError::io(&file, e)),
    }
}

pub fn autostart_enabled(dir: &Path) -> bool {
    autostart_file(dir).is_file()
}
