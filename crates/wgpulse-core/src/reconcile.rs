// ── Interface reconciliation ──
//
// Infers which tunnel is up by matching profile names against the
// kernel's live device listing. `wg-quick` names the interface after the
// configuration file's stem, so an exact name match is sufficient.

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;

use tracing::{debug, trace};

use crate::model::{ConnectionState, ProfileName};
use crate::profiles;

// ── Interface source ─────────────────────────────────────────────

/// Something that can produce the raw live interface listing.
pub trait InterfaceSource: Send + Sync + 'static {
    fn read_listing(&self) -> impl Future<Output = std::io::Result<String>> + Send;
}

/// Reads a `/proc/net/dev`-style pseudo-file.
#[derive(Debug, Clone)]
pub struct ProcNetDev {
    path: PathBuf,
}

impl ProcNetDev {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcNetDev {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_INTERFACE_LISTING)
    }
}

impl InterfaceSource for ProcNetDev {
    fn read_listing(&self) -> impl Future<Output = std::io::Result<String>> + Send {
        tokio::fs::read_to_string(self.path.clone())
    }
}

// ── Parsing and matching ─────────────────────────────────────────

/// Extract interface names from a device listing.
///
/// Lines of the form `  name: counters...` yield `name`. Lines of the
/// `ip -o link` form `3: name: <...>` (numeric index first) yield
/// `name`, without any `@peer` suffix. Header lines (containing `|`)
/// are skipped. Any other line contributes each of its
/// whitespace-separated tokens, so a plain one-name-per-line listing
/// works too.
pub fn interface_names(listing: &str) -> HashSet<&str> {
    let mut names = HashSet::new();
    for line in listing.lines() {
        if line.contains('|') {
            continue;
        }
        if let Some((head, rest)) = line.split_once(':') {
            let mut name = head.trim();
            if is_link_index(name) {
                let field = rest.split(':').next().unwrap_or_default().trim();
                name = field.split('@').next().unwrap_or_default();
            }
            if !name.is_empty() {
                names.insert(name);
            }
        } else {
            names.extend(line.split_whitespace());
        }
    }
    names
}

fn is_link_index(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

/// Lexicographically first profile whose name is a live interface.
///
/// The result does not depend on the order of `profiles`.
pub fn resolve_state(listing: &str, profiles: &[ProfileName]) -> ConnectionState {
    let live = interface_names(listing);
    profiles
        .iter()
        .filter(|p| live.contains(p.as_str()))
        .min()
        .map_or(ConnectionState::Disconnected, |p| {
            ConnectionState::Active(p.clone())
        })
}

// ── Reconciler ───────────────────────────────────────────────────

/// One reconciliation step: fresh profile list, fresh listing, new state.
pub struct Reconciler<I> {
    source: I,
    profiles_dir: PathBuf,
}

impl<I: InterfaceSource> Reconciler<I> {
    pub fn new(source: I, profiles_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            profiles_dir: profiles_dir.into(),
        }
    }

    /// Compute the current state. Never fails: an unreadable listing
    /// counts as disconnected.
    pub async fn tick(&self) -> ConnectionState {
        let listing = match self.source.read_listing().await {
            Ok(listing) => listing,
            Err(e) => {
                debug!(error = %e, "interface listing unreadable, assuming disconnected");
                return ConnectionState::Disconnected;
            }
        };

        let dir = self.profiles_dir.clone();
        let known = tokio::task::spawn_blocking(move || profiles::list_profiles(&dir))
            .await
            .unwrap_or_default();

        let state = resolve_state(&listing, &known);
        trace!(profiles = known.len(), %state, "reconciled");
        state
    }
}
