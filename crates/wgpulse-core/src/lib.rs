//! Connectivity monitoring and tunnel control for WireGuard profiles.
//!
//! This crate owns the domain model and the background machinery behind
//! the `wgpulse` command-line tool:
//!
//! - **[`Monitor`]**: Facade owning two loops. The probe loop measures the
//!   external address and latency every 7 s; the reconciliation loop infers
//!   the active tunnel from live interface status every 1.5 s. Results are
//!   published as immutable snapshots through `watch` channels and can be
//!   consumed via [`SnapshotStream`] or the merged [`Monitor::updates()`]
//!   stream. [`Monitor::oneshot_status()`] runs one pass of each without
//!   spawning tasks.
//!
//! - **[`TunnelControl`]**: Single-flight `wg-quick up|down` invocation with
//!   captured stderr as the failure reason.
//!
//! - **[`dns::patch_dns`]**: Idempotent rewrite commenting out `DNS =`
//!   directives in a profile.
//!
//! - **[`profiles`]** and **[`system`]**: Profile directory operations and
//!   host integration (distribution detection, dependency checks, autostart).
//!
//! Sources of truth are abstracted behind [`AddressSource`],
//! [`LatencySource`], [`InterfaceSource`] and [`ToolRunner`] so every path
//! can be driven by fakes in tests.

pub mod config;
pub mod control;
pub mod dns;
pub mod error;
pub mod model;
pub mod monitor;
pub mod probe;
pub mod profiles;
pub mod reconcile;
pub mod stream;
pub mod system;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControlConfig, MonitorConfig, ProbeConfig, ReconcileConfig};
pub use control::{ControlOutcome, ProcessRunner, ToolOutput, ToolRunner, TunnelControl};
pub use dns::{DnsPatch, patch_dns};
pub use error::{ControlError, CoreError, ProbeError, TunnelAction};
pub use monitor::Monitor;
pub use probe::{AddressSource, HttpEcho, LatencySource, PingLatency, Prober, parse_ping_time};
pub use reconcile::{InterfaceSource, ProcNetDev, Reconciler};
pub use stream::SnapshotStream;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ConnectionState, MAX_PROFILE_NAME_LEN, MonitorUpdate, NetworkSample, ProfileName, Status,
    UNKNOWN_MARKER,
};
