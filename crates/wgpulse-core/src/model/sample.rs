// ── Network sample ──

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::ConnectionState;

/// Placeholder rendered for a field that could not be measured.
pub const UNKNOWN_MARKER: &str = "—";

/// One probe cycle's measurements. `None` means "unknown", never stale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSample {
    pub external_address: Option<IpAddr>,
    pub latency_ms: Option<f64>,
    pub sampled_at: DateTime<Utc>,
}

impl NetworkSample {
    pub fn new(external_address: Option<IpAddr>, latency_ms: Option<f64>) -> Self {
        Self {
            external_address,
            latency_ms,
            sampled_at: Utc::now(),
        }
    }

    /// True when at least one field is unknown.
    pub fn is_degraded(&self) -> bool {
        self.external_address.is_none() || self.latency_ms.is_none()
    }

    pub fn address_display(&self) -> String {
        self.external_address
            .map_or_else(|| UNKNOWN_MARKER.to_owned(), |a| a.to_string())
    }

    pub fn latency_display(&self) -> String {
        self.latency_ms
            .map_or_else(|| UNKNOWN_MARKER.to_owned(), |ms| format!("{ms:.1} ms"))
    }
}

/// Notification emitted by a running monitor.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorUpdate {
    State(ConnectionState),
    Sample(Arc<NetworkSample>),
}

/// Latest known values of both loops.
///
/// The two halves come from independent loops and carry no common
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub state: ConnectionState,
    pub sample: Option<Arc<NetworkSample>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_when_any_field_missing() {
        let addr: IpAddr = "203.0.113.7".parse().expect("ip");
        assert!(!NetworkSample::new(Some(addr), Some(12.0)).is_degraded());
        assert!(NetworkSample::new(None, Some(12.0)).is_degraded());
        assert!(NetworkSample::new(Some(addr), None).is_degraded());
    }

    #[test]
    fn unknown_fields_render_marker() {
        let sample = NetworkSample::new(None, None);
        assert_eq!(sample.address_display(), UNKNOWN_MARKER);
        assert_eq!(sample.latency_display(), UNKNOWN_MARKER);
    }

    #[test]
    fn latency_renders_one_decimal() {
        let sample = NetworkSample::new(None, Some(14.26));
        assert_eq!(sample.latency_display(), "14.3 ms");
    }
}
