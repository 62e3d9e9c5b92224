#![allow(clippy::unwrap_used)]
// Integration tests for `Monitor` with fake sources on a paused clock.

use std::future::Future;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_stream::StreamExt;

use wgpulse_core::{
    AddressSource, ConnectionState, InterfaceSource, LatencySource, Monitor, MonitorConfig,
    MonitorUpdate, ProbeError, ProfileName,
};

// ── Fakes ───────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct CountingAddress {
    calls: Arc<AtomicUsize>,
}

impl AddressSource for CountingAddress {
    fn external_address(&self) -> impl Future<Output = Result<IpAddr, ProbeError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::ready(Ok("203.0.113.9".parse().unwrap()))
    }
}

struct FailingLatency;

impl LatencySource for FailingLatency {
    fn latency_ms(&self) -> impl Future<Output = Result<f64, ProbeError>> + Send {
        std::future::ready(Err(ProbeError::MalformedOutput))
    }
}

/// Interface listing the test can rewrite; `None` simulates a read error.
#[derive(Clone, Default)]
struct SharedListing(Arc<Mutex<Option<String>>>);

impl SharedListing {
    fn set(&self, listing: Option<&str>) {
        *self.0.lock().unwrap() = listing.map(str::to_owned);
    }
}

impl InterfaceSource for SharedListing {
    fn read_listing(&self) -> impl Future<Output = std::io::Result<String>> + Send {
        let result = self
            .0
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound));
        std::future::ready(result)
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

type TestMonitor = Monitor<CountingAddress, FailingLatency, SharedListing>;

fn setup(listing: Option<&str>) -> (tempfile::TempDir, TestMonitor, CountingAddress, SharedListing) {
    let dir = tempfile::tempdir().unwrap();
    for name in ["wg1", "wg0", "home"] {
        std::fs::write(dir.path().join(format!("{name}.conf")), "").unwrap();
    }
    let address = CountingAddress::default();
    let interfaces = SharedListing::default();
    interfaces.set(listing);
    let monitor = Monitor::with_sources(
        MonitorConfig::new(dir.path()),
        address.clone(),
        FailingLatency,
        interfaces.clone(),
    );
    (dir, monitor, address, interfaces)
}

fn active(name: &str) -> ConnectionState {
    ConnectionState::Active(ProfileName::new(name).unwrap())
}

async fn wait_for_state(monitor: &TestMonitor, want: &ConnectionState) {
    let mut sub = monitor.connection_state();
    tokio::time::timeout(Duration::from_secs(30), async {
        while sub.current() != want {
            sub.changed().await.unwrap();
        }
    })
    .await
    .unwrap();
}

const LISTING_WG0: &str = "  lo: 1 2 3\n  eth0: 4 5 6\n  wg0: 7 8 9\n";
const LISTING_WG_BOTH: &str = "  wg1: 0\n  wg0: 0\n";

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_initial_state_is_unknown() {
    let (_dir, monitor, _, _) = setup(Some(LISTING_WG0));

    let status = monitor.status();
    assert_eq!(status.state, ConnectionState::Unknown);
    assert!(status.sample.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reconcile_tracks_interfaces() {
    let (_dir, monitor, _, interfaces) = setup(Some(LISTING_WG0));
    monitor.start().await;

    wait_for_state(&monitor, &active("wg0")).await;

    interfaces.set(Some("  lo: 0\n  eth0: 0\n"));
    wait_for_state(&monitor, &ConnectionState::Disconnected).await;

    interfaces.set(Some(LISTING_WG_BOTH));
    wait_for_state(&monitor, &active("wg0")).await;

    monitor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_listing_is_disconnected() {
    let (_dir, monitor, _, _) = setup(None);
    monitor.start().await;

    wait_for_state(&monitor, &ConnectionState::Disconnected).await;

    monitor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_probe_publishes_degraded_samples_on_cadence() {
    let (_dir, monitor, address, _) = setup(Some(LISTING_WG0));
    let mut samples = monitor.network_sample();
    monitor.start().await;

    let first = samples.changed().await.unwrap().unwrap();
    assert_eq!(first.external_address, Some("203.0.113.9".parse().unwrap()));
    assert_eq!(first.latency_ms, None);

    // Ticks at 0 s, 7 s and 14 s.
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(address.calls.load(Ordering::SeqCst), 3);

    // A degraded sample is still a fresh publication.
    let next = samples.changed().await.unwrap().unwrap();
    assert!(next.is_degraded());

    monitor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_loops_and_restart_works() {
    let (_dir, monitor, address, _) = setup(Some(LISTING_WG0));
    monitor.start().await;
    monitor.start().await; // no-op
    wait_for_state(&monitor, &active("wg0")).await;

    monitor.shutdown().await;
    assert!(!monitor.is_running().await);
    let after_shutdown = address.calls.load(Ordering::SeqCst);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(address.calls.load(Ordering::SeqCst), after_shutdown);
    assert_eq!(monitor.status().state, active("wg0"));

    monitor.start().await;
    assert!(monitor.is_running().await);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(address.calls.load(Ordering::SeqCst) > after_shutdown);
    monitor.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_updates_merge_both_loops() {
    let (_dir, monitor, _, _) = setup(Some(LISTING_WG0));
    let mut updates = monitor.updates();

    assert_eq!(updates.next().await, Some(MonitorUpdate::State(ConnectionState::Unknown)));

    monitor.start().await;

    let mut saw_state = false;
    let mut saw_sample = false;
    tokio::time::timeout(Duration::from_secs(30), async {
        while !(saw_state && saw_sample) {
            match updates.next().await.unwrap() {
                MonitorUpdate::State(state) => saw_state |= state == active("wg0"),
                MonitorUpdate::Sample(sample) => saw_sample |= sample.external_address.is_some(),
            }
        }
    })
    .await
    .unwrap();

    monitor.shutdown().await;
}

#[tokio::test]
async fn test_refresh_once_without_tasks() {
    let (_dir, monitor, address, _) = setup(Some(LISTING_WG_BOTH));

    let status = monitor.refresh_once().await;

    assert_eq!(status.state, active("wg0"));
    let sample = status.sample.unwrap();
    assert!(sample.external_address.is_some());
    assert_eq!(sample.latency_ms, None);
    assert_eq!(address.calls.load(Ordering::SeqCst), 1);
    assert!(!monitor.is_running().await);
}
