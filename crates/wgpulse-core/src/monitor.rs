// ── Monitor ──
//
// Owns the probe and reconciliation loops. Each loop replaces its own
// published value through a `watch` channel; consumers only ever see
// immutable snapshots.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_stream::wrappers::WatchStream;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::ProbeError;
use crate::model::{ConnectionState, MonitorUpdate, NetworkSample, Status};
use crate::probe::{AddressSource, HttpEcho, LatencySource, PingLatency, Prober};
use crate::reconcile::{InterfaceSource, ProcNetDev, Reconciler};
use crate::stream::SnapshotStream;

type SampleSlot = Option<Arc<NetworkSample>>;

// ── Monitor ──────────────────────────────────────────────────────

/// Background connectivity monitor.
///
/// Cheaply cloneable via `Arc<MonitorInner>`. Call [`start()`](Self::start)
/// to spawn both loops and [`shutdown()`](Self::shutdown) to stop them.
pub struct Monitor<A = HttpEcho, L = PingLatency, I = ProcNetDev> {
    inner: Arc<MonitorInner<A, L, I>>,
}

impl<A, L, I> Clone for Monitor<A, L, I> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct MonitorInner<A, L, I> {
    config: MonitorConfig,
    prober: Prober<A, L>,
    reconciler: Reconciler<I>,
    state: watch::Sender<ConnectionState>,
    sample: watch::Sender<SampleSlot>,
    cancel: CancellationToken,
    /// Child token for the current run, replaced after a shutdown so the
    /// monitor can be started again.
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    /// Monitor backed by the real network and `/proc` sources.
    pub fn new(config: MonitorConfig) -> Result<Self, ProbeError> {
        let prober = Prober::from_config(&config.probe)?;
        let interfaces = ProcNetDev::new(config.reconcile.interface_listing.clone());
        Ok(Self::from_parts(config, prober, interfaces))
    }

    /// One-shot: reconcile once and probe once without spawning tasks.
    pub async fn oneshot_status(config: MonitorConfig) -> Result<Status, ProbeError> {
        let monitor = Self::new(config)?;
        Ok(monitor.refresh_once().await)
    }
}

impl<A, L, I> Monitor<A, L, I>
where
    A: AddressSource,
    L: LatencySource,
    I: InterfaceSource,
{
    /// Monitor with caller-supplied sources.
    pub fn with_sources(config: MonitorConfig, address: A, latency: L, interfaces: I) -> Self {
        Self::from_parts(config, Prober::new(address, latency), interfaces)
    }

    fn from_parts(config: MonitorConfig, prober: Prober<A, L>, interfaces: I) -> Self {
        let reconciler = Reconciler::new(interfaces, config.profiles_dir.clone());
        let (state, _) = watch::channel(ConnectionState::Unknown);
        let (sample, _) = watch::channel(None);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(MonitorInner {
                config,
                prober,
                reconciler,
                state,
                sample,
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the probe and reconciliation loops. Calling `start()` on a
    /// running monitor does nothing.
    pub async fn start(&self) {
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            warn!("monitor already running");
            return;
        }

        let cancel = {
            let mut child = self.inner.cancel_child.lock().await;
            if child.is_cancelled() {
                *child = self.inner.cancel.child_token();
            }
            child.clone()
        };

        let probe_every = self.inner.config.probe.interval;
        let reconcile_every = self.inner.config.reconcile.interval;
        handles.push(tokio::spawn(probe_task(self.clone(), probe_every, cancel.clone())));
        handles.push(tokio::spawn(reconcile_task(self.clone(), reconcile_every, cancel)));

        info!(
            profiles_dir = %self.inner.config.profiles_dir.display(),
            probe_interval = ?probe_every,
            reconcile_interval = ?reconcile_every,
            "monitor started"
        );
    }

    /// Cancel both loops and wait for them to finish. Published values
    /// are kept.
    pub async fn shutdown(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("monitor stopped");
    }

    pub async fn is_running(&self) -> bool {
        !self.inner.task_handles.lock().await.is_empty()
    }

    /// Run one reconcile tick and one probe concurrently, publish both
    /// and return the resulting status.
    pub async fn refresh_once(&self) -> Status {
        let (state, sample) = tokio::join!(
            self.inner.reconciler.tick(),
            self.inner.prober.sample()
        );
        self.publish_state(state);
        self.publish_sample(sample);
        self.status()
    }

    // ── Publication ──────────────────────────────────────────────

    fn publish_state(&self, next: ConnectionState) {
        let mut previous = None;
        self.inner.state.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            previous = Some(std::mem::replace(current, next.clone()));
            true
        });
        if let Some(previous) = previous {
            info!(from = %previous, to = %next, "connection state changed");
        }
    }

    fn publish_sample(&self, sample: NetworkSample) {
        debug!(
            address = %sample.address_display(),
            latency = %sample.latency_display(),
            "network sample"
        );
        self.inner.sample.send_replace(Some(Arc::new(sample)));
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state. Notifies on change only.
    pub fn connection_state(&self) -> SnapshotStream<ConnectionState> {
        SnapshotStream::new(self.inner.state.subscribe())
    }

    /// Subscribe to network samples. Notifies on every completed probe,
    /// degraded ones included. `None` until the first probe finishes.
    pub fn network_sample(&self) -> SnapshotStream<SampleSlot> {
        SnapshotStream::new(self.inner.sample.subscribe())
    }

    /// Latest value of each loop. The two halves are not correlated in
    /// time.
    pub fn status(&self) -> Status {
        Status {
            state: self.inner.state.borrow().clone(),
            sample: self.inner.sample.borrow().clone(),
        }
    }

    /// Merged stream of both loops' publications, starting with the
    /// current state (and the current sample, if any).
    pub fn updates(&self) -> impl Stream<Item = MonitorUpdate> + Send + Unpin + use<A, L, I> {
        let states = WatchStream::new(self.inner.state.subscribe()).map(MonitorUpdate::State);
        let samples = WatchStream::new(self.inner.sample.subscribe())
            .filter_map(|slot| slot.map(MonitorUpdate::Sample));
        states.merge(samples)
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn probe_task<A, L, I>(monitor: Monitor<A, L, I>, every: Duration, cancel: CancellationToken)
where
    A: AddressSource,
    L: LatencySource,
    I: InterfaceSource,
{
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    sample = monitor.inner.prober.sample() => monitor.publish_sample(sample),
                }
            }
        }
    }
}

async fn reconcile_task<A, L, I>(
    monitor: Monitor<A, L, I>,
    every: Duration,
    cancel: CancellationToken,
) where
    A: AddressSource,
    L: LatencySource,
    I: InterfaceSource,
{
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let state = monitor.inner.reconciler.tick().await;
                monitor.publish_state(state);
            }
        }
    }
}
