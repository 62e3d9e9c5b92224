// ── Network probe ──
//
// One probe cycle measures the external address and the round-trip
// latency to a reference host. The two halves run concurrently and
// degrade independently: a failure leaves that field unknown.

use std::future::Future;
use std::net::IpAddr;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;
use url::Url;

use crate::config::ProbeConfig;
use crate::error::ProbeError;
use crate::model::NetworkSample;

/// Extra time granted to the ping process beyond its own deadline.
const PING_GRACE: Duration = Duration::from_millis(500);

// ── Sources ──────────────────────────────────────────────────────

/// Resolves the host's public address.
pub trait AddressSource: Send + Sync + 'static {
    fn external_address(&self) -> impl Future<Output = Result<IpAddr, ProbeError>> + Send;
}

/// Measures round-trip latency in milliseconds.
pub trait LatencySource: Send + Sync + 'static {
    fn latency_ms(&self) -> impl Future<Output = Result<f64, ProbeError>> + Send;
}

// ── HTTP echo ────────────────────────────────────────────────────

/// Plain-text "what is my IP" endpoint.
#[derive(Debug, Clone)]
pub struct HttpEcho {
    http: reqwest::Client,
    url: Url,
}

impl HttpEcho {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, ProbeError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wgpulse/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, url })
    }
}

impl AddressSource for HttpEcho {
    async fn external_address(&self) -> Result<IpAddr, ProbeError> {
        let resp = self.http.get(self.url.clone()).send().await?;
        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(ProbeError::Status(status.as_u16()));
        }
        let body = resp.text().await?;
        let trimmed = body.trim();
        trimmed
            .parse()
            .map_err(|_| ProbeError::MalformedAddress(trimmed.to_owned()))
    }
}

// ── Ping ─────────────────────────────────────────────────────────

/// Single ICMP echo through the system `ping` utility.
#[derive(Debug, Clone)]
pub struct PingLatency {
    program: String,
    target: IpAddr,
    timeout: Duration,
}

impl PingLatency {
    pub fn new(program: impl Into<String>, target: IpAddr, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            target,
            timeout,
        }
    }

    fn command(&self) -> Command {
        // `-W` takes whole seconds; never pass 0, which means "wait forever".
        let wait = self.timeout.as_secs().max(1);
        let mut cmd = Command::new(&self.program);
        cmd.args(["-c", "1", "-W"])
            .arg(wait.to_string())
            .arg(self.target.to_string())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl LatencySource for PingLatency {
    async fn latency_ms(&self) -> Result<f64, ProbeError> {
        let deadline = self.timeout + PING_GRACE;
        let output = tokio::time::timeout(deadline, self.command().output())
            .await
            .map_err(|_| ProbeError::TimedOut(deadline))?
            .map_err(|source| ProbeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ProbeError::PingFailed(output.status.to_string()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_ping_time(&stdout).ok_or(ProbeError::MalformedOutput)
    }
}

/// Extract the first reply's round-trip time from `ping` output.
///
/// Accepts `time=14.2 ms`, `time=14ms` and the sub-millisecond
/// `time<1ms` form.
pub fn parse_ping_time(output: &str) -> Option<f64> {
    output.lines().find_map(|line| {
        let idx = line.find("time=").or_else(|| line.find("time<"))?;
        let rest = &line[idx + 5..];
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        rest[..end].parse::<f64>().ok()
    })
}

// ── Prober ───────────────────────────────────────────────────────

/// Runs one complete probe cycle.
pub struct Prober<A, L> {
    address: A,
    latency: L,
}

impl Prober<HttpEcho, PingLatency> {
    /// Real network sources built from configuration.
    pub fn from_config(cfg: &ProbeConfig) -> Result<Self, ProbeError> {
        Ok(Self::new(
            HttpEcho::new(cfg.ip_echo_url.clone(), cfg.ip_echo_timeout)?,
            PingLatency::new(cfg.ping_program.clone(), cfg.ping_target, cfg.ping_timeout),
        ))
    }
}

impl<A: AddressSource, L: LatencySource> Prober<A, L> {
    pub fn new(address: A, latency: L) -> Self {
        Self { address, latency }
    }

    /// Take one sample. Never fails; unmeasurable fields are `None`.
    pub async fn sample(&self) -> NetworkSample {
        let (address, latency) =
            tokio::join!(self.address.external_address(), self.latency.latency_ms());

        let external_address = address
            .inspect_err(|e| debug!(error = %e, "external address probe failed"))
            .ok();
        let latency_ms = latency
            .inspect_err(|e| debug!(error = %e, "latency probe failed"))
            .ok();

        NetworkSample::new(external_address, latency_ms)
    }
}
