// ── Tunnel control ──
//
// User-triggered `wg-quick up|down` invocations. Never called from the
// background loops; the next reconciliation tick observes the effect.
// At most one invocation is in flight per `TunnelControl`.

use std::ffi::OsString;
use std::future::Future;
use std::path::Path;

use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ControlConfig;
use crate::error::{ControlError, CoreError, TunnelAction};
use crate::model::ProfileName;
use crate::profiles;

// ── Process runner ───────────────────────────────────────────────

/// Exit status and diagnostics of a finished tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    /// `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns an external program and waits for it to exit.
pub trait ToolRunner: Send + Sync + 'static {
    fn run(
        &self,
        program: &str,
        args: &[OsString],
    ) -> impl Future<Output = std::io::Result<ToolOutput>> + Send;
}

/// Runs programs as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    async fn run(&self, program: &str, args: &[OsString]) -> std::io::Result<ToolOutput> {
        let output = Command::new(program).args(args).output().await?;
        Ok(ToolOutput {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

// ── Outcome ──────────────────────────────────────────────────────

/// Result of a teardown request that did not hard-fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    Done,
    /// The tool reported a problem; the tunnel may still be up.
    Warning(String),
}

// ── TunnelControl ────────────────────────────────────────────────

/// Brings tunnels up and down through `wg-quick`.
pub struct TunnelControl<R = ProcessRunner> {
    config: ControlConfig,
    runner: R,
    in_flight: Mutex<()>,
}

impl TunnelControl<ProcessRunner> {
    pub fn new(config: ControlConfig) -> Self {
        Self::with_runner(config, ProcessRunner)
    }
}

impl<R: ToolRunner> TunnelControl<R> {
    pub fn with_runner(config: ControlConfig, runner: R) -> Self {
        Self {
            config,
            runner,
            in_flight: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Bring `name` up. A non-zero exit is an error carrying the tool's
    /// stderr; exit 0 is success whatever stderr says.
    pub async fn connect(&self, name: &ProfileName) -> Result<(), CoreError> {
        self.invoke(TunnelAction::Up, name).await?;
        info!(profile = %name, "tunnel up");
        Ok(())
    }

    /// Take `name` down. A non-zero exit is reported as a warning rather
    /// than an error; a missing profile, a spawn failure or a concurrent
    /// call still fails.
    pub async fn disconnect(&self, name: &ProfileName) -> Result<ControlOutcome, CoreError> {
        match self.invoke(TunnelAction::Down, name).await {
            Ok(()) => {
                info!(profile = %name, "tunnel down");
                Ok(ControlOutcome::Done)
            }
            Err(CoreError::Control(e @ ControlError::ToolFailed { .. })) => {
                warn!(profile = %name, error = %e, "disconnect reported a problem");
                Ok(ControlOutcome::Warning(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn invoke(&self, action: TunnelAction, name: &ProfileName) -> Result<(), CoreError> {
        let _guard = self.in_flight.try_lock().map_err(|_| ControlError::Busy)?;

        let path = profiles::existing_profile_path(&self.config.profiles_dir, name)?;
        let (program, args) = self.command_line(action, &path);
        debug!(%program, ?args, "invoking tunnel tool");

        let output = self
            .runner
            .run(&program, &args)
            .await
            .map_err(|source| ControlError::Spawn {
                program: program.clone(),
                source,
            })?;

        if output.success() {
            return Ok(());
        }

        let reason = output.stderr.trim();
        Err(ControlError::ToolFailed {
            program: self.config.tool.clone(),
            action,
            profile: name.to_string(),
            code: output.code,
            reason: if reason.is_empty() {
                "unknown error".to_owned()
            } else {
                reason.to_owned()
            },
        }
        .into())
    }

    /// `[privilege] tool action path`
    fn command_line(&self, action: TunnelAction, path: &Path) -> (String, Vec<OsString>) {
        let mut args: Vec<OsString> = Vec::with_capacity(3);
        let program = match self.config.privilege_command.as_deref() {
            Some(wrapper) if !wrapper.trim().is_empty() => {
                args.push(self.config.tool.clone().into());
                wrapper.trim().to_owned()
            }
            _ => self.config.tool.clone(),
        };
        args.push(action.as_arg().into());
        args.push(path.as_os_str().to_owned());
        (program, args)
    }
}
