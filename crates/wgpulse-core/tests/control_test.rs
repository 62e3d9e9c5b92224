#![allow(clippy::unwrap_used)]
// Integration tests for `TunnelControl` with a scripted tool runner.

use std::ffi::OsString;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use wgpulse_core::{
    ControlConfig, ControlError, ControlOutcome, CoreError, ProfileName, ToolOutput, ToolRunner,
    TunnelControl,
};

// ── Helpers ─────────────────────────────────────────────────────────

type Call = (String, Vec<OsString>);

/// Replies with a fixed output and records every invocation.
#[derive(Clone)]
struct ScriptedRunner {
    reply: Result<ToolOutput, std::io::ErrorKind>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedRunner {
    fn exit(code: i32, stderr: &str) -> Self {
        Self {
            reply: Ok(ToolOutput {
                code: Some(code),
                stderr: stderr.into(),
            }),
            calls: Arc::default(),
        }
    }

    fn unspawnable() -> Self {
        Self {
            reply: Err(std::io::ErrorKind::NotFound),
            calls: Arc::default(),
        }
    }
}

impl ToolRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[OsString]) -> std::io::Result<ToolOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_owned(), args.to_vec()));
        self.reply.clone().map_err(std::io::Error::from)
    }
}

/// Blocks inside `run` until released.
struct GatedRunner {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl ToolRunner for GatedRunner {
    async fn run(&self, _program: &str, _args: &[OsString]) -> std::io::Result<ToolOutput> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(ToolOutput {
            code: Some(0),
            stderr: String::new(),
        })
    }
}

fn profiles_dir_with(names: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in names {
        std::fs::write(dir.path().join(format!("{name}.conf")), "[Interface]\n").unwrap();
    }
    dir
}

fn control<R: ToolRunner>(dir: &Path, runner: R) -> TunnelControl<R> {
    TunnelControl::with_runner(ControlConfig::new(dir), runner)
}

fn wg0() -> ProfileName {
    ProfileName::new("wg0").unwrap()
}

// ── connect ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_invokes_privileged_wg_quick() {
    let dir = profiles_dir_with(&["wg0"]);
    let runner = ScriptedRunner::exit(0, "");
    let ctl = control(dir.path(), runner.clone());

    ctl.connect(&wg0()).await.unwrap();

    let calls = runner.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (program, args) = &calls[0];
    assert_eq!(program, "sudo");
    let expected_path = dir.path().join("wg0.conf");
    assert_eq!(
        args,
        &[
            OsString::from("wg-quick"),
            OsString::from("up"),
            expected_path.into_os_string(),
        ]
    );
}

#[tokio::test]
async fn test_connect_failure_carries_stderr() {
    let dir = profiles_dir_with(&["wg0"]);
    let ctl = control(dir.path(), ScriptedRunner::exit(1, "invalid config\n"));

    let err = ctl.connect(&wg0()).await.unwrap_err();

    assert!(
        matches!(
            err,
            CoreError::Control(ControlError::ToolFailed { code: Some(1), .. })
        ),
        "expected ToolFailed, got: {err:?}"
    );
    assert!(err.to_string().contains("invalid config"), "{err}");
}

#[tokio::test]
async fn test_connect_failure_without_stderr() {
    let dir = profiles_dir_with(&["wg0"]);
    let ctl = control(dir.path(), ScriptedRunner::exit(2, "  \n"));

    let err = ctl.connect(&wg0()).await.unwrap_err();
    assert!(err.to_string().contains("unknown error"), "{err}");
}

#[tokio::test]
async fn test_connect_exit_zero_ignores_stderr() {
    let dir = profiles_dir_with(&["wg0"]);
    let ctl = control(
        dir.path(),
        ScriptedRunner::exit(0, "Warning: `/etc/wg0.conf' is world accessible"),
    );

    assert!(ctl.connect(&wg0()).await.is_ok());
}

#[tokio::test]
async fn test_connect_missing_profile_does_not_spawn() {
    let dir = profiles_dir_with(&[]);
    let runner = ScriptedRunner::exit(0, "");
    let ctl = control(dir.path(), runner.clone());

    let err = ctl.connect(&wg0()).await.unwrap_err();

    assert!(matches!(err, CoreError::ProfileNotFound { .. }), "{err:?}");
    assert!(runner.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_connect_spawn_failure() {
    let dir = profiles_dir_with(&["wg0"]);
    let ctl = control(dir.path(), ScriptedRunner::unspawnable());

    let err = ctl.connect(&wg0()).await.unwrap_err();
    assert!(
        matches!(err, CoreError::Control(ControlError::Spawn { .. })),
        "{err:?}"
    );
}

// ── disconnect ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_disconnect_success() {
    let dir = profiles_dir_with(&["wg0"]);
    let runner = ScriptedRunner::exit(0, "");
    let ctl = control(dir.path(), runner.clone());

    assert_eq!(ctl.disconnect(&wg0()).await.unwrap(), ControlOutcome::Done);
    let calls = runner.calls.lock().unwrap();
    assert_eq!(calls[0].1[1], OsString::from("down"));
}

#[tokio::test]
async fn test_disconnect_failure_is_warning() {
    let dir = profiles_dir_with(&["wg0"]);
    let ctl = control(dir.path(), ScriptedRunner::exit(1, "wg0 is not a WireGuard interface"));

    match ctl.disconnect(&wg0()).await.unwrap() {
        ControlOutcome::Warning(msg) => {
            assert!(msg.contains("is not a WireGuard interface"), "{msg}");
        }
        ControlOutcome::Done => panic!("expected a warning"),
    }
}

#[tokio::test]
async fn test_disconnect_spawn_failure_is_error() {
    let dir = profiles_dir_with(&["wg0"]);
    let ctl = control(dir.path(), ScriptedRunner::unspawnable());

    assert!(ctl.disconnect(&wg0()).await.is_err());
}

// ── Single-flight guard ─────────────────────────────────────────────

#[tokio::test]
async fn test_concurrent_invocation_is_rejected() {
    let dir = profiles_dir_with(&["wg0"]);
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let ctl = Arc::new(control(
        dir.path(),
        GatedRunner {
            started: Arc::clone(&started),
            release: Arc::clone(&release),
        },
    ));

    let first = {
        let ctl = Arc::clone(&ctl);
        tokio::spawn(async move { ctl.connect(&wg0()).await })
    };
    started.notified().await;

    let err = ctl.disconnect(&wg0()).await.unwrap_err();
    assert!(
        matches!(err, CoreError::Control(ControlError::Busy)),
        "expected Busy, got: {err:?}"
    );

    release.notify_one();
    first.await.unwrap().unwrap();

    // The guard is released once the first call finishes.
    let again = tokio::spawn({
        let ctl = Arc::clone(&ctl);
        async move { ctl.connect(&wg0()).await }
    });
    started.notified().await;
    release.notify_one();
    again.await.unwrap().unwrap();
}
