//! External toolchain invocation.
//!
//! This module spawns third-party executables, captures their output and
//! translates every process-level failure into an [`InvokeError`]:
//! - Missing root variable or executable fails before anything is spawned
//! - Non-zero exits become `Execution` errors carrying stderr verbatim
//! - Cancellation kills the child instead of leaving it orphaned

pub mod toolchain;
pub mod types;

use std::future::Future;
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use toolchain::Toolchain;
pub use types::{Invocation, InvokeError, OutputMode, ProcessOutcome};

/// Requests cancellation of every invocation observing the paired [`CancelToken`].
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
  pub fn cancel(&self) {
    self.0.send_replace(true);
  }
}

/// Observes a [`CancelHandle`]. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelToken(watch::Receiver<bool>);

impl CancelToken {
  pub fn is_cancelled(&self) -> bool {
    *self.0.borrow()
  }

  /// Resolves once cancellation has been requested. Never resolves if the
  /// handle is dropped without cancelling.
  pub async fn cancelled(&mut self) {
    let closed = self.0.wait_for(|cancelled| *cancelled).await.is_err();
    if closed {
      std::future::pending::<()>().await;
    }
  }
}

/// Create a connected cancellation handle and token.
pub fn cancellation() -> (CancelHandle, CancelToken) {
  let (tx, rx) = watch::channel(false);
  (CancelHandle(tx), CancelToken(rx))
}

/// Spawns and supervises external processes.
///
/// Holds no per-invocation state, so a single invoker may be shared by
/// concurrent pipelines.
#[derive(Debug, Clone, Default)]
pub struct Invoker {
  cancel: Option<CancelToken>,
}

impl Invoker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Invocations made through the returned invoker are killed when `token` fires.
  pub fn with_cancel(token: CancelToken) -> Self {
    Self { cancel: Some(token) }
  }

  /// Run a process and require it to exit successfully.
  ///
  /// # Returns
  ///
  /// The full outcome on a zero exit; `InvokeError::Execution` with the exit
  /// code and captured stderr otherwise.
  pub async fn invoke(&self, invocation: &Invocation) -> Result<ProcessOutcome, InvokeError> {
    let outcome = self.execute(invocation).await?;

    if !outcome.success() {
      if !outcome.stdout.is_empty() {
        debug!(stdout = %outcome.stdout, "command stdout");
      }
      return Err(InvokeError::Execution {
        program: invocation.program_name(),
        exit_code: outcome.exit_code,
        stderr: outcome.stderr,
      });
    }

    Ok(outcome)
  }

  /// Run a process and return its outcome whatever the exit code.
  pub async fn execute(&self, invocation: &Invocation) -> Result<ProcessOutcome, InvokeError> {
    match &self.cancel {
      Some(token) => {
        let mut token = token.clone();
        self.execute_until(invocation, async move { token.cancelled().await }).await
      }
      None => self.execute_until(invocation, std::future::pending::<()>()).await,
    }
  }

  /// Run a process until it exits or `cancel` resolves, whichever comes first.
  ///
  /// On cancellation the child is killed before this returns `Cancelled`.
  pub async fn execute_until<F>(&self, invocation: &Invocation, cancel: F) -> Result<ProcessOutcome, InvokeError>
  where
    F: Future<Output = ()>,
  {
    let program = invocation.program();
    info!(program = %program.display(), args = ?invocation.get_args(), "invoking");

    let mut command = Command::new(program);
    command
      .args(invocation.get_args())
      .envs(invocation.get_envs().iter().map(|(k, v)| (k, v)))
      .kill_on_drop(true);

    if let Some(dir) = invocation.get_current_dir() {
      command.current_dir(dir);
    }

    match invocation.output_mode() {
      OutputMode::Capture => {
        command.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
      }
      OutputMode::Inherit => {
        command.stdin(Stdio::inherit()).stdout(Stdio::inherit()).stderr(Stdio::inherit());
      }
    }

    let child = command.spawn().map_err(|source| spawn_error(invocation, source))?;
    debug!(pid = ?child.id(), "spawned process");

    // Dropping the wait future drops the child, which kill_on_drop then kills.
    let output = tokio::select! {
      output = child.wait_with_output() => output.map_err(|source| spawn_error(invocation, source))?,
      _ = cancel => {
        warn!(program = %program.display(), "invocation cancelled, killing child");
        return Err(InvokeError::Cancelled {
          program: invocation.program_name(),
        });
      }
    };

    let outcome = ProcessOutcome {
      exit_code: exit_code(output.status),
      stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
      stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    if !outcome.stderr.is_empty() {
      debug!(stderr = %outcome.stderr, "command stderr");
    }
    debug!(exit_code = outcome.exit_code, "process exited");

    Ok(outcome)
  }
}

fn spawn_error(invocation: &Invocation, source: std::io::Error) -> InvokeError {
  let path = invocation.program().to_path_buf();
  match invocation.get_toolchain() {
    Some(toolchain) if source.kind() == std::io::ErrorKind::NotFound => InvokeError::NotFound { toolchain, path },
    _ => InvokeError::Spawn { path, source },
  }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
  use std::os::unix::process::ExitStatusExt;

  status
    .code()
    .or_else(|| status.signal().map(|signal| 128 + signal))
    .unwrap_or(-1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
  status.code().unwrap_or(-1)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::shell_cmd;
  use std::time::{Duration, Instant};
  use tempfile::TempDir;

  fn shell(script: &str) -> Invocation {
    let (program, args) = shell_cmd(script);
    Invocation::new(program).args(args)
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn captures_stdout_on_success() {
    let outcome = Invoker::new().invoke(&shell("printf ok")).await.unwrap();

    assert_eq!(outcome.exit_code, 0);
    assert_eq!(outcome.stdout, "ok");
    assert_eq!(outcome.stderr, "");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn non_zero_exit_is_execution_error() {
    let result = Invoker::new().invoke(&shell("printf 'bad input' >&2; exit 2")).await;

    match result {
      Err(InvokeError::Execution { exit_code, stderr, .. }) => {
        assert_eq!(exit_code, 2);
        assert_eq!(stderr, "bad input");
      }
      other => panic!("expected execution error, got {other:?}"),
    }
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn execute_returns_non_zero_outcome() {
    let outcome = Invoker::new().execute(&shell("exit 127")).await.unwrap();
    assert_eq!(outcome.exit_code, 127);
    assert!(!outcome.success());
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn signal_death_maps_to_128_plus_signal() {
    let outcome = Invoker::new().execute(&shell("kill -9 $$")).await.unwrap();
    assert_eq!(outcome.exit_code, 128 + 9);
  }

  #[tokio::test]
  async fn missing_program_is_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("no-such-tool");

    let result = Invoker::new().invoke(&Invocation::new(&missing).toolchain("V")).await;

    assert!(matches!(result, Err(InvokeError::NotFound { toolchain: "V", path }) if path == missing));
  }

  #[tokio::test]
  async fn missing_plain_program_is_a_spawn_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("main");

    let result = Invoker::new().execute(&Invocation::new(&missing)).await;

    match result {
      Err(InvokeError::Spawn { path, source }) => {
        assert_eq!(path, missing);
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
      }
      other => panic!("expected spawn error, got {other:?}"),
    }
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn passes_env_and_cwd() {
    let temp = TempDir::new().unwrap();
    let invocation = shell("printf \"$GREETING\"; touch marker")
      .env("GREETING", "hi")
      .current_dir(temp.path());

    let outcome = Invoker::new().invoke(&invocation).await.unwrap();

    assert_eq!(outcome.stdout, "hi");
    assert!(temp.path().join("marker").exists());
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn cancellation_kills_child() {
    let temp = TempDir::new().unwrap();
    let survived = temp.path().join("survived");
    let script = format!("sleep 2 && touch {}", survived.display());

    let started = Instant::now();
    let result = Invoker::new()
      .execute_until(&shell(&script), tokio::time::sleep(Duration::from_millis(200)))
      .await;

    assert!(matches!(result, Err(InvokeError::Cancelled { .. })));
    assert!(started.elapsed() < Duration::from_secs(2));

    // The shell would have touched the marker had it outlived the cancellation.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!survived.exists(), "child process should have been killed");
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn cancel_handle_stops_invocation() {
    let (handle, token) = cancellation();
    let invoker = Invoker::with_cancel(token.clone());

    let task = tokio::spawn(async move { invoker.execute(&shell("exec sleep 30")).await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.cancel();

    let result = tokio::time::timeout(Duration::from_secs(10), task).await.unwrap().unwrap();
    assert!(matches!(result, Err(InvokeError::Cancelled { .. })));
    assert!(token.is_cancelled());
  }

  #[tokio::test]
  #[cfg(unix)]
  async fn dropped_handle_never_cancels() {
    let (handle, token) = cancellation();
    drop(handle);

    let outcome = Invoker::with_cancel(token).invoke(&shell("printf done")).await.unwrap();
    assert_eq!(outcome.stdout, "done");
  }
}
