//! Types for external process invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while locating or supervising an external toolchain process.
#[derive(Debug, Error)]
pub enum InvokeError {
  /// The toolchain root environment variable is unset or empty.
  #[error("{var} is not set; point it at the {toolchain} installation directory")]
  NotConfigured { toolchain: &'static str, var: &'static str },

  /// The executable does not exist where the configuration says it should.
  #[error("{toolchain} executable not found at {}", path.display())]
  NotFound { toolchain: &'static str, path: PathBuf },

  /// The process could not be started or waited on.
  #[error("failed to run {}: {source}", path.display())]
  Spawn {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The process exited with a non-zero code.
  #[error("{program} exited with code {exit_code}:\n{stderr}")]
  Execution {
    program: String,
    exit_code: i32,
    stderr: String,
  },

  /// The caller cancelled the invocation; the child was killed.
  #[error("{program} was cancelled")]
  Cancelled { program: String },
}

/// Where the child's standard streams go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
  /// stdin is closed, stdout and stderr are captured into the outcome.
  #[default]
  Capture,
  /// All three streams are shared with the calling process.
  Inherit,
}

/// A fully described process launch.
#[derive(Debug, Clone)]
pub struct Invocation {
  program: PathBuf,
  args: Vec<OsString>,
  envs: Vec<(OsString, OsString)>,
  current_dir: Option<PathBuf>,
  output: OutputMode,
  toolchain: Option<&'static str>,
}

impl Invocation {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      envs: Vec::new(),
      current_dir: None,
      output: OutputMode::Capture,
      toolchain: None,
    }
  }

  pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
    self.envs.push((key.into(), value.into()));
    self
  }

  pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.current_dir = Some(dir.into());
    self
  }

  pub fn inherit_output(mut self) -> Self {
    self.output = OutputMode::Inherit;
    self
  }

  /// Mark the program as the executable of toolchain `name`, so a missing
  /// program is reported as `NotFound` for that toolchain.
  pub fn toolchain(mut self, name: &'static str) -> Self {
    self.toolchain = Some(name);
    self
  }

  pub fn program(&self) -> &Path {
    &self.program
  }

  pub fn get_args(&self) -> &[OsString] {
    &self.args
  }

  pub fn get_envs(&self) -> &[(OsString, OsString)] {
    &self.envs
  }

  pub fn get_current_dir(&self) -> Option<&Path> {
    self.current_dir.as_deref()
  }

  pub fn output_mode(&self) -> OutputMode {
    self.output
  }

  pub fn get_toolchain(&self) -> Option<&'static str> {
    self.toolchain
  }

  /// Short display name of the program (its file name).
  pub fn program_name(&self) -> String {
    self
      .program
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| self.program.display().to_string())
  }
}

/// What a finished process left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
  /// Exit code; on Unix a signal death is reported as `128 + signal`.
  pub exit_code: i32,
  /// Captured stdout, empty when output was inherited.
  pub stdout: String,
  /// Captured stderr, empty when output was inherited.
  pub stderr: String,
}

impl ProcessOutcome {
  pub fn success(&self) -> bool {
    self.exit_code == 0
  }
}
