mod build;
mod clean;
mod env;
mod fmt;
mod run;
mod transpile;
mod version;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use vitu_lib::compiler::{BuildMetadata, Compiler};
use vitu_lib::consts::{DEFAULT_BACKEND, DEFAULT_TARGET_DIR, FAILURE_EXIT_CODE};
use vitu_lib::invoke::{Invoker, cancellation};
use vitu_lib::job::{BuildConfiguration, BuildJob, BuildMode};
use vitu_lib::platform::{Arch, Os, Platform};

use crate::output::ConsoleReporter;

pub use build::cmd_build;
pub use clean::cmd_clean;
pub use env::cmd_env;
pub use fmt::{FmtStyle, cmd_fmt};
pub use run::cmd_run;
pub use test::cmd_test;
pub use transpile::cmd_transpile;
pub use version::cmd_version;

/// Flags shared by every command that builds a job.
#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
  /// Backend to generate code for (v, vlang, go, golang)
  #[arg(short, long, default_value = DEFAULT_BACKEND)]
  pub backend: String,

  /// Target operating system (default: host)
  #[arg(long)]
  pub os: Option<Os>,

  /// Target architecture (default: host)
  #[arg(long)]
  pub arch: Option<Arch>,

  /// Build without optimizations, with debug info (default)
  #[arg(long, conflicts_with = "release")]
  pub debug: bool,

  /// Build with optimizations
  #[arg(long)]
  pub release: bool,

  /// Directory that receives generated files and binaries
  #[arg(short = 'o', long, default_value = DEFAULT_TARGET_DIR)]
  pub out_dir: PathBuf,
}

impl TargetArgs {
  pub fn configuration(&self) -> Result<BuildConfiguration> {
    let mode = match (self.debug, self.release) {
      (false, true) => BuildMode::Release,
      _ => BuildMode::Debug,
    };
    let host = BuildConfiguration::for_host(&self.backend).context("Failed to detect the host platform")?;
    let platform = Platform::new(
      self.arch.unwrap_or(host.arch()),
      self.os.unwrap_or(host.os()),
    );
    Ok(host.with_platform(platform).with_mode(mode))
  }

  pub fn job(&self, source: &Path) -> Result<BuildJob> {
    let job = BuildJob::new(self.configuration()?, source, &self.out_dir);
    debug!(id = %job.id(), artifacts = %job.artifact_dir().display(), "created build job");
    Ok(job)
  }
}

pub(crate) fn metadata() -> BuildMetadata {
  let metadata = BuildMetadata::new(env!("CARGO_PKG_VERSION"));
  match option_env!("VITU_COMMIT") {
    Some(commit) => metadata.with_commit(commit),
    None => metadata,
  }
}

/// Build the async runtime and a compiler whose processes are killed on Ctrl-C.
///
/// The returned runtime must be the one the compiler's futures are driven on.
pub(crate) fn compiler() -> Result<(tokio::runtime::Runtime, Compiler<ConsoleReporter>)> {
  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let (handle, token) = cancellation();

  rt.spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      debug!("interrupt received, cancelling");
      handle.cancel();
    }
  });

  let compiler = Compiler::new(metadata())
    .with_invoker(Invoker::with_cancel(token))
    .with_reporter(ConsoleReporter);
  Ok((rt, compiler))
}

/// Exit code for an operation that failed after reporting.
pub(crate) fn failure_code() -> ExitCode {
  exit_code(FAILURE_EXIT_CODE)
}

pub(crate) fn exit_code(code: i32) -> ExitCode {
  ExitCode::from(exit_status(code))
}

/// Clamp a program status into the 0..=255 range a process can exit with.
fn exit_status(code: i32) -> u8 {
  u8::try_from(code).unwrap_or(u8::MAX)
}
