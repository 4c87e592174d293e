//! Implementation of the `vitu run` command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use tracing::debug;

use super::{TargetArgs, compiler, exit_code};

/// Build and execute `file`, exiting with the program's own status.
///
/// The program shares this process's terminal. A pipeline failure exits with
/// 255 after the failure has been reported.
pub fn cmd_run(file: &Path, target: &TargetArgs) -> Result<ExitCode> {
  let job = target.job(file)?;
  let (rt, compiler) = compiler()?;

  let outcome = rt.block_on(compiler.run(&job));
  debug!(status = outcome.status_code(), "run finished");

  Ok(exit_code(outcome.status_code()))
}
