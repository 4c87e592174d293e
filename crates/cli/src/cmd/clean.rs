//! Implementation of the `vitu clean` command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use super::{TargetArgs, compiler, failure_code};

pub fn cmd_clean(file: &Path, target: &TargetArgs) -> Result<ExitCode> {
  let job = target.job(file)?;
  let (rt, compiler) = compiler()?;

  match rt.block_on(compiler.clean(&job)) {
    Ok(()) => Ok(ExitCode::SUCCESS),
    Err(_) => Ok(failure_code()),
  }
}
