//! Implementation of the `vitu fmt` command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::ValueEnum;
use tracing::debug;

use super::{TargetArgs, compiler, failure_code};

/// Character set used when rendering formatted output.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FmtStyle {
  #[default]
  Ascii,
  Unicode,
}

pub fn cmd_fmt(file: &Path, style: FmtStyle, target: &TargetArgs) -> Result<ExitCode> {
  let job = target.job(file)?;
  let (rt, compiler) = compiler()?;

  debug!(?style, "formatting");
  match rt.block_on(compiler.format(&job)) {
    Ok(()) => Ok(ExitCode::SUCCESS),
    Err(_) => Ok(failure_code()),
  }
}
