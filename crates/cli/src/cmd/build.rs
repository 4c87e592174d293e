//! Implementation of the `vitu build` command.

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;

use super::{TargetArgs, compiler, failure_code};
use crate::output::{format_duration, print_stat, print_success, print_warning};

/// Transpile and compile `file` into a native binary.
///
/// Toolchain stdout is echoed as-is; anything the toolchain wrote to stderr on
/// a successful build is shown as a warning.
pub fn cmd_build(file: &Path, target: &TargetArgs) -> Result<ExitCode> {
  let job = target.job(file)?;
  let (rt, compiler) = compiler()?;

  let started = Instant::now();
  let Ok(built) = rt.block_on(compiler.build(&job)) else {
    return Ok(failure_code());
  };

  if !built.stdout.is_empty() {
    print!("{}", built.stdout);
    if !built.stdout.ends_with('\n') {
      println!();
    }
  }
  let warnings = built.stderr.trim();
  if !warnings.is_empty() {
    print_warning(warnings);
  }

  print_success(&format!("Built {}", built.binary.display()));
  print_stat("Mode", job.configuration().mode().as_str());
  print_stat("Target", &job.configuration().platform().to_string());
  print_stat("Took", &format_duration(started.elapsed()));

  Ok(ExitCode::SUCCESS)
}
