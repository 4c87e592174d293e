//! Implementation of the `vitu transpile` command.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use super::{TargetArgs, compiler, failure_code};
use crate::output::{print_stat, print_success, symbols, truncate_hash};

/// Generate backend source for `file` without compiling it.
///
/// Prints the generated file's path and content hash.
pub fn cmd_transpile(file: &Path, target: &TargetArgs) -> Result<ExitCode> {
  let job = target.job(file)?;
  let (rt, compiler) = compiler()?;

  let Ok(transpiled) = rt.block_on(compiler.transpile(&job)) else {
    return Ok(failure_code());
  };

  print_success(&format!(
    "Transpiled {} {} {}",
    file.display(),
    symbols::ARROW,
    transpiled.output_file.display()
  ));
  print_stat("Backend", transpiled.backend.id());
  print_stat("Target", &transpiled.configuration.platform().to_string());
  print_stat("Hash", truncate_hash(&transpiled.content_hash.0));

  Ok(ExitCode::SUCCESS)
}
