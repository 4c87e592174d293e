//! Implementation of the `vitu env` command.
//!
//! Shows the host platform and where each backend's toolchain is expected.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use vitu_lib::backend::BackendKind;
use vitu_lib::platform::platform_triple;

use crate::output::{OutputFormat, print_info, print_json, print_stat, print_warning};

#[derive(Serialize)]
struct ToolchainStatus {
  backend: &'static str,
  variable: &'static str,
  value: Option<String>,
  executable: Option<String>,
  problem: Option<String>,
}

#[derive(Serialize)]
struct EnvReport {
  platform: Option<String>,
  toolchains: Vec<ToolchainStatus>,
}

fn toolchain_status(kind: BackendKind) -> ToolchainStatus {
  let toolchain = kind.toolchain();
  let (executable, problem) = match toolchain.locate() {
    Ok(path) => (Some(path.display().to_string()), None),
    Err(err) => (None, Some(err.to_string())),
  };

  ToolchainStatus {
    backend: kind.id(),
    variable: toolchain.root_var,
    value: std::env::var(toolchain.root_var).ok(),
    executable,
    problem,
  }
}

pub fn cmd_env(output: OutputFormat) -> Result<ExitCode> {
  let report = EnvReport {
    platform: platform_triple(),
    toolchains: BackendKind::ALL.into_iter().map(toolchain_status).collect(),
  };

  if output.is_json() {
    print_json(&report)?;
    return Ok(ExitCode::SUCCESS);
  }

  match &report.platform {
    Some(triple) => print_info(&format!("Host platform: {triple}")),
    None => print_warning("Could not detect the host platform."),
  }

  for status in &report.toolchains {
    println!();
    println!("{} backend:", status.backend);
    print_stat(status.variable, status.value.as_deref().unwrap_or("(unset)"));
    match (&status.executable, &status.problem) {
      (Some(path), _) => print_stat("Executable", path),
      (None, Some(problem)) => print_stat("Problem", problem),
      (None, None) => {}
    }
  }

  Ok(ExitCode::SUCCESS)
}
