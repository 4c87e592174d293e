//! Implementation of the `vitu version` command.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use vitu_lib::backend::BackendKind;
use vitu_lib::consts::APP_NAME;

use super::metadata;
use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct BackendInfo {
  id: &'static str,
  aliases: Vec<&'static str>,
  toolchain: &'static str,
}

#[derive(Serialize)]
struct VersionReport {
  version: String,
  commit: Option<String>,
  backends: Vec<BackendInfo>,
}

pub fn cmd_version(output: OutputFormat) -> Result<ExitCode> {
  let metadata = metadata();
  let report = VersionReport {
    version: metadata.version.clone(),
    commit: metadata.commit.clone(),
    backends: BackendKind::ALL
      .into_iter()
      .map(|kind| BackendInfo {
        id: kind.id(),
        aliases: kind.aliases(),
        toolchain: kind.toolchain().name,
      })
      .collect(),
  };

  if output.is_json() {
    print_json(&report)?;
    return Ok(ExitCode::SUCCESS);
  }

  println!("{APP_NAME} {metadata}");
  println!("Backends:");
  for backend in &report.backends {
    let label = if backend.aliases.is_empty() {
      backend.id.to_string()
    } else {
      format!("{} ({})", backend.id, backend.aliases.join(", "))
    };
    print_stat(&label, backend.toolchain);
  }

  Ok(ExitCode::SUCCESS)
}
