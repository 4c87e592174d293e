//! CLI output formatting utilities.
//!
//! Provides colored status lines, duration formatting, and the reporter that
//! renders pipeline failures for a terminal.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};
use vitu_lib::compiler::{Failure, Reporter};
use vitu_lib::error::{CompileError, ErrorKind};
use vitu_lib::invoke::InvokeError;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

pub fn truncate_hash(hash: &str) -> &str {
  let len = hash.len().min(12);
  &hash[..len]
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    let mins = secs / 60;
    let remaining_secs = secs % 60;
    format!("{}m {}s", mins, remaining_secs)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

pub fn print_error(message: &str) {
  eprintln!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stderr, |s| s.red()),
    message.if_supports_color(Stream::Stderr, |s| s.red())
  );
}

pub fn print_warning(message: &str) {
  eprintln!(
    "{} {}",
    symbols::WARNING.if_supports_color(Stream::Stderr, |s| s.yellow()),
    message.if_supports_color(Stream::Stderr, |s| s.yellow())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Writes pipeline failures to stderr.
///
/// Toolchain errors print the tool's own stderr unchanged after the summary
/// line, so the real compiler message is what the user reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
  fn failure(&self, failure: &Failure) {
    match &failure.error {
      CompileError::Toolchain(InvokeError::Execution {
        program,
        exit_code,
        stderr,
      }) => {
        print_error(&format!(
          "{} failed: {program} exited with code {exit_code}",
          failure.stage
        ));
        if !stderr.is_empty() {
          eprint!("{stderr}");
          if !stderr.ends_with('\n') {
            eprintln!();
          }
        }
      }
      _ => print_error(&failure.to_string()),
    }

    if let Some(hint) = hint(failure.error.kind()) {
      print_info(hint);
    }
  }
}

fn hint(kind: ErrorKind) -> Option<&'static str> {
  match kind {
    ErrorKind::ToolchainNotConfigured => Some("Run 'vitu env' to see which toolchain variables are set."),
    ErrorKind::UnknownBackend => Some("Run 'vitu version' to list the available backends."),
    _ => None,
  }
}
