//! Errors raised by pipeline stages.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::frontend::Diagnostic;
use crate::invoke::InvokeError;

/// Every way a pipeline stage can fail.
///
/// Stages return the most specific variant they can; only the compiler
/// facade turns these into reported messages and status codes.
#[derive(Debug, Error)]
pub enum CompileError {
  /// The configuration names a backend that does not exist.
  #[error("unknown backend '{name}' (available: {})", .available.join(", "))]
  UnknownBackend {
    name: String,
    available: Vec<&'static str>,
  },

  /// The source file is missing, unreadable or not UTF-8.
  #[error("cannot read source file {}: {source}", .path.display())]
  SourceRead {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The source parsed badly or failed semantic checks.
  #[error("{}", render_diagnostics(.path, .diagnostics))]
  Analysis {
    path: PathBuf,
    diagnostics: Vec<Diagnostic>,
  },

  /// Generated output could not be written.
  #[error("cannot write {}: {source}", .path.display())]
  Generation {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// The external toolchain could not be located, started or completed.
  #[error(transparent)]
  Toolchain(#[from] InvokeError),

  /// The operation exists in the contract but has no implementation.
  #[error("{what} is not supported")]
  NotSupported { what: String },
}

/// Flat classification of [`CompileError`] for callers that branch on the kind of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  UnknownBackend,
  SourceRead,
  Analysis,
  Generation,
  ToolchainNotConfigured,
  ToolchainNotFound,
  ToolchainSpawn,
  ToolchainExecution,
  Cancelled,
  NotSupported,
}

impl CompileError {
  pub fn not_supported(what: impl Into<String>) -> Self {
    Self::NotSupported { what: what.into() }
  }

  pub fn source_read(path: &Path, source: std::io::Error) -> Self {
    Self::SourceRead {
      path: path.to_path_buf(),
      source,
    }
  }

  pub fn generation(path: &Path, source: std::io::Error) -> Self {
    Self::Generation {
      path: path.to_path_buf(),
      source,
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::UnknownBackend { .. } => ErrorKind::UnknownBackend,
      Self::SourceRead { .. } => ErrorKind::SourceRead,
      Self::Analysis { .. } => ErrorKind::Analysis,
      Self::Generation { .. } => ErrorKind::Generation,
      Self::NotSupported { .. } => ErrorKind::NotSupported,
      Self::Toolchain(err) => match err {
        InvokeError::NotConfigured { .. } => ErrorKind::ToolchainNotConfigured,
        InvokeError::NotFound { .. } => ErrorKind::ToolchainNotFound,
        InvokeError::Spawn { .. } => ErrorKind::ToolchainSpawn,
        InvokeError::Execution { .. } => ErrorKind::ToolchainExecution,
        InvokeError::Cancelled { .. } => ErrorKind::Cancelled,
      },
    }
  }
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      Self::UnknownBackend => "unknown backend",
      Self::SourceRead => "source read error",
      Self::Analysis => "analysis error",
      Self::Generation => "generation error",
      Self::ToolchainNotConfigured => "toolchain not configured",
      Self::ToolchainNotFound => "toolchain not found",
      Self::ToolchainSpawn => "toolchain failed to start",
      Self::ToolchainExecution => "toolchain execution error",
      Self::Cancelled => "cancelled",
      Self::NotSupported => "not supported",
    };
    f.write_str(name)
  }
}

fn render_diagnostics(path: &Path, diagnostics: &[Diagnostic]) -> String {
  diagnostics
    .iter()
    .map(|d| format!("{}:{d}", path.display()))
    .collect::<Vec<_>>()
    .join("\n")
}
