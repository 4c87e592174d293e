//! Mapping from backend identifiers to implementations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Backend, BuildResult, GoBackend, TranspilingResult, VlangBackend};
use crate::error::CompileError;
use crate::invoke::{Invoker, Toolchain};
use crate::job::BuildJob;

/// Every backend this build knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
  Vlang,
  Go,
}

/// Accepted identifiers, canonical name first for each kind.
const BACKENDS: &[(&str, BackendKind)] = &[
  ("v", BackendKind::Vlang),
  ("vlang", BackendKind::Vlang),
  ("go", BackendKind::Go),
  ("golang", BackendKind::Go),
];

impl BackendKind {
  pub const ALL: [BackendKind; 2] = [BackendKind::Vlang, BackendKind::Go];

  /// Look up a backend by identifier. Case-sensitive and free of I/O.
  pub fn resolve(id: &str) -> Result<Self, CompileError> {
    BACKENDS
      .iter()
      .find(|(name, _)| *name == id)
      .map(|(_, kind)| *kind)
      .ok_or_else(|| CompileError::UnknownBackend {
        name: id.to_string(),
        available: available(),
      })
  }

  /// Canonical identifier.
  pub fn id(&self) -> &'static str {
    match self {
      Self::Vlang => "v",
      Self::Go => "go",
    }
  }

  /// Extension of the generated source file.
  pub fn extension(&self) -> &'static str {
    match self {
      Self::Vlang => "v",
      Self::Go => "go",
    }
  }

  pub fn toolchain(&self) -> Toolchain {
    match self {
      Self::Vlang => VlangBackend::TOOLCHAIN,
      Self::Go => GoBackend::TOOLCHAIN,
    }
  }

  /// Other identifiers that select this backend.
  pub fn aliases(&self) -> Vec<&'static str> {
    BACKENDS
      .iter()
      .filter(|(name, kind)| kind == self && *name != self.id())
      .map(|(name, _)| *name)
      .collect()
  }
}

impl fmt::Display for BackendKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.id())
  }
}

/// Every identifier [`BackendKind::resolve`] accepts, in table order.
pub fn available() -> Vec<&'static str> {
  BACKENDS.iter().map(|(name, _)| *name).collect()
}

/// Resolve `id` and construct the backend around `invoker`.
pub fn resolve(id: &str, invoker: Invoker) -> Result<AnyBackend, CompileError> {
  Ok(AnyBackend::new(BackendKind::resolve(id)?, invoker))
}

/// A constructed backend of any kind.
#[derive(Debug, Clone)]
pub enum AnyBackend {
  Vlang(VlangBackend),
  Go(GoBackend),
}

impl AnyBackend {
  pub fn new(kind: BackendKind, invoker: Invoker) -> Self {
    match kind {
      BackendKind::Vlang => Self::Vlang(VlangBackend::new(invoker)),
      BackendKind::Go => Self::Go(GoBackend::new(invoker)),
    }
  }

  pub fn kind(&self) -> BackendKind {
    match self {
      Self::Vlang(_) => BackendKind::Vlang,
      Self::Go(_) => BackendKind::Go,
    }
  }
}

impl Backend for AnyBackend {
  fn name(&self) -> &'static str {
    match self {
      Self::Vlang(backend) => backend.name(),
      Self::Go(backend) => backend.name(),
    }
  }

  async fn transpile(&self, job: &BuildJob) -> Result<TranspilingResult, CompileError> {
    match self {
      Self::Vlang(backend) => backend.transpile(job).await,
      Self::Go(backend) => backend.transpile(job).await,
    }
  }

  async fn build(&self, transpiled: &TranspilingResult) -> Result<BuildResult, CompileError> {
    match self {
      Self::Vlang(backend) => backend.build(transpiled).await,
      Self::Go(backend) => backend.build(transpiled).await,
    }
  }

  async fn run(&self, transpiled: &TranspilingResult) -> Result<i32, CompileError> {
    match self {
      Self::Vlang(backend) => backend.run(transpiled).await,
      Self::Go(backend) => backend.run(transpiled).await,
    }
  }
}
