//! Build configuration and build job value types.
//!
//! A `BuildConfiguration` says *how* to build (backend, target platform, mode),
//! a `BuildJob` says *what* to build and *where* its artifacts go. Both are
//! immutable once constructed: fields are private and only readable through
//! getters, so no stage of the pipeline can alter the request it was given.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_BACKEND;
use crate::platform::{Arch, Os, Platform, PlatformError};
use crate::util::hash::{Hashable, ObjectHash};

/// Optimization profile for a build.
///
/// A single enum rather than two flags, so "debug and release" cannot be expressed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
  #[default]
  Debug,
  Release,
}

impl BuildMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "debug",
      Self::Release => "release",
    }
  }
}

impl fmt::Display for BuildMode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How to build: backend identifier, target platform and build mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildConfiguration {
  backend: String,
  platform: Platform,
  mode: BuildMode,
}

impl BuildConfiguration {
  pub fn new(backend: impl Into<String>, platform: Platform, mode: BuildMode) -> Self {
    Self {
      backend: backend.into(),
      platform,
      mode,
    }
  }

  /// Configuration targeting the host platform in debug mode.
  pub fn for_host(backend: impl Into<String>) -> Result<Self, PlatformError> {
    Ok(Self::new(backend, Platform::host()?, BuildMode::default()))
  }

  /// Host configuration for the default backend.
  pub fn host_default() -> Result<Self, PlatformError> {
    Self::for_host(DEFAULT_BACKEND)
  }

  pub fn with_platform(mut self, platform: Platform) -> Self {
    self.platform = platform;
    self
  }

  pub fn with_os(mut self, os: Os) -> Self {
    self.platform.os = os;
    self
  }

  pub fn with_arch(mut self, arch: Arch) -> Self {
    self.platform.arch = arch;
    self
  }

  pub fn with_mode(mut self, mode: BuildMode) -> Self {
    self.mode = mode;
    self
  }

  pub fn backend(&self) -> &str {
    &self.backend
  }

  pub fn platform(&self) -> Platform {
    self.platform
  }

  pub fn os(&self) -> Os {
    self.platform.os
  }

  pub fn arch(&self) -> Arch {
    self.platform.arch
  }

  pub fn mode(&self) -> BuildMode {
    self.mode
  }

  pub fn is_release(&self) -> bool {
    self.mode == BuildMode::Release
  }
}

/// One compile/run request: configuration, source file and target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildJob {
  configuration: BuildConfiguration,
  source_file: PathBuf,
  target_dir: PathBuf,
}

/// The parts of a job that decide where its artifacts land.
///
/// The target directory is deliberately absent: it is the parent of the
/// artifact directory, not part of its name.
#[derive(Serialize)]
struct JobIdentity<'a> {
  configuration: &'a BuildConfiguration,
  source_file: &'a Path,
}

impl Hashable for JobIdentity<'_> {}

impl BuildJob {
  pub fn new(configuration: BuildConfiguration, source_file: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
    Self {
      configuration,
      source_file: source_file.into(),
      target_dir: target_dir.into(),
    }
  }

  pub fn configuration(&self) -> &BuildConfiguration {
    &self.configuration
  }

  pub fn source_file(&self) -> &Path {
    &self.source_file
  }

  pub fn target_dir(&self) -> &Path {
    &self.target_dir
  }

  /// Stable identity of this job, derived from its configuration and source path.
  pub fn id(&self) -> ObjectHash {
    let identity = JobIdentity {
      configuration: &self.configuration,
      source_file: &self.source_file,
    };
    // Serializing plain strings and enums into JSON cannot fail.
    identity
      .compute_hash()
      .unwrap_or_else(|_| ObjectHash(String::from("unhashable-job")))
  }

  /// Directory under the target directory that holds this job's artifacts.
  pub fn artifact_dir(&self) -> PathBuf {
    self.target_dir.join(self.id().0)
  }

  /// File stem of the source, used to name generated files and binaries.
  pub fn source_stem(&self) -> &str {
    self
      .source_file
      .file_stem()
      .and_then(|stem| stem.to_str())
      .filter(|stem| !stem.is_empty())
      .unwrap_or("main")
  }
}
