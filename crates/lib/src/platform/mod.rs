pub mod arch;
pub mod os;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use arch::Arch;
pub use os::Os;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
  #[error("unknown operating system '{0}' (expected one of: linux, macos, windows)")]
  UnknownOs(String),

  #[error("unknown architecture '{0}' (expected one of: x86_64, aarch64, x86)")]
  UnknownArch(String),

  #[error("unsupported host platform {os}/{arch}; pass --os and --arch explicitly")]
  UnsupportedHost { os: &'static str, arch: &'static str },
}

/// Platform identifier combining architecture and OS (e.g., "aarch64-darwin")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  /// Create a new platform identifier
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Like [`Platform::current`], but reports what the host actually is.
  pub fn host() -> Result<Self, PlatformError> {
    Self::current().ok_or(PlatformError::UnsupportedHost {
      os: std::env::consts::OS,
      arch: std::env::consts::ARCH,
    })
  }

  /// True when binaries built for this platform can execute on the host.
  pub fn is_host(&self) -> bool {
    Self::current() == Some(*self)
  }

  /// Returns the platform triple string (e.g., "aarch64-darwin")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}

/// Returns the platform triple for the current system (e.g., "aarch64-darwin")
///
/// Returns `None` if the current platform is not supported
pub fn platform_triple() -> Option<String> {
  Platform::current().map(|p| p.triple())
}
