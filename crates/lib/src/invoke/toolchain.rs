//! Locating external toolchains through their root environment variables.

use std::path::PathBuf;

use tracing::debug;

use super::types::InvokeError;

/// An external toolchain found at `$<root_var>/<executable>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toolchain {
  /// Human readable name, e.g. "V".
  pub name: &'static str,
  /// Environment variable naming the installation root.
  pub root_var: &'static str,
  /// Path of the executable relative to the root, one segment per element.
  pub executable: &'static [&'static str],
}

impl Toolchain {
  pub const fn new(name: &'static str, root_var: &'static str, executable: &'static [&'static str]) -> Self {
    Self {
      name,
      root_var,
      executable,
    }
  }

  /// Resolve the executable path.
  ///
  /// Fails with `NotConfigured` when the root variable is unset or empty and
  /// with `NotFound` when the executable is missing under the root. No
  /// auto-detection is attempted.
  pub fn locate(&self) -> Result<PathBuf, InvokeError> {
    let root = std::env::var_os(self.root_var)
      .filter(|value| !value.is_empty())
      .ok_or(InvokeError::NotConfigured {
        toolchain: self.name,
        var: self.root_var,
      })?;

    let mut path = PathBuf::from(root);
    for segment in self.executable {
      path.push(segment);
    }
    if cfg!(windows) {
      path.set_extension("exe");
    }

    if !path.is_file() {
      return Err(InvokeError::NotFound {
        toolchain: self.name,
        path,
      });
    }

    debug!(toolchain = self.name, path = %path.display(), "located toolchain");
    Ok(path)
  }
}
