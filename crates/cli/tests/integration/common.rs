//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Fake-compiler preamble: collects `-o <binary>` and the source file, skipping other flags.
const PARSE_ARGS: &str = r#"out=""
src=""
while [ $# -gt 0 ]; do
  case "$1" in
    build) shift ;;
    -o) out="$2"; shift 2 ;;
    -os) shift 2 ;;
    -*) shift ;;
    *) src="$1"; shift ;;
  esac
done
if [ ! -f "$src" ]; then
  echo "no such file: $src (cwd $(pwd))" >&2
  exit 1
fi
"#;

/// A compiler that writes a binary exiting with the generated program's exit
/// code and prints `stdout`.
pub fn fake_compiler(stdout: &str) -> String {
  format!(
    r#"{PARSE_ARGS}code=$(sed -n 's/.*[Ee]xit(\([0-9]*\)).*/\1/p' "$src")
printf '#!/bin/sh\nexit %s\n' "${{code:-0}}" > "$out" || exit 1
chmod +x "$out" || exit 1
printf '%s' '{stdout}'
"#
  )
}

/// A compiler that fails with `exit_code` after printing `stderr`.
pub fn failing_compiler(exit_code: i32, stderr: &str) -> String {
  format!("printf '%s' '{stderr}' >&2\nexit {exit_code}\n")
}

/// Isolated test environment.
///
/// Each test gets its own working directory, and toolchains are only visible
/// when a test installs a fake one.
pub struct TestEnv {
  pub temp: TempDir,
  vlang_root: Option<PathBuf>,
  goroot: Option<PathBuf>,
}

impl TestEnv {
  pub fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
      vlang_root: None,
      goroot: None,
    }
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Install `script` as `$VLANG_ROOT/v`.
  pub fn with_fake_v(mut self, script: &str) -> Self {
    let root = self.temp.path().join("toolchains").join("v");
    write_script(&root.join("v"), script);
    self.vlang_root = Some(root);
    self
  }

  /// Install `script` as `$GOROOT/bin/go`.
  pub fn with_fake_go(mut self, script: &str) -> Self {
    let root = self.temp.path().join("toolchains").join("go");
    write_script(&root.join("bin").join("go"), script);
    self.goroot = Some(root);
    self
  }

  /// Directory receiving build artifacts by default.
  pub fn build_dir(&self) -> PathBuf {
    self.temp.path().join("build")
  }

  /// Get a command for the vitu binary, running in the temp directory.
  pub fn vitu_cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("vitu");
    cmd.current_dir(self.temp.path()).env_remove("RUST_LOG");
    match &self.vlang_root {
      Some(root) => cmd.env("VLANG_ROOT", root),
      None => cmd.env_remove("VLANG_ROOT"),
    };
    match &self.goroot {
      Some(root) => cmd.env("GOROOT", root),
      None => cmd.env_remove("GOROOT"),
    };
    cmd
  }
}

#[cfg(unix)]
fn write_script(path: &Path, body: &str) {
  use std::os::unix::fs::PermissionsExt;

  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, format!("#!/bin/sh\n{body}")).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[cfg(not(unix))]
fn write_script(path: &Path, body: &str) {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(path, body).unwrap();
}
