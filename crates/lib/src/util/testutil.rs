//! Test utilities for vitu-lib.
//!
//! Cross-platform shell helpers and fake toolchains. A fake toolchain is a
//! shell script installed where a backend expects the real compiler, so the
//! pipeline can be exercised end to end without V or Go installed.

use std::path::{Path, PathBuf};

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Write an executable shell script at `root/<segments...>` and return its path.
#[cfg(unix)]
pub fn write_script(root: &Path, segments: &[&str], body: &str) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let mut path = root.to_path_buf();
  for segment in segments {
    path.push(segment);
  }
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  path
}

/// Shell fragment shared by the fake compilers: collects `-o <binary>` and the
/// last positional argument as the source, skipping every other flag.
const PARSE_ARGS: &str = r#"out=""
src=""
while [ $# -gt 0 ]; do
  case "$1" in
    build) shift ;;
    -o) out="$2"; shift 2 ;;
    -os|-arch) shift 2 ;;
    -*) shift ;;
    *) src="$1"; shift ;;
  esac
done
if [ ! -f "$src" ]; then
  echo "no such file: $src (cwd $(pwd))" >&2
  exit 1
fi
"#;

/// A fake compiler that emits a binary exiting with the code found in the
/// generated source's `exit(N)` / `os.Exit(N)` call (0 when absent), then
/// prints `stdout` to stdout.
pub fn fake_compiler(stdout: &str) -> String {
  format!(
    r#"{PARSE_ARGS}code=$(sed -n 's/.*[Ee]xit(\([0-9]*\)).*/\1/p' "$src")
printf '#!/bin/sh\nexit %s\n' "${{code:-0}}" > "$out" || exit 1
chmod +x "$out" || exit 1
printf '%s' '{stdout}'
"#
  )
}

/// A fake compiler that fails with `exit_code`, printing `stderr` to stderr.
pub fn failing_compiler(exit_code: i32, stderr: &str) -> String {
  format!("printf '%s' '{stderr}' >&2\nexit {exit_code}\n")
}

/// A fake compiler that records every invocation's arguments in `log`.
pub fn recording_compiler(log: &Path) -> String {
  format!(
    r#"echo "$@" >> '{}'
{}"#,
    log.display(),
    fake_compiler("")
  )
}

/// Write `contents` to `dir/name` and return the path.
pub fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
  let path = dir.join(name);
  std::fs::write(&path, contents).unwrap();
  path
}

/// A host-targeted debug job for `backend`.
pub fn host_job(backend: &str, source: &Path, target_dir: &Path) -> crate::job::BuildJob {
  let configuration = crate::job::BuildConfiguration::for_host(backend).unwrap();
  crate::job::BuildJob::new(configuration, source, target_dir)
}

/// Drive a future to completion from a synchronous test, e.g. inside
/// `temp_env::with_var`.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
  tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .unwrap()
    .block_on(future)
}
