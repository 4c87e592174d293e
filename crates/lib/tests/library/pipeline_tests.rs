//! Orchestrator tests through the public `vitu_lib` surface.

use std::cell::Cell;

use tempfile::TempDir;
use vitu_lib::compiler::{BuildMetadata, Compiler, Failure, Reporter, Stage};
use vitu_lib::job::{BuildConfiguration, BuildJob, BuildMode};
use vitu_lib::platform::{Arch, Os, Platform};
use vitu_lib::{Backend, BackendKind, ErrorKind};

#[derive(Default)]
struct CountingReporter {
  failures: Cell<usize>,
}

impl Reporter for &CountingReporter {
  fn failure(&self, _failure: &Failure) {
    self.failures.set(self.failures.get() + 1);
  }
}

fn write_source(dir: &TempDir, contents: &str) -> std::path::PathBuf {
  let path = dir.path().join("main.vt");
  std::fs::write(&path, contents).unwrap();
  path
}

#[tokio::test]
async fn cross_target_transpile_needs_no_toolchain() {
  let temp = TempDir::new().unwrap();
  let source = write_source(&temp, "let n = 1\nprint n\nexit 0\n");
  let configuration = BuildConfiguration::new("go", Platform::new(Arch::Aarch64, Os::Windows), BuildMode::Release);
  let job = BuildJob::new(configuration, &source, temp.path().join("out"));

  let transpiled = Compiler::new(BuildMetadata::new("test")).transpile(&job).await.unwrap();

  assert_eq!(transpiled.backend, BackendKind::Go);
  assert!(transpiled.output_file.starts_with(temp.path().join("out")));
  assert!(transpiled.binary_path().to_string_lossy().ends_with("main.exe"));
  let generated = std::fs::read_to_string(&transpiled.output_file).unwrap();
  assert!(generated.contains("package main"));
  assert!(generated.contains("os.Exit(0)"));
}

#[tokio::test]
async fn same_job_always_lands_in_same_place() {
  let temp = TempDir::new().unwrap();
  let source = write_source(&temp, "print \"x\"\n");
  let compiler = Compiler::new(BuildMetadata::new("test"));
  let job = BuildJob::new(BuildConfiguration::for_host("vlang").unwrap(), &source, temp.path());

  let first = compiler.transpile(&job).await.unwrap();
  let second = compiler.transpile(&job).await.unwrap();

  assert_eq!(first.output_file, second.output_file);
  assert_eq!(first.content_hash, second.content_hash);
}

#[tokio::test]
async fn every_failure_is_reported_once() {
  let temp = TempDir::new().unwrap();
  let reporter = CountingReporter::default();
  let compiler = Compiler::new(BuildMetadata::new("test")).with_reporter(&reporter);
  let missing = BuildJob::new(
    BuildConfiguration::for_host("v").unwrap(),
    temp.path().join("missing.vt"),
    temp.path(),
  );
  let unknown = BuildJob::new(
    BuildConfiguration::for_host("zig").unwrap(),
    temp.path().join("missing.vt"),
    temp.path(),
  );

  let outcome = compiler.run(&missing).await;
  let failure = compiler.transpile(&unknown).await.unwrap_err();

  assert_eq!(outcome.failure().map(|f| f.error.kind()), Some(ErrorKind::SourceRead));
  assert_eq!(failure.stage, Stage::Resolve);
  assert_eq!(reporter.failures.get(), 2);
}

#[test]
fn dispatch_is_closed_over_known_backends() {
  for id in ["v", "vlang", "go", "golang"] {
    let backend = vitu_lib::backend::resolve(id, Default::default()).unwrap();
    assert_eq!(backend.name(), backend.kind().id());
  }
  assert_eq!(
    vitu_lib::backend::resolve("rust", Default::default()).unwrap_err().kind(),
    ErrorKind::UnknownBackend
  );
}
