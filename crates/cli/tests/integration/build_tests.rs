//! Build command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, failing_compiler, fake_compiler};

const HELLO: &str = "let greeting = \"hello\"\nprint greeting\n";

#[test]
fn build_echoes_toolchain_output() {
  let env = TestEnv::new().with_fake_v(&fake_compiler("ok"));
  env.write_file("hello.vt", HELLO);

  env
    .vitu_cmd()
    .args(["build", "hello.vt"])
    .assert()
    .success()
    .stdout(predicate::str::starts_with("ok"))
    .stdout(predicate::str::contains("Built"))
    .stdout(predicate::str::contains("Mode: debug"));

  let artifact_dir = std::fs::read_dir(env.build_dir()).unwrap().next().unwrap().unwrap().path();
  assert!(artifact_dir.join("hello.v").is_file());
  assert!(artifact_dir.join("hello").is_file());
}

#[test]
fn build_is_repeatable() {
  let env = TestEnv::new().with_fake_v(&fake_compiler(""));
  env.write_file("hello.vt", HELLO);

  env.vitu_cmd().args(["build", "hello.vt"]).assert().success();
  env.vitu_cmd().args(["build", "hello.vt", "--debug"]).assert().success();

  assert_eq!(std::fs::read_dir(env.build_dir()).unwrap().count(), 1);
}

#[test]
fn release_build_uses_separate_artifacts() {
  let env = TestEnv::new().with_fake_v(&fake_compiler(""));
  env.write_file("hello.vt", HELLO);

  env.vitu_cmd().args(["build", "hello.vt"]).assert().success();
  env
    .vitu_cmd()
    .args(["build", "hello.vt", "--release"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Mode: release"));

  assert_eq!(std::fs::read_dir(env.build_dir()).unwrap().count(), 2);
}

#[test]
fn compile_error_shows_toolchain_stderr_verbatim() {
  let env = TestEnv::new().with_fake_v(&failing_compiler(2, "bad input"));
  env.write_file("hello.vt", HELLO);

  env
    .vitu_cmd()
    .args(["build", "hello.vt"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("exited with code 2"))
    .stderr(predicate::str::contains("bad input"));
}

#[test]
fn go_backend_uses_goroot() {
  let env = TestEnv::new().with_fake_go(&fake_compiler("go ok"));
  env.write_file("hello.vt", HELLO);

  env
    .vitu_cmd()
    .args(["build", "hello.vt", "--backend", "go"])
    .assert()
    .success()
    .stdout(predicate::str::contains("go ok"));

  // The default out dir is relative; the binary must still land in it.
  let job_dirs: Vec<_> = std::fs::read_dir(env.build_dir())
    .unwrap()
    .map(|entry| entry.unwrap().path())
    .collect();
  assert_eq!(job_dirs.len(), 1);
  assert!(job_dirs[0].join("hello").is_file());
}

#[test]
fn go_backend_rejects_unused_variables() {
  let env = TestEnv::new().with_fake_go(&fake_compiler(""));
  env.write_file("spare.vt", "let spare = 1\nprint 2\n");

  env
    .vitu_cmd()
    .args(["build", "spare.vt", "--backend", "go"])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("spare.vt:1:5: 'spare' is declared but never used"));
}
