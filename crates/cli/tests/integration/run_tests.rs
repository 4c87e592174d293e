//! Run command integration tests.

use predicates::prelude::*;

use super::common::{TestEnv, failing_compiler, fake_compiler};

#[test]
fn run_exits_with_program_status() {
  for code in [0, 1, 127] {
    let env = TestEnv::new().with_fake_v(&fake_compiler(""));
    env.write_file("main.vt", &format!("print \"bye\"\nexit {code}\n"));

    env.vitu_cmd().args(["run", "main.vt"]).assert().code(code);
  }
}

#[test]
fn run_with_go_backend() {
  let env = TestEnv::new().with_fake_go(&fake_compiler(""));
  env.write_file("main.vt", "exit 3\n");

  env.vitu_cmd().args(["run", "main.vt", "-b", "go"]).assert().code(3);
}

#[test]
fn failed_build_exits_255() {
  let env = TestEnv::new().with_fake_v(&failing_compiler(1, "boom"));
  env.write_file("main.vt", "exit 0\n");

  env
    .vitu_cmd()
    .args(["run", "main.vt"])
    .assert()
    .code(255)
    .stderr(predicate::str::contains("run failed"))
    .stderr(predicate::str::contains("boom"));
}

#[test]
fn foreign_target_cannot_run() {
  let env = TestEnv::new().with_fake_v(&fake_compiler(""));
  env.write_file("main.vt", "exit 0\n");
  let foreign = if cfg!(target_os = "windows") { "linux" } else { "windows" };

  env
    .vitu_cmd()
    .args(["run", "main.vt", "--os", foreign])
    .assert()
    .code(255)
    .stderr(predicate::str::contains("is not supported"));
}
