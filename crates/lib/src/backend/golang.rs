//! Go backend: generates a `.go` file and compiles it with `$GOROOT/bin/go build`.

use std::fmt::Write;

use tracing::info;

use super::registry::BackendKind;
use super::{Backend, BuildResult, TranspilingResult, ensure_runnable, escape_into, execute_binary, mangle, transpile_with};
use crate::consts::GOROOT_VAR;
use crate::error::CompileError;
use crate::frontend::{AnalysisOptions, Expr, Program, StmtKind};
use crate::invoke::{Invocation, Invoker, Toolchain};
use crate::job::BuildJob;
use crate::platform::Arch;

#[derive(Debug, Clone, Default)]
pub struct GoBackend {
  invoker: Invoker,
}

impl GoBackend {
  pub const TOOLCHAIN: Toolchain = Toolchain::new("Go", GOROOT_VAR, &["bin", "go"]);

  pub fn new(invoker: Invoker) -> Self {
    Self { invoker }
  }

  fn build_invocation(go: std::path::PathBuf, transpiled: &TranspilingResult) -> Invocation {
    let configuration = &transpiled.configuration;
    let profile: &[&str] = if configuration.is_release() {
      &["-trimpath", "-ldflags=-s -w"]
    } else {
      &["-gcflags=all=-N -l"]
    };

    let invocation = Invocation::new(go)
      .toolchain(Self::TOOLCHAIN.name)
      .arg("build")
      .args(profile.iter().copied())
      .arg("-o")
      .env("GOOS", configuration.os().as_str())
      .env("GOARCH", goarch(configuration.arch()));

    // `go` runs inside the artifact dir, so both paths are named relative to it.
    let binary = transpiled.binary_path();
    let source = &transpiled.output_file;
    let dir = source.parent().filter(|dir| !dir.as_os_str().is_empty());
    match (dir, binary.file_name(), source.file_name()) {
      (Some(dir), Some(binary_name), Some(source_name)) => {
        invocation.arg(binary_name).arg(source_name).current_dir(dir)
      }
      _ => invocation.arg(&binary).arg(source),
    }
  }
}

fn goarch(arch: Arch) -> &'static str {
  match arch {
    Arch::X86_64 => "amd64",
    Arch::Aarch64 => "arm64",
    Arch::X86 => "386",
  }
}

impl Backend for GoBackend {
  fn name(&self) -> &'static str {
    BackendKind::Go.id()
  }

  async fn transpile(&self, job: &BuildJob) -> Result<TranspilingResult, CompileError> {
    // The Go compiler refuses unused variables in every mode.
    let options = AnalysisOptions { reject_unused: true };
    transpile_with(job, BackendKind::Go, options, generate).await
  }

  async fn build(&self, transpiled: &TranspilingResult) -> Result<BuildResult, CompileError> {
    let go = Self::TOOLCHAIN.locate()?;
    let binary = transpiled.binary_path();

    let outcome = self.invoker.invoke(&Self::build_invocation(go, transpiled)).await?;

    info!(
      binary = %binary.display(),
      target = %transpiled.configuration.platform(),
      mode = %transpiled.configuration.mode(),
      "build complete"
    );
    Ok(BuildResult::new(binary, outcome.stdout, outcome.stderr))
  }

  async fn run(&self, transpiled: &TranspilingResult) -> Result<i32, CompileError> {
    ensure_runnable(transpiled)?;
    let built = self.build(transpiled).await?;
    execute_binary(&self.invoker, transpiled, &built.binary).await
  }
}

/// Render `program` as a Go `main` package.
pub fn generate(program: &Program, source_name: &str) -> String {
  let mut imports = Vec::new();
  if program.prints() {
    imports.push("fmt");
  }
  if program.exits() {
    imports.push("os");
  }

  let mut out = String::new();
  let _ = writeln!(out, "// Code generated by vitu from {source_name}; DO NOT EDIT.");
  out.push_str("\npackage main\n\n");
  match imports.as_slice() {
    [] => {}
    [single] => {
      let _ = writeln!(out, "import \"{single}\"\n");
    }
    many => {
      out.push_str("import (\n");
      for import in many {
        let _ = writeln!(out, "\t\"{import}\"");
      }
      out.push_str(")\n\n");
    }
  }
  out.push_str("func main() {\n");

  for stmt in &program.stmts {
    out.push('\t');
    match &stmt.kind {
      StmtKind::Let { name, value } => {
        let _ = write!(out, "{} := {}", mangle(&name.name), expr(value));
      }
      StmtKind::Print(value) => {
        let _ = write!(out, "fmt.Println({})", expr(value));
      }
      StmtKind::Exit { code, .. } => {
        let _ = write!(out, "os.Exit({code})");
      }
    }
    out.push('\n');
  }

  out.push_str("}\n");
  out
}

fn expr(value: &Expr) -> String {
  match value {
    Expr::Str(text) => {
      let mut literal = String::from("\"");
      escape_into(&mut literal, text, &['"']);
      literal.push('"');
      literal
    }
    // Untyped constants default to `int`, which is 32 bits on 386.
    Expr::Int(n) if i32::try_from(*n).is_err() => format!("int64({n})"),
    Expr::Int(n) => n.to_string(),
    Expr::Var(ident) => mangle(&ident.name),
  }
}
