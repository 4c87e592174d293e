//! V backend: generates a `.v` file and compiles it with `$VLANG_ROOT/v`.

use std::fmt::Write;

use tracing::info;

use super::registry::BackendKind;
use super::{Backend, BuildResult, TranspilingResult, ensure_runnable, escape_into, execute_binary, mangle, transpile_with};
use crate::consts::VLANG_ROOT_VAR;
use crate::error::CompileError;
use crate::frontend::{AnalysisOptions, Expr, Program, StmtKind};
use crate::invoke::{Invocation, Invoker, Toolchain};
use crate::job::BuildJob;
use crate::platform::{Os, Platform};

#[derive(Debug, Clone, Default)]
pub struct VlangBackend {
  invoker: Invoker,
}

impl VlangBackend {
  pub const TOOLCHAIN: Toolchain = Toolchain::new("V", VLANG_ROOT_VAR, &["v"]);

  pub fn new(invoker: Invoker) -> Self {
    Self { invoker }
  }

  /// Arguments for `v`, excluding the executable itself.
  fn build_args(transpiled: &TranspilingResult) -> Vec<String> {
    let configuration = &transpiled.configuration;
    let mut args = vec![if configuration.is_release() { "-prod" } else { "-g" }.to_string()];

    // V cross-compiles by OS only; the architecture follows the host.
    let host_os = Platform::current().map(|platform| platform.os);
    if host_os != Some(configuration.os()) {
      args.push("-os".to_string());
      args.push(os_name(configuration.os()).to_string());
    }

    args.push("-o".to_string());
    args.push(transpiled.binary_path().display().to_string());
    args.push(transpiled.output_file.display().to_string());
    args
  }
}

fn os_name(os: Os) -> &'static str {
  match os {
    Os::Linux => "linux",
    Os::MacOs => "macos",
    Os::Windows => "windows",
  }
}

impl Backend for VlangBackend {
  fn name(&self) -> &'static str {
    BackendKind::Vlang.id()
  }

  async fn transpile(&self, job: &BuildJob) -> Result<TranspilingResult, CompileError> {
    // `v -prod` refuses unused variables, debug builds only warn.
    let options = AnalysisOptions {
      reject_unused: job.configuration().is_release(),
    };
    transpile_with(job, BackendKind::Vlang, options, generate).await
  }

  async fn build(&self, transpiled: &TranspilingResult) -> Result<BuildResult, CompileError> {
    let v = Self::TOOLCHAIN.locate()?;
    let binary = transpiled.binary_path();

    let invocation = Invocation::new(v)
      .toolchain(Self::TOOLCHAIN.name)
      .args(Self::build_args(transpiled));
    let outcome = self.invoker.invoke(&invocation).await?;

    info!(binary = %binary.display(), mode = %transpiled.configuration.mode(), "build complete");
    Ok(BuildResult::new(binary, outcome.stdout, outcome.stderr))
  }

  async fn run(&self, transpiled: &TranspilingResult) -> Result<i32, CompileError> {
    ensure_runnable(transpiled)?;
    let built = self.build(transpiled).await?;
    execute_binary(&self.invoker, transpiled, &built.binary).await
  }
}

/// Render `program` as a V module.
pub fn generate(program: &Program, source_name: &str) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "// Code generated by vitu from {source_name}; DO NOT EDIT.");
  out.push_str("\nmodule main\n\nfn main() {\n");

  for stmt in &program.stmts {
    out.push('\t');
    match &stmt.kind {
      StmtKind::Let { name, value } => {
        let _ = write!(out, "{} := {}", mangle(&name.name), expr(value));
      }
      StmtKind::Print(value) => {
        let _ = write!(out, "println({})", expr(value));
      }
      StmtKind::Exit { code, .. } => {
        let _ = write!(out, "exit({code})");
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
      let mut literal = String::from("'");
      escape_into(&mut literal, text, &['\'', '$']);
      literal.push('\'');
      literal
    }
    // V's implicit `int` is 32 bits.
    Expr::Int(n) if i32::try_from(*n).is_err() => format!("i64({n})"),
    Expr::Int(n) => n.to_string(),
    Expr::Var(ident) => mangle(&ident.name),
  }
}
