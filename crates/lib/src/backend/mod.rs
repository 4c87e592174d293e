//! Backend contract and the artifacts passed between stages.
//!
//! A backend turns a [`BuildJob`] into target-language source (`transpile`),
//! compiles that source with an external toolchain (`build`), and executes the
//! result (`run`). Each stage only consumes what the previous one returned, so
//! callers may stop after any of them.

pub mod golang;
pub mod registry;
pub mod vlang;

use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::CompileError;
use crate::frontend::{self, AnalysisOptions, Program};
use crate::invoke::{Invocation, Invoker};
use crate::job::{BuildConfiguration, BuildJob};
use crate::util::hash::{ContentHash, hash_bytes};

pub use golang::GoBackend;
pub use registry::{AnyBackend, BackendKind, resolve};
pub use vlang::VlangBackend;

/// Hand-off from `transpile` to `build`/`run`.
///
/// Carries everything the later stages need; the originating job is not required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct TranspilingResult {
  /// Generated source file, inside the job's artifact directory.
  pub output_file: PathBuf,
  /// Backend that generated the file.
  pub backend: BackendKind,
  /// Configuration the file was generated for.
  pub configuration: BuildConfiguration,
  /// SHA-256 of the generated text.
  pub content_hash: ContentHash,
}

impl TranspilingResult {
  pub fn new(output_file: PathBuf, backend: BackendKind, configuration: BuildConfiguration, content_hash: ContentHash) -> Self {
    Self {
      output_file,
      backend,
      configuration,
      content_hash,
    }
  }

  /// Executable produced by `build`: next to the generated file, named after its stem.
  pub fn binary_path(&self) -> PathBuf {
    let stem = self
      .output_file
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_else(|| "main".to_string());
    self
      .output_file
      .with_file_name(format!("{stem}{}", self.configuration.os().exe_suffix()))
  }
}

/// What `build` produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct BuildResult {
  /// Compiled executable.
  pub binary: PathBuf,
  /// Toolchain stdout, verbatim.
  pub stdout: String,
  /// Toolchain stderr (warnings), verbatim.
  pub stderr: String,
}

impl BuildResult {
  pub fn new(binary: PathBuf, stdout: String, stderr: String) -> Self {
    Self { binary, stdout, stderr }
  }
}

/// The three-stage contract every backend implements.
///
/// Implementations hold no state that changes between jobs.
#[allow(async_fn_in_trait)]
pub trait Backend {
  /// Identifier of this backend, as accepted by [`resolve`].
  fn name(&self) -> &'static str;

  /// Read, check and translate the job's source into the artifact directory.
  ///
  /// # Errors
  ///
  /// `SourceRead` if the source cannot be read, `Analysis` if it is invalid,
  /// `Generation` if the output cannot be written.
  async fn transpile(&self, job: &BuildJob) -> Result<TranspilingResult, CompileError>;

  /// Compile a previously generated file with the external toolchain.
  ///
  /// # Errors
  ///
  /// `Toolchain` errors: not configured, not found, or a failed compilation
  /// carrying the compiler's exit code and stderr.
  async fn build(&self, transpiled: &TranspilingResult) -> Result<BuildResult, CompileError>;

  /// Build, then execute the program and return its exit code verbatim.
  ///
  /// The program shares the caller's stdin, stdout and stderr, so its output
  /// appears in real time.
  async fn run(&self, transpiled: &TranspilingResult) -> Result<i32, CompileError>;
}

/// Transpile steps shared by all backends: read, check, generate, write.
pub(crate) async fn transpile_with<G>(
  job: &BuildJob,
  backend: BackendKind,
  options: AnalysisOptions,
  generate: G,
) -> Result<TranspilingResult, CompileError>
where
  G: FnOnce(&Program, &str) -> String,
{
  let source_path = job.source_file();
  let source = tokio::fs::read_to_string(source_path)
    .await
    .map_err(|err| CompileError::source_read(source_path, err))?;

  let program = frontend::check(&source, options).map_err(|diagnostics| CompileError::Analysis {
    path: source_path.to_path_buf(),
    diagnostics,
  })?;

  let source_name = source_path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_default();
  let generated = generate(&program, &source_name);

  let output_file = job.artifact_dir().join(format!("{}.{}", job.source_stem(), backend.extension()));
  write_generated(&output_file, generated.as_bytes()).await?;

  info!(
    backend = backend.id(),
    output = %output_file.display(),
    statements = program.stmts.len(),
    "transpile complete"
  );

  Ok(TranspilingResult::new(
    output_file,
    backend,
    job.configuration().clone(),
    hash_bytes(generated.as_bytes()),
  ))
}

/// Write generated text durably, leaving an identical existing file untouched.
async fn write_generated(path: &Path, contents: &[u8]) -> Result<(), CompileError> {
  if let Ok(existing) = tokio::fs::read(path).await
    && existing == contents
  {
    debug!(path = %path.display(), "generated output unchanged");
    return Ok(());
  }

  if let Some(dir) = path.parent() {
    tokio::fs::create_dir_all(dir)
      .await
      .map_err(|err| CompileError::generation(dir, err))?;
  }

  let mut file = tokio::fs::File::create(path)
    .await
    .map_err(|err| CompileError::generation(path, err))?;
  file
    .write_all(contents)
    .await
    .map_err(|err| CompileError::generation(path, err))?;
  file.sync_all().await.map_err(|err| CompileError::generation(path, err))?;

  Ok(())
}

/// Run a freshly built binary with inherited stdio and return its exit code.
pub(crate) async fn execute_binary(
  invoker: &Invoker,
  transpiled: &TranspilingResult,
  binary: &Path,
) -> Result<i32, CompileError> {
  let outcome = invoker
    .execute(&Invocation::new(binary).current_dir(working_dir(transpiled)).inherit_output())
    .await?;
  info!(binary = %binary.display(), exit_code = outcome.exit_code, "program exited");
  Ok(outcome.exit_code)
}

/// Refuse to execute binaries the host cannot run.
pub(crate) fn ensure_runnable(transpiled: &TranspilingResult) -> Result<(), CompileError> {
  let platform = transpiled.configuration.platform();
  if platform.is_host() {
    Ok(())
  } else {
    Err(CompileError::not_supported(format!(
      "running a {platform} binary on this host"
    )))
  }
}

/// The program runs from the directory the caller launched `vitu` in.
fn working_dir(transpiled: &TranspilingResult) -> PathBuf {
  std::env::current_dir().unwrap_or_else(|_| {
    transpiled
      .output_file
      .parent()
      .map(Path::to_path_buf)
      .unwrap_or_default()
  })
}

/// Escape `text` into a double-quoted string literal understood by C-family targets.
pub(crate) fn escape_into(out: &mut String, text: &str, extra: &[char]) {
  for c in text.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\t' => out.push_str("\\t"),
      '\r' => out.push_str("\\r"),
      c if extra.contains(&c) => {
        out.push('\\');
        out.push(c);
      }
      c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
      c => out.push(c),
    }
  }
}

/// Names given to user variables in generated code; the prefix keeps them
/// clear of every target language's keywords.
pub(crate) fn mangle(name: &str) -> String {
  format!("u_{name}")
}
