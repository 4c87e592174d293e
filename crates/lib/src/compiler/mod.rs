//! The orchestrator: the single entry point callers drive builds through.
//!
//! [`Compiler`] resolves the backend for a job, checks the source, runs the
//! backend's stages in order and turns any error into a [`Failure`] naming the
//! stage that produced it. It is also the only place failures are reported;
//! nothing below it prints.

pub mod pipeline;

use std::fmt;

use thiserror::Error;
use tracing::{error, info};

use crate::backend::{self, AnyBackend, Backend, BuildResult, TranspilingResult};
use crate::consts::PIPELINE_FAILURE_CODE;
use crate::error::CompileError;
use crate::invoke::Invoker;
use crate::job::BuildJob;

pub use pipeline::{Pipeline, PipelineState};

/// A step of an orchestrator operation, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
  Resolve,
  Transpile,
  Build,
  Run,
  Test,
  Format,
  Clean,
}

impl Stage {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Resolve => "resolve",
      Self::Transpile => "transpile",
      Self::Build => "build",
      Self::Run => "run",
      Self::Test => "test",
      Self::Format => "format",
      Self::Clean => "clean",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A failed operation: which stage failed and why.
#[derive(Debug, Error)]
#[error("{stage} failed: {error}")]
pub struct Failure {
  pub stage: Stage,
  #[source]
  pub error: CompileError,
}

impl Failure {
  pub fn new(stage: Stage, error: CompileError) -> Self {
    Self { stage, error }
  }
}

/// Result of [`Compiler::run`].
#[derive(Debug)]
pub enum RunOutcome {
  /// The program executed and exited with this code.
  Completed(i32),
  /// The pipeline failed before the program could run to completion.
  Failed(Failure),
}

impl RunOutcome {
  /// The program's exit code, or [`PIPELINE_FAILURE_CODE`] if it never ran.
  pub fn status_code(&self) -> i32 {
    match self {
      Self::Completed(code) => *code,
      Self::Failed(_) => PIPELINE_FAILURE_CODE,
    }
  }

  pub fn failure(&self) -> Option<&Failure> {
    match self {
      Self::Completed(_) => None,
      Self::Failed(failure) => Some(failure),
    }
  }
}

/// Receives the failures the orchestrator reports.
pub trait Reporter {
  /// Called exactly once for every failed operation.
  fn failure(&self, failure: &Failure);
}

/// Reports failures as `error!` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
  fn failure(&self, failure: &Failure) {
    error!(stage = %failure.stage, kind = %failure.error.kind(), "{failure}");
  }
}

/// Version information supplied by whoever builds the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMetadata {
  pub version: String,
  pub commit: Option<String>,
}

impl BuildMetadata {
  pub fn new(version: impl Into<String>) -> Self {
    Self {
      version: version.into(),
      commit: None,
    }
  }

  pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
    self.commit = Some(commit.into());
    self
  }
}

impl fmt::Display for BuildMetadata {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.commit {
      Some(commit) => write!(f, "{} ({commit})", self.version),
      None => f.write_str(&self.version),
    }
  }
}

/// Drives build jobs through their backend.
#[derive(Debug, Clone)]
pub struct Compiler<R: Reporter = TracingReporter> {
  metadata: BuildMetadata,
  invoker: Invoker,
  reporter: R,
}

impl Compiler {
  pub fn new(metadata: BuildMetadata) -> Self {
    Self {
      metadata,
      invoker: Invoker::new(),
      reporter: TracingReporter,
    }
  }
}

impl<R: Reporter> Compiler<R> {
  /// Replace the failure reporter.
  pub fn with_reporter<S: Reporter>(self, reporter: S) -> Compiler<S> {
    Compiler {
      metadata: self.metadata,
      invoker: self.invoker,
      reporter,
    }
  }

  /// Use `invoker` for every toolchain and program process, e.g. one with cancellation.
  pub fn with_invoker(mut self, invoker: Invoker) -> Self {
    self.invoker = invoker;
    self
  }

  pub fn metadata(&self) -> &BuildMetadata {
    &self.metadata
  }

  pub fn reporter(&self) -> &R {
    &self.reporter
  }

  /// Generate backend source for `job` without compiling it.
  pub async fn transpile(&self, job: &BuildJob) -> Result<TranspilingResult, Failure> {
    let mut pipeline = Pipeline::new();
    let result = self
      .transpile_stage(job, &mut pipeline)
      .await
      .map(|(_, transpiled)| transpiled);
    self.finish(&mut pipeline, result)
  }

  /// Transpile once, then compile the generated file.
  pub async fn build(&self, job: &BuildJob) -> Result<BuildResult, Failure> {
    let mut pipeline = Pipeline::new();
    let result = async {
      let (backend, transpiled) = self.transpile_stage(job, &mut pipeline).await?;

      pipeline.enter(PipelineState::Building);
      let built = backend
        .build(&transpiled)
        .await
        .map_err(|err| Failure::new(Stage::Build, err))?;
      pipeline.enter(PipelineState::Built);
      Ok::<_, Failure>(built)
    }
    .await;
    self.finish(&mut pipeline, result)
  }

  /// Transpile, build and execute the program.
  pub async fn run(&self, job: &BuildJob) -> RunOutcome {
    let mut pipeline = Pipeline::new();
    let result = async {
      let (backend, transpiled) = self.transpile_stage(job, &mut pipeline).await?;

      pipeline.enter(PipelineState::Running);
      backend.run(&transpiled).await.map_err(|err| Failure::new(Stage::Run, err))
    }
    .await;

    match self.finish(&mut pipeline, result) {
      Ok(code) => RunOutcome::Completed(code),
      Err(failure) => RunOutcome::Failed(failure),
    }
  }

  pub async fn test(&self, job: &BuildJob) -> Result<(), Failure> {
    self.unsupported(job, Stage::Test)
  }

  pub async fn format(&self, job: &BuildJob) -> Result<(), Failure> {
    self.unsupported(job, Stage::Format)
  }

  pub async fn clean(&self, job: &BuildJob) -> Result<(), Failure> {
    self.unsupported(job, Stage::Clean)
  }

  /// Resolve the backend, check the source exists and transpile.
  async fn transpile_stage(
    &self,
    job: &BuildJob,
    pipeline: &mut Pipeline,
  ) -> Result<(AnyBackend, TranspilingResult), Failure> {
    let backend = self.resolve(job)?;

    let source = job.source_file();
    tokio::fs::File::open(source)
      .await
      .map_err(|err| Failure::new(Stage::Transpile, CompileError::source_read(source, err)))?;

    info!(
      job = %job.id(),
      backend = backend.name(),
      source = %source.display(),
      target = %job.configuration().platform(),
      "starting pipeline"
    );

    pipeline.enter(PipelineState::Transpiling);
    let transpiled = backend
      .transpile(job)
      .await
      .map_err(|err| Failure::new(Stage::Transpile, err))?;
    pipeline.enter(PipelineState::Transpiled);

    Ok((backend, transpiled))
  }

  fn resolve(&self, job: &BuildJob) -> Result<AnyBackend, Failure> {
    backend::resolve(job.configuration().backend(), self.invoker.clone()).map_err(|err| Failure::new(Stage::Resolve, err))
  }

  fn unsupported(&self, job: &BuildJob, stage: Stage) -> Result<(), Failure> {
    let mut pipeline = Pipeline::new();
    let result = self.resolve(job).and_then(|backend| {
      Err(Failure::new(
        stage,
        CompileError::not_supported(format!("{stage} for the {} backend", backend.name())),
      ))
    });
    self.finish(&mut pipeline, result)
  }

  /// Record the final state and report a failure exactly once.
  fn finish<T>(&self, pipeline: &mut Pipeline, result: Result<T, Failure>) -> Result<T, Failure> {
    match &result {
      Ok(_) => pipeline.enter(PipelineState::Completed),
      Err(failure) => {
        pipeline.fail(failure.stage);
        self.reporter.failure(failure);
      }
    }
    result
  }
}
