//! vitu-lib: the compiler driver behind the `vitu` command.
//!
//! This crate turns one vitu source file into a native executable by way of an
//! external toolchain:
//! - `BuildConfiguration` / `BuildJob`: what to build, for which platform, and where
//! - `Backend`: transpile, build and run for one target language (V or Go)
//! - `Invoker`: spawning and supervising toolchain and program processes
//! - `Compiler`: the orchestrator that sequences stages and reports failures

pub mod backend;
pub mod compiler;
pub mod consts;
pub mod error;
pub mod frontend;
pub mod invoke;
pub mod job;
pub mod platform;
pub mod util;

pub use backend::{AnyBackend, Backend, BackendKind, BuildResult, TranspilingResult};
pub use compiler::{BuildMetadata, Compiler, Failure, Reporter, RunOutcome, Stage, TracingReporter};
pub use error::{CompileError, ErrorKind};
pub use job::{BuildConfiguration, BuildJob, BuildMode};
