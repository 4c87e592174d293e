//! End-to-end CLI tests against fake toolchains.

mod common;

#[cfg(unix)]
mod build_tests;
#[cfg(unix)]
mod run_tests;
