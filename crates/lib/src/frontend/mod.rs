//! Source frontend shared by every backend.
//!
//! Turns vitu source text into a checked [`Program`]. Backends choose extra
//! analysis rules through [`AnalysisOptions`] and generate their own output
//! from the returned tree.

pub mod analyze;
pub mod ast;
pub mod parser;

use std::fmt;

pub use analyze::{AnalysisOptions, analyze};
pub use ast::{Expr, Ident, Position, Program, Stmt, StmtKind};
pub use parser::parse;

/// A positioned problem found in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub pos: Position,
  pub message: String,
}

impl Diagnostic {
  pub fn new(pos: Position, message: impl Into<String>) -> Self {
    Self {
      pos,
      message: message.into(),
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.pos, self.message)
  }
}

/// Parse and analyze `source`. A syntax error stops at the first problem;
/// analysis reports everything it finds.
pub fn check(source: &str, options: AnalysisOptions) -> Result<Program, Vec<Diagnostic>> {
  let program = parse(source).map_err(|diagnostic| vec![diagnostic])?;
  analyze(&program, options)?;
  Ok(program)
}
