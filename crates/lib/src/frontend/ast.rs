//! Syntax tree for vitu source.

use std::fmt;

/// 1-based line and column of a token in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
  pub line: usize,
  pub column: usize,
}

impl Position {
  pub fn new(line: usize, column: usize) -> Self {
    Self { line, column }
  }
}

impl fmt::Display for Position {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}", self.line, self.column)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
  pub name: String,
  pub pos: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  Str(String),
  Int(i64),
  Var(Ident),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
  Let { name: Ident, value: Expr },
  Print(Expr),
  Exit { code: i64, code_pos: Position },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
  pub kind: StmtKind,
  pub pos: Position,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
  pub stmts: Vec<Stmt>,
}

impl Program {
  /// True when any statement prints, which decides whether generated code needs output imports.
  pub fn prints(&self) -> bool {
    self.stmts.iter().any(|stmt| matches!(stmt.kind, StmtKind::Print(_)))
  }

  pub fn exits(&self) -> bool {
    self.stmts.iter().any(|stmt| matches!(stmt.kind, StmtKind::Exit { .. }))
  }
}
