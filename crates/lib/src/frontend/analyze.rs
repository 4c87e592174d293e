//! Semantic checks over a parsed program.

use std::collections::HashMap;

use super::Diagnostic;
use super::ast::{Expr, Position, Program, StmtKind};

/// Backend-selected analysis rules on top of the shared ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalysisOptions {
  /// Treat a variable that is declared but never read as an error.
  pub reject_unused: bool,
}

struct Binding {
  pos: Position,
  used: bool,
}

/// Check a program, collecting every problem found.
///
/// Shared rules: identifiers must be declared before use and only once, exit
/// codes must fit in `0..=255`, and nothing may follow an `exit`.
pub fn analyze(program: &Program, options: AnalysisOptions) -> Result<(), Vec<Diagnostic>> {
  let mut diagnostics = Vec::new();
  let mut scope: HashMap<&str, Binding> = HashMap::new();
  let mut exited_at: Option<Position> = None;
  let mut reported_unreachable = false;

  for stmt in &program.stmts {
    if let Some(exit_pos) = exited_at
      && !reported_unreachable
    {
      diagnostics.push(Diagnostic::new(
        stmt.pos,
        format!("unreachable statement after exit on line {}", exit_pos.line),
      ));
      reported_unreachable = true;
    }

    match &stmt.kind {
      StmtKind::Let { name, value } => {
        check_expr(value, &mut scope, &mut diagnostics);
        if let Some(previous) = scope.get(name.name.as_str()) {
          diagnostics.push(Diagnostic::new(
            name.pos,
            format!("'{}' is already declared on line {}", name.name, previous.pos.line),
          ));
        } else {
          scope.insert(
            name.name.as_str(),
            Binding {
              pos: name.pos,
              used: false,
            },
          );
        }
      }
      StmtKind::Print(expr) => check_expr(expr, &mut scope, &mut diagnostics),
      StmtKind::Exit { code, code_pos } => {
        if !(0..=255).contains(code) {
          diagnostics.push(Diagnostic::new(
            *code_pos,
            format!("exit code {code} is outside the range 0..=255"),
          ));
        }
        exited_at.get_or_insert(stmt.pos);
      }
    }
  }

  if options.reject_unused {
    for (name, binding) in &scope {
      if !binding.used {
        diagnostics.push(Diagnostic::new(binding.pos, format!("'{name}' is declared but never used")));
      }
    }
  }

  if diagnostics.is_empty() {
    Ok(())
  } else {
    diagnostics.sort_by_key(|d| d.pos);
    Err(diagnostics)
  }
}

fn check_expr(expr: &Expr, scope: &mut HashMap<&str, Binding>, diagnostics: &mut Vec<Diagnostic>) {
  if let Expr::Var(ident) = expr {
    match scope.get_mut(ident.name.as_str()) {
      Some(binding) => binding.used = true,
      None => diagnostics.push(Diagnostic::new(ident.pos, format!("undefined variable '{}'", ident.name))),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::frontend::parser::parse;

  fn check(source: &str, options: AnalysisOptions) -> Vec<Diagnostic> {
    let program = parse(source).unwrap();
    analyze(&program, options).err().unwrap_or_default()
  }

  #[test]
  fn accepts_valid_program() {
    assert!(check("let x = 1\nprint x\nexit 0", AnalysisOptions::default()).is_empty());
  }

  #[test]
  fn reports_undefined_variable_with_position() {
    let diagnostics = check("print 1\nprint missing", AnalysisOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].pos, Position::new(2, 7));
    assert!(diagnostics[0].message.contains("undefined variable 'missing'"));
  }

  #[test]
  fn variable_cannot_reference_itself() {
    let diagnostics = check("let x = x", AnalysisOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("undefined"));
  }

  #[test]
  fn reports_redeclaration() {
    let diagnostics = check("let x = 1\nlet x = 2\nprint x", AnalysisOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].pos, Position::new(2, 5));
    assert!(diagnostics[0].message.contains("already declared on line 1"));
  }

  #[test]
  fn reports_exit_code_out_of_range() {
    let diagnostics = check("exit 256", AnalysisOptions::default());
    assert_eq!(diagnostics[0].pos, Position::new(1, 6));

    let diagnostics = check("exit -1", AnalysisOptions::default());
    assert_eq!(diagnostics.len(), 1);
  }

  #[test]
  fn reports_first_unreachable_statement_only() {
    let diagnostics = check("exit 0\nprint 1\nprint 2", AnalysisOptions::default());
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].pos.line, 2);
  }

  #[test]
  fn collects_all_diagnostics_in_source_order() {
    let diagnostics = check("print a\nprint b\nexit 300", AnalysisOptions::default());
    let lines: Vec<_> = diagnostics.iter().map(|d| d.pos.line).collect();
    assert_eq!(lines, vec![1, 2, 3]);
  }

  #[test]
  fn unused_variables_only_rejected_when_asked() {
    let source = "let unused = 1\nprint 2";
    assert!(check(source, AnalysisOptions::default()).is_empty());

    let diagnostics = check(source, AnalysisOptions { reject_unused: true });
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message.contains("'unused' is declared but never used"));
  }
}
