//! Line-oriented parser.
//!
//! Every non-blank line holds at most one statement; `#` starts a comment
//! outside string literals. Parsing stops at the first syntax error.

use super::Diagnostic;
use super::ast::{Expr, Ident, Position, Program, Stmt, StmtKind};

const KEYWORDS: &[&str] = &["let", "print", "exit"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
  Word(String),
  Str(String),
  Int(i64),
  Assign,
}

#[derive(Debug, Clone)]
struct Spanned {
  token: Token,
  pos: Position,
}

/// Parse a whole source file.
pub fn parse(source: &str) -> Result<Program, Diagnostic> {
  let mut stmts = Vec::new();

  for (index, line) in source.lines().enumerate() {
    let tokens = tokenize_line(line, index + 1)?;
    if let Some(stmt) = parse_stmt(&tokens, index + 1)? {
      stmts.push(stmt);
    }
  }

  Ok(Program { stmts })
}

fn tokenize_line(line: &str, line_no: usize) -> Result<Vec<Spanned>, Diagnostic> {
  let chars: Vec<char> = line.chars().collect();
  let mut tokens = Vec::new();
  let mut i = 0;

  while i < chars.len() {
    let c = chars[i];
    let pos = Position::new(line_no, i + 1);

    if c.is_whitespace() {
      i += 1;
    } else if c == '#' {
      break;
    } else if c == '=' {
      tokens.push(Spanned {
        token: Token::Assign,
        pos,
      });
      i += 1;
    } else if c == '"' {
      let (text, next) = lex_string(&chars, i, line_no)?;
      tokens.push(Spanned {
        token: Token::Str(text),
        pos,
      });
      i = next;
    } else if c.is_ascii_digit() || (c == '-' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())) {
      let start = i;
      i += 1;
      while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
      }
      let literal: String = chars[start..i].iter().collect();
      let value = literal
        .parse::<i64>()
        .map_err(|_| Diagnostic::new(pos, format!("integer literal {literal} is out of range")))?;
      tokens.push(Spanned {
        token: Token::Int(value),
        pos,
      });
    } else if c.is_ascii_alphabetic() || c == '_' {
      let start = i;
      while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
        i += 1;
      }
      tokens.push(Spanned {
        token: Token::Word(chars[start..i].iter().collect()),
        pos,
      });
    } else {
      return Err(Diagnostic::new(pos, format!("unexpected character '{c}'")));
    }
  }

  Ok(tokens)
}

/// Lex a string literal starting at the opening quote; returns the unescaped
/// text and the index just past the closing quote.
fn lex_string(chars: &[char], start: usize, line_no: usize) -> Result<(String, usize), Diagnostic> {
  let mut text = String::new();
  let mut i = start + 1;

  while i < chars.len() {
    match chars[i] {
      '"' => return Ok((text, i + 1)),
      '\\' => {
        let escaped = match chars.get(i + 1) {
          Some('"') => '"',
          Some('\\') => '\\',
          Some('n') => '\n',
          Some('t') => '\t',
          Some(other) => {
            return Err(Diagnostic::new(
              Position::new(line_no, i + 1),
              format!("unknown escape sequence '\\{other}'"),
            ));
          }
          None => break,
        };
        text.push(escaped);
        i += 2;
      }
      c => {
        text.push(c);
        i += 1;
      }
    }
  }

  Err(Diagnostic::new(
    Position::new(line_no, start + 1),
    "unterminated string literal",
  ))
}

fn parse_stmt(tokens: &[Spanned], line_no: usize) -> Result<Option<Stmt>, Diagnostic> {
  let Some(first) = tokens.first() else {
    return Ok(None);
  };
  let pos = first.pos;

  let (kind, consumed) = match &first.token {
    Token::Word(word) if word == "let" => {
      let name = expect_ident(tokens.get(1), pos, "a variable name after 'let'")?;
      match tokens.get(2) {
        Some(Spanned {
          token: Token::Assign, ..
        }) => {}
        Some(other) => return Err(Diagnostic::new(other.pos, "expected '=' after the variable name")),
        None => return Err(Diagnostic::new(name.pos, "expected '=' after the variable name")),
      }
      let value = parse_expr(tokens.get(3), tokens[2].pos)?;
      (StmtKind::Let { name, value }, 4)
    }
    Token::Word(word) if word == "print" => (StmtKind::Print(parse_expr(tokens.get(1), pos)?), 2),
    Token::Word(word) if word == "exit" => match tokens.get(1) {
      Some(Spanned {
        token: Token::Int(code),
        pos: code_pos,
      }) => (
        StmtKind::Exit {
          code: *code,
          code_pos: *code_pos,
        },
        2,
      ),
      Some(other) => return Err(Diagnostic::new(other.pos, "expected an integer exit code")),
      None => return Err(Diagnostic::new(pos, "expected an integer exit code after 'exit'")),
    },
    _ => {
      return Err(Diagnostic::new(pos, "expected a statement ('let', 'print' or 'exit')"));
    }
  };

  if let Some(extra) = tokens.get(consumed) {
    return Err(Diagnostic::new(extra.pos, "unexpected token after statement"));
  }

  debug_assert_eq!(pos.line, line_no);
  Ok(Some(Stmt { kind, pos }))
}

fn parse_expr(token: Option<&Spanned>, after: Position) -> Result<Expr, Diagnostic> {
  match token {
    Some(Spanned {
      token: Token::Str(text), ..
    }) => Ok(Expr::Str(text.clone())),
    Some(Spanned {
      token: Token::Int(value), ..
    }) => Ok(Expr::Int(*value)),
    Some(spanned) if matches!(spanned.token, Token::Word(_)) => {
      Ok(Expr::Var(expect_ident(Some(spanned), after, "an expression")?))
    }
    Some(other) => Err(Diagnostic::new(other.pos, "expected a string, integer or variable")),
    None => Err(Diagnostic::new(after, "expected a string, integer or variable")),
  }
}

fn expect_ident(token: Option<&Spanned>, after: Position, what: &str) -> Result<Ident, Diagnostic> {
  match token {
    Some(Spanned {
      token: Token::Word(word),
      pos,
    }) => {
      if KEYWORDS.contains(&word.as_str()) {
        return Err(Diagnostic::new(*pos, format!("'{word}' is a keyword")));
      }
      if !is_identifier(word) {
        return Err(Diagnostic::new(
          *pos,
          format!("identifier '{word}' must use lowercase letters, digits and '_'"),
        ));
      }
      Ok(Ident {
        name: word.clone(),
        pos: *pos,
      })
    }
    Some(other) => Err(Diagnostic::new(other.pos, format!("expected {what}"))),
    None => Err(Diagnostic::new(after, format!("expected {what}"))),
  }
}

fn is_identifier(word: &str) -> bool {
  let mut chars = word.chars();
  chars.next().is_some_and(|c| c.is_ascii_lowercase() || c == '_')
    && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
