#![allow(clippy::module_inception)]

use rayon::prelude::*;

use crate::{
    ast::types::ExprType,
    config::CheckConfig,
    errors::errors::{ErrorTip, ExprError},
    lexer::lexer::Lexer,
    parser::parser::parse,
    type_checker::type_checker::SemanticChecker,
};

pub mod ast;
pub mod config;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

/// A location inside expression source or inside the document the
/// expression was taken from. `line` and `column` are 1-based, `offset` is a
/// byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Position {
            line,
            column,
            offset,
        }
    }

    /// Position of the first character of an expression.
    pub fn start() -> Self {
        Position::new(1, 1, 0)
    }

    /// Maps a position relative to an expression onto the document, where
    /// `anchor` is the document position of the expression's first character.
    pub fn translate(&self, anchor: &Position) -> Self {
        let column = if self.line == 1 {
            anchor.column + self.column - 1
        } else {
            self.column
        };

        Position {
            line: anchor.line + self.line - 1,
            column,
            offset: anchor.offset + self.offset,
        }
    }
}

/// Outcome of checking a single `${{ }}` expression.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Inferred type, `None` when lexing or parsing failed.
    pub ty: Option<ExprType>,
    /// Errors in document coordinates, in the order they were found.
    pub errors: Vec<ExprError>,
    /// Byte offset just past the closing `}}`, when it was reached.
    pub end_offset: Option<usize>,
}

/// Checks the source of one expression. `source` starts right after `${{`
/// and must contain the closing `}}`. `anchor` is the document position of
/// the first character of `source`.
#[tracing::instrument(level = "debug", skip(checker))]
pub fn check_expression(
    source: &str,
    anchor: Position,
    checker: &mut SemanticChecker,
) -> CheckResult {
    let mut lexer = Lexer::new(source);
    let tokens = match lexer.tokenize() {
        Ok(tokens) => tokens,
        Err(error) => {
            tracing::debug!(%error, "lexing failed");
            return CheckResult {
                ty: None,
                errors: vec![error.translate(&anchor)],
                end_offset: None,
            };
        }
    };
    let end_offset = Some(lexer.get_offset());

    let expr = match parse(tokens) {
        Ok(expr) => expr,
        Err(error) => {
            tracing::debug!(%error, "parsing failed");
            return CheckResult {
                ty: None,
                errors: vec![error.translate(&anchor)],
                end_offset,
            };
        }
    };

    let (ty, errors) = checker.check(&expr);

    CheckResult {
        ty: Some(ty),
        errors: errors.into_iter().map(|e| e.translate(&anchor)).collect(),
        end_offset,
    }
}

/// Checks every `${{ ... }}` placeholder found in one string scalar and
/// returns all errors sorted by position.
pub fn check_template(text: &str, anchor: Position, checker: &mut SemanticChecker) -> Vec<ExprError> {
    let mut errors = vec![];
    let mut pos = 0;

    while let Some(found) = text[pos..].find("${{") {
        let start = pos + found + 3;
        let start_position = position_in(text, start).translate(&anchor);
        let result = check_expression(&text[start..], start_position, checker);
        errors.extend(result.errors);

        match result.end_offset {
            Some(end) => pos = start + end,
            None => match text[start..].find("}}") {
                Some(end) => pos = start + end + 2,
                None => break,
            },
        }
    }

    errors.sort_by(|a, b| a.get_position().cmp(b.get_position()));
    errors
}

/// Checks independent expressions in parallel. Each input gets its own
/// checker, so narrowing done by one never leaks into another.
pub fn check_batch(inputs: &[(String, Position)], config: &CheckConfig) -> Vec<CheckResult> {
    inputs
        .par_iter()
        .map(|(source, anchor)| {
            let mut checker = SemanticChecker::with_config(config);
            check_expression(source, *anchor, &mut checker)
        })
        .collect()
}

fn position_in(text: &str, offset: usize) -> Position {
    let mut line = 1;
    let mut column = 1;
    for ch in text[..offset].chars() {
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    Position::new(line, column, offset)
}

pub fn get_line_at_position(source: &str, position: &Position) -> Option<String> {
    source
        .split_inclusive('\n')
        .nth(position.line.saturating_sub(1))
        .map(|line| line.trim_end_matches(['\n', '\r']).to_string())
}

/// Renders an error with the offending source line and a caret under the
/// column the error points at.
pub fn render_error(error: &ExprError, source: &str) -> String {
    /*
        error: message
           |
        20 | github.event.issue.title
           | ^~~~
    */

    let position = error.get_position();
    let line_string = position.line.to_string();
    let padding = line_string.len() + 2;

    let mut out = String::new();
    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}\n", error.get_message()));
    } else {
        out.push_str(&format!("Error: {} ({})\n", error.get_message(), error.get_tip()));
    }

    if let Some(line_text) = get_line_at_position(source, position) {
        out.push_str(&format!("{:>padding$}\n", "|"));
        out.push_str(&format!("{} | {}\n", line_string, line_text));
        let arrows = position.column;
        out.push_str(&format!("{:>padding$} {:>arrows$}\n", "|", "^"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate_first_line() {
        let local = Position::new(1, 5, 4);
        let anchor = Position::new(10, 7, 100);
        let translated = local.translate(&anchor);
        assert_eq!(translated.line, 10);
        assert_eq!(translated.column, 11);
        assert_eq!(translated.offset, 104);
    }

    #[test]
    fn test_translate_later_line() {
        let local = Position::new(3, 2, 20);
        let anchor = Position::new(10, 7, 100);
        let translated = local.translate(&anchor);
        assert_eq!(translated.line, 12);
        assert_eq!(translated.column, 2);
    }

    #[test]
    fn test_get_line_at_position() {
        let source = "first\nsecond line\nthird";
        let line = get_line_at_position(source, &Position::new(2, 1, 6));
        assert_eq!(line.as_deref(), Some("second line"));
        assert_eq!(get_line_at_position(source, &Position::new(9, 1, 0)), None);
    }

    #[test]
    fn test_position_in_counts_lines() {
        let position = position_in("ab\ncd${{", 5);
        assert_eq!(position.line, 2);
        assert_eq!(position.column, 3);
    }
}
