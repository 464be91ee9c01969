//! Diagnostics with source coordinates, rendered for terminals and hosts.

use crate::compiler::lexer::LexError;
use crate::compiler::parser::ParseError;
use crate::compiler::tokens::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticKind {
    LexError,
    ParseError,
    RuntimeError,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::LexError => "LexError",
            DiagnosticKind::ParseError => "ParseError",
            DiagnosticKind::RuntimeError => "RuntimeError",
        };
        write!(f, "{}", s)
    }
}

/// A pipeline failure pinned to a source range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// `"<file>:<line>:<column>: <kind>: <message>"`
    pub fn render(&self, file: &str) -> String {
        format!(
            "{}:{}:{}: {}: {}",
            file, self.span.start.line, self.span.start.col, self.kind, self.message
        )
    }

    /// One-line header plus the offending source line with a caret underline.
    pub fn render_with_source(&self, file: &str, source: &str) -> String {
        let mut out = self.render(file);
        if let Some(line_text) = get_source_line(source, self.span.start.line) {
            let width = if self.span.start.line == self.span.end.line {
                self.span.len().max(1)
            } else {
                1
            };
            out.push('\n');
            out.push_str(&format!("  {:>3} | {}\n", self.span.start.line, line_text));
            out.push_str(&format!(
                "      | {}",
                make_underline(self.span.start.col, width)
            ));
        }
        out
    }
}

impl From<LexError> for Diagnostic {
    fn from(err: LexError) -> Self {
        let span = match &err {
            LexError::UnterminatedString { span } | LexError::UnterminatedTemplate { span } => {
                *span
            }
        };
        let message = match &err {
            LexError::UnterminatedString { .. } => "Unterminated string".to_string(),
            LexError::UnterminatedTemplate { .. } => "Unterminated template string".to_string(),
        };
        Diagnostic::new(DiagnosticKind::LexError, message, span)
    }
}

impl From<ParseError> for Diagnostic {
    fn from(err: ParseError) -> Self {
        let span = err.span();
        let message = match &err {
            ParseError::Unexpected {
                found, expected, ..
            } => format!("unexpected token {}; expected {}", found, expected),
            ParseError::UnexpectedEof { .. } => "unexpected end of input".to_string(),
            ParseError::InvalidAssignTarget { .. } => "invalid assignment target".to_string(),
            ParseError::InvalidPattern { .. } => "invalid destructuring pattern".to_string(),
        };
        Diagnostic::new(DiagnosticKind::ParseError, message, span)
    }
}

fn get_source_line(source: &str, line: usize) -> Option<&str> {
    source.lines().nth(line.saturating_sub(1))
}

fn make_underline(col: usize, len: usize) -> String {
    format!("{}{}", " ".repeat(col.saturating_sub(1)), "^".repeat(len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::tokens::Pos;

    fn span(line: usize, col: usize, offset: usize, len: usize) -> Span {
        Span::new(
            Pos::new(line, col, offset),
            Pos::new(line, col + len, offset + len),
        )
    }

    #[test]
    fn render_uses_file_line_col() {
        let diag = Diagnostic::new(
            DiagnosticKind::RuntimeError,
            "assignment to constant 'x'",
            span(1, 11, 10, 1),
        );
        assert_eq!(
            diag.render("script.nova"),
            "script.nova:1:11: RuntimeError: assignment to constant 'x'"
        );
    }

    #[test]
    fn render_with_source_underlines_the_range() {
        let source = "const x = 1; x = 2;";
        let diag = Diagnostic::new(
            DiagnosticKind::RuntimeError,
            "assignment to constant 'x'",
            span(1, 14, 13, 1),
        );
        let out = diag.render_with_source("script.nova", source);
        assert!(out.contains("const x = 1; x = 2;"));
        assert!(out.lines().last().unwrap().trim_end().ends_with('^'));
    }
}
