//! NovaLang Compiler Front End
//!
//! Transforms NovaLang source text into an AST: lexer → token stream →
//! recursive-descent parser. Evaluation lives in `nova-rt`.

pub mod compiler;
pub mod diagnostics;

use compiler::ast::Program;
use compiler::lexer::Lexer;
use compiler::parser::Parser;
use compiler::tokens::{Token, TokenKind};
use diagnostics::{Diagnostic, DiagnosticKind};

/// Tokenize `source`, surfacing stray characters as lex diagnostics.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Diagnostic> {
    let tokens = Lexer::new(source).tokenize().map_err(Diagnostic::from)?;
    for tok in &tokens {
        if let TokenKind::Invalid(ch) = tok.kind {
            return Err(Diagnostic::new(
                DiagnosticKind::LexError,
                format!("stray character '{}'", ch),
                tok.span,
            ));
        }
    }
    Ok(tokens)
}

/// Parse `source` to a `Program`, for tooling that wants the AST only.
pub fn parse(source: &str) -> Result<Program, Diagnostic> {
    let tokens = tokenize(source)?;
    Parser::new(tokens)
        .parse_program()
        .map_err(Diagnostic::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_empty_program() {
        let program = parse("").expect("empty program parses");
        assert!(program.body.is_empty());
    }

    #[test]
    fn stray_character_surfaces_as_lex_diagnostic() {
        let err = parse("let x = @;").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::LexError);
        assert!(err.message.contains('@'));
        assert_eq!(err.span.start.col, 9);
    }

    #[test]
    fn parse_error_carries_offending_range() {
        let err = parse("let = 1;").unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::ParseError);
        assert_eq!(err.span.start.col, 5);
    }
}
