//! Hand-written lexer for NovaLang source text.

use crate::compiler::tokens::{keyword_kind, Pos, Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LexError {
    #[error("unterminated string starting at {span}")]
    UnterminatedString { span: Span },
    #[error("unterminated template string starting at {span}")]
    UnterminatedTemplate { span: Span },
}

pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    byte_offset: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            byte_offset: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos + 1).copied()
    }

    fn peek2(&self) -> Option<char> {
        self.source.get(self.pos + 2).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        self.byte_offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn here(&self) -> Pos {
        Pos::new(self.line, self.col, self.byte_offset)
    }

    fn span_from(&self, start: Pos) -> Span {
        Span::new(start, self.here())
    }

    /// Tokenize the whole input. The returned stream always ends with an
    /// `Eof` token whose range is empty.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let at_end = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if at_end {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();
        let start = self.here();
        let ch = match self.current() {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::Eof, Span::new(start, start))),
        };

        if ch.is_ascii_digit() {
            return Ok(self.read_number(start));
        }
        if ch == '"' || ch == '\'' {
            return self.read_string(start, ch);
        }
        if ch == '`' {
            return self.read_template(start);
        }
        if is_ident_start(ch) {
            return Ok(self.read_ident(start));
        }

        self.advance();
        let kind = match ch {
            '+' => {
                if self.current() == Some('=') {
                    self.advance();
                    TokenKind::PlusAssign
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.current() == Some('=') {
                    self.advance();
                    TokenKind::MinusAssign
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.current() == Some('*') {
                    self.advance();
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => {
                if self.current() == Some('=') {
                    self.advance();
                    if self.current() == Some('=') {
                        self.advance();
                        TokenKind::StrictEq
                    } else {
                        TokenKind::Eq
                    }
                } else if self.current() == Some('>') {
                    self.advance();
                    TokenKind::FatArrow
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.current() == Some('=') {
                    self.advance();
                    if self.current() == Some('=') {
                        self.advance();
                        TokenKind::StrictNotEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.current() == Some('=') {
                    self.advance();
                    TokenKind::LtEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.current() == Some('=') {
                    self.advance();
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.current() == Some('&') {
                    self.advance();
                    TokenKind::AmpAmp
                } else {
                    TokenKind::Invalid('&')
                }
            }
            '|' => {
                if self.current() == Some('|') {
                    self.advance();
                    TokenKind::PipePipe
                } else {
                    TokenKind::Invalid('|')
                }
            }
            '?' => {
                if self.current() == Some('?') {
                    self.advance();
                    TokenKind::QuestionQuestion
                } else {
                    TokenKind::Question
                }
            }
            '.' => {
                // Exactly three dots form a spread; a lone dot is member access.
                if self.current() == Some('.') && self.peek() == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::DotDotDot
                } else {
                    TokenKind::Dot
                }
            }
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            other => TokenKind::Invalid(other),
        };
        Ok(Token::new(kind, self.span_from(start)))
    }

    /// Skip whitespace, newlines, and `//` line comments. Newlines are not
    /// tokenized; statement terminators are explicit.
    fn skip_trivia(&mut self) {
        loop {
            match self.current() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') if self.peek() == Some('/') => {
                    while let Some(c) = self.current() {
                        if c == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn read_number(&mut self, start: Pos) -> Token {
        let mut text = String::new();
        while let Some(c) = self.current() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.current() == Some('.') && self.peek().is_some_and(|c| c.is_ascii_digit()) {
            text.push('.');
            self.advance();
            while let Some(c) = self.current() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if matches!(self.current(), Some('e') | Some('E')) {
            let has_sign = matches!(self.peek(), Some('+') | Some('-'));
            let digit = if has_sign { self.peek2() } else { self.peek() };
            if digit.is_some_and(|c| c.is_ascii_digit()) {
                text.push('e');
                self.advance();
                if has_sign {
                    text.push(self.advance().unwrap_or('+'));
                }
                while let Some(c) = self.current() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }
        // The grammar above only admits valid f64 text.
        let value = text.parse::<f64>().unwrap_or(f64::NAN);
        Token::new(TokenKind::NumberLit(value), self.span_from(start))
    }

    fn read_string(&mut self, start: Pos, quote: char) -> Result<Token, LexError> {
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.current() {
                None => {
                    return Err(LexError::UnterminatedString {
                        span: Span::new(start, self.here()),
                    })
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut text);
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::StringLit(text), self.span_from(start)))
    }

    /// Process the character after a backslash. Unrecognized escapes pass the
    /// escaped character through unchanged.
    fn read_escape(&mut self, buf: &mut String) {
        match self.current() {
            Some('n') => buf.push('\n'),
            Some('t') => buf.push('\t'),
            Some('r') => buf.push('\r'),
            Some('\\') => buf.push('\\'),
            Some('\'') => buf.push('\''),
            Some('"') => buf.push('"'),
            Some('`') => buf.push('`'),
            Some(other) => buf.push(other),
            None => return,
        }
        self.advance();
    }

    fn read_template(&mut self, start: Pos) -> Result<Token, LexError> {
        self.advance(); // opening back-tick
        let mut text = String::new();
        loop {
            match self.current() {
                None => {
                    return Err(LexError::UnterminatedTemplate {
                        span: Span::new(start, self.here()),
                    })
                }
                Some('\\') => {
                    self.advance();
                    self.read_escape(&mut text);
                }
                Some('`') => {
                    self.advance();
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::TemplateLit(text), self.span_from(start)))
    }

    fn read_ident(&mut self, start: Pos) -> Token {
        let mut text = String::new();
        while let Some(c) = self.current() {
            if is_ident_continue(c) {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = keyword_kind(&text).unwrap_or(TokenKind::Ident(text));
        Token::new(kind, self.span_from(start))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .tokenize()
            .expect("lex failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(kinds("42"), vec![TokenKind::NumberLit(42.0), TokenKind::Eof]);
        assert_eq!(
            kinds("3.25"),
            vec![TokenKind::NumberLit(3.25), TokenKind::Eof]
        );
        assert_eq!(
            kinds("1e3 2.5e-2"),
            vec![
                TokenKind::NumberLit(1000.0),
                TokenKind::NumberLit(0.025),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_number_then_member() {
        // No leading-dot literals; `1.toString` style chains stay three tokens.
        let toks = kinds("1 .x");
        assert_eq!(
            toks,
            vec![
                TokenKind::NumberLit(1.0),
                TokenKind::Dot,
                TokenKind::Ident("x".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_longest_match_operators() {
        assert_eq!(
            kinds("=== !== == != ** * <= < => = ... . ?? ?"),
            vec![
                TokenKind::StrictEq,
                TokenKind::StrictNotEq,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::StarStar,
                TokenKind::Star,
                TokenKind::LtEq,
                TokenKind::Lt,
                TokenKind::FatArrow,
                TokenKind::Assign,
                TokenKind::DotDotDot,
                TokenKind::Dot,
                TokenKind::QuestionQuestion,
                TokenKind::Question,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_keywords_and_idents() {
        assert_eq!(
            kinds("let lettuce _x $y"),
            vec![
                TokenKind::Let,
                TokenKind::Ident("lettuce".to_string()),
                TokenKind::Ident("_x".to_string()),
                TokenKind::Ident("$y".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_string_escapes() {
        assert_eq!(
            kinds(r#""a\nb\t\\\"""#),
            vec![
                TokenKind::StringLit("a\nb\t\\\"".to_string()),
                TokenKind::Eof
            ]
        );
        // Unknown escapes pass the character through.
        assert_eq!(
            kinds(r#""\q""#),
            vec![TokenKind::StringLit("q".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_single_quoted() {
        assert_eq!(
            kinds("'it\\'s'"),
            vec![TokenKind::StringLit("it's".to_string()), TokenKind::Eof]
        );
    }

    #[test]
    fn lex_template_is_one_token() {
        assert_eq!(
            kinds("`a ${b} c`"),
            vec![
                TokenKind::TemplateLit("a ${b} c".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_unterminated_string() {
        let err = Lexer::new("\"abc").tokenize().unwrap_err();
        match err {
            LexError::UnterminatedString { span } => {
                assert_eq!(span.start.col, 1);
            }
            other => panic!("expected UnterminatedString, got {:?}", other),
        }
    }

    #[test]
    fn lex_comments_discarded() {
        assert_eq!(
            kinds("1 // comment\n2"),
            vec![
                TokenKind::NumberLit(1.0),
                TokenKind::NumberLit(2.0),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lex_stray_character_is_invalid_token() {
        assert_eq!(
            kinds("a # b"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Invalid('#'),
                TokenKind::Ident("b".to_string()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn spans_cover_source_minus_trivia() {
        let src = "let x = 1; // trailing\nx + 2";
        let tokens = Lexer::new(src).tokenize().expect("lex failed");
        let covered: usize = tokens.iter().map(|t| t.span.len()).sum();
        let expected: usize = src
            .lines()
            .map(|l| l.split("//").next().unwrap_or(""))
            .map(|l| l.chars().filter(|c| !c.is_whitespace()).map(|c| c.len_utf8()).sum::<usize>())
            .sum();
        assert_eq!(covered, expected);
        // No token's range is empty except EOF.
        for tok in &tokens {
            if tok.kind == TokenKind::Eof {
                assert!(tok.span.is_empty());
            } else {
                assert!(!tok.span.is_empty(), "empty span for {:?}", tok.kind);
            }
        }
    }

    #[test]
    fn spans_track_lines_and_cols() {
        let tokens = Lexer::new("a\n  bb").tokenize().expect("lex failed");
        assert_eq!(tokens[0].span.start, Pos::new(1, 1, 0));
        assert_eq!(tokens[1].span.start, Pos::new(2, 3, 4));
        assert_eq!(tokens[1].span.end, Pos::new(2, 5, 6));
    }
}
