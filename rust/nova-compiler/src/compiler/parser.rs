//! Recursive descent parser with Pratt expression parsing for NovaLang.

use crate::compiler::ast::*;
use crate::compiler::tokens::{Span, Token, TokenKind};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected token {found} at {span}; expected {expected}")]
    Unexpected {
        found: String,
        expected: String,
        span: Span,
    },
    #[error("unexpected end of input at {span}")]
    UnexpectedEof { span: Span },
    #[error("invalid assignment target at {span}")]
    InvalidAssignTarget { span: Span },
    #[error("invalid destructuring pattern at {span}")]
    InvalidPattern { span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::Unexpected { span, .. }
            | ParseError::UnexpectedEof { span }
            | ParseError::InvalidAssignTarget { span }
            | ParseError::InvalidPattern { span } => *span,
        }
    }
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn current(&self) -> &Token {
        self.tokens
            .get(self.pos)
            .unwrap_or_else(|| self.tokens.last().expect("token stream ends with EOF"))
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_n_kind(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + n).map(|t| &t.kind)
    }

    fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        if tok.kind == TokenKind::Eof {
            ParseError::UnexpectedEof { span: tok.span }
        } else {
            ParseError::Unexpected {
                found: format!("{}", tok.kind),
                expected: expected.to_string(),
                span: tok.span,
            }
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&format!("'{}'", kind)))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, Span), ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok((name, span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// `;`, or a block boundary (`}` / EOF), terminates a statement.
    fn expect_semi(&mut self) -> Result<(), ParseError> {
        match self.peek_kind() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("';'")),
        }
    }

    // ── Program & statements ──

    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let start = self.current().span;
        let mut body = Vec::new();
        while !self.at_end() {
            body.push(self.parse_stmt()?);
        }
        let span = start.merge(self.prev_span());
        Ok(Program { body, span })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind() {
            TokenKind::Let | TokenKind::Const => self.parse_var_decl_stmt(),
            TokenKind::Function => self.parse_function_decl(),
            TokenKind::LBrace => {
                let start = self.current().span;
                let body = self.parse_block()?;
                let span = start.merge(self.prev_span());
                Ok(Stmt::Block(BlockStmt { body, span }))
            }
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::Do => self.parse_do_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Break => {
                let span = self.advance().span;
                self.expect_semi()?;
                Ok(Stmt::Break(BreakStmt { span }))
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                self.expect_semi()?;
                Ok(Stmt::Continue(ContinueStmt { span }))
            }
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Try => self.parse_try(),
            TokenKind::Throw => {
                let start = self.advance().span;
                let value = self.parse_expr(0)?;
                let span = start.merge(value.span());
                self.expect_semi()?;
                Ok(Stmt::Throw(ThrowStmt { value, span }))
            }
            _ => {
                let expr = self.parse_expr(0)?;
                let span = expr.span();
                self.expect_semi()?;
                Ok(Stmt::Expr(ExprStmt { expr, span }))
            }
        }
    }

    /// `{ stmt* }`
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        self.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace | TokenKind::Eof) {
            body.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(body)
    }

    fn parse_var_decl_stmt(&mut self) -> Result<Stmt, ParseError> {
        let decl = self.parse_var_decl_body()?;
        self.expect_semi()?;
        Ok(Stmt::VarDecl(decl))
    }

    fn parse_var_decl_body(&mut self) -> Result<VarDeclStmt, ParseError> {
        let start = self.current().span;
        let kind = match self.advance().kind {
            TokenKind::Const => DeclKind::Const,
            _ => DeclKind::Let,
        };
        let mut declarators = Vec::new();
        loop {
            let pattern = self.parse_pattern()?;
            let init = if matches!(self.peek_kind(), TokenKind::Assign) {
                self.advance();
                Some(self.parse_expr(0)?)
            } else {
                None
            };
            // `const` and destructuring declarators must be initialized.
            if init.is_none() && (kind == DeclKind::Const || !matches!(pattern, Pattern::Ident(..)))
            {
                return Err(self.unexpected("'='"));
            }
            let span = pattern
                .span()
                .merge(init.as_ref().map(|e| e.span()).unwrap_or(pattern.span()));
            declarators.push(Declarator {
                pattern,
                init,
                span,
            });
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        let span = start.merge(self.prev_span());
        Ok(VarDeclStmt {
            kind,
            declarators,
            span,
        })
    }

    fn parse_function_decl(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // `function`
        let (name, _) = self.expect_ident()?;
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let span = start.merge(self.prev_span());
        Ok(Stmt::FunctionDecl(FunctionDeclStmt {
            name,
            params,
            body,
            span,
        }))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // `if`
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr(0)?;
        self.expect(&TokenKind::RParen)?;
        let then_branch = Box::new(self.parse_stmt()?);
        let else_branch = if matches!(self.peek_kind(), TokenKind::Else) {
            self.advance();
            Some(Box::new(self.parse_stmt()?))
        } else {
            None
        };
        let span = start.merge(self.prev_span());
        Ok(Stmt::If(IfStmt {
            test,
            then_branch,
            else_branch,
            span,
        }))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // `while`
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr(0)?;
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        let span = start.merge(self.prev_span());
        Ok(Stmt::While(WhileStmt { test, body, span }))
    }

    fn parse_do_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // `do`
        let body = Box::new(self.parse_stmt()?);
        self.expect(&TokenKind::While)?;
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expr(0)?;
        self.expect(&TokenKind::RParen)?;
        self.expect_semi()?;
        let span = start.merge(self.prev_span());
        Ok(Stmt::DoWhile(DoWhileStmt { body, test, span }))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // `for`
        self.expect(&TokenKind::LParen)?;
        let init = match self.peek_kind() {
            TokenKind::Semicolon => None,
            TokenKind::Let | TokenKind::Const => {
                Some(ForInit::VarDecl(self.parse_var_decl_body()?))
            }
            _ => Some(ForInit::Expr(self.parse_expr(0)?)),
        };
        self.expect(&TokenKind::Semicolon)?;
        let test = if matches!(self.peek_kind(), TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if matches!(self.peek_kind(), TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.expect(&TokenKind::RParen)?;
        let body = Box::new(self.parse_stmt()?);
        let span = start.merge(self.prev_span());
        Ok(Stmt::For(ForStmt {
            init,
            test,
            update,
            body,
            span,
        }))
    }

    fn parse_return(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // `return`
        let value = if matches!(
            self.peek_kind(),
            TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        ) {
            None
        } else {
            Some(self.parse_expr(0)?)
        };
        self.expect_semi()?;
        let span = start.merge(self.prev_span());
        Ok(Stmt::Return(ReturnStmt { value, span }))
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // `switch`
        self.expect(&TokenKind::LParen)?;
        let discriminant = self.parse_expr(0)?;
        self.expect(&TokenKind::RParen)?;
        self.expect(&TokenKind::LBrace)?;
        let mut cases = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::Case => {
                    let case_start = self.advance().span;
                    let test = self.parse_expr(0)?;
                    self.expect(&TokenKind::Colon)?;
                    let body = self.parse_case_body()?;
                    let span = case_start.merge(self.prev_span());
                    cases.push(SwitchCase {
                        test: Some(test),
                        body,
                        span,
                    });
                }
                TokenKind::Default => {
                    let case_start = self.advance().span;
                    self.expect(&TokenKind::Colon)?;
                    let body = self.parse_case_body()?;
                    let span = case_start.merge(self.prev_span());
                    cases.push(SwitchCase {
                        test: None,
                        body,
                        span,
                    });
                }
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                _ => return Err(self.unexpected("'case', 'default', or '}'")),
            }
        }
        let span = start.merge(self.prev_span());
        Ok(Stmt::Switch(SwitchStmt {
            discriminant,
            cases,
            span,
        }))
    }

    fn parse_case_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        while !matches!(
            self.peek_kind(),
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            body.push(self.parse_stmt()?);
        }
        Ok(body)
    }

    fn parse_try(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance().span; // `try`
        let block = self.parse_block()?;
        let handler = if matches!(self.peek_kind(), TokenKind::Catch) {
            let catch_start = self.advance().span;
            self.expect(&TokenKind::LParen)?;
            let (param, _) = self.expect_ident()?;
            self.expect(&TokenKind::RParen)?;
            let body = self.parse_block()?;
            let span = catch_start.merge(self.prev_span());
            Some(CatchClause { param, body, span })
        } else {
            None
        };
        let finalizer = if matches!(self.peek_kind(), TokenKind::Finally) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected("'catch' or 'finally'"));
        }
        let span = start.merge(self.prev_span());
        Ok(Stmt::Try(TryStmt {
            block,
            handler,
            finalizer,
            span,
        }))
    }

    // ── Patterns ──

    fn parse_pattern(&mut self) -> Result<Pattern, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                let span = self.advance().span;
                Ok(Pattern::Ident(name, span))
            }
            TokenKind::LBracket => self.parse_array_pattern(),
            TokenKind::LBrace => self.parse_object_pattern(),
            _ => Err(self.unexpected("binding pattern")),
        }
    }

    /// A pattern with an optional `= expr` default (parameter and
    /// destructuring-element position).
    fn parse_pattern_with_default(&mut self) -> Result<Pattern, ParseError> {
        let pattern = self.parse_pattern()?;
        if matches!(self.peek_kind(), TokenKind::Assign) {
            self.advance();
            let value = self.parse_expr(0)?;
            let span = pattern.span().merge(value.span());
            Ok(Pattern::Default {
                inner: Box::new(pattern),
                value: Box::new(value),
                span,
            })
        } else {
            Ok(pattern)
        }
    }

    fn parse_array_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.advance().span; // `[`
        let mut elements = Vec::new();
        let mut rest = None;
        loop {
            match self.peek_kind() {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    // Hole: `[, a]`
                    self.advance();
                    elements.push(None);
                }
                TokenKind::DotDotDot => {
                    self.advance();
                    let (name, _) = self.expect_ident()?;
                    rest = Some(name);
                    self.expect(&TokenKind::RBracket)?;
                    break;
                }
                _ => {
                    elements.push(Some(self.parse_pattern_with_default()?));
                    match self.peek_kind() {
                        TokenKind::Comma => {
                            self.advance();
                        }
                        TokenKind::RBracket => {}
                        _ => return Err(self.unexpected("',' or ']'")),
                    }
                }
            }
        }
        let span = start.merge(self.prev_span());
        Ok(Pattern::Array {
            elements,
            rest,
            span,
        })
    }

    fn parse_object_pattern(&mut self) -> Result<Pattern, ParseError> {
        let start = self.advance().span; // `{`
        let mut props = Vec::new();
        let mut rest = None;
        loop {
            match self.peek_kind().clone() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::DotDotDot => {
                    self.advance();
                    let (name, _) = self.expect_ident()?;
                    rest = Some(name);
                    self.expect(&TokenKind::RBrace)?;
                    break;
                }
                TokenKind::Ident(key) => {
                    let key_span = self.advance().span;
                    let (binding, shorthand) = match self.peek_kind() {
                        TokenKind::Colon => {
                            self.advance();
                            (self.parse_pattern_with_default()?, false)
                        }
                        TokenKind::Assign => {
                            // Shorthand with default: `{ x = 1 }`
                            self.advance();
                            let value = self.parse_expr(0)?;
                            let span = key_span.merge(value.span());
                            (
                                Pattern::Default {
                                    inner: Box::new(Pattern::Ident(key.clone(), key_span)),
                                    value: Box::new(value),
                                    span,
                                },
                                true,
                            )
                        }
                        _ => (Pattern::Ident(key.clone(), key_span), true),
                    };
                    let span = key_span.merge(self.prev_span());
                    props.push(ObjectPatternProp {
                        key,
                        binding,
                        shorthand,
                        span,
                    });
                    match self.peek_kind() {
                        TokenKind::Comma => {
                            self.advance();
                        }
                        TokenKind::RBrace => {}
                        _ => return Err(self.unexpected("',' or '}'")),
                    }
                }
                _ => return Err(self.unexpected("property name")),
            }
        }
        let span = start.merge(self.prev_span());
        Ok(Pattern::Object { props, rest, span })
    }

    /// `( pattern* [, ...rest] )` — shared by function declarations,
    /// function expressions, and parenthesized arrow heads.
    fn parse_params(&mut self) -> Result<ParamList, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut rest = None;
        while !matches!(self.peek_kind(), TokenKind::RParen) {
            if matches!(self.peek_kind(), TokenKind::DotDotDot) {
                self.advance();
                let (name, _) = self.expect_ident()?;
                rest = Some(name);
                break;
            }
            params.push(self.parse_pattern_with_default()?);
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(ParamList { params, rest })
    }

    /// Re-interpret an already-parsed expression as a binding pattern, for
    /// destructuring assignment (`[a, b] = xs`).
    fn expr_to_pattern(&self, expr: Expr) -> Result<Pattern, ParseError> {
        match expr {
            Expr::Ident(name, span) => Ok(Pattern::Ident(name, span)),
            Expr::Assign {
                target: AssignTarget::Ident(name, id_span),
                op: AssignOp::Assign,
                value,
                span,
            } => Ok(Pattern::Default {
                inner: Box::new(Pattern::Ident(name, id_span)),
                value,
                span,
            }),
            Expr::ArrayLit(elements, span) => {
                let mut out = Vec::new();
                let mut rest = None;
                let count = elements.len();
                for (i, element) in elements.into_iter().enumerate() {
                    match element {
                        None => out.push(None),
                        Some(Expr::Spread(inner, spread_span)) => {
                            if i + 1 != count {
                                return Err(ParseError::InvalidPattern { span: spread_span });
                            }
                            match *inner {
                                Expr::Ident(name, _) => rest = Some(name),
                                other => {
                                    return Err(ParseError::InvalidPattern { span: other.span() })
                                }
                            }
                        }
                        Some(other) => out.push(Some(self.expr_to_pattern(other)?)),
                    }
                }
                Ok(Pattern::Array {
                    elements: out,
                    rest,
                    span,
                })
            }
            Expr::ObjectLit(props, span) => {
                let mut out = Vec::new();
                let mut rest = None;
                let count = props.len();
                for (i, prop) in props.into_iter().enumerate() {
                    match prop {
                        ObjectProp::Shorthand { name, span } => out.push(ObjectPatternProp {
                            key: name.clone(),
                            binding: Pattern::Ident(name, span),
                            shorthand: true,
                            span,
                        }),
                        ObjectProp::KeyValue { key, value, span } => {
                            let binding = self.expr_to_pattern(value)?;
                            out.push(ObjectPatternProp {
                                key,
                                binding,
                                shorthand: false,
                                span,
                            });
                        }
                        ObjectProp::Spread { value, span } => {
                            if i + 1 != count {
                                return Err(ParseError::InvalidPattern { span });
                            }
                            match value {
                                Expr::Ident(name, _) => rest = Some(name),
                                other => {
                                    return Err(ParseError::InvalidPattern { span: other.span() })
                                }
                            }
                        }
                    }
                }
                Ok(Pattern::Object {
                    props: out,
                    rest,
                    span,
                })
            }
            other => Err(ParseError::InvalidPattern { span: other.span() }),
        }
    }

    fn to_assign_target(&self, expr: Expr, op: AssignOp) -> Result<AssignTarget, ParseError> {
        match expr {
            Expr::Ident(name, span) => Ok(AssignTarget::Ident(name, span)),
            Expr::Member(object, property, span) => {
                Ok(AssignTarget::Member(object, property, span))
            }
            Expr::Index(object, index, span) => Ok(AssignTarget::Index(object, index, span)),
            Expr::ArrayLit(..) | Expr::ObjectLit(..) if op == AssignOp::Assign => {
                Ok(AssignTarget::Pattern(self.expr_to_pattern(expr)?))
            }
            other => Err(ParseError::InvalidAssignTarget { span: other.span() }),
        }
    }

    // ── Expressions ──

    pub fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_prefix()?;
        loop {
            // Left-associative binary operators fold through the shared tail
            // below; everything with special shape gets its own arm.
            let (op, bp) = match self.peek_kind() {
                TokenKind::Assign | TokenKind::PlusAssign | TokenKind::MinusAssign => {
                    if min_bp > 4 {
                        break;
                    }
                    let assign_op = match self.peek_kind() {
                        TokenKind::PlusAssign => AssignOp::Add,
                        TokenKind::MinusAssign => AssignOp::Sub,
                        _ => AssignOp::Assign,
                    };
                    self.advance();
                    let value = self.parse_expr(3)?; // right-assoc
                    let target = self.to_assign_target(lhs, assign_op)?;
                    let span = target.span().merge(value.span());
                    lhs = Expr::Assign {
                        target,
                        op: assign_op,
                        value: Box::new(value),
                        span,
                    };
                    continue;
                }
                TokenKind::Question => {
                    if min_bp > 6 {
                        break;
                    }
                    self.advance();
                    let then_val = self.parse_expr(0)?;
                    self.expect(&TokenKind::Colon)?;
                    let else_val = self.parse_expr(5)?; // right-assoc
                    let span = lhs.span().merge(else_val.span());
                    lhs = Expr::Conditional {
                        test: Box::new(lhs),
                        then_val: Box::new(then_val),
                        else_val: Box::new(else_val),
                        span,
                    };
                    continue;
                }
                TokenKind::QuestionQuestion => {
                    if min_bp > 8 {
                        break;
                    }
                    self.advance();
                    let rhs = self.parse_expr(9)?;
                    let span = lhs.span().merge(rhs.span());
                    lhs = Expr::Logical(Box::new(lhs), LogicalOp::Coalesce, Box::new(rhs), span);
                    continue;
                }
                TokenKind::PipePipe => {
                    if min_bp > 10 {
                        break;
                    }
                    self.advance();
                    let rhs = self.parse_expr(11)?;
                    let span = lhs.span().merge(rhs.span());
                    lhs = Expr::Logical(Box::new(lhs), LogicalOp::Or, Box::new(rhs), span);
                    continue;
                }
                TokenKind::AmpAmp => {
                    if min_bp > 12 {
                        break;
                    }
                    self.advance();
                    let rhs = self.parse_expr(13)?;
                    let span = lhs.span().merge(rhs.span());
                    lhs = Expr::Logical(Box::new(lhs), LogicalOp::And, Box::new(rhs), span);
                    continue;
                }
                TokenKind::Eq => (BinOp::Eq, (14, 15)),
                TokenKind::NotEq => (BinOp::NotEq, (14, 15)),
                TokenKind::StrictEq => (BinOp::StrictEq, (14, 15)),
                TokenKind::StrictNotEq => (BinOp::StrictNotEq, (14, 15)),
                TokenKind::Lt => (BinOp::Lt, (16, 17)),
                TokenKind::LtEq => (BinOp::LtEq, (16, 17)),
                TokenKind::Gt => (BinOp::Gt, (16, 17)),
                TokenKind::GtEq => (BinOp::GtEq, (16, 17)),
                TokenKind::Plus => (BinOp::Add, (18, 19)),
                TokenKind::Minus => (BinOp::Sub, (18, 19)),
                TokenKind::Star => (BinOp::Mul, (20, 21)),
                TokenKind::Slash => (BinOp::Div, (20, 21)),
                TokenKind::Percent => (BinOp::Mod, (20, 21)),
                TokenKind::StarStar => (BinOp::Pow, (23, 22)), // right-assoc
                // Postfix: member, computed member, call
                TokenKind::Dot => {
                    if min_bp > 30 {
                        break;
                    }
                    self.advance();
                    let (property, prop_span) = self.expect_ident()?;
                    let span = lhs.span().merge(prop_span);
                    lhs = Expr::Member(Box::new(lhs), property, span);
                    continue;
                }
                TokenKind::LBracket => {
                    if min_bp > 30 {
                        break;
                    }
                    self.advance();
                    let index = self.parse_expr(0)?;
                    self.expect(&TokenKind::RBracket)?;
                    let span = lhs.span().merge(self.prev_span());
                    lhs = Expr::Index(Box::new(lhs), Box::new(index), span);
                    continue;
                }
                TokenKind::LParen => {
                    if min_bp > 30 {
                        break;
                    }
                    let args = self.parse_call_args()?;
                    let span = lhs.span().merge(self.prev_span());
                    lhs = Expr::Call(Box::new(lhs), args, span);
                    continue;
                }
                _ => break,
            };
            if min_bp > bp.0 {
                break;
            }
            self.advance();
            let rhs = self.parse_expr(bp.1)?;
            let span = lhs.span().merge(rhs.span());
            lhs = Expr::Binary(Box::new(lhs), op, Box::new(rhs), span);
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind().clone() {
            TokenKind::NumberLit(n) => {
                let span = self.advance().span;
                Ok(Expr::NumberLit(n, span))
            }
            TokenKind::StringLit(s) => {
                let span = self.advance().span;
                Ok(Expr::StringLit(s, span))
            }
            TokenKind::TemplateLit(s) => {
                let span = self.advance().span;
                Ok(Expr::TemplateLit(s, span))
            }
            TokenKind::True => {
                let span = self.advance().span;
                Ok(Expr::BoolLit(true, span))
            }
            TokenKind::False => {
                let span = self.advance().span;
                Ok(Expr::BoolLit(false, span))
            }
            TokenKind::Null => {
                let span = self.advance().span;
                Ok(Expr::NullLit(span))
            }
            TokenKind::Undefined => {
                let span = self.advance().span;
                Ok(Expr::UndefinedLit(span))
            }
            TokenKind::Ident(name) => {
                // `x => body` arrow with a bare parameter.
                if matches!(self.peek_n_kind(1), Some(TokenKind::FatArrow)) {
                    return self.parse_arrow_from_ident();
                }
                let span = self.advance().span;
                Ok(Expr::Ident(name, span))
            }
            TokenKind::Bang => {
                let start = self.advance().span;
                let operand = self.parse_expr(24)?;
                let span = start.merge(operand.span());
                Ok(Expr::Unary(UnaryOp::Not, Box::new(operand), span))
            }
            TokenKind::Minus => {
                let start = self.advance().span;
                let operand = self.parse_expr(24)?;
                let span = start.merge(operand.span());
                Ok(Expr::Unary(UnaryOp::Neg, Box::new(operand), span))
            }
            TokenKind::Plus => {
                let start = self.advance().span;
                let operand = self.parse_expr(24)?;
                let span = start.merge(operand.span());
                Ok(Expr::Unary(UnaryOp::Pos, Box::new(operand), span))
            }
            TokenKind::LParen => {
                if self.arrow_ahead() {
                    return self.parse_arrow_from_params();
                }
                self.advance();
                let expr = self.parse_expr(0)?;
                self.expect(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.parse_array_literal(),
            TokenKind::LBrace => self.parse_object_literal(),
            TokenKind::Function => self.parse_function_expr(),
            TokenKind::Eof => Err(self.unexpected("expression")),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// Bounded lookahead: does the `(` at the current position open an arrow
    /// parameter list? True when the matching `)` is followed by `=>`.
    fn arrow_ahead(&self) -> bool {
        let mut depth = 1usize;
        let mut i = self.pos + 1;
        while let Some(kind) = self.tokens.get(i).map(|t| &t.kind) {
            match kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return matches!(
                            self.tokens.get(i + 1).map(|t| &t.kind),
                            Some(TokenKind::FatArrow)
                        );
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            i += 1;
        }
        false
    }

    fn parse_arrow_from_ident(&mut self) -> Result<Expr, ParseError> {
        let (name, start) = self.expect_ident()?;
        let params = ParamList {
            params: vec![Pattern::Ident(name, start)],
            rest: None,
        };
        self.parse_arrow_tail(params, start)
    }

    fn parse_arrow_from_params(&mut self) -> Result<Expr, ParseError> {
        let start = self.current().span;
        let params = self.parse_params()?;
        self.parse_arrow_tail(params, start)
    }

    fn parse_arrow_tail(&mut self, params: ParamList, start: Span) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::FatArrow)?;
        let body = if matches!(self.peek_kind(), TokenKind::LBrace) {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_expr(3)?))
        };
        let span = start.merge(self.prev_span());
        Ok(Expr::Arrow { params, body, span })
    }

    fn parse_function_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance().span; // `function`
        let name = match self.peek_kind().clone() {
            TokenKind::Ident(n) => {
                self.advance();
                Some(n)
            }
            _ => None,
        };
        let params = self.parse_params()?;
        let body = self.parse_block()?;
        let span = start.merge(self.prev_span());
        Ok(Expr::Function {
            name,
            params,
            body,
            span,
        })
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance().span; // `[`
        let mut elements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBracket => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    // Elision: `[a, , b]`
                    self.advance();
                    elements.push(None);
                }
                TokenKind::DotDotDot => {
                    let spread_start = self.advance().span;
                    let inner = self.parse_expr(0)?;
                    let span = spread_start.merge(inner.span());
                    elements.push(Some(Expr::Spread(Box::new(inner), span)));
                    match self.peek_kind() {
                        TokenKind::Comma => {
                            self.advance();
                        }
                        TokenKind::RBracket => {}
                        _ => return Err(self.unexpected("',' or ']'")),
                    }
                }
                _ => {
                    elements.push(Some(self.parse_expr(0)?));
                    match self.peek_kind() {
                        TokenKind::Comma => {
                            self.advance();
                        }
                        TokenKind::RBracket => {}
                        _ => return Err(self.unexpected("',' or ']'")),
                    }
                }
            }
        }
        let span = start.merge(self.prev_span());
        Ok(Expr::ArrayLit(elements, span))
    }

    fn parse_object_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance().span; // `{`
        let mut props = Vec::new();
        loop {
            match self.peek_kind().clone() {
                TokenKind::RBrace => {
                    self.advance();
                    break;
                }
                TokenKind::DotDotDot => {
                    let spread_start = self.advance().span;
                    let value = self.parse_expr(0)?;
                    let span = spread_start.merge(value.span());
                    props.push(ObjectProp::Spread { value, span });
                }
                TokenKind::Ident(key) => {
                    let key_span = self.advance().span;
                    if matches!(self.peek_kind(), TokenKind::Colon) {
                        self.advance();
                        let value = self.parse_expr(0)?;
                        let span = key_span.merge(value.span());
                        props.push(ObjectProp::KeyValue { key, value, span });
                    } else {
                        props.push(ObjectProp::Shorthand {
                            name: key,
                            span: key_span,
                        });
                    }
                }
                TokenKind::StringLit(key) => {
                    let key_span = self.advance().span;
                    self.expect(&TokenKind::Colon)?;
                    let value = self.parse_expr(0)?;
                    let span = key_span.merge(value.span());
                    props.push(ObjectProp::KeyValue { key, value, span });
                }
                _ => return Err(self.unexpected("property name")),
            }
            match self.peek_kind() {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::RBrace => {}
                _ => return Err(self.unexpected("',' or '}'")),
            }
        }
        let span = start.merge(self.prev_span());
        Ok(Expr::ObjectLit(props, span))
    }

    fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect(&TokenKind::LParen)?;
        let mut args = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RParen) {
            if matches!(self.peek_kind(), TokenKind::DotDotDot) {
                let start = self.advance().span;
                let inner = self.parse_expr(0)?;
                let span = start.merge(inner.span());
                args.push(Expr::Spread(Box::new(inner), span));
            } else {
                args.push(self.parse_expr(0)?);
            }
            if matches!(self.peek_kind(), TokenKind::Comma) {
                self.advance();
            } else {
                break;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(args)
    }
}
