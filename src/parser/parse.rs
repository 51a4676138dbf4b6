//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing infrastructure,
//! including error types, helper methods, and the main parse entry point.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following organization:
//! - This module: Parser struct, token lookahead, helper methods, and coordination
//! - `declarations`: function and variable declarations, type specifiers
//! - `statements`: statements and blocks, loop-label binding
//! - `expressions`: expressions with precedence climbing
//!
//! # Token Supply
//!
//! Tokens are pulled from the [`Lexer`] on demand into a small lookahead
//! buffer. The grammar needs one token of lookahead almost everywhere and two
//! in exactly two places: labeled statements (`ident :`) and casts
//! (`( type`). A lexical error surfaces the moment the offending token is
//! pulled.
//!
//! # Implementation
//!
//! Parser methods are split across multiple files using `impl Parser` blocks,
//! allowing each module to extend the Parser with related functionality while
//! maintaining access to the shared parser state.

use crate::config::FrontendConfig;
use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// The two families of front-end failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Lexical,
    Syntax,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "lexical"),
            ErrorKind::Syntax => write!(f, "syntax"),
        }
    }
}

/// A token sequence no grammar rule accepts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("expected {expected}, found {}", describe(.found, .lexeme))]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        lexeme: String,
        span: Span,
    },

    #[error("expected {expected}, found end of file")]
    UnexpectedEof { expected: String, span: Span },

    #[error(
        "expected {delimiter} to close {} opened at line {}, column {}, found {}",
        opening(.delimiter),
        .opener.line,
        .opener.column,
        describe(.found, .lexeme)
    )]
    UnclosedDelimiter {
        delimiter: TokenKind,
        opener: Span,
        found: TokenKind,
        lexeme: String,
        span: Span,
    },

    #[error("{keyword} statement not within {}", jump_scope(.keyword))]
    JumpOutsideLoop { keyword: TokenKind, span: Span },

    #[error("{keyword} label not within a switch statement")]
    CaseOutsideSwitch { keyword: TokenKind, span: Span },

    #[error("{message}")]
    InvalidTypeSpecifier { message: String, span: Span },

    #[error("nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize, span: Span },
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::UnexpectedToken { span, .. }
            | SyntaxError::UnexpectedEof { span, .. }
            | SyntaxError::UnclosedDelimiter { span, .. }
            | SyntaxError::JumpOutsideLoop { span, .. }
            | SyntaxError::CaseOutsideSwitch { span, .. }
            | SyntaxError::InvalidTypeSpecifier { span, .. }
            | SyntaxError::NestingTooDeep { span, .. } => *span,
        }
    }

    /// Kind of the offending token, when one was found
    pub fn found(&self) -> Option<TokenKind> {
        match self {
            SyntaxError::UnexpectedToken { found, .. }
            | SyntaxError::UnclosedDelimiter { found, .. } => Some(*found),
            SyntaxError::UnexpectedEof { .. } => Some(TokenKind::Eof),
            SyntaxError::JumpOutsideLoop { keyword, .. }
            | SyntaxError::CaseOutsideSwitch { keyword, .. } => Some(*keyword),
            SyntaxError::InvalidTypeSpecifier { .. } | SyntaxError::NestingTooDeep { .. } => None,
        }
    }
}

fn describe(kind: &TokenKind, lexeme: &str) -> String {
    match *kind {
        TokenKind::Eof => "end of file".to_string(),
        TokenKind::Identifier => format!("identifier '{lexeme}'"),
        kind if kind.is_category() => format!("{} {lexeme}", kind.as_str()),
        _ => format!("'{lexeme}'"),
    }
}

fn jump_scope(keyword: &TokenKind) -> &'static str {
    match keyword {
        TokenKind::Continue => "a loop",
        _ => "a loop or switch",
    }
}

fn opening(delimiter: &TokenKind) -> &'static str {
    match *delimiter {
        TokenKind::RParen => "'('",
        TokenKind::RBrace => "'{'",
        _ => "delimiter",
    }
}

/// Parser error type: the first lexical or syntax error of a parse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(
        "syntax error at line {line}, column {column}: {0}",
        line = .0.span().line,
        column = .0.span().column
    )]
    Syntax(#[from] SyntaxError),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Lex(_) => ErrorKind::Lexical,
            ParseError::Syntax(_) => ErrorKind::Syntax,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::Lex(err) => err.span,
            ParseError::Syntax(err) => err.span(),
        }
    }
}

/// Build the error for `token` appearing where `expected` was required
pub(crate) fn unexpected(token: Token<'_>, expected: impl Into<String>) -> ParseError {
    let expected = expected.into();
    let err = if token.kind == TokenKind::Eof {
        SyntaxError::UnexpectedEof {
            expected,
            span: token.span,
        }
    } else {
        SyntaxError::UnexpectedToken {
            expected,
            found: token.kind,
            lexeme: token.lexeme.to_string(),
            span: token.span,
        }
    };
    err.into()
}

/// Recursive descent parser for the C subset
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    lookahead: VecDeque<Token<'src>>,
    previous_span: Span,
    next_label: u32,
    depth: usize,
    max_depth: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self::with_config(source, &FrontendConfig::default())
    }

    pub fn with_config(source: &'src str, config: &FrontendConfig) -> Self {
        Self {
            lexer: Lexer::from_config(source, config),
            lookahead: VecDeque::with_capacity(2),
            previous_span: Span::default(),
            next_label: 0,
            depth: 0,
            max_depth: config.max_nesting_depth,
        }
    }

    /// Parse the entire translation unit (top-level declarations)
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let start = self.peek()?.span;
        let mut program = Program::new();

        while !self.is_at_end()? {
            let decl = self.parse_top_level_declaration()?;
            tracing::trace!(name = decl.name(), "parsed top-level declaration");
            program.declarations.push(decl);
        }

        program.span = self.span_from(start);
        Ok(program)
    }

    // ===== Token supply =====

    fn fill(&mut self, n: usize) -> Result<(), ParseError> {
        while self.lookahead.len() <= n {
            let token = self.lexer.next_token()?;
            self.lookahead.push_back(token);
        }
        Ok(())
    }

    pub(crate) fn peek(&mut self) -> Result<Token<'src>, ParseError> {
        self.peek_nth(0)
    }

    /// Token `n` positions past the current one (0 = current)
    pub(crate) fn peek_nth(&mut self, n: usize) -> Result<Token<'src>, ParseError> {
        self.fill(n)?;
        Ok(self.lookahead[n])
    }

    pub(crate) fn peek_kind(&mut self) -> Result<TokenKind, ParseError> {
        Ok(self.peek()?.kind)
    }

    pub(crate) fn advance(&mut self) -> Result<Token<'src>, ParseError> {
        self.fill(0)?;
        let token = self.lookahead[0];
        // End of input is sticky; the lexer hands it out again on demand
        self.lookahead.pop_front();
        self.previous_span = token.span;
        Ok(token)
    }

    // ===== Helper methods =====

    pub(crate) fn is_at_end(&mut self) -> Result<bool, ParseError> {
        self.check(TokenKind::Eof)
    }

    pub(crate) fn check(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        Ok(self.peek_kind()? == kind)
    }

    pub(crate) fn match_token(&mut self, kind: TokenKind) -> Result<bool, ParseError> {
        if self.check(kind)? {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Span from `start` through the last consumed token
    pub(crate) fn span_from(&self, start: Span) -> Span {
        start.to(self.previous_span)
    }

    pub(crate) fn expect_token(
        &mut self,
        kind: TokenKind,
        context: &str,
    ) -> Result<Token<'src>, ParseError> {
        let token = self.peek()?;
        if token.kind == kind {
            self.advance()
        } else {
            Err(unexpected(token, format!("{kind} {context}")))
        }
    }

    pub(crate) fn expect_semicolon(&mut self, context: &str) -> Result<Token<'src>, ParseError> {
        self.expect_token(TokenKind::Semicolon, context)
    }

    /// Consume the closing delimiter matching the opener at `opener`
    pub(crate) fn expect_closing(
        &mut self,
        delimiter: TokenKind,
        opener: Span,
    ) -> Result<Token<'src>, ParseError> {
        let token = self.peek()?;
        if token.kind == delimiter {
            return self.advance();
        }
        Err(SyntaxError::UnclosedDelimiter {
            delimiter,
            opener,
            found: token.kind,
            lexeme: token.lexeme.to_string(),
            span: token.span,
        }
        .into())
    }

    pub(crate) fn expect_identifier(&mut self, context: &str) -> Result<Token<'src>, ParseError> {
        let token = self.peek()?;
        if token.kind == TokenKind::Identifier {
            self.advance()
        } else {
            Err(unexpected(token, format!("identifier {context}")))
        }
    }

    /// Allocate a fresh label for a loop or switch
    pub(crate) fn fresh_label(&mut self) -> LoopLabel {
        let label = LoopLabel(self.next_label);
        self.next_label += 1;
        label
    }

    /// Enter one nesting level, failing once the configured limit is
    /// reached. Every successful call is paired with [`Parser::leave`].
    pub(crate) fn enter(&mut self) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            let span = self.peek()?.span;
            return Err(SyntaxError::NestingTooDeep {
                limit: self.max_depth,
                span,
            }
            .into());
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }
}
