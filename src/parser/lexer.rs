//! Lexer (tokenizer) for preprocessed C source
//!
//! Converts raw source text into a lazy stream of [`Token`]s consumed by the
//! parser one at a time. Whitespace, comments and preprocessor line markers
//! (`# 1 "file.c"`) are skipped; everything else must form a token or the
//! lexer reports a [`LexError`] and stops.
//!
//! Tokens borrow their lexeme from the source, so the lexeme of every token
//! plus the skipped text between tokens reconstructs the input exactly.
//! Literal values are decoded with [`decode_integer`], [`decode_float`],
//! [`decode_char`] and [`decode_string`]; the lexer runs the same decoders
//! while scanning, so a token that escapes the lexer always decodes.

use crate::config::FrontendConfig;
use crate::parser::ast::IntSuffix;
use crate::span::{Position, Span};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

/// Token categories produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Identifiers and literals
    Identifier,
    IntLiteral,
    FloatLiteral,
    CharLiteral,
    StringLiteral,

    // Keywords
    Int,
    Long,
    Unsigned,
    Signed,
    Char,
    Double,
    Void,
    Return,
    If,
    Else,
    Do,
    While,
    For,
    Break,
    Continue,
    Switch,
    Case,
    Default,
    Goto,
    Static,
    Extern,

    // Arithmetic
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    PlusPlus,   // ++
    MinusMinus, // --

    // Comparison
    EqEq,  // ==
    NotEq, // !=
    Lt,    // <
    Le,    // <=
    Gt,    // >
    Ge,    // >=

    // Logical
    AndAnd, // &&
    OrOr,   // ||
    Bang,   // !

    // Bitwise
    Amp,   // &
    Pipe,  // |
    Caret, // ^
    Tilde, // ~
    LtLt,  // <<
    GtGt,  // >>

    // Assignment
    Eq,        // =
    PlusEq,    // +=
    MinusEq,   // -=
    StarEq,    // *=
    SlashEq,   // /=
    PercentEq, // %=
    AmpEq,     // &=
    PipeEq,    // |=
    CaretEq,   // ^=
    LtLtEq,    // <<=
    GtGtEq,    // >>=

    // Ternary
    Question, // ?
    Colon,    // :

    // Punctuation
    LParen,    // (
    RParen,    // )
    LBrace,    // {
    RBrace,    // }
    Semicolon, // ;
    Comma,     // ,

    Eof,
}

impl TokenKind {
    /// Source spelling for fixed tokens, category name for the rest.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "floating literal",
            TokenKind::CharLiteral => "character literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::Int => "int",
            TokenKind::Long => "long",
            TokenKind::Unsigned => "unsigned",
            TokenKind::Signed => "signed",
            TokenKind::Char => "char",
            TokenKind::Double => "double",
            TokenKind::Void => "void",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::Do => "do",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Break => "break",
            TokenKind::Continue => "continue",
            TokenKind::Switch => "switch",
            TokenKind::Case => "case",
            TokenKind::Default => "default",
            TokenKind::Goto => "goto",
            TokenKind::Static => "static",
            TokenKind::Extern => "extern",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Bang => "!",
            TokenKind::Amp => "&",
            TokenKind::Pipe => "|",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::LtLt => "<<",
            TokenKind::GtGt => ">>",
            TokenKind::Eq => "=",
            TokenKind::PlusEq => "+=",
            TokenKind::MinusEq => "-=",
            TokenKind::StarEq => "*=",
            TokenKind::SlashEq => "/=",
            TokenKind::PercentEq => "%=",
            TokenKind::AmpEq => "&=",
            TokenKind::PipeEq => "|=",
            TokenKind::CaretEq => "^=",
            TokenKind::LtLtEq => "<<=",
            TokenKind::GtGtEq => ">>=",
            TokenKind::Question => "?",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Eof => "end of file",
        }
    }

    /// Whether the kind is a category (identifier, literal, end of file)
    /// rather than a single fixed spelling.
    pub fn is_category(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::CharLiteral
                | TokenKind::StringLiteral
                | TokenKind::Eof
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_category() {
            write!(f, "{}", self.as_str())
        } else {
            write!(f, "'{}'", self.as_str())
        }
    }
}

static KEYWORDS: LazyLock<FxHashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    [
        ("int", TokenKind::Int),
        ("long", TokenKind::Long),
        ("unsigned", TokenKind::Unsigned),
        ("signed", TokenKind::Signed),
        ("char", TokenKind::Char),
        ("double", TokenKind::Double),
        ("void", TokenKind::Void),
        ("return", TokenKind::Return),
        ("if", TokenKind::If),
        ("else", TokenKind::Else),
        ("do", TokenKind::Do),
        ("while", TokenKind::While),
        ("for", TokenKind::For),
        ("break", TokenKind::Break),
        ("continue", TokenKind::Continue),
        ("switch", TokenKind::Switch),
        ("case", TokenKind::Case),
        ("default", TokenKind::Default),
        ("goto", TokenKind::Goto),
        ("static", TokenKind::Static),
        ("extern", TokenKind::Extern),
    ]
    .into_iter()
    .collect()
});

/// A single lexical unit. `lexeme` is the exact source text the token covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub span: Span,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "identifier '{}'", self.lexeme),
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral => write!(f, "{} {}", self.kind.as_str(), self.lexeme),
            TokenKind::Eof => write!(f, "end of file"),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// What went wrong while scanning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unexpected character '{}'", .0.escape_default())]
    UnexpectedChar(char),
    #[error("malformed numeric literal '{0}'")]
    MalformedNumber(String),
    #[error("integer literal '{0}' is too large")]
    IntegerTooLarge(String),
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("empty character literal")]
    EmptyChar,
    #[error("character literal holds more than one character")]
    MultiCharLiteral,
    #[error("unknown escape sequence '\\{0}'")]
    UnknownEscape(char),
    #[error("invalid escape sequence '{0}'")]
    InvalidEscape(String),
}

/// Lexer error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lexical error at line {}, column {}: {}", .span.line, .span.column, .kind)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub span: Span,
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Lexer for preprocessed C source
pub struct Lexer<'src> {
    source: &'src str,
    pos: Position,
    skip_line_markers: bool,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a lexer at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self::starting_at(source, Position::default())
    }

    /// Create a lexer that begins scanning at `start`. Used to restart past
    /// an error; `start` must lie on a character boundary.
    pub fn starting_at(source: &'src str, start: Position) -> Self {
        Self {
            source,
            pos: start,
            skip_line_markers: true,
            finished: false,
        }
    }

    pub fn from_config(source: &'src str, config: &FrontendConfig) -> Self {
        Self::new(source).with_line_markers_skipped(config.skip_line_markers)
    }

    pub fn with_line_markers_skipped(mut self, skip: bool) -> Self {
        self.skip_line_markers = skip;
        self
    }

    /// Position of the next unscanned character.
    pub fn position(&self) -> Position {
        self.pos
    }

    /// Scan the next token. Once the input is exhausted every call returns
    /// the end-of-input token.
    pub fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        self.skip_whitespace_and_comments()?;

        let start = self.pos;
        let Some(ch) = self.advance() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        let kind = match ch {
            '0'..='9' => self.number_literal(start)?,
            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.number_literal(start)?
            }
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(start),
            '\'' => self.char_literal(start)?,
            '"' => self.string_literal(start)?,

            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else {
                    TokenKind::Minus
                }
            }
            '*' => self.with_eq(TokenKind::StarEq, TokenKind::Star),
            '/' => self.with_eq(TokenKind::SlashEq, TokenKind::Slash),
            '%' => self.with_eq(TokenKind::PercentEq, TokenKind::Percent),
            '^' => self.with_eq(TokenKind::CaretEq, TokenKind::Caret),
            '=' => self.with_eq(TokenKind::EqEq, TokenKind::Eq),
            '!' => self.with_eq(TokenKind::NotEq, TokenKind::Bang),
            '<' => {
                if self.eat('<') {
                    self.with_eq(TokenKind::LtLtEq, TokenKind::LtLt)
                } else {
                    self.with_eq(TokenKind::Le, TokenKind::Lt)
                }
            }
            '>' => {
                if self.eat('>') {
                    self.with_eq(TokenKind::GtGtEq, TokenKind::GtGt)
                } else {
                    self.with_eq(TokenKind::Ge, TokenKind::Gt)
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    self.with_eq(TokenKind::AmpEq, TokenKind::Amp)
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    self.with_eq(TokenKind::PipeEq, TokenKind::Pipe)
                }
            }
            '~' => TokenKind::Tilde,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            _ => {
                let span = self.span_from(start);
                // Leave the offending character unconsumed
                self.pos = start;
                return Err(LexError::new(LexErrorKind::UnexpectedChar(ch), span));
            }
        };

        Ok(self.token(kind, start))
    }

    fn token(&self, kind: TokenKind, start: Position) -> Token<'src> {
        let source = self.source;
        Token {
            kind,
            lexeme: &source[start.offset..self.pos.offset],
            span: self.span_from(start),
        }
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.pos.offset - start.offset)
    }

    fn fail(&mut self, kind: LexErrorKind, start: Position) -> LexError {
        let err = LexError::new(kind, self.span_from(start));
        self.pos = start;
        err
    }

    fn with_eq(&mut self, with: TokenKind, without: TokenKind) -> TokenKind {
        if self.eat('=') {
            with
        } else {
            without
        }
    }

    /// Scan a numeric literal as a C preprocessing number (digits, letters,
    /// `.`, and signs after an exponent marker), then decode it. Anything the
    /// decoders reject is a malformed literal covering the whole run.
    fn number_literal(&mut self, start: Position) -> Result<TokenKind, LexError> {
        let mut prev = self.source[start.offset..self.pos.offset]
            .chars()
            .last()
            .unwrap_or('0');
        while let Some(ch) = self.peek() {
            let exponent_sign = matches!(ch, '+' | '-') && matches!(prev, 'e' | 'E');
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || exponent_sign {
                self.advance();
                prev = ch;
            } else {
                break;
            }
        }

        let lexeme = &self.source[start.offset..self.pos.offset];
        match classify_number(lexeme) {
            Ok(kind) => Ok(kind),
            Err(kind) => Err(self.fail(kind, start)),
        }
    }

    fn identifier_or_keyword(&mut self, start: Position) -> TokenKind {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let ident = &self.source[start.offset..self.pos.offset];
        KEYWORDS
            .get(ident)
            .copied()
            .unwrap_or(TokenKind::Identifier)
    }

    fn char_literal(&mut self, start: Position) -> Result<TokenKind, LexError> {
        self.quoted_literal('\'', LexErrorKind::UnterminatedChar, start)?;
        let lexeme = &self.source[start.offset..self.pos.offset];
        match decode_char(lexeme) {
            Ok(_) => Ok(TokenKind::CharLiteral),
            Err(kind) => Err(self.fail(kind, start)),
        }
    }

    fn string_literal(&mut self, start: Position) -> Result<TokenKind, LexError> {
        self.quoted_literal('"', LexErrorKind::UnterminatedString, start)?;
        let lexeme = &self.source[start.offset..self.pos.offset];
        match decode_string(lexeme) {
            Ok(_) => Ok(TokenKind::StringLiteral),
            Err(kind) => Err(self.fail(kind, start)),
        }
    }

    /// Consume up to and including the closing `quote`. Literals may not span
    /// lines; an unterminated literal's span runs to the end of its line.
    fn quoted_literal(
        &mut self,
        quote: char,
        unterminated: LexErrorKind,
        start: Position,
    ) -> Result<(), LexError> {
        loop {
            match self.peek() {
                None | Some('\n') => return Err(self.fail(unterminated, start)),
                Some('\\') => {
                    self.advance();
                    if matches!(self.peek(), None | Some('\n')) {
                        return Err(self.fail(unterminated, start));
                    }
                    self.advance();
                }
                Some(ch) => {
                    self.advance();
                    if ch == quote {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Skip whitespace, comments and preprocessor line markers
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c') => {
                    self.advance();
                }
                Some('/') if self.peek_ahead(1) == Some('/') => self.skip_line(),
                Some('/') if self.peek_ahead(1) == Some('*') => self.skip_block_comment()?,
                Some('#') if self.skip_line_markers && self.at_line_start() => self.skip_line(),
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip through the end of the current line, leaving the newline.
    fn skip_line(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.advance(); // skip '/'
        self.advance(); // skip '*'

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }

        // The rest of the file is swallowed by the comment
        Err(self.fail(LexErrorKind::UnterminatedComment, start))
    }

    /// Only blanks precede the current position on its line.
    fn at_line_start(&self) -> bool {
        self.source[..self.pos.offset]
            .rsplit('\n')
            .next()
            .map_or(true, |line| line.trim().is_empty())
    }

    fn rest(&self) -> &'src str {
        let source = self.source;
        &source[self.pos.offset..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos.offset += ch.len_utf8();
        if ch == '\n' {
            self.pos.line += 1;
            self.pos.column = 1;
        } else {
            self.pos.column += 1;
        }
        Some(ch)
    }

    fn is_at_end(&self) -> bool {
        self.pos.offset >= self.source.len()
    }
}

/// Yields tokens up to and including end-of-input. The first error ends the
/// stream; restart with [`Lexer::starting_at`] to scan further.
impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        match &result {
            Ok(token) if token.kind != TokenKind::Eof => {}
            _ => self.finished = true,
        }
        Some(result)
    }
}

/// Tokenize a whole source text, stopping at the first lexical error.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(source).collect()
}

/// Tokenize a whole source text, restarting just past each lexical error so
/// every error in the file is reported.
pub fn scan_all(source: &str) -> (Vec<Token<'_>>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = Lexer::new(source);

    loop {
        match lexer.next_token() {
            Ok(token) => {
                tokens.push(token);
                if token.kind == TokenKind::Eof {
                    break;
                }
            }
            Err(err) => {
                let resume = err.span.start().advanced_over(err.span.text(source));
                errors.push(err);
                lexer = Lexer::starting_at(source, resume);
            }
        }
    }

    (tokens, errors)
}

fn classify_number(lexeme: &str) -> Result<TokenKind, LexErrorKind> {
    let hex = lexeme.starts_with("0x") || lexeme.starts_with("0X");
    let looks_float = lexeme.contains('.') || (!hex && lexeme.contains(['e', 'E']));

    if looks_float {
        decode_float(lexeme).map(|_| TokenKind::FloatLiteral)
    } else {
        decode_integer(lexeme).map(|_| TokenKind::IntLiteral)
    }
}

/// Decode an integer literal lexeme into its value and suffix.
pub fn decode_integer(lexeme: &str) -> Result<(u64, IntSuffix), LexErrorKind> {
    let malformed = || LexErrorKind::MalformedNumber(lexeme.to_string());

    let (radix, body) = if let Some(hex) = lexeme
        .strip_prefix("0x")
        .or_else(|| lexeme.strip_prefix("0X"))
    {
        (16, hex)
    } else if lexeme.len() > 1
        && lexeme.starts_with('0')
        && lexeme[1..].starts_with(|c: char| c.is_ascii_digit())
    {
        (8, &lexeme[1..])
    } else {
        (10, lexeme)
    };

    let digits_end = body
        .find(|c: char| !c.is_ascii_hexdigit() || (radix != 16 && !c.is_ascii_digit()))
        .unwrap_or(body.len());
    let (digits, suffix) = body.split_at(digits_end);

    if digits.is_empty() {
        return Err(malformed());
    }
    let suffix = parse_int_suffix(suffix).ok_or_else(malformed)?;

    match u64::from_str_radix(digits, radix) {
        Ok(value) => Ok((value, suffix)),
        Err(_) if digits.chars().all(|c| c.is_digit(radix)) => {
            Err(LexErrorKind::IntegerTooLarge(lexeme.to_string()))
        }
        Err(_) => Err(malformed()),
    }
}

fn parse_int_suffix(suffix: &str) -> Option<IntSuffix> {
    let (unsigned, rest) = if let Some(rest) = suffix.strip_prefix(['u', 'U']) {
        (true, rest)
    } else if let Some(rest) = suffix.strip_suffix(['u', 'U']) {
        (true, rest)
    } else {
        (false, suffix)
    };

    let long = match rest {
        "" => false,
        "l" | "L" | "ll" | "LL" => true,
        _ => return None,
    };

    Some(IntSuffix { unsigned, long })
}

/// Decode a floating literal lexeme (`1.5`, `.5`, `1.`, `1e10`, `2.5E-3f`).
pub fn decode_float(lexeme: &str) -> Result<f64, LexErrorKind> {
    let malformed = || LexErrorKind::MalformedNumber(lexeme.to_string());

    let body = lexeme
        .strip_suffix(['f', 'F', 'l', 'L'])
        .unwrap_or(lexeme);

    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let (whole, fraction) = match mantissa.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (mantissa, None),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    let fraction_digits = fraction.unwrap_or("");
    if !all_digits(whole)
        || !all_digits(fraction_digits)
        || (whole.is_empty() && fraction_digits.is_empty())
        || (fraction.is_none() && exponent.is_none())
    {
        return Err(malformed());
    }

    if let Some(exp) = exponent {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if digits.is_empty() || !all_digits(digits) {
            return Err(malformed());
        }
    }

    body.parse::<f64>().map_err(|_| malformed())
}

/// Decode a character literal lexeme (including its quotes) into its byte.
pub fn decode_char(lexeme: &str) -> Result<u8, LexErrorKind> {
    let body = lexeme
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .ok_or(LexErrorKind::UnterminatedChar)?;

    match unescape(body)?.as_slice() {
        [] => Err(LexErrorKind::EmptyChar),
        [byte] => Ok(*byte),
        _ => Err(LexErrorKind::MultiCharLiteral),
    }
}

/// Decode a string literal lexeme (including its quotes) into its bytes.
pub fn decode_string(lexeme: &str) -> Result<Vec<u8>, LexErrorKind> {
    let body = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or(LexErrorKind::UnterminatedString)?;

    unescape(body)
}

fn unescape(body: &str) -> Result<Vec<u8>, LexErrorKind> {
    let mut bytes = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            let mut buf = [0; 4];
            bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            continue;
        }

        let escaped = chars.next().ok_or(LexErrorKind::UnknownEscape(' '))?;
        let byte = match escaped {
            'n' => b'\n',
            't' => b'\t',
            'r' => b'\r',
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'v' => 0x0b,
            '\\' => b'\\',
            '\'' => b'\'',
            '"' => b'"',
            '?' => b'?',
            '0'..='7' => {
                let mut digits = String::from(escaped);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(&c) if c.is_digit(8) => {
                            digits.push(c);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                u32::from_str_radix(&digits, 8)
                    .ok()
                    .and_then(|v| u8::try_from(v).ok())
                    .ok_or_else(|| LexErrorKind::InvalidEscape(format!("\\{digits}")))?
            }
            'x' => {
                let mut digits = String::new();
                while let Some(&c) = chars.peek() {
                    if !c.is_ascii_hexdigit() {
                        break;
                    }
                    digits.push(c);
                    chars.next();
                }
                u8::from_str_radix(&digits, 16)
                    .map_err(|_| LexErrorKind::InvalidEscape(format!("\\x{digits}")))?
            }
            other => return Err(LexErrorKind::UnknownEscape(other)),
        };
        bytes.push(byte);
    }

    Ok(bytes)
}
