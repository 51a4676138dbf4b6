//! Declaration parsing implementation
//!
//! This module handles parsing of declarations:
//!
//! - Function declarations and definitions: `int add(int a, int b) { ... }`
//! - Variable declarations: `static long counter = 0;`
//! - Declaration specifiers: type keywords and storage classes in any order
//! - Type names for casts: `(unsigned long *)`
//!
//! # Grammar
//!
//! ```text
//! declaration  ::= specifier+ "*"* identifier ( function_rest | variable_rest )
//! function_rest ::= "(" params ")" ( block | ";" )
//! variable_rest ::= [ "=" expression ] ";"
//! params       ::= "void" | param ( "," param )*
//! param        ::= type_specifier+ "*"* identifier
//! specifier    ::= type_specifier | "static" | "extern"
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{unexpected, ParseError, Parser, SyntaxError};
use crate::parser::statements::JumpContext;

/// Where a declaration appears; function bodies are only allowed at file scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    File,
    Block,
}

pub(crate) fn is_type_specifier(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Int
            | TokenKind::Long
            | TokenKind::Unsigned
            | TokenKind::Signed
            | TokenKind::Char
            | TokenKind::Double
            | TokenKind::Void
    )
}

pub(crate) fn is_declaration_start(kind: TokenKind) -> bool {
    is_type_specifier(kind) || matches!(kind, TokenKind::Static | TokenKind::Extern)
}

/// The part of a declaration before the `(` or initializer
struct Declarator {
    name: String,
    ty: Type,
    storage: Option<StorageClass>,
    start: Span,
}

impl<'src> Parser<'src> {
    /// Parse a top-level declaration (function or global variable)
    pub(crate) fn parse_top_level_declaration(&mut self) -> Result<Declaration, ParseError> {
        self.parse_declaration(Scope::File)
    }

    pub(crate) fn parse_declaration(&mut self, scope: Scope) -> Result<Declaration, ParseError> {
        let declarator = self.parse_declarator()?;

        if self.check(TokenKind::LParen)? {
            return self
                .parse_function_declaration(declarator, scope)
                .map(Declaration::Function);
        }

        self.finish_variable_declaration(declarator)
            .map(Declaration::Variable)
    }

    /// Parse the declaration in a `for` loop's initial clause
    pub(crate) fn parse_for_declaration(&mut self) -> Result<VariableDecl, ParseError> {
        let declarator = self.parse_declarator()?;
        if declarator.storage.is_some() {
            return Err(SyntaxError::InvalidTypeSpecifier {
                message: "storage class in for loop initial declaration".to_string(),
                span: declarator.start,
            }
            .into());
        }
        if self.check(TokenKind::LParen)? {
            let token = self.peek()?;
            return Err(unexpected(token, "'=' or ';' in for loop declaration"));
        }
        self.finish_variable_declaration(declarator)
    }

    fn parse_declarator(&mut self) -> Result<Declarator, ParseError> {
        let start = self.peek()?.span;
        let (base, storage) = self.parse_specifiers()?;
        let ty = self.parse_pointers(Type::new(base))?;
        let name = self.expect_identifier("in declaration")?.lexeme.to_string();

        Ok(Declarator {
            name,
            ty,
            storage,
            start,
        })
    }

    fn finish_variable_declaration(
        &mut self,
        declarator: Declarator,
    ) -> Result<VariableDecl, ParseError> {
        let init = if self.match_token(TokenKind::Eq)? {
            Some(self.parse_expression()?)
        } else {
            None
        };

        self.expect_semicolon("after variable declaration")?;

        Ok(VariableDecl {
            name: declarator.name,
            var_type: declarator.ty,
            storage: declarator.storage,
            init,
            span: self.span_from(declarator.start),
        })
    }

    /// Parse function parameters and, at file scope, an optional body
    fn parse_function_declaration(
        &mut self,
        declarator: Declarator,
        scope: Scope,
    ) -> Result<FunctionDecl, ParseError> {
        let open = self.expect_token(TokenKind::LParen, "after function name")?.span;
        let params = self.parse_parameter_list()?;
        self.expect_closing(TokenKind::RParen, open)?;

        let body = if scope == Scope::File && self.check(TokenKind::LBrace)? {
            Some(self.parse_block(JumpContext::default())?)
        } else {
            self.expect_semicolon("after function declaration")?;
            None
        };

        Ok(FunctionDecl {
            name: declarator.name,
            params,
            return_type: declarator.ty,
            storage: declarator.storage,
            body,
            span: self.span_from(declarator.start),
        })
    }

    /// Parse parameter list: (void) | (type name, type name, ...)
    pub(crate) fn parse_parameter_list(&mut self) -> Result<Vec<Param>, ParseError> {
        let mut params = Vec::new();

        if self.check(TokenKind::RParen)? {
            return Ok(params);
        }

        // Special case: (void) means no parameters in C
        if self.check(TokenKind::Void)? && self.peek_nth(1)?.kind == TokenKind::RParen {
            self.advance()?;
            return Ok(params);
        }

        loop {
            let start = self.peek()?.span;
            let (base, storage) = self.parse_specifiers()?;
            if storage.is_some() {
                return Err(SyntaxError::InvalidTypeSpecifier {
                    message: "storage class specified for parameter".to_string(),
                    span: self.span_from(start),
                }
                .into());
            }
            let param_type = self.parse_pointers(Type::new(base))?;
            let name = self.expect_identifier("for parameter name")?.lexeme.to_string();

            params.push(Param {
                name,
                param_type,
                span: self.span_from(start),
            });

            if !self.match_token(TokenKind::Comma)? {
                break;
            }
        }

        Ok(params)
    }

    /// Parse type name used by casts: type_specifier+ "*"*
    pub(crate) fn parse_type_name(&mut self) -> Result<Type, ParseError> {
        let start = self.peek()?.span;
        let (base, storage) = self.parse_specifiers()?;
        if storage.is_some() {
            return Err(SyntaxError::InvalidTypeSpecifier {
                message: "storage class in type name".to_string(),
                span: self.span_from(start),
            }
            .into());
        }
        self.parse_pointers(Type::new(base))
    }

    fn parse_pointers(&mut self, mut ty: Type) -> Result<Type, ParseError> {
        while self.match_token(TokenKind::Star)? {
            ty = ty.with_pointer();
        }
        Ok(ty)
    }

    /// Parse declaration specifiers: type keywords and at most one storage
    /// class, in any order
    fn parse_specifiers(&mut self) -> Result<(BaseType, Option<StorageClass>), ParseError> {
        let start = self.peek()?.span;
        let mut specifiers = Vec::new();
        let mut storage = None;

        loop {
            let token = self.peek()?;
            let class = match token.kind {
                TokenKind::Static => StorageClass::Static,
                TokenKind::Extern => StorageClass::Extern,
                kind if is_type_specifier(kind) => {
                    specifiers.push(kind);
                    self.advance()?;
                    continue;
                }
                _ => break,
            };
            if storage.is_some() {
                return Err(SyntaxError::InvalidTypeSpecifier {
                    message: "multiple storage classes in declaration".to_string(),
                    span: token.span,
                }
                .into());
            }
            storage = Some(class);
            self.advance()?;
        }

        if specifiers.is_empty() {
            let token = self.peek()?;
            return Err(unexpected(token, "type specifier"));
        }

        let base = resolve_base_type(&specifiers).ok_or_else(|| {
            let spelled: Vec<_> = specifiers.iter().map(|kind| kind.as_str()).collect();
            SyntaxError::InvalidTypeSpecifier {
                message: format!("invalid type specifier '{}'", spelled.join(" ")),
                span: self.span_from(start),
            }
        })?;

        Ok((base, storage))
    }
}

/// Resolve a list of type keywords (in source order) to a base type
fn resolve_base_type(specifiers: &[TokenKind]) -> Option<BaseType> {
    let count = |kind| specifiers.iter().filter(|&&k| k == kind).count();
    if specifiers.iter().any(|&kind| count(kind) > 1) {
        return None;
    }

    let signed = count(TokenKind::Signed) == 1;
    let unsigned = count(TokenKind::Unsigned) == 1;
    if signed && unsigned {
        return None;
    }

    match specifiers {
        [TokenKind::Void] => return Some(BaseType::Void),
        [TokenKind::Double] => return Some(BaseType::Double),
        _ => {}
    }
    if specifiers.contains(&TokenKind::Void) || specifiers.contains(&TokenKind::Double) {
        return None;
    }

    if specifiers.contains(&TokenKind::Char) {
        let others = specifiers
            .iter()
            .all(|&k| matches!(k, TokenKind::Char | TokenKind::Signed | TokenKind::Unsigned));
        return match (others, signed, unsigned) {
            (false, _, _) => None,
            (true, true, _) => Some(BaseType::SignedChar),
            (true, _, true) => Some(BaseType::UnsignedChar),
            (true, false, false) => Some(BaseType::Char),
        };
    }

    let long = count(TokenKind::Long) == 1;
    Some(match (long, unsigned) {
        (false, false) => BaseType::Int,
        (true, false) => BaseType::Long,
        (false, true) => BaseType::UnsignedInt,
        (true, true) => BaseType::UnsignedLong,
    })
}
