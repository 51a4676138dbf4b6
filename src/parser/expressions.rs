//! Expression parsing implementation
//!
//! This module handles parsing of C expressions using precedence climbing
//! for binary operators and recursive descent for other expression forms.
//!
//! # Supported Expressions
//!
//! - Literals: integers, floats, characters, strings (adjacent strings concatenate)
//! - Identifiers and function calls
//! - Binary operators: arithmetic, shift, comparison, logical, bitwise
//! - Assignment: `=` and every compound form
//! - Unary operators: `-`, `~`, `!`, `+`, `++`, `--`, `*`, `&`
//! - Postfix: `++`, `--`
//! - Ternary: `? :`
//! - Type casts: `(type)expr`
//!
//! # Precedence
//!
//! Infix operators are driven by the [`INFIX_OPERATORS`] table. Climbing at
//! level `p` consumes operators whose precedence is at least `p`; the right
//! operand is parsed at `p + 1` for left-associative operators and at `p` for
//! right-associative ones.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::declarations::is_type_specifier;
use crate::parser::lexer::{
    decode_char, decode_float, decode_integer, decode_string, LexError, LexErrorKind, Token,
    TokenKind,
};
use crate::parser::parse::{unexpected, ParseError, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Associativity {
    Left,
    Right,
}

/// What an infix operator builds once both operands are parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfixForm {
    Binary(BinaryOp),
    Assign(AssignOp),
    Conditional,
}

#[derive(Debug, Clone, Copy)]
struct InfixOperator {
    kind: TokenKind,
    precedence: u8,
    associativity: Associativity,
    form: InfixForm,
}

const fn binary(kind: TokenKind, precedence: u8, op: BinaryOp) -> InfixOperator {
    InfixOperator {
        kind,
        precedence,
        associativity: Associativity::Left,
        form: InfixForm::Binary(op),
    }
}

const fn assign(kind: TokenKind, op: AssignOp) -> InfixOperator {
    InfixOperator {
        kind,
        precedence: 1,
        associativity: Associativity::Right,
        form: InfixForm::Assign(op),
    }
}

/// Precedence table for every infix operator
const INFIX_OPERATORS: &[InfixOperator] = &[
    binary(TokenKind::Star, 50, BinaryOp::Multiply),
    binary(TokenKind::Slash, 50, BinaryOp::Divide),
    binary(TokenKind::Percent, 50, BinaryOp::Remainder),
    binary(TokenKind::Plus, 45, BinaryOp::Add),
    binary(TokenKind::Minus, 45, BinaryOp::Subtract),
    binary(TokenKind::LtLt, 40, BinaryOp::ShiftLeft),
    binary(TokenKind::GtGt, 40, BinaryOp::ShiftRight),
    binary(TokenKind::Lt, 35, BinaryOp::LessThan),
    binary(TokenKind::Le, 35, BinaryOp::LessOrEqual),
    binary(TokenKind::Gt, 35, BinaryOp::GreaterThan),
    binary(TokenKind::Ge, 35, BinaryOp::GreaterOrEqual),
    binary(TokenKind::EqEq, 30, BinaryOp::Equal),
    binary(TokenKind::NotEq, 30, BinaryOp::NotEqual),
    binary(TokenKind::Amp, 25, BinaryOp::BitAnd),
    binary(TokenKind::Caret, 20, BinaryOp::BitXor),
    binary(TokenKind::Pipe, 15, BinaryOp::BitOr),
    binary(TokenKind::AndAnd, 10, BinaryOp::And),
    binary(TokenKind::OrOr, 5, BinaryOp::Or),
    InfixOperator {
        kind: TokenKind::Question,
        precedence: 3,
        associativity: Associativity::Right,
        form: InfixForm::Conditional,
    },
    assign(TokenKind::Eq, AssignOp::Assign),
    assign(TokenKind::PlusEq, AssignOp::Compound(BinaryOp::Add)),
    assign(TokenKind::MinusEq, AssignOp::Compound(BinaryOp::Subtract)),
    assign(TokenKind::StarEq, AssignOp::Compound(BinaryOp::Multiply)),
    assign(TokenKind::SlashEq, AssignOp::Compound(BinaryOp::Divide)),
    assign(TokenKind::PercentEq, AssignOp::Compound(BinaryOp::Remainder)),
    assign(TokenKind::AmpEq, AssignOp::Compound(BinaryOp::BitAnd)),
    assign(TokenKind::PipeEq, AssignOp::Compound(BinaryOp::BitOr)),
    assign(TokenKind::CaretEq, AssignOp::Compound(BinaryOp::BitXor)),
    assign(TokenKind::LtLtEq, AssignOp::Compound(BinaryOp::ShiftLeft)),
    assign(TokenKind::GtGtEq, AssignOp::Compound(BinaryOp::ShiftRight)),
];

fn infix_operator(kind: TokenKind) -> Option<&'static InfixOperator> {
    INFIX_OPERATORS.iter().find(|op| op.kind == kind)
}

/// Binding power of `kind` as an infix operator, if it is one
pub fn precedence_of(kind: TokenKind) -> Option<u8> {
    infix_operator(kind).map(|op| op.precedence)
}

fn prefix_operator(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Minus => Some(UnaryOp::Negate),
        TokenKind::Tilde => Some(UnaryOp::Complement),
        TokenKind::Bang => Some(UnaryOp::Not),
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::PlusPlus => Some(UnaryOp::PreIncrement),
        TokenKind::MinusMinus => Some(UnaryOp::PreDecrement),
        TokenKind::Star => Some(UnaryOp::Dereference),
        TokenKind::Amp => Some(UnaryOp::AddressOf),
        _ => None,
    }
}

/// Attach the literal's span to a decoding failure
fn decoded<T>(token: Token<'_>, result: Result<T, LexErrorKind>) -> Result<T, ParseError> {
    result.map_err(|kind| LexError::new(kind, token.span).into())
}

impl<'src> Parser<'src> {
    /// Parse expression (top-level entry point)
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_binary(0)
    }

    /// Precedence climbing over [`INFIX_OPERATORS`]
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expression, ParseError> {
        let start = self.peek()?.span;
        let mut left = self.parse_unary()?;

        loop {
            let Some(op) = infix_operator(self.peek_kind()?) else {
                break;
            };
            if op.precedence < min_precedence {
                break;
            }
            self.advance()?;

            self.enter()?;
            let combined = self.parse_infix_rest(op, left, start);
            self.leave();
            left = combined?;
        }

        Ok(left)
    }

    /// Parse what follows an infix operator and combine it with `left`
    fn parse_infix_rest(
        &mut self,
        op: &InfixOperator,
        left: Expression,
        start: Span,
    ) -> Result<Expression, ParseError> {
        let next = match op.associativity {
            Associativity::Left => op.precedence + 1,
            Associativity::Right => op.precedence,
        };

        match op.form {
            InfixForm::Binary(bin_op) => {
                let right = self.parse_binary(next)?;
                Ok(Expression::Binary {
                    op: bin_op,
                    left: Box::new(left),
                    right: Box::new(right),
                    span: self.span_from(start),
                })
            }
            InfixForm::Assign(assign_op) => {
                let value = self.parse_binary(next)?;
                Ok(Expression::Assignment {
                    op: assign_op,
                    target: Box::new(left),
                    value: Box::new(value),
                    span: self.span_from(start),
                })
            }
            InfixForm::Conditional => {
                let then_expr = self.parse_expression()?;
                self.expect_token(TokenKind::Colon, "in conditional expression")?;
                let else_expr = self.parse_binary(next)?;
                Ok(Expression::Conditional {
                    condition: Box::new(left),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                    span: self.span_from(start),
                })
            }
        }
    }

    /// Parse unary operators and casts
    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        self.enter()?;
        let result = self.parse_unary_inner();
        self.leave();
        result
    }

    fn parse_unary_inner(&mut self) -> Result<Expression, ParseError> {
        let token = self.peek()?;
        let start = token.span;

        if let Some(op) = prefix_operator(token.kind) {
            self.advance()?;
            let operand = Box::new(self.parse_unary()?);
            return Ok(Expression::Unary {
                op,
                operand,
                span: self.span_from(start),
            });
        }

        // Cast: '(' followed by a type specifier
        if token.kind == TokenKind::LParen && is_type_specifier(self.peek_nth(1)?.kind) {
            return self.parse_cast();
        }

        self.parse_postfix()
    }

    fn parse_cast(&mut self) -> Result<Expression, ParseError> {
        let start = self.advance()?.span;
        let target_type = self.parse_type_name()?;
        self.expect_closing(TokenKind::RParen, start)?;
        let operand = Box::new(self.parse_unary()?);
        Ok(Expression::Cast {
            target_type,
            operand,
            span: self.span_from(start),
        })
    }

    /// Parse postfix increment and decrement
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let start = self.peek()?.span;
        let mut expr = self.parse_primary()?;

        loop {
            let op = if self.match_token(TokenKind::PlusPlus)? {
                UnaryOp::PostIncrement
            } else if self.match_token(TokenKind::MinusMinus)? {
                UnaryOp::PostDecrement
            } else {
                break;
            };
            expr = Expression::Unary {
                op,
                operand: Box::new(expr),
                span: self.span_from(start),
            };
        }

        Ok(expr)
    }

    /// Parse primary expression (literals, identifiers, calls, parenthesized)
    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let token = self.peek()?;

        match token.kind {
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::CharLiteral
            | TokenKind::StringLiteral => self.parse_literal(),
            TokenKind::Identifier => self.parse_identifier_expression(),
            TokenKind::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect_closing(TokenKind::RParen, token.span)?;
                Ok(expr)
            }
            _ => Err(unexpected(token, "expression")),
        }
    }

    fn parse_literal(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance()?;
        let span = token.span;

        match token.kind {
            TokenKind::IntLiteral => {
                let (value, suffix) = decoded(token, decode_integer(token.lexeme))?;
                Ok(Expression::IntegerConstant {
                    value,
                    suffix,
                    span,
                })
            }
            TokenKind::FloatLiteral => {
                let value = decoded(token, decode_float(token.lexeme))?;
                Ok(Expression::FloatConstant { value, span })
            }
            TokenKind::CharLiteral => {
                let value = decoded(token, decode_char(token.lexeme))?;
                Ok(Expression::CharConstant { value, span })
            }
            _ => {
                let mut value = decoded(token, decode_string(token.lexeme))?;
                // Adjacent string literals concatenate
                while self.check(TokenKind::StringLiteral)? {
                    let next = self.advance()?;
                    value.extend(decoded(next, decode_string(next.lexeme))?);
                }
                Ok(Expression::StringLiteral {
                    value,
                    span: self.span_from(span),
                })
            }
        }
    }

    /// A variable reference, or a call when `(` follows the name
    fn parse_identifier_expression(&mut self) -> Result<Expression, ParseError> {
        let token = self.advance()?;
        let name = token.lexeme.to_string();

        if self.check(TokenKind::LParen)? {
            let args = self.parse_arguments()?;
            return Ok(Expression::FunctionCall {
                name,
                args,
                span: self.span_from(token.span),
            });
        }

        Ok(Expression::Variable {
            name,
            span: token.span,
        })
    }

    /// Parse a parenthesized, comma separated argument list
    fn parse_arguments(&mut self) -> Result<Vec<Expression>, ParseError> {
        let open = self.advance()?.span;
        let mut args = Vec::new();

        if !self.check(TokenKind::RParen)? {
            loop {
                args.push(self.parse_expression()?);
                if !self.match_token(TokenKind::Comma)? {
                    break;
                }
            }
        }

        self.expect_closing(TokenKind::RParen, open)?;
        Ok(args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::SyntaxError;

    fn parse_expr(source: &str) -> Result<Expression, ParseError> {
        Parser::new(source).parse_expression()
    }

    fn binary_op(expr: &Expression) -> BinaryOp {
        match expr {
            Expression::Binary { op, .. } => *op,
            other => panic!("Expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let expr = parse_expr("1 + 2 * 3").unwrap();

        match expr {
            Expression::Binary {
                op: BinaryOp::Add,
                left,
                right,
                ..
            } => {
                assert!(matches!(*left, Expression::IntegerConstant { value: 1, .. }));
                assert_eq!(binary_op(&right), BinaryOp::Multiply);
            }
            other => panic!("Expected addition at the root, got {other:?}"),
        }
    }

    #[test]
    fn test_subtraction_is_left_associative() {
        let expr = parse_expr("a - b - c").unwrap();

        let Expression::Binary { left, right, .. } = expr else {
            panic!("Expected binary expression");
        };
        assert_eq!(binary_op(&left), BinaryOp::Subtract);
        assert!(matches!(*right, Expression::Variable { ref name, .. } if name == "c"));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let expr = parse_expr("a = b = c").unwrap();

        let Expression::Assignment { target, value, .. } = expr else {
            panic!("Expected assignment");
        };
        assert!(matches!(*target, Expression::Variable { ref name, .. } if name == "a"));
        assert!(matches!(
            *value,
            Expression::Assignment {
                op: AssignOp::Assign,
                ..
            }
        ));
    }

    #[test]
    fn test_compound_assignment_operators() {
        for (source, expected) in [
            ("x += 1", BinaryOp::Add),
            ("x <<= 1", BinaryOp::ShiftLeft),
            ("x ^= 1", BinaryOp::BitXor),
        ] {
            match parse_expr(source).unwrap() {
                Expression::Assignment {
                    op: AssignOp::Compound(op),
                    ..
                } => assert_eq!(op, expected, "{source}"),
                other => panic!("Expected compound assignment, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_conditional_is_right_associative() {
        let expr = parse_expr("a ? b : c ? d : e").unwrap();

        let Expression::Conditional { else_expr, .. } = expr else {
            panic!("Expected conditional");
        };
        assert!(matches!(*else_expr, Expression::Conditional { .. }));
    }

    #[test]
    fn test_conditional_middle_is_full_expression() {
        let expr = parse_expr("a ? b = 1 : c").unwrap();

        let Expression::Conditional { then_expr, .. } = expr else {
            panic!("Expected conditional");
        };
        assert!(matches!(*then_expr, Expression::Assignment { .. }));
    }

    #[test]
    fn test_conditional_binds_looser_than_logical_or() {
        let expr = parse_expr("a || b ? c : d").unwrap();

        let Expression::Conditional { condition, .. } = expr else {
            panic!("Expected conditional");
        };
        assert_eq!(binary_op(&condition), BinaryOp::Or);
    }

    #[test]
    fn test_unary_binds_tighter_than_binary() {
        let expr = parse_expr("-a * b").unwrap();

        let Expression::Binary { left, .. } = expr else {
            panic!("Expected binary expression");
        };
        assert!(matches!(
            *left,
            Expression::Unary {
                op: UnaryOp::Negate,
                ..
            }
        ));
    }

    #[test]
    fn test_postfix_binds_tighter_than_prefix() {
        let expr = parse_expr("-x++").unwrap();

        let Expression::Unary {
            op: UnaryOp::Negate,
            operand,
            ..
        } = expr
        else {
            panic!("Expected negation");
        };
        assert!(matches!(
            *operand,
            Expression::Unary {
                op: UnaryOp::PostIncrement,
                ..
            }
        ));
    }

    #[test]
    fn test_cast_expression() {
        let expr = parse_expr("(unsigned long *) p").unwrap();

        match expr {
            Expression::Cast { target_type, .. } => {
                assert_eq!(target_type.base, BaseType::UnsignedLong);
                assert_eq!(target_type.pointer_depth, 1);
            }
            other => panic!("Expected cast, got {other:?}"),
        }

        // Parenthesized variable is not a cast
        assert!(matches!(
            parse_expr("(x)").unwrap(),
            Expression::Variable { .. }
        ));
    }

    #[test]
    fn test_function_call_arguments() {
        let expr = parse_expr("add(1, x + 2, f())").unwrap();

        match expr {
            Expression::FunctionCall { name, args, .. } => {
                assert_eq!(name, "add");
                assert_eq!(args.len(), 3);
                assert!(matches!(&args[2], Expression::FunctionCall { args, .. } if args.is_empty()));
            }
            other => panic!("Expected call, got {other:?}"),
        }
    }

    #[test]
    fn test_trailing_argument_comma_rejected() {
        let err = parse_expr("f(1,)").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Syntax(SyntaxError::UnexpectedToken {
                found: TokenKind::RParen,
                ..
            })
        ));
    }

    #[test]
    fn test_literal_decoding() {
        assert!(matches!(
            parse_expr("0x1Fu").unwrap(),
            Expression::IntegerConstant {
                value: 31,
                suffix: IntSuffix {
                    unsigned: true,
                    long: false
                },
                ..
            }
        ));
        assert!(matches!(
            parse_expr("'\\n'").unwrap(),
            Expression::CharConstant { value: b'\n', .. }
        ));
        match parse_expr("2.5e1").unwrap() {
            Expression::FloatConstant { value, .. } => assert_eq!(value, 25.0),
            other => panic!("Expected float, got {other:?}"),
        }
    }

    #[test]
    fn test_adjacent_strings_concatenate() {
        let expr = parse_expr("\"ab\" \"c\\n\"").unwrap();

        match expr {
            Expression::StringLiteral { value, span } => {
                assert_eq!(value, b"abc\n");
                assert_eq!(span.len, 10);
            }
            other => panic!("Expected string literal, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_paren_reports_opener() {
        let err = parse_expr("(1 + 2").unwrap_err();
        match err {
            ParseError::Syntax(SyntaxError::UnclosedDelimiter {
                delimiter,
                opener,
                found,
                ..
            }) => {
                assert_eq!(delimiter, TokenKind::RParen);
                assert_eq!(opener.column, 1);
                assert_eq!(found, TokenKind::Eof);
            }
            other => panic!("Expected unclosed delimiter, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_operand() {
        let err = parse_expr("1 +").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Syntax(SyntaxError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_expression_span_covers_operands() {
        let expr = parse_expr("foo + bar(1)").unwrap();
        let span = expr.span();
        assert_eq!(span.column, 1);
        assert_eq!(span.len, "foo + bar(1)".len());
    }

    #[test]
    fn test_precedence_table() {
        assert_eq!(precedence_of(TokenKind::Star), Some(50));
        assert_eq!(precedence_of(TokenKind::OrOr), Some(5));
        assert_eq!(precedence_of(TokenKind::GtGtEq), Some(1));
        assert_eq!(precedence_of(TokenKind::Semicolon), None);
    }
}
