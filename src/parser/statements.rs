//! Statement parsing implementation
//!
//! This module handles parsing of all C statement types:
//!
//! - Blocks and block items: `{ int x = 1; x = x + 1; }`
//! - Control flow: `if`, `while`, `for`, `do-while`, `switch`
//! - Jump statements: `return`, `break`, `continue`, `goto`
//! - Labeled statements: `case`, `default`, `name:`
//! - Expression and null statements
//!
//! # Grammar
//!
//! ```text
//! statement ::= return_stmt | if_stmt | while_stmt | do_while_stmt | for_stmt
//!             | switch_stmt | case_stmt | default_stmt | break_stmt
//!             | continue_stmt | goto_stmt | labeled_stmt | block | ";"
//!             | expr_stmt
//! block_item ::= declaration | statement
//! ```
//!
//! # Loop labels
//!
//! Every loop and switch gets a fresh [`LoopLabel`]. The innermost targets are
//! carried down the recursion in a [`JumpContext`] passed by value, so
//! `break`, `continue`, `case` and `default` are bound as they are parsed and
//! a jump with nothing to target is rejected on the spot.
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::ast::*;
use crate::parser::declarations::{is_declaration_start, Scope};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{unexpected, ParseError, Parser, SyntaxError};

/// Innermost enclosing jump targets at a point in the statement tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct JumpContext {
    pub break_target: Option<LoopLabel>,
    pub continue_target: Option<LoopLabel>,
    pub switch: Option<LoopLabel>,
}

impl JumpContext {
    fn in_loop(self, label: LoopLabel) -> Self {
        JumpContext {
            break_target: Some(label),
            continue_target: Some(label),
            ..self
        }
    }

    fn in_switch(self, label: LoopLabel) -> Self {
        JumpContext {
            break_target: Some(label),
            switch: Some(label),
            ..self
        }
    }
}

impl<'src> Parser<'src> {
    /// Parse a brace-delimited block
    pub(crate) fn parse_block(&mut self, ctx: JumpContext) -> Result<Block, ParseError> {
        let open = self.expect_token(TokenKind::LBrace, "to open block")?.span;
        let mut items = Vec::new();

        while !self.check(TokenKind::RBrace)? && !self.is_at_end()? {
            items.push(self.parse_block_item(ctx)?);
        }

        self.expect_closing(TokenKind::RBrace, open)?;

        Ok(Block {
            items,
            span: self.span_from(open),
        })
    }

    fn parse_block_item(&mut self, ctx: JumpContext) -> Result<BlockItem, ParseError> {
        if is_declaration_start(self.peek_kind()?) {
            Ok(BlockItem::Declaration(self.parse_declaration(Scope::Block)?))
        } else {
            Ok(BlockItem::Statement(self.parse_statement(ctx)?))
        }
    }

    /// Parse a statement
    pub(crate) fn parse_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        self.enter()?;
        let result = self.parse_statement_inner(ctx);
        self.leave();
        result
    }

    // Kept to a bare dispatch: it sits on every level of statement recursion
    fn parse_statement_inner(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let token = self.peek()?;

        match token.kind {
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::If => self.parse_if_statement(ctx),
            TokenKind::While => self.parse_while_statement(ctx),
            TokenKind::Do => self.parse_do_while_statement(ctx),
            TokenKind::For => self.parse_for_statement(ctx),
            TokenKind::Switch => self.parse_switch_statement(ctx),
            TokenKind::Case => self.parse_case_statement(ctx),
            TokenKind::Default => self.parse_default_statement(ctx),
            TokenKind::Break => self.parse_break_statement(ctx),
            TokenKind::Continue => self.parse_continue_statement(ctx),
            TokenKind::Goto => self.parse_goto_statement(),
            TokenKind::LBrace => self.parse_block(ctx).map(Statement::Compound),
            TokenKind::Semicolon => {
                self.advance()?;
                Ok(Statement::Null { span: token.span })
            }

            // Label: identifier followed by colon
            TokenKind::Identifier if self.peek_nth(1)?.kind == TokenKind::Colon => {
                self.parse_labeled_statement(ctx)
            }

            // Declarations are block items, not statements
            kind if is_declaration_start(kind) => Err(unexpected(token, "statement")),

            _ => self.parse_expression_statement(),
        }
    }

    fn parse_break_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let target = ctx.break_target.ok_or(SyntaxError::JumpOutsideLoop {
            keyword: TokenKind::Break,
            span: start,
        })?;
        self.expect_semicolon("after 'break'")?;
        Ok(Statement::Break {
            target,
            span: self.span_from(start),
        })
    }

    fn parse_continue_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let target = ctx.continue_target.ok_or(SyntaxError::JumpOutsideLoop {
            keyword: TokenKind::Continue,
            span: start,
        })?;
        self.expect_semicolon("after 'continue'")?;
        Ok(Statement::Continue {
            target,
            span: self.span_from(start),
        })
    }

    fn parse_goto_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let target = self.expect_identifier("after 'goto'")?.lexeme.to_string();
        self.expect_semicolon("after 'goto'")?;
        Ok(Statement::Goto {
            target,
            span: self.span_from(start),
        })
    }

    fn parse_labeled_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let name = self.advance()?;
        self.advance()?; // consume ':'
        let statement = Box::new(self.parse_statement(ctx)?);
        Ok(Statement::Labeled {
            label: name.lexeme.to_string(),
            statement,
            span: self.span_from(name.span),
        })
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek()?.span;
        let expr = self.parse_expression()?;
        self.expect_semicolon("after expression")?;
        Ok(Statement::Expression {
            expr,
            span: self.span_from(start),
        })
    }

    /// Parse return statement
    fn parse_return_statement(&mut self) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;

        let expr = if self.check(TokenKind::Semicolon)? {
            None
        } else {
            Some(self.parse_expression()?)
        };

        self.expect_semicolon("after return value")?;

        Ok(Statement::Return {
            expr,
            span: self.span_from(start),
        })
    }

    /// Parse a parenthesized condition: ( expr )
    fn parse_condition(&mut self, keyword: &str) -> Result<Expression, ParseError> {
        let open = self
            .expect_token(TokenKind::LParen, &format!("after '{keyword}'"))?
            .span;
        let condition = self.parse_expression()?;
        self.expect_closing(TokenKind::RParen, open)?;
        Ok(condition)
    }

    /// Parse if statement
    fn parse_if_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;

        let condition = self.parse_condition("if")?;
        let then_branch = Box::new(self.parse_statement(ctx)?);

        let else_branch = if self.match_token(TokenKind::Else)? {
            Some(Box::new(self.parse_statement(ctx)?))
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_branch,
            else_branch,
            span: self.span_from(start),
        })
    }

    /// Parse while statement
    fn parse_while_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let label = self.fresh_label();

        let condition = self.parse_condition("while")?;
        let body = Box::new(self.parse_statement(ctx.in_loop(label))?);

        Ok(Statement::While {
            condition,
            body,
            label,
            span: self.span_from(start),
        })
    }

    /// Parse do-while statement
    fn parse_do_while_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let label = self.fresh_label();

        let body = Box::new(self.parse_statement(ctx.in_loop(label))?);

        self.expect_token(TokenKind::While, "after do-while body")?;
        let condition = self.parse_condition("while")?;
        self.expect_semicolon("after do-while")?;

        Ok(Statement::DoWhile {
            body,
            condition,
            label,
            span: self.span_from(start),
        })
    }

    /// Parse for statement
    fn parse_for_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let label = self.fresh_label();

        let open = self.expect_token(TokenKind::LParen, "after 'for'")?.span;

        // Init (optional); a declaration consumes its own semicolon
        let init = if self.match_token(TokenKind::Semicolon)? {
            None
        } else if is_declaration_start(self.peek_kind()?) {
            Some(ForInit::Declaration(self.parse_for_declaration()?))
        } else {
            let expr = self.parse_expression()?;
            self.expect_semicolon("after for loop initializer")?;
            Some(ForInit::Expression(expr))
        };

        let condition = if self.check(TokenKind::Semicolon)? {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon("after for loop condition")?;

        let post = if self.check(TokenKind::RParen)? {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_closing(TokenKind::RParen, open)?;

        let body = Box::new(self.parse_statement(ctx.in_loop(label))?);

        Ok(Statement::For {
            init,
            condition,
            post,
            body,
            label,
            span: self.span_from(start),
        })
    }

    /// Parse switch statement
    fn parse_switch_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let label = self.fresh_label();

        let control = self.parse_condition("switch")?;
        let body = Box::new(self.parse_statement(ctx.in_switch(label))?);

        Ok(Statement::Switch {
            control,
            body,
            label,
            span: self.span_from(start),
        })
    }

    fn parse_case_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let switch = ctx.switch.ok_or(SyntaxError::CaseOutsideSwitch {
            keyword: TokenKind::Case,
            span: start,
        })?;

        let value = self.parse_expression()?;
        self.expect_token(TokenKind::Colon, "after case value")?;
        let body = Box::new(self.parse_statement(ctx)?);

        Ok(Statement::Case {
            value,
            body,
            switch,
            span: self.span_from(start),
        })
    }

    fn parse_default_statement(&mut self, ctx: JumpContext) -> Result<Statement, ParseError> {
        let start = self.advance()?.span;
        let switch = ctx.switch.ok_or(SyntaxError::CaseOutsideSwitch {
            keyword: TokenKind::Default,
            span: start,
        })?;

        self.expect_token(TokenKind::Colon, "after 'default'")?;
        let body = Box::new(self.parse_statement(ctx)?);

        Ok(Statement::Default {
            body,
            switch,
            span: self.span_from(start),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_body(body: &str) -> Result<Block, ParseError> {
        let source = format!("int main(void) {{ {body} }}");
        let program = Parser::new(&source).parse_program()?;
        match program.declarations.into_iter().next() {
            Some(Declaration::Function(FunctionDecl {
                body: Some(block), ..
            })) => Ok(block),
            other => panic!("Expected function definition, got {other:?}"),
        }
    }

    fn statements(block: Block) -> Vec<Statement> {
        block
            .items
            .into_iter()
            .filter_map(|item| match item {
                BlockItem::Statement(stmt) => Some(stmt),
                BlockItem::Declaration(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_parse_if_statement() {
        let block = parse_body("if (x > 0) return 1; else return 0;").unwrap();

        match &statements(block)[0] {
            Statement::If {
                then_branch,
                else_branch,
                ..
            } => {
                assert!(matches!(**then_branch, Statement::Return { .. }));
                assert!(else_branch.is_some());
            }
            other => panic!("Expected if statement, got {other:?}"),
        }
    }

    #[test]
    fn test_dangling_else_binds_to_nearest_if() {
        let block = parse_body("if (a) if (b) return 1; else return 2;").unwrap();
        let stmts = statements(block);

        let Statement::If {
            then_branch,
            else_branch,
            ..
        } = &stmts[0]
        else {
            panic!("Expected if statement");
        };
        assert!(else_branch.is_none());
        assert!(matches!(
            **then_branch,
            Statement::If {
                else_branch: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_break_and_continue_bind_to_enclosing_loop() {
        let block = parse_body("while (1) { if (x) break; continue; }").unwrap();
        let stmts = statements(block);

        let Statement::While { body, label, .. } = &stmts[0] else {
            panic!("Expected while loop");
        };
        let Statement::Compound(inner) = &**body else {
            panic!("Expected block body");
        };
        let inner = statements(inner.clone());
        let Statement::If { then_branch, .. } = &inner[0] else {
            panic!("Expected if");
        };
        assert_eq!(
            **then_branch,
            Statement::Break {
                target: *label,
                span: then_branch.span()
            }
        );
        assert!(matches!(inner[1], Statement::Continue { target, .. } if target == *label));
    }

    #[test]
    fn test_nested_loops_get_distinct_labels() {
        let block = parse_body("for (int i = 0; i < 3; i = i + 1) do break; while (1);").unwrap();
        let stmts = statements(block);

        let Statement::For {
            init, body, label, ..
        } = &stmts[0]
        else {
            panic!("Expected for loop");
        };
        assert!(matches!(init, Some(ForInit::Declaration(decl)) if decl.name == "i"));

        let Statement::DoWhile {
            body: inner_body,
            label: inner_label,
            ..
        } = &**body
        else {
            panic!("Expected do-while");
        };
        assert_ne!(label, inner_label);
        assert!(matches!(**inner_body, Statement::Break { target, .. } if target == *inner_label));
    }

    #[test]
    fn test_switch_binds_break_but_not_continue() {
        let block =
            parse_body("while (1) { switch (x) { case 1: break; default: continue; } }").unwrap();
        let stmts = statements(block);

        let Statement::While { body, label, .. } = &stmts[0] else {
            panic!("Expected while loop");
        };
        let Statement::Compound(loop_body) = &**body else {
            panic!("Expected block");
        };
        let loop_stmts = statements(loop_body.clone());
        let Statement::Switch {
            body: switch_body,
            label: switch_label,
            ..
        } = &loop_stmts[0]
        else {
            panic!("Expected switch");
        };
        let Statement::Compound(cases) = &**switch_body else {
            panic!("Expected switch block");
        };
        let cases = statements(cases.clone());

        let Statement::Case { body, switch, .. } = &cases[0] else {
            panic!("Expected case");
        };
        assert_eq!(switch, switch_label);
        assert!(matches!(**body, Statement::Break { target, .. } if target == *switch_label));

        let Statement::Default { body, .. } = &cases[1] else {
            panic!("Expected default");
        };
        assert!(matches!(**body, Statement::Continue { target, .. } if target == *label));
    }

    #[test]
    fn test_break_outside_loop_rejected() {
        let err = parse_body("break;").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Syntax(SyntaxError::JumpOutsideLoop {
                keyword: TokenKind::Break,
                ..
            })
        ));

        let err = parse_body("switch (x) { case 1: continue; }").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Syntax(SyntaxError::JumpOutsideLoop {
                keyword: TokenKind::Continue,
                ..
            })
        ));
        assert!(err.to_string().ends_with("'continue' statement not within a loop"));
    }

    #[test]
    fn test_case_outside_switch_rejected() {
        let err = parse_body("case 1: return 0;").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Syntax(SyntaxError::CaseOutsideSwitch {
                keyword: TokenKind::Case,
                ..
            })
        ));
    }

    #[test]
    fn test_goto_and_labels() {
        let block = parse_body("goto end; end: return 0;").unwrap();
        let stmts = statements(block);

        assert!(matches!(&stmts[0], Statement::Goto { target, .. } if target == "end"));
        assert!(matches!(
            &stmts[1],
            Statement::Labeled { label, statement, .. }
                if label == "end" && matches!(**statement, Statement::Return { .. })
        ));
    }

    #[test]
    fn test_null_and_compound_statements() {
        let block = parse_body("; { int y = 2; ; }").unwrap();
        let stmts = statements(block);

        assert!(matches!(stmts[0], Statement::Null { .. }));
        let Statement::Compound(inner) = &stmts[1] else {
            panic!("Expected compound statement");
        };
        assert_eq!(inner.items.len(), 2);
        assert!(matches!(
            inner.items[0],
            BlockItem::Declaration(Declaration::Variable(_))
        ));
    }

    #[test]
    fn test_declaration_not_allowed_as_statement() {
        let err = parse_body("if (x) int y = 1;").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Syntax(SyntaxError::UnexpectedToken {
                found: TokenKind::Int,
                ..
            })
        ));
    }

    #[test]
    fn test_for_with_empty_clauses() {
        let block = parse_body("for (;;) break;").unwrap();
        assert!(matches!(
            &statements(block)[0],
            Statement::For {
                init: None,
                condition: None,
                post: None,
                ..
            }
        ));
    }

    #[test]
    fn test_unclosed_condition_reports_opener() {
        let err = parse_body("while (x { }").unwrap_err();
        match err {
            ParseError::Syntax(SyntaxError::UnclosedDelimiter {
                delimiter, opener, ..
            }) => {
                assert_eq!(delimiter, TokenKind::RParen);
                assert_eq!(opener.column, 24);
            }
            other => panic!("Expected unclosed delimiter, got {other:?}"),
        }
    }

    #[test]
    fn test_statement_spans() {
        let block = parse_body("return 1 + 2;").unwrap();
        let stmts = statements(block);
        let stmt = &stmts[0];
        assert_eq!(stmt.span().column, 18);
        assert_eq!(stmt.span().len, "return 1 + 2;".len());
    }
}
