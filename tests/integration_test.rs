// Integration tests for the C front end

use subc::parser::ast::*;
use subc::parser::lexer::{scan_all, tokenize, LexErrorKind, TokenKind};
use subc::parser::parse::SyntaxError;
use subc::config::DEFAULT_MAX_NESTING_DEPTH;
use subc::{parse, Diagnostic, ErrorKind, FrontendConfig, ParseError};

fn parse_default(source: &str) -> Result<Program, ParseError> {
    parse(source, &FrontendConfig::new("test.c"))
}

fn main_body(program: &Program) -> &Block {
    program
        .functions()
        .find(|func| func.name == "main")
        .and_then(|func| func.body.as_ref())
        .expect("main has a body")
}

fn first_statement(block: &Block) -> &Statement {
    block
        .items
        .iter()
        .find_map(|item| match item {
            BlockItem::Statement(stmt) => Some(stmt),
            BlockItem::Declaration(_) => None,
        })
        .expect("block has a statement")
}

#[test]
fn test_minimal_program() {
    let program = parse_default("int main(void){ return 2; }").expect("Parsing failed");

    assert_eq!(program.declarations.len(), 1);
    let Declaration::Function(func) = &program.declarations[0] else {
        panic!("Expected a function declaration");
    };
    assert_eq!(func.name, "main");
    assert!(func.params.is_empty());
    assert_eq!(func.return_type, Type::new(BaseType::Int));

    let body = func.body.as_ref().expect("main has a body");
    assert_eq!(body.items.len(), 1);
    assert!(matches!(
        &body.items[0],
        BlockItem::Statement(Statement::Return {
            expr: Some(Expression::IntegerConstant { value: 2, .. }),
            ..
        })
    ));
}

#[test]
fn test_multiplication_binds_tighter() {
    let program = parse_default("int main(void) { return 1 + 2 * 3; }").unwrap();

    let Statement::Return {
        expr: Some(expr), ..
    } = first_statement(main_body(&program))
    else {
        panic!("Expected return statement");
    };
    let Expression::Binary {
        op: BinaryOp::Add,
        left,
        right,
        ..
    } = expr
    else {
        panic!("Expected addition at the root, got {expr}");
    };
    assert!(matches!(**left, Expression::IntegerConstant { value: 1, .. }));
    assert!(matches!(
        **right,
        Expression::Binary {
            op: BinaryOp::Multiply,
            ..
        }
    ));
    assert_eq!(expr.to_string(), "(1 + (2 * 3))");
}

#[test]
fn test_assignment_right_associative() {
    let program = parse_default("int main(void) { a = b = c; }").unwrap();

    let Statement::Expression { expr, .. } = first_statement(main_body(&program)) else {
        panic!("Expected expression statement");
    };
    assert_eq!(expr.to_string(), "(a = (b = c))");
}

#[test]
fn test_parse_is_deterministic() {
    let source = r#"
        static long counter = 0;
        int helper(int n);

        int main(void) {
            for (int i = 0; i < 10; i += 1) {
                switch (i % 3) {
                    case 0: continue;
                    default: counter = counter + helper(i);
                }
            }
            return (int) counter;
        }
    "#;

    let first = parse_default(source).unwrap();
    let second = parse_default(source).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_lexical_error_is_stable() {
    let prefixes = ["", "int x;\n", "int f(void) { return 1; }\n/* comment */ "];

    for prefix in prefixes {
        let source = format!("{prefix}int main(void) {{ return 1 @ 2; }}");
        let expected_offset = source.find('@').unwrap();

        for _ in 0..2 {
            let err = parse_default(&source).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Lexical);
            match &err {
                ParseError::Lex(lex) => {
                    assert_eq!(lex.kind, LexErrorKind::UnexpectedChar('@'));
                    assert_eq!(lex.span.offset, expected_offset);
                    assert_eq!(lex.span.len, 1);
                }
                other => panic!("Expected lexical error, got {other:?}"),
            }
        }
    }
}

#[test]
fn test_unmatched_brace_references_opener() {
    let err = parse_default("int main(void){ return 2;").unwrap_err();

    match err {
        ParseError::Syntax(SyntaxError::UnclosedDelimiter {
            delimiter,
            opener,
            found,
            ..
        }) => {
            assert_eq!(delimiter, TokenKind::RBrace);
            assert_eq!((opener.line, opener.column, opener.offset), (1, 15, 14));
            assert_eq!(found, TokenKind::Eof);
        }
        other => panic!("Expected unclosed delimiter, got {other:?}"),
    }
}

#[test]
fn test_break_outside_loop_rejected() {
    let err = parse_default("int main(void) { break; }").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert!(matches!(
        err,
        ParseError::Syntax(SyntaxError::JumpOutsideLoop {
            keyword: TokenKind::Break,
            ..
        })
    ));
    assert_eq!(
        err.to_string(),
        "syntax error at line 1, column 18: 'break' statement not within a loop or switch"
    );
}

#[test]
fn test_continue_in_switch_targets_loop() {
    let source = "int main(void) { while (x) switch (x) { case 1: continue; default: break; } }";
    let program = parse_default(source).unwrap();

    let Statement::While { body, label, .. } = first_statement(main_body(&program)) else {
        panic!("Expected while loop");
    };
    let Statement::Switch {
        label: switch_label,
        ..
    } = &**body
    else {
        panic!("Expected switch body");
    };
    assert_ne!(label, switch_label);
    assert_eq!(body.loop_label(), Some(*switch_label));

    let dump = program.to_string();
    assert!(dump.contains(&format!("continue; /* {label} */")), "{dump}");
    assert!(dump.contains(&format!("break; /* {switch_label} */")), "{dump}");
}

#[test]
fn test_token_spans_reconstruct_source() {
    let source = "# 1 \"main.c\"\nint main(void) {\n\t// count down\n\tint n = 10; /* ten */\n\twhile (n--) n -= 1;\n\treturn n ? 'a' : \"s\\n\";\n}\n";
    let tokens = tokenize(source).unwrap();

    let mut rebuilt = String::new();
    let mut cursor = 0;
    for token in &tokens {
        assert_eq!(token.span.text(source), token.lexeme);
        rebuilt.push_str(&source[cursor..token.span.offset]);
        rebuilt.push_str(token.lexeme);
        cursor = token.span.end_offset();
    }
    rebuilt.push_str(&source[cursor..]);

    assert_eq!(rebuilt, source);
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    assert_eq!(tokens.last().map(|t| t.span.offset), Some(source.len()));
}

#[test]
fn test_line_markers() {
    let source = "# 1 \"main.c\"\nint main(void) { return 0; }\n";
    assert!(parse_default(source).is_ok());

    let config = FrontendConfig::new("main.i").with_line_markers_skipped(false);
    let err = parse(source, &config).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Lex(ref lex) if lex.kind == LexErrorKind::UnexpectedChar('#')
    ));
}

#[test]
fn test_nesting_limit() {
    let config = FrontendConfig::new("deep.c").with_max_nesting_depth(32);

    let shallow = format!("int main(void) {{ return {}1{}; }}", "(".repeat(8), ")".repeat(8));
    assert!(parse(&shallow, &config).is_ok());

    let deep = format!("int main(void) {{ {}{} }}", "{".repeat(100), "}".repeat(100));
    let err = parse(&deep, &config).unwrap_err();
    assert!(matches!(
        err,
        ParseError::Syntax(SyntaxError::NestingTooDeep { limit: 32, .. })
    ));

    let unary = format!("int main(void) {{ return {}x; }}", "-".repeat(100));
    assert!(matches!(
        parse(&unary, &config).unwrap_err(),
        ParseError::Syntax(SyntaxError::NestingTooDeep { .. })
    ));
}

/// Parse on a thread with the platform's default stack size
fn parse_on_spawned_thread(source: String) -> Result<Program, ParseError> {
    std::thread::spawn(move || parse_default(&source))
        .join()
        .expect("parser thread panicked")
}

#[test]
fn test_default_nesting_limit_fits_spawned_thread_stack() {
    let depth = DEFAULT_MAX_NESTING_DEPTH;

    // Each nested block is one statement level
    let blocks = format!(
        "int main(void) {{ {}{} }}",
        "{".repeat(depth - 1),
        "}".repeat(depth - 1)
    );
    // The statement and its innermost operand take one level each
    let parens = format!(
        "int main(void) {{ return {}1{}; }}",
        "(".repeat(depth - 2),
        ")".repeat(depth - 2)
    );
    let unary = format!("int main(void) {{ return {}x; }}", "-".repeat(depth - 2));
    let ifs = format!("int main(void) {{ {}return 0; }}", "if (x) ".repeat(depth - 2));

    for source in [blocks, parens, unary, ifs] {
        if let Err(err) = parse_on_spawned_thread(source) {
            panic!("nesting below the default limit rejected: {err}");
        }
    }
}

#[test]
fn test_default_nesting_limit_reports_error() {
    let depth = DEFAULT_MAX_NESTING_DEPTH;

    let blocks = format!(
        "int main(void) {{ {}{} }}",
        "{".repeat(depth + 1),
        "}".repeat(depth + 1)
    );
    let parens = format!(
        "int main(void) {{ return {}1{}; }}",
        "(".repeat(depth + 1),
        ")".repeat(depth + 1)
    );
    let unary = format!("int main(void) {{ return {}x; }}", "-".repeat(depth + 1));

    for source in [blocks, parens, unary] {
        let err = parse_on_spawned_thread(source).unwrap_err();
        assert!(
            matches!(
                err,
                ParseError::Syntax(SyntaxError::NestingTooDeep { limit, .. }) if limit == depth
            ),
            "{err:?}"
        );
    }
}

#[test]
fn test_scan_all_reports_every_lexical_error() {
    let source = "int @ x = 09;\nchar c = '';\n$";
    let (tokens, errors) = scan_all(source);

    let kinds: Vec<_> = errors.iter().map(|e| e.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            LexErrorKind::UnexpectedChar('@'),
            LexErrorKind::MalformedNumber("09".to_string()),
            LexErrorKind::EmptyChar,
            LexErrorKind::UnexpectedChar('$'),
        ]
    );
    assert_eq!(errors[3].span.line, 3);
    assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));

    // tokenize stops at the first error
    assert_eq!(
        tokenize(source).unwrap_err().kind,
        LexErrorKind::UnexpectedChar('@')
    );
}

#[test]
fn test_malformed_literals_are_lexical_errors() {
    for literal in ["123abc", "1lul", "0x", "1e", "09"] {
        let source = format!("int x = {literal};");
        let err = parse_default(&source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lexical, "{literal}");
        assert_eq!(err.span().len, literal.len(), "{literal}");
    }
}

#[test]
fn test_diagnostic_rendering() {
    let source = "int main(void) {\n    int x = 1\n    return x;\n}\n";
    let config = FrontendConfig::new("main.c");
    let err = parse(source, &config).unwrap_err();
    let diag = Diagnostic::from_error(&err, source, &config);

    assert_eq!(
        diag.to_string(),
        "main.c:3:5: syntax error: expected ';' after variable declaration, found 'return'"
    );
    let rendered = diag.render(source);
    assert!(rendered.contains(" --> main.c:3:5\n"), "{rendered}");
    assert!(rendered.contains("3 |     return x;\n"), "{rendered}");
    assert!(rendered.contains("  |     ^^^^^^\n"), "{rendered}");
}

#[test]
fn test_parses_on_separate_threads() {
    let handles: Vec<_> = (0..4)
        .map(|n| {
            std::thread::spawn(move || {
                let source = format!("int main(void) {{ return {n}; }}");
                parse_default(&source).map(|program| program.to_string())
            })
        })
        .collect();

    for (n, handle) in handles.into_iter().enumerate() {
        let dump = handle.join().unwrap().unwrap();
        assert!(dump.contains(&format!("return {n};")));
    }
}

#[test]
fn test_full_program() {
    let source = r#"
        extern int putchar(int c);
        static unsigned char *cursor;

        int print_digits(unsigned long n) {
            if (n >= 10ul)
                print_digits(n / 10);
            return putchar('0' + (int) (n % 10));
        }

        int main(void) {
            long total = 0L;
            int i = 0;
            do {
                total += i << 2 | 1;
                if (total > 100 && !(i & 1))
                    goto done;
            } while (++i < 20);
        done:
            print_digits(total);
            return total != 0 ? 0 : 1;
        }
    "#;

    let program = parse_default(source).expect("Parsing failed");
    assert_eq!(program.declarations.len(), 4);
    assert_eq!(
        program
            .declarations
            .iter()
            .map(Declaration::name)
            .collect::<Vec<_>>(),
        vec!["putchar", "cursor", "print_digits", "main"]
    );

    let Declaration::Variable(cursor) = &program.declarations[1] else {
        panic!("Expected variable");
    };
    assert_eq!(cursor.storage, Some(StorageClass::Static));
    assert_eq!(cursor.var_type.base, BaseType::UnsignedChar);
    assert!(cursor.var_type.is_pointer());

    let dump = program.to_string();
    assert!(dump.contains("(total += ((i << 2) | 1));"), "{dump}");
    assert!(dump.contains("if (((total > 100) && (!(i & 1))))"), "{dump}");
    assert!(dump.contains("while ((++i) < 20);"), "{dump}");
}
