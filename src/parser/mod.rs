//! C source code parser
//!
//! This module transforms preprocessed C source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens) and literal decoding
//! - [`parse`]: Parser state, errors and the program entry point
//! - `declarations`, `statements`, [`expressions`]: grammar rules
//! - [`ast`]: AST node definitions
//! - [`ast_display`]: fully parenthesized AST dump
//!
//! # Supported C Subset
//!
//! - Types: `int`, `long`, `unsigned`, `signed`, `char`, `double`, `void`, pointers
//! - Storage classes: `static`, `extern`
//! - Statements: declarations, control flow (`if`, `while`, `do`, `for`, `switch`),
//!   `break`, `continue`, `goto` and labels
//! - Expressions: arithmetic, logical, bitwise, assignment, ternary, casts, function calls
//! - No preprocessor (line markers left by one are skipped)
//! - No structs, arrays, typedefs, unions, enums, or function pointers
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod ast;
pub mod ast_display;
mod declarations;
pub mod expressions;
pub mod lexer;
pub mod parse;
mod statements;
