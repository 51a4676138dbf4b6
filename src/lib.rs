//! # Introduction
//!
//! `subc` is the front end of a staged C-subset compiler. It turns
//! preprocessed C source text into a validated abstract syntax tree, or into
//! the first lexical or syntax error with its exact source location.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST
//!                     ↘ ParseError → Diagnostic
//! ```
//!
//! 1. [`parser::lexer`] pulls tokens from the source on demand.
//! 2. [`parser::parse::Parser`] builds a [`Program`] by recursive descent,
//!    binding every `break`/`continue`/`case` to its loop or switch label.
//! 3. [`diagnostics`] turns a [`ParseError`] into a renderable [`Diagnostic`].
//!
//! ```
//! let config = subc::FrontendConfig::new("main.c");
//! let program = subc::parse("int main(void) { return 0; }", &config).unwrap();
//! assert_eq!(program.declarations.len(), 1);
//! ```
//!
//! The library never reads files and installs no `tracing` subscriber; both
//! belong to the driver.

pub mod config;
pub mod diagnostics;
pub mod parser;
pub mod span;

pub use config::FrontendConfig;
pub use diagnostics::Diagnostic;
pub use parser::ast::Program;
pub use parser::parse::{ErrorKind, ParseError, Parser};
pub use span::{Position, Span};

/// Parse a whole translation unit.
pub fn parse(source: &str, config: &FrontendConfig) -> Result<Program, ParseError> {
    tracing::debug!(
        source = %config.source_name,
        bytes = source.len(),
        "parsing translation unit"
    );

    let result = Parser::with_config(source, config).parse_program();

    match &result {
        Ok(program) => tracing::debug!(
            source = %config.source_name,
            declarations = program.declarations.len(),
            "parse succeeded"
        ),
        Err(err) => tracing::debug!(
            source = %config.source_name,
            kind = %err.kind(),
            error = %err,
            "parse failed"
        ),
    }

    result
}
