//! Structured diagnostics
//!
//! A [`Diagnostic`] is the driver-facing form of a [`ParseError`]: it carries
//! the source name, the offending lexeme and token kind, and an optional note
//! pointing at a related location (the opener of an unclosed delimiter).
//! [`Diagnostic::render`] draws the terminal excerpt:
//!
//! ```text
//! syntax error: expected ';' after return value, found '}'
//!  --> main.c:1:27
//!   |
//! 1 | int main(void) { return 0 }
//!   |                           ^
//! ```

use std::fmt::{self, Display, Formatter};

use crate::config::FrontendConfig;
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ErrorKind, ParseError, SyntaxError};
use crate::span::Span;

/// Secondary location attached to a diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub span: Span,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub source_name: String,
    pub span: Span,
    /// Source text under `span`, when it covers any
    pub lexeme: Option<String>,
    pub found: Option<TokenKind>,
    pub message: String,
    pub note: Option<Note>,
}

impl Diagnostic {
    /// Build the diagnostic for `err`, named after `config.source_name`
    pub fn from_error(err: &ParseError, source: &str, config: &FrontendConfig) -> Self {
        let span = err.span();
        let text = span.text(source);

        let (message, found, note) = match err {
            ParseError::Lex(lex) => (lex.kind.to_string(), None, None),
            ParseError::Syntax(syntax) => (syntax.to_string(), syntax.found(), note_for(syntax)),
        };

        Self {
            kind: err.kind(),
            source_name: config.source_name.clone(),
            span,
            lexeme: (!text.is_empty()).then(|| text.to_string()),
            found,
            message,
            note,
        }
    }

    /// Render the diagnostic with a source excerpt and caret underline.
    pub fn render(&self, source: &str) -> String {
        let last_line = self
            .note
            .as_ref()
            .map_or(self.span.line, |note| note.span.line.max(self.span.line));
        let width = last_line.to_string().len();
        let gutter = " ".repeat(width);

        let mut out = format!("{} error: {}\n", self.kind, self.message);
        out.push_str(&format!(
            "{gutter}--> {}:{}:{}\n",
            self.source_name, self.span.line, self.span.column
        ));
        out.push_str(&format!("{gutter} |\n"));
        push_excerpt(&mut out, source, self.span, '^', None, width);

        if let Some(note) = &self.note {
            push_excerpt(
                &mut out,
                source,
                note.span,
                '-',
                Some(&note.message),
                width,
            );
        }

        out
    }
}

/// One-line form: `name:line:column: kind error: message`
impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {} error: {}",
            self.source_name, self.span.line, self.span.column, self.kind, self.message
        )
    }
}

fn note_for(err: &SyntaxError) -> Option<Note> {
    match err {
        SyntaxError::UnclosedDelimiter {
            delimiter, opener, ..
        } => {
            let open = match delimiter {
                TokenKind::RBrace => "'{'",
                _ => "'('",
            };
            Some(Note {
                span: *opener,
                message: format!("unclosed {open} opened here"),
            })
        }
        _ => None,
    }
}

fn push_excerpt(
    out: &mut String,
    source: &str,
    span: Span,
    marker: char,
    label: Option<&str>,
    width: usize,
) {
    let line_text = source
        .lines()
        .nth(span.line.saturating_sub(1))
        .unwrap_or_default();

    out.push_str(&format!("{:>width$} | {line_text}\n", span.line));

    // Keep tabs so the underline lines up with the excerpt
    let before = span.column.saturating_sub(1);
    let padding: String = line_text
        .chars()
        .take(before)
        .map(|ch| if ch == '\t' { '\t' } else { ' ' })
        .collect();

    let remaining = line_text.chars().count().saturating_sub(before);
    let covered = span.text(source).chars().take_while(|&ch| ch != '\n').count();
    let underline = marker.to_string().repeat(covered.min(remaining).max(1));

    out.push_str(&format!("{} | {padding}{underline}", " ".repeat(width)));
    if let Some(label) = label {
        out.push_str(&format!(" {label}"));
    }
    out.push('\n');
}
