//! Front-end configuration
//!
//! [`FrontendConfig`] carries the knobs a driver may want to set before
//! parsing a translation unit. Every field has a sensible default, so
//! `FrontendConfig::default()` is what most callers use.

/// Default bound on statement/expression nesting.
///
/// One level (a nested statement, a parenthesized operand, a unary operator)
/// costs four to seven parser frames. The bound has to hold on the 2 MiB
/// stack of a spawned thread in an unoptimized build, where 100 nested
/// blocks are already too many; 64 leaves headroom for the caller's own
/// frames. `tests/integration_test.rs` parses at this limit on a
/// default-sized thread.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendConfig {
    /// Name reported in diagnostics (usually the input file path).
    pub source_name: String,
    /// Deepest allowed nesting of statements and expressions.
    pub max_nesting_depth: usize,
    /// Skip `# <line> "<file>"` markers left behind by the preprocessor.
    pub skip_line_markers: bool,
}

impl FrontendConfig {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            ..Self::default()
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_line_markers_skipped(mut self, skip: bool) -> Self {
        self.skip_line_markers = skip;
        self
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            source_name: "<input>".to_string(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            skip_line_markers: true,
        }
    }
}
