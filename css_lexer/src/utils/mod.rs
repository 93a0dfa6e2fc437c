//! Shared source-location types used by the lexer, its diagnostics, and logging.

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
