//! Pluggable character-stream tokenizer for stylesheets
//!
//! Recognizers register for trigger characters and lexical states; the scan
//! driver offers each character to them in priority order and produces a
//! flat token stream plus recoverable diagnostics.

// Internal modules
pub mod batch;
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod pipeline;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use batch::{BatchConfig, BatchError, BatchResults};
pub use lexical::{
    scan, scan_with_preferences, Diagnostic, DiagnosticKind, LexerError, Recognizer,
    RecognizerRegistry, ScanDriver, ScanOutput,
};
pub use pipeline::{lex_file, PipelineError, PipelineResult};
pub use tokens::{Declaration, SpannedToken, Token, TokenKind, TokenStream};

// Serializable view of one lexed file
pub use pipeline::output::PipelineOutput;
