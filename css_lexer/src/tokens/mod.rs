//! Token types emitted by the stylesheet lexer
//!
//! Tokens are flat: nesting is expressed by `*Start` / `*End` pairs rather than
//! by a tree, so consumers walk the stream once.

pub mod token;
pub mod token_stream;

pub use token::{BlockFamily, Declaration, Token, TokenKind};
pub use token_stream::{SpannedToken, TokenCounts, TokenStream};
