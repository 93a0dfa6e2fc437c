//! Read-only token stream handed to downstream consumers
//!
//! Tokens keep the span of the character that caused their emission, so a
//! consumer can point back into the source for any token it rejects.

use crate::{
    tokens::token::*,
    utils::{SourceMap, Span, Spanned},
};
use serde::Serialize;
use std::collections::BTreeMap;

/// A token with span information
pub type SpannedToken = Spanned<Token>;

#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<SpannedToken>,
    position: usize,
    source_map: Option<SourceMap>,
}

impl TokenStream {
    pub fn new(tokens: Vec<SpannedToken>) -> Self {
        Self {
            tokens,
            position: 0,
            source_map: None,
        }
    }

    /// Create stream with source map for error rendering
    pub fn with_source_map(tokens: Vec<SpannedToken>, source_map: SourceMap) -> Self {
        Self {
            tokens,
            position: 0,
            source_map: Some(source_map),
        }
    }

    // === NAVIGATION ===

    pub fn current(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.position)
    }

    pub fn current_token(&self) -> Option<&Token> {
        self.current().map(|spanned| &spanned.value)
    }

    pub fn peek(&self) -> Option<&SpannedToken> {
        self.peek_ahead(1)
    }

    pub fn peek_ahead(&self, n: usize) -> Option<&SpannedToken> {
        self.tokens.get(self.position + n)
    }

    /// Advance to the next token and return it
    pub fn advance(&mut self) -> Option<&SpannedToken> {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        self.current()
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    // === WHOLE-STREAM ACCESS ===

    pub fn tokens(&self) -> &[SpannedToken] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().map(|spanned| &spanned.value)
    }

    pub fn kinds(&self) -> Vec<TokenKind> {
        self.iter().map(Token::kind).collect()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens.into_iter().map(Spanned::into_inner).collect()
    }

    pub fn source_map(&self) -> Option<&SourceMap> {
        self.source_map.as_ref()
    }

    /// Render every token back to compact stylesheet text
    pub fn to_css(&self) -> String {
        self.iter().map(Token::to_css).collect()
    }

    /// Count tokens per kind
    pub fn counts(&self) -> TokenCounts {
        let mut by_kind = BTreeMap::new();
        for token in self.iter() {
            *by_kind.entry(token.kind().as_str()).or_insert(0) += 1;
        }
        TokenCounts {
            total: self.tokens.len(),
            by_kind,
        }
    }

    /// Whether every start token is closed by an end token of the same family,
    /// with proper nesting
    pub fn is_balanced(&self) -> bool {
        self.first_unbalanced().is_none()
    }

    /// Span of the first token that breaks start/end pairing, if any.
    /// An unclosed start is reported at the start token itself.
    pub fn first_unbalanced(&self) -> Option<Span> {
        let mut open: Vec<(BlockFamily, Span)> = Vec::new();

        for spanned in &self.tokens {
            let kind = spanned.value.kind();
            if let Some(family) = kind.opens() {
                open.push((family, spanned.span));
            } else if let Some(family) = kind.closes() {
                match open.pop() {
                    Some((opened, _)) if opened == family => {}
                    _ => return Some(spanned.span),
                }
            }
        }

        open.last().map(|(_, span)| *span)
    }

    /// Render a message pointing at a token, using the source map when present
    pub fn format_error_at(&self, index: usize, message: &str) -> String {
        match (self.tokens.get(index), &self.source_map) {
            (Some(spanned), Some(map)) => map.format_error(&spanned.span, message),
            (Some(spanned), None) => format!("error: {} at {}", message, spanned.span),
            (None, _) => format!("error: {}", message),
        }
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a SpannedToken;
    type IntoIter = std::slice::Iter<'a, SpannedToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Per-kind token totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenCounts {
    pub total: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
}

impl TokenCounts {
    pub fn get(&self, kind: TokenKind) -> usize {
        self.by_kind.get(kind.as_str()).copied().unwrap_or(0)
    }
}
