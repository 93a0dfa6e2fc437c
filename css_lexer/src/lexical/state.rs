//! Lexer states and the state stack

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lexical mode. Grouped by the recognizer family that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LexState {
    /// Sentinel; always at the bottom of the stack
    Document,

    AtCharset,

    AtFontFacePrepare,
    AtFontFace,
    AtFontFaceDeclaration,

    AtPagePrepare,
    AtPage,
    AtPageDeclaration,

    AtVariablesPrepare,
    AtVariables,
    AtVariablesDeclaration,

    AtMediaPrepare,
    AtMedia,

    RulesetSelectors,
    Ruleset,
    RulesetDeclaration,

    Comment,
    Url,
    String,
}

impl LexState {
    pub const ALL: [LexState; 19] = [
        LexState::Document,
        LexState::AtCharset,
        LexState::AtFontFacePrepare,
        LexState::AtFontFace,
        LexState::AtFontFaceDeclaration,
        LexState::AtPagePrepare,
        LexState::AtPage,
        LexState::AtPageDeclaration,
        LexState::AtVariablesPrepare,
        LexState::AtVariables,
        LexState::AtVariablesDeclaration,
        LexState::AtMediaPrepare,
        LexState::AtMedia,
        LexState::RulesetSelectors,
        LexState::Ruleset,
        LexState::RulesetDeclaration,
        LexState::Comment,
        LexState::Url,
        LexState::String,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LexState::Document => "document",
            LexState::AtCharset => "at-charset",
            LexState::AtFontFacePrepare => "at-font-face-prepare",
            LexState::AtFontFace => "at-font-face",
            LexState::AtFontFaceDeclaration => "at-font-face-declaration",
            LexState::AtPagePrepare => "at-page-prepare",
            LexState::AtPage => "at-page",
            LexState::AtPageDeclaration => "at-page-declaration",
            LexState::AtVariablesPrepare => "at-variables-prepare",
            LexState::AtVariables => "at-variables",
            LexState::AtVariablesDeclaration => "at-variables-declaration",
            LexState::AtMediaPrepare => "at-media-prepare",
            LexState::AtMedia => "at-media",
            LexState::RulesetSelectors => "ruleset-selectors",
            LexState::Ruleset => "ruleset",
            LexState::RulesetDeclaration => "ruleset-declaration",
            LexState::Comment => "comment",
            LexState::Url => "url",
            LexState::String => "string",
        }
    }

    /// Human description used in unterminated-construct diagnostics
    pub fn describe(&self) -> &'static str {
        match self {
            LexState::Document => "document",
            LexState::AtCharset => "@charset rule",
            LexState::AtFontFacePrepare | LexState::AtFontFace => "@font-face block",
            LexState::AtPagePrepare | LexState::AtPage => "@page block",
            LexState::AtVariablesPrepare | LexState::AtVariables => "@variables block",
            LexState::AtMediaPrepare | LexState::AtMedia => "@media block",
            LexState::RulesetSelectors | LexState::Ruleset => "ruleset",
            LexState::AtFontFaceDeclaration
            | LexState::AtPageDeclaration
            | LexState::AtVariablesDeclaration
            | LexState::RulesetDeclaration => "declaration",
            LexState::Comment => "comment",
            LexState::Url => "url()",
            LexState::String => "string",
        }
    }
}

impl fmt::Display for LexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot pop the document state: the state stack is already at its sentinel")]
pub struct StateUnderflow;

/// LIFO stack of lexer states that never loses its `Document` sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStack {
    states: Vec<LexState>,
}

impl StateStack {
    pub fn new() -> Self {
        Self {
            states: vec![LexState::Document],
        }
    }

    pub fn push(&mut self, state: LexState) {
        self.states.push(state);
    }

    pub fn pop(&mut self) -> Result<LexState, StateUnderflow> {
        if self.states.len() <= 1 {
            return Err(StateUnderflow);
        }
        self.states.pop().ok_or(StateUnderflow)
    }

    /// Replace the top without changing depth. The sentinel itself is never
    /// replaced; in that case the state is pushed instead.
    pub fn set_top(&mut self, state: LexState) {
        if self.states.len() <= 1 {
            self.states.push(state);
        } else if let Some(top) = self.states.last_mut() {
            *top = state;
        }
    }

    pub fn top(&self) -> LexState {
        self.states.last().copied().unwrap_or(LexState::Document)
    }

    pub fn depth(&self) -> usize {
        self.states.len()
    }

    pub fn is_at_sentinel(&self) -> bool {
        self.states.len() == 1
    }

    pub fn contains(&self, state: LexState) -> bool {
        self.states.contains(&state)
    }

    /// Bottom to top
    pub fn states(&self) -> &[LexState] {
        &self.states
    }
}

impl Default for StateStack {
    fn default() -> Self {
        Self::new()
    }
}
