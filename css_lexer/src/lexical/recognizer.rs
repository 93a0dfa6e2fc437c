//! Recognizer protocol
//!
//! A recognizer is a small state machine that reacts to single characters.
//! It never touches driver internals directly: everything goes through the
//! `ScanContext` handed to `try_consume`.

use super::buffer::Buffer;
use super::diagnostics::{Diagnostic, DiagnosticKind};
use super::driver::ScanSession;
use super::source::Source;
use super::state::LexState;
use crate::tokens::Token;
use crate::utils::{Span, Spanned};
use std::fmt;

/// Index of a recognizer in its registry; lower ids are tried first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecognizerId(pub(crate) usize);

impl RecognizerId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecognizerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// States in which a recognizer is eligible
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerStates {
    Any,
    Only(Vec<LexState>),
}

impl TriggerStates {
    pub fn includes(&self, state: LexState) -> bool {
        match self {
            TriggerStates::Any => true,
            TriggerStates::Only(states) => states.contains(&state),
        }
    }
}

/// Result of offering one character to a recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Let the next candidate try; if none claims it the character is buffered
    NotHandled,
    /// Character consumed; advance by one
    Handled,
    /// Fixed-width lexeme consumed; continue scanning at this position
    Skip(usize),
}

/// The character being offered, with its surroundings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharEvent {
    pub position: usize,
    pub current: char,
    /// Source character at `position - 1`
    pub previous: Option<char>,
    pub state: LexState,
}

pub trait Recognizer: Send {
    /// Unique within a registry
    fn name(&self) -> &'static str;

    /// A recognizer with no trigger characters is never consulted
    fn trigger_chars(&self) -> &[char];

    fn trigger_states(&self) -> TriggerStates;

    fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome;

    /// Drop transient fields before a new scan
    fn reset(&mut self) {}
}

/// Capability object through which a recognizer mutates scan state
pub struct ScanContext<'a> {
    source: &'a Source,
    session: &'a mut ScanSession,
    position: usize,
    self_id: RecognizerId,
}

impl<'a> ScanContext<'a> {
    pub(crate) fn new(
        source: &'a Source,
        session: &'a mut ScanSession,
        position: usize,
        self_id: RecognizerId,
    ) -> Self {
        Self {
            source,
            session,
            position,
            self_id,
        }
    }

    // === SOURCE ===

    pub fn source(&self) -> &Source {
        self.source
    }

    pub fn position(&self) -> usize {
        self.position
    }

    // === BUFFER ===

    pub fn buffer(&self) -> &Buffer {
        &self.session.buffer
    }

    pub fn append(&mut self, ch: char) {
        self.session.buffer.append(ch);
    }

    pub fn append_str(&mut self, text: &str) {
        self.session.buffer.append_str(text);
    }

    pub fn clear_buffer(&mut self) {
        self.session.buffer.clear();
    }

    pub fn set_buffer(&mut self, text: String) {
        self.session.buffer.set(text);
    }

    pub fn truncate_buffer_last(&mut self, ch: char) -> bool {
        self.session.buffer.truncate_last(ch)
    }

    pub fn take_buffer(&mut self, stop_chars: &[char], trim: bool) -> String {
        self.session.buffer.take_and_clear(stop_chars, trim)
    }

    // === STATE STACK ===

    pub fn state(&self) -> LexState {
        self.session.stack.top()
    }

    pub fn depth(&self) -> usize {
        self.session.stack.depth()
    }

    pub fn push_state(&mut self, state: LexState) {
        self.session.stack.push(state);
    }

    pub fn set_state(&mut self, state: LexState) {
        self.session.stack.set_top(state);
    }

    /// Pop the top state. Popping the document sentinel is a recognizer bug.
    pub fn pop_state(&mut self) -> LexState {
        match self.session.stack.pop() {
            Ok(state) => state,
            Err(underflow) => panic!(
                "recognizer {} at position {}: {}",
                self.self_id, self.position, underflow
            ),
        }
    }

    // === TOKENS ===

    /// Emit a token spanning the current character
    pub fn emit(&mut self, token: Token) {
        self.emit_from(token, self.position);
    }

    /// Emit a token spanning `start..=position`
    pub fn emit_from(&mut self, token: Token, start: usize) {
        let start = self.source.position_at(start.min(self.position));
        let end = self.source.position_at(self.position + 1);
        self.session.tokens.push(Spanned::new(token, Span::new(start, end)));
    }

    // === EXCLUSIVITY LOCK ===

    /// Route every following character to this recognizer only
    pub fn lock_exclusive(&mut self) {
        self.session.lock = Some(self.self_id);
    }

    /// Release the lock. Releasing a lock held by someone else is a recognizer bug.
    pub fn unlock(&mut self) {
        if self.session.lock != Some(self.self_id) {
            panic!(
                "recognizer {} at position {} released a lock it does not hold ({:?})",
                self.self_id, self.position, self.session.lock
            );
        }
        self.session.lock = None;
    }

    pub fn holds_lock(&self) -> bool {
        self.session.lock == Some(self.self_id)
    }

    // === DIAGNOSTICS ===

    /// Record an anomaly at the current character
    pub fn report(&mut self, kind: DiagnosticKind, message: &str, recovered_text: Option<String>) {
        let span = Span::single(self.source.position_at(self.position));
        let mut diagnostic = Diagnostic::new(kind, message, span, self.state());
        if let Some(text) = recovered_text {
            diagnostic = diagnostic.with_recovered_text(text);
        }
        self.session.record(diagnostic);
    }
}
