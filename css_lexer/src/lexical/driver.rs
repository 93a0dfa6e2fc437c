//! Scan driver: walks the source one character at a time and dispatches it
//! to the registered recognizers.

use super::buffer::Buffer;
use super::diagnostics::{AbortReason, Diagnostic, DiagnosticKind};
use super::recognizer::{CharEvent, Outcome, RecognizerId, ScanContext};
use super::registry::RecognizerRegistry;
use super::source::Source;
use super::state::{LexState, StateStack};
use super::ScanOutput;
use crate::config::compile_time::lexical::*;
use crate::config::runtime::LexicalPreferences;
use crate::logging::codes;
use crate::tokens::Token;
use crate::utils::{Span, Spanned};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ============================================================================
// SCAN SESSION
// ============================================================================

/// Mutable state owned by one scan
#[derive(Debug)]
pub struct ScanSession {
    pub(crate) buffer: Buffer,
    pub(crate) stack: StateStack,
    pub(crate) tokens: Vec<Spanned<Token>>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) lock: Option<RecognizerId>,
    pub(crate) suppressed_diagnostics: usize,
    include_recovered_text: bool,
}

impl ScanSession {
    pub(crate) fn new(include_recovered_text: bool) -> Self {
        Self {
            buffer: Buffer::new(),
            stack: StateStack::new(),
            tokens: Vec::new(),
            diagnostics: Vec::new(),
            lock: None,
            suppressed_diagnostics: 0,
            include_recovered_text,
        }
    }

    /// Keep a diagnostic unless the per-scan limit is reached
    pub(crate) fn record(&mut self, mut diagnostic: Diagnostic) {
        if self.diagnostics.len() >= MAX_DIAGNOSTICS {
            self.suppressed_diagnostics += 1;
            return;
        }
        if !self.include_recovered_text {
            diagnostic.recovered_text = None;
        }
        self.diagnostics.push(diagnostic);
    }
}

// ============================================================================
// DRIVER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Locked(RecognizerId),
    Done,
}

/// Counters describing how a scan ended
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub source_chars: usize,
    pub iterations: usize,
    /// State stack depth at end of source; 1 means every construct closed
    pub final_depth: usize,
    pub ended_locked: bool,
    pub aborted: Option<AbortReason>,
    pub suppressed_diagnostics: usize,
}

pub struct ScanDriver {
    registry: RecognizerRegistry,
    budget: usize,
    cancel: Option<Arc<AtomicBool>>,
    emit_trailing_content: bool,
    log_dispatch: bool,
    include_recovered_text: bool,
}

impl ScanDriver {
    pub fn new(registry: RecognizerRegistry) -> Self {
        Self::with_preferences(registry, &LexicalPreferences::default())
    }

    pub fn with_preferences(registry: RecognizerRegistry, preferences: &LexicalPreferences) -> Self {
        Self {
            registry,
            budget: preferences.effective_budget(),
            cancel: None,
            emit_trailing_content: preferences.emit_trailing_content,
            log_dispatch: preferences.log_dispatch,
            include_recovered_text: preferences.include_recovered_text,
        }
    }

    /// Cap on loop iterations, never above the build profile's ceiling
    pub fn with_budget(mut self, budget: usize) -> Self {
        self.budget = budget.min(MAX_SCAN_ITERATIONS);
        self
    }

    /// Shared flag polled once per character
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn registry(&self) -> &RecognizerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RecognizerRegistry {
        &mut self.registry
    }

    pub fn scan(&mut self, text: &str) -> ScanOutput {
        self.scan_source(&Source::new(text))
    }

    pub fn scan_source(&mut self, source: &Source) -> ScanOutput {
        crate::log_debug!("Scan started",
            "chars" => source.len(),
            "recognizers" => self.registry.len(),
            "budget" => self.budget
        );

        self.registry.reset_all();
        let mut session = ScanSession::new(self.include_recovered_text);
        let mut candidates: Vec<RecognizerId> = Vec::new();
        let mut driver_state = DriverState::Running;
        let mut position = 0;
        let mut iterations = 0;
        let mut aborted = None;

        while position < source.len() {
            if let Some(reason) = self.check_limits(iterations, &session) {
                aborted = Some(reason);
                break;
            }
            iterations += 1;

            let Some(current) = source.char_at(position) else {
                break;
            };
            let event = CharEvent {
                position,
                current,
                previous: position.checked_sub(1).and_then(|p| source.char_at(p)),
                state: session.stack.top(),
            };

            let outcome = match driver_state {
                DriverState::Locked(id) => self.offer(id, event, source, &mut session),
                _ => {
                    self.registry.candidates(current, event.state, &mut candidates);
                    let mut outcome = Outcome::NotHandled;
                    for &id in &candidates {
                        outcome = self.offer(id, event, source, &mut session);
                        if outcome != Outcome::NotHandled {
                            break;
                        }
                    }
                    outcome
                }
            };

            position = match outcome {
                Outcome::NotHandled => {
                    session.buffer.append(current);
                    position + 1
                }
                Outcome::Handled => position + 1,
                Outcome::Skip(target) => {
                    if target <= position {
                        panic!(
                            "recognizer requested Skip({}) at position {}: skips must move forward",
                            target, position
                        );
                    }
                    target.min(source.len())
                }
            };

            // Lock changes made during this character apply to the next one
            let next_state = match session.lock {
                Some(id) => DriverState::Locked(id),
                None => DriverState::Running,
            };
            if next_state != driver_state && self.log_dispatch {
                crate::log_debug!("Driver state changed",
                    "from" => format!("{:?}", driver_state),
                    "to" => format!("{:?}", next_state),
                    "position" => position
                );
            }
            driver_state = next_state;
        }

        let ended_locked = matches!(driver_state, DriverState::Locked(_));
        driver_state = DriverState::Done;
        debug_assert_eq!(driver_state, DriverState::Done);

        self.finalize(source, session, position, iterations, ended_locked, aborted)
    }

    fn offer(
        &mut self,
        id: RecognizerId,
        event: CharEvent,
        source: &Source,
        session: &mut ScanSession,
    ) -> Outcome {
        let log_dispatch = self.log_dispatch;
        let Some(recognizer) = self.registry.get_mut(id) else {
            return Outcome::NotHandled;
        };
        let mut ctx = ScanContext::new(source, session, event.position, id);
        let outcome = recognizer.try_consume(event, &mut ctx);

        if log_dispatch && outcome != Outcome::NotHandled {
            crate::log_debug!("Character consumed",
                "recognizer" => recognizer.name(),
                "char" => event.current.escape_debug(),
                "position" => event.position,
                "state" => event.state,
                "outcome" => format!("{:?}", outcome)
            );
        }
        outcome
    }

    fn check_limits(&self, iterations: usize, session: &ScanSession) -> Option<AbortReason> {
        if iterations >= self.budget {
            return Some(AbortReason::BudgetExhausted {
                budget: self.budget,
            });
        }
        if let Some(flag) = &self.cancel {
            if flag.load(Ordering::Relaxed) {
                return Some(AbortReason::Cancelled);
            }
        }
        if session.tokens.len() >= MAX_TOKEN_COUNT {
            return Some(AbortReason::TokenLimit {
                limit: MAX_TOKEN_COUNT,
            });
        }
        if session.stack.depth() > MAX_STATE_DEPTH {
            return Some(AbortReason::DepthLimit {
                limit: MAX_STATE_DEPTH,
            });
        }
        None
    }

    /// End of source: report what is still open and flush the buffer
    fn finalize(
        &self,
        source: &Source,
        mut session: ScanSession,
        position: usize,
        iterations: usize,
        ended_locked: bool,
        aborted: Option<AbortReason>,
    ) -> ScanOutput {
        let at = Span::single(source.position_at(position));
        let innermost = session.stack.top();
        let unterminated = !session.stack.is_at_sentinel() || ended_locked;

        if let Some(reason) = aborted {
            session.record(Diagnostic::new(
                DiagnosticKind::ScanAborted,
                format!("scan stopped at character {}: {}", position, reason),
                at,
                innermost,
            ));
        }

        if unterminated {
            let diagnostic = Diagnostic::new(
                DiagnosticKind::UnterminatedConstruct,
                format!("unterminated {} at end of source", innermost.describe()),
                at,
                innermost,
            )
            .with_recovered_text(session.buffer.snapshot());
            session.record(diagnostic);
        }

        if self.emit_trailing_content && session.buffer.has_content() {
            let text = session.buffer.take_and_clear(&[], true);
            session.tokens.push(Spanned::new(
                Token::TrailingContent { text: text.clone() },
                at,
            ));
            if !unterminated && aborted.is_none() {
                session.record(
                    Diagnostic::new(
                        DiagnosticKind::DanglingContent,
                        "content at end of source does not belong to any rule",
                        at,
                        LexState::Document,
                    )
                    .with_recovered_text(text),
                );
            }
        }

        for diagnostic in &session.diagnostics {
            diagnostic.log();
        }

        let stats = ScanStats {
            source_chars: source.len(),
            iterations,
            final_depth: session.stack.depth(),
            ended_locked,
            aborted,
            suppressed_diagnostics: session.suppressed_diagnostics,
        };

        crate::log_success!(codes::success::SCAN_COMPLETE, "Scan completed",
            "tokens" => session.tokens.len(),
            "diagnostics" => session.diagnostics.len(),
            "iterations" => iterations
        );

        ScanOutput {
            tokens: session.tokens,
            diagnostics: session.diagnostics,
            stats,
        }
    }
}

impl Default for ScanDriver {
    fn default() -> Self {
        Self::new(RecognizerRegistry::with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::recognizer::{Recognizer, TriggerStates};
    use assert_matches::assert_matches;

    /// Claims `!` by jumping backward
    struct Rewinder;

    impl Recognizer for Rewinder {
        fn name(&self) -> &'static str {
            "rewinder"
        }
        fn trigger_chars(&self) -> &[char] {
            &['!']
        }
        fn trigger_states(&self) -> TriggerStates {
            TriggerStates::Any
        }
        fn try_consume(&mut self, event: CharEvent, _ctx: &mut ScanContext<'_>) -> Outcome {
            Outcome::Skip(event.position.saturating_sub(1))
        }
    }

    /// Locks on `<` and records every character it is offered until `>`
    #[derive(Default)]
    struct Angle {
        seen: Vec<char>,
    }

    impl Recognizer for Angle {
        fn name(&self) -> &'static str {
            "angle"
        }
        fn trigger_chars(&self) -> &[char] {
            &['<']
        }
        fn trigger_states(&self) -> TriggerStates {
            TriggerStates::Only(vec![LexState::Document])
        }
        fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
            if ctx.holds_lock() {
                self.seen.push(event.current);
                if event.current == '>' {
                    let inner = ctx.take_buffer(&[], false);
                    ctx.emit(Token::comment(inner));
                    ctx.unlock();
                    return Outcome::Handled;
                }
                return Outcome::NotHandled;
            }
            ctx.lock_exclusive();
            Outcome::Handled
        }
        fn reset(&mut self) {
            self.seen.clear();
        }
    }

    #[test]
    #[should_panic(expected = "skips must move forward")]
    fn test_backward_skip_is_fatal() {
        let mut registry = RecognizerRegistry::new();
        registry.register(Box::new(Rewinder)).unwrap();
        ScanDriver::new(registry).scan("a!");
    }

    #[test]
    fn test_locked_recognizer_sees_every_character() {
        let mut registry = RecognizerRegistry::new();
        registry.register(Box::new(Angle::default())).unwrap();
        let mut driver = ScanDriver::new(registry);

        let output = driver.scan("<a{b}>");
        assert_eq!(output.token_values(), vec![Token::comment("a{b}")]);
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.stats.final_depth, 1);
        assert!(!output.stats.ended_locked);
    }

    #[test]
    fn test_unclosed_lock_is_reported() {
        let mut registry = RecognizerRegistry::new();
        registry.register(Box::new(Angle::default())).unwrap();
        let output = ScanDriver::new(registry).scan("<abc");

        assert!(output.stats.ended_locked);
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::UnterminatedConstruct);
        assert_eq!(
            output.token_values(),
            vec![Token::TrailingContent {
                text: "abc".to_string()
            }]
        );
    }

    #[test]
    fn test_budget_aborts_scan() {
        let mut driver = ScanDriver::default().with_budget(4);
        let output = driver.scan("a{color:red}");

        assert_matches!(
            output.stats.aborted,
            Some(AbortReason::BudgetExhausted { budget: 4 })
        );
        assert_eq!(output.stats.iterations, 4);
        let kinds: Vec<_> = output.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::ScanAborted, DiagnosticKind::UnterminatedConstruct]
        );
    }

    #[test]
    fn test_cancel_flag() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut driver = ScanDriver::default().with_cancel_flag(flag.clone());
        let output = driver.scan("a{}");
        assert_matches!(output.stats.aborted, Some(AbortReason::Cancelled));
        assert!(output.tokens.is_empty());

        flag.store(false, Ordering::Relaxed);
        let output = driver.scan("a{}");
        assert!(output.stats.aborted.is_none());
        assert_eq!(output.tokens.len(), 2);
    }

    #[test]
    fn test_driver_is_reusable() {
        let mut driver = ScanDriver::default();
        let first = driver.scan("/* open");
        assert!(first.stats.ended_locked);

        let second = driver.scan(".a{color:red}");
        assert!(second.diagnostics.is_empty());
        assert_eq!(second.tokens.len(), 3);
    }
}
