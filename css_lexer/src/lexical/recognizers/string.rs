//! Quoted strings outside `url(...)`

use crate::lexical::diagnostics::DiagnosticKind;
use crate::lexical::recognizer::{CharEvent, Outcome, Recognizer, ScanContext, TriggerStates};
use crate::lexical::state::LexState;

use super::ends_with_escape;

pub const NAME: &str = "string";

#[derive(Debug, Default)]
pub struct StringRecognizer {
    delimiter: Option<char>,
}

impl StringRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn close(&mut self, delimiter: char, ctx: &mut ScanContext<'_>) {
        ctx.append(delimiter);
        ctx.pop_state();
        ctx.unlock();
        self.delimiter = None;
    }
}

impl Recognizer for StringRecognizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn trigger_chars(&self) -> &[char] {
        &['"', '\'', '\n']
    }

    fn trigger_states(&self) -> TriggerStates {
        TriggerStates::Any
    }

    fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        let Some(delimiter) = self.delimiter.filter(|_| ctx.holds_lock()) else {
            if matches!(event.current, '"' | '\'') {
                ctx.push_state(LexState::String);
                ctx.lock_exclusive();
                ctx.append(event.current);
                self.delimiter = Some(event.current);
                return Outcome::Handled;
            }
            return Outcome::NotHandled;
        };

        match event.current {
            c if c == delimiter && !ends_with_escape(ctx.buffer().as_str()) => {
                self.close(delimiter, ctx);
                Outcome::Handled
            }
            '\n' if ends_with_escape(ctx.buffer().as_str()) => {
                ctx.truncate_buffer_last('\\');
                Outcome::Handled
            }
            '\n' => {
                let pending = ctx.buffer().snapshot();
                ctx.report(
                    DiagnosticKind::UnterminatedString,
                    "unterminated string literal",
                    Some(pending),
                );
                self.close(delimiter, ctx);
                Outcome::Handled
            }
            _ => Outcome::NotHandled,
        }
    }

    fn reset(&mut self) {
        self.delimiter = None;
    }
}
