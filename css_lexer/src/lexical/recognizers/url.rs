//! `url(...)` arguments
//!
//! While the lock is held no other recognizer sees the argument, so `;` `:`
//! and `)` inside quotes never end a declaration early.

use crate::lexical::diagnostics::DiagnosticKind;
use crate::lexical::recognizer::{CharEvent, Outcome, Recognizer, ScanContext, TriggerStates};
use crate::lexical::state::LexState;

use super::ends_with_escape;

pub const NAME: &str = "url";

#[derive(Debug, Default)]
pub struct UrlRecognizer {
    /// Open quote inside the argument
    quote: Option<char>,
}

impl UrlRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn close(&mut self, ctx: &mut ScanContext<'_>) {
        ctx.append(')');
        ctx.pop_state();
        ctx.unlock();
        self.quote = None;
    }

    fn consume_locked(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        let escaped = ends_with_escape(ctx.buffer().as_str());
        match event.current {
            '"' | '\'' => {
                match self.quote {
                    None => self.quote = Some(event.current),
                    Some(open) if open == event.current && !escaped => self.quote = None,
                    Some(_) => {}
                }
                Outcome::NotHandled
            }
            '\n' if escaped => {
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
                self.close(ctx);
                Outcome::Handled
            }
            ')' if self.quote.is_none() && !escaped => {
                self.close(ctx);
                Outcome::Handled
            }
            _ => Outcome::NotHandled,
        }
    }
}

impl Recognizer for UrlRecognizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn trigger_chars(&self) -> &[char] {
        &['(', ')', '\n']
    }

    fn trigger_states(&self) -> TriggerStates {
        TriggerStates::Any
    }

    fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        if ctx.holds_lock() {
            return self.consume_locked(event, ctx);
        }

        if event.current == '('
            && event.state != LexState::Url
            && ctx.source().preceded_by_ci(event.position, "url")
        {
            ctx.push_state(LexState::Url);
            ctx.lock_exclusive();
            ctx.append('(');
            self.quote = None;
            return Outcome::Handled;
        }

        Outcome::NotHandled
    }

    fn reset(&mut self) {
        self.quote = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::scan;
    use crate::tokens::{Declaration, Token};

    fn first_value(css: &str) -> Option<String> {
        scan(css)
            .tokens
            .iter()
            .find_map(|t| t.value.declaration().map(|d| d.value.clone()))
    }

    #[test]
    fn test_quoted_argument_keeps_separators() {
        assert_eq!(
            first_value(".a{background:url(\"a;b:c).png\")}").as_deref(),
            Some("url(\"a;b:c).png\")")
        );
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let output = scan(".a{src:URL(x{y})}");
        assert!(output.diagnostics.is_empty());
        assert_eq!(
            output.tokens[1].value,
            Token::RulesetDeclaration(Declaration::new("src", "URL(x{y})", false))
        );
    }

    #[test]
    fn test_plain_parentheses_are_content() {
        assert_eq!(
            first_value(".a{width:calc(1px + 2px)}").as_deref(),
            Some("calc(1px + 2px)")
        );
    }

    #[test]
    fn test_escaped_newline_is_removed() {
        let output = scan(".a{background:url(a\\\nb)}");
        assert!(output.diagnostics.is_empty());
        assert_eq!(
            output.tokens[1].value.declaration().map(|d| d.value.as_str()),
            Some("url(ab)")
        );
    }

    #[test]
    fn test_bare_newline_closes_with_diagnostic() {
        let output = scan(".a{background:url(a\nb;}");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::UnterminatedString);
        assert_eq!(output.diagnostics[0].recovered_text.as_deref(), Some("url(a"));
        assert_eq!(output.diagnostics[0].span.start.line, 1);
        assert_eq!(
            output.tokens[1].value.declaration().map(|d| d.value.as_str()),
            Some("url(a)b")
        );
        assert_eq!(output.stats.final_depth, 1);
    }

    #[test]
    fn test_escaped_backslash_before_close() {
        let output = scan(".a{b:url(x\\\\)}.c{d:e}");
        assert!(output.is_clean());
        assert_eq!(
            output.token_values(),
            vec![
                Token::ruleset_start([".a"]),
                Token::RulesetDeclaration(Declaration::new("b", "url(x\\\\)", false)),
                Token::RulesetEnd,
                Token::ruleset_start([".c"]),
                Token::RulesetDeclaration(Declaration::new("d", "e", false)),
                Token::RulesetEnd,
            ]
        );
    }

    #[test]
    fn test_escaped_backslash_before_closing_quote() {
        let output = scan(".a{b:url(\"x\\\\\")}.c{d:e}");
        assert!(output.is_clean());
        assert_eq!(
            first_value(".a{b:url(\"x\\\\\")}").as_deref(),
            Some("url(\"x\\\\\")")
        );
        assert_eq!(output.tokens.len(), 6);
    }

    #[test]
    fn test_escaped_close_stays_inside() {
        assert_eq!(
            first_value(".a{b:url(x\\)y)}").as_deref(),
            Some("url(x\\)y)")
        );
    }

    #[test]
    fn test_escaped_backslash_before_newline() {
        let output = scan(".a{b:url(x\\\\\n}");
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::UnterminatedString);
        assert_eq!(output.stats.final_depth, 1);
    }
}
