//! `/* ... */` comments
//!
//! A comment can open in any state. The text buffered before `/*` is stashed
//! and restored after `*/`, so a comment inside a selector or value does not
//! disturb what the surrounding recognizer is accumulating.

use crate::lexical::recognizer::{CharEvent, Outcome, Recognizer, ScanContext, TriggerStates};
use crate::lexical::state::LexState;
use crate::tokens::Token;

pub const NAME: &str = "comment";

#[derive(Debug, Default)]
pub struct CommentRecognizer {
    stash: String,
    /// Position of the opening `*`
    open_pos: usize,
    /// Position of the last closing `/`
    last_close_pos: Option<usize>,
}

impl CommentRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn opens(&self, event: &CharEvent) -> bool {
        event.current == '*'
            && event.previous == Some('/')
            && event.state != LexState::Comment
            && self.last_close_pos != event.position.checked_sub(1)
    }

    fn closes(&self, event: &CharEvent) -> bool {
        event.current == '/'
            && event.previous == Some('*')
            && event.state == LexState::Comment
            && event.position.checked_sub(1) != Some(self.open_pos)
    }
}

impl Recognizer for CommentRecognizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn trigger_chars(&self) -> &[char] {
        &['*', '/']
    }

    fn trigger_states(&self) -> TriggerStates {
        TriggerStates::Any
    }

    fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        if self.opens(&event) {
            ctx.truncate_buffer_last('/');
            self.stash = ctx.take_buffer(&[], false);
            self.open_pos = event.position;
            ctx.push_state(LexState::Comment);
            ctx.lock_exclusive();
            return Outcome::Handled;
        }

        if self.closes(&event) {
            let mut text = ctx.take_buffer(&[], false);
            if text.ends_with('*') {
                text.pop();
            }
            ctx.unlock();
            ctx.pop_state();
            ctx.emit_from(Token::Comment { text }, self.open_pos.saturating_sub(1));
            ctx.set_buffer(std::mem::take(&mut self.stash));
            self.last_close_pos = Some(event.position);
            return Outcome::Handled;
        }

        Outcome::NotHandled
    }

    fn reset(&mut self) {
        self.stash.clear();
        self.open_pos = 0;
        self.last_close_pos = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::scan;
    use crate::tokens::Declaration;

    #[test]
    fn test_comment_payload_is_inner_text() {
        let output = scan("/* hello */");
        assert_eq!(output.token_values(), vec![Token::comment(" hello ")]);
        assert_eq!(output.tokens[0].span.start.offset, 0);
        assert_eq!(output.tokens[0].span.end.offset, 11);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_comment_hides_structure() {
        let output = scan("/* .a{color:red} url( */");
        assert_eq!(output.tokens.len(), 1);
        assert_eq!(output.stats.final_depth, 1);
    }

    #[test]
    fn test_buffer_is_restored_around_comment() {
        let output = scan(".a/*x*/.b{color:/* why */red}");
        assert_eq!(
            output.token_values(),
            vec![
                Token::comment("x"),
                Token::ruleset_start([".a.b"]),
                Token::comment(" why "),
                Token::RulesetDeclaration(Declaration::new("color", "red", false)),
                Token::RulesetEnd,
            ]
        );
    }

    #[test]
    fn test_slash_star_slash_does_not_close() {
        let output = scan("/*/ still open */");
        assert_eq!(output.token_values(), vec![Token::comment("/ still open ")]);
    }

    #[test]
    fn test_closing_slash_does_not_reopen() {
        let output = scan("/**/*");
        assert_eq!(
            output.token_values(),
            vec![
                Token::comment(""),
                Token::TrailingContent {
                    text: "*".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unterminated_comment() {
        let output = scan("a{} /* open");
        assert!(output.stats.ended_locked);
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.diagnostics[0].message.contains("comment"));
    }
}
