//! `@media <list> { rulesets }`

use super::{discard_dangling, split_list};
use crate::lexical::recognizer::{CharEvent, Outcome, Recognizer, ScanContext, TriggerStates};
use crate::lexical::state::LexState;
use crate::tokens::Token;

pub const NAME: &str = "media";

const KEYWORD: &str = "@media";

#[derive(Debug, Default)]
pub struct MediaRecognizer {
    start: usize,
}

impl MediaRecognizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Recognizer for MediaRecognizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn trigger_chars(&self) -> &[char] {
        &['@', '{', '}']
    }

    fn trigger_states(&self) -> TriggerStates {
        TriggerStates::Only(vec![
            LexState::Document,
            LexState::AtMediaPrepare,
            LexState::AtMedia,
        ])
    }

    fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        match (event.current, event.state) {
            ('@', LexState::Document) if ctx.source().matches_keyword_ci(event.position, KEYWORD) => {
                ctx.push_state(LexState::AtMediaPrepare);
                ctx.clear_buffer();
                self.start = event.position;
                Outcome::Skip(event.position + KEYWORD.len())
            }
            ('{', LexState::AtMediaPrepare) => {
                let media_types = split_list(&ctx.take_buffer(&[], true));
                ctx.set_state(LexState::AtMedia);
                ctx.emit_from(Token::AtMediaStart { media_types }, self.start);
                Outcome::Handled
            }
            ('}', LexState::AtMedia) => {
                discard_dangling(ctx, "content inside @media does not belong to any rule");
                ctx.pop_state();
                ctx.emit(Token::AtMediaEnd);
                Outcome::Handled
            }
            _ => Outcome::NotHandled,
        }
    }

    fn reset(&mut self) {
        self.start = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::diagnostics::DiagnosticKind;
    use crate::lexical::scan;
    use crate::tokens::Declaration;

    #[test]
    fn test_media_block_with_rulesets() {
        let output = scan("@media screen, print { .a{color:red} .b{} }");
        assert_eq!(
            output.token_values(),
            vec![
                Token::AtMediaStart {
                    media_types: vec!["screen".to_string(), "print".to_string()]
                },
                Token::ruleset_start([".a"]),
                Token::RulesetDeclaration(Declaration::new("color", "red", false)),
                Token::RulesetEnd,
                Token::ruleset_start([".b"]),
                Token::RulesetEnd,
                Token::AtMediaEnd,
            ]
        );
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.stats.final_depth, 1);
    }

    #[test]
    fn test_media_query_with_parentheses() {
        let output = scan("@media (max-width: 600px) and print{}");
        assert_eq!(
            output.tokens[0].value,
            Token::AtMediaStart {
                media_types: vec!["(max-width: 600px) and print".to_string()]
            }
        );
        assert_eq!(output.tokens[1].value, Token::AtMediaEnd);
    }

    #[test]
    fn test_leftover_body_text_is_reported() {
        let output = scan("@media print{ stray }");
        assert_eq!(
            output.token_values(),
            vec![
                Token::AtMediaStart {
                    media_types: vec!["print".to_string()]
                },
                Token::AtMediaEnd,
            ]
        );
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::DanglingContent);
        assert_eq!(output.diagnostics[0].recovered_text.as_deref(), Some("stray"));
        assert_eq!(output.stats.final_depth, 1);
    }

    #[test]
    fn test_whitespace_before_close_is_not_reported() {
        let output = scan("@media print{ .a{} \n }");
        assert!(output.is_clean());
    }
}
