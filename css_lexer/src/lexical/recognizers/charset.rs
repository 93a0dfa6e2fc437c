//! `@charset "X";`

use crate::lexical::recognizer::{CharEvent, Outcome, Recognizer, ScanContext, TriggerStates};
use crate::lexical::state::LexState;
use crate::tokens::Token;

pub const NAME: &str = "charset";

const KEYWORD: &str = "@charset";

#[derive(Debug, Default)]
pub struct CharsetRecognizer {
    start: usize,
}

impl CharsetRecognizer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Recognizer for CharsetRecognizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn trigger_chars(&self) -> &[char] {
        &['@', ';', '\n']
    }

    fn trigger_states(&self) -> TriggerStates {
        TriggerStates::Only(vec![LexState::Document, LexState::AtCharset])
    }

    fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        match (event.current, event.state) {
            ('@', LexState::Document) if ctx.source().matches_keyword_ci(event.position, KEYWORD) => {
                ctx.push_state(LexState::AtCharset);
                ctx.clear_buffer();
                self.start = event.position;
                Outcome::Skip(event.position + KEYWORD.len())
            }
            (';' | '\n', LexState::AtCharset) => {
                let raw = ctx.take_buffer(&[], true);
                ctx.pop_state();
                ctx.emit_from(
                    Token::AtCharset {
                        charset: strip_quotes(&raw).to_string(),
                    },
                    self.start,
                );
                Outcome::Handled
            }
            _ => Outcome::NotHandled,
        }
    }

    fn reset(&mut self) {
        self.start = 0;
    }
}

/// Remove one pair of matching surrounding quotes
fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::scan;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"UTF-8\""), "UTF-8");
        assert_eq!(strip_quotes("'latin1'"), "latin1");
        assert_eq!(strip_quotes("\"mixed'"), "\"mixed'");
        assert_eq!(strip_quotes("bare"), "bare");
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let output = scan("@CHARSET 'iso-8859-1';");
        assert_eq!(
            output.token_values(),
            vec![Token::AtCharset {
                charset: "iso-8859-1".to_string()
            }]
        );
        assert_eq!(output.tokens[0].span.start.offset, 0);
    }

    #[test]
    fn test_newline_terminates() {
        let output = scan("@charset UTF-8\n.a{}");
        assert_eq!(output.tokens.len(), 3);
        assert_eq!(
            output.tokens[0].value,
            Token::AtCharset {
                charset: "UTF-8".to_string()
            }
        );
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_other_at_rules_are_ignored() {
        let output = scan("@char;");
        assert!(output
            .token_values()
            .iter()
            .all(|token| !matches!(token, Token::AtCharset { .. })));
    }
}
