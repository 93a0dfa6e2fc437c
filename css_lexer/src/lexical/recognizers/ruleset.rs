//! Selector lists and ruleset bodies

use super::declaration::{DeclarationCapture, DeclarationFamily};
use super::discard_dangling;
use crate::lexical::recognizer::{CharEvent, Outcome, Recognizer, ScanContext, TriggerStates};
use crate::lexical::state::LexState;
use crate::tokens::Token;

pub const NAME: &str = "ruleset";

const FAMILY: DeclarationFamily = DeclarationFamily {
    body: LexState::Ruleset,
    declaration: LexState::RulesetDeclaration,
    wrap: Token::RulesetDeclaration,
    end: ruleset_end,
};

fn ruleset_end() -> Token {
    Token::RulesetEnd
}

#[derive(Debug, Default)]
pub struct RulesetRecognizer {
    selectors: Vec<String>,
    capture: DeclarationCapture,
}

impl RulesetRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect_selector(&mut self, ctx: &mut ScanContext<'_>) {
        let selector = ctx.take_buffer(&[','], true);
        if !selector.is_empty() {
            self.selectors.push(selector);
        }
    }

    /// `,` and `{` where a selector list may be accumulating
    fn consume_selector_char(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        match event.current {
            ',' => {
                self.collect_selector(ctx);
                if event.state != LexState::RulesetSelectors && !self.selectors.is_empty() {
                    ctx.push_state(LexState::RulesetSelectors);
                }
                Outcome::Handled
            }
            '{' => {
                self.collect_selector(ctx);
                if self.selectors.is_empty() {
                    return Outcome::NotHandled;
                }
                if event.state == LexState::RulesetSelectors {
                    ctx.pop_state();
                }
                ctx.push_state(LexState::Ruleset);
                ctx.emit(Token::RulesetStart {
                    selectors: std::mem::take(&mut self.selectors),
                });
                Outcome::Handled
            }
            ';' => {
                self.abandon_statement(event.state, ctx);
                Outcome::Handled
            }
            _ => Outcome::NotHandled,
        }
    }

    /// `;` outside a ruleset ends a statement nothing recognized
    fn abandon_statement(&mut self, state: LexState, ctx: &mut ScanContext<'_>) {
        if state == LexState::RulesetSelectors {
            ctx.pop_state();
            let mut text = std::mem::take(&mut self.selectors).join(", ");
            text.push_str(", ");
            text.push_str(ctx.buffer().as_str());
            ctx.set_buffer(text);
        }
        discard_dangling(ctx, "statement does not belong to any rule");
    }
}

impl Recognizer for RulesetRecognizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn trigger_chars(&self) -> &[char] {
        &[',', '{', '}', ':', ';']
    }

    fn trigger_states(&self) -> TriggerStates {
        TriggerStates::Only(vec![
            LexState::Document,
            LexState::AtMedia,
            LexState::RulesetSelectors,
            LexState::Ruleset,
            LexState::RulesetDeclaration,
        ])
    }

    fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        match event.state {
            LexState::Document | LexState::AtMedia | LexState::RulesetSelectors => {
                self.consume_selector_char(event, ctx)
            }
            _ => self.capture.handle(&FAMILY, event, ctx),
        }
    }

    fn reset(&mut self) {
        self.selectors.clear();
        self.capture.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::diagnostics::DiagnosticKind;
    use crate::lexical::scan;
    use crate::tokens::Declaration;
    use assert_matches::assert_matches;

    #[test]
    fn test_selector_list_is_trimmed() {
        let output = scan(" h1 ,\n h2 > a , .x { }");
        assert_eq!(
            output.token_values(),
            vec![Token::ruleset_start(["h1", "h2 > a", ".x"]), Token::RulesetEnd]
        );
    }

    #[test]
    fn test_pseudo_class_colon_stays_in_selector() {
        let output = scan("a:hover{color:blue}");
        assert_eq!(output.tokens[0].value, Token::ruleset_start(["a:hover"]));
        assert_eq!(
            output.tokens[1].value,
            Token::RulesetDeclaration(Declaration::new("color", "blue", false))
        );
    }

    #[test]
    fn test_several_declarations() {
        let output = scan(".a{margin:0;padding:0 1px;}.b{}");
        let kinds: Vec<_> = output.tokens.iter().map(|t| t.value.kind().as_str()).collect();
        assert_eq!(
            kinds,
            vec![
                "ruleset-start",
                "ruleset-declaration",
                "ruleset-declaration",
                "ruleset-end",
                "ruleset-start",
                "ruleset-end",
            ]
        );
    }

    #[test]
    fn test_brace_without_selector_is_content() {
        let output = scan("{color:red}");
        assert!(output
            .token_values()
            .iter()
            .all(|token| !matches!(token, Token::RulesetStart { .. })));
        assert_matches!(output.token_values().last(), Some(Token::TrailingContent { .. }));
    }

    #[test]
    fn test_unclosed_selector_list() {
        let output = scan("a, b");
        assert_eq!(output.stats.final_depth, 2);
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.diagnostics[0].message.contains("ruleset"));
    }

    #[test]
    fn test_unrecognized_statement_does_not_leak_into_selector() {
        let output = scan("@import \"x.css\";.a{b:c}");
        assert_eq!(
            output.token_values(),
            vec![
                Token::ruleset_start([".a"]),
                Token::RulesetDeclaration(Declaration::new("b", "c", false)),
                Token::RulesetEnd,
            ]
        );
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].kind, DiagnosticKind::DanglingContent);
        assert_eq!(
            output.diagnostics[0].recovered_text.as_deref(),
            Some("@import \"x.css\"")
        );
    }

    #[test]
    fn test_semicolon_abandons_selector_list() {
        let output = scan(".a,.b;.c{}");
        assert_eq!(
            output.token_values(),
            vec![Token::ruleset_start([".c"]), Token::RulesetEnd]
        );
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].recovered_text.as_deref(), Some(".a, .b"));
        assert_eq!(output.stats.final_depth, 1);
    }

    #[test]
    fn test_empty_statement_is_silent() {
        let output = scan(".a{};.b{}");
        assert!(output.is_clean());
        assert_eq!(output.tokens.len(), 4);
    }
}
