//! Block at-rules with a declaration body: `@font-face`, `@page`, `@variables`
//!
//! Each rule moves through three phases. The keyword pushes the preamble
//! state, `{` turns the preamble into the body and emits the start token, and
//! the body is lexed with the shared declaration capture until its `}`.

use super::declaration::{DeclarationCapture, DeclarationFamily};
use super::split_list;
use crate::lexical::recognizer::{CharEvent, Outcome, Recognizer, ScanContext, TriggerStates};
use crate::lexical::state::LexState;
use crate::tokens::Token;

pub const FONT_FACE: &str = "font-face";
pub const PAGE: &str = "page";
pub const VARIABLES: &str = "variables";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtRuleKind {
    FontFace,
    Page,
    Variables,
}

impl AtRuleKind {
    pub fn name(&self) -> &'static str {
        match self {
            AtRuleKind::FontFace => FONT_FACE,
            AtRuleKind::Page => PAGE,
            AtRuleKind::Variables => VARIABLES,
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            AtRuleKind::FontFace => "@font-face",
            AtRuleKind::Page => "@page",
            AtRuleKind::Variables => "@variables",
        }
    }

    fn prepare_state(&self) -> LexState {
        match self {
            AtRuleKind::FontFace => LexState::AtFontFacePrepare,
            AtRuleKind::Page => LexState::AtPagePrepare,
            AtRuleKind::Variables => LexState::AtVariablesPrepare,
        }
    }

    fn family(&self) -> DeclarationFamily {
        match self {
            AtRuleKind::FontFace => DeclarationFamily {
                body: LexState::AtFontFace,
                declaration: LexState::AtFontFaceDeclaration,
                wrap: Token::AtFontFaceDeclaration,
                end: || Token::AtFontFaceEnd,
            },
            AtRuleKind::Page => DeclarationFamily {
                body: LexState::AtPage,
                declaration: LexState::AtPageDeclaration,
                wrap: Token::AtPageDeclaration,
                end: || Token::AtPageEnd,
            },
            AtRuleKind::Variables => DeclarationFamily {
                body: LexState::AtVariables,
                declaration: LexState::AtVariablesDeclaration,
                wrap: Token::AtVariablesDeclaration,
                end: || Token::AtVariablesEnd,
            },
        }
    }

    /// Start token built from the text between keyword and `{`
    fn start_token(&self, preamble: &str) -> Token {
        match self {
            AtRuleKind::FontFace => Token::AtFontFaceStart,
            AtRuleKind::Page => Token::AtPageStart {
                selector: preamble.to_string(),
            },
            AtRuleKind::Variables => Token::AtVariablesStart {
                media_types: split_list(preamble),
            },
        }
    }
}

pub struct BlockAtRuleRecognizer {
    kind: AtRuleKind,
    family: DeclarationFamily,
    triggers: Vec<LexState>,
    capture: DeclarationCapture,
    start: usize,
}

impl BlockAtRuleRecognizer {
    pub fn new(kind: AtRuleKind) -> Self {
        let family = kind.family();
        Self {
            kind,
            family,
            triggers: vec![
                LexState::Document,
                kind.prepare_state(),
                family.body,
                family.declaration,
            ],
            capture: DeclarationCapture::default(),
            start: 0,
        }
    }

    pub fn font_face() -> Self {
        Self::new(AtRuleKind::FontFace)
    }

    pub fn page() -> Self {
        Self::new(AtRuleKind::Page)
    }

    pub fn variables() -> Self {
        Self::new(AtRuleKind::Variables)
    }

    pub fn kind(&self) -> AtRuleKind {
        self.kind
    }
}

impl Recognizer for BlockAtRuleRecognizer {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn trigger_chars(&self) -> &[char] {
        &['@', '{', '}', ':', ';']
    }

    fn trigger_states(&self) -> TriggerStates {
        TriggerStates::Only(self.triggers.clone())
    }

    fn try_consume(&mut self, event: CharEvent, ctx: &mut ScanContext<'_>) -> Outcome {
        let keyword = self.kind.keyword();

        if event.state == LexState::Document {
            if event.current == '@' && ctx.source().matches_keyword_ci(event.position, keyword) {
                ctx.push_state(self.kind.prepare_state());
                ctx.clear_buffer();
                self.start = event.position;
                return Outcome::Skip(event.position + keyword.len());
            }
            return Outcome::NotHandled;
        }

        if event.state == self.kind.prepare_state() {
            if event.current != '{' {
                return Outcome::NotHandled;
            }
            let preamble = ctx.take_buffer(&[], true);
            ctx.set_state(self.family.body);
            ctx.emit_from(self.kind.start_token(&preamble), self.start);
            return Outcome::Handled;
        }

        self.capture.handle(&self.family, event, ctx)
    }

    fn reset(&mut self) {
        self.capture.reset();
        self.start = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::scan;
    use crate::tokens::Declaration;

    #[test]
    fn test_font_face() {
        let output = scan("@font-face{font-family:Foo;src:url(foo.woff)}");
        assert_eq!(
            output.token_values(),
            vec![
                Token::AtFontFaceStart,
                Token::AtFontFaceDeclaration(Declaration::new("font-family", "Foo", false)),
                Token::AtFontFaceDeclaration(Declaration::new("src", "url(foo.woff)", false)),
                Token::AtFontFaceEnd,
            ]
        );
        assert!(output.diagnostics.is_empty());
        assert_eq!(output.stats.final_depth, 1);
    }

    #[test]
    fn test_page_selector() {
        let output = scan("@page :first { margin: 1in !important; }");
        assert_eq!(
            output.token_values(),
            vec![
                Token::AtPageStart {
                    selector: ":first".to_string()
                },
                Token::AtPageDeclaration(Declaration::new("margin", "1in", true)),
                Token::AtPageEnd,
            ]
        );
    }

    #[test]
    fn test_variables_media_list() {
        let output = scan("@variables screen, print {accent:#f00}");
        assert_eq!(
            output.token_values(),
            vec![
                Token::AtVariablesStart {
                    media_types: vec!["screen".to_string(), "print".to_string()]
                },
                Token::AtVariablesDeclaration(Declaration::new("accent", "#f00", false)),
                Token::AtVariablesEnd,
            ]
        );
    }

    #[test]
    fn test_keyword_match_ignores_case() {
        let output = scan("@Font-Face{font-family:x}");
        assert_eq!(output.tokens[0].value, Token::AtFontFaceStart);
        assert_eq!(output.tokens.len(), 3);
    }

    #[test]
    fn test_unclosed_body() {
        let output = scan("@page{margin:0");
        assert_eq!(output.diagnostics.len(), 1);
        assert!(output.diagnostics[0].message.contains("declaration"));
        assert_eq!(
            output.token_values().last(),
            Some(&Token::TrailingContent {
                text: "0".to_string()
            })
        );
    }
}
